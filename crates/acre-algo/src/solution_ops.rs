//! Shared solution manipulation used by the greedy builder, the neighbor
//! operators, local search, and ALNS.
//!
//! Feasibility here means the global solution invariants: same-field time
//! exclusion including fallow, the per-date area budget, and the horizon.
//! Revenue caps are enforced by rescoring, which is also defined here:
//! neighbors and repairs carry provisional economics, and every evaluation
//! pass calls [`rescore_solution`] before comparing profits.

use acre_core::plan::AREA_EPSILON;
use acre_core::{
    AllocationCandidate, AllocationId, CropAllocation, PlanningHorizon, Solution,
};

use crate::interaction::{soil_recovery_factor, InteractionMatrix};
use crate::request::Objective;

/// Hands out sequential allocation ids within one planning call.
#[derive(Debug, Default)]
pub struct AllocationIdSource {
    next: u64,
}

impl AllocationIdSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> AllocationId {
        let id = AllocationId::new(self.next);
        self.next += 1;
        id
    }
}

/// Adopt a candidate into an allocation with a fresh id.
pub fn adopt_candidate(
    candidate: &AllocationCandidate,
    ids: &mut AllocationIdSource,
) -> CropAllocation {
    CropAllocation::from_candidate(ids.next_id(), candidate)
}

/// True if `new_alloc` can join `solution` without breaking the time,
/// area, or horizon invariants.
pub fn is_feasible_to_add(
    solution: &Solution,
    new_alloc: &CropAllocation,
    horizon: &PlanningHorizon,
) -> bool {
    if new_alloc.start_date < horizon.start || new_alloc.completion_date > horizon.end {
        return false;
    }
    if new_alloc.area_used > new_alloc.field.area + AREA_EPSILON {
        return false;
    }
    for existing in &solution.allocations {
        if existing.overlaps_with_fallow(new_alloc) {
            return false;
        }
    }
    turnover_day_area_ok(solution, new_alloc)
}

/// With a zero fallow period two runs may touch on the turnover day; the
/// field's area budget still applies there.
fn turnover_day_area_ok(solution: &Solution, new_alloc: &CropAllocation) -> bool {
    for existing in &solution.allocations {
        if existing.field.id != new_alloc.field.id {
            continue;
        }
        let boundary = if existing.completion_date == new_alloc.start_date {
            Some(new_alloc.start_date)
        } else if new_alloc.completion_date == existing.start_date {
            Some(existing.start_date)
        } else {
            None
        };
        if let Some(day) = boundary {
            let active: f64 = solution
                .allocations
                .iter()
                .filter(|a| a.field.id == new_alloc.field.id && a.occupies(day))
                .map(|a| a.area_used)
                .sum::<f64>()
                + new_alloc.area_used;
            if active > new_alloc.field.area + AREA_EPSILON {
                return false;
            }
        }
    }
    true
}

/// True if a candidate (not yet adopted) can join `solution`.
pub fn is_candidate_feasible(
    solution: &Solution,
    candidate: &AllocationCandidate,
    horizon: &PlanningHorizon,
) -> bool {
    if candidate.start_date < horizon.start || candidate.completion_date > horizon.end {
        return false;
    }
    if candidate.area_used > candidate.field.area + AREA_EPSILON {
        return false;
    }
    for existing in &solution.allocations {
        if existing.field.id != candidate.field.id {
            continue;
        }
        if acre_core::plan::fallow_conflict(
            existing.start_date,
            existing.completion_date,
            candidate.start_date,
            candidate.completion_date,
            existing.field.fallow_period_days,
        ) {
            return false;
        }
        // Turnover-day area budget (reachable only with zero fallow)
        if existing.completion_date == candidate.start_date
            || candidate.completion_date == existing.start_date
        {
            let day = if existing.completion_date == candidate.start_date {
                candidate.start_date
            } else {
                existing.start_date
            };
            let active: f64 = solution
                .allocations
                .iter()
                .filter(|a| a.field.id == candidate.field.id && a.occupies(day))
                .map(|a| a.area_used)
                .sum::<f64>()
                + candidate.area_used;
            if active > candidate.field.area + AREA_EPSILON {
                return false;
            }
        }
    }
    true
}

/// Remove the given allocations (matched by id), returning the remainder.
pub fn remove_allocations(solution: &Solution, to_remove: &[CropAllocation]) -> Solution {
    let remove_ids: Vec<AllocationId> = to_remove.iter().map(|a| a.id).collect();
    Solution::new(
        solution
            .allocations
            .iter()
            .filter(|a| !remove_ids.contains(&a.id))
            .cloned()
            .collect(),
    )
}

/// Recompute every allocation's final revenue and profit in solution
/// context: predecessor interaction impact × soil recovery, clamped by the
/// crop's revenue cap.
///
/// The predecessor of an allocation is the latest allocation on the same
/// field completing before it starts. Allocations without a predecessor keep
/// their base revenue (cap still applies).
pub fn rescore_solution(solution: &mut Solution, matrix: &InteractionMatrix) {
    // Deterministic processing order regardless of insertion history
    solution.allocations.sort_by(|a, b| {
        (&a.field.id, a.start_date, a.id).cmp(&(&b.field.id, b.start_date, b.id))
    });

    let snapshot: Vec<(usize, Option<usize>)> = solution
        .allocations
        .iter()
        .enumerate()
        .map(|(i, alloc)| {
            let predecessor = solution
                .allocations
                .iter()
                .enumerate()
                .filter(|(j, p)| {
                    *j != i
                        && p.field.id == alloc.field.id
                        && p.completion_date < alloc.start_date
                })
                .max_by_key(|(_, p)| p.completion_date)
                .map(|(j, _)| j);
            (i, predecessor)
        })
        .collect();

    let mut rescored: Vec<(f64, f64)> = Vec::with_capacity(solution.allocations.len());
    for (i, predecessor) in snapshot {
        let alloc = &solution.allocations[i];
        let mut multiplier = 1.0;
        if let Some(p) = predecessor {
            let pred = &solution.allocations[p];
            let gap = (alloc.start_date - pred.completion_date).num_days();
            multiplier = matrix.impact(&pred.crop.groups, &alloc.crop.groups)
                * soil_recovery_factor(gap);
        }
        let mut revenue = alloc.base_revenue * multiplier;
        if let Some(cap) = alloc.crop.max_revenue {
            revenue = revenue.min(cap);
        }
        rescored.push((revenue, revenue - alloc.cost));
    }

    for (alloc, (revenue, profit)) in solution.allocations.iter_mut().zip(rescored) {
        alloc.revenue = revenue;
        alloc.profit = profit;
    }
}

/// Scalar score of a whole solution under the chosen objective.
pub fn solution_score(solution: &Solution, objective: Objective) -> f64 {
    solution
        .allocations
        .iter()
        .map(|a| objective.score(a.profit, a.cost))
        .sum()
}
