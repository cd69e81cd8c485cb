//! Planning entities: candidates, allocations, solutions, and results.
//!
//! An [`AllocationCandidate`] is a fully simulated planting option produced
//! by the candidate generator. Adopting a candidate into a solution binds it
//! to an [`AllocationId`] and, after rescoring, final revenue and profit; the
//! result is a [`CropAllocation`]. A [`Solution`] is a set of allocations
//! subject to the global feasibility invariants, and an
//! [`OptimizationResult`] packages a solution with totals, per-field
//! schedules, and diagnostics.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::diagnostics::Diagnostics;
use crate::error::{AcreError, AcreResult};
use crate::{AllocationId, Crop, CropId, Field, FieldId};

/// Tolerance for floating-point feasibility comparisons (m², currency).
pub const AREA_EPSILON: f64 = 1e-6;

/// Inclusive planning horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningHorizon {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PlanningHorizon {
    pub fn new(start: NaiveDate, end: NaiveDate) -> AcreResult<Self> {
        if end < start {
            return Err(AcreError::Validation(format!(
                "planning horizon is inverted ({} to {})",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Number of days covered, inclusive of both endpoints
    pub fn days(&self) -> u32 {
        (self.end - self.start).num_days() as u32 + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// True when two same-field occupation periods conflict, accounting for the
/// mandatory fallow rest after the earlier period's completion.
///
/// Compatible orderings are `end_a + fallow <= start_b` or
/// `end_b + fallow <= start_a`; anything else conflicts.
pub fn fallow_conflict(
    start_a: NaiveDate,
    end_a: NaiveDate,
    start_b: NaiveDate,
    end_b: NaiveDate,
    fallow_days: u32,
) -> bool {
    let fallow = Days::new(fallow_days as u64);
    let a_then_b = end_a.checked_add_days(fallow).map(|d| d <= start_b);
    let b_then_a = end_b.checked_add_days(fallow).map(|d| d <= start_a);
    !(a_then_b.unwrap_or(false) || b_then_a.unwrap_or(false))
}

/// A fully simulated planting option: (field, crop, start date, area) plus
/// the simulated completion and economics. Immutable once emitted by the
/// candidate generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationCandidate {
    pub field: Arc<Field>,
    pub crop: Arc<Crop>,
    pub start_date: NaiveDate,
    pub completion_date: NaiveDate,
    /// Days from planting to completion, inclusive
    pub growth_days: u32,
    /// GDD accumulated over the growth period
    pub accumulated_gdd: f64,
    /// Cultivated area (m²)
    pub area_used: f64,
    /// Occupation cost: growth_days × field daily fixed cost
    pub cost: f64,
    /// Revenue before interaction and soil-recovery adjustment
    pub revenue: f64,
    /// `revenue − cost`
    pub profit: f64,
}

impl AllocationCandidate {
    /// Profit per unit of cost; zero when the candidate costs nothing
    pub fn profit_rate(&self) -> f64 {
        if self.cost > 0.0 {
            self.profit / self.cost
        } else {
            0.0
        }
    }

    /// True if the candidate occupies its field on the given date
    pub fn occupies(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.completion_date
    }
}

/// A candidate adopted into a solution.
///
/// `revenue` and `profit` here are the final values after interaction and
/// soil-recovery rescoring in solution context; `base_revenue` preserves the
/// candidate's pre-interaction figure for re-derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropAllocation {
    pub id: AllocationId,
    pub field: Arc<Field>,
    pub crop: Arc<Crop>,
    pub start_date: NaiveDate,
    pub completion_date: NaiveDate,
    pub growth_days: u32,
    pub accumulated_gdd: f64,
    pub area_used: f64,
    pub cost: f64,
    /// Revenue before interaction adjustment (carried from the candidate)
    pub base_revenue: f64,
    /// Final revenue after rescoring in solution context
    pub revenue: f64,
    /// Final profit (`revenue − cost`)
    pub profit: f64,
}

impl CropAllocation {
    /// Adopt a candidate, binding it to an allocation id. Revenue and profit
    /// start at the candidate's base figures and are overwritten by
    /// rescoring.
    pub fn from_candidate(id: AllocationId, candidate: &AllocationCandidate) -> Self {
        Self {
            id,
            field: Arc::clone(&candidate.field),
            crop: Arc::clone(&candidate.crop),
            start_date: candidate.start_date,
            completion_date: candidate.completion_date,
            growth_days: candidate.growth_days,
            accumulated_gdd: candidate.accumulated_gdd,
            area_used: candidate.area_used,
            cost: candidate.cost,
            base_revenue: candidate.revenue,
            revenue: candidate.revenue,
            profit: candidate.profit,
        }
    }

    /// Planted units, derived from area (`area_used / crop.area_per_unit`)
    pub fn quantity(&self) -> f64 {
        self.area_used / self.crop.area_per_unit
    }

    /// Profit per unit of cost; zero when cost is zero
    pub fn profit_rate(&self) -> f64 {
        if self.cost > 0.0 {
            self.profit / self.cost
        } else {
            0.0
        }
    }

    /// True if the allocation occupies its field on the given date
    pub fn occupies(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.completion_date
    }

    /// True if this allocation and `other` conflict on the same field,
    /// including the field's fallow rest period
    pub fn overlaps_with_fallow(&self, other: &CropAllocation) -> bool {
        if self.field.id != other.field.id {
            return false;
        }
        fallow_conflict(
            self.start_date,
            self.completion_date,
            other.start_date,
            other.completion_date,
            self.field.fallow_period_days,
        )
    }
}

/// A set of crop allocations forming one (possibly partial) plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub allocations: Vec<CropAllocation>,
}

impl Solution {
    pub fn new(allocations: Vec<CropAllocation>) -> Self {
        Self { allocations }
    }

    pub fn is_empty(&self) -> bool {
        self.allocations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.allocations.len()
    }

    pub fn total_cost(&self) -> f64 {
        self.allocations.iter().map(|a| a.cost).sum()
    }

    pub fn total_revenue(&self) -> f64 {
        self.allocations.iter().map(|a| a.revenue).sum()
    }

    pub fn total_profit(&self) -> f64 {
        self.allocations.iter().map(|a| a.profit).sum()
    }

    /// Allocations on one field, in start-date order
    pub fn allocations_on_field(&self, field_id: &FieldId) -> Vec<&CropAllocation> {
        let mut found: Vec<&CropAllocation> = self
            .allocations
            .iter()
            .filter(|a| &a.field.id == field_id)
            .collect();
        found.sort_by_key(|a| (a.start_date, a.id));
        found
    }

    /// Total cultivated area per crop
    pub fn area_by_crop(&self) -> BTreeMap<CropId, f64> {
        let mut areas = BTreeMap::new();
        for alloc in &self.allocations {
            *areas.entry(alloc.crop.id.clone()).or_insert(0.0) += alloc.area_used;
        }
        areas
    }

    /// Check every global feasibility invariant; an `Err` here after
    /// optimization indicates a bug, not bad input.
    ///
    /// 1. No same-field pair conflicts in time including fallow.
    /// 2. At every date, the active area on a field stays within its area.
    /// 3. Every allocation lies within the horizon.
    /// 4. Revenue never exceeds the crop's cap.
    pub fn verify(&self, horizon: &PlanningHorizon) -> AcreResult<()> {
        let mut by_field: BTreeMap<&FieldId, Vec<&CropAllocation>> = BTreeMap::new();
        for alloc in &self.allocations {
            by_field.entry(&alloc.field.id).or_default().push(alloc);
        }

        for (field_id, allocs) in &by_field {
            for (i, a) in allocs.iter().enumerate() {
                for b in allocs.iter().skip(i + 1) {
                    if a.overlaps_with_fallow(b) {
                        return Err(AcreError::Internal(format!(
                            "fallow conflict on field '{}' between {} and {}",
                            field_id, a.id, b.id
                        )));
                    }
                }
            }

            // Area check at every occupation boundary; a violation can only
            // begin at some allocation's start date.
            let field_area = allocs[0].field.area;
            for probe in allocs.iter() {
                let active: f64 = allocs
                    .iter()
                    .filter(|a| a.occupies(probe.start_date))
                    .map(|a| a.area_used)
                    .sum();
                if active > field_area + AREA_EPSILON {
                    return Err(AcreError::Internal(format!(
                        "area overflow on field '{}' at {}: {:.1} m² active of {:.1} m²",
                        field_id, probe.start_date, active, field_area
                    )));
                }
            }
        }

        for alloc in &self.allocations {
            if alloc.start_date < horizon.start || alloc.completion_date > horizon.end {
                return Err(AcreError::Internal(format!(
                    "{} lies outside the planning horizon ({} to {})",
                    alloc.id, alloc.start_date, alloc.completion_date
                )));
            }
            if let Some(cap) = alloc.crop.max_revenue {
                if alloc.revenue > cap + AREA_EPSILON {
                    return Err(AcreError::Internal(format!(
                        "{} revenue {:.2} exceeds crop '{}' cap {:.2}",
                        alloc.id, alloc.revenue, alloc.crop.id, cap
                    )));
                }
            }
        }

        Ok(())
    }
}

/// One row of a field's schedule in the optimization result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub allocation_id: AllocationId,
    pub crop_id: CropId,
    pub crop_name: String,
    pub start_date: NaiveDate,
    pub completion_date: NaiveDate,
    pub area_used: f64,
    pub revenue: f64,
    pub profit: f64,
}

/// Per-field schedule with a utilization figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchedule {
    pub field_id: FieldId,
    pub field_name: String,
    /// Entries in start-date order
    pub entries: Vec<ScheduleEntry>,
    /// Occupied area-days over available area-days across the horizon (0..1)
    pub utilization: f64,
}

/// The complete outcome of one planning call.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationResult {
    /// False only for fatal failures; an empty plan is still a success
    pub success: bool,
    pub solution: Solution,
    pub total_cost: f64,
    pub total_revenue: f64,
    pub total_profit: f64,
    pub field_schedules: Vec<FieldSchedule>,
    /// Total cultivated area per crop id
    pub crop_areas: BTreeMap<CropId, f64>,
    /// Which algorithm produced the solution (e.g. "dp", "greedy+alns")
    pub algorithm: String,
    /// Wall-clock time spent in the planning call
    pub elapsed_ms: u64,
    /// True only when the per-field DP provably solved the whole problem
    pub is_optimal: bool,
    pub diagnostics: Diagnostics,
}

impl OptimizationResult {
    /// Short human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "{} allocations, profit {:.2} (revenue {:.2}, cost {:.2}), algorithm {}{}, {} ms",
            self.solution.len(),
            self.total_profit,
            self.total_revenue,
            self.total_cost,
            self.algorithm,
            if self.is_optimal { " (optimal)" } else { "" },
            self.elapsed_ms
        )
    }
}
