//! Neighbor operators for the improvement phase.
//!
//! Each operator is a pure transformation `(solution, context) → neighbors`
//! behind the [`NeighborOperation`] trait; the registry in
//! [`standard_operators`] is the fixed set the local search draws from.
//! Operators never mutate the incumbent and never emit a neighbor that
//! violates the solution invariants. The economics they place on moved
//! allocations are provisional: every evaluation pass rescores neighbors in
//! full interaction context before comparing.

mod area_ops;
mod crop_ops;
mod field_ops;
mod period_ops;

pub use area_ops::AreaAdjust;
pub use crop_ops::{CropChange, CropInsert};
pub use field_ops::{FieldMove, FieldRemove, FieldReplace, FieldSwap};
pub use period_ops::PeriodReplace;

use chrono::NaiveDate;

use acre_core::{
    AllocationCandidate, AllocationId, CropAllocation, CropId, FieldId, PlanningHorizon, Solution,
};

use crate::interaction::InteractionMatrix;
use crate::request::{Objective, OptimizationConfig};
use crate::solution_ops::AllocationIdSource;

/// Read-only context shared by all operators during one improvement run.
pub struct NeighborContext<'a> {
    /// The full candidate pool, sorted by (field, crop, start, area)
    pub pool: &'a [AllocationCandidate],
    pub horizon: &'a PlanningHorizon,
    pub matrix: &'a InteractionMatrix,
    pub config: &'a OptimizationConfig,
    pub objective: Objective,
}

/// One parameterized neighborhood transformation.
pub trait NeighborOperation {
    /// Stable operator name (used in logs and weight tables)
    fn name(&self) -> &'static str;

    /// Relative selection weight when sampling operators
    fn default_weight(&self) -> f64 {
        0.1
    }

    /// Generate feasible neighbors of `solution`. Implementations must not
    /// mutate `solution` and must uphold every solution invariant in what
    /// they emit.
    fn generate(
        &self,
        solution: &Solution,
        ctx: &NeighborContext<'_>,
        ids: &mut AllocationIdSource,
    ) -> Vec<Solution>;
}

/// The standard registry, in deterministic order.
pub fn standard_operators() -> Vec<Box<dyn NeighborOperation>> {
    vec![
        Box::new(FieldSwap),
        Box::new(FieldMove),
        Box::new(FieldReplace),
        Box::new(FieldRemove),
        Box::new(CropInsert),
        Box::new(CropChange),
        Box::new(PeriodReplace),
        Box::new(AreaAdjust),
    ]
}

/// How many nearest-start candidates each pool lookup considers.
pub(crate) const NEAREST_CANDIDATE_LIMIT: usize = 10;

/// Cap on neighbors emitted by pool-scanning operators per call.
pub(crate) const MAX_INSERT_NEIGHBORS: usize = 50;

/// Build an allocation from a pool candidate, overriding the cultivated
/// area. Revenue scales proportionally with area (the yield factor is
/// area-independent); the final figure is provisional until rescoring.
pub(crate) fn allocation_with_area(
    candidate: &AllocationCandidate,
    area: f64,
    ids: &mut AllocationIdSource,
) -> CropAllocation {
    let mut alloc = CropAllocation::from_candidate(ids.next_id(), candidate);
    if candidate.area_used > 0.0 && (area - candidate.area_used).abs() > 1e-12 {
        let scale = area / candidate.area_used;
        let mut revenue = candidate.revenue * scale;
        if let Some(cap) = candidate.crop.max_revenue {
            revenue = revenue.min(cap);
        }
        alloc.area_used = area;
        alloc.base_revenue = revenue;
        alloc.revenue = revenue;
        alloc.profit = revenue - alloc.cost;
    }
    alloc
}

/// Pool candidates for (field, crop) ordered by start-date proximity to
/// `target_start` (ties to the earlier date), truncated to `limit` and to
/// the configured date tolerance.
pub(crate) fn nearest_candidates<'a>(
    ctx: &NeighborContext<'a>,
    field_id: &FieldId,
    crop_id: &CropId,
    target_start: NaiveDate,
    limit: usize,
) -> Vec<&'a AllocationCandidate> {
    let mut matching: Vec<&AllocationCandidate> = ctx
        .pool
        .iter()
        .filter(|c| &c.field.id == field_id && &c.crop.id == crop_id)
        .filter(|c| match ctx.config.candidate_date_tolerance_days {
            Some(tolerance) => {
                (c.start_date - target_start).num_days().unsigned_abs() <= tolerance as u64
            }
            None => true,
        })
        .collect();
    matching.sort_by_key(|c| {
        (
            (c.start_date - target_start).num_days().abs(),
            c.start_date,
        )
    });
    matching.truncate(limit);
    matching
}

/// The solution minus the given allocations (matched by id).
pub(crate) fn without(solution: &Solution, remove: &[AllocationId]) -> Solution {
    Solution::new(
        solution
            .allocations
            .iter()
            .filter(|a| !remove.contains(&a.id))
            .cloned()
            .collect(),
    )
}

/// Area already committed on a field by other allocations (any time), used
/// as the conservative capacity screen for cross-field moves.
pub(crate) fn committed_area_excluding(
    solution: &Solution,
    field_id: &FieldId,
    exclude: &[AllocationId],
) -> f64 {
    solution
        .allocations
        .iter()
        .filter(|a| &a.field.id == field_id && !exclude.contains(&a.id))
        .map(|a| a.area_used)
        .sum()
}
