//! Crop-level neighbor operators: insert an unused candidate, change the
//! crop on an occupied slot.

use acre_core::Solution;

use super::{
    allocation_with_area, nearest_candidates, without, NeighborContext, NeighborOperation,
    MAX_INSERT_NEIGHBORS, NEAREST_CANDIDATE_LIMIT,
};
use crate::solution_ops::{is_candidate_feasible, AllocationIdSource};

/// Insert a pool candidate that is not currently in the solution.
pub struct CropInsert;

impl NeighborOperation for CropInsert {
    fn name(&self) -> &'static str {
        "crop_insert"
    }

    fn default_weight(&self) -> f64 {
        0.2
    }

    fn generate(
        &self,
        solution: &Solution,
        ctx: &NeighborContext<'_>,
        ids: &mut AllocationIdSource,
    ) -> Vec<Solution> {
        let mut neighbors = Vec::new();

        for cand in ctx.pool {
            if neighbors.len() >= MAX_INSERT_NEIGHBORS {
                break;
            }
            let already_used = solution.allocations.iter().any(|a| {
                a.field.id == cand.field.id
                    && a.crop.id == cand.crop.id
                    && a.start_date == cand.start_date
                    && (a.area_used - cand.area_used).abs() < 1e-9
            });
            if already_used {
                continue;
            }
            if !is_candidate_feasible(solution, cand, ctx.horizon) {
                continue;
            }
            let mut neighbor = solution.clone();
            neighbor
                .allocations
                .push(allocation_with_area(cand, cand.area_used, ids));
            neighbors.push(neighbor);
        }

        neighbors
    }
}

/// Change the crop of one allocation to a different crop with a matching
/// pool candidate, preserving the cultivated area.
pub struct CropChange;

impl NeighborOperation for CropChange {
    fn name(&self) -> &'static str {
        "crop_change"
    }

    fn generate(
        &self,
        solution: &Solution,
        ctx: &NeighborContext<'_>,
        ids: &mut AllocationIdSource,
    ) -> Vec<Solution> {
        let mut neighbors = Vec::new();

        // Distinct crops, in pool (sorted) order
        let mut crop_ids = Vec::new();
        for c in ctx.pool {
            if !crop_ids.contains(&c.crop.id) {
                crop_ids.push(c.crop.id.clone());
            }
        }

        for alloc in &solution.allocations {
            let base = without(solution, &[alloc.id]);
            for other_crop in crop_ids.iter().filter(|c| **c != alloc.crop.id) {
                let candidates = nearest_candidates(
                    ctx,
                    &alloc.field.id,
                    other_crop,
                    alloc.start_date,
                    NEAREST_CANDIDATE_LIMIT,
                );
                for cand in candidates {
                    // Area equivalence: the changed slot keeps its area
                    let changed = allocation_with_area(cand, alloc.area_used, ids);
                    if crate::solution_ops::is_feasible_to_add(&base, &changed, ctx.horizon) {
                        let mut neighbor = base.clone();
                        neighbor.allocations.push(changed);
                        neighbors.push(neighbor);
                        break; // nearest feasible per (allocation, crop)
                    }
                }
            }
        }

        neighbors
    }
}
