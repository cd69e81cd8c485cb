//! Period replacement: move a (field, crop) allocation to a different-dated
//! pool candidate.

use acre_core::Solution;

use super::{allocation_with_area, without, NeighborContext, NeighborOperation};
use crate::solution_ops::{is_feasible_to_add, AllocationIdSource};

/// Replace an allocation with a different-dated candidate for the same
/// (field, crop), preferring candidates of matching area and nearby starts.
pub struct PeriodReplace;

impl NeighborOperation for PeriodReplace {
    fn name(&self) -> &'static str {
        "period_replace"
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
        let max_alternatives = ctx.config.max_period_replace_alternatives;

        for alloc in &solution.allocations {
            let base = without(solution, &[alloc.id]);

            // Same (field, crop), different start; matching areas first,
            // then closest starts
            let mut alternatives: Vec<&acre_core::AllocationCandidate> = ctx
                .pool
                .iter()
                .filter(|c| {
                    c.field.id == alloc.field.id
                        && c.crop.id == alloc.crop.id
                        && c.start_date != alloc.start_date
                })
                .collect();
            alternatives.sort_by_key(|c| {
                (
                    (c.area_used - alloc.area_used).abs() > 1e-9,
                    (c.start_date - alloc.start_date).num_days().abs(),
                    c.start_date,
                )
            });

            let mut emitted = 0usize;
            for cand in alternatives {
                if emitted >= max_alternatives {
                    break;
                }
                let replacement = allocation_with_area(cand, cand.area_used, ids);
                if is_feasible_to_add(&base, &replacement, ctx.horizon) {
                    let mut neighbor = base.clone();
                    neighbor.allocations.push(replacement);
                    neighbors.push(neighbor);
                    emitted += 1;
                }
            }
        }

        neighbors
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::interaction::InteractionMatrix;
    use crate::request::{Objective, OptimizationConfig};
    use crate::solution_ops::adopt_candidate;
    use acre_core::PlanningHorizon;

    #[test]
    fn emits_bounded_alternatives_for_same_field_crop() {
        let f1 = field("f1", 100.0, 7);
        let c1 = crop("c1", &[]);
        let pool: Vec<_> = (0..8)
            .map(|i| candidate(&f1, &c1, date(4, 1 + i * 3), 10, 80.0))
            .collect();
        let mut ids = AllocationIdSource::new();
        let solution = Solution::new(vec![adopt_candidate(&pool[0], &mut ids)]);
        let horizon = PlanningHorizon::new(date(4, 1), date(9, 30)).unwrap();
        let matrix = InteractionMatrix::default();
        let config = OptimizationConfig {
            max_period_replace_alternatives: 3,
            ..Default::default()
        };
        let ctx = NeighborContext {
            pool: &pool,
            horizon: &horizon,
            matrix: &matrix,
            config: &config,
            objective: Objective::MaximizeProfit,
        };

        let neighbors = PeriodReplace.generate(&solution, &ctx, &mut ids);
        assert_eq!(neighbors.len(), 3);
        for neighbor in &neighbors {
            assert_eq!(neighbor.len(), 1);
            assert_ne!(neighbor.allocations[0].start_date, date(4, 1));
        }
    }
}
