//! Area adjustment: scale an allocation's cultivated area by configured
//! multipliers.

use acre_core::plan::AREA_EPSILON;
use acre_core::Solution;

use super::{NeighborContext, NeighborOperation};
use crate::solution_ops::AllocationIdSource;

/// Scale `area_used` by each configured multiplier, clamped to the field's
/// capacity. Time placement never changes, so feasibility reduces to the
/// area bounds.
pub struct AreaAdjust;

impl NeighborOperation for AreaAdjust {
    fn name(&self) -> &'static str {
        "area_adjust"
    }

    fn generate(
        &self,
        solution: &Solution,
        ctx: &NeighborContext<'_>,
        _ids: &mut AllocationIdSource,
    ) -> Vec<Solution> {
        let mut neighbors = Vec::new();

        for (index, alloc) in solution.allocations.iter().enumerate() {
            for &multiplier in &ctx.config.area_adjustment_multipliers {
                let mut area = alloc.area_used * multiplier;
                // Capacity clamp; the revenue-implied area cap is reapplied
                // through the revenue cap at rescoring
                area = area.min(alloc.field.area);
                if area <= AREA_EPSILON || (area - alloc.area_used).abs() < AREA_EPSILON {
                    continue;
                }

                let scale = area / alloc.area_used;
                let mut adjusted = alloc.clone();
                adjusted.area_used = area;
                adjusted.base_revenue = alloc.base_revenue * scale;
                if let Some(cap) = alloc.crop.max_revenue {
                    adjusted.base_revenue = adjusted.base_revenue.min(cap);
                }
                adjusted.revenue = adjusted.base_revenue;
                adjusted.profit = adjusted.revenue - adjusted.cost;

                let mut neighbor = solution.clone();
                neighbor.allocations[index] = adjusted;
                neighbors.push(neighbor);
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
    fn scales_area_within_capacity() {
        let f1 = field("f1", 100.0, 7);
        let c1 = crop("c1", &[]);
        let pool = vec![candidate(&f1, &c1, date(4, 1), 10, 90.0)];
        let mut ids = AllocationIdSource::new();
        let solution = Solution::new(vec![adopt_candidate(&pool[0], &mut ids)]);
        let horizon = PlanningHorizon::new(date(4, 1), date(9, 30)).unwrap();
        let matrix = InteractionMatrix::default();
        let config = OptimizationConfig {
            area_adjustment_multipliers: vec![0.5, 1.2],
            ..Default::default()
        };
        let ctx = NeighborContext {
            pool: &pool,
            horizon: &horizon,
            matrix: &matrix,
            config: &config,
            objective: Objective::MaximizeProfit,
        };

        let neighbors = AreaAdjust.generate(&solution, &ctx, &mut ids);
        assert_eq!(neighbors.len(), 2);

        let areas: Vec<f64> = neighbors
            .iter()
            .map(|n| n.allocations[0].area_used)
            .collect();
        // 90 × 0.5 = 45; 90 × 1.2 = 108 clamped to the 100 m² field
        assert!((areas[0] - 45.0).abs() < 1e-9);
        assert!((areas[1] - 100.0).abs() < 1e-9);

        // Revenue scales with area
        assert!((neighbors[0].allocations[0].base_revenue - 450.0).abs() < 1e-9);
    }

    #[test]
    fn no_neighbor_when_multiplier_is_identity_after_clamp() {
        let f1 = field("f1", 100.0, 7);
        let c1 = crop("c1", &[]);
        let pool = vec![candidate(&f1, &c1, date(4, 1), 10, 100.0)];
        let mut ids = AllocationIdSource::new();
        let solution = Solution::new(vec![adopt_candidate(&pool[0], &mut ids)]);
        let horizon = PlanningHorizon::new(date(4, 1), date(9, 30)).unwrap();
        let matrix = InteractionMatrix::default();
        let config = OptimizationConfig {
            area_adjustment_multipliers: vec![1.2],
            ..Default::default()
        };
        let ctx = NeighborContext {
            pool: &pool,
            horizon: &horizon,
            matrix: &matrix,
            config: &config,
            objective: Objective::MaximizeProfit,
        };

        // Scaling 100 up clamps back to 100: no change, no neighbor
        let neighbors = AreaAdjust.generate(&solution, &ctx, &mut ids);
        assert!(neighbors.is_empty());
    }
}
