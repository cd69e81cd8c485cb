//! Field-level neighbor operators: swap, move, replace, remove.

use acre_core::Solution;

use super::{
    allocation_with_area, committed_area_excluding, nearest_candidates, without, NeighborContext,
    NeighborOperation, NEAREST_CANDIDATE_LIMIT,
};
use crate::solution_ops::{is_feasible_to_add, AllocationIdSource};

/// Neighbors emitted per allocation by field_replace.
const REPLACE_LIMIT: usize = 5;

/// Swap two allocations between different fields, re-homing each side onto
/// the nearest-start pool candidate for its new field. Both sides keep
/// their cultivated area, so the law "sum of area over the swapped pair is
/// preserved" holds by construction.
pub struct FieldSwap;

impl NeighborOperation for FieldSwap {
    fn name(&self) -> &'static str {
        "field_swap"
    }

    fn default_weight(&self) -> f64 {
        0.3
    }

    fn generate(
        &self,
        solution: &Solution,
        ctx: &NeighborContext<'_>,
        ids: &mut AllocationIdSource,
    ) -> Vec<Solution> {
        let mut neighbors = Vec::new();

        for i in 0..solution.allocations.len() {
            for j in (i + 1)..solution.allocations.len() {
                let a = &solution.allocations[i];
                let b = &solution.allocations[j];
                if a.field.id == b.field.id {
                    continue;
                }

                // Conservative capacity screen before touching the pool
                let exclude = [a.id, b.id];
                let free_in_a =
                    a.field.area - committed_area_excluding(solution, &a.field.id, &exclude);
                let free_in_b =
                    b.field.area - committed_area_excluding(solution, &b.field.id, &exclude);
                if b.area_used > free_in_a || a.area_used > free_in_b {
                    continue;
                }

                let cands_for_a = nearest_candidates(
                    ctx,
                    &b.field.id,
                    &a.crop.id,
                    a.start_date,
                    NEAREST_CANDIDATE_LIMIT,
                );
                let cands_for_b = nearest_candidates(
                    ctx,
                    &a.field.id,
                    &b.crop.id,
                    b.start_date,
                    NEAREST_CANDIDATE_LIMIT,
                );

                let base = without(solution, &exclude);
                'pairs: for ca in &cands_for_a {
                    let new_a = allocation_with_area(ca, a.area_used, ids);
                    if !is_feasible_to_add(&base, &new_a, ctx.horizon) {
                        continue;
                    }
                    let mut with_a = base.clone();
                    with_a.allocations.push(new_a);
                    for cb in &cands_for_b {
                        let new_b = allocation_with_area(cb, b.area_used, ids);
                        if !is_feasible_to_add(&with_a, &new_b, ctx.horizon) {
                            continue;
                        }
                        let mut neighbor = with_a.clone();
                        neighbor.allocations.push(new_b);
                        neighbors.push(neighbor);
                        break 'pairs; // one neighbor per pair
                    }
                }
            }
        }

        neighbors
    }
}

/// Move one allocation to a different field, keeping its crop and
/// approximate start date (nearest pool candidate on the target field).
pub struct FieldMove;

impl NeighborOperation for FieldMove {
    fn name(&self) -> &'static str {
        "field_move"
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

        // Distinct target fields, in pool (sorted) order
        let mut field_ids = Vec::new();
        for c in ctx.pool {
            if !field_ids.contains(&c.field.id) {
                field_ids.push(c.field.id.clone());
            }
        }

        for alloc in &solution.allocations {
            let base = without(solution, &[alloc.id]);
            for target in field_ids.iter().filter(|f| **f != alloc.field.id) {
                let candidates = nearest_candidates(
                    ctx,
                    target,
                    &alloc.crop.id,
                    alloc.start_date,
                    NEAREST_CANDIDATE_LIMIT,
                );
                for cand in candidates {
                    let moved = allocation_with_area(cand, alloc.area_used, ids);
                    if is_feasible_to_add(&base, &moved, ctx.horizon) {
                        let mut neighbor = base.clone();
                        neighbor.allocations.push(moved);
                        neighbors.push(neighbor);
                        break; // nearest feasible per target field
                    }
                }
            }
        }

        neighbors
    }
}

/// Replace an allocation with a different pool candidate for the same
/// field (different crop, period, or area).
pub struct FieldReplace;

impl NeighborOperation for FieldReplace {
    fn name(&self) -> &'static str {
        "field_replace"
    }

    fn generate(
        &self,
        solution: &Solution,
        ctx: &NeighborContext<'_>,
        ids: &mut AllocationIdSource,
    ) -> Vec<Solution> {
        let mut neighbors = Vec::new();

        for alloc in &solution.allocations {
            let base = without(solution, &[alloc.id]);
            let mut emitted = 0usize;
            for cand in ctx.pool.iter().filter(|c| c.field.id == alloc.field.id) {
                let same = cand.crop.id == alloc.crop.id
                    && cand.start_date == alloc.start_date
                    && (cand.area_used - alloc.area_used).abs() < 1e-9;
                if same {
                    continue;
                }
                let replacement = allocation_with_area(cand, cand.area_used, ids);
                if is_feasible_to_add(&base, &replacement, ctx.horizon) {
                    let mut neighbor = base.clone();
                    neighbor.allocations.push(replacement);
                    neighbors.push(neighbor);
                    emitted += 1;
                    if emitted >= REPLACE_LIMIT {
                        break;
                    }
                }
            }
        }

        neighbors
    }
}

/// Drop one allocation.
pub struct FieldRemove;

impl NeighborOperation for FieldRemove {
    fn name(&self) -> &'static str {
        "field_remove"
    }

    fn generate(
        &self,
        solution: &Solution,
        _ctx: &NeighborContext<'_>,
        _ids: &mut AllocationIdSource,
    ) -> Vec<Solution> {
        solution
            .allocations
            .iter()
            .map(|alloc| without(solution, &[alloc.id]))
            .collect()
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

    struct Fixture {
        pool: Vec<acre_core::AllocationCandidate>,
        horizon: PlanningHorizon,
        matrix: InteractionMatrix,
        config: OptimizationConfig,
    }

    impl Fixture {
        fn ctx(&self) -> NeighborContext<'_> {
            NeighborContext {
                pool: &self.pool,
                horizon: &self.horizon,
                matrix: &self.matrix,
                config: &self.config,
                objective: Objective::MaximizeProfit,
            }
        }
    }

    fn two_field_fixture() -> (Fixture, Solution) {
        let f1 = field("f1", 100.0, 7);
        let f2 = field("f2", 100.0, 7);
        let c1 = crop("c1", &[]);
        let c2 = crop("c2", &[]);

        // Pool covers both crops on both fields around the same dates
        let pool = vec![
            candidate(&f1, &c1, date(4, 1), 10, 80.0),
            candidate(&f1, &c2, date(4, 2), 10, 60.0),
            candidate(&f2, &c1, date(4, 3), 10, 80.0),
            candidate(&f2, &c2, date(4, 1), 10, 60.0),
        ];

        let mut ids = AllocationIdSource::new();
        let solution = Solution::new(vec![
            adopt_candidate(&pool[0], &mut ids), // c1 on f1
            adopt_candidate(&pool[3], &mut ids), // c2 on f2
        ]);

        (
            Fixture {
                pool,
                horizon: PlanningHorizon::new(date(4, 1), date(9, 30)).unwrap(),
                matrix: InteractionMatrix::default(),
                config: OptimizationConfig::default(),
            },
            solution,
        )
    }

    #[test]
    fn swap_preserves_total_area_of_the_pair() {
        let (fixture, solution) = two_field_fixture();
        let mut ids = AllocationIdSource::new();
        let neighbors = FieldSwap.generate(&solution, &fixture.ctx(), &mut ids);
        assert!(!neighbors.is_empty());

        let before: f64 = solution.allocations.iter().map(|a| a.area_used).sum();
        for neighbor in &neighbors {
            let after: f64 = neighbor.allocations.iter().map(|a| a.area_used).sum();
            assert!((after - before).abs() < 1e-9);
            assert_eq!(neighbor.len(), 2);
            // Crops actually changed fields
            let c1_field = &neighbor
                .allocations
                .iter()
                .find(|a| a.crop.id == acre_core::CropId::new("c1"))
                .unwrap()
                .field
                .id;
            assert_eq!(c1_field, &acre_core::FieldId::new("f2"));
        }
    }

    #[test]
    fn swap_skips_same_field_pairs() {
        let f1 = field("f1", 100.0, 7);
        let c1 = crop("c1", &[]);
        let pool = vec![
            candidate(&f1, &c1, date(4, 1), 10, 40.0),
            candidate(&f1, &c1, date(5, 1), 10, 40.0),
        ];
        let mut ids = AllocationIdSource::new();
        let solution = Solution::new(vec![
            adopt_candidate(&pool[0], &mut ids),
            adopt_candidate(&pool[1], &mut ids),
        ]);
        let fixture = Fixture {
            pool,
            horizon: PlanningHorizon::new(date(4, 1), date(9, 30)).unwrap(),
            matrix: InteractionMatrix::default(),
            config: OptimizationConfig::default(),
        };
        let neighbors = FieldSwap.generate(&solution, &fixture.ctx(), &mut ids);
        assert!(neighbors.is_empty());
    }

    #[test]
    fn move_relocates_keeping_crop_and_area() {
        let (fixture, solution) = two_field_fixture();
        let mut ids = AllocationIdSource::new();
        let neighbors = FieldMove.generate(&solution, &fixture.ctx(), &mut ids);
        assert!(!neighbors.is_empty());
        for neighbor in &neighbors {
            assert_eq!(neighbor.len(), 2);
            // Same multiset of (crop, area); fields may differ
            let mut crops_before: Vec<_> = solution
                .allocations
                .iter()
                .map(|a| (a.crop.id.clone(), (a.area_used * 1e6) as i64))
                .collect();
            let mut crops_after: Vec<_> = neighbor
                .allocations
                .iter()
                .map(|a| (a.crop.id.clone(), (a.area_used * 1e6) as i64))
                .collect();
            crops_before.sort();
            crops_after.sort();
            assert_eq!(crops_before, crops_after);
        }
    }

    #[test]
    fn replace_emits_different_candidates_on_same_field() {
        let (fixture, solution) = two_field_fixture();
        let mut ids = AllocationIdSource::new();
        let neighbors = FieldReplace.generate(&solution, &fixture.ctx(), &mut ids);
        assert!(!neighbors.is_empty());
        for neighbor in &neighbors {
            assert_eq!(neighbor.len(), 2);
        }
    }

    #[test]
    fn remove_emits_one_neighbor_per_allocation() {
        let (fixture, solution) = two_field_fixture();
        let mut ids = AllocationIdSource::new();
        let neighbors = FieldRemove.generate(&solution, &fixture.ctx(), &mut ids);
        assert_eq!(neighbors.len(), 2);
        assert!(neighbors.iter().all(|n| n.len() == 1));
    }
}
