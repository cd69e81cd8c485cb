//! Greedy initial solution: candidates accepted across fields in
//! profit-rate order.
//!
//! Faster than per-field DP and able to mix fields freely, but makes no
//! lookahead; the improvement phase is expected to repair its mistakes. Only
//! candidates whose objective score is positive are adopted (planting a
//! guaranteed loss never helps a starting point).

use acre_core::{AllocationCandidate, PlanningHorizon, Solution};

use crate::deadline::Deadline;
use crate::interaction::InteractionMatrix;
use crate::request::Objective;
use crate::solution_ops::{
    adopt_candidate, is_candidate_feasible, rescore_solution, AllocationIdSource,
};

/// Build a feasible solution by greedy insertion, then rescore it in full
/// interaction context.
pub fn build_greedy_solution(
    pool: &[AllocationCandidate],
    horizon: &PlanningHorizon,
    matrix: &InteractionMatrix,
    objective: Objective,
    ids: &mut AllocationIdSource,
    deadline: &Deadline,
) -> Solution {
    // Profit rate descending, then profit, then pool order for determinism
    let mut order: Vec<usize> = (0..pool.len()).collect();
    order.sort_by(|&a, &b| {
        pool[b]
            .profit_rate()
            .partial_cmp(&pool[a].profit_rate())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(
                pool[b]
                    .profit
                    .partial_cmp(&pool[a].profit)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
            .then(a.cmp(&b))
    });

    let mut solution = Solution::default();
    for index in order {
        if deadline.expired() {
            break;
        }
        let candidate = &pool[index];
        if objective.score(candidate.profit, candidate.cost) <= 0.0 {
            continue;
        }
        if is_candidate_feasible(&solution, candidate, horizon) {
            solution.allocations.push(adopt_candidate(candidate, ids));
        }
    }

    rescore_solution(&mut solution, matrix);
    solution
}
