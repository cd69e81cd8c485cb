//! Hill-climbing local search over the neighbor operators.
//!
//! Each iteration enumerates neighbors from the enabled operators (or a
//! sampled subset), rescores every neighbor in full interaction context, and
//! adopts the best strictly improving one. Termination is guaranteed: the
//! objective is bounded over the finite pool and strict improvement is
//! required.

use rand::rngs::StdRng;
use rand::Rng;

use acre_core::Solution;

use crate::deadline::Deadline;
use crate::neighbors::{standard_operators, NeighborContext, NeighborOperation};
use crate::solution_ops::{rescore_solution, solution_score, AllocationIdSource};

/// Strict-improvement threshold guarding against float noise.
const IMPROVEMENT_EPSILON: f64 = 1e-9;

/// Improve `initial` by hill climbing; returns the incumbent when no
/// neighbor improves, the iteration cap is reached, or the deadline expires.
pub fn local_search(
    initial: Solution,
    ctx: &NeighborContext<'_>,
    ids: &mut AllocationIdSource,
    rng: &mut StdRng,
    deadline: &Deadline,
) -> Solution {
    let operators = standard_operators();

    let mut current = initial;
    rescore_solution(&mut current, ctx.matrix);
    let mut current_score = solution_score(&current, ctx.objective);

    for _ in 0..ctx.config.max_local_search_iterations {
        if deadline.expired() {
            break;
        }

        let active: Vec<&dyn NeighborOperation> = if ctx.config.enable_neighbor_sampling {
            sample_operators(&operators, rng)
        } else {
            operators.iter().map(|op| op.as_ref()).collect()
        };

        let mut best_neighbor: Option<Solution> = None;
        let mut best_score = current_score;

        for operator in active {
            for mut neighbor in operator.generate(&current, ctx, ids) {
                rescore_solution(&mut neighbor, ctx.matrix);
                let score = solution_score(&neighbor, ctx.objective);
                if score > best_score + IMPROVEMENT_EPSILON {
                    best_score = score;
                    best_neighbor = Some(neighbor);
                }
            }
            if deadline.expired() {
                break;
            }
        }

        match best_neighbor {
            Some(neighbor) => {
                current = neighbor;
                current_score = best_score;
            }
            None => break, // local optimum
        }
    }

    current
}

/// Pick a random non-empty subset of operators; inclusion probability rises
/// with each operator's default weight.
fn sample_operators<'a>(
    operators: &'a [Box<dyn NeighborOperation>],
    rng: &mut StdRng,
) -> Vec<&'a dyn NeighborOperation> {
    let mut chosen: Vec<&dyn NeighborOperation> = operators
        .iter()
        .filter(|op| rng.gen::<f64>() < (0.5 + op.default_weight()).min(1.0))
        .map(|op| op.as_ref())
        .collect();
    if chosen.is_empty() {
        let index = rng.gen_range(0..operators.len());
        chosen.push(operators[index].as_ref());
    }
    chosen
}
