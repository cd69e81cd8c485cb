//! Adaptive Large Neighborhood Search.
//!
//! Alternates stochastic destroy and repair operators under a simulated
//! annealing acceptance criterion, learning operator weights online:
//! operators that produce improvements are selected more often, with a
//! periodic soft reset so exploration never dies out entirely.
//!
//! Every random draw (operator selection, removal choices, acceptance)
//! comes from one caller-owned seeded generator, so identical requests with
//! identical seeds replay identically.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use acre_core::{CropAllocation, Solution};

use crate::deadline::Deadline;
use crate::neighbors::NeighborContext;
use crate::solution_ops::{
    adopt_candidate, is_candidate_feasible, is_feasible_to_add, remove_allocations,
    rescore_solution, solution_score, AllocationIdSource,
};

// Simulated annealing schedule
const INITIAL_TEMPERATURE: f64 = 10_000.0;
const COOLING_RATE: f64 = 0.99;
const MIN_TEMPERATURE: f64 = 1.0;

// Adaptive weight schedule
const WEIGHT_DECAY: f64 = 0.99;
const WEIGHT_RESET_PERIOD: usize = 100;
/// Improvement above which an operator pair earns the middle reward; twice
/// this earns the top reward.
const REWARD_THRESHOLD: f64 = 1.0;

/// Half-width of the window removed around the median start date (days).
const TIME_SLICE_WINDOW_DAYS: i64 = 90;
/// Pool insertions attempted by the candidate_insert repair.
const CANDIDATE_INSERT_LIMIT: usize = 50;

const DESTROY_NAMES: [&str; 5] = [
    "random_removal",
    "worst_removal",
    "related_removal",
    "field_removal",
    "time_slice_removal",
];
const REPAIR_NAMES: [&str; 3] = ["greedy_insert", "regret_insert", "candidate_insert"];

/// Per-operator performance record backing the adaptive weights.
#[derive(Debug, Clone)]
#[allow(dead_code)] // counters are kept for operator statistics inspection
struct OperatorPerformance {
    name: &'static str,
    weight: f64,
    usage_count: usize,
    success_count: usize,
    total_improvement: f64,
}

impl OperatorPerformance {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            weight: 1.0,
            usage_count: 0,
            success_count: 0,
            total_improvement: 0.0,
        }
    }
}

/// Roulette-wheel operator selection over decaying weights.
#[derive(Debug, Clone)]
struct AdaptiveWeights {
    operators: Vec<OperatorPerformance>,
}

impl AdaptiveWeights {
    fn new(names: &[&'static str]) -> Self {
        Self {
            operators: names
                .iter()
                .map(|&name| OperatorPerformance::new(name))
                .collect(),
        }
    }

    fn select(&self, rng: &mut StdRng) -> usize {
        let total: f64 = self.operators.iter().map(|op| op.weight).sum();
        if total <= 0.0 {
            return rng.gen_range(0..self.operators.len());
        }
        let r = rng.gen_range(0.0..total);
        let mut cumulative = 0.0;
        for (index, op) in self.operators.iter().enumerate() {
            cumulative += op.weight;
            if cumulative >= r {
                return index;
            }
        }
        self.operators.len() - 1
    }

    fn update(&mut self, index: usize, improvement: f64) {
        let op = &mut self.operators[index];
        op.usage_count += 1;
        let reward = if improvement > 2.0 * REWARD_THRESHOLD {
            op.success_count += 1;
            op.total_improvement += improvement;
            10.0
        } else if improvement > REWARD_THRESHOLD {
            op.success_count += 1;
            op.total_improvement += improvement;
            5.0
        } else {
            1.0
        };
        op.weight = op.weight * WEIGHT_DECAY + reward;
    }

    /// Soft reset toward neutral, keeping half the learned signal
    fn reset_periodically(&mut self, iteration: usize) {
        if iteration % WEIGHT_RESET_PERIOD == 0 {
            for op in &mut self.operators {
                op.weight = 0.5 * op.weight + 0.5;
            }
        }
    }

    #[cfg(test)]
    fn weight_of(&self, name: &str) -> f64 {
        self.operators
            .iter()
            .find(|op| op.name == name)
            .map(|op| op.weight)
            .unwrap_or(0.0)
    }
}

/// Run ALNS from `initial`, returning the best solution found.
pub fn alns_optimize(
    initial: Solution,
    ctx: &NeighborContext<'_>,
    ids: &mut AllocationIdSource,
    rng: &mut StdRng,
    deadline: &Deadline,
) -> Solution {
    let mut current = initial;
    rescore_solution(&mut current, ctx.matrix);
    let mut current_score = solution_score(&current, ctx.objective);

    let mut best = current.clone();
    let mut best_score = current_score;

    let mut destroy_weights = AdaptiveWeights::new(&DESTROY_NAMES);
    let mut repair_weights = AdaptiveWeights::new(&REPAIR_NAMES);

    let mut temperature = INITIAL_TEMPERATURE;
    let removal_rate = ctx.config.alns_removal_rate;

    for iteration in 0..ctx.config.alns_iterations {
        if deadline.expired() {
            break;
        }

        let destroy_index = destroy_weights.select(rng);
        let repair_index = repair_weights.select(rng);

        let (partial, removed) = destroy(destroy_index, &current, removal_rate, rng);
        let mut candidate = repair(repair_index, partial, removed, ctx, ids);

        rescore_solution(&mut candidate, ctx.matrix);
        let candidate_score = solution_score(&candidate, ctx.objective);
        let delta = candidate_score - current_score;

        let accept = delta > 0.0
            || (temperature > MIN_TEMPERATURE && rng.gen::<f64>() < (delta / temperature).exp());
        if accept {
            current = candidate;
            current_score = candidate_score;
            if current_score > best_score {
                best = current.clone();
                best_score = current_score;
            }
        }

        destroy_weights.update(destroy_index, delta);
        repair_weights.update(repair_index, delta);
        destroy_weights.reset_periodically(iteration);
        repair_weights.reset_periodically(iteration);

        temperature = (temperature * COOLING_RATE).max(MIN_TEMPERATURE);
    }

    best
}

// ===== Destroy operators =====

fn destroy(
    index: usize,
    solution: &Solution,
    removal_rate: f64,
    rng: &mut StdRng,
) -> (Solution, Vec<CropAllocation>) {
    match index {
        0 => random_removal(solution, removal_rate, rng),
        1 => worst_removal(solution, removal_rate),
        2 => related_removal(solution, removal_rate, rng),
        3 => field_removal(solution, rng),
        _ => time_slice_removal(solution, rng),
    }
}

fn removal_count(len: usize, rate: f64) -> usize {
    ((len as f64 * rate) as usize).max(1).min(len)
}

fn split(solution: &Solution, removed: Vec<CropAllocation>) -> (Solution, Vec<CropAllocation>) {
    (remove_allocations(solution, &removed), removed)
}

fn random_removal(
    solution: &Solution,
    rate: f64,
    rng: &mut StdRng,
) -> (Solution, Vec<CropAllocation>) {
    if solution.is_empty() {
        return (Solution::default(), Vec::new());
    }
    let mut indices: Vec<usize> = (0..solution.len()).collect();
    indices.shuffle(rng);
    indices.truncate(removal_count(solution.len(), rate));
    let removed: Vec<CropAllocation> = indices
        .iter()
        .map(|&i| solution.allocations[i].clone())
        .collect();
    split(solution, removed)
}

fn worst_removal(solution: &Solution, rate: f64) -> (Solution, Vec<CropAllocation>) {
    if solution.is_empty() {
        return (Solution::default(), Vec::new());
    }
    let mut order: Vec<usize> = (0..solution.len()).collect();
    order.sort_by(|&a, &b| {
        solution.allocations[a]
            .profit_rate()
            .partial_cmp(&solution.allocations[b].profit_rate())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });
    let removed: Vec<CropAllocation> = order
        .iter()
        .take(removal_count(solution.len(), rate))
        .map(|&i| solution.allocations[i].clone())
        .collect();
    split(solution, removed)
}

/// Relatedness of two allocations: same field 0.5, temporal proximity up to
/// 0.3 (normalized over a year), same crop 0.2.
fn relatedness(a: &CropAllocation, b: &CropAllocation) -> f64 {
    let mut score = 0.0;
    if a.field.id == b.field.id {
        score += 0.5;
    }
    let day_gap = (a.start_date - b.start_date).num_days().abs() as f64;
    score += 0.3 * (1.0 - day_gap / 365.0).max(0.0);
    if a.crop.id == b.crop.id {
        score += 0.2;
    }
    score
}

fn related_removal(
    solution: &Solution,
    rate: f64,
    rng: &mut StdRng,
) -> (Solution, Vec<CropAllocation>) {
    if solution.is_empty() {
        return (Solution::default(), Vec::new());
    }
    let seed_index = rng.gen_range(0..solution.len());
    let seed = solution.allocations[seed_index].clone();

    let mut order: Vec<usize> = (0..solution.len()).collect();
    order.sort_by(|&a, &b| {
        relatedness(&seed, &solution.allocations[b])
            .partial_cmp(&relatedness(&seed, &solution.allocations[a]))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });
    let removed: Vec<CropAllocation> = order
        .iter()
        .take(removal_count(solution.len(), rate))
        .map(|&i| solution.allocations[i].clone())
        .collect();
    split(solution, removed)
}

fn field_removal(solution: &Solution, rng: &mut StdRng) -> (Solution, Vec<CropAllocation>) {
    if solution.is_empty() {
        return (Solution::default(), Vec::new());
    }
    let mut field_ids: Vec<_> = Vec::new();
    for a in &solution.allocations {
        if !field_ids.contains(&a.field.id) {
            field_ids.push(a.field.id.clone());
        }
    }
    let target = &field_ids[rng.gen_range(0..field_ids.len())];
    let removed: Vec<CropAllocation> = solution
        .allocations
        .iter()
        .filter(|a| &a.field.id == target)
        .cloned()
        .collect();
    split(solution, removed)
}

fn time_slice_removal(solution: &Solution, rng: &mut StdRng) -> (Solution, Vec<CropAllocation>) {
    if solution.is_empty() {
        return (Solution::default(), Vec::new());
    }
    let mut starts: Vec<_> = solution.allocations.iter().map(|a| a.start_date).collect();
    starts.sort();
    let median = starts[starts.len() / 2];

    let mut removed: Vec<CropAllocation> = solution
        .allocations
        .iter()
        .filter(|a| (a.start_date - median).num_days().abs() < TIME_SLICE_WINDOW_DAYS)
        .cloned()
        .collect();
    if removed.is_empty() {
        let index = rng.gen_range(0..solution.len());
        removed.push(solution.allocations[index].clone());
    }
    split(solution, removed)
}

// ===== Repair operators =====

fn repair(
    index: usize,
    partial: Solution,
    removed: Vec<CropAllocation>,
    ctx: &NeighborContext<'_>,
    ids: &mut AllocationIdSource,
) -> Solution {
    match index {
        0 => greedy_insert(partial, removed, ctx),
        1 => regret_insert(partial, removed, ctx),
        _ => candidate_insert(partial, removed, ctx, ids),
    }
}

fn sorted_by_profit_rate_desc(mut allocations: Vec<CropAllocation>) -> Vec<CropAllocation> {
    allocations.sort_by(|a, b| {
        b.profit_rate()
            .partial_cmp(&a.profit_rate())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.id.cmp(&b.id))
    });
    allocations
}

fn greedy_insert(
    partial: Solution,
    removed: Vec<CropAllocation>,
    ctx: &NeighborContext<'_>,
) -> Solution {
    let mut current = partial;
    for alloc in sorted_by_profit_rate_desc(removed) {
        if is_feasible_to_add(&current, &alloc, ctx.horizon) {
            current.allocations.push(alloc);
        }
    }
    current
}

/// Insert the removed allocation with the largest regret first: the profit
/// lost if it is passed over for the best alternative this round.
fn regret_insert(
    partial: Solution,
    removed: Vec<CropAllocation>,
    ctx: &NeighborContext<'_>,
) -> Solution {
    let mut current = partial;
    let mut remaining = removed;

    while !remaining.is_empty() {
        let feasible: Vec<usize> = (0..remaining.len())
            .filter(|&i| is_feasible_to_add(&current, &remaining[i], ctx.horizon))
            .collect();
        if feasible.is_empty() {
            break;
        }

        let mut best_index = feasible[0];
        let mut best_regret = f64::NEG_INFINITY;
        for &i in &feasible {
            let score_i = ctx
                .objective
                .score(remaining[i].profit, remaining[i].cost);
            let best_alternative = feasible
                .iter()
                .filter(|&&j| j != i)
                .map(|&j| {
                    ctx.objective
                        .score(remaining[j].profit, remaining[j].cost)
                })
                .fold(f64::NEG_INFINITY, f64::max);
            // No alternative this round: the whole score is the regret
            let best_alternative = if best_alternative.is_finite() {
                best_alternative
            } else {
                0.0
            };
            let regret = score_i - best_alternative;
            if regret > best_regret {
                best_regret = regret;
                best_index = i;
            }
        }

        let chosen = remaining.remove(best_index);
        current.allocations.push(chosen);
    }

    current
}

/// Reinsert removed allocations greedily, then pull fresh candidates from
/// the pool (bounded) in descending profit order.
fn candidate_insert(
    partial: Solution,
    removed: Vec<CropAllocation>,
    ctx: &NeighborContext<'_>,
    ids: &mut AllocationIdSource,
) -> Solution {
    let mut current = greedy_insert(partial, removed, ctx);

    let mut pool_order: Vec<usize> = (0..ctx.pool.len()).collect();
    pool_order.sort_by(|&a, &b| {
        ctx.pool[b]
            .profit
            .partial_cmp(&ctx.pool[a].profit)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });

    let mut inserted = 0usize;
    for index in pool_order {
        if inserted >= CANDIDATE_INSERT_LIMIT {
            break;
        }
        // No profit filter here: a candidate with negative base profit can
        // still rescore positive after a rotation bonus or soil recovery
        let candidate = &ctx.pool[index];
        let already_used = current.allocations.iter().any(|a| {
            a.field.id == candidate.field.id
                && a.crop.id == candidate.crop.id
                && a.start_date == candidate.start_date
                && (a.area_used - candidate.area_used).abs() < 1e-9
        });
        if already_used {
            continue;
        }
        if is_candidate_feasible(&current, candidate, ctx.horizon) {
            current.allocations.push(adopt_candidate(candidate, ids));
            inserted += 1;
        }
    }

    current
}
