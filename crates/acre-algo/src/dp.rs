//! Per-field selection by dynamic programming.
//!
//! Weighted interval scheduling over one field's candidates, extended so the
//! value of adopting a candidate depends on its immediate predecessor: the
//! arc value applies the interaction impact between the predecessor's and
//! successor's crop groups and the soil-recovery bonus for the fallow gap,
//! clamped by the successor's revenue cap. Because interaction and recovery
//! reach back exactly one allocation, chains have the Markov property and
//! the DP is exact for a single field over the given pool.

use std::sync::Arc;

use acre_core::{AllocationCandidate, Field};

use crate::interaction::{soil_recovery_factor, InteractionMatrix};
use crate::request::Objective;
use crate::solution_ops::{adopt_candidate, AllocationIdSource};

/// The DP's answer for one field.
#[derive(Debug, Clone)]
pub struct FieldPlan {
    /// Chosen candidates in chronological order
    pub selected: Vec<AllocationCandidate>,
    /// Total objective score of the chain
    pub value: f64,
}

impl FieldPlan {
    pub fn empty() -> Self {
        Self {
            selected: Vec::new(),
            value: 0.0,
        }
    }
}

/// Candidate revenue when it follows `predecessor` (or starts the field),
/// after interaction, soil recovery, and the revenue cap.
fn adjusted_revenue(
    candidate: &AllocationCandidate,
    predecessor: Option<&AllocationCandidate>,
    matrix: &InteractionMatrix,
) -> f64 {
    let mut revenue = candidate.revenue;
    if let Some(pred) = predecessor {
        let gap = (candidate.start_date - pred.completion_date).num_days();
        revenue *= matrix.impact(&pred.crop.groups, &candidate.crop.groups)
            * soil_recovery_factor(gap);
    }
    match candidate.crop.max_revenue {
        Some(cap) => revenue.min(cap),
        None => revenue,
    }
}

/// Select the maximum-score non-overlapping chain of candidates for one
/// field.
///
/// `pool` must contain only candidates for `field`; order does not matter.
/// Forbidden successions (interaction impact of exactly zero) are never
/// chained. An empty selection is always admissible, so the returned value
/// is never negative for the profit objective.
pub fn select_field_plan(
    field: &Arc<Field>,
    pool: &[AllocationCandidate],
    matrix: &InteractionMatrix,
    objective: Objective,
) -> FieldPlan {
    if pool.is_empty() {
        return FieldPlan::empty();
    }

    // Sort by completion, ties by earlier start, then input order
    let mut order: Vec<usize> = (0..pool.len()).collect();
    order.sort_by_key(|&i| (pool[i].completion_date, pool[i].start_date, i));

    let fallow = field.fallow_period_days;

    // ending[j]: best chain score with the j-th (sorted) candidate last
    let mut ending = vec![f64::NEG_INFINITY; order.len()];
    let mut pred: Vec<Option<usize>> = vec![None; order.len()];

    for j in 0..order.len() {
        let cand = &pool[order[j]];

        // Start the field with this candidate
        let solo_revenue = adjusted_revenue(cand, None, matrix);
        let mut best = objective.score(solo_revenue - cand.cost, cand.cost);
        let mut best_pred = None;

        for i in 0..j {
            let prev = &pool[order[i]];
            // Chains require exclusive occupation, so the turnover day is
            // never shared even with a zero fallow period
            if acre_core::plan::fallow_conflict(
                prev.start_date,
                prev.completion_date,
                cand.start_date,
                cand.completion_date,
                fallow,
            ) || prev.completion_date >= cand.start_date
            {
                continue;
            }
            if matrix.forbids(&prev.crop.groups, &cand.crop.groups) {
                continue;
            }
            let revenue = adjusted_revenue(cand, Some(prev), matrix);
            let arc = ending[i] + objective.score(revenue - cand.cost, cand.cost);
            if arc > best {
                best = arc;
                best_pred = Some(i);
            }
        }

        ending[j] = best;
        pred[j] = best_pred;
    }

    // Best chain overall; the empty plan scores zero
    let mut best_end: Option<usize> = None;
    let mut best_value = 0.0;
    for (j, &value) in ending.iter().enumerate() {
        if value > best_value {
            best_value = value;
            best_end = Some(j);
        }
    }

    let mut chain = Vec::new();
    let mut cursor = best_end;
    while let Some(j) = cursor {
        chain.push(pool[order[j]].clone());
        cursor = pred[j];
    }
    chain.reverse();

    FieldPlan {
        selected: chain,
        value: best_value,
    }
}

/// Adopt a field plan's candidates into allocations, preserving order.
pub fn adopt_field_plan(
    plan: &FieldPlan,
    ids: &mut AllocationIdSource,
) -> Vec<acre_core::CropAllocation> {
    plan.selected
        .iter()
        .map(|c| adopt_candidate(c, ids))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use acre_core::{Crop, CropId, FieldId, InteractionRule, RuleKind};
    use chrono::NaiveDate;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn field(fallow: u32) -> Arc<Field> {
        Arc::new(Field::new(FieldId::new("f1"), "Field 1", 100.0, 5.0).with_fallow_period(fallow))
    }

    fn crop(id: &str, groups: &[&str], cap: Option<f64>) -> Arc<Crop> {
        let mut c = Crop::new(CropId::new(id), id, 1.0).with_revenue_per_area(10.0);
        c.max_revenue = cap;
        c.groups = groups.iter().map(|s| s.to_string()).collect();
        Arc::new(c)
    }

    fn candidate(
        field: &Arc<Field>,
        crop: &Arc<Crop>,
        start: NaiveDate,
        end: NaiveDate,
        revenue: f64,
    ) -> AllocationCandidate {
        let growth_days = (end - start).num_days() as u32 + 1;
        let cost = growth_days as f64 * field.daily_fixed_cost;
        AllocationCandidate {
            field: Arc::clone(field),
            crop: Arc::clone(crop),
            start_date: start,
            completion_date: end,
            growth_days,
            accumulated_gdd: 60.0,
            area_used: 100.0,
            cost,
            revenue,
            profit: revenue - cost,
        }
    }

    #[test]
    fn picks_the_single_best_when_all_conflict() {
        let f = field(7);
        let c = crop("c1", &[], None);
        let pool = vec![
            candidate(&f, &c, date(4, 1), date(4, 10), 500.0),
            candidate(&f, &c, date(4, 5), date(4, 14), 800.0),
            candidate(&f, &c, date(4, 8), date(4, 17), 600.0),
        ];
        let plan = select_field_plan(&f, &pool, &InteractionMatrix::default(), Objective::MaximizeProfit);
        assert_eq!(plan.selected.len(), 1);
        assert_eq!(plan.selected[0].start_date, date(4, 5));
        assert!((plan.value - (800.0 - 50.0)).abs() < 1e-9);
    }

    #[test]
    fn chains_sequential_runs_across_fallow() {
        let f = field(7);
        let c = crop("c1", &[], None);
        // Second run starts exactly at completion + fallow
        let pool = vec![
            candidate(&f, &c, date(4, 1), date(4, 10), 500.0),
            candidate(&f, &c, date(4, 17), date(4, 26), 500.0),
        ];
        let plan = select_field_plan(&f, &pool, &InteractionMatrix::default(), Objective::MaximizeProfit);
        assert_eq!(plan.selected.len(), 2);
        assert!((plan.value - 2.0 * (500.0 - 50.0)).abs() < 1e-9);
    }

    #[test]
    fn respects_fallow_when_chaining() {
        let f = field(7);
        let c = crop("c1", &[], None);
        // Second run starts 4 days after completion: inside the rest window
        let pool = vec![
            candidate(&f, &c, date(4, 1), date(4, 10), 500.0),
            candidate(&f, &c, date(4, 14), date(4, 23), 500.0),
        ];
        let plan = select_field_plan(&f, &pool, &InteractionMatrix::default(), Objective::MaximizeProfit);
        assert_eq!(plan.selected.len(), 1);
    }

    #[test]
    fn empty_plan_beats_losses() {
        let f = field(0);
        let c = crop("c1", &[], None);
        // Revenue below cost everywhere
        let pool = vec![
            candidate(&f, &c, date(4, 1), date(4, 10), 10.0),
            candidate(&f, &c, date(5, 1), date(5, 10), 20.0),
        ];
        let plan = select_field_plan(&f, &pool, &InteractionMatrix::default(), Objective::MaximizeProfit);
        assert!(plan.selected.is_empty());
        assert_eq!(plan.value, 0.0);
    }

    #[test]
    fn interaction_penalty_steers_the_chain() {
        let f = field(0);
        let tomato = crop("tomato", &["Solanaceae"], None);
        let beans = crop("beans", &["Fabaceae"], None);
        let matrix = InteractionMatrix::new(vec![InteractionRule::new(
            "r1",
            RuleKind::ContinuousCultivation,
            "Solanaceae",
            "Solanaceae",
            0.1,
            true,
        )]);
        // Successor slot: tomato pays 600 but penalized to 60 after tomato;
        // beans pay a flat 500
        let pool = vec![
            candidate(&f, &tomato, date(4, 1), date(4, 10), 600.0),
            candidate(&f, &tomato, date(4, 11), date(4, 20), 600.0),
            candidate(&f, &beans, date(4, 11), date(4, 20), 500.0),
        ];
        let plan = select_field_plan(&f, &pool, &matrix, Objective::MaximizeProfit);
        assert_eq!(plan.selected.len(), 2);
        assert_eq!(plan.selected[1].crop.id, CropId::new("beans"));
    }

    #[test]
    fn forbidden_succession_is_never_chained() {
        let f = field(0);
        let a = crop("a", &["A"], None);
        let b = crop("b", &["B"], None);
        let matrix = InteractionMatrix::new(vec![InteractionRule::new(
            "r1",
            RuleKind::Allelopathy,
            "A",
            "B",
            0.0,
            true,
        )]);
        let pool = vec![
            candidate(&f, &a, date(4, 1), date(4, 10), 500.0),
            candidate(&f, &b, date(4, 11), date(4, 20), 500.0),
        ];
        let plan = select_field_plan(&f, &pool, &matrix, Objective::MaximizeProfit);
        // Either alone is fine; chaining them is not
        assert_eq!(plan.selected.len(), 1);
    }

    #[test]
    fn soil_recovery_rewards_longer_gaps() {
        let f = field(7);
        let c = crop("c1", &[], None);
        let pool = vec![
            candidate(&f, &c, date(4, 1), date(4, 10), 500.0),
            candidate(&f, &c, date(4, 20), date(4, 29), 500.0),
            candidate(&f, &c, date(6, 10), date(6, 19), 500.0),
        ];
        let plan = select_field_plan(&f, &pool, &InteractionMatrix::default(), Objective::MaximizeProfit);
        assert_eq!(plan.selected.len(), 3);
        // Gap Apr 10 -> Apr 20 is 10 days (no bonus); gap Apr 29 -> Jun 10
        // is 42 days (bonus applies)
        let expected = (500.0 - 50.0)
            + (500.0 - 50.0)
            + (500.0 * soil_recovery_factor(42) - 50.0);
        assert!((plan.value - expected).abs() < 1e-6);
    }

    #[test]
    fn minimize_cost_prefers_empty() {
        let f = field(0);
        let c = crop("c1", &[], None);
        let pool = vec![candidate(&f, &c, date(4, 1), date(4, 10), 500.0)];
        let plan = select_field_plan(&f, &pool, &InteractionMatrix::default(), Objective::MinimizeCost);
        // Every planting costs something; minimizing cost plants nothing
        assert!(plan.selected.is_empty());
    }
}
