//! Law-level properties: determinism, monotonicity, single-field DP
//! optimality against brute force, and operator area preservation.

use acre_algo::neighbors::{CropChange, FieldSwap, NeighborOperation};
use acre_algo::{
    optimize, select_field_plan, soil_recovery_factor, AllocationIdSource, CropSpec,
    InteractionMatrix, NeighborContext, Objective, OptimizationConfig, OptimizationRequest,
};
use acre_core::plan::fallow_conflict;
use acre_core::{
    AllocationCandidate, Crop, CropAllocation, CropId, CropProfile, DailyWeather, Field, FieldId,
    GrowthStage, InteractionRule, PlanningHorizon, RuleKind, Solution, SunshineProfile,
    TemperatureProfile, ThermalRequirement, WeatherSeries,
};
use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, d).unwrap()
}

fn steady_weather(days: u64) -> WeatherSeries {
    WeatherSeries::new(
        (0..days)
            .map(|i| {
                DailyWeather::with_temperatures(
                    date(4, 1).checked_add_days(Days::new(i)).unwrap(),
                    22.0,
                    26.0,
                    18.0,
                )
            })
            .collect(),
    )
    .unwrap()
}

fn one_stage_profile(crop: Crop, required_gdd: f64) -> CropProfile {
    CropProfile::new(
        crop,
        vec![GrowthStage {
            order: 1,
            name: "season".into(),
            temperature: TemperatureProfile::new(10.0, 20.0, 28.0, 12.0, 30.0, 2.0, 35.0),
            sunshine: SunshineProfile {
                minimum_hours: 4.0,
                target_hours: 8.0,
            },
            thermal: ThermalRequirement {
                required_gdd,
                harvest_start_gdd: None,
            },
        }],
    )
}

fn two_crop_request(config: OptimizationConfig) -> OptimizationRequest {
    OptimizationRequest {
        fields: vec![
            Field::new(FieldId::new("f1"), "F1", 100.0, 5.0).with_fallow_period(7),
            Field::new(FieldId::new("f2"), "F2", 80.0, 4.0).with_fallow_period(7),
        ],
        horizon: PlanningHorizon::new(date(4, 1), date(7, 31)).unwrap(),
        objective: Default::default(),
        max_computation_time_secs: None,
        crops: vec![
            CropSpec {
                crop_id: CropId::new("c1"),
                variety: None,
                target_area: None,
                profile: None,
            },
            CropSpec {
                crop_id: CropId::new("c2"),
                variety: None,
                target_area: None,
                profile: None,
            },
        ],
        config,
        rules: vec![InteractionRule::new(
            "r1",
            RuleKind::ContinuousCultivation,
            "G1",
            "G1",
            0.8,
            true,
        )],
    }
}

fn two_profiles() -> [CropProfile; 2] {
    [
        one_stage_profile(
            Crop::new(CropId::new("c1"), "C1", 1.0)
                .with_revenue_per_area(10.0)
                .with_groups(["G1"]),
            60.0,
        ),
        one_stage_profile(
            Crop::new(CropId::new("c2"), "C2", 1.0)
                .with_revenue_per_area(12.0)
                .with_groups(["G2"]),
            96.0,
        ),
    ]
}

/// Identical requests with identical seeds must replay identically.
#[test]
fn determinism_with_fixed_seed() {
    let config = OptimizationConfig {
        initial_algorithm: acre_algo::InitialAlgorithm::Greedy,
        enable_alns: true,
        alns_iterations: 120,
        random_seed: 20250401,
        enable_local_search: false,
        ..Default::default()
    };
    let weather = steady_weather(122);
    let profiles = two_profiles();

    let a = optimize(&two_crop_request(config.clone()), &weather, &profiles).unwrap();
    let b = optimize(&two_crop_request(config), &weather, &profiles).unwrap();

    assert_eq!(a.solution, b.solution);
    assert_eq!(a.total_profit, b.total_profit);
    assert_eq!(a.algorithm, b.algorithm);
    assert_eq!(
        serde_json::to_string(&a.field_schedules).unwrap(),
        serde_json::to_string(&b.field_schedules).unwrap()
    );
}

/// A denser candidate pool (stride 7 → superset of stride 14) can only help
/// the per-field DP.
#[test]
fn monotonicity_under_candidate_superset() {
    let weather = steady_weather(122);
    let profiles = two_profiles();
    let run = |stride: u32| {
        let config = OptimizationConfig {
            start_date_stride_days: stride,
            enable_local_search: false,
            ..Default::default()
        };
        optimize(&two_crop_request(config), &weather, &profiles)
            .unwrap()
            .total_profit
    };

    let sparse = run(14);
    let dense = run(7);
    assert!(
        dense >= sparse,
        "superset pool must not lose profit ({} vs {})",
        dense,
        sparse
    );
}

/// Brute-force evaluation of one chain, mirroring the DP's arc semantics.
fn chain_value(chain: &[&AllocationCandidate], matrix: &InteractionMatrix) -> f64 {
    let mut total = 0.0;
    for (i, cand) in chain.iter().enumerate() {
        let mut revenue = cand.revenue;
        if i > 0 {
            let pred = chain[i - 1];
            let gap = (cand.start_date - pred.completion_date).num_days();
            revenue *= matrix.impact(&pred.crop.groups, &cand.crop.groups)
                * soil_recovery_factor(gap);
        }
        if let Some(cap) = cand.crop.max_revenue {
            revenue = revenue.min(cap);
        }
        total += revenue - cand.cost;
    }
    total
}

fn chain_is_feasible(
    chain: &[&AllocationCandidate],
    fallow: u32,
    matrix: &InteractionMatrix,
) -> bool {
    for pair in chain.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if b.start_date <= a.completion_date {
            return false;
        }
        if fallow_conflict(
            a.start_date,
            a.completion_date,
            b.start_date,
            b.completion_date,
            fallow,
        ) {
            return false;
        }
        if matrix.impact(&a.crop.groups, &b.crop.groups) == 0.0 {
            return false;
        }
    }
    true
}

/// On random single-field instances the DP matches exhaustive enumeration.
#[test]
fn dp_matches_brute_force_on_random_instances() {
    let mut rng = StdRng::seed_from_u64(99);
    let groups = ["G1", "G2", "G3"];

    for instance in 0..25 {
        let fallow = rng.gen_range(0..10);
        let field = Arc::new(
            Field::new(FieldId::new("f"), "F", 100.0, 5.0).with_fallow_period(fallow),
        );

        let rules = vec![InteractionRule::new(
            format!("rule-{}", instance),
            RuleKind::ContinuousCultivation,
            groups[rng.gen_range(0..3)],
            groups[rng.gen_range(0..3)],
            [0.0, 0.5, 0.8, 1.3][rng.gen_range(0..4)],
            rng.gen_bool(0.5),
        )];
        let matrix = InteractionMatrix::new(rules);

        let n = rng.gen_range(4..10usize);
        let pool: Vec<AllocationCandidate> = (0..n)
            .map(|i| {
                let start = date(4, 1)
                    .checked_add_days(Days::new(rng.gen_range(0..60)))
                    .unwrap();
                let duration = rng.gen_range(5..15u64);
                let end = start.checked_add_days(Days::new(duration - 1)).unwrap();
                let revenue = rng.gen_range(0.0..1000.0f64);
                let cost = duration as f64 * field.daily_fixed_cost;
                let crop = Arc::new(
                    Crop::new(CropId::new(format!("crop{}", i)), "C", 1.0)
                        .with_revenue_per_area(10.0)
                        .with_max_revenue(rng.gen_range(500.0..1500.0))
                        .with_groups([groups[rng.gen_range(0..3)]]),
                );
                AllocationCandidate {
                    field: Arc::clone(&field),
                    crop,
                    start_date: start,
                    completion_date: end,
                    growth_days: duration as u32,
                    accumulated_gdd: 100.0,
                    area_used: 50.0,
                    cost,
                    revenue,
                    profit: revenue - cost,
                }
            })
            .collect();

        // Exhaustive: every subset, every chain is the subset in time order
        let mut best = 0.0f64;
        for mask in 0u32..(1 << n) {
            let mut subset: Vec<&AllocationCandidate> =
                (0..n).filter(|i| mask & (1 << i) != 0).map(|i| &pool[i]).collect();
            subset.sort_by_key(|c| (c.start_date, c.completion_date));
            if chain_is_feasible(&subset, fallow, &matrix) {
                best = best.max(chain_value(&subset, &matrix));
            }
        }

        let plan = select_field_plan(&field, &pool, &matrix, Objective::MaximizeProfit);
        assert!(
            (plan.value - best).abs() < 1e-6,
            "instance {}: dp {} vs brute force {}",
            instance,
            plan.value,
            best
        );
    }
}

fn operator_fixture() -> (Vec<AllocationCandidate>, Solution) {
    let f1 = Arc::new(Field::new(FieldId::new("f1"), "F1", 100.0, 5.0).with_fallow_period(7));
    let f2 = Arc::new(Field::new(FieldId::new("f2"), "F2", 100.0, 5.0).with_fallow_period(7));
    let c1 = Arc::new(Crop::new(CropId::new("c1"), "C1", 1.0).with_revenue_per_area(10.0));
    let c2 = Arc::new(Crop::new(CropId::new("c2"), "C2", 1.0).with_revenue_per_area(12.0));

    let make = |field: &Arc<Field>, crop: &Arc<Crop>, start: NaiveDate, area: f64| {
        let end = start.checked_add_days(Days::new(9)).unwrap();
        let revenue = area * crop.revenue_per_area.unwrap();
        AllocationCandidate {
            field: Arc::clone(field),
            crop: Arc::clone(crop),
            start_date: start,
            completion_date: end,
            growth_days: 10,
            accumulated_gdd: 60.0,
            area_used: area,
            cost: 50.0,
            revenue,
            profit: revenue - 50.0,
        }
    };

    let pool = vec![
        make(&f1, &c1, date(4, 1), 80.0),
        make(&f1, &c2, date(4, 2), 60.0),
        make(&f2, &c1, date(4, 3), 80.0),
        make(&f2, &c2, date(4, 1), 60.0),
    ];

    let mut ids = AllocationIdSource::new();
    let solution = Solution::new(vec![
        CropAllocation::from_candidate(ids.next_id(), &pool[0]),
        CropAllocation::from_candidate(ids.next_id(), &pool[3]),
    ]);
    (pool, solution)
}

/// field_swap preserves the summed area of the swapped pair; crop_change
/// preserves the changed allocation's area.
#[test]
fn operator_area_preservation() {
    let (pool, solution) = operator_fixture();
    let horizon = PlanningHorizon::new(date(4, 1), date(9, 30)).unwrap();
    let matrix = InteractionMatrix::default();
    let config = OptimizationConfig::default();
    let ctx = NeighborContext {
        pool: &pool,
        horizon: &horizon,
        matrix: &matrix,
        config: &config,
        objective: Objective::MaximizeProfit,
    };

    let mut ids = AllocationIdSource::new();
    let swaps = FieldSwap.generate(&solution, &ctx, &mut ids);
    assert!(!swaps.is_empty());
    let total_before: f64 = solution.allocations.iter().map(|a| a.area_used).sum();
    for neighbor in &swaps {
        let total_after: f64 = neighbor.allocations.iter().map(|a| a.area_used).sum();
        assert!((total_after - total_before).abs() < 1e-9);
    }

    let changes = CropChange.generate(&solution, &ctx, &mut ids);
    assert!(!changes.is_empty());
    for neighbor in &changes {
        // Every allocation's area appears in the original multiset
        let mut before: Vec<i64> = solution
            .allocations
            .iter()
            .map(|a| (a.area_used * 1e6) as i64)
            .collect();
        let mut after: Vec<i64> = neighbor
            .allocations
            .iter()
            .map(|a| (a.area_used * 1e6) as i64)
            .collect();
        before.sort();
        after.sort();
        assert_eq!(before, after);
    }
}
