//! The planning pipeline: validate → generate → seed → improve → re-score →
//! package.
//!
//! This is the only module that turns internal `None`-like outcomes into
//! user-visible diagnostics. Candidate drops and operator dead ends stay
//! silent inside the algorithms; what the caller sees is the structured
//! [`OptimizationResult`] with its diagnostics block.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

use acre_core::diagnostics::codes;
use acre_core::{
    AcreError, AcreResult, CropProfile, Diagnostics, Field, FieldSchedule, OptimizationResult,
    ScheduleEntry, Solution,
};

use crate::candidates::{generate_candidates, CropPlan};
use crate::deadline::Deadline;
use crate::dp::{adopt_field_plan, select_field_plan};
use crate::greedy::build_greedy_solution;
use crate::interaction::InteractionMatrix;
use crate::local_search::local_search;
use crate::neighbors::NeighborContext;
use crate::request::{InitialAlgorithm, OptimizationRequest};
use crate::solution_ops::{rescore_solution, AllocationIdSource};
use crate::sources::{CropProfileSource, InteractionRuleSource, WeatherSource};

/// Plan the request against a fully materialized weather series and profile
/// set. Synchronous; see [`optimize_with_sources`] for the collaborator
/// variant.
pub fn optimize(
    request: &OptimizationRequest,
    weather: &acre_core::WeatherSeries,
    profiles: &[CropProfile],
) -> AcreResult<OptimizationResult> {
    let deadline = Deadline::start(request.max_computation_time_secs);
    let mut diagnostics = Diagnostics::new();

    let crops = validate_request(request, profiles)?;
    let fields: Vec<Arc<Field>> = request.fields.iter().cloned().map(Arc::new).collect();
    let matrix = InteractionMatrix::new(request.rules.clone());

    // Candidate pool (C1/C2)
    let pool = generate_candidates(
        &fields,
        &crops,
        weather,
        &request.horizon,
        &request.config,
        &mut diagnostics,
    );
    if pool
        .iter()
        .any(|c| !c.cost.is_finite() || !c.revenue.is_finite())
    {
        return Err(AcreError::Solver(
            "candidate economics overflowed to a non-finite value".into(),
        ));
    }
    if pool.is_empty() {
        diagnostics.add_warning(
            codes::NO_VIABLE_CANDIDATES,
            "no candidate completes within the planning horizon",
        );
        return Ok(package(
            Solution::default(),
            request,
            &fields,
            "none",
            false,
            deadline,
            diagnostics,
        ));
    }

    let mut ids = AllocationIdSource::new();
    let config = &request.config;

    // Initial solution (C4 or C5)
    let (mut solution, mut algorithm) = match config.initial_algorithm {
        InitialAlgorithm::Dp => {
            let mut allocations = Vec::new();
            for field in &fields {
                let field_pool: Vec<_> = pool
                    .iter()
                    .filter(|c| c.field.id == field.id)
                    .cloned()
                    .collect();
                let plan =
                    select_field_plan(field, &field_pool, &matrix, request.objective);
                allocations.extend(adopt_field_plan(&plan, &mut ids));
            }
            (Solution::new(allocations), "dp".to_string())
        }
        InitialAlgorithm::Greedy => (
            build_greedy_solution(
                &pool,
                &request.horizon,
                &matrix,
                request.objective,
                &mut ids,
                &deadline,
            ),
            "greedy".to_string(),
        ),
    };

    // Improvement (C7 or C8; ALNS takes precedence)
    let ctx = NeighborContext {
        pool: &pool,
        horizon: &request.horizon,
        matrix: &matrix,
        config,
        objective: request.objective,
    };
    let mut rng = StdRng::seed_from_u64(config.random_seed);
    let mut improved = false;
    if config.enable_alns {
        solution = crate::alns::alns_optimize(solution, &ctx, &mut ids, &mut rng, &deadline);
        algorithm.push_str("+alns");
        improved = true;
    } else if config.enable_local_search {
        solution = local_search(solution, &ctx, &mut ids, &mut rng, &deadline);
        algorithm.push_str("+local_search");
        improved = true;
    }

    // Final re-scoring with full interaction and soil-recovery context
    rescore_solution(&mut solution, &matrix);
    solution.verify(&request.horizon)?;

    let deadline_hit = deadline.expired();
    if deadline_hit {
        diagnostics.add_warning(
            codes::DEADLINE,
            "computation time budget expired; returning best-known solution",
        );
    }

    let is_optimal = fields.len() == 1
        && config.initial_algorithm == InitialAlgorithm::Dp
        && !improved
        && !deadline_hit;

    Ok(package(
        solution,
        request,
        &fields,
        &algorithm,
        is_optimal,
        deadline,
        diagnostics,
    ))
}

/// Materialize collaborators, then run the synchronous core.
pub fn optimize_with_sources(
    request: &OptimizationRequest,
    weather_source: &dyn WeatherSource,
    profile_source: &dyn CropProfileSource,
    rule_source: &dyn InteractionRuleSource,
) -> AcreResult<OptimizationResult> {
    let weather = weather_source.daily_series(request.horizon.start, request.horizon.end)?;

    let mut profiles = Vec::new();
    for spec in &request.crops {
        if spec.profile.is_none() {
            profiles.push(profile_source.profile(&spec.crop_id, spec.variety.as_deref())?);
        }
    }

    if request.rules.is_empty() {
        let mut with_rules = request.clone();
        with_rules.rules = rule_source.rules()?;
        return optimize(&with_rules, &weather, &profiles);
    }
    optimize(request, &weather, &profiles)
}

/// Validate the request and resolve each crop spec to a profile.
fn validate_request(
    request: &OptimizationRequest,
    profiles: &[CropProfile],
) -> AcreResult<Vec<CropPlan>> {
    if request.fields.is_empty() {
        return Err(AcreError::Validation("request names no fields".into()));
    }
    // Horizons arriving via deserialization bypass the validating
    // constructor
    acre_core::PlanningHorizon::new(request.horizon.start, request.horizon.end)?;
    for field in &request.fields {
        field.validate()?;
    }
    {
        let mut seen = std::collections::BTreeSet::new();
        for field in &request.fields {
            if !seen.insert(&field.id) {
                return Err(AcreError::Validation(format!(
                    "duplicate field id '{}'",
                    field.id
                )));
            }
        }
    }
    if request.crops.is_empty() {
        return Err(AcreError::Validation("request names no crops".into()));
    }
    request.config.validate()?;

    let mut crops = Vec::new();
    for spec in &request.crops {
        let profile = match &spec.profile {
            Some(inline) => inline.clone(),
            None => profiles
                .iter()
                .find(|p| {
                    p.crop.id == spec.crop_id
                        && (spec.variety.is_none() || p.crop.variety == spec.variety)
                })
                .cloned()
                .ok_or_else(|| {
                    AcreError::Validation(format!(
                        "no profile supplied for crop '{}'",
                        spec.crop_id
                    ))
                })?,
        };
        profile.validate()?;
        crops.push(CropPlan::new(profile, spec.target_area));
    }
    Ok(crops)
}

/// Assemble the result entity: totals, per-field schedules with utilization,
/// per-crop areas.
fn package(
    solution: Solution,
    request: &OptimizationRequest,
    fields: &[Arc<Field>],
    algorithm: &str,
    is_optimal: bool,
    deadline: Deadline,
    diagnostics: Diagnostics,
) -> OptimizationResult {
    let horizon_days = request.horizon.days() as f64;

    let field_schedules: Vec<FieldSchedule> = fields
        .iter()
        .map(|field| {
            let allocations = solution.allocations_on_field(&field.id);
            let entries: Vec<ScheduleEntry> = allocations
                .iter()
                .map(|a| ScheduleEntry {
                    allocation_id: a.id,
                    crop_id: a.crop.id.clone(),
                    crop_name: a.crop.name.clone(),
                    start_date: a.start_date,
                    completion_date: a.completion_date,
                    area_used: a.area_used,
                    revenue: a.revenue,
                    profit: a.profit,
                })
                .collect();
            let occupied_area_days: f64 = allocations
                .iter()
                .map(|a| a.area_used * a.growth_days as f64)
                .sum();
            FieldSchedule {
                field_id: field.id.clone(),
                field_name: field.name.clone(),
                entries,
                utilization: if field.area > 0.0 && horizon_days > 0.0 {
                    (occupied_area_days / (field.area * horizon_days)).min(1.0)
                } else {
                    0.0
                },
            }
        })
        .collect();

    let crop_areas = solution.area_by_crop();
    let total_cost = solution.total_cost();
    let total_revenue = solution.total_revenue();
    let total_profit = solution.total_profit();

    OptimizationResult {
        success: true,
        solution,
        total_cost,
        total_revenue,
        total_profit,
        field_schedules,
        crop_areas,
        algorithm: algorithm.to_string(),
        elapsed_ms: deadline.elapsed_ms(),
        is_optimal,
        diagnostics,
    }
}
