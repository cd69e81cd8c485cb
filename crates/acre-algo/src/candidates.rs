//! Candidate generation: every (field, crop, start date, area) worth
//! considering, fully simulated.
//!
//! Two strategies are supported. Enumeration walks the horizon at a fixed
//! stride for every field × crop; the period-template strategy first derives
//! viable start dates per crop from the weather and instantiates those per
//! field. Either way each tuple runs through the growth simulator and only
//! options completing inside the horizon become candidates.
//!
//! With the `desktop` feature and `enable_parallel_candidate_generation`,
//! fields are processed on a rayon pool. Candidates are produced into
//! per-field buckets and merged in field order, then sorted, so parallelism
//! never perturbs results.

use chrono::{Days, NaiveDate};
use std::sync::Arc;

use acre_core::diagnostics::codes;
use acre_core::{
    AllocationCandidate, Crop, CropProfile, Diagnostics, Field, PlanningHorizon, WeatherSeries,
};

use crate::growth::{simulate_growth, GrowthError};
use crate::request::{CandidateStrategy, OptimizationConfig};

/// Fractions of the usable area cap enumerated per start date.
pub const AREA_FRACTIONS: [f64; 4] = [0.25, 0.5, 0.75, 1.0];

/// One crop prepared for generation: shared handles plus the advisory
/// area target from the request.
#[derive(Debug, Clone)]
pub struct CropPlan {
    pub crop: Arc<Crop>,
    pub profile: Arc<CropProfile>,
    pub target_area: Option<f64>,
}

impl CropPlan {
    pub fn new(profile: CropProfile, target_area: Option<f64>) -> Self {
        Self {
            crop: Arc::new(profile.crop.clone()),
            profile: Arc::new(profile),
            target_area,
        }
    }
}

/// Generate the candidate pool for the request.
///
/// Start dates whose weather is missing are counted and surfaced as one
/// aggregated warning per field; starts that simply fail to complete in time
/// are dropped silently. The returned pool is sorted by
/// (field, crop, start date, area) regardless of generation order.
pub fn generate_candidates(
    fields: &[Arc<Field>],
    crops: &[CropPlan],
    weather: &WeatherSeries,
    horizon: &PlanningHorizon,
    config: &OptimizationConfig,
    diagnostics: &mut Diagnostics,
) -> Vec<AllocationCandidate> {
    let starts_by_crop: Vec<Vec<NaiveDate>> = crops
        .iter()
        .map(|plan| match config.candidate_generation_strategy {
            CandidateStrategy::Enumeration => {
                enumerate_starts(horizon, config.start_date_stride_days)
            }
            CandidateStrategy::PeriodTemplate => {
                template_starts(plan, weather, horizon, config.max_templates_per_crop)
            }
        })
        .collect();

    let mut buckets: Vec<(Vec<AllocationCandidate>, usize)> =
        run_per_field(fields, config, |field| {
            generate_for_field(field, crops, &starts_by_crop, weather, horizon)
        });

    let mut pool = Vec::new();
    for (field, (bucket, missing_weather_starts)) in fields.iter().zip(buckets.drain(..)) {
        if missing_weather_starts > 0 {
            diagnostics.add_warning_with_entity(
                codes::WEATHER_GAP,
                &format!(
                    "{} start date(s) dropped for missing weather",
                    missing_weather_starts
                ),
                &format!("Field {}", field.id),
            );
        }
        pool.extend(bucket);
    }

    if config.enable_candidate_filtering {
        pool = filter_dominated(pool);
    }

    pool.sort_by(|a, b| {
        (&a.field.id, &a.crop.id, a.start_date)
            .cmp(&(&b.field.id, &b.crop.id, b.start_date))
            .then(a.area_used.partial_cmp(&b.area_used).unwrap_or(std::cmp::Ordering::Equal))
    });
    pool
}

/// Run the per-field closure sequentially or on the rayon pool.
fn run_per_field<F>(
    fields: &[Arc<Field>],
    config: &OptimizationConfig,
    per_field: F,
) -> Vec<(Vec<AllocationCandidate>, usize)>
where
    F: Fn(&Arc<Field>) -> (Vec<AllocationCandidate>, usize) + Sync + Send,
{
    #[cfg(feature = "desktop")]
    if config.enable_parallel_candidate_generation {
        use rayon::prelude::*;
        return fields.par_iter().map(per_field).collect();
    }
    let _ = config;
    fields.iter().map(per_field).collect()
}

fn enumerate_starts(horizon: &PlanningHorizon, stride_days: u32) -> Vec<NaiveDate> {
    let mut starts = Vec::new();
    let mut date = horizon.start;
    while date <= horizon.end {
        starts.push(date);
        date = match date.checked_add_days(Days::new(stride_days as u64)) {
            Some(d) => d,
            None => break,
        };
    }
    starts
}

/// Start dates where the crop's first stage can develop at all (its mean
/// temperature lies strictly inside the viable range), thinned evenly to at
/// most `max_templates`.
fn template_starts(
    plan: &CropPlan,
    weather: &WeatherSeries,
    horizon: &PlanningHorizon,
    max_templates: usize,
) -> Vec<NaiveDate> {
    let first_stage = match plan.profile.stages.first() {
        Some(s) => s,
        None => return Vec::new(),
    };
    let viable: Vec<NaiveDate> = weather
        .iter_from(horizon.start)
        .take_while(|r| r.date <= horizon.end)
        .filter(|r| {
            r.temperature_mean
                .map(|t| first_stage.temperature.temperature_efficiency(t) > 0.0)
                .unwrap_or(false)
        })
        .map(|r| r.date)
        .collect();

    if viable.len() <= max_templates {
        return viable;
    }
    // Even thinning keeps the window's spread
    let step = viable.len() as f64 / max_templates as f64;
    (0..max_templates)
        .map(|i| viable[(i as f64 * step) as usize])
        .collect()
}

fn generate_for_field(
    field: &Arc<Field>,
    crops: &[CropPlan],
    starts_by_crop: &[Vec<NaiveDate>],
    weather: &WeatherSeries,
    horizon: &PlanningHorizon,
) -> (Vec<AllocationCandidate>, usize) {
    let mut bucket = Vec::new();
    let mut missing_weather = 0usize;

    for (plan, starts) in crops.iter().zip(starts_by_crop) {
        let areas = area_options(field, plan);
        if areas.is_empty() {
            continue;
        }

        for &start in starts {
            let outcome = match simulate_growth(&plan.profile, start, weather) {
                Ok(outcome) => outcome,
                Err(GrowthError::InsufficientWeather) => {
                    missing_weather += 1;
                    continue;
                }
                Err(GrowthError::DidNotComplete) => continue,
            };
            if outcome.completion_date > horizon.end {
                continue;
            }

            let cost = outcome.growth_days as f64 * field.daily_fixed_cost;
            for &area in &areas {
                let revenue = match plan.crop.revenue_per_area {
                    Some(per_area) => {
                        let raw = area * per_area * outcome.yield_factor;
                        match plan.crop.max_revenue {
                            Some(cap) => raw.min(cap),
                            None => raw,
                        }
                    }
                    None => 0.0,
                };
                bucket.push(AllocationCandidate {
                    field: Arc::clone(field),
                    crop: Arc::clone(&plan.crop),
                    start_date: start,
                    completion_date: outcome.completion_date,
                    growth_days: outcome.growth_days,
                    accumulated_gdd: outcome.accumulated_gdd,
                    area_used: area,
                    cost,
                    revenue,
                    profit: revenue - cost,
                });
            }
        }
    }

    (bucket, missing_weather)
}

/// Candidate areas for a (field, crop): the standard fractions of the
/// usable cap, deduplicated. The cap is the field area bounded by the
/// revenue-implied maximum (`max_revenue / revenue_per_area`) and by the
/// request's target area, where present.
fn area_options(field: &Field, plan: &CropPlan) -> Vec<f64> {
    let mut cap = field.area;
    if let (Some(max_revenue), Some(per_area)) = (plan.crop.max_revenue, plan.crop.revenue_per_area)
    {
        if per_area > 0.0 {
            cap = cap.min(max_revenue / per_area);
        }
    }
    if let Some(target) = plan.target_area {
        cap = cap.min(target);
    }
    if !(cap > 0.0) {
        return Vec::new();
    }

    let mut areas: Vec<f64> = AREA_FRACTIONS.iter().map(|f| f * cap).collect();
    areas.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
    areas
}

/// Drop candidates strictly dominated within their (field, crop, area)
/// group.
///
/// A dominator occupies a sub-interval of the dominated candidate's period
/// (starts no earlier, completes no later) at no more cost and no less
/// profit. Sub-interval containment is what makes the drop safe: any
/// solution feasible with the dominated candidate stays feasible with the
/// dominator in its place.
fn filter_dominated(pool: Vec<AllocationCandidate>) -> Vec<AllocationCandidate> {
    let mut kept: Vec<AllocationCandidate> = Vec::with_capacity(pool.len());

    'outer: for candidate in &pool {
        for other in &pool {
            if std::ptr::eq(candidate, other) {
                continue;
            }
            if other.field.id != candidate.field.id
                || other.crop.id != candidate.crop.id
                || (other.area_used - candidate.area_used).abs() > 1e-9
            {
                continue;
            }
            let contained = other.start_date >= candidate.start_date
                && other.completion_date <= candidate.completion_date;
            let dominates = contained
                && other.cost <= candidate.cost
                && other.profit >= candidate.profit
                && (other.start_date > candidate.start_date
                    || other.completion_date < candidate.completion_date
                    || other.cost < candidate.cost
                    || other.profit > candidate.profit);
            if dominates {
                continue 'outer;
            }
        }
        kept.push(candidate.clone());
    }

    kept
}
