//! Growth simulation: advancing a crop through its stages over daily weather.
//!
//! The simulator accumulates trapezoidal-model GDD day by day, advances the
//! stage pointer when cumulative stage requirements are met, and folds daily
//! temperature stress into a multiplicative yield factor. It is pure: the
//! same profile, start date, and weather slice always produce the same
//! outcome.

use chrono::{Days, NaiveDate};
use thiserror::Error;

use acre_core::{CropProfile, StressImpacts, WeatherSeries};

/// Why a simulation produced no outcome.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrowthError {
    /// The weather series has no record for the start date
    #[error("weather series does not cover the start date")]
    InsufficientWeather,
    /// The series ended before the crop accumulated its required GDD
    #[error("weather series ended before growth completed")]
    DidNotComplete,
}

/// One simulated day of progress.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyProgress {
    pub date: NaiveDate,
    /// GDD credited this day
    pub gdd: f64,
    /// Cumulative GDD through this day
    pub accumulated_gdd: f64,
    /// 1-based stage in effect during this day
    pub stage: u32,
    /// Stress impacts evaluated against that stage's profile
    pub impacts: StressImpacts,
}

/// Result of simulating one crop from one start date.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthOutcome {
    pub start_date: NaiveDate,
    /// Date on which accumulated GDD reached the total requirement
    pub completion_date: NaiveDate,
    /// Days from start to completion, inclusive
    pub growth_days: u32,
    pub accumulated_gdd: f64,
    /// Multiplicative survival of daily stress, in [0, 1]
    pub yield_factor: f64,
    /// Per-day trace in date order
    pub trace: Vec<DailyProgress>,
}

/// Simulate `profile` planted on `start_date` against `weather`.
///
/// Walks the series one day at a time from the start date. Days missing a
/// mean temperature credit zero GDD but still count as growth days and are
/// still evaluated for stress. A gap in the series (a skipped date) ends the
/// walk: growth that has not completed by then reports
/// [`GrowthError::DidNotComplete`].
pub fn simulate_growth(
    profile: &CropProfile,
    start_date: NaiveDate,
    weather: &WeatherSeries,
) -> Result<GrowthOutcome, GrowthError> {
    if profile.stages.is_empty() {
        return Err(GrowthError::DidNotComplete);
    }
    let required_total = profile.total_required_gdd();

    // Cumulative GDD boundary at which each stage ends
    let stage_bounds: Vec<f64> = profile
        .stages
        .iter()
        .scan(0.0, |acc, s| {
            *acc += s.thermal.required_gdd;
            Some(*acc)
        })
        .collect();

    if weather.get(start_date).is_none() {
        return Err(GrowthError::InsufficientWeather);
    }

    let mut accumulated = 0.0;
    let mut stage_idx = 0usize;
    let mut yield_factor = 1.0f64;
    let mut trace = Vec::new();
    let mut expected_date = start_date;

    for record in weather.iter_from(start_date) {
        if record.date != expected_date {
            // Gap in the series; treat like the series ending here
            break;
        }
        expected_date = match expected_date.checked_add_days(Days::new(1)) {
            Some(d) => d,
            None => break,
        };

        let stage = &profile.stages[stage_idx];
        let gdd = stage.temperature.daily_gdd(record.temperature_mean);
        let impacts = stage.temperature.daily_stress_impacts(record);

        yield_factor = (yield_factor * impacts.survival_factor()).max(0.0);
        accumulated += gdd;

        trace.push(DailyProgress {
            date: record.date,
            gdd,
            accumulated_gdd: accumulated,
            stage: stage.order,
            impacts,
        });

        // Advance past every stage boundary the day's heat crossed
        while stage_idx + 1 < profile.stages.len() && accumulated >= stage_bounds[stage_idx] {
            stage_idx += 1;
        }

        if accumulated >= required_total {
            let growth_days = trace.len() as u32;
            return Ok(GrowthOutcome {
                start_date,
                completion_date: record.date,
                growth_days,
                accumulated_gdd: accumulated,
                yield_factor: yield_factor.clamp(0.0, 1.0),
                trace,
            });
        }
    }

    Err(GrowthError::DidNotComplete)
}
