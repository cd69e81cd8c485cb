//! Collaborator seams: where weather, crop profiles, and interaction rules
//! come from.
//!
//! The engine never touches files or networks. Callers materialize data
//! through these traits (or hand the entities over directly) before the
//! synchronous core runs; an async layer can wrap the traits without the
//! core knowing.

use chrono::NaiveDate;

use acre_core::{AcreResult, CropId, CropProfile, InteractionRule, WeatherSeries};

/// Supplies the daily weather series covering a date range.
pub trait WeatherSource {
    fn daily_series(&self, start: NaiveDate, end: NaiveDate) -> AcreResult<WeatherSeries>;
}

/// Supplies finished crop profiles by id and optional variety.
pub trait CropProfileSource {
    fn profile(&self, crop_id: &CropId, variety: Option<&str>) -> AcreResult<CropProfile>;
}

/// Supplies the agronomic interaction rule set.
pub trait InteractionRuleSource {
    fn rules(&self) -> AcreResult<Vec<InteractionRule>>;
}
