//! Growth-stage requirements: temperature, sunshine, and thermal profiles.
//!
//! Temperature judgments follow the trapezoidal developmental-rate model
//! (DSSAT/APSIM three-cardinal-temperatures family): growing degree days are
//! credited linearly above the base temperature, scaled by an efficiency that
//! ramps from 0 at the base to 1 across the optimal range and back to 0 at
//! the developmental-arrest temperature.
//!
//! All temperatures are degrees Celsius. Missing observations yield
//! conservative results: `false` for risk predicates and 0.0 GDD.

use serde::{Deserialize, Serialize};

use crate::error::{AcreError, AcreResult};
use crate::weather::DailyWeather;
use crate::Crop;

fn default_high_temp_impact() -> f64 {
    0.05
}
fn default_low_temp_impact() -> f64 {
    0.08
}
fn default_frost_impact() -> f64 {
    0.15
}
fn default_sterility_impact() -> f64 {
    0.20
}

/// Temperature thresholds for a crop at a given growth stage.
///
/// Invariant: `base_temperature < optimal_min <= optimal_max < max_temperature`
/// (enforced by [`TemperatureProfile::validate`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureProfile {
    /// GDD base (lower developmental threshold)
    pub base_temperature: f64,
    /// Lower bound of the optimal growth range
    pub optimal_min: f64,
    /// Upper bound of the optimal growth range
    pub optimal_max: f64,
    /// Mean temperature below this implies low-temperature stress
    pub low_stress_threshold: f64,
    /// Mean temperature above this implies high-temperature stress
    pub high_stress_threshold: f64,
    /// Minimum temperature at or below this implies frost risk
    pub frost_threshold: f64,
    /// Upper developmental threshold where growth stops
    pub max_temperature: f64,
    /// Maximum temperature at or above this implies sterility risk
    /// (only relevant for sensitive stages such as flowering)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sterility_risk_threshold: Option<f64>,

    // Daily yield impact rates, overridable per crop/stage
    #[serde(default = "default_high_temp_impact")]
    pub high_temp_daily_impact: f64,
    #[serde(default = "default_low_temp_impact")]
    pub low_temp_daily_impact: f64,
    #[serde(default = "default_frost_impact")]
    pub frost_daily_impact: f64,
    #[serde(default = "default_sterility_impact")]
    pub sterility_daily_impact: f64,
}

/// Daily yield impact rates from temperature stress, one per stress type.
///
/// Values are daily reduction factors (0.0 = no stress, 0.05 = 5%).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StressImpacts {
    pub high_temp: f64,
    pub low_temp: f64,
    pub frost: f64,
    pub sterility: f64,
}

impl StressImpacts {
    /// Multiplicative survival factor for one day: `∏ (1 − impact)`,
    /// clamped to be non-negative.
    pub fn survival_factor(&self) -> f64 {
        let factor = (1.0 - self.high_temp)
            * (1.0 - self.low_temp)
            * (1.0 - self.frost)
            * (1.0 - self.sterility);
        factor.max(0.0)
    }
}

impl TemperatureProfile {
    /// Create a profile with the default literature-based impact rates.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        base_temperature: f64,
        optimal_min: f64,
        optimal_max: f64,
        low_stress_threshold: f64,
        high_stress_threshold: f64,
        frost_threshold: f64,
        max_temperature: f64,
    ) -> Self {
        Self {
            base_temperature,
            optimal_min,
            optimal_max,
            low_stress_threshold,
            high_stress_threshold,
            frost_threshold,
            max_temperature,
            sterility_risk_threshold: None,
            high_temp_daily_impact: default_high_temp_impact(),
            low_temp_daily_impact: default_low_temp_impact(),
            frost_daily_impact: default_frost_impact(),
            sterility_daily_impact: default_sterility_impact(),
        }
    }

    /// Set the sterility risk threshold
    pub fn with_sterility_threshold(mut self, threshold: f64) -> Self {
        self.sterility_risk_threshold = Some(threshold);
        self
    }

    /// Enforce the cardinal-temperature ordering invariant
    pub fn validate(&self) -> AcreResult<()> {
        if !(self.base_temperature < self.optimal_min
            && self.optimal_min <= self.optimal_max
            && self.optimal_max < self.max_temperature)
        {
            return Err(AcreError::Validation(format!(
                "temperature profile violates base < optimal_min <= optimal_max < max \
                 ({} / {} / {} / {})",
                self.base_temperature, self.optimal_min, self.optimal_max, self.max_temperature
            )));
        }
        Ok(())
    }

    /// True if mean temperature lies within the optimal range
    pub fn is_optimal_temperature(&self, t_mean: Option<f64>) -> bool {
        matches!(t_mean, Some(t) if self.optimal_min <= t && t <= self.optimal_max)
    }

    /// True if mean temperature indicates low-temperature stress
    pub fn is_low_temp_stress(&self, t_mean: Option<f64>) -> bool {
        matches!(t_mean, Some(t) if t < self.low_stress_threshold)
    }

    /// True if mean temperature indicates high-temperature stress
    pub fn is_high_temp_stress(&self, t_mean: Option<f64>) -> bool {
        matches!(t_mean, Some(t) if t > self.high_stress_threshold)
    }

    /// True if minimum temperature indicates frost risk
    pub fn is_frost_risk(&self, t_min: Option<f64>) -> bool {
        matches!(t_min, Some(t) if t <= self.frost_threshold)
    }

    /// True if maximum temperature indicates sterility risk. Stages without
    /// a sterility threshold never report risk.
    pub fn is_sterility_risk(&self, t_max: Option<f64>) -> bool {
        match (t_max, self.sterility_risk_threshold) {
            (Some(t), Some(threshold)) => t >= threshold,
            _ => false,
        }
    }

    /// Developmental-rate efficiency at a mean temperature (0.0 to 1.0).
    ///
    /// 1.0 inside the optimal range, linear ramp-up from the base
    /// temperature, linear ramp-down to the arrest temperature, 0.0 outside.
    pub fn temperature_efficiency(&self, t_mean: f64) -> f64 {
        if self.optimal_min <= t_mean && t_mean <= self.optimal_max {
            1.0
        } else if self.base_temperature < t_mean && t_mean < self.optimal_min {
            ((t_mean - self.base_temperature) / (self.optimal_min - self.base_temperature))
                .clamp(0.0, 1.0)
        } else if self.optimal_max < t_mean && t_mean < self.max_temperature {
            ((self.max_temperature - t_mean) / (self.max_temperature - self.optimal_max))
                .clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Daily growing degree days under the trapezoidal model.
    ///
    /// `(t_mean − base) × efficiency(t_mean)`; zero at or beyond the viable
    /// range and for missing observations.
    pub fn daily_gdd(&self, t_mean: Option<f64>) -> f64 {
        let t = match t_mean {
            Some(t) => t,
            None => return 0.0,
        };
        if t <= self.base_temperature || t >= self.max_temperature {
            return 0.0;
        }
        (t - self.base_temperature) * self.temperature_efficiency(t)
    }

    /// Evaluate one day's temperature stress against this profile.
    ///
    /// High-temperature impact is scaled by the proportion of the diurnal
    /// range above the threshold and attenuated by
    /// `1 − 0.7 × efficiency(t_mean)`, so brief spikes on otherwise
    /// favorable days are not over-penalized. Frost and sterility damage is
    /// never attenuated.
    pub fn daily_stress_impacts(&self, weather: &DailyWeather) -> StressImpacts {
        let mut impacts = StressImpacts::default();

        let mean_efficiency = weather
            .temperature_mean
            .map(|t| self.temperature_efficiency(t))
            .unwrap_or(0.0);

        if let Some(t_max) = weather
            .temperature_max
            .filter(|&t| t > self.high_stress_threshold)
        {
            match weather.temperature_min {
                Some(t_min) if t_max - t_min > 0.0 => {
                    let stress_proportion =
                        ((t_max - self.high_stress_threshold) / (t_max - t_min)).min(1.0);
                    let attenuation = 1.0 - mean_efficiency * 0.7;
                    impacts.high_temp = self.high_temp_daily_impact * stress_proportion * attenuation;
                }
                _ => impacts.high_temp = self.high_temp_daily_impact,
            }
        }

        if self.is_low_temp_stress(weather.temperature_mean) {
            impacts.low_temp = self.low_temp_daily_impact;
        }

        if self.is_frost_risk(weather.temperature_min) {
            impacts.frost = self.frost_daily_impact;
        }

        if self.is_sterility_risk(weather.temperature_max) {
            impacts.sterility = self.sterility_daily_impact;
        }

        impacts
    }
}

/// Daily sunshine requirements for a growth stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SunshineProfile {
    /// Minimum viable daily sunshine (hours)
    pub minimum_hours: f64,
    /// Target daily sunshine (hours)
    pub target_hours: f64,
}

/// Accumulated-heat requirements for a growth stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermalRequirement {
    /// GDD that must accumulate to complete the stage
    pub required_gdd: f64,
    /// Optional earlier harvest-start GDD within the final stage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub harvest_start_gdd: Option<f64>,
}

/// One ordered growth stage with its requirements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthStage {
    /// 1-based position in the crop's stage sequence
    pub order: u32,
    /// Stage name (e.g. "vegetative", "flowering")
    pub name: String,
    pub temperature: TemperatureProfile,
    pub sunshine: SunshineProfile,
    pub thermal: ThermalRequirement,
}

/// A crop together with its ordered growth-stage requirements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropProfile {
    pub crop: Crop,
    pub stages: Vec<GrowthStage>,
}

impl CropProfile {
    pub fn new(crop: Crop, stages: Vec<GrowthStage>) -> Self {
        Self { crop, stages }
    }

    /// Total GDD required across all stages
    pub fn total_required_gdd(&self) -> f64 {
        self.stages.iter().map(|s| s.thermal.required_gdd).sum()
    }

    /// Validate the crop, the stage ordering (contiguous 1..N), stage GDD
    /// positivity, and each stage's temperature invariant.
    pub fn validate(&self) -> AcreResult<()> {
        self.crop.validate()?;
        if self.stages.is_empty() {
            return Err(AcreError::Validation(format!(
                "crop '{}': profile has no growth stages",
                self.crop.id
            )));
        }
        for (i, stage) in self.stages.iter().enumerate() {
            if stage.order as usize != i + 1 {
                return Err(AcreError::Validation(format!(
                    "crop '{}': stage order must be contiguous 1..N, found {} at position {}",
                    self.crop.id,
                    stage.order,
                    i + 1
                )));
            }
            if !(stage.thermal.required_gdd > 0.0) {
                return Err(AcreError::Validation(format!(
                    "crop '{}' stage '{}': required GDD must be positive",
                    self.crop.id, stage.name
                )));
            }
            stage.temperature.validate().map_err(|e| {
                AcreError::Validation(format!(
                    "crop '{}' stage '{}': {}",
                    self.crop.id, stage.name, e
                ))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CropId;
    use chrono::NaiveDate;

    fn profile() -> TemperatureProfile {
        TemperatureProfile::new(10.0, 20.0, 28.0, 12.0, 30.0, 2.0, 35.0)
    }

    fn day(t_mean: f64, t_max: f64, t_min: f64) -> DailyWeather {
        DailyWeather {
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            temperature_mean: Some(t_mean),
            temperature_max: Some(t_max),
            temperature_min: Some(t_min),
            precipitation: None,
            sunshine_hours: None,
            wind_speed: None,
            weather_code: None,
        }
    }

    #[test]
    fn gdd_zero_outside_viable_range() {
        let p = profile();
        assert_eq!(p.daily_gdd(Some(10.0)), 0.0);
        assert_eq!(p.daily_gdd(Some(35.0)), 0.0);
        assert_eq!(p.daily_gdd(Some(40.0)), 0.0);
        assert_eq!(p.daily_gdd(None), 0.0);
    }

    #[test]
    fn gdd_full_efficiency_in_optimal_range() {
        let p = profile();
        assert!((p.daily_gdd(Some(22.0)) - 12.0).abs() < 1e-9);
        assert!((p.daily_gdd(Some(28.0)) - 18.0).abs() < 1e-9);
    }

    #[test]
    fn gdd_ramps_linearly_on_cool_side() {
        let p = profile();
        // At 15°C: raw 5.0, efficiency (15-10)/(20-10) = 0.5
        assert!((p.daily_gdd(Some(15.0)) - 2.5).abs() < 1e-9);
    }

    #[test]
    fn gdd_ramps_linearly_on_warm_side() {
        let p = profile();
        // At 31.5°C: raw 21.5, efficiency (35-31.5)/(35-28) = 0.5
        assert!((p.daily_gdd(Some(31.5)) - 10.75).abs() < 1e-9);
    }

    #[test]
    fn high_temp_stress_attenuated_when_mean_is_optimal() {
        let p = profile();
        // Mean 25°C (efficiency 1.0), max 35 above the 30 threshold,
        // min 15: proportion (35-30)/(35-15) = 0.25, attenuation 0.3
        let impacts = p.daily_stress_impacts(&day(25.0, 35.0, 15.0));
        assert!((impacts.high_temp - 0.05 * 0.25 * 0.3).abs() < 1e-9);
        assert_eq!(impacts.low_temp, 0.0);
    }

    #[test]
    fn frost_applies_full_rate() {
        let p = profile();
        let impacts = p.daily_stress_impacts(&day(5.0, 8.0, 1.0));
        assert_eq!(impacts.frost, 0.15);
        // t_mean 5 < low_stress_threshold 12
        assert_eq!(impacts.low_temp, 0.08);
        assert!(impacts.survival_factor() < 1.0);
    }

    #[test]
    fn sterility_requires_threshold() {
        let p = profile();
        assert!(!p.is_sterility_risk(Some(40.0)));
        let p = p.with_sterility_threshold(34.0);
        assert!(p.is_sterility_risk(Some(35.0)));
        assert!(!p.is_sterility_risk(Some(33.0)));
    }

    #[test]
    fn validate_rejects_inverted_cardinals() {
        let mut p = profile();
        p.optimal_min = 9.0; // below base
        assert!(p.validate().is_err());
    }

    #[test]
    fn crop_profile_rejects_gapped_stage_order() {
        let crop = Crop::new(CropId::new("c"), "C", 1.0);
        let stage = |order| GrowthStage {
            order,
            name: format!("stage{}", order),
            temperature: profile(),
            sunshine: SunshineProfile {
                minimum_hours: 4.0,
                target_hours: 8.0,
            },
            thermal: ThermalRequirement {
                required_gdd: 100.0,
                harvest_start_gdd: None,
            },
        };
        let ok = CropProfile::new(crop.clone(), vec![stage(1), stage(2)]);
        assert!(ok.validate().is_ok());
        assert!((ok.total_required_gdd() - 200.0).abs() < 1e-9);

        let gapped = CropProfile::new(crop, vec![stage(1), stage(3)]);
        assert!(gapped.validate().is_err());
    }
}
