//! Planning request and optimization configuration.
//!
//! The engine is invoked through this pure request/response contract; there
//! is no persistent state between calls. Every recognized configuration knob
//! has a serde default so request documents only spell out what they change.

use serde::{Deserialize, Serialize};

use acre_core::{
    AcreError, AcreResult, CropId, CropProfile, Field, InteractionRule, PlanningHorizon,
};

/// What the optimizer maximizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    #[default]
    MaximizeProfit,
    MinimizeCost,
}

impl Objective {
    /// Scalar score of one allocation's economics under this objective;
    /// higher is always better.
    pub fn score(&self, profit: f64, cost: f64) -> f64 {
        match self {
            Objective::MaximizeProfit => profit,
            Objective::MinimizeCost => -cost,
        }
    }
}

/// How the candidate pool is generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStrategy {
    /// Enumerate start dates at a fixed stride across the horizon
    #[default]
    Enumeration,
    /// Derive start-date templates per crop from its viable temperature
    /// window, then instantiate per field
    PeriodTemplate,
}

/// Which algorithm seeds the initial solution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialAlgorithm {
    /// Per-field dynamic programming (optimal per field)
    #[default]
    Dp,
    /// Cross-field greedy by profit rate
    Greedy,
}

fn default_stride() -> u32 {
    7
}
fn default_max_templates() -> usize {
    200
}
fn default_ls_iterations() -> usize {
    100
}
fn default_true() -> bool {
    true
}
fn default_alns_iterations() -> usize {
    200
}
fn default_removal_rate() -> f64 {
    0.3
}
fn default_area_multipliers() -> Vec<f64> {
    vec![0.8, 1.2]
}
fn default_period_alternatives() -> usize {
    5
}
fn default_seed() -> u64 {
    42
}

/// Recognized optimization options. All fields have defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationConfig {
    /// Fan candidate generation out across fields (performance only)
    pub enable_parallel_candidate_generation: bool,
    /// Drop strictly dominated duplicate candidates
    pub enable_candidate_filtering: bool,
    pub candidate_generation_strategy: CandidateStrategy,
    /// Template pool size per crop for the period-template strategy
    pub max_templates_per_crop: usize,
    /// Start-date enumeration stride in days
    pub start_date_stride_days: u32,
    /// Maximum |Δstart| considered when field_swap matches pool candidates
    pub candidate_date_tolerance_days: Option<u32>,
    /// Seed the initial solution with per-field DP or cross-field greedy
    pub initial_algorithm: InitialAlgorithm,
    /// Run hill-climbing local search after seeding
    pub enable_local_search: bool,
    pub max_local_search_iterations: usize,
    /// Run ALNS instead of local search (takes precedence when both set)
    pub enable_alns: bool,
    pub alns_iterations: usize,
    /// Fraction of the solution removed by each destroy operator
    pub alns_removal_rate: f64,
    /// Multipliers tried by the area_adjust operator
    pub area_adjustment_multipliers: Vec<f64>,
    /// Alternatives considered per (field, crop) by period_replace
    pub max_period_replace_alternatives: usize,
    /// Sample a random subset of neighbor operators per iteration
    pub enable_neighbor_sampling: bool,
    /// Seed for every random draw (operator selection, removals, acceptance)
    pub random_seed: u64,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            enable_parallel_candidate_generation: false,
            enable_candidate_filtering: false,
            candidate_generation_strategy: CandidateStrategy::default(),
            max_templates_per_crop: default_max_templates(),
            start_date_stride_days: default_stride(),
            candidate_date_tolerance_days: None,
            initial_algorithm: InitialAlgorithm::default(),
            enable_local_search: default_true(),
            max_local_search_iterations: default_ls_iterations(),
            enable_alns: false,
            alns_iterations: default_alns_iterations(),
            alns_removal_rate: default_removal_rate(),
            area_adjustment_multipliers: default_area_multipliers(),
            max_period_replace_alternatives: default_period_alternatives(),
            enable_neighbor_sampling: false,
            random_seed: default_seed(),
        }
    }
}

impl OptimizationConfig {
    /// Reject out-of-range options (fail-fast per the request contract)
    pub fn validate(&self) -> AcreResult<()> {
        if self.start_date_stride_days == 0 {
            return Err(AcreError::Config(
                "start_date_stride_days must be at least 1".into(),
            ));
        }
        if self.max_templates_per_crop == 0 {
            return Err(AcreError::Config(
                "max_templates_per_crop must be at least 1".into(),
            ));
        }
        if !(self.alns_removal_rate > 0.0 && self.alns_removal_rate <= 1.0) {
            return Err(AcreError::Config(format!(
                "alns_removal_rate must lie in (0, 1], got {}",
                self.alns_removal_rate
            )));
        }
        if self
            .area_adjustment_multipliers
            .iter()
            .any(|&m| !(m > 0.0) || !m.is_finite())
        {
            return Err(AcreError::Config(
                "area_adjustment_multipliers must all be positive and finite".into(),
            ));
        }
        Ok(())
    }
}

/// One requested crop, optionally with an inline profile override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropSpec {
    pub crop_id: CropId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variety: Option<String>,
    /// Desired cultivated area (advisory; the optimizer may use less)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_area: Option<f64>,
    /// Inline profile; when absent the profile is resolved by id/variety
    /// from the supplied profile set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<CropProfile>,
}

/// A complete planning request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRequest {
    pub fields: Vec<Field>,
    pub horizon: PlanningHorizon,
    #[serde(default)]
    pub objective: Objective,
    /// Wall-clock budget in seconds; on expiry the best-known solution is
    /// returned flagged as not optimal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_computation_time_secs: Option<f64>,
    pub crops: Vec<CropSpec>,
    #[serde(default)]
    pub config: OptimizationConfig,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<InteractionRule>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_match_contract() {
        let config = OptimizationConfig::default();
        assert_eq!(config.start_date_stride_days, 7);
        assert_eq!(config.max_local_search_iterations, 100);
        assert_eq!(config.alns_iterations, 200);
        assert!((config.alns_removal_rate - 0.3).abs() < 1e-9);
        assert_eq!(config.max_templates_per_crop, 200);
        assert!(config.enable_local_search);
        assert!(!config.enable_alns);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_rejects_bad_removal_rate() {
        let config = OptimizationConfig {
            alns_removal_rate: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn sparse_request_json_fills_defaults() {
        let json = r#"{
            "fields": [{"id": "f1", "name": "Field 1", "area": 100.0, "daily_fixed_cost": 5.0}],
            "horizon": {"start": "2025-04-01", "end": "2025-09-30"},
            "crops": [{"crop_id": "tomato"}]
        }"#;
        let request: OptimizationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.objective, Objective::MaximizeProfit);
        assert_eq!(request.fields[0].fallow_period_days, 28);
        assert_eq!(request.config.random_seed, 42);
        assert!(request.rules.is_empty());
    }

    #[test]
    fn objective_score_orientation() {
        assert_eq!(Objective::MaximizeProfit.score(120.0, 80.0), 120.0);
        assert_eq!(Objective::MinimizeCost.score(120.0, 80.0), -80.0);
    }
}
