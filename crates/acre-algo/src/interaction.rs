//! Agronomic interaction evaluation and the soil-recovery bonus.
//!
//! The evaluator composes every matching rule multiplicatively; a product of
//! 0.0 forbids the pairing outright. Soil recovery is a separate bonus per
//! successor allocation, a function of the fallow gap alone.

use acre_core::InteractionRule;

/// Fallow gap below which no soil-recovery bonus accrues (days).
pub const SOIL_RECOVERY_MIN_DAYS: i64 = 28;
/// Fallow gap at which the soil-recovery bonus saturates (days).
pub const SOIL_RECOVERY_FULL_DAYS: i64 = 60;
/// Maximum soil-recovery revenue bonus (+10%).
pub const SOIL_RECOVERY_MAX_BONUS: f64 = 0.10;

/// Immutable rule set with multiplicative impact queries.
#[derive(Debug, Clone, Default)]
pub struct InteractionMatrix {
    rules: Vec<InteractionRule>,
}

impl InteractionMatrix {
    pub fn new(rules: Vec<InteractionRule>) -> Self {
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[InteractionRule] {
        &self.rules
    }

    /// Product of the impact ratios of every rule matching the given tag
    /// sets. 1.0 when nothing matches; 0.0 when any matching rule forbids.
    pub fn impact(&self, source_tags: &[String], target_tags: &[String]) -> f64 {
        self.rules
            .iter()
            .filter(|r| r.matches(source_tags, target_tags))
            .map(|r| r.impact_ratio)
            .product()
    }

    /// True when the pairing is forbidden (impact product is exactly zero)
    pub fn forbids(&self, source_tags: &[String], target_tags: &[String]) -> bool {
        self.impact(source_tags, target_tags) == 0.0
    }
}

/// Soil-recovery revenue multiplier for a successor planted `gap_days` after
/// its predecessor completed.
///
/// 1.0 below 28 days, rising linearly to 1.10 at 60 days, flat beyond.
/// Negative gaps (which a feasible solution never produces) earn no bonus.
pub fn soil_recovery_factor(gap_days: i64) -> f64 {
    if gap_days < SOIL_RECOVERY_MIN_DAYS {
        return 1.0;
    }
    let progress = ((gap_days - SOIL_RECOVERY_MIN_DAYS) as f64)
        / ((SOIL_RECOVERY_FULL_DAYS - SOIL_RECOVERY_MIN_DAYS) as f64);
    1.0 + SOIL_RECOVERY_MAX_BONUS * progress.min(1.0)
}
