//! Agronomic interaction rules.
//!
//! Rules model predecessor/successor and companion effects as multiplicative
//! revenue impacts keyed by crop group tags. An impact of 1.0 is neutral,
//! below 1.0 a penalty, above 1.0 a bonus, and exactly 0.0 forbids
//! cultivation (callers discard the candidate or arc).

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::AcreError;

/// The agronomic mechanism a rule models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Same-group crops planted back to back on one field
    ContinuousCultivation,
    /// A rotation sequence known to improve the successor
    BeneficialRotation,
    /// Crops that benefit from sharing space or time
    CompanionPlanting,
    /// Chemical inhibition between species
    Allelopathy,
    /// Soil suitability between a field group and a crop group
    SoilCompatibility,
    /// Climate suitability between a field group and a crop group
    ClimateCompatibility,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::ContinuousCultivation => "continuous_cultivation",
            RuleKind::BeneficialRotation => "beneficial_rotation",
            RuleKind::CompanionPlanting => "companion_planting",
            RuleKind::Allelopathy => "allelopathy",
            RuleKind::SoilCompatibility => "soil_compatibility",
            RuleKind::ClimateCompatibility => "climate_compatibility",
        }
    }
}

impl FromStr for RuleKind {
    type Err = AcreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "continuous_cultivation" => Ok(RuleKind::ContinuousCultivation),
            "beneficial_rotation" => Ok(RuleKind::BeneficialRotation),
            "companion_planting" => Ok(RuleKind::CompanionPlanting),
            "allelopathy" => Ok(RuleKind::Allelopathy),
            "soil_compatibility" => Ok(RuleKind::SoilCompatibility),
            "climate_compatibility" => Ok(RuleKind::ClimateCompatibility),
            other => Err(AcreError::Parse(format!("unknown rule type '{}'", other))),
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One interaction rule between crop (or field) group tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRule {
    /// Stable rule identifier
    pub id: String,
    pub kind: RuleKind,
    /// Group tag the rule originates from (predecessor crop or field)
    pub source_group: String,
    /// Group tag the rule applies to (successor or companion crop)
    pub target_group: String,
    /// Multiplicative revenue impact (typically 0.0 to 1.5)
    pub impact_ratio: f64,
    /// Directional rules match source→target only; symmetric rules match
    /// either direction
    pub directional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl InteractionRule {
    pub fn new(
        id: impl Into<String>,
        kind: RuleKind,
        source_group: impl Into<String>,
        target_group: impl Into<String>,
        impact_ratio: f64,
        directional: bool,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            source_group: source_group.into(),
            target_group: target_group.into(),
            impact_ratio,
            directional,
            description: None,
        }
    }

    /// Set the human-readable description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// True if this rule applies between the given tag sets.
    ///
    /// Matching is by membership: the rule fires when `source_group` is in
    /// the source tags and `target_group` is in the target tags; symmetric
    /// rules also fire with the roles reversed.
    pub fn matches(&self, source_tags: &[String], target_tags: &[String]) -> bool {
        let forward = source_tags.iter().any(|t| t == &self.source_group)
            && target_tags.iter().any(|t| t == &self.target_group);
        if forward {
            return true;
        }
        if self.directional {
            return false;
        }
        source_tags.iter().any(|t| t == &self.target_group)
            && target_tags.iter().any(|t| t == &self.source_group)
    }

    /// True if this rule forbids cultivation outright
    pub fn is_forbidding(&self) -> bool {
        self.impact_ratio == 0.0
    }
}
