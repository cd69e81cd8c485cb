//! Interaction rule documents.
//!
//! A rule file is a JSON list of flat records:
//!
//! ```json
//! [{"rule_id": "r1", "rule_type": "continuous_cultivation",
//!   "source_group": "Solanaceae", "target_group": "Solanaceae",
//!   "impact_ratio": 0.7, "is_directional": true,
//!   "description": "yield decline under tomato monoculture"}]
//! ```

use serde::Deserialize;
use std::fs;
use std::path::Path;

use acre_core::{AcreError, AcreResult, InteractionRule, RuleKind};

#[derive(Debug, Deserialize)]
struct RawRule {
    rule_id: String,
    rule_type: String,
    source_group: String,
    target_group: String,
    impact_ratio: f64,
    is_directional: bool,
    #[serde(default)]
    description: Option<String>,
}

impl RawRule {
    fn into_rule(self) -> AcreResult<InteractionRule> {
        let kind: RuleKind = self.rule_type.parse()?;
        let mut rule = InteractionRule::new(
            self.rule_id,
            kind,
            self.source_group,
            self.target_group,
            self.impact_ratio,
            self.is_directional,
        );
        if let Some(description) = self.description {
            rule = rule.with_description(description);
        }
        Ok(rule)
    }
}

/// Read interaction rules from a JSON file.
pub fn read_interaction_rules(path: &Path) -> AcreResult<Vec<InteractionRule>> {
    let content = fs::read_to_string(path)?;
    let raw: Vec<RawRule> = serde_json::from_str(&content)
        .map_err(|e| AcreError::Parse(format!("{}: {}", path.display(), e)))?;
    raw.into_iter().map(RawRule::into_rule).collect()
}

/// File-backed [`acre_algo::InteractionRuleSource`].
pub struct FileInteractionRuleSource {
    path: std::path::PathBuf,
}

impl FileInteractionRuleSource {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl acre_algo::InteractionRuleSource for FileInteractionRuleSource {
    fn rules(&self) -> AcreResult<Vec<InteractionRule>> {
        read_interaction_rules(&self.path)
    }
}
