//! # acre-core: Crop Planning Domain Core
//!
//! Provides the fundamental data structures for multi-field crop allocation
//! planning.
//!
//! ## Design Philosophy
//!
//! All domain entities are **immutable value types**:
//! - **Fields** and **crops** are constructed once per planning call and
//!   shared behind `Arc` by every candidate and allocation that refers to
//!   them. There is no cyclic ownership anywhere in the model.
//! - **Weather** is an ordered daily series, validated on construction.
//! - **Candidates** are fully simulated planting options; **allocations**
//!   are candidates adopted into a solution with final, rescored economics.
//!
//! ## Quick Start
//!
//! ```rust
//! use acre_core::{Crop, CropId, Field, FieldId};
//!
//! let field = Field::new(FieldId::new("north-40"), "North 40", 1000.0, 12.5)
//!     .with_fallow_period(21)
//!     .with_location("riverside");
//!
//! let crop = Crop::new(CropId::new("tomato"), "Tomato", 0.25)
//!     .with_revenue_per_area(18.0)
//!     .with_groups(["Solanaceae"]);
//!
//! assert_eq!(field.fallow_period_days, 21);
//! assert!(crop.groups.contains(&"Solanaceae".to_string()));
//! ```
//!
//! ## Core Data Structures
//!
//! - [`Field`] / [`Crop`] - the physical and biological planning units
//! - [`CropProfile`] - a crop plus its ordered growth-stage requirements
//! - [`WeatherSeries`] - validated daily weather observations
//! - [`InteractionRule`] - agronomic predecessor/companion effects
//! - [`AllocationCandidate`] / [`CropAllocation`] / [`Solution`] - the
//!   optimizer's currency
//! - [`OptimizationResult`] - solution plus totals, schedules, diagnostics
//! - Type-safe IDs: [`FieldId`], [`CropId`], [`AllocationId`]
//!
//! ## Modules
//!
//! - [`diagnostics`] - warning/error collection carried on results
//! - [`error`] - the unified [`AcreError`] type
//! - [`profile`] - growth stages, temperature/sunshine/thermal profiles
//! - [`weather`] - daily observations and series validation
//! - [`rules`] - interaction rules and rule kinds
//! - [`plan`] - candidates, allocations, solutions, results

use serde::{Deserialize, Serialize};

pub mod diagnostics;
pub mod error;
pub mod plan;
pub mod profile;
pub mod rules;
pub mod weather;

pub use diagnostics::{DiagnosticIssue, Diagnostics, Severity};
pub use error::{AcreError, AcreResult};
pub use plan::{
    AllocationCandidate, CropAllocation, FieldSchedule, OptimizationResult, PlanningHorizon,
    ScheduleEntry, Solution,
};
pub use profile::{
    CropProfile, GrowthStage, StressImpacts, SunshineProfile, TemperatureProfile,
    ThermalRequirement,
};
pub use rules::{InteractionRule, RuleKind};
pub use weather::{DailyWeather, WeatherSeries};

/// Default mandatory rest period between successive plantings on a field.
pub const DEFAULT_FALLOW_PERIOD_DAYS: u32 = 28;

// Newtype wrappers for IDs for type safety

/// Stable identifier for a [`Field`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(String);

/// Stable identifier for a [`Crop`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CropId(String);

/// Identifier for a [`CropAllocation`], assigned sequentially within one
/// planning call so results are reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllocationId(u64);

impl FieldId {
    pub fn new(value: impl Into<String>) -> Self {
        FieldId(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl CropId {
    pub fn new(value: impl Into<String>) -> Self {
        CropId(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AllocationId {
    pub fn new(value: u64) -> Self {
        AllocationId(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for FieldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for CropId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for AllocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "alloc#{}", self.0)
    }
}

/// An agricultural field: the physical unit crops are allocated to.
///
/// Immutable once constructed. Shared behind `Arc` by candidates and
/// allocations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Stable identifier
    pub id: FieldId,
    /// Human-readable name
    pub name: String,
    /// Total cultivable area (m²)
    pub area: f64,
    /// Fixed cost per day of occupation (currency/day)
    pub daily_fixed_cost: f64,
    /// Mandatory rest days between successive plantings
    #[serde(default = "default_fallow")]
    pub fallow_period_days: u32,
    /// Optional textual location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

fn default_fallow() -> u32 {
    DEFAULT_FALLOW_PERIOD_DAYS
}

impl Field {
    /// Create a new field with the default fallow period
    pub fn new(id: FieldId, name: impl Into<String>, area: f64, daily_fixed_cost: f64) -> Self {
        Self {
            id,
            name: name.into(),
            area,
            daily_fixed_cost,
            fallow_period_days: DEFAULT_FALLOW_PERIOD_DAYS,
            location: None,
        }
    }

    /// Set the fallow period in days
    pub fn with_fallow_period(mut self, days: u32) -> Self {
        self.fallow_period_days = days;
        self
    }

    /// Set the textual location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Basic sanity checks on field parameters
    pub fn validate(&self) -> AcreResult<()> {
        if self.id.as_str().is_empty() {
            return Err(AcreError::Validation("field id must not be empty".into()));
        }
        if !(self.area > 0.0) {
            return Err(AcreError::Validation(format!(
                "field '{}': area must be positive, got {}",
                self.id, self.area
            )));
        }
        if self.daily_fixed_cost < 0.0 {
            return Err(AcreError::Validation(format!(
                "field '{}': daily fixed cost must not be negative",
                self.id
            )));
        }
        Ok(())
    }
}

/// A crop that can be planted: the biological planning unit.
///
/// Immutable once constructed. Shared behind `Arc` by candidates and
/// allocations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crop {
    /// Stable identifier
    pub id: CropId,
    /// Human-readable name
    pub name: String,
    /// Optional variety name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variety: Option<String>,
    /// Area occupied per planted unit (m²/unit)
    pub area_per_unit: f64,
    /// Revenue per cultivated area (currency/m²)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue_per_area: Option<f64>,
    /// Per-allocation revenue cap (currency)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_revenue: Option<f64>,
    /// Group tags used for interaction rule matching (e.g. "Solanaceae")
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
}

impl Crop {
    /// Create a new crop with no revenue information or group tags
    pub fn new(id: CropId, name: impl Into<String>, area_per_unit: f64) -> Self {
        Self {
            id,
            name: name.into(),
            variety: None,
            area_per_unit,
            revenue_per_area: None,
            max_revenue: None,
            groups: Vec::new(),
        }
    }

    /// Set the variety name
    pub fn with_variety(mut self, variety: impl Into<String>) -> Self {
        self.variety = Some(variety.into());
        self
    }

    /// Set the revenue per cultivated area
    pub fn with_revenue_per_area(mut self, revenue: f64) -> Self {
        self.revenue_per_area = Some(revenue);
        self
    }

    /// Set the per-allocation revenue cap
    pub fn with_max_revenue(mut self, cap: f64) -> Self {
        self.max_revenue = Some(cap);
        self
    }

    /// Set the interaction group tags
    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    /// Basic sanity checks on crop parameters
    pub fn validate(&self) -> AcreResult<()> {
        if self.id.as_str().is_empty() {
            return Err(AcreError::Validation("crop id must not be empty".into()));
        }
        if !(self.area_per_unit > 0.0) {
            return Err(AcreError::Validation(format!(
                "crop '{}': area per unit must be positive",
                self.id
            )));
        }
        if let Some(r) = self.revenue_per_area {
            if r < 0.0 {
                return Err(AcreError::Validation(format!(
                    "crop '{}': revenue per area must not be negative",
                    self.id
                )));
            }
        }
        Ok(())
    }
}
