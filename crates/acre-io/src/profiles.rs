//! Crop profile documents.
//!
//! A profile file holds either one profile object or a list of them. The
//! document shape mirrors the entity model directly:
//!
//! ```json
//! {
//!   "crop": {"id": "tomato", "name": "Tomato", "area_per_unit": 0.25,
//!            "revenue_per_area": 18.0, "groups": ["Solanaceae"]},
//!   "stages": [
//!     {"order": 1, "name": "vegetative",
//!      "temperature": {"base_temperature": 10.0, "optimal_min": 20.0,
//!                      "optimal_max": 28.0, "low_stress_threshold": 12.0,
//!                      "high_stress_threshold": 30.0, "frost_threshold": 2.0,
//!                      "max_temperature": 35.0},
//!      "sunshine": {"minimum_hours": 4.0, "target_hours": 8.0},
//!      "thermal": {"required_gdd": 600.0}}
//!   ]
//! }
//! ```

use serde::Deserialize;
use std::fs;
use std::path::Path;

use acre_core::{AcreError, AcreResult, CropId, CropProfile};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProfileDocument {
    Many(Vec<CropProfile>),
    One(Box<CropProfile>),
}

/// Read and validate crop profiles from a JSON file.
pub fn read_crop_profiles(path: &Path) -> AcreResult<Vec<CropProfile>> {
    let content = fs::read_to_string(path)?;
    let document: ProfileDocument = serde_json::from_str(&content)
        .map_err(|e| AcreError::Parse(format!("{}: {}", path.display(), e)))?;
    let profiles = match document {
        ProfileDocument::Many(profiles) => profiles,
        ProfileDocument::One(profile) => vec![*profile],
    };
    for profile in &profiles {
        profile.validate()?;
    }
    Ok(profiles)
}

/// File-backed [`acre_algo::CropProfileSource`].
pub struct FileCropProfileSource {
    profiles: Vec<CropProfile>,
}

impl FileCropProfileSource {
    /// Load and validate the profile set eagerly.
    pub fn open(path: &Path) -> AcreResult<Self> {
        Ok(Self {
            profiles: read_crop_profiles(path)?,
        })
    }

    pub fn profiles(&self) -> &[CropProfile] {
        &self.profiles
    }
}

impl acre_algo::CropProfileSource for FileCropProfileSource {
    fn profile(&self, crop_id: &CropId, variety: Option<&str>) -> AcreResult<CropProfile> {
        self.profiles
            .iter()
            .find(|p| {
                p.crop.id == *crop_id
                    && (variety.is_none() || p.crop.variety.as_deref() == variety)
            })
            .cloned()
            .ok_or_else(|| {
                AcreError::Validation(format!(
                    "no profile for crop '{}'{}",
                    crop_id,
                    variety.map(|v| format!(" variety '{}'", v)).unwrap_or_default()
                ))
            })
    }
}
