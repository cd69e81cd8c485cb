//! Planning request documents.
//!
//! A request file is the JSON form of [`OptimizationRequest`]; every
//! configuration knob is optional and defaults per the engine contract.

use std::fs;
use std::path::Path;

use acre_algo::OptimizationRequest;
use acre_core::{AcreError, AcreResult};

/// Read a planning request from a JSON file.
pub fn read_request(path: &Path) -> AcreResult<OptimizationRequest> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| AcreError::Parse(format!("{}: {}", path.display(), e)))
}
