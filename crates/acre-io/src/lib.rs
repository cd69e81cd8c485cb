//! # acre-io: File Gateways for the Planning Engine
//!
//! Importers for the collaborator data the engine consumes:
//!
//! - [`weather`] - daily weather series from JSON or CSV (Open-Meteo column
//!   conventions)
//! - [`profiles`] - crop profile documents
//! - [`rules`] - interaction rule lists
//! - [`request`] - full planning request documents
//!
//! Each module also provides a file-backed implementation of the matching
//! `acre-algo` source trait, so a caller can wire files straight into
//! [`acre_algo::optimize_with_sources`]. All failures map onto
//! [`acre_core::AcreError`]: I/O problems as `Io`, malformed documents as
//! `Parse`, entity-level problems as `Validation`.

pub mod profiles;
pub mod request;
pub mod rules;
pub mod weather;

pub use profiles::{read_crop_profiles, FileCropProfileSource};
pub use request::read_request;
pub use rules::{read_interaction_rules, FileInteractionRuleSource};
pub use weather::{read_weather_series, FileWeatherSource};
