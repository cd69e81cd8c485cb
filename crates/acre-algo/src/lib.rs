//! # acre-algo: Multi-Field Crop Allocation Engine
//!
//! This crate provides the allocation optimizer: it decides which crops to
//! grow on which fields, starting when and over how much area, so aggregate
//! net profit over the planning horizon is maximized.
//!
//! ## Pipeline
//!
//! | Stage | Module | Role |
//! |-------|--------|------|
//! | Simulate | [`growth`] | Advance a crop through its stages over daily weather |
//! | Generate | [`candidates`] | Enumerate feasible (field, crop, start, area) options |
//! | Seed | [`dp`] / [`greedy`] | Per-field optimal chains, or cross-field greedy |
//! | Improve | [`local_search`] / [`alns`] | Hill climbing or adaptive destroy/repair |
//! | Package | [`orchestrator`] | Validation, re-scoring, schedules, diagnostics |
//!
//! ## Architecture
//!
//! The improvement phase uses a strategy pattern: every transformation is a
//! [`neighbors::NeighborOperation`] behind a common trait, and the registry
//! in [`neighbors::standard_operators`] is the fixed set the search draws
//! from. Adding an operator never touches the search loops.
//!
//! Determinism is a hard requirement: identical requests with identical
//! seeds produce byte-identical results. All randomness flows from one
//! seeded `StdRng` owned by the planning call, candidates are merged and
//! sorted deterministically even when generated in parallel, and allocation
//! ids are sequential per call.
//!
//! ## Example
//!
//! ```ignore
//! use acre_algo::{optimize, OptimizationRequest};
//!
//! let request: OptimizationRequest = serde_json::from_str(&document)?;
//! let result = optimize(&request, &weather, &profiles)?;
//! println!("{}", result.summary());
//! ```

pub mod alns;
pub mod candidates;
pub mod deadline;
pub mod dp;
pub mod greedy;
pub mod growth;
pub mod interaction;
pub mod local_search;
pub mod neighbors;
pub mod orchestrator;
pub mod request;
pub mod solution_ops;
pub mod sources;

pub use alns::alns_optimize;
pub use candidates::{generate_candidates, CropPlan, AREA_FRACTIONS};
pub use deadline::Deadline;
pub use dp::{select_field_plan, FieldPlan};
pub use greedy::build_greedy_solution;
pub use growth::{simulate_growth, DailyProgress, GrowthError, GrowthOutcome};
pub use interaction::{soil_recovery_factor, InteractionMatrix};
pub use local_search::local_search;
pub use neighbors::{standard_operators, NeighborContext, NeighborOperation};
pub use orchestrator::{optimize, optimize_with_sources};
pub use request::{
    CandidateStrategy, CropSpec, InitialAlgorithm, Objective, OptimizationConfig,
    OptimizationRequest,
};
pub use solution_ops::{rescore_solution, solution_score, AllocationIdSource};
pub use sources::{CropProfileSource, InteractionRuleSource, WeatherSource};
