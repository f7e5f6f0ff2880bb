//! Pipeline stages for emergency water redistribution planning.
//!
//! Each stage is a pure function over immutable snapshots; the orchestrator
//! in [`pipeline`] wires them together in their fixed order (predict,
//! balance, assign, summarize) after validating preconditions.

pub mod allocation;

pub mod assignment;

pub mod pipeline;

pub mod prediction;

pub mod summary;

pub use allocation::{allocate_water, classify_donors, DonorCapacity};
pub use assignment::assign_stations;
pub use pipeline::run_emergency_plan;
pub use prediction::predict_shortages;
pub use summary::summarize;
