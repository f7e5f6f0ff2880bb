//! # EWRS Rust Backend
//!
//! Emergency water redistribution planning engine.
//!
//! This crate computes a deterministic redistribution plan for a small network
//! of administrative zones (barangays), supply towers, and pumping stations
//! during a water-supply emergency. Given static network topology and a live
//! telemetry snapshot, it runs a strictly linear three-stage pipeline:
//!
//! 1. **Shortage prediction**: risk-ranks every zone from its flow and drop
//!    telemetry over the operator-chosen emergency window.
//! 2. **Water balancing**: a greedy priority-first allocation that fills each
//!    deficit zone from surplus zones first, then from towers, under
//!    per-source capacity caps.
//! 3. **Delivery assignment**: routes each tower-fed recipient to its nearest
//!    eligible pumping station without exceeding tower capacity.
//!
//! A summary reduction folds the results into reporting totals.
//!
//! ## Architecture
//!
//! - [`api`]: domain types and derived result types
//! - [`config`]: planner configuration loaded from `planner.toml`
//! - [`models`]: static topology and live telemetry snapshots
//! - [`services`]: the pipeline stages and their orchestrator
//!
//! The whole pipeline is a pure function over immutable input snapshots: no
//! global state, no persistence between runs, and identical inputs always
//! produce identical plans. Callers own data acquisition and presentation;
//! the boundary here is an in-process function call.

pub mod api;

pub mod config;
pub mod error;
pub mod models;

pub mod services;
