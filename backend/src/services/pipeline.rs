//! Pipeline orchestrator: validate, then predict, balance, assign, summarize.
//!
//! The four stages run strictly in order and never call back into an earlier
//! one. Invalid top-level input aborts before the first stage with a typed
//! error and no partial result; everything below that degrades gracefully
//! inside the stages.

use crate::api::{EmergencyPlan, PlanningInput};
use crate::config::PlannerConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::models::{TelemetrySnapshot, WaterNetwork};
use crate::services::{allocation, assignment, prediction, summary};

/// Check the fail-fast preconditions for a planning run.
fn validate_inputs(
    network: &WaterNetwork,
    telemetry: &TelemetrySnapshot,
    input: &PlanningInput,
) -> PipelineResult<()> {
    if network.zones.is_empty() {
        return Err(PipelineError::EmptyTopology("zones"));
    }
    if network.stations.is_empty() {
        return Err(PipelineError::EmptyTopology("stations"));
    }
    if telemetry.zone_reading_count() == 0 {
        return Err(PipelineError::MissingTelemetry("zone readings"));
    }
    let duration = input.duration.value();
    if !duration.is_finite() || duration <= 0.0 {
        return Err(PipelineError::InvalidDuration(duration));
    }
    Ok(())
}

/// Run one complete planning pass over an immutable input snapshot.
///
/// Deterministic and idempotent: identical inputs always produce the
/// identical plan, and nothing is carried over between calls. Callers in a
/// live setting must serialize invocations against a shared telemetry store,
/// since each run performs cumulative in-run capacity accounting.
pub fn run_emergency_plan(
    network: &WaterNetwork,
    telemetry: &TelemetrySnapshot,
    input: &PlanningInput,
    config: &PlannerConfig,
) -> PipelineResult<EmergencyPlan> {
    validate_inputs(network, telemetry, input)?;

    log::debug!(
        "Planning run: {} zones, {} towers, {} stations, {:.1}h window",
        network.zones.len(),
        network.towers.len(),
        network.stations.len(),
        input.duration.value()
    );

    let predictions = prediction::predict_shortages(&network.zones, telemetry, input, config);
    log::debug!("Predicted shortages for {} zones", predictions.len());

    let donors = allocation::classify_donors(&predictions, telemetry, input);
    let allocations = allocation::allocate_water(network, telemetry, &predictions, input);
    log::debug!(
        "Allocated water to {} of {} deficit zones ({} donors)",
        allocations.iter().filter(|a| a.allocated).count(),
        allocations.len(),
        donors.len()
    );

    let assignments = assignment::assign_stations(network, &allocations, telemetry);
    log::debug!("Assigned {} delivery stations", assignments.len());

    let summary = summary::summarize(&allocations, telemetry, donors.len());

    Ok(EmergencyPlan {
        predictions,
        allocations,
        assignments,
        summary,
    })
}
