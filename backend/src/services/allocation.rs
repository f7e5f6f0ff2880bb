//! Water balancing: greedy multi-source allocation to deficit zones.
//!
//! Recipients are served one at a time in priority order (Critical first).
//! Each draw comes from donor zones first (most stable donors drained first
//! so the least-safe donors keep capacity for later recipients), then from
//! towers in feed-link order, each tower tracked individually. Remaining
//! capacity persists across recipients within one call and is never rolled
//! back: a single irrevocable greedy pass, deterministic and explainable
//! rather than globally optimal.

use crate::api::{
    PlanningInput, ShortagePrediction, TowerId, WaterAllocation, WaterSource, Zone, ZoneId,
    ZoneStatus,
};
use crate::models::{TelemetrySnapshot, WaterNetwork};
use std::collections::HashMap;

/// A zone stable enough to share surplus through the whole window.
#[derive(Debug, Clone, PartialEq)]
pub struct DonorCapacity {
    pub zone: Zone,
    pub time_to_shortage_hours: f64,
    /// Volume the donor can give while still ending the window at or above
    /// its own target flow, in liters.
    pub max_safe_donation_l: f64,
}

/// Find the zones that can donate water this cycle.
///
/// A donor must stay above its threshold past the whole emergency window
/// (`time_to_shortage > duration`) and have a positive safe-donation volume.
/// Output is sorted most-stable-first (descending time to shortage).
pub fn classify_donors(
    predictions: &[ShortagePrediction],
    telemetry: &TelemetrySnapshot,
    input: &PlanningInput,
) -> Vec<DonorCapacity> {
    let mut donors: Vec<DonorCapacity> = predictions
        .iter()
        .filter(|p| p.time_to_shortage.value() > input.duration.value())
        .filter_map(|p| {
            let reading = telemetry.zone_reading(&p.zone.id)?;
            let max_safe_donation_l = reading.max_safe_donation_l(input.duration);
            if max_safe_donation_l > 0.0 {
                Some(DonorCapacity {
                    zone: p.zone.clone(),
                    time_to_shortage_hours: p.time_to_shortage.value(),
                    max_safe_donation_l,
                })
            } else {
                None
            }
        })
        .collect();

    donors.sort_by(|a, b| {
        b.time_to_shortage_hours
            .partial_cmp(&a.time_to_shortage_hours)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    donors
}

struct Recipient {
    zone: Zone,
    water_needed_l: f64,
    priority: u32,
    status: ZoneStatus,
}

/// Allocate water to every zone with a predicted deficit.
///
/// Returns one allocation per deficit zone, in the order served. Zones whose
/// predicted `water_needed_to_be_safe` is zero (or that lack a reading) are
/// not recipients, whatever their raw status flag says.
pub fn allocate_water(
    network: &WaterNetwork,
    telemetry: &TelemetrySnapshot,
    predictions: &[ShortagePrediction],
    input: &PlanningInput,
) -> Vec<WaterAllocation> {
    let mut recipients: Vec<Recipient> = predictions
        .iter()
        .filter_map(|p| {
            let water_needed_l = p.water_needed_to_be_safe_l?;
            if water_needed_l > 0.0 {
                Some(Recipient {
                    zone: p.zone.clone(),
                    water_needed_l,
                    priority: p.status.priority_weight(),
                    status: p.status,
                })
            } else {
                None
            }
        })
        .collect();
    // Stable: ties keep the predictor's urgency order.
    recipients.sort_by_key(|r| std::cmp::Reverse(r.priority));

    let donors = classify_donors(predictions, telemetry, input);
    let mut donor_remaining: HashMap<ZoneId, f64> = donors
        .iter()
        .map(|d| (d.zone.id.clone(), d.max_safe_donation_l))
        .collect();

    // Towers are tracked individually, never pooled. Draw order is the
    // feed-link list first, then any remaining towers with readings in
    // telemetry arrival order so no stored water is stranded.
    let mut tower_order: Vec<TowerId> = Vec::new();
    for tower_id in network.linked_tower_order() {
        if telemetry.tower_reading(tower_id).is_some() {
            tower_order.push(tower_id.clone());
        }
    }
    for tower_id in telemetry.tower_order() {
        if !tower_order.contains(tower_id) {
            tower_order.push(tower_id.clone());
        }
    }
    let mut tower_remaining: HashMap<TowerId, f64> = tower_order
        .iter()
        .filter_map(|id| {
            telemetry
                .tower_reading(id)
                .map(|r| (id.clone(), r.current_water_l))
        })
        .collect();

    let mut allocations = Vec::with_capacity(recipients.len());
    for recipient in &recipients {
        // Summed in draw order, not map order: the pool bounds the partial
        // grant below, and float addition order must not vary between calls.
        let donor_total: f64 = donors
            .iter()
            .filter_map(|d| donor_remaining.get(&d.zone.id))
            .sum();
        let tower_total: f64 = tower_order
            .iter()
            .filter_map(|id| tower_remaining.get(id))
            .sum();
        let available = donor_total + tower_total;

        // Full, partial, or nothing: the draw loop below stops at whichever
        // bound is hit first.
        let mut remaining_need = recipient.water_needed_l.min(available);
        let mut sources: Vec<WaterSource> = Vec::new();

        for donor in &donors {
            if remaining_need <= 0.0 {
                break;
            }
            if let Some(donor_left) = donor_remaining.get_mut(&donor.zone.id) {
                let draw = remaining_need.min(*donor_left);
                if draw > 0.0 {
                    sources.push(WaterSource::Donor {
                        zone_id: donor.zone.id.clone(),
                        name: donor.zone.name.clone(),
                        amount_l: draw,
                    });
                    *donor_left -= draw;
                    remaining_need -= draw;
                }
            }
        }

        for tower_id in &tower_order {
            if remaining_need <= 0.0 {
                break;
            }
            if let Some(tower_left) = tower_remaining.get_mut(tower_id) {
                let draw = remaining_need.min(*tower_left);
                if draw > 0.0 {
                    let name = network
                        .tower(tower_id)
                        .map(|t| t.name.clone())
                        .unwrap_or_else(|| tower_id.value().to_string());
                    sources.push(WaterSource::Tower {
                        tower_id: tower_id.clone(),
                        name,
                        amount_l: draw,
                    });
                    *tower_left -= draw;
                    remaining_need -= draw;
                }
            }
        }

        let water_allocated_l: f64 = sources.iter().map(|s| s.amount_l()).sum();
        allocations.push(WaterAllocation {
            zone: recipient.zone.clone(),
            allocated: water_allocated_l > 0.0,
            water_needed_l: recipient.water_needed_l,
            water_allocated_l,
            priority: recipient.priority,
            status: recipient.status,
            water_sources: sources,
        });
    }

    allocations
}
