//! Live telemetry snapshot for one planning cycle.
//!
//! Raw sensor readings arrive as flat lists; the snapshot resolves them into
//! maps keyed by zone/tower id so the pipeline stages never rescan arrays,
//! and fixes the per-zone safety threshold (falling back to the configured
//! global default where telemetry carries none).
//!
//! The snapshot is read-only for the duration of one run. Refreshing it
//! between runs is the caller's job.

use crate::api::{LiveTowerReading, LiveZoneReading, TowerId, ZoneId};
use chrono::{DateTime, Utc};
use qtty::Hours;
use std::collections::HashMap;

/// A zone reading with its safety threshold resolved to a concrete value.
///
/// Hosts the derived quantities shared by the predictor and the balancer so
/// the two stages can never drift apart on the formulas.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneReading {
    pub zone_id: ZoneId,
    pub current_flow_rate_lps: f64,
    pub drop_rate_lps_per_hour: f64,
    pub threshold_lps: f64,
    pub recorded_at: Option<DateTime<Utc>>,
}

impl ZoneReading {
    /// Minimum flow rate the zone must sustain through the whole emergency
    /// window without crossing its safety threshold, projected backward from
    /// the drop rate.
    pub fn target_flow_rate_lps(&self, duration: Hours) -> f64 {
        let drop_rate_per_second = self.drop_rate_lps_per_hour / 3600.0;
        self.threshold_lps + drop_rate_per_second * duration.value() * 3600.0
    }

    /// Estimated hours until flow crosses the threshold under linear decay.
    /// A zero (or negative) drop rate never reaches the threshold: +infinity.
    pub fn hours_to_threshold(&self) -> f64 {
        if self.drop_rate_lps_per_hour > 0.0 {
            (self.current_flow_rate_lps - self.threshold_lps) / self.drop_rate_lps_per_hour
        } else {
            f64::INFINITY
        }
    }

    /// One-hour-equivalent volume deficit, in liters, needed to sustain the
    /// target flow for the whole window. Zero when the zone is already at or
    /// above target.
    pub fn water_needed_l(&self, duration: Hours) -> f64 {
        let deficit = self.target_flow_rate_lps(duration) - self.current_flow_rate_lps;
        if deficit > 0.0 {
            deficit * 3600.0
        } else {
            0.0
        }
    }

    /// Volume the zone can give away while still ending the window at or
    /// above its own target flow.
    pub fn max_safe_donation_l(&self, duration: Hours) -> f64 {
        ((self.current_flow_rate_lps - self.target_flow_rate_lps(duration)) * 3600.0).max(0.0)
    }
}

/// Immutable live-data snapshot: keyed zone and tower readings.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetrySnapshot {
    zone_readings: HashMap<ZoneId, ZoneReading>,
    tower_readings: HashMap<TowerId, LiveTowerReading>,
    /// Tower ids in the order the readings arrived; the deterministic
    /// fallback iteration order for towers outside the feed-link list.
    tower_order: Vec<TowerId>,
}

impl TelemetrySnapshot {
    /// Build a snapshot from raw readings. A later reading for the same zone
    /// or tower replaces an earlier one. Zones without a calibrated threshold
    /// get `default_threshold_lps`.
    pub fn from_readings(
        zone_readings: &[LiveZoneReading],
        tower_readings: &[LiveTowerReading],
        default_threshold_lps: f64,
    ) -> Self {
        let mut zones = HashMap::new();
        for reading in zone_readings {
            zones.insert(
                reading.zone_id.clone(),
                ZoneReading {
                    zone_id: reading.zone_id.clone(),
                    current_flow_rate_lps: reading.current_flow_rate_lps,
                    drop_rate_lps_per_hour: reading.drop_rate_lps_per_hour,
                    threshold_lps: reading.threshold_lps.unwrap_or(default_threshold_lps),
                    recorded_at: reading.recorded_at,
                },
            );
        }

        let mut towers = HashMap::new();
        let mut tower_order = Vec::new();
        for reading in tower_readings {
            if !towers.contains_key(&reading.tower_id) {
                tower_order.push(reading.tower_id.clone());
            }
            towers.insert(reading.tower_id.clone(), reading.clone());
        }

        TelemetrySnapshot {
            zone_readings: zones,
            tower_readings: towers,
            tower_order,
        }
    }

    pub fn zone_reading(&self, id: &ZoneId) -> Option<&ZoneReading> {
        self.zone_readings.get(id)
    }

    pub fn tower_reading(&self, id: &TowerId) -> Option<&LiveTowerReading> {
        self.tower_readings.get(id)
    }

    pub fn zone_reading_count(&self) -> usize {
        self.zone_readings.len()
    }

    /// Tower ids in reading-arrival order.
    pub fn tower_order(&self) -> &[TowerId] {
        &self.tower_order
    }

    /// Total stored water across all towers with a reading, in liters.
    /// Summed in reading-arrival order so the total is reproducible.
    pub fn total_tower_water_l(&self) -> f64 {
        self.tower_order
            .iter()
            .filter_map(|id| self.tower_readings.get(id))
            .map(|r| r.current_water_l)
            .sum()
    }
}
