//! Public data model for the emergency water redistribution pipeline.
//!
//! This file consolidates the domain types shared across the pipeline stages:
//! identifier newtypes, static topology records, live telemetry wire types,
//! and the derived result types produced by each stage. All types derive
//! Serialize/Deserialize so the reporting layer can consume plans as JSON.

use chrono::{DateTime, Utc};
use qtty::Hours;
use serde::{Deserialize, Serialize};

/// Zone (barangay) identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ZoneId(pub String);

/// Water tower identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(pub String);

/// Pumping station identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StationId(pub String);

impl ZoneId {
    pub fn new(value: impl Into<String>) -> Self {
        ZoneId(value.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl TowerId {
    pub fn new(value: impl Into<String>) -> Self {
        TowerId(value.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl StationId {
    pub fn new(value: impl Into<String>) -> Self {
        StationId(value.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ZoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::fmt::Display for TowerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::fmt::Display for StationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Geographic point (latitude, longitude).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    /// Latitude in decimal degrees (-90 to 90)
    pub lat: f64,
    /// Longitude in decimal degrees (-180 to 180)
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Result<Self, String> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err("Latitude must be between -90 and 90 degrees".to_string());
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err("Longitude must be between -180 and 180 degrees".to_string());
        }
        Ok(GeoPoint { lat, lng })
    }
}

// ============================================================================
// Static topology
// ============================================================================

/// Administrative zone (barangay), the smallest unit tracked for supply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    pub location: GeoPoint,
}

/// Bulk water reservoir feeding one or more pumping stations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tower {
    pub id: TowerId,
    pub name: String,
    pub location: GeoPoint,
    /// Maximum stored volume in liters
    pub max_capacity_l: f64,
}

/// Physical pumping/delivery point eligible to serve specific zones.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    pub location: GeoPoint,
    /// Minimum required output flow in L/s
    pub min_flow_rate_lps: f64,
    pub priority: u32,
    pub population_served: u32,
}

/// One entry of the sparse station-zone eligibility matrix.
///
/// Absence of an entry means the station may not serve the zone at all, not
/// that serving it is free.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EligibilityEntry {
    pub station_id: StationId,
    pub zone_id: ZoneId,
    /// Pipe/route distance in kilometers
    pub distance_km: f64,
    /// Abstract delivery cost (distance, time, or pipe losses)
    pub cost: f64,
}

/// Physical feed line from a tower to a station. A tower may feed several
/// stations; the order of the link list is the authoritative tower iteration
/// order for the balancer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TowerStationLink {
    pub tower_id: TowerId,
    pub station_id: StationId,
    /// Transfer efficiency of the feed line (0..=1)
    pub efficiency: f64,
}

// ============================================================================
// Live telemetry (wire form)
// ============================================================================

/// Per-zone sensor reading for one planning cycle.
///
/// `threshold_lps` is optional on the wire; zones without their own calibrated
/// threshold fall back to the global default from [`crate::config::PlannerConfig`]
/// when the telemetry snapshot is built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LiveZoneReading {
    pub zone_id: ZoneId,
    /// Current flow rate in L/s
    pub current_flow_rate_lps: f64,
    /// Flow depreciation rate in L/s per hour
    pub drop_rate_lps_per_hour: f64,
    /// Per-zone safety threshold in L/s, if calibrated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold_lps: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<DateTime<Utc>>,
}

/// Per-tower stored-volume reading for one planning cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LiveTowerReading {
    pub tower_id: TowerId,
    /// Water currently stored, in liters
    pub current_water_l: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<DateTime<Utc>>,
}

/// Operator-supplied planning input: the emergency window length.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PlanningInput {
    pub duration: Hours,
}

impl PlanningInput {
    pub fn new(duration_hours: f64) -> Result<Self, String> {
        if !duration_hours.is_finite() || duration_hours <= 0.0 {
            return Err("Emergency duration must be a positive number of hours".to_string());
        }
        Ok(PlanningInput {
            duration: Hours::new(duration_hours),
        })
    }
}

// ============================================================================
// Derived results
// ============================================================================

/// Zone supply status for the planning window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneStatus {
    Safe,
    Warning,
    Critical,
}

impl ZoneStatus {
    /// Allocation priority weight: Critical zones are served first.
    pub fn priority_weight(self) -> u32 {
        match self {
            ZoneStatus::Critical => 10,
            ZoneStatus::Warning => 5,
            ZoneStatus::Safe => 1,
        }
    }
}

impl std::fmt::Display for ZoneStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZoneStatus::Safe => write!(f, "Safe"),
            ZoneStatus::Warning => write!(f, "Warning"),
            ZoneStatus::Critical => write!(f, "Critical"),
        }
    }
}

/// Risk-ranked shortage prediction for one zone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShortagePrediction {
    pub zone: Zone,
    /// Flow-deficit proxy relative to the configured reference flow
    pub g_score: f64,
    /// Estimated hours until flow crosses the safety threshold (may be +inf)
    pub h_score: f64,
    /// g + h, the ranking key (descending = most urgent first)
    pub f_score: f64,
    pub time_to_shortage: Hours,
    pub status: ZoneStatus,
    /// One-hour-equivalent volume deficit in liters; `None` only when the
    /// zone had no live reading this cycle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_needed_to_be_safe_l: Option<f64>,
}

/// One recorded draw from a supply source, in the order drawn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum WaterSource {
    /// Surplus transferred from another zone.
    Donor {
        zone_id: ZoneId,
        name: String,
        amount_l: f64,
    },
    /// Water drawn from a supply tower, to be delivered via a station.
    Tower {
        tower_id: TowerId,
        name: String,
        amount_l: f64,
    },
}

impl WaterSource {
    pub fn amount_l(&self) -> f64 {
        match self {
            WaterSource::Donor { amount_l, .. } => *amount_l,
            WaterSource::Tower { amount_l, .. } => *amount_l,
        }
    }

    pub fn is_tower(&self) -> bool {
        matches!(self, WaterSource::Tower { .. })
    }
}

impl std::fmt::Display for WaterSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WaterSource::Donor { name, amount_l, .. } => {
                write!(f, "{} ({:.0} L)", name, amount_l)
            }
            WaterSource::Tower { name, amount_l, .. } => {
                write!(f, "{} tower ({:.0} L)", name, amount_l)
            }
        }
    }
}

/// Allocation outcome for one deficit zone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WaterAllocation {
    pub zone: Zone,
    /// True if any nonzero amount was allocated
    pub allocated: bool,
    pub water_needed_l: f64,
    pub water_allocated_l: f64,
    pub priority: u32,
    pub status: ZoneStatus,
    /// Per-source contributions, in the order drawn
    pub water_sources: Vec<WaterSource>,
}

/// Delivery workload for one pumping station that actually delivers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StationAssignment {
    pub station: Station,
    pub assigned_zones: Vec<Zone>,
    pub total_water_delivered_l: f64,
    /// Sum of the assigned zones' delivery legs, in kilometers
    pub total_distance_km: f64,
}

/// Reporting totals folded from one pipeline run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SystemSummary {
    pub total_water_needed_l: f64,
    pub total_water_available_l: f64,
    pub total_water_allocated_l: f64,
    /// Zones stable enough to donate surplus through the whole window
    pub zones_aid_eligible: usize,
    /// Recipient zones that received a nonzero allocation
    pub zones_helped: usize,
    /// Zones that needed water at all
    pub zones_needing_help: usize,
}

/// Complete output snapshot of one planning run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmergencyPlan {
    pub predictions: Vec<ShortagePrediction>,
    pub allocations: Vec<WaterAllocation>,
    pub assignments: Vec<StationAssignment>,
    pub summary: SystemSummary,
}
