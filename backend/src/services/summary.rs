//! Summary reduction over one planning run.

use crate::api::{SystemSummary, WaterAllocation};
use crate::models::TelemetrySnapshot;

/// Fold allocations and tower telemetry into reporting totals.
///
/// `donor_count` is the number of aid-eligible zones found by the balancer's
/// donor classification for the same run.
pub fn summarize(
    allocations: &[WaterAllocation],
    telemetry: &TelemetrySnapshot,
    donor_count: usize,
) -> SystemSummary {
    SystemSummary {
        total_water_needed_l: allocations.iter().map(|a| a.water_needed_l).sum(),
        total_water_available_l: telemetry.total_tower_water_l(),
        total_water_allocated_l: allocations.iter().map(|a| a.water_allocated_l).sum(),
        zones_aid_eligible: donor_count,
        zones_helped: allocations.iter().filter(|a| a.allocated).count(),
        zones_needing_help: allocations.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{GeoPoint, LiveTowerReading, TowerId, WaterAllocation, Zone, ZoneId, ZoneStatus};

    fn allocation(id: &str, needed: f64, allocated: f64) -> WaterAllocation {
        WaterAllocation {
            zone: Zone {
                id: ZoneId::new(id),
                name: id.to_string(),
                location: GeoPoint { lat: 14.65, lng: 121.1 },
            },
            allocated: allocated > 0.0,
            water_needed_l: needed,
            water_allocated_l: allocated,
            priority: 10,
            status: ZoneStatus::Critical,
            water_sources: vec![],
        }
    }

    #[test]
    fn test_summary_totals() {
        let telemetry = TelemetrySnapshot::from_readings(
            &[],
            &[
                LiveTowerReading {
                    tower_id: TowerId::new("WT1"),
                    current_water_l: 80000.0,
                    recorded_at: None,
                },
                LiveTowerReading {
                    tower_id: TowerId::new("WT2"),
                    current_water_l: 120000.0,
                    recorded_at: None,
                },
            ],
            20.0,
        );
        let allocations = vec![
            allocation("B4", 45000.0, 45000.0),
            allocation("B2", 16200.0, 5000.0),
            allocation("B1", 3600.0, 0.0),
        ];

        let summary = summarize(&allocations, &telemetry, 2);
        assert!((summary.total_water_needed_l - 64800.0).abs() < 1e-9);
        assert!((summary.total_water_available_l - 200000.0).abs() < 1e-9);
        assert!((summary.total_water_allocated_l - 50000.0).abs() < 1e-9);
        assert_eq!(summary.zones_aid_eligible, 2);
        assert_eq!(summary.zones_helped, 2);
        assert_eq!(summary.zones_needing_help, 3);
    }

    #[test]
    fn test_summary_empty() {
        let telemetry = TelemetrySnapshot::from_readings(&[], &[], 20.0);
        let summary = summarize(&[], &telemetry, 0);
        assert_eq!(summary.total_water_needed_l, 0.0);
        assert_eq!(summary.total_water_available_l, 0.0);
        assert_eq!(summary.zones_needing_help, 0);
    }
}
