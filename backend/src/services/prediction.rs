//! Shortage prediction: risk-ranks every zone for the planning window.
//!
//! Scoring is a ranking heuristic, not a hydraulic model: the g-score is a
//! flow deficit against a fixed reference flow, the h-score an estimated
//! time-to-shortage under linear decay, and their sum orders the output
//! least-safe first. That ordering is the tie-break authority for every
//! downstream consumer that iterates predictions.

use crate::api::{PlanningInput, ShortagePrediction, Zone, ZoneStatus};
use crate::config::PlannerConfig;
use crate::models::{TelemetrySnapshot, ZoneReading};
use qtty::Hours;

/// Compute one prediction per zone, sorted by non-increasing f-score.
///
/// Zones without a live reading default to Safe with infinite time to
/// shortage and rank last; the gap is logged as a non-fatal warning.
pub fn predict_shortages(
    zones: &[Zone],
    telemetry: &TelemetrySnapshot,
    input: &PlanningInput,
    config: &PlannerConfig,
) -> Vec<ShortagePrediction> {
    let mut predictions: Vec<ShortagePrediction> = zones
        .iter()
        .map(|zone| match telemetry.zone_reading(&zone.id) {
            Some(reading) => predict_zone(zone, reading, input, config),
            None => {
                log::warn!("No live reading for zone '{}'; defaulting to Safe", zone.id);
                ShortagePrediction {
                    zone: zone.clone(),
                    g_score: 0.0,
                    h_score: f64::INFINITY,
                    f_score: f64::INFINITY,
                    time_to_shortage: Hours::new(f64::INFINITY),
                    status: ZoneStatus::Safe,
                    water_needed_to_be_safe_l: None,
                }
            }
        })
        .collect();

    // Most urgent first. Zones without a reading always rank after zones
    // with one, even though their placeholder f-score is +inf.
    predictions.sort_by(|a, b| {
        let a_missing = a.water_needed_to_be_safe_l.is_none();
        let b_missing = b.water_needed_to_be_safe_l.is_none();
        match (a_missing, b_missing) {
            (false, true) => std::cmp::Ordering::Less,
            (true, false) => std::cmp::Ordering::Greater,
            _ => b
                .f_score
                .partial_cmp(&a.f_score)
                .unwrap_or(std::cmp::Ordering::Equal),
        }
    });
    predictions
}

fn predict_zone(
    zone: &Zone,
    reading: &ZoneReading,
    input: &PlanningInput,
    config: &PlannerConfig,
) -> ShortagePrediction {
    let flow = reading.current_flow_rate_lps;
    let threshold = reading.threshold_lps;

    let g_score = config.reference_flow_lps - flow;
    let h_score = reading.hours_to_threshold();
    let f_score = g_score + h_score;

    let status = if flow < threshold {
        ZoneStatus::Critical
    } else if flow == threshold || h_score <= config.warning_window_hours {
        ZoneStatus::Warning
    } else {
        ZoneStatus::Safe
    };

    ShortagePrediction {
        zone: zone.clone(),
        g_score,
        h_score,
        f_score,
        time_to_shortage: Hours::new(h_score),
        status,
        water_needed_to_be_safe_l: Some(reading.water_needed_l(input.duration)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{GeoPoint, LiveZoneReading, ZoneId};

    fn zone(id: &str) -> Zone {
        Zone {
            id: ZoneId::new(id),
            name: format!("Zone {}", id),
            location: GeoPoint { lat: 14.65, lng: 121.1 },
        }
    }

    fn live(id: &str, flow: f64, drop: f64) -> LiveZoneReading {
        LiveZoneReading {
            zone_id: ZoneId::new(id),
            current_flow_rate_lps: flow,
            drop_rate_lps_per_hour: drop,
            threshold_lps: None,
            recorded_at: None,
        }
    }

    fn predict(
        zones: &[Zone],
        readings: &[LiveZoneReading],
        duration_hours: f64,
    ) -> Vec<ShortagePrediction> {
        let config = PlannerConfig::default();
        let telemetry = TelemetrySnapshot::from_readings(
            readings,
            &[],
            config.default_safety_threshold_lps,
        );
        let input = PlanningInput::new(duration_hours).unwrap();
        predict_shortages(zones, &telemetry, &input, &config)
    }

    #[test]
    fn test_below_threshold_is_critical() {
        let predictions = predict(&[zone("B4")], &[live("B4", 15.0, 2.5)], 3.0);
        assert_eq!(predictions[0].status, ZoneStatus::Critical);
        // g = 50 - 15 = 35, h = (15 - 20) / 2.5 = -2
        assert_eq!(predictions[0].g_score, 35.0);
        assert_eq!(predictions[0].h_score, -2.0);
        assert_eq!(predictions[0].f_score, 33.0);
    }

    #[test]
    fn test_zero_drop_rate_infinite_h_score() {
        // Above threshold with no decay: never reaches shortage.
        let predictions = predict(&[zone("B1")], &[live("B1", 30.0, 0.0)], 3.0);
        assert!(predictions[0].h_score.is_infinite());
        assert!(predictions[0].time_to_shortage.value().is_infinite());
        assert_eq!(predictions[0].status, ZoneStatus::Safe);

        // Below threshold the raw comparison still wins regardless of decay.
        let predictions = predict(&[zone("B2")], &[live("B2", 12.0, 0.0)], 3.0);
        assert_eq!(predictions[0].status, ZoneStatus::Critical);
    }

    #[test]
    fn test_at_threshold_is_warning() {
        let predictions = predict(&[zone("B2")], &[live("B2", 20.0, 1.5)], 3.0);
        assert_eq!(predictions[0].status, ZoneStatus::Warning);
    }

    #[test]
    fn test_inside_warning_window() {
        // h = (22 - 20) / 2 = 1h, exactly on the window boundary.
        let predictions = predict(&[zone("B1")], &[live("B1", 22.0, 2.0)], 3.0);
        assert_eq!(predictions[0].status, ZoneStatus::Warning);

        // h = (24 - 20) / 2 = 2h, outside the window.
        let predictions = predict(&[zone("B1")], &[live("B1", 24.0, 2.0)], 3.0);
        assert_eq!(predictions[0].status, ZoneStatus::Safe);
    }

    #[test]
    fn test_water_needed_present_and_nonnegative() {
        let predictions = predict(
            &[zone("B1"), zone("B3")],
            &[live("B1", 25.0, 2.0), live("B3", 35.0, 1.8)],
            3.0,
        );
        for p in &predictions {
            let needed = p.water_needed_to_be_safe_l.unwrap();
            assert!(needed >= 0.0);
        }
        // B1: target = 20 + 6 = 26, deficit 1 L/s -> 3600 L
        let b1 = predictions
            .iter()
            .find(|p| p.zone.id == ZoneId::new("B1"))
            .unwrap();
        assert!((b1.water_needed_to_be_safe_l.unwrap() - 3600.0).abs() < 1e-6);
        // B3: target = 25.4 < 35, no deficit
        let b3 = predictions
            .iter()
            .find(|p| p.zone.id == ZoneId::new("B3"))
            .unwrap();
        assert_eq!(b3.water_needed_to_be_safe_l.unwrap(), 0.0);
    }

    #[test]
    fn test_sorted_descending_by_f_score() {
        let predictions = predict(
            &[zone("B1"), zone("B2"), zone("B4")],
            &[
                live("B1", 25.0, 2.0),
                live("B2", 20.0, 1.5),
                live("B4", 15.0, 2.5),
            ],
            3.0,
        );
        for pair in predictions.windows(2) {
            assert!(pair[0].f_score >= pair[1].f_score);
        }
        // B4 (f = 33) outranks B2 (f = 30) outranks B1 (f = 27.5)
        assert_eq!(predictions[0].zone.id, ZoneId::new("B4"));
        assert_eq!(predictions[1].zone.id, ZoneId::new("B2"));
        assert_eq!(predictions[2].zone.id, ZoneId::new("B1"));
    }

    #[test]
    fn test_missing_reading_defaults_safe_and_ranks_last() {
        let predictions = predict(
            &[zone("B9"), zone("B4")],
            &[live("B4", 15.0, 2.5)],
            3.0,
        );
        let last = predictions.last().unwrap();
        assert_eq!(last.zone.id, ZoneId::new("B9"));
        assert_eq!(last.status, ZoneStatus::Safe);
        assert!(last.f_score.is_infinite());
        assert!(last.water_needed_to_be_safe_l.is_none());
    }
}
