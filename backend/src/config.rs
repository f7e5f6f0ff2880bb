//! Planner configuration.
//!
//! Loaded from a `planner.toml` file; every field has a default so an empty
//! file (or no file at all, via [`PlannerConfig::default`]) yields the
//! calibration the original network was commissioned with.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

fn default_safety_threshold_lps() -> f64 {
    20.0
}

fn default_reference_flow_lps() -> f64 {
    50.0
}

fn default_warning_window_hours() -> f64 {
    1.0
}

/// Calibration constants for the shortage predictor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PlannerConfig {
    /// Global safety threshold in L/s, used for zones whose telemetry does
    /// not carry a per-zone calibrated threshold.
    #[serde(default = "default_safety_threshold_lps")]
    pub default_safety_threshold_lps: f64,

    /// Reference flow in L/s for the g-score deficit proxy. Not physically
    /// calibrated; a ranking heuristic only.
    #[serde(default = "default_reference_flow_lps")]
    pub reference_flow_lps: f64,

    /// Zones whose time-to-shortage falls inside this window are flagged
    /// Warning even while still above threshold.
    #[serde(default = "default_warning_window_hours")]
    pub warning_window_hours: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            default_safety_threshold_lps: default_safety_threshold_lps(),
            reference_flow_lps: default_reference_flow_lps(),
            warning_window_hours: default_warning_window_hours(),
        }
    }
}

impl PlannerConfig {
    /// Load planner configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(PlannerConfig)` if successful
    /// * `Err(PipelineError)` if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            PipelineError::Configuration(format!("Failed to read config file: {}", e))
        })?;

        let config: PlannerConfig = toml::from_str(&content).map_err(|e| {
            PipelineError::Configuration(format!("Failed to parse config file: {}", e))
        })?;

        Ok(config)
    }

    /// Load planner configuration from the default location.
    ///
    /// Searches for `planner.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    ///
    /// Falls back to [`PlannerConfig::default`] when no file exists; a file
    /// that exists but fails to parse is still an error.
    pub fn from_default_location() -> Result<Self, PipelineError> {
        let search_paths = vec![
            PathBuf::from("planner.toml"),
            PathBuf::from("backend/planner.toml"),
            PathBuf::from("../planner.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(PlannerConfig::default())
    }
}
