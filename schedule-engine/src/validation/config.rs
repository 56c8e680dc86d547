//! Validation thresholds.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::domain::TransportMode;

/// Error loading a [`ValidationConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid parameters for {mode}: {reason}")]
    InvalidSpeeds {
        mode: String,
        reason: &'static str,
    },
}

/// Thresholds that depend on the transport mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeParameters {
    /// Slowest plausible speed between stops (km/h).
    pub speed_min_kmh: u32,

    /// Speed above which a segment is suspicious (km/h).
    pub speed_warning_kmh: u32,

    /// Speed above which a segment is impossible (km/h).
    pub speed_max_kmh: u32,

    /// Largest deviation of one segment's duration from the average over
    /// journeys sharing the pattern (seconds).
    pub inter_stop_duration_variation_max_seconds: i64,

    /// Whether journeys of this mode may appear in the dataset at all.
    pub allowed: bool,
}

impl ModeParameters {
    pub fn new(speed_min_kmh: u32, speed_warning_kmh: u32, speed_max_kmh: u32) -> Self {
        Self {
            speed_min_kmh,
            speed_warning_kmh,
            speed_max_kmh,
            ..Self::default()
        }
    }

    fn check(&self, mode: &str) -> Result<(), ConfigError> {
        let invalid = |reason| ConfigError::InvalidSpeeds {
            mode: mode.to_string(),
            reason,
        };
        if self.speed_min_kmh > self.speed_warning_kmh {
            return Err(invalid("minimum speed is above warning speed"));
        }
        if self.speed_warning_kmh > self.speed_max_kmh {
            return Err(invalid("warning speed is above maximum speed"));
        }
        if self.inter_stop_duration_variation_max_seconds < 0 {
            return Err(invalid("duration variation is negative"));
        }
        Ok(())
    }
}

impl Default for ModeParameters {
    fn default() -> Self {
        Self {
            speed_min_kmh: 5,
            speed_warning_kmh: 100,
            speed_max_kmh: 150,
            inter_stop_duration_variation_max_seconds: 600, // 10 minutes
            allowed: true,
        }
    }
}

/// Configuration parameters for schedule validation.
///
/// Every field has a default, so a configuration file only needs to name
/// the values it changes:
///
/// ```
/// use schedule_engine::domain::TransportMode;
/// use schedule_engine::validation::ValidationConfig;
///
/// let config = ValidationConfig::from_json_str(
///     r#"{"interchange_max_distance_m": 250, "modes": {"bus": {"speed_max_kmh": 90}}}"#,
/// ).unwrap();
///
/// assert_eq!(config.interchange_max_distance_m, 250);
/// assert_eq!(config.mode(TransportMode::Bus).speed_max_kmh, 90);
/// assert_eq!(config.interchange_max_wait_seconds, 3600);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Stop-area distance above which an interchange is suspicious (metres).
    /// Zero disables the distance checks.
    pub interchange_max_distance_m: u32,

    /// Wait above which an interchange is suspicious (seconds).
    /// Zero disables the wait checks.
    pub interchange_max_wait_seconds: i64,

    /// Longest dwell between arrival and departure at one stop (seconds).
    pub inter_stop_duration_max_seconds: i64,

    /// Reject journeys whose mode is not allowed.
    pub check_allowed_transport_modes: bool,

    /// The dataset is a single file checked without its surrounding
    /// network: checks that need the whole referential are skipped.
    pub standalone: bool,

    /// Per-mode overrides of [`default_mode`](Self::default_mode).
    pub modes: HashMap<TransportMode, ModeParameters>,

    /// Parameters for modes without an entry in `modes`.
    pub default_mode: ModeParameters,
}

impl ValidationConfig {
    /// Create a configuration with the given interchange and dwell limits
    /// and default per-mode parameters.
    pub fn new(
        interchange_max_distance_m: u32,
        interchange_max_wait_seconds: i64,
        inter_stop_duration_max_seconds: i64,
    ) -> Self {
        Self {
            interchange_max_distance_m,
            interchange_max_wait_seconds,
            inter_stop_duration_max_seconds,
            ..Self::default()
        }
    }

    /// Load a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.default_mode.check("default mode")?;
        for (mode, parameters) in &config.modes {
            parameters.check(mode.as_str())?;
        }
        Ok(config)
    }

    /// Parameters for a mode, falling back to the defaults.
    pub fn mode(&self, mode: TransportMode) -> &ModeParameters {
        self.modes.get(&mode).unwrap_or(&self.default_mode)
    }

    pub fn with_mode(mut self, mode: TransportMode, parameters: ModeParameters) -> Self {
        self.modes.insert(mode, parameters);
        self
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            interchange_max_distance_m: 500,
            interchange_max_wait_seconds: 3600, // 1 hour
            inter_stop_duration_max_seconds: 300,
            check_allowed_transport_modes: false,
            standalone: false,
            modes: HashMap::new(),
            default_mode: ModeParameters::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config() {
        let config = ValidationConfig::default();

        assert_eq!(config.interchange_max_distance_m, 500);
        assert_eq!(config.interchange_max_wait_seconds, 3600);
        assert_eq!(config.inter_stop_duration_max_seconds, 300);
        assert!(!config.check_allowed_transport_modes);
        assert!(!config.standalone);
        assert!(config.modes.is_empty());
    }

    #[test]
    fn custom_config() {
        let config = ValidationConfig::new(200, 1800, 120)
            .with_mode(TransportMode::Rail, ModeParameters::new(10, 200, 250));

        assert_eq!(config.interchange_max_distance_m, 200);
        assert_eq!(config.interchange_max_wait_seconds, 1800);
        assert_eq!(config.inter_stop_duration_max_seconds, 120);
        assert_eq!(config.mode(TransportMode::Rail).speed_max_kmh, 250);
        assert!(config.mode(TransportMode::Rail).allowed);
    }

    #[test]
    fn unknown_mode_uses_defaults() {
        let config = ValidationConfig::default()
            .with_mode(TransportMode::Rail, ModeParameters::new(10, 200, 250));

        assert_eq!(config.mode(TransportMode::Ferry), &ModeParameters::default());
    }

    #[test]
    fn partial_mode_entry_keeps_other_defaults() {
        let config = ValidationConfig::from_json_str(
            r#"{"modes": {"tram": {"allowed": false}}, "standalone": true}"#,
        )
        .unwrap();

        let tram = config.mode(TransportMode::Tram);
        assert!(!tram.allowed);
        assert_eq!(tram.speed_max_kmh, 150);
        assert!(config.standalone);
    }

    #[test]
    fn inconsistent_speeds_are_rejected() {
        let err = ValidationConfig::from_json_str(
            r#"{"modes": {"bus": {"speed_warning_kmh": 90, "speed_max_kmh": 60}}}"#,
        )
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "invalid parameters for bus: warning speed is above maximum speed"
        );
    }

    #[test]
    fn unknown_mode_name_is_a_json_error() {
        let err = ValidationConfig::from_json_str(r#"{"modes": {"zeppelin": {}}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"inter_stop_duration_max_seconds": 90}}"#).unwrap();

        let config = ValidationConfig::from_path(file.path()).unwrap();
        assert_eq!(config.inter_stop_duration_max_seconds, 90);
        assert_eq!(config.interchange_max_distance_m, 500);
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        let err = ValidationConfig::from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("absent.json"));
    }
}
