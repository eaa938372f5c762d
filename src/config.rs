//! Layered settings.
//!
//! Defaults, then an optional TOML file, then `SENSORWATCH__*` environment
//! variables. Command-line flags are applied on top by the binary.
//!
//! ```toml
//! [endpoints]
//! bulk_url = "http://127.0.0.1:8000/data/accelerometer"
//! stream_url = "ws://127.0.0.1:8000/ws/data"
//!
//! [buffer]
//! max_points = 100
//!
//! [reconnect]
//! initial_delay = "250ms"
//! max_delay = "15s"
//! ```

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::buffer::MAX_DATA_POINTS;
use crate::data::duration;
use crate::error::FeedError;
use crate::source::ReconnectConfig;

/// Environment variable prefix, e.g. `SENSORWATCH__BUFFER__MAX_POINTS=200`.
pub const ENV_PREFIX: &str = "SENSORWATCH";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub endpoints: EndpointSettings,
    pub buffer: BufferSettings,
    pub fetch: FetchSettings,
    pub reconnect: ReconnectSettings,
    pub chart: ChartSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EndpointSettings {
    /// Bulk endpoint returning recent samples newest-first.
    pub bulk_url: String,
    /// WebSocket endpoint pushing one sample per message.
    pub stream_url: String,
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            bulk_url: "http://127.0.0.1:8000/data/accelerometer".to_string(),
            stream_url: "ws://127.0.0.1:8000/ws/data".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BufferSettings {
    /// Maximum samples kept (the cap).
    pub max_points: usize,
    /// Rows shown in the latest-readings table.
    pub table_rows: usize,
}

impl Default for BufferSettings {
    fn default() -> Self {
        Self {
            max_points: MAX_DATA_POINTS,
            table_rows: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    #[serde(deserialize_with = "duration::deserialize")]
    pub timeout: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReconnectSettings {
    #[serde(deserialize_with = "duration::deserialize")]
    pub initial_delay: Duration,
    #[serde(deserialize_with = "duration::deserialize")]
    pub max_delay: Duration,
    pub backoff_factor: f64,
    /// 0 retries forever.
    pub max_attempts: u32,
}

impl Default for ReconnectSettings {
    fn default() -> Self {
        let defaults = ReconnectConfig::default();
        Self {
            initial_delay: defaults.initial_delay,
            max_delay: defaults.max_delay,
            backoff_factor: defaults.backoff_factor,
            max_attempts: 0,
        }
    }
}

impl ReconnectSettings {
    pub fn to_config(&self) -> ReconnectConfig {
        ReconnectConfig {
            initial_delay: self.initial_delay,
            max_delay: self.max_delay,
            backoff_factor: self.backoff_factor,
            max_attempts: (self.max_attempts > 0).then_some(self.max_attempts),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    pub y_min: f64,
    pub y_max: f64,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            y_min: -3000.0,
            y_max: 3000.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// EnvFilter directive used when `RUST_LOG` is unset.
    pub filter: String,
    /// Log file for the interactive UI.
    pub file: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "sensorwatch=info".to_string(),
            file: "sensorwatch.log".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from an optional file plus the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, FeedError> {
        Self::load_from(path, ENV_PREFIX)
    }

    fn load_from(path: Option<&Path>, env_prefix: &str) -> Result<Self, FeedError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }
        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(env_prefix)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| FeedError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the feed cannot run with.
    pub fn validate(&self) -> Result<(), FeedError> {
        if self.buffer.max_points == 0 {
            return Err(FeedError::Config("buffer.max_points must be at least 1".into()));
        }
        if self.chart.y_min >= self.chart.y_max {
            return Err(FeedError::Config("chart.y_min must be below chart.y_max".into()));
        }
        if self.reconnect.backoff_factor < 1.0 {
            return Err(FeedError::Config("reconnect.backoff_factor must be >= 1".into()));
        }
        if self.reconnect.initial_delay > self.reconnect.max_delay {
            return Err(FeedError::Config(
                "reconnect.initial_delay must not exceed reconnect.max_delay".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_toml(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.buffer.max_points, 100);
        assert_eq!(settings.buffer.table_rows, 10);
        assert_eq!(settings.endpoints.stream_url, "ws://127.0.0.1:8000/ws/data");
        assert_eq!(settings.chart.y_min, -3000.0);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let file = write_toml(
            r#"
            [endpoints]
            bulk_url = "http://sensors.local/data/accelerometer"

            [buffer]
            max_points = 250

            [reconnect]
            initial_delay = "1s"
            max_delay = "1m"
            max_attempts = 5
            "#,
        );

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.endpoints.bulk_url, "http://sensors.local/data/accelerometer");
        assert_eq!(settings.endpoints.stream_url, "ws://127.0.0.1:8000/ws/data");
        assert_eq!(settings.buffer.max_points, 250);

        let reconnect = settings.reconnect.to_config();
        assert_eq!(reconnect.initial_delay, Duration::from_secs(1));
        assert_eq!(reconnect.max_delay, Duration::from_secs(60));
        assert_eq!(reconnect.max_attempts, Some(5));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let settings = Settings::load(Some(Path::new("/nonexistent/sensorwatch.toml"))).unwrap();
        assert_eq!(settings.buffer.max_points, 100);
        assert_eq!(settings.reconnect.to_config().max_attempts, None);
    }

    #[test]
    fn test_rejects_zero_cap() {
        let file = write_toml("[buffer]\nmax_points = 0\n");
        let err = Settings::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("max_points"));
    }

    #[test]
    fn test_rejects_bad_duration() {
        let file = write_toml("[fetch]\ntimeout = \"soon\"\n");
        assert!(Settings::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_rejects_inverted_chart_bounds() {
        let mut settings = Settings::default();
        settings.chart.y_min = 10.0;
        settings.chart.y_max = -10.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_rejects_shrinking_backoff() {
        let file = write_toml("[reconnect]\nbackoff_factor = 0.5\n");
        let err = Settings::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("backoff_factor"));
    }

    #[test]
    fn test_rejects_initial_delay_above_max() {
        let file = write_toml("[reconnect]\ninitial_delay = \"20s\"\nmax_delay = \"5s\"\n");
        let err = Settings::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("initial_delay"));
    }

    #[test]
    fn test_load_without_file() {
        let settings = Settings::load(None).unwrap();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_environment_overrides_file() {
        // Own prefix so parallel tests reading SENSORWATCH__* are unaffected.
        const PREFIX: &str = "SENSORWATCH_ENVTEST";
        std::env::set_var("SENSORWATCH_ENVTEST__BUFFER__MAX_POINTS", "200");
        std::env::set_var("SENSORWATCH_ENVTEST__RECONNECT__MAX_DELAY", "30s");

        let from_env = Settings::load_from(None, PREFIX).unwrap();
        assert_eq!(from_env.buffer.max_points, 200);
        assert_eq!(from_env.reconnect.max_delay, Duration::from_secs(30));

        let file = write_toml("[buffer]\nmax_points = 50\ntable_rows = 4\n");
        let layered = Settings::load_from(Some(file.path()), PREFIX).unwrap();
        assert_eq!(layered.buffer.max_points, 200);
        assert_eq!(layered.buffer.table_rows, 4);

        std::env::remove_var("SENSORWATCH_ENVTEST__BUFFER__MAX_POINTS");
        std::env::remove_var("SENSORWATCH_ENVTEST__RECONNECT__MAX_DELAY");
    }
}
