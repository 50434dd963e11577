//! Configuration using Figment
//!
//! Configuration is layered from:
//! 1. built-in defaults
//! 2. a TOML file (`phidget_accel.toml` unless a path is given)
//! 3. environment variables prefixed with `PHIDGET_`
//!
//! ```text
//! PHIDGET_SERIAL=12345
//! PHIDGET_ATTACH_TIMEOUT_MS=0
//! PHIDGET_CHANGE_TRIGGERS="[0.05, 0.05, 0.1]"
//! PHIDGET_LOG_LEVEL=debug
//! ```
//!
//! # Example
//!
//! ```toml
//! serial = 12345            # omit to accept any device
//! attach_timeout_ms = 5000  # 0 waits forever
//! change_triggers = [0.05, 0.05, 0.1]
//! channel_capacity = 256
//! log_level = "info"
//! ```

use std::path::Path;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::accelerometer::MAX_CHANNEL_CAPACITY;
use crate::error::{Error, Result};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "phidget_accel.toml";

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "PHIDGET_";

/// Settings for opening and monitoring an accelerometer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccelConfig {
    /// Serial number to open; `None` accepts any device.
    pub serial: Option<i32>,
    /// Attachment timeout in milliseconds (0 = wait forever)
    pub attach_timeout_ms: u64,
    /// Per-axis change triggers in g, applied after attachment.
    pub change_triggers: Vec<f64>,
    /// Capacity of the event channel used by `subscribe`
    pub channel_capacity: usize,
    /// Logging level (trace, debug, info, warn, error); `RUST_LOG` wins.
    pub log_level: String,
}

impl Default for AccelConfig {
    fn default() -> Self {
        Self {
            serial: None,
            attach_timeout_ms: 5000,
            change_triggers: Vec::new(),
            channel_capacity: 256,
            log_level: "info".to_string(),
        }
    }
}

impl AccelConfig {
    /// Layered provider for a given file.
    pub fn figment(path: impl AsRef<Path>) -> Figment {
        Figment::from(Serialized::defaults(AccelConfig::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load from [`DEFAULT_CONFIG_FILE`] and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load from `path` and the environment. A missing file is not an error.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config: Self = Self::figment(path).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the driver would refuse later.
    pub fn validate(&self) -> Result<()> {
        if let Some(axis) = self
            .change_triggers
            .iter()
            .position(|t| !t.is_finite() || *t < 0.0)
        {
            return Err(Error::ConfigValidation(format!(
                "change trigger for axis {} must be a non-negative number, got {}",
                axis, self.change_triggers[axis]
            )));
        }
        if !(1..=MAX_CHANNEL_CAPACITY).contains(&self.channel_capacity) {
            return Err(Error::ConfigValidation(format!(
                "channel_capacity must be between 1 and {}, got {}",
                MAX_CHANNEL_CAPACITY, self.channel_capacity
            )));
        }
        Ok(())
    }

    /// Attachment timeout; zero means wait forever.
    pub fn attach_timeout(&self) -> Duration {
        Duration::from_millis(self.attach_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    #[serial]
    fn test_defaults_when_file_missing() {
        let config = AccelConfig::load_from("/nonexistent/phidget_accel.toml").unwrap();
        assert_eq!(config, AccelConfig::default());
        assert_eq!(config.attach_timeout(), Duration::from_secs(5));
    }

    #[test]
    #[serial]
    fn test_load_from_file() {
        let file = write_config(
            r#"
serial = 12345
attach_timeout_ms = 0
change_triggers = [0.05, 0.05, 0.1]
channel_capacity = 16
"#,
        );
        let config = AccelConfig::load_from(file.path()).unwrap();
        assert_eq!(config.serial, Some(12345));
        assert_eq!(config.attach_timeout(), Duration::ZERO);
        assert_eq!(config.change_triggers, vec![0.05, 0.05, 0.1]);
        assert_eq!(config.channel_capacity, 16);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let file = write_config("serial = 1\nlog_level = \"warn\"\n");
        std::env::set_var("PHIDGET_SERIAL", "777");
        let config = AccelConfig::load_from(file.path());
        std::env::remove_var("PHIDGET_SERIAL");

        let config = config.unwrap();
        assert_eq!(config.serial, Some(777));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    #[serial]
    fn test_negative_trigger_rejected() {
        let file = write_config("change_triggers = [0.1, -0.2]\n");
        let err = AccelConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigValidation(_)));
        assert!(err.to_string().contains("axis 1"));
    }

    #[test]
    #[serial]
    fn test_zero_capacity_rejected() {
        let file = write_config("channel_capacity = 0\n");
        assert!(matches!(
            AccelConfig::load_from(file.path()),
            Err(Error::ConfigValidation(_))
        ));
    }

    #[test]
    #[serial]
    fn test_oversized_capacity_rejected() {
        let file = write_config("channel_capacity = 9223372036854775807\n");
        let err = AccelConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigValidation(_)));
        assert!(err.to_string().contains("channel_capacity"));
    }

    #[test]
    #[serial]
    fn test_malformed_file_is_load_error() {
        let file = write_config("attach_timeout_ms = \"soon\"\n");
        assert!(matches!(
            AccelConfig::load_from(file.path()),
            Err(Error::Config(_))
        ));
    }
}
