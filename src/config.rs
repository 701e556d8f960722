//! Watcher configuration (TOML).
//!
//! Every field has a default, so an empty file (or no file) watches for the
//! Sony MDR-1000X (`045E:0627`) with a 10 second retry delay.
//!
//! ```toml
//! vendor_id = 0x045E
//! product_id = 0x0627
//! retry_delay_secs = 10
//! id_query_policy = "skip"
//! ```

use crate::error::ConfigError;
use crate::event::{GESTURE_OFFSET, REPORT_LEN};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// What to do when an opened device will not report its VID/PID.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdQueryPolicy {
    /// Log and leave the device out of the enumeration result.
    #[default]
    Skip,
    /// Abort the whole enumeration pass with an error.
    Abort,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Target vendor id.
    pub vendor_id: u16,
    /// Target product id.
    pub product_id: u16,
    /// Delay between searches while the device is absent.
    pub retry_delay_secs: u64,
    /// Upper bound on a single blocking read; bounds cancellation latency.
    pub read_slice_ms: u64,
    /// Report buffer size.
    pub report_len: usize,
    pub id_query_policy: IdQueryPolicy,
    /// Print every raw report as hex.
    pub hex_dump: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            vendor_id: 0x045E,
            product_id: 0x0627,
            retry_delay_secs: 10,
            read_slice_ms: 250,
            report_len: REPORT_LEN,
            id_query_policy: IdQueryPolicy::Skip,
            hex_dump: true,
        }
    }
}

impl WatchConfig {
    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(?path, "config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that turn the search or read loops into busy loops, or
    /// that leave no room for the gesture byte.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry_delay_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "retry_delay_secs",
                reason: "must be at least 1",
            });
        }
        if self.read_slice_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "read_slice_ms",
                reason: "must be at least 1",
            });
        }
        if self.report_len <= GESTURE_OFFSET {
            return Err(ConfigError::Invalid {
                field: "report_len",
                reason: "must be at least 2",
            });
        }
        Ok(())
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn read_slice(&self) -> Duration {
        Duration::from_millis(self.read_slice_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config: WatchConfig = toml::from_str("").unwrap();
        assert_eq!(config, WatchConfig::default());
        assert_eq!(config.retry_delay(), Duration::from_secs(10));
        assert_eq!(config.report_len, 5);
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let config: WatchConfig = toml::from_str(
            r#"
            product_id = 0x0628
            id_query_policy = "abort"
            "#,
        )
        .unwrap();
        assert_eq!(config.vendor_id, 0x045E);
        assert_eq!(config.product_id, 0x0628);
        assert_eq!(config.id_query_policy, IdQueryPolicy::Abort);
    }

    #[test]
    fn unknown_policy_is_rejected() {
        assert!(toml::from_str::<WatchConfig>(r#"id_query_policy = "maybe""#).is_err());
    }

    fn invalid_field(toml: &str) -> Option<&'static str> {
        let config: WatchConfig = toml::from_str(toml).unwrap();
        match config.validate() {
            Err(ConfigError::Invalid { field, .. }) => Some(field),
            Err(e) => panic!("unexpected error: {e}"),
            Ok(()) => None,
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert!(WatchConfig::default().validate().is_ok());
        assert_eq!(invalid_field("report_len = 2\nread_slice_ms = 1"), None);
    }

    #[test]
    fn zero_read_slice_is_rejected() {
        assert_eq!(invalid_field("read_slice_ms = 0"), Some("read_slice_ms"));
    }

    #[test]
    fn zero_retry_delay_is_rejected() {
        assert_eq!(invalid_field("retry_delay_secs = 0"), Some("retry_delay_secs"));
    }

    #[test]
    fn report_without_gesture_byte_is_rejected() {
        assert_eq!(invalid_field("report_len = 1"), Some("report_len"));
        assert_eq!(invalid_field("report_len = 0"), Some("report_len"));
    }

    #[test]
    fn load_validates_file_contents() {
        let path = std::env::temp_dir().join(format!(
            "playpause-invalid-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "read_slice_ms = 0\n").unwrap();
        let result = WatchConfig::load(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { field: "read_slice_ms", .. })
        ));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = WatchConfig::load(Path::new("definitely/not/here.toml")).unwrap();
        assert_eq!(config, WatchConfig::default());
    }
}
