//! Runner configuration
//!
//! Defines the polling and transfer parameters. Every value has a default,
//! can be overridden from environment variables, and is checked by `validate`.

use cirrus_core::domain::multipart::{DEFAULT_PART_SIZE, MAX_PART_SIZE, MIN_PART_SIZE};
use std::time::Duration;

use crate::error::{Result, RunnerError};

/// Default wait between two status checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

const MIB: u64 = 1024 * 1024;

/// Job polling configuration
///
/// Attempts and total time are unbounded unless set; a job that never
/// settles then keeps the poller waiting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// How long to wait after a pending observation
    pub interval: Duration,

    /// Maximum number of status checks
    pub max_attempts: Option<u32>,

    /// Maximum total time spent polling
    pub timeout: Option<Duration>,
}

impl PollConfig {
    /// Creates an unbounded configuration with the given interval
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
            timeout: None,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - CIRRUS_POLL_INTERVAL (optional, seconds, default: 5)
    /// - CIRRUS_MAX_ATTEMPTS (optional, default: unbounded)
    /// - CIRRUS_TIMEOUT (optional, seconds, default: unbounded)
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Same as [`Self::from_env`] with an explicit variable lookup
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let interval = parse_var::<u64>(&lookup, "CIRRUS_POLL_INTERVAL")?
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_POLL_INTERVAL);

        let max_attempts = parse_var::<u32>(&lookup, "CIRRUS_MAX_ATTEMPTS")?;

        let timeout = parse_var::<u64>(&lookup, "CIRRUS_TIMEOUT")?.map(Duration::from_secs);

        Ok(Self {
            interval,
            max_attempts,
            timeout,
        })
    }

    /// Sets the interval
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Bounds the number of status checks
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Bounds the total polling time
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(RunnerError::Config(
                "poll interval must be greater than 0".to_string(),
            ));
        }

        if self.max_attempts == Some(0) {
            return Err(RunnerError::Config(
                "max attempts must be greater than 0".to_string(),
            ));
        }

        if self.timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(RunnerError::Config(
                "poll timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

/// Multipart transfer configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferConfig {
    /// Size of every part but the last, in bytes
    pub part_size: u64,

    /// Number of parts in flight at once; 1 uploads strictly in order
    pub max_concurrent_parts: usize,
}

impl TransferConfig {
    pub fn new(part_size: u64, max_concurrent_parts: usize) -> Self {
        Self {
            part_size,
            max_concurrent_parts,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - CIRRUS_PART_SIZE_MB (optional, default: 5)
    /// - CIRRUS_MAX_CONCURRENT_PARTS (optional, default: 1)
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Same as [`Self::from_env`] with an explicit variable lookup
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let part_size = match parse_var::<u64>(&lookup, "CIRRUS_PART_SIZE_MB")? {
            Some(mb) => mib_to_bytes(mb)?,
            None => DEFAULT_PART_SIZE,
        };

        let max_concurrent_parts =
            parse_var::<usize>(&lookup, "CIRRUS_MAX_CONCURRENT_PARTS")?.unwrap_or(1);

        Ok(Self {
            part_size,
            max_concurrent_parts,
        })
    }

    /// Sets the part size in whole mebibytes
    pub fn with_part_size_mb(mut self, mb: u64) -> Result<Self> {
        self.part_size = mib_to_bytes(mb)?;
        Ok(self)
    }

    pub fn with_max_concurrent_parts(mut self, max_concurrent_parts: usize) -> Self {
        self.max_concurrent_parts = max_concurrent_parts;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.part_size < MIN_PART_SIZE {
            return Err(RunnerError::Config(format!(
                "part size must be at least {} bytes",
                MIN_PART_SIZE
            )));
        }

        if self.part_size > MAX_PART_SIZE {
            return Err(RunnerError::Config(format!(
                "part size must be at most {} bytes",
                MAX_PART_SIZE
            )));
        }

        if self.max_concurrent_parts == 0 {
            return Err(RunnerError::Config(
                "max concurrent parts must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PART_SIZE, 1)
    }
}

fn mib_to_bytes(mb: u64) -> Result<u64> {
    mb.checked_mul(MIB)
        .ok_or_else(|| RunnerError::Config(format!("part size of {} MiB is too large", mb)))
}

/// Reads and parses one optional variable; a present but malformed value is an error
fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<T>> {
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| RunnerError::Config(format!("{} has an invalid value: {}", name, raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_poll_config() {
        let config = PollConfig::default();
        assert_eq!(config.interval, Duration::from_secs(5));
        assert_eq!(config.max_attempts, None);
        assert_eq!(config.timeout, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_poll_config_from_vars() {
        let config = PollConfig::from_vars(vars(&[
            ("CIRRUS_POLL_INTERVAL", "30"),
            ("CIRRUS_MAX_ATTEMPTS", "120"),
        ]))
        .unwrap();

        assert_eq!(config.interval, Duration::from_secs(30));
        assert_eq!(config.max_attempts, Some(120));
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn test_poll_config_rejects_malformed_vars() {
        let result = PollConfig::from_vars(vars(&[("CIRRUS_TIMEOUT", "soon")]));
        assert!(matches!(result, Err(RunnerError::Config(_))));
    }

    #[test]
    fn test_poll_config_validation() {
        let mut config = PollConfig::default();
        assert!(config.validate().is_ok());

        config.interval = Duration::ZERO;
        assert!(config.validate().is_err());

        let config = PollConfig::default().with_max_attempts(0);
        assert!(config.validate().is_err());

        let config = PollConfig::default().with_timeout(Duration::ZERO);
        assert!(config.validate().is_err());

        let config = PollConfig::default()
            .with_interval(Duration::from_secs(60))
            .with_max_attempts(10)
            .with_timeout(Duration::from_secs(600));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_transfer_config() {
        let config = TransferConfig::default();
        assert_eq!(config.part_size, 5 * MIB);
        assert_eq!(config.max_concurrent_parts, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_transfer_config_from_vars() {
        let config = TransferConfig::from_vars(vars(&[
            ("CIRRUS_PART_SIZE_MB", "8"),
            ("CIRRUS_MAX_CONCURRENT_PARTS", "4"),
        ]))
        .unwrap();
        assert_eq!(config.part_size, 8 * MIB);
        assert_eq!(config.max_concurrent_parts, 4);
    }

    #[test]
    fn test_transfer_config_validation() {
        let config = TransferConfig::default().with_part_size_mb(1).unwrap();
        assert!(config.validate().is_err());
        assert!(
            TransferConfig::default()
                .with_max_concurrent_parts(0)
                .validate()
                .is_err()
        );
        assert!(
            TransferConfig::default()
                .with_part_size_mb(16)
                .unwrap()
                .with_max_concurrent_parts(8)
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn test_part_size_overflow_is_a_config_error() {
        let result = TransferConfig::default().with_part_size_mb(u64::MAX / 1024);
        assert!(matches!(result, Err(RunnerError::Config(_))));

        let result = TransferConfig::from_vars(vars(&[("CIRRUS_PART_SIZE_MB", "17592186044416")]));
        assert!(matches!(result, Err(RunnerError::Config(_))));
    }

    #[test]
    fn test_part_size_above_maximum_rejected() {
        let config = TransferConfig::default().with_part_size_mb(5 * 1024).unwrap();
        assert!(config.validate().is_ok());

        let config = TransferConfig::default().with_part_size_mb(5 * 1024 + 1).unwrap();
        assert!(matches!(config.validate(), Err(RunnerError::Config(_))));
    }
}
