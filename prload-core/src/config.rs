use crate::{DEFAULT_DURATION, DEFAULT_GRACEFUL_STOP, DEFAULT_VUS};
use std::num::{NonZeroU32, NonZeroU64, NonZeroUsize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid duration `{input}`: {source}")]
    Duration {
        input: String,
        #[source]
        source: humantime::DurationError,
    },

    #[error("Duration must be greater than zero")]
    ZeroDuration,

    #[error("Rate `{0}` must be a number between 0 and 1")]
    Rate(String),
}

#[doc(hidden)]
#[derive(Clone, Debug)]
pub struct ScenarioConfig {
    pub name: String,
    pub vus: NonZeroUsize,
    pub duration: Duration,
    pub iterations: Option<NonZeroU64>,
    pub rps: Option<NonZeroU32>,
    pub graceful_stop: Duration,
}

impl ScenarioConfig {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            vus: DEFAULT_VUS,
            duration: DEFAULT_DURATION,
            iterations: None,
            rps: None,
            graceful_stop: DEFAULT_GRACEFUL_STOP,
        }
    }
}

/// Parse a human readable duration such as `30s` or `1m 30s`.
///
/// Zero-length durations are rejected since a run of no length produces no load.
pub fn parse_duration(input: &str) -> Result<Duration, ConfigError> {
    let duration = humantime::parse_duration(input.trim()).map_err(|source| ConfigError::Duration {
        input: input.to_string(),
        source,
    })?;

    if duration.is_zero() {
        return Err(ConfigError::ZeroDuration);
    }

    Ok(duration)
}

/// Parse a ratio in `[0, 1]`, used for pass-rate thresholds.
pub fn parse_rate(input: &str) -> Result<f64, ConfigError> {
    match input.trim().parse::<f64>() {
        Ok(rate) if (0.0..=1.0).contains(&rate) => Ok(rate),
        _ => Err(ConfigError::Rate(input.to_string())),
    }
}
