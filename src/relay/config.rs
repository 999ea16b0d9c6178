use eyre::{eyre, Result};
use std::{env::var, net::SocketAddr, num::NonZeroU32, str::FromStr, time::Duration};

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_RATE_LIMIT_MAX: u32 = 100;
const DEFAULT_RATE_LIMIT_WINDOW: Duration = Duration::from_secs(15 * 60);
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
const DEFAULT_WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Runtime settings of the relay server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub socket_addr: SocketAddr,
    /// Deployment environment name, only reported in logs.
    pub environment: String,
    /// Requests allowed per client within `rate_limit_window`.
    pub rate_limit_max: NonZeroU32,
    pub rate_limit_window: Duration,
    pub poll_interval: Duration,
    pub webhook_timeout: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            socket_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            environment: "development".to_string(),
            rate_limit_max: NonZeroU32::new(DEFAULT_RATE_LIMIT_MAX).unwrap_or(NonZeroU32::MIN),
            rate_limit_window: DEFAULT_RATE_LIMIT_WINDOW,
            poll_interval: DEFAULT_POLL_INTERVAL,
            webhook_timeout: DEFAULT_WEBHOOK_TIMEOUT,
        }
    }
}

impl RelayConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| var(key).ok())
    }

    /// Builds the config from `lookup`, falling back to defaults for unset keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let port: u16 = parse_or(&lookup, "PORT", DEFAULT_PORT)?;
        let rate_limit_max = NonZeroU32::new(parse_or(&lookup, "RATE_LIMIT_MAX", DEFAULT_RATE_LIMIT_MAX)?)
            .ok_or_else(|| eyre!("RATE_LIMIT_MAX must be greater than zero"))?;

        Ok(Self {
            socket_addr: SocketAddr::from(([0, 0, 0, 0], port)),
            environment: lookup("RELAY_ENV").unwrap_or(defaults.environment),
            rate_limit_max,
            rate_limit_window: secs_or(&lookup, "RATE_LIMIT_WINDOW_SECS", defaults.rate_limit_window)?,
            poll_interval: secs_or(&lookup, "EVENT_POLL_INTERVAL_SECS", defaults.poll_interval)?,
            webhook_timeout: secs_or(&lookup, "WEBHOOK_TIMEOUT_SECS", defaults.webhook_timeout)?,
        })
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T> {
    lookup(key).map_or(Ok(default), |value| value.trim().parse().map_err(|_| eyre!("invalid {key}: {value}")))
}

/// Reads a number of seconds, which must not be zero.
fn secs_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: Duration) -> Result<Duration> {
    match parse_or(lookup, key, default.as_secs())? {
        0 => Err(eyre!("{key} must be greater than zero")),
        secs => Ok(Duration::from_secs(secs)),
    }
}
