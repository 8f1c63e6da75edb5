//! Configuration for the round server.
//!
//! Defaults can be overridden via environment variables (and, in the
//! binary, by command-line flags on top of those):
//!
//! - `RPS_BIND_ADDR`     (default: "0.0.0.0")
//! - `RPS_PORT`          (default: "5005")
//! - `RPS_MAX_CLIENTS`   (default: "1024")
//! - `RPS_ROUND_SECONDS` (default: "30")
//! - `RPS_TICK_MILLIS`   (default: "1000")

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use rps_core::DEFAULT_ROUND_SECONDS;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// IP address / interface to bind to (e.g. "0.0.0.0" or "127.0.0.1").
    pub bind_addr: String,

    /// TCP port to listen on.
    pub port: u16,

    /// Maximum number of simultaneously connected sessions.
    pub max_clients: usize,

    /// Countdown length of each round, in ticks.
    pub round_seconds: u32,

    /// Wall-clock period of one tick. One second outside of tests.
    pub tick_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: "0.0.0.0".to_string(),
            port: 5005,
            max_clients: 1024,
            round_seconds: DEFAULT_ROUND_SECONDS,
            tick_interval: Duration::from_secs(1),
        }
    }
}

impl Config {
    /// Construct a `Config` from environment variables, falling back
    /// to the defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Config::default();

        let bind_addr = env::var("RPS_BIND_ADDR").unwrap_or(defaults.bind_addr);
        let port = read_env_or_default("RPS_PORT", defaults.port)?;
        let max_clients = read_env_or_default("RPS_MAX_CLIENTS", defaults.max_clients)?;
        let round_seconds = read_env_or_default("RPS_ROUND_SECONDS", defaults.round_seconds)?;
        let tick_millis = read_env_or_default("RPS_TICK_MILLIS", 1000u64)?;

        let config = Config {
            bind_addr,
            port,
            max_clients,
            round_seconds,
            tick_interval: Duration::from_millis(tick_millis),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the round clock cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.tick_interval.is_zero() {
            anyhow::bail!("tick interval must be greater than zero");
        }
        Ok(())
    }

    /// Convenience: `addr:port` socket string.
    pub fn socket_addr_string(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn read_env_or_default<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .with_context(|| format!("invalid value `{val}` for {key}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_round() {
        let config = Config::default();
        assert_eq!(config.port, 5005);
        assert_eq!(config.round_seconds, 30);
        assert_eq!(config.tick_interval, Duration::from_secs(1));
        assert_eq!(config.socket_addr_string(), "0.0.0.0:5005");
    }

    #[test]
    fn zero_tick_interval_is_rejected() {
        let config = Config {
            tick_interval: Duration::ZERO,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            tick_interval: Duration::from_millis(1),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn env_override_and_parse_error() {
        // single test so the two env mutations cannot race each other
        env::set_var("RPS_TEST_PORT_OK", "6000");
        assert_eq!(read_env_or_default("RPS_TEST_PORT_OK", 1u16).unwrap(), 6000);

        env::set_var("RPS_TEST_PORT_BAD", "not-a-port");
        assert!(read_env_or_default("RPS_TEST_PORT_BAD", 1u16).is_err());

        assert_eq!(read_env_or_default("RPS_TEST_PORT_UNSET", 7u16).unwrap(), 7);
    }
}
