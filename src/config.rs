//! # Configuration
//!
//! Environment-driven server settings and the gateway retry schedule.

use std::time::Duration;

/// HTTP server configuration, sourced from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind host (`IDLINK_BIND`, default `0.0.0.0`)
    pub host: String,
    /// Bind port (`PORT`, then `IDLINK_PORT`, default 3000)
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let host = std::env::var("IDLINK_BIND").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .ok()
            .or_else(|| std::env::var("IDLINK_PORT").ok())
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3000);
        Self { host, port }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Retry schedule applied at the gateway boundary around transient store
/// failures. The resolver core itself never retries.
#[derive(Debug, Clone, Copy)]
pub struct RetryTuning {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Upper bound on any single delay
    pub max_delay: Duration,
}

impl Default for RetryTuning {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(25),
            max_delay: Duration::from_millis(250),
        }
    }
}

impl RetryTuning {
    /// No retries; the first failure surfaces immediately.
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay before retry `attempt` (1-based): doubles from the base, capped.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }
}
