//! Counting service configuration (environment-derived).

use std::fs;

use tally_core::error::{Result, TallyError};

pub const DEFAULT_PORT: u16 = 80;

#[derive(Debug, Clone)]
pub struct CounterConfig {
    pub port: u16,
    pub hostname: String,
}

impl CounterConfig {
    /// Read `PORT` and `HOSTNAME` from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup so tests do not touch process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = match lookup("PORT") {
            Some(p) => p
                .trim()
                .parse::<u16>()
                .map_err(|e| TallyError::Config(format!("PORT must be a port number: {e}")))?,
            None => DEFAULT_PORT,
        };

        let hostname = lookup("HOSTNAME")
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(system_hostname);

        Ok(Self { port, hostname })
    }

    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

/// Kernel hostname, falling back to `localhost`.
fn system_hostname() -> String {
    ["/proc/sys/kernel/hostname", "/etc/hostname"]
        .iter()
        .filter_map(|p| fs::read_to_string(p).ok())
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}
