//! Dashboard config loader (strict parsing + environment overlay).
//!
//! Resolution order:
//! 1. built-in defaults
//! 2. YAML file named by `DASHBOARD_CONFIG` (unknown fields rejected)
//! 3. `PORT` and `COUNTING_SERVICE_URL` from the environment

pub mod schema;

use std::fs;

use tally_core::error::{Result, TallyError};

pub use schema::{DashboardConfig, RelaySection, ServerSection, UpstreamSection};

/// Environment variable naming an optional YAML config file.
pub const CONFIG_PATH_ENV: &str = "DASHBOARD_CONFIG";

/// Parse a YAML file. Validation runs after the environment overlay.
pub fn load_from_file(path: &str) -> Result<DashboardConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| TallyError::Config(format!("read config failed ({path}): {e}")))?;
    parse_yaml(&s)
}

pub fn load_from_str(s: &str) -> Result<DashboardConfig> {
    let cfg = parse_yaml(s)?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load from the process environment.
pub fn load() -> Result<DashboardConfig> {
    load_with(|key| std::env::var(key).ok())
}

/// Load using an arbitrary key lookup (tests pass a closure instead of
/// mutating process env).
pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<DashboardConfig> {
    let mut cfg = match lookup(CONFIG_PATH_ENV) {
        Some(path) => load_from_file(&path)?,
        None => DashboardConfig::default(),
    };
    cfg.apply_env(&lookup)?;
    cfg.validate()?;
    Ok(cfg)
}

fn parse_yaml(s: &str) -> Result<DashboardConfig> {
    serde_yaml::from_str(s).map_err(|e| TallyError::Config(format!("invalid yaml: {e}")))
}
