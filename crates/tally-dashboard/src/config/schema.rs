use serde::Deserialize;
use tally_core::error::{Result, TallyError};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DashboardConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub upstream: UpstreamSection,

    #[serde(default)]
    pub relay: RelaySection,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            server: ServerSection::default(),
            upstream: UpstreamSection::default(),
            relay: RelaySection::default(),
        }
    }
}

impl DashboardConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(TallyError::Config(format!("unsupported version {}", self.version)));
        }
        self.server.validate()?;
        self.upstream.validate()?;
        self.relay.validate()?;
        Ok(())
    }

    /// Overlay `PORT` and `COUNTING_SERVICE_URL`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|e| TallyError::Config(format!("PORT must be a port number: {e}")))?;
        }
        if let Some(url) = lookup("COUNTING_SERVICE_URL") {
            self.upstream.url = url.trim().to_string();
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.listen_host, self.server.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen_host")]
    pub listen_host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Static files served for any path not otherwise routed.
    #[serde(default = "default_assets_dir")]
    pub assets_dir: String,

    #[serde(default = "default_ping_interval_ms")]
    pub ping_interval_ms: u64,

    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,

    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen_host: default_listen_host(),
            port: default_port(),
            assets_dir: default_assets_dir(),
            ping_interval_ms: default_ping_interval_ms(),
            idle_timeout_ms: default_idle_timeout_ms(),
            max_frame_bytes: default_max_frame_bytes(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        if !(5000..=120000).contains(&self.ping_interval_ms) {
            return Err(TallyError::Config(
                "server.ping_interval_ms must be between 5000 and 120000".into(),
            ));
        }
        if !(10000..=600000).contains(&self.idle_timeout_ms) {
            return Err(TallyError::Config(
                "server.idle_timeout_ms must be between 10000 and 600000".into(),
            ));
        }
        if self.idle_timeout_ms <= self.ping_interval_ms {
            return Err(TallyError::Config(
                "server.idle_timeout_ms must be greater than ping_interval_ms".into(),
            ));
        }
        if !(64..=1 << 20).contains(&self.max_frame_bytes) {
            return Err(TallyError::Config(
                "server.max_frame_bytes must be between 64 and 1048576".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamSection {
    /// Counting service endpoint.
    #[serde(default = "default_upstream_url")]
    pub url: String,

    /// Overall budget for one fetch (connect + response).
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    /// Idle pooled connections are dropped after this, so successive fetches
    /// land on different replicas behind a load balancer.
    #[serde(default = "default_pool_idle_timeout_ms")]
    pub pool_idle_timeout_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for UpstreamSection {
    fn default() -> Self {
        Self {
            url: default_upstream_url(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            pool_idle_timeout_ms: default_pool_idle_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl UpstreamSection {
    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.url)
            .map_err(|e| TallyError::Config(format!("upstream.url is not a valid url: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(TallyError::Config("upstream.url must be http or https".into()));
        }
        if !(100..=30000).contains(&self.fetch_timeout_ms) {
            return Err(TallyError::Config(
                "upstream.fetch_timeout_ms must be between 100 and 30000".into(),
            ));
        }
        if self.pool_idle_timeout_ms > 60000 {
            return Err(TallyError::Config(
                "upstream.pool_idle_timeout_ms must be at most 60000".into(),
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(TallyError::Config("upstream.user_agent must not be empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelaySection {
    /// How long a pushed count waits for the client's ack.
    #[serde(default = "default_ack_timeout_ms")]
    pub ack_timeout_ms: u64,
}

impl Default for RelaySection {
    fn default() -> Self {
        Self {
            ack_timeout_ms: default_ack_timeout_ms(),
        }
    }
}

impl RelaySection {
    pub fn validate(&self) -> Result<()> {
        if !(100..=60000).contains(&self.ack_timeout_ms) {
            return Err(TallyError::Config(
                "relay.ack_timeout_ms must be between 100 and 60000".into(),
            ));
        }
        Ok(())
    }
}

fn default_version() -> u32 {
    1
}
fn default_listen_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    80
}
fn default_assets_dir() -> String {
    "assets".into()
}
fn default_ping_interval_ms() -> u64 {
    20000
}
fn default_idle_timeout_ms() -> u64 {
    60000
}
fn default_max_frame_bytes() -> usize {
    4096
}
fn default_upstream_url() -> String {
    "http://localhost:9001".into()
}
fn default_fetch_timeout_ms() -> u64 {
    2000
}
fn default_pool_idle_timeout_ms() -> u64 {
    1000
}
fn default_user_agent() -> String {
    "tally-dashboard".into()
}
fn default_ack_timeout_ms() -> u64 {
    10000
}
