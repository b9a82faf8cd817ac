// Configuration loading and management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const PROD: &str = "prod";
pub const DEV: &str = "dev";
pub const TEST: &str = "test";

pub const DEFAULT_NAME: &str = "default";
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(20);
pub const DEFAULT_TELEMETRY_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Cache {
    #[serde(rename = "cache")]
    pub cache: CacheBox,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheBox {
    pub env: String,
    pub name: Option<String>,
    pub logs: Option<Logs>,
    pub runtime: Option<Runtime>,
    pub refresh: Option<Refresh>,
    pub telemetry: Option<Telemetry>,
    pub demo: Option<Demo>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Logs {
    pub level: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Runtime {
    pub num_cpus: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Refresh {
    #[serde(default, with = "humantime_serde")]
    pub interval: Option<Duration>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Telemetry {
    pub enabled: bool,
    #[serde(default, with = "humantime_serde")]
    pub interval: Option<Duration>,
}

/// Settings of the demonstration binary.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Demo {
    pub keys: Vec<String>,
    pub callers: Option<usize>,
    pub value: Option<i64>,
    #[serde(rename = "loader_delay", default, with = "humantime_serde")]
    pub loader_delay: Option<Duration>,
    #[serde(rename = "run_for", default, with = "humantime_serde")]
    pub run_for: Option<Duration>,
}

// Config trait
pub trait ConfigTrait {
    fn name(&self) -> &str;
    fn logs(&self) -> Option<&Logs>;
    fn is_prod(&self) -> bool;
    fn is_dev(&self) -> bool;
    fn is_test(&self) -> bool;
    fn runtime(&self) -> &Runtime;
    fn refresh_interval(&self) -> Duration;
    fn telemetry(&self) -> Option<&Telemetry>;
    fn demo(&self) -> Option<&Demo>;
}

// Config type alias for convenience
pub type Config = Cache;

impl ConfigTrait for Config {
    fn name(&self) -> &str {
        self.cache.name.as_deref().unwrap_or(DEFAULT_NAME)
    }

    fn logs(&self) -> Option<&Logs> {
        self.cache.logs.as_ref()
    }

    fn is_prod(&self) -> bool {
        self.cache.env == PROD
    }

    fn is_dev(&self) -> bool {
        self.cache.env == DEV
    }

    fn is_test(&self) -> bool {
        self.cache.env == TEST
    }

    fn runtime(&self) -> &Runtime {
        const AUTO: Runtime = Runtime { num_cpus: 0 };
        self.cache.runtime.as_ref().unwrap_or(&AUTO)
    }

    fn refresh_interval(&self) -> Duration {
        self.cache
            .refresh
            .as_ref()
            .and_then(|r| r.interval)
            .unwrap_or(DEFAULT_REFRESH_INTERVAL)
    }

    fn telemetry(&self) -> Option<&Telemetry> {
        self.cache.telemetry.as_ref()
    }

    fn demo(&self) -> Option<&Demo> {
        self.cache.demo.as_ref()
    }
}

impl Config {
    /// Loads configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Resolve absolute path
        let abs_path = path
            .canonicalize()
            .with_context(|| format!("failed to resolve absolute config filepath: {:?}", path))?;

        // Read file
        let data = std::fs::read_to_string(&abs_path)
            .with_context(|| format!("read config yaml file {:?}", abs_path))?;

        Self::from_yaml(&data).with_context(|| format!("load config from {:?}", abs_path))
    }

    /// Parses and validates configuration from a YAML document.
    pub fn from_yaml(data: &str) -> Result<Self> {
        let cfg: Cache = serde_yaml::from_str(data).context("unmarshal yaml")?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if let Some(interval) = self.cache.refresh.as_ref().and_then(|r| r.interval) {
            if interval.is_zero() {
                anyhow::bail!("invalid refresh.interval configured: must be positive");
            }
        }

        if let Some(telemetry) = self.telemetry() {
            if telemetry.interval.is_some_and(|d| d.is_zero()) {
                anyhow::bail!("invalid telemetry.interval configured: must be positive");
            }
        }

        if let Some(demo) = self.demo() {
            if demo.callers == Some(0) {
                anyhow::bail!("invalid demo.callers configured: must be at least 1");
            }
        }

        Ok(())
    }
}

// Test config is always available for integration tests
mod test_config;
pub use test_config::new_test_config;
