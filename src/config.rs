use crate::aggregate::DEFAULT_TRIAL_COUNT;
use crate::builder::DEFAULT_LEVEL;
use crate::model::{MAX_LEVEL, MIN_LEVEL};
use crate::store::{DEFAULT_MAX_SESSIONS, DEFAULT_TTL_SECS};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Longest accepted session lifetime (one week).
const MAX_TTL_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub sessions: SessionSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_trial_count")]
    pub trial_count: u32,
    /// 0 sizes the pool to the available parallelism.
    #[serde(default)]
    pub worker_threads: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_level")]
    pub default_level: u8,
    /// Fixed session seed; every session draws a fresh one when unset.
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_owned()
}

fn default_port() -> u16 {
    8080
}

fn default_trial_count() -> u32 {
    DEFAULT_TRIAL_COUNT
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_level() -> u8 {
    DEFAULT_LEVEL
}

fn default_ttl_secs() -> u64 {
    DEFAULT_TTL_SECS
}

fn default_max_sessions() -> usize {
    DEFAULT_MAX_SESSIONS
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("data/catalog.json")
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            trial_count: default_trial_count(),
            worker_threads: 0,
            timeout_secs: default_timeout_secs(),
            default_level: default_level(),
            seed: None,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            max_sessions: default_max_sessions(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

impl AppConfig {
    /// Read and validate a TOML config; `None` yields the validated defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))?;
                Self::from_toml(&content)?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config TOML")
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.bind_address.trim().is_empty() {
            bail!("server.bind_address must be set");
        }
        if self.simulation.trial_count == 0 {
            bail!("simulation.trial_count must be positive");
        }
        if self.simulation.timeout_secs == 0 {
            bail!("simulation.timeout_secs must be positive");
        }
        if !(MIN_LEVEL..=MAX_LEVEL).contains(&self.simulation.default_level) {
            bail!(
                "simulation.default_level must be within {MIN_LEVEL}-{MAX_LEVEL}, got {}",
                self.simulation.default_level
            );
        }
        if self.sessions.ttl_secs == 0 || self.sessions.ttl_secs > MAX_TTL_SECS {
            bail!("sessions.ttl_secs must be within 1-{MAX_TTL_SECS}");
        }
        if self.sessions.max_sessions == 0 {
            bail!("sessions.max_sessions must be positive");
        }
        if self.sessions.sweep_interval_secs == 0 {
            bail!("sessions.sweep_interval_secs must be positive");
        }
        Ok(())
    }
}
