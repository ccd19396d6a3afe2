use anyhow::Context;
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "odyssey-admin", about = "Map editor console for an Odyssey game server")]
pub struct Cli {
    /// Base URL of the server exposing /admin/maps.
    #[arg(long, env = "ODYSSEY_ADMIN_URL")]
    pub base_url: Option<String>,

    /// Config file (defaults to ~/.odyssey-admin/config.yaml).
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub timeout_secs: Option<u64>,

    #[arg(long)]
    pub debounce_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub debounce_ms: u64,
    /// env_logger filter, used when RUST_LOG is unset.
    pub log: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            timeout_secs: 10,
            debounce_ms: 200,
            log: "info".to_string(),
        }
    }
}

impl ConsoleConfig {
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".odyssey-admin")
            .join("config.yaml")
    }

    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config: {}", path.display()))?;
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&raw).with_context(|| format!("parse config: {}", path.display()))
    }

    /// File config (explicit or default path) with CLI/env values on top.
    pub fn resolve(cli: &Cli) -> anyhow::Result<Self> {
        let path = cli.config.clone().unwrap_or_else(Self::default_path);
        let mut config = Self::load(&path)?;
        config.apply(cli);
        Ok(config)
    }

    pub fn apply(&mut self, cli: &Cli) {
        if let Some(url) = cli.base_url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
            self.base_url = url.to_string();
        }
        if let Some(secs) = cli.timeout_secs {
            self.timeout_secs = secs;
        }
        if let Some(ms) = cli.debounce_ms {
            self.debounce_ms = ms;
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
