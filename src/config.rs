use crate::{
    ledger::Ledger,
    mining::{DEFAULT_DIFFICULTY, DEFAULT_MAX_ATTEMPTS, MAX_DIFFICULTY},
};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{fs, sync::Arc};

#[derive(Clone, Debug, Deserialize)]
pub struct LedgerConfig {
    pub listen: String,                     // ex 0.0.0.0:8443
    pub db_path: String,                    // "/var/lib/eatsimple/ledger"
    #[serde(default = "default_difficulty")]
    pub difficulty: u8,                     // leading hex zeros, ex 2
    #[serde(default = "default_max_attempts")]
    pub max_mining_attempts: u64,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,                 // used when RUST_LOG is unset
    #[serde(default)]
    pub tls: Option<TlsConfig>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TlsConfig {
    pub cert: String,                       // "/etc/eatsimple/origin.crt"
    pub key: String,                        // "/etc/eatsimple/origin.key"
}

fn default_difficulty() -> u8 { DEFAULT_DIFFICULTY }
fn default_max_attempts() -> u64 { DEFAULT_MAX_ATTEMPTS }
fn default_log_filter() -> String { "info".into() }

#[derive(Clone)]
pub struct LedgerAppState {
    pub cfg:    LedgerConfig,
    pub ledger: Arc<Ledger>,
}

impl LedgerConfig {
    pub fn load(path: &str) -> Result<Self> {
        let s = fs::read_to_string(path)
            .with_context(|| format!("reading config file `{}`", path))?;
        Self::from_toml(&s)
            .with_context(|| format!("parsing `{}` as TOML", path))
    }

    pub fn from_toml(s: &str) -> Result<Self> {
        let cfg: LedgerConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.difficulty > MAX_DIFFICULTY {
            bail!("difficulty {} is above the ceiling of {}", self.difficulty, MAX_DIFFICULTY);
        }
        if self.max_mining_attempts == 0 {
            bail!("max_mining_attempts must be positive");
        }
        Ok(())
    }
}
