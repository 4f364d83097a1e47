//! Layered configuration.
//!
//! Precedence, lowest to highest:
//! 1. Built-in defaults
//! 2. `fleetguard.toml` in the working directory, or the file named by
//!    `FLEETGUARD_CONFIG`
//! 3. Environment variables prefixed `FLEETGUARD_`, nested with `__`
//!    (e.g. `FLEETGUARD_AUTH__MAX_FAILED_ATTEMPTS=5`)

use std::path::PathBuf;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use fleetguard_auth::AuthConfig;
use fleetguard_db::DbConfig;
use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG_FILE: &str = "fleetguard.toml";
const CONFIG_PATH_VAR: &str = "FLEETGUARD_CONFIG";
const ENV_PREFIX: &str = "FLEETGUARD_";

/// Which credential store backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreMode {
    /// A single fixed `demo` account held in process memory, passwords
    /// compared verbatim.
    Memory,
    /// SurrealDB-backed accounts and history, Argon2id hashes.
    Surreal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreMode,
    /// Create the default accounts on startup when missing.
    pub seed_accounts: bool,
    pub auth: AuthConfig,
    pub db: DbConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreMode::Surreal,
            seed_accounts: true,
            auth: AuthConfig::default(),
            db: DbConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from every source in precedence order.
    pub fn load() -> Result<Self, figment::Error> {
        let path = std::env::var_os(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        if path.exists() {
            tracing::info!(path = %path.display(), "Loading configuration file");
        }

        Self::from_figment(
            Self::base()
                .merge(Toml::file(path))
                .merge(Env::prefixed(ENV_PREFIX).split("__")),
        )
    }

    /// Defaults only.
    pub fn base() -> Figment {
        Figment::new().merge(Serialized::defaults(AppConfig::default()))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, figment::Error> {
        figment.extract()
    }
}
