//! Layered client configuration: defaults, then an optional YAML file, then
//! `CLIENTES__*` environment variables.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clientes_core::session::DEFAULT_LOGIN_ROUTE;
use clientes_core::TokenStore;
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://localhost:7255/api";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub login_route: String,
    /// Defaults to `<config dir>/clientes/token`.
    pub token_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: 10_000,
            login_route: DEFAULT_LOGIN_ROUTE.to_string(),
            token_file: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration with layered loading: defaults → YAML file → environment variables.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(ClientConfig::default()));
        if let Some(path) = config_path {
            if !path.is_file() {
                bail!("config file not found: {}", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }
        // CLIENTES__BASE_URL=http://127.0.0.1:5185 maps to base_url
        figment
            .merge(Env::prefixed("CLIENTES__").split("__"))
            .extract()
            .context("Failed to extract config from figment")
    }

    pub fn apply_overrides(&mut self, base_url: Option<String>) {
        if let Some(base_url) = base_url {
            self.base_url = base_url;
        }
    }

    pub fn token_store(&self) -> TokenStore {
        match &self.token_file {
            Some(path) => TokenStore::new(path),
            None => TokenStore::default_location(),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config to YAML")
    }
}
