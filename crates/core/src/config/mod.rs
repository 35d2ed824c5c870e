//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (MERINFO_*)
//! 2. TOML config file (`--config` or MERINFO_CONFIG_FILE)
//! 3. Built-in defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (MERINFO_*)
/// 2. TOML config file
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Scheme and host of the people-search site.
    ///
    /// Set via MERINFO_BASE_URL environment variable.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path to SQLite response cache.
    ///
    /// Set via MERINFO_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via MERINFO_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Accept-Language header sent with the search request.
    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via MERINFO_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum bytes accepted for a result page.
    ///
    /// Set via MERINFO_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// CSS selectors used to locate results in the page markup.
    #[serde(default)]
    pub selectors: SelectorConfig,
}

/// Ordered CSS selector fallbacks for the result page.
///
/// For each list the first selector that matches anything wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Repeating per-person result container.
    ///
    /// Set via MERINFO_SELECTORS__CONTAINERS (TOML array syntax).
    #[serde(default = "default_container_selectors")]
    pub containers: Vec<String>,

    /// Link carrying the person's name and profile URL, within a container.
    #[serde(default = "default_name_link_selectors")]
    pub name_links: Vec<String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self { containers: default_container_selectors(), name_links: default_name_link_selectors() }
    }
}

fn default_base_url() -> String {
    "https://www.merinfo.se".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./merinfo-cache.sqlite")
}

fn default_user_agent() -> String {
    "merinfo-lookup/0.1".into()
}

fn default_accept_language() -> String {
    "sv-SE,sv;q=0.9,en;q=0.8".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_container_selectors() -> Vec<String> {
    vec![
        "div.mi-text-sm.mi-bg-white.mi-shadow-dark-blue-20.mi-p-0.mi-mb-6".into(),
        r#"div[class*="mi-text-sm"][class*="mi-bg-white"]"#.into(),
        "div.person-result".into(),
        r#"div[class*="result"]"#.into(),
    ]
}

fn default_name_link_selectors() -> Vec<String> {
    vec!["a.mi-text-primary".into(), r#"a[href*="/person/"]"#.into(), "a".into()]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
            selectors: SelectorConfig::default(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `MERINFO_`
    /// 2. TOML file from `config_file`, or `MERINFO_CONFIG_FILE` when none is given
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        let config_path = config_file
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("MERINFO_CONFIG_FILE").map(PathBuf::from));

        if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::LoadFailed(format!("config file not found: {}", path.display())));
            }
            figment = figment.merge(Toml::file(&path));
        }

        figment = figment.merge(
            Env::prefixed("MERINFO_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        Self::from_figment(figment)
    }

    fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        tracing::debug!(base_url = %config.base_url, db_path = %config.db_path.display(), "configuration loaded");

        Ok(config)
    }
}
