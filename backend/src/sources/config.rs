//! Data source configuration file support.
//!
//! Configuration is read from a TOML file (`restorang.toml`) and can be
//! overridden from the environment:
//!
//! | Variable            | Setting            |
//! |---------------------|--------------------|
//! | `SOURCE_TYPE`       | `source.type`      |
//! | `SUPABASE_URL`      | `rpc.url`          |
//! | `SUPABASE_KEY`      | `rpc.anon_key`     |
//! | `RESTORANG_API_URL` | `rest.base_url`    |

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::error::{ErrorContext, SourceError};
use super::factory::SourceType;
use crate::engine::{DEFAULT_BEST_VALUE_LIMIT, DEFAULT_ROW_LIMIT, DEFAULT_TOP_PERIODS};

/// Name of the configuration file searched for by [`SourceConfig::from_default_location`].
pub const CONFIG_FILE_NAME: &str = "restorang.toml";

/// Full configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub source: SourceSettings,
    #[serde(default)]
    pub rpc: RpcSettings,
    #[serde(default)]
    pub rest: RestSettings,
    #[serde(default)]
    pub compare: CompareSettings,
}

/// Which source to use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    #[serde(rename = "type", default = "default_source_type")]
    pub source_type: String,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            source_type: default_source_type(),
        }
    }
}

/// Supabase project settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcSettings {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub anon_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RpcSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Django API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestSettings {
    #[serde(default)]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Concurrent menu requests when building a snapshot.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Routes relative to `base_url`.
    #[serde(default)]
    pub paths: RestPaths,
}

impl Default for RestSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_secs: default_timeout_secs(),
            max_concurrency: default_max_concurrency(),
            paths: RestPaths::default(),
        }
    }
}

/// Django routes, as mounted under the API prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestPaths {
    /// All restaurants: `{"items": [...]}`.
    #[serde(default = "default_restaurants_path")]
    pub restaurants: String,
    /// Menu with prices, queried with `?rest_id=`.
    #[serde(default = "default_menu_path")]
    pub menu: String,
    /// Price history of one item, queried with `?item_id=`.
    #[serde(default = "default_price_history_path")]
    pub price_history: String,
}

impl Default for RestPaths {
    fn default() -> Self {
        Self {
            restaurants: default_restaurants_path(),
            menu: default_menu_path(),
            price_history: default_price_history_path(),
        }
    }
}

/// Display limits for the compare views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareSettings {
    #[serde(default = "default_row_limit")]
    pub row_limit: usize,
    #[serde(default = "default_top_periods")]
    pub top_periods: usize,
    #[serde(default = "default_best_value_limit")]
    pub best_value_limit: usize,
}

impl Default for CompareSettings {
    fn default() -> Self {
        Self {
            row_limit: default_row_limit(),
            top_periods: default_top_periods(),
            best_value_limit: default_best_value_limit(),
        }
    }
}

fn default_source_type() -> String {
    "mock".to_string()
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_max_concurrency() -> usize {
    8
}

fn default_restaurants_path() -> String {
    "restaurants/".to_string()
}

fn default_menu_path() -> String {
    "fetch-items-prices/".to_string()
}

fn default_price_history_path() -> String {
    "item-price-history/".to_string()
}

fn default_row_limit() -> usize {
    DEFAULT_ROW_LIMIT
}

fn default_top_periods() -> usize {
    DEFAULT_TOP_PERIODS
}

fn default_best_value_limit() -> usize {
    DEFAULT_BEST_VALUE_LIMIT
}

impl SourceConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| SourceError::ConfigurationError {
            message: format!("Failed to read config file: {}", e),
            context: ErrorContext::new("load_config").with_details(path.display().to_string()),
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, SourceError> {
        toml::from_str(content).map_err(|e| {
            SourceError::configuration(format!("Failed to parse config file: {}", e))
        })
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `restorang.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, SourceError> {
        let search_paths = [
            PathBuf::from(CONFIG_FILE_NAME),
            PathBuf::from("backend").join(CONFIG_FILE_NAME),
            PathBuf::from("..").join(CONFIG_FILE_NAME),
        ];

        for path in search_paths {
            if path.exists() {
                log::info!("Loading source configuration from {}", path.display());
                return Self::from_file(&path);
            }
        }

        Err(SourceError::configuration(format!(
            "No {} found in standard locations",
            CONFIG_FILE_NAME
        )))
    }

    /// Defaults overridden by the environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.source.source_type = SourceType::from_env().as_str().to_string();
        config.apply_env_overrides();
        config
    }

    /// Override settings with any of the supported environment variables that are set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("SOURCE_TYPE") {
            self.source.source_type = val;
        }
        if let Ok(val) = std::env::var("SUPABASE_URL") {
            self.rpc.url = val;
        }
        if let Ok(val) = std::env::var("SUPABASE_KEY") {
            self.rpc.anon_key = val;
        }
        if let Ok(val) = std::env::var("RESTORANG_API_URL") {
            self.rest.base_url = val;
        }
    }

    /// Get the source type from configuration.
    pub fn source_type(&self) -> Result<SourceType, SourceError> {
        SourceType::from_str(&self.source.source_type).map_err(|e| {
            SourceError::configuration(format!("Invalid source type: {}", e))
        })
    }

    /// Check that the settings required by the selected source are present.
    pub fn validate(&self) -> Result<(), SourceError> {
        match self.source_type()? {
            SourceType::Mock => Ok(()),
            SourceType::Rpc => {
                if self.rpc.url.trim().is_empty() {
                    return Err(SourceError::configuration(
                        "RPC source requires 'rpc.url' (or SUPABASE_URL)",
                    ));
                }
                if self.rpc.anon_key.trim().is_empty() {
                    return Err(SourceError::configuration(
                        "RPC source requires 'rpc.anon_key' (or SUPABASE_KEY)",
                    ));
                }
                Ok(())
            }
            SourceType::Rest => {
                if self.rest.base_url.trim().is_empty() {
                    return Err(SourceError::configuration(
                        "REST source requires 'rest.base_url' (or RESTORANG_API_URL)",
                    ));
                }
                if self.rest.max_concurrency == 0 {
                    return Err(SourceError::configuration(
                        "'rest.max_concurrency' must be at least 1",
                    ));
                }
                let paths = &self.rest.paths;
                for (key, path) in [
                    ("restaurants", &paths.restaurants),
                    ("menu", &paths.menu),
                    ("price_history", &paths.price_history),
                ] {
                    if path.trim().trim_matches('/').is_empty() {
                        return Err(SourceError::configuration(format!(
                            "'rest.paths.{}' must not be empty",
                            key
                        )));
                    }
                }
                Ok(())
            }
        }
    }
}
