//! Source factory for dependency injection.
//!
//! Picks and builds a [`PriceSource`] from runtime configuration.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use super::config::SourceConfig;
use super::error::SourceResult;
#[cfg(feature = "mock-source")]
use super::mock::MockSource;
#[cfg(feature = "rest-source")]
use super::rest::RestSource;
#[cfg(feature = "rpc-source")]
use super::rpc::RpcSource;
use super::PriceSource;

/// Source type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    /// In-memory fixture data
    Mock,
    /// Supabase RPC functions
    Rpc,
    /// Django JSON API
    Rest,
}

impl FromStr for SourceType {
    type Err = String;

    /// Parse source type from string ("mock", "rpc", "rest" and aliases).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mock" | "local" => Ok(Self::Mock),
            "rpc" | "supabase" => Ok(Self::Rpc),
            "rest" | "django" => Ok(Self::Rest),
            _ => Err(format!("Unknown source type: {}", s)),
        }
    }
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mock => "mock",
            Self::Rpc => "rpc",
            Self::Rest => "rest",
        }
    }

    /// Get source type from the environment.
    ///
    /// Reads `SOURCE_TYPE`. Otherwise picks RPC when `SUPABASE_URL` is set,
    /// REST when `RESTORANG_API_URL` is set, and the mock source as a last resort.
    pub fn from_env() -> Self {
        if let Ok(val) = std::env::var("SOURCE_TYPE") {
            return val.parse().unwrap_or(Self::Mock);
        }

        if std::env::var("SUPABASE_URL").is_ok() {
            Self::Rpc
        } else if std::env::var("RESTORANG_API_URL").is_ok() {
            Self::Rest
        } else {
            Self::Mock
        }
    }
}

/// Factory for creating source instances.
///
/// # Example
/// ```ignore
/// use restorang::sources::{SourceConfig, SourceFactory};
///
/// let config = SourceConfig::from_env();
/// let source = SourceFactory::create(&config)?;
/// let rows = source.fetch_restaurant_rows().await?;
/// ```
pub struct SourceFactory;

impl SourceFactory {
    /// Create the source selected by `config`.
    pub fn create(config: &SourceConfig) -> SourceResult<Arc<dyn PriceSource>> {
        config.validate()?;

        match config.source_type()? {
            SourceType::Mock => Self::create_mock(),
            SourceType::Rpc => {
                #[cfg(feature = "rpc-source")]
                {
                    let source = RpcSource::new(&config.rpc)?;
                    Ok(Arc::new(source) as Arc<dyn PriceSource>)
                }
                #[cfg(not(feature = "rpc-source"))]
                {
                    Err(super::error::SourceError::configuration("RPC source feature not enabled"))
                }
            }
            SourceType::Rest => {
                #[cfg(feature = "rest-source")]
                {
                    let source = RestSource::new(&config.rest)?;
                    Ok(Arc::new(source) as Arc<dyn PriceSource>)
                }
                #[cfg(not(feature = "rest-source"))]
                {
                    Err(super::error::SourceError::configuration("REST source feature not enabled"))
                }
            }
        }
    }

    /// Create the in-memory fixture source.
    pub fn create_mock() -> SourceResult<Arc<dyn PriceSource>> {
        #[cfg(feature = "mock-source")]
        {
            Ok(Arc::new(MockSource::with_fixtures()) as Arc<dyn PriceSource>)
        }
        #[cfg(not(feature = "mock-source"))]
        {
            Err(super::error::SourceError::configuration("Mock source feature not enabled"))
        }
    }

    /// Create a source from environment variables only.
    pub fn from_env() -> SourceResult<Arc<dyn PriceSource>> {
        Self::create(&SourceConfig::from_env())
    }

    /// Create a source from a TOML configuration file, with env overrides applied.
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> SourceResult<Arc<dyn PriceSource>> {
        let mut config = SourceConfig::from_file(path)?;
        config.apply_env_overrides();
        Self::create(&config)
    }
}
