//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading run
//! configurations from YAML files.

use std::fs;
use std::path::Path;

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::types::{EngineSettings, OpeningBalances, RunConfig, ValidationTables};

/// Loads and provides access to a run configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory
/// and assembles them into a [`RunConfig`].
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/vankor_cluster/
/// ├── engine.yaml       # Parameter defaults, delivery periods, failure policy
/// ├── validation.yaml   # Absolute ranges and daily-change limits
/// └── opening.yaml      # Opening balances (optional)
/// ```
///
/// # Example
///
/// ```no_run
/// use balance_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/vankor_cluster").unwrap();
///
/// let k = loader.parameter("K_otkachki").unwrap();
/// println!("Pumping coefficient default: {}", k);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: RunConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g., "./config/vankor_cluster")
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - `engine.yaml` or `validation.yaml` is missing
    /// - Any file contains invalid YAML
    /// - The assembled configuration is inconsistent
    ///
    /// # Example
    ///
    /// ```no_run
    /// use balance_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/vankor_cluster")?;
    /// # Ok::<(), balance_engine::error::EngineError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<EngineSettings>(&path.join("engine.yaml"))?;
        let validation = Self::load_yaml::<ValidationTables>(&path.join("validation.yaml"))?;

        let opening_path = path.join("opening.yaml");
        let opening = if opening_path.exists() {
            Self::load_yaml::<OpeningBalances>(&opening_path)?
        } else {
            debug!(path = %opening_path.display(), "no opening balances, starting from zero");
            OpeningBalances::default()
        };

        let config = RunConfig::from_parts(settings, validation, opening)?;
        Ok(Self { config })
    }

    /// Wraps an already assembled configuration.
    pub fn from_config(config: RunConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying run configuration.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Gets the configured default of a scalar parameter.
    ///
    /// # Returns
    ///
    /// Returns the value if configured, or `MissingOverrideDefault` error.
    pub fn parameter(&self, name: &str) -> EngineResult<Decimal> {
        self.config
            .parameter(name)
            .ok_or_else(|| EngineError::MissingOverrideDefault {
                parameter: name.to_string(),
            })
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> RunConfig {
        self.config
    }
}
