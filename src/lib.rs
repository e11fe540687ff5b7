//! Locates, loads and validates the CyHy configuration.
//!
//! Obtaining a configuration is a chain of three independent steps:
//!
//! 1. [`ConfigLocator`] finds a [`ConfigSource`]: a parameter store value or a
//!    TOML file from one of the default locations.
//! 2. [`loader`] reads the source and parses it into a [`RawConfigTree`].
//! 3. [`validation`] resolves named references and checks the tree against a
//!    [`ConfigSchema`] such as [`CyHyConfiguration`], or hands the raw tree back
//!    if no schema is wanted.
//!
//! [`get_config`] and [`get_raw_config`] run the whole chain.
//!
//! The crate only emits [`tracing`] events and never installs a subscriber,
//! so it logs nothing unless the caller sets one up.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::configuration::utilities::non_empty_environment_variable;
use crate::configuration::CYHY_CONFIG_SSM_PATH;

pub mod configuration;
pub mod error;
pub mod loader;
pub mod locator;
pub mod parameter_store;
pub mod schema;
pub mod validation;

pub use configuration::{ConfigSchema, CyHyConfiguration, Database, Mode};
pub use error::{ConfigError, ParameterStoreError, ReferenceError, SyntaxError, ValidationError};
pub use locator::{ConfigLocator, ConfigSource, SearchLocations, SourceOrigin, SourcePayload};
pub use parameter_store::{InMemoryParameterStore, ParameterStore};


/// An untyped configuration: a TOML table as parsed, before any validation.
pub type RawConfigTree = toml::Table;


/// Where [`get_config`] and [`get_raw_config`] look for a configuration.
pub struct ConfigOptions<'s> {
    /// Configuration file path supplied by the caller.
    pub file_path: Option<PathBuf>,

    /// Parameter store key supplied by the caller.
    pub parameter_key: Option<String>,

    /// The parameter store to query, if any.
    pub parameter_store: Option<&'s dyn ParameterStore>,

    pub locations: SearchLocations,
}

impl<'s> ConfigOptions<'s> {
    /// Options searching the default locations of the running process.
    pub fn from_process() -> Self {
        Self::with_locations(SearchLocations::from_process())
    }

    pub fn with_locations(locations: SearchLocations) -> Self {
        Self {
            file_path: None,
            parameter_key: None,
            parameter_store: None,
            locations,
        }
    }

    #[must_use = "function returns the modified options"]
    pub fn file_path(mut self, file_path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(file_path.into());
        self
    }

    #[must_use = "function returns the modified options"]
    pub fn parameter_key(mut self, parameter_key: impl Into<String>) -> Self {
        self.parameter_key = Some(parameter_key.into());
        self
    }

    #[must_use = "function returns the modified options"]
    pub fn parameter_store(mut self, parameter_store: &'s dyn ParameterStore) -> Self {
        self.parameter_store = Some(parameter_store);
        self
    }
}

impl Default for ConfigOptions<'_> {
    fn default() -> Self {
        Self::from_process()
    }
}


/// Find the configuration source `options` point at.
pub fn find_config(options: &ConfigOptions<'_>) -> Result<ConfigSource, ConfigError> {
    let mut locator = ConfigLocator::new(options.locations.clone());
    if let Some(parameter_store) = options.parameter_store {
        locator = locator.with_parameter_store(parameter_store);
    }

    let source = locator.find_with_parameter_store(
        options.file_path.as_deref(),
        options.parameter_key.as_deref(),
    )?;
    info!("Using configuration from {source}.");

    Ok(source)
}

/// Find, load and validate a configuration against the schema of `S`.
pub fn get_config<S: ConfigSchema>(options: &ConfigOptions<'_>) -> Result<S, ConfigError> {
    let source = find_config(options)?;
    let tree = loader::load(&source)?;
    validation::validate(tree)
}

/// Find and load a configuration without validating it.
pub fn get_raw_config(options: &ConfigOptions<'_>) -> Result<RawConfigTree, ConfigError> {
    let source = find_config(options)?;
    let tree = loader::load(&source)?;
    Ok(validation::validate_raw(tree))
}

/// Load a specific configuration file and validate it against the schema of `S`.
pub fn read_config_file<S: ConfigSchema, P: AsRef<Path>>(file_path: P) -> Result<S, ConfigError> {
    let tree = loader::load_file(file_path)?;
    validation::validate(tree)
}

/// Fetch a configuration from the parameter store and validate it against the schema of `S`.
///
/// Without a `key`, the one named by `CYHY_CONFIG_SSM_PATH` is used. Returns
/// `Ok(None)` if there is no key to look up, or the store has no parameter under it.
pub fn read_config_parameter<S: ConfigSchema>(
    parameter_store: &dyn ParameterStore,
    key: Option<&str>,
) -> Result<Option<S>, ConfigError> {
    let key = match key {
        Some(key) => key.to_string(),
        None => match non_empty_environment_variable(CYHY_CONFIG_SSM_PATH) {
            Some(key) => key,
            None => {
                debug!("No parameter key given and {CYHY_CONFIG_SSM_PATH} is not set.");
                return Ok(None);
            }
        },
    };

    let text = match parameter_store.get_parameter(&key) {
        Ok(text) => text,
        Err(ParameterStoreError::NotFound { .. }) => {
            debug!("Parameter {key} not found in the parameter store.");
            return Ok(None);
        }
        Err(store_error) => return Err(store_error.into()),
    };

    let tree = loader::parse(&text, &key)?;
    validation::validate(tree).map(Some)
}
