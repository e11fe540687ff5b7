//! Reading configuration sources and parsing them as TOML.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, error};

use crate::error::{ConfigError, SyntaxError};
use crate::locator::{ConfigSource, SourcePayload};
use crate::RawConfigTree;


/// Parse TOML text into an untyped tree.
///
/// `origin` names where the text came from and only shows up in error reports.
pub fn parse(raw_text: &str, origin: &str) -> Result<RawConfigTree, SyntaxError> {
    toml::from_str::<RawConfigTree>(raw_text).map_err(|toml_error| {
        let syntax_error = SyntaxError::from_toml(origin, raw_text, &toml_error);
        error!(
            origin,
            line = syntax_error.line,
            column = syntax_error.column,
            "Error decoding TOML: {}",
            syntax_error.message
        );

        syntax_error
    })
}

/// Read a configuration file fully and parse it.
pub fn load_file<P: AsRef<Path>>(file_path: P) -> Result<RawConfigTree, ConfigError> {
    let file_path = file_path.as_ref();

    if !file_path.is_file() {
        error!("Config file not found: {}", file_path.display());
        return Err(ConfigError::FileNotFound {
            path: file_path.to_path_buf(),
        });
    }

    debug!("Reading config file: {}", file_path.display());
    let raw_text = fs::read_to_string(file_path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            ConfigError::FileNotFound {
                path: file_path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: file_path.to_path_buf(),
                source,
            }
        }
    })?;

    Ok(parse(&raw_text, &file_path.display().to_string())?)
}

/// Obtain and parse the text of a located source.
pub fn load(source: &ConfigSource) -> Result<RawConfigTree, ConfigError> {
    match &source.payload {
        SourcePayload::File(file_path) => load_file(file_path),
        SourcePayload::Text { key, text } => {
            debug!("Parsing configuration fetched from parameter {key}.");
            Ok(parse(text, key)?)
        }
    }
}

/// Serialize a tree back into TOML text.
pub fn to_toml_string(tree: &RawConfigTree) -> Result<String, toml::ser::Error> {
    toml::to_string(tree)
}
