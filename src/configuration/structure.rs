use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use toml::Value;

pub use self::database::Database;
pub use self::mode::Mode;
use super::traits::ConfigSchema;
use crate::error::{ConfigError, DanglingReference, ReferenceError, Violation};
use crate::schema::{FieldSchema, SchemaNode};
use crate::validation::describe_value;
use crate::{get_config, read_config_file, ConfigOptions, RawConfigTree};

mod database;
mod mode;



/// The entire CyHy configuration.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CyHyConfiguration {
    /// Databases, keyed by the name modes refer to them by.
    pub databases: BTreeMap<String, Database>,

    /// Modes of operation, each with its database already resolved.
    pub modes: BTreeMap<String, Mode>,
}


impl ConfigSchema for CyHyConfiguration {
    fn schema() -> SchemaNode {
        SchemaNode::table([
            FieldSchema::required("databases", SchemaNode::map_of(Database::schema_node())),
            FieldSchema::required("modes", SchemaNode::map_of(Mode::schema_node())),
        ])
    }

    /// Replaces every `modes.<mode>.database` name with the matching `databases` entry.
    fn resolve_references(tree: &mut RawConfigTree) -> Result<(), ReferenceError> {
        let databases = tree
            .get("databases")
            .and_then(Value::as_table)
            .cloned()
            .unwrap_or_default();

        let Some(Value::Table(modes)) = tree.get_mut("modes") else {
            return Ok(());
        };

        let mut dangling = Vec::new();
        let mut malformed = Vec::new();

        for (mode_key, mode) in modes.iter_mut() {
            let Value::Table(mode) = mode else {
                continue;
            };

            // A missing field is left for structural validation to report.
            let database_name = match mode.get("database") {
                None => continue,
                Some(Value::String(database_name)) => database_name.clone(),
                Some(other) => {
                    malformed.push(Violation {
                        path: format!("modes.{mode_key}.database"),
                        expected: "the name of an entry in databases".to_string(),
                        actual: describe_value(other),
                    });
                    continue;
                }
            };

            match databases.get(&database_name) {
                Some(database) => {
                    mode.insert("database".to_string(), database.clone());
                }
                None => dangling.push(DanglingReference {
                    path: format!("modes.{mode_key}.database"),
                    name: database_name,
                    target: "databases".to_string(),
                }),
            }
        }

        if dangling.is_empty() && malformed.is_empty() {
            Ok(())
        } else {
            Err(ReferenceError {
                references: dangling,
                malformed,
            })
        }
    }
}


impl CyHyConfiguration {
    /// Load and validate the configuration from a specific file path.
    pub fn load_from_path<S: AsRef<Path>>(configuration_file_path: S) -> Result<Self, ConfigError> {
        read_config_file(configuration_file_path)
    }

    /// Find, load and validate the configuration of the running process.
    ///
    /// Searches `CYHY_CONFIG_PATH`, `./cyhy.toml`, `~/.cyhy/cyhy.toml` and
    /// `/etc/cyhy.toml`, in that order. A `CYHY_CONFIG_SSM_PATH` key needs a
    /// parameter store, so use [`get_config`] with one to have it consulted.
    pub fn load_from_default_path() -> Result<Self, ConfigError> {
        get_config(&ConfigOptions::from_process())
    }

    /// Looks up a mode by its key.
    pub fn mode(&self, key: &str) -> Option<&Mode> {
        self.modes.get(key)
    }

    /// Looks up a database by its key.
    pub fn database(&self, key: &str) -> Option<&Database> {
        self.databases.get(key)
    }
}
