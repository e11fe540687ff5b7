//! The CyHy configuration structure and the machinery to validate against it.
//!
//! Your starting point should probably be [`CyHyConfiguration::load_from_default_path`].
//!
//! # Internals
//! A configuration file is never deserialized straight into [`CyHyConfiguration`].
//! It is first parsed into an untyped TOML tree, on which
//! [`resolve_references`][ConfigSchema::resolve_references] rewrites every
//! mode's `database` name into the full database table it names.
//! Only then is the tree checked against the closed [`schema`][ConfigSchema::schema]
//! and deserialized.
//!
//! Any other type implementing [`ConfigSchema`] can be validated the same way,
//! see [`validate`][crate::validation::validate].

mod structure;
pub(crate) mod traits;
pub(crate) mod utilities;

pub use structure::*;
pub use traits::ConfigSchema;
pub use utilities::{
    CYHY_CONFIG_PATH,
    CYHY_CONFIG_SSM_PATH,
    DEFAULT_CONFIGURATION_FILE_NAME,
    HOME_CONFIGURATION_DIRECTORY,
    SYSTEM_CONFIGURATION_FILE_PATH,
};
