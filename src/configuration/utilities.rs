use std::{env, path::PathBuf};

use directories::UserDirs;


/// Environment variable holding a configuration file path.
pub const CYHY_CONFIG_PATH: &str = "CYHY_CONFIG_PATH";

/// Environment variable holding a parameter store key.
pub const CYHY_CONFIG_SSM_PATH: &str = "CYHY_CONFIG_SSM_PATH";

/// Name of the configuration file looked up in the working and home directories.
pub const DEFAULT_CONFIGURATION_FILE_NAME: &str = "cyhy.toml";

/// Directory under the user's home directory holding the configuration file.
pub const HOME_CONFIGURATION_DIRECTORY: &str = ".cyhy";

/// System-wide configuration file.
pub const SYSTEM_CONFIGURATION_FILE_PATH: &str = "/etc/cyhy.toml";


/// Returns the current working directory, or `.` if it can not be determined.
pub fn current_working_directory() -> PathBuf {
    env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Returns the user's home directory, if there is one.
pub fn home_directory() -> Option<PathBuf> {
    UserDirs::new().map(|directories| directories.home_dir().to_path_buf())
}

/// Reads an environment variable, treating an empty value as unset.
pub fn non_empty_environment_variable(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}
