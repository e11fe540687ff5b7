//! Finding the configuration source.
//!
//! Candidates are tried in a fixed priority order and the first one that
//! resolves wins:
//!
//! 1. the parameter store, using an explicitly supplied key
//!    and then the key in `CYHY_CONFIG_SSM_PATH`
//!    (only with [`ConfigLocator::find_with_parameter_store`]),
//! 2. an explicitly supplied file path,
//! 3. the path in `CYHY_CONFIG_PATH`,
//! 4. `cyhy.toml` in the working directory,
//! 5. `.cyhy/cyhy.toml` in the user's home directory,
//! 6. `/etc/cyhy.toml`.
//!
//! A candidate that does not exist never fails the search. The only failure that
//! ends it early is a parameter store error other than "not found".

use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::configuration::utilities::{
    current_working_directory,
    home_directory,
    non_empty_environment_variable,
    CYHY_CONFIG_PATH,
    CYHY_CONFIG_SSM_PATH,
    DEFAULT_CONFIGURATION_FILE_NAME,
    HOME_CONFIGURATION_DIRECTORY,
    SYSTEM_CONFIGURATION_FILE_PATH,
};
use crate::error::{ConfigError, ParameterStoreError};
use crate::parameter_store::ParameterStore;


/// Where a configuration source was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceOrigin {
    /// The parameter store, under an explicitly supplied key.
    ParameterStore,

    /// The parameter store, under the key in `CYHY_CONFIG_SSM_PATH`.
    EnvironmentParameterStore,

    /// An explicitly supplied file path.
    Parameter,

    /// The file path in `CYHY_CONFIG_PATH`.
    EnvironmentPath,

    WorkingDirectory,
    HomeDirectory,
    SystemDirectory,
}

impl Display for SourceOrigin {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let description = match self {
            SourceOrigin::ParameterStore => "parameter store key passed as parameter",
            SourceOrigin::EnvironmentParameterStore => {
                "parameter store key from CYHY_CONFIG_SSM_PATH"
            }
            SourceOrigin::Parameter => "path passed as parameter",
            SourceOrigin::EnvironmentPath => "path from CYHY_CONFIG_PATH",
            SourceOrigin::WorkingDirectory => "current working directory",
            SourceOrigin::HomeDirectory => "home directory",
            SourceOrigin::SystemDirectory => "system directory",
        };

        f.write_str(description)
    }
}


/// What a located source holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourcePayload {
    /// A configuration file that exists on disk.
    File(PathBuf),

    /// Configuration text already fetched from the parameter store.
    Text { key: String, text: String },
}

/// A resolved configuration source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    pub origin: SourceOrigin,
    pub payload: SourcePayload,
}

impl ConfigSource {
    pub fn file(origin: SourceOrigin, file_path: impl Into<PathBuf>) -> Self {
        Self {
            origin,
            payload: SourcePayload::File(file_path.into()),
        }
    }

    pub fn text(origin: SourceOrigin, key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            origin,
            payload: SourcePayload::Text {
                key: key.into(),
                text: text.into(),
            },
        }
    }

    /// The file path of this source, if it is a file.
    pub fn file_path(&self) -> Option<&Path> {
        match &self.payload {
            SourcePayload::File(file_path) => Some(file_path.as_path()),
            SourcePayload::Text { .. } => None,
        }
    }
}

impl Display for ConfigSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.payload {
            SourcePayload::File(file_path) => {
                write!(f, "{} ({})", file_path.display(), self.origin)
            }
            SourcePayload::Text { key, .. } => write!(f, "parameter {key} ({})", self.origin),
        }
    }
}



/// Everything the locator looks at besides the caller's arguments.
///
/// [`SearchLocations::from_process`] captures the real environment; constructing
/// the struct directly lets a caller search somewhere else entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchLocations {
    /// Value of `CYHY_CONFIG_PATH`.
    pub environment_path: Option<PathBuf>,

    /// Value of `CYHY_CONFIG_SSM_PATH`.
    pub environment_parameter_key: Option<String>,

    pub working_directory: PathBuf,

    pub home_directory: Option<PathBuf>,

    pub system_file_path: PathBuf,
}

impl SearchLocations {
    /// Capture the search locations of the running process.
    pub fn from_process() -> Self {
        Self {
            environment_path: non_empty_environment_variable(CYHY_CONFIG_PATH).map(PathBuf::from),
            environment_parameter_key: non_empty_environment_variable(CYHY_CONFIG_SSM_PATH),
            working_directory: current_working_directory(),
            home_directory: home_directory(),
            system_file_path: PathBuf::from(SYSTEM_CONFIGURATION_FILE_PATH),
        }
    }

    /// File candidates in priority order.
    fn file_candidates(&self, explicit_path: Option<&Path>) -> Vec<(SourceOrigin, PathBuf)> {
        let mut candidates = Vec::with_capacity(5);

        if let Some(explicit_path) = explicit_path {
            candidates.push((SourceOrigin::Parameter, explicit_path.to_path_buf()));
        }

        if let Some(environment_path) = &self.environment_path {
            candidates.push((SourceOrigin::EnvironmentPath, environment_path.clone()));
        }

        candidates.push((
            SourceOrigin::WorkingDirectory,
            self.working_directory.join(DEFAULT_CONFIGURATION_FILE_NAME),
        ));

        if let Some(home_directory) = &self.home_directory {
            candidates.push((
                SourceOrigin::HomeDirectory,
                home_directory
                    .join(HOME_CONFIGURATION_DIRECTORY)
                    .join(DEFAULT_CONFIGURATION_FILE_NAME),
            ));
        }

        candidates.push((SourceOrigin::SystemDirectory, self.system_file_path.clone()));

        candidates
    }

    /// Parameter store keys in priority order, without duplicates.
    fn parameter_candidates<'k>(
        &'k self,
        explicit_key: Option<&'k str>,
    ) -> Vec<(SourceOrigin, &'k str)> {
        let mut candidates = Vec::with_capacity(2);

        if let Some(explicit_key) = explicit_key {
            candidates.push((SourceOrigin::ParameterStore, explicit_key));
        }

        if let Some(environment_key) = self.environment_parameter_key.as_deref() {
            if explicit_key != Some(environment_key) {
                candidates.push((SourceOrigin::EnvironmentParameterStore, environment_key));
            }
        }

        candidates
    }
}

impl Default for SearchLocations {
    fn default() -> Self {
        Self::from_process()
    }
}



/// Searches for a configuration source.
pub struct ConfigLocator<'s> {
    locations: SearchLocations,
    parameter_store: Option<&'s dyn ParameterStore>,
}

impl<'s> ConfigLocator<'s> {
    pub fn new(locations: SearchLocations) -> Self {
        Self {
            locations,
            parameter_store: None,
        }
    }

    /// A locator searching the locations of the running process.
    pub fn from_process() -> Self {
        Self::new(SearchLocations::from_process())
    }

    #[must_use = "function returns the modified locator"]
    pub fn with_parameter_store(mut self, parameter_store: &'s dyn ParameterStore) -> Self {
        self.parameter_store = Some(parameter_store);
        self
    }

    /// Search the file system only.
    pub fn find(&self, explicit_path: Option<&Path>) -> Result<ConfigSource, ConfigError> {
        let mut searched = Vec::new();

        if let Some(source) = self.search_files(explicit_path, &mut searched) {
            return Ok(source);
        }

        error!("No CyHy configuration file found.");
        Err(ConfigError::NotFound { searched })
    }

    /// Search the parameter store first, then the file system.
    ///
    /// A parameter that does not exist moves the search on. Any other
    /// parameter store error is returned immediately.
    pub fn find_with_parameter_store(
        &self,
        explicit_path: Option<&Path>,
        explicit_key: Option<&str>,
    ) -> Result<ConfigSource, ConfigError> {
        let mut searched = Vec::new();

        if let Some(source) = self.search_parameter_store(explicit_key, &mut searched)? {
            return Ok(source);
        }

        if let Some(source) = self.search_files(explicit_path, &mut searched) {
            return Ok(source);
        }

        error!("No CyHy configuration found.");
        Err(ConfigError::NotFound { searched })
    }


    fn search_parameter_store(
        &self,
        explicit_key: Option<&str>,
        searched: &mut Vec<String>,
    ) -> Result<Option<ConfigSource>, ParameterStoreError> {
        let candidates = self.locations.parameter_candidates(explicit_key);
        if candidates.is_empty() {
            debug!("No parameter store keys provided, skipping the parameter store.");
            return Ok(None);
        }

        let Some(parameter_store) = self.parameter_store else {
            warn!("Parameter store keys were provided, but no parameter store is configured.");
            return Ok(None);
        };

        for (origin, key) in candidates {
            debug!("Fetching configuration from parameter store key {key} ({origin}).");

            match parameter_store.get_parameter(key) {
                Ok(text) => {
                    info!("Using configuration from parameter store key {key} ({origin}).");
                    return Ok(Some(ConfigSource::text(origin, key, text)));
                }
                Err(ParameterStoreError::NotFound { .. }) => {
                    debug!("Parameter {key} not found in the parameter store.");
                    searched.push(format!("parameter {key}"));
                }
                Err(store_error) => {
                    error!("Error fetching parameter {key}: {store_error}");
                    return Err(store_error);
                }
            }
        }

        Ok(None)
    }

    fn search_files(
        &self,
        explicit_path: Option<&Path>,
        searched: &mut Vec<String>,
    ) -> Option<ConfigSource> {
        for (origin, candidate_path) in self.locations.file_candidates(explicit_path) {
            if candidate_path.exists() {
                debug!(
                    "Using configuration file from {origin}: {}",
                    candidate_path.display()
                );
                return Some(ConfigSource::file(origin, candidate_path));
            }

            debug!(
                "No configuration file at {} ({origin}).",
                candidate_path.display()
            );
            searched.push(candidate_path.display().to_string());
        }

        None
    }
}


#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::parameter_store::InMemoryParameterStore;

    /// A sandbox with separate working, home and system directories, none of which
    /// contain a configuration file yet.
    struct Sandbox {
        root_directory: TempDir,
        locations: SearchLocations,
    }

    impl Sandbox {
        fn new() -> Self {
            let root = TempDir::new().expect("temporary directory");
            let working_directory = root.path().join("work");
            let home_directory = root.path().join("home");
            let system_directory = root.path().join("etc");

            for directory in [&working_directory, &home_directory, &system_directory] {
                fs::create_dir_all(directory).expect("create sandbox directory");
            }

            let locations = SearchLocations {
                environment_path: None,
                environment_parameter_key: None,
                working_directory,
                home_directory: Some(home_directory),
                system_file_path: system_directory.join("cyhy.toml"),
            };

            Self {
                root_directory: root,
                locations,
            }
        }

        fn root(&self) -> &Path {
            self.root_directory.path()
        }

        fn working_file(&self) -> PathBuf {
            self.locations.working_directory.join("cyhy.toml")
        }

        fn home_file(&self) -> PathBuf {
            self.locations
                .home_directory
                .as_ref()
                .expect("sandbox has a home directory")
                .join(".cyhy")
                .join("cyhy.toml")
        }

        fn system_file(&self) -> PathBuf {
            self.locations.system_file_path.clone()
        }

        fn create(&self, file_path: &Path) -> PathBuf {
            if let Some(parent) = file_path.parent() {
                fs::create_dir_all(parent).expect("create parent directory");
            }
            fs::write(file_path, "").expect("write config file");
            file_path.to_path_buf()
        }

        fn locator<'s>(&self) -> ConfigLocator<'s> {
            ConfigLocator::new(self.locations.clone())
        }
    }

    #[test]
    fn explicit_path_wins_when_it_exists() {
        let sandbox = Sandbox::new();
        let explicit = sandbox.create(&sandbox.root().join("explicit.toml"));
        sandbox.create(&sandbox.working_file());

        let source = sandbox.locator().find(Some(explicit.as_path())).expect("should find");
        assert_eq!(source, ConfigSource::file(SourceOrigin::Parameter, &explicit));
    }

    #[test]
    fn absent_explicit_path_continues_the_search() {
        let sandbox = Sandbox::new();
        let working = sandbox.create(&sandbox.working_file());

        let source = sandbox
            .locator()
            .find(Some(sandbox.root().join("absent.toml").as_path()))
            .expect("should find");
        assert_eq!(source, ConfigSource::file(SourceOrigin::WorkingDirectory, working));
    }

    #[test]
    fn environment_path_comes_before_working_directory() {
        let mut sandbox = Sandbox::new();
        let environment = sandbox.create(&sandbox.root().join("environment.toml"));
        sandbox.create(&sandbox.working_file());
        sandbox.locations.environment_path = Some(environment.clone());

        let source = sandbox.locator().find(None).expect("should find");
        assert_eq!(source, ConfigSource::file(SourceOrigin::EnvironmentPath, environment));
    }

    #[test]
    fn absent_environment_path_continues_the_search() {
        let mut sandbox = Sandbox::new();
        sandbox.locations.environment_path = Some(sandbox.root().join("absent.toml"));
        let working = sandbox.create(&sandbox.working_file());

        let source = sandbox.locator().find(None).expect("should find");
        assert_eq!(source, ConfigSource::file(SourceOrigin::WorkingDirectory, working));
    }

    #[test]
    fn home_directory_comes_before_system_directory() {
        let sandbox = Sandbox::new();
        let home = sandbox.create(&sandbox.home_file());
        sandbox.create(&sandbox.system_file());

        let source = sandbox.locator().find(None).expect("should find");
        assert_eq!(source, ConfigSource::file(SourceOrigin::HomeDirectory, home));
    }

    #[test]
    fn system_directory_is_the_last_resort() {
        let sandbox = Sandbox::new();
        let system = sandbox.create(&sandbox.system_file());

        let source = sandbox.locator().find(None).expect("should find");
        assert_eq!(source, ConfigSource::file(SourceOrigin::SystemDirectory, system));
    }

    #[test]
    fn missing_home_directory_is_skipped() {
        let mut sandbox = Sandbox::new();
        sandbox.locations.home_directory = None;
        let system = sandbox.create(&sandbox.system_file());

        let source = sandbox.locator().find(None).expect("should find");
        assert_eq!(source, ConfigSource::file(SourceOrigin::SystemDirectory, system));
    }

    #[test]
    fn candidates_are_tried_in_priority_order() {
        let mut sandbox = Sandbox::new();
        let explicit = sandbox.create(&sandbox.root().join("explicit.toml"));
        let environment = sandbox.create(&sandbox.root().join("environment.toml"));
        sandbox.locations.environment_path = Some(environment.clone());
        let working = sandbox.create(&sandbox.working_file());
        let home = sandbox.create(&sandbox.home_file());
        let system = sandbox.create(&sandbox.system_file());

        let expected_order = [
            (SourceOrigin::Parameter, explicit.clone()),
            (SourceOrigin::EnvironmentPath, environment),
            (SourceOrigin::WorkingDirectory, working),
            (SourceOrigin::HomeDirectory, home),
            (SourceOrigin::SystemDirectory, system),
        ];

        let locator = sandbox.locator();
        for (origin, file_path) in expected_order {
            let source = locator.find(Some(explicit.as_path())).expect("should find");
            assert_eq!(source, ConfigSource::file(origin, &file_path));
            assert_eq!(source.file_path(), Some(file_path.as_path()));

            fs::remove_file(&file_path).expect("remove the winning candidate");
        }

        let exhausted = locator.find(Some(explicit.as_path()));
        assert!(matches!(exhausted, Err(ConfigError::NotFound { .. })));
    }

    #[test]
    fn nothing_found_lists_every_candidate() {
        let sandbox = Sandbox::new();
        let explicit = sandbox.root().join("absent.toml");

        let error = sandbox
            .locator()
            .find(Some(explicit.as_path()))
            .expect_err("nothing should be found");

        match error {
            ConfigError::NotFound { searched } => assert_eq!(
                searched,
                vec![
                    explicit.display().to_string(),
                    sandbox.working_file().display().to_string(),
                    sandbox.home_file().display().to_string(),
                    sandbox.system_file().display().to_string(),
                ]
            ),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn parameter_store_value_comes_before_files() {
        let sandbox = Sandbox::new();
        let explicit = sandbox.create(&sandbox.root().join("explicit.toml"));
        let store = InMemoryParameterStore::new().with_parameter("/cyhy/config", "key = 1");

        let source = sandbox
            .locator()
            .with_parameter_store(&store)
            .find_with_parameter_store(Some(explicit.as_path()), Some("/cyhy/config"))
            .expect("should find");

        assert_eq!(
            source,
            ConfigSource::text(SourceOrigin::ParameterStore, "/cyhy/config", "key = 1")
        );
    }

    #[test]
    fn environment_parameter_key_is_used_when_explicit_key_is_missing() {
        let mut sandbox = Sandbox::new();
        sandbox.locations.environment_parameter_key = Some("/cyhy/env".to_string());
        let store = InMemoryParameterStore::new().with_parameter("/cyhy/env", "key = 2");

        let source = sandbox
            .locator()
            .with_parameter_store(&store)
            .find_with_parameter_store(None, Some("/cyhy/absent"))
            .expect("should find");

        assert_eq!(
            source,
            ConfigSource::text(SourceOrigin::EnvironmentParameterStore, "/cyhy/env", "key = 2")
        );
    }

    #[test]
    fn parameter_not_found_falls_back_to_files() {
        let sandbox = Sandbox::new();
        let working = sandbox.create(&sandbox.working_file());
        let store = InMemoryParameterStore::new();

        let source = sandbox
            .locator()
            .with_parameter_store(&store)
            .find_with_parameter_store(None, Some("/cyhy/absent"))
            .expect("should find");

        assert_eq!(source, ConfigSource::file(SourceOrigin::WorkingDirectory, working));
    }

    #[test]
    fn other_parameter_store_errors_stop_the_search() {
        let sandbox = Sandbox::new();
        sandbox.create(&sandbox.working_file());
        let store = InMemoryParameterStore::new().with_failure("/cyhy/config", "throttled");

        let error = sandbox
            .locator()
            .with_parameter_store(&store)
            .find_with_parameter_store(None, Some("/cyhy/config"))
            .expect_err("store failure should propagate");

        assert!(matches!(
            error,
            ConfigError::ParameterStore(ParameterStoreError::Other { .. })
        ));
    }

    #[test]
    fn keys_without_a_store_are_skipped() {
        let mut sandbox = Sandbox::new();
        sandbox.locations.environment_parameter_key = Some("/cyhy/env".to_string());
        let system = sandbox.create(&sandbox.system_file());

        let source = sandbox
            .locator()
            .find_with_parameter_store(None, Some("/cyhy/config"))
            .expect("should find");

        assert_eq!(source, ConfigSource::file(SourceOrigin::SystemDirectory, system));
    }

    #[test]
    fn nothing_found_includes_missing_parameters() {
        let sandbox = Sandbox::new();
        let store = InMemoryParameterStore::new();

        let error = sandbox
            .locator()
            .with_parameter_store(&store)
            .find_with_parameter_store(None, Some("/cyhy/absent"))
            .expect_err("nothing should be found");

        match error {
            ConfigError::NotFound { searched } => {
                assert_eq!(searched.first().map(String::as_str), Some("parameter /cyhy/absent"));
                assert_eq!(searched.len(), 4);
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }
}
