//! The remote parameter store collaborator.
//!
//! The locator only needs to fetch a value by key and to tell
//! "no such parameter" apart from every other failure, so that is
//! all [`ParameterStore`] asks of an implementation.

use std::collections::HashMap;

use crate::error::ParameterStoreError;


/// A key-value store holding configuration documents (e.g. AWS SSM Parameter Store).
pub trait ParameterStore {
    /// Fetch the raw value stored under `key`.
    ///
    /// Implementations must return [`ParameterStoreError::NotFound`] when the key does
    /// not exist and [`ParameterStoreError::Other`] for anything else. One attempt only.
    fn get_parameter(&self, key: &str) -> Result<String, ParameterStoreError>;
}


#[derive(Debug, Clone)]
enum StoredParameter {
    Value(String),
    Failure(String),
}

/// A [`ParameterStore`] backed by a map, for embedding and tests.
///
/// Keys can also be set up to fail, which makes the store report
/// [`ParameterStoreError::Other`] for them.
#[derive(Debug, Clone, Default)]
pub struct InMemoryParameterStore {
    parameters: HashMap<String, StoredParameter>,
}

impl InMemoryParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "function returns the modified store"]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    #[must_use = "function returns the modified store"]
    pub fn with_failure(mut self, key: impl Into<String>, message: impl Into<String>) -> Self {
        self.parameters
            .insert(key.into(), StoredParameter::Failure(message.into()));
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.parameters
            .insert(key.into(), StoredParameter::Value(value.into()));
    }
}

impl ParameterStore for InMemoryParameterStore {
    fn get_parameter(&self, key: &str) -> Result<String, ParameterStoreError> {
        match self.parameters.get(key) {
            Some(StoredParameter::Value(value)) => Ok(value.clone()),
            Some(StoredParameter::Failure(message)) => {
                Err(ParameterStoreError::other(key, message.clone()))
            }
            None => Err(ParameterStoreError::NotFound {
                key: key.to_string(),
            }),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_the_three_outcomes() {
        let store = InMemoryParameterStore::new()
            .with_parameter("/cyhy/config", "key = \"value\"")
            .with_failure("/cyhy/broken", "AccessDeniedException");

        assert_eq!(
            store.get_parameter("/cyhy/config").expect("stored value"),
            "key = \"value\""
        );

        let missing = store.get_parameter("/cyhy/absent").expect_err("absent key");
        assert!(missing.is_not_found());

        let failed = store.get_parameter("/cyhy/broken").expect_err("failing key");
        assert!(!failed.is_not_found());
        assert!(matches!(failed, ParameterStoreError::Other { ref key, .. } if key == "/cyhy/broken"));
    }
}
