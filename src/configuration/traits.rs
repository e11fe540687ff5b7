use serde::de::DeserializeOwned;

use crate::error::ReferenceError;
use crate::schema::SchemaNode;
use crate::RawConfigTree;

/// Represents a configuration type that a raw TOML tree can be validated against.
///
/// Validation happens in two phases: [`resolve_references`][Self::resolve_references]
/// first rewrites name-based cross-references in the raw tree, and only then is the
/// rewritten tree checked against [`schema`][Self::schema] and deserialized.
pub trait ConfigSchema: DeserializeOwned {
    /// The closed schema the (reference-resolved) tree must match.
    fn schema() -> SchemaNode;

    /// Replace named references in `tree` with the records they point at.
    ///
    /// A reference field holding anything other than a name is reported in
    /// [`ReferenceError::malformed`]. Missing reference fields are left for
    /// structural validation. The default implementation does nothing.
    fn resolve_references(_tree: &mut RawConfigTree) -> Result<(), ReferenceError> {
        Ok(())
    }
}
