use serde::{Deserialize, Serialize};

use super::Database;
use crate::schema::{FieldSchema, SchemaNode};


/// A named mode of operation.
///
/// In the configuration file `database` is the key of an entry in the `databases`
/// table. It is replaced by that entry before validation, so a loaded [`Mode`]
/// always embeds the full [`Database`].
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Mode {
    pub database: Database,

    pub description: String,

    pub name: String,
}

impl Mode {
    pub(crate) fn schema_node() -> SchemaNode {
        SchemaNode::table([
            FieldSchema::required("database", Database::schema_node()),
            FieldSchema::required("description", SchemaNode::String),
            FieldSchema::required("name", SchemaNode::String),
        ])
    }
}
