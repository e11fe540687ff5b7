use serde::{Deserialize, Serialize};

use crate::schema::{FieldSchema, SchemaNode};


/// A database the CyHy tools can connect to.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Database {
    /// Connection URI, including credentials.
    pub auth_uri: String,

    /// Name of the database.
    pub name: String,
}

impl Database {
    pub(crate) fn schema_node() -> SchemaNode {
        SchemaNode::table([
            FieldSchema::required("auth_uri", SchemaNode::String),
            FieldSchema::required("name", SchemaNode::String),
        ])
    }
}
