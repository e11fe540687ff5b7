//! Declarative description of a closed configuration schema.
//!
//! A [`SchemaNode`] describes the shape a [`RawConfigTree`][crate::RawConfigTree]
//! must have before it can be deserialized into a typed configuration.
//! Tables are always closed: any key not listed as a field is a violation.

use std::fmt::{self, Display, Formatter};


/// The expected type of a value at some position in the configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    String,
    Integer,
    Float,
    Boolean,

    /// A record with a fixed, closed set of fields.
    Table(Vec<FieldSchema>),

    /// A table of named records: arbitrary keys, every value matching the inner schema.
    Map(Box<SchemaNode>),

    /// A homogeneous array.
    Array(Box<SchemaNode>),
}

impl SchemaNode {
    /// Convenience constructor for a closed table.
    pub fn table<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = FieldSchema>,
    {
        Self::Table(fields.into_iter().collect())
    }

    /// Convenience constructor for a map of named records.
    pub fn map_of(value: SchemaNode) -> Self {
        Self::Map(Box::new(value))
    }

    /// Convenience constructor for an array.
    pub fn array_of(item: SchemaNode) -> Self {
        Self::Array(Box::new(item))
    }
}

impl Display for SchemaNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SchemaNode::String => f.write_str("string"),
            SchemaNode::Integer => f.write_str("integer"),
            SchemaNode::Float => f.write_str("float"),
            SchemaNode::Boolean => f.write_str("boolean"),
            SchemaNode::Table(_) => f.write_str("table"),
            SchemaNode::Map(value) => write!(f, "table of {value}"),
            SchemaNode::Array(item) => write!(f, "array of {item}"),
        }
    }
}


/// A named field of a closed table.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    pub name: &'static str,
    pub node: SchemaNode,
    pub required: bool,
}

impl FieldSchema {
    pub fn required(name: &'static str, node: SchemaNode) -> Self {
        Self {
            name,
            node,
            required: true,
        }
    }

    pub fn optional(name: &'static str, node: SchemaNode) -> Self {
        Self {
            name,
            node,
            required: false,
        }
    }
}
