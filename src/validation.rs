//! Validation of a parsed configuration tree.
//!
//! [`validate`] runs the two phases in a fixed order: reference resolution
//! (see [`ConfigSchema::resolve_references`]) and then structural validation
//! against [`ConfigSchema::schema`], which collects every violation before
//! failing. Only a tree that passes both phases is deserialized into the typed
//! configuration.
//!
//! [`validate_raw`] is the schema-less variant and hands the tree back untouched.

use toml::Value;
use tracing::debug;

use crate::configuration::ConfigSchema;
use crate::error::{ConfigError, ValidationError, Violation};
use crate::schema::{FieldSchema, SchemaNode};
use crate::RawConfigTree;


/// Validate `tree` against the schema of `S` and deserialize it.
pub fn validate<S: ConfigSchema>(mut tree: RawConfigTree) -> Result<S, ConfigError> {
    S::resolve_references(&mut tree)?;

    let violations = check_tree(&tree, &S::schema());
    if !violations.is_empty() {
        debug!(
            violation_count = violations.len(),
            "Configuration failed structural validation."
        );
        return Err(ValidationError { violations }.into());
    }

    debug!("Validated configuration tree:\n{:#?}", tree);

    let typed = Value::Table(tree)
        .try_into::<S>()
        .map_err(|error| ValidationError {
            violations: vec![Violation {
                path: String::new(),
                expected: std::any::type_name::<S>().to_string(),
                actual: error.message().trim().to_string(),
            }],
        })?;

    Ok(typed)
}

/// Schema-less validation: returns the tree as it was given.
pub fn validate_raw(tree: RawConfigTree) -> RawConfigTree {
    debug!("No schema supplied, returning the raw configuration tree.");
    tree
}

/// Check `tree` against `schema`, returning every violation found.
pub fn check_tree(tree: &RawConfigTree, schema: &SchemaNode) -> Vec<Violation> {
    let mut violations = Vec::new();

    match schema {
        SchemaNode::Table(fields) => check_table(tree, fields, "", &mut violations),
        SchemaNode::Map(inner) => check_entries(tree, inner, "", &mut violations),
        other => violations.push(Violation {
            path: String::new(),
            expected: other.to_string(),
            actual: "table".to_string(),
        }),
    }

    violations
}


fn check_value(value: &Value, node: &SchemaNode, path: &str, violations: &mut Vec<Violation>) {
    match (node, value) {
        (SchemaNode::String, Value::String(_))
        | (SchemaNode::Integer, Value::Integer(_))
        | (SchemaNode::Float, Value::Float(_) | Value::Integer(_))
        | (SchemaNode::Boolean, Value::Boolean(_)) => {}

        (SchemaNode::Table(fields), Value::Table(table)) => {
            check_table(table, fields, path, violations)
        }
        (SchemaNode::Map(inner), Value::Table(table)) => {
            check_entries(table, inner, path, violations)
        }
        (SchemaNode::Array(item), Value::Array(items)) => {
            for (index, entry) in items.iter().enumerate() {
                check_value(entry, item, &format!("{path}[{index}]"), violations);
            }
        }

        (expected, actual) => violations.push(Violation {
            path: path.to_string(),
            expected: expected.to_string(),
            actual: describe_value(actual),
        }),
    }
}

fn check_table(
    table: &RawConfigTree,
    fields: &[FieldSchema],
    path: &str,
    violations: &mut Vec<Violation>,
) {
    for field in fields {
        let field_path = join_path(path, field.name);

        match table.get(field.name) {
            Some(value) => check_value(value, &field.node, &field_path, violations),
            None if field.required => violations.push(Violation {
                path: field_path,
                expected: field.node.to_string(),
                actual: "missing".to_string(),
            }),
            None => {}
        }
    }

    // Closed table: anything not declared is rejected.
    for (key, value) in table {
        if fields.iter().all(|field| field.name != key) {
            violations.push(Violation {
                path: join_path(path, key),
                expected: "no such field".to_string(),
                actual: format!("unknown field ({})", describe_value(value)),
            });
        }
    }
}

fn check_entries(
    table: &RawConfigTree,
    inner: &SchemaNode,
    path: &str,
    violations: &mut Vec<Violation>,
) {
    for (key, value) in table {
        check_value(value, inner, &join_path(path, key), violations);
    }
}

fn join_path(base: &str, key: &str) -> String {
    if base.is_empty() {
        key.to_string()
    } else {
        format!("{base}.{key}")
    }
}

pub(crate) fn describe_value(value: &Value) -> String {
    match value {
        Value::String(string) => format!("string {string:?}"),
        Value::Integer(integer) => format!("integer {integer}"),
        Value::Float(float) => format!("float {float}"),
        Value::Boolean(boolean) => format!("boolean {boolean}"),
        Value::Datetime(datetime) => format!("datetime {datetime}"),
        Value::Array(items) => format!("array of {} item(s)", items.len()),
        Value::Table(table) => format!("table with {} key(s)", table.len()),
    }
}
