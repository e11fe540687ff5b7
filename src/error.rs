//! Error types returned while locating, parsing and validating a configuration.
//!
//! Every failure mode has its own type so callers can tell a missing
//! configuration apart from one that was found but is invalid
//! (see [`ConfigError::is_not_found`] and [`ConfigError::is_invalid`]).

use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;


/// Boxed error type used for opaque parameter store failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;


/// Any error that can occur while obtaining a configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// Every candidate source was exhausted.
    #[error("no CyHy configuration was found (searched {})", display_searched(.searched))]
    #[diagnostic(
        code(cyhy_config::not_found),
        help("pass a configuration file path or set CYHY_CONFIG_PATH")
    )]
    NotFound { searched: Vec<String> },

    /// A file source was selected but is not a readable regular file.
    #[error("configuration file not found: {}", .path.display())]
    #[diagnostic(code(cyhy_config::file_not_found))]
    FileNotFound { path: PathBuf },

    #[error("failed to read configuration file {}", .path.display())]
    #[diagnostic(code(cyhy_config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Reference(#[from] ReferenceError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    /// The parameter store failed with something other than "not found".
    #[error(transparent)]
    #[diagnostic(transparent)]
    ParameterStore(#[from] ParameterStoreError),
}

impl ConfigError {
    /// Returns `true` if no configuration source could be found at all.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ConfigError::NotFound { .. } | ConfigError::FileNotFound { .. }
        )
    }

    /// Returns `true` if a configuration was found, but its contents were rejected.
    pub fn is_invalid(&self) -> bool {
        matches!(
            self,
            ConfigError::Syntax(_) | ConfigError::Reference(_) | ConfigError::Validation(_)
        )
    }
}

fn display_searched(searched: &[String]) -> String {
    if searched.is_empty() {
        return "nothing".to_string();
    }

    searched.join(", ")
}



/// TOML text could not be parsed.
///
/// Parsing is all-or-nothing: when this error is returned, no part of the document is.
#[derive(Debug, Error, Diagnostic)]
#[error("invalid TOML in {origin} at line {line}, column {column}: {message}")]
#[diagnostic(code(cyhy_config::syntax))]
pub struct SyntaxError {
    /// Human-readable name of the text's source (file path or parameter key).
    pub origin: String,

    /// The parser's description of the problem.
    pub message: String,

    /// 1-based line of the offending position.
    pub line: usize,

    /// 1-based column (in characters) of the offending position.
    pub column: usize,

    #[source_code]
    source_code: NamedSource<String>,

    #[label("here")]
    span: Option<SourceSpan>,
}

impl SyntaxError {
    pub(crate) fn from_toml(origin: &str, text: &str, error: &toml::de::Error) -> Self {
        let span = error.span();
        let offset = span.as_ref().map(|range| range.start).unwrap_or(0);
        let (line, column) = line_and_column(text, offset);

        Self {
            origin: origin.to_string(),
            message: error.message().trim().to_string(),
            line,
            column,
            source_code: NamedSource::new(origin, text.to_string()),
            span: span.map(|range| SourceSpan::from(range.start..range.end)),
        }
    }
}

/// Converts a byte offset into a 1-based (line, column) pair.
fn line_and_column(text: &str, offset: usize) -> (usize, usize) {
    let mut boundary = offset.min(text.len());
    while !text.is_char_boundary(boundary) {
        boundary -= 1;
    }

    let preceding = &text[..boundary];
    let line = preceding.matches('\n').count() + 1;
    let column = match preceding.rfind('\n') {
        Some(newline) => preceding[newline + 1..].chars().count() + 1,
        None => preceding.chars().count() + 1,
    };

    (line, column)
}



/// A name-based cross-reference that points at nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    /// Dotted path of the referencing field, e.g. `modes.m1.database`.
    pub path: String,

    /// The name that was looked up.
    pub name: String,

    /// The table the name was looked up in, e.g. `databases`.
    pub target: String,
}

impl Display for DanglingReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} references \"{}\", which is not defined in {}",
            self.path, self.name, self.target
        )
    }
}

/// One or more named references could not be resolved.
#[derive(Debug, Error, Diagnostic)]
#[error("unresolved references:\n{}", render_reference_problems(.references, .malformed))]
#[diagnostic(code(cyhy_config::reference))]
pub struct ReferenceError {
    /// Names that do not exist in their target table.
    pub references: Vec<DanglingReference>,

    /// Reference fields holding something other than a name, e.g. an inline table.
    pub malformed: Vec<Violation>,
}

impl ReferenceError {
    /// Returns `true` if a reference problem was reported for exactly `path`.
    pub fn has_problem_at(&self, path: &str) -> bool {
        self.references.iter().any(|reference| reference.path == path)
            || self.malformed.iter().any(|violation| violation.path == path)
    }
}

fn render_reference_problems(references: &[DanglingReference], malformed: &[Violation]) -> String {
    let mut lines = Vec::with_capacity(2);
    if !references.is_empty() {
        lines.push(render_list(references));
    }
    if !malformed.is_empty() {
        lines.push(render_list(malformed));
    }

    lines.join("\n")
}



/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted path of the offending field (empty for the document root).
    pub path: String,

    /// What the schema expected at this path.
    pub expected: String,

    /// What was actually found at this path.
    pub actual: String,
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() {
            "<root>"
        } else {
            self.path.as_str()
        };

        write!(f, "{path}: expected {}, found {}", self.expected, self.actual)
    }
}

/// The configuration does not match its schema.
///
/// Carries every violation found in a single pass, not just the first.
#[derive(Debug, Error, Diagnostic)]
#[error(
    "configuration failed validation ({} violation(s)):\n{}",
    .violations.len(),
    render_list(.violations)
)]
#[diagnostic(code(cyhy_config::validation))]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl ValidationError {
    /// Returns `true` if any violation was reported for exactly `path`.
    pub fn has_violation_at(&self, path: &str) -> bool {
        self.violations
            .iter()
            .any(|violation| violation.path == path)
    }
}

fn render_list<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| format!("  - {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}



/// Errors reported by a [`ParameterStore`][crate::ParameterStore].
#[derive(Debug, Error, Diagnostic)]
pub enum ParameterStoreError {
    /// The store has no parameter under this key. Treated as a soft miss by the locator.
    #[error("parameter {key} was not found in the parameter store")]
    #[diagnostic(code(cyhy_config::parameter_store::not_found))]
    NotFound { key: String },

    /// Any other store failure. Never suppressed.
    #[error("failed to fetch parameter {key} from the parameter store")]
    #[diagnostic(code(cyhy_config::parameter_store::other))]
    Other {
        key: String,
        #[source]
        source: BoxError,
    },
}

impl ParameterStoreError {
    pub fn other<E>(key: impl Into<String>, error: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Other {
            key: key.into(),
            source: error.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ParameterStoreError::NotFound { .. })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_and_column_are_one_based() {
        let text = "a = 1\nbb = \"x\"\nccc";

        assert_eq!(line_and_column(text, 0), (1, 1));
        assert_eq!(line_and_column(text, 6), (2, 1));
        assert_eq!(line_and_column(text, 9), (2, 4));
        assert_eq!(line_and_column(text, text.len()), (3, 4));
    }

    #[test]
    fn line_and_column_handles_multibyte_text() {
        let text = "name = \"žč\"\nbroken";
        // Offset inside the two-byte `ž` is pulled back to a character boundary.
        assert_eq!(line_and_column(text, 9), (1, 9));
        assert_eq!(line_and_column(text, text.len()), (2, 7));
    }

    #[test]
    fn not_found_and_invalid_kinds_are_distinct() {
        let not_found = ConfigError::NotFound {
            searched: vec!["/etc/cyhy.toml".to_string()],
        };
        assert!(not_found.is_not_found());
        assert!(!not_found.is_invalid());

        let invalid = ConfigError::Validation(ValidationError {
            violations: vec![Violation {
                path: "modes".to_string(),
                expected: "table".to_string(),
                actual: "missing".to_string(),
            }],
        });
        assert!(invalid.is_invalid());
        assert!(!invalid.is_not_found());
    }

    #[test]
    fn reference_error_lists_dangling_and_malformed_references() {
        let error = ReferenceError {
            references: vec![DanglingReference {
                path: "modes.m2.database".to_string(),
                name: "gone".to_string(),
                target: "databases".to_string(),
            }],
            malformed: vec![Violation {
                path: "modes.m1.database".to_string(),
                expected: "the name of an entry in databases".to_string(),
                actual: "table with 2 key(s)".to_string(),
            }],
        };

        assert!(error.has_problem_at("modes.m1.database"));
        assert!(error.has_problem_at("modes.m2.database"));
        assert!(!error.has_problem_at("modes.m3.database"));

        let message = error.to_string();
        assert!(message.contains(
            "modes.m2.database references \"gone\", which is not defined in databases"
        ));
        assert!(message.contains(
            "modes.m1.database: expected the name of an entry in databases, found table with 2 key(s)"
        ));
    }

    #[test]
    fn validation_error_lists_every_violation() {
        let error = ValidationError {
            violations: vec![
                Violation {
                    path: "databases".to_string(),
                    expected: "table".to_string(),
                    actual: "missing".to_string(),
                },
                Violation {
                    path: "modes".to_string(),
                    expected: "table".to_string(),
                    actual: "missing".to_string(),
                },
            ],
        };

        let message = error.to_string();
        assert!(message.contains("2 violation(s)"));
        assert!(message.contains("databases: expected table, found missing"));
        assert!(message.contains("modes: expected table, found missing"));
    }
}
