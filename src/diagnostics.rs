//! Compile errors (fatal) and warnings (accumulated, best-effort output).
use std::fmt;
use thiserror::Error;

/// Fatal: aborts the whole-document compilation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("schema `{schema}` references `{pointer}`, which is not in the schema registry")]
    UnresolvedReference { schema: String, pointer: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    EmptyComposition,
    UnsupportedPrimitive,
    EmptyEnum,
    /// Two schema names map to one identifier.
    IdentifierCollision,
}

/// Non-fatal condition resolved to the universal expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub schema: String,
    pub path: String,        // JSON-pointer-ish location inside the schema body
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    pub fn new(schema: &str, path: String, kind: WarningKind, message: impl Into<String>) -> Self {
        let warning = Self { schema: schema.to_string(), path, kind, message: message.into() };
        // surfaced to users through `Compilation::warnings`
        tracing::debug!(
            schema = %warning.schema,
            path = %warning.path,
            kind = ?warning.kind,
            "{}", warning.message
        );
        warning
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "/" } else { self.path.as_str() };
        write!(f, "{}{}: {}", self.schema, path, self.message)
    }
}
