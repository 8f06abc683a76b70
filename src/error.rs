//! Typed errors surfaced by the library.
//!
//! Validation problems are not errors in this sense: they are collected into
//! [`Diagnostics`](crate::config::Diagnostics) and returned as data. The enums below cover the
//! failures that can happen around that pass (decoding, color math, display geometry parsing)
//! and at dispatch time.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::Diagnostics;

/// Failure of a color transform on a string that is not `#rrggbb`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("invalid color format '{0}', expected '#RRGGBB'")]
    InvalidColorFormat(String),
}

/// Failure while resolving or launching a button action.
///
/// These are only produced when a button is pressed, never during validation.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Script not found: {}", .0.display())]
    ScriptNotFound(PathBuf),

    #[error("failed to make {} executable: {source}", path.display())]
    Permissions {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("button has no '{0}' to dispatch")]
    MissingTarget(&'static str),

    #[error("failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failure of the validate-then-resolve pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Validation produced at least one error; the full report is attached.
    #[error("configuration is invalid ({} error(s))", .0.errors().len())]
    Invalid(Diagnostics),

    /// The document validated but could not be decoded into typed models.
    #[error("validated configuration could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failure to parse a `WxH+X+Y` display geometry string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid display geometry '{0}', expected WIDTHxHEIGHT+X+Y")]
pub struct GeometryParseError(pub String);
