#![forbid(unsafe_code)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! desk-controller: configuration validation and layout resolution for a fixed-grid
//! touchscreen control panel.
//!
//! A JSON document describes a rows×columns grid of buttons, each bound to a shell
//! command, a script, or a system action. This crate turns that document plus a display
//! size into an accept/reject verdict with diagnostics and, on acceptance, a fully
//! resolved per-button render plan. Drawing the buttons is left to the caller.
//!
//! - `config`: raw-document validator, diagnostics, typed models, loading helpers.
//! - `layout`: grid geometry and the render plan.
//! - `executor`: `@/` script resolution and dispatch of button actions.
//! - `display`: the display-geometry capability the caller provides.
//! - `pipeline`: the validate-then-resolve orchestrator.
//! - `utils`: color shades and path helpers.
//!
//! Use `desk_controller::prelude::*` to bring commonly used items into scope quickly.

/// Public module: configuration (validator, diagnostics, models, loader).
pub mod config;
/// Public module: display-geometry capability and fallback.
pub mod display;
/// Public module: typed errors.
pub mod error;
/// Public module: command resolution and dispatch.
pub mod executor;
/// Public module: grid geometry and render plan.
pub mod layout;
/// Public module: validate-then-resolve orchestration.
pub mod pipeline;
/// Public module: utilities (colors, paths).
pub mod utils;

/// Crate-level constants for consumers that want to inspect package metadata at runtime.
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the crate version (e.g., "0.1.0").
#[inline]
pub const fn version() -> &'static str {
    PKG_VERSION
}

/// Parse a plain level name (trace|debug|info|warn|error).
pub fn parse_level(s: &str) -> Option<tracing::Level> {
    use tracing::Level;

    match s.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Initialize tracing (logging) with a reasonable default.
/// - An explicit `level` wins.
/// - Otherwise honors the `RUST_LOG` environment variable if set.
/// - Falls back to `info` level.
///
/// Logs go to stderr so the validation report on stdout stays clean.
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init_tracing(level: Option<tracing::Level>) {
    use tracing_subscriber::fmt;

    let level = level
        .or_else(|| std::env::var("RUST_LOG").ok().and_then(|s| parse_level(&s)))
        .unwrap_or(tracing::Level::INFO);

    // Ignore the error if the global subscriber was already set.
    let _ = fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

/// A convenient set of exports for most consumers.
///
/// Bring this into scope with:
/// `use desk_controller::prelude::*;`
pub mod prelude {
    // Common result/error handling
    pub use anyhow::{Context, Result, anyhow, bail, ensure};

    // Tracing macros
    pub use tracing::{debug, error, info, trace, warn};

    pub use crate as desk_controller;

    // Frequently used items
    pub use crate::config::{Config, ConfigLocator, Diagnostics, SchemaValidator};
    pub use crate::display::{DisplayProvider, StaticDisplays};
    pub use crate::error::{DispatchError, PipelineError};
    pub use crate::executor::{Dispatch, Launcher};
    pub use crate::layout::RenderPlan;
    pub use crate::pipeline::{ConfigPipeline, LoadedConfig};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names() {
        assert_eq!(parse_level("WARNING"), Some(tracing::Level::WARN));
        assert_eq!(parse_level("debug"), Some(tracing::Level::DEBUG));
        assert_eq!(parse_level("loud"), None);
    }
}
