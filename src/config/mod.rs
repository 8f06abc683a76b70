//! Configuration module for desk-controller.
//!
//! This module wires together the raw-document validator, its diagnostics, the typed
//! models the validated document decodes into, and the loading helpers.
//!
//! Example:
//! use desk_controller::config::{SchemaValidator, load_from_path};
//!
//! let report = SchemaValidator::default().validate_file("config.json".as_ref());
//! let cfg = load_from_path("config.json")?;

pub mod diagnostics;
pub mod loader;
pub mod models;
pub mod validator;

// Re-export core data models
pub use models::{
    ButtonAction, ButtonSpec, Config, DEFAULT_BACKGROUND_COLOR, DEFAULT_BUTTON_COLOR,
    DEFAULT_TEXT_COLOR, DisplayMode, DisplaySpec, LayoutSpec,
};

// Re-export validation types
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use validator::{SchemaValidator, Validation, ValidatorOptions};

// Re-export loader utilities
pub use loader::{
    ConfigLocator, INSTALLED_CONFIG_PATH, decode, generate_schema, load_from_path, load_from_str,
    write_schema_to_writer,
};
