//! Utilities for desk-controller.
//!
//! Submodules:
//! - `color`: `#rrggbb` validation and the lighten/darken shades used for button states.
//! - `paths`: icon and base-directory resolution relative to the configuration file.

pub mod color;
pub mod paths;
