//! Layout resolution: grid geometry from display size, and the per-button render plan.

pub mod geometry;
pub mod plan;

pub use geometry::{ButtonGeometry, GridGeometry, Rect, resolve, resolve_button};
pub use plan::{PlannedButton, RenderPlan, WindowPlacement, assign_cells, place_window};
