use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use super::geometry::{self, ButtonGeometry, GridGeometry};
use crate::config::{ButtonSpec, Config};
use crate::display::ScreenTarget;
use crate::error::ColorError;
use crate::executor::{CommandResolver, Dispatch};
use crate::utils::{color, paths};

const WINDOWED_FRACTION: f64 = 0.8;
const WINDOWED_MAX_WIDTH: u32 = 800;
const WINDOWED_MAX_HEIGHT: u32 = 600;

/// How the renderer should place its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum WindowPlacement {
    /// Decorated window, centered on the current screen.
    Windowed { width: u32, height: u32 },
    /// Frameless window covering exactly the target output.
    Positioned {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
    /// Target output unknown in kiosk mode.
    Fullscreen,
}

/// Everything the rendering layer needs for one button.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedButton {
    /// 1-based, same numbering as the diagnostics.
    pub index: usize,
    pub label: String,
    /// `None` when the button has no cell (grid full or position outside the grid).
    pub geometry: Option<ButtonGeometry>,
    pub color: String,
    pub hover_color: String,
    pub pressed_color: String,
    pub text_color: String,
    /// Resolved icon path; `None` when absent or missing on disk.
    pub icon: Option<PathBuf>,
    pub dispatch: Dispatch,
    pub needs_confirmation: bool,
}

/// Per-button render plan for one (configuration, display size) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPlan {
    pub grid: GridGeometry,
    pub window: WindowPlacement,
    pub background_color: String,
    pub hide_cursor: bool,
    pub buttons: Vec<PlannedButton>,
}

impl RenderPlan {
    /// Button by 1-based index.
    pub fn button(&self, index: usize) -> Option<&PlannedButton> {
        index.checked_sub(1).and_then(|i| self.buttons.get(i))
    }

    /// Button by 1-based index, only if it occupies a grid cell and can be pressed.
    pub fn pressable(&self, index: usize) -> Option<&PlannedButton> {
        self.button(index).filter(|b| b.geometry.is_some())
    }
}

/// Build the plan. `config` must come from a document that passed validation.
pub fn build(
    config: &Config,
    base_dir: &Path,
    screen: &ScreenTarget,
    touch_mode: bool,
) -> RenderPlan {
    let grid = geometry::resolve(
        config.layout.rows,
        config.layout.columns,
        screen.width,
        screen.height,
        touch_mode,
    );
    let cells = assign_cells(&config.buttons, grid.rows, grid.columns);
    let resolver = CommandResolver::new(base_dir);

    let buttons = config
        .buttons
        .iter()
        .zip(cells)
        .enumerate()
        .map(|(i, (button, cell))| {
            let geometry = cell.map(|(row, col)| geometry::resolve_button(&grid, row, col));
            if geometry.is_none() {
                warn!(
                    target: "desk_controller::plan",
                    button = i + 1, label = button.display_name(),
                    "button has no grid cell and will not be shown"
                );
            }
            plan_button(i + 1, button, geometry, base_dir, &resolver)
        })
        .collect();

    let window = place_window(config.wants_kiosk(), screen);
    debug!(target: "desk_controller::plan", ?window, "window placement");

    RenderPlan {
        grid,
        window,
        background_color: config.layout.background_color.clone(),
        hide_cursor: config.layout.hide_cursor,
        buttons,
    }
}

fn plan_button(
    index: usize,
    button: &ButtonSpec,
    geometry: Option<ButtonGeometry>,
    base_dir: &Path,
    resolver: &CommandResolver,
) -> PlannedButton {
    let shade = |f: fn(&str, u8) -> Result<String, ColorError>| {
        f(&button.color, color::DEFAULT_SHADE_AMOUNT).unwrap_or_else(|_| button.color.clone())
    };
    PlannedButton {
        index,
        label: button.display_name().to_string(),
        geometry,
        color: button.color.clone(),
        hover_color: shade(color::lighten),
        pressed_color: shade(color::darken),
        text_color: button.text_color.clone(),
        icon: button
            .icon
            .as_deref()
            .and_then(|icon| paths::existing_icon(icon, base_dir)),
        dispatch: Dispatch::plan(button, resolver),
        needs_confirmation: button.confirm,
    }
}

/// Assign grid cells: explicit in-grid positions first (first claimant wins), then
/// position-less buttons fill the remaining cells in row-major order.
pub fn assign_cells(buttons: &[ButtonSpec], rows: u32, columns: u32) -> Vec<Option<(u32, u32)>> {
    let in_grid = |[row, col]: [i64; 2]| {
        let row = u32::try_from(row).ok().filter(|r| *r < rows)?;
        let col = u32::try_from(col).ok().filter(|c| *c < columns)?;
        Some((row, col))
    };

    let mut taken = HashSet::new();
    let mut cells: Vec<Option<(u32, u32)>> = buttons
        .iter()
        .map(|b| {
            b.position
                .and_then(in_grid)
                .filter(|cell| taken.insert(*cell))
        })
        .collect();

    let mut free = (0..rows)
        .flat_map(|row| (0..columns).map(move |col| (row, col)))
        .filter(|cell| !taken.contains(cell));
    for (button, cell) in buttons.iter().zip(cells.iter_mut()) {
        if button.position.is_none() {
            *cell = free.next();
        }
    }
    cells
}

/// Windowed mode uses 80% of the screen capped at 800x600; kiosk mode covers the
/// target output when it is known and goes fullscreen otherwise.
pub fn place_window(kiosk: bool, screen: &ScreenTarget) -> WindowPlacement {
    if !kiosk {
        let scale = |v: u32, cap: u32| ((f64::from(v) * WINDOWED_FRACTION).floor() as u32).min(cap);
        return WindowPlacement::Windowed {
            width: scale(screen.width, WINDOWED_MAX_WIDTH),
            height: scale(screen.height, WINDOWED_MAX_HEIGHT),
        };
    }
    match screen.output {
        Some(output) => WindowPlacement::Positioned {
            x: output.offset_x,
            y: output.offset_y,
            width: output.width,
            height: output.height,
        },
        None => WindowPlacement::Fullscreen,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DisplayGeometry;
    use crate::executor::ResolvedCommand;
    use serde_json::json;

    fn config(doc: serde_json::Value) -> Config {
        serde_json::from_value(doc).unwrap()
    }

    fn screen(width: u32, height: u32) -> ScreenTarget {
        ScreenTarget {
            width,
            height,
            output: None,
        }
    }

    #[test]
    fn explicit_positions_win_and_others_fill_row_major() {
        let cfg = config(json!({
            "layout": { "rows": 2, "columns": 2 },
            "buttons": [
                { "name": "A", "command": "a" },
                { "name": "B", "command": "b", "position": [0, 0] },
                { "name": "C", "command": "c" },
                { "name": "D", "command": "d", "position": [1, 1] },
                { "name": "E", "command": "e" }
            ]
        }));
        let cells = assign_cells(&cfg.buttons, 2, 2);
        assert_eq!(
            cells,
            [Some((0, 1)), Some((0, 0)), Some((1, 0)), Some((1, 1)), None]
        );
    }

    #[test]
    fn out_of_grid_and_duplicate_positions_get_no_cell() {
        let cfg = config(json!({
            "layout": { "rows": 1, "columns": 2 },
            "buttons": [
                { "name": "A", "command": "a", "position": [0, 1] },
                { "name": "B", "command": "b", "position": [0, 1] },
                { "name": "C", "command": "c", "position": [3, -1] },
                { "name": "D", "command": "d" }
            ]
        }));
        assert_eq!(
            assign_cells(&cfg.buttons, 1, 2),
            [Some((0, 1)), None, None, Some((0, 0))]
        );
    }

    #[test]
    fn plan_carries_colors_dispatch_and_geometry() {
        let cfg = config(json!({
            "layout": { "rows": 2, "columns": 3, "background_color": "#101010", "hide_cursor": true },
            "buttons": [
                { "name": "Reboot", "command": "@/reboot.sh", "color": "#000000", "confirm": true },
                { "label": "Docs", "action": "url", "url": "https://example.org", "position": [1, 2] }
            ]
        }));
        let plan = build(&cfg, Path::new("/opt/app"), &screen(800, 480), false);

        assert_eq!(plan.background_color, "#101010");
        assert!(plan.hide_cursor);
        assert_eq!(plan.buttons.len(), 2);

        let reboot = plan.button(1).unwrap();
        assert_eq!(reboot.hover_color, "#141414");
        assert_eq!(reboot.pressed_color, "#000000");
        assert!(reboot.needs_confirmation);
        assert_eq!(
            reboot.dispatch,
            Dispatch::Command {
                command: ResolvedCommand::Script(PathBuf::from("/opt/app/scripts/reboot.sh"))
            }
        );
        assert_eq!(reboot.geometry.unwrap().rect.x, plan.grid.margin);

        let docs = plan.button(2).unwrap();
        assert_eq!(docs.label, "Docs");
        assert_eq!(docs.text_color, "#ECEFF4");
        let g = docs.geometry.unwrap();
        assert_eq!((g.row, g.column), (1, 2));
        assert!(plan.button(0).is_none());
        assert!(plan.button(3).is_none());
    }

    #[test]
    fn hidden_buttons_are_not_pressable() {
        let cfg = config(json!({
            "layout": { "rows": 1, "columns": 1 },
            "buttons": [
                { "name": "A", "command": "a" },
                { "name": "B", "command": "b" }
            ]
        }));
        let plan = build(&cfg, Path::new("."), &screen(800, 480), true);
        assert!(plan.pressable(1).is_some());
        assert!(plan.button(2).is_some());
        assert!(plan.pressable(2).is_none());
        assert!(plan.pressable(3).is_none());
    }

    #[test]
    fn window_placement_modes() {
        assert_eq!(
            place_window(false, &screen(1920, 1080)),
            WindowPlacement::Windowed {
                width: 800,
                height: 600
            }
        );
        assert_eq!(
            place_window(false, &screen(800, 480)),
            WindowPlacement::Windowed {
                width: 640,
                height: 384
            }
        );
        assert_eq!(place_window(true, &screen(800, 480)), WindowPlacement::Fullscreen);

        let output = DisplayGeometry {
            width: 800,
            height: 480,
            offset_x: 1920,
            offset_y: 0,
        };
        let target = ScreenTarget {
            width: 800,
            height: 480,
            output: Some(output),
        };
        assert_eq!(
            place_window(true, &target),
            WindowPlacement::Positioned {
                x: 1920,
                y: 0,
                width: 800,
                height: 480
            }
        );
    }
}
