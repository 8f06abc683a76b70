use serde::Serialize;
use tracing::debug;

/// Share of each display dimension given to the button grid.
const AVAILABLE_FRACTION: f64 = 0.9;
const SPACING_FRACTION: f64 = 0.01;
const MARGIN_FRACTION: f64 = 0.02;
const FONT_FRACTION: f64 = 0.1;
const PADDING_FRACTION: f64 = 0.05;
const ICON_FRACTION: f64 = 0.3;
const MIN_RENDER_FRACTION: f64 = 0.8;

const MIN_SPACING: u32 = 2;
const MIN_MARGIN: u32 = 5;
const MIN_FONT_SIZE: u32 = 8;
const MIN_PADDING: u32 = 3;
const MIN_ICON_SIZE: u32 = 16;

const TOUCH_MIN_PADDING: u32 = 10;
const TOUCH_MIN_FONT_SIZE: u32 = 14;
const TOUCH_MIN_SPACING: u32 = 15;

/// Grid-wide pixel geometry for one (grid, display, touch) combination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridGeometry {
    pub rows: u32,
    pub columns: u32,
    pub display_width: u32,
    pub display_height: u32,
    pub touch_mode: bool,
    pub spacing: u32,
    pub margin: u32,
    pub available_width: f64,
    pub available_height: f64,
    pub cell_width: u32,
    pub cell_height: u32,
    pub font_size: u32,
    pub padding: u32,
    pub border_radius: u32,
    pub icon_size: u32,
    pub min_cell_render_width: f64,
    pub min_cell_render_height: f64,
}

/// Pixel rectangle, origin at the window's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Geometry of one grid cell's button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ButtonGeometry {
    pub row: u32,
    pub column: u32,
    pub rect: Rect,
    pub font_size: u32,
    pub padding: u32,
    pub border_radius: u32,
    pub icon_size: u32,
}

/// Compute grid geometry from the grid shape and the target display size.
///
/// Pure: same inputs, same output. Every size has a floor so tiny or zero-sized displays
/// never yield zero geometry. Zero rows or columns are treated as one.
pub fn resolve(
    rows: u32,
    columns: u32,
    display_width: u32,
    display_height: u32,
    touch_mode: bool,
) -> GridGeometry {
    let rows = rows.max(1);
    let columns = columns.max(1);
    let short_side = f64::from(display_width.min(display_height));

    let mut spacing = scaled(short_side, SPACING_FRACTION, MIN_SPACING);
    let margin = scaled(short_side, MARGIN_FRACTION, MIN_MARGIN);

    let available_width = f64::from(display_width) * AVAILABLE_FRACTION;
    let available_height = f64::from(display_height) * AVAILABLE_FRACTION;
    let cell_width = (available_width / f64::from(columns)).floor() as u32;
    let cell_height = (available_height / f64::from(rows)).floor() as u32;

    let cell_short = f64::from(cell_width.min(cell_height));
    let mut font_size = scaled(cell_short, FONT_FRACTION, MIN_FONT_SIZE);
    let mut padding = scaled(cell_short, PADDING_FRACTION, MIN_PADDING);
    let border_radius = padding;
    let icon_size = scaled(cell_short, ICON_FRACTION, MIN_ICON_SIZE);

    if touch_mode {
        padding = padding.max(TOUCH_MIN_PADDING);
        font_size = font_size.max(TOUCH_MIN_FONT_SIZE);
        spacing = spacing.max(TOUCH_MIN_SPACING);
    }

    let geometry = GridGeometry {
        rows,
        columns,
        display_width,
        display_height,
        touch_mode,
        spacing,
        margin,
        available_width,
        available_height,
        cell_width,
        cell_height,
        font_size,
        padding,
        border_radius,
        icon_size,
        min_cell_render_width: f64::from(cell_width) * MIN_RENDER_FRACTION,
        min_cell_render_height: f64::from(cell_height) * MIN_RENDER_FRACTION,
    };
    debug!(
        target: "desk_controller::geometry",
        rows, columns, display_width, display_height, touch_mode,
        cell_width, cell_height, font_size, padding, icon_size, spacing,
        "resolved grid geometry"
    );
    geometry
}

/// Geometry of the button occupying cell `(row, column)`.
///
/// The button fills its cell minus the trailing spacing, but never shrinks below the
/// minimum render size (80% of the cell).
pub fn resolve_button(grid: &GridGeometry, row: u32, column: u32) -> ButtonGeometry {
    let min_width = grid.min_cell_render_width.round() as u32;
    let min_height = grid.min_cell_render_height.round() as u32;
    let rect = Rect {
        x: grid.margin.saturating_add(column.saturating_mul(grid.cell_width)),
        y: grid.margin.saturating_add(row.saturating_mul(grid.cell_height)),
        width: grid.cell_width.saturating_sub(grid.spacing).max(min_width),
        height: grid.cell_height.saturating_sub(grid.spacing).max(min_height),
    };
    ButtonGeometry {
        row,
        column,
        rect,
        font_size: grid.font_size,
        padding: grid.padding,
        border_radius: grid.border_radius,
        icon_size: grid.icon_size,
    }
}

fn scaled(base: f64, fraction: f64, floor: u32) -> u32 {
    ((base * fraction).round() as u32).max(floor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_panel_800x480() {
        let g = resolve(2, 3, 800, 480, false);
        assert_eq!(g.spacing, 5);
        assert_eq!(g.margin, 10);
        assert_eq!(g.cell_width, 240);
        assert_eq!(g.cell_height, 216);
        assert_eq!(g.font_size, 22);
        assert_eq!(g.padding, 11);
        assert_eq!(g.border_radius, 11);
        assert_eq!(g.icon_size, 65);
        assert!((g.min_cell_render_width - 192.0).abs() < 1e-9);
        assert!((g.min_cell_render_height - 172.8).abs() < 1e-9);
    }

    #[test]
    fn resolution_is_deterministic() {
        assert_eq!(resolve(2, 3, 800, 480, false), resolve(2, 3, 800, 480, false));
        assert_eq!(resolve(4, 5, 1920, 1080, true), resolve(4, 5, 1920, 1080, true));
    }

    #[test]
    fn touch_mode_never_shrinks_targets() {
        for &(rows, cols, w, h) in &[
            (2, 3, 800, 480),
            (1, 1, 100, 50),
            (6, 8, 1920, 1080),
            (3, 3, 3840, 2160),
            (10, 10, 320, 240),
        ] {
            let plain = resolve(rows, cols, w, h, false);
            let touch = resolve(rows, cols, w, h, true);
            assert!(touch.padding >= plain.padding);
            assert!(touch.font_size >= plain.font_size);
            assert!(touch.spacing >= plain.spacing);
            assert!(touch.padding >= 10 && touch.font_size >= 14 && touch.spacing >= 15);
            assert_eq!(touch.cell_width, plain.cell_width);
            assert_eq!(touch.icon_size, plain.icon_size);
        }
    }

    #[test]
    fn floors_hold_for_degenerate_displays() {
        let g = resolve(4, 4, 100, 50, false);
        assert_eq!(g.spacing, 2);
        assert_eq!(g.margin, 5);
        assert_eq!(g.font_size, 8);
        assert_eq!(g.padding, 3);
        assert_eq!(g.icon_size, 16);

        let zero = resolve(0, 0, 0, 0, false);
        assert_eq!(zero.rows, 1);
        assert_eq!(zero.cell_width, 0);
        assert_eq!(zero.font_size, 8);
        assert_eq!(zero.icon_size, 16);
    }

    #[test]
    fn large_display_scales_up() {
        let g = resolve(2, 2, 3840, 2160, false);
        assert_eq!(g.spacing, 22);
        assert_eq!(g.margin, 43);
        assert_eq!(g.cell_width, 1728);
        assert_eq!(g.cell_height, 972);
        assert_eq!(g.font_size, 97);
        assert_eq!(g.icon_size, 292);
    }

    #[test]
    fn button_rect_follows_cell() {
        let g = resolve(2, 3, 800, 480, false);
        let b = resolve_button(&g, 1, 2);
        assert_eq!(
            b.rect,
            Rect {
                x: 10 + 2 * 240,
                y: 10 + 216,
                width: 235,
                height: 211
            }
        );
        assert_eq!(b.font_size, 22);
        assert_eq!(b.icon_size, 65);
    }

    #[test]
    fn button_never_shrinks_below_min_render_size() {
        let g = resolve(1, 1, 40, 40, true);
        // cell 36x36, touch spacing 15 would leave 21px; minimum is 29px (80% of 36).
        let b = resolve_button(&g, 0, 0);
        assert_eq!(b.rect.width, 29);
        assert_eq!(b.rect.height, 29);
    }
}
