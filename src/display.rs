//! Display geometry capability.
//!
//! Detecting outputs (xrandr, DRM, the toolkit's screen API) happens outside this crate.
//! The core only asks a [`DisplayProvider`] two questions: where is output `X`, and how
//! big is the default screen when `X` is unknown.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::GeometryParseError;

/// Size used when nothing better is known (the official 7" Pi touchscreen).
pub const FALLBACK_SCREEN_SIZE: (u32, u32) = (800, 480);

/// Position and size of one output in the virtual screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayGeometry {
    pub width: u32,
    pub height: u32,
    pub offset_x: i32,
    pub offset_y: i32,
}

impl FromStr for DisplayGeometry {
    type Err = GeometryParseError;

    /// Parses xrandr notation: `800x480+0+0`. Offsets are optional and may be negative.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || GeometryParseError(s.to_string());
        let s = s.trim();
        let size_end = s.find(['+', '-']).unwrap_or(s.len());
        let (size, offsets) = s.split_at(size_end);
        let (w, h) = size.split_once('x').ok_or_else(err)?;
        let width = w.parse().map_err(|_| err())?;
        let height = h.parse().map_err(|_| err())?;

        let (offset_x, offset_y) = if offsets.is_empty() {
            (0, 0)
        } else {
            let (x, y) = split_offsets(offsets).ok_or_else(err)?;
            (x.parse().map_err(|_| err())?, y.parse().map_err(|_| err())?)
        };

        Ok(Self {
            width,
            height,
            offset_x,
            offset_y,
        })
    }
}

/// Split `+X+Y` / `-X+Y` / `+X-Y` into signed components.
fn split_offsets(s: &str) -> Option<(&str, &str)> {
    let second = s[1..].find(['+', '-'])? + 1;
    let x = &s[..second];
    let y = &s[second..];
    Some((x.strip_prefix('+').unwrap_or(x), y.strip_prefix('+').unwrap_or(y)))
}

/// The "query display geometry" capability consumed by the pipeline.
pub trait DisplayProvider {
    /// Geometry of the named output, or `None` if it is unknown or not connected.
    fn query_display_geometry(&self, display: &str) -> Option<DisplayGeometry>;

    /// Size of the primary/default screen, used when no named output matched.
    fn default_screen_size(&self) -> (u32, u32) {
        FALLBACK_SCREEN_SIZE
    }
}

/// A fixed table of outputs, e.g. supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct StaticDisplays {
    displays: BTreeMap<String, DisplayGeometry>,
    default_size: Option<(u32, u32)>,
}

impl StaticDisplays {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_size(mut self, width: u32, height: u32) -> Self {
        self.default_size = Some((width, height));
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, geometry: DisplayGeometry) {
        self.displays.insert(name.into(), geometry);
    }

    /// Add an entry written as `NAME=WxH+X+Y`.
    pub fn insert_spec(&mut self, spec: &str) -> Result<(), GeometryParseError> {
        let (name, geometry) = spec
            .split_once('=')
            .ok_or_else(|| GeometryParseError(spec.to_string()))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(GeometryParseError(spec.to_string()));
        }
        self.insert(name, geometry.parse()?);
        Ok(())
    }
}

impl DisplayProvider for StaticDisplays {
    fn query_display_geometry(&self, display: &str) -> Option<DisplayGeometry> {
        self.displays.get(display).copied()
    }

    fn default_screen_size(&self) -> (u32, u32) {
        self.default_size.unwrap_or(FALLBACK_SCREEN_SIZE)
    }
}

/// Where the panel's screen size came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScreenTarget {
    pub width: u32,
    pub height: u32,
    /// Geometry of the requested output, when it was found.
    pub output: Option<DisplayGeometry>,
}

/// Look up `display` and fall back to the default screen size when it is absent or unknown.
pub fn screen_for(provider: &dyn DisplayProvider, display: Option<&str>) -> ScreenTarget {
    let found = display
        .filter(|name| !name.is_empty())
        .and_then(|name| {
            let geometry = provider.query_display_geometry(name);
            if geometry.is_none() {
                warn!(target: "desk_controller::display", display = name, "display not found, using default screen");
            }
            geometry
        });
    match found {
        Some(geometry) => {
            debug!(target: "desk_controller::display", ?geometry, "using target display");
            ScreenTarget {
                width: geometry.width,
                height: geometry.height,
                output: Some(geometry),
            }
        }
        None => {
            let (width, height) = provider.default_screen_size();
            ScreenTarget {
                width,
                height,
                output: None,
            }
        }
    }
}
