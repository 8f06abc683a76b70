use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default window background (Nord polar night).
pub const DEFAULT_BACKGROUND_COLOR: &str = "#2E3440";
/// Default button face color.
pub const DEFAULT_BUTTON_COLOR: &str = "#88C0D0";
/// Default button label color.
pub const DEFAULT_TEXT_COLOR: &str = "#ECEFF4";

/// Root configuration of the control panel.
///
/// Deserialized from the JSON document only after it passed validation, so every
/// optional field gets its typed default here, once, instead of at each consumer.
/// Unknown keys are ignored at every level.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Config {
    /// Grid geometry and window appearance.
    pub layout: LayoutSpec,

    /// Target display and kiosk behavior. Optional.
    #[serde(default)]
    pub display: DisplaySpec,

    /// Buttons in declaration order. Diagnostics refer to them with 1-based indices.
    pub buttons: Vec<ButtonSpec>,
}

impl Config {
    /// Kiosk behavior is requested either by the display section or by `layout.fullscreen`.
    pub fn wants_kiosk(&self) -> bool {
        self.display.kiosk_mode || self.layout.fullscreen
    }
}

/// The `layout` section.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct LayoutSpec {
    /// Number of grid rows (>= 1).
    pub rows: u32,
    /// Number of grid columns (>= 1).
    pub columns: u32,
    /// Requested spacing between buttons in pixels. Geometry derives its own spacing
    /// from the display size; this value is carried for renderers that honor it.
    #[serde(default)]
    pub button_spacing: Option<i64>,
    /// Window background color (`#RRGGBB`).
    #[serde(default = "default_background_color")]
    pub background_color: String,
    #[serde(default)]
    pub fullscreen: bool,
    #[serde(default)]
    pub hide_cursor: bool,
}

impl LayoutSpec {
    pub fn capacity(&self) -> u64 {
        u64::from(self.rows) * u64::from(self.columns)
    }
}

/// The optional `display` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DisplaySpec {
    #[serde(default)]
    pub mode: DisplayMode,
    /// Output identifier (e.g. "DSI-1") the panel should occupy in kiosk mode.
    #[serde(default)]
    pub primary_display: Option<String>,
    #[serde(default)]
    pub kiosk_mode: bool,
    #[serde(default)]
    pub auto_start: bool,
}

/// Display mode. `single` and `multi` are canonical.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Single,
    Multi,
}

impl DisplayMode {
    pub const ALLOWED: &'static [&'static str] = &["single", "multi"];
    /// Values accepted by older revisions; rejected with a dedicated hint.
    pub const LEGACY: &'static [&'static str] = &["mirror", "extend"];
}

/// One button of the grid.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ButtonSpec {
    /// Canonical button text.
    #[serde(default)]
    pub name: Option<String>,
    /// Alias for `name`, used when `name` is absent.
    #[serde(default)]
    pub label: Option<String>,

    /// What pressing the button does. Defaults to running `command`.
    #[serde(default)]
    pub action: ButtonAction,
    /// Shell command line, or `@/path` relative to the `scripts/` directory.
    #[serde(default)]
    pub command: Option<String>,
    /// Script path for `action: "script"`.
    #[serde(default)]
    pub script: Option<String>,
    /// Target for `action: "url"`.
    #[serde(default)]
    pub url: Option<String>,

    /// `[row, column]`, zero-based. Buttons without one are placed automatically.
    #[serde(default)]
    pub position: Option<[i64; 2]>,
    #[serde(default = "default_button_color")]
    pub color: String,
    #[serde(default = "default_text_color")]
    pub text_color: String,
    /// Icon path, relative to the configuration directory unless absolute.
    #[serde(default)]
    pub icon: Option<String>,
    /// Ask the operator before dispatching.
    #[serde(default)]
    pub confirm: bool,
}

impl ButtonSpec {
    /// Text shown on the button: `name`, falling back to `label`.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.label.as_deref())
            .unwrap_or("Button")
    }

    /// The string the button's action targets, if the action has one.
    pub fn target(&self) -> Option<&str> {
        match self.action {
            ButtonAction::Command => self.command.as_deref(),
            ButtonAction::Script => self.script.as_deref(),
            ButtonAction::Url => self.url.as_deref(),
            ButtonAction::Shutdown | ButtonAction::Reboot => None,
        }
    }
}

/// Dispatch kind of a button.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ButtonAction {
    #[default]
    Command,
    Script,
    Url,
    Shutdown,
    Reboot,
}

impl ButtonAction {
    pub const ALLOWED: &'static [&'static str] = &["command", "script", "url", "shutdown", "reboot"];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "command" => Some(Self::Command),
            "script" => Some(Self::Script),
            "url" => Some(Self::Url),
            "shutdown" => Some(Self::Shutdown),
            "reboot" => Some(Self::Reboot),
            _ => None,
        }
    }

    /// Field that must accompany this action, if any.
    pub fn required_field(self) -> Option<&'static str> {
        match self {
            Self::Command => Some("command"),
            Self::Script => Some("script"),
            Self::Url => Some("url"),
            Self::Shutdown | Self::Reboot => None,
        }
    }
}

fn default_background_color() -> String {
    DEFAULT_BACKGROUND_COLOR.to_string()
}

fn default_button_color() -> String {
    DEFAULT_BUTTON_COLOR.to_string()
}

fn default_text_color() -> String {
    DEFAULT_TEXT_COLOR.to_string()
}
