use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, trace};

use super::diagnostics::{DiagnosticKind, Diagnostics};
use super::models::{ButtonAction, DisplayMode};
use crate::utils::{color, paths};

/// Knobs that relax the default rules. The defaults are the strict behavior.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ValidatorOptions {
    /// Report out-of-grid positions as warnings instead of errors.
    pub relaxed_bounds: bool,
}

/// Outcome of one validation pass.
#[derive(Debug, Clone)]
pub struct Validation {
    /// The parsed document, present whenever the input was valid JSON.
    pub document: Option<Value>,
    pub diagnostics: Diagnostics,
}

impl Validation {
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_ok()
    }
}

/// Structural and semantic checks over a raw configuration document.
///
/// Structural failures (unreadable file, bad JSON, wrong top-level type, missing
/// `layout`/`buttons`) stop the pass with a single error. Everything else is accumulated
/// so one report shows every problem. Nothing here returns `Err` or panics.
#[derive(Debug, Clone, Default)]
pub struct SchemaValidator {
    options: ValidatorOptions,
}

impl SchemaValidator {
    pub fn new(options: ValidatorOptions) -> Self {
        Self { options }
    }

    /// Read, parse and validate the file at `path`. Relative icon paths resolve against
    /// the file's directory.
    pub fn validate_file(&self, path: &Path) -> Validation {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                let message = if err.kind() == ErrorKind::NotFound {
                    format!("Configuration file '{}' not found", path.display())
                } else {
                    format!("Error reading configuration file: {err}")
                };
                let mut diagnostics = Diagnostics::new();
                diagnostics.push(DiagnosticKind::Structural, None, message);
                return Validation {
                    document: None,
                    diagnostics,
                };
            }
        };
        self.validate_str(&text, &paths::config_base_dir(path))
    }

    /// Parse and validate a JSON text.
    pub fn validate_str(&self, text: &str, base_dir: &Path) -> Validation {
        match serde_json::from_str::<Value>(text) {
            Ok(document) => {
                let diagnostics = self.validate_document(&document, base_dir);
                Validation {
                    document: Some(document),
                    diagnostics,
                }
            }
            Err(err) => {
                let mut diagnostics = Diagnostics::new();
                diagnostics.push(
                    DiagnosticKind::Structural,
                    None,
                    format!("Invalid JSON in configuration file: {err}"),
                );
                Validation {
                    document: None,
                    diagnostics,
                }
            }
        }
    }

    /// Validate an already parsed document.
    pub fn validate_document(&self, document: &Value, base_dir: &Path) -> Diagnostics {
        let mut pass = Pass {
            options: self.options,
            base_dir,
            diagnostics: Diagnostics::new(),
        };
        pass.run(document);
        debug!(
            target: "desk_controller::validator",
            errors = pass.diagnostics.errors().len(),
            warnings = pass.diagnostics.warnings().len(),
            "validation pass finished"
        );
        pass.diagnostics
    }
}

/// State of a single pass; dropped when the pass ends.
struct Pass<'a> {
    options: ValidatorOptions,
    base_dir: &'a Path,
    diagnostics: Diagnostics,
}

impl Pass<'_> {
    fn error(&mut self, kind: DiagnosticKind, button: Option<usize>, message: String) {
        trace!(target: "desk_controller::validator", ?kind, button, %message, "error");
        self.diagnostics.push(kind, button, message);
    }

    fn warn(&mut self, button: Option<usize>, message: String) {
        trace!(target: "desk_controller::validator", button, %message, "warning");
        self.diagnostics.push(DiagnosticKind::Warning, button, message);
    }

    fn run(&mut self, document: &Value) {
        let Some(root) = document.as_object() else {
            self.error(
                DiagnosticKind::Structural,
                None,
                "Configuration must be a JSON object".into(),
            );
            return;
        };

        for section in ["layout", "buttons"] {
            if !root.contains_key(section) {
                self.error(
                    DiagnosticKind::Structural,
                    None,
                    format!("Missing required section '{section}' in configuration"),
                );
                return;
            }
        }

        let grid = self.check_layout(&root["layout"]);
        if let Some(display) = root.get("display") {
            self.check_display(display);
        }
        self.check_buttons(&root["buttons"], grid);
    }

    /// Returns `(rows, columns)` when both are valid.
    fn check_layout(&mut self, layout: &Value) -> Option<(i64, i64)> {
        let Some(layout) = layout.as_object() else {
            self.error(
                DiagnosticKind::Schema,
                None,
                "'layout' must be a JSON object".into(),
            );
            return None;
        };

        let rows = self.check_dimension(layout, "rows");
        let columns = self.check_dimension(layout, "columns");

        if layout
            .get("button_spacing")
            .is_some_and(|spacing| spacing.as_i64().is_none())
        {
            self.error(
                DiagnosticKind::Schema,
                None,
                "'button_spacing' must be an integer".into(),
            );
        }
        if layout.get("background_color").is_some_and(|bg| !is_color(bg)) {
            self.error(
                DiagnosticKind::Schema,
                None,
                "'background_color' must be a valid hex color (e.g., '#RRGGBB')".into(),
            );
        }
        for flag in ["fullscreen", "hide_cursor"] {
            self.check_bool(layout, flag, None, format!("'{flag}' must be a boolean"));
        }

        Some((rows?, columns?))
    }

    fn check_dimension(&mut self, layout: &Map<String, Value>, key: &str) -> Option<i64> {
        let Some(value) = layout.get(key) else {
            self.error(
                DiagnosticKind::Schema,
                None,
                format!("Missing '{key}' in layout configuration"),
            );
            return None;
        };
        match value.as_u64() {
            Some(n) if n >= 1 && n <= u64::from(u32::MAX) => Some(n as i64),
            _ => {
                self.error(
                    DiagnosticKind::Schema,
                    None,
                    format!("'{key}' must be a positive integer"),
                );
                None
            }
        }
    }

    fn check_display(&mut self, display: &Value) {
        let Some(display) = display.as_object() else {
            self.error(
                DiagnosticKind::Schema,
                None,
                "'display' must be a JSON object".into(),
            );
            return;
        };

        if let Some(mode) = display.get("mode") {
            let name = mode.as_str();
            if !name.is_some_and(|m| DisplayMode::ALLOWED.contains(&m)) {
                let shown = name.map_or_else(|| mode.to_string(), str::to_string);
                let mut message = format!(
                    "Invalid display mode '{shown}'. Must be one of: {}",
                    DisplayMode::ALLOWED.join(", ")
                );
                if name.is_some_and(|m| DisplayMode::LEGACY.contains(&m)) {
                    message.push_str(&format!(" ('{shown}' is a legacy mode)"));
                }
                self.error(DiagnosticKind::Semantic, None, message);
            }
        }
        for flag in ["kiosk_mode", "auto_start"] {
            self.check_bool(display, flag, None, format!("'{flag}' must be a boolean"));
        }
        if display
            .get("primary_display")
            .is_some_and(|primary| !primary.is_string())
        {
            self.error(
                DiagnosticKind::Schema,
                None,
                "'primary_display' must be a string".into(),
            );
        }
    }

    fn check_buttons(&mut self, buttons: &Value, grid: Option<(i64, i64)>) {
        let Some(buttons) = buttons.as_array() else {
            self.error(
                DiagnosticKind::Schema,
                None,
                "'buttons' must be a JSON array".into(),
            );
            return;
        };
        if buttons.is_empty() {
            self.warn(None, "No buttons defined in configuration".into());
            return;
        }

        if let Some((rows, columns)) = grid {
            let capacity = rows.unsigned_abs().saturating_mul(columns.unsigned_abs());
            if buttons.len() as u64 > capacity {
                self.warn(
                    None,
                    format!(
                        "Number of buttons ({}) exceeds grid capacity ({capacity})",
                        buttons.len()
                    ),
                );
            }
        }

        // First claimant of each cell, by 1-based index.
        let mut taken: HashMap<(i64, i64), usize> = HashMap::new();

        for (i, button) in buttons.iter().enumerate() {
            let idx = i + 1;
            let Some(button) = button.as_object() else {
                self.error(
                    DiagnosticKind::Schema,
                    Some(idx),
                    format!("Button {idx} must be a JSON object"),
                );
                continue;
            };

            self.check_button_name(idx, button);
            self.check_button_action(idx, button);
            if let Some(position) = button.get("position") {
                self.check_button_position(idx, position, grid, &mut taken);
            }
            self.check_button_icon(idx, button);
            for key in ["color", "text_color"] {
                if button.get(key).is_some_and(|value| !is_color(value)) {
                    self.error(
                        DiagnosticKind::Schema,
                        Some(idx),
                        format!("Button {idx} '{key}' must be a valid hex color (e.g., '#RRGGBB')"),
                    );
                }
            }
            self.check_bool(
                button,
                "confirm",
                Some(idx),
                format!("Button {idx} 'confirm' must be a boolean"),
            );
        }
    }

    fn check_button_name(&mut self, idx: usize, button: &Map<String, Value>) {
        if !button.contains_key("name") && !button.contains_key("label") {
            self.error(
                DiagnosticKind::Schema,
                Some(idx),
                format!("Button {idx} is missing 'name' or 'label'"),
            );
            return;
        }
        for key in ["name", "label"] {
            if button.get(key).is_some_and(|value| !value.is_string()) {
                self.error(
                    DiagnosticKind::Schema,
                    Some(idx),
                    format!("Button {idx} '{key}' must be a string"),
                );
            }
        }
    }

    fn check_button_action(&mut self, idx: usize, button: &Map<String, Value>) {
        for key in ["command", "script", "url"] {
            if button.get(key).is_some_and(|value| !value.is_string()) {
                self.error(
                    DiagnosticKind::Schema,
                    Some(idx),
                    format!("Button {idx} '{key}' must be a string"),
                );
            }
        }

        let action = match button.get("action") {
            None => {
                if !button.contains_key("command") {
                    self.error(
                        DiagnosticKind::Schema,
                        Some(idx),
                        format!("Button {idx} is missing 'command'"),
                    );
                }
                return;
            }
            Some(Value::String(name)) => match ButtonAction::parse(name) {
                Some(action) => action,
                None => {
                    self.error(
                        DiagnosticKind::Semantic,
                        Some(idx),
                        format!(
                            "Button {idx} has invalid action '{name}'. Must be one of: {}",
                            ButtonAction::ALLOWED.join(", ")
                        ),
                    );
                    return;
                }
            },
            Some(_) => {
                self.error(
                    DiagnosticKind::Schema,
                    Some(idx),
                    format!("Button {idx} 'action' must be a string"),
                );
                return;
            }
        };

        if let Some(field) = action.required_field() {
            if !button.contains_key(field) {
                self.error(
                    DiagnosticKind::Schema,
                    Some(idx),
                    format!("Button {idx} with '{field}' action is missing '{field}' field"),
                );
            }
        }
    }

    fn check_button_position(
        &mut self,
        idx: usize,
        position: &Value,
        grid: Option<(i64, i64)>,
        taken: &mut HashMap<(i64, i64), usize>,
    ) {
        let pair = match position.as_array().map(Vec::as_slice) {
            Some([row, col]) => (row.as_i64(), col.as_i64()),
            _ => {
                self.error(
                    DiagnosticKind::Schema,
                    Some(idx),
                    format!("Button {idx} 'position' must be an array [row, column]"),
                );
                return;
            }
        };
        let (Some(row), Some(col)) = pair else {
            self.error(
                DiagnosticKind::Schema,
                Some(idx),
                format!("Button {idx} position values must be integers"),
            );
            return;
        };

        let outside = grid.filter(|&(rows, columns)| {
            !(0..rows).contains(&row) || !(0..columns).contains(&col)
        });
        if let Some((rows, columns)) = outside {
            let message = format!(
                "Button {idx} position [{row}, {col}] is outside the grid ({rows}x{columns})"
            );
            if self.options.relaxed_bounds {
                self.warn(Some(idx), message);
            } else {
                self.error(DiagnosticKind::Semantic, Some(idx), message);
            }
            return;
        }

        if let Some(first) = taken.get(&(row, col)) {
            self.error(
                DiagnosticKind::Semantic,
                Some(idx),
                format!("Button {idx} has the same position [{row}, {col}] as button {first}"),
            );
        } else {
            taken.insert((row, col), idx);
        }
    }

    fn check_button_icon(&mut self, idx: usize, button: &Map<String, Value>) {
        let Some(icon) = button.get("icon") else {
            return;
        };
        let Some(icon) = icon.as_str() else {
            self.error(
                DiagnosticKind::Schema,
                Some(idx),
                format!("Button {idx} 'icon' must be a string"),
            );
            return;
        };
        if icon.is_empty() || paths::existing_icon(icon, self.base_dir).is_some() {
            return;
        }
        let who = button
            .get("name")
            .or_else(|| button.get("label"))
            .and_then(Value::as_str)
            .map_or_else(|| idx.to_string(), str::to_string);
        self.warn(
            Some(idx),
            format!("Icon file '{icon}' for button '{who}' not found"),
        );
    }

    fn check_bool(
        &mut self,
        object: &Map<String, Value>,
        key: &str,
        button: Option<usize>,
        message: String,
    ) {
        if object.get(key).is_some_and(|value| !value.is_boolean()) {
            self.error(DiagnosticKind::Schema, button, message);
        }
    }
}

fn is_color(value: &Value) -> bool {
    value.as_str().is_some_and(color::is_valid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Diagnostic;
    use serde_json::json;

    fn validate(doc: Value) -> Diagnostics {
        SchemaValidator::default().validate_document(&doc, Path::new("/nonexistent"))
    }

    fn messages(list: &[Diagnostic]) -> Vec<&str> {
        list.iter().map(|d| d.message.as_str()).collect()
    }

    fn panel(buttons: Value) -> Value {
        json!({ "layout": { "rows": 2, "columns": 3 }, "buttons": buttons })
    }

    #[test]
    fn missing_sections_are_fatal_and_stop_the_pass() {
        let d = validate(json!({ "buttons": [ { "position": "bad" } ] }));
        assert_eq!(
            messages(d.errors()),
            ["Missing required section 'layout' in configuration"]
        );
        assert_eq!(d.errors()[0].kind, DiagnosticKind::Structural);
        assert!(d.warnings().is_empty());

        let d = validate(json!({ "layout": { "rows": 0 } }));
        assert_eq!(
            messages(d.errors()),
            ["Missing required section 'buttons' in configuration"]
        );
    }

    #[test]
    fn top_level_must_be_an_object() {
        let d = validate(json!([1, 2]));
        assert_eq!(messages(d.errors()), ["Configuration must be a JSON object"]);
    }

    #[test]
    fn invalid_json_is_a_single_structural_error() {
        let v = SchemaValidator::default().validate_str("{ not json", Path::new("."));
        assert!(!v.is_ok());
        assert!(v.document.is_none());
        assert_eq!(v.diagnostics.errors().len(), 1);
        assert!(
            v.diagnostics.errors()[0]
                .message
                .starts_with("Invalid JSON in configuration file:")
        );
    }

    #[test]
    fn missing_file_is_reported_by_path() {
        let v = SchemaValidator::default().validate_file(Path::new("/definitely/not/here.json"));
        assert_eq!(
            messages(v.diagnostics.errors()),
            ["Configuration file '/definitely/not/here.json' not found"]
        );
    }

    #[test]
    fn layout_errors_accumulate() {
        let d = validate(json!({
            "layout": {
                "rows": 0,
                "button_spacing": "wide",
                "background_color": "navy",
                "fullscreen": "yes",
                "hide_cursor": 1
            },
            "buttons": [ { "name": "A", "command": "true" } ]
        }));
        assert_eq!(
            messages(d.errors()),
            [
                "'rows' must be a positive integer",
                "Missing 'columns' in layout configuration",
                "'button_spacing' must be an integer",
                "'background_color' must be a valid hex color (e.g., '#RRGGBB')",
                "'fullscreen' must be a boolean",
                "'hide_cursor' must be a boolean",
            ]
        );
    }

    #[test]
    fn fractional_dimensions_are_rejected() {
        let d = validate(json!({ "layout": { "rows": 2.5, "columns": -1 }, "buttons": [] }));
        assert_eq!(
            messages(d.errors()),
            [
                "'rows' must be a positive integer",
                "'columns' must be a positive integer"
            ]
        );
    }

    #[test]
    fn display_mode_must_be_canonical() {
        let mut doc = panel(json!([]));
        doc["display"] = json!({ "mode": "extend", "kiosk_mode": "no", "primary_display": 1 });
        let d = validate(doc);
        assert_eq!(
            messages(d.errors()),
            [
                "Invalid display mode 'extend'. Must be one of: single, multi ('extend' is a legacy mode)",
                "'kiosk_mode' must be a boolean",
                "'primary_display' must be a string",
            ]
        );

        let mut doc = panel(json!([]));
        doc["display"] = json!({ "mode": "multi", "primary_display": "DSI-1", "auto_start": true });
        assert!(validate(doc).is_ok());
    }

    #[test]
    fn empty_button_list_is_only_a_warning() {
        let d = validate(panel(json!([])));
        assert!(d.is_ok());
        assert_eq!(messages(d.warnings()), ["No buttons defined in configuration"]);
    }

    #[test]
    fn buttons_must_be_an_array() {
        let d = validate(panel(json!({ "name": "A" })));
        assert_eq!(messages(d.errors()), ["'buttons' must be a JSON array"]);
    }

    #[test]
    fn capacity_overflow_warns_once() {
        let buttons: Vec<Value> = (0..9)
            .map(|i| json!({ "name": format!("B{i}"), "command": "true" }))
            .collect();
        let d = validate(panel(Value::Array(buttons)));
        assert!(d.is_ok());
        assert_eq!(
            messages(d.warnings()),
            ["Number of buttons (9) exceeds grid capacity (6)"]
        );
    }

    #[test]
    fn huge_grids_do_not_overflow_capacity() {
        let d = validate(json!({
            "layout": { "rows": 4294967295u64, "columns": 4294967295u64 },
            "buttons": [ { "name": "A", "command": "true" } ]
        }));
        assert!(d.is_empty(), "{}", d.report());
    }

    #[test]
    fn required_button_fields() {
        let d = validate(panel(json!([
            { "command": "true" },
            { "name": "No dispatch" },
            { "label": "Web", "action": "url" },
            { "name": "Launch", "action": "launch" },
            { "name": 5, "action": "reboot" },
            "not an object"
        ])));
        assert_eq!(
            messages(d.errors()),
            [
                "Button 1 is missing 'name' or 'label'",
                "Button 2 is missing 'command'",
                "Button 3 with 'url' action is missing 'url' field",
                "Button 4 has invalid action 'launch'. Must be one of: command, script, url, shutdown, reboot",
                "Button 5 'name' must be a string",
                "Button 6 must be a JSON object",
            ]
        );
        let indices: Vec<_> = d.errors().iter().map(|e| e.button).collect();
        assert_eq!(indices, [Some(1), Some(2), Some(3), Some(4), Some(5), Some(6)]);
    }

    #[test]
    fn in_grid_positions_are_accepted() {
        let mut buttons = Vec::new();
        for row in 0..2 {
            for col in 0..3 {
                buttons.push(json!({ "name": "B", "command": "true", "position": [row, col] }));
            }
        }
        assert!(validate(panel(Value::Array(buttons))).is_empty());
    }

    #[test]
    fn out_of_grid_position_names_index_and_bounds() {
        let d = validate(panel(json!([
            { "name": "A", "command": "true", "position": [0, 0] },
            { "name": "B", "command": "true", "position": [2, 0] },
            { "name": "C", "command": "true", "position": [0, -1] }
        ])));
        assert_eq!(
            messages(d.errors()),
            [
                "Button 2 position [2, 0] is outside the grid (2x3)",
                "Button 3 position [0, -1] is outside the grid (2x3)",
            ]
        );
    }

    #[test]
    fn relaxed_bounds_downgrade_to_warning() {
        let validator = SchemaValidator::new(ValidatorOptions {
            relaxed_bounds: true,
        });
        let d = validator.validate_document(
            &panel(json!([{ "name": "A", "command": "true", "position": [5, 5] }])),
            Path::new("."),
        );
        assert!(d.is_ok());
        assert_eq!(
            messages(d.warnings()),
            ["Button 1 position [5, 5] is outside the grid (2x3)"]
        );
    }

    #[test]
    fn duplicates_flag_every_later_claimant_only() {
        let d = validate(panel(json!([
            { "name": "A", "command": "true", "position": [1, 1] },
            { "name": "B", "command": "true", "position": [1, 1] },
            { "name": "C", "command": "true", "position": [0, 0] },
            { "name": "D", "command": "true", "position": [1, 1] }
        ])));
        assert_eq!(
            messages(d.errors()),
            [
                "Button 2 has the same position [1, 1] as button 1",
                "Button 4 has the same position [1, 1] as button 1",
            ]
        );
    }

    #[test]
    fn malformed_positions() {
        let d = validate(panel(json!([
            { "name": "A", "command": "true", "position": [1] },
            { "name": "B", "command": "true", "position": "0,0" },
            { "name": "C", "command": "true", "position": [0.5, 1] }
        ])));
        assert_eq!(
            messages(d.errors()),
            [
                "Button 1 'position' must be an array [row, column]",
                "Button 2 'position' must be an array [row, column]",
                "Button 3 position values must be integers",
            ]
        );
    }

    #[test]
    fn colors_and_flags_are_type_checked() {
        let d = validate(panel(json!([
            { "name": "A", "command": "true", "color": "#5E81AC", "text_color": "#fff" },
            { "name": "B", "command": "true", "color": 3, "confirm": "yes" }
        ])));
        assert_eq!(
            messages(d.errors()),
            [
                "Button 1 'text_color' must be a valid hex color (e.g., '#RRGGBB')",
                "Button 2 'color' must be a valid hex color (e.g., '#RRGGBB')",
                "Button 2 'confirm' must be a boolean",
            ]
        );
    }

    #[test]
    fn missing_icon_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("here.png"), b"png").unwrap();

        let d = SchemaValidator::default().validate_document(
            &panel(json!([
                { "name": "A", "command": "true", "icon": "here.png" },
                { "name": "B", "command": "true", "icon": "gone.png" },
                { "name": "C", "command": "true", "icon": "" },
                { "name": "D", "command": "true", "icon": 4 }
            ])),
            dir.path(),
        );
        assert_eq!(messages(d.errors()), ["Button 4 'icon' must be a string"]);
        assert_eq!(
            messages(d.warnings()),
            ["Icon file 'gone.png' for button 'B' not found"]
        );
    }

    #[test]
    fn each_pass_starts_fresh() {
        let validator = SchemaValidator::default();
        let bad = panel(json!([{ "name": "A" }]));
        let good = panel(json!([{ "name": "A", "command": "true" }]));
        assert!(!validator.validate_document(&bad, Path::new(".")).is_ok());
        assert!(validator.validate_document(&good, Path::new(".")).is_empty());
    }
}
