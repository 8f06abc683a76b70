//! Validate-then-resolve entry point for the rendering layer.
//!
//! ```no_run
//! use desk_controller::config::ConfigLocator;
//! use desk_controller::pipeline::ConfigPipeline;
//!
//! let pipeline = ConfigPipeline::new(ConfigLocator::standard());
//! let path = pipeline.config_path(None).expect("no candidate paths");
//! match pipeline.load(&path) {
//!     Ok(loaded) => {
//!         let plan = pipeline.resolve_render_plan(&loaded, 800, 480, true);
//!         println!("{} buttons", plan.buttons.len());
//!     }
//!     Err(err) => eprintln!("{err}"),
//! }
//! ```

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{
    self, Config, ConfigLocator, Diagnostics, SchemaValidator, Validation, ValidatorOptions,
};
use crate::display::{self, DisplayProvider, ScreenTarget};
use crate::error::PipelineError;
use crate::layout::plan::{self, RenderPlan};
use crate::utils::paths;

/// A configuration that passed validation, decoded into typed models.
///
/// Only [`ConfigPipeline`] constructs this, so holding one proves validation succeeded.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    config: Config,
    base_dir: PathBuf,
    diagnostics: Diagnostics,
}

impl LoadedConfig {
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Directory that relative icon and script paths resolve against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Diagnostics of the pass that accepted this configuration (warnings only).
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}

/// Orchestrates validation, then command and geometry resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigPipeline {
    locator: ConfigLocator,
    validator: SchemaValidator,
}

impl ConfigPipeline {
    pub fn new(locator: ConfigLocator) -> Self {
        Self::with_options(locator, ValidatorOptions::default())
    }

    pub fn with_options(locator: ConfigLocator, options: ValidatorOptions) -> Self {
        Self {
            locator,
            validator: SchemaValidator::new(options),
        }
    }

    pub fn locator(&self) -> &ConfigLocator {
        &self.locator
    }

    /// The explicit path when given, otherwise the locator's pick.
    pub fn config_path(&self, explicit: Option<&Path>) -> Option<PathBuf> {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| self.locator.locate())
    }

    /// Validate the file at `path`. Never fails; problems are in the diagnostics.
    pub fn load_and_validate(&self, path: &Path) -> (bool, Diagnostics) {
        let validation = self.validator.validate_file(path);
        (validation.is_ok(), validation.diagnostics)
    }

    /// Validate and decode the file at `path`.
    pub fn load(&self, path: &Path) -> Result<LoadedConfig, PipelineError> {
        info!(target: "desk_controller::pipeline", path = %path.display(), "loading configuration");
        let validation = self.validator.validate_file(path);
        accept(validation, paths::config_base_dir(path))
    }

    /// Validate and decode an in-memory document whose relative paths resolve against `base_dir`.
    pub fn load_document(
        &self,
        document: Value,
        base_dir: &Path,
    ) -> Result<LoadedConfig, PipelineError> {
        let diagnostics = self.validator.validate_document(&document, base_dir);
        let validation = Validation {
            document: Some(document),
            diagnostics,
        };
        accept(validation, base_dir.to_path_buf())
    }

    /// Resolve the render plan for an explicit display size.
    pub fn resolve_render_plan(
        &self,
        loaded: &LoadedConfig,
        display_width: u32,
        display_height: u32,
        touch_mode: bool,
    ) -> RenderPlan {
        let screen = ScreenTarget {
            width: display_width,
            height: display_height,
            output: None,
        };
        plan::build(&loaded.config, &loaded.base_dir, &screen, touch_mode)
    }

    /// Resolve the render plan for the configured `display.primary_display`, falling back
    /// to the provider's default screen size when that output is unknown.
    pub fn resolve_for_display(
        &self,
        loaded: &LoadedConfig,
        provider: &dyn DisplayProvider,
        touch_mode: bool,
    ) -> RenderPlan {
        let target = loaded.config.display.primary_display.as_deref();
        let screen = display::screen_for(provider, target);
        debug!(
            target: "desk_controller::pipeline",
            width = screen.width, height = screen.height,
            matched = screen.output.is_some(),
            "resolved target screen"
        );
        plan::build(&loaded.config, &loaded.base_dir, &screen, touch_mode)
    }
}

fn accept(validation: Validation, base_dir: PathBuf) -> Result<LoadedConfig, PipelineError> {
    let Validation {
        document,
        diagnostics,
    } = validation;
    let document = match document {
        Some(document) if diagnostics.is_ok() => document,
        _ => {
            warn!(
                target: "desk_controller::pipeline",
                errors = diagnostics.errors().len(),
                "configuration rejected"
            );
            return Err(PipelineError::Invalid(diagnostics));
        }
    };
    for warning in diagnostics.warnings() {
        warn!(target: "desk_controller::pipeline", "{warning}");
    }
    let config = config::decode(document)?;
    Ok(LoadedConfig {
        config,
        base_dir,
        diagnostics,
    })
}
