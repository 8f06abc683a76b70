use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::Parser;
use tracing::{debug, error, info, warn};

use desk_controller::config::{self as cfg, ConfigLocator, ValidatorOptions};
use desk_controller::display::StaticDisplays;
use desk_controller::error::PipelineError;
use desk_controller::executor::Launcher;
use desk_controller::pipeline::ConfigPipeline;

/// desk-controller CLI
#[derive(Debug, Parser)]
#[command(
    name = desk_controller::PKG_NAME,
    version = desk_controller::PKG_VERSION,
    about = "Validate a touchscreen control panel configuration and resolve its layout"
)]
struct Args {
    /// Path to the JSON configuration file (default: installed location, then ./config.json)
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Only validate the configuration and print the report
    #[arg(long = "check")]
    check: bool,

    /// Print the resolved render plan as JSON
    #[arg(long = "plan")]
    plan: bool,

    /// Target display width in pixels (overrides display lookup)
    #[arg(long = "width", requires = "height")]
    width: Option<u32>,

    /// Target display height in pixels (overrides display lookup)
    #[arg(long = "height", requires = "width")]
    height: Option<u32>,

    /// Known output geometry, e.g. DSI-1=800x480+0+0 (repeatable)
    #[arg(long = "display", value_name = "NAME=WxH+X+Y")]
    displays: Vec<String>,

    /// Screen width used when the configured display is unknown
    #[arg(long = "default-width", default_value_t = 800)]
    default_width: u32,

    /// Screen height used when the configured display is unknown
    #[arg(long = "default-height", default_value_t = 480)]
    default_height: u32,

    /// Resolve geometry for finger input (larger padding, fonts and spacing)
    #[arg(long = "touch")]
    touch: bool,

    /// Dispatch button N (1-based, as numbered in diagnostics)
    #[arg(long = "press", value_name = "N")]
    press: Option<usize>,

    /// Log the dispatch instead of launching anything
    #[arg(long = "dry-run")]
    dry_run: bool,

    /// Report out-of-grid button positions as warnings instead of errors
    #[arg(long = "relaxed-bounds")]
    relaxed_bounds: bool,

    /// Set log level (e.g., trace, debug, info, warn, error). Overrides RUST_LOG.
    #[arg(long = "log-level")]
    log_level: Option<String>,

    /// Print the JSON Schema for the configuration and exit
    #[arg(long = "print-schema")]
    print_schema: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let level = args.log_level.as_deref().and_then(desk_controller::parse_level);
    desk_controller::init_tracing(level);
    if level.is_none() && args.log_level.is_some() {
        warn!("Unknown --log-level value, using defaults");
    }

    if args.print_schema {
        cfg::write_schema_to_writer(io::stdout().lock())?;
        println!();
        return Ok(ExitCode::SUCCESS);
    }

    let pipeline = ConfigPipeline::with_options(
        ConfigLocator::standard(),
        ValidatorOptions {
            relaxed_bounds: args.relaxed_bounds,
        },
    );
    let path = pipeline
        .config_path(args.config.as_deref())
        .context("No configuration path to load")?;
    info!(
        version = desk_controller::PKG_VERSION,
        config = %path.display(),
        "Starting desk-controller"
    );

    let loaded = match pipeline.load(&path) {
        Ok(loaded) => loaded,
        Err(PipelineError::Invalid(diagnostics)) => {
            diagnostics.write_report(io::stdout().lock())?;
            return Ok(ExitCode::FAILURE);
        }
        Err(err) => return Err(err).context("Failed to load configuration"),
    };
    loaded.diagnostics().write_report(io::stdout().lock())?;
    if args.check {
        return Ok(ExitCode::SUCCESS);
    }

    let plan = match (args.width, args.height) {
        (Some(width), Some(height)) => {
            pipeline.resolve_render_plan(&loaded, width, height, args.touch)
        }
        _ => {
            let mut displays =
                StaticDisplays::new().with_default_size(args.default_width, args.default_height);
            for spec in &args.displays {
                displays.insert_spec(spec)?;
            }
            pipeline.resolve_for_display(&loaded, &displays, args.touch)
        }
    };
    debug!(
        cell_width = plan.grid.cell_width,
        cell_height = plan.grid.cell_height,
        font_size = plan.grid.font_size,
        buttons = plan.buttons.len(),
        "Render plan resolved"
    );

    if args.plan {
        let json = serde_json::to_string_pretty(&plan)?;
        println!("{json}");
    }

    if let Some(index) = args.press {
        let Some(button) = plan.button(index) else {
            bail!(
                "No button {index}; the configuration defines {}",
                plan.buttons.len()
            );
        };
        if plan.pressable(index).is_none() {
            error!(button = index, label = %button.label, "Button has no grid cell and is not shown on the panel");
            eprintln!("Error: button {index} ('{}') is not shown on the panel", button.label);
            return Ok(ExitCode::FAILURE);
        }
        if button.needs_confirmation {
            info!(button = index, label = %button.label, "Button asks for confirmation; --press counts as confirmed");
        }
        let launcher = Launcher::new(args.dry_run);
        match launcher.launch(&button.dispatch) {
            // The CLI exits right after spawning; the child is reparented, not left a zombie.
            Ok(launched) => debug!(button = index, pid = ?launched.pid(), "Button dispatched"),
            Err(err) => {
                error!(button = index, label = %button.label, error = %err, "Failed to dispatch button");
                eprintln!("Error: {err}");
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
