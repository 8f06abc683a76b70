use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use serde::Serialize;
use tracing::{info, trace};

use crate::config::{ButtonAction, ButtonSpec};
use crate::error::DispatchError;
use crate::executor::resolver::{self, CommandResolver, ResolvedCommand};

/// What a button does when pressed, with paths already resolved for display.
///
/// Filesystem checks and the execute-bit repair still happen at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Dispatch {
    Command { command: ResolvedCommand },
    Script { path: PathBuf },
    Url { url: String },
    Shutdown,
    Reboot,
}

impl Dispatch {
    /// Describe a validated button's action without touching the filesystem.
    pub fn plan(button: &ButtonSpec, resolver: &CommandResolver) -> Self {
        let target = button.target().unwrap_or_default();
        match button.action {
            ButtonAction::Command => Dispatch::Command {
                command: resolver.preview(target),
            },
            ButtonAction::Script => Dispatch::Script {
                path: resolver.script_path(target),
            },
            ButtonAction::Url => Dispatch::Url {
                url: target.to_string(),
            },
            ButtonAction::Shutdown => Dispatch::Shutdown,
            ButtonAction::Reboot => Dispatch::Reboot,
        }
    }
}

/// A concrete process invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| (*a).to_string()).collect(),
        }
    }

    fn shell(line: &str) -> Self {
        Self::new("sh", &["-c", line])
    }

    /// Run a script through the shell, which also interprets files without a `#!` line.
    fn script(path: &Path) -> Self {
        Self::shell(&shell_quote(&path.display().to_string()))
    }
}

/// Single-quote `s` for `sh`.
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Result of a launch: the invocation, plus the child process when one was spawned.
///
/// The child is not waited on here. Long-running callers must `wait`/`try_wait` it (or
/// hand it to a reaper) so finished processes do not linger as zombies.
#[derive(Debug)]
pub struct Launched {
    pub invocation: Invocation,
    /// `None` in dry-run mode.
    pub child: Option<Child>,
}

impl Launched {
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }
}

/// Turns planned dispatches into running processes.
///
/// Failures are returned, never panicked on, so the panel stays interactive after a bad
/// press. In dry-run mode the invocation is only logged.
#[derive(Debug, Clone)]
pub struct Launcher {
    dry_run: bool,
}

impl Launcher {
    /// Create a new launcher.
    /// - dry_run: when true, only logs instead of spawning processes.
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Returns whether the launcher is currently in dry-run mode.
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Enable or disable dry-run mode dynamically.
    pub fn set_dry_run(&mut self, dry_run: bool) {
        self.dry_run = dry_run;
    }

    /// Build the invocation for `dispatch`, performing the dispatch-time script checks.
    ///
    /// Scripts must exist and are made executable here, right before they would run.
    pub fn prepare(&self, dispatch: &Dispatch) -> Result<Invocation, DispatchError> {
        let invocation = match dispatch {
            Dispatch::Command {
                command: ResolvedCommand::Shell(line),
            } => {
                if line.trim().is_empty() {
                    return Err(DispatchError::MissingTarget("command"));
                }
                Invocation::shell(line)
            }
            Dispatch::Command {
                command: ResolvedCommand::Script(path),
            }
            | Dispatch::Script { path } => {
                if !self.dry_run {
                    resolver::prepare_script(path)?;
                }
                Invocation::script(path)
            }
            Dispatch::Url { url } => {
                if url.trim().is_empty() {
                    return Err(DispatchError::MissingTarget("url"));
                }
                Invocation::new("xdg-open", &[url.as_str()])
            }
            Dispatch::Shutdown => Invocation::new("sudo", &["shutdown", "-h", "now"]),
            Dispatch::Reboot => Invocation::new("sudo", &["reboot"]),
        };
        trace!(target: "desk_controller::launcher", ?invocation, "prepared invocation");
        Ok(invocation)
    }

    /// Launch `dispatch` without waiting for it to finish.
    pub fn launch(&self, dispatch: &Dispatch) -> Result<Launched, DispatchError> {
        let invocation = self.prepare(dispatch)?;
        if self.dry_run {
            info!(
                target: "desk_controller::launcher",
                program = %invocation.program, args = ?invocation.args,
                "DRY-RUN launch"
            );
            return Ok(Launched {
                invocation,
                child: None,
            });
        }

        let child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|source| DispatchError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;
        info!(
            target: "desk_controller::launcher",
            program = %invocation.program, pid = child.id(),
            "launched"
        );
        Ok(Launched {
            invocation,
            child: Some(child),
        })
    }
}
