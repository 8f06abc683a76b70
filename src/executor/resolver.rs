use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, trace};

use crate::error::DispatchError;

/// Prefix marking a command as a path inside the scripts directory.
pub const SCRIPT_MARKER: &str = "@/";
/// Name of the scripts directory, sibling to the configuration file.
pub const SCRIPTS_DIR: &str = "scripts";

/// A command ready to hand to the launcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ResolvedCommand {
    /// A literal command line, run through the shell.
    Shell(String),
    /// A script inside (or addressed relative to) the scripts directory.
    Script(PathBuf),
}

impl ResolvedCommand {
    /// The string the shell is asked to run.
    pub fn command_line(&self) -> String {
        match self {
            ResolvedCommand::Shell(line) => line.clone(),
            ResolvedCommand::Script(path) => path.display().to_string(),
        }
    }
}

/// Maps raw command strings onto invocable commands for one configuration directory.
#[derive(Debug, Clone)]
pub struct CommandResolver {
    base_dir: PathBuf,
}

impl CommandResolver {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.base_dir.join(SCRIPTS_DIR)
    }

    /// Resolve without touching the filesystem. Used to describe commands in a render plan.
    pub fn preview(&self, raw: &str) -> ResolvedCommand {
        match raw.strip_prefix(SCRIPT_MARKER) {
            Some(rest) => ResolvedCommand::Script(self.scripts_dir().join(rest)),
            None => ResolvedCommand::Shell(raw.to_string()),
        }
    }

    /// Resolve a button command at dispatch time.
    ///
    /// `@/name` must exist under `scripts/`; a script lacking execute permission gets
    /// `u+x,g+x,o+x` added before it is returned. Anything else is passed through unchanged.
    pub fn resolve(&self, raw: &str) -> Result<ResolvedCommand, DispatchError> {
        match self.preview(raw) {
            ResolvedCommand::Script(path) => {
                prepare_script(&path)?;
                Ok(ResolvedCommand::Script(path))
            }
            shell => {
                trace!(target: "desk_controller::resolver", command = raw, "shell command passthrough");
                Ok(shell)
            }
        }
    }

    /// Resolve the target of a `script` action. The marker is optional here; relative
    /// paths always live under `scripts/`, absolute ones are taken as written.
    pub fn resolve_script(&self, script: &str) -> Result<PathBuf, DispatchError> {
        let path = self.script_path(script);
        prepare_script(&path)?;
        Ok(path)
    }

    /// Where a `script` action target lives, without checking it exists.
    pub fn script_path(&self, script: &str) -> PathBuf {
        let rest = script.strip_prefix(SCRIPT_MARKER).unwrap_or(script);
        let candidate = Path::new(rest);
        if candidate.is_absolute() && !script.starts_with(SCRIPT_MARKER) {
            candidate.to_path_buf()
        } else {
            self.scripts_dir().join(rest)
        }
    }
}

/// Free-function form of [`CommandResolver::resolve`].
pub fn resolve(raw: &str, base_dir: &Path) -> Result<ResolvedCommand, DispatchError> {
    CommandResolver::new(base_dir).resolve(raw)
}

/// Require `path` to exist and make it executable. Called right before a script runs.
pub fn prepare_script(path: &Path) -> Result<(), DispatchError> {
    if !path.exists() {
        debug!(target: "desk_controller::resolver", path = %path.display(), "script not found");
        return Err(DispatchError::ScriptNotFound(path.to_path_buf()));
    }
    ensure_executable(path)
}

#[cfg(unix)]
fn ensure_executable(path: &Path) -> Result<(), DispatchError> {
    use std::os::unix::fs::PermissionsExt;

    let permissions_error = |source| DispatchError::Permissions {
        path: path.to_path_buf(),
        source,
    };
    let mut perms = fs::metadata(path).map_err(permissions_error)?.permissions();
    let mode = perms.mode();
    if mode & 0o111 == 0o111 {
        return Ok(());
    }
    perms.set_mode(mode | 0o111);
    fs::set_permissions(path, perms).map_err(permissions_error)?;
    info!(
        target: "desk_controller::resolver",
        path = %path.display(),
        old_mode = %format!("{:o}", mode & 0o7777),
        "added execute permission to script"
    );
    Ok(())
}

#[cfg(not(unix))]
fn ensure_executable(path: &Path) -> Result<(), DispatchError> {
    // No execute bit to repair on this platform.
    fs::metadata(path)
        .map(|_| ())
        .map_err(|source| DispatchError::Permissions {
            path: path.to_path_buf(),
            source,
        })
}
