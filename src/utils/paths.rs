use std::path::{Path, PathBuf};

use tracing::debug;

/// Resolve an icon path against the configuration's base directory.
///
/// Absolute paths are returned unchanged; relative ones are joined onto `base_dir`
/// (never onto the scripts directory).
pub fn resolve_icon_path(icon: &str, base_dir: &Path) -> PathBuf {
    let path = Path::new(icon);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Resolve an icon and keep it only if the file exists.
///
/// The configuration directory is tried first, then the path as written (relative to the
/// working directory). A missing icon is never fatal: the button renders without one.
pub fn existing_icon(icon: &str, base_dir: &Path) -> Option<PathBuf> {
    if icon.is_empty() {
        return None;
    }
    let resolved = resolve_icon_path(icon, base_dir);
    if resolved.exists() {
        return Some(resolved);
    }
    let as_written = Path::new(icon);
    if as_written.exists() {
        return Some(as_written.to_path_buf());
    }
    debug!(
        target: "desk_controller::paths",
        icon, resolved = %resolved.display(),
        "icon not found; button will render without it"
    );
    None
}

/// Directory containing the configuration file, used as the base for relative lookups.
pub fn config_base_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
