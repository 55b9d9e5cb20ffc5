// src/config/loader.rs

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::model::Settings;
use crate::errors::Result;

/// Settings file looked up in the working directory when `--config` is not given.
pub const DEFAULT_SETTINGS_FILE: &str = "tm2bd.toml";

/// Load settings.
///
/// - With an explicit `path`, the file must exist and parse.
/// - Without one, `tm2bd.toml` is read if present; otherwise defaults apply.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let (path, required) = match path {
        Some(p) => (p, true),
        None => (Path::new(DEFAULT_SETTINGS_FILE), false),
    };

    if !required && !path.is_file() {
        debug!(path = ?path, "no settings file; using defaults");
        return Ok(Settings::default());
    }

    let contents = fs::read_to_string(path)?;
    let settings: Settings = toml::from_str(&contents)?;
    debug!(path = ?path, "loaded settings");
    Ok(settings)
}
