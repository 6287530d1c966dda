//! Default path resolution for the config file
//!
//! Follows the XDG Base Directory layout: `$XDG_CONFIG_HOME/regru/config.json`,
//! falling back to `$HOME/.config/regru/config.json`.

use super::settings::SettingsProvider;
use std::path::PathBuf;

/// Directory name under the config base.
pub const APP_DIR: &str = "regru";

/// File name of the persisted config.
pub const CONFIG_FILE: &str = "config.json";

/// Returns the config file path for the given environment.
pub fn config_path(settings: &dyn SettingsProvider) -> PathBuf {
    config_base(settings).join(APP_DIR).join(CONFIG_FILE)
}

fn config_base(settings: &dyn SettingsProvider) -> PathBuf {
    if let Some(xdg) = settings.var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg);
    }

    settings
        .home_dir()
        .unwrap_or_else(|| PathBuf::from("~"))
        .join(".config")
}
