//! Config directory discovery.

use std::path::PathBuf;

/// Application name for XDG directory resolution.
const APP_NAME: &str = "hse";

/// Environment variable that overrides the config directory.
///
/// Takes precedence over the platform default. Useful for tests and for
/// keeping several server setups apart.
pub const CONFIG_DIR_ENV: &str = "HSE_CONFIG_DIR";

/// Get the config directory for hse.
///
/// Checks `HSE_CONFIG_DIR` first, then falls back to the platform default
/// (`~/.config/hse` on Linux, `~/Library/Application Support/hse` on macOS).
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}
