use crate::config::ConfigError;
use std::path::PathBuf;

pub const STATE_ROOT_DIR: &str = ".autoglm-relay";
pub const STATE_ROOT_ENV: &str = "AUTOGLM_RELAY_HOME";
pub const SETTINGS_FILE_NAME: &str = "config.yaml";

/// `$AUTOGLM_RELAY_HOME` when set, otherwise `~/.autoglm-relay`.
pub fn default_state_root_path() -> Result<PathBuf, ConfigError> {
    if let Some(explicit) = std::env::var_os(STATE_ROOT_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(explicit));
    }
    let home = std::env::var_os("HOME").ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(PathBuf::from(home).join(STATE_ROOT_DIR))
}
