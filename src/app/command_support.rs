use crate::chat::{Relay, Sender};
use crate::config::{default_state_root_path, load_settings_from, ConfigError, Settings};
use crate::runtime::{bootstrap_state_root, StatePaths};

pub fn map_config_err(err: ConfigError) -> String {
    err.to_string()
}

pub fn ensure_runtime_root() -> Result<StatePaths, String> {
    let root = default_state_root_path().map_err(map_config_err)?;
    let paths = StatePaths::new(root);
    bootstrap_state_root(&paths).map_err(|e| e.to_string())?;
    Ok(paths)
}

pub fn load_settings(paths: &StatePaths) -> Result<Settings, String> {
    load_settings_from(&paths.settings_file()).map_err(|err| {
        format!(
            "{}\nrun `autoglm-relay setup` and fill in {}",
            map_config_err(err),
            paths.settings_file().display()
        )
    })
}

pub fn load_relay() -> Result<Relay, String> {
    let paths = ensure_runtime_root()?;
    let settings = load_settings(&paths)?;
    Ok(Relay::new(settings, paths))
}

/// Local operator identity. Defaults to the configured master so the owner
/// can run commands without repeating their id.
pub fn resolve_sender(settings: &Settings, sender_id: Option<&str>) -> Sender {
    let id = sender_id
        .map(str::to_string)
        .unwrap_or_else(|| settings.master.trim().to_string());
    let name = settings
        .chat
        .sender_name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| id.clone());
    Sender::new(id, name)
}
