use crate::app::command_support::{ensure_runtime_root, map_config_err};
use crate::config::write_settings_template;

pub fn cmd_setup() -> Result<String, String> {
    let paths = ensure_runtime_root()?;
    let config = paths.settings_file();
    let created = write_settings_template(&config).map_err(map_config_err)?;
    Ok(format!(
        "state_root={}\nconfig={}\ncreated={created}",
        paths.root.display(),
        config.display()
    ))
}
