use super::ConfigError;
use std::fs;
use std::path::Path;

/// Starting point written by `setup`. It does not validate until the four
/// required values are filled in.
pub const SETTINGS_TEMPLATE: &str = r#"# Sender id allowed to use the control command.
master: ""
# Model API base url, e.g. https://open.bigmodel.cn/api/paas/v4
base_url: ""
# Model name, e.g. autoglm-phone
model: ""
api_key: ""

automation:
  # python: python3
  script: main.py
  # working_dir: /path/to/AutoGLM
  timeout_secs: 300
  # max_steps: 100
  # device_id: emulator-5554
  # lang: cn
  env: {}

device:
  adb_binary: adb
  # apk_path: /path/to/ADBKeyboard.apk
  timeout_secs: 60

chat: {}
"#;

fn create_parent_dir(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
            path: parent.display().to_string(),
            source,
        })?;
    }
    Ok(())
}

/// Returns `false` when a config already exists; it is never overwritten.
pub fn write_settings_template(path: &Path) -> Result<bool, ConfigError> {
    if path.exists() {
        return Ok(false);
    }
    create_parent_dir(path)?;
    fs::write(path, SETTINGS_TEMPLATE).map_err(|source| ConfigError::Write {
        path: path.display().to_string(),
        source,
    })?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use tempfile::tempdir;

    #[test]
    fn template_parses_but_requires_values() {
        let settings: Settings = serde_yaml::from_str(SETTINGS_TEMPLATE).expect("template parses");
        let err = settings.validate().expect_err("empty master");
        assert!(err.to_string().contains("`master` must be non-empty"));
    }

    #[test]
    fn template_is_written_once() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("state/config.yaml");
        assert!(write_settings_template(&path).expect("first write"));
        fs::write(&path, "master: keep\n").expect("overwrite");
        assert!(!write_settings_template(&path).expect("second write"));
        assert_eq!(fs::read_to_string(&path).expect("read"), "master: keep\n");
    }
}
