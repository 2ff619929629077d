use super::ConfigError;
use crate::bridge::{default_automation_dir, resolve_python, AutomationTarget, DEFAULT_SCRIPT};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_APK_FILE_NAME: &str = "ADBKeyboard.apk";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Sender id allowed to drive the phone.
    pub master: String,
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    #[serde(default)]
    pub automation: AutomationConfig,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AutomationLang {
    Cn,
    En,
}

impl AutomationLang {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cn => "cn",
            Self::En => "en",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AutomationConfig {
    pub python: Option<String>,
    #[serde(default = "default_script")]
    pub script: String,
    pub working_dir: Option<PathBuf>,
    #[serde(default = "default_automation_timeout_secs")]
    pub timeout_secs: u64,
    pub max_steps: Option<u32>,
    pub device_id: Option<String>,
    pub lang: Option<AutomationLang>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            python: None,
            script: default_script(),
            working_dir: None,
            timeout_secs: default_automation_timeout_secs(),
            max_steps: None,
            device_id: None,
            lang: None,
            env: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceConfig {
    #[serde(default = "default_adb_binary")]
    pub adb_binary: String,
    pub apk_path: Option<PathBuf>,
    #[serde(default = "default_adb_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            adb_binary: default_adb_binary(),
            apk_path: None,
            timeout_secs: default_adb_timeout_secs(),
        }
    }
}

impl DeviceConfig {
    pub fn timeout(&self) -> Option<Duration> {
        seconds_or_unbounded(self.timeout_secs)
    }

    pub fn resolved_apk_path(&self) -> PathBuf {
        self.apk_path.clone().unwrap_or_else(|| {
            std::env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_APK_FILE_NAME)))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_APK_FILE_NAME))
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChatConfig {
    pub sender_name: Option<String>,
}

fn default_script() -> String {
    DEFAULT_SCRIPT.to_string()
}

fn default_automation_timeout_secs() -> u64 {
    300
}

fn default_adb_binary() -> String {
    "adb".to_string()
}

fn default_adb_timeout_secs() -> u64 {
    60
}

fn seconds_or_unbounded(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

impl Settings {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("master", &self.master),
            ("base_url", &self.base_url),
            ("model", &self.model),
            ("api_key", &self.api_key),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Settings(format!(
                    "`{field}` must be non-empty"
                )));
            }
        }

        if self.automation.script.trim().is_empty() {
            return Err(ConfigError::Settings(
                "`automation.script` must be non-empty".to_string(),
            ));
        }
        if self.automation.max_steps == Some(0) {
            return Err(ConfigError::Settings(
                "`automation.max_steps` must be greater than zero".to_string(),
            ));
        }
        if let Some(device_id) = &self.automation.device_id {
            if device_id.trim().is_empty() {
                return Err(ConfigError::Settings(
                    "`automation.device_id` must be non-empty when set".to_string(),
                ));
            }
        }
        for key in self.automation.env.keys() {
            if key.trim().is_empty() || key.contains('=') {
                return Err(ConfigError::Settings(format!(
                    "`automation.env` key `{key}` is not a valid variable name"
                )));
            }
        }

        if self.device.adb_binary.trim().is_empty() {
            return Err(ConfigError::Settings(
                "`device.adb_binary` must be non-empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn automation_timeout(&self) -> Option<Duration> {
        seconds_or_unbounded(self.automation.timeout_secs)
    }

    /// Resolves interpreter and working directory against the environment of
    /// the current process.
    pub fn automation_target(&self) -> AutomationTarget {
        self.automation_target_with_python_env(std::env::var(crate::bridge::PYTHON_ENV).ok())
    }

    pub fn automation_target_with_python_env(
        &self,
        python_env: Option<String>,
    ) -> AutomationTarget {
        AutomationTarget {
            python: resolve_python(self.automation.python.as_deref(), python_env),
            script: self.automation.script.clone(),
            working_dir: self
                .automation
                .working_dir
                .clone()
                .unwrap_or_else(default_automation_dir),
            base_url: self.base_url.trim().to_string(),
            model: self.model.trim().to_string(),
            api_key: self.api_key.trim().to_string(),
            timeout: self.automation_timeout(),
            max_steps: self.automation.max_steps,
            device_id: self.automation.device_id.clone(),
            lang: self.automation.lang.map(|lang| lang.as_str().to_string()),
            env_overrides: self.automation.env.clone(),
        }
    }
}
