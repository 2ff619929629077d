pub mod error;
pub mod load;
pub mod paths;
pub mod save;
pub mod settings;

pub use error::ConfigError;
pub use load::load_settings_from;
pub use paths::{default_state_root_path, SETTINGS_FILE_NAME, STATE_ROOT_DIR, STATE_ROOT_ENV};
pub use save::{write_settings_template, SETTINGS_TEMPLATE};
pub use settings::{
    AutomationConfig, AutomationLang, ChatConfig, DeviceConfig, Settings, DEFAULT_APK_FILE_NAME,
};
