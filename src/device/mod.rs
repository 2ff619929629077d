//! Phone-side preparation: find an attached device, make sure the ADB
//! Keyboard input method is installed, and enable it.

use std::path::PathBuf;

pub mod adb;
pub mod sequence;

pub use adb::{
    has_package, parse_connected_device, AdbClient, ADB_KEYBOARD_IME, ADB_KEYBOARD_PACKAGE,
};
pub use sequence::{check_package, detect_device, enable_ime, install_package, run_device_setup};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceStatus {
    Connected { device_id: String },
    NotConnected,
    DetectFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageStatus {
    Installed,
    Missing,
    CheckFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallStatus {
    Installed,
    ApkMissing(PathBuf),
    /// Install ran but never printed `Success`.
    Unconfirmed(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnableStatus {
    Enabled,
    /// Some devices print nothing on success.
    EnabledSilently,
    Unconfirmed(String),
    ImeMissing,
    PermissionDenied,
    Failed(String),
}

/// Outcome of each step that ran. Later steps are `None` when an earlier one
/// stopped the sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceReport {
    pub device: DeviceStatus,
    pub package: Option<PackageStatus>,
    pub install: Option<InstallStatus>,
    pub enable: Option<EnableStatus>,
}

impl DeviceReport {
    pub fn is_ready(&self) -> bool {
        matches!(
            self.enable,
            Some(EnableStatus::Enabled | EnableStatus::EnabledSilently)
        )
    }

    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        match &self.device {
            DeviceStatus::Connected { device_id } => {
                lines.push(format!("✅ 设备连接成功，设备ID：{device_id}"));
            }
            DeviceStatus::NotConnected => lines.push("❌ 未检测到已连接的ADB设备".to_string()),
            DeviceStatus::DetectFailed(err) => lines.push(format!("执行出错：{err}")),
        }
        match &self.package {
            Some(PackageStatus::Installed) => lines.push("✅ 设备已安装ADB键盘".to_string()),
            Some(PackageStatus::Missing) => {
                lines.push("❌ 设备未安装ADB键盘，正在尝试自动安装...".to_string())
            }
            Some(PackageStatus::CheckFailed(err)) => {
                lines.push(format!("❌ 检测应用安装状态失败：{err}"))
            }
            None => {}
        }
        match &self.install {
            Some(InstallStatus::Installed) => lines.push("✅ 安装成功！".to_string()),
            Some(InstallStatus::ApkMissing(path)) => {
                lines.push(format!("❌ APK文件不存在：{}", path.display()))
            }
            Some(InstallStatus::Unconfirmed(out)) => {
                lines.push(format!("⚠️ 安装完成，输出：{out}"))
            }
            Some(InstallStatus::Failed(err)) => lines.push(format!("❌ 安装失败：{err}")),
            None => {}
        }
        match &self.enable {
            Some(EnableStatus::Enabled) => {
                lines.push("✅ ADB Keyboard输入法已成功启用".to_string())
            }
            Some(EnableStatus::EnabledSilently) => {
                lines.push("✅ ADB Keyboard输入法已成功启用（设备无额外输出）".to_string())
            }
            Some(EnableStatus::Unconfirmed(out)) => {
                lines.push(format!("⚠️ 输入法启用命令执行完成，输出：{out}"))
            }
            Some(EnableStatus::ImeMissing) => {
                lines.push(format!("❌ 输入法{ADB_KEYBOARD_IME}不存在，启用失败"))
            }
            Some(EnableStatus::PermissionDenied) => {
                lines.push("❌ 启用输入法权限不足，请开启USB调试（安全设置）".to_string())
            }
            Some(EnableStatus::Failed(err)) => lines.push(format!("❌ 启用输入法失败：{err}")),
            None => {}
        }
        lines.join("\n")
    }
}
