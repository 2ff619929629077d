use crate::device::adb::command_failure;
use crate::device::{
    has_package, parse_connected_device, AdbClient, DeviceReport, DeviceStatus, EnableStatus,
    InstallStatus, PackageStatus, ADB_KEYBOARD_IME, ADB_KEYBOARD_PACKAGE,
};
use std::path::Path;

/// detect → installed? → install if not → enable → report.
pub fn run_device_setup(adb: &AdbClient, apk_path: &Path) -> DeviceReport {
    let device = detect_device(adb);
    let mut report = DeviceReport {
        device: device.clone(),
        package: None,
        install: None,
        enable: None,
    };
    let DeviceStatus::Connected { device_id } = device else {
        return report;
    };

    let package = check_package(adb, &device_id);
    report.package = Some(package.clone());
    match package {
        PackageStatus::Installed => {}
        PackageStatus::Missing => {
            let install = install_package(adb, &device_id, apk_path);
            let installed = install == InstallStatus::Installed;
            report.install = Some(install);
            if !installed {
                return report;
            }
        }
        PackageStatus::CheckFailed(_) => return report,
    }

    report.enable = Some(enable_ime(adb, &device_id));
    report
}

pub fn detect_device(adb: &AdbClient) -> DeviceStatus {
    let result = match adb.devices() {
        Ok(result) => result,
        Err(err) => return DeviceStatus::DetectFailed(err.to_string()),
    };
    if let Some(reason) = command_failure(&result) {
        return DeviceStatus::DetectFailed(reason);
    }
    match parse_connected_device(&result.stdout) {
        Some(device_id) => DeviceStatus::Connected { device_id },
        None => DeviceStatus::NotConnected,
    }
}

pub fn check_package(adb: &AdbClient, device_id: &str) -> PackageStatus {
    let result = match adb.list_packages(device_id) {
        Ok(result) => result,
        Err(err) => return PackageStatus::CheckFailed(err.to_string()),
    };
    if let Some(reason) = command_failure(&result) {
        return PackageStatus::CheckFailed(reason);
    }
    if has_package(&result.stdout, ADB_KEYBOARD_PACKAGE) {
        PackageStatus::Installed
    } else {
        PackageStatus::Missing
    }
}

pub fn install_package(adb: &AdbClient, device_id: &str, apk_path: &Path) -> InstallStatus {
    if !apk_path.is_file() {
        return InstallStatus::ApkMissing(apk_path.to_path_buf());
    }
    let result = match adb.install(device_id, apk_path) {
        Ok(result) => result,
        Err(err) => return InstallStatus::Failed(err.to_string()),
    };
    if let Some(reason) = command_failure(&result) {
        return InstallStatus::Failed(reason);
    }
    if result.stdout.contains("Success") {
        InstallStatus::Installed
    } else {
        InstallStatus::Unconfirmed(result.stdout.trim().to_string())
    }
}

pub fn enable_ime(adb: &AdbClient, device_id: &str) -> EnableStatus {
    let result = match adb.enable_ime(device_id, ADB_KEYBOARD_IME) {
        Ok(result) => result,
        Err(err) => return EnableStatus::Failed(err.to_string()),
    };
    if let Some(reason) = command_failure(&result) {
        if reason.contains("does not exist") {
            return EnableStatus::ImeMissing;
        }
        if reason.contains("Permission denied") {
            return EnableStatus::PermissionDenied;
        }
        return EnableStatus::Failed(reason);
    }
    let out = result.stdout.trim();
    if out.contains("now enabled for user") {
        EnableStatus::Enabled
    } else if out.is_empty() {
        EnableStatus::EnabledSilently
    } else {
        EnableStatus::Unconfirmed(out.to_string())
    }
}
