use crate::bridge::{run_invocation, BridgeError, InvocationRequest, InvocationResult};
use std::path::Path;
use std::time::Duration;

pub const ADB_KEYBOARD_PACKAGE: &str = "com.android.adbkeyboard";
pub const ADB_KEYBOARD_IME: &str = "com.android.adbkeyboard/.AdbIME";

/// Thin wrapper that runs `adb` subcommands through the process bridge.
#[derive(Debug, Clone)]
pub struct AdbClient {
    binary: String,
    timeout: Option<Duration>,
}

impl AdbClient {
    pub fn new(binary: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    fn run(&self, args: &[&str]) -> Result<InvocationResult, BridgeError> {
        let request = InvocationRequest::new(self.binary.clone())
            .args(args.iter().copied())
            .timeout(self.timeout);
        run_invocation(&request)
    }

    pub fn devices(&self) -> Result<InvocationResult, BridgeError> {
        self.run(&["devices"])
    }

    pub fn list_packages(&self, device_id: &str) -> Result<InvocationResult, BridgeError> {
        self.run(&["-s", device_id, "shell", "pm", "list", "packages"])
    }

    pub fn install(&self, device_id: &str, apk: &Path) -> Result<InvocationResult, BridgeError> {
        let apk = apk.display().to_string();
        self.run(&["-s", device_id, "install", "-r", apk.as_str()])
    }

    pub fn enable_ime(&self, device_id: &str, ime: &str) -> Result<InvocationResult, BridgeError> {
        self.run(&["-s", device_id, "shell", "ime", "enable", ime])
    }
}

/// First attached device in `adb devices` output whose state is `device`
/// (skips `offline`, `unauthorized` and the header line).
pub fn parse_connected_device(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("List of devices attached"))
        .find_map(|line| {
            let mut cols = line.split_whitespace();
            let id = cols.next()?;
            (cols.next() == Some("device")).then(|| id.to_string())
        })
}

pub fn has_package(pm_output: &str, package: &str) -> bool {
    pm_output
        .lines()
        .filter_map(|line| line.trim().strip_prefix("package:"))
        .any(|name| name.trim() == package)
}

/// Mirrors a failed shell command: the stderr text if any, otherwise the exit
/// status. `None` when the command succeeded.
pub(crate) fn command_failure(result: &InvocationResult) -> Option<String> {
    if result.success() {
        return None;
    }
    let stderr = result.stderr.trim();
    if !stderr.is_empty() {
        return Some(stderr.to_string());
    }
    let stdout = result.stdout.trim();
    if !stdout.is_empty() {
        return Some(stdout.to_string());
    }
    Some(format!("command failed with {}", result.termination()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_first_ready_device() {
        let out = "List of devices attached\nemulator-5554\toffline\nR58M1234\tdevice\n9B1\tdevice\n\n";
        assert_eq!(parse_connected_device(out), Some("R58M1234".to_string()));
    }

    #[test]
    fn unauthorized_only_means_no_device() {
        let out = "List of devices attached\nR58M1234\tunauthorized\n";
        assert_eq!(parse_connected_device(out), None);
        assert_eq!(parse_connected_device("List of devices attached\n"), None);
    }

    #[test]
    fn package_match_is_exact() {
        let out = "package:com.android.settings\npackage:com.android.adbkeyboard\n";
        assert!(has_package(out, ADB_KEYBOARD_PACKAGE));
        assert!(!has_package(
            "package:com.android.adbkeyboard2\n",
            ADB_KEYBOARD_PACKAGE
        ));
    }

    #[test]
    fn failure_text_prefers_stderr() {
        let result = InvocationResult {
            stdout: "partial".to_string(),
            stderr: "error: device offline\n".to_string(),
            exit_code: Some(1),
            signal: None,
        };
        assert_eq!(
            command_failure(&result).as_deref(),
            Some("error: device offline")
        );

        let ok = InvocationResult {
            exit_code: Some(0),
            ..result
        };
        assert_eq!(command_failure(&ok), None);
    }
}
