use crate::app::command_support::{ensure_runtime_root, load_settings};
use std::fs;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

#[derive(Debug, Clone)]
struct DoctorFinding {
    id: String,
    ok: bool,
    detail: String,
    remediation: String,
}

fn doctor_finding(
    id: impl Into<String>,
    ok: bool,
    detail: impl Into<String>,
    remediation: impl Into<String>,
) -> DoctorFinding {
    DoctorFinding {
        id: id.into(),
        ok,
        detail: detail.into(),
        remediation: remediation.into(),
    }
}

pub(crate) fn is_binary_available(binary: &str) -> bool {
    if binary.trim().is_empty() {
        return false;
    }
    let explicit = Path::new(binary);
    if explicit.components().count() > 1 || explicit.is_absolute() {
        return is_executable_file(explicit);
    }

    let Some(path) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&path).any(|dir| {
        let candidate = dir.join(binary);
        if is_executable_file(&candidate) {
            return true;
        }
        #[cfg(windows)]
        {
            if is_executable_file(&dir.join(format!("{binary}.exe"))) {
                return true;
            }
        }
        false
    })
}

fn is_executable_file(path: &Path) -> bool {
    let Ok(metadata) = fs::metadata(path) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        metadata.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}

pub fn cmd_doctor() -> Result<String, String> {
    let paths = ensure_runtime_root()?;
    let mut findings = Vec::new();
    let config_path = paths.settings_file();
    findings.push(doctor_finding(
        "config.path",
        config_path.exists(),
        format!("config={}", config_path.display()),
        "run `autoglm-relay setup` to create a config template",
    ));

    let settings = match load_settings(&paths) {
        Ok(settings) => {
            findings.push(doctor_finding(
                "config.parse",
                true,
                "settings parsed and validated",
                "none",
            ));
            Some(settings)
        }
        Err(err) => {
            findings.push(doctor_finding(
                "config.parse",
                false,
                format!("settings load failed: {}", err.lines().next().unwrap_or("")),
                format!("fill in master, base_url, model and api_key in {}", config_path.display()),
            ));
            None
        }
    };

    if let Some(settings) = settings.as_ref() {
        let target = settings.automation_target();
        findings.push(doctor_finding(
            "binary.python",
            is_binary_available(&target.python),
            format!("binary={}", target.python),
            "install Python 3.8+ or set `automation.python` / $PYTHON",
        ));
        findings.push(doctor_finding(
            "automation.working_dir",
            target.working_dir.is_dir(),
            format!("dir={}", target.working_dir.display()),
            "set `automation.working_dir` to the AutoGLM checkout",
        ));
        let script = target.working_dir.join(&target.script);
        findings.push(doctor_finding(
            "automation.script",
            script.is_file(),
            format!("script={}", script.display()),
            "set `automation.script` to the automation entry point",
        ));
        findings.push(doctor_finding(
            "binary.adb",
            is_binary_available(&settings.device.adb_binary),
            format!("binary={}", settings.device.adb_binary),
            "install Android platform-tools or set `device.adb_binary`",
        ));
        let apk = settings.device.resolved_apk_path();
        findings.push(doctor_finding(
            "device.apk",
            apk.is_file(),
            format!("apk={}", apk.display()),
            "download ADBKeyboard.apk and set `device.apk_path`",
        ));
    }

    let failed = findings.iter().filter(|f| !f.ok).count();
    let summary = if failed == 0 { "healthy" } else { "unhealthy" };
    let mut lines = vec![
        format!("summary={summary}"),
        format!("checks_total={}", findings.len()),
        format!("checks_failed={failed}"),
    ];
    for finding in findings {
        lines.push(format!(
            "check:{}={}",
            finding.id,
            if finding.ok { "ok" } else { "fail" }
        ));
        lines.push(format!("check:{}.detail={}", finding.id, finding.detail));
        if !finding.ok {
            lines.push(format!(
                "check:{}.remediation={}",
                finding.id, finding.remediation
            ));
        }
    }
    Ok(lines.join("\n"))
}
