use crate::bridge::{BridgeError, InvocationRequest};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PYTHON: &str = "python";
pub const DEFAULT_SCRIPT: &str = "main.py";
pub const DEFAULT_AUTOMATION_DIR: &str = "AutoGLM";
pub const PYTHON_ENV: &str = "PYTHON";

/// Everything needed to launch the phone automation entry point for one
/// instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutomationTarget {
    pub python: String,
    pub script: String,
    pub working_dir: PathBuf,
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    pub timeout: Option<Duration>,
    pub max_steps: Option<u32>,
    pub device_id: Option<String>,
    pub lang: Option<String>,
    pub env_overrides: BTreeMap<String, String>,
}

/// Interpreter precedence: explicit setting, then `$PYTHON`, then `python`.
pub fn resolve_python(explicit: Option<&str>, env_value: Option<String>) -> String {
    explicit
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| {
            env_value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        })
        .unwrap_or_else(|| DEFAULT_PYTHON.to_string())
}

/// `AutoGLM/` next to the running executable, or relative to the current
/// directory when the executable path is unknown.
pub fn default_automation_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_AUTOMATION_DIR)))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_AUTOMATION_DIR))
}

pub fn build_automation_request(
    target: &AutomationTarget,
    instruction: &str,
) -> Result<InvocationRequest, BridgeError> {
    let instruction = instruction.trim();
    if instruction.is_empty() {
        return Err(BridgeError::InvalidRequest(
            "instruction must be non-empty".to_string(),
        ));
    }

    let mut request = InvocationRequest::new(target.python.clone())
        .arg(&target.script)
        .args(["--base-url", target.base_url.as_str()])
        .args(["--model", target.model.as_str()])
        .args(["--apikey", target.api_key.as_str()]);
    if let Some(max_steps) = target.max_steps {
        request = request.arg("--max-steps").arg(max_steps);
    }
    if let Some(device_id) = target.device_id.as_deref() {
        request = request.args(["--device-id", device_id]);
    }
    if let Some(lang) = target.lang.as_deref() {
        request = request.args(["--lang", lang]);
    }
    request = request
        .arg(instruction)
        .cwd(target.working_dir.clone())
        .timeout(target.timeout);
    for (k, v) in &target.env_overrides {
        request = request.env(k.clone(), v.clone());
    }
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> AutomationTarget {
        AutomationTarget {
            python: "python3".to_string(),
            script: DEFAULT_SCRIPT.to_string(),
            working_dir: PathBuf::from("/opt/autoglm"),
            base_url: "https://open.bigmodel.cn/api/paas/v4".to_string(),
            model: "autoglm-phone".to_string(),
            api_key: "sk-test".to_string(),
            timeout: Some(Duration::from_secs(300)),
            max_steps: None,
            device_id: None,
            lang: None,
            env_overrides: BTreeMap::new(),
        }
    }

    #[test]
    fn builds_positional_argument_surface() {
        let request = build_automation_request(&target(), "打开微信").expect("request");
        assert_eq!(request.program, "python3");
        assert_eq!(
            request.args,
            vec![
                "main.py",
                "--base-url",
                "https://open.bigmodel.cn/api/paas/v4",
                "--model",
                "autoglm-phone",
                "--apikey",
                "sk-test",
                "打开微信",
            ]
        );
        assert_eq!(request.cwd, Some(PathBuf::from("/opt/autoglm")));
        assert_eq!(request.timeout, Some(Duration::from_secs(300)));
    }

    #[test]
    fn optional_flags_precede_instruction() {
        let mut target = target();
        target.max_steps = Some(40);
        target.device_id = Some("emulator-5554".to_string());
        target.lang = Some("en".to_string());
        target
            .env_overrides
            .insert("PHONE_AGENT_LANG".to_string(), "en".to_string());

        let request = build_automation_request(&target, "open settings").expect("request");
        let tail: Vec<&str> = request.args[7..].iter().map(String::as_str).collect();
        assert_eq!(
            tail,
            vec![
                "--max-steps",
                "40",
                "--device-id",
                "emulator-5554",
                "--lang",
                "en",
                "open settings",
            ]
        );
        assert_eq!(
            request.env_overrides.get("PHONE_AGENT_LANG").map(String::as_str),
            Some("en")
        );
    }

    #[test]
    fn instruction_with_shell_metacharacters_stays_one_argument() {
        let request =
            build_automation_request(&target(), "say \"hi\"; rm -rf / && echo $HOME").expect("request");
        assert_eq!(
            request.args.last().map(String::as_str),
            Some("say \"hi\"; rm -rf / && echo $HOME")
        );
    }

    #[test]
    fn blank_instruction_is_rejected() {
        let err = build_automation_request(&target(), "   ").expect_err("blank");
        assert!(err.to_string().contains("instruction must be non-empty"));
    }

    #[test]
    fn python_resolution_order() {
        assert_eq!(
            resolve_python(Some("/venv/bin/python"), Some("python3".to_string())),
            "/venv/bin/python"
        );
        assert_eq!(resolve_python(Some("  "), Some("python3".to_string())), "python3");
        assert_eq!(resolve_python(None, Some(" ".to_string())), DEFAULT_PYTHON);
        assert_eq!(resolve_python(None, None), DEFAULT_PYTHON);
    }
}
