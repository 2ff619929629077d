use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

pub mod automation;
pub mod runner;
pub mod settle;

pub use automation::{
    build_automation_request, default_automation_dir, resolve_python, AutomationTarget,
    DEFAULT_AUTOMATION_DIR, DEFAULT_PYTHON, DEFAULT_SCRIPT, PYTHON_ENV,
};
pub use runner::{run_invocation, UTF8_IO_ENV};
pub use settle::{Settle, SettleState};

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("failed to launch `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("process timeout after {timeout_ms} ms")]
    Timeout { program: String, timeout_ms: u64 },
    #[error("lost track of `{program}` while waiting for it to exit: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid invocation: {0}")]
    InvalidRequest(String),
}

/// One external-process call. Built once, never mutated after it is handed to
/// [`run_invocation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env_overrides: BTreeMap<String, String>,
    pub timeout: Option<Duration>,
}

impl InvocationRequest {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env_overrides: BTreeMap::new(),
            timeout: None,
        }
    }

    pub fn arg(mut self, arg: impl ToString) -> Self {
        self.args.push(arg.to_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.args.extend(args.into_iter().map(|arg| arg.to_string()));
        self
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_overrides.insert(key.into(), value.into());
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout.filter(|t| !t.is_zero());
        self
    }

    pub fn timeout_ms(&self) -> Option<u64> {
        self.timeout.map(|t| t.as_millis() as u64)
    }

    /// Printable form of the call for logs. Values following secret-bearing
    /// flags are masked.
    pub fn command_form(&self) -> String {
        let mut parts = vec![self.program.clone()];
        let mut mask_next = false;
        for arg in &self.args {
            if mask_next {
                parts.push("***".to_string());
                mask_next = false;
                continue;
            }
            mask_next = SECRET_FLAGS.contains(&arg.as_str());
            parts.push(arg.clone());
        }
        parts.join(" ")
    }
}

const SECRET_FLAGS: &[&str] = &["--apikey", "--api-key"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub signal: Option<i32>,
}

impl InvocationResult {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Short description of how the process ended, e.g. `exit_code=0` or
    /// `signal=9`.
    pub fn termination(&self) -> String {
        match (self.exit_code, self.signal) {
            (Some(code), _) => format!("exit_code={code}"),
            (None, Some(signal)) => format!("signal={signal}"),
            (None, None) => "unknown".to_string(),
        }
    }
}
