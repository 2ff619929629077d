use crate::bridge::{
    build_automation_request, run_invocation, AutomationTarget, BridgeError, InvocationResult,
};
use crate::chat::command::{parse_chat_command, ChatCommand};
use crate::chat::render::{render_forward_message, ChatNode, Sender};
use crate::config::Settings;
use crate::device::{run_device_setup, AdbClient};
use crate::runtime::{
    append_relay_log_fields, generate_invocation_id, now_secs, LogLevel, StatePaths,
};
use crate::sections::{extract_sections, Section, SectionKind};
use serde_json::{json, Map, Value};
use std::path::PathBuf;

pub const CONTROL_ACK: &str = "好的,请稍等,我要遥控你了!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatReply {
    Text(String),
    Forward(ChatNode),
}

impl ChatReply {
    pub fn to_plain_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Forward(node) => node.to_plain_text(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(text) => json!({ "type": "text", "text": text }),
            Self::Forward(node) => serde_json::to_value(node).unwrap_or(Value::Null),
        }
    }
}

/// Where replies go. Replies are delivered as soon as they are produced, so
/// the acknowledgement reaches the user before the automation run starts.
pub trait ReplySink {
    fn send(&mut self, reply: ChatReply) -> Result<(), String>;
}

impl ReplySink for Vec<ChatReply> {
    fn send(&mut self, reply: ChatReply) -> Result<(), String> {
        self.push(reply);
        Ok(())
    }
}

pub fn authorize(master: &str, sender_id: &str) -> Result<(), String> {
    if sender_id.trim() == master.trim() {
        return Ok(());
    }
    Err(format!("❌ 只有主人QQ号 {master} 才有权限使用此命令！"))
}

/// Sections to show for a finished run. A run that failed without printing
/// anything to stdout shows its stderr instead.
pub fn sections_for_result(result: &InvocationResult) -> Vec<Section> {
    let sections = extract_sections(&result.stdout);
    if !sections.is_empty() || result.success() {
        return sections;
    }
    let stderr = result.stderr.trim();
    if stderr.is_empty() {
        return sections;
    }
    vec![Section::new(SectionKind::SystemInfo, stderr)]
}

pub struct Relay {
    settings: Settings,
    paths: StatePaths,
    target: AutomationTarget,
    adb: AdbClient,
    apk_path: PathBuf,
}

impl Relay {
    pub fn new(settings: Settings, paths: StatePaths) -> Self {
        let target = settings.automation_target();
        Self::with_target(settings, paths, target)
    }

    pub fn with_target(settings: Settings, paths: StatePaths, target: AutomationTarget) -> Self {
        let adb = AdbClient::new(settings.device.adb_binary.clone(), settings.device.timeout());
        let apk_path = settings.device.resolved_apk_path();
        Self {
            settings,
            paths,
            target,
            adb,
            apk_path,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns `false` when the text is not a relay command.
    pub fn handle_message(
        &self,
        sender: &Sender,
        text: &str,
        sink: &mut dyn ReplySink,
    ) -> Result<bool, String> {
        match parse_chat_command(text) {
            Ok(Some(ChatCommand::Control { instruction })) => {
                self.handle_control(sender, &instruction, sink)?;
                Ok(true)
            }
            Ok(Some(ChatCommand::Detect)) => {
                sink.send(ChatReply::Text(self.handle_detect()))?;
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(usage) => {
                sink.send(ChatReply::Text(usage))?;
                Ok(true)
            }
        }
    }

    pub fn handle_control(
        &self,
        sender: &Sender,
        instruction: &str,
        sink: &mut dyn ReplySink,
    ) -> Result<(), String> {
        if let Err(denial) = authorize(&self.settings.master, &sender.id) {
            self.log(
                LogLevel::Warn,
                "chat.denied",
                "control command from unauthorized sender",
                json!({ "sender_id": sender.id }),
            );
            return sink.send(ChatReply::Text(denial));
        }

        sink.send(ChatReply::Text(CONTROL_ACK.to_string()))?;

        let result = match self.run_automation(instruction) {
            Ok(result) => result,
            Err(err) => return sink.send(ChatReply::Text(format!("❌ 调用失败：{err}"))),
        };

        let sections = sections_for_result(&result);
        if sections.is_empty() {
            return sink.send(ChatReply::Text(format!(
                "⚠️ 自动化进程没有返回任何输出（{}）",
                result.termination()
            )));
        }
        sink.send(ChatReply::Forward(render_forward_message(&sections, sender)))
    }

    pub fn handle_detect(&self) -> String {
        let report = run_device_setup(&self.adb, &self.apk_path);
        let rendered = report.render();
        self.log(
            if report.is_ready() {
                LogLevel::Info
            } else {
                LogLevel::Warn
            },
            "device.setup",
            &rendered,
            json!({ "adb": self.adb.binary(), "ready": report.is_ready() }),
        );
        rendered
    }

    pub fn run_automation(&self, instruction: &str) -> Result<InvocationResult, BridgeError> {
        let invocation_id =
            generate_invocation_id(now_secs()).unwrap_or_else(|_| "inv-unknown".to_string());
        let request = build_automation_request(&self.target, instruction)?;
        self.log(
            LogLevel::Info,
            "bridge.started",
            "automation process launched",
            json!({
                "invocation_id": invocation_id,
                "command": request.command_form(),
                "cwd": request.cwd.as_ref().map(|p| p.display().to_string()),
                "timeout_ms": request.timeout_ms(),
            }),
        );

        match run_invocation(&request) {
            Ok(result) => {
                self.log(
                    if result.success() {
                        LogLevel::Info
                    } else {
                        LogLevel::Warn
                    },
                    "bridge.completed",
                    "automation process finished",
                    json!({
                        "invocation_id": invocation_id,
                        "termination": result.termination(),
                        "stdout_bytes": result.stdout.len(),
                        "stderr_bytes": result.stderr.len(),
                    }),
                );
                Ok(result)
            }
            Err(err) => {
                let (level, event) = match err {
                    BridgeError::Timeout { .. } => (LogLevel::Warn, "bridge.timeout"),
                    _ => (LogLevel::Error, "bridge.failed"),
                };
                self.log(
                    level,
                    event,
                    &err.to_string(),
                    json!({ "invocation_id": invocation_id }),
                );
                Err(err)
            }
        }
    }

    fn log(&self, level: LogLevel, event: &str, message: &str, fields: Value) {
        let fields = match fields {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        append_relay_log_fields(&self.paths, level, event, message, fields);
    }
}
