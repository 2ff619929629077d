pub const CONTROL_COMMAND: &str = "操控";
pub const CONTROL_ALIAS: &str = "control";
pub const DETECT_COMMAND: &str = "检测设备";
pub const DETECT_ALIAS: &str = "detect";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Control { instruction: String },
    Detect,
}

/// `Ok(None)` for ordinary chatter. A leading `/` is accepted on command
/// names.
pub fn parse_chat_command(text: &str) -> Result<Option<ChatCommand>, String> {
    let text = text.trim();
    let text = text.strip_prefix('/').unwrap_or(text);
    let (name, rest) = match text.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (text, ""),
    };

    match name {
        CONTROL_COMMAND | CONTROL_ALIAS => {
            if rest.is_empty() {
                return Err(format!("用法：{CONTROL_COMMAND} <指令>"));
            }
            Ok(Some(ChatCommand::Control {
                instruction: rest.to_string(),
            }))
        }
        DETECT_COMMAND | DETECT_ALIAS => Ok(Some(ChatCommand::Detect)),
        _ => Ok(None),
    }
}
