use crate::app::cli::parse_common_flags;
use crate::app::command_support::{load_relay, resolve_sender};
use crate::chat::ChatReply;
use serde_json::Value;

pub fn cmd_control(args: &[String]) -> Result<String, String> {
    let flags = parse_common_flags(args)?;
    let instruction = flags.positional.join(" ");
    if instruction.trim().is_empty() {
        return Err("usage: control [--as <id>] [--json] <instruction>".to_string());
    }

    let relay = load_relay()?;
    let sender = resolve_sender(relay.settings(), flags.sender_id.as_deref());
    let mut replies: Vec<ChatReply> = Vec::new();
    relay.handle_control(&sender, &instruction, &mut replies)?;

    if flags.json {
        let values: Vec<Value> = replies.iter().map(ChatReply::to_json).collect();
        return serde_json::to_string_pretty(&values)
            .map_err(|e| format!("failed to encode replies: {e}"));
    }
    Ok(replies
        .iter()
        .map(ChatReply::to_plain_text)
        .collect::<Vec<_>>()
        .join("\n\n"))
}
