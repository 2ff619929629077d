use crate::app::cli::parse_common_flags;
use crate::app::command_support::{load_relay, resolve_sender};
use crate::chat::run_chat_session_stdio;

pub fn cmd_chat(args: &[String]) -> Result<String, String> {
    let flags = parse_common_flags(args)?;
    if !flags.positional.is_empty() {
        return Err("usage: chat [--as <id>]".to_string());
    }
    let relay = load_relay()?;
    let sender = resolve_sender(relay.settings(), flags.sender_id.as_deref());
    run_chat_session_stdio(&relay, &sender)
}
