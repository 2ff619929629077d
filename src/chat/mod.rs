//! Chat-facing side of the relay: command parsing, the owner check, and
//! turning automation output into forward messages.

pub mod command;
pub mod relay;
pub mod render;
pub mod session;

pub use command::{parse_chat_command, ChatCommand};
pub use relay::{authorize, sections_for_result, ChatReply, Relay, ReplySink, CONTROL_ACK};
pub use render::{avatar_url, content_nodes, render_forward_message, ChatNode, Sender};
pub use session::{run_chat_session, run_chat_session_stdio};
