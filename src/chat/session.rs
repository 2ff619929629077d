use crate::chat::command::{CONTROL_COMMAND, DETECT_COMMAND};
use crate::chat::relay::{ChatReply, Relay, ReplySink};
use crate::chat::render::Sender;
use std::io::{self, BufRead, Write};

const CHAT_EXIT_COMMANDS: &[&str] = &["/exit", "exit", "quit"];

pub fn run_chat_session_stdio(relay: &Relay, sender: &Sender) -> Result<String, String> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stdout = io::stdout();
    let mut output = stdout.lock();
    run_chat_session(relay, sender, &mut input, &mut output)
}

/// Line-oriented local chat: every input line is one message from `sender`.
pub fn run_chat_session<R: BufRead, W: Write>(
    relay: &Relay,
    sender: &Sender,
    input: &mut R,
    output: &mut W,
) -> Result<String, String> {
    writeln!(output, "chat sender={} ({})", sender.id, sender.name)
        .map_err(|e| format!("failed to write chat output: {e}"))?;
    writeln!(
        output,
        "commands: `{CONTROL_COMMAND} <指令>`, `{DETECT_COMMAND}`; type `/exit` to quit"
    )
    .map_err(|e| format!("failed to write chat output: {e}"))?;

    let mut handled = 0_usize;
    loop {
        write!(output, "you> ").map_err(|e| format!("failed to write chat prompt: {e}"))?;
        output
            .flush()
            .map_err(|e| format!("failed to flush chat prompt: {e}"))?;

        let mut line = String::new();
        let read = input
            .read_line(&mut line)
            .map_err(|e| format!("failed to read chat input: {e}"))?;
        if read == 0 {
            break;
        }

        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if is_chat_exit_command(message) {
            break;
        }

        let mut sink = WriterSink { output: &mut *output };
        if relay.handle_message(sender, message, &mut sink)? {
            handled += 1;
        } else {
            sink.send(ChatReply::Text(format!(
                "未知命令，可用命令：{CONTROL_COMMAND} <指令>、{DETECT_COMMAND}"
            )))?;
        }
    }

    Ok(format!("chat ended\ncommands_handled={handled}"))
}

fn is_chat_exit_command(message: &str) -> bool {
    CHAT_EXIT_COMMANDS
        .iter()
        .any(|command| message.eq_ignore_ascii_case(command))
}

struct WriterSink<'a, W: Write> {
    output: &'a mut W,
}

impl<W: Write> ReplySink for WriterSink<'_, W> {
    fn send(&mut self, reply: ChatReply) -> Result<(), String> {
        writeln!(self.output, "relay> {}", reply.to_plain_text())
            .map_err(|e| format!("failed to write chat output: {e}"))?;
        self.output
            .flush()
            .map_err(|e| format!("failed to flush chat output: {e}"))
    }
}
