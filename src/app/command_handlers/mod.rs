use crate::app::cli::{help_text, parse_cli_verb, CliVerb};

pub mod chat;
pub mod control;
pub mod detect;
pub mod doctor;
pub mod setup;
pub mod split;

pub fn run_cli(args: Vec<String>) -> Result<String, String> {
    if args.is_empty() {
        return Ok(help_text());
    }

    match parse_cli_verb(args[0].as_str()) {
        CliVerb::Setup => setup::cmd_setup(),
        CliVerb::Control => control::cmd_control(&args[1..]),
        CliVerb::Detect => detect::cmd_detect(),
        CliVerb::Chat => chat::cmd_chat(&args[1..]),
        CliVerb::Split => split::cmd_split(&args[1..]),
        CliVerb::Doctor => doctor::cmd_doctor(),
        CliVerb::Help => Ok(help_text()),
        CliVerb::Unknown => Err(format!("unknown command `{}`", args[0])),
    }
}
