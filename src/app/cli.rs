#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliVerb {
    Setup,
    Control,
    Detect,
    Chat,
    Split,
    Doctor,
    Help,
    Unknown,
}

pub fn parse_cli_verb(input: &str) -> CliVerb {
    match input {
        "setup" => CliVerb::Setup,
        "control" => CliVerb::Control,
        "detect" => CliVerb::Detect,
        "chat" => CliVerb::Chat,
        "split" => CliVerb::Split,
        "doctor" => CliVerb::Doctor,
        "help" | "--help" | "-h" => CliVerb::Help,
        _ => CliVerb::Unknown,
    }
}

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "Commands:".to_string(),
        "  setup                                Write a config template to the state root"
            .to_string(),
        "  control [--as <id>] [--json] <msg>   Run one instruction on the phone".to_string(),
        "  detect                               Detect the device and prepare ADB Keyboard"
            .to_string(),
        "  chat [--as <id>]                     Interactive local chat session".to_string(),
        "  split [--json] [file]                Split automation output (file or stdin)"
            .to_string(),
        "  doctor                               Run local environment and config checks"
            .to_string(),
        "  help                                 Show this help".to_string(),
    ]
}

pub(crate) fn help_text() -> String {
    cli_help_lines().join("\n")
}

/// Pulls `--as <id>` and `--json` out of `args`, leaving positional
/// arguments in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommonFlags {
    pub sender_id: Option<String>,
    pub json: bool,
    pub positional: Vec<String>,
}

pub fn parse_common_flags(args: &[String]) -> Result<CommonFlags, String> {
    let mut flags = CommonFlags::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--as" => {
                let value = iter
                    .next()
                    .filter(|v| !v.trim().is_empty())
                    .ok_or_else(|| "`--as` requires a sender id".to_string())?;
                flags.sender_id = Some(value.trim().to_string());
            }
            "--json" => flags.json = true,
            "--" => {
                flags.positional.extend(iter.by_ref().cloned());
            }
            _ => flags.positional.push(arg.clone()),
        }
    }
    Ok(flags)
}
