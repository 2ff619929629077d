use crate::app::command_support::load_relay;

pub fn cmd_detect() -> Result<String, String> {
    let relay = load_relay()?;
    Ok(relay.handle_detect())
}
