use crate::app::cli::parse_common_flags;
use crate::sections::{extract_sections, Section};
use std::fs;
use std::io::{self, Read};

pub fn cmd_split(args: &[String]) -> Result<String, String> {
    let flags = parse_common_flags(args)?;
    let raw = match flags.positional.as_slice() {
        [] => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("failed to read stdin: {e}"))?;
            buf
        }
        [path] => fs::read_to_string(path).map_err(|e| format!("failed to read {path}: {e}"))?,
        _ => return Err("usage: split [--json] [file]".to_string()),
    };

    let sections = extract_sections(&raw);
    if flags.json {
        return serde_json::to_string_pretty(&sections)
            .map_err(|e| format!("failed to encode sections: {e}"));
    }
    Ok(render_sections(&sections))
}

pub fn render_sections(sections: &[Section]) -> String {
    let mut lines = vec![format!("sections={}", sections.len())];
    for (idx, section) in sections.iter().enumerate() {
        lines.push(String::new());
        lines.push(format!("[{idx}] {} ({})", section.label, section.kind));
        lines.push(section.content.clone());
    }
    lines.join("\n")
}
