//! Splits the automation process's console output into the labeled blocks it
//! prints (thinking, timing, action), in the order they appear.

use serde::Serialize;

/// Line the automation process prints after every block.
pub const END_SEPARATOR: &str = "==================================================";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SectionKind {
    #[serde(rename = "systemInfo")]
    SystemInfo,
    #[serde(rename = "thinkingProcess")]
    ThinkingProcess,
    #[serde(rename = "performanceMetrics")]
    PerformanceMetrics,
    #[serde(rename = "executionAction")]
    ExecutionAction,
}

impl SectionKind {
    /// Kinds announced by a literal marker. `SystemInfo` is synthesized.
    pub const MARKED: [SectionKind; 3] = [
        SectionKind::ThinkingProcess,
        SectionKind::PerformanceMetrics,
        SectionKind::ExecutionAction,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SystemInfo => "systemInfo",
            Self::ThinkingProcess => "thinkingProcess",
            Self::PerformanceMetrics => "performanceMetrics",
            Self::ExecutionAction => "executionAction",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::SystemInfo => "系统信息",
            Self::ThinkingProcess => "思考过程",
            Self::PerformanceMetrics => "性能指标",
            Self::ExecutionAction => "执行动作",
        }
    }

    pub fn marker(self) -> Option<&'static str> {
        match self {
            Self::SystemInfo => None,
            Self::ThinkingProcess => Some("💭 思考过程:"),
            // two spaces after the emoji
            Self::PerformanceMetrics => Some("⏱️  性能指标:"),
            Self::ExecutionAction => Some("🎯 执行动作:"),
        }
    }
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    #[serde(rename = "type")]
    pub label: String,
    #[serde(rename = "rawType")]
    pub kind: SectionKind,
    pub content: String,
}

impl Section {
    /// Backslashes are escapes only inside marked sections. System-info text
    /// (often a traceback with Windows paths) is kept as printed.
    pub fn new(kind: SectionKind, content: &str) -> Self {
        let content = content.trim();
        let content = match kind {
            SectionKind::SystemInfo => content.to_string(),
            _ => strip_escapes(content),
        };
        Self {
            label: kind.label().to_string(),
            kind,
            content,
        }
    }
}

/// Never fails. Text before the first marker becomes a leading system-info
/// section; output without any marker is returned whole as system-info.
pub fn extract_sections(stdout: &str) -> Vec<Section> {
    let text = stdout.replace("\r\n", "\n");
    let mut found: Vec<(usize, Section)> = Vec::new();

    let first_marker = SectionKind::MARKED
        .iter()
        .filter_map(|kind| kind.marker().and_then(|marker| text.find(marker)))
        .min()
        .unwrap_or(text.len());
    let preamble = text[..first_marker].trim();
    if !preamble.is_empty() {
        found.push((0, Section::new(SectionKind::SystemInfo, preamble)));
    }

    for kind in SectionKind::MARKED {
        let Some(marker) = kind.marker() else {
            continue;
        };
        let mut cursor = 0;
        while let Some(offset) = text[cursor..].find(marker) {
            let start = cursor + offset;
            let body = start + marker.len();
            let (end, next) = match text[body..].find(END_SEPARATOR) {
                Some(sep) => (body + sep, body + sep + END_SEPARATOR.len()),
                None => (text.len(), text.len()),
            };
            found.push((start, Section::new(kind, &text[start..end])));
            cursor = next;
        }
    }

    found.sort_by_key(|(pos, _)| *pos);
    found.into_iter().map(|(_, section)| section).collect()
}

fn strip_escapes(content: &str) -> String {
    content.replace('\\', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(sections: &[Section]) -> Vec<SectionKind> {
        sections.iter().map(|s| s.kind).collect()
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(extract_sections("").is_empty());
        assert!(extract_sections(" \n\r\n\t").is_empty());
    }

    #[test]
    fn leading_text_becomes_system_info() {
        let input = format!(
            "hello 💭 思考过程:\nfoo\n{END_SEPARATOR}\n🎯 执行动作:\nbar"
        );
        let sections = extract_sections(&input);
        assert_eq!(
            kinds(&sections),
            vec![
                SectionKind::SystemInfo,
                SectionKind::ThinkingProcess,
                SectionKind::ExecutionAction,
            ]
        );
        assert_eq!(sections[0].content, "hello");
        assert_eq!(sections[0].label, "系统信息");
        assert_eq!(sections[1].content, "💭 思考过程:\nfoo");
        assert_eq!(sections[2].content, "🎯 执行动作:\nbar");
    }

    #[test]
    fn marker_free_text_is_whole_system_info() {
        let sections = extract_sections("  Traceback (most recent call last):\n  boom\n");
        assert_eq!(kinds(&sections), vec![SectionKind::SystemInfo]);
        assert_eq!(
            sections[0].content,
            "Traceback (most recent call last):\n  boom"
        );
    }

    #[test]
    fn crlf_is_normalized_before_scanning() {
        let input = format!("⏱️  性能指标:\r\n耗时 1.2s\r\n{END_SEPARATOR}\r\n");
        let sections = extract_sections(&input);
        assert_eq!(kinds(&sections), vec![SectionKind::PerformanceMetrics]);
        assert_eq!(sections[0].content, "⏱️  性能指标:\n耗时 1.2s");
    }

    #[test]
    fn backslashes_are_removed() {
        let sections = extract_sections("🎯 执行动作:\na\\\\b\\\\c");
        assert_eq!(sections[0].content, "🎯 执行动作:\nabc");
    }

    #[test]
    fn system_info_keeps_backslashes() {
        let input = "File \"C:\\AutoGLM\\main.py\", line 3\n🎯 执行动作:\nC:\\x";
        let sections = extract_sections(input);
        assert_eq!(sections[0].content, "File \"C:\\AutoGLM\\main.py\", line 3");
        assert_eq!(sections[1].content, "🎯 执行动作:\nC:x");

        let whole = extract_sections("C:\\Users\\me> python main.py");
        assert_eq!(whole[0].content, "C:\\Users\\me> python main.py");
    }

    #[test]
    fn repeated_markers_are_distinct_entries_in_source_order() {
        let input = format!(
            "🎯 执行动作:\n{{\"action\": \"Tap\"}}\n{END_SEPARATOR}\n💭 思考过程:\nnext\n{END_SEPARATOR}\n🎯 执行动作:\n{{\"action\": \"Type\"}}\n{END_SEPARATOR}\n"
        );
        let sections = extract_sections(&input);
        assert_eq!(
            kinds(&sections),
            vec![
                SectionKind::ExecutionAction,
                SectionKind::ThinkingProcess,
                SectionKind::ExecutionAction,
            ]
        );
        assert!(sections[0].content.contains("Tap"));
        assert!(sections[2].content.contains("Type"));
    }

    #[test]
    fn serializes_with_label_and_raw_key() {
        let sections = extract_sections("🎯 执行动作:\ndone");
        let value = serde_json::to_value(&sections[0]).expect("json");
        assert_eq!(value["type"], "执行动作");
        assert_eq!(value["rawType"], "executionAction");
        assert_eq!(value["content"], "🎯 执行动作:\ndone");
    }
}
