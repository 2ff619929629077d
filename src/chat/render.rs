use crate::sections::Section;
use serde::Serialize;

/// Transport-neutral message tree. Serializes to JSON for chat adapters and
/// renders to plain text for terminals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatNode {
    Text {
        text: String,
    },
    Break,
    Author {
        id: String,
        name: String,
        avatar: String,
    },
    Message {
        #[serde(skip_serializing_if = "Option::is_none")]
        key: Option<usize>,
        forward: bool,
        children: Vec<ChatNode>,
    },
}

impl ChatNode {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn to_plain_text(&self) -> String {
        match self {
            Self::Text { text } => text.clone(),
            Self::Break => "\n".to_string(),
            Self::Author { id, name, .. } => format!("{name} ({id}):\n"),
            Self::Message {
                forward: true,
                children,
                ..
            } => children
                .iter()
                .map(ChatNode::to_plain_text)
                .collect::<Vec<_>>()
                .join("\n\n"),
            Self::Message { children, .. } => {
                children.iter().map(ChatNode::to_plain_text).collect()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub id: String,
    pub name: String,
}

impl Sender {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

pub fn avatar_url(id: &str) -> String {
    format!("https://q1.qlogo.cn/g?b=qq&nk={id}&s=640")
}

/// Line breaks become explicit `Break` nodes between the text parts.
pub fn content_nodes(content: &str) -> Vec<ChatNode> {
    let mut nodes = Vec::new();
    for (idx, part) in content.split('\n').enumerate() {
        if idx > 0 {
            nodes.push(ChatNode::Break);
        }
        nodes.push(ChatNode::text(part));
    }
    nodes
}

pub fn render_forward_message(sections: &[Section], author: &Sender) -> ChatNode {
    let children = sections
        .iter()
        .enumerate()
        .map(|(idx, section)| {
            let mut children = vec![ChatNode::Author {
                id: author.id.clone(),
                name: author.name.clone(),
                avatar: avatar_url(&author.id),
            }];
            children.extend(content_nodes(&section.content));
            ChatNode::Message {
                key: Some(idx),
                forward: false,
                children,
            }
        })
        .collect();
    ChatNode::Message {
        key: None,
        forward: true,
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::extract_sections;

    #[test]
    fn content_lines_are_joined_by_break_nodes() {
        assert_eq!(
            content_nodes("a\nb"),
            vec![ChatNode::text("a"), ChatNode::Break, ChatNode::text("b")]
        );
        assert_eq!(content_nodes("single"), vec![ChatNode::text("single")]);
    }

    #[test]
    fn forward_message_has_one_node_per_section() {
        let sections = extract_sections("boot\n🎯 执行动作:\ntap");
        let sender = Sender::new("10001", "owner");
        let forward = render_forward_message(&sections, &sender);

        let ChatNode::Message {
            forward: true,
            children,
            ..
        } = &forward
        else {
            panic!("expected forward message");
        };
        assert_eq!(children.len(), 2);
        let ChatNode::Message { key, children, .. } = &children[1] else {
            panic!("expected section message");
        };
        assert_eq!(*key, Some(1));
        assert_eq!(
            children[0],
            ChatNode::Author {
                id: "10001".to_string(),
                name: "owner".to_string(),
                avatar: "https://q1.qlogo.cn/g?b=qq&nk=10001&s=640".to_string(),
            }
        );
        assert_eq!(children[1], ChatNode::text("🎯 执行动作:"));
        assert_eq!(children[2], ChatNode::Break);
        assert_eq!(children[3], ChatNode::text("tap"));
    }

    #[test]
    fn json_shape_is_tagged() {
        let node = render_forward_message(&extract_sections("hi"), &Sender::new("1", "n"));
        let value = serde_json::to_value(&node).expect("json");
        assert_eq!(value["type"], "message");
        assert_eq!(value["forward"], true);
        assert!(value.get("key").is_none());
        assert_eq!(value["children"][0]["key"], 0);
        assert_eq!(value["children"][0]["children"][0]["type"], "author");
        assert_eq!(value["children"][0]["children"][1]["text"], "hi");
    }

    #[test]
    fn plain_text_rendering_restores_line_breaks() {
        let node = render_forward_message(
            &extract_sections("💭 思考过程:\nfirst\nsecond"),
            &Sender::new("1", "owner"),
        );
        assert_eq!(
            node.to_plain_text(),
            "owner (1):\n💭 思考过程:\nfirst\nsecond"
        );
    }
}
