//! Rich-text article documents.
//!
//! The editor engine lives outside this crate; here the document tree is only
//! carried, inspected for mentions and flattened to plain text. Node types
//! the client does not know are kept verbatim so a round trip never loses
//! content.

use serde::{Deserialize, Serialize};

use crate::core::domain::EntryId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DocKind {
    #[default]
    #[serde(rename = "doc")]
    Doc,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Doc {
    #[serde(rename = "type")]
    pub kind: DocKind,
    #[serde(default)]
    pub content: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Known(KnownNode),
    Other(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum KnownNode {
    Paragraph {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        content: Vec<Node>,
    },
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        marks: Vec<serde_json::Value>,
    },
    Mention {
        attrs: MentionAttrs,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MentionId {
    Number(EntryId),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentionAttrs {
    pub id: MentionId,
    pub label: String,
    #[serde(default = "default_mention_char")]
    pub mention_char: String,
}

fn default_mention_char() -> String {
    "@".to_string()
}

impl MentionAttrs {
    /// The referenced entry, if the id is numeric.
    pub fn entry_id(&self) -> Option<EntryId> {
        match &self.id {
            MentionId::Number(id) => Some(*id),
            MentionId::Text(text) => text.trim().parse().ok(),
        }
    }
}

impl Doc {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a document of plain paragraphs, one per line.
    pub fn from_plain_text(text: &str) -> Self {
        let content = text
            .lines()
            .map(|line| {
                let content = if line.is_empty() {
                    Vec::new()
                } else {
                    vec![Node::Known(KnownNode::Text {
                        text: line.to_string(),
                        marks: Vec::new(),
                    })]
                };
                Node::Known(KnownNode::Paragraph { content })
            })
            .collect();
        Self {
            kind: DocKind::Doc,
            content,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.plain_text().trim().is_empty()
    }

    /// Paragraphs joined by newlines; mentions render as `@label`.
    pub fn plain_text(&self) -> String {
        self.content
            .iter()
            .map(|node| {
                let mut line = String::new();
                node.write_text(&mut line);
                line
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Entries referenced by mentions, in document order without repeats.
    pub fn mentions(&self) -> Vec<EntryId> {
        let mut ids = Vec::new();
        for node in &self.content {
            node.collect_mentions(&mut ids);
        }
        ids
    }
}

impl Node {
    fn write_text(&self, out: &mut String) {
        match self {
            Node::Known(KnownNode::Paragraph { content }) => {
                for child in content {
                    child.write_text(out);
                }
            }
            Node::Known(KnownNode::Text { text, .. }) => out.push_str(text),
            Node::Known(KnownNode::Mention { attrs }) => {
                out.push_str(&attrs.mention_char);
                out.push_str(&attrs.label);
            }
            Node::Other(_) => {}
        }
    }

    fn collect_mentions(&self, ids: &mut Vec<EntryId>) {
        match self {
            Node::Known(KnownNode::Paragraph { content }) => {
                for child in content {
                    child.collect_mentions(ids);
                }
            }
            Node::Known(KnownNode::Mention { attrs }) => {
                if let Some(id) = attrs.entry_id()
                    && !ids.contains(&id)
                {
                    ids.push(id);
                }
            }
            _ => {}
        }
    }
}
