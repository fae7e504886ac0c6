//! Allowed-element policy and insertable block descriptors

use serde::{Deserialize, Serialize};

/// Root tag wrapping every puzzle description document
pub const CONTAINER_TAG: &str = "article";

/// Tags permitted in a puzzle description, in policy order
pub const ALLOWED_ELEMENTS: &[&str] = &[
    CONTAINER_TAG,
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "p",
    "span",
    "div",
    "code",
    "pre",
    "br",
];

/// Heading tags that receive the heading marker
pub const HEADING_TAGS: &[&str] = &["h2", "h3", "h4", "h5", "h6"];

/// The allowed element set as owned, lower-cased tag names
pub fn allowed_elements() -> Vec<String> {
    ALLOWED_ELEMENTS.iter().map(|tag| tag.to_string()).collect()
}

/// Check a tag name against the allowed set (case-insensitive)
pub fn is_allowed(tag: &str) -> bool {
    ALLOWED_ELEMENTS
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(tag))
}

pub fn is_heading(tag: &str) -> bool {
    HEADING_TAGS.contains(&tag)
}

/// An insertable block kind exposed on the authoring toolbar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDescriptor {
    pub tag: String,
    pub label: String,
}

impl BlockDescriptor {
    fn new(tag: &str, label: &str) -> Self {
        Self {
            tag: tag.to_string(),
            label: label.to_string(),
        }
    }

    /// Placeholder text given to a freshly inserted block
    pub fn placeholder(&self) -> String {
        placeholder_for(&self.tag)
    }
}

/// Toolbar block descriptors: one per heading level, paragraph, code
pub fn block_elements() -> Vec<BlockDescriptor> {
    vec![
        BlockDescriptor::new("h2", "Heading 2"),
        BlockDescriptor::new("h3", "Heading 3"),
        BlockDescriptor::new("h4", "Heading 4"),
        BlockDescriptor::new("h5", "Heading 5"),
        BlockDescriptor::new("h6", "Heading 6"),
        BlockDescriptor::new("p", "Paragraph"),
        BlockDescriptor::new("code", "Code Block"),
    ]
}

/// Look up the descriptor for a block tag
pub fn block_descriptor(tag: &str) -> Option<BlockDescriptor> {
    block_elements().into_iter().find(|block| block.tag == tag)
}

/// Placeholder text for a newly inserted element of kind `tag`
pub fn placeholder_for(tag: &str) -> String {
    match tag {
        "code" => "// Your code here".to_string(),
        "p" => "New paragraph".to_string(),
        other => format!("New {} heading", other),
    }
}
