//! Presentation markers for the rich-text editing surface

use crate::dom::{self, HtmlDocument};
use crate::policy::HEADING_TAGS;

pub const CODE_BLOCK_MARKER: &str = "editor-code-block";
pub const HEADING_MARKER: &str = "editor-heading";
pub const PARAGRAPH_MARKER: &str = "editor-paragraph";

/// Marker class token for an element kind, if it has one
pub fn marker_for(tag: &str) -> Option<&'static str> {
    match tag {
        "code" => Some(CODE_BLOCK_MARKER),
        "p" => Some(PARAGRAPH_MARKER),
        tag if HEADING_TAGS.contains(&tag) => Some(HEADING_MARKER),
        _ => None,
    }
}

/// Add markers to every code, heading and paragraph element.
///
/// Returns the serialized body children; anything the parser synthesized in
/// `head` is discarded. Other attributes pass through untouched.
pub fn annotate(html: &str) -> String {
    let document = HtmlDocument::parse(html);
    let body = document.body();

    for element in dom::descendant_elements(&body) {
        if let Some(marker) = dom::tag_name(&element).and_then(marker_for) {
            dom::add_class(&element, marker);
        }
    }

    document.body_html()
}

/// Strip the `class` attribute from every element.
///
/// This is a blanket strip: author-supplied classes go too.
pub fn deannotate(html: &str) -> String {
    let document = HtmlDocument::parse(html);
    let body = document.body();

    let stripped = dom::descendant_elements(&body)
        .iter()
        .filter(|element| dom::remove_attribute(element, "class"))
        .count();
    if stripped > 0 {
        tracing::debug!("Removed class attribute from {} element(s)", stripped);
    }

    document.body_html()
}
