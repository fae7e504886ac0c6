//! HTML normalizer: wraps, unwraps and detects the `article` container

use std::rc::Rc;
use std::sync::LazyLock;

use markup5ever_rcdom::Handle;
use regex::Regex;

use crate::dom::{self, HtmlDocument};
use crate::policy::CONTAINER_TAG;

const CONTAINER_OPEN: &str = "<article";
const CONTAINER_CLOSE: &str = "</article>";

/// Value handed to the editor when there is no content at all
const MINIMAL_SEED: &str = "<article><p></p></article>";

const SEED_TEMPLATE: &str = "<article>
    <h2>HTML Editor</h2>
    <p>Start typing your HTML here...</p>
    <code>
    1
    2
    3
    </code>
</article>";

static COMPLETE_CONTAINER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<article(\s[^>]*)?>.*</article>").expect("container pattern is valid")
});

/// Wrap `html` in the container unless it already starts and ends with it.
///
/// Pure prefix/suffix test on the trimmed input; the input itself is
/// returned untouched when it already qualifies.
pub fn ensure_container(html: &str) -> String {
    let trimmed = html.trim();
    if trimmed.starts_with(CONTAINER_OPEN) && trimmed.ends_with(CONTAINER_CLOSE) {
        return html.to_string();
    }
    format!("<{tag}>{html}</{tag}>", tag = CONTAINER_TAG)
}

/// Canonical form of rich-text content before it is persisted
pub fn to_canonical_form(rich_text: &str) -> String {
    ensure_container(rich_text)
}

/// Produce the container-rooted markup the editing surface works on.
///
/// Empty input yields `<article><p></p></article>`. When the parsed input
/// contains a container, only the first one is kept: sibling content
/// outside it is dropped. Otherwise the whole parsed body is wrapped.
pub fn to_editable_form(html: &str) -> String {
    if html.trim().is_empty() {
        return MINIMAL_SEED.to_string();
    }

    let document = HtmlDocument::parse(html);
    let body = document.body();

    if let Some(container) =
        dom::find_first(&document.document(), |node| dom::tag_name(node) == Some(CONTAINER_TAG))
    {
        if has_content_outside(&body, &container) {
            tracing::warn!("Dropping content outside the first <{}> element", CONTAINER_TAG);
        }
        return dom::outer_html(&container);
    }

    let container = dom::create_element(CONTAINER_TAG);
    dom::move_children(&body, &container);
    dom::outer_html(&container)
}

/// Fixed starter document: one heading, one paragraph, one code block
pub fn seed_template() -> String {
    SEED_TEMPLATE.to_string()
}

/// Minimal seed used for empty input
pub fn minimal_seed() -> String {
    MINIMAL_SEED.to_string()
}

/// Does `html` contain a complete container element (open tag, later close tag)?
///
/// This is the predicate a host polls to enable saving and exporting.
pub fn has_complete_container(html: &str) -> bool {
    COMPLETE_CONTAINER.is_match(html)
}

fn has_content_outside(body: &Handle, container: &Handle) -> bool {
    body.children.borrow().iter().any(|child| {
        if Rc::ptr_eq(child, container) || is_ancestor(child, container) {
            return false;
        }
        match dom::text_of(child) {
            Some(text) => !text.trim().is_empty(),
            None => dom::is_element(child),
        }
    })
}

fn is_ancestor(candidate: &Handle, node: &Handle) -> bool {
    let mut current = dom::parent_of(node);
    while let Some(parent) = current {
        if Rc::ptr_eq(&parent, candidate) {
            return true;
        }
        current = dom::parent_of(&parent);
    }
    false
}
