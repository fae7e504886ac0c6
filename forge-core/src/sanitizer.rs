//! Sanitizing preview renderer
//!
//! Turns arbitrary author HTML into markup that is safe to inject into the
//! preview pane. The passes run in a fixed order:
//!
//! 1. parse into a detached tree
//! 2. remove every element outside the allowed set, subtree included
//! 3. remove every `script` element again, independent of the policy table
//! 4. strip inline `style` attributes (classes survive for preview CSS)
//! 5. re-indent the text of `code` elements by their common leading whitespace
//! 6. serialize

use markup5ever_rcdom::Handle;

use crate::dom::{self, HtmlDocument};
use crate::policy;

/// Class token added to re-indented code elements
pub const PREVIEW_CODE_MARKER: &str = "preview-code-block";

/// Render `html` for the preview pane. Never fails; empty input gives empty output.
pub fn render_preview(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let document = HtmlDocument::parse(html);
    let root = document.body();

    let removed = remove_disallowed(&root);
    let scripts = remove_scripts(&root);
    strip_styles(&root);
    reindent_code_blocks(&root);

    if removed + scripts > 0 {
        tracing::debug!(
            "Preview sanitizer removed {} disallowed element(s) and {} script(s)",
            removed,
            scripts
        );
    }

    dom::inner_html(&root)
}

/// Detach every element whose tag is not allowed.
///
/// Walks a snapshot in reverse document order so removing a node never
/// skips a sibling; nodes already gone with an ancestor are detached again
/// from their (detached) parent, which is harmless.
fn remove_disallowed(root: &Handle) -> usize {
    let mut removed = 0;
    for element in dom::descendant_elements(root).iter().rev() {
        let allowed = dom::tag_name(element).is_some_and(policy::is_allowed);
        if !allowed {
            dom::detach(element);
            removed += 1;
        }
    }
    removed
}

fn remove_scripts(root: &Handle) -> usize {
    let scripts = dom::elements_by_tag(root, &["script"]);
    for script in &scripts {
        dom::detach(script);
    }
    scripts.len()
}

fn strip_styles(root: &Handle) {
    for element in dom::descendant_elements(root) {
        dom::remove_attribute(&element, "style");
    }
}

fn reindent_code_blocks(root: &Handle) {
    for code in dom::elements_by_tag(root, &["code"]) {
        let text = dom::text_content(&code);
        if text.trim().is_empty() {
            continue;
        }
        if let Some(reindented) = reindent(&text) {
            dom::set_text_content(&code, &reindented);
        }
        dom::add_class(&code, PREVIEW_CODE_MARKER);
    }
}

/// Strip the minimum leading-whitespace width of the non-blank lines from
/// every non-blank line. Blank lines are left as they are.
///
/// Returns `None` when every line is blank.
pub fn reindent(text: &str) -> Option<String> {
    let min_indent = text
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(leading_whitespace)
        .min()?;

    let lines: Vec<String> = text
        .split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                line.to_string()
            } else {
                line.chars().skip(min_indent).collect()
            }
        })
        .collect();

    Some(lines.join("\n"))
}

fn leading_whitespace(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_removed_paragraph_kept() {
        let out = render_preview("<article><script>evil()</script><p>ok</p></article>");
        assert!(!out.contains("<script"));
        assert!(!out.contains("evil"));
        assert_eq!(out, "<article><p>ok</p></article>");
    }

    #[test]
    fn test_disallowed_subtree_removed() {
        let out = render_preview("<article><ul><li><p>gone</p></li></ul><p>kept</p></article>");
        assert_eq!(out, "<article><p>kept</p></article>");
    }

    #[test]
    fn test_nested_disallowed_elements() {
        let out = render_preview("<div><b>x<i>y</i></b>z<a href=\"#\">w</a></div>");
        assert_eq!(out, "<div>z</div>");
    }

    #[test]
    fn test_style_stripped_class_kept() {
        let out = render_preview("<p style=\"color:red\" class=\"lead\">x</p>");
        assert_eq!(out, "<p class=\"lead\">x</p>");
    }

    #[test]
    fn test_reindent_strips_common_prefix() {
        assert_eq!(reindent("  a\n    b\n  c").as_deref(), Some("a\n  b\nc"));
    }

    #[test]
    fn test_reindent_ignores_blank_lines() {
        assert_eq!(
            reindent("\n    a\n\n      b\n  ").as_deref(),
            Some("\na\n\n  b\n  ")
        );
        assert_eq!(reindent(" \n\t\n"), None);
    }

    #[test]
    fn test_code_block_reindented_and_marked() {
        let out = render_preview("<code>\n    1\n    2\n</code>");
        assert_eq!(out, "<code class=\"preview-code-block\">\n1\n2\n</code>");
    }

    #[test]
    fn test_blank_code_block_untouched() {
        assert_eq!(render_preview("<code>   </code>"), "<code>   </code>");
    }

    #[test]
    fn test_code_children_flattened_to_text() {
        let out = render_preview("<code>  <span>a</span>\n    b</code>");
        assert_eq!(out, "<code class=\"preview-code-block\">a\n  b</code>");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(render_preview(""), "");
        assert_eq!(render_preview("   "), "");
    }

    #[test]
    fn test_tag_soup_never_panics() {
        for input in ["<", "</p>", "<p><code>", "<script>", "<<>>", "<article"] {
            let _ = render_preview(input);
        }
    }
}
