//! Conversion between canonical HTML and the annotated rich-text form

use crate::annotator::{annotate, deannotate};
use crate::normalizer::{to_canonical_form, to_editable_form};

/// Canonical (or hand-written) HTML to the annotated editing form
pub fn to_rich_text(canonical_html: &str) -> String {
    annotate(&to_editable_form(canonical_html))
}

/// Annotated editing form back to marker-free, container-wrapped HTML
pub fn to_canonical_html(rich_text: &str) -> String {
    to_canonical_form(&deannotate(rich_text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{self, HtmlDocument};
    use crate::normalizer::ensure_container;
    use proptest::prelude::*;

    /// Tag and text of every element under `body`, in document order
    fn structure(html: &str) -> Vec<(String, String)> {
        let document = HtmlDocument::parse(html);
        dom::descendant_elements(&document.body())
            .iter()
            .map(|el| {
                (
                    dom::tag_name(el).unwrap_or_default().to_string(),
                    dom::text_content(el),
                )
            })
            .collect()
    }

    #[test]
    fn test_to_rich_text_annotates_and_wraps() {
        assert_eq!(
            to_rich_text("<p>hi</p>"),
            "<article><p class=\"editor-paragraph\">hi</p></article>"
        );
        assert_eq!(
            to_rich_text(""),
            "<article><p class=\"editor-paragraph\"></p></article>"
        );
    }

    #[test]
    fn test_to_canonical_html_strips_markers() {
        let rich = "<article><h2 class=\"editor-heading\">T</h2><code class=\"editor-code-block\">x</code></article>";
        assert_eq!(
            to_canonical_html(rich),
            "<article><h2>T</h2><code>x</code></article>"
        );
    }

    #[test]
    fn test_to_canonical_html_wraps_bare_content() {
        assert_eq!(to_canonical_html("<p>a</p>"), "<article><p>a</p></article>");
    }

    #[test]
    fn test_round_trip_seed_template() {
        let seed = crate::normalizer::seed_template();
        assert_eq!(to_canonical_html(&to_rich_text(&seed)), seed);
    }

    fn block() -> impl Strategy<Value = String> {
        let tag = prop::sample::select(vec!["h2", "h3", "h4", "h5", "h6", "p", "code"]);
        (tag, "[a-zA-Z0-9 ]{0,16}")
            .prop_map(|(tag, text)| format!("<{tag}>{text}</{tag}>", tag = tag, text = text))
    }

    fn canonical_document() -> impl Strategy<Value = String> {
        prop::collection::vec(block(), 0..6).prop_map(|blocks| format!("<article>{}</article>", blocks.concat()))
    }

    proptest! {
        #[test]
        fn prop_ensure_container_idempotent(body in "[a-z <>/]{1,40}") {
            let once = ensure_container(&body);
            prop_assert_eq!(ensure_container(&once), once);
        }

        #[test]
        fn prop_round_trip_preserves_structure(doc in canonical_document()) {
            let back = to_canonical_html(&to_rich_text(&doc));
            prop_assert_eq!(structure(&back), structure(&doc));
            prop_assert!(!back.contains("class="));
        }

        #[test]
        fn prop_round_trip_is_exact_for_plain_blocks(doc in canonical_document()) {
            prop_assert_eq!(to_canonical_html(&to_rich_text(&doc)), doc);
        }
    }
}
