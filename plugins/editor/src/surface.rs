//! Interactive rich-text editing surface
//!
//! One mutable region (a detached `div`) holding the annotated document,
//! plus an optional caret. The surface never normalizes what it holds:
//! every mutating call hands the region's markup back to the caller
//! unchanged, and normalization happens at mode toggles and exports.

use std::rc::Rc;

use forge_core::annotator::marker_for;
use forge_core::dom;
use forge_core::normalizer::seed_template;
use forge_core::policy::{block_descriptor, CONTAINER_TAG};
use markup5ever_rcdom::Handle;

use crate::keyboard::{Key, KeyOutcome};
use crate::{byte_offset, EditorError};

/// Caret position: an anchor node and an offset into it.
///
/// For a text node the offset counts characters; for an element it is a
/// child index, as with a DOM range boundary.
#[derive(Clone)]
pub struct Caret {
    pub node: Handle,
    pub offset: usize,
}

impl Caret {
    pub fn new(node: Handle, offset: usize) -> Self {
        Self { node, offset }
    }
}

pub struct EditingSurface {
    region: Handle,
    caret: Option<Caret>,
    tab_text: String,
}

impl EditingSurface {
    pub fn new() -> Self {
        Self::with_tab_text("\t")
    }

    /// Surface whose Tab key inserts `tab_text`
    pub fn with_tab_text(tab_text: &str) -> Self {
        Self {
            region: dom::create_element("div"),
            caret: None,
            tab_text: tab_text.to_string(),
        }
    }

    /// Root of the editable region
    pub fn region(&self) -> &Handle {
        &self.region
    }

    /// Current live markup of the region
    pub fn markup(&self) -> String {
        dom::inner_html(&self.region)
    }

    /// Replace the region's content with `annotated`, unless it already
    /// renders to exactly that. Returns whether the region was replaced.
    ///
    /// Replacing drops the caret: its anchor is no longer in the region.
    pub fn load(&mut self, annotated: &str) -> bool {
        if self.markup() == annotated {
            return false;
        }
        dom::set_inner_html(&self.region, annotated);
        self.caret = None;
        true
    }

    /// A mutation happened in the region; the edit event carries the markup as-is
    pub fn on_input(&self) -> String {
        self.markup()
    }

    pub fn caret(&self) -> Option<&Caret> {
        self.caret.as_ref()
    }

    pub fn set_caret(&mut self, node: Handle, offset: usize) {
        self.caret = Some(Caret::new(node, offset));
    }

    /// Put the caret inside the first text node containing `needle`, at `offset`
    pub fn place_caret_in_text(&mut self, needle: &str, offset: usize) -> bool {
        let found = dom::find_first(&self.region, |node| {
            dom::text_of(node).is_some_and(|text| text.contains(needle))
        });
        match found {
            Some(node) => {
                self.set_caret(node, offset);
                true
            }
            None => false,
        }
    }

    pub fn clear_selection(&mut self) {
        self.caret = None;
    }

    /// Move the caret to the end of the document: the end of the last
    /// container element when there is one, otherwise the end of the region.
    pub fn collapse_to_end(&mut self) {
        self.caret = Some(self.end_position());
    }

    fn end_position(&self) -> Caret {
        let node = dom::elements_by_tag(&self.region, &[CONTAINER_TAG])
            .pop()
            .unwrap_or_else(|| self.region.clone());
        let offset = node.children.borrow().len();
        Caret::new(node, offset)
    }

    /// Insert a toolbar block of kind `tag` at the caret.
    ///
    /// Without a caret this is a no-op returning `Ok(None)`. A caret that is
    /// not inside a text node is first collapsed to the end of the document.
    /// The new element carries its placeholder text and rich-text marker, and
    /// the caret ends up right after it.
    pub fn insert_block(&mut self, tag: &str) -> Result<Option<String>, EditorError> {
        let block =
            block_descriptor(tag).ok_or_else(|| EditorError::UnknownBlock(tag.to_string()))?;

        let Some(caret) = self.caret.clone() else {
            tracing::debug!("No selection, ignoring insertion of <{}>", block.tag);
            return Ok(None);
        };

        let caret = if dom::is_text(&caret.node) {
            caret
        } else {
            self.collapse_to_end();
            self.end_position()
        };

        let (parent, index) = match self.insertion_point(&caret) {
            Some(point) => point,
            None => {
                let end = self.end_position();
                (end.node, end.offset)
            }
        };

        let element = dom::create_element(&block.tag);
        dom::set_text_content(&element, &block.placeholder());
        if let Some(marker) = marker_for(&block.tag) {
            dom::add_class(&element, marker);
        }
        dom::insert_child(&parent, index, element);

        let after = (index + 1).min(parent.children.borrow().len());
        self.caret = Some(Caret::new(parent, after));

        tracing::debug!("Inserted <{}> block", block.tag);
        Ok(Some(self.markup()))
    }

    /// Resolve a caret to `(parent, child index)`, splitting a text anchor
    fn insertion_point(&self, caret: &Caret) -> Option<(Handle, usize)> {
        if !dom::is_text(&caret.node) {
            let len = caret.node.children.borrow().len();
            return Some((caret.node.clone(), caret.offset.min(len)));
        }

        let parent = dom::parent_of(&caret.node)?;
        let index = dom::index_in_parent(&caret.node)?;
        let text = dom::text_of(&caret.node)?;
        let len = text.chars().count();

        if caret.offset == 0 {
            return Some((parent, index));
        }
        if caret.offset >= len {
            return Some((parent, index + 1));
        }

        let split = byte_offset(&text, caret.offset);
        dom::set_text(&caret.node, &text[..split]);
        dom::insert_child(&parent, index + 1, dom::create_text(&text[split..]));
        Some((parent, index + 1))
    }

    /// Insert `text` at the caret. No-op without a caret.
    pub fn insert_text(&mut self, text: &str) -> Option<String> {
        let caret = self.caret.clone()?;

        if let Some(existing) = dom::text_of(&caret.node) {
            let split = byte_offset(&existing, caret.offset);
            let updated = format!("{}{}{}", &existing[..split], text, &existing[split..]);
            dom::set_text(&caret.node, &updated);
            let offset = existing[..split].chars().count() + text.chars().count();
            self.caret = Some(Caret::new(caret.node, offset));
        } else {
            let node = dom::create_text(text);
            let index = caret.offset.min(caret.node.children.borrow().len());
            dom::insert_child(&caret.node, index, Rc::clone(&node));
            self.caret = Some(Caret::new(node, text.chars().count()));
        }

        Some(self.markup())
    }

    /// Tab inserts the tab text and suppresses focus navigation; other
    /// keys are left to the host.
    pub fn handle_key(&mut self, key: &Key) -> KeyOutcome {
        match key {
            Key::Tab => {
                let tab = self.tab_text.clone();
                KeyOutcome::handled(self.insert_text(&tab))
            }
            _ => KeyOutcome::ignored(),
        }
    }

    /// Focus left the region. An empty region is re-seeded with the seed
    /// template, and the new markup is returned as an edit.
    pub fn blur(&mut self) -> Option<String> {
        if !self.markup().trim().is_empty() {
            return None;
        }
        dom::set_inner_html(&self.region, &seed_template());
        self.caret = None;
        tracing::debug!("Editing surface was empty on blur, re-seeded");
        Some(self.markup())
    }

    /// Remove everything from the region (select-all + delete)
    pub fn clear(&mut self) -> String {
        dom::clear_children(&self.region);
        self.caret = Some(Caret::new(self.region.clone(), 0));
        self.markup()
    }
}

impl Default for EditingSurface {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_core::to_rich_text;

    fn loaded(html: &str) -> EditingSurface {
        let mut surface = EditingSurface::new();
        surface.load(&to_rich_text(html));
        surface
    }

    fn count_tag(surface: &EditingSurface, tag: &str) -> usize {
        dom::elements_by_tag(surface.region(), &[tag]).len()
    }

    #[test]
    fn test_load_only_when_different() {
        let mut surface = EditingSurface::new();
        let rich = to_rich_text("<p>hi</p>");
        assert!(surface.load(&rich));
        assert_eq!(surface.markup(), rich);

        surface.place_caret_in_text("hi", 1);
        assert!(!surface.load(&rich));
        assert!(surface.caret().is_some());

        assert!(surface.load("<article><p>other</p></article>"));
        assert!(surface.caret().is_none());
    }

    #[test]
    fn test_on_input_is_unnormalized() {
        let mut surface = EditingSurface::new();
        surface.load("<p>loose</p>");
        assert_eq!(surface.on_input(), "<p>loose</p>");
    }

    #[test]
    fn test_insert_block_without_selection_is_noop() {
        let mut surface = loaded("<p>hi</p>");
        let before = surface.markup();
        assert_eq!(surface.insert_block("p").unwrap(), None);
        assert_eq!(surface.markup(), before);
    }

    #[test]
    fn test_insert_block_unknown_tag() {
        let mut surface = loaded("<p>hi</p>");
        surface.collapse_to_end();
        assert!(matches!(
            surface.insert_block("script"),
            Err(EditorError::UnknownBlock(_))
        ));
    }

    #[test]
    fn test_insert_block_splits_text() {
        let mut surface = loaded("<p>hello</p>");
        assert!(surface.place_caret_in_text("hello", 2));

        let markup = surface.insert_block("code").unwrap().unwrap();
        assert_eq!(
            markup,
            "<article><p class=\"editor-paragraph\">he\
             <code class=\"editor-code-block\">// Your code here</code>llo</p></article>"
        );

        let caret = surface.caret().unwrap();
        assert_eq!(dom::tag_name(&caret.node), Some("p"));
        assert_eq!(caret.offset, 2);
    }

    #[test]
    fn test_insert_block_at_text_end() {
        let mut surface = loaded("<p>hi</p>");
        surface.place_caret_in_text("hi", 2);
        let markup = surface.insert_block("h3").unwrap().unwrap();
        assert!(markup.contains("hi<h3 class=\"editor-heading\">New h3 heading</h3></p>"));
    }

    #[test]
    fn test_insert_block_outside_text_collapses_to_end() {
        let mut surface = loaded("<h2>Title</h2><p>body</p>");
        let region = surface.region().clone();
        surface.set_caret(region, 0);

        let before = count_tag(&surface, "p");
        let markup = surface.insert_block("p").unwrap().unwrap();
        assert_eq!(count_tag(&surface, "p"), before + 1);
        assert!(markup.ends_with("<p class=\"editor-paragraph\">New paragraph</p></article>"));

        let caret = surface.caret().unwrap();
        assert_eq!(dom::tag_name(&caret.node), Some("article"));
        assert_eq!(caret.offset, caret.node.children.borrow().len());
    }

    #[test]
    fn test_insert_block_without_container() {
        let mut surface = EditingSurface::new();
        surface.load("<p>bare</p>");
        let region = surface.region().clone();
        surface.set_caret(region, 0);
        surface.insert_block("h2").unwrap();
        assert_eq!(
            surface.markup(),
            "<p>bare</p><h2 class=\"editor-heading\">New h2 heading</h2>"
        );
    }

    #[test]
    fn test_consecutive_inserts_follow_caret() {
        let mut surface = loaded("<p>x</p>");
        surface.collapse_to_end();
        surface.insert_block("h2").unwrap();
        surface.insert_block("p").unwrap();
        assert!(surface
            .markup()
            .ends_with("New h2 heading</h2><p class=\"editor-paragraph\">New paragraph</p></article>"));
    }

    #[test]
    fn test_tab_inserts_literal_tab() {
        let mut surface = loaded("<code>ab</code>");
        surface.place_caret_in_text("ab", 1);

        let outcome = surface.handle_key(&Key::Tab);
        assert!(outcome.prevent_default);
        assert!(outcome.value.unwrap().contains(">a\tb</code>"));
        assert_eq!(surface.caret().unwrap().offset, 2);

        assert!(!surface.handle_key(&Key::Enter).is_handled());
    }

    #[test]
    fn test_tab_without_caret_is_still_intercepted() {
        let mut surface = loaded("<p>x</p>");
        let outcome = surface.handle_key(&Key::Tab);
        assert!(outcome.prevent_default);
        assert!(outcome.value.is_none());
    }

    #[test]
    fn test_insert_text_multibyte() {
        let mut surface = loaded("<p>héllo</p>");
        surface.place_caret_in_text("héllo", 2);
        surface.insert_text("✓");
        assert!(surface.markup().contains(">hé✓llo</p>"));
    }

    #[test]
    fn test_blur_reseeds_empty_region() {
        let mut surface = loaded("<p>x</p>");
        assert_eq!(surface.blur(), None);

        surface.clear();
        assert_eq!(surface.blur(), Some(seed_template()));
        assert_eq!(surface.markup(), seed_template());
    }

    #[test]
    fn test_blur_reseeds_whitespace_region() {
        let mut surface = EditingSurface::new();
        surface.load("  \n ");
        assert_eq!(surface.blur(), Some(seed_template()));
    }
}
