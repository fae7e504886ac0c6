//! Mutable HTML tree primitives
//!
//! Thin helpers over `markup5ever_rcdom` giving the authoring core what a
//! browser DOM would: tolerant parse-from-string, serialize-to-string,
//! query-by-tag, detach-subtree, attribute and text manipulation.
//!
//! Every parse creates its own tree which is dropped at the end of the call
//! that created it. `rcdom` empties the children of every node still attached
//! to a tree when that tree is dropped, so a node that must outlive its
//! document has to be detached (or moved with [`move_children`]) first.

use std::cell::RefCell;
use std::rc::Rc;

use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{parse_document, Attribute, LocalName, Namespace, QualName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// A parsed HTML document owning its tree
pub struct HtmlDocument {
    dom: RcDom,
}

impl HtmlDocument {
    /// Parse `html` as a full document. Never fails: tag soup produces a
    /// best-effort tree with synthesized `html`/`head`/`body` elements.
    pub fn parse(html: &str) -> Self {
        let dom = parse_document(RcDom::default(), Default::default()).one(html);
        Self { dom }
    }

    /// The document node
    pub fn document(&self) -> Handle {
        self.dom.document.clone()
    }

    /// The `body` element, or the document node if the parser produced none
    pub fn body(&self) -> Handle {
        find_first(&self.dom.document, |node| tag_name(node) == Some("body"))
            .unwrap_or_else(|| self.dom.document.clone())
    }

    /// Serialized children of `body`
    pub fn body_html(&self) -> String {
        inner_html(&self.body())
    }
}

/// Create a detached HTML element
pub fn create_element(tag: &str) -> Handle {
    Node::new(NodeData::Element {
        name: QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from(tag)),
        attrs: RefCell::new(Vec::new()),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}

/// Create a detached text node
pub fn create_text(text: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(StrTendril::from(text)),
    })
}

/// Lower-cased local tag name of an element node
pub fn tag_name(node: &Node) -> Option<&str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

pub fn is_element(node: &Node) -> bool {
    matches!(node.data, NodeData::Element { .. })
}

pub fn is_text(node: &Node) -> bool {
    matches!(node.data, NodeData::Text { .. })
}

/// Contents of a text node
pub fn text_of(node: &Node) -> Option<String> {
    match &node.data {
        NodeData::Text { contents } => Some(contents.borrow().to_string()),
        _ => None,
    }
}

/// Replace the contents of a text node. No-op on other node kinds.
pub fn set_text(node: &Node, text: &str) {
    if let NodeData::Text { contents } = &node.data {
        *contents.borrow_mut() = StrTendril::from(text);
    }
}

/// Concatenated text of all descendant text nodes
pub fn text_content(node: &Handle) -> String {
    let mut out = String::new();
    collect_text(node, &mut out);
    out
}

fn collect_text(node: &Handle, out: &mut String) {
    if let NodeData::Text { contents } = &node.data {
        out.push_str(&contents.borrow());
    }
    for child in node.children.borrow().iter() {
        collect_text(child, out);
    }
}

/// Replace all children of `node` with a single text node (none if `text` is empty)
pub fn set_text_content(node: &Handle, text: &str) {
    clear_children(node);
    if !text.is_empty() {
        append_child(node, create_text(text));
    }
}

/// Parent of a node, if it is attached
pub fn parent_of(node: &Handle) -> Option<Handle> {
    let weak = node.parent.take();
    let parent = weak.as_ref().and_then(|w| w.upgrade());
    node.parent.set(weak);
    parent
}

/// Position of a node among its parent's children
pub fn index_in_parent(node: &Handle) -> Option<usize> {
    let parent = parent_of(node)?;
    let children = parent.children.borrow();
    children.iter().position(|child| Rc::ptr_eq(child, node))
}

/// Detach a node (and therefore its subtree) from its parent.
///
/// Safe to call on nodes that are already detached.
pub fn detach(node: &Handle) {
    if let Some(parent) = parent_of(node) {
        parent
            .children
            .borrow_mut()
            .retain(|child| !Rc::ptr_eq(child, node));
    }
    node.parent.set(None);
}

/// Append `child` as the last child of `parent`, detaching it first
pub fn append_child(parent: &Handle, child: Handle) {
    detach(&child);
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

/// Insert `child` at `index` among `parent`'s children (clamped to the end)
pub fn insert_child(parent: &Handle, index: usize, child: Handle) {
    detach(&child);
    child.parent.set(Some(Rc::downgrade(parent)));
    let mut children = parent.children.borrow_mut();
    let index = index.min(children.len());
    children.insert(index, child);
}

/// Detach every child of `node`
pub fn clear_children(node: &Handle) {
    let children = std::mem::take(&mut *node.children.borrow_mut());
    for child in &children {
        child.parent.set(None);
    }
}

/// Move every child of `from` to the end of `to`, preserving order
pub fn move_children(from: &Handle, to: &Handle) {
    let children = std::mem::take(&mut *from.children.borrow_mut());
    for child in children {
        child.parent.set(Some(Rc::downgrade(to)));
        to.children.borrow_mut().push(child);
    }
}

/// Replace the children of `target` with the parse of `html` (like assigning `innerHTML`)
pub fn set_inner_html(target: &Handle, html: &str) {
    clear_children(target);
    let document = HtmlDocument::parse(html);
    move_children(&document.body(), target);
}

/// All descendant elements of `root` in document order, excluding `root`
pub fn descendant_elements(root: &Handle) -> Vec<Handle> {
    let mut out = Vec::new();
    collect_elements(root, &mut out);
    out
}

fn collect_elements(node: &Handle, out: &mut Vec<Handle>) {
    for child in node.children.borrow().iter() {
        if is_element(child) {
            out.push(child.clone());
        }
        collect_elements(child, out);
    }
}

/// Descendant elements whose tag is one of `tags`, in document order
pub fn elements_by_tag(root: &Handle, tags: &[&str]) -> Vec<Handle> {
    descendant_elements(root)
        .into_iter()
        .filter(|el| tag_name(el).is_some_and(|tag| tags.contains(&tag)))
        .collect()
}

/// First descendant (pre-order, excluding `root`) matching `predicate`
pub fn find_first<F>(root: &Handle, predicate: F) -> Option<Handle>
where
    F: Fn(&Node) -> bool,
{
    find_first_inner(root, &predicate)
}

fn find_first_inner<F>(node: &Handle, predicate: &F) -> Option<Handle>
where
    F: Fn(&Node) -> bool,
{
    for child in node.children.borrow().iter() {
        if predicate(child) {
            return Some(child.clone());
        }
        if let Some(found) = find_first_inner(child, predicate) {
            return Some(found);
        }
    }
    None
}

pub fn get_attribute(node: &Node, name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| attr.name.local.as_ref() == name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

pub fn set_attribute(node: &Node, name: &str, value: &str) {
    if let NodeData::Element { attrs, .. } = &node.data {
        let mut attrs = attrs.borrow_mut();
        if let Some(attr) = attrs.iter_mut().find(|attr| attr.name.local.as_ref() == name) {
            attr.value = StrTendril::from(value);
        } else {
            attrs.push(Attribute {
                name: QualName::new(None, Namespace::from(""), LocalName::from(name)),
                value: StrTendril::from(value),
            });
        }
    }
}

/// Remove an attribute, returning whether it was present
pub fn remove_attribute(node: &Node, name: &str) -> bool {
    match &node.data {
        NodeData::Element { attrs, .. } => {
            let mut attrs = attrs.borrow_mut();
            let before = attrs.len();
            attrs.retain(|attr| attr.name.local.as_ref() != name);
            attrs.len() != before
        }
        _ => false,
    }
}

/// Add a token to the `class` attribute unless already present
pub fn add_class(node: &Node, token: &str) {
    if !is_element(node) {
        return;
    }
    match get_attribute(node, "class") {
        Some(existing) if existing.split_whitespace().any(|t| t == token) => {}
        Some(existing) if !existing.trim().is_empty() => {
            set_attribute(node, "class", &format!("{} {}", existing.trim(), token));
        }
        _ => set_attribute(node, "class", token),
    }
}

pub fn has_class(node: &Node, token: &str) -> bool {
    get_attribute(node, "class")
        .map(|classes| classes.split_whitespace().any(|t| t == token))
        .unwrap_or(false)
}

/// Serialize the children of `node` (like reading `innerHTML`)
pub fn inner_html(node: &Handle) -> String {
    serialize_with_scope(node, TraversalScope::ChildrenOnly(None))
}

/// Serialize `node` including its own tags (like reading `outerHTML`)
pub fn outer_html(node: &Handle) -> String {
    if matches!(node.data, NodeData::Document) {
        return inner_html(node);
    }
    serialize_with_scope(node, TraversalScope::IncludeNode)
}

fn serialize_with_scope(node: &Handle, traversal_scope: TraversalScope) -> String {
    let mut buf = Vec::new();
    let handle = SerializableHandle::from(node.clone());
    let opts = SerializeOpts {
        traversal_scope,
        ..Default::default()
    };
    if let Err(e) = serialize(&mut buf, &handle, opts) {
        tracing::warn!("HTML serialization stopped early: {}", e);
    }
    String::from_utf8_lossy(&buf).into_owned()
}
