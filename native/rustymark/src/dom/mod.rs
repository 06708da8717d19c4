//! DOM Module - Arena-based markup document
//!
//! Implements a mutable DOM representation using:
//! - Arena allocation for nodes
//! - NodeId (u32) indices for cache-friendly traversal
//! - Interned tag and attribute names
//! - A lenient markup reader and writer

pub mod document;
pub mod markup;
pub mod names;
pub mod node;
pub mod serialize;

pub use document::Document;
pub use names::NamePool;
pub use node::{Attribute, Node, NodeId, NodeKind};

/// Tree access used by the highlighter.
///
/// This is the narrow "walk text leaves, replace a leaf with a fragment"
/// surface. [`Document`] implements it; any other tree (a live browser DOM
/// behind FFI, a test fixture) can too. The trait is object safe so that
/// geometry providers can take `&dyn TextTree`.
pub trait TextTree {
    /// Whether `id` exists and is an element
    fn is_element(&self, id: NodeId) -> bool;

    /// Whether `id` is `root` or an attached descendant of it
    fn contains(&self, root: NodeId, id: NodeId) -> bool;

    /// Parent of a node, None for roots and detached nodes
    fn parent(&self, id: NodeId) -> Option<NodeId>;

    /// Children in order - returns collected Vec for trait object compatibility
    fn children_vec(&self, id: NodeId) -> Vec<NodeId>;

    /// Tag name of an element
    fn tag_name(&self, id: NodeId) -> Option<&str>;

    /// Character data of a text node
    fn text(&self, id: NodeId) -> Option<&str>;

    /// Concatenated text of all descendant text nodes
    fn text_content(&self, id: NodeId) -> String;

    fn has_class(&self, id: NodeId, class: &str) -> bool;

    fn add_class(&mut self, id: NodeId, class: &str);

    fn remove_class(&mut self, id: NodeId, class: &str);

    /// Create a detached `<tag class="class">text</tag>`
    fn create_element(&mut self, tag: &str, class: &str, text: &str) -> NodeId;

    /// Create a detached text node
    fn create_text(&mut self, text: &str) -> NodeId;

    /// Replace `old` with the given nodes, in order. `old` ends up detached.
    fn replace_with(&mut self, old: NodeId, fragment: &[NodeId]);

    /// Merge adjacent text nodes and drop empty ones below `id`
    fn normalize(&mut self, id: NodeId);

    /// Descendant elements of `root` with the given tag and class, in document order
    fn query_elements(&self, root: NodeId, tag: &str, class: &str) -> Vec<NodeId>;

    /// Descendant text nodes of `root`, in document order
    fn text_leaves(&self, root: NodeId) -> Vec<NodeId>;
}

impl<T: TextTree + ?Sized> TextTree for &mut T {
    fn is_element(&self, id: NodeId) -> bool {
        (**self).is_element(id)
    }

    fn contains(&self, root: NodeId, id: NodeId) -> bool {
        (**self).contains(root, id)
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        (**self).parent(id)
    }

    fn children_vec(&self, id: NodeId) -> Vec<NodeId> {
        (**self).children_vec(id)
    }

    fn tag_name(&self, id: NodeId) -> Option<&str> {
        (**self).tag_name(id)
    }

    fn text(&self, id: NodeId) -> Option<&str> {
        (**self).text(id)
    }

    fn text_content(&self, id: NodeId) -> String {
        (**self).text_content(id)
    }

    fn has_class(&self, id: NodeId, class: &str) -> bool {
        (**self).has_class(id, class)
    }

    fn add_class(&mut self, id: NodeId, class: &str) {
        (**self).add_class(id, class)
    }

    fn remove_class(&mut self, id: NodeId, class: &str) {
        (**self).remove_class(id, class)
    }

    fn create_element(&mut self, tag: &str, class: &str, text: &str) -> NodeId {
        (**self).create_element(tag, class, text)
    }

    fn create_text(&mut self, text: &str) -> NodeId {
        (**self).create_text(text)
    }

    fn replace_with(&mut self, old: NodeId, fragment: &[NodeId]) {
        (**self).replace_with(old, fragment)
    }

    fn normalize(&mut self, id: NodeId) {
        (**self).normalize(id)
    }

    fn query_elements(&self, root: NodeId, tag: &str, class: &str) -> Vec<NodeId> {
        (**self).query_elements(root, tag, class)
    }

    fn text_leaves(&self, root: NodeId) -> Vec<NodeId> {
        (**self).text_leaves(root)
    }
}
