//! Document node representation
//!
//! Uses NodeId (u32) for compact, cache-friendly node references.

/// Compact node identifier (index into arena)
pub type NodeId = u32;

/// Type of document node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Document root
    Document,
    /// Element node
    Element,
    /// Text content
    Text,
    /// Comment
    Comment,
}

/// A node in the document arena
#[derive(Debug, Clone)]
pub struct Node {
    /// Type of this node
    pub kind: NodeKind,
    /// Parent node (None for the document root and detached nodes)
    pub parent: Option<NodeId>,
    /// First child node
    pub first_child: Option<NodeId>,
    /// Last child node
    pub last_child: Option<NodeId>,
    /// Previous sibling
    pub prev_sibling: Option<NodeId>,
    /// Next sibling
    pub next_sibling: Option<NodeId>,
    /// Index into the name pool for the tag name (elements only), or 0
    pub name_id: u32,
    /// Character data for text and comment nodes
    pub data: String,
    /// Element attributes in source order
    pub attributes: Vec<Attribute>,
}

impl Node {
    fn with_kind(kind: NodeKind, name_id: u32, data: String) -> Self {
        Node {
            kind,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            name_id,
            data,
            attributes: Vec::new(),
        }
    }

    /// Create a new document root node
    pub fn document() -> Self {
        Self::with_kind(NodeKind::Document, 0, String::new())
    }

    /// Create a new (detached) element node
    pub fn element(name_id: u32) -> Self {
        Self::with_kind(NodeKind::Element, name_id, String::new())
    }

    /// Create a new (detached) text node
    pub fn text(data: impl Into<String>) -> Self {
        Self::with_kind(NodeKind::Text, 0, data.into())
    }

    /// Create a new (detached) comment node
    pub fn comment(data: impl Into<String>) -> Self {
        Self::with_kind(NodeKind::Comment, 0, data.into())
    }

    #[inline]
    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        self.kind == NodeKind::Text
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        self.first_child.is_some()
    }
}

/// Stored attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Index into the name pool for the attribute name
    pub name_id: u32,
    /// Decoded attribute value
    pub value: String,
}

impl Attribute {
    pub fn new(name_id: u32, value: impl Into<String>) -> Self {
        Attribute {
            name_id,
            value: value.into(),
        }
    }
}
