//! Document - Arena-based mutable DOM
//!
//! Nodes live in a single arena and reference each other by NodeId.
//! Detaching a node unlinks it but keeps it in the arena, so ids are
//! never reused and stale handles stay harmless.

use super::names::NamePool;
use super::node::{Attribute, Node, NodeId, NodeKind};
use super::TextTree;

/// The document node always lives at index 0
const DOCUMENT_NODE: NodeId = 0;

/// A mutable markup document stored in arena format
#[derive(Debug)]
pub struct Document {
    /// Arena of nodes
    nodes: Vec<Node>,
    /// Interned tag and attribute names
    pub names: NamePool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document holding only the document node
    pub fn new() -> Self {
        let mut nodes = Vec::with_capacity(256);
        nodes.push(Node::document());
        Document {
            nodes,
            names: NamePool::new(),
        }
    }

    /// Get the document node ID
    #[inline]
    pub fn document_node_id(&self) -> NodeId {
        DOCUMENT_NODE
    }

    /// Get the root element (first element child of the document node)
    pub fn root_element_id(&self) -> Option<NodeId> {
        self.children(DOCUMENT_NODE).find(|&id| self.nodes[id as usize].is_element())
    }

    /// Get a node by ID
    #[inline]
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id as usize)
    }

    #[inline]
    fn exists(&self, id: NodeId) -> bool {
        (id as usize) < self.nodes.len()
    }

    /// Get total number of nodes, detached ones included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(node);
        id
    }

    /// Create a detached element. Tag names are stored lowercase.
    pub fn new_element(&mut self, tag: &str) -> NodeId {
        let name_id = self.names.intern(&tag.to_ascii_lowercase());
        self.push(Node::element(name_id))
    }

    /// Create a detached text node
    pub fn new_text(&mut self, data: impl Into<String>) -> NodeId {
        self.push(Node::text(data))
    }

    /// Create a detached comment node
    pub fn new_comment(&mut self, data: impl Into<String>) -> NodeId {
        self.push(Node::comment(data))
    }

    /// Append `child` as the last child of `parent`, moving it if attached elsewhere
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_before(parent, child, None);
    }

    /// Insert `child` under `parent` before `reference` (append when None)
    ///
    /// Does nothing when the move would create a cycle or when `reference`
    /// is not a child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        if !self.exists(parent) || !self.exists(child) || self.is_inclusive_ancestor(child, parent) {
            return;
        }
        if let Some(r) = reference {
            if r == child || self.get_node(r).and_then(|n| n.parent) != Some(parent) {
                return;
            }
        }

        self.detach(child);

        let (p, c) = (parent as usize, child as usize);
        match reference {
            Some(r) => {
                let prev = self.nodes[r as usize].prev_sibling;
                self.nodes[c].prev_sibling = prev;
                self.nodes[c].next_sibling = Some(r);
                self.nodes[r as usize].prev_sibling = Some(child);
                match prev {
                    Some(prev_id) => self.nodes[prev_id as usize].next_sibling = Some(child),
                    None => self.nodes[p].first_child = Some(child),
                }
            }
            None => {
                let last = self.nodes[p].last_child;
                self.nodes[c].prev_sibling = last;
                self.nodes[c].next_sibling = None;
                match last {
                    Some(last_id) => self.nodes[last_id as usize].next_sibling = Some(child),
                    None => self.nodes[p].first_child = Some(child),
                }
                self.nodes[p].last_child = Some(child);
            }
        }
        self.nodes[c].parent = Some(parent);
    }

    /// Unlink a node from its parent and siblings. Its subtree stays intact.
    pub fn detach(&mut self, id: NodeId) {
        let Some(node) = self.get_node(id) else {
            return;
        };
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);

        match prev {
            Some(prev_id) => self.nodes[prev_id as usize].next_sibling = next,
            None => {
                if let Some(p) = parent {
                    self.nodes[p as usize].first_child = next;
                }
            }
        }
        match next {
            Some(next_id) => self.nodes[next_id as usize].prev_sibling = prev,
            None => {
                if let Some(p) = parent {
                    self.nodes[p as usize].last_child = prev;
                }
            }
        }

        let node = &mut self.nodes[id as usize];
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }

    /// Whether `ancestor` is `id` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(cid) = current {
            if cid == ancestor {
                return true;
            }
            current = self.get_node(cid).and_then(|n| n.parent);
        }
        false
    }

    /// Get the tag name of an element
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        let node = self.get_node(id)?;
        if node.is_element() {
            self.names.get(node.name_id)
        } else {
            None
        }
    }

    /// Get the character data of a text or comment node
    pub fn data(&self, id: NodeId) -> Option<&str> {
        let node = self.get_node(id)?;
        match node.kind {
            NodeKind::Text | NodeKind::Comment => Some(&node.data),
            _ => None,
        }
    }

    /// Get attributes for an element
    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        self.get_node(id).map(|n| n.attributes.as_slice()).unwrap_or(&[])
    }

    /// Get attribute value by name
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        let name_id = self.names.lookup(name)?;
        self.attributes(id)
            .iter()
            .find(|a| a.name_id == name_id)
            .map(|a| a.value.as_str())
    }

    /// Set (or overwrite) an attribute on an element
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        if !self.get_node(id).is_some_and(Node::is_element) {
            return;
        }
        let name_id = self.names.intern(name);
        let value = value.into();
        let attrs = &mut self.nodes[id as usize].attributes;
        match attrs.iter_mut().find(|a| a.name_id == name_id) {
            Some(attr) => attr.value = value,
            None => attrs.push(Attribute::new(name_id, value)),
        }
    }

    /// Remove an attribute from an element
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) {
        let Some(name_id) = self.names.lookup(name) else {
            return;
        };
        if let Some(node) = self.nodes.get_mut(id as usize) {
            node.attributes.retain(|a| a.name_id != name_id);
        }
    }

    /// Iterate over the whitespace-separated tokens of the class attribute
    pub fn class_list(&self, id: NodeId) -> impl Iterator<Item = &str> {
        self.get_attribute(id, "class")
            .unwrap_or("")
            .split_ascii_whitespace()
    }

    /// Iterate over children of a node
    pub fn children(&self, id: NodeId) -> ChildIter<'_> {
        let first = self.get_node(id).and_then(|n| n.first_child);
        ChildIter { doc: self, next: first }
    }

    /// Iterate over all descendants of a node (depth-first, document order)
    pub fn descendants(&self, id: NodeId) -> DescendantIter<'_> {
        // Initialize stack with all children in reverse order (so first is processed first)
        let mut stack = Vec::new();
        if let Some(node) = self.get_node(id) {
            let mut child_id = node.last_child;
            while let Some(cid) = child_id {
                stack.push(cid);
                child_id = self.get_node(cid).and_then(|n| n.prev_sibling);
            }
        }
        DescendantIter { doc: self, stack }
    }

    /// Append the text of all descendant text nodes to `out`
    pub fn collect_text(&self, id: NodeId, out: &mut String) {
        if let Some(node) = self.get_node(id) {
            if node.is_text() {
                out.push_str(&node.data);
                return;
            }
        }
        for desc in self.descendants(id) {
            let node = &self.nodes[desc as usize];
            if node.is_text() {
                out.push_str(&node.data);
            }
        }
    }

    /// Merge runs of adjacent text children of `id` and drop empty ones
    fn merge_text_children(&mut self, id: NodeId) {
        let mut child = self.get_node(id).and_then(|n| n.first_child);
        while let Some(cid) = child {
            let mut next = self.nodes[cid as usize].next_sibling;
            if !self.nodes[cid as usize].is_text() {
                child = next;
                continue;
            }

            while let Some(nid) = next {
                if !self.nodes[nid as usize].is_text() {
                    break;
                }
                let data = std::mem::take(&mut self.nodes[nid as usize].data);
                self.nodes[cid as usize].data.push_str(&data);
                next = self.nodes[nid as usize].next_sibling;
                self.detach(nid);
            }

            if self.nodes[cid as usize].data.is_empty() {
                self.detach(cid);
            }
            child = next;
        }
    }
}

/// Iterator over child nodes
pub struct ChildIter<'d> {
    doc: &'d Document,
    next: Option<NodeId>,
}

impl<'d> Iterator for ChildIter<'d> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.get_node(current).and_then(|n| n.next_sibling);
        Some(current)
    }
}

/// Iterator over descendant nodes (depth-first)
pub struct DescendantIter<'d> {
    doc: &'d Document,
    stack: Vec<NodeId>,
}

impl<'d> Iterator for DescendantIter<'d> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;

        // Add children to stack in reverse order (so first child is processed first)
        if let Some(node) = self.doc.get_node(current) {
            let mut child_id = node.last_child;
            while let Some(id) = child_id {
                self.stack.push(id);
                child_id = self.doc.get_node(id).and_then(|n| n.prev_sibling);
            }
        }

        Some(current)
    }
}

// =============================================================================
// TextTree implementation
// =============================================================================

impl TextTree for Document {
    fn is_element(&self, id: NodeId) -> bool {
        self.get_node(id).is_some_and(Node::is_element)
    }

    fn contains(&self, root: NodeId, id: NodeId) -> bool {
        self.exists(id) && self.is_inclusive_ancestor(root, id)
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id).and_then(|n| n.parent)
    }

    fn children_vec(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id).collect()
    }

    fn tag_name(&self, id: NodeId) -> Option<&str> {
        Document::tag_name(self, id)
    }

    fn text(&self, id: NodeId) -> Option<&str> {
        let node = self.get_node(id)?;
        node.is_text().then_some(node.data.as_str())
    }

    fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.class_list(id).any(|c| c == class)
    }

    fn add_class(&mut self, id: NodeId, class: &str) {
        if class.is_empty() || self.has_class(id, class) {
            return;
        }
        let current = self.get_attribute(id, "class").unwrap_or("").trim();
        let value = if current.is_empty() {
            class.to_string()
        } else {
            format!("{current} {class}")
        };
        self.set_attribute(id, "class", value);
    }

    fn remove_class(&mut self, id: NodeId, class: &str) {
        if !self.has_class(id, class) {
            return;
        }
        let value = self
            .class_list(id)
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        if value.is_empty() {
            self.remove_attribute(id, "class");
        } else {
            self.set_attribute(id, "class", value);
        }
    }

    fn create_element(&mut self, tag: &str, class: &str, text: &str) -> NodeId {
        let element = self.new_element(tag);
        if !class.is_empty() {
            self.set_attribute(element, "class", class);
        }
        if !text.is_empty() {
            let child = self.new_text(text);
            self.append_child(element, child);
        }
        element
    }

    fn create_text(&mut self, text: &str) -> NodeId {
        self.new_text(text)
    }

    fn replace_with(&mut self, old: NodeId, fragment: &[NodeId]) {
        let Some(parent) = self.parent(old) else {
            return;
        };
        let next = self.nodes[old as usize].next_sibling;
        self.detach(old);
        for &node in fragment {
            self.insert_before(parent, node, next);
        }
    }

    fn normalize(&mut self, id: NodeId) {
        let mut elements = vec![id];
        elements.extend(
            self.descendants(id)
                .filter(|&d| !self.nodes[d as usize].is_text()),
        );
        for element in elements {
            self.merge_text_children(element);
        }
    }

    fn query_elements(&self, root: NodeId, tag: &str, class: &str) -> Vec<NodeId> {
        self.descendants(root)
            .filter(|&id| {
                Document::tag_name(self, id).is_some_and(|t| t.eq_ignore_ascii_case(tag))
                    && self.has_class(id, class)
            })
            .collect()
    }

    fn text_leaves(&self, root: NodeId) -> Vec<NodeId> {
        self.descendants(root)
            .filter(|&id| self.nodes[id as usize].is_text())
            .collect()
    }
}
