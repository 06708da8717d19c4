//! Markup Serialization
//!
//! Writes a [`Document`] (or any subtree) back out as markup.
//! Text is escaped, attribute values are double-quoted, void elements get
//! no end tag and raw-text element content is written verbatim.

use super::document::Document;
use super::markup::{is_raw_text_element, is_void_element};
use super::node::{NodeId, NodeKind};
use crate::core::entities::{encode_attribute, encode_text};

impl Document {
    /// Serialize the whole document
    pub fn to_markup(&self) -> String {
        self.inner_markup(self.document_node_id())
    }

    /// Serialize a node including its own tags
    pub fn outer_markup(&self, id: NodeId) -> String {
        let mut out = String::with_capacity(256);
        self.write_node(id, &mut out);
        out
    }

    /// Serialize the children of a node
    pub fn inner_markup(&self, id: NodeId) -> String {
        let mut out = String::with_capacity(256);
        for child in self.children(id) {
            self.write_node(child, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.get_node(id) else {
            return;
        };

        match node.kind {
            NodeKind::Document => {
                for child in self.children(id) {
                    self.write_node(child, out);
                }
            }
            NodeKind::Text => {
                let raw_parent = node
                    .parent
                    .and_then(|p| self.tag_name(p))
                    .is_some_and(|tag| is_raw_text_element(tag) && tag != "textarea" && tag != "title");
                if raw_parent {
                    out.push_str(&node.data);
                } else {
                    out.push_str(&encode_text(&node.data));
                }
            }
            NodeKind::Comment => {
                out.push_str("<!--");
                out.push_str(&node.data);
                out.push_str("-->");
            }
            NodeKind::Element => {
                let tag = self.tag_name(id).unwrap_or_default();
                out.push('<');
                out.push_str(tag);
                for attr in self.attributes(id) {
                    out.push(' ');
                    out.push_str(self.names.get(attr.name_id).unwrap_or_default());
                    out.push_str("=\"");
                    out.push_str(&encode_attribute(&attr.value));
                    out.push('"');
                }
                out.push('>');

                if is_void_element(tag) {
                    return;
                }
                for child in self.children(id) {
                    self.write_node(child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}
