//! Lenient Markup Reader
//!
//! Builds a [`Document`] from HTML-ish markup. The reader never fails:
//! - unmatched end tags are ignored, unclosed elements close at EOF
//! - void elements (`br`, `img`, ...) never take children
//! - `script`, `style`, `textarea` and `title` content is read as raw text
//! - `<!DOCTYPE ...>`, `<?...?>` and CDATA markers are skipped
//! - invalid UTF-8 is replaced lossily
//!
//! Tag and attribute names are lowercased.

use super::document::Document;
use super::node::NodeId;
use crate::core::entities::decode_text;
use crate::core::scanner::{is_name_start_char, Scanner};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// Elements whose content is kept as-is (no entity decoding, no tags)
#[inline]
pub fn is_raw_text_element(name: &str) -> bool {
    RAW_TEXT_ELEMENTS.iter().any(|e| e.eq_ignore_ascii_case(name))
}

/// Elements that never have children or an end tag
#[inline]
pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|e| e.eq_ignore_ascii_case(name))
}

impl Document {
    /// Parse a complete markup document
    pub fn parse(input: &[u8]) -> Self {
        let mut doc = Document::new();
        let root = doc.document_node_id();
        MarkupReader::new(&mut doc, root).read(&String::from_utf8_lossy(input));
        doc
    }

    /// Parse a markup fragment under a synthetic `body` container
    ///
    /// Returns the document and the container element, which is the
    /// natural highlighting root for fragments with several top-level nodes.
    /// Serialize with [`Document::inner_markup`] to get the fragment back.
    pub fn parse_fragment(input: &[u8]) -> (Self, NodeId) {
        let mut doc = Document::new();
        let body = doc.new_element("body");
        doc.append_child(doc.document_node_id(), body);
        MarkupReader::new(&mut doc, body).read(&String::from_utf8_lossy(input));
        (doc, body)
    }
}

/// Event-free tree builder: tokens go straight into the arena
struct MarkupReader<'d> {
    doc: &'d mut Document,
    /// Open elements; the bottom entry is the insertion root
    stack: Vec<NodeId>,
    /// Character data waiting to become a text node
    pending_text: String,
}

impl<'d> MarkupReader<'d> {
    fn new(doc: &'d mut Document, root: NodeId) -> Self {
        MarkupReader {
            doc,
            stack: vec![root],
            pending_text: String::new(),
        }
    }

    #[inline]
    fn current_parent(&self) -> NodeId {
        // The bottom entry is never popped
        self.stack[self.stack.len() - 1]
    }

    fn read(mut self, input: &str) {
        let mut scanner = Scanner::new(input.as_bytes());

        while !scanner.is_eof() {
            let start = scanner.position();
            let Some(lt) = scanner.find_tag_start() else {
                self.push_text(&input[start..]);
                break;
            };
            self.push_text(&input[start..lt]);
            scanner.set_position(lt);

            if scanner.starts_with(b"<!--") {
                self.read_comment(&mut scanner, input);
            } else if scanner.starts_with(b"</") {
                self.read_end_tag(&mut scanner);
            } else if scanner.starts_with(b"<!") || scanner.starts_with(b"<?") {
                // DOCTYPE, CDATA marker or processing instruction: skip
                scanner.advance(2);
                match scanner.find_tag_end_quoted() {
                    Some(gt) => scanner.set_position(gt + 1),
                    None => scanner.set_position(scanner.len()),
                }
            } else if scanner.peek_at(1).is_some_and(is_name_start_char) {
                self.read_start_tag(&mut scanner, input);
            } else {
                // A lone '<' is text
                self.push_text("<");
                scanner.advance(1);
            }
        }

        self.flush_text();
    }

    fn push_text(&mut self, raw: &str) {
        if !raw.is_empty() {
            self.pending_text.push_str(&decode_text(raw));
        }
    }

    fn flush_text(&mut self) {
        if self.pending_text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.pending_text);
        let node = self.doc.new_text(text);
        let parent = self.current_parent();
        self.doc.append_child(parent, node);
    }

    fn read_comment(&mut self, scanner: &mut Scanner<'_>, input: &str) {
        self.flush_text();
        scanner.advance(4);
        let start = scanner.position();
        let (end, next) = match scanner.find(b"-->") {
            Some(end) => (end, end + 3),
            None => (scanner.len(), scanner.len()),
        };
        let node = self.doc.new_comment(&input[start..end]);
        let parent = self.current_parent();
        self.doc.append_child(parent, node);
        scanner.set_position(next);
    }

    fn read_end_tag(&mut self, scanner: &mut Scanner<'_>) {
        scanner.advance(2);
        let name = scanner.read_name().map(bytes_to_name);
        match scanner.find_tag_end_quoted() {
            Some(gt) => scanner.set_position(gt + 1),
            None => scanner.set_position(scanner.len()),
        }

        let Some(name) = name else {
            return;
        };
        // Close up to the nearest open element with this name; ignore strays
        let open = self.stack[1..]
            .iter()
            .rposition(|&id| self.doc.tag_name(id) == Some(name.as_str()));
        if let Some(index) = open {
            self.flush_text();
            self.stack.truncate(index + 1);
        }
    }

    fn read_start_tag(&mut self, scanner: &mut Scanner<'_>, input: &str) {
        self.flush_text();
        scanner.advance(1);
        let name = scanner
            .read_name()
            .map(bytes_to_name)
            .unwrap_or_default();

        let attr_start = scanner.position();
        let (attr_end, next) = match scanner.find_tag_end_quoted() {
            Some(gt) => (gt, gt + 1),
            None => (scanner.len(), scanner.len()),
        };
        let attr_src = &input[attr_start..attr_end];
        let self_closing = attr_src.trim_end().ends_with('/');

        let element = self.doc.new_element(&name);
        for (attr_name, value) in parse_attributes(attr_src) {
            if self.doc.get_attribute(element, &attr_name).is_none() {
                self.doc.set_attribute(element, &attr_name, value);
            }
        }
        let parent = self.current_parent();
        self.doc.append_child(parent, element);
        scanner.set_position(next);

        if is_raw_text_element(&name) && !self_closing {
            self.read_raw_text(scanner, input, element, &name);
        } else if !self_closing && !is_void_element(&name) {
            self.stack.push(element);
        }
    }

    fn read_raw_text(&mut self, scanner: &mut Scanner<'_>, input: &str, element: NodeId, name: &str) {
        let start = scanner.position();
        let closing = format!("</{name}");
        let end = scanner
            .find_ignore_ascii_case(closing.as_bytes())
            .unwrap_or(scanner.len());

        let raw = &input[start..end];
        if !raw.is_empty() {
            // Escapable raw text (textarea, title) still decodes references
            let data = match name {
                "textarea" | "title" => decode_text(raw).into_owned(),
                _ => raw.to_string(),
            };
            let text = self.doc.new_text(data);
            self.doc.append_child(element, text);
        }

        scanner.set_position(end);
        if !scanner.is_eof() {
            match scanner.find_tag_end_quoted() {
                Some(gt) => scanner.set_position(gt + 1),
                None => scanner.set_position(scanner.len()),
            }
        }
    }
}

/// Lowercase a tag or attribute name
///
/// Names are cut at ASCII delimiters, so they are valid UTF-8 whenever the
/// input is.
fn bytes_to_name(name: &[u8]) -> String {
    String::from_utf8_lossy(name).to_ascii_lowercase()
}

/// Parse attributes from raw tag content (after the element name)
///
/// Accepts double-quoted, single-quoted, unquoted and bare attributes.
/// Values have character references decoded.
fn parse_attributes(input: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let mut scanner = Scanner::new(input.as_bytes());

    loop {
        scanner.skip_whitespace();
        if scanner.is_eof() {
            break;
        }

        let Some(name) = scanner.read_name() else {
            // Stray '/', quote or '=': skip one byte
            scanner.advance(1);
            continue;
        };
        let name = bytes_to_name(name);

        scanner.skip_whitespace();
        if !scanner.starts_with(b"=") {
            attrs.push((name, String::new()));
            continue;
        }
        scanner.advance(1);
        scanner.skip_whitespace();

        let value = match scanner.peek_at(0) {
            Some(quote @ (b'"' | b'\'')) => {
                scanner.advance(1);
                let start = scanner.position();
                let end = memchr::memchr(quote, &input.as_bytes()[start..])
                    .map(|i| start + i)
                    .unwrap_or(input.len());
                scanner.set_position(end + 1);
                &input[start..end]
            }
            _ => {
                let start = scanner.position();
                let end = input.as_bytes()[start..]
                    .iter()
                    .position(|&b| crate::core::scanner::is_whitespace(b) || b == b'>')
                    .map(|i| start + i)
                    .unwrap_or(input.len());
                scanner.set_position(end);
                &input[start..end]
            }
        };
        attrs.push((name, decode_text(value).into_owned()));
    }

    attrs
}
