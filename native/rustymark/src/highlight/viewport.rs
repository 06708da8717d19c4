//! Viewport geometry
//!
//! The highlighter only needs three things from a display: a node's
//! bounding box relative to the viewport, the viewport height, and a way to
//! scroll a node into view. [`Viewport`] is that seam.
//!
//! [`LineLayout`] is a simple model for headless use: every line has a fixed
//! height, lines break at `\n` and around block-level elements.

use std::collections::HashMap;

use super::config::{ScrollAlign, ScrollBehavior};
use crate::dom::{NodeId, TextTree};

/// Viewport-relative box, in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, height: f64) -> Self {
        Rect { top, height }
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Whether `rect` lies inside the viewport shrunk by `padding` at top and bottom
///
/// A node without geometry is never comfortably visible.
pub fn is_comfortably_visible(rect: Option<Rect>, viewport_height: f64, padding: f64) -> bool {
    rect.is_some_and(|r| r.top >= padding && r.bottom() <= viewport_height - padding)
}

pub trait Viewport {
    /// Recompute geometry after the tree under `root` changed
    fn relayout(&mut self, _tree: &dyn TextTree, _root: NodeId) {}

    /// Box of `node` relative to the top of the viewport
    fn bounding_box(&self, node: NodeId) -> Option<Rect>;

    fn viewport_height(&self) -> f64;

    fn scroll_into_view(&mut self, node: NodeId, behavior: &ScrollBehavior);
}

impl<V: Viewport + ?Sized> Viewport for &mut V {
    fn relayout(&mut self, tree: &dyn TextTree, root: NodeId) {
        (**self).relayout(tree, root)
    }

    fn bounding_box(&self, node: NodeId) -> Option<Rect> {
        (**self).bounding_box(node)
    }

    fn viewport_height(&self) -> f64 {
        (**self).viewport_height()
    }

    fn scroll_into_view(&mut self, node: NodeId, behavior: &ScrollBehavior) {
        (**self).scroll_into_view(node, behavior)
    }
}

/// No geometry at all: nothing is visible and scrolling does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoViewport;

impl Viewport for NoViewport {
    fn bounding_box(&self, _node: NodeId) -> Option<Rect> {
        None
    }

    fn viewport_height(&self) -> f64 {
        0.0
    }

    fn scroll_into_view(&mut self, _node: NodeId, _behavior: &ScrollBehavior) {}
}

// =============================================================================
// LineLayout
// =============================================================================

const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "dd", "details", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "html", "li", "main", "nav", "ol", "p", "pre", "section", "summary", "table",
    "tr", "ul",
];

fn is_block_element(tag: &str) -> bool {
    BLOCK_ELEMENTS.iter().any(|b| b.eq_ignore_ascii_case(tag))
}

/// Last scroll request received, kept for inspection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRequest {
    pub node: NodeId,
    pub behavior: ScrollBehavior,
    pub scroll_top: f64,
}

/// Fixed-height line model of a document
#[derive(Debug, Clone)]
pub struct LineLayout {
    line_height: f64,
    height: f64,
    scroll_top: f64,
    /// First and last line of each laid-out node
    lines: HashMap<NodeId, (usize, usize)>,
    total_lines: usize,
    last_scroll: Option<ScrollRequest>,
}

impl Default for LineLayout {
    fn default() -> Self {
        Self::new(20.0, 600.0)
    }
}

impl LineLayout {
    pub fn new(line_height: f64, height: f64) -> Self {
        LineLayout {
            line_height: line_height.max(1.0),
            height: height.max(0.0),
            scroll_top: 0.0,
            lines: HashMap::new(),
            total_lines: 0,
            last_scroll: None,
        }
    }

    pub fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    pub fn set_scroll_top(&mut self, scroll_top: f64) {
        self.scroll_top = scroll_top.clamp(0.0, self.max_scroll());
    }

    pub fn total_lines(&self) -> usize {
        self.total_lines
    }

    /// First and last line occupied by `node`
    pub fn line_span(&self, node: NodeId) -> Option<(usize, usize)> {
        self.lines.get(&node).copied()
    }

    pub fn last_scroll(&self) -> Option<&ScrollRequest> {
        self.last_scroll.as_ref()
    }

    fn content_height(&self) -> f64 {
        self.total_lines as f64 * self.line_height
    }

    fn max_scroll(&self) -> f64 {
        (self.content_height() - self.height).max(0.0)
    }
}

/// Walk state for [`LineLayout::relayout`]
struct LineCursor {
    line: usize,
    /// Whether anything has been placed on the current line
    dirty: bool,
}

impl LineCursor {
    fn break_line(&mut self) {
        if self.dirty {
            self.line += 1;
            self.dirty = false;
        }
    }
}

impl Viewport for LineLayout {
    fn relayout(&mut self, tree: &dyn TextTree, root: NodeId) {
        self.lines.clear();
        let mut cursor = LineCursor { line: 0, dirty: false };

        // (node, exiting)
        let mut stack = vec![(root, false)];
        let mut starts: HashMap<NodeId, usize> = HashMap::new();

        while let Some((id, exiting)) = stack.pop() {
            let tag = tree.tag_name(id);
            let block = tag.is_some_and(is_block_element);

            if exiting {
                let start = starts.remove(&id).unwrap_or(cursor.line);
                // A clean cursor sits on the line after the content
                let end = if cursor.dirty { cursor.line } else { cursor.line.saturating_sub(1) };
                self.lines.insert(id, (start, end.max(start)));
                if block {
                    cursor.break_line();
                }
                continue;
            }

            if let Some(text) = tree.text(id) {
                let start = cursor.line;
                for c in text.chars() {
                    if c == '\n' {
                        cursor.line += 1;
                        cursor.dirty = false;
                    } else if !c.is_whitespace() {
                        cursor.dirty = true;
                    }
                }
                self.lines.insert(id, (start, cursor.line));
                continue;
            }

            if tag.is_some_and(|t| t.eq_ignore_ascii_case("br")) {
                self.lines.insert(id, (cursor.line, cursor.line));
                cursor.line += 1;
                cursor.dirty = false;
                continue;
            }

            if block {
                cursor.break_line();
            }
            starts.insert(id, cursor.line);
            stack.push((id, true));
            for child in tree.children_vec(id).into_iter().rev() {
                stack.push((child, false));
            }
        }

        self.total_lines = cursor.line + usize::from(cursor.dirty);
        self.scroll_top = self.scroll_top.clamp(0.0, self.max_scroll());
    }

    fn bounding_box(&self, node: NodeId) -> Option<Rect> {
        let (start, end) = self.line_span(node)?;
        Some(Rect::new(
            start as f64 * self.line_height - self.scroll_top,
            (end - start + 1) as f64 * self.line_height,
        ))
    }

    fn viewport_height(&self) -> f64 {
        self.height
    }

    fn scroll_into_view(&mut self, node: NodeId, behavior: &ScrollBehavior) {
        let Some((start, end)) = self.line_span(node) else {
            return;
        };
        let top = start as f64 * self.line_height;
        let bottom = (end + 1) as f64 * self.line_height;

        let target = match behavior.block {
            ScrollAlign::Start => top,
            ScrollAlign::Center => top - (self.height - (bottom - top)) / 2.0,
            ScrollAlign::End => bottom - self.height,
            ScrollAlign::Nearest => {
                if top < self.scroll_top {
                    top
                } else if bottom > self.scroll_top + self.height {
                    bottom - self.height
                } else {
                    self.scroll_top
                }
            }
        };

        self.set_scroll_top(target);
        log::trace!("scrolled node {node} into view, scroll_top = {}", self.scroll_top);
        self.last_scroll = Some(ScrollRequest {
            node,
            behavior: *behavior,
            scroll_top: self.scroll_top,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;

    fn paragraphs(n: usize) -> (Document, NodeId) {
        let markup: String = (0..n).map(|i| format!("<p>line {i}</p>")).collect();
        Document::parse_fragment(markup.as_bytes())
    }

    #[test]
    fn test_comfortably_visible() {
        assert!(is_comfortably_visible(Some(Rect::new(150.0, 20.0)), 600.0, 100.0));
        assert!(!is_comfortably_visible(Some(Rect::new(50.0, 20.0)), 600.0, 100.0));
        assert!(!is_comfortably_visible(Some(Rect::new(490.0, 20.0)), 600.0, 100.0));
        assert!(is_comfortably_visible(Some(Rect::new(480.0, 20.0)), 600.0, 100.0));
        assert!(!is_comfortably_visible(None, 600.0, 0.0));
    }

    #[test]
    fn test_no_viewport() {
        let mut viewport = NoViewport;
        assert_eq!(viewport.bounding_box(1), None);
        viewport.scroll_into_view(1, &ScrollBehavior::default());
    }

    #[test]
    fn test_line_layout_blocks() {
        let (doc, body) = paragraphs(3);
        let mut layout = LineLayout::default();
        layout.relayout(&doc, body);

        let ps = doc.children_vec(body);
        assert_eq!(layout.total_lines(), 3);
        assert_eq!(layout.line_span(ps[0]), Some((0, 0)));
        assert_eq!(layout.line_span(ps[2]), Some((2, 2)));
        assert_eq!(layout.bounding_box(ps[1]), Some(Rect::new(20.0, 20.0)));
    }

    #[test]
    fn test_line_layout_nested_blocks() {
        let (doc, body) = Document::parse_fragment(b"<div><p>a</p></div><div><p>b</p><p>c</p></div><p></p>");
        let mut layout = LineLayout::default();
        layout.relayout(&doc, body);

        let blocks = doc.children_vec(body);
        assert_eq!(layout.line_span(blocks[0]), Some((0, 0)));
        assert_eq!(layout.line_span(blocks[1]), Some((1, 2)));
        assert_eq!(layout.line_span(blocks[2]), Some((3, 3)));
        assert_eq!(layout.line_span(body), Some((0, 2)));
        assert_eq!(layout.bounding_box(blocks[0]), Some(Rect::new(0.0, 20.0)));
        assert_eq!(layout.total_lines(), 3);
    }

    #[test]
    fn test_line_layout_newlines_and_br() {
        let (doc, body) = Document::parse_fragment(b"a\nb<br>c <b>d</b>");
        let mut layout = LineLayout::default();
        layout.relayout(&doc, body);
        let bold = doc
            .descendants(body)
            .find(|&id| doc.tag_name(id) == Some("b"))
            .unwrap();
        assert_eq!(layout.total_lines(), 3);
        assert_eq!(layout.line_span(bold), Some((2, 2)));
    }

    #[test]
    fn test_scroll_center_and_clamp() {
        let (doc, body) = paragraphs(100);
        let mut layout = LineLayout::new(20.0, 200.0);
        layout.relayout(&doc, body);
        let ps = doc.children_vec(body);

        layout.scroll_into_view(ps[50], &ScrollBehavior::default());
        // line 50 at y=1000, centered in a 200px viewport
        assert_eq!(layout.scroll_top(), 910.0);
        let rect = layout.bounding_box(ps[50]).unwrap();
        assert_eq!(rect.top, 90.0);

        layout.scroll_into_view(ps[0], &ScrollBehavior::default());
        assert_eq!(layout.scroll_top(), 0.0);

        layout.scroll_into_view(ps[99], &ScrollBehavior::default());
        assert_eq!(layout.scroll_top(), 1800.0);
        assert_eq!(layout.last_scroll().map(|r| r.node), Some(ps[99]));
    }

    #[test]
    fn test_scroll_nearest() {
        let (doc, body) = paragraphs(100);
        let mut layout = LineLayout::new(20.0, 200.0);
        layout.relayout(&doc, body);
        let ps = doc.children_vec(body);
        let nearest = ScrollBehavior {
            block: ScrollAlign::Nearest,
            ..Default::default()
        };

        layout.scroll_into_view(ps[3], &nearest);
        assert_eq!(layout.scroll_top(), 0.0);
        layout.scroll_into_view(ps[20], &nearest);
        assert_eq!(layout.scroll_top(), 220.0);
    }
}
