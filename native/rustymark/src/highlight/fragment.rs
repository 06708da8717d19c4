//! Replacement fragments
//!
//! A text leaf with at least one match is planned as a list of segments,
//! then materialized as text nodes and wrapper elements once the walk
//! is over. Planning only reads text, so it can run on any thread.

use regex::Regex;

use crate::dom::{NodeId, TextTree};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Unmatched text, kept as a text node
    Plain(String),
    /// Matched text, wrapped in a highlight element
    Matched(String),
}

/// The replacement planned for one text leaf
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentPlan {
    pub leaf: NodeId,
    pub segments: Vec<Segment>,
}

impl FragmentPlan {
    /// Number of wrappers this plan creates
    pub fn match_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Matched(_)))
            .count()
    }
}

/// Split `text` around every non-empty match of `regex`
///
/// Returns None when nothing matches.
pub fn split_matches(text: &str, regex: &Regex) -> Option<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut last = 0;

    for m in regex.find_iter(text).filter(|m| !m.is_empty()) {
        if m.start() > last {
            segments.push(Segment::Plain(text[last..m.start()].to_string()));
        }
        segments.push(Segment::Matched(m.as_str().to_string()));
        last = m.end();
    }

    if segments.is_empty() {
        return None;
    }
    if last < text.len() {
        segments.push(Segment::Plain(text[last..].to_string()));
    }
    Some(segments)
}

/// Plan the replacement for one leaf
#[inline]
pub fn plan_leaf(leaf: NodeId, text: &str, regex: &Regex) -> Option<FragmentPlan> {
    split_matches(text, regex).map(|segments| FragmentPlan { leaf, segments })
}

/// Swap the planned leaf for its fragment
///
/// Returns the created wrappers in order.
pub fn materialize<T: TextTree + ?Sized>(
    tree: &mut T,
    plan: &FragmentPlan,
    tag: &str,
    class: &str,
) -> Vec<NodeId> {
    let mut nodes = Vec::with_capacity(plan.segments.len());
    let mut wrappers = Vec::with_capacity(plan.match_count());

    for segment in &plan.segments {
        match segment {
            Segment::Plain(text) => nodes.push(tree.create_text(text)),
            Segment::Matched(text) => {
                let wrapper = tree.create_element(tag, class, text);
                wrappers.push(wrapper);
                nodes.push(wrapper);
            }
        }
    }

    tree.replace_with(plan.leaf, &nodes);
    wrappers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;

    #[test]
    fn test_split_matches() {
        let regex = Regex::new("(?i)javascript").unwrap();
        let segments = split_matches("About JavaScript and javascript.", &regex).unwrap();
        assert_eq!(
            segments,
            vec![
                Segment::Plain("About ".into()),
                Segment::Matched("JavaScript".into()),
                Segment::Plain(" and ".into()),
                Segment::Matched("javascript".into()),
                Segment::Plain(".".into()),
            ]
        );
    }

    #[test]
    fn test_split_no_match() {
        let regex = Regex::new("xyz").unwrap();
        assert_eq!(split_matches("hello", &regex), None);
    }

    #[test]
    fn test_zero_length_matches_ignored() {
        let regex = Regex::new("a*").unwrap();
        let segments = split_matches("baab", &regex).unwrap();
        assert_eq!(
            segments,
            vec![
                Segment::Plain("b".into()),
                Segment::Matched("aa".into()),
                Segment::Plain("b".into()),
            ]
        );
        assert_eq!(split_matches("bbb", &regex), None);
    }

    #[test]
    fn test_materialize() {
        let (mut doc, body) = Document::parse_fragment(b"one two one");
        let leaf = doc.text_leaves(body)[0];
        let regex = Regex::new("one").unwrap();
        let plan = plan_leaf(leaf, "one two one", &regex).unwrap();
        assert_eq!(plan.match_count(), 2);

        let wrappers = materialize(&mut doc, &plan, "mark", "highlight");
        assert_eq!(wrappers.len(), 2);
        assert_eq!(
            doc.inner_markup(body),
            "<mark class=\"highlight\">one</mark> two <mark class=\"highlight\">one</mark>"
        );
        assert_eq!(doc.parent(leaf), None);
    }
}
