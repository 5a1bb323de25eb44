//! Renderer-facing walk over segmented lines.
//!
//! Tag names are an open vocabulary: the host maps them to presentation
//! (color, clickable command, tooltip) through whatever table it owns, and
//! anything unrecognized falls back to its children unstyled. The walk is
//! the whole contract here: depth-first, text in document order, no
//! re-parsing. There is no global tag registry - the mapping lives in the
//! caller's [`TagSink`] implementation.

use vmlproto::{Node, TagNode, TextNode};

use crate::segment::Line;

pub trait TagSink {
    fn text(&mut self, node: &TextNode);
    /// Called before a tag's children.
    fn open_tag(&mut self, node: &TagNode);
    /// Called after a tag's children.
    fn close_tag(&mut self, node: &TagNode);
}

pub fn walk_line(line: &Line, sink: &mut dyn TagSink) {
    for node in &line.children {
        walk_node(node, sink);
    }
}

fn walk_node(node: &Node, sink: &mut dyn TagSink) {
    match node {
        Node::Text(t) => sink.text(t),
        Node::Tag(t) => {
            sink.open_tag(t);
            for child in &t.children {
                walk_node(child, sink);
            }
            sink.close_tag(t);
        }
    }
}

/// The unstyled fallback: a line flattened to its text content.
pub fn plain_text(line: &Line) -> String {
    line.flat_text()
}

#[cfg(test)]
mod tests {
    use vmlproto::parse;

    use super::*;
    use crate::segment::{LineItem, segment_tree};

    #[derive(Default)]
    struct Trace(Vec<String>);

    impl TagSink for Trace {
        fn text(&mut self, node: &TextNode) {
            self.0.push(format!("text:{}", node.content));
        }
        fn open_tag(&mut self, node: &TagNode) {
            self.0.push(format!("open:{}", node.name));
        }
        fn close_tag(&mut self, node: &TagNode) {
            self.0.push(format!("close:{}", node.name));
        }
    }

    #[test]
    fn walks_depth_first_in_document_order() {
        let root = parse("a{npc}b{exit}c{/exit}{/npc}d").unwrap();
        let items = segment_tree(&root);
        let line = match &items[0] {
            LineItem::Line(l) => l,
            LineItem::Break(_) => panic!("expected line"),
        };

        let mut trace = Trace::default();
        walk_line(line, &mut trace);
        assert_eq!(
            trace.0,
            vec![
                "text:a", "open:npc", "text:b", "open:exit", "text:c", "close:exit", "close:npc",
                "text:d"
            ]
        );
    }

    #[test]
    fn plain_text_ignores_unknown_tags() {
        let root = parse("{weird-tag}x{/weird-tag}y").unwrap();
        let items = segment_tree(&root);
        let line = items[0].as_line().expect("line");
        assert_eq!(plain_text(line), "xy");
    }
}
