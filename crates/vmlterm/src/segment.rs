//! Line segmentation: fold a tag tree (or a mixed batch of trees and raw
//! strings) into a flat sequence of renderable lines and break markers.
//!
//! The fold is structural, bottom-up: a text node explodes into alternating
//! text/break fragments; a tag node explodes its children, concatenates the
//! fragment lists in order, then re-partitions at break boundaries so every
//! maximal run between breaks gets its own fresh copy of the wrapping tag.
//! Tags therefore never span a break in the output - the context is
//! duplicated on each side instead. Empty runs vanish at every level (no
//! hollow text nodes between adjacent breaks, no phantom trailing line from
//! a final `\n`), while the breaks themselves always survive.
//!
//! Input trees are never mutated or shared into the output; every produced
//! node, line, and break carries a fresh id.

use serde::Serialize;
use vmlproto::{Node, NodeId, TagNode, TextNode};

/// One renderable line: top-level nodes whose subtrees contain no `\n`.
#[derive(Debug, Clone, Serialize)]
pub struct Line {
    pub id: NodeId,
    pub children: Vec<Node>,
}

impl Line {
    /// Unstyled text content of the line.
    pub fn flat_text(&self) -> String {
        let mut out = String::new();
        for c in &self.children {
            c.flat_text(&mut out);
        }
        out
    }
}

/// Marks where one renderable line ends and the next begins. Distinct breaks
/// carry distinct ids, so two consecutive blank lines stay distinguishable.
#[derive(Debug, Clone, Serialize)]
pub struct LineBreak {
    pub id: NodeId,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LineItem {
    Line(Line),
    Break(LineBreak),
}

impl LineItem {
    pub fn is_break(&self) -> bool {
        matches!(self, LineItem::Break(_))
    }

    pub fn as_line(&self) -> Option<&Line> {
        match self {
            LineItem::Line(l) => Some(l),
            LineItem::Break(_) => None,
        }
    }
}

/// Segmenter input: raw content (split on `\n` only, never tag-parsed) or an
/// already-built tree.
#[derive(Debug, Clone)]
pub enum Piece {
    Text(String),
    Node(Node),
}

impl From<&str> for Piece {
    fn from(s: &str) -> Self {
        Piece::Text(s.to_string())
    }
}

impl From<Node> for Piece {
    fn from(n: Node) -> Self {
        Piece::Node(n)
    }
}

impl From<TagNode> for Piece {
    fn from(t: TagNode) -> Self {
        Piece::Node(Node::Tag(t))
    }
}

/// Intermediate fragment. `Break` is the one canonical sentinel the fold
/// partitions on; breaks only receive ids at the very end, when they become
/// `LineItem`s.
enum Frag {
    Node(Node),
    Break,
}

/// Segment a mixed batch of raw strings and trees, treated as the children
/// of an implicit anonymous root.
pub fn segment(pieces: &[Piece]) -> Vec<LineItem> {
    let mut frags = Vec::new();
    for piece in pieces {
        match piece {
            Piece::Text(s) => explode_text(s, &mut frags),
            Piece::Node(n) => explode_node(n, &mut frags),
        }
    }
    into_items(frags)
}

/// Segment the single tree produced by the markup parser. The root wrapper
/// is the implicit anonymous root: its children become lines, the wrapper
/// itself does not appear in the output.
pub fn segment_tree(root: &TagNode) -> Vec<LineItem> {
    let mut frags = Vec::new();
    for child in &root.children {
        explode_node(child, &mut frags);
    }
    into_items(frags)
}

fn explode_text(content: &str, out: &mut Vec<Frag>) {
    for (i, seg) in content.split('\n').enumerate() {
        if i > 0 {
            out.push(Frag::Break);
        }
        if !seg.is_empty() {
            out.push(Frag::Node(Node::Text(TextNode::new(seg))));
        }
    }
}

fn explode_node(node: &Node, out: &mut Vec<Frag>) {
    match node {
        Node::Text(t) => explode_text(&t.content, out),
        Node::Tag(tag) => {
            let mut inner = Vec::new();
            for child in &tag.children {
                explode_node(child, &mut inner);
            }
            // Re-partition at break boundaries: each non-empty run gets its
            // own fresh copy of this tag.
            let mut run: Vec<Node> = Vec::new();
            for frag in inner {
                match frag {
                    Frag::Node(n) => run.push(n),
                    Frag::Break => {
                        if !run.is_empty() {
                            out.push(Frag::Node(Node::Tag(tag.rewrap(std::mem::take(&mut run)))));
                        }
                        out.push(Frag::Break);
                    }
                }
            }
            if !run.is_empty() {
                out.push(Frag::Node(Node::Tag(tag.rewrap(run))));
            }
        }
    }
}

fn into_items(frags: Vec<Frag>) -> Vec<LineItem> {
    let mut out = Vec::new();
    let mut run: Vec<Node> = Vec::new();
    for frag in frags {
        match frag {
            Frag::Node(n) => run.push(n),
            Frag::Break => {
                if !run.is_empty() {
                    out.push(LineItem::Line(Line {
                        id: NodeId::fresh(),
                        children: std::mem::take(&mut run),
                    }));
                }
                out.push(LineItem::Break(LineBreak { id: NodeId::fresh() }));
            }
        }
    }
    if !run.is_empty() {
        out.push(LineItem::Line(Line {
            id: NodeId::fresh(),
            children: run,
        }));
    }
    out
}
