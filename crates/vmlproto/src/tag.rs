use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Identity of one produced node (and, downstream, one line or break).
///
/// Minted from a process-wide counter so every value handed out is distinct;
/// an incremental renderer keys its diff on these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub u64);

impl NodeId {
    pub fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// One node of a tag tree. The tree is strictly hierarchical: a `TagNode`
/// exclusively owns its children, and nothing is mutated after construction.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Node {
    Text(TextNode),
    Tag(TagNode),
}

impl Node {
    pub fn text(content: impl Into<String>) -> Self {
        Node::Text(TextNode::new(content))
    }

    /// Concatenated text content of the subtree, in document order.
    pub fn flat_text(&self, out: &mut String) {
        match self {
            Node::Text(t) => out.push_str(&t.content),
            Node::Tag(t) => {
                for c in &t.children {
                    c.flat_text(out);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TextNode {
    pub id: NodeId,
    pub content: String,
}

impl TextNode {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: NodeId::fresh(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TagNode {
    pub id: NodeId,
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<Node>,
}

impl TagNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NodeId::fresh(),
            name: name.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Fresh wrapper with this tag's name and attributes but its own id and
    /// the given children. The segmenter uses this to re-parent content on
    /// each side of a line break.
    pub fn rewrap(&self, children: Vec<Node>) -> Self {
        Self {
            id: NodeId::fresh(),
            name: self.name.clone(),
            attributes: self.attributes.clone(),
            children,
        }
    }

    pub fn flat_text(&self) -> String {
        let mut out = String::new();
        for c in &self.children {
            c.flat_text(&mut out);
        }
        out
    }
}
