//! Wire form of already-tokenized trees.
//!
//! `system/display` events deliver their payload pre-tokenized as JSON: a
//! bare string, a tag object `{"name": .., "attributes": {..}, "children":
//! [..]}`, or an arbitrarily nested array mixing both. Decoding flattens the
//! arrays and mints fresh ids; bare strings are content, not markup, and are
//! never tag-parsed.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::tag::{Node, NodeId, TagNode, TextNode};

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireNode {
    Text(String),
    Tag(WireTag),
    Many(Vec<WireNode>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireTag {
    pub name: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub children: Vec<WireNode>,
}

impl WireNode {
    /// Convert into owned tree nodes, flattening nested arrays.
    pub fn into_nodes(self) -> Vec<Node> {
        match self {
            WireNode::Text(s) => vec![Node::Text(TextNode::new(s))],
            WireNode::Tag(t) => vec![Node::Tag(t.into_tag())],
            WireNode::Many(v) => v.into_iter().flat_map(WireNode::into_nodes).collect(),
        }
    }
}

impl WireTag {
    fn into_tag(self) -> TagNode {
        TagNode {
            id: NodeId::fresh(),
            name: self.name,
            attributes: self.attributes,
            children: self
                .children
                .into_iter()
                .flat_map(WireNode::into_nodes)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_bare_string() {
        let w: WireNode = serde_json::from_str("\"hello\"").unwrap();
        let nodes = w.into_nodes();
        assert_eq!(nodes.len(), 1);
        match &nodes[0] {
            Node::Text(t) => assert_eq!(t.content, "hello"),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn decodes_tag_with_defaults() {
        let w: WireNode = serde_json::from_str(r#"{"name": "npc"}"#).unwrap();
        let nodes = w.into_nodes();
        match &nodes[0] {
            Node::Tag(t) => {
                assert_eq!(t.name, "npc");
                assert!(t.attributes.is_empty());
                assert!(t.children.is_empty());
            }
            other => panic!("expected tag, got {other:?}"),
        }
    }

    #[test]
    fn flattens_nested_arrays() {
        let json = r#"[
            "one",
            [{"name": "color",
              "attributes": {"foreground": "red"},
              "children": ["two", ["three"]]}],
            "four"
        ]"#;
        let w: WireNode = serde_json::from_str(json).unwrap();
        let nodes = w.into_nodes();
        assert_eq!(nodes.len(), 3);
        match &nodes[1] {
            Node::Tag(t) => {
                assert_eq!(t.name, "color");
                assert_eq!(
                    t.attributes.get("foreground").map(String::as_str),
                    Some("red")
                );
                // Nested array flattened into the tag's child list.
                assert_eq!(t.children.len(), 2);
            }
            other => panic!("expected tag, got {other:?}"),
        }
    }
}
