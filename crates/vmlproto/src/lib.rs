//! `vmlproto`: the bracket-tag ("VML") rich-text protocol.
//!
//! The game server decorates its output with tags like `{npc}Orc{/npc}` or
//! `{command send='look'}look{/command}`. This crate owns:
//! - the immutable tag tree (`tag`): `TextNode` / `TagNode` with per-node ids,
//! - the tokenizer (`parse`): one left-to-right scan with an explicit stack,
//! - the wire form (`wire`): serde types for trees that arrive pre-tokenized
//!   as JSON.
//!
//! Parsing is a pure function of the input string. Tag names are an open
//! vocabulary; the parser assigns no meaning to any of them (including the
//! renderer-reserved `sent-text`) - classification is the renderer's job.

pub mod parse;
pub mod tag;
pub mod wire;

pub use parse::parse;
pub use parse::strip_tags;
pub use tag::{Node, NodeId, TagNode, TextNode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupError {
    /// An opening tag was still unclosed at end of input.
    UnterminatedTag { name: String },
    /// A closing tag arrived with nothing open.
    StrayClose { name: String },
}

impl std::fmt::Display for MarkupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarkupError::UnterminatedTag { name } => {
                write!(f, "malformed markup: unterminated tag {{{name}}}")
            }
            MarkupError::StrayClose { name } => {
                write!(f, "malformed markup: stray closing tag {{/{name}}}")
            }
        }
    }
}

impl std::error::Error for MarkupError {}
