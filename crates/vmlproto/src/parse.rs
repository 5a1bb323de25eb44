//! Tokenizer for the bracket-tag grammar.
//!
//! One left-to-right scan over the input. `{` opens a candidate token; the
//! token ends at the first `}` outside a quoted attribute value. A span that
//! does not shape up as `{name ...}` or `{/name}` stays literal text.
//!
//! Open tags are tracked on an explicit stack. Closing tag names are not
//! re-validated against the tag they pop: the protocol is server-generated
//! and assumed well-formed, and the two malformed shapes that can still
//! occur (unterminated tag, stray close) surface as [`MarkupError`].

use std::collections::BTreeMap;

use memchr::memchr;

use crate::MarkupError;
use crate::tag::{Node, NodeId, TagNode};

/// Name of the implicit tag the whole input is wrapped in before parsing.
pub const ROOT_TAG: &str = "root";

struct Frame {
    name: String,
    attributes: BTreeMap<String, String>,
    children: Vec<Node>,
}

impl Frame {
    fn into_tag(self) -> TagNode {
        TagNode {
            id: NodeId::fresh(),
            name: self.name,
            attributes: self.attributes,
            children: self.children,
        }
    }
}

enum Token {
    Open {
        name: String,
        attributes: BTreeMap<String, String>,
    },
    Close {
        name: String,
    },
}

enum Scan {
    /// A tag token and the index just past its closing `}`.
    Token(Token, usize),
    /// The `{` does not begin a tag; emit it literally and keep scanning.
    Literal,
    /// No closing `}` remains; the rest of the input is literal.
    NoClose,
}

/// Parse one raw VML string into a single tree rooted at [`ROOT_TAG`].
pub fn parse(input: &str) -> Result<TagNode, MarkupError> {
    let bytes = input.as_bytes();
    let mut stack = vec![Frame {
        name: ROOT_TAG.to_string(),
        attributes: BTreeMap::new(),
        children: Vec::new(),
    }];

    let mut i = 0;
    while i < input.len() {
        let Some(off) = memchr(b'{', &bytes[i..]) else {
            push_text(&mut stack, &input[i..]);
            break;
        };
        let open = i + off;
        push_text(&mut stack, &input[i..open]);

        match scan_token(input, open) {
            Scan::Token(Token::Open { name, attributes }, end) => {
                stack.push(Frame {
                    name,
                    attributes,
                    children: Vec::new(),
                });
                i = end;
            }
            Scan::Token(Token::Close { name }, end) => {
                let frame = match stack.pop() {
                    Some(f) if !stack.is_empty() => f,
                    _ => return Err(MarkupError::StrayClose { name }),
                };
                let tag = frame.into_tag();
                push_node(&mut stack, Node::Tag(tag));
                i = end;
            }
            Scan::Literal => {
                push_text(&mut stack, "{");
                i = open + 1;
            }
            Scan::NoClose => {
                push_text(&mut stack, &input[open..]);
                break;
            }
        }
    }

    if stack.len() > 1 {
        let name = stack.pop().map(|f| f.name).unwrap_or_default();
        return Err(MarkupError::UnterminatedTag { name });
    }
    Ok(stack.pop().expect("root frame").into_tag())
}

/// Remove every `{...}` span from command text headed back to the server:
/// non-greedy to the next `}`, never across a newline, and a `{` that never
/// closes stays literal.
pub fn strip_tags(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while let Some(off) = memchr(b'{', &bytes[i..]) {
        let open = i + off;
        out.push_str(&s[i..open]);
        let rest = &bytes[open + 1..];
        match (memchr(b'}', rest), memchr(b'\n', rest)) {
            (Some(c), n) if n.is_none_or(|n| c < n) => {
                i = open + 1 + c + 1;
            }
            _ => {
                out.push('{');
                i = open + 1;
            }
        }
    }
    out.push_str(&s[i..]);
    out
}

fn push_text(stack: &mut Vec<Frame>, s: &str) {
    if s.is_empty() {
        return;
    }
    let frame = stack.last_mut().expect("root frame");
    // Coalesce adjacent literal spills into one text node.
    if let Some(Node::Text(t)) = frame.children.last_mut() {
        t.content.push_str(s);
    } else {
        frame.children.push(Node::text(s));
    }
}

fn push_node(stack: &mut Vec<Frame>, node: Node) {
    stack.last_mut().expect("root frame").children.push(node);
}

fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

fn scan_token(input: &str, open: usize) -> Scan {
    let bytes = input.as_bytes();

    // Find the closing `}`, skipping quoted attribute values (which may
    // contain braces - `send='look at {npc}orc{/npc}'` is one token).
    let mut quote: Option<u8> = None;
    let mut close = None;
    let mut k = open + 1;
    while k < bytes.len() {
        let b = bytes[k];
        match quote {
            Some(q) => {
                if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'}' => {
                    close = Some(k);
                    break;
                }
                b'\'' | b'"' => quote = Some(b),
                _ => {}
            },
        }
        k += 1;
    }
    let Some(close) = close else {
        return Scan::NoClose;
    };

    let body = &input[open + 1..close];
    let end = close + 1;

    if let Some(rest) = body.strip_prefix('/') {
        let name = rest.trim();
        if name.is_empty() || !name.bytes().all(is_word) {
            return Scan::Literal;
        }
        return Scan::Token(
            Token::Close {
                name: name.to_string(),
            },
            end,
        );
    }

    let trimmed = body.trim_start();
    if !trimmed.as_bytes().first().copied().is_some_and(is_word) {
        return Scan::Literal;
    }
    let name_len = trimmed
        .bytes()
        .take_while(|b| is_word(*b))
        .count();
    let name = &trimmed[..name_len];

    let mut attributes = BTreeMap::new();
    let toks = body_tokens(&trimmed[name_len..]);
    for pair in toks.chunks(2) {
        // A trailing key with no value is dropped.
        if let [key, value] = pair {
            attributes.insert(key.clone(), value.clone());
        }
    }

    Scan::Token(
        Token::Open {
            name: name.to_string(),
            attributes,
        },
        end,
    )
}

/// Tokenize a tag body into bare words and quoted strings. Everything else
/// (whitespace, `=`) is separator noise; the caller pairs the tokens up
/// alternately as key/value.
fn body_tokens(body: &str) -> Vec<String> {
    let bytes = body.as_bytes();
    let mut toks = Vec::new();
    let mut k = 0;
    while k < bytes.len() {
        let b = bytes[k];
        if is_word(b) {
            let start = k;
            while k < bytes.len() && is_word(bytes[k]) {
                k += 1;
            }
            toks.push(body[start..k].to_string());
        } else if b == b'\'' || b == b'"' {
            let start = k + 1;
            match memchr(b, &bytes[start..]) {
                Some(off) => {
                    toks.push(body[start..start + off].to_string());
                    k = start + off + 1;
                }
                None => {
                    // The `}` scan guarantees quotes close; bail anyway.
                    k = bytes.len();
                }
            }
        } else {
            k += 1;
        }
    }
    toks
}
