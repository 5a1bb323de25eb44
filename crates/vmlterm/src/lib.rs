//! `vmlterm`: turns `vmlproto` tag trees into renderable terminal-pane lines.
//!
//! Three pieces, in data-flow order:
//! - `segment`: split trees on embedded newlines into discrete lines,
//!   re-wrapping the surviving tag context on each side of every break,
//! - `scrollback`: the bounded rolling history of segmented lines,
//! - `render`: the renderer-facing walk over a segmented line.
//!
//! Segmentation never mutates its input and never fails; the scrollback is
//! the only mutable state, owned by the single update cycle that drives it.

pub mod render;
pub mod scrollback;
pub mod segment;

pub use scrollback::Scrollback;
pub use segment::{Line, LineBreak, LineItem, Piece, segment, segment_tree};
