//! Bounded rolling history of segmented lines.
//!
//! The pane keeps at most `max_breaks` break markers; older content is
//! trimmed from the front, always at a break boundary, never through the
//! middle of a line. One append-and-trim call completes before the next
//! begins - the host's single update cycle owns this state exclusively.

use crate::segment::LineItem;

/// Ceiling used by the game client.
pub const DEFAULT_MAX_BREAKS: usize = 500;

#[derive(Debug)]
pub struct Scrollback {
    max_breaks: usize,
    items: Vec<LineItem>,
}

impl Scrollback {
    pub fn new(max_breaks: usize) -> Self {
        Self {
            max_breaks: max_breaks.max(1),
            items: Vec::new(),
        }
    }

    pub fn append(&mut self, batch: Vec<LineItem>) {
        self.items.extend(batch);
        self.trim();
    }

    /// Drop the oldest content once the break ceiling is exceeded.
    ///
    /// Walk from the newest end counting breaks; past the ceiling, cut just
    /// after the next older break, then drop any breaks left stranded at the
    /// front so the pane never opens on a phantom blank line.
    fn trim(&mut self) {
        let mut breaks = 0usize;
        let mut cut = 0usize;
        for (i, item) in self.items.iter().enumerate().rev() {
            if item.is_break() {
                breaks += 1;
                if breaks > self.max_breaks {
                    cut = i + 1;
                    break;
                }
            }
        }
        if cut == 0 {
            return;
        }
        while self
            .items
            .get(cut)
            .is_some_and(LineItem::is_break)
        {
            cut += 1;
        }
        self.items.drain(..cut);
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn break_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_break()).count()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
