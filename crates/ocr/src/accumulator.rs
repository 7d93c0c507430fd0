use bonnetje_core::ItemRecord;

use crate::builder::ItemBuilder;
use crate::price::PriceMatcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Run start, or the line right after an emitted item. The next
    /// non-blank line starts a new buffer.
    FreshStart,
    /// Lines, and blank lines, since the fresh start. Everything is kept
    /// until a price line yields a usable name.
    Accumulating,
}

/// Joins receipt lines into item names.
///
/// Lines accumulate in a pending buffer until one of them carries a price.
/// The buffer, minus price tokens and surrounding punctuation, becomes the
/// item name. Blank lines are skipped without ending the buffer, so a
/// description that OCR split over several lines (with or without empty
/// lines in between) still becomes one name.
#[derive(Debug)]
pub struct LineAccumulator {
    pending: String,
    phase: Phase,
    builder: ItemBuilder,
}

impl Default for LineAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl LineAccumulator {
    pub fn new() -> Self {
        Self {
            pending: String::new(),
            phase: Phase::FreshStart,
            builder: ItemBuilder::new(),
        }
    }

    /// Feed one line; returns the item it completes, if any.
    pub fn push_line(&mut self, line: &str) -> Option<ItemRecord> {
        let line = line.trim();
        if line.is_empty() {
            self.phase = Phase::Accumulating;
            return None;
        }

        if self.phase == Phase::FreshStart {
            self.pending.clear();
            self.phase = Phase::Accumulating;
        }
        self.pending.push_str(line);
        self.pending.push(' ');

        // Only the current line is searched; older lines in the buffer had
        // their chance already.
        let price = PriceMatcher::last_price(line)?;
        let name = PriceMatcher::clean_name(&self.pending);
        if name.chars().count() <= 1 {
            tracing::trace!(line, "price without a usable name, keeping buffer");
            return None;
        }

        let item = self.builder.build(name, price);
        self.pending.clear();
        self.phase = Phase::FreshStart;
        Some(item)
    }

    /// Text accumulated since the last item, not yet paired with a price.
    pub fn pending(&self) -> &str {
        self.pending.trim_end()
    }

    pub fn emitted(&self) -> u32 {
        self.builder.emitted()
    }
}
