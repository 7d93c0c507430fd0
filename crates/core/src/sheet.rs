use serde::Serialize;
use thiserror::Error;

use super::item::{ItemDraft, ItemRecord, ValidationError};
use super::money::Money;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SheetError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Row index {index} out of range (sheet has {len} items)")]
    OutOfRange { index: usize, len: usize },
}

/// The editable list of items for one receipt, between extraction and save.
///
/// Every edit goes through [`ItemDraft::validate`] and leaves row numbers as
/// the gapless sequence 1..N.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ItemSheet {
    items: Vec<ItemRecord>,
}

impl ItemSheet {
    pub fn new(items: Vec<ItemRecord>) -> Self {
        let mut sheet = ItemSheet { items };
        sheet.renumber();
        sheet
    }

    pub fn items(&self) -> &[ItemRecord] {
        &self.items
    }

    pub fn into_items(self) -> Vec<ItemRecord> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total(&self) -> Money {
        self.items.iter().map(ItemRecord::line_total).sum()
    }

    pub fn push(&mut self, draft: ItemDraft) -> Result<&ItemRecord, SheetError> {
        let index = self.items.len();
        self.insert(index, draft)
    }

    /// Insert before `index`; `index == len` appends.
    pub fn insert(&mut self, index: usize, draft: ItemDraft) -> Result<&ItemRecord, SheetError> {
        if index > self.items.len() {
            return Err(SheetError::OutOfRange { index, len: self.items.len() });
        }
        let item = draft.validate(row_number(index))?;
        self.items.insert(index, item);
        self.renumber();
        Ok(&self.items[index])
    }

    pub fn replace(&mut self, index: usize, draft: ItemDraft) -> Result<&ItemRecord, SheetError> {
        self.check_index(index)?;
        self.items[index] = draft.validate(row_number(index))?;
        Ok(&self.items[index])
    }

    pub fn remove(&mut self, index: usize) -> Result<ItemRecord, SheetError> {
        self.check_index(index)?;
        let removed = self.items.remove(index);
        self.renumber();
        Ok(removed)
    }

    fn check_index(&self, index: usize) -> Result<(), SheetError> {
        if index < self.items.len() {
            Ok(())
        } else {
            Err(SheetError::OutOfRange { index, len: self.items.len() })
        }
    }

    fn renumber(&mut self) {
        for (i, item) in self.items.iter_mut().enumerate() {
            item.row_number = row_number(i);
        }
    }
}

fn row_number(index: usize) -> u32 {
    u32::try_from(index + 1).unwrap_or(u32::MAX)
}
