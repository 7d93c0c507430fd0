use bonnetje_core::ItemRecord;
use rust_decimal::Decimal;

/// Numbers items in emission order, starting at 1.
#[derive(Debug)]
pub struct ItemBuilder {
    next_row: u32,
}

impl Default for ItemBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemBuilder {
    pub fn new() -> Self {
        Self { next_row: 1 }
    }

    pub fn build(&mut self, source_name: String, price: Decimal) -> ItemRecord {
        let item = ItemRecord::new(self.next_row, source_name, price);
        self.next_row += 1;
        item
    }

    /// Number of records built so far.
    pub fn emitted(&self) -> u32 {
        self.next_row - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bonnetje_core::CATEGORY_PLACEHOLDER;

    #[test]
    fn rows_are_sequential_from_one() {
        let mut b = ItemBuilder::new();
        let rows: Vec<u32> = (0..3)
            .map(|i| b.build(format!("item {i}"), Decimal::ONE).row_number)
            .collect();
        assert_eq!(rows, vec![1, 2, 3]);
        assert_eq!(b.emitted(), 3);
    }

    #[test]
    fn record_carries_extraction_defaults() {
        let item = ItemBuilder::new().build("Kaas".into(), Decimal::new(319, 2));
        assert_eq!(item.source_name, "Kaas");
        assert_eq!(item.translated_name, "");
        assert_eq!(item.quantity, 1);
        assert_eq!(item.category, CATEGORY_PLACEHOLDER);
    }
}
