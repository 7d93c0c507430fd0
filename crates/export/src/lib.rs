//! Tabular export of receipt items.

use bonnetje_core::{ItemRecord, Money};
use bonnetje_storage::ReceiptRow;
use chrono::NaiveDate;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

/// Receipt-level values repeated on every exported item row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptMetadata {
    pub store_name: String,
    pub date: NaiveDate,
}

const ITEM_HEADERS: [&str; 8] =
    ["Row", "Name", "Translated Name", "Price", "Quantity", "Category", "Store", "Date"];
const ROW_HEADERS: [&str; 6] = ["Receipt ID", "Store", "Date", "Item", "Price", "Category"];

#[derive(Serialize)]
struct ItemLine<'a> {
    row_number: u32,
    source_name: &'a str,
    translated_name: &'a str,
    price: String,
    quantity: u32,
    category: &'a str,
    store: &'a str,
    date: &'a str,
}

#[derive(Serialize)]
struct StoredLine<'a> {
    receipt_id: i64,
    store: &'a str,
    date: &'a str,
    item_name: &'a str,
    price: String,
    category: &'a str,
}

fn amount(m: Money) -> String {
    format!("{:.2}", m.as_decimal())
}

/// CSV writer with the header row already written, so an empty export still
/// names its columns.
fn writer_with_headers<W: Write>(writer: W, headers: &[&str]) -> Result<csv::Writer<W>, ExportError> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(headers)?;
    Ok(wtr)
}

/// Write one receipt's items, with store and date appended to every row.
pub fn export_items<W: Write>(
    writer: W,
    items: &[ItemRecord],
    metadata: &ReceiptMetadata,
) -> Result<(), ExportError> {
    let mut wtr = writer_with_headers(writer, &ITEM_HEADERS)?;
    let date = metadata.date.format("%Y-%m-%d").to_string();
    for item in items {
        wtr.serialize(ItemLine {
            row_number: item.row_number,
            source_name: &item.source_name,
            translated_name: &item.translated_name,
            price: amount(Money::from_decimal(item.price)),
            quantity: item.quantity,
            category: &item.category,
            store: &metadata.store_name,
            date: &date,
        })?;
    }
    wtr.flush()?;
    tracing::debug!(rows = items.len(), store = %metadata.store_name, "exported receipt items");
    Ok(())
}

/// Write already-materialized rows, e.g. a filtered listing.
pub fn export_rows<W: Write>(writer: W, rows: &[ReceiptRow]) -> Result<(), ExportError> {
    let mut wtr = writer_with_headers(writer, &ROW_HEADERS)?;
    for row in rows {
        wtr.serialize(StoredLine {
            receipt_id: row.receipt_id,
            store: &row.store_name,
            date: &row.date,
            item_name: &row.item_name,
            price: amount(row.price),
            category: &row.category,
        })?;
    }
    wtr.flush()?;
    tracing::debug!(rows = rows.len(), "exported receipt rows");
    Ok(())
}

pub fn export_items_to_file(
    path: &Path,
    items: &[ItemRecord],
    metadata: &ReceiptMetadata,
) -> Result<(), ExportError> {
    export_items(std::fs::File::create(path)?, items, metadata)
}

pub fn export_rows_to_file(path: &Path, rows: &[ReceiptRow]) -> Result<(), ExportError> {
    export_rows(std::fs::File::create(path)?, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn metadata() -> ReceiptMetadata {
        ReceiptMetadata {
            store_name: "Albert Heijn".into(),
            date: NaiveDate::from_ymd_opt(2026, 9, 3).unwrap(),
        }
    }

    #[test]
    fn items_with_metadata_columns() {
        let items = vec![
            ItemRecord::new(1, "Melk", Decimal::from_str("1.38").unwrap()).with_translation("Milk"),
            ItemRecord::new(2, "Statiegeld", Decimal::from_str("-0.5").unwrap()),
        ];
        let mut out = Vec::new();
        export_items(&mut out, &items, &metadata()).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Row,Name,Translated Name,Price,Quantity,Category,Store,Date");
        assert_eq!(lines[1], "1,Melk,Milk,1.38,1,Uncategorized,Albert Heijn,2026-09-03");
        assert_eq!(lines[2], "2,Statiegeld,,-0.50,1,Uncategorized,Albert Heijn,2026-09-03");
    }

    #[test]
    fn names_with_commas_are_quoted() {
        let items = vec![ItemRecord::new(1, "Kaas, jong", Decimal::from_str("3.19").unwrap())];
        let mut out = Vec::new();
        export_items(&mut out, &items, &metadata()).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("\"Kaas, jong\""));
    }

    #[test]
    fn stored_rows_layout() {
        let rows = vec![ReceiptRow {
            receipt_id: 7,
            store_name: "Jumbo".into(),
            date: "2026-09-20".into(),
            row_number: 1,
            item_name: "Cheese".into(),
            price: Money::from_cents(319),
            category: "Groceries".into(),
        }];
        let mut out = Vec::new();
        export_rows(&mut out, &rows).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "Receipt ID,Store,Date,Item,Price,Category\n7,Jumbo,2026-09-20,Cheese,3.19,Groceries\n"
        );
    }

    #[test]
    fn export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bon.csv");
        let items = vec![ItemRecord::new(1, "Brood", Decimal::from_str("2.49").unwrap())];
        export_items_to_file(&path, &items, &metadata()).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("Brood"));
    }

    #[test]
    fn empty_export_still_has_header_row() {
        let mut out = Vec::new();
        export_rows(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Receipt ID,Store,Date,Item,Price,Category\n");

        let mut out = Vec::new();
        export_items(&mut out, &[], &metadata()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Row,Name,Translated Name,Price,Quantity,Category,Store,Date\n"
        );
    }
}
