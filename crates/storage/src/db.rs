use bonnetje_core::{ItemRecord, Money};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, QueryBuilder, Sqlite};
use std::path::Path;
use thiserror::Error;

pub type DbPool = Pool<Sqlite>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Amount {0} does not fit in the ledger")]
    AmountOutOfRange(Money),
    #[error("Item {row}: price {price} is not a whole number of cents")]
    SubCentPrice { row: u32, price: rust_decimal::Decimal },
}

/// Header of a stored receipt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceiptSummary {
    pub id: i64,
    pub store_name: String,
    pub date: String,
    pub total: Money,
    pub created_at: String,
}

/// One item joined with its receipt header; the unit of listing and export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceiptRow {
    pub receipt_id: i64,
    pub store_name: String,
    pub date: String,
    pub row_number: u32,
    pub item_name: String,
    pub price: Money,
    pub category: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReceiptFilter {
    pub store: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreTotal {
    pub store_name: String,
    pub total: Money,
    pub receipts: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseSummary {
    pub total: Money,
    pub by_store: Vec<StoreTotal>,
    pub by_category: Vec<CategoryTotal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotal {
    /// `YYYY-MM`
    pub month: String,
    pub total: Money,
    pub receipts: i64,
}

pub async fn create_db(path: &Path) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    run_migrations(&pool).await?;
    tracing::info!(path = %path.display(), "receipt database ready");

    Ok(pool)
}

async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS receipts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            store_name TEXT NOT NULL,
            date TEXT NOT NULL,
            total_cents INTEGER NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            receipt_id INTEGER NOT NULL,
            row_number INTEGER NOT NULL,
            item_name TEXT NOT NULL,
            source_name TEXT NOT NULL,
            price_cents INTEGER NOT NULL,
            quantity INTEGER NOT NULL DEFAULT 1,
            category TEXT NOT NULL,
            FOREIGN KEY (receipt_id) REFERENCES receipts(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_items_receipt ON items(receipt_id)")
        .execute(pool)
        .await?;

    Ok(())
}

fn cents(amount: Money) -> Result<i64, StorageError> {
    amount.to_cents().ok_or(StorageError::AmountOutOfRange(amount))
}

/// Store a receipt and its items in one transaction; returns the new id.
/// The stored total is the sum of price × quantity over `items`.
pub async fn save_receipt(
    pool: &DbPool,
    store_name: &str,
    date: NaiveDate,
    items: &[ItemRecord],
) -> Result<i64, StorageError> {
    if let Some(item) = items.iter().find(|i| i.price.normalize().scale() > 2) {
        return Err(StorageError::SubCentPrice { row: item.row_number, price: item.price });
    }
    let total: Money = items.iter().map(ItemRecord::line_total).sum();

    let mut tx = pool.begin().await?;
    let receipt_id = sqlx::query(
        "INSERT INTO receipts (store_name, date, total_cents) VALUES (?, ?, ?)",
    )
    .bind(store_name)
    .bind(date.format("%Y-%m-%d").to_string())
    .bind(cents(total)?)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    for item in items {
        sqlx::query(
            "INSERT INTO items (receipt_id, row_number, item_name, source_name, price_cents, quantity, category) VALUES (?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(receipt_id)
        .bind(i64::from(item.row_number))
        .bind(&item.translated_name)
        .bind(&item.source_name)
        .bind(cents(Money::from_decimal(item.price))?)
        .bind(i64::from(item.quantity))
        .bind(&item.category)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    tracing::info!(receipt_id, store_name, items = items.len(), %total, "receipt saved");
    Ok(receipt_id)
}

pub async fn get_receipt(pool: &DbPool, id: i64) -> Result<Option<ReceiptSummary>, sqlx::Error> {
    let row = sqlx::query_as::<_, (i64, String, String, i64, String)>(
        "SELECT id, store_name, date, total_cents, created_at FROM receipts WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| ReceiptSummary {
        id: r.0,
        store_name: r.1,
        date: r.2,
        total: Money::from_cents(r.3),
        created_at: r.4,
    }))
}

pub async fn get_receipt_items(pool: &DbPool, receipt_id: i64) -> Result<Vec<ItemRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (i64, String, String, i64, i64, String)>(
        "SELECT row_number, source_name, item_name, price_cents, quantity, category FROM items WHERE receipt_id = ? ORDER BY row_number"
    )
    .bind(receipt_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|r| {
            Ok(ItemRecord {
                row_number: to_u32(r.0, "row_number")?,
                source_name: r.1,
                translated_name: r.2,
                price: Money::from_cents(r.3).as_decimal(),
                quantity: to_u32(r.4, "quantity")?,
                category: r.5,
            })
        })
        .collect()
}

const ROW_SELECT: &str = r#"
    SELECT r.id, r.store_name, r.date, i.row_number, i.item_name, i.price_cents, i.category
    FROM receipts r
    JOIN items i ON r.id = i.receipt_id
    WHERE 1=1
"#;

type RowTuple = (i64, String, String, i64, String, i64, String);

fn to_receipt_row(r: RowTuple) -> Result<ReceiptRow, sqlx::Error> {
    Ok(ReceiptRow {
        receipt_id: r.0,
        store_name: r.1,
        date: r.2,
        row_number: to_u32(r.3, "row_number")?,
        item_name: r.4,
        price: Money::from_cents(r.5),
        category: r.6,
    })
}

/// Row numbers and quantities are written from `u32`; anything else in the
/// column is corruption and surfaces as a decode error.
fn to_u32(v: i64, column: &str) -> Result<u32, sqlx::Error> {
    u32::try_from(v).map_err(|e| {
        tracing::warn!(column, value = v, "stored value out of range");
        sqlx::Error::ColumnDecode { index: column.to_string(), source: Box::new(e) }
    })
}

pub async fn get_all_receipts_with_items(pool: &DbPool) -> Result<Vec<ReceiptRow>, sqlx::Error> {
    get_filtered_receipts(pool, &ReceiptFilter::default()).await
}

/// Rows matching every set field of `filter`; date bounds are inclusive.
pub async fn get_filtered_receipts(
    pool: &DbPool,
    filter: &ReceiptFilter,
) -> Result<Vec<ReceiptRow>, sqlx::Error> {
    let mut qb = QueryBuilder::<Sqlite>::new(ROW_SELECT);
    if let Some(store) = &filter.store {
        qb.push(" AND r.store_name = ").push_bind(store.clone());
    }
    if let Some(from) = filter.from {
        qb.push(" AND r.date >= ").push_bind(from.format("%Y-%m-%d").to_string());
    }
    if let Some(to) = filter.to {
        qb.push(" AND r.date <= ").push_bind(to.format("%Y-%m-%d").to_string());
    }
    qb.push(" ORDER BY r.date DESC, r.id, i.row_number");

    let rows = qb.build_query_as::<RowTuple>().fetch_all(pool).await?;
    rows.into_iter().map(to_receipt_row).collect()
}

pub async fn get_all_stores(pool: &DbPool) -> Result<Vec<String>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (String,)>(
        "SELECT DISTINCT store_name FROM receipts ORDER BY store_name",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|r| r.0).collect())
}

pub async fn get_expense_summary(pool: &DbPool) -> Result<ExpenseSummary, sqlx::Error> {
    let (total,) = sqlx::query_as::<_, (Option<i64>,)>("SELECT SUM(total_cents) FROM receipts")
        .fetch_one(pool)
        .await?;

    let by_store = sqlx::query_as::<_, (String, i64, i64)>(
        r#"
        SELECT store_name, SUM(total_cents), COUNT(*)
        FROM receipts
        GROUP BY store_name
        ORDER BY SUM(total_cents) DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    let by_category = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT category, SUM(price_cents * quantity)
        FROM items
        GROUP BY category
        ORDER BY SUM(price_cents * quantity) DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(ExpenseSummary {
        total: Money::from_cents(total.unwrap_or(0)),
        by_store: by_store
            .into_iter()
            .map(|r| StoreTotal { store_name: r.0, total: Money::from_cents(r.1), receipts: r.2 })
            .collect(),
        by_category: by_category
            .into_iter()
            .map(|r| CategoryTotal { category: r.0, total: Money::from_cents(r.1) })
            .collect(),
    })
}

pub async fn get_monthly_report(pool: &DbPool) -> Result<Vec<MonthlyTotal>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (String, i64, i64)>(
        r#"
        SELECT strftime('%Y-%m', date) AS month, SUM(total_cents), COUNT(*)
        FROM receipts
        GROUP BY month
        ORDER BY month DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| MonthlyTotal { month: r.0, total: Money::from_cents(r.1), receipts: r.2 })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    async fn test_db() -> (tempfile::TempDir, DbPool) {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_db(&dir.path().join("receipts.db")).await.unwrap();
        (dir, pool)
    }

    fn item(row: u32, name: &str, price: &str, quantity: u32, category: &str) -> ItemRecord {
        ItemRecord {
            quantity,
            category: category.to_string(),
            ..ItemRecord::new(row, name, Decimal::from_str(price).unwrap())
                .with_translation(format!("{name} (en)"))
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn seed(pool: &DbPool) -> (i64, i64, i64) {
        let ah = save_receipt(
            pool,
            "Albert Heijn",
            date(2026, 9, 3),
            &[
                item(1, "Melk", "1.38", 2, "Groceries"),
                item(2, "Statiegeld", "-0.25", 1, "Other"),
            ],
        )
        .await
        .unwrap();
        let jumbo = save_receipt(pool, "Jumbo", date(2026, 9, 20), &[item(1, "Kaas", "3.19", 1, "Groceries")])
            .await
            .unwrap();
        let ah2 = save_receipt(pool, "Albert Heijn", date(2026, 10, 1), &[item(1, "Shampoo", "4.99", 1, "Health & Beauty")])
            .await
            .unwrap();
        (ah, jumbo, ah2)
    }

    #[tokio::test]
    async fn save_computes_total_from_price_and_quantity() {
        let (_dir, pool) = test_db().await;
        let (ah, _, _) = seed(&pool).await;

        let receipt = get_receipt(&pool, ah).await.unwrap().unwrap();
        assert_eq!(receipt.store_name, "Albert Heijn");
        assert_eq!(receipt.date, "2026-09-03");
        assert_eq!(receipt.total, Money::from_cents(251));
    }

    #[tokio::test]
    async fn items_roundtrip_in_row_order() {
        let (_dir, pool) = test_db().await;
        let (ah, _, _) = seed(&pool).await;

        let items = get_receipt_items(&pool, ah).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].source_name, "Melk");
        assert_eq!(items[0].translated_name, "Melk (en)");
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[1].price, Decimal::from_str("-0.25").unwrap());
    }

    #[tokio::test]
    async fn validated_prices_read_back_unchanged() {
        let (_dir, pool) = test_db().await;
        let draft = bonnetje_core::ItemDraft {
            source_name: "Kaas".into(),
            translated_name: "Cheese".into(),
            price: "3,10".into(),
            quantity: "3".into(),
            category: "Groceries".into(),
        };
        let saved = draft.validate(1).unwrap();
        let id = save_receipt(&pool, "Jumbo", date(2026, 9, 20), &[saved.clone()]).await.unwrap();

        assert_eq!(get_receipt_items(&pool, id).await.unwrap(), vec![saved]);
        assert_eq!(get_receipt(&pool, id).await.unwrap().unwrap().total, Money::from_cents(930));
    }

    #[tokio::test]
    async fn sub_cent_price_is_rejected_not_rounded() {
        let (_dir, pool) = test_db().await;
        let err = save_receipt(&pool, "Jumbo", date(2026, 9, 20), &[item(1, "Kaas", "1.005", 1, "Groceries")])
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::SubCentPrice { row: 1, .. }), "got {err:?}");
        assert!(get_all_receipts_with_items(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_quantity_is_a_decode_error() {
        let (_dir, pool) = test_db().await;
        let (ah, _, _) = seed(&pool).await;
        sqlx::query("UPDATE items SET quantity = -1 WHERE receipt_id = ?")
            .bind(ah)
            .execute(&pool)
            .await
            .unwrap();

        let err = get_receipt_items(&pool, ah).await.unwrap_err();
        assert!(matches!(err, sqlx::Error::ColumnDecode { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn missing_receipt_is_none() {
        let (_dir, pool) = test_db().await;
        assert!(get_receipt(&pool, 42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn all_rows_newest_first() {
        let (_dir, pool) = test_db().await;
        seed(&pool).await;

        let rows = get_all_receipts_with_items(&pool).await.unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.item_name.as_str()).collect();
        assert_eq!(names, vec!["Shampoo (en)", "Kaas (en)", "Melk (en)", "Statiegeld (en)"]);
    }

    #[tokio::test]
    async fn filter_by_store_and_dates() {
        let (_dir, pool) = test_db().await;
        seed(&pool).await;

        let filter = ReceiptFilter { store: Some("Albert Heijn".into()), ..Default::default() };
        assert_eq!(get_filtered_receipts(&pool, &filter).await.unwrap().len(), 3);

        let filter = ReceiptFilter {
            store: None,
            from: Some(date(2026, 9, 3)),
            to: Some(date(2026, 9, 20)),
        };
        let rows = get_filtered_receipts(&pool, &filter).await.unwrap();
        let stores: Vec<&str> = rows.iter().map(|r| r.store_name.as_str()).collect();
        assert_eq!(stores, vec!["Jumbo", "Albert Heijn", "Albert Heijn"]);
    }

    #[tokio::test]
    async fn distinct_stores_sorted() {
        let (_dir, pool) = test_db().await;
        seed(&pool).await;
        assert_eq!(get_all_stores(&pool).await.unwrap(), vec!["Albert Heijn", "Jumbo"]);
    }

    #[tokio::test]
    async fn expense_summary_groups() {
        let (_dir, pool) = test_db().await;
        seed(&pool).await;

        let summary = get_expense_summary(&pool).await.unwrap();
        assert_eq!(summary.total, Money::from_cents(251 + 319 + 499));
        assert_eq!(summary.by_store[0].store_name, "Albert Heijn");
        assert_eq!(summary.by_store[0].receipts, 2);
        assert_eq!(summary.by_store[0].total, Money::from_cents(750));

        let groceries = summary.by_category.iter().find(|c| c.category == "Groceries").unwrap();
        assert_eq!(groceries.total, Money::from_cents(276 + 319));
    }

    #[tokio::test]
    async fn empty_database_summary_is_zero() {
        let (_dir, pool) = test_db().await;
        let summary = get_expense_summary(&pool).await.unwrap();
        assert!(summary.total.is_zero());
        assert!(summary.by_store.is_empty());
        assert!(get_monthly_report(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn monthly_report_newest_month_first() {
        let (_dir, pool) = test_db().await;
        seed(&pool).await;

        let report = get_monthly_report(&pool).await.unwrap();
        assert_eq!(report.len(), 2);
        assert_eq!(report[0].month, "2026-10");
        assert_eq!(report[1].month, "2026-09");
        assert_eq!(report[1].receipts, 2);
        assert_eq!(report[1].total, Money::from_cents(251 + 319));
    }
}
