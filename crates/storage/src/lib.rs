pub mod db;

pub use db::{
    create_db, get_all_receipts_with_items, get_all_stores, get_expense_summary,
    get_filtered_receipts, get_monthly_report, get_receipt, get_receipt_items, save_receipt,
    CategoryTotal, DbPool, ExpenseSummary, MonthlyTotal, ReceiptFilter, ReceiptRow,
    ReceiptSummary, StorageError, StoreTotal,
};
