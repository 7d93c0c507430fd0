pub mod config;
pub mod item;
pub mod money;
pub mod sheet;

pub use config::{ConfigError, OcrSettings, ServerSettings, Settings, TranslationSettings};
pub use item::{ItemDraft, ItemRecord, ValidationError, CATEGORY_PLACEHOLDER, DEFAULT_CATEGORIES};
pub use money::Money;
pub use sheet::{ItemSheet, SheetError};
