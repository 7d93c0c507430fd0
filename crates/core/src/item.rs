use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use thiserror::Error;

use super::money::Money;

/// Category assigned to every freshly extracted item until someone
/// classifies it.
pub const CATEGORY_PLACEHOLDER: &str = "Uncategorized";

pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Groceries",
    "Electronics",
    "Clothing",
    "Health & Beauty",
    "Home & Garden",
    "Sports",
    "Books",
    "Restaurants",
    "Other",
];

/// One purchased line on a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    /// 1-based position within the receipt, gapless.
    pub row_number: u32,
    /// Name as printed on the receipt (source language).
    pub source_name: String,
    /// Name in the target language; empty until translated.
    pub translated_name: String,
    pub price: Decimal,
    pub quantity: u32,
    pub category: String,
}

impl ItemRecord {
    pub fn new(row_number: u32, source_name: impl Into<String>, price: Decimal) -> Self {
        ItemRecord {
            row_number,
            source_name: source_name.into(),
            translated_name: String::new(),
            price,
            quantity: 1,
            category: CATEGORY_PLACEHOLDER.to_string(),
        }
    }

    /// Copy of this record carrying `translated_name`.
    pub fn with_translation(&self, translated_name: impl Into<String>) -> Self {
        ItemRecord { translated_name: translated_name.into(), ..self.clone() }
    }

    pub fn is_translated(&self) -> bool {
        !self.translated_name.is_empty()
    }

    pub fn line_total(&self) -> Money {
        Money::from_decimal(self.price) * self.quantity
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Price is not a number: '{0}'")]
    InvalidPrice(String),
    #[error("Price has more than two decimals: '{0}'")]
    SubCentPrice(String),
    #[error("Quantity is not a whole number: '{0}'")]
    InvalidQuantity(String),
    #[error("Quantity must be at least 1")]
    ZeroQuantity,
}

/// Unchecked item fields as they arrive from an editing surface (form
/// fields or a JSON body). Numbers may arrive as text or as JSON numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemDraft {
    #[serde(default)]
    pub source_name: String,
    #[serde(default)]
    pub translated_name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub price: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub quantity: String,
    #[serde(default)]
    pub category: String,
}

impl ItemDraft {
    /// Template for an item added by hand.
    pub fn blank() -> Self {
        ItemDraft {
            source_name: String::new(),
            translated_name: String::new(),
            price: "0.00".to_string(),
            quantity: "1".to_string(),
            category: CATEGORY_PLACEHOLDER.to_string(),
        }
    }

    pub fn validate(self, row_number: u32) -> Result<ItemRecord, ValidationError> {
        let source_name = required(self.source_name, "source_name")?;
        let translated_name = required(self.translated_name, "translated_name")?;
        let category = required(self.category, "category")?;

        let price_text = required(self.price, "price")?;
        let price = Decimal::from_str(&price_text.replace(',', "."))
            .map_err(|_| ValidationError::InvalidPrice(price_text.clone()))?;
        // Stored as whole cents; "1.500" is fine, "1.005" is not.
        if price.normalize().scale() > 2 {
            return Err(ValidationError::SubCentPrice(price_text));
        }

        let quantity_text = required(self.quantity, "quantity")?;
        let quantity: u32 = quantity_text
            .parse()
            .map_err(|_| ValidationError::InvalidQuantity(quantity_text.clone()))?;
        if quantity == 0 {
            return Err(ValidationError::ZeroQuantity);
        }

        Ok(ItemRecord {
            row_number,
            source_name,
            translated_name,
            price,
            quantity,
            category,
        })
    }
}

impl From<&ItemRecord> for ItemDraft {
    fn from(item: &ItemRecord) -> Self {
        ItemDraft {
            source_name: item.source_name.clone(),
            translated_name: item.translated_name.clone(),
            price: item.price.to_string(),
            quantity: item.quantity.to_string(),
            category: item.category.clone(),
        }
    }
}

fn required(value: String, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(trimmed.to_string())
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Field {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Field::deserialize(deserializer)? {
        Field::Text(s) => s,
        Field::Number(n) => n.to_string(),
    })
}
