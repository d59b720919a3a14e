use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::Direction;

/// A persisted, confirmed financial transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub user_id: i64,
    pub account_id: Option<i64>,
    pub description: String,
    pub amount: f64,
    pub direction: Direction,
    pub occurred_at: NaiveDateTime,
    pub payment_method: Option<String>,
    pub fiscal_document_id: Option<String>,
    pub category_id: Option<i64>,
    pub subcategory_id: Option<i64>,
}

/// An entry ready for insertion (no id yet).
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    pub user_id: i64,
    pub account_id: Option<i64>,
    pub description: String,
    pub amount: f64,
    pub direction: Direction,
    pub occurred_at: NaiveDateTime,
    pub payment_method: Option<String>,
    pub fiscal_document_id: Option<String>,
    pub category_id: Option<i64>,
    pub subcategory_id: Option<i64>,
    pub line_items: Vec<NewLineItem>,
}

/// An itemized purchase line attached to a receipt entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLineItem {
    pub item_name: String,
    pub quantity: f64,
    pub unit_price: f64,
}
