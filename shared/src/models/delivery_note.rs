//! Delivery note models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A receipt of goods against a purchase order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryNote {
    pub id: Uuid,
    pub delivery_number: String,
    pub purchase_order_id: Uuid,
    pub supplier_id: String,
    pub supplier_name: String,
    pub delivery_date: NaiveDate,
    pub received_date: NaiveDate,
    pub status: DeliveryNoteStatus,
    pub items: Vec<DeliveryNoteItem>,
    pub notes: Option<String>,
    pub received_by: String,
    pub created_at: DateTime<Utc>,
}

/// One received line, reconciled against the ordered line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryNoteItem {
    pub id: Uuid,
    pub purchase_order_item_id: Uuid,
    pub product_id: String,
    pub product_name: String,
    pub ordered_quantity: Decimal,
    pub delivered_quantity: Decimal,
    pub received_quantity: Decimal,
    pub unit_price: Decimal,
    pub status: DeliveryLineStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryNoteStatus {
    Pending,
    Received,
    PartiallyReceived,
    Rejected,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryLineStatus {
    Pending,
    Received,
    Partial,
    Rejected,
}

impl DeliveryLineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryLineStatus::Pending => "pending",
            DeliveryLineStatus::Received => "received",
            DeliveryLineStatus::Partial => "partial",
            DeliveryLineStatus::Rejected => "rejected",
        }
    }

    /// Derive the line status from what the carrier brought and what was accepted
    pub fn derive(delivered: Decimal, received: Decimal) -> Self {
        if received <= Decimal::ZERO {
            if delivered > Decimal::ZERO {
                DeliveryLineStatus::Rejected
            } else {
                DeliveryLineStatus::Pending
            }
        } else if received < delivered {
            DeliveryLineStatus::Partial
        } else {
            DeliveryLineStatus::Received
        }
    }
}

impl DeliveryNoteStatus {
    /// Aggregate line statuses into the note status
    pub fn derive(lines: &[DeliveryLineStatus]) -> Self {
        if lines.is_empty() || lines.iter().all(|s| *s == DeliveryLineStatus::Pending) {
            DeliveryNoteStatus::Pending
        } else if lines.iter().all(|s| *s == DeliveryLineStatus::Received) {
            DeliveryNoteStatus::Received
        } else if lines.iter().all(|s| *s == DeliveryLineStatus::Rejected) {
            DeliveryNoteStatus::Rejected
        } else {
            DeliveryNoteStatus::PartiallyReceived
        }
    }
}

impl DeliveryNote {
    pub fn total_received(&self) -> Decimal {
        self.items.iter().map(|item| item.received_quantity).sum()
    }
}
