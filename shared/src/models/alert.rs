//! Payment alert models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A notification materialized from the invoice ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentAlert {
    pub id: Uuid,
    pub alert_type: AlertType,
    pub invoice_id: Uuid,
    pub invoice_number: String,
    pub supplier_id: String,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub days_overdue: Option<i64>,
    pub priority: AlertPriority,
    pub acknowledged: bool,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    DueSoon,
    Overdue,
    /// Reserved: invoices carry no early-payment terms yet
    DiscountAvailable,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::DueSoon => "due_soon",
            AlertType::Overdue => "overdue",
            AlertType::DiscountAvailable => "discount_available",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum AlertPriority {
    Low,
    Medium,
    High,
}

/// Days-before/after thresholds used to rank alerts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityThresholds {
    /// `due_soon` alerts at most this many days out are medium
    pub medium_within_days: i64,
    /// Overdue alerts at least this many days late are high
    pub high_after_overdue_days: i64,
}

impl Default for PriorityThresholds {
    fn default() -> Self {
        Self {
            medium_within_days: 3,
            high_after_overdue_days: 1,
        }
    }
}

/// Rank an overdue alert by how late the invoice is
pub fn overdue_priority(days_overdue: i64, thresholds: &PriorityThresholds) -> AlertPriority {
    if days_overdue >= thresholds.high_after_overdue_days {
        AlertPriority::High
    } else {
        AlertPriority::Medium
    }
}

/// Rank a due-soon alert by how close the due date is
pub fn due_soon_priority(days_until_due: i64, thresholds: &PriorityThresholds) -> AlertPriority {
    if days_until_due <= thresholds.medium_within_days {
        AlertPriority::Medium
    } else {
        AlertPriority::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overdue_priority() {
        let thresholds = PriorityThresholds::default();
        assert_eq!(overdue_priority(5, &thresholds), AlertPriority::High);
        assert_eq!(overdue_priority(1, &thresholds), AlertPriority::High);
        assert_eq!(overdue_priority(0, &thresholds), AlertPriority::Medium);
    }

    #[test]
    fn test_due_soon_priority() {
        let thresholds = PriorityThresholds::default();
        assert_eq!(due_soon_priority(0, &thresholds), AlertPriority::Medium);
        assert_eq!(due_soon_priority(3, &thresholds), AlertPriority::Medium);
        assert_eq!(due_soon_priority(6, &thresholds), AlertPriority::Low);
    }

    #[test]
    fn test_priority_ordering() {
        assert!(AlertPriority::High > AlertPriority::Medium);
        assert!(AlertPriority::Medium > AlertPriority::Low);
    }
}
