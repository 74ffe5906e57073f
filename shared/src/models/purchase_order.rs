//! Purchase order models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pricing::{line_amounts, DocumentTotals};

/// A purchase order sent to a supplier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: Uuid,
    pub order_number: String,
    pub supplier_id: String,
    pub supplier_name: String,
    pub order_date: NaiveDate,
    pub expected_delivery_date: NaiveDate,
    pub status: PurchaseOrderStatus,
    pub items: Vec<PurchaseOrderItem>,
    pub subtotal: Decimal,
    pub vat_amount: Decimal,
    pub total: Decimal,
    pub notes: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An ordered line with delivery and invoicing progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrderItem {
    pub id: Uuid,
    pub product_id: String,
    pub product_name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub vat_rate: Decimal,
    /// Pre-VAT line total
    pub total: Decimal,
    pub delivered_quantity: Decimal,
    pub invoiced_quantity: Decimal,
}

/// Lifecycle of a purchase order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseOrderStatus {
    Draft,
    Sent,
    Confirmed,
    PartiallyDelivered,
    Delivered,
    Invoiced,
    Cancelled,
}

impl PurchaseOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseOrderStatus::Draft => "draft",
            PurchaseOrderStatus::Sent => "sent",
            PurchaseOrderStatus::Confirmed => "confirmed",
            PurchaseOrderStatus::PartiallyDelivered => "partially_delivered",
            PurchaseOrderStatus::Delivered => "delivered",
            PurchaseOrderStatus::Invoiced => "invoiced",
            PurchaseOrderStatus::Cancelled => "cancelled",
        }
    }

    /// Statuses driven by receipts and invoices rather than set by hand
    pub fn is_derived(&self) -> bool {
        matches!(
            self,
            PurchaseOrderStatus::PartiallyDelivered
                | PurchaseOrderStatus::Delivered
                | PurchaseOrderStatus::Invoiced
        )
    }

    /// Whether goods may still be received against the order
    pub fn accepts_receipts(&self) -> bool {
        matches!(
            self,
            PurchaseOrderStatus::Sent
                | PurchaseOrderStatus::Confirmed
                | PurchaseOrderStatus::PartiallyDelivered
        )
    }
}

impl std::fmt::Display for PurchaseOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PurchaseOrderItem {
    pub fn new(
        product_id: String,
        product_name: String,
        quantity: Decimal,
        unit_price: Decimal,
        vat_rate: Decimal,
    ) -> Self {
        let amounts = line_amounts(quantity, unit_price, vat_rate);
        Self {
            id: Uuid::new_v4(),
            product_id,
            product_name,
            quantity,
            unit_price,
            vat_rate,
            total: amounts.total,
            delivered_quantity: Decimal::ZERO,
            invoiced_quantity: Decimal::ZERO,
        }
    }

    /// Quantity still expected from the supplier
    pub fn remaining_to_deliver(&self) -> Decimal {
        (self.quantity - self.delivered_quantity).max(Decimal::ZERO)
    }

    pub fn is_fully_delivered(&self) -> bool {
        self.delivered_quantity >= self.quantity
    }

    pub fn is_fully_invoiced(&self) -> bool {
        self.invoiced_quantity >= self.quantity
    }
}

impl PurchaseOrder {
    /// Recompute subtotal, VAT and total from the items
    pub fn recompute_totals(&mut self) {
        let totals = DocumentTotals::from_lines(
            self.items
                .iter()
                .map(|item| line_amounts(item.quantity, item.unit_price, item.vat_rate)),
        );
        self.subtotal = totals.subtotal;
        self.vat_amount = totals.vat_amount;
        self.total = totals.total;
    }

    pub fn item(&self, item_id: Uuid) -> Option<&PurchaseOrderItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    /// First line ordering the given product
    pub fn item_for_product(&self, product_id: &str) -> Option<&PurchaseOrderItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    pub fn has_deliveries(&self) -> bool {
        self.items.iter().any(|item| item.delivered_quantity > Decimal::ZERO)
    }

    pub fn has_invoiced_quantity(&self) -> bool {
        self.items.iter().any(|item| item.invoiced_quantity > Decimal::ZERO)
    }

    /// Status implied by the delivered-quantity counters
    pub fn delivery_status(&self) -> Option<PurchaseOrderStatus> {
        if !self.items.is_empty() && self.items.iter().all(PurchaseOrderItem::is_fully_delivered) {
            Some(PurchaseOrderStatus::Delivered)
        } else if self.has_deliveries() {
            Some(PurchaseOrderStatus::PartiallyDelivered)
        } else {
            None
        }
    }

    pub fn is_fully_invoiced(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(PurchaseOrderItem::is_fully_invoiced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(items: Vec<PurchaseOrderItem>) -> PurchaseOrder {
        let now = Utc::now();
        let mut order = PurchaseOrder {
            id: Uuid::new_v4(),
            order_number: "PO-2024-001".to_string(),
            supplier_id: "1".to_string(),
            supplier_name: "Global Supplies Inc".to_string(),
            order_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            expected_delivery_date: NaiveDate::from_ymd_opt(2024, 1, 25).unwrap(),
            status: PurchaseOrderStatus::Sent,
            items,
            subtotal: Decimal::ZERO,
            vat_amount: Decimal::ZERO,
            total: Decimal::ZERO,
            notes: None,
            created_by: "admin".to_string(),
            created_at: now,
            updated_at: now,
        };
        order.recompute_totals();
        order
    }

    fn laptops() -> PurchaseOrderItem {
        PurchaseOrderItem::new(
            "1".to_string(),
            "Ordinateur Portable Dell".to_string(),
            Decimal::from(10),
            Decimal::from(850),
            Decimal::from(19),
        )
    }

    #[test]
    fn test_order_totals() {
        let order = order(vec![laptops()]);
        assert_eq!(order.subtotal, Decimal::from(8500));
        assert_eq!(order.vat_amount, Decimal::from(1615));
        assert_eq!(order.total, Decimal::from(10115));
    }

    #[test]
    fn test_delivery_status_progression() {
        let mut order = order(vec![laptops()]);
        assert_eq!(order.delivery_status(), None);

        order.items[0].delivered_quantity = Decimal::from(4);
        assert_eq!(order.delivery_status(), Some(PurchaseOrderStatus::PartiallyDelivered));
        assert_eq!(order.items[0].remaining_to_deliver(), Decimal::from(6));

        order.items[0].delivered_quantity = Decimal::from(10);
        assert_eq!(order.delivery_status(), Some(PurchaseOrderStatus::Delivered));
    }

    #[test]
    fn test_fully_invoiced() {
        let mut order = order(vec![laptops()]);
        assert!(!order.is_fully_invoiced());
        assert!(!order.has_invoiced_quantity());
        order.items[0].invoiced_quantity = Decimal::from(10);
        assert!(order.is_fully_invoiced());
    }

    #[test]
    fn test_derived_statuses() {
        assert!(PurchaseOrderStatus::Invoiced.is_derived());
        assert!(PurchaseOrderStatus::Delivered.is_derived());
        assert!(!PurchaseOrderStatus::Confirmed.is_derived());
        assert!(PurchaseOrderStatus::Confirmed.accepts_receipts());
        assert!(!PurchaseOrderStatus::Draft.accepts_receipts());
        assert!(!PurchaseOrderStatus::Cancelled.accepts_receipts());
    }
}
