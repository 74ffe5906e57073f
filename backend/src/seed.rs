//! Demo data
//!
//! Seeds two suppliers through the regular services so every derived field
//! (numbers, totals, withholding records, order counters) is consistent.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::clock::Clock;
use crate::config::PurchasingSettings;
use crate::error::{AppError, AppResult};
use crate::models::PurchaseOrderStatus;
use crate::services::{
    CreateInvoiceInput, CreatePurchaseOrderInput, DeliveryNoteService, InvoiceService,
    LineItemInput, PurchaseOrderService, ReceiptLineInput, ReceiveGoodsInput,
};
use crate::store::PurchasingStore;

const SEED_USER: &str = "admin";

fn date(year: i32, month: u32, day: u32) -> AppResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| AppError::Internal(format!("invalid seed date {}-{}-{}", year, month, day)))
}

fn line(product_id: &str, product_name: &str, quantity: i64, unit_price: i64) -> LineItemInput {
    LineItemInput {
        product_id: product_id.to_string(),
        product_name: product_name.to_string(),
        quantity: Decimal::from(quantity),
        unit_price: Decimal::from(unit_price),
        vat_rate: Decimal::from(19),
    }
}

/// Load the demo suppliers, orders and invoices into an empty store
pub fn seed_demo_data(
    store: &mut PurchasingStore,
    settings: &PurchasingSettings,
    clock: &dyn Clock,
) -> AppResult<()> {
    // Global Supplies Inc: ordered, fully received, invoiced
    let order = PurchaseOrderService::new(store, clock).create(
        CreatePurchaseOrderInput {
            supplier_id: "1".to_string(),
            supplier_name: "Global Supplies Inc".to_string(),
            order_date: Some(date(2024, 1, 15)?),
            expected_delivery_date: date(2024, 1, 25)?,
            status: Some(PurchaseOrderStatus::Sent),
            items: vec![line("1", "Ordinateur Portable Dell", 10, 850)],
            notes: None,
        },
        SEED_USER,
    )?;

    let receipt_lines = order
        .items
        .iter()
        .map(|item| ReceiptLineInput {
            purchase_order_item_id: item.id,
            delivered_quantity: item.quantity,
            received_quantity: item.quantity,
            notes: None,
        })
        .collect();
    let note = DeliveryNoteService::new(store, clock).receive_goods(
        ReceiveGoodsInput {
            purchase_order_id: order.id,
            delivery_date: date(2024, 1, 20)?,
            received_date: Some(date(2024, 1, 20)?),
            lines: receipt_lines,
            notes: None,
        },
        SEED_USER,
    )?;

    let mut invoices = InvoiceService::new(store, settings, clock);
    let laptops = invoices.create(
        CreateInvoiceInput {
            supplier_invoice_number: "GSI-2024-0156".to_string(),
            supplier_id: "1".to_string(),
            supplier_name: "Global Supplies Inc".to_string(),
            purchase_order_id: Some(order.id),
            delivery_note_id: Some(note.id),
            invoice_date: date(2024, 1, 22)?,
            due_date: date(2024, 2, 21)?,
            items: vec![line("1", "Ordinateur Portable Dell", 10, 850)],
            payment_terms: "30 jours".to_string(),
            notes: None,
        },
        SEED_USER,
    )?;
    invoices.validate(laptops.id, SEED_USER)?;

    // Premium Materials Co: invoice without an order
    let chairs = invoices.create(
        CreateInvoiceInput {
            supplier_invoice_number: "PMC-2024-0089".to_string(),
            supplier_id: "2".to_string(),
            supplier_name: "Premium Materials Co".to_string(),
            purchase_order_id: None,
            delivery_note_id: None,
            invoice_date: date(2024, 1, 10)?,
            due_date: date(2024, 1, 25)?,
            items: vec![line("2", "Chaise de Bureau", 5, 250)],
            payment_terms: "15 jours".to_string(),
            notes: None,
        },
        SEED_USER,
    )?;
    invoices.validate(chairs.id, SEED_USER)?;

    tracing::info!(
        purchase_orders = store.purchase_orders().len(),
        invoices = store.invoices().len(),
        "Seeded demo purchasing data"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::InvoiceStatus;

    #[test]
    fn test_seed_is_consistent() {
        let clock = FixedClock::at_date(NaiveDate::from_ymd_opt(2024, 1, 22).unwrap());
        let mut store = PurchasingStore::new();
        seed_demo_data(&mut store, &PurchasingSettings::default(), &clock).unwrap();

        assert_eq!(store.purchase_orders().len(), 1);
        assert_eq!(store.purchase_orders()[0].order_number, "PO-2024-001");
        assert_eq!(store.purchase_orders()[0].status, PurchaseOrderStatus::Invoiced);
        assert_eq!(store.delivery_notes()[0].delivery_number, "BL-2024-001");

        let numbers: Vec<_> = store.invoices().iter().map(|i| i.invoice_number.as_str()).collect();
        assert_eq!(numbers, vec!["FINV-2024-001", "FINV-2024-002"]);
        assert!(store.invoices().iter().all(|i| i.status == InvoiceStatus::Validated));
        assert_eq!(store.invoices()[0].remaining_amount, Decimal::new(9860, 0));
        assert_eq!(store.invoices()[1].withholding_tax, Decimal::new(3750, 2));
        assert_eq!(store.withholding_taxes().len(), 2);
        assert!(store.alerts().is_empty());
    }
}
