//! Delivery note ledger and goods receipt
//!
//! A receipt is a single step: it records the delivery note and advances the
//! delivered-quantity counters of the parent purchase order together.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{DeliveryLineStatus, DeliveryNote, DeliveryNoteItem, DeliveryNoteStatus};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{AppError, AppResult};
use crate::store::{DocumentKind, PurchasingStore};

/// Delivery note service over the in-memory ledgers
pub struct DeliveryNoteService<'a> {
    store: &'a mut PurchasingStore,
    clock: &'a dyn Clock,
}

/// Input for receiving goods against a purchase order
#[derive(Debug, Deserialize)]
pub struct ReceiveGoodsInput {
    /// Taken from the route when posted to `/purchase-orders/:id/receipts`
    #[serde(default)]
    pub purchase_order_id: Uuid,
    pub delivery_date: NaiveDate,
    pub received_date: Option<NaiveDate>,
    pub lines: Vec<ReceiptLineInput>,
    pub notes: Option<String>,
}

/// Quantities brought and accepted for one ordered line
#[derive(Debug, Deserialize)]
pub struct ReceiptLineInput {
    pub purchase_order_item_id: Uuid,
    pub delivered_quantity: Decimal,
    pub received_quantity: Decimal,
    pub notes: Option<String>,
}

/// Input for updating administrative fields of a delivery note
#[derive(Debug, Default, Deserialize)]
pub struct UpdateDeliveryNoteInput {
    pub received_by: Option<String>,
    pub notes: Option<String>,
}

impl<'a> DeliveryNoteService<'a> {
    /// Create a new DeliveryNoteService instance
    pub fn new(store: &'a mut PurchasingStore, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    /// Receive goods: record the delivery note and update the order counters
    pub fn receive_goods(
        &mut self,
        input: ReceiveGoodsInput,
        received_by: &str,
    ) -> AppResult<DeliveryNote> {
        if input.lines.is_empty() {
            return Err(AppError::invalid("lines", "At least one line is required"));
        }

        let received_date = input.received_date.unwrap_or(input.delivery_date);
        if received_date < input.delivery_date {
            return Err(AppError::invalid(
                "received_date",
                "Received date cannot be before the delivery date",
            ));
        }

        let order = self
            .store
            .purchase_orders
            .iter()
            .find(|po| po.id == input.purchase_order_id)
            .ok_or_else(|| AppError::NotFound("Purchase order".to_string()))?;

        if !order.status.accepts_receipts() {
            tracing::warn!(order_id = %order.id, status = %order.status, "Receipt refused");
            return Err(AppError::InvalidStateTransition(format!(
                "cannot receive goods on a {} purchase order",
                order.status
            )));
        }

        // Validate every line before anything is written
        let mut items = Vec::with_capacity(input.lines.len());
        for line in &input.lines {
            let ordered = order.item(line.purchase_order_item_id).ok_or_else(|| {
                AppError::NotFound(format!(
                    "Purchase order line {}",
                    line.purchase_order_item_id
                ))
            })?;

            shared::validate_receipt_quantities(
                ordered.quantity,
                line.delivered_quantity,
                line.received_quantity,
            )
            .map_err(|e| AppError::InvariantViolation(e.to_string()))?;

            let already_received: Decimal = input
                .lines
                .iter()
                .filter(|l| l.purchase_order_item_id == line.purchase_order_item_id)
                .map(|l| l.received_quantity)
                .sum();
            if already_received > ordered.remaining_to_deliver() {
                return Err(AppError::InvariantViolation(format!(
                    "receiving {} of {} would exceed the ordered quantity {} ({} already received)",
                    already_received,
                    ordered.product_name,
                    ordered.quantity,
                    ordered.delivered_quantity
                )));
            }

            items.push(DeliveryNoteItem {
                id: Uuid::new_v4(),
                purchase_order_item_id: ordered.id,
                product_id: ordered.product_id.clone(),
                product_name: ordered.product_name.clone(),
                ordered_quantity: ordered.quantity,
                delivered_quantity: line.delivered_quantity,
                received_quantity: line.received_quantity,
                unit_price: ordered.unit_price,
                status: DeliveryLineStatus::derive(line.delivered_quantity, line.received_quantity),
                notes: line.notes.clone(),
            });
        }

        let supplier_id = order.supplier_id.clone();
        let supplier_name = order.supplier_name.clone();
        let line_statuses: Vec<_> = items.iter().map(|item| item.status).collect();

        let delivery_number = self
            .store
            .next_document_number(DocumentKind::DeliveryNote, received_date.year());
        let note = DeliveryNote {
            id: Uuid::new_v4(),
            delivery_number,
            purchase_order_id: input.purchase_order_id,
            supplier_id,
            supplier_name,
            delivery_date: input.delivery_date,
            received_date,
            status: DeliveryNoteStatus::derive(&line_statuses),
            items,
            notes: input.notes,
            received_by: received_by.to_string(),
            created_at: self.clock.now(),
        };

        let now = self.clock.now();
        if let Some(order) = self.store.purchase_order_mut(input.purchase_order_id) {
            for item in &note.items {
                if let Some(line) = order
                    .items
                    .iter_mut()
                    .find(|line| line.id == item.purchase_order_item_id)
                {
                    line.delivered_quantity += item.received_quantity;
                }
            }
            if let Some(status) = order.delivery_status() {
                order.status = status;
            }
            order.updated_at = now;

            tracing::info!(
                order_id = %order.id,
                delivery_number = %note.delivery_number,
                status = %order.status,
                received = %note.total_received(),
                "Goods received"
            );
        }

        self.store.delivery_notes.push(note.clone());
        Ok(note)
    }

    /// Get a delivery note by id
    pub fn get(&self, id: Uuid) -> AppResult<DeliveryNote> {
        self.store
            .delivery_notes
            .iter()
            .find(|dn| dn.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Delivery note".to_string()))
    }

    /// List delivery notes, optionally for one purchase order
    pub fn list(&self, purchase_order_id: Option<Uuid>) -> Vec<DeliveryNote> {
        self.store
            .delivery_notes
            .iter()
            .filter(|dn| purchase_order_id.map_or(true, |id| dn.purchase_order_id == id))
            .cloned()
            .collect()
    }

    /// Update administrative fields; quantities are fixed once received
    pub fn update(&mut self, id: Uuid, input: UpdateDeliveryNoteInput) -> AppResult<DeliveryNote> {
        let note = self
            .store
            .delivery_note_mut(id)
            .ok_or_else(|| AppError::NotFound("Delivery note".to_string()))?;

        if let Some(received_by) = input.received_by {
            if received_by.trim().is_empty() {
                return Err(AppError::invalid("received_by", "Receiver is required"));
            }
            note.received_by = received_by;
        }
        if input.notes.is_some() {
            note.notes = input.notes;
        }

        tracing::info!(delivery_note_id = %note.id, "Delivery note updated");
        Ok(note.clone())
    }
}
