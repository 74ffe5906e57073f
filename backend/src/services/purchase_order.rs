//! Purchase order ledger

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{InvoiceStatus, PurchaseOrder, PurchaseOrderItem, PurchaseOrderStatus};
use uuid::Uuid;
use validator::Validate;

use crate::clock::Clock;
use crate::error::{AppError, AppResult};
use crate::store::{DocumentKind, PurchasingStore};

/// Purchase order service over the in-memory ledgers
pub struct PurchaseOrderService<'a> {
    store: &'a mut PurchasingStore,
    clock: &'a dyn Clock,
}

/// One line of an order or invoice as entered by the user
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LineItemInput {
    #[validate(length(min = 1, message = "Product is required"))]
    pub product_id: String,
    #[validate(length(min = 1, message = "Product name is required"))]
    pub product_name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub vat_rate: Decimal,
}

impl LineItemInput {
    /// Check the decimal fields the derive cannot express
    pub fn check_amounts(&self) -> AppResult<()> {
        shared::validate_quantity(self.quantity).map_err(|e| AppError::invalid("quantity", e))?;
        shared::validate_unit_price(self.unit_price)
            .map_err(|e| AppError::invalid("unit_price", e))?;
        shared::validate_rate(self.vat_rate).map_err(|e| AppError::invalid("vat_rate", e))?;
        Ok(())
    }
}

/// Validate a list of line items, including their amounts
pub(crate) fn check_line_items(items: &[LineItemInput]) -> AppResult<()> {
    if items.is_empty() {
        return Err(AppError::invalid("items", "At least one item is required"));
    }
    for item in items {
        item.validate()?;
        item.check_amounts()?;
    }
    Ok(())
}

/// Input for creating a purchase order
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePurchaseOrderInput {
    #[validate(length(min = 1, message = "Supplier is required"))]
    pub supplier_id: String,
    #[validate(length(min = 1, message = "Supplier name is required"))]
    pub supplier_name: String,
    pub order_date: Option<NaiveDate>,
    pub expected_delivery_date: NaiveDate,
    pub status: Option<PurchaseOrderStatus>,
    pub items: Vec<LineItemInput>,
    pub notes: Option<String>,
}

/// Input for updating a purchase order
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePurchaseOrderInput {
    pub expected_delivery_date: Option<NaiveDate>,
    pub status: Option<PurchaseOrderStatus>,
    pub items: Option<Vec<LineItemInput>>,
    pub notes: Option<String>,
}

/// Filter for listing purchase orders
#[derive(Debug, Default, Deserialize)]
pub struct PurchaseOrderFilter {
    pub supplier_id: Option<String>,
    pub status: Option<PurchaseOrderStatus>,
}

fn build_items(items: Vec<LineItemInput>) -> Vec<PurchaseOrderItem> {
    items
        .into_iter()
        .map(|item| {
            PurchaseOrderItem::new(
                item.product_id,
                item.product_name,
                item.quantity,
                item.unit_price,
                item.vat_rate,
            )
        })
        .collect()
}

impl<'a> PurchaseOrderService<'a> {
    /// Create a new PurchaseOrderService instance
    pub fn new(store: &'a mut PurchasingStore, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    /// Record a new purchase order
    pub fn create(
        &mut self,
        input: CreatePurchaseOrderInput,
        created_by: &str,
    ) -> AppResult<PurchaseOrder> {
        input.validate()?;
        check_line_items(&input.items)?;

        let status = input.status.unwrap_or(PurchaseOrderStatus::Draft);
        if status.is_derived() || status == PurchaseOrderStatus::Cancelled {
            return Err(AppError::InvalidStateTransition(format!(
                "a new purchase order cannot start as {}",
                status
            )));
        }

        let now = self.clock.now();
        let order_date = input.order_date.unwrap_or_else(|| self.clock.today());
        if input.expected_delivery_date < order_date {
            return Err(AppError::invalid(
                "expected_delivery_date",
                "Expected delivery date cannot be before the order date",
            ));
        }

        let order_number = self
            .store
            .next_document_number(DocumentKind::PurchaseOrder, order_date.year());

        let mut order = PurchaseOrder {
            id: Uuid::new_v4(),
            order_number,
            supplier_id: input.supplier_id,
            supplier_name: input.supplier_name,
            order_date,
            expected_delivery_date: input.expected_delivery_date,
            status,
            items: build_items(input.items),
            subtotal: Decimal::ZERO,
            vat_amount: Decimal::ZERO,
            total: Decimal::ZERO,
            notes: input.notes,
            created_by: created_by.to_string(),
            created_at: now,
            updated_at: now,
        };
        order.recompute_totals();

        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            supplier_id = %order.supplier_id,
            total = %order.total,
            "Purchase order created"
        );

        self.store.purchase_orders.push(order.clone());
        Ok(order)
    }

    /// Get a purchase order by id
    pub fn get(&self, id: Uuid) -> AppResult<PurchaseOrder> {
        self.store
            .purchase_orders
            .iter()
            .find(|po| po.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Purchase order".to_string()))
    }

    /// List purchase orders, oldest first
    pub fn list(&self, filter: &PurchaseOrderFilter) -> Vec<PurchaseOrder> {
        self.store
            .purchase_orders
            .iter()
            .filter(|po| {
                filter
                    .supplier_id
                    .as_ref()
                    .map_or(true, |supplier| &po.supplier_id == supplier)
            })
            .filter(|po| filter.status.map_or(true, |status| po.status == status))
            .cloned()
            .collect()
    }

    /// Merge a partial update into a purchase order
    pub fn update(&mut self, id: Uuid, input: UpdatePurchaseOrderInput) -> AppResult<PurchaseOrder> {
        if let Some(items) = &input.items {
            check_line_items(items)?;
        }

        let now = self.clock.now();
        let order = self
            .store
            .purchase_order_mut(id)
            .ok_or_else(|| AppError::NotFound("Purchase order".to_string()))?;

        if order.status == PurchaseOrderStatus::Cancelled {
            return Err(AppError::InvalidStateTransition(format!(
                "purchase order {} is cancelled",
                order.order_number
            )));
        }

        if let Some(status) = input.status {
            if status.is_derived() || status == PurchaseOrderStatus::Cancelled {
                return Err(AppError::InvalidStateTransition(format!(
                    "status {} is set by receipts, invoices or cancellation",
                    status
                )));
            }
            if order.status.is_derived() {
                return Err(AppError::InvalidStateTransition(format!(
                    "purchase order {} is already {}",
                    order.order_number, order.status
                )));
            }
        }

        if input.items.is_some() && (order.has_deliveries() || order.has_invoiced_quantity()) {
            return Err(AppError::InvariantViolation(format!(
                "items of purchase order {} cannot change after goods were received or invoiced",
                order.order_number
            )));
        }

        if let Some(date) = input.expected_delivery_date {
            if date < order.order_date {
                return Err(AppError::invalid(
                    "expected_delivery_date",
                    "Expected delivery date cannot be before the order date",
                ));
            }
            order.expected_delivery_date = date;
        }
        if let Some(status) = input.status {
            order.status = status;
        }
        if let Some(items) = input.items {
            order.items = build_items(items);
            order.recompute_totals();
        }
        if input.notes.is_some() {
            order.notes = input.notes;
        }
        order.updated_at = now;

        tracing::info!(order_id = %order.id, status = %order.status, "Purchase order updated");
        Ok(order.clone())
    }

    /// Soft-cancel a purchase order
    pub fn cancel(&mut self, id: Uuid) -> AppResult<PurchaseOrder> {
        let now = self.clock.now();
        let order = self
            .store
            .purchase_order_mut(id)
            .ok_or_else(|| AppError::NotFound("Purchase order".to_string()))?;

        if order.status == PurchaseOrderStatus::Cancelled {
            return Err(AppError::InvalidStateTransition(format!(
                "purchase order {} is already cancelled",
                order.order_number
            )));
        }

        order.status = PurchaseOrderStatus::Cancelled;
        order.updated_at = now;
        tracing::info!(order_id = %order.id, "Purchase order cancelled");
        Ok(order.clone())
    }

    /// Delete a purchase order that nothing has been invoiced against
    pub fn delete(&mut self, id: Uuid) -> AppResult<()> {
        let order = self
            .store
            .purchase_orders
            .iter()
            .find(|po| po.id == id)
            .ok_or_else(|| AppError::NotFound("Purchase order".to_string()))?;

        let referenced = self
            .store
            .invoices
            .iter()
            .filter(|inv| inv.status != InvoiceStatus::Cancelled)
            .any(|inv| inv.purchase_order_id == Some(id));

        if order.status == PurchaseOrderStatus::Invoiced || order.has_invoiced_quantity() || referenced
        {
            tracing::warn!(order_id = %id, "Refused to delete invoiced purchase order");
            return Err(AppError::InvariantViolation(format!(
                "purchase order {} has been invoiced; cancel it instead",
                order.order_number
            )));
        }

        self.store.purchase_orders.retain(|po| po.id != id);
        tracing::info!(order_id = %id, "Purchase order deleted");
        Ok(())
    }
}
