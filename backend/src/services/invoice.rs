//! Supplier invoice ledger
//!
//! Status machine: `draft -> validated -> {partially_paid -> paid} | cancelled`.
//! Overdue is a read-time classification and is never stored.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{
    detect_discrepancy, InvoiceStatus, PurchaseOrderStatus, SupplierInvoice, SupplierInvoiceItem,
};
use uuid::Uuid;
use validator::Validate;

use super::purchase_order::{check_line_items, LineItemInput};
use super::withholding_tax::WithholdingTaxService;
use crate::clock::Clock;
use crate::config::PurchasingSettings;
use crate::error::{AppError, AppResult};
use crate::store::{DocumentKind, PurchasingStore};

/// Invoice service over the in-memory ledgers
pub struct InvoiceService<'a> {
    store: &'a mut PurchasingStore,
    settings: &'a PurchasingSettings,
    clock: &'a dyn Clock,
}

/// Input for entering a supplier invoice
#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvoiceInput {
    #[validate(length(min = 1, message = "Supplier invoice number is required"))]
    pub supplier_invoice_number: String,
    #[validate(length(min = 1, message = "Supplier is required"))]
    pub supplier_id: String,
    #[validate(length(min = 1, message = "Supplier name is required"))]
    pub supplier_name: String,
    pub purchase_order_id: Option<Uuid>,
    pub delivery_note_id: Option<Uuid>,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub items: Vec<LineItemInput>,
    #[validate(length(min = 1, message = "Payment terms are required"))]
    pub payment_terms: String,
    pub notes: Option<String>,
}

/// Input for editing a draft invoice
#[derive(Debug, Default, Deserialize)]
pub struct UpdateInvoiceInput {
    pub supplier_invoice_number: Option<String>,
    pub invoice_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub items: Option<Vec<LineItemInput>>,
    pub payment_terms: Option<String>,
    pub notes: Option<String>,
}

/// Filter for listing invoices
#[derive(Debug, Default, Deserialize)]
pub struct InvoiceFilter {
    pub supplier_id: Option<String>,
    pub status: Option<InvoiceStatus>,
}

impl<'a> InvoiceService<'a> {
    /// Create a new InvoiceService instance
    pub fn new(
        store: &'a mut PurchasingStore,
        settings: &'a PurchasingSettings,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            store,
            settings,
            clock,
        }
    }

    fn not_found() -> AppError {
        AppError::NotFound("Invoice".to_string())
    }

    /// Build invoice lines, annotating differences from the linked order
    fn build_items(
        &self,
        purchase_order_id: Option<Uuid>,
        items: Vec<LineItemInput>,
    ) -> Vec<SupplierInvoiceItem> {
        let order = purchase_order_id
            .and_then(|id| self.store.purchase_orders.iter().find(|po| po.id == id));

        items
            .into_iter()
            .map(|input| {
                let mut item = SupplierInvoiceItem::new(
                    input.product_id,
                    input.product_name,
                    input.quantity,
                    input.unit_price,
                    input.vat_rate,
                );
                item.discrepancy = order
                    .and_then(|po| po.item_for_product(&item.product_id))
                    .and_then(|ordered| detect_discrepancy(ordered, &item));
                item
            })
            .collect()
    }

    /// Check the order and delivery note an invoice refers to
    fn check_links(
        &self,
        supplier_id: &str,
        purchase_order_id: Option<Uuid>,
        delivery_note_id: Option<Uuid>,
    ) -> AppResult<()> {
        if let Some(po_id) = purchase_order_id {
            let order = self
                .store
                .purchase_orders
                .iter()
                .find(|po| po.id == po_id)
                .ok_or_else(|| AppError::NotFound("Purchase order".to_string()))?;
            if order.supplier_id != supplier_id {
                return Err(AppError::InvariantViolation(format!(
                    "purchase order {} belongs to another supplier",
                    order.order_number
                )));
            }
            if order.status == PurchaseOrderStatus::Cancelled {
                return Err(AppError::InvalidStateTransition(format!(
                    "purchase order {} is cancelled",
                    order.order_number
                )));
            }
        }

        if let Some(dn_id) = delivery_note_id {
            let note = self
                .store
                .delivery_notes
                .iter()
                .find(|dn| dn.id == dn_id)
                .ok_or_else(|| AppError::NotFound("Delivery note".to_string()))?;
            if Some(note.purchase_order_id) != purchase_order_id {
                return Err(AppError::InvariantViolation(format!(
                    "delivery note {} does not belong to the invoiced purchase order",
                    note.delivery_number
                )));
            }
        }

        Ok(())
    }

    /// Enter a supplier invoice as a draft
    pub fn create(&mut self, input: CreateInvoiceInput, created_by: &str) -> AppResult<SupplierInvoice> {
        input.validate()?;
        check_line_items(&input.items)?;
        shared::validate_due_date(input.invoice_date, input.due_date)
            .map_err(|e| AppError::InvariantViolation(e.to_string()))?;
        self.check_links(&input.supplier_id, input.purchase_order_id, input.delivery_note_id)?;

        let now = self.clock.now();
        let items = self.build_items(input.purchase_order_id, input.items);
        let invoice_number = self
            .store
            .next_document_number(DocumentKind::Invoice, input.invoice_date.year());

        let mut invoice = SupplierInvoice {
            id: Uuid::new_v4(),
            invoice_number,
            supplier_invoice_number: input.supplier_invoice_number,
            supplier_id: input.supplier_id,
            supplier_name: input.supplier_name,
            purchase_order_id: input.purchase_order_id,
            delivery_note_id: input.delivery_note_id,
            invoice_date: input.invoice_date,
            due_date: input.due_date,
            status: InvoiceStatus::Draft,
            items,
            subtotal: Decimal::ZERO,
            vat_amount: Decimal::ZERO,
            withholding_rate: self.settings.withholding_rate,
            withholding_tax: Decimal::ZERO,
            total: Decimal::ZERO,
            paid_amount: Decimal::ZERO,
            remaining_amount: Decimal::ZERO,
            payment_terms: input.payment_terms,
            notes: input.notes,
            created_by: created_by.to_string(),
            validated_by: None,
            validated_at: None,
            created_at: now,
            updated_at: now,
        };
        invoice.recompute_totals();

        let discrepancies = invoice.items.iter().filter(|i| i.discrepancy.is_some()).count();
        if discrepancies > 0 {
            tracing::warn!(
                invoice_number = %invoice.invoice_number,
                discrepancies,
                "Invoice differs from purchase order"
            );
        }
        tracing::info!(
            invoice_id = %invoice.id,
            invoice_number = %invoice.invoice_number,
            total = %invoice.total,
            withholding_tax = %invoice.withholding_tax,
            "Supplier invoice created"
        );

        self.store.invoices.push(invoice.clone());
        Ok(invoice)
    }

    /// Get an invoice by id
    pub fn get(&self, id: Uuid) -> AppResult<SupplierInvoice> {
        self.store
            .invoices
            .iter()
            .find(|inv| inv.id == id)
            .cloned()
            .ok_or_else(Self::not_found)
    }

    /// List invoices; the status filter matches the displayed status
    pub fn list(&self, filter: &InvoiceFilter) -> Vec<SupplierInvoice> {
        let today = self.clock.today();
        self.store
            .invoices
            .iter()
            .filter(|inv| {
                filter
                    .supplier_id
                    .as_ref()
                    .map_or(true, |supplier| &inv.supplier_id == supplier)
            })
            .filter(|inv| {
                filter
                    .status
                    .map_or(true, |status| inv.display_status(today) == status)
            })
            .cloned()
            .collect()
    }

    /// Edit a draft invoice; totals are recomputed
    pub fn update(&mut self, id: Uuid, input: UpdateInvoiceInput) -> AppResult<SupplierInvoice> {
        if let Some(items) = &input.items {
            check_line_items(items)?;
        }

        let existing = self.get(id)?;
        if existing.status != InvoiceStatus::Draft {
            return Err(AppError::InvalidStateTransition(format!(
                "invoice {} is {}, only drafts can be edited",
                existing.invoice_number, existing.status
            )));
        }

        let invoice_date = input.invoice_date.unwrap_or(existing.invoice_date);
        let due_date = input.due_date.unwrap_or(existing.due_date);
        shared::validate_due_date(invoice_date, due_date)
            .map_err(|e| AppError::InvariantViolation(e.to_string()))?;

        let items = input
            .items
            .map(|items| self.build_items(existing.purchase_order_id, items));

        let now = self.clock.now();
        let invoice = self.store.invoice_mut(id).ok_or_else(Self::not_found)?;
        if let Some(number) = input.supplier_invoice_number {
            if number.trim().is_empty() {
                return Err(AppError::invalid(
                    "supplier_invoice_number",
                    "Supplier invoice number is required",
                ));
            }
            invoice.supplier_invoice_number = number;
        }
        invoice.invoice_date = invoice_date;
        invoice.due_date = due_date;
        if let Some(items) = items {
            invoice.items = items;
        }
        if let Some(terms) = input.payment_terms {
            invoice.payment_terms = terms;
        }
        if input.notes.is_some() {
            invoice.notes = input.notes;
        }
        invoice.recompute_totals();
        invoice.updated_at = now;

        tracing::info!(invoice_id = %invoice.id, total = %invoice.total, "Supplier invoice updated");
        Ok(invoice.clone())
    }

    /// Validate a draft invoice
    ///
    /// Records the withholding tax for the validation period and posts the
    /// invoiced quantities to the linked purchase order.
    pub fn validate(&mut self, id: Uuid, validated_by: &str) -> AppResult<SupplierInvoice> {
        let existing = self.get(id)?;
        if existing.status != InvoiceStatus::Draft {
            tracing::warn!(invoice_id = %id, status = %existing.status, "Validation refused");
            return Err(AppError::InvalidStateTransition(format!(
                "invoice {} is {}, only drafts can be validated",
                existing.invoice_number, existing.status
            )));
        }

        let now = self.clock.now();
        WithholdingTaxService::new(&mut *self.store, self.clock).record_for_invoice(&existing, now)?;

        let invoice = self.store.invoice_mut(id).ok_or_else(Self::not_found)?;
        invoice.status = InvoiceStatus::Validated;
        invoice.validated_by = Some(validated_by.to_string());
        invoice.validated_at = Some(now);
        invoice.updated_at = now;
        let validated = invoice.clone();

        if let Some(po_id) = validated.purchase_order_id {
            self.post_invoiced_quantities(po_id, &validated);
        }

        tracing::info!(
            invoice_id = %validated.id,
            invoice_number = %validated.invoice_number,
            validated_by = %validated_by,
            "Supplier invoice validated"
        );
        Ok(validated)
    }

    fn post_invoiced_quantities(&mut self, purchase_order_id: Uuid, invoice: &SupplierInvoice) {
        let now = self.clock.now();
        let Some(order) = self.store.purchase_order_mut(purchase_order_id) else {
            return;
        };

        for item in &invoice.items {
            if let Some(line) = order
                .items
                .iter_mut()
                .find(|line| line.product_id == item.product_id)
            {
                line.invoiced_quantity += item.quantity;
            }
        }

        if order.status != PurchaseOrderStatus::Cancelled && order.is_fully_invoiced() {
            order.status = PurchaseOrderStatus::Invoiced;
        }
        order.updated_at = now;
        tracing::debug!(order_id = %order.id, status = %order.status, "Invoiced quantities posted");
    }

    /// Take back the quantities a validated invoice posted to its order
    fn withdraw_invoiced_quantities(&mut self, purchase_order_id: Uuid, invoice: &SupplierInvoice) {
        let now = self.clock.now();
        let Some(order) = self.store.purchase_order_mut(purchase_order_id) else {
            return;
        };

        for item in &invoice.items {
            if let Some(line) = order
                .items
                .iter_mut()
                .find(|line| line.product_id == item.product_id)
            {
                line.invoiced_quantity = (line.invoiced_quantity - item.quantity).max(Decimal::ZERO);
            }
        }

        if order.status == PurchaseOrderStatus::Invoiced && !order.is_fully_invoiced() {
            order.status = order.delivery_status().unwrap_or(PurchaseOrderStatus::Sent);
        }
        order.updated_at = now;
        tracing::debug!(order_id = %order.id, status = %order.status, "Invoiced quantities withdrawn");
    }

    /// Cancel an invoice that has received no payment
    ///
    /// A validated invoice also gives back its withholding record and the
    /// quantities it posted to the purchase order.
    pub fn cancel(&mut self, id: Uuid) -> AppResult<SupplierInvoice> {
        let existing = self.get(id)?;

        let cancellable = matches!(existing.status, InvoiceStatus::Draft | InvoiceStatus::Validated);
        if !cancellable || existing.paid_amount > Decimal::ZERO {
            return Err(AppError::InvalidStateTransition(format!(
                "invoice {} is {} and cannot be cancelled",
                existing.invoice_number, existing.status
            )));
        }

        if existing.status == InvoiceStatus::Validated {
            WithholdingTaxService::new(&mut *self.store, self.clock).release_for_invoice(&existing)?;
            if let Some(po_id) = existing.purchase_order_id {
                self.withdraw_invoiced_quantities(po_id, &existing);
            }
        }

        let now = self.clock.now();
        let invoice = self.store.invoice_mut(id).ok_or_else(Self::not_found)?;
        invoice.status = InvoiceStatus::Cancelled;
        invoice.updated_at = now;
        tracing::info!(invoice_id = %invoice.id, "Supplier invoice cancelled");
        Ok(invoice.clone())
    }

    /// Status shown to users as of the service clock
    pub fn display_status(&self, invoice: &SupplierInvoice) -> InvoiceStatus {
        invoice.display_status(self.clock.today())
    }

    /// Validated invoices past their due date with a balance left
    pub fn overdue(&self, today: NaiveDate) -> Vec<SupplierInvoice> {
        self.store
            .invoices
            .iter()
            .filter(|inv| inv.is_overdue(today))
            .cloned()
            .collect()
    }

    /// Validated invoices due within `days` (overdue included) with a balance left
    pub fn upcoming(&self, today: NaiveDate, days: i64) -> Vec<SupplierInvoice> {
        self.store
            .invoices
            .iter()
            .filter(|inv| inv.is_due_within(today, days))
            .cloned()
            .collect()
    }

    /// Amount still owed to a supplier across non-cancelled invoices
    pub fn supplier_balance(&self, supplier_id: &str) -> Decimal {
        self.store
            .invoices
            .iter()
            .filter(|inv| inv.supplier_id == supplier_id && inv.status != InvoiceStatus::Cancelled)
            .map(|inv| inv.remaining_amount)
            .sum()
    }
}
