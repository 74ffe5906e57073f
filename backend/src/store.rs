//! In-memory purchasing state
//!
//! One [`PurchasingStore`] owns every ledger for the lifetime of the process.
//! The server wraps it in a single mutex, so each service call runs as one
//! uninterrupted step over all ledgers.

use std::collections::HashMap;

use shared::{
    DeliveryNote, PaymentAlert, PurchaseOrder, SupplierInvoice, SupplierPayment, WithholdingTax,
};
use uuid::Uuid;

/// Documents that carry a human-readable number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    PurchaseOrder,
    DeliveryNote,
    Invoice,
    Payment,
}

impl DocumentKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            DocumentKind::PurchaseOrder => "PO",
            DocumentKind::DeliveryNote => "BL",
            DocumentKind::Invoice => "FINV",
            DocumentKind::Payment => "PAY",
        }
    }
}

#[derive(Debug, Default)]
pub struct PurchasingStore {
    pub(crate) purchase_orders: Vec<PurchaseOrder>,
    pub(crate) delivery_notes: Vec<DeliveryNote>,
    pub(crate) invoices: Vec<SupplierInvoice>,
    pub(crate) payments: Vec<SupplierPayment>,
    pub(crate) withholding_taxes: Vec<WithholdingTax>,
    pub(crate) alerts: Vec<PaymentAlert>,
    sequences: HashMap<(DocumentKind, i32), u32>,
}

impl PurchasingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next number for a document kind: PREFIX-YYYY-NNN
    pub fn next_document_number(&mut self, kind: DocumentKind, year: i32) -> String {
        let sequence = self.sequences.entry((kind, year)).or_insert(0);
        *sequence += 1;
        format!("{}-{}-{:03}", kind.prefix(), year, sequence)
    }

    pub fn purchase_orders(&self) -> &[PurchaseOrder] {
        &self.purchase_orders
    }

    pub fn delivery_notes(&self) -> &[DeliveryNote] {
        &self.delivery_notes
    }

    pub fn invoices(&self) -> &[SupplierInvoice] {
        &self.invoices
    }

    pub fn payments(&self) -> &[SupplierPayment] {
        &self.payments
    }

    pub fn withholding_taxes(&self) -> &[WithholdingTax] {
        &self.withholding_taxes
    }

    pub fn alerts(&self) -> &[PaymentAlert] {
        &self.alerts
    }

    pub(crate) fn purchase_order_mut(&mut self, id: Uuid) -> Option<&mut PurchaseOrder> {
        self.purchase_orders.iter_mut().find(|po| po.id == id)
    }

    pub(crate) fn delivery_note_mut(&mut self, id: Uuid) -> Option<&mut DeliveryNote> {
        self.delivery_notes.iter_mut().find(|dn| dn.id == id)
    }

    pub(crate) fn invoice_mut(&mut self, id: Uuid) -> Option<&mut SupplierInvoice> {
        self.invoices.iter_mut().find(|inv| inv.id == id)
    }

    pub(crate) fn payment_mut(&mut self, id: Uuid) -> Option<&mut SupplierPayment> {
        self.payments.iter_mut().find(|p| p.id == id)
    }

    pub(crate) fn withholding_tax_mut(&mut self, id: Uuid) -> Option<&mut WithholdingTax> {
        self.withholding_taxes.iter_mut().find(|wt| wt.id == id)
    }

    pub(crate) fn alert_mut(&mut self, id: Uuid) -> Option<&mut PaymentAlert> {
        self.alerts.iter_mut().find(|a| a.id == id)
    }
}
