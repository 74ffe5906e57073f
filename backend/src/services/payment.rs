//! Supplier payment ledger

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{split_payment, PaymentMethod, PaymentStatus, SupplierPayment};
use uuid::Uuid;
use validator::Validate;

use crate::clock::Clock;
use crate::config::PurchasingSettings;
use crate::error::{AppError, AppResult};
use crate::store::{DocumentKind, PurchasingStore};

/// Payment service over the in-memory ledgers
pub struct PaymentService<'a> {
    store: &'a mut PurchasingStore,
    settings: &'a PurchasingSettings,
    clock: &'a dyn Clock,
}

/// Input for recording a payment against an invoice
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePaymentInput {
    pub invoice_id: Uuid,
    /// Gross amount
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_date: Option<NaiveDate>,
    #[validate(length(max = 100, message = "Reference is too long"))]
    #[serde(default)]
    pub reference: String,
    pub notes: Option<String>,
}

/// Administrative fields of a payment
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePaymentInput {
    pub reference: Option<String>,
    pub notes: Option<String>,
}

impl<'a> PaymentService<'a> {
    /// Create a new PaymentService instance
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
        AppError::NotFound("Payment".to_string())
    }

    /// Record a payment and post its net amount to the invoice
    pub fn create(&mut self, input: CreatePaymentInput, created_by: &str) -> AppResult<SupplierPayment> {
        input.validate()?;

        let now = self.clock.now();
        let payment_date = input.payment_date.unwrap_or_else(|| self.clock.today());

        let invoice = self
            .store
            .invoices
            .iter()
            .find(|inv| inv.id == input.invoice_id)
            .ok_or_else(|| AppError::NotFound("Invoice".to_string()))?;

        if !invoice.status.accepts_payment() {
            tracing::warn!(
                invoice_id = %invoice.id,
                status = %invoice.status,
                "Payment refused for invoice"
            );
            return Err(AppError::InvalidStateTransition(format!(
                "invoice {} is {} and cannot receive payments",
                invoice.invoice_number, invoice.status
            )));
        }

        shared::validate_payment_amount(input.amount, invoice.remaining_amount).map_err(|e| {
            tracing::warn!(
                invoice_id = %invoice.id,
                amount = %input.amount,
                remaining = %invoice.remaining_amount,
                "Payment amount rejected"
            );
            AppError::InvariantViolation(e.to_string())
        })?;

        let (withholding_tax, net_amount) = if self.settings.withhold_on_payment {
            split_payment(input.amount, invoice.withholding_rate)
        } else {
            (Decimal::ZERO, input.amount)
        };

        let supplier_id = invoice.supplier_id.clone();
        let supplier_name = invoice.supplier_name.clone();
        let invoice_number = invoice.invoice_number.clone();

        let payment = SupplierPayment {
            id: Uuid::new_v4(),
            payment_number: self
                .store
                .next_document_number(DocumentKind::Payment, payment_date.year()),
            supplier_id,
            supplier_name,
            invoice_id: input.invoice_id,
            invoice_number,
            payment_date,
            amount: input.amount,
            withholding_tax,
            net_amount,
            payment_method: input.payment_method,
            reference: input.reference,
            status: PaymentStatus::Pending,
            notes: input.notes,
            created_by: created_by.to_string(),
            created_at: now,
        };

        let invoice = self
            .store
            .invoice_mut(input.invoice_id)
            .ok_or_else(|| AppError::NotFound("Invoice".to_string()))?;
        invoice.apply_payment(net_amount);
        invoice.updated_at = now;

        tracing::info!(
            payment_id = %payment.id,
            payment_number = %payment.payment_number,
            invoice_number = %payment.invoice_number,
            amount = %payment.amount,
            net_amount = %payment.net_amount,
            invoice_status = %invoice.status,
            remaining = %invoice.remaining_amount,
            "Supplier payment recorded"
        );

        self.store.payments.push(payment.clone());
        Ok(payment)
    }

    /// Get a payment by id
    pub fn get(&self, id: Uuid) -> AppResult<SupplierPayment> {
        self.store
            .payments
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(Self::not_found)
    }

    /// List payments, optionally for one invoice
    pub fn list(&self, invoice_id: Option<Uuid>) -> Vec<SupplierPayment> {
        self.store
            .payments
            .iter()
            .filter(|p| invoice_id.map_or(true, |id| p.invoice_id == id))
            .cloned()
            .collect()
    }

    fn transition(
        &mut self,
        id: Uuid,
        target: PaymentStatus,
    ) -> AppResult<SupplierPayment> {
        let payment = self.store.payment_mut(id).ok_or_else(Self::not_found)?;
        if payment.status != PaymentStatus::Pending {
            return Err(AppError::InvalidStateTransition(format!(
                "payment {} is {}, cannot move to {}",
                payment.payment_number, payment.status, target
            )));
        }
        payment.status = target;
        tracing::info!(payment_id = %payment.id, status = %target, "Payment status changed");
        Ok(payment.clone())
    }

    /// Mark a pending payment as completed
    pub fn complete(&mut self, id: Uuid) -> AppResult<SupplierPayment> {
        self.transition(id, PaymentStatus::Completed)
    }

    /// Cancel a pending payment; the invoice keeps the posted amount
    pub fn cancel(&mut self, id: Uuid) -> AppResult<SupplierPayment> {
        self.transition(id, PaymentStatus::Cancelled)
    }

    pub fn update(&mut self, id: Uuid, input: UpdatePaymentInput) -> AppResult<SupplierPayment> {
        let payment = self.store.payment_mut(id).ok_or_else(Self::not_found)?;
        if let Some(reference) = input.reference {
            payment.reference = reference;
        }
        if input.notes.is_some() {
            payment.notes = input.notes;
        }
        Ok(payment.clone())
    }

    /// Net amount of completed payments
    pub fn total_completed(&self) -> Decimal {
        self.store
            .payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Completed)
            .map(|p| p.net_amount)
            .sum()
    }
}
