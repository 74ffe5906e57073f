//! Supplier payment tests
//!
//! Tests for payments including:
//! - Net amount written back to the invoice
//! - Withholding on the invoice only, or again on the payment (legacy)
//! - paid <=> remaining <= 0
//! - Paid amount never decreases

use chrono::NaiveDate;
use proptest::prelude::*;
use purchasing_backend::config::PurchasingSettings;
use purchasing_backend::error::AppError;
use purchasing_backend::models::{InvoiceStatus, PaymentMethod, PaymentStatus, SupplierInvoice};
use purchasing_backend::services::{
    CreateInvoiceInput, CreatePaymentInput, InvoiceService, LineItemInput, PaymentService,
    UpdatePaymentInput,
};
use purchasing_backend::{FixedClock, PurchasingStore};
use rust_decimal::Decimal;
use std::str::FromStr;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// 10 x 850 at 19 % VAT: total 10115, withholding 255, remaining 9860
fn invoice(
    store: &mut PurchasingStore,
    settings: &PurchasingSettings,
    clock: &FixedClock,
    validate: bool,
) -> SupplierInvoice {
    let mut service = InvoiceService::new(store, settings, clock);
    let invoice = service
        .create(
            CreateInvoiceInput {
                supplier_invoice_number: "GSI-2024-0156".to_string(),
                supplier_id: "1".to_string(),
                supplier_name: "Global Supplies Inc".to_string(),
                purchase_order_id: None,
                delivery_note_id: None,
                invoice_date: date(2024, 1, 22),
                due_date: date(2024, 2, 21),
                items: vec![LineItemInput {
                    product_id: "1".to_string(),
                    product_name: "Ordinateur Portable Dell".to_string(),
                    quantity: dec("10"),
                    unit_price: dec("850"),
                    vat_rate: dec("19"),
                }],
                payment_terms: "30 jours".to_string(),
                notes: None,
            },
            "clerk",
        )
        .unwrap();
    if validate {
        service.validate(invoice.id, "admin").unwrap()
    } else {
        invoice
    }
}

fn payment(invoice_id: uuid::Uuid, amount: &str) -> CreatePaymentInput {
    CreatePaymentInput {
        invoice_id,
        amount: dec(amount),
        payment_method: PaymentMethod::BankTransfer,
        payment_date: None,
        reference: "VIR-0001".to_string(),
        notes: None,
    }
}

fn stored_invoice(store: &PurchasingStore, id: uuid::Uuid) -> SupplierInvoice {
    store.invoices().iter().find(|inv| inv.id == id).cloned().unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_full_payment_settles_invoice() {
        let clock = FixedClock::at_date(date(2024, 2, 1));
        let settings = PurchasingSettings::default();
        let mut store = PurchasingStore::new();
        let inv = invoice(&mut store, &settings, &clock, true);

        let paid = PaymentService::new(&mut store, &settings, &clock)
            .create(payment(inv.id, "9860"), "treasurer")
            .unwrap();
        assert_eq!(paid.payment_number, "PAY-2024-001");
        assert_eq!(paid.status, PaymentStatus::Pending);
        assert_eq!(paid.withholding_tax, Decimal::ZERO);
        assert_eq!(paid.net_amount, dec("9860"));
        assert_eq!(paid.payment_date, date(2024, 2, 1));
        assert_eq!(paid.invoice_number, inv.invoice_number);

        let inv = stored_invoice(&store, inv.id);
        assert_eq!(inv.paid_amount, dec("9860"));
        assert_eq!(inv.remaining_amount, Decimal::ZERO);
        assert_eq!(inv.status, InvoiceStatus::Paid);
    }

    /// Scenario B with the legacy double withholding switched on
    #[test]
    fn test_scenario_b_withholding_on_payment() {
        let clock = FixedClock::at_date(date(2024, 2, 1));
        let settings = PurchasingSettings {
            withhold_on_payment: true,
            ..Default::default()
        };
        let mut store = PurchasingStore::new();
        let inv = invoice(&mut store, &settings, &clock, true);

        let paid = PaymentService::new(&mut store, &settings, &clock)
            .create(payment(inv.id, "9860"), "treasurer")
            .unwrap();
        assert_eq!(paid.withholding_tax, dec("295.8"));
        assert_eq!(paid.net_amount, dec("9564.2"));

        let inv = stored_invoice(&store, inv.id);
        assert_eq!(inv.paid_amount, dec("9564.2"));
        assert_eq!(inv.remaining_amount, dec("295.8"));
        assert_eq!(inv.status, InvoiceStatus::PartiallyPaid);
    }

    #[test]
    fn test_partial_payments() {
        let clock = FixedClock::at_date(date(2024, 2, 1));
        let settings = PurchasingSettings::default();
        let mut store = PurchasingStore::new();
        let inv = invoice(&mut store, &settings, &clock, true);
        let mut service = PaymentService::new(&mut store, &settings, &clock);

        service.create(payment(inv.id, "4000"), "treasurer").unwrap();
        service.create(payment(inv.id, "5000"), "treasurer").unwrap();
        let last = service.create(payment(inv.id, "860"), "treasurer").unwrap();
        assert_eq!(last.payment_number, "PAY-2024-003");
        assert_eq!(service.list(Some(inv.id)).len(), 3);

        let inv = stored_invoice(&store, inv.id);
        assert_eq!(inv.paid_amount, dec("9860"));
        assert_eq!(inv.status, InvoiceStatus::Paid);
    }

    #[test]
    fn test_overpayment_rejected() {
        let clock = FixedClock::at_date(date(2024, 2, 1));
        let settings = PurchasingSettings::default();
        let mut store = PurchasingStore::new();
        let inv = invoice(&mut store, &settings, &clock, true);
        let mut service = PaymentService::new(&mut store, &settings, &clock);

        assert!(matches!(
            service.create(payment(inv.id, "9860.01"), "treasurer"),
            Err(AppError::InvariantViolation(_))
        ));
        assert!(matches!(
            service.create(payment(inv.id, "0"), "treasurer"),
            Err(AppError::InvariantViolation(_))
        ));
        assert!(service.list(None).is_empty());
        assert_eq!(stored_invoice(&store, inv.id).paid_amount, Decimal::ZERO);
    }

    #[test]
    fn test_payment_requires_validated_invoice() {
        let clock = FixedClock::at_date(date(2024, 2, 1));
        let settings = PurchasingSettings::default();
        let mut store = PurchasingStore::new();
        let draft = invoice(&mut store, &settings, &clock, false);
        let mut service = PaymentService::new(&mut store, &settings, &clock);

        assert!(matches!(
            service.create(payment(draft.id, "100"), "treasurer"),
            Err(AppError::InvalidStateTransition(_))
        ));
        assert!(matches!(
            service.create(payment(uuid::Uuid::new_v4(), "100"), "treasurer"),
            Err(AppError::NotFound(_))
        ));
        assert!(service.list(None).is_empty());
    }

    #[test]
    fn test_paid_invoice_accepts_no_more_payments() {
        let clock = FixedClock::at_date(date(2024, 2, 1));
        let settings = PurchasingSettings::default();
        let mut store = PurchasingStore::new();
        let inv = invoice(&mut store, &settings, &clock, true);
        let mut service = PaymentService::new(&mut store, &settings, &clock);

        service.create(payment(inv.id, "9860"), "treasurer").unwrap();
        assert!(matches!(
            service.create(payment(inv.id, "1"), "treasurer"),
            Err(AppError::InvalidStateTransition(_))
        ));
    }

    #[test]
    fn test_partially_paid_invoice_cannot_be_cancelled() {
        let clock = FixedClock::at_date(date(2024, 2, 1));
        let settings = PurchasingSettings::default();
        let mut store = PurchasingStore::new();
        let inv = invoice(&mut store, &settings, &clock, true);
        PaymentService::new(&mut store, &settings, &clock)
            .create(payment(inv.id, "100"), "treasurer")
            .unwrap();

        let result = InvoiceService::new(&mut store, &settings, &clock).cancel(inv.id);
        assert!(matches!(result, Err(AppError::InvalidStateTransition(_))));
    }

    #[test]
    fn test_complete_and_cancel_leave_invoice_alone() {
        let clock = FixedClock::at_date(date(2024, 2, 1));
        let settings = PurchasingSettings::default();
        let mut store = PurchasingStore::new();
        let inv = invoice(&mut store, &settings, &clock, true);
        let mut service = PaymentService::new(&mut store, &settings, &clock);

        let first = service.create(payment(inv.id, "1000"), "treasurer").unwrap();
        let second = service.create(payment(inv.id, "500"), "treasurer").unwrap();

        assert_eq!(service.complete(first.id).unwrap().status, PaymentStatus::Completed);
        assert_eq!(service.cancel(second.id).unwrap().status, PaymentStatus::Cancelled);
        assert!(matches!(
            service.complete(second.id),
            Err(AppError::InvalidStateTransition(_))
        ));
        assert!(matches!(
            service.cancel(first.id),
            Err(AppError::InvalidStateTransition(_))
        ));
        assert_eq!(service.total_completed(), dec("1000"));

        let inv = stored_invoice(&store, inv.id);
        assert_eq!(inv.paid_amount, dec("1500"));
        assert_eq!(inv.status, InvoiceStatus::PartiallyPaid);
    }

    #[test]
    fn test_update_reference() {
        let clock = FixedClock::at_date(date(2024, 2, 1));
        let settings = PurchasingSettings::default();
        let mut store = PurchasingStore::new();
        let inv = invoice(&mut store, &settings, &clock, true);
        let mut service = PaymentService::new(&mut store, &settings, &clock);
        let created = service.create(payment(inv.id, "100"), "treasurer").unwrap();

        let updated = service
            .update(
                created.id,
                UpdatePaymentInput {
                    reference: Some("CHQ-778".to_string()),
                    notes: None,
                },
            )
            .unwrap();
        assert_eq!(updated.reference, "CHQ-778");
        assert_eq!(updated.amount, dec("100"));
        assert_eq!(service.get(created.id).unwrap().reference, "CHQ-778");
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for generating payment amounts (0.01 to 5000.00)
    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=500000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Paid never decreases, the balance identity holds after every
        /// payment, and an invoice is paid exactly when nothing remains
        #[test]
        fn prop_payments_keep_invoice_consistent(
            amounts in prop::collection::vec(amount_strategy(), 1..8),
            withhold_on_payment in any::<bool>()
        ) {
            let clock = FixedClock::at_date(date(2024, 2, 1));
            let settings = PurchasingSettings { withhold_on_payment, ..Default::default() };
            let mut store = PurchasingStore::new();
            let inv = invoice(&mut store, &settings, &clock, true);

            let mut previous_paid = Decimal::ZERO;
            for amount in amounts {
                let _ = PaymentService::new(&mut store, &settings, &clock)
                    .create(payment(inv.id, &amount.to_string()), "treasurer");

                let current = stored_invoice(&store, inv.id);
                prop_assert!(current.paid_amount >= previous_paid);
                prop_assert_eq!(
                    current.remaining_amount,
                    current.total - current.withholding_tax - current.paid_amount
                );
                prop_assert!(current.remaining_amount >= Decimal::ZERO);
                prop_assert_eq!(
                    current.status == InvoiceStatus::Paid,
                    current.remaining_amount <= Decimal::ZERO
                );
                previous_paid = current.paid_amount;
            }
        }
    }
}
