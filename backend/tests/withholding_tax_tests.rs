//! Withholding tax tests
//!
//! Tests for the withholding ledger including:
//! - One record per supplier, invoice and period
//! - One-way certificate generation
//! - Period declaration and monthly totals
//! - CSV declaration report

use chrono::NaiveDate;
use proptest::prelude::*;
use purchasing_backend::config::PurchasingSettings;
use purchasing_backend::error::AppError;
use purchasing_backend::models::{Period, SupplierInvoice, WithholdingTaxStatus};
use purchasing_backend::services::{
    CreateInvoiceInput, InvoiceService, LineItemInput, WithholdingTaxService,
};
use purchasing_backend::{Clock, FixedClock, PurchasingStore};
use rust_decimal::Decimal;
use std::str::FromStr;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn period(s: &str) -> Period {
    s.parse().unwrap()
}

/// Create and validate an invoice of `quantity` x 100 on the clock's day
fn validated_invoice(
    store: &mut PurchasingStore,
    clock: &FixedClock,
    supplier: &str,
    quantity: i64,
) -> SupplierInvoice {
    let settings = PurchasingSettings::default();
    let mut service = InvoiceService::new(store, &settings, clock);
    let invoice = service
        .create(
            CreateInvoiceInput {
                supplier_invoice_number: format!("{}-INV", supplier),
                supplier_id: supplier.to_string(),
                supplier_name: format!("Supplier {}", supplier),
                purchase_order_id: None,
                delivery_note_id: None,
                invoice_date: date(2024, 1, 1),
                due_date: date(2024, 12, 31),
                items: vec![LineItemInput {
                    product_id: "1".to_string(),
                    product_name: "Office supplies".to_string(),
                    quantity: Decimal::from(quantity),
                    unit_price: dec("100"),
                    vat_rate: dec("19"),
                }],
                payment_terms: "30 jours".to_string(),
                notes: None,
            },
            "clerk",
        )
        .unwrap();
    service.validate(invoice.id, "admin").unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Scenario D: a second certificate is refused and the flag stays set
    #[test]
    fn test_scenario_d_certificate_once() {
        let clock = FixedClock::at_date(date(2024, 1, 22));
        let mut store = PurchasingStore::new();
        validated_invoice(&mut store, &clock, "1", 10);
        let mut service = WithholdingTaxService::new(&mut store, &clock);
        let record = service.list(None)[0].clone();

        let certified = service.generate_certificate(record.id).unwrap();
        assert!(certified.certificate_generated);
        assert!(certified.certificate_generated_at.is_some());

        let again = service.generate_certificate(record.id);
        assert!(matches!(again, Err(AppError::InvalidStateTransition(_))));
        let record = service.get(record.id).unwrap();
        assert!(record.certificate_generated);
        assert_eq!(record.certificate_generated_at, certified.certificate_generated_at);
        assert_eq!(service.certificates_generated(), 1);
        assert_eq!(service.certificates_pending(), 0);
    }

    #[test]
    fn test_record_is_unique_per_invoice_and_period() {
        let clock = FixedClock::at_date(date(2024, 1, 22));
        let mut store = PurchasingStore::new();
        let invoice = validated_invoice(&mut store, &clock, "1", 10);
        let mut service = WithholdingTaxService::new(&mut store, &clock);

        let result = service.record_for_invoice(&invoice, clock.now());
        assert!(matches!(result, Err(AppError::InvariantViolation(_))));
        assert_eq!(service.list(None).len(), 1);
    }

    #[test]
    fn test_mark_paid_once() {
        let clock = FixedClock::at_date(date(2024, 1, 22));
        let mut store = PurchasingStore::new();
        validated_invoice(&mut store, &clock, "1", 10);
        let mut service = WithholdingTaxService::new(&mut store, &clock);
        let id = service.list(None)[0].id;

        assert_eq!(service.total_calculated(), dec("30"));
        assert_eq!(service.mark_paid(id).unwrap().status, WithholdingTaxStatus::Paid);
        assert!(matches!(
            service.mark_paid(id),
            Err(AppError::InvalidStateTransition(_))
        ));
        assert_eq!(service.total_calculated(), Decimal::ZERO);
        assert_eq!(service.total_paid(), dec("30"));
    }

    #[test]
    fn test_periods_follow_validation_date() {
        let clock = FixedClock::at_date(date(2024, 1, 22));
        let mut store = PurchasingStore::new();
        validated_invoice(&mut store, &clock, "1", 10);
        validated_invoice(&mut store, &clock, "2", 5);
        clock.advance_days(14);
        validated_invoice(&mut store, &clock, "1", 20);

        let mut service = WithholdingTaxService::new(&mut store, &clock);
        assert_eq!(service.list(Some(period("2024-01"))).len(), 2);
        assert_eq!(service.list(Some(period("2024-02"))).len(), 1);

        let monthly = service.monthly_totals();
        assert_eq!(monthly.len(), 2);
        assert_eq!(monthly[0].period, period("2024-01"));
        assert_eq!(monthly[0].tax_amount, dec("45"));
        assert_eq!(monthly[0].record_count, 2);
        assert_eq!(monthly[1].tax_amount, dec("60"));

        assert_eq!(service.declare_period(period("2024-01")), 2);
        assert_eq!(service.declare_period(period("2024-01")), 0);
        assert!(service
            .list(Some(period("2024-01")))
            .iter()
            .all(|wt| wt.status == WithholdingTaxStatus::Declared));
        assert_eq!(
            service.list(Some(period("2024-02")))[0].status,
            WithholdingTaxStatus::Calculated
        );

        let summary = service.summary();
        assert_eq!(summary.total_calculated, dec("60"));
        assert_eq!(summary.certificates_pending, 3);
        assert_eq!(summary.monthly.len(), 2);
    }

    #[test]
    fn test_period_report_csv() {
        let clock = FixedClock::at_date(date(2024, 1, 22));
        let mut store = PurchasingStore::new();
        validated_invoice(&mut store, &clock, "1", 10);
        let service = WithholdingTaxService::new(&mut store, &clock);

        let report = service.period_report_csv(period("2024-01")).unwrap();
        let mut lines = report.lines();
        assert_eq!(
            lines.next(),
            Some("supplier,invoice,period,tax_rate,taxable_amount,tax_amount,status,certificate")
        );
        let row: Vec<&str> = lines.next().unwrap().split(',').collect();
        assert_eq!(&row[..3], &["Supplier 1", "FINV-2024-001", "2024-01"]);
        assert_eq!(dec(row[3]), dec("3"));
        assert_eq!(dec(row[4]), dec("1000"));
        assert_eq!(dec(row[5]), dec("30"));
        assert_eq!(&row[6..], &["calculated", "false"]);
        assert_eq!(lines.next(), None);

        assert!(service.period_report_csv(period("2023-12")).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_record() {
        let clock = FixedClock::at_date(date(2024, 1, 22));
        let mut store = PurchasingStore::new();
        let mut service = WithholdingTaxService::new(&mut store, &clock);

        assert!(matches!(
            service.generate_certificate(uuid::Uuid::new_v4()),
            Err(AppError::NotFound(_))
        ));
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Monthly totals add up to every recorded amount
        #[test]
        fn prop_monthly_totals_cover_all_records(
            invoices in prop::collection::vec((1i64..100, 0i64..90), 1..8)
        ) {
            let clock = FixedClock::at_date(date(2024, 1, 1));
            let mut store = PurchasingStore::new();

            for (quantity, advance) in invoices {
                clock.advance_days(advance);
                validated_invoice(&mut store, &clock, "1", quantity);
            }

            let service = WithholdingTaxService::new(&mut store, &clock);
            let monthly: Decimal = service.monthly_totals().iter().map(|m| m.tax_amount).sum();
            let records: Decimal = service.list(None).iter().map(|wt| wt.tax_amount).sum();
            prop_assert_eq!(monthly, records);
            prop_assert_eq!(service.total_calculated(), records);

            let periods: Vec<_> = service.monthly_totals().iter().map(|m| m.period).collect();
            let mut sorted = periods.clone();
            sorted.sort();
            prop_assert_eq!(periods, sorted);
        }
    }
}
