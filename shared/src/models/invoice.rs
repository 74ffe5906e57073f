//! Supplier invoice models and the invoice status machine

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PurchaseOrderItem;
use crate::pricing::{line_amounts, percent_of, remaining_amount, DocumentTotals, LineAmounts};

/// An invoice received from a supplier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierInvoice {
    pub id: Uuid,
    pub invoice_number: String,
    pub supplier_invoice_number: String,
    pub supplier_id: String,
    pub supplier_name: String,
    pub purchase_order_id: Option<Uuid>,
    pub delivery_note_id: Option<Uuid>,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
    pub items: Vec<SupplierInvoiceItem>,
    pub subtotal: Decimal,
    pub vat_amount: Decimal,
    /// Withholding percentage fixed when the invoice was entered
    pub withholding_rate: Decimal,
    pub withholding_tax: Decimal,
    pub total: Decimal,
    pub paid_amount: Decimal,
    pub remaining_amount: Decimal,
    pub payment_terms: String,
    pub notes: Option<String>,
    pub created_by: String,
    pub validated_by: Option<String>,
    pub validated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An invoiced line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierInvoiceItem {
    pub id: Uuid,
    pub product_id: String,
    pub product_name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub vat_rate: Decimal,
    pub vat_amount: Decimal,
    /// Pre-VAT line total
    pub total: Decimal,
    pub discrepancy: Option<InvoiceDiscrepancy>,
}

/// Difference between an invoiced line and the ordered line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvoiceDiscrepancy {
    pub kind: DiscrepancyKind,
    pub expected: Decimal,
    pub actual: Decimal,
    pub difference: Decimal,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiscrepancyKind {
    Quantity,
    Price,
    Vat,
}

/// Invoice lifecycle
///
/// `Overdue` is never stored: it is a view-time classification of a validated
/// invoice past its due date (see [`SupplierInvoice::display_status`]).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Validated,
    Paid,
    PartiallyPaid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Validated => "validated",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::PartiallyPaid => "partially_paid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }

    /// Whether a payment may be applied in this status
    pub fn accepts_payment(&self) -> bool {
        matches!(self, InvoiceStatus::Validated | InvoiceStatus::PartiallyPaid)
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SupplierInvoiceItem {
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
            vat_amount: amounts.vat_amount,
            total: amounts.total,
            discrepancy: None,
        }
    }
}

/// Compare an invoiced line with the ordered line
///
/// Quantity is checked first, then unit price, then VAT rate; only the first
/// mismatch is reported.
pub fn detect_discrepancy(
    ordered: &PurchaseOrderItem,
    invoiced: &SupplierInvoiceItem,
) -> Option<InvoiceDiscrepancy> {
    let checks = [
        (DiscrepancyKind::Quantity, ordered.quantity, invoiced.quantity),
        (DiscrepancyKind::Price, ordered.unit_price, invoiced.unit_price),
        (DiscrepancyKind::Vat, ordered.vat_rate, invoiced.vat_rate),
    ];

    checks
        .into_iter()
        .find(|(_, expected, actual)| expected != actual)
        .map(|(kind, expected, actual)| InvoiceDiscrepancy {
            kind,
            expected,
            actual,
            difference: actual - expected,
        })
}

impl SupplierInvoice {
    /// Recompute subtotal, VAT, withholding, total and remaining from the items
    pub fn recompute_totals(&mut self) {
        let totals = DocumentTotals::from_lines(self.items.iter().map(|item| LineAmounts {
            total: item.total,
            vat_amount: item.vat_amount,
        }));
        self.subtotal = totals.subtotal;
        self.vat_amount = totals.vat_amount;
        self.total = totals.total;
        self.withholding_tax = percent_of(totals.subtotal, self.withholding_rate);
        self.refresh_remaining();
    }

    /// Restore `remaining = total - withholding - paid`
    pub fn refresh_remaining(&mut self) {
        self.remaining_amount = remaining_amount(self.total, self.withholding_tax, self.paid_amount);
    }

    /// Post the net value of a payment and move to `paid` or `partially_paid`
    pub fn apply_payment(&mut self, net_amount: Decimal) {
        self.paid_amount += net_amount;
        self.refresh_remaining();
        self.status = if self.remaining_amount <= Decimal::ZERO {
            InvoiceStatus::Paid
        } else {
            InvoiceStatus::PartiallyPaid
        };
    }

    /// Validated, past due and still owing
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == InvoiceStatus::Validated
            && self.due_date < today
            && self.remaining_amount > Decimal::ZERO
    }

    /// Validated, due within `days` from today (overdue ones included) and still owing
    ///
    /// A horizon past the calendar range covers every due date.
    pub fn is_due_within(&self, today: NaiveDate, days: i64) -> bool {
        let in_horizon = match chrono::Duration::try_days(days)
            .and_then(|span| today.checked_add_signed(span))
        {
            Some(horizon) => self.due_date <= horizon,
            None => days > 0,
        };
        self.status == InvoiceStatus::Validated
            && in_horizon
            && self.remaining_amount > Decimal::ZERO
    }

    /// Days past the due date, zero when not yet due
    pub fn days_overdue(&self, today: NaiveDate) -> i64 {
        (today - self.due_date).num_days().max(0)
    }

    /// Status shown to users; payment status wins over the due-date classification
    pub fn display_status(&self, today: NaiveDate) -> InvoiceStatus {
        if self.is_overdue(today) {
            InvoiceStatus::Overdue
        } else {
            self.status
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn invoice() -> SupplierInvoice {
        let now = Utc::now();
        let mut invoice = SupplierInvoice {
            id: Uuid::new_v4(),
            invoice_number: "FINV-2024-001".to_string(),
            supplier_invoice_number: "GSI-2024-0156".to_string(),
            supplier_id: "1".to_string(),
            supplier_name: "Global Supplies Inc".to_string(),
            purchase_order_id: None,
            delivery_note_id: None,
            invoice_date: date(2024, 1, 22),
            due_date: date(2024, 2, 21),
            status: InvoiceStatus::Draft,
            items: vec![SupplierInvoiceItem::new(
                "1".to_string(),
                "Ordinateur Portable Dell".to_string(),
                dec("10"),
                dec("850"),
                dec("19"),
            )],
            subtotal: Decimal::ZERO,
            vat_amount: Decimal::ZERO,
            withholding_rate: crate::DEFAULT_WITHHOLDING_RATE,
            withholding_tax: Decimal::ZERO,
            total: Decimal::ZERO,
            paid_amount: Decimal::ZERO,
            remaining_amount: Decimal::ZERO,
            payment_terms: "30 jours".to_string(),
            notes: None,
            created_by: "admin".to_string(),
            validated_by: None,
            validated_at: None,
            created_at: now,
            updated_at: now,
        };
        invoice.recompute_totals();
        invoice
    }

    #[test]
    fn test_invoice_totals() {
        let invoice = invoice();
        assert_eq!(invoice.subtotal, dec("8500"));
        assert_eq!(invoice.vat_amount, dec("1615"));
        assert_eq!(invoice.withholding_tax, dec("255"));
        assert_eq!(invoice.total, dec("10115"));
        assert_eq!(invoice.remaining_amount, dec("9860"));
    }

    #[test]
    fn test_apply_partial_then_full_payment() {
        let mut invoice = invoice();
        invoice.status = InvoiceStatus::Validated;

        invoice.apply_payment(dec("4000"));
        assert_eq!(invoice.status, InvoiceStatus::PartiallyPaid);
        assert_eq!(invoice.remaining_amount, dec("5860"));

        invoice.apply_payment(dec("5860"));
        assert_eq!(invoice.status, InvoiceStatus::Paid);
        assert_eq!(invoice.remaining_amount, Decimal::ZERO);
    }

    #[test]
    fn test_overdue_is_view_time_only() {
        let mut invoice = invoice();
        invoice.status = InvoiceStatus::Validated;
        let today = date(2024, 3, 1);

        assert!(invoice.is_overdue(today));
        assert_eq!(invoice.display_status(today), InvoiceStatus::Overdue);
        assert_eq!(invoice.status, InvoiceStatus::Validated);
        assert_eq!(invoice.days_overdue(today), 9);
    }

    #[test]
    fn test_partially_paid_takes_precedence_over_overdue() {
        let mut invoice = invoice();
        invoice.status = InvoiceStatus::Validated;
        invoice.apply_payment(dec("100"));
        let today = date(2024, 3, 1);

        assert!(!invoice.is_overdue(today));
        assert_eq!(invoice.display_status(today), InvoiceStatus::PartiallyPaid);
    }

    #[test]
    fn test_not_overdue_on_due_date() {
        let mut invoice = invoice();
        invoice.status = InvoiceStatus::Validated;
        assert!(!invoice.is_overdue(date(2024, 2, 21)));
        assert!(invoice.is_due_within(date(2024, 2, 14), 7));
        assert!(!invoice.is_due_within(date(2024, 2, 13), 7));
    }

    #[test]
    fn test_horizon_beyond_calendar_range() {
        let mut invoice = invoice();
        invoice.status = InvoiceStatus::Validated;
        let today = date(2024, 2, 1);

        assert!(invoice.is_due_within(today, i64::MAX));
        assert!(invoice.is_due_within(today, 100_000_000_000));
        assert!(!invoice.is_due_within(today, i64::MIN));
        assert!(!invoice.is_due_within(today, -100_000_000_000));
    }

    #[test]
    fn test_draft_is_never_overdue() {
        let invoice = invoice();
        assert!(!invoice.is_overdue(date(2025, 1, 1)));
        assert_eq!(invoice.display_status(date(2025, 1, 1)), InvoiceStatus::Draft);
    }

    #[test]
    fn test_detect_discrepancy() {
        let ordered = PurchaseOrderItem::new(
            "1".to_string(),
            "Laptop".to_string(),
            dec("10"),
            dec("850"),
            dec("19"),
        );

        let same = SupplierInvoiceItem::new("1".into(), "Laptop".into(), dec("10"), dec("850"), dec("19"));
        assert_eq!(detect_discrepancy(&ordered, &same), None);

        let short = SupplierInvoiceItem::new("1".into(), "Laptop".into(), dec("8"), dec("900"), dec("19"));
        let discrepancy = detect_discrepancy(&ordered, &short).unwrap();
        assert_eq!(discrepancy.kind, DiscrepancyKind::Quantity);
        assert_eq!(discrepancy.difference, dec("-2"));

        let pricier = SupplierInvoiceItem::new("1".into(), "Laptop".into(), dec("10"), dec("900"), dec("19"));
        let discrepancy = detect_discrepancy(&ordered, &pricier).unwrap();
        assert_eq!(discrepancy.kind, DiscrepancyKind::Price);
        assert_eq!(discrepancy.difference, dec("50"));

        let vat = SupplierInvoiceItem::new("1".into(), "Laptop".into(), dec("10"), dec("850"), dec("7"));
        assert_eq!(detect_discrepancy(&ordered, &vat).unwrap().kind, DiscrepancyKind::Vat);
    }
}
