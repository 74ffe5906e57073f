//! Purchasing overview dashboard

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{InvoiceStatus, PaymentStatus};

use crate::store::PurchasingStore;

/// Reporting service; read-only over the ledgers
pub struct ReportingService<'a> {
    store: &'a PurchasingStore,
}

/// Headline figures for the purchasing dashboard
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PurchaseOverview {
    pub as_of: NaiveDate,
    pub total_unpaid: Decimal,
    pub overdue_count: usize,
    pub overdue_amount: Decimal,
    pub upcoming_days: i64,
    pub upcoming_count: usize,
    pub upcoming_amount: Decimal,
    pub withholding_tax_calculated: Decimal,
    pub payments_completed: Decimal,
    pub unacknowledged_alerts: usize,
    pub certificates_generated: usize,
    pub invoice_count: usize,
    pub purchase_order_count: usize,
}

impl<'a> ReportingService<'a> {
    pub fn new(store: &'a PurchasingStore) -> Self {
        Self { store }
    }

    pub fn overview(&self, today: NaiveDate, upcoming_days: i64) -> PurchaseOverview {
        let invoices = &self.store.invoices;

        let total_unpaid = invoices
            .iter()
            .filter(|inv| !matches!(inv.status, InvoiceStatus::Paid | InvoiceStatus::Cancelled))
            .map(|inv| inv.remaining_amount)
            .sum();

        let overdue: Vec<_> = invoices.iter().filter(|inv| inv.is_overdue(today)).collect();
        let upcoming: Vec<_> = invoices
            .iter()
            .filter(|inv| inv.is_due_within(today, upcoming_days))
            .collect();

        let taxes = &self.store.withholding_taxes;

        PurchaseOverview {
            as_of: today,
            total_unpaid,
            overdue_count: overdue.len(),
            overdue_amount: overdue.iter().map(|inv| inv.remaining_amount).sum(),
            upcoming_days,
            upcoming_count: upcoming.len(),
            upcoming_amount: upcoming.iter().map(|inv| inv.remaining_amount).sum(),
            withholding_tax_calculated: taxes.iter().map(|wt| wt.tax_amount).sum(),
            payments_completed: self
                .store
                .payments
                .iter()
                .filter(|p| p.status == PaymentStatus::Completed)
                .map(|p| p.net_amount)
                .sum(),
            unacknowledged_alerts: self.store.alerts.iter().filter(|a| !a.acknowledged).count(),
            certificates_generated: taxes.iter().filter(|wt| wt.certificate_generated).count(),
            invoice_count: invoices.len(),
            purchase_order_count: self.store.purchase_orders.len(),
        }
    }
}
