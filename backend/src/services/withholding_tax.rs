//! Withholding tax ledger
//!
//! Records are created when an invoice is validated, one per supplier, invoice
//! and period. Certificates and declarations only ever move forward.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{Period, PeriodTotal, SupplierInvoice, WithholdingTax, WithholdingTaxStatus};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{AppError, AppResult};
use crate::store::PurchasingStore;

/// Withholding tax service over the in-memory ledgers
pub struct WithholdingTaxService<'a> {
    store: &'a mut PurchasingStore,
    clock: &'a dyn Clock,
}

/// Aggregate figures for the withholding tax dashboard
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WithholdingTaxSummary {
    pub total_calculated: Decimal,
    pub total_paid: Decimal,
    pub certificates_generated: usize,
    pub certificates_pending: usize,
    pub monthly: Vec<PeriodTotal>,
}

/// CSV row of the monthly declaration report
#[derive(Debug, Serialize)]
struct ReportRow<'r> {
    supplier: &'r str,
    invoice: &'r str,
    period: String,
    tax_rate: Decimal,
    taxable_amount: Decimal,
    tax_amount: Decimal,
    status: &'static str,
    certificate: bool,
}

impl<'a> WithholdingTaxService<'a> {
    /// Create a new WithholdingTaxService instance
    pub fn new(store: &'a mut PurchasingStore, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    /// Reject a second record for the same supplier, invoice and period
    pub fn ensure_not_recorded(&self, invoice: &SupplierInvoice, period: Period) -> AppResult<()> {
        let exists = self.store.withholding_taxes.iter().any(|wt| {
            wt.supplier_id == invoice.supplier_id && wt.invoice_id == invoice.id && wt.period == period
        });
        if exists {
            return Err(AppError::InvariantViolation(format!(
                "withholding tax for invoice {} in {} is already recorded",
                invoice.invoice_number, period
            )));
        }
        Ok(())
    }

    /// Record the tax withheld on a validated invoice
    ///
    /// Returns `None` when there is nothing taxable.
    pub fn record_for_invoice(
        &mut self,
        invoice: &SupplierInvoice,
        validated_at: DateTime<Utc>,
    ) -> AppResult<Option<WithholdingTax>> {
        let period = Period::from_date(validated_at.date_naive());
        self.ensure_not_recorded(invoice, period)?;

        if invoice.subtotal <= Decimal::ZERO || invoice.withholding_tax <= Decimal::ZERO {
            tracing::debug!(invoice_id = %invoice.id, "No withholding tax to record");
            return Ok(None);
        }

        let record = WithholdingTax {
            id: Uuid::new_v4(),
            supplier_id: invoice.supplier_id.clone(),
            supplier_name: invoice.supplier_name.clone(),
            invoice_id: invoice.id,
            invoice_number: invoice.invoice_number.clone(),
            tax_rate: invoice.withholding_rate,
            taxable_amount: invoice.subtotal,
            tax_amount: invoice.withholding_tax,
            period,
            status: WithholdingTaxStatus::Calculated,
            certificate_generated: false,
            certificate_generated_at: None,
            created_at: validated_at,
        };

        tracing::info!(
            invoice_id = %invoice.id,
            period = %period,
            tax_amount = %record.tax_amount,
            "Withholding tax recorded"
        );

        self.store.withholding_taxes.push(record.clone());
        Ok(Some(record))
    }

    /// Drop the records of an invoice being cancelled
    ///
    /// Refused once any of them has been paid, declared or certified.
    pub fn release_for_invoice(&mut self, invoice: &SupplierInvoice) -> AppResult<usize> {
        let settled = self.store.withholding_taxes.iter().find(|wt| {
            wt.invoice_id == invoice.id
                && (wt.status != WithholdingTaxStatus::Calculated || wt.certificate_generated)
        });
        if let Some(record) = settled {
            return Err(AppError::InvalidStateTransition(format!(
                "withholding tax on invoice {} is already {}",
                invoice.invoice_number, record.status
            )));
        }

        let before = self.store.withholding_taxes.len();
        self.store.withholding_taxes.retain(|wt| wt.invoice_id != invoice.id);
        let released = before - self.store.withholding_taxes.len();
        tracing::info!(invoice_id = %invoice.id, released, "Withholding tax released");
        Ok(released)
    }

    /// Get a withholding tax record by id
    pub fn get(&self, id: Uuid) -> AppResult<WithholdingTax> {
        self.store
            .withholding_taxes
            .iter()
            .find(|wt| wt.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Withholding tax".to_string()))
    }

    /// List records, optionally for one period
    pub fn list(&self, period: Option<Period>) -> Vec<WithholdingTax> {
        self.store
            .withholding_taxes
            .iter()
            .filter(|wt| period.map_or(true, |p| wt.period == p))
            .cloned()
            .collect()
    }

    /// Mark the withheld amount as remitted to the tax authority
    pub fn mark_paid(&mut self, id: Uuid) -> AppResult<WithholdingTax> {
        let record = self
            .store
            .withholding_tax_mut(id)
            .ok_or_else(|| AppError::NotFound("Withholding tax".to_string()))?;

        if record.status != WithholdingTaxStatus::Calculated {
            return Err(AppError::InvalidStateTransition(format!(
                "withholding tax is {}, only calculated records can be paid",
                record.status
            )));
        }

        record.status = WithholdingTaxStatus::Paid;
        tracing::info!(withholding_tax_id = %record.id, "Withholding tax paid");
        Ok(record.clone())
    }

    /// Declare every record of a period; returns how many changed
    pub fn declare_period(&mut self, period: Period) -> usize {
        let mut declared = 0;
        for record in self
            .store
            .withholding_taxes
            .iter_mut()
            .filter(|wt| wt.period == period && wt.status != WithholdingTaxStatus::Declared)
        {
            record.status = WithholdingTaxStatus::Declared;
            declared += 1;
        }

        tracing::info!(period = %period, declared, "Withholding tax period declared");
        declared
    }

    /// Issue the withholding certificate; a record is certified at most once
    pub fn generate_certificate(&mut self, id: Uuid) -> AppResult<WithholdingTax> {
        let now = self.clock.now();
        let record = self
            .store
            .withholding_tax_mut(id)
            .ok_or_else(|| AppError::NotFound("Withholding tax".to_string()))?;

        if record.certificate_generated {
            tracing::warn!(withholding_tax_id = %record.id, "Certificate already generated");
            return Err(AppError::InvalidStateTransition(format!(
                "certificate for invoice {} was already generated",
                record.invoice_number
            )));
        }

        record.certificate_generated = true;
        record.certificate_generated_at = Some(now);
        tracing::info!(withholding_tax_id = %record.id, "Withholding certificate generated");
        Ok(record.clone())
    }

    fn total_with_status(&self, status: WithholdingTaxStatus) -> Decimal {
        self.store
            .withholding_taxes
            .iter()
            .filter(|wt| wt.status == status)
            .map(|wt| wt.tax_amount)
            .sum()
    }

    /// Sum of tax still to be remitted
    pub fn total_calculated(&self) -> Decimal {
        self.total_with_status(WithholdingTaxStatus::Calculated)
    }

    /// Sum of tax already remitted
    pub fn total_paid(&self) -> Decimal {
        self.total_with_status(WithholdingTaxStatus::Paid)
    }

    pub fn certificates_generated(&self) -> usize {
        self.store
            .withholding_taxes
            .iter()
            .filter(|wt| wt.certificate_generated)
            .count()
    }

    pub fn certificates_pending(&self) -> usize {
        self.store.withholding_taxes.len() - self.certificates_generated()
    }

    /// Tax withheld per period, oldest period first
    pub fn monthly_totals(&self) -> Vec<PeriodTotal> {
        let mut by_period: BTreeMap<Period, (Decimal, usize)> = BTreeMap::new();
        for record in &self.store.withholding_taxes {
            let entry = by_period.entry(record.period).or_insert((Decimal::ZERO, 0));
            entry.0 += record.tax_amount;
            entry.1 += 1;
        }

        by_period
            .into_iter()
            .map(|(period, (tax_amount, record_count))| PeriodTotal {
                period,
                tax_amount,
                record_count,
            })
            .collect()
    }

    pub fn summary(&self) -> WithholdingTaxSummary {
        WithholdingTaxSummary {
            total_calculated: self.total_calculated(),
            total_paid: self.total_paid(),
            certificates_generated: self.certificates_generated(),
            certificates_pending: self.certificates_pending(),
            monthly: self.monthly_totals(),
        }
    }

    /// Monthly declaration report as CSV
    pub fn period_report_csv(&self, period: Period) -> AppResult<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for record in self.store.withholding_taxes.iter().filter(|wt| wt.period == period) {
            writer
                .serialize(ReportRow {
                    supplier: &record.supplier_name,
                    invoice: &record.invoice_number,
                    period: record.period.to_string(),
                    tax_rate: record.tax_rate,
                    taxable_amount: record.taxable_amount,
                    tax_amount: record.tax_amount,
                    status: record.status.as_str(),
                    certificate: record.certificate_generated,
                })
                .map_err(|e| AppError::Internal(format!("CSV report: {}", e)))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV report: {}", e)))?;
        String::from_utf8(bytes).map_err(|e| AppError::Internal(e.to_string()))
    }
}
