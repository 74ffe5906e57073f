//! Payment alert generation
//!
//! Alerts are materialized by scanning the invoice ledger. A scan only ever
//! appends: one alert per invoice and type, never updated except through
//! acknowledgement.

use chrono::NaiveDate;
use shared::{due_soon_priority, overdue_priority, AlertType, PaymentAlert};
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::AlertSettings;
use crate::error::{AppError, AppResult};
use crate::store::PurchasingStore;

pub struct AlertService<'a> {
    store: &'a mut PurchasingStore,
    settings: &'a AlertSettings,
    clock: &'a dyn Clock,
}

impl<'a> AlertService<'a> {
    /// Create a new AlertService instance
    pub fn new(
        store: &'a mut PurchasingStore,
        settings: &'a AlertSettings,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            store,
            settings,
            clock,
        }
    }

    fn already_alerted(&self, invoice_id: Uuid, alert_type: AlertType) -> bool {
        self.store
            .alerts
            .iter()
            .any(|a| a.invoice_id == invoice_id && a.alert_type == alert_type)
    }

    /// Create the overdue and due-soon alerts that do not exist yet
    pub fn scan(&mut self, today: NaiveDate) -> Vec<PaymentAlert> {
        let now = self.clock.now();
        let thresholds = self.settings.priority_thresholds();
        let mut created = Vec::new();

        for invoice in &self.store.invoices {
            tracing::debug!(invoice_number = %invoice.invoice_number, "Scanning invoice");

            let (alert_type, days_overdue, priority) = if invoice.is_overdue(today) {
                let days = invoice.days_overdue(today);
                (AlertType::Overdue, Some(days), overdue_priority(days, &thresholds))
            } else if invoice.is_due_within(today, self.settings.due_soon_days) {
                let days_until_due = (invoice.due_date - today).num_days();
                (
                    AlertType::DueSoon,
                    None,
                    due_soon_priority(days_until_due, &thresholds),
                )
            } else {
                continue;
            };

            if self.already_alerted(invoice.id, alert_type) {
                continue;
            }

            created.push(PaymentAlert {
                id: Uuid::new_v4(),
                alert_type,
                invoice_id: invoice.id,
                invoice_number: invoice.invoice_number.clone(),
                supplier_id: invoice.supplier_id.clone(),
                amount: invoice.remaining_amount,
                due_date: invoice.due_date,
                days_overdue,
                priority,
                acknowledged: false,
                acknowledged_at: None,
                created_at: now,
            });
        }

        tracing::info!(created = created.len(), %today, "Alert scan finished");
        self.store.alerts.extend(created.iter().cloned());
        created
    }

    /// Acknowledge an alert; acknowledging twice keeps the first timestamp
    pub fn acknowledge(&mut self, id: Uuid) -> AppResult<PaymentAlert> {
        let now = self.clock.now();
        let alert = self
            .store
            .alert_mut(id)
            .ok_or_else(|| AppError::NotFound("Alert".to_string()))?;

        if !alert.acknowledged {
            alert.acknowledged = true;
            alert.acknowledged_at = Some(now);
            tracing::info!(alert_id = %alert.id, "Alert acknowledged");
        }
        Ok(alert.clone())
    }

    pub fn list(&self, unacknowledged_only: bool) -> Vec<PaymentAlert> {
        self.store
            .alerts
            .iter()
            .filter(|a| !unacknowledged_only || !a.acknowledged)
            .cloned()
            .collect()
    }

    /// Number of alerts still waiting for acknowledgement
    pub fn unacknowledged_count(&self) -> usize {
        self.store.alerts.iter().filter(|a| !a.acknowledged).count()
    }
}
