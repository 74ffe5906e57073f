//! Withholding tax models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Period;

/// Tax withheld on a supplier invoice for one statutory period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithholdingTax {
    pub id: Uuid,
    pub supplier_id: String,
    pub supplier_name: String,
    pub invoice_id: Uuid,
    pub invoice_number: String,
    /// Percentage
    pub tax_rate: Decimal,
    pub taxable_amount: Decimal,
    pub tax_amount: Decimal,
    pub period: Period,
    pub status: WithholdingTaxStatus,
    pub certificate_generated: bool,
    pub certificate_generated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WithholdingTaxStatus {
    Calculated,
    Paid,
    Declared,
}

impl WithholdingTaxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WithholdingTaxStatus::Calculated => "calculated",
            WithholdingTaxStatus::Paid => "paid",
            WithholdingTaxStatus::Declared => "declared",
        }
    }
}

impl std::fmt::Display for WithholdingTaxStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Total withheld in one period
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PeriodTotal {
    pub period: Period,
    pub tax_amount: Decimal,
    pub record_count: usize,
}
