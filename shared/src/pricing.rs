//! Amount arithmetic for purchasing documents
//!
//! All rates are percentages (`19` means 19 %). Money is rounded to two decimals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Statutory withholding rate applied to supplier invoices (3 %)
pub const DEFAULT_WITHHOLDING_RATE: Decimal = Decimal::from_parts(3, 0, 0, false, 0);

const HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Round a money amount to cents
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp(2)
}

/// `amount * rate / 100`, rounded to cents
pub fn percent_of(amount: Decimal, rate: Decimal) -> Decimal {
    round_money(amount * rate / HUNDRED)
}

/// Pre-VAT total and VAT of one document line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAmounts {
    pub total: Decimal,
    pub vat_amount: Decimal,
}

/// Compute the amounts of a line from quantity, unit price and VAT rate
pub fn line_amounts(quantity: Decimal, unit_price: Decimal, vat_rate: Decimal) -> LineAmounts {
    let total = round_money(quantity * unit_price);
    LineAmounts {
        total,
        vat_amount: percent_of(total, vat_rate),
    }
}

/// Subtotal, VAT and grand total of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentTotals {
    pub subtotal: Decimal,
    pub vat_amount: Decimal,
    pub total: Decimal,
}

impl DocumentTotals {
    pub fn from_lines<I>(lines: I) -> Self
    where
        I: IntoIterator<Item = LineAmounts>,
    {
        let (subtotal, vat_amount) = lines
            .into_iter()
            .fold((Decimal::ZERO, Decimal::ZERO), |(sub, vat), line| {
                (sub + line.total, vat + line.vat_amount)
            });
        Self {
            subtotal,
            vat_amount,
            total: subtotal + vat_amount,
        }
    }
}

/// Unpaid balance of an invoice: `total - withholding - paid`
pub fn remaining_amount(total: Decimal, withholding_tax: Decimal, paid_amount: Decimal) -> Decimal {
    total - withholding_tax - paid_amount
}

/// Split a gross payment into `(withholding, net)` at the given rate
pub fn split_payment(amount: Decimal, withholding_rate: Decimal) -> (Decimal, Decimal) {
    let withholding = percent_of(amount, withholding_rate);
    (withholding, amount - withholding)
}
