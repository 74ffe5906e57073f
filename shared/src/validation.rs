//! Validation utilities for purchasing documents
//!
//! These checks guard the ledger boundary: the services reject any input that
//! fails them with a typed error before touching state.

use chrono::NaiveDate;
use rust_decimal::Decimal;

// ============================================================================
// Line Item Validations
// ============================================================================

/// Largest quantity accepted on a document line
pub const MAX_QUANTITY: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Largest unit price accepted on a document line (10^12)
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Validate that an ordered or invoiced quantity is strictly positive and bounded
pub fn validate_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be positive");
    }
    if quantity > MAX_QUANTITY {
        return Err("Quantity is too large");
    }
    Ok(())
}

/// Validate that a unit price is not negative and bounded
pub fn validate_unit_price(unit_price: Decimal) -> Result<(), &'static str> {
    if unit_price < Decimal::ZERO {
        return Err("Unit price cannot be negative");
    }
    if unit_price > MAX_UNIT_PRICE {
        return Err("Unit price is too large");
    }
    Ok(())
}

/// Validate a percentage rate (VAT or withholding) is between 0 and 100
pub fn validate_rate(rate: Decimal) -> Result<(), &'static str> {
    if rate < Decimal::ZERO || rate > Decimal::from(100) {
        return Err("Rate must be between 0 and 100");
    }
    Ok(())
}

// ============================================================================
// Receipt Validations
// ============================================================================

/// Validate `0 <= received <= delivered <= ordered`
pub fn validate_receipt_quantities(
    ordered: Decimal,
    delivered: Decimal,
    received: Decimal,
) -> Result<(), &'static str> {
    if delivered < Decimal::ZERO || received < Decimal::ZERO {
        return Err("Delivered and received quantities cannot be negative");
    }
    if received > delivered {
        return Err("Received quantity cannot exceed delivered quantity");
    }
    if delivered > ordered {
        return Err("Delivered quantity cannot exceed ordered quantity");
    }
    Ok(())
}

// ============================================================================
// Invoice and Payment Validations
// ============================================================================

/// Validate that the due date does not precede the invoice date
pub fn validate_due_date(invoice_date: NaiveDate, due_date: NaiveDate) -> Result<(), &'static str> {
    if due_date < invoice_date {
        return Err("Due date cannot be before the invoice date");
    }
    Ok(())
}

/// Validate `0 < amount <= remaining`
pub fn validate_payment_amount(amount: Decimal, remaining: Decimal) -> Result<(), &'static str> {
    if amount <= Decimal::ZERO {
        return Err("Payment amount must be positive");
    }
    if amount > remaining {
        return Err("Payment amount exceeds the remaining balance");
    }
    Ok(())
}
