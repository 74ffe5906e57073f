//! WebAssembly module for the ERP purchasing console
//!
//! Provides client-side computation for:
//! - Invoice and order totals while a document is being typed
//! - Withholding and payment previews
//! - Goods receipt quantity checks
//! - Invoice status display

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::pricing::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&JsValue::from_str("purchasing wasm module loaded"));
}

/// A line as typed in the invoice or order form
#[derive(Debug, Deserialize)]
struct DraftLine {
    quantity: Decimal,
    unit_price: Decimal,
    vat_rate: Decimal,
}

/// Totals preview returned to the form
#[derive(Debug, Serialize)]
struct TotalsPreview {
    subtotal: Decimal,
    vat_amount: Decimal,
    withholding_tax: Decimal,
    total: Decimal,
    net_payable: Decimal,
}

fn parse_decimal(field: &str, raw: &str) -> Result<Decimal, JsValue> {
    Decimal::from_str(raw.trim())
        .map_err(|e| JsValue::from_str(&format!("Invalid {}: {}", field, e)))
}

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, JsValue> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| JsValue::from_str(&format!("Invalid {}: {}", field, e)))
}

/// Compute document totals from a JSON array of lines
///
/// Amounts are returned as decimal strings to keep cents exact.
#[wasm_bindgen]
pub fn calculate_invoice_totals(lines_json: &str, withholding_rate: &str) -> Result<String, JsValue> {
    let lines: Vec<DraftLine> = serde_json::from_str(lines_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid lines JSON: {}", e)))?;
    let rate = parse_decimal("withholding rate", withholding_rate)?;
    validate_rate(rate).map_err(JsValue::from_str)?;
    for line in &lines {
        validate_quantity(line.quantity).map_err(JsValue::from_str)?;
        validate_unit_price(line.unit_price).map_err(JsValue::from_str)?;
        validate_rate(line.vat_rate).map_err(JsValue::from_str)?;
    }

    let totals = DocumentTotals::from_lines(
        lines
            .iter()
            .map(|line| line_amounts(line.quantity, line.unit_price, line.vat_rate)),
    );
    let withholding_tax = percent_of(totals.subtotal, rate);

    let preview = TotalsPreview {
        subtotal: totals.subtotal,
        vat_amount: totals.vat_amount,
        withholding_tax,
        total: totals.total,
        net_payable: remaining_amount(totals.total, withholding_tax, Decimal::ZERO),
    };
    serde_json::to_string(&preview).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Net amount of a gross payment after withholding
#[wasm_bindgen]
pub fn calculate_payment_net(amount: &str, withholding_rate: &str) -> Result<String, JsValue> {
    let amount = parse_decimal("amount", amount)?;
    let rate = parse_decimal("withholding rate", withholding_rate)?;
    validate_rate(rate).map_err(JsValue::from_str)?;
    if amount.checked_mul(rate).is_none() {
        return Err(JsValue::from_str("Amount is too large"));
    }
    let (_, net) = split_payment(amount, rate);
    Ok(net.to_string())
}

/// Check a payment against the invoice balance before submitting it
#[wasm_bindgen]
pub fn check_payment_amount(amount: &str, remaining: &str) -> Result<bool, JsValue> {
    let amount = parse_decimal("amount", amount)?;
    let remaining = parse_decimal("remaining amount", remaining)?;
    Ok(validate_payment_amount(amount, remaining).is_ok())
}

/// Check a goods receipt line; returns the error message, empty when valid
#[wasm_bindgen]
pub fn check_receipt_line(ordered: f64, delivered: f64, received: f64) -> String {
    let to_decimal = |value: f64| Decimal::try_from(value).unwrap_or(Decimal::NEGATIVE_ONE);

    match validate_receipt_quantities(to_decimal(ordered), to_decimal(delivered), to_decimal(received)) {
        Ok(()) => String::new(),
        Err(message) => message.to_string(),
    }
}

/// Line status a receipt line will get
#[wasm_bindgen]
pub fn receipt_line_status(delivered: f64, received: f64) -> String {
    let delivered = Decimal::try_from(delivered).unwrap_or(Decimal::ZERO);
    let received = Decimal::try_from(received).unwrap_or(Decimal::ZERO);
    DeliveryLineStatus::derive(delivered, received)
        .as_str()
        .to_string()
}

/// Status to show for an invoice on the given day (`YYYY-MM-DD`)
#[wasm_bindgen]
pub fn invoice_display_status(invoice_json: &str, today: &str) -> Result<String, JsValue> {
    let invoice: SupplierInvoice = serde_json::from_str(invoice_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid invoice JSON: {}", e)))?;
    let today = parse_date("date", today)?;
    Ok(invoice.display_status(today).to_string())
}

/// Status to show for an invoice today, using the browser clock
#[wasm_bindgen]
pub fn invoice_display_status_today(invoice_json: &str) -> Result<String, JsValue> {
    let now = js_sys::Date::new_0();
    let today = NaiveDate::from_ymd_opt(now.get_full_year() as i32, now.get_month() + 1, now.get_date())
        .ok_or_else(|| JsValue::from_str("Invalid browser date"))?;
    let invoice: SupplierInvoice = serde_json::from_str(invoice_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid invoice JSON: {}", e)))?;
    Ok(invoice.display_status(today).to_string())
}

/// Declaration period (`YYYY-MM`) a date falls in
#[wasm_bindgen]
pub fn withholding_period(date: &str) -> Result<String, JsValue> {
    let date = parse_date("date", date)?;
    Ok(Period::from_date(date).to_string())
}
