//! Route definitions for the purchasing API

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/purchase-orders", purchase_order_routes())
        .nest("/delivery-notes", delivery_note_routes())
        .nest("/invoices", invoice_routes())
        .route("/suppliers/:supplier_id/balance", get(handlers::get_supplier_balance))
        .nest("/payments", payment_routes())
        .nest("/withholding-taxes", withholding_tax_routes())
        .nest("/alerts", alert_routes())
        .route("/reports/overview", get(handlers::get_overview))
}

/// Purchase order routes, including goods receipt
fn purchase_order_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_purchase_orders).post(handlers::create_purchase_order),
        )
        .route(
            "/:id",
            get(handlers::get_purchase_order)
                .put(handlers::update_purchase_order)
                .delete(handlers::delete_purchase_order),
        )
        .route("/:id/cancel", post(handlers::cancel_purchase_order))
        .route("/:id/receipts", post(handlers::receive_goods))
}

/// Delivery note routes
fn delivery_note_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_delivery_notes))
        .route(
            "/:id",
            get(handlers::get_delivery_note).put(handlers::update_delivery_note),
        )
}

/// Supplier invoice routes
fn invoice_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_invoices).post(handlers::create_invoice))
        .route("/overdue", get(handlers::list_overdue_invoices))
        .route("/upcoming", get(handlers::list_upcoming_invoices))
        .route("/:id", get(handlers::get_invoice).put(handlers::update_invoice))
        .route("/:id/validate", post(handlers::validate_invoice))
        .route("/:id/cancel", post(handlers::cancel_invoice))
}

/// Supplier payment routes
fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_payments).post(handlers::create_payment))
        .route("/:id", get(handlers::get_payment).put(handlers::update_payment))
        .route("/:id/complete", post(handlers::complete_payment))
        .route("/:id/cancel", post(handlers::cancel_payment))
}

/// Withholding tax routes
fn withholding_tax_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_withholding_taxes))
        .route("/summary", get(handlers::get_withholding_summary))
        .route("/:id/pay", post(handlers::mark_withholding_paid))
        .route("/:id/certificate", post(handlers::generate_certificate))
        .route("/periods/:period/declare", post(handlers::declare_period))
        .route("/periods/:period/report.csv", get(handlers::period_report_csv))
}

/// Payment alert routes
fn alert_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_alerts))
        .route("/scan", post(handlers::scan_alerts))
        .route("/:id/acknowledge", post(handlers::acknowledge_alert))
}
