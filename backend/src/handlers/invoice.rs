//! Supplier invoice HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::ActingUser;
use crate::models::{InvoiceStatus, SupplierInvoice};
use crate::services::invoice::{
    CreateInvoiceInput, InvoiceFilter, InvoiceService, UpdateInvoiceInput,
};
use crate::AppState;

/// Invoice as shown to users, with the view-time status
#[derive(Debug, Serialize)]
pub struct InvoiceView {
    #[serde(flatten)]
    pub invoice: SupplierInvoice,
    pub display_status: InvoiceStatus,
}

#[derive(Debug, Deserialize)]
pub struct UpcomingQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SupplierBalance {
    pub supplier_id: String,
    pub balance: Decimal,
}

fn views(invoices: Vec<SupplierInvoice>, service: &InvoiceService<'_>) -> Vec<InvoiceView> {
    invoices
        .into_iter()
        .map(|invoice| InvoiceView {
            display_status: service.display_status(&invoice),
            invoice,
        })
        .collect()
}

/// List invoices
pub async fn list_invoices(
    State(state): State<AppState>,
    Query(filter): Query<InvoiceFilter>,
) -> impl IntoResponse {
    let mut store = state.store.lock().await;
    let service = InvoiceService::new(&mut store, &state.config.purchasing, state.clock.as_ref());

    let invoices = views(service.list(&filter), &service);
    (StatusCode::OK, Json(serde_json::json!({ "invoices": invoices })))
}

/// Invoices past due with a balance left
pub async fn list_overdue_invoices(State(state): State<AppState>) -> impl IntoResponse {
    let mut store = state.store.lock().await;
    let service = InvoiceService::new(&mut store, &state.config.purchasing, state.clock.as_ref());

    let invoices = views(service.overdue(state.clock.today()), &service);
    (StatusCode::OK, Json(serde_json::json!({ "invoices": invoices })))
}

/// Invoices due within the requested number of days
pub async fn list_upcoming_invoices(
    State(state): State<AppState>,
    Query(query): Query<UpcomingQuery>,
) -> impl IntoResponse {
    let days = query.days.unwrap_or(state.config.alerts.due_soon_days);
    let mut store = state.store.lock().await;
    let service = InvoiceService::new(&mut store, &state.config.purchasing, state.clock.as_ref());

    let invoices = views(service.upcoming(state.clock.today(), days), &service);
    (
        StatusCode::OK,
        Json(serde_json::json!({ "days": days, "invoices": invoices })),
    )
}

/// Get an invoice
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
) -> impl IntoResponse {
    let mut store = state.store.lock().await;
    let service = InvoiceService::new(&mut store, &state.config.purchasing, state.clock.as_ref());

    match service.get(invoice_id) {
        Ok(invoice) => {
            let display_status = service.display_status(&invoice);
            (StatusCode::OK, Json(InvoiceView { invoice, display_status })).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Enter a supplier invoice
pub async fn create_invoice(
    State(state): State<AppState>,
    user: ActingUser,
    Json(input): Json<CreateInvoiceInput>,
) -> impl IntoResponse {
    let mut store = state.store.lock().await;
    let mut service =
        InvoiceService::new(&mut store, &state.config.purchasing, state.clock.as_ref());

    match service.create(input, user.as_str()) {
        Ok(invoice) => (StatusCode::CREATED, Json(invoice)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Edit a draft invoice
pub async fn update_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
    Json(input): Json<UpdateInvoiceInput>,
) -> impl IntoResponse {
    let mut store = state.store.lock().await;
    let mut service =
        InvoiceService::new(&mut store, &state.config.purchasing, state.clock.as_ref());

    match service.update(invoice_id, input) {
        Ok(invoice) => (StatusCode::OK, Json(invoice)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Validate a draft invoice
pub async fn validate_invoice(
    State(state): State<AppState>,
    user: ActingUser,
    Path(invoice_id): Path<Uuid>,
) -> impl IntoResponse {
    let mut store = state.store.lock().await;
    let mut service =
        InvoiceService::new(&mut store, &state.config.purchasing, state.clock.as_ref());

    match service.validate(invoice_id, user.as_str()) {
        Ok(invoice) => (StatusCode::OK, Json(invoice)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Cancel an unpaid invoice
pub async fn cancel_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
) -> impl IntoResponse {
    let mut store = state.store.lock().await;
    let mut service =
        InvoiceService::new(&mut store, &state.config.purchasing, state.clock.as_ref());

    match service.cancel(invoice_id) {
        Ok(invoice) => (StatusCode::OK, Json(invoice)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Amount still owed to a supplier
pub async fn get_supplier_balance(
    State(state): State<AppState>,
    Path(supplier_id): Path<String>,
) -> impl IntoResponse {
    let mut store = state.store.lock().await;
    let service = InvoiceService::new(&mut store, &state.config.purchasing, state.clock.as_ref());

    let balance = service.supplier_balance(&supplier_id);
    (StatusCode::OK, Json(SupplierBalance { supplier_id, balance }))
}
