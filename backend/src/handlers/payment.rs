//! Supplier payment HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::middleware::ActingUser;
use crate::services::payment::{CreatePaymentInput, PaymentService, UpdatePaymentInput};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PaymentQuery {
    pub invoice_id: Option<Uuid>,
}

/// List payments, optionally for one invoice
pub async fn list_payments(
    State(state): State<AppState>,
    Query(query): Query<PaymentQuery>,
) -> impl IntoResponse {
    let mut store = state.store.lock().await;
    let service = PaymentService::new(&mut store, &state.config.purchasing, state.clock.as_ref());

    let payments = service.list(query.invoice_id);
    let total_completed = service.total_completed();
    (
        StatusCode::OK,
        Json(serde_json::json!({ "payments": payments, "total_completed": total_completed })),
    )
}

/// Get a payment
pub async fn get_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
) -> impl IntoResponse {
    let mut store = state.store.lock().await;
    let service = PaymentService::new(&mut store, &state.config.purchasing, state.clock.as_ref());

    match service.get(payment_id) {
        Ok(payment) => (StatusCode::OK, Json(payment)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Record a payment against an invoice
pub async fn create_payment(
    State(state): State<AppState>,
    user: ActingUser,
    Json(input): Json<CreatePaymentInput>,
) -> impl IntoResponse {
    let mut store = state.store.lock().await;
    let mut service =
        PaymentService::new(&mut store, &state.config.purchasing, state.clock.as_ref());

    match service.create(input, user.as_str()) {
        Ok(payment) => (StatusCode::CREATED, Json(payment)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update the reference or notes of a payment
pub async fn update_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
    Json(input): Json<UpdatePaymentInput>,
) -> impl IntoResponse {
    let mut store = state.store.lock().await;
    let mut service =
        PaymentService::new(&mut store, &state.config.purchasing, state.clock.as_ref());

    match service.update(payment_id, input) {
        Ok(payment) => (StatusCode::OK, Json(payment)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Mark a pending payment as completed
pub async fn complete_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
) -> impl IntoResponse {
    let mut store = state.store.lock().await;
    let mut service =
        PaymentService::new(&mut store, &state.config.purchasing, state.clock.as_ref());

    match service.complete(payment_id) {
        Ok(payment) => (StatusCode::OK, Json(payment)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Cancel a pending payment
pub async fn cancel_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
) -> impl IntoResponse {
    let mut store = state.store.lock().await;
    let mut service =
        PaymentService::new(&mut store, &state.config.purchasing, state.clock.as_ref());

    match service.cancel(payment_id) {
        Ok(payment) => (StatusCode::OK, Json(payment)).into_response(),
        Err(e) => e.into_response(),
    }
}
