//! Delivery note HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::services::delivery_note::{DeliveryNoteService, UpdateDeliveryNoteInput};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct DeliveryNoteQuery {
    pub purchase_order_id: Option<Uuid>,
}

/// List delivery notes, optionally for one purchase order
pub async fn list_delivery_notes(
    State(state): State<AppState>,
    Query(query): Query<DeliveryNoteQuery>,
) -> impl IntoResponse {
    let mut store = state.store.lock().await;
    let service = DeliveryNoteService::new(&mut store, state.clock.as_ref());

    let notes = service.list(query.purchase_order_id);
    (StatusCode::OK, Json(serde_json::json!({ "delivery_notes": notes })))
}

/// Get a delivery note
pub async fn get_delivery_note(
    State(state): State<AppState>,
    Path(note_id): Path<Uuid>,
) -> impl IntoResponse {
    let mut store = state.store.lock().await;
    let service = DeliveryNoteService::new(&mut store, state.clock.as_ref());

    match service.get(note_id) {
        Ok(note) => (StatusCode::OK, Json(note)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update the administrative fields of a delivery note
pub async fn update_delivery_note(
    State(state): State<AppState>,
    Path(note_id): Path<Uuid>,
    Json(input): Json<UpdateDeliveryNoteInput>,
) -> impl IntoResponse {
    let mut store = state.store.lock().await;
    let mut service = DeliveryNoteService::new(&mut store, state.clock.as_ref());

    match service.update(note_id, input) {
        Ok(note) => (StatusCode::OK, Json(note)).into_response(),
        Err(e) => e.into_response(),
    }
}
