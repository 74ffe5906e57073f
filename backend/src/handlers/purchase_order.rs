//! Purchase order HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::middleware::ActingUser;
use crate::services::delivery_note::{DeliveryNoteService, ReceiveGoodsInput};
use crate::services::purchase_order::{
    CreatePurchaseOrderInput, PurchaseOrderFilter, PurchaseOrderService, UpdatePurchaseOrderInput,
};
use crate::AppState;

/// List purchase orders
pub async fn list_purchase_orders(
    State(state): State<AppState>,
    Query(filter): Query<PurchaseOrderFilter>,
) -> impl IntoResponse {
    let mut store = state.store.lock().await;
    let service = PurchaseOrderService::new(&mut store, state.clock.as_ref());

    let orders = service.list(&filter);
    (StatusCode::OK, Json(serde_json::json!({ "purchase_orders": orders })))
}

/// Get a purchase order
pub async fn get_purchase_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> impl IntoResponse {
    let mut store = state.store.lock().await;
    let service = PurchaseOrderService::new(&mut store, state.clock.as_ref());

    match service.get(order_id) {
        Ok(order) => (StatusCode::OK, Json(order)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a purchase order
pub async fn create_purchase_order(
    State(state): State<AppState>,
    user: ActingUser,
    Json(input): Json<CreatePurchaseOrderInput>,
) -> impl IntoResponse {
    let mut store = state.store.lock().await;
    let mut service = PurchaseOrderService::new(&mut store, state.clock.as_ref());

    match service.create(input, user.as_str()) {
        Ok(order) => (StatusCode::CREATED, Json(order)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a purchase order
pub async fn update_purchase_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(input): Json<UpdatePurchaseOrderInput>,
) -> impl IntoResponse {
    let mut store = state.store.lock().await;
    let mut service = PurchaseOrderService::new(&mut store, state.clock.as_ref());

    match service.update(order_id, input) {
        Ok(order) => (StatusCode::OK, Json(order)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Cancel a purchase order
pub async fn cancel_purchase_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> impl IntoResponse {
    let mut store = state.store.lock().await;
    let mut service = PurchaseOrderService::new(&mut store, state.clock.as_ref());

    match service.cancel(order_id) {
        Ok(order) => (StatusCode::OK, Json(order)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a purchase order that was never invoiced
pub async fn delete_purchase_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> impl IntoResponse {
    let mut store = state.store.lock().await;
    let mut service = PurchaseOrderService::new(&mut store, state.clock.as_ref());

    match service.delete(order_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Receive goods against a purchase order
pub async fn receive_goods(
    State(state): State<AppState>,
    user: ActingUser,
    Path(order_id): Path<Uuid>,
    Json(mut input): Json<ReceiveGoodsInput>,
) -> impl IntoResponse {
    input.purchase_order_id = order_id;

    let mut store = state.store.lock().await;
    let mut service = DeliveryNoteService::new(&mut store, state.clock.as_ref());

    match service.receive_goods(input, user.as_str()) {
        Ok(note) => (StatusCode::CREATED, Json(note)).into_response(),
        Err(e) => e.into_response(),
    }
}
