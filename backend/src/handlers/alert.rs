//! Payment alert HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::services::alert::AlertService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AlertQuery {
    #[serde(default)]
    pub unacknowledged: bool,
}

/// List alerts
pub async fn list_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertQuery>,
) -> impl IntoResponse {
    let mut store = state.store.lock().await;
    let service = AlertService::new(&mut store, &state.config.alerts, state.clock.as_ref());

    let alerts = service.list(query.unacknowledged);
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "alerts": alerts,
            "unacknowledged": service.unacknowledged_count(),
        })),
    )
}

/// Run the alert scan now
pub async fn scan_alerts(State(state): State<AppState>) -> impl IntoResponse {
    let mut store = state.store.lock().await;
    let mut service = AlertService::new(&mut store, &state.config.alerts, state.clock.as_ref());

    let created = service.scan(state.clock.today());
    (StatusCode::OK, Json(serde_json::json!({ "created": created })))
}

/// Acknowledge an alert
pub async fn acknowledge_alert(
    State(state): State<AppState>,
    Path(alert_id): Path<Uuid>,
) -> impl IntoResponse {
    let mut store = state.store.lock().await;
    let mut service = AlertService::new(&mut store, &state.config.alerts, state.clock.as_ref());

    match service.acknowledge(alert_id) {
        Ok(alert) => (StatusCode::OK, Json(alert)).into_response(),
        Err(e) => e.into_response(),
    }
}
