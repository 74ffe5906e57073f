//! Reporting HTTP handlers

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::services::reporting::{PurchaseOverview, ReportingService};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct OverviewQuery {
    pub upcoming_days: Option<i64>,
}

/// Purchasing dashboard figures
pub async fn get_overview(
    State(state): State<AppState>,
    Query(query): Query<OverviewQuery>,
) -> Json<PurchaseOverview> {
    let days = query.upcoming_days.unwrap_or(state.config.alerts.due_soon_days);
    let store = state.store.lock().await;

    Json(ReportingService::new(&store).overview(state.clock.today(), days))
}
