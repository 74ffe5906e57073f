//! Withholding tax HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::Period;
use crate::services::withholding_tax::WithholdingTaxService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub period: Option<Period>,
}

#[derive(Debug, Serialize)]
pub struct DeclarationResult {
    pub period: Period,
    pub declared: usize,
}

fn parse_period(raw: &str) -> Result<Period, AppError> {
    raw.parse::<Period>().map_err(|e| AppError::Validation {
        field: "period".to_string(),
        message: e.to_string(),
        message_fr: format!("Période invalide '{}', format attendu AAAA-MM", raw),
    })
}

/// List withholding tax records, optionally for one period
pub async fn list_withholding_taxes(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> impl IntoResponse {
    let mut store = state.store.lock().await;
    let service = WithholdingTaxService::new(&mut store, state.clock.as_ref());

    let records = service.list(query.period);
    (StatusCode::OK, Json(serde_json::json!({ "withholding_taxes": records })))
}

/// Totals, certificate counts and monthly figures
pub async fn get_withholding_summary(State(state): State<AppState>) -> impl IntoResponse {
    let mut store = state.store.lock().await;
    let service = WithholdingTaxService::new(&mut store, state.clock.as_ref());

    (StatusCode::OK, Json(service.summary()))
}

/// Mark a record as paid to the tax authority
pub async fn mark_withholding_paid(
    State(state): State<AppState>,
    Path(record_id): Path<Uuid>,
) -> impl IntoResponse {
    let mut store = state.store.lock().await;
    let mut service = WithholdingTaxService::new(&mut store, state.clock.as_ref());

    match service.mark_paid(record_id) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Generate the withholding certificate for a record
pub async fn generate_certificate(
    State(state): State<AppState>,
    Path(record_id): Path<Uuid>,
) -> impl IntoResponse {
    let mut store = state.store.lock().await;
    let mut service = WithholdingTaxService::new(&mut store, state.clock.as_ref());

    match service.generate_certificate(record_id) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Declare every record of a period
pub async fn declare_period(
    State(state): State<AppState>,
    Path(period): Path<String>,
) -> impl IntoResponse {
    let period = match parse_period(&period) {
        Ok(period) => period,
        Err(e) => return e.into_response(),
    };

    let mut store = state.store.lock().await;
    let mut service = WithholdingTaxService::new(&mut store, state.clock.as_ref());

    let declared = service.declare_period(period);
    (StatusCode::OK, Json(DeclarationResult { period, declared })).into_response()
}

/// Monthly declaration report as CSV
pub async fn period_report_csv(
    State(state): State<AppState>,
    Path(period): Path<String>,
) -> impl IntoResponse {
    let period = match parse_period(&period) {
        Ok(period) => period,
        Err(e) => return e.into_response(),
    };

    let mut store = state.store.lock().await;
    let service = WithholdingTaxService::new(&mut store, state.clock.as_ref());

    match service.period_report_csv(period) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
