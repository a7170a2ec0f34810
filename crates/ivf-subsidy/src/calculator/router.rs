use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};

use super::service::SubsidyCalculator;
use crate::error::AppError;
use crate::history::{EntryId, HistoryStore};
use crate::subsidy::ApplicantRecord;

/// Router builder exposing the calculator over HTTP.
pub fn subsidy_router<S>(calculator: Arc<SubsidyCalculator<S>>) -> Router
where
    S: HistoryStore + 'static,
{
    Router::new()
        .route("/api/v1/subsidy/evaluate", post(evaluate_handler::<S>))
        .route("/api/v1/subsidy/calculations", post(calculate_handler::<S>))
        .route(
            "/api/v1/subsidy/history",
            get(history_handler::<S>).delete(clear_handler::<S>),
        )
        .route(
            "/api/v1/subsidy/history/:entry_id",
            get(recall_handler::<S>),
        )
        .route("/api/v1/subsidy/schedule", get(schedule_handler::<S>))
        .with_state(calculator)
}

pub(crate) async fn evaluate_handler<S>(
    State(calculator): State<Arc<SubsidyCalculator<S>>>,
    axum::Json(record): axum::Json<ApplicantRecord>,
) -> Result<Response, AppError>
where
    S: HistoryStore + 'static,
{
    let assessment = calculator.preview(&record)?;
    Ok((StatusCode::OK, axum::Json(assessment)).into_response())
}

pub(crate) async fn calculate_handler<S>(
    State(calculator): State<Arc<SubsidyCalculator<S>>>,
    axum::Json(record): axum::Json<ApplicantRecord>,
) -> Result<Response, AppError>
where
    S: HistoryStore + 'static,
{
    let calculation = calculator.calculate(record)?;
    Ok((StatusCode::CREATED, axum::Json(calculation)).into_response())
}

pub(crate) async fn history_handler<S>(
    State(calculator): State<Arc<SubsidyCalculator<S>>>,
) -> Result<Response, AppError>
where
    S: HistoryStore + 'static,
{
    let entries = calculator.history()?;
    Ok((StatusCode::OK, axum::Json(entries)).into_response())
}

pub(crate) async fn recall_handler<S>(
    State(calculator): State<Arc<SubsidyCalculator<S>>>,
    Path(entry_id): Path<String>,
) -> Result<Response, AppError>
where
    S: HistoryStore + 'static,
{
    let entry = calculator.recall(&EntryId(entry_id))?;
    Ok((StatusCode::OK, axum::Json(entry)).into_response())
}

pub(crate) async fn clear_handler<S>(
    State(calculator): State<Arc<SubsidyCalculator<S>>>,
) -> Result<StatusCode, AppError>
where
    S: HistoryStore + 'static,
{
    calculator.clear_history()?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn schedule_handler<S>(
    State(calculator): State<Arc<SubsidyCalculator<S>>>,
) -> Response
where
    S: HistoryStore + 'static,
{
    (StatusCode::OK, axum::Json(calculator.schedule().entries())).into_response()
}
