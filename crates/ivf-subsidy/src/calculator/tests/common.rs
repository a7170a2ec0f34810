use std::sync::Arc;

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::calculator::{subsidy_router, SubsidyCalculator};
use crate::history::{HistoryEntry, HistoryError, HistoryStore, InMemoryHistoryStore};
use crate::subsidy::{ApplicantRecord, SchemeCutover, SubsidyEvaluator, TreatmentStage};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn record() -> ApplicantRecord {
    ApplicantRecord {
        birth_date: date(1990, 4, 12),
        is_low_income: false,
        is_first_application: true,
        treatment_count: 1,
        stage: TreatmentStage::FullCycle,
        first_application_date: date(2025, 3, 3),
        transfer_date: Some(date(2025, 4, 20)),
    }
}

pub(super) fn build_calculator() -> (
    SubsidyCalculator<InMemoryHistoryStore>,
    Arc<InMemoryHistoryStore>,
) {
    let store = Arc::new(InMemoryHistoryStore::default());
    let calculator = SubsidyCalculator::new(SubsidyEvaluator::default(), store.clone())
        .with_cutover(SchemeCutover::new(date(2025, 1, 1)));
    (calculator, store)
}

pub(super) fn router_with_calculator(
    calculator: SubsidyCalculator<InMemoryHistoryStore>,
) -> axum::Router {
    subsidy_router(Arc::new(calculator))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Store whose every operation fails, standing in for unavailable storage.
pub(super) struct UnavailableStore;

impl HistoryStore for UnavailableStore {
    fn entries(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        Err(HistoryError::Unavailable("disk offline".to_string()))
    }

    fn append(&self, _entry: HistoryEntry, _cap: usize) -> Result<Vec<HistoryEntry>, HistoryError> {
        Err(HistoryError::Unavailable("disk offline".to_string()))
    }

    fn clear(&self) -> Result<(), HistoryError> {
        Err(HistoryError::Unavailable("disk offline".to_string()))
    }
}
