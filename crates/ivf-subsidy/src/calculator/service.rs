use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::history::{
    EntryId, HistoryEntry, HistoryError, HistoryStore, DEFAULT_HISTORY_CAPACITY,
};
use crate::subsidy::{
    ApplicantRecord, EvaluationResult, InputError, SchemeCutover, SchemeVersion,
    SubsidyEvaluator, SubsidySchedule,
};

/// Service composing input validation, the evaluator, and the history log.
pub struct SubsidyCalculator<S> {
    evaluator: Arc<SubsidyEvaluator>,
    store: Arc<S>,
    capacity: usize,
    cutover: SchemeCutover,
}

impl<S> SubsidyCalculator<S>
where
    S: HistoryStore + 'static,
{
    pub fn new(evaluator: SubsidyEvaluator, store: Arc<S>) -> Self {
        Self {
            evaluator: Arc::new(evaluator),
            store,
            capacity: DEFAULT_HISTORY_CAPACITY,
            cutover: SchemeCutover::default(),
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    pub fn with_cutover(mut self, cutover: SchemeCutover) -> Self {
        self.cutover = cutover;
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn schedule(&self) -> &SubsidySchedule {
        self.evaluator.schedule()
    }

    /// Validate and evaluate without touching the history log.
    pub fn preview(&self, record: &ApplicantRecord) -> Result<Assessment, CalculatorError> {
        record.validate()?;
        let result = self.evaluator.evaluate(record);
        Ok(self.assess(record, result))
    }

    /// Evaluate a record and append it to the history log.
    ///
    /// A failing store does not fail the calculation; the returned value
    /// reports `persisted == false` instead.
    pub fn calculate(&self, record: ApplicantRecord) -> Result<Calculation, CalculatorError> {
        record.validate()?;
        let result = self.evaluator.evaluate(&record);
        let assessment = self.assess(&record, result.clone());
        let entry = HistoryEntry::new(record, result, Utc::now());

        let persisted = match self.store.append(entry.clone(), self.capacity) {
            Ok(log) => {
                info!(entry_id = %entry.id, retained = log.len(), "calculation recorded");
                true
            }
            Err(err) => {
                warn!(entry_id = %entry.id, error = %err, "history unavailable; calculation not recorded");
                false
            }
        };

        Ok(Calculation {
            entry,
            governing_scheme: assessment.governing_scheme,
            scheme_note: assessment.scheme_note,
            persisted,
        })
    }

    pub fn history(&self) -> Result<Vec<HistoryEntry>, CalculatorError> {
        Ok(self.store.entries()?)
    }

    pub fn recall(&self, id: &EntryId) -> Result<HistoryEntry, CalculatorError> {
        self.store
            .entries()?
            .into_iter()
            .find(|entry| &entry.id == id)
            .ok_or_else(|| CalculatorError::NotFound(id.clone()))
    }

    /// Re-run a stored record against the active rules.
    pub fn replay(&self, id: &EntryId) -> Result<Assessment, CalculatorError> {
        let entry = self.recall(id)?;
        self.preview(&entry.record)
    }

    pub fn clear_history(&self) -> Result<(), CalculatorError> {
        self.store.clear()?;
        info!("calculation history cleared");
        Ok(())
    }

    fn assess(&self, record: &ApplicantRecord, result: EvaluationResult) -> Assessment {
        let governing_scheme = self.cutover.governing(record.first_application_date);
        let scheme_note = self.cutover.note(record.first_application_date);
        Assessment {
            result,
            governing_scheme,
            scheme_note,
        }
    }
}

/// Evaluation paired with the scheme the application date falls under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub result: EvaluationResult,
    pub governing_scheme: SchemeVersion,
    pub scheme_note: String,
}

impl Assessment {
    pub fn governing_amount(&self) -> u32 {
        self.result.amount_for(self.governing_scheme)
    }
}

/// Recorded calculation returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calculation {
    pub entry: HistoryEntry,
    pub governing_scheme: SchemeVersion,
    pub scheme_note: String,
    pub persisted: bool,
}

/// Error raised by the calculator service.
#[derive(Debug, thiserror::Error)]
pub enum CalculatorError {
    #[error("invalid input: {0}")]
    Input(#[from] InputError),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error("history entry {0} not found")]
    NotFound(EntryId),
}
