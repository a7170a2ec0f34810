//! Bounded, newest-first log of past calculations.

pub mod export;
mod file;
mod memory;

pub use file::JsonFileHistoryStore;
pub use memory::InMemoryHistoryStore;

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::subsidy::{ApplicantRecord, EvaluationResult};

/// Number of calculations kept when no capacity is configured.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Identifier wrapper for history entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub String);

impl EntryId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One recorded calculation, carrying the record so it can be reloaded verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: EntryId,
    pub created_at: DateTime<Utc>,
    pub record: ApplicantRecord,
    pub result: EvaluationResult,
}

impl HistoryEntry {
    pub fn new(record: ApplicantRecord, result: EvaluationResult, created_at: DateTime<Utc>) -> Self {
        Self {
            id: EntryId::generate(),
            created_at,
            record,
            result,
        }
    }
}

/// Storage abstraction for the calculation log.
pub trait HistoryStore: Send + Sync {
    /// Entries newest first.
    fn entries(&self) -> Result<Vec<HistoryEntry>, HistoryError>;
    /// Prepends `entry`, keeps at most `cap` entries, and returns the new log.
    fn append(&self, entry: HistoryEntry, cap: usize) -> Result<Vec<HistoryEntry>, HistoryError>;
    fn clear(&self) -> Result<(), HistoryError>;
}

/// Error enumeration for history persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("history file {path} is unreadable: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("history file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unable to encode history: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("history store unavailable: {0}")]
    Unavailable(String),
}

/// Newest-first append with truncation to `cap` entries.
pub(crate) fn retain_newest(
    existing: Vec<HistoryEntry>,
    entry: HistoryEntry,
    cap: usize,
) -> Vec<HistoryEntry> {
    let mut updated = Vec::with_capacity(existing.len() + 1);
    updated.push(entry);
    updated.extend(existing);
    updated.truncate(cap.max(1));
    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subsidy::{SubsidyEvaluator, TreatmentStage};
    use chrono::{NaiveDate, TimeZone};

    pub(super) fn entry(treatment_count: u8, minute: u32) -> HistoryEntry {
        let record = ApplicantRecord {
            birth_date: NaiveDate::from_ymd_opt(1990, 1, 1).expect("valid"),
            is_low_income: false,
            is_first_application: treatment_count == 1,
            treatment_count,
            stage: TreatmentStage::FullCycle,
            first_application_date: NaiveDate::from_ymd_opt(2025, 2, 1).expect("valid"),
            transfer_date: None,
        };
        let result = SubsidyEvaluator::default().evaluate(&record);
        let created_at = Utc
            .with_ymd_and_hms(2025, 2, 1, 9, minute, 0)
            .single()
            .expect("valid timestamp");
        HistoryEntry::new(record, result, created_at)
    }

    #[test]
    fn retain_newest_prepends_and_truncates() {
        let existing: Vec<_> = (0..10).map(|minute| entry(1, minute)).collect();
        let oldest = existing.last().cloned().expect("non-empty");
        let newest = entry(2, 30);

        let updated = retain_newest(existing, newest.clone(), DEFAULT_HISTORY_CAPACITY);

        assert_eq!(updated.len(), 10);
        assert_eq!(updated[0], newest);
        assert!(!updated.contains(&oldest));
    }

    #[test]
    fn retain_newest_keeps_at_least_one_entry() {
        let updated = retain_newest(vec![entry(1, 0)], entry(2, 1), 0);

        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].record.treatment_count, 2);
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(EntryId::generate(), EntryId::generate());
    }
}
