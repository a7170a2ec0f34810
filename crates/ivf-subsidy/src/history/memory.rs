use std::sync::{Arc, Mutex};

use super::{retain_newest, HistoryEntry, HistoryError, HistoryStore};

/// Process-local history log, used by tests and when no file is configured.
#[derive(Debug, Default, Clone)]
pub struct InMemoryHistoryStore {
    entries: Arc<Mutex<Vec<HistoryEntry>>>,
}

impl InMemoryHistoryStore {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<HistoryEntry>>, HistoryError> {
        self.entries
            .lock()
            .map_err(|_| HistoryError::Unavailable("history mutex poisoned".to_string()))
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn entries(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        Ok(self.lock()?.clone())
    }

    fn append(&self, entry: HistoryEntry, cap: usize) -> Result<Vec<HistoryEntry>, HistoryError> {
        let mut guard = self.lock()?;
        let existing = std::mem::take(&mut *guard);
        *guard = retain_newest(existing, entry, cap);
        Ok(guard.clone())
    }

    fn clear(&self) -> Result<(), HistoryError> {
        self.lock()?.clear();
        Ok(())
    }
}
