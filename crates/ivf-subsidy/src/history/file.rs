use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use tracing::warn;

use super::{retain_newest, HistoryEntry, HistoryError, HistoryStore};

/// History log persisted as a single JSON array, replaced wholesale on each update.
#[derive(Debug)]
pub struct JsonFileHistoryStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> HistoryError {
        HistoryError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(self.io_error(err)),
        };

        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&raw).map_err(|source| HistoryError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Stages the log in a uniquely named sibling file, then renames it over the target.
    fn write(&self, entries: &[HistoryEntry]) -> Result<(), HistoryError> {
        let dir = match self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
                parent
            }
            None => Path::new("."),
        };

        let mut staging = NamedTempFile::new_in(dir).map_err(|err| self.io_error(err))?;
        {
            let mut writer = BufWriter::new(staging.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, entries).map_err(HistoryError::Serialize)?;
            writer.flush().map_err(|err| self.io_error(err))?;
        }

        staging
            .persist(&self.path)
            .map(|_| ())
            .map_err(|err| self.io_error(err.error))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>, HistoryError> {
        self.write_lock
            .lock()
            .map_err(|_| HistoryError::Unavailable("history file lock poisoned".to_string()))
    }
}

impl HistoryStore for JsonFileHistoryStore {
    fn entries(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        let _guard = self.lock()?;
        self.read()
    }

    fn append(&self, entry: HistoryEntry, cap: usize) -> Result<Vec<HistoryEntry>, HistoryError> {
        let _guard = self.lock()?;
        let existing = match self.read() {
            Ok(entries) => entries,
            Err(err @ HistoryError::Corrupt { .. }) => {
                warn!(error = %err, "discarding unreadable history log");
                Vec::new()
            }
            Err(err) => return Err(err),
        };

        let updated = retain_newest(existing, entry, cap);
        self.write(&updated)?;
        Ok(updated)
    }

    fn clear(&self) -> Result<(), HistoryError> {
        let _guard = self.lock()?;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.io_error(err)),
        }
    }
}
