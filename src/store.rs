use std::cell::RefCell;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::error::{Result, ZenError};
use crate::record::SessionRecord;

/// Durable home of the session record. `load` and `save` never fail the
/// caller: problems are logged and the session carries on.
pub trait RecordStore {
    fn load(&self) -> SessionRecord;
    fn save(&self, record: &SessionRecord);
}

/// JSON file holding the whole record, rewritten on every save
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    path: PathBuf,
}

impl FileRecordStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::data_file(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the record. `Ok(None)` means there is no file yet.
    pub fn try_load(&self) -> Result<Option<SessionRecord>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ZenError::persistence(&self.path, e)),
        };
        let record = serde_json::from_slice::<SessionRecord>(&bytes)
            .map_err(|e| ZenError::persistence(&self.path, e))?;
        Ok(Some(record))
    }

    pub fn try_save(&self, record: &SessionRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| ZenError::persistence(&self.path, e))?;
            }
        }
        let data =
            serde_json::to_vec_pretty(record).map_err(|e| ZenError::persistence(&self.path, e))?;
        fs::write(&self.path, data).map_err(|e| ZenError::persistence(&self.path, e))
    }
}

impl Default for FileRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for FileRecordStore {
    fn load(&self) -> SessionRecord {
        match self.try_load() {
            Ok(Some(record)) => {
                log::info!(
                    "loaded {} task(s), {} link(s) from {}",
                    record.tasks.len(),
                    record.links.len(),
                    self.path.display()
                );
                record
            }
            Ok(None) => {
                log::info!("no data file at {}, starting fresh", self.path.display());
                SessionRecord::default()
            }
            Err(e) => {
                log::warn!("error loading: {e}; falling back to defaults");
                SessionRecord::default()
            }
        }
    }

    fn save(&self, record: &SessionRecord) {
        match self.try_save(record) {
            Ok(()) => log::debug!("saved record to {}", self.path.display()),
            Err(e) => log::warn!("error saving: {e}"),
        }
    }
}

/// In-process store used by tests and headless runs
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    saved: RefCell<Option<SessionRecord>>,
    saves: RefCell<usize>,
}

impl MemoryRecordStore {
    pub fn with_record(record: SessionRecord) -> Self {
        Self {
            saved: RefCell::new(Some(record)),
            saves: RefCell::new(0),
        }
    }

    pub fn last_saved(&self) -> Option<SessionRecord> {
        self.saved.borrow().clone()
    }

    pub fn save_count(&self) -> usize {
        *self.saves.borrow()
    }
}

impl RecordStore for MemoryRecordStore {
    fn load(&self) -> SessionRecord {
        self.saved.borrow().clone().unwrap_or_default()
    }

    fn save(&self, record: &SessionRecord) {
        *self.saved.borrow_mut() = Some(record.clone());
        *self.saves.borrow_mut() += 1;
    }
}
