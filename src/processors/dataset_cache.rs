use crate::error::{MapError, Result};
use crate::models::Dataset;
use crate::processors::coordinate_validator::ValidationReport;
use crate::processors::pipeline::{load_validated, DatasetSource};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info};

/// Identity of the input file as seen by the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    modified: Option<SystemTime>,
    len: u64,
}

impl Fingerprint {
    fn of(path: &Path) -> Result<Self> {
        let metadata = fs::metadata(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => MapError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => MapError::Io(e),
        })?;

        Ok(Self {
            modified: metadata.modified().ok(),
            len: metadata.len(),
        })
    }
}

#[derive(Debug)]
struct CacheEntry {
    fingerprint: Fingerprint,
    dataset: Arc<Dataset>,
    report: ValidationReport,
}

/// Keeps the loaded and validated dataset for one input file.
///
/// A change in modification time or length reloads on the next access.
/// Failed loads are never cached.
#[derive(Debug)]
pub struct DatasetCache {
    path: PathBuf,
    entry: Option<CacheEntry>,
    loads: usize,
}

impl DatasetCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entry: None,
            loads: 0,
        }
    }

    /// Number of times the file has actually been read
    pub fn load_count(&self) -> usize {
        self.loads
    }

    /// Report of the currently cached load, if any
    pub fn report(&self) -> Option<&ValidationReport> {
        self.entry.as_ref().map(|entry| &entry.report)
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn get(&mut self) -> Result<Arc<Dataset>> {
        let fingerprint = match Fingerprint::of(&self.path) {
            Ok(fingerprint) => fingerprint,
            Err(e) => {
                self.entry = None;
                return Err(e);
            }
        };

        if let Some(entry) = &self.entry {
            if entry.fingerprint == fingerprint {
                debug!(path = %self.path.display(), "Serving cached dataset");
                return Ok(Arc::clone(&entry.dataset));
            }
            info!(path = %self.path.display(), "Input file changed, reloading");
        }

        self.entry = None;
        let outcome = load_validated(&self.path)?;
        self.loads += 1;

        let dataset = Arc::new(outcome.dataset);
        self.entry = Some(CacheEntry {
            fingerprint,
            dataset: Arc::clone(&dataset),
            report: outcome.report,
        });

        Ok(dataset)
    }
}

impl DatasetSource for DatasetCache {
    fn load_dataset(&mut self) -> Result<Arc<Dataset>> {
        self.get()
    }
}
