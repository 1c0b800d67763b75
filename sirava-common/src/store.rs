//! Persisted program guide document
//!
//! The converter core never touches disk; shells hand it a [`ScheduleStore`]
//! that loads the previous document and stores the new one. Loading is best
//! effort: a missing, unreadable or malformed document counts as "no prior
//! state" so an upload can always proceed.

use crate::schedule::ScheduleDocument;
use crate::{xml, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Load/store collaborator for the persisted guide
///
/// Callers are responsible for serializing load → merge → store sequences;
/// implementations provide no locking of their own.
pub trait ScheduleStore: Send + Sync {
    /// Load the persisted document, or an empty one if there is none
    fn load(&self) -> ScheduleDocument;

    /// Replace the persisted document with `bytes`
    fn store(&self, bytes: &[u8]) -> Result<()>;
}

/// Store backed by a single XML file
#[derive(Debug, Clone)]
pub struct FileScheduleStore {
    path: PathBuf,
}

impl FileScheduleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScheduleStore for FileScheduleStore {
    fn load(&self) -> ScheduleDocument {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(
                    "No persisted guide at {}, starting empty",
                    self.path.display()
                );
                return ScheduleDocument::new();
            }
            Err(e) => {
                warn!(
                    "Cannot read persisted guide {} ({}); previous days will be dropped",
                    self.path.display(),
                    e
                );
                return ScheduleDocument::new();
            }
        };

        match xml::from_xml(&bytes) {
            Ok(doc) => {
                debug!(
                    "Loaded {} day(s), {} entries from {}",
                    doc.days.len(),
                    doc.entry_count(),
                    self.path.display()
                );
                doc
            }
            Err(e) => {
                warn!(
                    "Persisted guide {} is not valid ({}); previous days will be dropped",
                    self.path.display(),
                    e
                );
                ScheduleDocument::new()
            }
        }
    }

    fn store(&self, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, bytes)?;
        info!("Wrote {} bytes to {}", bytes.len(), self.path.display());
        Ok(())
    }
}
