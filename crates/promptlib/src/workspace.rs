//! The storage service a front end talks to.
//!
//! A [`Workspace`] owns the resolved storage directory and the two tables.
//! It holds no row data: [`Workspace::snapshot`] reads both tables fresh,
//! and every mutation goes straight to disk.

use std::path::Path;

use crate::compose::{Composition, PromptRequest, compose};
use crate::config::{StorageConfig, StorageLocation};
use crate::fragment::Fragment;
use crate::history::{HistoryEntry, PromptHistory};
use crate::library::FragmentLibrary;
use crate::store::{CsvTable, StoreResult};

/// Both tables as read at one moment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub fragments: Vec<Fragment>,
    pub history: Vec<HistoryEntry>,
}

impl Snapshot {
    /// Compose a prompt against this snapshot's fragments.
    pub fn compose(&self, request: &PromptRequest) -> Composition {
        compose(request, &self.fragments)
    }

    pub fn fragment(&self, id: crate::store::RecordId) -> Option<&Fragment> {
        self.fragments.iter().find(|f| f.id == id)
    }
}

#[derive(Debug, Clone)]
pub struct Workspace {
    location: StorageLocation,
    library: FragmentLibrary,
    history: PromptHistory,
}

impl Workspace {
    /// Resolve `config` and open both tables, creating empty files where
    /// none exist.
    pub fn open(config: &StorageConfig) -> StoreResult<Self> {
        Self::open_at(config.resolve())
    }

    /// Open both tables in an already resolved location.
    pub fn open_at(location: StorageLocation) -> StoreResult<Self> {
        let library = FragmentLibrary::new(CsvTable::open(&location.dir)?);
        let history = PromptHistory::new(CsvTable::open(&location.dir)?);
        Ok(Self {
            location,
            library,
            history,
        })
    }

    /// Open both tables directly in `dir`, with no fallback.
    pub fn open_dir(dir: &Path) -> StoreResult<Self> {
        Self::open_at(StorageLocation {
            dir: dir.to_path_buf(),
            fallback_reason: None,
        })
    }

    pub fn location(&self) -> &StorageLocation {
        &self.location
    }

    pub fn library(&self) -> &FragmentLibrary {
        &self.library
    }

    pub fn history(&self) -> &PromptHistory {
        &self.history
    }

    /// Read both tables.
    pub fn snapshot(&self) -> StoreResult<Snapshot> {
        Ok(Snapshot {
            fragments: self.library.list()?,
            history: self.history.list()?,
        })
    }
}
