//! Flat-file record storage.
//!
//! Each table is a CSV file in the storage directory. Rows are addressed by
//! a stable [`RecordId`] stored in the first column, never by position, so
//! deleting one row does not renumber the others.
//!
//! The [`RecordStore`] trait is the storage seam used by the library and
//! history managers; [`CsvTable`] is the file-backed implementation.
//! Every call goes back to disk: there is no cache that outlives a single
//! operation.

mod error;
mod table;

pub use error::{StoreError, StoreResult};
pub use table::CsvTable;

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a stored row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a stored identifier, or assign a fresh one when the stored
    /// value is empty or unreadable (files written before ids existed).
    pub fn parse_or_assign(raw: &str) -> (Self, IdSource) {
        match raw.trim().parse::<Uuid>() {
            Ok(uuid) => (Self(uuid), IdSource::Stored),
            Err(_) => (Self::new(), IdSource::Assigned),
        }
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for RecordId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Where a loaded record's id came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdSource {
    /// Read from the `id` column.
    Stored,
    /// Missing or unreadable in the file; generated during load.
    Assigned,
}

/// A domain type that can be stored as one CSV row.
///
/// `Row` is the on-disk shape (all strings, field order equal to
/// [`COLUMNS`](Record::COLUMNS)); the record itself is the typed form the
/// rest of the crate works with.
pub trait Record: Clone {
    /// File name inside the storage directory.
    const FILE_NAME: &'static str;
    /// Header row, in field order of [`Record::Row`].
    const COLUMNS: &'static [&'static str];

    type Row: Serialize + DeserializeOwned;

    fn id(&self) -> RecordId;

    fn to_row(&self) -> Self::Row;

    /// Convert a raw row into a record. The error string is reported with
    /// the file name and line number.
    fn from_row(row: Self::Row) -> Result<(Self, IdSource), String>;

    /// A problem worth logging about a record that still loaded.
    fn load_warning(&self) -> Option<String> {
        None
    }
}

/// Storage interface for one table of records.
pub trait RecordStore<R: Record> {
    /// All records in storage order.
    fn list(&self) -> StoreResult<Vec<R>>;

    /// Add a record after all existing ones.
    fn append(&self, record: R) -> StoreResult<()>;

    /// Replace the record with the same id, keeping its position.
    fn update(&self, record: R) -> StoreResult<()>;

    /// Remove the record with `id`, returning it.
    fn delete(&self, id: RecordId) -> StoreResult<R>;

    fn get(&self, id: RecordId) -> StoreResult<Option<R>> {
        Ok(self.list()?.into_iter().find(|r| r.id() == id))
    }
}
