//! Convenience re-exports for front ends.
//!
//! ```
//! use promptlib::prelude::*;
//! ```
//!
//! Storage internals ([`CsvTable`](crate::store::CsvTable), the row types)
//! and the section builder are left out; import those from their modules.

// ── Domain ──────────────────────────────────────────────────────────
pub use crate::category::{Category, SectionStyle};
pub use crate::fragment::{Fragment, FragmentDraft};
pub use crate::history::{HistoryEntry, Timestamp};
pub use crate::library::Filter;

// ── Composition ─────────────────────────────────────────────────────
pub use crate::compose::{
    Choice, Composition, CompositionWarning, PromptRequest, Selection, Selections, compose,
};

// ── Storage ─────────────────────────────────────────────────────────
pub use crate::config::{StorageConfig, StorageLocation};
pub use crate::store::{RecordId, RecordStore, StoreError, StoreResult};
pub use crate::workspace::{Snapshot, Workspace};

// ── Logging ─────────────────────────────────────────────────────────
pub use crate::logging::{LogBuffer, LogHistory, LogLevel, LogLine, UiTracingLayer};
