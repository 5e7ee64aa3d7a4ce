//! Saved, fully rendered prompts.
//!
//! History is append-only: entries are added with a name and a timestamp
//! and are never edited or removed through [`PromptHistory`].

use std::fmt;

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::store::{CsvTable, IdSource, Record, RecordId, RecordStore, StoreError, StoreResult};

/// Timestamp layout used in the history file.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Layouts accepted when reading, most specific first.
const TIMESTAMP_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// One saved prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    pub id: RecordId,
    pub name: String,
    /// Local time the prompt was saved.
    pub timestamp: Timestamp,
    /// The rendered prompt text, exactly as composed.
    pub prompt: String,
}

impl HistoryEntry {
    /// Header line shown in the browser: `<name> - <timestamp>`.
    pub fn heading(&self) -> String {
        format!("{} - {}", self.name, self.timestamp)
    }
}

/// A saved entry's timestamp.
///
/// Cells that do not parse (hand-edited files, empty cells) are kept
/// verbatim so the row still loads and is written back unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Timestamp {
    Parsed(NaiveDateTime),
    Raw(String),
}

impl Timestamp {
    /// Parse a stored cell, keeping the text when it is not a timestamp.
    pub fn from_stored(raw: &str) -> Self {
        match parse_timestamp(raw) {
            Some(ts) => Self::Parsed(ts),
            None => Self::Raw(raw.to_string()),
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Parsed(ts) => Some(*ts),
            Self::Raw(_) => None,
        }
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(ts: NaiveDateTime) -> Self {
        Self::Parsed(ts)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parsed(ts) => f.write_str(&format_timestamp(ts)),
            Self::Raw(raw) => f.write_str(raw),
        }
    }
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp. Accepts the layout written by this crate, a
/// `T` separator, a missing fractional part, and RFC 3339 with an offset
/// (converted to local time).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    TIMESTAMP_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Local).naive_local())
        })
}

#[derive(Serialize, Deserialize)]
pub struct HistoryRow {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    timestamp: String,
    #[serde(default)]
    prompt: String,
}

impl Record for HistoryEntry {
    const FILE_NAME: &'static str = "prompt_history.csv";
    const COLUMNS: &'static [&'static str] = &["id", "name", "timestamp", "prompt"];
    type Row = HistoryRow;

    fn id(&self) -> RecordId {
        self.id
    }

    fn to_row(&self) -> HistoryRow {
        HistoryRow {
            id: self.id.to_string(),
            name: self.name.clone(),
            timestamp: self.timestamp.to_string(),
            prompt: self.prompt.clone(),
        }
    }

    fn from_row(row: HistoryRow) -> Result<(Self, IdSource), String> {
        let timestamp = Timestamp::from_stored(&row.timestamp);
        let (id, source) = RecordId::parse_or_assign(&row.id);
        Ok((
            HistoryEntry {
                id,
                name: row.name,
                timestamp,
                prompt: row.prompt,
            },
            source,
        ))
    }

    fn load_warning(&self) -> Option<String> {
        match &self.timestamp {
            Timestamp::Raw(raw) => Some(format!("unreadable timestamp {raw:?}, kept as text")),
            Timestamp::Parsed(_) => None,
        }
    }
}

/// The prompt history, backed by a [`RecordStore`].
#[derive(Debug, Clone)]
pub struct PromptHistory<S = CsvTable<HistoryEntry>> {
    store: S,
}

impl<S: RecordStore<HistoryEntry>> PromptHistory<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Append a prompt stamped with the current local time.
    ///
    /// An existing entry with the same name is left alone; names are labels,
    /// not keys.
    pub fn save(&self, name: &str, prompt: &str) -> StoreResult<HistoryEntry> {
        self.save_at(name, prompt, Local::now().naive_local())
    }

    /// Append a prompt with an explicit timestamp.
    pub fn save_at(
        &self,
        name: &str,
        prompt: &str,
        timestamp: NaiveDateTime,
    ) -> StoreResult<HistoryEntry> {
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        let entry = HistoryEntry {
            id: RecordId::new(),
            name: name.to_string(),
            timestamp: timestamp.into(),
            prompt: prompt.to_string(),
        };
        self.store.append(entry.clone())?;
        info!("Saved prompt \"{name}\" ({} chars)", prompt.chars().count());
        Ok(entry)
    }

    /// All saved prompts, oldest first.
    pub fn list(&self) -> StoreResult<Vec<HistoryEntry>> {
        self.store.list()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{LogLevel, UiTracingLayer};
    use chrono::NaiveDate;
    use tempfile::TempDir;
    use tracing_subscriber::layer::SubscriberExt;

    fn history(dir: &TempDir) -> PromptHistory {
        PromptHistory::new(CsvTable::open(dir.path()).unwrap())
    }

    fn ts(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_micro_opt(h, m, s, 123_456)
            .unwrap()
    }

    #[test]
    fn save_appends_exactly_one_row() {
        let dir = TempDir::new().unwrap();
        let history = history(&dir);
        let saved = history
            .save("Review", "Role: You are a reviewer.")
            .unwrap();

        let all = history.list().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Review");
        assert_eq!(all[0].prompt, "Role: You are a reviewer.");
        assert_eq!(all[0].id, saved.id);
    }

    #[test]
    fn same_name_never_overwrites() {
        let dir = TempDir::new().unwrap();
        let history = history(&dir);
        history.save_at("Draft", "first", ts(9, 0, 0)).unwrap();
        history.save_at("Draft", "second", ts(10, 0, 0)).unwrap();

        let prompts: Vec<String> = history
            .list()
            .unwrap()
            .into_iter()
            .map(|e| e.prompt)
            .collect();
        assert_eq!(prompts, ["first", "second"]);
    }

    #[test]
    fn empty_name_is_rejected() {
        let dir = TempDir::new().unwrap();
        let history = history(&dir);
        assert!(matches!(
            history.save("", "text"),
            Err(StoreError::EmptyName)
        ));
        assert!(history.list().unwrap().is_empty());

        // Only the empty string is refused; names are free text.
        history.save("  ", "text").unwrap();
        assert_eq!(history.list().unwrap()[0].name, "  ");
    }

    #[test]
    fn multiline_prompt_and_timestamp_survive_storage() {
        let dir = TempDir::new().unwrap();
        let history = history(&dir);
        let text = "Role: A\n\nContext:\nline one\nline \"two\", quoted";
        history.save_at("Multi", text, ts(14, 30, 5)).unwrap();

        let entry = &history.list().unwrap()[0];
        assert_eq!(entry.prompt, text);
        assert_eq!(entry.timestamp, Timestamp::Parsed(ts(14, 30, 5)));
        assert_eq!(entry.heading(), "Multi - 2024-05-01 14:30:05.123456");
    }

    #[test]
    fn parses_timestamp_variants() {
        assert_eq!(
            parse_timestamp("2024-05-01 14:30:05.123456"),
            Some(ts(14, 30, 5))
        );
        assert_eq!(
            parse_timestamp("2024-05-01T14:30:05.123456"),
            Some(ts(14, 30, 5))
        );
        let whole = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(14, 30, 5)
            .unwrap();
        assert_eq!(parse_timestamp("2024-05-01 14:30:05"), Some(whole));
        assert!(parse_timestamp("2024-05-01T14:30:05+00:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn reads_files_written_without_ids() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("prompt_history.csv"),
            "name,timestamp,prompt\nOld,2024-05-01 14:30:05.123456,Role: old\n",
        )
        .unwrap();
        let entries = history(&dir).list().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Old");
        assert_eq!(entries[0].timestamp.as_datetime(), Some(ts(14, 30, 5)));
    }

    #[test]
    fn unreadable_timestamp_is_kept_and_history_stays_writable() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("prompt_history.csv"),
            "name,timestamp,prompt\nOld,,Role: old\nLater,soon,Role: later\n",
        )
        .unwrap();
        let history = history(&dir);

        let (layer, buffer) = UiTracingLayer::new();
        let subscriber = tracing_subscriber::registry().with(layer);
        let entries = tracing::subscriber::with_default(subscriber, || history.list().unwrap());
        let warnings: Vec<_> = buffer
            .drain()
            .into_iter()
            .filter(|l| l.level == LogLevel::Warn)
            .collect();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].message.contains("prompt_history.csv:2:"));
        assert!(warnings[1].message.contains("\"soon\""));

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].timestamp, Timestamp::Raw(String::new()));
        assert_eq!(entries[1].heading(), "Later - soon");

        history.save("New", "Role: new").unwrap();
        let after = history.list().unwrap();
        assert_eq!(after.len(), 3);
        assert_eq!(after[1].timestamp, Timestamp::Raw("soon".into()));
        assert!(after[2].timestamp.as_datetime().is_some());

        let content = std::fs::read_to_string(dir.path().join("prompt_history.csv")).unwrap();
        assert!(content.contains(",Later,soon,Role: later"));
    }

    #[test]
    fn timestamp_from_stored() {
        assert_eq!(
            Timestamp::from_stored("2024-05-01 14:30:05.123456"),
            Timestamp::Parsed(ts(14, 30, 5))
        );
        assert_eq!(Timestamp::from_stored("n/a"), Timestamp::Raw("n/a".into()));
        assert_eq!(Timestamp::Raw("n/a".into()).to_string(), "n/a");
    }
}
