//! CSV file backed [`RecordStore`].

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::{IdSource, Record, RecordId, RecordStore, StoreError, StoreResult};

/// One CSV file holding every record of type `R`.
///
/// Reads always parse the whole file. Writes always rewrite the whole file
/// through a temporary sibling and a rename, so a failed write leaves the
/// previous contents in place. Two processes writing the same file are
/// last-writer-wins.
#[derive(Debug, Clone)]
pub struct CsvTable<R> {
    path: PathBuf,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> CsvTable<R> {
    /// Open the table inside `dir`, creating a header-only file if none
    /// exists yet.
    pub fn open(dir: &Path) -> StoreResult<Self> {
        let table = Self {
            path: dir.join(R::FILE_NAME),
            _record: PhantomData,
        };
        if !table.path.exists() {
            debug!("Creating empty table at {}", table.path.display());
            table.write_all(&[])?;
        }
        Ok(table)
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> StoreResult<Vec<R>> {
        if !self.path.exists() {
            self.write_all(&[])?;
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| StoreError::csv(&self.path, e))?;
        let headers = reader
            .headers()
            .map_err(|e| StoreError::csv(&self.path, e))?
            .clone();

        let mut records = Vec::new();
        let mut assigned = 0usize;
        for result in reader.records() {
            let raw = result.map_err(|e| StoreError::csv(&self.path, e))?;
            let line = raw.position().map_or(0, |p| p.line());
            let row: R::Row = raw
                .deserialize(Some(&headers))
                .map_err(|e| StoreError::csv(&self.path, e))?;
            let (record, source) = R::from_row(row).map_err(|message| StoreError::InvalidRow {
                path: self.path.clone(),
                line,
                message,
            })?;
            if source == IdSource::Assigned {
                assigned += 1;
            }
            if let Some(message) = record.load_warning() {
                warn!("{}:{line}: {message}", self.path.display());
            }
            records.push(record);
        }

        // Ids generated during this read must survive until the next one,
        // otherwise a caller holding one could never address the row again.
        if assigned > 0 {
            info!(
                "Assigned ids to {assigned} row(s) in {}; rewriting",
                self.path.display()
            );
            self.write_all(&records)?;
        }

        debug!("Loaded {} row(s) from {}", records.len(), self.path.display());
        Ok(records)
    }

    /// Replace the file contents with `records`.
    fn write_all(&self, records: &[R]) -> StoreResult<()> {
        let tmp_path = self.path.with_extension("csv.tmp");

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&tmp_path)
            .map_err(|e| StoreError::csv(&tmp_path, e))?;
        writer
            .write_record(R::COLUMNS)
            .map_err(|e| StoreError::csv(&tmp_path, e))?;
        for record in records {
            writer
                .serialize(record.to_row())
                .map_err(|e| StoreError::csv(&tmp_path, e))?;
        }
        writer.flush().map_err(|e| StoreError::io(&tmp_path, e))?;
        drop(writer);

        std::fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::io(&self.path, e))?;
        debug!("Wrote {} row(s) to {}", records.len(), self.path.display());
        Ok(())
    }
}

impl<R: Record> RecordStore<R> for CsvTable<R> {
    fn list(&self) -> StoreResult<Vec<R>> {
        self.read_all()
    }

    fn append(&self, record: R) -> StoreResult<()> {
        let mut records = self.read_all()?;
        records.push(record);
        self.write_all(&records)
    }

    fn update(&self, record: R) -> StoreResult<()> {
        let mut records = self.read_all()?;
        let id = record.id();
        let slot = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or(StoreError::NotFound(id))?;
        *slot = record;
        self.write_all(&records)
    }

    fn delete(&self, id: RecordId) -> StoreResult<R> {
        let mut records = self.read_all()?;
        let pos = records
            .iter()
            .position(|r| r.id() == id)
            .ok_or(StoreError::NotFound(id))?;
        let removed = records.remove(pos);
        self.write_all(&records)?;
        Ok(removed)
    }
}
