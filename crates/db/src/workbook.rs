//! Legacy partner store backed by a single sheet of an `.xlsx` file.
//!
//! Reads load the whole sheet. Writes load the sheet, append in memory and
//! write the entire workbook to a temporary file next to the target, which is
//! then renamed over it. Readers see either the old or the new workbook, never
//! a partial one. Writers inside this process are serialized; other processes
//! editing the same file are not coordinated (last writer wins).

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use roster_core::partner::PartnerRecord;
use roster_core::spreadsheet::{read_sheet, write_records, HeaderMapping, SpreadsheetError};
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::store::PartnerStore;

pub struct WorkbookPartnerStore {
    path: PathBuf,
    sheet: String,
    write_lock: Mutex<()>,
}

impl WorkbookPartnerStore {
    pub fn new(path: impl Into<PathBuf>, sheet: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sheet: sheet.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Load every record. A workbook that does not exist yet is empty.
    async fn load(&self) -> Result<Vec<PartnerRecord>, StoreError> {
        if !tokio::fs::try_exists(&self.path)
            .await
            .map_err(|e| StoreError::Parse(format!("{}: {e}", self.path.display())))?
        {
            return Ok(Vec::new());
        }

        let path = self.path.clone();
        let sheet = self.sheet.clone();
        let table = tokio::task::spawn_blocking(move || read_sheet(&path, &sheet))
            .await
            .map_err(|e| StoreError::Parse(format!("Workbook reader failed: {e}")))?
            .map_err(|e| self.parse_error(e))?;

        let mapping = HeaderMapping::from_headers(&table.headers);
        let records = table
            .rows
            .iter()
            .map(|row| mapping.raw_fields(&row.cells))
            .filter(|raw| !raw.is_blank())
            .map(|raw| raw.into_record())
            .collect();
        Ok(records)
    }

    /// Replace the whole workbook with `records`.
    async fn save(&self, records: &[PartnerRecord]) -> Result<(), StoreError> {
        let bytes = write_records(records, &self.sheet)
            .map_err(|e| StoreError::Write(e.to_string()))?;

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || replace_file(&path, &bytes))
            .await
            .map_err(|e| StoreError::Write(format!("Workbook writer failed: {e}")))?
            .map_err(|e| self.io_error(e))
    }

    async fn append(&self, new_records: &[PartnerRecord]) -> Result<u64, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load().await?;
        records.extend_from_slice(new_records);
        self.save(&records).await?;
        tracing::info!(
            path = %self.path.display(),
            appended = new_records.len(),
            total = records.len(),
            "Partner workbook rewritten"
        );
        Ok(new_records.len() as u64)
    }

    fn parse_error(&self, err: SpreadsheetError) -> StoreError {
        StoreError::Parse(format!("{}: {err}", self.path.display()))
    }

    /// A file held open by another program surfaces as permission denied.
    fn io_error(&self, err: io::Error) -> StoreError {
        let message = format!("{}: {err}", self.path.display());
        if err.kind() == io::ErrorKind::PermissionDenied {
            StoreError::Parse(format!("{message} (is the workbook open elsewhere?)"))
        } else {
            StoreError::Write(message)
        }
    }
}

/// Write `bytes` to a temporary file in the target's directory, flush it to
/// disk and rename it over `path`.
fn replace_file(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait]
impl PartnerStore for WorkbookPartnerStore {
    fn backend(&self) -> &'static str {
        "workbook"
    }

    async fn list(&self) -> Result<Vec<PartnerRecord>, StoreError> {
        let records = self.load().await?;
        tracing::debug!(count = records.len(), path = %self.path.display(), "Loaded partner workbook");
        Ok(records)
    }

    async fn insert(&self, record: &PartnerRecord) -> Result<(), StoreError> {
        self.append(std::slice::from_ref(record)).await.map(|_| ())
    }

    async fn insert_batch(&self, records: &[PartnerRecord]) -> Result<u64, StoreError> {
        if records.is_empty() {
            return Ok(0);
        }
        self.append(records).await
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.load().await.map(|_| ())
    }
}
