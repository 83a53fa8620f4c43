//! Staging of spreadsheet rows for bulk import.
//!
//! An uploaded sheet becomes a [`PendingImport`]: every non-blank row turned
//! into a normalized [`PartnerRecord`], plus what the header matching found.
//! Nothing is persisted until the user confirms; vocabulary problems are
//! reported as warnings and never drop a row.

use serde::Serialize;

use crate::partner::{FieldIssue, PartnerField, PartnerRecord};
use crate::spreadsheet::{HeaderMapping, HeaderMatch, SheetTable};
use crate::types::Timestamp;

/// Maximum number of records echoed back in a preview.
pub const PREVIEW_SAMPLE_ROWS: usize = 50;

/// A vocabulary warning tied to its spreadsheet row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowWarning {
    pub row: usize,
    #[serde(flatten)]
    pub issue: FieldIssue,
}

/// A batch of parsed records awaiting confirmation.
#[derive(Debug, Clone)]
pub struct PendingImport {
    pub source_name: String,
    pub staged_at: Timestamp,
    pub matched_headers: Vec<HeaderMatch>,
    pub ignored_headers: Vec<String>,
    pub missing_fields: Vec<PartnerField>,
    pub warnings: Vec<RowWarning>,
    pub skipped_blank_rows: usize,
    pub records: Vec<PartnerRecord>,
}

impl PendingImport {
    /// Stage every non-blank row of `table`. Each record holds exactly what
    /// its row holds; columns the sheet lacks stay empty.
    pub fn stage(source_name: impl Into<String>, table: &SheetTable, staged_at: Timestamp) -> Self {
        let mapping = HeaderMapping::from_headers(&table.headers);
        let mut records = Vec::with_capacity(table.rows.len());
        let mut warnings = Vec::new();
        let mut skipped_blank_rows = 0;

        for row in &table.rows {
            let raw = mapping.raw_fields(&row.cells);
            if raw.is_blank() {
                skipped_blank_rows += 1;
                continue;
            }
            let record = raw.into_record();
            warnings.extend(
                record
                    .vocabulary_issues()
                    .into_iter()
                    .map(|issue| RowWarning {
                        row: row.number,
                        issue,
                    }),
            );
            records.push(record);
        }

        Self {
            source_name: source_name.into(),
            staged_at,
            matched_headers: mapping.matched,
            ignored_headers: mapping.ignored,
            missing_fields: mapping.missing,
            warnings,
            skipped_blank_rows,
            records,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Summary for the confirmation screen, with at most
    /// [`PREVIEW_SAMPLE_ROWS`] records echoed back.
    pub fn preview(&self) -> ImportPreview {
        ImportPreview {
            source_name: self.source_name.clone(),
            staged_at: self.staged_at,
            total_rows: self.records.len(),
            skipped_blank_rows: self.skipped_blank_rows,
            matched_headers: self.matched_headers.clone(),
            ignored_headers: self.ignored_headers.clone(),
            missing_fields: self.missing_fields.clone(),
            warnings: self.warnings.clone(),
            sample: self.records.iter().take(PREVIEW_SAMPLE_ROWS).cloned().collect(),
        }
    }
}

/// What the user sees before confirming an import.
#[derive(Debug, Clone, Serialize)]
pub struct ImportPreview {
    pub source_name: String,
    pub staged_at: Timestamp,
    pub total_rows: usize,
    pub skipped_blank_rows: usize,
    pub matched_headers: Vec<HeaderMatch>,
    pub ignored_headers: Vec<String>,
    pub missing_fields: Vec<PartnerField>,
    pub warnings: Vec<RowWarning>,
    pub sample: Vec<PartnerRecord>,
}
