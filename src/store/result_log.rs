use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use crate::store::{distribution, StoreError};
use crate::types::selection_result::SelectionResult;

pub const HEADER: [&str; 2] = ["query_id", "distribution"];

/// Append-only per-configuration log of `(query_id, distribution)` rows.
///
/// The header is written once, when the file is created. Existing rows are
/// never rewritten.
#[derive(Debug, Clone)]
pub struct ResultLog {
    path: PathBuf,
}

impl ResultLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, rows: &[(u64, SelectionResult)]) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let needs_header = fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);

        if needs_header {
            writer.write_record(HEADER)?;
        }
        for (query_id, result) in rows {
            writer.write_record([query_id.to_string(), distribution::encode(result)?])?;
        }

        writer.flush()?;
        let file = writer.into_inner().map_err(|err| StoreError::Io(err.into_error()))?;
        file.sync_all()?;
        Ok(())
    }

    /// Data rows present, header excluded. A missing log counts as zero.
    pub fn count_records(&self) -> Result<usize, StoreError> {
        if !self.path.exists() {
            return Ok(0);
        }
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)?;
        let mut count = 0;
        for record in reader.records() {
            record?;
            count += 1;
        }
        Ok(count)
    }

    pub fn read_all(&self) -> Result<Vec<(u64, SelectionResult)>, StoreError> {
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(&self.path)?;
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let query_id = record
                .get(0)
                .and_then(|raw| raw.trim().parse::<u64>().ok())
                .ok_or_else(|| StoreError::InvalidRow(format!("{:?}", record.get(0))))?;
            let raw = record
                .get(1)
                .ok_or_else(|| StoreError::InvalidRow("missing distribution".into()))?;
            let result: SelectionResult = distribution::decode(raw)?.into_iter().collect();
            rows.push((query_id, result));
        }
        Ok(rows)
    }
}
