use std::fs;
use std::path::Path;

use crate::store::{distribution, StoreError};
use crate::types::selection_result::GlobalDistribution;

pub const HEADER: [&str; 2] = ["settings", "distribution"];

/// Rewrites the whole snapshot: one `settings,distribution` row per
/// configuration. Never appends.
///
/// Written to a sibling temp file and renamed into place, so a crash mid-write
/// leaves the previous snapshot intact.
pub fn write_snapshot<'a, I>(path: &Path, entries: I) -> Result<(), StoreError>
where
    I: IntoIterator<Item = (&'a str, &'a GlobalDistribution)>,
{
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("csv.tmp");
    if temp_path.exists() {
        fs::remove_file(&temp_path)?;
    }

    let file = fs::File::create(&temp_path)?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
    writer.write_record(HEADER)?;

    let mut rows = 0usize;
    for (settings, global) in entries {
        writer.write_record([settings.to_string(), distribution::encode(global)?])?;
        rows += 1;
    }

    writer.flush()?;
    let file = writer.into_inner().map_err(|err| StoreError::Io(err.into_error()))?;
    file.sync_all()?;
    drop(file);

    fs::rename(&temp_path, path)?;

    tracing::debug!(rows, "Rewrote global distribution snapshot {:?}", path);
    Ok(())
}

/// Rows in file order.
pub fn read_snapshot(path: &Path) -> Result<Vec<(String, GlobalDistribution)>, StoreError> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let settings = record
            .get(0)
            .ok_or_else(|| StoreError::InvalidRow("missing settings".into()))?
            .to_string();
        let raw = record
            .get(1)
            .ok_or_else(|| StoreError::InvalidRow("missing distribution".into()))?;
        rows.push((settings, GlobalDistribution::from(distribution::decode(raw)?)));
    }
    Ok(rows)
}
