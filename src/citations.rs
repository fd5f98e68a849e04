//! Paper-level snapshots to citation-level distributions.
//!
//! Each paper id in a global snapshot is replaced by its citation count and
//! selections are summed per citation value. Ids missing from the lookup are
//! skipped.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use crate::store::{distribution, read_snapshot, StoreError};
use crate::types::identifiers::CandidateId;
use crate::types::selection_result::GlobalDistribution;

pub const HEADER: [&str; 2] = ["settings", "citation_distribution"];

pub fn citation_distribution(
    global: &GlobalDistribution,
    citations: &HashMap<CandidateId, u64>,
) -> BTreeMap<u64, u64> {
    let mut out = BTreeMap::new();
    for (id, selections) in global.iter() {
        if let Some(&n_citation) = citations.get(id) {
            *out.entry(n_citation).or_insert(0) += selections;
        }
    }
    out
}

/// Returns the number of rows written.
pub fn transform(
    snapshot: &Path,
    citations: &HashMap<CandidateId, u64>,
    output: &Path,
) -> Result<usize, StoreError> {
    let rows = read_snapshot(snapshot)?;

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(output)?;
    writer.write_record(HEADER)?;
    for (settings, global) in &rows {
        let by_citation = citation_distribution(global, citations);
        writer.write_record([settings.clone(), distribution::encode(&by_citation)?])?;
    }
    writer.flush()?;

    tracing::info!(rows = rows.len(), "Citation distributions written to {:?}", output);
    Ok(rows.len())
}
