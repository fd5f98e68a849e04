use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::experiment::ExperimentError;

/// One precomputed query embedding. The text is informational.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub embedding: Vec<f32>,
}

/// JSONL, one query per line. Record order defines the global query index;
/// blank lines are skipped.
pub fn load_queries(path: &Path) -> Result<Vec<QueryRecord>, ExperimentError> {
    tracing::info!("Loading queries from {:?}", path);
    let f = fs::File::open(path).map_err(|source| ExperimentError::Queries {
        path: path.to_path_buf(),
        reason: source.to_string(),
    })?;

    let mut queries = Vec::new();
    for (idx, line) in BufReader::new(f).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: QueryRecord = serde_json::from_str(&line).map_err(|err| {
            ExperimentError::Queries {
                path: path.to_path_buf(),
                reason: format!("line {}: {err}", idx + 1),
            }
        })?;
        queries.push(record);
    }
    Ok(queries)
}
