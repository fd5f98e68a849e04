//! Brute-force cosine retriever over a JSONL corpus.
//!
//! Stands in for a vector database on small corpora and in tests. Distance is
//! `1 - cosine_similarity`, range `[0, 2]`.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::retrieval::{CandidateRetriever, RetrievalError, RetryPolicy};
use crate::types::candidate::{Candidate, RawFeatures};
use crate::types::identifiers::CandidateId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusRecord {
    pub id: CandidateId,
    pub embedding: Vec<f32>,
    pub year: i32,
    pub citation_count: u64,
    pub government_score: f64,
}

impl CorpusRecord {
    pub fn features(&self) -> RawFeatures {
        RawFeatures {
            year: self.year,
            citation_count: self.citation_count,
            government_score: self.government_score,
        }
    }
}

pub fn read_corpus(path: &Path) -> Result<Vec<CorpusRecord>, RetrievalError> {
    let f = fs::File::open(path).map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            RetrievalError::Unavailable(format!("corpus not found at {path:?}"))
        } else {
            RetrievalError::Io(err)
        }
    })?;

    let mut records = Vec::new();
    for (idx, line) in BufReader::new(f).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: CorpusRecord = serde_json::from_str(&line).map_err(|source| {
            RetrievalError::CorruptRecord { path: path.to_path_buf(), line: idx + 1, source }
        })?;
        records.push(record);
    }
    Ok(records)
}

#[derive(Debug, Clone)]
pub struct ExactRetriever {
    records: Vec<CorpusRecord>,
    norms: Vec<f32>,
    dimensions: usize,
}

impl ExactRetriever {
    pub fn new(records: Vec<CorpusRecord>) -> Result<Self, RetrievalError> {
        let dimensions = records.first().map(|r| r.embedding.len()).unwrap_or(0);
        for record in &records {
            if record.embedding.len() != dimensions {
                return Err(RetrievalError::DimensionMismatch {
                    expected: dimensions,
                    actual: record.embedding.len(),
                });
            }
        }
        let norms = records.iter().map(|r| norm(&r.embedding)).collect();
        Ok(Self { records, norms, dimensions })
    }

    /// Opens the corpus under the retry budget. Exhaustion is fatal for the caller.
    pub fn connect(path: &Path, policy: &RetryPolicy) -> Result<Self, RetrievalError> {
        let records = policy.run("open corpus", || read_corpus(path))?;
        let retriever = Self::new(records)?;
        tracing::info!(
            documents = retriever.len(),
            dimensions = retriever.dimensions,
            "Opened corpus {:?}",
            path
        );
        Ok(retriever)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[CorpusRecord] {
        &self.records
    }
}

impl CandidateRetriever for ExactRetriever {
    fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<Candidate>, RetrievalError> {
        if self.records.is_empty() {
            return Ok(Vec::new());
        }
        if embedding.len() != self.dimensions {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.dimensions,
                actual: embedding.len(),
            });
        }

        let query_norm = norm(embedding);
        let mut scored: Vec<(usize, f64)> = self
            .records
            .iter()
            .zip(&self.norms)
            .enumerate()
            .map(|(idx, (record, &record_norm))| {
                (idx, cosine_distance(embedding, query_norm, &record.embedding, record_norm))
            })
            .collect();

        // Stable: equal distances keep corpus order.
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(idx, distance)| {
                let record = &self.records[idx];
                Candidate { id: record.id.clone(), distance, features: record.features() }
            })
            .collect())
    }
}

fn norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

fn cosine_distance(a: &[f32], a_norm: f32, b: &[f32], b_norm: f32) -> f64 {
    if a_norm == 0.0 || b_norm == 0.0 {
        return 1.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    1.0 - f64::from(dot / (a_norm * b_norm))
}
