pub mod exact;

use std::path::PathBuf;

use thiserror::Error;

use crate::types::candidate::Candidate;

pub use exact::{read_corpus, CorpusRecord, ExactRetriever};

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("Retrieval backend unavailable: {0}")]
    Unavailable(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Corrupt corpus record at {path:?} line {line}: {source}")]
    CorruptRecord { path: PathBuf, line: usize, source: serde_json::Error },
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("{operation} failed after {attempts} attempts: {last}")]
    RetriesExhausted { operation: String, attempts: u32, last: Box<RetrievalError> },
}

impl RetrievalError {
    /// Transient failures worth another attempt. Data errors fail fast.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RetrievalError::Unavailable(_) | RetrievalError::Io(_))
    }
}

/// Nearest-neighbour backend. Results come back ordered by ascending distance;
/// callers do not re-verify that order.
pub trait CandidateRetriever {
    fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<Candidate>, RetrievalError>;
}

impl<R: CandidateRetriever + ?Sized> CandidateRetriever for &R {
    fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<Candidate>, RetrievalError> {
        (**self).query(embedding, top_k)
    }
}

impl<R: CandidateRetriever + ?Sized> CandidateRetriever for Box<R> {
    fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<Candidate>, RetrievalError> {
        (**self).query(embedding, top_k)
    }
}

/// Fixed attempt budget, no backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 5 }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts: max_attempts.max(1) }
    }

    pub fn run<T, F>(&self, operation: &str, mut op: F) -> Result<T, RetrievalError>
    where
        F: FnMut() -> Result<T, RetrievalError>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) if attempt >= attempts => {
                    return Err(RetrievalError::RetriesExhausted {
                        operation: operation.to_string(),
                        attempts,
                        last: Box::new(err),
                    });
                }
                Err(err) => {
                    tracing::warn!("Retry {attempt}/{attempts} - {operation}: {err}");
                }
            }
        }
    }
}

/// Retries every query against `inner` under `policy`.
#[derive(Debug)]
pub struct RetryingRetriever<R> {
    inner: R,
    policy: RetryPolicy,
}

impl<R> RetryingRetriever<R> {
    pub fn new(inner: R, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: CandidateRetriever> CandidateRetriever for RetryingRetriever<R> {
    fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<Candidate>, RetrievalError> {
        self.policy.run("retrieval query", || self.inner.query(embedding, top_k))
    }
}
