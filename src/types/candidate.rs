use serde::{Deserialize, Serialize};

use crate::types::identifiers::CandidateId;

/// Per-paper metadata attached to every retrieval hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawFeatures {
    pub year: i32,
    pub citation_count: u64,
    pub government_score: f64,
}

impl RawFeatures {
    /// Scaler input row: `[year, ln(1 + citations), gov_score]`.
    pub fn as_row(&self) -> [f64; 3] {
        [
            f64::from(self.year),
            (self.citation_count as f64).ln_1p(),
            self.government_score,
        ]
    }
}

/// One retrieval hit. Immutable for the lifetime of a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub distance: f64,
    pub features: RawFeatures,
}

impl Candidate {
    /// Distances can exceed 1, similarity is clamped at zero.
    pub fn similarity(&self) -> f64 {
        (1.0 - self.distance).max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedCandidate {
    pub candidate: Candidate,
    pub similarity: f64,
    /// `[year, citations, gov_score]` after global scaling.
    pub scaled: [f64; 3],
}

/// Candidates of one query, normalized once and shared by every configuration.
///
/// Order is retrieval order (ascending distance) and is what ties fall back to.
#[derive(Debug, Clone, Default)]
pub struct PreparedCandidates {
    pub candidates: Vec<NormalizedCandidate>,
}

impl PreparedCandidates {
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NormalizedCandidate> {
        self.candidates.iter()
    }
}
