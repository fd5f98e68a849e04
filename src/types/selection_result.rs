use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::identifiers::CandidateId;

/// Draw counts for one (query, configuration) pair.
///
/// Multiset semantics. Keys are kept sorted so serialization is stable.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionResult {
    counts: BTreeMap<CandidateId, u64>,
}

impl SelectionResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, id: CandidateId) {
        *self.counts.entry(id).or_insert(0) += 1;
    }

    pub fn count(&self, id: &CandidateId) -> u64 {
        self.counts.get(id).copied().unwrap_or(0)
    }

    /// Number of draws, not number of distinct ids.
    pub fn total_draws(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CandidateId, &u64)> {
        self.counts.iter()
    }
}

impl FromIterator<(CandidateId, u64)> for SelectionResult {
    fn from_iter<I: IntoIterator<Item = (CandidateId, u64)>>(iter: I) -> Self {
        let mut result = SelectionResult::new();
        for (id, count) in iter {
            if count > 0 {
                *result.counts.entry(id).or_insert(0) += count;
            }
        }
        result
    }
}

/// Cumulative draw counts for one configuration since process start.
///
/// Only ever grows. Rebuilt from zero on every launch.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlobalDistribution {
    counts: BTreeMap<CandidateId, u64>,
}

impl GlobalDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn absorb(&mut self, step: &SelectionResult) {
        for (id, count) in step.iter() {
            *self.counts.entry(id.clone()).or_insert(0) += count;
        }
    }

    pub fn count(&self, id: &CandidateId) -> u64 {
        self.counts.get(id).copied().unwrap_or(0)
    }

    pub fn total_draws(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CandidateId, &u64)> {
        self.counts.iter()
    }
}

impl From<BTreeMap<CandidateId, u64>> for GlobalDistribution {
    fn from(counts: BTreeMap<CandidateId, u64>) -> Self {
        Self { counts }
    }
}
