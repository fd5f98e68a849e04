use crate::config::Weights;
use crate::types::candidate::{NormalizedCandidate, PreparedCandidates};
use crate::types::identifiers::CandidateId;

pub trait Scorer {
    fn score(&self, candidate: &NormalizedCandidate, weights: &Weights) -> f64;
}

/// `w_sim*sim + w_year*year + w_cit*cit + w_gov*gov`, unnormalized.
#[derive(Debug, Default, Clone, Copy)]
pub struct WeightedSumScorer;

impl Scorer for WeightedSumScorer {
    fn score(&self, candidate: &NormalizedCandidate, weights: &Weights) -> f64 {
        let [year, citation, government] = candidate.scaled;
        weights.similarity * candidate.similarity
            + weights.year * year
            + weights.citation * citation
            + weights.government * government
    }
}

/// Ids by descending score. The sort is stable, so ties keep retrieval order.
/// NaN scores rank after every other score.
pub fn rank<'a, S: Scorer>(
    scorer: &S,
    prepared: &'a PreparedCandidates,
    weights: &Weights,
) -> Vec<&'a CandidateId> {
    let mut scored: Vec<(f64, &CandidateId)> = prepared
        .iter()
        .map(|c| (sort_key(scorer.score(c, weights)), &c.candidate.id))
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    scored.into_iter().map(|(_, id)| id).collect()
}

fn sort_key(score: f64) -> f64 {
    if score.is_nan() {
        f64::NEG_INFINITY
    } else if score == 0.0 {
        // -0.0 ties with 0.0.
        0.0
    } else {
        score
    }
}
