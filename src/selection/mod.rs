pub mod pagination;
pub mod ranking;
pub mod seeding;

use rand::Rng;

use crate::config::{Configuration, ConfigurationSet};
use crate::types::candidate::PreparedCandidates;
use crate::types::selection_result::SelectionResult;
pub use pagination::{page_distribution, Pages, PaginationSampler};
pub use ranking::{rank, Scorer, WeightedSumScorer};
pub use seeding::{derive_seed, rng_for, SEED_DERIVATION_VERSION};

/// Scores and samples one query's candidates under every configuration.
///
/// Retrieval and normalization happen before this, once per query. Each
/// configuration is applied independently with its own RNG stream.
pub struct ConfigurationFanout<S> {
    scorer: S,
}

impl Default for ConfigurationFanout<WeightedSumScorer> {
    fn default() -> Self {
        Self { scorer: WeightedSumScorer }
    }
}

impl<S> ConfigurationFanout<S>
where
    S: Scorer,
{
    pub fn new(scorer: S) -> Self {
        Self { scorer }
    }

    /// Rank, paginate, sample for one configuration.
    pub fn select<R: Rng>(
        &self,
        prepared: &PreparedCandidates,
        config: &Configuration,
        rng: &mut R,
    ) -> SelectionResult {
        let ranked = rank(&self.scorer, prepared, &config.weights);
        let sampler = PaginationSampler::new(config.page_size, config.draws);
        let selected = sampler.sample(&ranked, rng);

        debug_assert!(selected.total_draws() as usize <= config.draws);
        debug_assert!(
            selected.total_draws() as usize == config.draws.min(prepared.len()),
            "draws stop early only when the pool is exhausted"
        );

        selected
    }

    /// One result per configuration, in configuration order.
    pub fn fan_out(
        &self,
        prepared: &PreparedCandidates,
        configurations: &ConfigurationSet,
        base_seed: u64,
        query_index: u64,
    ) -> Vec<SelectionResult> {
        configurations
            .iter()
            .enumerate()
            .map(|(config_index, config)| {
                let mut rng = rng_for(base_seed, query_index, config_index as u64);
                self.select(prepared, config, &mut rng)
            })
            .collect()
    }
}
