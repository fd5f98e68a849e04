use std::collections::HashMap;

use citesim::selection::{page_distribution, PaginationSampler};
use citesim::types::CandidateId;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn ids(names: &[&str]) -> Vec<CandidateId> {
    names.iter().map(|s| CandidateId::from(*s)).collect()
}

fn numbered(n: usize) -> Vec<CandidateId> {
    (0..n).map(|i| CandidateId::new(format!("p{i}"))).collect()
}

#[test]
fn golden_five_candidates_two_per_page_three_draws() {
    let pool = ids(&["A", "B", "C", "D", "E"]);
    let ranked: Vec<&CandidateId> = pool.iter().collect();
    let sampler = PaginationSampler::new(2, 3);

    for seed in 0..200 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let result = sampler.sample(&ranked, &mut rng);

        assert_eq!(result.total_draws(), 3, "seed {seed}");
        assert_eq!(result.distinct(), 3, "no id may repeat, seed {seed}");
        for (id, &count) in result.iter() {
            assert!(pool.contains(id));
            assert_eq!(count, 1);
        }
    }

    let weights = page_distribution(3);
    assert!((weights[0] - 0.665).abs() < 1e-3);
    assert!((weights[1] - 0.245).abs() < 1e-3);
    assert!((weights[2] - 0.090).abs() < 1e-3);
}

#[test]
fn invariant_draws_bounded_by_k_with_equality_unless_exhausted() {
    let pool = numbered(37);
    let ranked: Vec<&CandidateId> = pool.iter().collect();

    let shapes = [(1, 5), (10, 10), (10, 25), (10, 50), (100, 50), (5, 37), (3, 100)];
    for &(page_size, draws) in &shapes {
        let sampler = PaginationSampler::new(page_size, draws);
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let result = sampler.sample(&ranked, &mut rng);
            assert!(result.total_draws() as usize <= draws);
            assert_eq!(result.total_draws() as usize, draws.min(pool.len()));
        }
    }
}

#[test]
fn invariant_multiplicity_never_exceeds_pool_occurrences() {
    // "dup" sits on two different pages; it may be drawn at most twice.
    let pool = ids(&["dup", "a", "b", "dup", "c", "d"]);
    let ranked: Vec<&CandidateId> = pool.iter().collect();
    let mut occurrences: HashMap<&CandidateId, u64> = HashMap::new();
    for id in &pool {
        *occurrences.entry(id).or_insert(0) += 1;
    }

    let sampler = PaginationSampler::new(3, 6);
    for seed in 0..100 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let result = sampler.sample(&ranked, &mut rng);
        assert_eq!(result.total_draws(), 6);
        for (id, &count) in result.iter() {
            assert!(count <= occurrences[id], "{id} drawn {count} times");
        }
        assert_eq!(result.count(&CandidateId::from("dup")), 2);
    }
}

#[test]
fn invariant_single_page_degenerates_to_uniform_without_replacement() {
    let pool = numbered(8);
    let ranked: Vec<&CandidateId> = pool.iter().collect();

    // k larger than the pool: every candidate exactly once, then stop.
    let sampler = PaginationSampler::new(8, 20);
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let result = sampler.sample(&ranked, &mut rng);
    assert_eq!(result.total_draws(), 8);
    assert!(pool.iter().all(|id| result.count(id) == 1));

    // k = 1 with a single page: each candidate roughly equally likely.
    let sampler = PaginationSampler::new(100, 1);
    let mut hits: HashMap<CandidateId, usize> = HashMap::new();
    let trials = 4_000;
    for seed in 0..trials {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let result = sampler.sample(&ranked, &mut rng);
        for (id, _) in result.iter() {
            *hits.entry(id.clone()).or_insert(0) += 1;
        }
    }
    let expected = trials as f64 / pool.len() as f64;
    for id in &pool {
        let observed = hits.get(id).copied().unwrap_or(0) as f64;
        assert!((observed - expected).abs() < expected * 0.2, "{id}: {observed} vs {expected}");
    }
}

#[test]
fn invariant_first_page_is_exponentially_favoured() {
    let pool = numbered(5);
    let ranked: Vec<&CandidateId> = pool.iter().collect();
    let sampler = PaginationSampler::new(1, 1);

    let trials = 5_000;
    let mut first = 0;
    let mut last = 0;
    for seed in 0..trials {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let result = sampler.sample(&ranked, &mut rng);
        first += result.count(&pool[0]);
        last += result.count(&pool[4]);
    }

    // exp(-1) / sum(exp(-r), r = 1..=5) ~= 0.6364
    let share = first as f64 / trials as f64;
    assert!((share - 0.6364).abs() < 0.03, "first page share {share}");
    assert!(last < first / 20);
}

#[test]
fn invariant_emptied_pages_drop_out_and_mass_is_redistributed() {
    // One candidate per page; after the first draw empties a page the remaining
    // page always receives all the mass, so both are drawn every time.
    let pool = ids(&["top", "bottom"]);
    let ranked: Vec<&CandidateId> = pool.iter().collect();
    let sampler = PaginationSampler::new(1, 2);

    for seed in 0..50 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let result = sampler.sample(&ranked, &mut rng);
        assert_eq!(result.count(&pool[0]), 1);
        assert_eq!(result.count(&pool[1]), 1);
    }
}

#[test]
fn invariant_empty_pool_yields_empty_result() {
    let ranked: Vec<&CandidateId> = Vec::new();
    let sampler = PaginationSampler::new(10, 10);
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let result = sampler.sample(&ranked, &mut rng);
    assert!(result.is_empty());
    assert_eq!(result.total_draws(), 0);
}
