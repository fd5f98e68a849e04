use std::collections::BTreeMap;
use std::fs;

use citesim::config::{Configuration, ConfigurationSet, Weights};
use citesim::experiment::{Experiment, QueryRecord, ResultAggregator, RunSettings};
use citesim::features::{FeatureNormalizer, MinMaxScaler};
use citesim::retrieval::{CorpusRecord, ExactRetriever};
use citesim::store::{distribution, read_snapshot, write_snapshot, ResultsLayout, StoreError};
use citesim::types::{CandidateId, GlobalDistribution, SelectionResult};
use tempfile::tempdir;

fn result(pairs: &[(&str, u64)]) -> SelectionResult {
    pairs.iter().map(|(id, n)| (CandidateId::from(*id), *n)).collect()
}

fn global(pairs: &[(&str, u64)]) -> GlobalDistribution {
    let mut g = GlobalDistribution::new();
    g.absorb(&result(pairs));
    g
}

#[test]
fn golden_snapshot_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("processed").join("global_distributions.csv");

    let config = Configuration::new(10, 25, Weights::new(0.5, 0.0, 0.25, 0.25));
    let label = config.label().unwrap();
    assert_eq!(label, r#"{"page_size":10,"draws":25,"weights":[0.5,0.0,0.25,0.25]}"#);

    let g0 = global(&[("17", 3), ("2", 1), ("905", 12)]);
    let g1 = GlobalDistribution::new();
    write_snapshot(&path, [(label.as_str(), &g0), ("empty", &g1)]).unwrap();

    let raw = fs::read_to_string(&path).unwrap();
    let mut lines = raw.lines();
    assert_eq!(lines.next(), Some("settings,distribution"));
    assert_eq!(
        lines.next(),
        Some(r#""{""page_size"":10,""draws"":25,""weights"":[0.5,0.0,0.25,0.25]}","{""17"":3,""2"":1,""905"":12}""#)
    );

    let rows = read_snapshot(&path).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].0, label);
    assert_eq!(rows[0].1, g0);
    assert_eq!(rows[1].0, "empty");
    assert!(rows[1].1.is_empty());
}

#[test]
fn invariant_snapshot_is_overwritten_not_appended() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.csv");

    write_snapshot(&path, [("a", &global(&[("1", 1)]))]).unwrap();
    write_snapshot(&path, [("a", &global(&[("1", 4), ("2", 2)]))]).unwrap();

    let rows = read_snapshot(&path).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].1.count(&CandidateId::from("1")), 4);
    assert!(!dir.path().join("snapshot.csv.tmp").exists());
}

#[test]
fn invariant_distribution_parsing_falls_back_to_literal_form() {
    let expected: BTreeMap<CandidateId, u64> =
        [(CandidateId::from("1"), 2), (CandidateId::from("30"), 1)].into_iter().collect();

    assert_eq!(distribution::decode(r#"{"1": 2, "30": 1}"#).unwrap(), expected);
    assert_eq!(distribution::decode("{'1': 2, '30': 1}").unwrap(), expected);
    assert_eq!(distribution::decode("{1: 2, 30: 1,}").unwrap(), expected);
    assert_eq!(distribution::decode("Counter({'1': 2, '30': 1})").unwrap(), expected);
    assert!(distribution::decode("{}").unwrap().is_empty());

    let escaped = distribution::decode(r#"{'a\'b': 2, 'c\\d': 1, 'say "hi"': 3}"#).unwrap();
    assert_eq!(escaped.get(&CandidateId::from("a'b")), Some(&2));
    assert_eq!(escaped.get(&CandidateId::from(r"c\d")), Some(&1));
    assert_eq!(escaped.get(&CandidateId::from(r#"say "hi""#)), Some(&3));

    for bad in ["", "[1, 2]", "{'1': -2}", "{'1': 2", "{'1' 2}", "{'1': 2} extra", r"{'a\"] {
        assert!(
            matches!(distribution::decode(bad), Err(StoreError::Distribution { .. })),
            "{bad:?} should fail"
        );
    }
}

#[test]
fn invariant_aggregator_keeps_globals_and_drains_buffers() {
    let dir = tempdir().unwrap();
    let layout = ResultsLayout::new(dir.path().join("results"));
    let snapshot = dir.path().join("snapshot.csv");
    let mut aggregator =
        ResultAggregator::new(layout.clone(), snapshot.clone(), vec!["c0".into(), "c1".into()]);

    aggregator.record(0, vec![result(&[("a", 1), ("b", 1)]), result(&[("a", 1)])]);
    aggregator.record(1, vec![result(&[("a", 1)]), result(&[("c", 2)])]);
    assert_eq!(aggregator.buffered_queries(), 2);

    let stats = aggregator.flush().unwrap();
    assert_eq!(stats.rows_appended, 4);
    assert_eq!(aggregator.buffered_queries(), 0);

    aggregator.record(2, vec![result(&[("b", 1)]), result(&[])]);
    aggregator.flush().unwrap();

    let g0 = aggregator.global(0).unwrap();
    assert_eq!(g0.count(&CandidateId::from("a")), 2);
    assert_eq!(g0.count(&CandidateId::from("b")), 2);
    assert_eq!(g0.total_draws(), 4);

    assert_eq!(layout.result_log(0).count_records().unwrap(), 3);
    assert_eq!(layout.result_log(1).count_records().unwrap(), 3);

    let rows = read_snapshot(&snapshot).unwrap();
    assert_eq!(rows[0].1, *g0);
    assert_eq!(rows[1].1.count(&CandidateId::from("c")), 2);
}

fn small_experiment(root: &std::path::Path, batch_size: usize) -> Experiment<ExactRetriever> {
    let records = (0..30)
        .map(|i| CorpusRecord {
            id: CandidateId::new(format!("{i}")),
            embedding: vec![1.0, i as f32 * 0.1],
            year: 2000 + i,
            citation_count: i as u64,
            government_score: 0.0,
        })
        .collect();
    let scaler = MinMaxScaler {
        feature_range: [0.0, 1.0],
        data_min: [2000.0, 0.0, 0.0],
        data_max: [2029.0, (29.0f64).ln_1p(), 1.0],
        n_samples: 30,
    };
    let configs =
        ConfigurationSet::new(vec![Configuration::new(5, 4, Weights::new(0.5, 0.5, 0.0, 0.0))])
            .unwrap();
    Experiment::new(
        ExactRetriever::new(records).unwrap(),
        FeatureNormalizer::new(scaler),
        configs,
        ResultsLayout::new(root.join("results")),
        root.join("snapshot.csv"),
        RunSettings { batch_size, flush_every: 2, top_k: 20, base_seed: 42 },
    )
}

#[test]
fn invariant_global_snapshot_covers_current_process_only() {
    let dir = tempdir().unwrap();
    let queries: Vec<QueryRecord> =
        (0..6).map(|i| QueryRecord { query: None, embedding: vec![1.0, i as f32] }).collect();

    small_experiment(dir.path(), 4).run_batch(&queries).unwrap();
    let after_first = read_snapshot(&dir.path().join("snapshot.csv")).unwrap();
    assert_eq!(after_first[0].1.total_draws(), 4 * 4);

    // A fresh process starts its counters at zero; the durable log keeps growing.
    small_experiment(dir.path(), 4).run_batch(&queries).unwrap();
    let after_second = read_snapshot(&dir.path().join("snapshot.csv")).unwrap();
    assert_eq!(after_second[0].1.total_draws(), 2 * 4);

    let log = ResultsLayout::new(dir.path().join("results")).result_log(0);
    assert_eq!(log.count_records().unwrap(), 6);
}
