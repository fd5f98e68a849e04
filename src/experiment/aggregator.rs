use std::path::PathBuf;

use crate::store::{write_snapshot, ResultsLayout, StoreError};
use crate::types::selection_result::{GlobalDistribution, SelectionResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlushStats {
    pub rows_appended: usize,
    pub configurations: usize,
}

/// Two persistence tiers, kept apart on purpose:
///
/// - per-query rows are buffered and appended to each configuration's durable
///   log on flush, then dropped from memory;
/// - global counters only live in memory, start at zero every launch and are
///   written out as a full snapshot on every flush.
#[derive(Debug)]
pub struct ResultAggregator {
    layout: ResultsLayout,
    snapshot_path: PathBuf,
    labels: Vec<String>,
    buffers: Vec<Vec<(u64, SelectionResult)>>,
    globals: Vec<GlobalDistribution>,
}

impl ResultAggregator {
    /// `labels[i]` is the settings key written for configuration `i`.
    pub fn new(layout: ResultsLayout, snapshot_path: PathBuf, labels: Vec<String>) -> Self {
        let n = labels.len();
        Self {
            layout,
            snapshot_path,
            labels,
            buffers: vec![Vec::new(); n],
            globals: vec![GlobalDistribution::new(); n],
        }
    }

    /// `results[i]` belongs to configuration `i`.
    pub fn record(&mut self, query_id: u64, results: Vec<SelectionResult>) {
        debug_assert_eq!(results.len(), self.labels.len());
        for (index, result) in results.into_iter().enumerate() {
            self.globals[index].absorb(&result);
            self.buffers[index].push((query_id, result));
        }
    }

    pub fn buffered_queries(&self) -> usize {
        self.buffers.first().map(Vec::len).unwrap_or(0)
    }

    pub fn global(&self, config_index: usize) -> Option<&GlobalDistribution> {
        self.globals.get(config_index)
    }

    /// Snapshot first, then the logs. Progress is read from the logs, so a crash
    /// between the two at worst recomputes one interval.
    pub fn flush(&mut self) -> Result<FlushStats, StoreError> {
        write_snapshot(
            &self.snapshot_path,
            self.labels.iter().map(String::as_str).zip(self.globals.iter()),
        )?;

        let mut rows_appended = 0;
        for (index, buffer) in self.buffers.iter_mut().enumerate() {
            if buffer.is_empty() {
                continue;
            }
            self.layout.result_log(index).append(buffer)?;
            rows_appended += buffer.len();
            buffer.clear();
        }

        Ok(FlushStats { rows_appended, configurations: self.labels.len() })
    }
}
