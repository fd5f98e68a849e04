use crate::config::ConfigurationSet;
use crate::store::{ResultsLayout, StoreError};

/// Derives where the next batch starts from the durable result logs.
#[derive(Debug, Clone)]
pub struct CheckpointManager {
    layout: ResultsLayout,
}

impl CheckpointManager {
    pub fn new(layout: ResultsLayout) -> Self {
        Self { layout }
    }

    /// Completed queries per configuration, by configuration index.
    pub fn progress(&self, configurations: &ConfigurationSet) -> Result<Vec<usize>, StoreError> {
        (0..configurations.len())
            .map(|index| self.layout.result_log(index).count_records())
            .collect()
    }

    /// Configuration 0's progress, applied to every configuration.
    ///
    /// All configurations are driven by the same query sequence and flushed
    /// together, so they are assumed to advance in lockstep. Diverging logs
    /// are reported, not reconciled.
    pub fn resume_offset(&self, configurations: &ConfigurationSet) -> Result<usize, StoreError> {
        let progress = self.progress(configurations)?;
        let offset = progress.first().copied().unwrap_or(0);

        if let Some((index, &count)) = progress.iter().enumerate().find(|&(_, &c)| c != offset) {
            tracing::warn!(
                offset,
                index,
                count,
                "Result logs out of lockstep; resuming from configuration 0"
            );
        }

        Ok(offset)
    }
}
