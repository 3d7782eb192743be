//! # Batcher Statistics

/// Counters for one epoch (one shuffled pass over the corpus).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EpochStats {
    /// The epoch number, from `0`.
    pub epoch: usize,

    /// Examples streamed, before the target vocabulary check.
    pub examples: usize,

    /// Examples skipped for an out-of-vocabulary target.
    pub skipped: usize,

    /// Rows placed into batches.
    pub rows: usize,

    /// Batches emitted.
    pub batches: usize,
}

/// Running counters for a batch generator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatcherStats {
    /// The epoch in progress.
    pub current: EpochStats,

    /// The most recently completed epoch, if any.
    pub last_epoch: Option<EpochStats>,

    /// Batches emitted over all epochs.
    pub total_batches: usize,
}

impl BatcherStats {
    /// Close the current epoch and begin the next.
    pub(crate) fn finish_epoch(&mut self) {
        let finished = self.current;
        self.last_epoch = Some(finished);
        self.current = EpochStats {
            epoch: finished.epoch + 1,
            ..Default::default()
        };
    }

    pub(crate) fn record_batch(&mut self) {
        self.current.batches += 1;
        self.total_batches += 1;
    }
}
