//! # Batch Accumulator

use ndarray::{Array2, s};

use crate::{
    batching::{Batch, BatcherStats},
    encoders::SequenceEncoder,
    options::BatcherOptions,
    types::{ContextType, TokenType},
};

/// Buffers encoded examples and cuts them into batches.
///
/// The row count tracks buffered rows only, and resets on every flush;
/// skipped examples never count toward a batch.
#[derive(Debug, Clone)]
pub struct BatchAccumulator<T: TokenType, C: ContextType = ()> {
    encoder: SequenceEncoder<T>,
    options: BatcherOptions,
    with_context: bool,

    inputs: Array2<T>,
    targets: Array2<f32>,
    context: Vec<C>,
    rows: usize,

    stats: BatcherStats,
}

impl<T: TokenType, C: ContextType> BatchAccumulator<T, C> {
    /// Create a new accumulator.
    ///
    /// ## Arguments
    /// * `encoder` - The sequence encoder.
    /// * `options` - The batcher options; `batch_size` must be > 0.
    /// * `with_context` - Are context labels collected?
    pub fn new(
        encoder: SequenceEncoder<T>,
        options: BatcherOptions,
        with_context: bool,
    ) -> Self {
        let batch_size = options.batch_size();
        let inputs = Array2::zeros((batch_size, encoder.max_length()));
        let targets = Array2::zeros((batch_size, encoder.num_classes()));
        Self {
            encoder,
            options,
            with_context,
            inputs,
            targets,
            context: Vec::with_capacity(if with_context { batch_size } else { 0 }),
            rows: 0,
            stats: BatcherStats::default(),
        }
    }

    /// The sequence encoder.
    pub fn encoder(&self) -> &SequenceEncoder<T> {
        &self.encoder
    }

    /// The number of buffered rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Are there no buffered rows?
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Have the buffered rows reached `batch_size`?
    pub fn is_full(&self) -> bool {
        self.rows >= self.options.batch_size()
    }

    /// The running statistics.
    pub fn stats(&self) -> &BatcherStats {
        &self.stats
    }

    /// Encode and buffer one example.
    ///
    /// ## Arguments
    /// * `prefix` - The ordered prefix tokens.
    /// * `target` - The next token.
    /// * `context` - The document's context label; used only when collecting context.
    ///
    /// ## Returns
    /// `false` if the example was skipped, for an out-of-vocabulary target
    /// or a missing context label.
    pub fn add<S: AsRef<str>>(
        &mut self,
        prefix: &[S],
        target: &str,
        context: Option<&C>,
    ) -> bool {
        debug_assert!(!self.is_full(), "add() on a full accumulator");
        self.stats.current.examples += 1;

        // Rows past `self.rows` are scratch space until committed.
        let row = self.rows;
        if !self.encoder.one_hot_into(target, self.targets.row_mut(row)) {
            self.stats.current.skipped += 1;
            log::trace!("skipping out-of-vocabulary target {target:?}");
            return false;
        }

        if self.with_context {
            match context {
                Some(label) => self.context.push(label.clone()),
                None => {
                    self.stats.current.skipped += 1;
                    log::warn!("skipping example without a context label");
                    return false;
                }
            }
        }

        self.encoder.encode_into(prefix, self.inputs.row_mut(row));

        self.rows += 1;
        self.stats.current.rows += 1;
        true
    }

    /// Emit a batch if the buffered rows reached `batch_size`.
    pub fn maybe_flush(&mut self) -> Option<Batch<T, C>> {
        if self.is_full() {
            Some(self.take())
        } else {
            None
        }
    }

    /// Emit whatever is buffered at the end of an epoch, and begin the next epoch.
    ///
    /// The remainder may be smaller than `batch_size`, or empty.
    /// Empty remainders are suppressed when `emit_empty_remainder` is off,
    /// unless the whole epoch produced no rows.
    pub fn flush_remainder(&mut self) -> Option<Batch<T, C>> {
        let epoch_rows = self.stats.current.rows;
        let emit = !self.is_empty() || self.options.emit_empty_remainder || epoch_rows == 0;
        let remainder = if emit { Some(self.take()) } else { None };

        let finished = self.stats.current;
        log::debug!(
            "epoch {} done: {} examples, {} skipped, {} rows, {} batches",
            finished.epoch,
            finished.examples,
            finished.skipped,
            finished.rows,
            finished.batches,
        );
        self.stats.finish_epoch();

        remainder
    }

    /// Package the buffered rows into a batch, and reset the buffers.
    fn take(&mut self) -> Batch<T, C> {
        let rows = self.rows;
        let batch = Batch {
            inputs: self.inputs.slice(s![..rows, ..]).to_owned(),
            targets: self.targets.slice(s![..rows, ..]).to_owned(),
            context: if self.with_context {
                Some(core::mem::take(&mut self.context))
            } else {
                None
            },
            epoch: self.stats.current.epoch,
        };
        self.rows = 0;
        self.stats.record_batch();
        batch
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ndarray::array;

    use super::*;
    use crate::{options::SequenceOptions, vocab::TextVocab};

    fn accumulator<C: ContextType>(
        batch_size: usize,
        with_context: bool,
    ) -> BatchAccumulator<u32, C> {
        let vocab = TextVocab::from_pairs([("a", 1), ("b", 2), ("c", 3)]).unwrap();
        let encoder = SequenceEncoder::new(Arc::new(vocab), &SequenceOptions::new(3));
        BatchAccumulator::new(encoder, BatcherOptions::new(batch_size), with_context)
    }

    #[test]
    fn test_flush_at_batch_size() {
        let mut acc = accumulator::<()>(2, false);

        assert!(acc.add(&["a"], "b", None));
        assert!(acc.maybe_flush().is_none());
        assert!(acc.add(&["a", "b"], "c", None));

        let batch = acc.maybe_flush().unwrap();
        assert_eq!(batch.inputs, array![[0, 0, 1], [0, 1, 2]]);
        assert_eq!(
            batch.targets,
            array![[0.0, 0.0, 1.0, 0.0], [0.0, 0.0, 0.0, 1.0]]
        );
        assert_eq!(batch.context, None);
        assert!(acc.is_empty());
        assert_eq!(acc.stats().total_batches, 1);
    }

    #[test]
    fn test_oov_target_skipped() {
        let mut acc = accumulator::<()>(2, false);

        assert!(!acc.add(&["a"], "<s>", None));
        assert!(acc.is_empty());
        assert!(acc.add(&["a"], "a", None));
        assert!(!acc.add(&["b"], "?", None));
        assert!(acc.add(&["b"], "a", None));

        let batch = acc.maybe_flush().unwrap();
        assert_eq!(batch.rows(), 2);
        assert_eq!(batch.target_ids(), vec![1, 1]);

        let stats = acc.stats().current;
        assert_eq!(stats.examples, 4);
        assert_eq!(stats.skipped, 2);
        assert_eq!(stats.rows, 2);
    }

    #[test]
    fn test_skipped_rows_are_overwritten() {
        let mut acc = accumulator::<&str>(2, true);

        // One-hot written, then dropped for the missing label.
        assert!(!acc.add(&["a"], "c", None));
        assert!(acc.add(&["b"], "a", Some(&"x")));
        assert!(!acc.add(&["c"], "?", Some(&"y")));
        assert!(acc.add(&["c"], "b", Some(&"z")));

        let batch = acc.maybe_flush().unwrap();
        assert_eq!(batch.inputs, array![[0, 0, 2], [0, 0, 3]]);
        assert_eq!(
            batch.targets,
            array![[0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0]]
        );
        assert_eq!(batch.context, Some(vec!["x", "z"]));
        assert_eq!(acc.stats().current.skipped, 2);
    }

    #[test]
    fn test_context_alignment() {
        let mut acc = accumulator::<&str>(3, true);
        acc.add(&["a"], "b", Some(&"x"));
        acc.add(&["a"], "?", Some(&"y"));
        acc.add(&["b"], "c", Some(&"z"));

        let batch = acc.flush_remainder().unwrap();
        assert_eq!(batch.rows(), 2);
        assert_eq!(batch.context, Some(vec!["x", "z"]));
    }

    #[test]
    fn test_remainder() {
        let mut acc = accumulator::<()>(4, false);
        acc.add(&["a"], "b", None);

        let batch = acc.flush_remainder().unwrap();
        assert_eq!(batch.inputs.dim(), (1, 3));
        assert_eq!(batch.targets.dim(), (1, 4));
        assert_eq!(batch.epoch, 0);
        assert_eq!(acc.stats().current.epoch, 1);

        // An empty epoch still emits a zero-row remainder.
        let batch = acc.flush_remainder().unwrap();
        assert_eq!(batch.inputs.dim(), (0, 3));
        assert_eq!(batch.epoch, 1);
    }

    #[test]
    fn test_suppressed_empty_remainder() {
        let vocab = TextVocab::from_pairs([("a", 1u32)]).unwrap();
        let encoder = SequenceEncoder::new(Arc::new(vocab), &SequenceOptions::new(2));
        let options = BatcherOptions::new(1).with_emit_empty_remainder(false);
        let mut acc: BatchAccumulator<u32> = BatchAccumulator::new(encoder, options, false);

        acc.add(&["a"], "a", None);
        assert!(acc.maybe_flush().is_some());
        assert!(acc.flush_remainder().is_none());

        // Nothing at all this epoch; the empty remainder is still emitted.
        assert!(acc.flush_remainder().is_some_and(|b| b.is_empty()));
    }
}
