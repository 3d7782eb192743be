//! # Indexed-Window Batcher

use std::sync::Arc;

use rand::{rngs::StdRng, seq::SliceRandom};

use crate::{
    batching::{Batch, BatchAccumulator, BatcherStats, batcher_rng},
    corpus::Corpus,
    encoders::SequenceEncoder,
    errors::RBResult,
    options::{BatcherOptions, SequenceOptions},
    types::{ContextType, TokenType},
    vocab::TextVocab,
    windows::{WindowEntry, WindowIndex},
};

/// An endless batch generator over a precomputed [`WindowIndex`].
///
/// Each epoch shuffles the flat entry list; each entry's prefix and target
/// are sliced directly from its document, with no per-document re-encoding.
///
/// The iterator never returns `None`.
#[derive(Debug)]
pub struct WindowBatcher<T = u32, C = ()>
where
    T: TokenType,
    C: ContextType,
{
    corpus: Arc<Corpus<C>>,
    vocab: Arc<TextVocab<T>>,
    sequence_options: SequenceOptions,
    accumulator: BatchAccumulator<T, C>,
    rng: StdRng,

    entries: Vec<WindowEntry>,
    cursor: usize,
}

impl<T, C> WindowBatcher<T, C>
where
    T: TokenType,
    C: ContextType,
{
    /// Create a new batcher.
    ///
    /// The window entries are checked against the corpus once, here.
    ///
    /// ## Arguments
    /// * `corpus` - The documents, and optional context labels.
    /// * `windows` - The window entries to replay each epoch.
    /// * `vocab` - The shared vocabulary.
    /// * `sequence_options` - The sequence options.
    /// * `options` - The batcher options.
    pub fn new(
        corpus: Arc<Corpus<C>>,
        windows: WindowIndex,
        vocab: Arc<TextVocab<T>>,
        sequence_options: &SequenceOptions,
        options: BatcherOptions,
    ) -> RBResult<Self> {
        sequence_options.validate()?;
        options.validate()?;
        windows.validate(&corpus, sequence_options)?;

        let accumulator = BatchAccumulator::new(
            SequenceEncoder::new(vocab.clone(), sequence_options),
            options,
            corpus.has_context(),
        );

        let mut batcher = Self {
            corpus,
            vocab,
            sequence_options: *sequence_options,
            accumulator,
            rng: batcher_rng(options.seed()),
            entries: windows.into_entries(),
            cursor: 0,
        };
        batcher.start_epoch();
        Ok(batcher)
    }

    /// Create a batcher over every window of the corpus.
    pub fn for_corpus(
        corpus: Arc<Corpus<C>>,
        vocab: Arc<TextVocab<T>>,
        sequence_options: &SequenceOptions,
        options: BatcherOptions,
    ) -> RBResult<Self> {
        let windows = WindowIndex::build(&corpus, sequence_options);
        Self::new(corpus, windows, vocab, sequence_options, options)
    }

    /// The corpus.
    pub fn corpus(&self) -> &Arc<Corpus<C>> {
        &self.corpus
    }

    /// The number of window entries per epoch.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Are there no window entries?
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The running statistics.
    pub fn stats(&self) -> &BatcherStats {
        self.accumulator.stats()
    }

    /// Reshuffle the entries, and rewind.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    fn start_epoch(&mut self) {
        self.entries.shuffle(&mut self.rng);
        self.cursor = 0;
        log::debug!(
            "window batcher epoch {}: {} entries",
            self.stats().current.epoch,
            self.entries.len()
        );
    }

    /// Produce the next batch.
    ///
    /// Full batches are emitted mid-epoch; the epoch's remainder is emitted
    /// when the last entry is consumed, and the next epoch begins.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub fn next_batch(&mut self) -> Batch<T, C> {
        let max_length = self.sequence_options.max_length();
        let wrapped = self.sequence_options.wraps_documents();

        loop {
            while let Some(&entry) = self.entries.get(self.cursor) {
                self.cursor += 1;

                let Some(document) = self.corpus.document(entry.document) else {
                    continue;
                };
                let view = document.view(self.vocab.meta_token(), wrapped);

                // Validated entries always have a next token.
                let Some(target) = view.get(entry.end_offset + 1) else {
                    log::warn!("window entry {entry:?} has no next token");
                    continue;
                };
                let start = entry.end_offset.saturating_sub(max_length);
                let prefix = view.collect_range(start..=entry.end_offset);

                let context = self.corpus.context_label(entry.document);
                self.accumulator.add(&prefix, target, context);
                if let Some(batch) = self.accumulator.maybe_flush() {
                    return batch;
                }
            }

            let remainder = self.accumulator.flush_remainder();
            self.start_epoch();
            if let Some(batch) = remainder {
                return batch;
            }
        }
    }
}

impl<T, C> Iterator for WindowBatcher<T, C>
where
    T: TokenType,
    C: ContextType,
{
    type Item = Batch<T, C>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_batch())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{corpus::Document, errors::RnnBatchError};

    fn abc_vocab() -> Arc<TextVocab<u32>> {
        Arc::new(
            TextVocab::from_pairs([("a", 1), ("b", 2), ("c", 3), ("<s>", 4)]).unwrap(),
        )
    }

    #[test]
    fn test_window_prefixes() {
        let corpus = Arc::new(Corpus::new(vec![Document::from_chars("abcab")]));
        let windows: WindowIndex = [(0usize, 0usize), (0, 2), (0, 5)].into_iter().collect();
        let mut batcher = WindowBatcher::new(
            corpus,
            windows,
            abc_vocab(),
            &SequenceOptions::new(2),
            BatcherOptions::new(8).with_seed(1u64),
        )
        .unwrap();

        let batch = batcher.next_batch();
        assert_eq!(batch.rows(), 3);

        let mut rows: Vec<(Vec<u32>, usize)> = batch
            .inputs
            .rows()
            .into_iter()
            .map(|r| r.to_vec())
            .zip(batch.target_ids())
            .collect();
        rows.sort();

        // Wrapped: [<s>, a, b, c, a, b, <s>].
        // (0, 0): [<s>] -> a
        // (0, 2): [<s>, a, b] truncated to [a, b] -> c
        // (0, 5): [c, a, b] truncated to [a, b] -> <s>
        assert_eq!(
            rows,
            vec![(vec![0, 4], 1), (vec![1, 2], 3), (vec![1, 2], 4)]
        );
    }

    #[test]
    fn test_single_text_windows() {
        let corpus = Arc::new(Corpus::new(vec![Document::from_chars("abc")]));
        let options = SequenceOptions::new(4).with_single_text(true);
        let mut batcher = WindowBatcher::for_corpus(
            corpus,
            abc_vocab(),
            &options,
            BatcherOptions::new(8).with_seed(2u64),
        )
        .unwrap();
        assert_eq!(batcher.len(), 2);

        let batch = batcher.next_batch();
        let mut targets = batch.target_ids();
        targets.sort();
        assert_eq!(targets, vec![2, 3]);
    }

    #[test]
    fn test_context_labels_follow_documents() {
        let corpus = Corpus::new(vec![Document::from_chars("ab"), Document::from_chars("c")])
            .with_context_labels(vec![10u8, 20u8])
            .unwrap();
        let mut batcher = WindowBatcher::for_corpus(
            Arc::new(corpus),
            abc_vocab(),
            &SequenceOptions::new(3),
            BatcherOptions::new(100).with_seed(9u64),
        )
        .unwrap();

        let batch = batcher.next_batch();
        let context = batch.context.clone().unwrap();
        assert_eq!(context.len(), batch.rows());
        assert_eq!(batch.rows(), 3 + 2);
        assert_eq!(context.iter().filter(|&&c| c == 10).count(), 3);
        assert_eq!(context.iter().filter(|&&c| c == 20).count(), 2);
    }

    #[test]
    fn test_invalid_windows_rejected() {
        let corpus = Arc::new(Corpus::new(vec![Document::from_chars("ab")]));
        let windows: WindowIndex = [(0usize, 3usize)].into_iter().collect();
        let result = WindowBatcher::new(
            corpus,
            windows,
            abc_vocab(),
            &SequenceOptions::new(2),
            BatcherOptions::default(),
        );
        assert!(matches!(
            result,
            Err(RnnBatchError::WindowOutOfBounds { .. })
        ));
    }
}
