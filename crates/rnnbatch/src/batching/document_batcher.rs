//! # Per-Document Batcher

use std::{sync::Arc, vec};

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::{
    batching::{Batch, BatchAccumulator, BatcherStats},
    corpus::Corpus,
    encoders::{SequenceEncoder, SlidingWindowEncoder, TrainingEncoder, TrainingExample},
    errors::RBResult,
    options::{BatcherOptions, SequenceOptions},
    types::{ContextType, TokenType},
    vocab::TextVocab,
};

/// Build a generator's random source.
///
/// A fixed seed gives a reproducible batch stream; `None` seeds from OS entropy.
pub fn batcher_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// The document whose examples are being streamed.
#[derive(Debug)]
struct ActiveDocument {
    document: usize,
    examples: vec::IntoIter<TrainingExample>,
}

/// An endless batch generator that streams whole documents.
///
/// Each epoch visits the documents in a fresh random order; each document's
/// examples come from a [`TrainingEncoder`], and are streamed in a fresh random
/// order of their own, completing before the next document begins.
///
/// The iterator never returns `None`.
#[derive(Debug)]
pub struct DocumentBatcher<T = u32, C = (), E = SlidingWindowEncoder>
where
    T: TokenType,
    C: ContextType,
    E: TrainingEncoder,
{
    corpus: Arc<Corpus<C>>,
    encoder: E,
    accumulator: BatchAccumulator<T, C>,
    rng: StdRng,

    document_order: Vec<usize>,
    document_cursor: usize,
    active: Option<ActiveDocument>,
}

impl<T, C> DocumentBatcher<T, C, SlidingWindowEncoder>
where
    T: TokenType,
    C: ContextType,
{
    /// Create a batcher using the default [`SlidingWindowEncoder`].
    pub fn with_sliding_windows(
        corpus: Arc<Corpus<C>>,
        vocab: Arc<TextVocab<T>>,
        sequence_options: &SequenceOptions,
        options: BatcherOptions,
    ) -> RBResult<Self> {
        let encoder = SlidingWindowEncoder::for_vocab(*sequence_options, &vocab);
        Self::new(corpus, encoder, vocab, sequence_options, options)
    }
}

impl<T, C, E> DocumentBatcher<T, C, E>
where
    T: TokenType,
    C: ContextType,
    E: TrainingEncoder,
{
    /// Create a new batcher.
    ///
    /// ## Arguments
    /// * `corpus` - The documents, and optional context labels.
    /// * `encoder` - Derives each document's training examples.
    /// * `vocab` - The shared vocabulary.
    /// * `sequence_options` - The sequence options.
    /// * `options` - The batcher options.
    pub fn new(
        corpus: Arc<Corpus<C>>,
        encoder: E,
        vocab: Arc<TextVocab<T>>,
        sequence_options: &SequenceOptions,
        options: BatcherOptions,
    ) -> RBResult<Self> {
        sequence_options.validate()?;
        options.validate()?;

        let accumulator = BatchAccumulator::new(
            SequenceEncoder::new(vocab, sequence_options),
            options,
            corpus.has_context(),
        );

        let mut batcher = Self {
            document_order: (0..corpus.len()).collect(),
            corpus,
            encoder,
            accumulator,
            rng: batcher_rng(options.seed()),
            document_cursor: 0,
            active: None,
        };
        batcher.start_epoch();
        Ok(batcher)
    }

    /// The corpus.
    pub fn corpus(&self) -> &Arc<Corpus<C>> {
        &self.corpus
    }

    /// The running statistics.
    pub fn stats(&self) -> &BatcherStats {
        self.accumulator.stats()
    }

    /// Reshuffle the document order, and rewind.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    fn start_epoch(&mut self) {
        self.document_order.shuffle(&mut self.rng);
        self.document_cursor = 0;
        self.active = None;
        log::debug!(
            "document batcher epoch {}: {} documents",
            self.stats().current.epoch,
            self.document_order.len()
        );
    }

    /// Advance to the next example of this epoch, loading documents as needed.
    fn next_example(&mut self) -> Option<(usize, TrainingExample)> {
        loop {
            if let Some(active) = &mut self.active
                && let Some(example) = active.examples.next()
            {
                return Some((active.document, example));
            }

            let &document = self.document_order.get(self.document_cursor)?;
            self.document_cursor += 1;

            let mut examples = self
                .corpus
                .document(document)
                .map(|doc| self.encoder.encode_training(doc))
                .unwrap_or_default();
            examples.shuffle(&mut self.rng);

            self.active = Some(ActiveDocument {
                document,
                examples: examples.into_iter(),
            });
        }
    }

    /// Produce the next batch.
    ///
    /// Full batches are emitted mid-epoch; the epoch's remainder is emitted
    /// when its last document is exhausted, and the next epoch begins.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub fn next_batch(&mut self) -> Batch<T, C> {
        loop {
            while let Some((document, example)) = self.next_example() {
                let context = self.corpus.context_label(document);
                self.accumulator.add(&example.prefix, &example.target, context);
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

impl<T, C, E> Iterator for DocumentBatcher<T, C, E>
where
    T: TokenType,
    C: ContextType,
    E: TrainingEncoder,
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
    use crate::corpus::Document;

    fn abc_vocab() -> Arc<TextVocab<u32>> {
        Arc::new(TextVocab::from_pairs([("a", 1), ("b", 2), ("c", 3)]).unwrap())
    }

    #[test]
    fn test_abc_scenario() {
        let corpus = Arc::new(Corpus::new(vec![Document::from_chars("abc")]));
        let options = BatcherOptions::new(2).with_seed(11u64);
        let mut batcher = DocumentBatcher::with_sliding_windows(
            corpus,
            abc_vocab(),
            &SequenceOptions::new(3),
            options,
        )
        .unwrap();

        // "<s>abc<s>" has 4 examples; the meta token is not in the vocabulary,
        // so "c -> <s>" is dropped, leaving 3 rows: one full batch and a remainder.
        let first = batcher.next_batch();
        let second = batcher.next_batch();
        assert_eq!(first.rows(), 2);
        assert_eq!(second.rows(), 1);
        assert_eq!(first.epoch, 0);
        assert_eq!(second.epoch, 0);

        let mut rows: Vec<(Vec<u32>, usize)> = first
            .inputs
            .rows()
            .into_iter()
            .chain(second.inputs.rows())
            .map(|r| r.to_vec())
            .zip(first.target_ids().into_iter().chain(second.target_ids()))
            .collect();
        rows.sort();
        assert_eq!(
            rows,
            vec![
                (vec![0, 0, 0], 1),
                (vec![0, 0, 1], 2),
                (vec![0, 1, 2], 3),
            ]
        );

        let stats = batcher.stats().last_epoch.unwrap();
        assert_eq!(stats.examples, 4);
        assert_eq!(stats.skipped, 1);

        assert_eq!(batcher.next_batch().epoch, 1);
    }

    #[test]
    fn test_custom_encoder() {
        let corpus = Arc::new(Corpus::new(vec![
            Document::from_chars("ab"),
            Document::from_chars("bc"),
        ]));
        let encoder = |doc: &Document| -> Vec<TrainingExample> {
            doc.tokens()
                .windows(2)
                .map(|w| TrainingExample::new([&w[0]], &w[1]))
                .collect()
        };
        let mut batcher: DocumentBatcher<u32, (), _> = DocumentBatcher::new(
            corpus,
            encoder,
            abc_vocab(),
            &SequenceOptions::new(2),
            BatcherOptions::new(8).with_seed(5u64),
        )
        .unwrap();

        let batch = batcher.next_batch();
        assert_eq!(batch.rows(), 2);
        let mut targets = batch.target_ids();
        targets.sort();
        assert_eq!(targets, vec![2, 3]);
    }

    #[test]
    fn test_empty_corpus_yields_empty_batches() {
        let corpus = Arc::new(Corpus::new(vec![]));
        let mut batcher = DocumentBatcher::with_sliding_windows(
            corpus,
            abc_vocab(),
            &SequenceOptions::new(3),
            BatcherOptions::new(4).with_emit_empty_remainder(false),
        )
        .unwrap();

        for epoch in 0..3 {
            let batch = batcher.next_batch();
            assert!(batch.is_empty());
            assert_eq!(batch.inputs.dim(), (0, 3));
            assert_eq!(batch.epoch, epoch);
        }
    }

    #[test]
    fn test_invalid_options() {
        let corpus = Arc::new(Corpus::new(vec![Document::from_chars("a")]));
        assert!(
            DocumentBatcher::with_sliding_windows(
                corpus.clone(),
                abc_vocab(),
                &SequenceOptions::new(0),
                BatcherOptions::default(),
            )
            .is_err()
        );
        assert!(
            DocumentBatcher::with_sliding_windows(
                corpus,
                abc_vocab(),
                &SequenceOptions::new(3),
                BatcherOptions::new(0),
            )
            .is_err()
        );
    }
}
