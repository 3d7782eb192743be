//! # Batch Streams

use std::{fmt, str::FromStr, sync::Arc};

use crate::{
    batching::{Batch, BatcherStats, DocumentBatcher, WindowBatcher},
    corpus::Corpus,
    encoders::{SlidingWindowEncoder, TrainingEncoder},
    errors::RBResult,
    options::{BatcherOptions, SequenceOptions},
    types::{ContextType, TokenType},
    vocab::TextVocab,
};

/// Which generator a [`BatchStream`] uses.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum BatchStrategy {
    /// Re-encode each document every epoch; see [`DocumentBatcher`].
    Documents,

    /// Replay a precomputed window index; see [`WindowBatcher`].
    ///
    /// Preferred for one long continuous text, or for very many documents.
    #[default]
    Windows,
}

impl fmt::Display for BatchStrategy {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            BatchStrategy::Documents => write!(f, "documents"),
            BatchStrategy::Windows => write!(f, "windows"),
        }
    }
}

impl FromStr for BatchStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "documents" => Ok(BatchStrategy::Documents),
            "windows" => Ok(BatchStrategy::Windows),
            _ => Err(format!("unknown batch strategy: {s:?}")),
        }
    }
}

/// A caller-selected endless batch generator.
#[derive(Debug)]
pub enum BatchStream<T = u32, C = (), E = SlidingWindowEncoder>
where
    T: TokenType,
    C: ContextType,
    E: TrainingEncoder,
{
    /// A per-document generator.
    Documents(DocumentBatcher<T, C, E>),

    /// An indexed-window generator.
    Windows(WindowBatcher<T, C>),
}

impl<T, C> BatchStream<T, C, SlidingWindowEncoder>
where
    T: TokenType,
    C: ContextType,
{
    /// Build a stream over `corpus` with the default encoders.
    ///
    /// [`BatchStrategy::Windows`] indexes every window of the corpus.
    pub fn new(
        strategy: BatchStrategy,
        corpus: Arc<Corpus<C>>,
        vocab: Arc<TextVocab<T>>,
        sequence_options: &SequenceOptions,
        options: BatcherOptions,
    ) -> RBResult<Self> {
        Ok(match strategy {
            BatchStrategy::Documents => BatchStream::Documents(
                DocumentBatcher::with_sliding_windows(corpus, vocab, sequence_options, options)?,
            ),
            BatchStrategy::Windows => BatchStream::Windows(WindowBatcher::for_corpus(
                corpus,
                vocab,
                sequence_options,
                options,
            )?),
        })
    }
}

impl<T, C, E> BatchStream<T, C, E>
where
    T: TokenType,
    C: ContextType,
    E: TrainingEncoder,
{
    /// The strategy in use.
    pub fn strategy(&self) -> BatchStrategy {
        match self {
            BatchStream::Documents(_) => BatchStrategy::Documents,
            BatchStream::Windows(_) => BatchStrategy::Windows,
        }
    }

    /// The running statistics.
    pub fn stats(&self) -> &BatcherStats {
        match self {
            BatchStream::Documents(batcher) => batcher.stats(),
            BatchStream::Windows(batcher) => batcher.stats(),
        }
    }

    /// Produce the next batch.
    pub fn next_batch(&mut self) -> Batch<T, C> {
        match self {
            BatchStream::Documents(batcher) => batcher.next_batch(),
            BatchStream::Windows(batcher) => batcher.next_batch(),
        }
    }
}

impl<T, C, E> Iterator for BatchStream<T, C, E>
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

    #[test]
    fn test_strategy_names() {
        for strategy in [BatchStrategy::Documents, BatchStrategy::Windows] {
            assert_eq!(strategy.to_string().parse::<BatchStrategy>(), Ok(strategy));
        }
        assert!("chunks".parse::<BatchStrategy>().is_err());
        assert_eq!(BatchStrategy::default(), BatchStrategy::Windows);
    }

    #[test]
    fn test_strategies_cover_same_examples() {
        let corpus = Arc::new(Corpus::new(vec![
            Document::from_chars("hello"),
            Document::from_chars("world"),
        ]));
        let vocab: Arc<TextVocab<u32>> = Arc::new(
            TextVocab::from_tokens(["<s>", "h", "e", "l", "o", "w", "r", "d"]).unwrap(),
        );
        let sequence_options = SequenceOptions::new(3);
        let options = BatcherOptions::new(1000).with_seed(4u64);

        let mut all = Vec::new();
        for strategy in [BatchStrategy::Documents, BatchStrategy::Windows] {
            let mut stream = BatchStream::new(
                strategy,
                corpus.clone(),
                vocab.clone(),
                &sequence_options,
                options,
            )
            .unwrap();
            assert_eq!(stream.strategy(), strategy);

            let batch = stream.next_batch();
            let mut rows: Vec<(Vec<u32>, usize)> = batch
                .inputs
                .rows()
                .into_iter()
                .map(|r| r.to_vec())
                .zip(batch.target_ids())
                .collect();
            rows.sort();
            all.push(rows);
        }
        assert_eq!(all[0].len(), 12);
        assert_eq!(all[0], all[1]);
    }
}
