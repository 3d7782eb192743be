//! # Training Example Encoders

use compact_str::CompactString;

use crate::{corpus::Document, options::SequenceOptions, types::TokenType, vocab::TextVocab};

/// One `(prefix, next token)` training example.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingExample {
    /// The ordered tokens preceding the target.
    pub prefix: Vec<CompactString>,

    /// The token to predict.
    pub target: CompactString,
}

impl TrainingExample {
    /// Create a new example.
    pub fn new<I, S>(
        prefix: I,
        target: &str,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            prefix: prefix
                .into_iter()
                .map(|t| CompactString::from(t.as_ref()))
                .collect(),
            target: target.into(),
        }
    }
}

/// Derives every training example contained in one document.
pub trait TrainingEncoder: Send + Sync {
    /// Encode one document into its training examples, in left-to-right order.
    fn encode_training(
        &self,
        document: &Document,
    ) -> Vec<TrainingExample>;
}

impl<F> TrainingEncoder for F
where
    F: Fn(&Document) -> Vec<TrainingExample> + Send + Sync,
{
    fn encode_training(
        &self,
        document: &Document,
    ) -> Vec<TrainingExample> {
        self(document)
    }
}

/// The default [`TrainingEncoder`]: a sliding window over each document.
///
/// Documents are wrapped in meta tokens unless `single_text` is set.
/// Every token after the first becomes a target, with the up to
/// `max_length` tokens before it as its prefix.
#[derive(Debug, Clone)]
pub struct SlidingWindowEncoder {
    options: SequenceOptions,
    meta_token: CompactString,
}

impl SlidingWindowEncoder {
    /// Create a new encoder.
    pub fn new<S: AsRef<str>>(
        options: SequenceOptions,
        meta_token: S,
    ) -> Self {
        Self {
            options,
            meta_token: meta_token.as_ref().into(),
        }
    }

    /// Create a new encoder using the vocabulary's meta token.
    pub fn for_vocab<T: TokenType>(
        options: SequenceOptions,
        vocab: &TextVocab<T>,
    ) -> Self {
        Self::new(options, vocab.meta_token())
    }

    /// The number of examples [`encode_training`](TrainingEncoder::encode_training)
    /// yields for `document`.
    pub fn example_count(
        &self,
        document: &Document,
    ) -> usize {
        document
            .view(&self.meta_token, self.options.wraps_documents())
            .len()
            .saturating_sub(1)
    }
}

impl TrainingEncoder for SlidingWindowEncoder {
    fn encode_training(
        &self,
        document: &Document,
    ) -> Vec<TrainingExample> {
        let view = document.view(&self.meta_token, self.options.wraps_documents());
        let max_length = self.options.max_length();

        (0..self.example_count(document))
            .filter_map(|end| {
                let target = view.get(end + 1)?;
                let start = (end + 1).saturating_sub(max_length);
                Some(TrainingExample::new(view.collect_range(start..=end), target))
            })
            .collect()
    }
}
