//! # Sequence Encoder

use std::sync::Arc;

use ndarray::{Array1, ArrayViewMut1};

use crate::{options::SequenceOptions, types::TokenType, vocab::TextVocab};

/// Encodes token prefixes into fixed-width id rows.
///
/// Ids are right-aligned: short prefixes are left-padded with `0`,
/// long prefixes keep their trailing `max_length` ids.
#[derive(Debug, Clone)]
pub struct SequenceEncoder<T: TokenType> {
    vocab: Arc<TextVocab<T>>,
    max_length: usize,
}

impl<T: TokenType> SequenceEncoder<T> {
    /// Create a new encoder.
    ///
    /// ## Arguments
    /// * `vocab` - The shared vocabulary.
    /// * `options` - The sequence options; only `max_length` is used.
    pub fn new(
        vocab: Arc<TextVocab<T>>,
        options: &SequenceOptions,
    ) -> Self {
        Self {
            vocab,
            max_length: options.max_length(),
        }
    }

    /// The row width.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// The shared vocabulary.
    pub fn vocab(&self) -> &Arc<TextVocab<T>> {
        &self.vocab
    }

    /// The one-hot target width.
    pub fn num_classes(&self) -> usize {
        self.vocab.num_classes()
    }

    /// Encode a prefix into `row`, overwriting it.
    ///
    /// Tokens are visited from the right, so only the kept tail is looked up.
    ///
    /// ## Arguments
    /// * `prefix` - The ordered prefix tokens.
    /// * `row` - The target row; must have `max_length` slots.
    pub fn encode_into<S: AsRef<str>>(
        &self,
        prefix: &[S],
        mut row: ArrayViewMut1<T>,
    ) {
        debug_assert_eq!(row.len(), self.max_length);
        row.fill(T::zero());

        let mut pos = row.len();
        for token in prefix.iter().rev() {
            if pos == 0 {
                break;
            }
            if let Some(id) = self.vocab.encode_token(token.as_ref()) {
                pos -= 1;
                row[pos] = id;
            }
        }
    }

    /// Encode a prefix into a new row.
    pub fn encode_row<S: AsRef<str>>(
        &self,
        prefix: &[S],
    ) -> Array1<T> {
        let mut row = Array1::zeros(self.max_length);
        self.encode_into(prefix, row.view_mut());
        row
    }

    /// The one-hot column of a target token.
    ///
    /// ## Returns
    /// `None` if the target is not in the vocabulary.
    pub fn target_index(
        &self,
        target: &str,
    ) -> Option<usize> {
        self.vocab.lookup(target).and_then(|id| id.to_usize())
    }

    /// One-hot encode a target token into `row`, overwriting it.
    ///
    /// ## Returns
    /// `false`, leaving `row` untouched, if the target is not in the vocabulary.
    pub fn one_hot_into(
        &self,
        target: &str,
        mut row: ArrayViewMut1<f32>,
    ) -> bool {
        debug_assert_eq!(row.len(), self.num_classes());
        let Some(idx) = self.target_index(target) else {
            return false;
        };
        row.fill(0.0);
        row[idx] = 1.0;
        true
    }
}
