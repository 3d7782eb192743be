//! # Window Index
//!
//! A flat list of `(document, end_offset)` entries, one per training
//! example, over the (possibly meta-wrapped) documents of a corpus.

use rand::{Rng, seq::SliceRandom};

use crate::{
    corpus::Corpus,
    errors::{RBResult, RnnBatchError},
    options::SequenceOptions,
    types::ContextType,
};

/// The right boundary of one training example.
///
/// The example's target is the token at `end_offset + 1`
/// of document `document`'s (possibly wrapped) view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowEntry {
    /// The document index.
    pub document: usize,

    /// The inclusive end offset of the prefix.
    pub end_offset: usize,
}

impl WindowEntry {
    /// Create a new entry.
    pub fn new(
        document: usize,
        end_offset: usize,
    ) -> Self {
        Self {
            document,
            end_offset,
        }
    }
}

impl From<(usize, usize)> for WindowEntry {
    fn from((document, end_offset): (usize, usize)) -> Self {
        Self::new(document, end_offset)
    }
}

/// The length of a document view under `options`.
fn view_len(
    doc_len: usize,
    options: &SequenceOptions,
) -> usize {
    if options.wraps_documents() {
        doc_len + 2
    } else {
        doc_len
    }
}

/// A flat, ordered list of [`WindowEntry`]s spanning a corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowIndex {
    entries: Vec<WindowEntry>,
}

impl From<Vec<WindowEntry>> for WindowIndex {
    fn from(entries: Vec<WindowEntry>) -> Self {
        Self { entries }
    }
}

impl<E: Into<WindowEntry>> FromIterator<E> for WindowIndex {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl WindowIndex {
    /// Build the index of every example in `corpus`.
    ///
    /// Each document contributes one entry per token of its view
    /// that has a following token.
    pub fn build<C: ContextType>(
        corpus: &Corpus<C>,
        options: &SequenceOptions,
    ) -> Self {
        corpus
            .documents()
            .iter()
            .enumerate()
            .flat_map(|(document, doc)| {
                let count = view_len(doc.len(), options).saturating_sub(1);
                (0..count).map(move |end_offset| WindowEntry::new(document, end_offset))
            })
            .collect()
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Is the index empty?
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entries, in order.
    pub fn entries(&self) -> &[WindowEntry] {
        &self.entries
    }

    /// Consume the index, returning its entries.
    pub fn into_entries(self) -> Vec<WindowEntry> {
        self.entries
    }

    /// Check every entry against `corpus`.
    ///
    /// ## Errors
    /// * [`RnnBatchError::DocumentOutOfRange`] for an unknown document.
    /// * [`RnnBatchError::WindowOutOfBounds`] for an entry without a next token.
    pub fn validate<C: ContextType>(
        &self,
        corpus: &Corpus<C>,
        options: &SequenceOptions,
    ) -> RBResult<()> {
        for entry in &self.entries {
            let doc = corpus
                .document(entry.document)
                .ok_or(RnnBatchError::DocumentOutOfRange {
                    document: entry.document,
                    documents: corpus.len(),
                })?;
            let len = view_len(doc.len(), options);
            if entry.end_offset + 1 >= len {
                return Err(RnnBatchError::WindowOutOfBounds {
                    document: entry.document,
                    end_offset: entry.end_offset,
                    len,
                });
            }
        }
        Ok(())
    }

    /// Shuffle and split into `(train, validation)` indices.
    ///
    /// ## Arguments
    /// * `train_fraction` - The share of entries kept for training; clamped to `[0, 1]`.
    /// * `rng` - The random source.
    pub fn split<R: Rng + ?Sized>(
        mut self,
        train_fraction: f64,
        rng: &mut R,
    ) -> (Self, Self) {
        self.entries.shuffle(rng);
        let train_len =
            ((self.entries.len() as f64) * train_fraction.clamp(0.0, 1.0)).round() as usize;
        let validation = self.entries.split_off(train_len.min(self.entries.len()));
        (self, validation.into())
    }
}
