//! # Documents and Corpora

use core::ops::RangeInclusive;

use compact_str::CompactString;

use crate::{
    errors::{RBResult, RnnBatchError},
    options::SequenceOptions,
    types::ContextType,
};

/// An immutable, ordered sequence of character or word tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    tokens: Vec<CompactString>,
}

impl Document {
    /// Build a character-level document; one token per `char`.
    pub fn from_chars(text: &str) -> Self {
        let mut buf = [0u8; 4];
        Self {
            tokens: text
                .chars()
                .map(|c| CompactString::from(c.encode_utf8(&mut buf) as &str))
                .collect(),
        }
    }

    /// Build a word-level document from already split words.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            tokens: words
                .into_iter()
                .map(|w| CompactString::from(w.as_ref()))
                .collect(),
        }
    }

    /// Build a document from raw text.
    ///
    /// Word-level text is split on whitespace; any further
    /// normalization is the caller's responsibility.
    pub fn from_text(
        text: &str,
        word_level: bool,
    ) -> Self {
        if word_level {
            Self::from_words(text.split_whitespace())
        } else {
            Self::from_chars(text)
        }
    }

    /// The number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Is the document empty?
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The document tokens.
    pub fn tokens(&self) -> &[CompactString] {
        &self.tokens
    }

    /// View this document, optionally wrapped in `meta_token`s.
    pub fn view<'a>(
        &'a self,
        meta_token: &'a str,
        wrapped: bool,
    ) -> DocumentView<'a> {
        DocumentView {
            document: self,
            meta_token,
            wrapped,
        }
    }
}

/// A [`Document`] seen as `[meta] + tokens + [meta]`, or as-is.
///
/// Indexing is by arithmetic; the wrapped sequence is never materialized.
#[derive(Debug, Clone, Copy)]
pub struct DocumentView<'a> {
    document: &'a Document,
    meta_token: &'a str,
    wrapped: bool,
}

impl<'a> DocumentView<'a> {
    /// The number of tokens in the view.
    pub fn len(&self) -> usize {
        if self.wrapped {
            self.document.len() + 2
        } else {
            self.document.len()
        }
    }

    /// Is the view empty?
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the token at `idx`, if in range.
    pub fn get(
        &self,
        idx: usize,
    ) -> Option<&'a str> {
        if !self.wrapped {
            return self.document.tokens.get(idx).map(|t| t.as_str());
        }
        if idx == 0 || idx == self.document.len() + 1 {
            return Some(self.meta_token);
        }
        self.document.tokens.get(idx - 1).map(|t| t.as_str())
    }

    /// Collect the tokens in `range`, truncated to the view.
    pub fn collect_range(
        &self,
        range: RangeInclusive<usize>,
    ) -> Vec<&'a str> {
        range.map_while(|idx| self.get(idx)).collect()
    }
}

/// A collection of documents with optional per-document context labels.
#[derive(Debug, Clone)]
pub struct Corpus<C: ContextType = ()> {
    documents: Vec<Document>,
    context_labels: Option<Vec<C>>,
}

impl Corpus<()> {
    /// Build an unlabeled corpus.
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents,
            context_labels: None,
        }
    }

    /// Build an unlabeled corpus from raw texts.
    pub fn from_texts<I, S>(
        texts: I,
        options: &SequenceOptions,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(
            texts
                .into_iter()
                .map(|t| Document::from_text(t.as_ref(), options.word_level()))
                .collect(),
        )
    }

    /// Attach context labels, one per document, in document order.
    ///
    /// ## Errors
    /// * [`RnnBatchError::ContextLabelMismatch`] if the counts differ.
    pub fn with_context_labels<C: ContextType>(
        self,
        labels: Vec<C>,
    ) -> RBResult<Corpus<C>> {
        if labels.len() != self.documents.len() {
            return Err(RnnBatchError::ContextLabelMismatch {
                documents: self.documents.len(),
                labels: labels.len(),
            });
        }
        Ok(Corpus {
            documents: self.documents,
            context_labels: Some(labels),
        })
    }
}

impl<C: ContextType> Corpus<C> {
    /// The number of documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Is the corpus empty?
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// The documents.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Get a document by index.
    pub fn document(
        &self,
        idx: usize,
    ) -> Option<&Document> {
        self.documents.get(idx)
    }

    /// Does this corpus carry context labels?
    pub fn has_context(&self) -> bool {
        self.context_labels.is_some()
    }

    /// The context labels, if any.
    pub fn context_labels(&self) -> Option<&[C]> {
        self.context_labels.as_deref()
    }

    /// The context label of a document, if labels are present.
    pub fn context_label(
        &self,
        idx: usize,
    ) -> Option<&C> {
        self.context_labels.as_ref().and_then(|labels| labels.get(idx))
    }

    /// The total number of tokens over all documents.
    pub fn total_tokens(&self) -> usize {
        self.documents.iter().map(Document::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_from_chars() {
        let doc = Document::from_chars("héllo");
        assert_eq!(doc.len(), 5);
        assert_eq!(doc.tokens()[1], "é");
        assert!(Document::from_chars("").is_empty());
    }

    #[test]
    fn test_document_from_text() {
        let doc = Document::from_text("the  quick\tfox\n", true);
        assert_eq!(doc.tokens(), &["the", "quick", "fox"]);

        let doc = Document::from_text("ab c", false);
        assert_eq!(doc.tokens(), &["a", "b", " ", "c"]);
    }

    #[test]
    fn test_wrapped_view() {
        let doc = Document::from_chars("ab");
        let view = doc.view("<s>", true);
        assert_eq!(view.len(), 4);
        assert_eq!(view.collect_range(0..=3), vec!["<s>", "a", "b", "<s>"]);
        assert_eq!(view.get(4), None);
        assert_eq!(view.collect_range(2..=9), vec!["b", "<s>"]);

        let view = doc.view("<s>", false);
        assert_eq!(view.len(), 2);
        assert_eq!(view.collect_range(0..=1), vec!["a", "b"]);
        assert_eq!(view.get(2), None);
    }

    #[test]
    fn test_empty_wrapped_view() {
        let doc = Document::default();
        let view = doc.view("<s>", true);
        assert_eq!(view.len(), 2);
        assert_eq!(view.collect_range(0..=1), vec!["<s>", "<s>"]);
        assert!(doc.view("<s>", false).is_empty());
    }

    #[test]
    fn test_context_labels() {
        let corpus = Corpus::from_texts(["a", "bb"], &SequenceOptions::default());
        assert!(!corpus.has_context());
        assert_eq!(corpus.total_tokens(), 3);

        let labeled = corpus.clone().with_context_labels(vec!["x", "y"]).unwrap();
        assert!(labeled.has_context());
        assert_eq!(labeled.context_label(1), Some(&"y"));
        assert_eq!(labeled.context_label(2), None);

        assert!(matches!(
            corpus.with_context_labels(vec![1u8]),
            Err(RnnBatchError::ContextLabelMismatch {
                documents: 2,
                labels: 1
            })
        ));
    }
}
