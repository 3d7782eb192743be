//! # Error Types

/// Errors from rnnbatch operations.
#[derive(Debug, thiserror::Error)]
pub enum RnnBatchError {
    /// The model input length must be positive.
    #[error("max_length must be > 0")]
    InvalidMaxLength,

    /// The batch size must be positive.
    #[error("batch_size must be > 0")]
    InvalidBatchSize,

    /// Context labels must be 1:1 with documents.
    #[error("context label count ({labels}) does not match document count ({documents})")]
    ContextLabelMismatch {
        /// The number of documents.
        documents: usize,

        /// The number of context labels.
        labels: usize,
    },

    /// A window entry names a document that does not exist.
    #[error("window entry document ({document}) out of range for {documents} documents")]
    DocumentOutOfRange {
        /// The document index of the entry.
        document: usize,

        /// The number of documents in the corpus.
        documents: usize,
    },

    /// A window entry has no next token after its end offset.
    #[error(
        "window entry end offset ({end_offset}) has no next token in document {document} (len {len})"
    )]
    WindowOutOfBounds {
        /// The document index of the entry.
        document: usize,

        /// The end offset of the entry.
        end_offset: usize,

        /// The length of the (possibly wrapped) document.
        len: usize,
    },

    /// Vocabulary data is inconsistent.
    #[error("{0}")]
    VocabConflict(String),

    /// Vocab size exceeds the capacity of the target token type.
    #[error("vocab id ({id}) exceeds token type capacity")]
    VocabSizeOverflow {
        /// The id that exceeded the capacity.
        id: usize,
    },

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type for rnnbatch operations.
pub type RBResult<T> = core::result::Result<T, RnnBatchError>;
