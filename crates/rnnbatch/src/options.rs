//! # Sequence and Batcher Options

use std::{io::Read, path::Path};

use crate::errors::{RBResult, RnnBatchError};

/// The default model input length.
pub const DEFAULT_MAX_LENGTH: usize = 40;

/// The default number of rows per batch.
pub const DEFAULT_BATCH_SIZE: usize = 128;

/// Options describing how documents are turned into model input sequences.
///
/// The serialized form matches the `word_level`, `max_length`, and `single_text`
/// keys of a textgenrnn `config.json`; other keys in such a file are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SequenceOptions {
    /// Are documents sequences of words (rather than characters)?
    pub word_level: bool,

    /// The fixed model input length.
    pub max_length: usize,

    /// Is the corpus one continuous text?
    ///
    /// Single texts are not wrapped in meta tokens.
    pub single_text: bool,
}

impl Default for SequenceOptions {
    fn default() -> Self {
        Self {
            word_level: false,
            max_length: DEFAULT_MAX_LENGTH,
            single_text: false,
        }
    }
}

impl SequenceOptions {
    /// Create new options with the given input length.
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            ..Default::default()
        }
    }

    /// Read options from a JSON config reader.
    pub fn from_json_reader<R: Read>(reader: R) -> RBResult<Self> {
        let options: Self = serde_json::from_reader(reader)?;
        options.validate()?;
        Ok(options)
    }

    /// Read options from a JSON config file.
    pub fn load_json_path<P: AsRef<Path>>(path: P) -> RBResult<Self> {
        let reader = std::io::BufReader::new(std::fs::File::open(path)?);
        Self::from_json_reader(reader)
    }

    /// Check that the options are usable.
    pub fn validate(&self) -> RBResult<()> {
        if self.max_length == 0 {
            return Err(RnnBatchError::InvalidMaxLength);
        }
        Ok(())
    }

    /// Are documents word sequences?
    pub fn word_level(&self) -> bool {
        self.word_level
    }

    /// Set whether documents are word sequences.
    pub fn with_word_level(
        self,
        word_level: bool,
    ) -> Self {
        Self { word_level, ..self }
    }

    /// The fixed model input length.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Set the fixed model input length.
    pub fn with_max_length(
        self,
        max_length: usize,
    ) -> Self {
        Self { max_length, ..self }
    }

    /// Is the corpus one continuous text?
    pub fn single_text(&self) -> bool {
        self.single_text
    }

    /// Set whether the corpus is one continuous text.
    pub fn with_single_text(
        self,
        single_text: bool,
    ) -> Self {
        Self {
            single_text,
            ..self
        }
    }

    /// Are documents wrapped in leading and trailing meta tokens?
    pub fn wraps_documents(&self) -> bool {
        !self.single_text
    }
}

/// Options for the batch generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatcherOptions {
    /// The target number of rows per batch.
    pub batch_size: usize,

    /// The random seed; when `None`, the generator is seeded from OS entropy.
    pub seed: Option<u64>,

    /// Emit the epoch-end remainder even when it has no rows?
    ///
    /// When disabled, an empty remainder is still emitted if the whole
    /// epoch produced no rows, so degenerate corpora keep yielding.
    pub emit_empty_remainder: bool,
}

impl Default for BatcherOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            seed: None,
            emit_empty_remainder: true,
        }
    }
}

impl BatcherOptions {
    /// Create new options with the given batch size.
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size,
            ..Default::default()
        }
    }

    /// Check that the options are usable.
    pub fn validate(&self) -> RBResult<()> {
        if self.batch_size == 0 {
            return Err(RnnBatchError::InvalidBatchSize);
        }
        Ok(())
    }

    /// The target number of rows per batch.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Set the target number of rows per batch.
    pub fn with_batch_size(
        self,
        batch_size: usize,
    ) -> Self {
        Self { batch_size, ..self }
    }

    /// The configured random seed.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Set the random seed.
    pub fn with_seed<S>(
        self,
        seed: S,
    ) -> Self
    where
        S: Into<Option<u64>>,
    {
        Self {
            seed: seed.into(),
            ..self
        }
    }

    /// Set whether empty epoch-end remainders are emitted.
    pub fn with_emit_empty_remainder(
        self,
        emit_empty_remainder: bool,
    ) -> Self {
        Self {
            emit_empty_remainder,
            ..self
        }
    }
}

/// The number of full batches a training loop should pull per pass over `examples` rows.
///
/// Trailing partial batches are not counted; the result is at least 1.
pub fn steps_per_epoch(
    examples: usize,
    batch_size: usize,
) -> usize {
    (examples / batch_size.max(1)).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_options_json() {
        let json = r#"{
            "rnn_layers": 2,
            "rnn_size": 128,
            "max_length": 10,
            "max_words": 10000,
            "word_level": true,
            "single_text": false
        }"#;

        let options = SequenceOptions::from_json_reader(json.as_bytes()).unwrap();
        assert_eq!(
            options,
            SequenceOptions::new(10)
                .with_word_level(true)
                .with_single_text(false)
        );
        assert!(options.wraps_documents());
    }

    #[test]
    fn test_sequence_options_defaults() {
        let options = SequenceOptions::from_json_reader("{}".as_bytes()).unwrap();
        assert_eq!(options, SequenceOptions::default());
        assert_eq!(options.max_length(), DEFAULT_MAX_LENGTH);
    }

    #[test]
    fn test_zero_max_length() {
        let err = SequenceOptions::from_json_reader(r#"{"max_length": 0}"#.as_bytes());
        assert!(matches!(err, Err(RnnBatchError::InvalidMaxLength)));
    }

    #[test]
    fn test_batcher_options() {
        let options = BatcherOptions::default();
        assert_eq!(options.batch_size(), 128);
        assert_eq!(options.seed(), None);
        assert!(options.emit_empty_remainder);

        let options = options.with_batch_size(4).with_seed(7u64);
        assert_eq!(options.batch_size(), 4);
        assert_eq!(options.seed(), Some(7));

        assert!(matches!(
            BatcherOptions::new(0).validate(),
            Err(RnnBatchError::InvalidBatchSize)
        ));
    }

    #[test]
    fn test_steps_per_epoch() {
        assert_eq!(steps_per_epoch(0, 128), 1);
        assert_eq!(steps_per_epoch(128, 128), 1);
        assert_eq!(steps_per_epoch(129, 128), 1);
        assert_eq!(steps_per_epoch(1001, 128), 7);
    }
}
