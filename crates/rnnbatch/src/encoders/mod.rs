//! # Encoders
//!
//! * [`TrainingEncoder`] - derives `(prefix, target)` examples from a document.
//!   * [`SlidingWindowEncoder`] is the default.
//! * [`SequenceEncoder`] - encodes prefixes into fixed-width id rows,
//!   and targets into one-hot rows.

mod sequence_encoder;
mod training_encoder;

#[doc(inline)]
pub use sequence_encoder::SequenceEncoder;
#[doc(inline)]
pub use training_encoder::{SlidingWindowEncoder, TrainingEncoder, TrainingExample};
