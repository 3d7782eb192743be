//! # `rnnbatch` Training Batch Preparation
//!
//! Endless, shuffled `(input sequence, next token)` training batches
//! for character and word level text generation RNNs.
//!
//! See:
//! * [`batching`] for the batch generators.
//! * [`encoders`] to derive training examples and encode fixed-width rows.
//! * [`windows`] to precompute the flat window index.
//! * [`vocab`] for the token vocabulary and its JSON format.
//! * [`corpus`] for documents and context labels.
//!
//! ## Crate Features
//!
//! #### feature: ``ahash``
//!
//! This swaps all HashMap/HashSet implementations for ``ahash``; which is a performance
//! win on many/(most?) modern CPUs.
//!
//! This is done by the ``types::CommonHash{*}`` type alias machinery.
//!
//! #### feature: ``tracing``
//!
//! This enables a number of ``tracing`` instrumentation points.
//! This is only useful for timing tracing of the library itself.
#![warn(missing_docs, unused)]

pub mod batching;
pub mod corpus;
pub mod encoders;
pub mod errors;
pub mod options;
pub mod types;
pub mod vocab;
pub mod windows;

#[doc(inline)]
pub use batching::{Batch, BatchStrategy, BatchStream, DocumentBatcher, ModelIo, WindowBatcher};
#[doc(inline)]
pub use corpus::{Corpus, Document};
#[doc(inline)]
pub use errors::{RBResult, RnnBatchError};
#[doc(inline)]
pub use options::{BatcherOptions, SequenceOptions};
#[doc(inline)]
pub use vocab::TextVocab;
