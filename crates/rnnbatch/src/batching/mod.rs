//! # Batch Generation
//!
//! Two endless, pull-based batch generators share one accumulation policy:
//! * [`DocumentBatcher`] - shuffles documents, then each document's examples.
//! * [`WindowBatcher`] - shuffles a flat [`crate::windows::WindowIndex`].
//!
//! Both feed a [`BatchAccumulator`], which emits a [`Batch`] every
//! `batch_size` rows, and the (possibly short, possibly empty) remainder at
//! the end of every epoch.
//!
//! [`BatchStream`] wraps either generator behind one [`BatchStrategy`] choice.
//!
//! Generators are not synchronized; for parallel batch preparation,
//! run independent generators with distinct seeds.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use rnnbatch::{
//!     batching::{BatchStrategy, BatchStream, ModelIo},
//!     corpus::Corpus,
//!     options::{BatcherOptions, SequenceOptions},
//!     vocab::io::load_vocab_json_path,
//! };
//!
//! fn example(texts: &[String]) -> rnnbatch::errors::RBResult<()> {
//!     let sequence_options = SequenceOptions::new(40);
//!     let vocab = Arc::new(load_vocab_json_path::<u32, _>("textgenrnn_vocab.json")?);
//!     let corpus = Arc::new(Corpus::from_texts(texts, &sequence_options));
//!
//!     let stream = BatchStream::new(
//!         BatchStrategy::Windows,
//!         corpus,
//!         vocab,
//!         &sequence_options,
//!         BatcherOptions::new(128).with_seed(42u64),
//!     )?;
//!
//!     for batch in stream.take(10) {
//!         match batch.into_model_io() {
//!             ModelIo::Single { inputs, targets } => {
//!                 println!("{:?} -> {:?}", inputs.dim(), targets.dim());
//!             }
//!             ModelIo::WithContext { .. } => unreachable!(),
//!         }
//!     }
//!     Ok(())
//! }
//! ```

mod accumulator;
mod batch;
mod batch_stream;
mod document_batcher;
mod stats;
mod window_batcher;

#[doc(inline)]
pub use accumulator::BatchAccumulator;
#[doc(inline)]
pub use batch::{Batch, ModelIo};
#[doc(inline)]
pub use batch_stream::{BatchStrategy, BatchStream};
#[doc(inline)]
pub use document_batcher::{DocumentBatcher, batcher_rng};
#[doc(inline)]
pub use stats::{BatcherStats, EpochStats};
#[doc(inline)]
pub use window_batcher::WindowBatcher;
