//! # Vocabulary
//!
//! The vocabulary is built elsewhere; this module holds it fixed
//! during batch generation:
//! * [`TextVocab`] - `{ token -> id }` lookup, reverse lookup, and the meta token.
//! * [`io`] - the textgenrnn `vocab.json` format.

pub mod io;

mod text_vocab;

#[doc(inline)]
pub use text_vocab::{DEFAULT_META_TOKEN, OovPolicy, PAD_ID, TextVocab};
