//! # Vocabulary IO
//!
//! Reads and writes the `{"token": id}` JSON vocabulary format
//! written by textgenrnn (`*_vocab.json`).

use std::{
    collections::BTreeMap,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use crate::{
    errors::{RBResult, RnnBatchError},
    types::TokenType,
    vocab::TextVocab,
};

/// Read a [`TextVocab`] from a JSON reader.
pub fn read_vocab_json<T: TokenType, R: Read>(reader: R) -> RBResult<TextVocab<T>> {
    let raw: BTreeMap<String, usize> = serde_json::from_reader(reader)?;
    let mut pairs = Vec::with_capacity(raw.len());
    for (token, id) in raw {
        let id = T::from_usize(id).ok_or(RnnBatchError::VocabSizeOverflow { id })?;
        pairs.push((token, id));
    }
    TextVocab::from_pairs(pairs)
}

/// Load a [`TextVocab`] from a JSON file.
pub fn load_vocab_json_path<T: TokenType, P: AsRef<Path>>(path: P) -> RBResult<TextVocab<T>> {
    let reader = BufReader::new(std::fs::File::open(path)?);
    read_vocab_json(reader)
}

/// Write a [`TextVocab`] as JSON, with tokens in sorted order.
pub fn write_vocab_json<T: TokenType, W: Write>(
    vocab: &TextVocab<T>,
    writer: W,
) -> RBResult<()> {
    let raw: BTreeMap<&str, usize> = vocab
        .iter()
        .map(|(token, id)| (token, id.to_usize().unwrap_or_default()))
        .collect();
    serde_json::to_writer(writer, &raw)?;
    Ok(())
}

/// Save a [`TextVocab`] to a JSON file.
pub fn save_vocab_json_path<T: TokenType, P: AsRef<Path>>(
    vocab: &TextVocab<T>,
    path: P,
) -> RBResult<()> {
    let mut writer = BufWriter::new(std::fs::File::create(path)?);
    write_vocab_json(vocab, &mut writer)?;
    writer.flush()?;
    Ok(())
}
