//! # Text Vocabulary

use compact_str::CompactString;

use crate::{
    errors::{RBResult, RnnBatchError},
    types::{CommonHashMap, CommonHashSet, TokenType},
};

/// The default document start/end meta token.
pub const DEFAULT_META_TOKEN: &str = "<s>";

/// The reserved padding id.
pub const PAD_ID: usize = 0;

/// How input tokens missing from the vocabulary are encoded.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum OovPolicy {
    /// Remove unknown tokens before padding.
    #[default]
    Drop,

    /// Map unknown tokens to the pad id.
    Pad,
}

/// A fixed `{ token -> id }` vocabulary over characters or words.
///
/// Ids are `>= 1`; id `0` is reserved for padding, and is also
/// column `0` of the one-hot target encoding.
///
/// ## Style Hints
/// Instance names should prefer `vocab`.
#[derive(Debug, Clone)]
pub struct TextVocab<T: TokenType = u32> {
    token_ids: CommonHashMap<CompactString, T>,
    id_tokens: CommonHashMap<T, CompactString>,
    meta_token: CompactString,
    oov_policy: OovPolicy,
    num_classes: usize,
}

impl<T: TokenType> TextVocab<T> {
    /// Build a vocabulary from explicit `(token, id)` pairs.
    ///
    /// ## Errors
    /// * [`RnnBatchError::VocabConflict`] if an id is `0`, or is assigned twice,
    ///   or a token appears twice.
    pub fn from_pairs<I, S>(pairs: I) -> RBResult<Self>
    where
        I: IntoIterator<Item = (S, T)>,
        S: AsRef<str>,
    {
        let mut token_ids: CommonHashMap<CompactString, T> = Default::default();
        let mut id_tokens: CommonHashMap<T, CompactString> = Default::default();

        for (token, id) in pairs {
            let token = CompactString::from(token.as_ref());
            if id.is_zero() {
                return Err(RnnBatchError::VocabConflict(format!(
                    "token {token:?} uses the reserved pad id 0"
                )));
            }
            if let Some(previous) = id_tokens.get(&id) {
                return Err(RnnBatchError::VocabConflict(format!(
                    "id {id} assigned to both {previous:?} and {token:?}"
                )));
            }
            if token_ids.contains_key(&token) {
                return Err(RnnBatchError::VocabConflict(format!(
                    "token {token:?} appears more than once"
                )));
            }
            token_ids.insert(token.clone(), id);
            id_tokens.insert(id, token);
        }

        let num_classes = match id_tokens.keys().max() {
            Some(max) => {
                max.to_usize()
                    .ok_or_else(|| {
                        RnnBatchError::VocabConflict(format!("id {max} does not fit in usize"))
                    })?
                    + 1
            }
            None => 1,
        };

        Ok(Self {
            token_ids,
            id_tokens,
            meta_token: DEFAULT_META_TOKEN.into(),
            oov_policy: OovPolicy::default(),
            num_classes,
        })
    }

    /// Build a dense vocabulary assigning ids `1..` in first-seen order.
    ///
    /// Repeated tokens keep their first id.
    pub fn from_tokens<I, S>(tokens: I) -> RBResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen: CommonHashSet<CompactString> = Default::default();
        let mut pairs: Vec<(CompactString, T)> = Vec::new();
        for token in tokens {
            let token = CompactString::from(token.as_ref());
            if !seen.insert(token.clone()) {
                continue;
            }
            let id = pairs.len() + 1;
            let id = T::from_usize(id).ok_or(RnnBatchError::VocabSizeOverflow { id })?;
            pairs.push((token, id));
        }
        Self::from_pairs(pairs)
    }

    /// Set the meta token marking document boundaries.
    pub fn with_meta_token<S: AsRef<str>>(
        self,
        meta_token: S,
    ) -> Self {
        Self {
            meta_token: meta_token.as_ref().into(),
            ..self
        }
    }

    /// Set the policy for unknown input tokens.
    pub fn with_oov_policy(
        self,
        oov_policy: OovPolicy,
    ) -> Self {
        Self { oov_policy, ..self }
    }

    /// The meta token marking document boundaries.
    pub fn meta_token(&self) -> &str {
        &self.meta_token
    }

    /// The policy for unknown input tokens.
    pub fn oov_policy(&self) -> OovPolicy {
        self.oov_policy
    }

    /// The number of tokens in the vocabulary.
    pub fn len(&self) -> usize {
        self.token_ids.len()
    }

    /// Is the vocabulary empty?
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The width of a one-hot target row: `max_id + 1`.
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Is the token in the vocabulary?
    pub fn contains(
        &self,
        token: &str,
    ) -> bool {
        self.token_ids.contains_key(token)
    }

    /// Look up the id of a token.
    pub fn lookup(
        &self,
        token: &str,
    ) -> Option<T> {
        self.token_ids.get(token).copied()
    }

    /// Look up the token for an id.
    pub fn token(
        &self,
        id: T,
    ) -> Option<&str> {
        self.id_tokens.get(&id).map(|t| t.as_str())
    }

    /// Iterate over `(token, id)` pairs, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, T)> {
        self.token_ids.iter().map(|(t, &id)| (t.as_str(), id))
    }

    /// Encode one input token per the [`OovPolicy`].
    ///
    /// ## Returns
    /// `None` when the token is unknown and the policy drops it.
    pub fn encode_token(
        &self,
        token: &str,
    ) -> Option<T> {
        match (self.lookup(token), self.oov_policy) {
            (Some(id), _) => Some(id),
            (None, OovPolicy::Pad) => Some(T::zero()),
            (None, OovPolicy::Drop) => None,
        }
    }

    /// Decode ids back into tokens, skipping pads and unknown ids.
    pub fn decode<'a>(
        &'a self,
        ids: &[T],
    ) -> Vec<&'a str> {
        ids.iter().filter_map(|&id| self.token(id)).collect()
    }
}
