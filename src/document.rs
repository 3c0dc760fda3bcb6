//! In-memory document model: tokens, sentences, and their tag maps
//!
//! A document is an ordered list of sentences; a sentence is an ordered
//! list of tokens. Each token carries a mutable tag map from tag name to a
//! *set* of values: a token can belong to multiple coref chains, so tags
//! like `COREF_REF` may accumulate more than one value. Duplicate values
//! collapse.
//!
//! Sentence and token indices are stable for the lifetime of the document.
//! The B-tree containers give tag iteration a sorted, deterministic order,
//! which the serializer relies on for golden-file testing.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Recognized tag names
pub mod tag {
    /// Part-of-speech label
    pub const POS: &str = "POS";
    /// Named-entity label
    pub const NER: &str = "NER";
    /// Chain id carried by the tokens of a representative mention
    pub const COREF_ID: &str = "COREF_ID";
    /// Chain id carried by the tokens of a referring mention
    pub const COREF_REF: &str = "COREF_REF";
    /// Escaped head phrase carried by the tokens of a referring mention
    pub const COREF_PHRASE: &str = "COREF_PHRASE";
}

/// A single token with its accumulated tags
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Token {
    /// The exact token string as produced by the tokenizer
    pub surface: String,

    /// Tag name to set of values
    pub tags: BTreeMap<String, BTreeSet<String>>,
}

impl Token {
    /// Create a token with no tags
    #[must_use]
    pub fn new(surface: impl Into<String>) -> Self {
        Self {
            surface: surface.into(),
            tags: BTreeMap::new(),
        }
    }

    /// Add a tag value, accumulating into the set under `name`
    pub fn add_tag(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.tags.entry(name.into()).or_default().insert(value.into());
    }

    /// Values recorded under a tag name, if any
    #[must_use]
    pub fn tag_values(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.tags.get(name)
    }

    /// Whether any value is recorded under a tag name
    #[must_use]
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }
}

/// An ordered sequence of tokens, position-indexed from 0
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sentence {
    /// Tokens in position order
    pub tokens: Vec<Token>,
}

impl Sentence {
    /// Create an empty sentence
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a token
    pub fn add_token(&mut self, token: Token) {
        self.tokens.push(token);
    }

    /// Number of tokens
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the sentence has no tokens
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Surface strings of all tokens, in position order
    #[must_use]
    pub fn surfaces(&self) -> Vec<String> {
        self.tokens.iter().map(|t| t.surface.clone()).collect()
    }
}

/// An ordered sequence of sentences, position-indexed from 0
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Sentences in document order
    pub sentences: Vec<Sentence>,
}

impl Document {
    /// Create an empty document
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sentence
    pub fn add_sentence(&mut self, sentence: Sentence) {
        self.sentences.push(sentence);
    }

    /// Number of sentences
    #[must_use]
    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    /// Whether the document has no sentences
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Total token count across all sentences
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.sentences.iter().map(Sentence::len).sum()
    }
}
