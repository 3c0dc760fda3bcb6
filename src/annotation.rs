//! Wire types for the NLP pipeline's JSON annotation output
//!
//! A CoreNLP server run with `outputFormat=json` returns one object per
//! document: a `sentences` array of token annotations and a `corefs` map of
//! chain id to mention list. These types declare only the fields the
//! annotator reads; unknown fields are ignored on deserialization.
//!
//! Mention indices here follow the upstream convention: sentence numbers
//! and token indices are 1-based, and the end index is exclusive. The
//! ingest adapter converts them to the crate's canonical 0-based inclusive
//! form; nothing else in the crate should touch these raw indices.

use std::collections::BTreeMap;

use serde::Deserialize;

/// A full document annotation as returned by the pipeline
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Annotation {
    /// Sentence annotations in document order
    pub sentences: Option<Vec<SentenceAnnotation>>,

    /// Coreference chains keyed by the pipeline-assigned chain id
    pub corefs: Option<BTreeMap<String, Vec<MentionAnnotation>>>,
}

/// One sentence of the upstream annotation
#[derive(Debug, Clone, Deserialize)]
pub struct SentenceAnnotation {
    /// Token annotations in position order
    pub tokens: Option<Vec<TokenAnnotation>>,
}

/// One token of the upstream annotation
#[derive(Debug, Clone, Deserialize)]
pub struct TokenAnnotation {
    /// Token text
    pub word: String,

    /// Part-of-speech label
    pub pos: String,

    /// Named-entity label (`O` when none)
    pub ner: String,
}

/// One coref mention of the upstream annotation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentionAnnotation {
    /// 1-based sentence number
    pub sent_num: usize,

    /// 1-based start token index
    pub start_index: usize,

    /// 1-based end token index, exclusive
    pub end_index: usize,

    /// Raw text of the mention span, case preserved
    pub text: String,

    /// Whether this mention is the chain's representative
    #[serde(default)]
    pub is_representative_mention: bool,
}
