//! Coref overlay: chain tagging and in-place mention rewriting
//!
//! Given coref chains over a tokenized document, the overlay produces one
//! of two results:
//!
//! - **Tag mode** marks every token of a representative mention with the
//!   chain id (`COREF_ID`) and every token of a referring mention with the
//!   chain id (`COREF_REF`) plus the escaped head phrase (`COREF_PHRASE`).
//!   The document's tag maps are mutated in place.
//! - **Rewrite mode** substitutes each referring mention with the chain's
//!   head phrase on a working copy of the token surfaces, recording the
//!   affected spans, then compacts the emptied positions away. The
//!   document itself is left untouched so the serializer can still render
//!   the original token stream next to the rewritten one.
//!
//! In both modes a mention whose surface equals the head phrase is skipped:
//! the representative text is already written literally, and purely textual
//! repeats add no information. Tag mode compares case-insensitively,
//! Rewrite mode exactly.
//!
//! Chains are processed in upstream order and mentions in textual order.
//! No chain's processing depends on another chain's result. A mention with
//! an out-of-range span is skipped with a diagnostic on stderr; it never
//! fails the document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::document::{tag, Document, Sentence};
use crate::error::{Error, Result};

/// A contiguous token span identified as referring to some entity
///
/// Indices are the crate's canonical form: 0-based, inclusive on both
/// ends. The ingest adapter converts from the upstream convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    /// 0-based sentence index
    pub sentence: usize,

    /// 0-based start token index, inclusive
    pub start: usize,

    /// 0-based end token index, inclusive
    pub end: usize,

    /// Raw mention text as reported upstream, case preserved
    pub span: String,
}

/// A set of mentions deemed to refer to the same entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorefChain {
    /// Positive chain id, assigned in upstream encounter order
    pub id: u32,

    /// The chain's canonical mention
    pub representative: Mention,

    /// All mentions in textual order, including the representative
    pub mentions: Vec<Mention>,
}

/// Sentence index to rewritten `(start, end)` spans, in visit order
pub type AffectedSpans = BTreeMap<usize, Vec<(usize, usize)>>;

/// Outcome of a Rewrite-mode pass
#[derive(Debug, Clone)]
pub struct Rewrite {
    /// Per-sentence surface lists with mentions substituted and compacted
    pub sentences: Vec<Vec<String>>,

    /// Which spans were rewritten, per sentence
    pub affected: AffectedSpans,
}

/// Escape a head phrase for use as a tag value
///
/// The tag format reserves `:` as the name/value separator and spaces as
/// the token separator, so both are rewritten.
#[must_use]
pub fn escape_phrase(phrase: &str) -> String {
    phrase.replace(' ', "_").replace(':', "_SEMI-COLON_")
}

/// Tag every mention token with chain membership and head-phrase linkage
///
/// Representative spans get `COREF_ID`; referring spans get `COREF_REF`
/// and `COREF_PHRASE`. Tag values accumulate as sets, so overlapping
/// mentions across chains simply stack their tags.
pub fn tag_mentions(document: &mut Document, chains: &[CorefChain]) {
    for chain in chains {
        let head = chain.representative.span.to_lowercase();
        let id = chain.id.to_string();

        if let Err(e) = tag_span(document, &chain.representative, tag::COREF_ID, &id) {
            eprintln!("chain {}: {e}", chain.id);
        }

        for mention in &chain.mentions {
            // a lot of mentions are the same text as the head
            if mention.span.to_lowercase() == head {
                continue;
            }

            let tagged = tag_span(document, mention, tag::COREF_REF, &id)
                .and_then(|()| tag_span(document, mention, tag::COREF_PHRASE, &escape_phrase(&head)));
            if let Err(e) = tagged {
                eprintln!("chain {}: {e}", chain.id);
            }
        }
    }
}

/// Substitute referring mentions with the representative phrase
///
/// Returns the rewritten per-sentence surface lists and the affected-spans
/// map. Spans are recorded only for mentions that were actually rewritten.
#[must_use]
pub fn rewrite_mentions(document: &Document, chains: &[CorefChain]) -> Rewrite {
    let mut sentences: Vec<Vec<String>> =
        document.sentences.iter().map(Sentence::surfaces).collect();
    let mut affected = AffectedSpans::new();

    for chain in chains {
        let head = &chain.representative.span;

        for mention in &chain.mentions {
            if mention.span == *head {
                continue;
            }
            if mention.end < mention.start {
                continue;
            }

            match rewrite_span(&mut sentences, mention, head) {
                Ok(()) => affected
                    .entry(mention.sentence)
                    .or_default()
                    .push((mention.start, mention.end)),
                Err(e) => eprintln!("chain {}: {e}", chain.id),
            }
        }
    }

    // positions emptied by the rewrites contribute nothing
    for sentence in &mut sentences {
        compact(sentence);
    }

    Rewrite { sentences, affected }
}

fn tag_span(document: &mut Document, mention: &Mention, name: &str, value: &str) -> Result<()> {
    if mention.end < mention.start {
        // zero-length span, nothing to tag
        return Ok(());
    }

    let sentence = document
        .sentences
        .get_mut(mention.sentence)
        .ok_or_else(|| missing_sentence(mention))?;
    if mention.end >= sentence.len() {
        return Err(span_out_of_range(mention, sentence.len()));
    }

    for token in &mut sentence.tokens[mention.start..=mention.end] {
        token.add_tag(name, value);
    }
    Ok(())
}

fn rewrite_span(sentences: &mut [Vec<String>], mention: &Mention, head: &str) -> Result<()> {
    let sentence = sentences
        .get_mut(mention.sentence)
        .ok_or_else(|| missing_sentence(mention))?;
    if mention.end >= sentence.len() {
        return Err(span_out_of_range(mention, sentence.len()));
    }

    sentence[mention.start] = format!("[[{}]]", head.trim());
    // wipe out the rest of the original mention
    for slot in &mut sentence[mention.start + 1..=mention.end] {
        slot.clear();
    }
    Ok(())
}

/// Drop empty and whitespace-only tokens, trimming survivors. Idempotent.
fn compact(tokens: &mut Vec<String>) {
    *tokens = tokens
        .iter()
        .map(|token| token.trim())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect();
}

fn missing_sentence(mention: &Mention) -> Error {
    Error::Span(format!(
        "mention {:?} refers to missing sentence {}",
        mention.span, mention.sentence
    ))
}

fn span_out_of_range(mention: &Mention, len: usize) -> Error {
    Error::Span(format!(
        "mention {:?} span {}..={} exceeds sentence {} of length {len}",
        mention.span, mention.start, mention.end, mention.sentence
    ))
}
