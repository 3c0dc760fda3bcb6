//! Ingest adapter: upstream annotation to in-memory model
//!
//! Builds the `Document` and the `CorefChain` list out of the pipeline's
//! wire annotation. Index conversion from the upstream's 1-based,
//! end-exclusive convention to the canonical 0-based inclusive form
//! happens here and nowhere else: `sentence = sentNum - 1`,
//! `start = startIndex - 1`, `end = endIndex - 2` (the `-2` combines
//! 1-based to 0-based with exclusive to inclusive).

use crate::annotation::{Annotation, MentionAnnotation};
use crate::coref::{CorefChain, Mention};
use crate::document::{tag, Document, Sentence, Token};
use crate::error::{Error, Result};

/// Substitute value for the reserved `:` part-of-speech label
const COLON_POS: &str = "COLON";

/// Build a document from the upstream annotation, tagging each token with
/// its POS and NER labels
///
/// The POS label `:` is substituted with the literal `COLON`: the colon is
/// reserved as the tag name/value separator in the output format.
///
/// # Errors
///
/// Returns [`Error::Ingest`] if the annotation lacks sentence or token
/// annotations.
pub fn build_document(annotation: &Annotation) -> Result<Document> {
    let sentences = annotation
        .sentences
        .as_ref()
        .ok_or_else(|| Error::Ingest("annotation has no sentences".to_string()))?;

    let mut document = Document::new();
    for (index, sentence_annotation) in sentences.iter().enumerate() {
        let tokens = sentence_annotation
            .tokens
            .as_ref()
            .ok_or_else(|| Error::Ingest(format!("sentence {index} has no tokens")))?;

        let mut sentence = Sentence::new();
        for token_annotation in tokens {
            let mut token = Token::new(&token_annotation.word);
            let pos = if token_annotation.pos == ":" {
                COLON_POS
            } else {
                &token_annotation.pos
            };
            token.add_tag(tag::POS, pos);
            token.add_tag(tag::NER, &token_annotation.ner);
            sentence.add_token(token);
        }
        document.add_sentence(sentence);
    }
    Ok(document)
}

/// Extract coref chains from the upstream annotation
///
/// Chains are visited in ascending numeric order of their upstream chain
/// key, which is the order the pipeline assigned them, and receive ids
/// 1.. in that order. Mentions keep their upstream (textual) order. A
/// chain with no usable representative mention is dropped with a
/// diagnostic on stderr. An annotation without a coref section yields an
/// empty list.
#[must_use]
pub fn build_chains(annotation: &Annotation) -> Vec<CorefChain> {
    let Some(corefs) = annotation.corefs.as_ref() else {
        return Vec::new();
    };

    let mut keyed: Vec<(&String, &Vec<MentionAnnotation>)> = corefs.iter().collect();
    keyed.sort_by_key(|(key, _)| key.parse::<u64>().unwrap_or(u64::MAX));

    let mut chains = Vec::new();
    let mut next_id: u32 = 1;
    for (key, mention_annotations) in keyed {
        let representative = mention_annotations
            .iter()
            .find(|m| m.is_representative_mention)
            .and_then(convert_mention);
        let Some(representative) = representative else {
            eprintln!("chain {key}: no usable representative mention, dropping chain");
            continue;
        };

        let mentions: Vec<Mention> = mention_annotations
            .iter()
            .filter_map(convert_mention)
            .collect();

        chains.push(CorefChain {
            id: next_id,
            representative,
            mentions,
        });
        next_id += 1;
    }
    chains
}

/// Convert one upstream mention to the canonical index form
///
/// Returns `None` for mentions whose upstream indices cannot describe a
/// non-empty span (a zero `sentNum`/`startIndex`, or an end at or before
/// the start).
fn convert_mention(mention: &MentionAnnotation) -> Option<Mention> {
    if mention.sent_num < 1 || mention.start_index < 1 || mention.end_index <= mention.start_index {
        return None;
    }
    Some(Mention {
        sentence: mention.sent_num - 1,
        start: mention.start_index - 1,
        end: mention.end_index - 2,
        span: mention.text.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{SentenceAnnotation, TokenAnnotation};
    use std::collections::BTreeMap;

    fn token(word: &str, pos: &str, ner: &str) -> TokenAnnotation {
        TokenAnnotation {
            word: word.to_string(),
            pos: pos.to_string(),
            ner: ner.to_string(),
        }
    }

    fn mention(
        sent_num: usize,
        start_index: usize,
        end_index: usize,
        text: &str,
        representative: bool,
    ) -> MentionAnnotation {
        MentionAnnotation {
            sent_num,
            start_index,
            end_index,
            text: text.to_string(),
            is_representative_mention: representative,
        }
    }

    #[test]
    fn test_build_document_tags_pos_and_ner() {
        let annotation = Annotation {
            sentences: Some(vec![SentenceAnnotation {
                tokens: Some(vec![
                    token("Obama", "NNP", "PERSON"),
                    token("won", "VBD", "O"),
                ]),
            }]),
            corefs: None,
        };

        let document = build_document(&annotation).unwrap();
        assert_eq!(document.len(), 1);

        let obama = &document.sentences[0].tokens[0];
        assert_eq!(obama.surface, "Obama");
        assert!(obama.tag_values(tag::POS).unwrap().contains("NNP"));
        assert!(obama.tag_values(tag::NER).unwrap().contains("PERSON"));
    }

    #[test]
    fn test_colon_pos_is_substituted() {
        let annotation = Annotation {
            sentences: Some(vec![SentenceAnnotation {
                tokens: Some(vec![token("Notes", "NNS", "O"), token(":", ":", "O")]),
            }]),
            corefs: None,
        };

        let document = build_document(&annotation).unwrap();
        let colon = &document.sentences[0].tokens[1];
        assert!(colon.tag_values(tag::POS).unwrap().contains("COLON"));
        assert!(!colon.tag_values(tag::POS).unwrap().contains(":"));
    }

    #[test]
    fn test_missing_sentences_is_an_ingest_error() {
        let annotation = Annotation {
            sentences: None,
            corefs: None,
        };
        assert!(matches!(
            build_document(&annotation),
            Err(Error::Ingest(_))
        ));
    }

    #[test]
    fn test_missing_tokens_is_an_ingest_error() {
        let annotation = Annotation {
            sentences: Some(vec![SentenceAnnotation { tokens: None }]),
            corefs: None,
        };
        assert!(matches!(
            build_document(&annotation),
            Err(Error::Ingest(_))
        ));
    }

    #[test]
    fn test_index_conversion() {
        // upstream: sentence 2, tokens 1..2 (1-based, end exclusive)
        let converted = convert_mention(&mention(2, 1, 2, "He", false)).unwrap();
        assert_eq!(converted.sentence, 1);
        assert_eq!(converted.start, 0);
        assert_eq!(converted.end, 0);

        // a two-token span
        let converted = convert_mention(&mention(1, 1, 3, "Barack Obama", true)).unwrap();
        assert_eq!((converted.start, converted.end), (0, 1));
    }

    #[test]
    fn test_empty_upstream_span_is_dropped() {
        assert!(convert_mention(&mention(1, 2, 2, "", false)).is_none());
        assert!(convert_mention(&mention(0, 1, 2, "x", false)).is_none());
        assert!(convert_mention(&mention(1, 0, 2, "x", false)).is_none());
    }

    #[test]
    fn test_build_chains_orders_by_numeric_key() {
        let mut corefs = BTreeMap::new();
        corefs.insert(
            "10".to_string(),
            vec![mention(1, 1, 2, "later", true)],
        );
        corefs.insert(
            "2".to_string(),
            vec![mention(1, 2, 3, "earlier", true)],
        );

        let annotation = Annotation {
            sentences: None,
            corefs: Some(corefs),
        };

        let chains = build_chains(&annotation);
        assert_eq!(chains.len(), 2);
        // lexicographic order would put "10" first; numeric order must not
        assert_eq!(chains[0].representative.span, "earlier");
        assert_eq!(chains[0].id, 1);
        assert_eq!(chains[1].representative.span, "later");
        assert_eq!(chains[1].id, 2);
    }

    #[test]
    fn test_chain_without_representative_is_dropped() {
        let mut corefs = BTreeMap::new();
        corefs.insert(
            "1".to_string(),
            vec![mention(1, 1, 2, "he", false)],
        );
        corefs.insert(
            "2".to_string(),
            vec![mention(1, 2, 3, "Obama", true)],
        );

        let annotation = Annotation {
            sentences: None,
            corefs: Some(corefs),
        };

        let chains = build_chains(&annotation);
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].representative.span, "Obama");
        // ids stay contiguous over the surviving chains
        assert_eq!(chains[0].id, 1);
    }

    #[test]
    fn test_no_coref_section_yields_empty_chain_list() {
        let annotation = Annotation {
            sentences: None,
            corefs: None,
        };
        assert!(build_chains(&annotation).is_empty());
    }
}
