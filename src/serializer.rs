//! Line-oriented serialization of annotated documents
//!
//! Two formats, one per mode, both emitting exactly one line per sentence
//! in document order:
//!
//! - `.coref` (rewrite): `<original tokens>|||<rewritten tokens>|||<spans>`
//!   where the original tokens are space-joined, the rewritten joiner is
//!   configurable, and `<spans>` is a comma-joined list of `start->end`
//!   pairs (empty when the sentence was not rewritten).
//! - `.tagged` (tag): per token, `<lowercased surface>-><tag>:<value>|||...`
//!   with one `tag:value` segment per value, then the per-token trailing
//!   delimiters are collapsed into single spaces.
//!
//! Tag maps iterate in sorted order, so rendering the same document twice
//! yields byte-identical output.

use std::fs;
use std::path::Path;

use crate::coref::Rewrite;
use crate::document::Document;
use crate::error::Result;

/// Separator between a token and what follows it, and between the
/// endpoints of a span
pub const DELIM: &str = "->";

/// Field and tag delimiter
pub const DELIM_TAG: &str = "|||";

/// How the rewritten token stream of a `.coref` line is joined
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JoinStyle {
    /// Join rewritten tokens with single spaces
    #[default]
    Space,

    /// Concatenate rewritten tokens with no separator, bonding adjacent
    /// tokens (the historical behavior)
    Concatenated,
}

impl JoinStyle {
    const fn joiner(self) -> &'static str {
        match self {
            Self::Space => " ",
            Self::Concatenated => "",
        }
    }
}

/// Render one `.coref` line per sentence
#[must_use]
pub fn coref_lines(document: &Document, rewrite: &Rewrite, join: JoinStyle) -> Vec<String> {
    document
        .sentences
        .iter()
        .enumerate()
        .map(|(index, sentence)| {
            let original = sentence.surfaces().join(" ");
            let replaced = rewrite
                .sentences
                .get(index)
                .map_or_else(String::new, |tokens| tokens.join(join.joiner()));
            let spans = rewrite.affected.get(&index).map_or_else(String::new, |spans| {
                spans
                    .iter()
                    .map(|(start, end)| format!("{start}{DELIM}{end}"))
                    .collect::<Vec<_>>()
                    .join(",")
            });
            format!("{original}{DELIM_TAG}{replaced}{DELIM_TAG}{spans}")
        })
        .collect()
}

/// Render one `.tagged` line per sentence
#[must_use]
pub fn tagged_lines(document: &Document) -> Vec<String> {
    document
        .sentences
        .iter()
        .map(|sentence| {
            let mut line = String::new();
            for token in &sentence.tokens {
                line.push_str(&token.surface.to_lowercase());
                line.push_str(DELIM);
                for (name, values) in &token.tags {
                    for value in values {
                        line.push_str(name);
                        line.push(':');
                        line.push_str(value);
                        line.push_str(DELIM_TAG);
                    }
                }
                line.push(' ');
            }
            // remove trailing tag delimiters
            line.replace(&format!("{DELIM_TAG} "), " ").trim().to_string()
        })
        .collect()
}

/// Write lines as UTF-8, one per line
///
/// An empty line list writes an empty file, so each output is either fully
/// written or absent.
///
/// # Errors
///
/// Returns [`crate::Error::Io`] if the file cannot be written.
pub fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    let mut contents = lines.join("\n");
    if !lines.is_empty() {
        contents.push('\n');
    }
    fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coref::AffectedSpans;
    use crate::document::{tag, Sentence, Token};

    fn document_with(words: &[&str]) -> Document {
        let mut sentence = Sentence::new();
        for word in words {
            sentence.add_token(Token::new(*word));
        }
        let mut document = Document::new();
        document.add_sentence(sentence);
        document
    }

    #[test]
    fn test_coref_line_fields() {
        let document = document_with(&["He", "is", "here", "."]);
        let mut affected = AffectedSpans::new();
        affected.insert(0, vec![(0, 0)]);
        let rewrite = Rewrite {
            sentences: vec![vec![
                "[[Barack Obama]]".to_string(),
                "is".to_string(),
                "here".to_string(),
                ".".to_string(),
            ]],
            affected,
        };

        let lines = coref_lines(&document, &rewrite, JoinStyle::Space);
        assert_eq!(
            lines,
            vec!["He is here .|||[[Barack Obama]] is here .|||0->0"]
        );
    }

    #[test]
    fn test_coref_line_without_spans_has_empty_field() {
        let document = document_with(&["Nothing", "changed", "."]);
        let rewrite = Rewrite {
            sentences: vec![document.sentences[0].surfaces()],
            affected: AffectedSpans::new(),
        };

        let lines = coref_lines(&document, &rewrite, JoinStyle::Space);
        assert_eq!(lines, vec!["Nothing changed .|||Nothing changed .|||"]);
    }

    #[test]
    fn test_coref_line_concatenated_join_bonds_tokens() {
        let document = document_with(&["He", "ran", "."]);
        let rewrite = Rewrite {
            sentences: vec![vec![
                "[[Ann]]".to_string(),
                "ran".to_string(),
                ".".to_string(),
            ]],
            affected: AffectedSpans::new(),
        };

        let lines = coref_lines(&document, &rewrite, JoinStyle::Concatenated);
        assert_eq!(lines, vec!["He ran .|||[[Ann]]ran.|||"]);
    }

    #[test]
    fn test_coref_spans_keep_recorded_order() {
        let document = document_with(&["a", "b", "c", "d"]);
        let mut affected = AffectedSpans::new();
        affected.insert(0, vec![(2, 3), (0, 1)]);
        let rewrite = Rewrite {
            sentences: vec![document.sentences[0].surfaces()],
            affected,
        };

        let lines = coref_lines(&document, &rewrite, JoinStyle::Space);
        assert!(lines[0].ends_with("|||2->3,0->1"));
    }

    #[test]
    fn test_tagged_line_layout() {
        let mut token = Token::new("He");
        token.add_tag(tag::POS, "PRP");
        token.add_tag(tag::NER, "O");
        let mut period = Token::new(".");
        period.add_tag(tag::POS, ".");
        period.add_tag(tag::NER, "O");

        let mut sentence = Sentence::new();
        sentence.add_token(token);
        sentence.add_token(period);
        let mut document = Document::new();
        document.add_sentence(sentence);

        let lines = tagged_lines(&document);
        // sorted tag order: NER before POS; no trailing delimiter anywhere
        assert_eq!(lines, vec!["he->NER:O|||POS:PRP .->NER:O|||POS:."]);
    }

    #[test]
    fn test_tagged_surface_is_lowercased() {
        let mut token = Token::new("HAWAII");
        token.add_tag(tag::POS, "NNP");

        let mut sentence = Sentence::new();
        sentence.add_token(token);
        let mut document = Document::new();
        document.add_sentence(sentence);

        assert_eq!(tagged_lines(&document), vec!["hawaii->POS:NNP"]);
    }

    #[test]
    fn test_tagged_multi_value_tag_emits_one_segment_per_value() {
        let mut token = Token::new("it");
        token.add_tag(tag::COREF_REF, "1");
        token.add_tag(tag::COREF_REF, "2");

        let mut sentence = Sentence::new();
        sentence.add_token(token);
        let mut document = Document::new();
        document.add_sentence(sentence);

        assert_eq!(tagged_lines(&document), vec!["it->COREF_REF:1|||COREF_REF:2"]);
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let mut token = Token::new("He");
        token.add_tag(tag::POS, "PRP");
        token.add_tag(tag::NER, "O");
        token.add_tag(tag::COREF_REF, "1");
        token.add_tag(tag::COREF_PHRASE, "barack_obama");

        let mut sentence = Sentence::new();
        sentence.add_token(token);
        let mut document = Document::new();
        document.add_sentence(sentence);

        assert_eq!(tagged_lines(&document), tagged_lines(&document));
    }

    #[test]
    fn test_write_lines_empty_document_writes_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt.coref");

        write_lines(&path, &[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_write_lines_terminates_every_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt.tagged");

        write_lines(&path, &["one".to_string(), "two".to_string()]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }
}
