//! CoNLL-U parsing
//!
//! Reads the 10-column CoNLL-U token format into the `Document` model. Two
//! conventions on top of plain CoNLL-U:
//! - a document begins with `# newdoc text = <text>` carrying the exact
//!   string the annotator was (or would be) called with; a corpus file is a
//!   sequence of such documents,
//! - named-entity spans ride in the MISC column as `NER=B-PER` / `NER=I-PER`
//!   (and `ORG`, `LOC`, `MISC`, ...); `NER=O` or an absent field means the
//!   token is outside any span.
//!
//! Multiword-token ranges (`1-2`) and empty nodes (`1.1`) are skipped; the
//! engine only consumes the basic word layer.

use thiserror::Error;

use crate::{DepEdge, Document, Entity, EntityKind, Sentence, Upos, Word};

#[derive(Debug, Error)]
pub enum ConlluError {
    #[error("CoNLL-U parse error on line {line}: {message}")]
    Line { line: usize, message: String },
}

fn err(line: usize, message: impl Into<String>) -> ConlluError {
    ConlluError::Line {
        line,
        message: message.into(),
    }
}

/// Parse a corpus file: a sequence of `# newdoc text = ...` documents.
pub fn parse_corpus(input: &str) -> Result<Vec<Document>, ConlluError> {
    let mut parser = Parser::default();
    for (idx, raw) in input.lines().enumerate() {
        parser.line(idx + 1, raw)?;
    }
    parser.finish()
}

/// Parse a single document. The `# newdoc text = ...` header is optional
/// here; without it the document text is the sentence `# text` comments (or
/// token texts) joined with spaces.
pub fn parse_document(input: &str) -> Result<Document, ConlluError> {
    let docs = parse_corpus(input)?;
    match docs.len() {
        1 => Ok(docs.into_iter().next().unwrap()),
        n => Err(err(1, format!("expected exactly one document, found {n}"))),
    }
}

// ============================================================================
// Line-oriented parser
// ============================================================================

#[derive(Default)]
struct Parser {
    docs: Vec<Document>,
    current: Option<DocBuilder>,
}

#[derive(Default)]
struct DocBuilder {
    text: Option<String>,
    sent_texts: Vec<String>,
    sentences: Vec<Sentence>,
    entities: Vec<Entity>,
    sent: SentBuilder,
}

#[derive(Default)]
struct SentBuilder {
    text: Option<String>,
    words: Vec<Word>,
    deps: Vec<DepEdge>,
    /// Open BIO span: (label, word ids, token texts).
    open_entity: Option<(String, Vec<usize>, Vec<String>)>,
}

impl Parser {
    fn line(&mut self, line: usize, raw: &str) -> Result<(), ConlluError> {
        let trimmed = raw.trim_end();

        if let Some(text) = trimmed.strip_prefix("# newdoc text =") {
            self.flush_doc();
            self.current = Some(DocBuilder {
                text: Some(text.trim().to_string()),
                ..Default::default()
            });
            return Ok(());
        }

        if trimmed.is_empty() {
            if let Some(doc) = self.current.as_mut() {
                doc.flush_sentence();
            }
            return Ok(());
        }

        let doc = self.current.get_or_insert_with(DocBuilder::default);

        if let Some(text) = trimmed.strip_prefix("# text =") {
            doc.sent.text = Some(text.trim().to_string());
            return Ok(());
        }
        if trimmed.starts_with('#') {
            // Other comments (sent_id etc.) carry nothing we consume.
            return Ok(());
        }

        doc.token_line(line, trimmed)
    }

    fn flush_doc(&mut self) {
        if let Some(mut doc) = self.current.take() {
            doc.flush_sentence();
            let text = doc
                .text
                .unwrap_or_else(|| doc.sent_texts.join(" "));
            self.docs.push(Document {
                text,
                sentences: doc.sentences,
                entities: doc.entities,
            });
        }
    }

    fn finish(mut self) -> Result<Vec<Document>, ConlluError> {
        self.flush_doc();
        Ok(self.docs)
    }
}

impl DocBuilder {
    fn token_line(&mut self, line: usize, raw: &str) -> Result<(), ConlluError> {
        let cols: Vec<&str> = raw.split('\t').collect();
        if cols.len() < 8 {
            return Err(err(line, format!("expected ≥8 tab-separated columns, got {}", cols.len())));
        }

        // Multiword-token ranges and empty nodes are not part of the basic layer.
        if cols[0].contains('-') || cols[0].contains('.') {
            return Ok(());
        }

        let id: usize = cols[0]
            .parse()
            .map_err(|_| err(line, format!("bad token id {:?}", cols[0])))?;
        let upos = Upos::parse(cols[3])
            .ok_or_else(|| err(line, format!("unknown UPOS tag {:?}", cols[3])))?;
        let head: usize = cols[6]
            .parse()
            .map_err(|_| err(line, format!("bad HEAD {:?}", cols[6])))?;

        self.sent.words.push(Word {
            id,
            text: cols[1].to_string(),
            lemma: cols[2].to_string(),
            upos,
        });
        if cols[7] != "_" {
            self.sent.deps.push(DepEdge {
                head,
                rel: cols[7].to_string(),
                dep: id,
            });
        }

        let ner = cols
            .get(9)
            .and_then(|misc| misc.split('|').find_map(|f| f.strip_prefix("NER=")));
        self.bio_tag(line, id, cols[1], ner)
    }

    /// Advance the BIO span state machine for one token.
    fn bio_tag(
        &mut self,
        line: usize,
        id: usize,
        text: &str,
        tag: Option<&str>,
    ) -> Result<(), ConlluError> {
        match tag {
            Some(t) if t.starts_with("B-") => {
                self.close_entity();
                self.sent.open_entity =
                    Some((t[2..].to_string(), vec![id], vec![text.to_string()]));
                Ok(())
            }
            Some(t) if t.starts_with("I-") => match self.sent.open_entity.as_mut() {
                Some((label, ids, texts)) if label == &t[2..] => {
                    ids.push(id);
                    texts.push(text.to_string());
                    Ok(())
                }
                _ => Err(err(line, format!("continuation tag {t:?} without a matching open span"))),
            },
            Some("O") | None => {
                self.close_entity();
                Ok(())
            }
            Some(other) => Err(err(line, format!("unknown NER tag {other:?}"))),
        }
    }

    fn close_entity(&mut self) {
        if let Some((label, word_ids, texts)) = self.sent.open_entity.take() {
            self.entities.push(Entity {
                kind: EntityKind::from_label(&label),
                text: texts.join(" "),
                word_ids,
                sentence: self.sentences.len(),
            });
        }
    }

    fn flush_sentence(&mut self) {
        self.close_entity();
        if self.sent.words.is_empty() && self.sent.text.is_none() {
            return;
        }
        let sent = std::mem::take(&mut self.sent);
        if let Some(text) = sent.text {
            self.sent_texts.push(text);
        }
        self.sentences.push(Sentence {
            words: sent.words,
            deps: sent.deps,
        });
    }
}
