//! Annotated-document model and annotation services
//!
//! This crate owns the data model the insight engine consumes:
//! - `Document` / `Sentence` / `Word` / `Entity` / `DepEdge` — one utterance
//!   after linguistic annotation (lemmas, UD part-of-speech tags, named-entity
//!   spans, and a dependency graph),
//! - the `Annotator` and `Normalizer` service traits,
//! - a CoNLL-U parser (`conllu`) with a `NER=` MISC-field convention for
//!   entity spans,
//! - `CorpusAnnotator` — a pre-annotated corpus for offline runs and tests,
//! - `HttpAnnotator` — a UDPipe-style REST client (feature `http`).

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod conllu;
pub mod corpus;
#[cfg(feature = "http")]
pub mod http;
pub mod normalize;

pub use conllu::ConlluError;
pub use corpus::CorpusAnnotator;
#[cfg(feature = "http")]
pub use http::HttpAnnotator;
pub use normalize::{Passthrough, RuleNormalizer};

// ============================================================================
// Data model
// ============================================================================

/// Universal Dependencies part-of-speech tags (the closed UD v2 set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Upos {
    Adj,
    Adp,
    Adv,
    Aux,
    Cconj,
    Det,
    Intj,
    Noun,
    Num,
    Part,
    Pron,
    Propn,
    Punct,
    Sconj,
    Sym,
    Verb,
    X,
}

impl Upos {
    /// Parse a UD tag as it appears in the UPOS column of a CoNLL-U file.
    pub fn parse(tag: &str) -> Option<Upos> {
        match tag {
            "ADJ" => Some(Upos::Adj),
            "ADP" => Some(Upos::Adp),
            "ADV" => Some(Upos::Adv),
            "AUX" => Some(Upos::Aux),
            "CCONJ" => Some(Upos::Cconj),
            "DET" => Some(Upos::Det),
            "INTJ" => Some(Upos::Intj),
            "NOUN" => Some(Upos::Noun),
            "NUM" => Some(Upos::Num),
            "PART" => Some(Upos::Part),
            "PRON" => Some(Upos::Pron),
            "PROPN" => Some(Upos::Propn),
            "PUNCT" => Some(Upos::Punct),
            "SCONJ" => Some(Upos::Sconj),
            "SYM" => Some(Upos::Sym),
            "VERB" => Some(Upos::Verb),
            "X" => Some(Upos::X),
            _ => None,
        }
    }
}

/// One token of a sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    /// 1-based position within the sentence (CoNLL-U convention).
    pub id: usize,
    pub text: String,
    pub lemma: String,
    pub upos: Upos,
}

/// A syntactic relation between two words of one sentence.
///
/// `head == 0` denotes the artificial root; there is no word at that endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepEdge {
    pub head: usize,
    pub rel: String,
    pub dep: usize,
}

/// An ordered sequence of words plus the dependency edges among them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    pub words: Vec<Word>,
    pub deps: Vec<DepEdge>,
}

impl Sentence {
    /// Look up a word by its 1-based id.
    pub fn word(&self, id: usize) -> Option<&Word> {
        self.words.iter().find(|w| w.id == id)
    }
}

/// Named-entity categories surfaced by the annotation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Person,
    Organization,
    Location,
    Misc,
    Other(String),
}

impl EntityKind {
    /// Map a BIO tag suffix (`PER`, `ORG`, ...) to a kind.
    pub fn from_label(label: &str) -> EntityKind {
        match label {
            "PER" => EntityKind::Person,
            "ORG" => EntityKind::Organization,
            "LOC" => EntityKind::Location,
            "MISC" => EntityKind::Misc,
            other => EntityKind::Other(other.to_string()),
        }
    }
}

/// A named-entity span over the words of one sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,
    /// Surface text of the span (token texts joined with spaces).
    pub text: String,
    /// 1-based word ids covered by the span, in order.
    pub word_ids: Vec<usize>,
    /// 0-based index of the sentence the span belongs to.
    pub sentence: usize,
}

/// One annotated utterance: the exact text handed to the annotator plus its
/// sentences and entity spans.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    pub sentences: Vec<Sentence>,
    pub entities: Vec<Entity>,
}

impl Document {
    /// The first sentence, if the document has any.
    ///
    /// Utterances that annotate to zero sentences are valid input for the
    /// engine (they match nothing); callers must not index unconditionally.
    pub fn first_sentence(&self) -> Option<&Sentence> {
        self.sentences.first()
    }
}

// ============================================================================
// Service traits
// ============================================================================

#[derive(Debug, Error)]
pub enum AnnotateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Conllu(#[from] ConlluError),
    #[error("no annotation in corpus for text: {0:?}")]
    UnknownText(String),
    #[error("annotation service error: {0}")]
    Service(String),
}

/// Linguistic annotation: text in, annotated document out.
///
/// Implementations must be deterministic per call; the engine relies on that
/// to cache definition annotations within one matcher invocation.
pub trait Annotator: Send + Sync {
    fn annotate(&self, text: &str) -> Result<Document, AnnotateError>;
}

/// Punctuation/casing restoration applied to stripped transcript text before
/// it is annotated.
pub trait Normalizer: Send + Sync {
    fn restore(&self, text: &str) -> Result<String, AnnotateError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upos_parse_round_trip() {
        for tag in ["NOUN", "VERB", "PRON", "PUNCT", "PROPN", "INTJ"] {
            assert!(Upos::parse(tag).is_some(), "tag {tag} should parse");
        }
        assert_eq!(Upos::parse("noun"), None);
        assert_eq!(Upos::parse("NN"), None);
    }

    #[test]
    fn test_sentence_word_lookup() {
        let sent = Sentence {
            words: vec![
                Word {
                    id: 1,
                    text: "это".into(),
                    lemma: "это".into(),
                    upos: Upos::Pron,
                },
                Word {
                    id: 2,
                    text: "Иван".into(),
                    lemma: "иван".into(),
                    upos: Upos::Propn,
                },
            ],
            deps: vec![],
        };
        assert_eq!(sent.word(2).unwrap().text, "Иван");
        assert!(sent.word(3).is_none());
        assert!(sent.word(0).is_none());
    }

    #[test]
    fn test_empty_document_has_no_first_sentence() {
        assert!(Document::default().first_sentence().is_none());
    }
}
