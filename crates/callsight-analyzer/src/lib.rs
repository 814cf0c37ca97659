//! Callsight insight-extraction engine
//!
//! Consumes one dialogue's ordered manager turns and produces one `Insight`
//! record: did the manager greet / say goodbye (and with which utterance),
//! what name did they introduce themselves with, and which company came up.
//!
//! The linguistic collaborators are injected at construction and treated as
//! read-only services:
//! - `Normalizer` — casing/punctuation restoration for stripped STT text,
//! - `Annotator` — lemmas, UD tags, entities, dependency graph,
//! - `Lexicon` — synonym sets with definitions for phrase expansion.
//!
//! Merge discipline: every `Insight` field fills at most once. The first
//! utterance (in `line_n` order) that produces a truthy value for a field
//! wins; empty strings and `false` never overwrite anything.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use callsight_annotate::{normalize::strip_stt_punctuation, AnnotateError, Annotator, Normalizer};
use callsight_lexicon::{Lexicon, LexiconError};

pub mod matcher;
pub mod names;

pub use matcher::match_keywords;
pub use names::{extract_names, is_self_reference, search_dep};

/// How many turns at each end of a dialogue are eligible for detection:
/// greetings in the first window, partings in the last.
const BOUNDARY_WINDOW: i64 = 5;

/// One transcribed turn of the role under analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    /// Position within the dialogue, strictly increasing.
    pub line_n: i64,
    pub text: String,
}

/// The per-dialogue fact record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub name: Option<String>,
    pub company: Option<String>,
    pub greeted: bool,
    pub sent_off: bool,
    pub greeting: Option<String>,
    pub parting: Option<String>,
}

/// Greeting and parting keyword sets, compared at the lemma level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordConfig {
    pub greeting: Vec<String>,
    pub parting: Vec<String>,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        let owned = |words: &[&str]| words.iter().map(|s| s.to_string()).collect();
        KeywordConfig {
            greeting: owned(&[
                "привет",
                "приветствие",
                "приветствовать",
                "здравствовать",
                "здороваться",
            ]),
            parting: owned(&[
                "прощание",
                "прощаться",
                "попрощаться",
                "свидание",
                "пока",
            ]),
        }
    }
}

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error(transparent)]
    Annotate(#[from] AnnotateError),
    #[error(transparent)]
    Lexicon(#[from] LexiconError),
}

// ============================================================================
// Orchestration
// ============================================================================

pub struct InsightAnalyzer {
    normalizer: Box<dyn Normalizer>,
    annotator: Box<dyn Annotator>,
    lexicon: Box<dyn Lexicon>,
    keywords: KeywordConfig,
}

impl InsightAnalyzer {
    pub fn new(
        normalizer: Box<dyn Normalizer>,
        annotator: Box<dyn Annotator>,
        lexicon: Box<dyn Lexicon>,
        keywords: KeywordConfig,
    ) -> Self {
        InsightAnalyzer {
            normalizer,
            annotator,
            lexicon,
            keywords,
        }
    }

    /// Analyze one dialogue's turns, ascending `line_n` order expected.
    ///
    /// Turns within the first window get greeting detection plus
    /// name/company extraction; turns within the last window get parting
    /// detection. In dialogues shorter than twice the window the two
    /// overlap, and an utterance in the overlap runs through both — that is
    /// intentional, one line can greet and part at once.
    pub fn get_insight(&self, turns: &[Utterance]) -> Result<Insight, AnalyzeError> {
        let mut insight = Insight::default();
        let lines = turns.iter().map(|t| t.line_n);
        let (Some(first), Some(last)) = (lines.clone().min(), lines.max()) else {
            return Ok(insight);
        };

        for turn in turns {
            let stripped = strip_stt_punctuation(&turn.text);
            let restored = self.normalizer.restore(&stripped)?;
            let doc = self.annotator.annotate(&restored)?;
            debug!(line_n = turn.line_n, text = %restored, "analyzing turn");

            if turn.line_n < first + BOUNDARY_WINDOW {
                let (greeted, greeting) = matcher::match_keywords(
                    &doc,
                    &self.keywords.greeting,
                    self.lexicon.as_ref(),
                    self.annotator.as_ref(),
                )?;
                merge_flag(&mut insight.greeted, greeted);
                merge_text(&mut insight.greeting, greeting);

                let (name, company) = names::extract_names(&doc);
                merge_text(&mut insight.name, non_empty(name));
                merge_text(&mut insight.company, non_empty(company));
            }

            if turn.line_n >= last - BOUNDARY_WINDOW {
                let (sent_off, parting) = matcher::match_keywords(
                    &doc,
                    &self.keywords.parting,
                    self.lexicon.as_ref(),
                    self.annotator.as_ref(),
                )?;
                merge_flag(&mut insight.sent_off, sent_off);
                merge_text(&mut insight.parting, parting);
            }
        }

        Ok(insight)
    }
}

// ============================================================================
// First-wins merging
// ============================================================================

fn merge_flag(slot: &mut bool, value: bool) {
    if !*slot {
        *slot = value;
    }
}

fn merge_text(slot: &mut Option<String>, value: Option<String>) {
    if slot.is_none() {
        if let Some(v) = value {
            if !v.is_empty() {
                *slot = Some(v);
            }
        }
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
