//! Synonym/definition lexicon
//!
//! The phrase matcher expands candidate phrases through a lexical database:
//! a phrase maps to zero or more synonym sets (`Synset`), each set to member
//! words, each member to a lemma and a short definition string. This crate
//! holds the `Lexicon` trait plus two stores:
//! - `MemoryLexicon` — in-process map, loadable from a JSON file,
//! - `SqliteLexicon` — on-disk database (feature `sqlite`).

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(feature = "sqlite")]
pub mod sqlite;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteLexicon;

/// One member of a synonym set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynsetWord {
    pub lemma: String,
    /// Short gloss; re-annotated by the engine to search its lemmas.
    pub definition: String,
}

/// A grouping of words sharing one sense.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Synset {
    pub words: Vec<SynsetWord>,
}

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("lexicon JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "sqlite")]
    #[error("lexicon database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Phrase → synonym sets. An empty result means "no candidates", never an
/// error; lookups must be safe to share across threads.
pub trait Lexicon: Send + Sync {
    fn synsets(&self, phrase: &str) -> Result<Vec<Synset>, LexiconError>;
}

// ============================================================================
// In-memory store
// ============================================================================

/// JSON file shape: `{ "<phrase>": [ { "words": [ { "lemma", "definition" } ] } ] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryLexicon {
    entries: HashMap<String, Vec<Synset>>,
}

impl MemoryLexicon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LexiconError> {
        let entries = serde_json::from_str(&fs::read_to_string(path)?)?;
        Ok(MemoryLexicon { entries })
    }

    /// Add a synset under a phrase (appends to any existing sets).
    pub fn insert(&mut self, phrase: impl Into<String>, synset: Synset) {
        self.entries.entry(phrase.into()).or_default().push(synset);
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &Vec<Synset>)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Lexicon for MemoryLexicon {
    fn synsets(&self, phrase: &str) -> Result<Vec<Synset>, LexiconError> {
        Ok(self.entries.get(phrase).cloned().unwrap_or_default())
    }
}

/// Shorthand for building a synset from `(lemma, definition)` pairs.
pub fn synset(words: &[(&str, &str)]) -> Synset {
    Synset {
        words: words
            .iter()
            .map(|(lemma, definition)| SynsetWord {
                lemma: lemma.to_string(),
                definition: definition.to_string(),
            })
            .collect(),
    }
}
