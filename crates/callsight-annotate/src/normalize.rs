//! Text normalization for transcribed speech
//!
//! Speech-to-text output arrives lowercased with stray punctuation. The engine
//! first strips it down to bare lowercase words (`strip_stt_punctuation`), then
//! asks a `Normalizer` to restore casing/punctuation so the annotation
//! pipeline sees text shaped like what it was trained on.

use regex::Regex;

use crate::{AnnotateError, Normalizer};

/// ASCII punctuation set stripped from raw transcript lines.
const STT_PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Lowercase a raw transcript line and drop all STT punctuation.
pub fn strip_stt_punctuation(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| !STT_PUNCTUATION.contains(*c))
        .collect()
}

/// Identity restoration: hands the stripped text to the annotator unchanged.
///
/// Used when the annotation corpus is keyed by stripped text, and in tests.
pub struct Passthrough;

impl Normalizer for Passthrough {
    fn restore(&self, text: &str) -> Result<String, AnnotateError> {
        Ok(text.to_string())
    }
}

/// Deterministic rule-based restoration: collapse runs of whitespace,
/// uppercase the first letter, and close the utterance with a period.
///
/// A stand-in for a learned punctuation model behind the same trait; it keeps
/// offline runs reproducible.
pub struct RuleNormalizer {
    whitespace: Regex,
}

impl RuleNormalizer {
    pub fn new() -> Self {
        RuleNormalizer {
            whitespace: Regex::new(r"\s+").unwrap(),
        }
    }
}

impl Default for RuleNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer for RuleNormalizer {
    fn restore(&self, text: &str) -> Result<String, AnnotateError> {
        let collapsed = self.whitespace.replace_all(text.trim(), " ");
        let mut chars = collapsed.chars();
        let mut out = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
            None => return Ok(String::new()),
        };
        if !out.ends_with(['.', '!', '?']) {
            out.push('.');
        }
        Ok(out)
    }
}
