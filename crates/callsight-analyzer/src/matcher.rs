//! Greeting/parting phrase matching
//!
//! Greetings and partings are short, lexically varied, and convention-bound;
//! exact keyword matching on surface words misses paraphrases
//! ("приветствую" vs "привет"). The matcher instead expands every candidate
//! phrase through the synonym lexicon and also searches the *definitions* of
//! those synonyms — a definition often contains the canonical keyword even
//! when no direct synonym does.
//!
//! Candidate phrases are all 2-word and 3-word windows of the first sentence,
//! probed in order: all 2-word windows left to right, then all 3-word
//! windows. Single words are never probed on their own.

use std::collections::HashMap;

use tracing::debug;

use callsight_annotate::{Annotator, Document};
use callsight_lexicon::Lexicon;

use crate::AnalyzeError;

/// Phone-pickup interjection: its synonym sense overlaps the greeting
/// keywords, so any phrase whose synonyms include it is disqualified.
const PHONE_PICKUP_LEMMA: &str = "алло";

/// Scan the first sentence of `doc` for a phrase whose synonym expansion
/// reaches one of `keywords`. On a match, returns the entire document text
/// (the caller reports the whole utterance, not the matched span).
pub fn match_keywords(
    doc: &Document,
    keywords: &[String],
    lexicon: &dyn Lexicon,
    annotator: &dyn Annotator,
) -> Result<(bool, Option<String>), AnalyzeError> {
    let Some(sentence) = doc.first_sentence() else {
        return Ok((false, None));
    };
    let words = &sentence.words;

    // Definitions repeat across synsets; annotate each distinct one once
    // per invocation (the annotator is deterministic).
    let mut def_cache: HashMap<String, Vec<String>> = HashMap::new();

    for gap in 1..=2usize {
        if words.len() <= gap {
            continue;
        }
        for j in 0..words.len() - gap {
            let phrase = words[j..=j + gap]
                .iter()
                .map(|w| w.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase();

            let synsets = lexicon.synsets(&phrase)?;
            let members: Vec<_> = synsets.iter().flat_map(|s| s.words.iter()).collect();
            if members.is_empty() {
                continue;
            }

            if members.iter().any(|w| w.lemma == PHONE_PICKUP_LEMMA) {
                debug!(phrase = %phrase, "phrase disqualified by phone-pickup sense");
                continue;
            }

            if members
                .iter()
                .any(|w| keywords.iter().any(|k| *k == w.lemma))
            {
                debug!(phrase = %phrase, "matched via synonym lemma");
                return Ok((true, Some(doc.text.clone())));
            }

            for member in &members {
                if !def_cache.contains_key(&member.definition) {
                    let lemmas = definition_lemmas(&member.definition, annotator)?;
                    def_cache.insert(member.definition.clone(), lemmas);
                }
                let def_lemmas = &def_cache[&member.definition];
                if keywords.iter().any(|k| def_lemmas.contains(k)) {
                    debug!(phrase = %phrase, lemma = %member.lemma, "matched via definition");
                    return Ok((true, Some(doc.text.clone())));
                }
            }
        }
    }

    Ok((false, None))
}

/// Lemmas of the first sentence of a re-annotated definition. Empty
/// definitions and definitions that annotate to zero sentences contribute
/// nothing.
fn definition_lemmas(
    definition: &str,
    annotator: &dyn Annotator,
) -> Result<Vec<String>, AnalyzeError> {
    if definition.trim().is_empty() {
        return Ok(Vec::new());
    }
    let doc = annotator.annotate(definition)?;
    Ok(doc
        .first_sentence()
        .map(|s| s.words.iter().map(|w| w.lemma.clone()).collect())
        .unwrap_or_default())
}
