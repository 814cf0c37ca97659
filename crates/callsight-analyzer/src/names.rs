//! Name and company extraction
//!
//! Two-pass heuristic over one annotated utterance:
//! 1. entity pass — PERSON entities gated by a self-reference check on the
//!    dependency graph (the sentence must structurally read "I am X" /
//!    "this is X", not mention a third party); ORGANIZATION entities taken
//!    as-is,
//! 2. keyword fallback for the company — anchored on a word with lemma
//!    "компания", collecting the run of nouns that follows it.

use callsight_annotate::{Document, EntityKind, Upos, Word};

const COMPANY_LEMMA: &str = "компания";
const SELF_LEMMAS: [&str; 2] = ["я", "это"];
const NSUBJ: &str = "nsubj";
const OBJ: &str = "obj";

/// Extract `(person_name, org_name)` from one annotated utterance. Empty
/// string means "not found" — the sentinel the first-wins merge treats as
/// falsy.
///
/// The first self-referencing PERSON entity wins; for ORGANIZATION the last
/// entity wins. The asymmetry is intentional and load-bearing for extraction
/// results.
pub fn extract_names(doc: &Document) -> (String, String) {
    let mut person_name = String::new();
    let mut org_name = String::new();

    for entity in &doc.entities {
        match &entity.kind {
            EntityKind::Person => {
                if person_name.is_empty() {
                    if let Some(&first_id) = entity.word_ids.first() {
                        if is_self_reference(doc, first_id) {
                            person_name = entity.text.clone();
                        }
                    }
                }
            }
            EntityKind::Organization => {
                org_name = entity.text.clone();
            }
            _ => {}
        }
    }

    if org_name.is_empty() {
        org_name = company_fallback(doc);
    }

    (person_name, org_name)
}

/// Does the dependency graph say this PERSON word is the speaker naming
/// themselves?
///
/// Looks for a nominal subject link from the name to a verb, then an object
/// pronoun under that verb; without a verb, for a pronoun directly tied to
/// the name. True iff the pronoun's lemma is "я" or "это".
pub fn is_self_reference(doc: &Document, person_id: usize) -> bool {
    let root = search_dep(doc, person_id, NSUBJ, Upos::Verb);
    let pronoun = match root {
        Some(root) => search_dep(doc, root.id, OBJ, Upos::Pron),
        None => search_dep(doc, person_id, NSUBJ, Upos::Pron),
    };
    matches!(pronoun, Some(p) if SELF_LEMMAS.contains(&p.lemma.as_str()))
}

/// Find, among the first sentence's dependency edges touching `target_id`,
/// one labeled `rel` whose other endpoint carries `wanted` — the last
/// qualifying edge wins. The artificial root (`head == 0`) never qualifies.
pub fn search_dep<'a>(
    doc: &'a Document,
    target_id: usize,
    rel: &str,
    wanted: Upos,
) -> Option<&'a Word> {
    let sentence = doc.first_sentence()?;
    let mut result = None;
    for edge in &sentence.deps {
        if edge.rel != rel {
            continue;
        }
        let other = if edge.head == target_id {
            edge.dep
        } else if edge.dep == target_id {
            edge.head
        } else {
            continue;
        };
        if let Some(word) = sentence.word(other) {
            if word.upos == wanted {
                result = Some(word);
            }
        }
    }
    result
}

/// Company-by-keyword fallback: from the word right after the first
/// "компания" anchor, walk forward while words are nouns or punctuation and
/// collect the noun texts. Stops at the sentence end or the first word of
/// any other category.
fn company_fallback(doc: &Document) -> String {
    let Some(sentence) = doc.first_sentence() else {
        return String::new();
    };
    let words = &sentence.words;
    let Some(anchor) = words.iter().find(|w| w.lemma == COMPANY_LEMMA) else {
        return String::new();
    };

    // The anchor's 1-based id doubles as the 0-based index of the word
    // following it.
    let mut parts: Vec<&str> = Vec::new();
    for word in words.iter().skip(anchor.id) {
        match word.upos {
            Upos::Noun => parts.push(&word.text),
            Upos::Punct => {}
            _ => break,
        }
    }
    parts.join(" ")
}
