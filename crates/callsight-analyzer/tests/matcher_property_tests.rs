//! Property tests for the phrase-window generation of the matcher.
//!
//! The matcher must probe exactly the 2-word and 3-word contiguous windows
//! of the first sentence — never single words, never longer spans — in
//! order: all 2-word windows left to right, then all 3-word windows.

use std::sync::Mutex;

use proptest::prelude::*;

use callsight_analyzer::match_keywords;
use callsight_annotate::{CorpusAnnotator, Document, Sentence, Upos, Word};
use callsight_lexicon::{Lexicon, LexiconError, Synset};

/// Lexicon that records every probed phrase and never answers.
#[derive(Default)]
struct RecordingLexicon {
    probes: Mutex<Vec<String>>,
}

impl Lexicon for RecordingLexicon {
    fn synsets(&self, phrase: &str) -> Result<Vec<Synset>, LexiconError> {
        self.probes.lock().unwrap().push(phrase.to_string());
        Ok(Vec::new())
    }
}

fn sentence_doc(texts: &[String]) -> Document {
    let words = texts
        .iter()
        .enumerate()
        .map(|(i, text)| Word {
            id: i + 1,
            text: text.clone(),
            lemma: text.clone(),
            upos: Upos::Noun,
        })
        .collect();
    Document {
        text: texts.join(" "),
        sentences: vec![Sentence {
            words,
            deps: Vec::new(),
        }],
        entities: Vec::new(),
    }
}

fn expected_probes(texts: &[String]) -> Vec<String> {
    let mut probes = Vec::new();
    for gap in 1..=2usize {
        if texts.len() <= gap {
            continue;
        }
        for j in 0..texts.len() - gap {
            probes.push(texts[j..=j + gap].join(" ").to_lowercase());
        }
    }
    probes
}

fn word_text() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[а-яa-z]{1,6}").unwrap()
}

proptest! {
    #[test]
    fn probed_phrases_are_exactly_the_2_and_3_word_windows(
        texts in proptest::collection::vec(word_text(), 0..8)
    ) {
        let lexicon = RecordingLexicon::default();
        let doc = sentence_doc(&texts);
        let keywords = vec!["прощание".to_string()];

        let (found, matched) =
            match_keywords(&doc, &keywords, &lexicon, &CorpusAnnotator::new()).unwrap();
        prop_assert!(!found);
        prop_assert_eq!(matched, None);

        let probes = lexicon.probes.lock().unwrap();
        prop_assert_eq!(&*probes, &expected_probes(&texts));

        // Every probe covers 2 or 3 words, nothing else.
        for phrase in probes.iter() {
            let len = phrase.split(' ').count();
            prop_assert!(len == 2 || len == 3, "probed a {}-word span: {:?}", len, phrase);
        }
    }
}
