//! Pre-annotated corpus annotator
//!
//! Serves annotations from a CoNLL-U corpus file instead of a live pipeline.
//! Every document in the corpus is keyed by its `# newdoc text = ...` header —
//! the exact string `annotate` will be called with. Used for offline batch
//! runs (annotate once, analyze many times) and throughout the tests.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::{conllu, AnnotateError, Annotator, Document};

#[derive(Debug, Default)]
pub struct CorpusAnnotator {
    docs: HashMap<String, Document>,
}

impl CorpusAnnotator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a corpus from CoNLL-U text.
    pub fn from_conllu(input: &str) -> Result<Self, AnnotateError> {
        let mut annotator = Self::new();
        for doc in conllu::parse_corpus(input)? {
            annotator.insert(doc);
        }
        Ok(annotator)
    }

    /// Load a corpus from a CoNLL-U file on disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AnnotateError> {
        Self::from_conllu(&fs::read_to_string(path)?)
    }

    /// Register a document under its own text. Replaces any previous entry
    /// for the same text.
    pub fn insert(&mut self, doc: Document) {
        self.docs.insert(doc.text.clone(), doc);
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl Annotator for CorpusAnnotator {
    fn annotate(&self, text: &str) -> Result<Document, AnnotateError> {
        self.docs
            .get(text)
            .cloned()
            .ok_or_else(|| AnnotateError::UnknownText(text.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORPUS: &str = "\
# newdoc text = до свидания
1\tдо\tдо\tADP\t_\t_\t2\tcase\t_\t_
2\tсвидания\tсвидание\tNOUN\t_\t_\t0\troot\t_\t_

# newdoc text = привет
1\tпривет\tпривет\tNOUN\t_\t_\t0\troot\t_\t_
";

    #[test]
    fn test_lookup_by_exact_text() {
        let annotator = CorpusAnnotator::from_conllu(CORPUS).unwrap();
        assert_eq!(annotator.len(), 2);
        let doc = annotator.annotate("до свидания").unwrap();
        assert_eq!(doc.sentences[0].words[1].lemma, "свидание");
    }

    #[test]
    fn test_missing_text_is_an_error() {
        let annotator = CorpusAnnotator::from_conllu(CORPUS).unwrap();
        let e = annotator.annotate("пока").unwrap_err();
        assert!(matches!(e, AnnotateError::UnknownText(_)));
    }
}
