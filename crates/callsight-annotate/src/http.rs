//! HTTP annotator
//!
//! Client for a UDPipe-style annotation service: `POST /process` with the
//! text, response carries the CoNLL-U serialization under `"result"`. The
//! service does tokenization/tagging/parsing/NER; this side only parses the
//! CoNLL-U and re-keys the document by the exact input text.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{conllu, AnnotateError, Annotator, Document};

pub struct HttpAnnotator {
    client: reqwest::blocking::Client,
    url: String,
}

#[derive(Serialize)]
struct ProcessRequest<'a> {
    data: &'a str,
}

#[derive(Deserialize)]
struct ProcessResponse {
    result: String,
}

impl HttpAnnotator {
    /// `url` is the service base, e.g. `http://localhost:8000`.
    pub fn new(url: impl Into<String>) -> Self {
        HttpAnnotator {
            client: reqwest::blocking::Client::new(),
            url: url.into(),
        }
    }
}

impl Annotator for HttpAnnotator {
    fn annotate(&self, text: &str) -> Result<Document, AnnotateError> {
        let endpoint = format!("{}/process", self.url.trim_end_matches('/'));
        debug!(endpoint = %endpoint, len = text.len(), "annotating over HTTP");

        let response = self
            .client
            .post(&endpoint)
            .json(&ProcessRequest { data: text })
            .send()
            .map_err(|e| AnnotateError::Service(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AnnotateError::Service(format!(
                "annotation service returned {}",
                response.status()
            )));
        }

        let body: ProcessResponse = response
            .json()
            .map_err(|e| AnnotateError::Service(e.to_string()))?;

        let mut doc = Document::default();
        for parsed in conllu::parse_corpus(&body.result)? {
            let offset = doc.sentences.len();
            doc.sentences.extend(parsed.sentences);
            doc.entities.extend(parsed.entities.into_iter().map(|mut e| {
                e.sentence += offset;
                e
            }));
        }
        // The service echoes its own text reconstruction; the engine keys
        // everything (and reports matches) by the text it sent.
        doc.text = text.to_string();
        Ok(doc)
    }
}
