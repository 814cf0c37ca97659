//! Transcript loading and dialogue grouping
//!
//! Reads call transcripts from CSV (`dlg_id,line_n,role,text`, one row per
//! transcribed line, pre-sorted by `line_n` within each dialogue), filters
//! to the speaker role under analysis, groups rows by dialogue in
//! first-appearance order, and slices each dialogue down to its boundary
//! turns — only the first and last few lines matter for greeting/parting
//! detection.

use std::fs::File;
use std::io;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use callsight_analyzer::Utterance;

/// First/last rows of a dialogue handed to the analyzer.
pub const BOUNDARY_ROWS: usize = 5;

#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// One CSV row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TranscriptRow {
    pub dlg_id: String,
    pub line_n: i64,
    pub role: String,
    pub text: String,
}

/// One speaker role's rows of one dialogue, in input order.
#[derive(Debug, Clone)]
pub struct Dialogue {
    pub dlg_id: String,
    pub rows: Vec<TranscriptRow>,
}

/// Read all rows of a transcript CSV file.
pub fn read_rows(path: impl AsRef<Path>) -> Result<Vec<TranscriptRow>, TranscriptError> {
    read_rows_from(File::open(path)?)
}

/// Read all rows from any CSV source (must include the header row).
pub fn read_rows_from(reader: impl io::Read) -> Result<Vec<TranscriptRow>, TranscriptError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for row in csv_reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Keep one role's rows and group them by dialogue id, dialogues ordered by
/// first appearance in the input.
pub fn group_dialogues(rows: Vec<TranscriptRow>, role: &str) -> Vec<Dialogue> {
    let mut dialogues: Vec<Dialogue> = Vec::new();
    for row in rows {
        if row.role != role {
            continue;
        }
        match dialogues.iter_mut().find(|d| d.dlg_id == row.dlg_id) {
            Some(dialogue) => dialogue.rows.push(row),
            None => dialogues.push(Dialogue {
                dlg_id: row.dlg_id.clone(),
                rows: vec![row],
            }),
        }
    }
    dialogues
}

/// The boundary subset of a dialogue: its first and last `BOUNDARY_ROWS`
/// rows, as analyzer utterances. Short dialogues where the head and tail
/// overlap yield each row once (processing a row twice cannot change a
/// first-wins merge).
pub fn boundary_turns(dialogue: &Dialogue) -> Vec<Utterance> {
    let rows = &dialogue.rows;
    let to_utterance = |row: &TranscriptRow| Utterance {
        line_n: row.line_n,
        text: row.text.clone(),
    };

    if rows.len() <= 2 * BOUNDARY_ROWS {
        return rows.iter().map(to_utterance).collect();
    }
    rows[..BOUNDARY_ROWS]
        .iter()
        .chain(&rows[rows.len() - BOUNDARY_ROWS..])
        .map(to_utterance)
        .collect()
}
