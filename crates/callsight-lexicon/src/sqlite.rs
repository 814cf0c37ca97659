//! SQLite-backed lexicon store
//!
//! Schema: `phrases` indexes a phrase to its synset ids, `synset_words` holds
//! the members. The connection sits behind a mutex so one handle can serve
//! the parallel batch driver.

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{params, Connection};

use crate::{Lexicon, LexiconError, MemoryLexicon, Synset, SynsetWord};

pub struct SqliteLexicon {
    conn: Mutex<Connection>,
}

impl SqliteLexicon {
    /// Open (creating the schema if needed) a lexicon database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LexiconError> {
        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        Ok(SqliteLexicon {
            conn: Mutex::new(conn),
        })
    }

    /// Import every entry of an in-memory lexicon, one transaction.
    /// Returns the number of synsets written.
    pub fn import(&self, lexicon: &MemoryLexicon) -> Result<usize, LexiconError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let mut count = 0;
        for (phrase, synsets) in lexicon.entries() {
            for synset in synsets {
                tx.execute("INSERT INTO synsets DEFAULT VALUES", [])?;
                let synset_id = tx.last_insert_rowid();
                tx.execute(
                    "INSERT INTO phrases(phrase, synset_id) VALUES(?1, ?2)",
                    params![phrase, synset_id],
                )?;
                for word in &synset.words {
                    tx.execute(
                        "INSERT INTO synset_words(synset_id, lemma, definition) VALUES(?1, ?2, ?3)",
                        params![synset_id, word.lemma, word.definition],
                    )?;
                }
                count += 1;
            }
        }
        tx.commit()?;
        Ok(count)
    }
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS synsets(id INTEGER PRIMARY KEY AUTOINCREMENT);
    CREATE TABLE IF NOT EXISTS phrases(phrase TEXT NOT NULL, synset_id INTEGER NOT NULL);
    CREATE TABLE IF NOT EXISTS synset_words(
        synset_id INTEGER NOT NULL,
        lemma TEXT NOT NULL,
        definition TEXT NOT NULL DEFAULT ''
    );
    CREATE INDEX IF NOT EXISTS idx_phrases_phrase ON phrases(phrase);
    CREATE INDEX IF NOT EXISTS idx_synset_words_synset ON synset_words(synset_id);
    "#,
    )
}

impl Lexicon for SqliteLexicon {
    fn synsets(&self, phrase: &str) -> Result<Vec<Synset>, LexiconError> {
        let conn = self.conn.lock();

        let mut phrase_stmt =
            conn.prepare_cached("SELECT synset_id FROM phrases WHERE phrase = ?1")?;
        let synset_ids: Vec<i64> = phrase_stmt
            .query_map(params![phrase], |row| row.get(0))?
            .collect::<Result<_, _>>()?;

        let mut word_stmt = conn.prepare_cached(
            "SELECT lemma, definition FROM synset_words WHERE synset_id = ?1 ORDER BY rowid",
        )?;
        let mut out = Vec::with_capacity(synset_ids.len());
        for id in synset_ids {
            let words = word_stmt
                .query_map(params![id], |row| {
                    Ok(SynsetWord {
                        lemma: row.get(0)?,
                        definition: row.get(1)?,
                    })
                })?
                .collect::<Result<_, _>>()?;
            out.push(Synset { words });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synset;

    #[test]
    fn test_import_then_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let db = SqliteLexicon::open(dir.path().join("lex.db")).unwrap();

        let mut mem = MemoryLexicon::new();
        mem.insert(
            "до свидания",
            synset(&[("прощание", "слова при расставании")]),
        );
        mem.insert("алло", synset(&[("алло", "возглас у телефона")]));
        assert_eq!(db.import(&mem).unwrap(), 2);

        let sets = db.synsets("до свидания").unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].words[0].lemma, "прощание");
        assert_eq!(sets[0].words[0].definition, "слова при расставании");
        assert!(db.synsets("пока").unwrap().is_empty());
    }

    #[test]
    fn test_word_order_is_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let db = SqliteLexicon::open(dir.path().join("lex.db")).unwrap();

        let mut mem = MemoryLexicon::new();
        mem.insert("пока", synset(&[("прощание", ""), ("алло", ""), ("пока", "")]));
        db.import(&mem).unwrap();

        let lemmas: Vec<String> = db.synsets("пока").unwrap()[0]
            .words
            .iter()
            .map(|w| w.lemma.clone())
            .collect();
        assert_eq!(lemmas, vec!["прощание", "алло", "пока"]);
    }
}
