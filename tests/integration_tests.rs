//! Integration tests for the complete Callsight pipeline
//!
//! These tests verify end-to-end functionality across crates:
//! - CSV transcript → grouping/slicing → analyzer → insight JSON
//! - Corpus annotator + lexicon wired through the analyzer traits
//!
//! Run with: cargo test --test integration_tests

use std::fs;

use tempfile::tempdir;

use callsight_analyzer::{InsightAnalyzer, KeywordConfig};
use callsight_annotate::{CorpusAnnotator, Passthrough};
use callsight_lexicon::{synset, MemoryLexicon};
use callsight_transcript::{boundary_turns, group_dialogues, read_rows};

// ============================================================================
// Shared fixtures
// ============================================================================

/// Corpus keyed by stripped lowercase text (the tests run the `Passthrough`
/// normalizer).
const CORPUS: &str = "\
# newdoc text = алло это иван из компании ромашка
1\tалло\tалло\tINTJ\t_\t_\t3\tdiscourse\t_\t_
2\tэто\tэто\tPRON\t_\t_\t3\tnsubj\t_\t_
3\tИван\tиван\tPROPN\t_\t_\t0\troot\t_\tNER=B-PER
4\tиз\tиз\tADP\t_\t_\t5\tcase\t_\t_
5\tкомпании\tкомпания\tNOUN\t_\t_\t3\tnmod\t_\t_
6\tРомашка\tромашка\tNOUN\t_\t_\t5\tappos\t_\t_

# newdoc text = добрый день
1\tдобрый\tдобрый\tADJ\t_\t_\t2\tamod\t_\t_
2\tдень\tдень\tNOUN\t_\t_\t0\troot\t_\t_

# newdoc text = вас беспокоит банк открытие
1\tвас\tвы\tPRON\t_\t_\t2\tobj\t_\t_
2\tбеспокоит\tбеспокоить\tVERB\t_\t_\t0\troot\t_\t_
3\tбанк\tбанк\tNOUN\t_\t_\t2\tnsubj\t_\tNER=B-ORG
4\tоткрытие\tоткрытие\tNOUN\t_\t_\t3\tappos\t_\tNER=I-ORG

# newdoc text = до свидания
1\tдо\tдо\tADP\t_\t_\t2\tcase\t_\t_
2\tсвидания\tсвидание\tNOUN\t_\t_\t0\troot\t_\t_
";

fn lexicon() -> MemoryLexicon {
    let mut lex = MemoryLexicon::new();
    // Phone pickup: carries a greeting keyword but must never match.
    lex.insert(
        "алло это",
        synset(&[("приветствие", ""), ("алло", "")]),
    );
    // Definition-level match: no keyword among the lemmas, the gloss has it.
    lex.insert(
        "добрый день",
        synset(&[("здравствуйте", "формула приветствия при встрече")]),
    );
    lex.insert("до свидания", synset(&[("прощание", "")]));
    lex
}

fn definitions_corpus() -> &'static str {
    "\
# newdoc text = формула приветствия при встрече
1\tформула\tформула\tNOUN\t_\t_\t0\troot\t_\t_
2\tприветствия\tприветствие\tNOUN\t_\t_\t1\tnmod\t_\t_
3\tпри\tпри\tADP\t_\t_\t4\tcase\t_\t_
4\tвстрече\tвстреча\tNOUN\t_\t_\t1\tnmod\t_\t_
"
}

fn analyzer() -> InsightAnalyzer {
    let corpus = format!("{CORPUS}\n{}", definitions_corpus());
    InsightAnalyzer::new(
        Box::new(Passthrough),
        Box::new(CorpusAnnotator::from_conllu(&corpus).unwrap()),
        Box::new(lexicon()),
        KeywordConfig {
            greeting: vec!["приветствие".to_string()],
            parting: vec!["прощание".to_string()],
        },
    )
}

// ============================================================================
// CSV → dialogues → insights
// ============================================================================

#[test]
fn test_transcript_to_insights_end_to_end() {
    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("calls.csv");
    fs::write(
        &csv_path,
        "\
dlg_id,line_n,role,text
0,0,manager,алло это иван из компании ромашка
0,1,client,добрый день
0,2,manager,добрый день
0,3,manager,до свидания
1,0,manager,вас беспокоит банк открытие
1,1,manager,до свидания
",
    )
    .unwrap();

    let rows = read_rows(&csv_path).unwrap();
    let dialogues = group_dialogues(rows, "manager");
    assert_eq!(dialogues.len(), 2);
    assert_eq!(dialogues[0].rows.len(), 3);

    let analyzer = analyzer();
    let insights: Vec<_> = dialogues
        .iter()
        .map(|d| analyzer.get_insight(&boundary_turns(d)).unwrap())
        .collect();

    // Dialogue 0: the pickup line introduces the speaker and the company
    // but is excluded as a greeting; the real greeting comes on line 2 via
    // a definition-level match; the parting closes it.
    let first = &insights[0];
    assert_eq!(first.name.as_deref(), Some("Иван"));
    assert_eq!(first.company.as_deref(), Some("Ромашка"));
    assert!(first.greeted);
    assert_eq!(first.greeting.as_deref(), Some("добрый день"));
    assert!(first.sent_off);
    assert_eq!(first.parting.as_deref(), Some("до свидания"));

    // Dialogue 1: ORG entity spanning two words, no self-introduction.
    let second = &insights[1];
    assert_eq!(second.name, None);
    assert_eq!(second.company.as_deref(), Some("банк открытие"));
    assert!(!second.greeted);
    assert!(second.sent_off);
}

#[test]
fn test_insight_json_field_contract() {
    let analyzer = analyzer();
    let insight = analyzer
        .get_insight(&boundary_turns(&group_dialogues(
            vec![callsight_transcript::TranscriptRow {
                dlg_id: "0".to_string(),
                line_n: 0,
                role: "manager".to_string(),
                text: "до свидания".to_string(),
            }],
            "manager",
        )[0]))
        .unwrap();

    let json = serde_json::to_value(&insight).unwrap();
    assert_eq!(json["sent_off"], serde_json::Value::Bool(true));
    assert_eq!(json["parting"], "до свидания");
    assert_eq!(json["name"], serde_json::Value::Null);
    assert_eq!(json["company"], serde_json::Value::Null);
    assert_eq!(json["greeted"], serde_json::Value::Bool(false));
    assert_eq!(json["greeting"], serde_json::Value::Null);
}

#[test]
fn test_first_wins_across_a_long_dialogue() {
    // 12 manager turns: two self-introductions; the earlier one's name must
    // survive, and line 11's parting lands because it is in the tail window.
    let mut csv = String::from("dlg_id,line_n,role,text\n");
    for n in 0..12 {
        let text = match n {
            0 | 1 => "алло это иван из компании ромашка",
            11 => "до свидания",
            _ => "добрый день",
        };
        csv.push_str(&format!("0,{n},manager,{text}\n"));
    }

    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("calls.csv");
    fs::write(&csv_path, &csv).unwrap();

    let dialogues = group_dialogues(read_rows(&csv_path).unwrap(), "manager");
    let turns = boundary_turns(&dialogues[0]);
    assert_eq!(turns.len(), 10);

    let insight = analyzer().get_insight(&turns).unwrap();
    assert_eq!(insight.name.as_deref(), Some("Иван"));
    assert_eq!(insight.company.as_deref(), Some("Ромашка"));
    assert!(insight.greeted);
    // Greeting text is the first matching utterance in scan order.
    assert_eq!(insight.greeting.as_deref(), Some("добрый день"));
    assert!(insight.sent_off);
    assert_eq!(insight.parting.as_deref(), Some("до свидания"));
}
