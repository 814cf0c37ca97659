//! Callsight CLI
//!
//! Command-line interface for:
//! - Analyzing transcript CSVs into per-dialogue insight records (`analyze`)
//! - Annotating a single text for inspection (`annotate`)
//! - Probing and importing synonym lexicons (`lexicon`)
//!
//! Status lines and logs go to stderr; stdout carries only the JSON payload
//! of the invoked command.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use std::fs;
use std::path::PathBuf;

use callsight_analyzer::{Insight, InsightAnalyzer, KeywordConfig};
use callsight_annotate::{Annotator, CorpusAnnotator, Normalizer, Passthrough, RuleNormalizer};
use callsight_lexicon::{Lexicon, MemoryLexicon};
use callsight_transcript::{boundary_turns, group_dialogues};

#[derive(Parser)]
#[command(name = "callsight")]
#[command(
    author,
    version,
    about = "Callsight: structured fact extraction from call transcripts"
)]
struct Cli {
    /// Log filter written to stderr (overrides RUST_LOG), e.g. `debug`
    /// or `callsight_analyzer=debug`.
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a transcript CSV into one insight record per dialogue.
    ///
    /// Rows are filtered to one speaker role, grouped by `dlg_id`, sliced
    /// to the boundary turns of each dialogue, and analyzed in parallel
    /// (one dialogue per task; turn order within a dialogue is preserved).
    Analyze {
        /// Input CSV (`dlg_id,line_n,role,text`)
        #[arg(short, long)]
        input: PathBuf,
        /// Output JSON path (the results are also echoed to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Speaker role whose turns are analyzed
        #[arg(long, default_value = "manager")]
        role: String,
        /// Keyword overrides: JSON with `greeting`/`parting` lemma arrays
        #[arg(long)]
        keywords: Option<PathBuf>,
        #[command(flatten)]
        annotator: AnnotatorArgs,
        #[command(flatten)]
        lexicon: LexiconArgs,
    },

    /// Annotate one text and print the document JSON (inspection aid).
    Annotate {
        text: String,
        #[command(flatten)]
        annotator: AnnotatorArgs,
    },

    /// Lexicon stores: probe phrases, import JSON into SQLite.
    Lexicon {
        #[command(subcommand)]
        command: LexiconCommands,
    },
}

#[derive(Subcommand)]
enum LexiconCommands {
    /// Print the synsets a phrase expands to.
    Lookup {
        phrase: String,
        #[command(flatten)]
        lexicon: LexiconArgs,
    },

    /// Import a JSON lexicon file into a SQLite lexicon database.
    #[cfg(feature = "sqlite")]
    Import {
        /// JSON lexicon (`{ "<phrase>": [ { "words": [...] } ] }`)
        input: PathBuf,
        /// Database path (created if missing)
        #[arg(long)]
        db: PathBuf,
    },
}

#[derive(Args)]
struct AnnotatorArgs {
    /// Pre-annotated CoNLL-U corpus keyed by `# newdoc text = ...`
    #[arg(long)]
    annotations: Option<PathBuf>,
    /// UDPipe-style annotation service base URL
    #[cfg(feature = "http")]
    #[arg(long)]
    annotator_url: Option<String>,
    /// Restore casing/punctuation with the rule normalizer before
    /// annotation (default: pass stripped text through unchanged)
    #[arg(long)]
    restore: bool,
}

#[derive(Args)]
struct LexiconArgs {
    /// JSON lexicon file
    #[arg(long)]
    lexicon: Option<PathBuf>,
    /// SQLite lexicon database
    #[cfg(feature = "sqlite")]
    #[arg(long)]
    lexicon_db: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log.as_deref());

    match cli.command {
        Commands::Analyze {
            input,
            output,
            role,
            keywords,
            annotator,
            lexicon,
        } => cmd_analyze(
            &input,
            output.as_ref(),
            &role,
            keywords.as_ref(),
            &annotator,
            &lexicon,
        ),
        Commands::Annotate { text, annotator } => cmd_annotate(&text, &annotator),
        Commands::Lexicon { command } => match command {
            LexiconCommands::Lookup { phrase, lexicon } => cmd_lexicon_lookup(&phrase, &lexicon),
            #[cfg(feature = "sqlite")]
            LexiconCommands::Import { input, db } => cmd_lexicon_import(&input, &db),
        },
    }
}

fn init_tracing(filter: Option<&str>) {
    use tracing_subscriber::EnvFilter;

    let filter = match filter {
        Some(f) => EnvFilter::new(f),
        None => EnvFilter::from_default_env(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// ============================================================================
// Commands
// ============================================================================

fn cmd_analyze(
    input: &PathBuf,
    output: Option<&PathBuf>,
    role: &str,
    keywords: Option<&PathBuf>,
    annotator_args: &AnnotatorArgs,
    lexicon_args: &LexiconArgs,
) -> Result<()> {
    eprintln!(
        "{} transcript {}",
        "Analyzing".green().bold(),
        input.display()
    );

    let rows = callsight_transcript::read_rows(input)
        .with_context(|| format!("reading transcript {}", input.display()))?;
    let dialogues = group_dialogues(rows, role);
    eprintln!(
        "  {} {} dialogues for role {:?}",
        "→".cyan(),
        dialogues.len(),
        role
    );

    let analyzer = InsightAnalyzer::new(
        build_normalizer(annotator_args),
        build_annotator(annotator_args)?,
        build_lexicon(lexicon_args)?,
        load_keywords(keywords)?,
    );

    // One task per dialogue; the first collaborator error aborts the batch.
    let insights: Vec<Insight> = dialogues
        .par_iter()
        .map(|dialogue| analyzer.get_insight(&boundary_turns(dialogue)))
        .collect::<Result<_, _>>()
        .context("analyzing dialogues")?;

    let greeted = insights.iter().filter(|i| i.greeted).count();
    let sent_off = insights.iter().filter(|i| i.sent_off).count();
    eprintln!(
        "  {} {} greeted, {} sent off",
        "→".yellow(),
        greeted,
        sent_off
    );

    let json = serde_json::to_string_pretty(&insights)?;
    if let Some(path) = output {
        fs::write(path, &json).with_context(|| format!("writing {}", path.display()))?;
        eprintln!("  {} {}", "→".cyan(), path.display());
    }
    println!("{json}");
    Ok(())
}

fn cmd_annotate(text: &str, annotator_args: &AnnotatorArgs) -> Result<()> {
    let normalizer = build_normalizer(annotator_args);
    let annotator = build_annotator(annotator_args)?;

    let stripped = callsight_annotate::normalize::strip_stt_punctuation(text);
    let restored = normalizer.restore(&stripped)?;
    let doc = annotator.annotate(&restored)?;

    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

fn cmd_lexicon_lookup(phrase: &str, lexicon_args: &LexiconArgs) -> Result<()> {
    let lexicon = build_lexicon(lexicon_args)?;
    let synsets = lexicon.synsets(phrase)?;
    eprintln!(
        "{} {:?}: {} synsets",
        "Phrase".green().bold(),
        phrase,
        synsets.len()
    );
    println!("{}", serde_json::to_string_pretty(&synsets)?);
    Ok(())
}

#[cfg(feature = "sqlite")]
fn cmd_lexicon_import(input: &PathBuf, db: &PathBuf) -> Result<()> {
    use callsight_lexicon::SqliteLexicon;

    eprintln!(
        "{} lexicon {} into {}",
        "Importing".green().bold(),
        input.display(),
        db.display()
    );
    let memory = MemoryLexicon::from_file(input)
        .with_context(|| format!("reading lexicon {}", input.display()))?;
    let store = SqliteLexicon::open(db)?;
    let count = store.import(&memory)?;
    eprintln!("  {} {} synsets imported", "→".cyan(), count);
    Ok(())
}

// ============================================================================
// Collaborator construction
// ============================================================================

fn build_normalizer(args: &AnnotatorArgs) -> Box<dyn Normalizer> {
    if args.restore {
        Box::new(RuleNormalizer::new())
    } else {
        Box::new(Passthrough)
    }
}

fn build_annotator(args: &AnnotatorArgs) -> Result<Box<dyn Annotator>> {
    if let Some(path) = &args.annotations {
        let corpus = CorpusAnnotator::from_file(path)
            .with_context(|| format!("loading annotation corpus {}", path.display()))?;
        return Ok(Box::new(corpus));
    }
    #[cfg(feature = "http")]
    if let Some(url) = &args.annotator_url {
        return Ok(Box::new(callsight_annotate::HttpAnnotator::new(url.clone())));
    }
    Err(anyhow!(
        "no annotator configured: pass --annotations <corpus.conllu>"
    ))
}

fn build_lexicon(args: &LexiconArgs) -> Result<Box<dyn Lexicon>> {
    if let Some(path) = &args.lexicon {
        let lexicon = MemoryLexicon::from_file(path)
            .with_context(|| format!("loading lexicon {}", path.display()))?;
        return Ok(Box::new(lexicon));
    }
    #[cfg(feature = "sqlite")]
    if let Some(path) = &args.lexicon_db {
        return Ok(Box::new(callsight_lexicon::SqliteLexicon::open(path)?));
    }
    Err(anyhow!("no lexicon configured: pass --lexicon <lexicon.json>"))
}

fn load_keywords(path: Option<&PathBuf>) -> Result<KeywordConfig> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading keywords {}", path.display()))?;
            Ok(serde_json::from_str(&text)?)
        }
        None => Ok(KeywordConfig::default()),
    }
}
