use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use folio::{Document, ExtractorConfig, Format, SentenceExtractor};

#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(about = "Parse prose documents into sentences with exact source positions")]
#[command(version)]
struct Args {
    /// Documents to parse
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Input format (plain, wiki, properties, po, asciidoc, markdown, review); guessed from the
    /// file extension when omitted
    #[arg(long)]
    format: Option<Format>,

    /// Language code selecting the default extraction rules
    #[arg(long, default_value = "en")]
    lang: String,

    /// Dump each document model as JSON instead of one line per sentence
    #[arg(long)]
    json: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // WHY: stdout carries the parse output, so logs go to stderr
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if args.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!(?args, "Parsed CLI arguments");

    let config = ExtractorConfig::for_language(&args.lang);
    let extractor = SentenceExtractor::new(&config).context("Invalid extractor configuration")?;

    let mut failures = 0;
    for path in &args.files {
        let Some(format) = args.format.or_else(|| guess_format(path)) else {
            warn!(file = %path.display(), "Cannot tell the format, pass --format");
            failures += 1;
            continue;
        };

        match format.parser().parse_file(path, &extractor) {
            Ok(document) => print_document(&document, path, args.json)?,
            Err(error) => {
                eprintln!("{}: {error}", path.display());
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {} documents could not be parsed", args.files.len());
    }
    Ok(())
}

fn guess_format(path: &Path) -> Option<Format> {
    path.extension()
        .and_then(|extension| extension.to_str())
        .and_then(Format::from_extension)
}

fn print_document(document: &Document, path: &Path, json: bool) -> Result<()> {
    if json {
        let dump = serde_json::to_string_pretty(document).context("Failed to serialize document")?;
        println!("{dump}");
        return Ok(());
    }

    for sentence in document.sentences() {
        let Some(start) = sentence.start_position() else {
            continue;
        };
        println!("{}:{start}: {}", path.display(), sentence.content().escape_debug());
    }
    Ok(())
}
