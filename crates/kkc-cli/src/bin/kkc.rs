use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kkc_core::converter::convert;
use kkc_core::dict::{self, Dictionary, LanguageModel, Quantizer};

/// Convert Kana to Kanji or vice versa.
///
/// Dictionary files with the designated prefix and the extensions
/// `.lookup`, `.pair`, `.ngram` and `.scores` are loaded when present;
/// otherwise (or with --force-build) they are built from --vocab and --lm
/// first. Without --interactive, input strings are read from standard
/// input and one converted line is written per input line.
#[derive(Parser)]
#[command(name = "kkc")]
struct Cli {
    /// Language-model order (number of context tokens)
    #[arg(long)]
    order: usize,

    /// Filename prefix for the dictionary files
    #[arg(long)]
    dicname_prefix: String,

    /// Vocabulary file, one source/translation entry per line (build only)
    #[arg(long)]
    vocab: Option<PathBuf>,

    /// Tab-separated n-gram training file (build only)
    #[arg(long)]
    lm: Option<PathBuf>,

    /// Rebuild the dictionary files even if they already exist
    #[arg(long)]
    force_build: bool,

    /// Prompt for input strings and print each conversion result
    #[arg(long)]
    interactive: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if cli.order == 0 {
        bail!("--order must be positive");
    }

    let prefix = &cli.dicname_prefix;
    if cli.force_build || !dict::artifacts_exist(prefix) {
        let vocab = cli
            .vocab
            .as_deref()
            .context("--vocab is required to build the dictionary files")?;
        let lm = cli
            .lm
            .as_deref()
            .context("--lm is required to build the dictionary files")?;
        info!(prefix = %prefix, "building dictionary files");
        Dictionary::build(prefix, vocab)?;
        LanguageModel::build(prefix, lm, Quantizer::default())?;
    }

    let dictionary = Dictionary::load(prefix)?;
    let model = LanguageModel::load(prefix, cli.order, Quantizer::default())?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    if cli.interactive {
        let mut line = String::new();
        loop {
            print!("> ");
            io::stdout().flush()?;
            line.clear();
            if input.read_line(&mut line)? == 0 {
                break;
            }
            let src = line.trim_end_matches('\n');
            println!("{}", convert(&dictionary, &model, src));
        }
    } else {
        for line in input.lines() {
            println!("{}", convert(&dictionary, &model, &line?));
        }
    }
    Ok(())
}
