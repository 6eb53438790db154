use std::io;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kkc_core::dict::{Dictionary, LanguageModel, Quantizer};

/// Build the dictionary files for Kana-Kanji or Kanji-Kana conversion.
///
/// Writes the files `<prefix>.lookup`, `<prefix>.pair`, `<prefix>.ngram`
/// and `<prefix>.scores`.
#[derive(Parser)]
#[command(name = "kkcdict")]
struct Cli {
    /// Filename prefix for the generated dictionary files
    #[arg(long)]
    dicname_prefix: String,

    /// Vocabulary file, one source/translation entry per line
    #[arg(long)]
    vocab: PathBuf,

    /// Tab-separated n-gram training file
    #[arg(long)]
    lm: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    Dictionary::build(&cli.dicname_prefix, &cli.vocab)?;
    LanguageModel::build(&cli.dicname_prefix, &cli.lm, Quantizer::default())?;
    info!(prefix = %cli.dicname_prefix, "finished");
    Ok(())
}
