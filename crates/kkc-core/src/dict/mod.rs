//! Dictionary, n-gram model, and score-store storage.
//!
//! A model is persisted as four files sharing a filename prefix:
//! two vocabulary tries (`.lookup`, `.pair`), an n-gram trie (`.ngram`),
//! and a flat quantized score file (`.scores`). Tries are built once and
//! memory-mapped read-only for serving.

mod dictionary;
mod model;
mod pair;
mod score_store;
#[cfg(test)]
mod tests;
mod trie;

pub use dictionary::Dictionary;
pub use model::{LanguageModel, NgramScore};
pub use pair::{Pair, BOS_TOKEN, EOS_TOKEN, UNKNOWN_TOKEN};
pub use score_store::{Quantizer, ScoreStore};
pub use trie::{FstTrie, TrieIndex};

use std::io;
use std::path::{Path, PathBuf};

/// Extension of the trie holding source tokens known to the dictionary.
pub const LOOKUP_EXT: &str = ".lookup";
/// Extension of the trie holding `source/translation` entries.
pub const PAIR_EXT: &str = ".pair";
/// Extension of the trie holding reversed, space-joined n-gram keys.
pub const NGRAM_EXT: &str = ".ngram";
/// Extension of the flat id-addressed quantized score file.
pub const SCORES_EXT: &str = ".scores";

/// Unified error type for dictionary and score-store I/O.
#[derive(Debug, thiserror::Error)]
pub enum DictError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("trie error: {0}")]
    Trie(#[from] fst::Error),

    #[error("dictionary file missing: {0}")]
    MissingArtifact(PathBuf),

    #[error("score store is read-only")]
    ReadOnlyStore,

    #[error("cannot create a score store with zero records")]
    EmptyStore,

    #[error("score record {id} out of bounds ({count} records)")]
    RecordOutOfBounds { id: usize, count: usize },

    #[error("score store length {len} is not a positive multiple of record size {record_size}")]
    TruncatedStore { len: usize, record_size: usize },

    #[error("model order must be positive")]
    InvalidOrder,

    #[error("parse error: {0}")]
    Parse(String),
}

/// Path of one persisted artifact: `<prefix><ext>`.
pub(crate) fn artifact_path(prefix: &str, ext: &str) -> PathBuf {
    PathBuf::from(format!("{prefix}{ext}"))
}

/// Check whether all four dictionary files exist for a prefix.
///
/// This is only an existence probe; mixing files from different builds is
/// not detected and produces undefined read behavior.
pub fn artifacts_exist(prefix: &str) -> bool {
    [LOOKUP_EXT, PAIR_EXT, NGRAM_EXT, SCORES_EXT]
        .iter()
        .all(|ext| artifact_path(prefix, ext).is_file())
}

/// Open a file, reporting a missing path as `MissingArtifact`.
pub(crate) fn open_artifact(path: &Path) -> Result<std::fs::File, DictError> {
    std::fs::File::open(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            DictError::MissingArtifact(path.to_path_buf())
        } else {
            DictError::Io(e)
        }
    })
}
