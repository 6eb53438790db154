use std::fs;
use std::path::Path;

use tracing::info;

use super::pair::Pair;
use super::trie::{FstTrie, TrieIndex};
use super::{artifact_path, DictError, LOOKUP_EXT, PAIR_EXT};

/// Vocabulary lookup over two tries: one holding source tokens, one holding
/// `source/translation` entries keyed by the shared `source/` prefix.
pub struct Dictionary {
    lookup: FstTrie,
    pairs: FstTrie,
}

impl Dictionary {
    /// Build from vocabulary text: one `source/translation` entry per line.
    ///
    /// A line splitting into exactly two `/`-separated fields contributes
    /// its source token to the lookup trie; every line lands in the pair
    /// trie verbatim, whether or not the split succeeds.
    pub fn from_vocab_text(text: &str) -> Result<Self, DictError> {
        let mut lookup_keys = Vec::new();
        let mut pair_keys = Vec::new();
        for line in text.lines() {
            let line = line.trim_end();
            let fields: Vec<&str> = line.split('/').collect();
            if fields.len() == 2 {
                lookup_keys.push(fields[0].to_string());
            }
            pair_keys.push(line.to_string());
        }
        info!(
            sources = lookup_keys.len(),
            entries = pair_keys.len(),
            "loaded vocabulary"
        );
        Ok(Self {
            lookup: FstTrie::build(lookup_keys)?,
            pairs: FstTrie::build(pair_keys)?,
        })
    }

    /// Build from a vocabulary file and persist both tries under `prefix`.
    pub fn build(prefix: &str, vocab_file: &Path) -> Result<(), DictError> {
        let text = fs::read_to_string(vocab_file)?;
        let dict = Self::from_vocab_text(&text)?;
        dict.save(prefix)
    }

    pub fn save(&self, prefix: &str) -> Result<(), DictError> {
        self.lookup.save(&artifact_path(prefix, LOOKUP_EXT))?;
        self.pairs.save(&artifact_path(prefix, PAIR_EXT))
    }

    pub fn load(prefix: &str) -> Result<Self, DictError> {
        Ok(Self {
            lookup: FstTrie::load(&artifact_path(prefix, LOOKUP_EXT))?,
            pairs: FstTrie::load(&artifact_path(prefix, PAIR_EXT))?,
        })
    }

    /// All candidate pairs whose source span starts at char `start_pos`.
    ///
    /// Every source token that prefixes the remaining input is expanded to
    /// all of its known translations. When nothing matches, a single
    /// unknown-fallback pair passes the character through, so every
    /// position has at least one outgoing edge.
    pub fn pairs_at(&self, src: &str, start_pos: usize) -> Vec<Pair> {
        let Some((offset, ch)) = src.char_indices().nth(start_pos) else {
            return Vec::new();
        };
        let suffix = &src[offset..];

        let mut out = Vec::new();
        for (token, _) in self.lookup.common_prefix_search(suffix) {
            let mut query = String::with_capacity(token.len() + 1);
            query.push_str(&token);
            query.push('/');
            for (key, _) in self.pairs.predictive_search(&query) {
                let Some((src_tok, dst)) = key.split_once('/') else {
                    continue;
                };
                let end_pos = start_pos + src_tok.chars().count();
                out.push(Pair::new(src_tok, dst, start_pos as i32, end_pos as i32));
            }
        }

        if out.is_empty() {
            out.push(Pair::unknown(ch, start_pos));
        }
        out
    }
}
