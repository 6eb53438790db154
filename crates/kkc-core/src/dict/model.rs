use std::fs;
use std::path::Path;

use tracing::info;

use super::score_store::{Quantizer, ScoreStore};
use super::trie::{FstTrie, TrieIndex};
use super::{artifact_path, DictError, NGRAM_EXT, SCORES_EXT};

/// Result of a language-model context query.
#[derive(Debug, Clone, PartialEq)]
pub struct NgramScore {
    /// Log-probability of the best-matching n-gram.
    pub score: f64,
    /// Effective context order to carry forward on the scored node.
    pub valid_n: usize,
    /// Deferred per-order backoff scores. Currently always empty; the slot
    /// is kept for multi-level backoff chains.
    pub backoff_scores: Vec<f64>,
}

/// Backoff n-gram model over a reversed-key trie and a quantized score file.
///
/// Trie keys are space-joined token sequences in most-recent-first order
/// with a trailing space, so a common-prefix search over a rendered context
/// visits matches of increasing n-gram order.
pub struct LanguageModel {
    ngrams: FstTrie,
    scores: ScoreStore,
    order: usize,
}

impl LanguageModel {
    /// Build the `.ngram` and `.scores` artifacts from a training file.
    ///
    /// Each line is `score<TAB>space-joined-tokens[<TAB>backoff]`; lines
    /// with fewer than two fields are skipped, a missing backoff reads as 0.
    pub fn build(prefix: &str, lm_file: &Path, quantizer: Quantizer) -> Result<(), DictError> {
        let text = fs::read_to_string(lm_file)?;
        Self::build_from_text(prefix, &text, quantizer)
    }

    /// Build the `.ngram` and `.scores` artifacts from training text.
    ///
    /// Two passes: the first collects keys and builds the trie, the second
    /// resolves each key to its trie id and writes its score record.
    pub fn build_from_text(
        prefix: &str,
        text: &str,
        quantizer: Quantizer,
    ) -> Result<(), DictError> {
        let mut keys = Vec::new();
        for line in text.lines() {
            let Some((_, context)) = split_training_line(line) else {
                continue;
            };
            keys.push(reversed_key(context));
        }
        info!(ngrams = keys.len(), "loaded ngram strings");

        let ngrams = FstTrie::build(keys)?;
        ngrams.save(&artifact_path(prefix, NGRAM_EXT))?;

        let mut scores = ScoreStore::create(
            &artifact_path(prefix, SCORES_EXT),
            quantizer,
            ngrams.len(),
        )?;
        for line in text.lines() {
            let line = line.trim_end();
            let Some((head, context)) = split_training_line(line) else {
                continue;
            };
            let score: f64 = head
                .parse()
                .map_err(|e| DictError::Parse(format!("invalid ngram score '{head}': {e}")))?;
            let backoff = match line.splitn(3, '\t').nth(2) {
                Some(b) if !b.is_empty() => b
                    .parse()
                    .map_err(|e| DictError::Parse(format!("invalid backoff '{b}': {e}")))?,
                _ => 0.0,
            };
            if let Some(id) = ngrams.lookup(&reversed_key(context)) {
                scores.write(id as usize, score, backoff)?;
            }
        }
        scores.flush()?;
        info!("loaded ngram scores");
        Ok(())
    }

    /// Open the `.ngram` and `.scores` artifacts read-only.
    pub fn load(prefix: &str, order: usize, quantizer: Quantizer) -> Result<Self, DictError> {
        if order == 0 {
            return Err(DictError::InvalidOrder);
        }
        Ok(Self {
            ngrams: FstTrie::load(&artifact_path(prefix, NGRAM_EXT))?,
            scores: ScoreStore::open(&artifact_path(prefix, SCORES_EXT), quantizer)?,
            order,
        })
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Score a context of pair forms, most recent first.
    ///
    /// The best (highest-order) complete trie entry prefixing the rendered
    /// context wins. The returned `valid_n` is that order, decremented when
    /// it reaches the configured model order so the carried context stays
    /// bounded. `prev_backoff_scores` participates in an accumulation loop
    /// that is inert while nodes carry empty backoff slots.
    pub fn ngram_scores(&self, forms: &[String], prev_backoff_scores: &[f64]) -> NgramScore {
        let mut query = String::new();
        for form in forms {
            query.push_str(form);
            query.push(' ');
        }

        let mut max_n = 0usize;
        let mut max_n_score = 0.0f64;
        for (key, id) in self.ngrams.common_prefix_search(&query) {
            if !key.ends_with(' ') {
                continue;
            }
            let (ngram_score, _backoff) = self.scores.read(id as usize);
            let n = key.matches(' ').count();
            if n > max_n {
                max_n = n;
                max_n_score = ngram_score;
            }
        }

        let mut score = 0.0;
        for i in (max_n.saturating_sub(1)..prev_backoff_scores.len()).rev() {
            score += prev_backoff_scores[i];
        }
        score += max_n_score;

        let mut valid_n = max_n;
        if valid_n == self.order {
            valid_n -= 1;
        }

        NgramScore {
            score,
            valid_n,
            backoff_scores: Vec::new(),
        }
    }
}

/// Split a training line into (score field, context field).
/// Returns None for lines with fewer than two tab-separated fields.
fn split_training_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim_end();
    let mut fields = line.split('\t');
    let head = fields.next()?;
    let context = fields.next()?;
    Some((head, context))
}

/// Reverse the token order and append the terminal space.
fn reversed_key(context: &str) -> String {
    let mut tokens: Vec<&str> = context.split(' ').collect();
    tokens.reverse();
    let mut key = tokens.join(" ");
    key.push(' ');
    key
}
