//! Source-to-target conversion via lattice construction and best-path
//! search under the n-gram language model.
//!
//! The lattice is expanded left to right; at each position every candidate
//! pair is scored against every retained predecessor context, and only the
//! best node per (end position, trailing context) survives. The best
//! terminal node is then walked back to BOS to produce the output.

mod lattice;
pub(crate) mod testutil;

#[cfg(test)]
mod tests;

use tracing::{debug, debug_span};

use crate::dict::{Dictionary, LanguageModel, Pair};

pub use lattice::{Lattice, Node, PairManager};

/// Convert a source string to the highest-scoring target string.
///
/// An empty source converts to an empty string. Output is deterministic:
/// score ties keep the first candidate seen.
pub fn convert(dict: &Dictionary, lm: &LanguageModel, src: &str) -> String {
    let char_count = src.chars().count();
    let _span = debug_span!("convert", char_count).entered();

    let pair_manager = PairManager::build(dict, src);
    let mut lattice = Lattice::new();
    lattice.add(Node::new(Pair::bos(), None, 1, 0.0));

    for pos in 0..=char_count {
        for pair in pair_manager.pairs_at(pos) {
            for left_idx in lattice.end_nodes_at(pos as i32) {
                let left = lattice.node(left_idx);
                let left_score = left.score;
                let prev_backoff = left.backoff_scores.clone();
                let mut forms = Vec::with_capacity(left.valid_n + 1);
                forms.push(pair.form());
                forms.extend(lattice.ngram_forms(left_idx));

                let ngram = lm.ngram_scores(&forms, &prev_backoff);
                lattice.add(Node::new(
                    pair.clone(),
                    Some(left_idx),
                    ngram.valid_n,
                    left_score + ngram.score,
                ));
            }
        }
    }

    let mut best: Option<usize> = None;
    for idx in lattice.end_nodes_at(-1) {
        let better = match best {
            None => true,
            Some(b) => lattice.node(idx).score > lattice.node(b).score,
        };
        if better {
            best = Some(idx);
        }
    }
    debug!(best_score = best.map(|idx| lattice.node(idx).score));

    let mut dst_parts = Vec::new();
    let mut cur = best;
    while let Some(idx) = cur {
        let node = lattice.node(idx);
        dst_parts.push(node.pair.dst.as_str());
        cur = node.left;
    }
    dst_parts.reverse();
    dst_parts.concat()
}
