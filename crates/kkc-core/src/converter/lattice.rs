use std::collections::HashMap;

use tracing::{debug, debug_span};

use crate::dict::{Dictionary, Pair};

/// Per-position cache of candidate pairs.
///
/// Index `pos` holds the pairs starting at char position `pos`; the slot at
/// the source length holds the synthetic EOS pair, so every path converges
/// on a single terminal state at `end_pos = -1`.
pub struct PairManager {
    pairs: Vec<Vec<Pair>>,
}

impl PairManager {
    pub fn build(dict: &Dictionary, src: &str) -> Self {
        let char_count = src.chars().count();
        let _span = debug_span!("build_pairs", char_count).entered();
        let mut pairs = Vec::with_capacity(char_count + 1);
        for pos in 0..char_count {
            pairs.push(dict.pairs_at(src, pos));
        }
        pairs.push(vec![Pair::eos(char_count)]);
        debug!(candidate_count = pairs.iter().map(Vec::len).sum::<usize>());
        Self { pairs }
    }

    pub fn pairs_at(&self, pos: usize) -> &[Pair] {
        &self.pairs[pos]
    }
}

/// A scored vertex in the search lattice.
///
/// Nodes live in the lattice arena; `left` indexes the predecessor there.
/// Predecessor chains are shared by downstream nodes and never mutated.
/// `valid_n` is how many trailing pairs (including this one) contributed to
/// the n-gram context this node was scored with.
#[derive(Debug, Clone)]
pub struct Node {
    pub pair: Pair,
    pub left: Option<usize>,
    pub valid_n: usize,
    /// Cumulative path score (sum of per-edge log-probabilities).
    pub score: f64,
    /// Deferred backoff scores for future multi-level backoff chains.
    /// Always empty at present; consumed by an inert loop in the model.
    pub backoff_scores: Vec<f64>,
}

impl Node {
    pub fn new(pair: Pair, left: Option<usize>, valid_n: usize, score: f64) -> Self {
        Self {
            pair,
            left,
            valid_n,
            score,
            backoff_scores: Vec::new(),
        }
    }
}

/// Best retained node per context key at one end position.
///
/// `slots` preserves first-insertion order so that iteration (and therefore
/// tie-breaking downstream) is deterministic; `by_context` maps a context
/// key to its slot.
#[derive(Default)]
struct EndNodes {
    by_context: HashMap<Vec<String>, usize>,
    slots: Vec<usize>,
}

/// The search lattice: an arena of nodes plus, per end position, the single
/// best-scoring node for each distinct trailing context.
///
/// Two paths reaching the same position with an LM-indistinguishable
/// trailing context have identical downstream scoring potential, so only
/// the higher-scoring one is kept (ties keep the first seen). Superseded
/// nodes stay in the arena: earlier downstream nodes may still hold them as
/// predecessors.
pub struct Lattice {
    nodes: Vec<Node>,
    end_nodes: HashMap<i32, EndNodes>,
}

impl Lattice {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            end_nodes: HashMap::new(),
        }
    }

    pub fn node(&self, idx: usize) -> &Node {
        &self.nodes[idx]
    }

    /// Textual forms of the last `valid_n` pairs ending at `node`, most
    /// recent first. This is both the node's lattice context key and the
    /// context handed to the language model when extending the path.
    fn context_key(&self, node: &Node) -> Vec<String> {
        let mut forms = Vec::with_capacity(node.valid_n);
        if node.valid_n == 0 {
            return forms;
        }
        forms.push(node.pair.form());
        let mut cur = node.left;
        for _ in 1..node.valid_n {
            let Some(idx) = cur else { break };
            let left = &self.nodes[idx];
            forms.push(left.pair.form());
            cur = left.left;
        }
        forms
    }

    /// Context forms of an already-inserted node.
    pub fn ngram_forms(&self, idx: usize) -> Vec<String> {
        self.context_key(&self.nodes[idx])
    }

    /// Insert a node, retaining only the best score per (end position,
    /// context key). A node that loses to the incumbent is dropped without
    /// entering the arena.
    pub fn add(&mut self, node: Node) {
        let key = self.context_key(&node);
        let end_pos = node.pair.end_pos;
        let end = self.end_nodes.entry(end_pos).or_default();
        match end.by_context.get(&key) {
            Some(&slot) => {
                let incumbent = end.slots[slot];
                if node.score > self.nodes[incumbent].score {
                    let idx = self.nodes.len();
                    self.nodes.push(node);
                    end.slots[slot] = idx;
                }
            }
            None => {
                let slot = end.slots.len();
                end.by_context.insert(key, slot);
                let idx = self.nodes.len();
                end.slots.push(idx);
                self.nodes.push(node);
            }
        }
    }

    /// Indices of the retained nodes ending at `pos`, in insertion order.
    pub fn end_nodes_at(&self, pos: i32) -> Vec<usize> {
        self.end_nodes
            .get(&pos)
            .map(|end| end.slots.clone())
            .unwrap_or_default()
    }
}

impl Default for Lattice {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(src: &str, dst: &str, start: i32, end: i32) -> Pair {
        Pair::new(src, dst, start, end)
    }

    #[test]
    fn test_add_retains_best_per_context() {
        let mut lattice = Lattice::new();
        lattice.add(Node::new(pair("あ", "亜", 0, 1), None, 1, -5.0));
        lattice.add(Node::new(pair("あ", "亜", 0, 1), None, 1, -3.0));
        lattice.add(Node::new(pair("あ", "亜", 0, 1), None, 1, -10.0));

        let retained = lattice.end_nodes_at(1);
        assert_eq!(retained.len(), 1);
        assert_eq!(lattice.node(retained[0]).score, -3.0);
    }

    #[test]
    fn test_add_ties_keep_first_seen() {
        let mut lattice = Lattice::new();
        let first = Node::new(pair("あ", "亜", 0, 1), None, 1, -4.0);
        let second = Node::new(pair("あ", "亜", 0, 1), None, 1, -4.0);
        lattice.add(first);
        let first_idx = lattice.end_nodes_at(1)[0];
        lattice.add(second);
        assert_eq!(lattice.end_nodes_at(1), vec![first_idx]);
    }

    #[test]
    fn test_distinct_contexts_coexist() {
        let mut lattice = Lattice::new();
        lattice.add(Node::new(pair("あ", "亜", 0, 1), None, 1, -5.0));
        lattice.add(Node::new(pair("あ", "阿", 0, 1), None, 1, -6.0));

        let retained = lattice.end_nodes_at(1);
        assert_eq!(retained.len(), 2);
    }

    #[test]
    fn test_zero_context_nodes_share_one_state() {
        // Nodes scored with no matched context have an empty key and
        // collapse into a single state per end position.
        let mut lattice = Lattice::new();
        lattice.add(Node::new(pair("あ", "亜", 0, 1), None, 0, -5.0));
        lattice.add(Node::new(pair("あ", "阿", 0, 1), None, 0, -2.0));

        let retained = lattice.end_nodes_at(1);
        assert_eq!(retained.len(), 1);
        assert_eq!(lattice.node(retained[0]).pair.dst, "阿");
    }

    #[test]
    fn test_context_key_walks_predecessors() {
        let mut lattice = Lattice::new();
        lattice.add(Node::new(Pair::bos(), None, 1, 0.0));
        let bos = lattice.end_nodes_at(0)[0];
        lattice.add(Node::new(pair("あ", "亜", 0, 1), Some(bos), 2, -2.0));

        let idx = lattice.end_nodes_at(1)[0];
        assert_eq!(lattice.ngram_forms(idx), vec!["あ/亜", "<s>"]);
    }

    #[test]
    fn test_context_key_bounded_by_valid_n() {
        let mut lattice = Lattice::new();
        lattice.add(Node::new(Pair::bos(), None, 1, 0.0));
        let bos = lattice.end_nodes_at(0)[0];
        lattice.add(Node::new(pair("あ", "亜", 0, 1), Some(bos), 1, -2.0));

        // valid_n = 1 keeps only the terminating pair in the key.
        let idx = lattice.end_nodes_at(1)[0];
        assert_eq!(lattice.ngram_forms(idx), vec!["あ/亜"]);
    }

    #[test]
    fn test_superseded_node_stays_reachable() {
        let mut lattice = Lattice::new();
        lattice.add(Node::new(pair("あ", "亜", 0, 1), None, 1, -5.0));
        let old = lattice.end_nodes_at(1)[0];
        // A downstream node takes the incumbent as predecessor.
        lattice.add(Node::new(pair("い", "胃", 1, 2), Some(old), 1, -7.0));
        // The incumbent is then superseded at its end position.
        lattice.add(Node::new(pair("あ", "亜", 0, 1), None, 1, -1.0));

        let downstream = lattice.end_nodes_at(2)[0];
        assert_eq!(lattice.node(downstream).left, Some(old));
        assert_eq!(lattice.node(old).score, -5.0);
    }
}
