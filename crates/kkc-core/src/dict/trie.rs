use std::fs;
use std::path::Path;

use fst::automaton::{Automaton, Str};
use fst::raw::Output;
use fst::{IntoStreamer, Map, MapBuilder, Streamer};
use memmap2::Mmap;

use super::{open_artifact, DictError};

/// Query surface of an ordered string index.
///
/// Keys map to dense integer ids assigned at build time in key order.
/// The decoding algorithm depends only on this contract, not on the
/// backing representation.
pub trait TrieIndex {
    /// Exact-match lookup.
    fn lookup(&self, key: &str) -> Option<u64>;

    /// All stored keys that are prefixes of `query`, shortest first.
    fn common_prefix_search(&self, query: &str) -> Vec<(String, u64)>;

    /// All stored keys that have `prefix` as a prefix, in key order.
    fn predictive_search(&self, prefix: &str) -> Vec<(String, u64)>;
}

/// Backing storage for a trie: built in memory or memory-mapped from disk.
enum FstData {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

impl AsRef<[u8]> for FstData {
    fn as_ref(&self) -> &[u8] {
        match self {
            FstData::Owned(v) => v,
            FstData::Mapped(m) => m,
        }
    }
}

/// An ordered string trie over an `fst` map.
///
/// Ids are the positions of the sorted, deduplicated key set, so they are
/// dense in `0..len` and usable for direct offset arithmetic elsewhere.
pub struct FstTrie {
    map: Map<FstData>,
}

impl FstTrie {
    /// Build from a key set. Keys are sorted and deduplicated first.
    pub fn build<I, S>(keys: I) -> Result<Self, DictError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        keys.sort_unstable();
        keys.dedup();

        let mut builder = MapBuilder::new(Vec::new())?;
        for (id, key) in keys.iter().enumerate() {
            builder.insert(key, id as u64)?;
        }
        let bytes = builder.into_inner()?;
        Ok(Self {
            map: Map::new(FstData::Owned(bytes))?,
        })
    }

    /// Write the serialized trie to a file.
    pub fn save(&self, path: &Path) -> Result<(), DictError> {
        Ok(fs::write(path, self.map.as_fst().as_bytes())?)
    }

    /// Open a serialized trie read-only via mmap.
    pub fn load(path: &Path) -> Result<Self, DictError> {
        let file = open_artifact(path)?;
        // SAFETY: The file is opened read-only and the mapping is immutable.
        // Dictionary files are never rewritten once built.
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self {
            map: Map::new(FstData::Mapped(mmap))?,
        })
    }

    /// Number of keys stored.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl TrieIndex for FstTrie {
    fn lookup(&self, key: &str) -> Option<u64> {
        self.map.get(key)
    }

    fn common_prefix_search(&self, query: &str) -> Vec<(String, u64)> {
        // Walk the raw fst byte by byte, emitting every final state passed
        // through. Matches come out shortest-to-longest by construction.
        let fst = self.map.as_fst();
        let mut node = fst.root();
        let mut out = Output::zero();
        let mut results = Vec::new();
        let bytes = query.as_bytes();
        for (i, &b) in bytes.iter().enumerate() {
            let Some(t_idx) = node.find_input(b) else {
                break;
            };
            let t = node.transition(t_idx);
            out = out.cat(t.out);
            node = fst.node(t.addr);
            if node.is_final() {
                if let Ok(key) = std::str::from_utf8(&bytes[..=i]) {
                    results.push((key.to_string(), out.cat(node.final_output()).value()));
                }
            }
        }
        results
    }

    fn predictive_search(&self, prefix: &str) -> Vec<(String, u64)> {
        let matcher = Str::new(prefix).starts_with();
        let mut stream = self.map.search(matcher).into_stream();
        let mut results = Vec::new();
        while let Some((key, id)) = stream.next() {
            results.push((String::from_utf8_lossy(key).into_owned(), id));
        }
        results
    }
}
