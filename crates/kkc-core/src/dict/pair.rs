/// Sentinel token opening every path.
pub const BOS_TOKEN: &str = "<s>";
/// Sentinel token terminating every path.
pub const EOS_TOKEN: &str = "</s>";
/// Language-model token standing in for out-of-vocabulary characters.
pub const UNKNOWN_TOKEN: &str = "UNK";

/// One candidate (source-span, translation) edge.
///
/// `start_pos` and `end_pos` are a half-open char-index span in the source
/// string. Sentinels sit outside it: BOS spans `[-1, 0)` and EOS uses
/// `end_pos = -1` as the terminal marker. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pair {
    pub src: String,
    pub dst: String,
    pub start_pos: i32,
    pub end_pos: i32,
}

impl Pair {
    pub fn new(
        src: impl Into<String>,
        dst: impl Into<String>,
        start_pos: i32,
        end_pos: i32,
    ) -> Self {
        Self {
            src: src.into(),
            dst: dst.into(),
            start_pos,
            end_pos,
        }
    }

    /// The beginning-of-string sentinel.
    pub fn bos() -> Self {
        Self::new(BOS_TOKEN, "", -1, 0)
    }

    /// The end-of-string sentinel for a source of `src_len` chars.
    pub fn eos(src_len: usize) -> Self {
        Self::new(EOS_TOKEN, "", src_len as i32 + 1, -1)
    }

    /// Fallback edge passing a single unmatched character through.
    pub fn unknown(ch: char, start_pos: usize) -> Self {
        Self::new(
            UNKNOWN_TOKEN,
            ch.to_string(),
            start_pos as i32,
            start_pos as i32 + 1,
        )
    }

    /// Textual form used in language-model keys and lattice context keys.
    ///
    /// Sentinels render as the bare source token, unknown edges collapse to
    /// the shared `UNK` token, everything else is `source/translation`.
    pub fn form(&self) -> String {
        if self.dst.is_empty() {
            self.src.clone()
        } else if self.src == UNKNOWN_TOKEN {
            UNKNOWN_TOKEN.to_string()
        } else {
            format!("{}/{}", self.src, self.dst)
        }
    }
}
