use std::fs::OpenOptions;
use std::path::Path;

use memmap2::{Mmap, MmapMut};

use super::{open_artifact, DictError};

/// Default quantization width in bytes.
pub(crate) const DEFAULT_WIDTH: usize = 1;
/// Default lower bound of the representable log-probability range.
/// e^-7 is small enough as a probability.
pub(crate) const DEFAULT_MIN_SCORE: f64 = -7.0;

/// Linear quantizer mapping log-probabilities in `[min_score, 0]` onto an
/// unsigned integer of 1 or 2 bytes.
///
/// Values outside the range clamp silently to the nearest bound; this is
/// accepted precision loss, never an error.
#[derive(Debug, Clone, Copy)]
pub struct Quantizer {
    width: usize,
    max_value: u64,
    factor: f64,
}

impl Quantizer {
    /// `width` must be 1 or 2; `min_score` must be negative.
    pub fn new(width: usize, min_score: f64) -> Result<Self, DictError> {
        if width != 1 && width != 2 {
            return Err(DictError::Parse(format!(
                "quantization width must be 1 or 2, got {width}"
            )));
        }
        if !min_score.is_finite() || min_score >= 0.0 {
            return Err(DictError::Parse(format!(
                "quantization floor must be negative, got {min_score}"
            )));
        }
        let max_value = (1u64 << (8 * width)) - 1;
        Ok(Self {
            width,
            max_value,
            factor: max_value as f64 / min_score,
        })
    }

    pub fn quantize(&self, score: f64) -> u64 {
        let q = score * self.factor;
        if q < 0.0 {
            0
        } else if q > self.max_value as f64 {
            self.max_value
        } else {
            q as u64
        }
    }

    pub fn dequantize(&self, q: u64) -> f64 {
        q as f64 / self.factor
    }

    /// One record holds a quantized score and a quantized backoff.
    pub fn record_size(&self) -> usize {
        self.width * 2
    }

    fn encode(&self, value: f64, buf: &mut [u8]) {
        let q = self.quantize(value);
        match self.width {
            1 => buf[0] = q as u8,
            _ => buf.copy_from_slice(&(q as u16).to_le_bytes()),
        }
    }

    fn decode(&self, buf: &[u8]) -> f64 {
        let q = match self.width {
            1 => buf[0] as u64,
            _ => u16::from_le_bytes([buf[0], buf[1]]) as u64,
        };
        self.dequantize(q)
    }
}

impl Default for Quantizer {
    fn default() -> Self {
        let max_value = (1u64 << (8 * DEFAULT_WIDTH)) - 1;
        Self {
            width: DEFAULT_WIDTH,
            max_value,
            factor: max_value as f64 / DEFAULT_MIN_SCORE,
        }
    }
}

/// Backing storage for score records: build-mode writable mapping or
/// serve-mode read-only mapping.
enum ScoreBacking {
    Writable(MmapMut),
    ReadOnly(Mmap),
}

/// Flat, id-addressed store of quantized (score, backoff) records.
///
/// Record `id` occupies bytes `[id * record_size, (id + 1) * record_size)`.
/// Ids are dense trie-assigned integers, so no search structure is needed.
pub struct ScoreStore {
    quantizer: Quantizer,
    record_count: usize,
    backing: ScoreBacking,
}

impl ScoreStore {
    /// Create a writable store pre-sized to `record_count` zeroed records.
    pub fn create(
        path: &Path,
        quantizer: Quantizer,
        record_count: usize,
    ) -> Result<Self, DictError> {
        if record_count == 0 {
            return Err(DictError::EmptyStore);
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.set_len((record_count * quantizer.record_size()) as u64)?;
        // SAFETY: The file was just created and sized by us; the mapping is
        // exclusive for the single-writer build phase.
        let mmap = unsafe { MmapMut::map_mut(&file)? };
        Ok(Self {
            quantizer,
            record_count,
            backing: ScoreBacking::Writable(mmap),
        })
    }

    /// Open an existing store read-only.
    pub fn open(path: &Path, quantizer: Quantizer) -> Result<Self, DictError> {
        let file = open_artifact(path)?;
        // SAFETY: The file is opened read-only and the mapping is immutable.
        // Score files are never rewritten once built.
        let mmap = unsafe { Mmap::map(&file)? };
        let record_size = quantizer.record_size();
        if mmap.len() == 0 || mmap.len() % record_size != 0 {
            return Err(DictError::TruncatedStore {
                len: mmap.len(),
                record_size,
            });
        }
        Ok(Self {
            quantizer,
            record_count: mmap.len() / record_size,
            backing: ScoreBacking::ReadOnly(mmap),
        })
    }

    /// Write the record for `id`. Fails fast on a read-only store.
    pub fn write(&mut self, id: usize, score: f64, backoff: f64) -> Result<(), DictError> {
        let mmap = match &mut self.backing {
            ScoreBacking::Writable(m) => m,
            ScoreBacking::ReadOnly(_) => return Err(DictError::ReadOnlyStore),
        };
        if id >= self.record_count {
            return Err(DictError::RecordOutOfBounds {
                id,
                count: self.record_count,
            });
        }
        let width = self.quantizer.record_size() / 2;
        let offset = id * self.quantizer.record_size();
        self.quantizer
            .encode(score, &mut mmap[offset..offset + width]);
        self.quantizer
            .encode(backoff, &mut mmap[offset + width..offset + 2 * width]);
        Ok(())
    }

    /// Read the (score, backoff) record for `id`.
    ///
    /// Out-of-range ids read as (0.0, 0.0), like an absent record.
    pub fn read(&self, id: usize) -> (f64, f64) {
        let bytes: &[u8] = match &self.backing {
            ScoreBacking::Writable(m) => m,
            ScoreBacking::ReadOnly(m) => m,
        };
        let record_size = self.quantizer.record_size();
        let width = record_size / 2;
        let offset = id * record_size;
        match bytes.get(offset..offset + record_size) {
            Some(rec) => (
                self.quantizer.decode(&rec[..width]),
                self.quantizer.decode(&rec[width..]),
            ),
            None => (0.0, 0.0),
        }
    }

    /// Flush build-mode writes to disk. A no-op on a read-only store.
    pub fn flush(&self) -> Result<(), DictError> {
        if let ScoreBacking::Writable(m) = &self.backing {
            m.flush()?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.record_count
    }

    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }
}
