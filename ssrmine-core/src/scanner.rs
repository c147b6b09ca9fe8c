//! SSR repeat scanner
//!
//! Explicit finite-state scan over the sequence byte buffer. For every
//! configured motif length the scanner finds maximal periodic runs that
//! meet the minimum repeat count, rejects composite motifs, suppresses
//! near-duplicate detections spawned by the staggered rescan, filters by
//! total SSR length, and attaches flanking context.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Locus, Sequence};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid motif table entry '{entry}': expected LEN=MINREP")]
    MotifTableEntry { entry: String },
    #[error("motif table is empty")]
    MotifTableEmpty,
    #[error("motif length and minimum repeat count must be >= 1 in '{entry}'")]
    MotifTableZero { entry: String },
    #[error("duplicate motif length {len} in motif table")]
    DuplicateMotifLength { len: usize },
    #[error("flank length must be >= 1")]
    FlankLength,
    #[error("invalid SSR length bounds: min {min} > max {max}")]
    LengthBounds { min: usize, max: usize },
}

/// Mapping motif length -> minimum repeat count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotifTable {
    thresholds: Vec<(usize, usize)>,
}

impl MotifTable {
    /// Parse the `len=minrep[,len=minrep...]` configuration syntax.
    pub fn parse(spec: &str) -> Result<Self, ScanError> {
        let mut thresholds: Vec<(usize, usize)> = Vec::new();

        for entry in spec.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                return Err(ScanError::MotifTableEntry {
                    entry: entry.to_string(),
                });
            }
            let (len_str, rep_str) = entry.split_once('=').ok_or_else(|| {
                ScanError::MotifTableEntry {
                    entry: entry.to_string(),
                }
            })?;
            let len: usize =
                len_str
                    .trim()
                    .parse()
                    .map_err(|_| ScanError::MotifTableEntry {
                        entry: entry.to_string(),
                    })?;
            let min_rep: usize =
                rep_str
                    .trim()
                    .parse()
                    .map_err(|_| ScanError::MotifTableEntry {
                        entry: entry.to_string(),
                    })?;
            if len == 0 || min_rep == 0 {
                return Err(ScanError::MotifTableZero {
                    entry: entry.to_string(),
                });
            }
            if thresholds.iter().any(|&(l, _)| l == len) {
                return Err(ScanError::DuplicateMotifLength { len });
            }
            thresholds.push((len, min_rep));
        }

        if thresholds.is_empty() {
            return Err(ScanError::MotifTableEmpty);
        }
        thresholds.sort_by_key(|&(len, _)| len);
        Ok(Self { thresholds })
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.thresholds.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }
}

impl Default for MotifTable {
    fn default() -> Self {
        Self {
            thresholds: vec![(1, 10), (2, 7), (3, 6), (4, 5), (5, 4), (6, 4)],
        }
    }
}

impl std::str::FromStr for MotifTable {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Scanner configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanParams {
    pub motifs: MotifTable,
    /// Flank width in bases; also the window width of the genome-wide
    /// uniqueness verifier.
    pub flank_len: usize,
    pub min_ssr_len: usize,
    pub max_ssr_len: usize,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            motifs: MotifTable::default(),
            flank_len: 100,
            min_ssr_len: 10,
            max_ssr_len: 10_000,
        }
    }
}

impl ScanParams {
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.flank_len == 0 {
            return Err(ScanError::FlankLength);
        }
        if self.min_ssr_len > self.max_ssr_len {
            return Err(ScanError::LengthBounds {
                min: self.min_ssr_len,
                max: self.max_ssr_len,
            });
        }
        Ok(())
    }
}

/// A run detected by one per-motif-length pass, before merging.
#[derive(Debug, Clone, Copy)]
struct RawHit {
    /// 0-based start of the run.
    start: usize,
    /// Run length in bases, a multiple of `motif_len`.
    len: usize,
    motif_len: usize,
    repeats: usize,
}

impl RawHit {
    fn end(&self) -> usize {
        self.start + self.len - 1
    }
}

/// True if the unit can be partitioned into q >= 2 identical sub-blocks,
/// i.e. it has a shorter period and would double-count a smaller motif.
fn is_composite(unit: &[u8]) -> bool {
    let m = unit.len();
    for d in 1..m {
        if m % d != 0 {
            continue;
        }
        if unit.chunks_exact(d).all(|chunk| chunk == &unit[..d]) {
            return true;
        }
    }
    false
}

/// One left-to-right pass for a single motif length.
///
/// After a qualifying run at `p` the scan resumes at `p + k`, not past
/// the run: the shifted position may seed a detection of a different
/// motif length that partially overlaps, and long runs spawn staggered
/// re-detections that the merge pass suppresses.
fn scan_motif_len(data: &[u8], k: usize, min_rep: usize, hits: &mut Vec<RawHit>) {
    if k == 0 || data.len() < k * min_rep {
        return;
    }

    let mut p = 0usize;
    while p + k * min_rep <= data.len() {
        let unit = &data[p..p + k];
        let mut repeats = 1usize;
        while p + (repeats + 1) * k <= data.len()
            && &data[p + repeats * k..p + (repeats + 1) * k] == unit
        {
            repeats += 1;
        }

        if repeats >= min_rep {
            if !is_composite(unit) {
                hits.push(RawHit {
                    start: p,
                    len: repeats * k,
                    motif_len: k,
                    repeats,
                });
            }
            p += k;
        } else {
            p += 1;
        }
    }
}

/// Scan one sequence for SSR loci with flanking context attached.
/// Loci come out in left-to-right start order.
pub fn scan_sequence(seq: &Sequence, params: &ScanParams) -> Vec<Locus> {
    let data = &seq.data;

    let mut hits: Vec<RawHit> = Vec::new();
    for (k, min_rep) in params.motifs.iter() {
        scan_motif_len(data, k, min_rep, &mut hits);
    }

    hits.sort_by_key(|h| (h.start, h.motif_len));

    // Staggered re-detections of one run share its end position; keep a
    // hit only when its end is clear of the last kept hit's end.
    let mut kept: Vec<RawHit> = Vec::with_capacity(hits.len());
    for hit in hits {
        match kept.last() {
            Some(prev) if hit.end().abs_diff(prev.end()) <= hit.motif_len - 1 => {}
            _ => kept.push(hit),
        }
    }

    kept.retain(|h| h.len >= params.min_ssr_len && h.len <= params.max_ssr_len);

    kept.into_iter()
        .map(|h| {
            let left_start = h.start.saturating_sub(params.flank_len);
            let right_end = (h.start + h.len + params.flank_len).min(data.len());
            let left = &data[left_start..h.start];
            let right = &data[h.start + h.len..right_end];

            Locus {
                seq_id: seq.id.clone(),
                motif: String::from_utf8_lossy(&data[h.start..h.start + h.motif_len])
                    .to_string(),
                motif_len: h.motif_len,
                repeats: h.repeats,
                len: h.len,
                start: h.start + 1,
                end: h.start + h.len,
                left_flank: String::from_utf8_lossy(left).to_string(),
                left_flank_len: left.len(),
                right_flank: String::from_utf8_lossy(right).to_string(),
                right_flank_len: right.len(),
            }
        })
        .collect()
}
