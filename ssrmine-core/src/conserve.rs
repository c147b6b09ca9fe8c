//! Flank-context conservativeness engine
//!
//! Decides whether an SSR flank pair mined from one assembly also
//! occurs, exactly or approximately, around an SSR with the same motif
//! in the other assembly. Approximate modes run a cheap reduced-key
//! pre-filter (exact lookup after mutating up to two positions) before
//! paying for full dynamic programming on the flanks.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::align::{needleman_wunsch, normalized_distance, NwScores};
use crate::types::{ConservativePair, Locus, MatchMethod, FLANK_KEY_SEPARATOR};

pub const NUCLEOTIDES: [u8; 4] = [b'A', b'C', b'G', b'T'];

#[derive(Debug, Error)]
pub enum ConserveError {
    #[error("reduce-fold must be >= 1, got {0}")]
    ReduceFold(usize),
    #[error("mismatches must be 0, 1, or 2, got {0}")]
    Mismatches(u8),
    #[error("{option} must be within [0, 1], got {value}")]
    Threshold { option: &'static str, value: f64 },
}

/// Conservativeness configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConserveParams {
    pub method: MatchMethod,
    /// Levenshtein acceptance: normalized distance <= this per flank.
    pub max_distance: f64,
    /// Needleman-Wunsch acceptance: identity >= this per flank.
    pub min_identity: f64,
    pub nw_scores: NwScores,
    /// Reduced keys keep the last/first ceil(len / reduce_fold) bytes of
    /// each flank.
    pub reduce_fold: usize,
    /// Reduced-key substitutions tried during the pre-filter (0, 1 or 2).
    pub mismatches: u8,
}

impl Default for ConserveParams {
    fn default() -> Self {
        Self {
            method: MatchMethod::Levenshtein,
            max_distance: 0.05,
            min_identity: 0.95,
            nw_scores: NwScores::default(),
            reduce_fold: 3,
            mismatches: 0,
        }
    }
}

impl ConserveParams {
    pub fn validate(&self) -> Result<(), ConserveError> {
        if self.reduce_fold == 0 {
            return Err(ConserveError::ReduceFold(self.reduce_fold));
        }
        if self.mismatches > 2 {
            return Err(ConserveError::Mismatches(self.mismatches));
        }
        if !(0.0..=1.0).contains(&self.max_distance) {
            return Err(ConserveError::Threshold {
                option: "max-distance",
                value: self.max_distance,
            });
        }
        if !(0.0..=1.0).contains(&self.min_identity) {
            return Err(ConserveError::Threshold {
                option: "min-identity",
                value: self.min_identity,
            });
        }
        Ok(())
    }

    /// Score rendered for pairs resolved without alignment.
    fn neutral_score(&self) -> f64 {
        match self.method {
            MatchMethod::Levenshtein => 0.0,
            MatchMethod::Exact | MatchMethod::NeedlemanWunsch => 1.0,
        }
    }
}

/// Keep only loci whose flank key occurs exactly once within their own
/// assembly. Colliding loci sit in ambiguous context and are dropped,
/// never merged.
pub fn unique_by_flank_key(loci: Vec<Locus>) -> Vec<Locus> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for locus in &loci {
        *counts.entry(locus.flank_key()).or_insert(0) += 1;
    }

    let before = loci.len();
    let unique: Vec<Locus> = loci
        .into_iter()
        .filter(|l| counts.get(&l.flank_key()).copied() == Some(1))
        .collect();
    if unique.len() < before {
        log::debug!(
            "dropped {} loci with ambiguous flank context",
            before - unique.len()
        );
    }
    unique
}

/// The reduced flank key used by the approximate pre-filter: the last
/// ceil(len / fold) bytes of the left flank and the first ceil(len /
/// fold) bytes of the right flank.
fn reduced_key(locus: &Locus, fold: usize) -> Vec<u8> {
    let left = locus.left_flank.as_bytes();
    let right = locus.right_flank.as_bytes();
    let left_keep = left.len().div_ceil(fold);
    let right_keep = right.len().div_ceil(fold);

    let mut key = Vec::with_capacity(left_keep + 1 + right_keep);
    key.extend_from_slice(&left[left.len() - left_keep..]);
    key.push(FLANK_KEY_SEPARATOR);
    key.extend_from_slice(&right[..right_keep]);
    key
}

/// Candidate partner indices reachable from `key` with up to
/// `mismatches` substitutions, in mutation order: the unmodified key
/// first, then single substitutions, then double substitutions. The
/// separator byte is never mutated.
fn candidate_indices(
    key: &[u8],
    mismatches: u8,
    table: &HashMap<Vec<u8>, Vec<usize>>,
    out: &mut Vec<usize>,
) {
    let mut seen: HashSet<usize> = HashSet::new();
    let push_hits = |key: &[u8], out: &mut Vec<usize>, seen: &mut HashSet<usize>| {
        if let Some(indices) = table.get(key) {
            for &idx in indices {
                if seen.insert(idx) {
                    out.push(idx);
                }
            }
        }
    };

    push_hits(key, out, &mut seen);
    if mismatches == 0 {
        return;
    }

    let mut mutated = key.to_vec();
    for i in 0..key.len() {
        if key[i] == FLANK_KEY_SEPARATOR {
            continue;
        }
        for &n1 in NUCLEOTIDES.iter().filter(|&&n| n != key[i]) {
            mutated[i] = n1;
            push_hits(&mutated, out, &mut seen);

            if mismatches == 2 {
                for j in (i + 1)..key.len() {
                    if key[j] == FLANK_KEY_SEPARATOR {
                        continue;
                    }
                    for &n2 in NUCLEOTIDES.iter().filter(|&&n| n != key[j]) {
                        mutated[j] = n2;
                        push_hits(&mutated, out, &mut seen);
                    }
                    mutated[j] = key[j];
                }
            }
        }
        mutated[i] = key[i];
    }
}

/// Score one flank pair under the configured method. Returns the score
/// when it passes the acceptance threshold.
fn score_flank(a: &str, b: &str, params: &ConserveParams) -> Option<f64> {
    match params.method {
        MatchMethod::Exact => (a == b).then_some(1.0),
        MatchMethod::Levenshtein => {
            let dist = normalized_distance(a.as_bytes(), b.as_bytes());
            (dist <= params.max_distance).then_some(dist)
        }
        MatchMethod::NeedlemanWunsch => {
            let identity =
                needleman_wunsch(a.as_bytes(), b.as_bytes(), &params.nw_scores).identity();
            (identity >= params.min_identity).then_some(identity)
        }
    }
}

/// Pair unique loci of assembly A with unique loci of assembly B that
/// share motif and flank context.
///
/// Exact flank-key pairs are resolved first in every mode. In the
/// approximate modes the remainder goes through the reduced-key
/// pre-filter, and surviving candidates must pass the alignment
/// threshold on the left and right flank independently. Each B locus
/// pairs at most once; ties resolve to the earliest A locus, in
/// mutation order of its reduced key.
pub fn pair_conservative(
    a: Vec<Locus>,
    b: Vec<Locus>,
    params: &ConserveParams,
) -> Result<Vec<ConservativePair>, ConserveError> {
    params.validate()?;

    let mut b_by_key: HashMap<String, usize> = HashMap::new();
    for (idx, locus) in b.iter().enumerate() {
        b_by_key.insert(locus.flank_key(), idx);
    }

    let mut pairs: Vec<ConservativePair> = Vec::new();
    let mut b_taken = vec![false; b.len()];
    let mut a_rest: Vec<&Locus> = Vec::new();

    for locus in &a {
        match b_by_key.get(&locus.flank_key()) {
            Some(&idx) if b[idx].motif == locus.motif => {
                b_taken[idx] = true;
                pairs.push(ConservativePair {
                    a: locus.clone(),
                    b: b[idx].clone(),
                    method: MatchMethod::Exact,
                    left_score: params.neutral_score(),
                    right_score: params.neutral_score(),
                });
            }
            _ => a_rest.push(locus),
        }
    }

    if params.method == MatchMethod::Exact {
        return Ok(pairs);
    }

    let b_rest: Vec<usize> = (0..b.len()).filter(|&i| !b_taken[i]).collect();
    let mut b_reduced: HashMap<Vec<u8>, Vec<usize>> = HashMap::new();
    for &idx in &b_rest {
        b_reduced
            .entry(reduced_key(&b[idx], params.reduce_fold))
            .or_default()
            .push(idx);
    }

    // Scoring is the expensive part; evaluate candidates for every
    // remaining A locus in parallel, then resolve B ownership in order.
    let scored: Vec<Vec<(usize, f64, f64)>> = a_rest
        .par_iter()
        .map(|locus| {
            let key = reduced_key(locus, params.reduce_fold);
            let mut indices = Vec::new();
            candidate_indices(&key, params.mismatches, &b_reduced, &mut indices);

            indices
                .into_iter()
                .filter(|&idx| b[idx].motif == locus.motif)
                .filter_map(|idx| {
                    let left = score_flank(&locus.left_flank, &b[idx].left_flank, params)?;
                    let right = score_flank(&locus.right_flank, &b[idx].right_flank, params)?;
                    Some((idx, left, right))
                })
                .collect()
        })
        .collect();

    for (locus, candidates) in a_rest.iter().zip(scored) {
        for (idx, left_score, right_score) in candidates {
            if b_taken[idx] {
                continue;
            }
            b_taken[idx] = true;
            pairs.push(ConservativePair {
                a: (*locus).clone(),
                b: b[idx].clone(),
                method: params.method,
                left_score,
                right_score,
            });
            break;
        }
    }

    Ok(pairs)
}
