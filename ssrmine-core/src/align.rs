//! Pairwise alignment oracles
//!
//! Two dynamic programs score flank similarity: Levenshtein edit
//! distance with unit costs, and Needleman-Wunsch global alignment with
//! configurable scores. Both are written out in full because the
//! backtrace tie-break order and the identity definition are part of
//! the output contract.

use serde::{Deserialize, Serialize};

/// Scoring for Needleman-Wunsch global alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NwScores {
    pub match_score: i32,
    pub mismatch_score: i32,
    pub gap_score: i32,
}

impl Default for NwScores {
    fn default() -> Self {
        Self {
            match_score: 1,
            mismatch_score: -1,
            gap_score: -2,
        }
    }
}

/// Levenshtein edit distance with unit insert/delete/substitute costs.
pub fn levenshtein(a: &[u8], b: &[u8]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Two-row DP over the shorter string.
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    let mut prev: Vec<usize> = (0..=short.len()).collect();
    let mut curr = vec![0usize; short.len() + 1];

    for (i, &lc) in long.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &sc) in short.iter().enumerate() {
            let substitute = prev[j] + usize::from(lc != sc);
            let delete = prev[j + 1] + 1;
            let insert = curr[j] + 1;
            curr[j + 1] = substitute.min(delete).min(insert);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[short.len()]
}

/// Edit distance normalized by the longer input length. Two empty
/// strings are at distance 0.
pub fn normalized_distance(a: &[u8], b: &[u8]) -> f64 {
    let denom = a.len().max(b.len());
    if denom == 0 {
        0.0
    } else {
        levenshtein(a, b) as f64 / denom as f64
    }
}

/// Outcome of a global alignment backtrace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NwAlignment {
    pub score: i32,
    pub matches: usize,
    pub steps: usize,
}

impl NwAlignment {
    /// Fraction of backtrace steps that aligned equal characters.
    /// The empty-vs-empty alignment has identity 1.
    pub fn identity(&self) -> f64 {
        if self.steps == 0 {
            1.0
        } else {
            self.matches as f64 / self.steps as f64
        }
    }
}

/// Needleman-Wunsch global alignment.
///
/// The backtrace prefers the diagonal move on score ties, then the move
/// consuming a character of `a` ("up"), then the move consuming a
/// character of `b` ("left").
pub fn needleman_wunsch(a: &[u8], b: &[u8], scores: &NwScores) -> NwAlignment {
    let n = a.len();
    let m = b.len();
    let width = m + 1;

    let mut dp = vec![0i32; (n + 1) * width];
    for i in 1..=n {
        dp[i * width] = i as i32 * scores.gap_score;
    }
    for j in 1..=m {
        dp[j] = j as i32 * scores.gap_score;
    }

    for i in 1..=n {
        for j in 1..=m {
            let sub = if a[i - 1] == b[j - 1] {
                scores.match_score
            } else {
                scores.mismatch_score
            };
            let diagonal = dp[(i - 1) * width + (j - 1)] + sub;
            let up = dp[(i - 1) * width + j] + scores.gap_score;
            let left = dp[i * width + (j - 1)] + scores.gap_score;
            dp[i * width + j] = diagonal.max(up).max(left);
        }
    }

    let mut i = n;
    let mut j = m;
    let mut matches = 0usize;
    let mut steps = 0usize;

    while i > 0 || j > 0 {
        let here = dp[i * width + j];
        if i > 0 && j > 0 {
            let sub = if a[i - 1] == b[j - 1] {
                scores.match_score
            } else {
                scores.mismatch_score
            };
            if here == dp[(i - 1) * width + (j - 1)] + sub {
                if a[i - 1] == b[j - 1] {
                    matches += 1;
                }
                i -= 1;
                j -= 1;
                steps += 1;
                continue;
            }
        }
        if i > 0 && here == dp[(i - 1) * width + j] + scores.gap_score {
            i -= 1;
        } else {
            j -= 1;
        }
        steps += 1;
    }

    NwAlignment {
        score: dp[n * width + m],
        matches,
        steps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_known_values() {
        assert_eq!(levenshtein(b"kitten", b"sitting"), 3);
        assert_eq!(levenshtein(b"ACGT", b"ACGT"), 0);
        assert_eq!(levenshtein(b"ACGT", b"AGT"), 1);
        assert_eq!(levenshtein(b"", b"ACG"), 3);
    }

    #[test]
    fn test_levenshtein_is_symmetric() {
        let cases: &[(&[u8], &[u8])] = &[
            (b"ACGTACGT", b"ACCTACGA"),
            (b"GATTACA", b"TACCAT"),
            (b"", b"TTTT"),
        ];
        for (a, b) in cases {
            assert_eq!(levenshtein(a, b), levenshtein(b, a));
        }
    }

    #[test]
    fn test_levenshtein_zero_iff_equal() {
        assert_eq!(levenshtein(b"TTAGGC", b"TTAGGC"), 0);
        assert_ne!(levenshtein(b"TTAGGC", b"TTAGGT"), 0);
    }

    #[test]
    fn test_normalized_distance() {
        assert_eq!(normalized_distance(b"", b""), 0.0);
        assert_eq!(normalized_distance(b"ACGT", b"ACGT"), 0.0);
        assert!((normalized_distance(b"ACGT", b"ACGA") - 0.25).abs() < 1e-9);
        // Normalized by the longer length.
        assert!((normalized_distance(b"AC", b"ACGT") - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_nw_identity_one_iff_equal() {
        let scores = NwScores::default();
        let aln = needleman_wunsch(b"ACGTACGT", b"ACGTACGT", &scores);
        assert_eq!(aln.identity(), 1.0);
        assert_eq!(aln.matches, 8);
        assert_eq!(aln.steps, 8);

        let aln = needleman_wunsch(b"ACGTACGT", b"ACGTACGA", &scores);
        assert!(aln.identity() < 1.0);
    }

    #[test]
    fn test_nw_with_gap() {
        let scores = NwScores::default();
        // ACGT vs AGT aligns with one gap: 3 matches over 4 steps.
        let aln = needleman_wunsch(b"ACGT", b"AGT", &scores);
        assert_eq!(aln.matches, 3);
        assert_eq!(aln.steps, 4);
        assert!((aln.identity() - 0.75).abs() < 1e-9);
        assert_eq!(aln.score, 1);
    }

    #[test]
    fn test_nw_empty_inputs() {
        let scores = NwScores::default();
        let aln = needleman_wunsch(b"", b"", &scores);
        assert_eq!(aln.steps, 0);
        assert_eq!(aln.identity(), 1.0);

        let aln = needleman_wunsch(b"ACG", b"", &scores);
        assert_eq!(aln.steps, 3);
        assert_eq!(aln.matches, 0);
        assert_eq!(aln.score, 3 * scores.gap_score);
    }

    #[test]
    fn test_nw_all_mismatch() {
        let scores = NwScores::default();
        let aln = needleman_wunsch(b"AAAA", b"TTTT", &scores);
        // Substituting all four (-4) beats gapping everything (-16).
        assert_eq!(aln.score, -4);
        assert_eq!(aln.matches, 0);
        assert_eq!(aln.steps, 4);
    }
}
