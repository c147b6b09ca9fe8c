//! Genome-wide flank uniqueness verifier
//!
//! Confirms that a candidate flank pair occurs at most at one locus
//! genome-wide. The genome is cut into non-overlapping fixed-width
//! windows at every phase offset and window contents are tallied
//! against the candidate flank halves. A half seen more than once at
//! one phase saturates its tally; a pair is accepted when the summed
//! tally over both halves and all phases stays within the tolerance.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::partition::split_byte_ranges;

/// Tally ceiling; any value above the acceptance threshold behaves the
/// same, so counts are clamped here.
const SATURATED: u32 = 3;

/// Summed occurrence tolerance. Both halves of a real candidate tally
/// once each, and chunk-boundary undercounting makes a strict limit
/// overzealous, so up to 2 is accepted.
const MAX_OCCURRENCES: u32 = 2;

/// Count genome-wide window occurrences of each half, saturated at 3.
///
/// Only halves whose length equals `window` can match a window; shorter
/// boundary-truncated halves tally zero. The byte stream is split into
/// contiguous per-worker segments whose window grids restart at the
/// segment start, so a match straddling a segment boundary is missed;
/// the acceptance tolerance absorbs that.
fn tally_halves(genome: &[u8], halves: &[&[u8]], window: usize, threads: usize) -> Vec<u32> {
    let mut index: HashMap<&[u8], usize> = HashMap::new();
    for &half in halves {
        if half.len() == window {
            let next = index.len();
            index.entry(half).or_insert(next);
        }
    }

    let distinct = index.len();
    if distinct == 0 || genome.len() < window {
        return vec![0; halves.len()];
    }

    let merged: Vec<u32> = split_byte_ranges(genome.len(), threads)
        .into_par_iter()
        .map(|range| {
            let segment = &genome[range];
            let mut tallies = vec![0u32; distinct];
            let mut phase_counts = vec![0u32; distinct];

            for phase in 0..window {
                phase_counts.fill(0);

                let mut offset = phase;
                while offset + window <= segment.len() {
                    if let Some(&idx) = index.get(&segment[offset..offset + window]) {
                        phase_counts[idx] += 1;
                    }
                    offset += window;
                }

                for (tally, &seen) in tallies.iter_mut().zip(&phase_counts) {
                    if seen > 1 {
                        *tally = SATURATED;
                    } else {
                        *tally = (*tally + seen).min(SATURATED);
                    }
                }
            }

            tallies
        })
        .reduce(
            || vec![0u32; distinct],
            |mut acc, part| {
                for (a, p) in acc.iter_mut().zip(part) {
                    *a = (*a + p).min(SATURATED);
                }
                acc
            },
        );

    halves
        .iter()
        .map(|half| index.get(*half).map_or(0, |&idx| merged[idx]))
        .collect()
}

/// Decide for each (left, right) flank pair whether it is unique enough
/// genome-wide: the summed saturated tally of both halves must stay
/// within the tolerance of 2.
pub fn verify_flank_pairs(
    genome: &[u8],
    pairs: &[(&[u8], &[u8])],
    window: usize,
    threads: usize,
) -> Vec<bool> {
    if pairs.is_empty() || window == 0 {
        return vec![true; pairs.len()];
    }

    let mut halves: Vec<&[u8]> = Vec::with_capacity(pairs.len() * 2);
    for &(left, right) in pairs {
        halves.push(left);
        halves.push(right);
    }

    let tallies = tally_halves(genome, &halves, window, threads);

    tallies
        .chunks_exact(2)
        .map(|pair| pair[0].saturating_add(pair[1]) <= MAX_OCCURRENCES)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // 40 bases with no repeated 8-mer across phases.
    const GENOME: &[u8] = b"ATTGACCTTGCAGGTCAGTTTGGAACCTAGCATCAGGATC";

    #[test]
    fn test_unique_pair_is_accepted() {
        let left = &GENOME[0..8];
        let right = &GENOME[24..32];
        let verdicts = verify_flank_pairs(GENOME, &[(left, right)], 8, 1);
        assert_eq!(verdicts, vec![true]);
    }

    #[test]
    fn test_absent_halves_tally_zero() {
        let pairs: Vec<(&[u8], &[u8])> = vec![(b"CCCCCCCC", b"GGGGGGGG")];
        let verdicts = verify_flank_pairs(GENOME, &pairs, 8, 1);
        assert_eq!(verdicts, vec![true]);
    }

    #[test]
    fn test_duplicated_half_is_rejected() {
        // The 8-mer appears twice on the phase-0 grid: saturated.
        let mut genome = Vec::new();
        genome.extend_from_slice(b"ACGTTGCA");
        genome.extend_from_slice(b"TTTTAAAA");
        genome.extend_from_slice(b"ACGTTGCA");
        genome.extend_from_slice(b"GGGGCCCC");

        let pairs: Vec<(&[u8], &[u8])> = vec![(b"ACGTTGCA", b"GGGGCCCC")];
        let verdicts = verify_flank_pairs(&genome, &pairs, 8, 1);
        assert_eq!(verdicts, vec![false]);
    }

    #[test]
    fn test_short_halves_cannot_match_windows() {
        let pairs: Vec<(&[u8], &[u8])> = vec![(b"ATTGA", b"CCTAG")];
        let verdicts = verify_flank_pairs(GENOME, &pairs, 8, 1);
        assert_eq!(verdicts, vec![true]);
    }

    #[test]
    fn test_occurrence_at_any_offset_is_counted() {
        // Target placed at offset 3: invisible on the phase-0 grid but
        // caught at phase 3.
        let mut genome = Vec::new();
        genome.extend_from_slice(b"TTT");
        genome.extend_from_slice(b"ACGTTGCA");
        genome.extend_from_slice(b"GGGGGGGGGGGGG");
        assert_eq!(genome.len(), 24);

        let pairs: Vec<(&[u8], &[u8])> = vec![(b"ACGTTGCA", b"CCCCCCCC")];
        let verdicts = verify_flank_pairs(&genome, &pairs, 8, 1);
        assert_eq!(verdicts, vec![true]);

        // Two copies at different offsets still sum past the tolerance
        // together with itself.
        let mut genome2 = Vec::new();
        genome2.extend_from_slice(b"TTT");
        genome2.extend_from_slice(b"ACGTTGCA");
        genome2.extend_from_slice(b"GG");
        genome2.extend_from_slice(b"ACGTTGCA");
        genome2.extend_from_slice(b"ACGTTGCA");
        let verdicts = verify_flank_pairs(&genome2, &pairs, 8, 1);
        assert_eq!(verdicts, vec![false]);
    }

    #[test]
    fn test_thread_counts_agree_away_from_boundaries() {
        // 64 bases, split at 32 with two threads; occurrences sit well
        // inside each half so no match straddles the cut.
        let mut genome = Vec::new();
        genome.extend_from_slice(b"ACGTTGCAACCGGTTA");
        genome.extend_from_slice(b"TTGCAACCGGTTAACG");
        genome.extend_from_slice(b"GCCATTGGCCAATTGG");
        genome.extend_from_slice(b"AATTGGCCAATTGGCC");
        assert_eq!(genome.len(), 64);

        let pairs: Vec<(&[u8], &[u8])> =
            vec![(b"ACGTTGCA", b"GCCATTGG"), (b"AAAAAAAA", b"TTTTTTTT")];

        let single = verify_flank_pairs(&genome, &pairs, 8, 1);
        let multi = verify_flank_pairs(&genome, &pairs, 8, 2);
        assert_eq!(single, multi);
    }
}
