//! Final polymorphism table assembly
//!
//! Joins the surviving conservative, genome-wide-unique locus pairs
//! into numbered comparison rows and flags repeat-count differences.

use crate::types::{ComparisonRow, ConservativePair};

/// Assemble the final table. Rows are sorted by assembly-A sequence id
/// and start position; upstream parallel merges make no ordering
/// promise, so determinism is applied here.
pub fn assemble(pairs: Vec<ConservativePair>) -> Vec<ComparisonRow> {
    let mut pairs = pairs;
    pairs.sort_by(|x, y| {
        x.a.seq_id
            .cmp(&y.a.seq_id)
            .then_with(|| x.a.start.cmp(&y.a.start))
    });

    pairs
        .into_iter()
        .enumerate()
        .map(|(i, pair)| ComparisonRow {
            number: i + 1,
            polymorphism: pair.a.repeats != pair.b.repeats,
            pair,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Locus, MatchMethod};

    fn pair(seq_id: &str, start: usize, repeats_a: usize, repeats_b: usize) -> ConservativePair {
        let locus = |repeats: usize| Locus {
            seq_id: seq_id.to_string(),
            motif: "CAG".to_string(),
            motif_len: 3,
            repeats,
            len: 3 * repeats,
            start,
            end: start + 3 * repeats - 1,
            left_flank: "AAATTTCCC".to_string(),
            left_flank_len: 9,
            right_flank: "GGGCCCAAA".to_string(),
            right_flank_len: 9,
        };
        ConservativePair {
            a: locus(repeats_a),
            b: locus(repeats_b),
            method: MatchMethod::Exact,
            left_score: 0.0,
            right_score: 0.0,
        }
    }

    #[test]
    fn test_polymorphism_flag() {
        let rows = assemble(vec![pair("c1", 10, 5, 7), pair("c1", 200, 6, 6)]);
        assert_eq!(rows.len(), 2);
        assert!(rows[0].polymorphism);
        assert!(!rows[1].polymorphism);
    }

    #[test]
    fn test_rows_sorted_and_numbered() {
        let rows = assemble(vec![
            pair("c2", 50, 4, 4),
            pair("c1", 300, 5, 6),
            pair("c1", 20, 7, 7),
        ]);

        let order: Vec<(&str, usize)> = rows
            .iter()
            .map(|r| (r.pair.a.seq_id.as_str(), r.pair.a.start))
            .collect();
        assert_eq!(order, vec![("c1", 20), ("c1", 300), ("c2", 50)]);
        let numbers: Vec<usize> = rows.iter().map(|r| r.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }
}
