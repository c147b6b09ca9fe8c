//! Work partitioning for parallel stages
//!
//! Two schemes are used by the pipeline: named sequences are packed into
//! load-balanced groups for scanning, and the concatenated genome byte
//! stream is cut into contiguous near-equal segments for the uniqueness
//! verifier.

use std::ops::Range;

use crate::types::Sequence;

/// A group of sequences assigned to one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceGroup {
    pub sequences: Vec<Sequence>,
    pub total_len: usize,
}

/// Pack sequences into at most `threads` groups with balanced total
/// content length.
///
/// Greedy longest-processing-time-first: sequences are taken in
/// descending length order, the first `t` seed one group each, and every
/// later sequence lands in the currently lightest group. Groups are kept
/// sorted by descending load and re-sorted lazily, only when the last
/// group overtakes the second-to-last. If there are fewer sequences than
/// threads, the effective group count is the sequence count.
pub fn partition_by_length(sequences: Vec<Sequence>, threads: usize) -> Vec<SequenceGroup> {
    let mut seqs = sequences;
    seqs.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.id.cmp(&b.id)));

    let t = threads.max(1).min(seqs.len());
    let mut groups: Vec<SequenceGroup> = Vec::with_capacity(t);

    for seq in seqs {
        if groups.len() < t {
            groups.push(SequenceGroup {
                total_len: seq.len(),
                sequences: vec![seq],
            });
            continue;
        }

        let last = groups.len() - 1;
        groups[last].total_len += seq.len();
        groups[last].sequences.push(seq);
        if groups.len() > 1 && groups[last].total_len > groups[last - 1].total_len {
            groups.sort_by(|a, b| b.total_len.cmp(&a.total_len));
        }
    }

    groups
}

/// Cut `[0, total_len)` into at most `threads` contiguous near-equal
/// ranges by raw byte offset.
///
/// Record boundaries are irrelevant here. A match straddling a range
/// boundary is undercounted by the windowed tally built on top of this
/// split; callers absorb that with the occurrence tolerance.
pub fn split_byte_ranges(total_len: usize, threads: usize) -> Vec<Range<usize>> {
    if total_len == 0 {
        return Vec::new();
    }

    let t = threads.max(1).min(total_len);
    let chunk = total_len / t;
    let remainder = total_len % t;

    let mut ranges = Vec::with_capacity(t);
    let mut start = 0;
    for i in 0..t {
        let len = chunk + usize::from(i < remainder);
        ranges.push(start..start + len);
        start += len;
    }
    ranges
}

/// Concatenate sequence contents into one byte stream.
pub fn concatenate(sequences: &[Sequence]) -> Vec<u8> {
    let total: usize = sequences.iter().map(|s| s.len()).sum();
    let mut out = Vec::with_capacity(total);
    for seq in sequences {
        out.extend_from_slice(&seq.data);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(id: &str, len: usize) -> Sequence {
        Sequence::new(id.to_string(), vec![b'A'; len])
    }

    #[test]
    fn test_partition_balances_loads() {
        let sequences = vec![
            seq("a", 100),
            seq("b", 90),
            seq("c", 50),
            seq("d", 40),
            seq("e", 30),
            seq("f", 10),
        ];

        let groups = partition_by_length(sequences, 3);
        assert_eq!(groups.len(), 3);

        // LPT: seeds are 100, 90, 50; then 40 and 30 join the 50 group,
        // 10 joins the 90 group.
        let mut loads: Vec<usize> = groups.iter().map(|g| g.total_len).collect();
        loads.sort();
        assert_eq!(loads, vec![100, 100, 120]);

        let total: usize = groups.iter().map(|g| g.total_len).sum();
        assert_eq!(total, 320);
    }

    #[test]
    fn test_fewer_sequences_than_threads() {
        let groups = partition_by_length(vec![seq("a", 5), seq("b", 3)], 8);
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| g.sequences.len() == 1));
    }

    #[test]
    fn test_empty_input() {
        assert!(partition_by_length(Vec::new(), 4).is_empty());
    }

    #[test]
    fn test_group_load_matches_members() {
        let sequences = vec![seq("a", 7), seq("b", 13), seq("c", 2), seq("d", 9)];
        for group in partition_by_length(sequences, 2) {
            let sum: usize = group.sequences.iter().map(|s| s.len()).sum();
            assert_eq!(sum, group.total_len);
        }
    }

    #[test]
    fn test_byte_ranges_cover_contiguously() {
        let ranges = split_byte_ranges(103, 4);
        assert_eq!(ranges.len(), 4);
        assert_eq!(ranges[0].start, 0);
        assert_eq!(ranges.last().unwrap().end, 103);
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        // Lengths differ by at most one.
        let lens: Vec<usize> = ranges.iter().map(|r| r.len()).collect();
        assert_eq!(lens.iter().max().unwrap() - lens.iter().min().unwrap(), 1);
    }

    #[test]
    fn test_byte_ranges_degenerate_cases() {
        assert!(split_byte_ranges(0, 4).is_empty());
        assert_eq!(split_byte_ranges(3, 8).len(), 3);
        assert_eq!(split_byte_ranges(10, 1), vec![0..10]);
    }

    #[test]
    fn test_concatenate() {
        let sequences = vec![
            Sequence::new("a".to_string(), b"ACGT".to_vec()),
            Sequence::new("b".to_string(), b"TT".to_vec()),
        ];
        assert_eq!(concatenate(&sequences), b"ACGTTT");
    }
}
