use serde::{Deserialize, Serialize};

/// Separator between the left and right halves of a flank key.
pub const FLANK_KEY_SEPARATOR: u8 = b'|';

/// A named nucleotide sequence. Content is uppercase A/C/G/T only;
/// every other input byte is stripped at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    pub id: String,
    pub data: Vec<u8>,
}

impl Sequence {
    pub fn new(id: String, data: Vec<u8>) -> Self {
        Self { id, data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// One mined SSR locus with its flanking context.
///
/// `start` and `end` are 1-based inclusive positions in the cleaned
/// sequence. Invariants: `end - start + 1 == len` and
/// `len == motif_len * repeats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locus {
    pub seq_id: String,
    pub motif: String,
    pub motif_len: usize,
    pub repeats: usize,
    pub len: usize,
    pub start: usize,
    pub end: usize,
    pub left_flank: String,
    pub left_flank_len: usize,
    pub right_flank: String,
    pub right_flank_len: usize,
}

impl Locus {
    /// Deduplication / lookup key built from both flanks. Flank content
    /// never contains the separator byte, so keys cannot alias.
    pub fn flank_key(&self) -> String {
        let mut key = String::with_capacity(self.left_flank.len() + 1 + self.right_flank.len());
        key.push_str(&self.left_flank);
        key.push(FLANK_KEY_SEPARATOR as char);
        key.push_str(&self.right_flank);
        key
    }
}

/// How a flank-context pair was matched across the two assemblies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchMethod {
    Exact,
    Levenshtein,
    NeedlemanWunsch,
}

impl MatchMethod {
    pub fn tag(&self) -> &'static str {
        match self {
            MatchMethod::Exact => "exact",
            MatchMethod::Levenshtein => "ld",
            MatchMethod::NeedlemanWunsch => "nw",
        }
    }
}

/// A locus from each assembly sharing motif and (exact or approximate)
/// flank context. Scores are per flank: normalized edit distance for
/// `Levenshtein`, alignment identity for `NeedlemanWunsch`, and the
/// neutral value for pairs resolved by exact match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConservativePair {
    pub a: Locus,
    pub b: Locus,
    pub method: MatchMethod,
    pub left_score: f64,
    pub right_score: f64,
}

/// One row of the final polymorphism table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub number: usize,
    pub pair: ConservativePair,
    pub polymorphism: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locus() -> Locus {
        Locus {
            seq_id: "chr1".to_string(),
            motif: "CAG".to_string(),
            motif_len: 3,
            repeats: 5,
            len: 15,
            start: 11,
            end: 25,
            left_flank: "ATTGACCTTG".to_string(),
            left_flank_len: 10,
            right_flank: "TTGGAACCTA".to_string(),
            right_flank_len: 10,
        }
    }

    #[test]
    fn test_locus_invariants() {
        let l = locus();
        assert_eq!(l.end - l.start + 1, l.len);
        assert_eq!(l.motif_len * l.repeats, l.len);
    }

    #[test]
    fn test_flank_key() {
        let l = locus();
        assert_eq!(l.flank_key(), "ATTGACCTTG|TTGGAACCTA");
    }

    #[test]
    fn test_method_tags() {
        assert_eq!(MatchMethod::Exact.tag(), "exact");
        assert_eq!(MatchMethod::Levenshtein.tag(), "ld");
        assert_eq!(MatchMethod::NeedlemanWunsch.tag(), "nw");
    }

    #[test]
    fn test_locus_serde_round_trip() {
        let l = locus();
        let json = serde_json::to_string(&l).unwrap();
        let restored: Locus = serde_json::from_str(&json).unwrap();
        assert_eq!(l, restored);
    }
}
