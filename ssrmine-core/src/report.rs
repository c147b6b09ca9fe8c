//! Output tables and statistics
//!
//! Tab-separated writers for the locus table and the final comparison
//! table, plus the per-assembly scan statistics report. Similarity
//! scores carry exactly 3 decimal digits; statistics percentages and
//! averages carry 2.

use std::collections::BTreeMap;
use std::io::{self, Write};

use serde::Serialize;

use crate::types::{ComparisonRow, Locus};

pub const LOCUS_TABLE_HEADER: &str = "id\tmotif\tmotif_length\trepeat_number\tsize\tstart\tend\tleft_fs\tleft_fs_length\tright_fs\tright_fs_length";

pub const COMPARISON_TABLE_HEADER: &str = "number\tid1\tmotif1\trepeat_number1\tstart1\tend1\tid2\tmotif2\trepeat_number2\tstart2\tend2\tleft_fs\tleft_fs_length\tleft_score\tright_fs\tright_fs_length\tright_score\tpolymorphism";

/// Write the post-scan locus table.
pub fn write_locus_table<W: Write>(mut w: W, loci: &[Locus]) -> io::Result<()> {
    writeln!(w, "{}", LOCUS_TABLE_HEADER)?;
    for l in loci {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            l.seq_id,
            l.motif,
            l.motif_len,
            l.repeats,
            l.len,
            l.start,
            l.end,
            l.left_flank,
            l.left_flank_len,
            l.right_flank,
            l.right_flank_len,
        )?;
    }
    Ok(())
}

/// Write the final cross-assembly comparison table.
pub fn write_comparison_table<W: Write>(mut w: W, rows: &[ComparisonRow]) -> io::Result<()> {
    writeln!(w, "{}", COMPARISON_TABLE_HEADER)?;
    for row in rows {
        let p = &row.pair;
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{:.3}\t{}\t{}\t{:.3}\t{}",
            row.number,
            p.a.seq_id,
            p.a.motif,
            p.a.repeats,
            p.a.start,
            p.a.end,
            p.b.seq_id,
            p.b.motif,
            p.b.repeats,
            p.b.start,
            p.b.end,
            p.a.left_flank,
            p.a.left_flank_len,
            p.left_score,
            p.a.right_flank,
            p.a.right_flank_len,
            p.right_score,
            if row.polymorphism { "yes" } else { "no" },
        )?;
    }
    Ok(())
}

/// Per-motif-length breakdown of a scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MotifLenStats {
    pub motif_len: usize,
    pub count: usize,
    /// Share of all loci, in percent.
    pub percent: f64,
    pub mean_repeats: f64,
}

/// Summary statistics of one assembly scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanStatistics {
    pub sequence_count: usize,
    pub total_bases: u64,
    pub locus_count: usize,
    pub loci_per_mb: f64,
    pub per_motif_len: Vec<MotifLenStats>,
}

impl ScanStatistics {
    pub fn collect(sequence_count: usize, total_bases: u64, loci: &[Locus]) -> Self {
        let mut counts: BTreeMap<usize, (usize, u64)> = BTreeMap::new();
        for l in loci {
            let entry = counts.entry(l.motif_len).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += l.repeats as u64;
        }

        let locus_count = loci.len();
        let per_motif_len = counts
            .into_iter()
            .map(|(motif_len, (count, repeat_sum))| MotifLenStats {
                motif_len,
                count,
                percent: 100.0 * count as f64 / locus_count as f64,
                mean_repeats: repeat_sum as f64 / count as f64,
            })
            .collect();

        let loci_per_mb = if total_bases == 0 {
            0.0
        } else {
            locus_count as f64 / (total_bases as f64 / 1_000_000.0)
        };

        Self {
            sequence_count,
            total_bases,
            locus_count,
            loci_per_mb,
            per_motif_len,
        }
    }
}

/// Write the human-readable statistics report.
pub fn write_statistics<W: Write>(mut w: W, label: &str, stats: &ScanStatistics) -> io::Result<()> {
    writeln!(w, "Statistics for {}", label)?;
    writeln!(w, "Sequences scanned:\t{}", stats.sequence_count)?;
    writeln!(w, "Bases scanned:\t{}", stats.total_bases)?;
    writeln!(w, "SSR loci found:\t{}", stats.locus_count)?;
    writeln!(w, "Loci per Mb:\t{:.2}", stats.loci_per_mb)?;
    writeln!(w)?;
    writeln!(w, "motif_length\tcount\tpercent\tmean_repeat_number")?;
    for m in &stats.per_motif_len {
        writeln!(
            w,
            "{}\t{}\t{:.2}\t{:.2}",
            m.motif_len, m.count, m.percent, m.mean_repeats
        )?;
    }
    Ok(())
}
