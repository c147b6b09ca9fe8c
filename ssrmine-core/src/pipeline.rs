//! Pipeline orchestration
//!
//! Runs the stages end to end: partition, parallel scan, per-assembly
//! unique-key filtering, cross-assembly conservativeness pairing,
//! genome-wide uniqueness verification, and final table assembly.
//!
//! Each stage consumes its input by value and returns a fresh
//! structure, so a stage can never observe the previous stage's data
//! after handoff. Workers own their partition exclusively until the
//! join barrier; any worker error aborts the stage with no partial
//! merge.

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::compare::assemble;
use crate::conserve::{pair_conservative, unique_by_flank_key, ConserveParams};
use crate::partition::{concatenate, partition_by_length};
use crate::report::ScanStatistics;
use crate::scanner::{scan_sequence, ScanParams};
use crate::types::{ComparisonRow, ConservativePair, Locus, Sequence};
use crate::unique::verify_flank_pairs;

/// Full pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineParams {
    pub scan: ScanParams,
    pub conserve: ConserveParams,
    pub threads: usize,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            scan: ScanParams::default(),
            conserve: ConserveParams::default(),
            threads: 1,
        }
    }
}

/// Result of scanning one assembly.
#[derive(Debug, Clone)]
pub struct MineOutput {
    pub loci: Vec<Locus>,
    pub stats: ScanStatistics,
}

/// Result of comparing two assemblies.
#[derive(Debug, Clone)]
pub struct CompareOutput {
    pub rows: Vec<ComparisonRow>,
    pub stats_a: ScanStatistics,
    pub stats_b: ScanStatistics,
}

/// Scan an assembly for SSR loci.
///
/// Sequences are packed into load-balanced groups, scanned in
/// parallel, and the per-worker results are merged after the join
/// barrier and sorted by (sequence id, start).
pub fn mine(sequences: Vec<Sequence>, scan: &ScanParams, threads: usize) -> Result<MineOutput> {
    scan.validate().context("invalid scan parameters")?;

    let sequence_count = sequences.len();
    let total_bases: u64 = sequences.iter().map(|s| s.len() as u64).sum();
    log::info!(
        "scanning {} sequences ({} bases) on {} threads",
        sequence_count,
        total_bases,
        threads.max(1)
    );

    let groups = partition_by_length(sequences, threads);
    let per_group: Vec<Vec<Locus>> = groups
        .into_par_iter()
        .map(|group| {
            let mut loci = Vec::new();
            for seq in &group.sequences {
                loci.extend(scan_sequence(seq, scan));
            }
            loci
        })
        .collect();

    let mut loci: Vec<Locus> = per_group.into_iter().flatten().collect();
    loci.sort_by(|x, y| x.seq_id.cmp(&y.seq_id).then_with(|| x.start.cmp(&y.start)));

    log::info!("found {} SSR loci", loci.len());
    let stats = ScanStatistics::collect(sequence_count, total_bases, &loci);

    Ok(MineOutput { loci, stats })
}

/// Drop pairs whose flank halves are not unique enough genome-wide.
/// Each side is verified against its own assembly; both must pass.
fn verify_pairs(
    pairs: Vec<ConservativePair>,
    genome_a: &[u8],
    genome_b: &[u8],
    window: usize,
    threads: usize,
) -> Vec<ConservativePair> {
    let halves_a: Vec<(&[u8], &[u8])> = pairs
        .iter()
        .map(|p| (p.a.left_flank.as_bytes(), p.a.right_flank.as_bytes()))
        .collect();
    let halves_b: Vec<(&[u8], &[u8])> = pairs
        .iter()
        .map(|p| (p.b.left_flank.as_bytes(), p.b.right_flank.as_bytes()))
        .collect();

    let ok_a = verify_flank_pairs(genome_a, &halves_a, window, threads);
    let ok_b = verify_flank_pairs(genome_b, &halves_b, window, threads);

    pairs
        .into_iter()
        .zip(ok_a.into_iter().zip(ok_b))
        .filter_map(|(pair, (a, b))| (a && b).then_some(pair))
        .collect()
}

/// Compare two assemblies and produce the polymorphism table.
pub fn compare(
    sequences_a: Vec<Sequence>,
    sequences_b: Vec<Sequence>,
    params: &PipelineParams,
) -> Result<CompareOutput> {
    params.scan.validate().context("invalid scan parameters")?;
    params
        .conserve
        .validate()
        .context("invalid conservativeness parameters")?;

    // The verifier needs the raw byte streams after scanning consumed
    // the sequences, so concatenate up front.
    let genome_a = concatenate(&sequences_a);
    let genome_b = concatenate(&sequences_b);

    let mined_a = mine(sequences_a, &params.scan, params.threads)?;
    let mined_b = mine(sequences_b, &params.scan, params.threads)?;
    let stats_a = mined_a.stats;
    let stats_b = mined_b.stats;

    let unique_a = unique_by_flank_key(mined_a.loci);
    let unique_b = unique_by_flank_key(mined_b.loci);
    log::info!(
        "{} / {} loci with unambiguous flank context",
        unique_a.len(),
        unique_b.len()
    );

    let pairs = pair_conservative(unique_a, unique_b, &params.conserve)?;
    log::info!("{} conservative flank pairs", pairs.len());

    let verified = verify_pairs(
        pairs,
        &genome_a,
        &genome_b,
        params.scan.flank_len,
        params.threads,
    );
    log::info!("{} pairs unique genome-wide", verified.len());

    Ok(CompareOutput {
        rows: assemble(verified),
        stats_a,
        stats_b,
    })
}
