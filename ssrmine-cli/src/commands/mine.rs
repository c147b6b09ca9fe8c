//! Single-assembly SSR mining command

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use ssrmine_core::report::{write_locus_table, write_statistics};
use ssrmine_core::scanner::{MotifTable, ScanParams};
use ssrmine_core::{pipeline, FastaLoader};

use crate::config::Config;

/// Resolve scan parameters from configuration and CLI overrides.
pub fn resolve_scan_params(
    config: &Config,
    motifs: Option<String>,
    flank_len: Option<usize>,
    min_ssr_len: Option<usize>,
    max_ssr_len: Option<usize>,
) -> Result<ScanParams> {
    let motif_spec = motifs.unwrap_or_else(|| config.scan.motifs.clone());
    let motifs = MotifTable::parse(&motif_spec)
        .with_context(|| format!("invalid --motifs value '{}'", motif_spec))?;

    let params = ScanParams {
        motifs,
        flank_len: flank_len.unwrap_or(config.scan.flank_len),
        min_ssr_len: min_ssr_len.unwrap_or(config.scan.min_ssr_len),
        max_ssr_len: max_ssr_len.unwrap_or(config.scan.max_ssr_len),
    };
    params.validate().context("invalid scan options")?;
    Ok(params)
}

#[allow(clippy::too_many_arguments)]
pub fn execute(
    config: &Config,
    threads: usize,
    fasta: PathBuf,
    out: PathBuf,
    stats: Option<PathBuf>,
    motifs: Option<String>,
    flank_len: Option<usize>,
    min_ssr_len: Option<usize>,
    max_ssr_len: Option<usize>,
) -> Result<()> {
    let params = resolve_scan_params(config, motifs, flank_len, min_ssr_len, max_ssr_len)?;

    let sequences = FastaLoader::load_file(&fasta)
        .with_context(|| format!("failed to load {}", fasta.display()))?;

    let output = pipeline::mine(sequences, &params, threads)?;

    write_table(&out, &output.loci)?;
    log::info!("wrote {} loci to {}", output.loci.len(), out.display());

    if let Some(stats_path) = stats {
        let label = fasta.display().to_string();
        write_stats(&stats_path, &label, &output.stats)?;
        log::info!("wrote statistics to {}", stats_path.display());
    }

    Ok(())
}

fn write_table(path: &Path, loci: &[ssrmine_core::Locus]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    write_locus_table(BufWriter::new(file), loci)
        .with_context(|| format!("cannot write {}", path.display()))
}

pub fn write_stats(
    path: &Path,
    label: &str,
    stats: &ssrmine_core::report::ScanStatistics,
) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    write_statistics(BufWriter::new(file), label, stats)
        .with_context(|| format!("cannot write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_uses_config_defaults() {
        let config = Config::default();
        let params = resolve_scan_params(&config, None, None, None, None).unwrap();
        assert_eq!(params.flank_len, 100);
        assert_eq!(params.motifs.len(), 6);
    }

    #[test]
    fn test_cli_overrides_win() {
        let config = Config::default();
        let params =
            resolve_scan_params(&config, Some("2=7".to_string()), Some(50), None, None).unwrap();
        assert_eq!(params.flank_len, 50);
        assert_eq!(params.motifs.len(), 1);
    }

    #[test]
    fn test_bad_motif_spec_names_the_option() {
        let config = Config::default();
        let err = resolve_scan_params(&config, Some("2=x".to_string()), None, None, None)
            .unwrap_err();
        assert!(format!("{:#}", err).contains("--motifs"));
    }
}
