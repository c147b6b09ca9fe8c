//! Two-assembly comparison command

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use ssrmine_core::conserve::ConserveParams;
use ssrmine_core::report::write_comparison_table;
use ssrmine_core::{pipeline, FastaLoader, MatchMethod, NwScores, PipelineParams};

use crate::config::Config;
use crate::MethodArg;

use super::mine::{resolve_scan_params, write_stats};

/// CLI overrides for the compare command; `None` falls back to the
/// configuration file value.
pub struct CompareOverrides {
    pub motifs: Option<String>,
    pub flank_len: Option<usize>,
    pub min_ssr_len: Option<usize>,
    pub max_ssr_len: Option<usize>,
    pub method: Option<MethodArg>,
    pub max_distance: Option<f64>,
    pub min_identity: Option<f64>,
    pub match_score: Option<i32>,
    pub mismatch_score: Option<i32>,
    pub gap_score: Option<i32>,
    pub reduce_fold: Option<usize>,
    pub mismatches: Option<u8>,
}

fn parse_method(selector: &str) -> Result<MatchMethod> {
    match selector {
        "exact" => Ok(MatchMethod::Exact),
        "ld" => Ok(MatchMethod::Levenshtein),
        "nw" => Ok(MatchMethod::NeedlemanWunsch),
        other => bail!("invalid --method selector '{}': expected exact, ld or nw", other),
    }
}

fn resolve_conserve_params(config: &Config, o: &CompareOverrides) -> Result<ConserveParams> {
    let method = match o.method {
        Some(MethodArg::Exact) => MatchMethod::Exact,
        Some(MethodArg::Ld) => MatchMethod::Levenshtein,
        Some(MethodArg::Nw) => MatchMethod::NeedlemanWunsch,
        None => parse_method(&config.compare.method)?,
    };

    let params = ConserveParams {
        method,
        max_distance: o.max_distance.unwrap_or(config.compare.max_distance),
        min_identity: o.min_identity.unwrap_or(config.compare.min_identity),
        nw_scores: NwScores {
            match_score: o.match_score.unwrap_or(config.compare.match_score),
            mismatch_score: o.mismatch_score.unwrap_or(config.compare.mismatch_score),
            gap_score: o.gap_score.unwrap_or(config.compare.gap_score),
        },
        reduce_fold: o.reduce_fold.unwrap_or(config.compare.reduce_fold),
        mismatches: o.mismatches.unwrap_or(config.compare.mismatches),
    };
    params.validate().context("invalid comparison options")?;
    Ok(params)
}

pub fn execute(
    config: &Config,
    threads: usize,
    fasta1: PathBuf,
    fasta2: PathBuf,
    out: PathBuf,
    stats_prefix: Option<PathBuf>,
    overrides: CompareOverrides,
) -> Result<()> {
    let scan = resolve_scan_params(
        config,
        overrides.motifs.clone(),
        overrides.flank_len,
        overrides.min_ssr_len,
        overrides.max_ssr_len,
    )?;
    let conserve = resolve_conserve_params(config, &overrides)?;
    let params = PipelineParams {
        scan,
        conserve,
        threads,
    };

    let sequences_a = FastaLoader::load_file(&fasta1)
        .with_context(|| format!("failed to load {}", fasta1.display()))?;
    let sequences_b = FastaLoader::load_file(&fasta2)
        .with_context(|| format!("failed to load {}", fasta2.display()))?;

    let output = pipeline::compare(sequences_a, sequences_b, &params)?;

    write_table(&out, &output.rows)?;
    let polymorphic = output.rows.iter().filter(|r| r.polymorphism).count();
    log::info!(
        "wrote {} marker candidates ({} polymorphic) to {}",
        output.rows.len(),
        polymorphic,
        out.display()
    );

    if let Some(prefix) = stats_prefix {
        let stat1 = with_suffix(&prefix, "fasta1.stat");
        let stat2 = with_suffix(&prefix, "fasta2.stat");
        write_stats(&stat1, &fasta1.display().to_string(), &output.stats_a)?;
        write_stats(&stat2, &fasta2.display().to_string(), &output.stats_b)?;
        log::info!(
            "wrote statistics to {} and {}",
            stat1.display(),
            stat2.display()
        );
    }

    Ok(())
}

fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let mut name = prefix.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

fn write_table(path: &Path, rows: &[ssrmine_core::ComparisonRow]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    write_comparison_table(BufWriter::new(file), rows)
        .with_context(|| format!("cannot write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_overrides() -> CompareOverrides {
        CompareOverrides {
            motifs: None,
            flank_len: None,
            min_ssr_len: None,
            max_ssr_len: None,
            method: None,
            max_distance: None,
            min_identity: None,
            match_score: None,
            mismatch_score: None,
            gap_score: None,
            reduce_fold: None,
            mismatches: None,
        }
    }

    #[test]
    fn test_method_from_config() {
        let config = Config::default();
        let params = resolve_conserve_params(&config, &no_overrides()).unwrap();
        assert_eq!(params.method, MatchMethod::Levenshtein);
    }

    #[test]
    fn test_method_override() {
        let config = Config::default();
        let overrides = CompareOverrides {
            method: Some(MethodArg::Nw),
            min_identity: Some(0.9),
            ..no_overrides()
        };
        let params = resolve_conserve_params(&config, &overrides).unwrap();
        assert_eq!(params.method, MatchMethod::NeedlemanWunsch);
        assert_eq!(params.min_identity, 0.9);
    }

    #[test]
    fn test_invalid_method_selector_is_rejected() {
        let mut config = Config::default();
        config.compare.method = "fuzzy".to_string();
        let err = resolve_conserve_params(&config, &no_overrides()).unwrap_err();
        assert!(err.to_string().contains("fuzzy"));
    }

    #[test]
    fn test_out_of_range_mismatches_is_rejected() {
        let config = Config::default();
        let overrides = CompareOverrides {
            mismatches: Some(5),
            ..no_overrides()
        };
        assert!(resolve_conserve_params(&config, &overrides).is_err());
    }

    #[test]
    fn test_stats_suffix() {
        assert_eq!(
            with_suffix(Path::new("run/markers"), "fasta1.stat"),
            PathBuf::from("run/markers.fasta1.stat")
        );
    }
}
