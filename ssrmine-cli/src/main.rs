use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use anyhow::{Context, Result};

mod commands;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "ssrmine")]
#[command(about = "ssrmine - SSR mining and polymorphic marker discovery")]
#[command(version)]
#[command(long_about = "
ssrmine scans genome assemblies for SSR loci (microsatellites) and compares
two assemblies to propose candidate polymorphic markers: loci with identical,
unique flanking context but different repeat counts.

Examples:
  ssrmine mine --fasta assembly.fa --out loci.tsv --stats loci.stat
  ssrmine compare --fasta1 a.fa --fasta2 b.fa --out markers.tsv
  ssrmine compare --fasta1 a.fa --fasta2 b.fa --out markers.tsv --method nw --min-identity 0.9
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (defaults to ssrmine.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of threads to use
    #[arg(short, long, global = true)]
    pub threads: Option<usize>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan one assembly and write its SSR locus table
    Mine {
        /// Assembly sequence file (FASTA/FASTQ, optionally gzipped)
        #[arg(long, required = true)]
        fasta: PathBuf,

        /// Output locus table (TSV)
        #[arg(short, long, required = true)]
        out: PathBuf,

        /// Statistics report output
        #[arg(long)]
        stats: Option<PathBuf>,

        /// Motif thresholds as `len=minrep[,len=minrep...]`
        #[arg(long)]
        motifs: Option<String>,

        /// Flank width in bases
        #[arg(long)]
        flank_len: Option<usize>,

        /// Minimum total SSR length
        #[arg(long)]
        min_ssr_len: Option<usize>,

        /// Maximum total SSR length
        #[arg(long)]
        max_ssr_len: Option<usize>,
    },

    /// Compare two assemblies and write the polymorphism table
    Compare {
        /// First assembly sequence file
        #[arg(long, required = true)]
        fasta1: PathBuf,

        /// Second assembly sequence file
        #[arg(long, required = true)]
        fasta2: PathBuf,

        /// Output comparison table (TSV)
        #[arg(short, long, required = true)]
        out: PathBuf,

        /// Write per-assembly statistics as PREFIX.fasta1.stat and
        /// PREFIX.fasta2.stat
        #[arg(long)]
        stats_prefix: Option<PathBuf>,

        /// Motif thresholds as `len=minrep[,len=minrep...]`
        #[arg(long)]
        motifs: Option<String>,

        /// Flank width in bases
        #[arg(long)]
        flank_len: Option<usize>,

        /// Minimum total SSR length
        #[arg(long)]
        min_ssr_len: Option<usize>,

        /// Maximum total SSR length
        #[arg(long)]
        max_ssr_len: Option<usize>,

        /// Flank matching method
        #[arg(long)]
        method: Option<MethodArg>,

        /// Levenshtein acceptance: normalized distance per flank
        #[arg(long)]
        max_distance: Option<f64>,

        /// Needleman-Wunsch acceptance: identity per flank
        #[arg(long)]
        min_identity: Option<f64>,

        /// Needleman-Wunsch match score
        #[arg(long)]
        match_score: Option<i32>,

        /// Needleman-Wunsch mismatch score
        #[arg(long)]
        mismatch_score: Option<i32>,

        /// Needleman-Wunsch gap score
        #[arg(long)]
        gap_score: Option<i32>,

        /// Reduced-key fold for the approximate pre-filter
        #[arg(long)]
        reduce_fold: Option<usize>,

        /// Reduced-key substitutions tried by the pre-filter (0-2)
        #[arg(long)]
        mismatches: Option<u8>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum MethodArg {
    Exact,
    Ld,
    Nw,
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        std::env::set_var("RUST_LOG", "error");
    } else {
        let level = match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        std::env::set_var("RUST_LOG", level);
    }

    env_logger::Builder::from_default_env()
        .format_timestamp_secs()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = Config::load(cli.config.as_deref())?;

    let threads = cli.threads.unwrap_or(config.general.threads).max(1);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .context("Failed to set thread count")?;

    match cli.command {
        Commands::Mine {
            fasta,
            out,
            stats,
            motifs,
            flank_len,
            min_ssr_len,
            max_ssr_len,
        } => {
            commands::mine::execute(
                &config,
                threads,
                fasta,
                out,
                stats,
                motifs,
                flank_len,
                min_ssr_len,
                max_ssr_len,
            )?;
        }

        Commands::Compare {
            fasta1,
            fasta2,
            out,
            stats_prefix,
            motifs,
            flank_len,
            min_ssr_len,
            max_ssr_len,
            method,
            max_distance,
            min_identity,
            match_score,
            mismatch_score,
            gap_score,
            reduce_fold,
            mismatches,
        } => {
            commands::compare::execute(
                &config,
                threads,
                fasta1,
                fasta2,
                out,
                stats_prefix,
                commands::compare::CompareOverrides {
                    motifs,
                    flank_len,
                    min_ssr_len,
                    max_ssr_len,
                    method,
                    max_distance,
                    min_identity,
                    match_score,
                    mismatch_score,
                    gap_score,
                    reduce_fold,
                    mismatches,
                },
            )?;
        }
    }

    Ok(())
}
