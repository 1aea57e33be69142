extern crate gramtools;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use log::{error, info, LevelFilter};

use gramtools::build::{self, BuildParams};
use gramtools::quasimap::{self, QuasimapParams};

#[derive(Parser)]
#[command(name = "gramtools", about = "Variant-aware short-read quasimapper for population reference graphs")]
struct Cli {
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a run directory from a linearised PRG.
    Build {
        #[arg(long = "gram-dir")]
        gram_dir: PathBuf,
        #[arg(long)]
        prg: PathBuf,
        #[arg(long = "kmer-size")]
        kmer_size: usize,
        #[arg(long = "max-read-size")]
        max_read_size: usize,
        #[arg(long)]
        reference: Option<PathBuf>,
    },
    /// Map reads from a FASTQ against a built run directory.
    Quasimap {
        #[arg(long = "gram-dir")]
        gram_dir: PathBuf,
        #[arg(long)]
        reads: PathBuf,
        #[arg(long = "kmer-size")]
        kmer_size: usize,
        #[arg(long = "coverage-seed", default_value_t = 0)]
        coverage_seed: u64,
    },
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    env_logger::Builder::new().filter_level(level).init();

    let result = match cli.command {
        Command::Build { gram_dir, prg, kmer_size, max_read_size, reference } => build::run(BuildParams {
            gram_dir,
            prg_path: prg,
            kmer_size,
            max_read_size,
            reference_fasta: reference,
        }),
        Command::Quasimap { gram_dir, reads, kmer_size, coverage_seed } => {
            quasimap::run(QuasimapParams {
                run_directory: gram_dir,
                reads_fastq: reads,
                kmer_size,
                coverage_seed,
            })
            .map(|stats| {
                info!(
                    "processed {} reads: {} mapped, {} unmapped",
                    stats.reads_processed, stats.reads_mapped, stats.reads_unmapped
                );
            })
        }
    };

    if let Err(e) = result {
        error!("{}: {}", e.kind(), e);
        process::exit(1);
    }
}
