//! Component G entry point: `gramtools quasimap`. Loads the on-disk index
//! bundle, then maps a FASTQ's reads against it, buffering reads and
//! mapping each batch in parallel (spec §5).

pub mod coverage;
pub mod mapper;

pub use coverage::{CoverageSelector, MappingStats};
pub use mapper::{map_read, MapOutcome};

use std::path::PathBuf;
use std::sync::Arc;

use bio::io::fastq;
use itertools::Itertools;
use log::{info, warn};
use rayon::prelude::*;

use crate::errors::GramtoolsError;
use crate::graph::CoverageGraph;
use crate::index::IndexBundle;
use crate::kmers::KmerIndex;
use crate::prg::marker::{Marker, BASE_A, BASE_C, BASE_G, BASE_T};
use crate::prg::PrgString;

/// Reads buffered per parallel batch (spec §5: "up to B reads, default
/// ~5 000").
const DEFAULT_READ_BUFFER: usize = 5_000;

pub struct QuasimapParams {
    pub run_directory: PathBuf,
    pub reads_fastq: PathBuf,
    pub kmer_size: usize,
    pub coverage_seed: u64,
}

#[derive(Debug, Default)]
pub struct QuasimapStats {
    pub reads_processed: u64,
    pub reads_mapped: u64,
    pub reads_unmapped: u64,
}

fn encode_read(record: &fastq::Record) -> Option<Vec<Marker>> {
    record
        .seq()
        .iter()
        .map(|&b| match b.to_ascii_uppercase() {
            b'A' => Some(BASE_A),
            b'C' => Some(BASE_C),
            b'G' => Some(BASE_G),
            b'T' => Some(BASE_T),
            _ => None,
        })
        .collect()
}

pub fn run(params: QuasimapParams) -> Result<QuasimapStats, GramtoolsError> {
    let prg_path = params.run_directory.join("prg");
    let prg = PrgString::read(&prg_path, crate::prg::Endianness::Little)?;
    let index = IndexBundle::build(&prg)?;
    let graph = CoverageGraph::from_prg_string(&prg)?;
    let kmer_index = KmerIndex::load(&params.run_directory)?;
    if kmer_index.kmer_size() != params.kmer_size {
        return Err(GramtoolsError::InvalidKmerSize {
            kmer_size: params.kmer_size,
            reason: format!(
                "run directory was built with kmer size {}, not {}",
                kmer_index.kmer_size(),
                params.kmer_size
            ),
        });
    }

    info!("loaded run directory {}", params.run_directory.display());

    let stats = MappingStats::default();
    let mut selector = CoverageSelector::seeded(params.coverage_seed);

    let reader = fastq::Reader::from_file(&params.reads_fastq).map_err(|source| GramtoolsError::Io {
        path: params.reads_fastq.clone(),
        source: std::io::Error::new(std::io::ErrorKind::Other, source.to_string()),
    })?;

    let index = Arc::new(index);
    let prg = Arc::new(prg);

    for batch in &reader.records().chunks(DEFAULT_READ_BUFFER) {
        let batch: Vec<fastq::Record> = batch
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source: bio::io::fastq::Error| GramtoolsError::Io {
                path: params.reads_fastq.clone(),
                source: std::io::Error::new(std::io::ErrorKind::Other, source.to_string()),
            })?;

        let outcomes: Vec<Result<MapOutcome, GramtoolsError>> = batch
            .par_iter()
            .map(|record| {
                let Some(read) = encode_read(record) else {
                    return Ok(MapOutcome::Unmapped);
                };
                map_read(&read, &index, &kmer_index, &prg, kmer_index.kmer_size())
            })
            .collect();

        for outcome in outcomes {
            match outcome? {
                MapOutcome::Unmapped => stats.record_unmapped(),
                MapOutcome::Mapped(states) => {
                    stats.record_mapped();
                    selector.record(&states, &graph);
                }
            }
        }
    }

    if stats.reads_processed.load(std::sync::atomic::Ordering::Relaxed) == 0 {
        warn!("no reads were read from {}", params.reads_fastq.display());
    }

    Ok(QuasimapStats {
        reads_processed: stats.reads_processed.load(std::sync::atomic::Ordering::Relaxed),
        reads_mapped: stats.reads_mapped.load(std::sync::atomic::Ordering::Relaxed),
        reads_unmapped: stats.reads_unmapped.load(std::sync::atomic::Ordering::Relaxed),
    })
}
