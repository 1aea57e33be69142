//! Components D, E and H: kmer enumeration, the kmer index builder, and
//! its on-disk serialisation.

pub mod build;
pub mod enumerate;
pub mod serialize;

pub use build::{build_kmer_index, KmerTable};
pub use enumerate::{all_kmers_lex, sites_overlapping_kmers};

use std::path::Path;

use crate::errors::GramtoolsError;
use crate::prg::marker::Marker;
use crate::search::SearchState;

/// The loaded kmer index: a lookup from kmer to its `SearchState`s.
/// Absence of a key means "never indexed"; an empty `Vec` means "indexed,
/// but matches nothing" (spec §4.E).
pub struct KmerIndex {
    table: KmerTable,
    kmer_size: usize,
}

impl KmerIndex {
    pub fn new(table: KmerTable, kmer_size: usize) -> Self {
        KmerIndex { table, kmer_size }
    }

    pub fn get(&self, kmer: &[Marker]) -> Option<&[SearchState]> {
        self.table.get(kmer).map(|v| v.as_slice())
    }

    pub fn kmer_size(&self) -> usize {
        self.kmer_size
    }

    pub fn dump(&self, run_directory: &Path) -> Result<(), GramtoolsError> {
        serialize::dump(&self.table, run_directory)
    }

    pub fn load(run_directory: &Path) -> Result<Self, GramtoolsError> {
        let kmer_size = Self::infer_kmer_size(run_directory)?;
        let table = serialize::load(run_directory, kmer_size)?;
        Ok(KmerIndex { table, kmer_size })
    }

    fn infer_kmer_size(run_directory: &Path) -> Result<usize, GramtoolsError> {
        let meta_path = run_directory.join("kmer_index.meta");
        let contents = std::fs::read_to_string(&meta_path).map_err(|source| GramtoolsError::Io {
            path: meta_path.clone(),
            source,
        })?;
        contents.trim().parse::<usize>().map_err(|_| GramtoolsError::CorruptArtifact {
            path: meta_path,
            reason: "expected a single integer kmer size".to_string(),
        })
    }

    pub fn write_meta(run_directory: &Path, kmer_size: usize) -> Result<(), GramtoolsError> {
        let meta_path = run_directory.join("kmer_index.meta");
        std::fs::write(&meta_path, kmer_size.to_string()).map_err(|source| GramtoolsError::Io {
            path: meta_path,
            source,
        })
    }
}
