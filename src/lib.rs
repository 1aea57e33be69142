//! Variant-aware short-read quasimapper and genotyper for population
//! reference graphs.
//!
//! The pipeline has two stages, matching the `build`/`quasimap` split in
//! [`build`] and [`quasimap`]: `build` turns a linearised PRG into an
//! on-disk run directory (FM-index ingredients plus a kmer index), and
//! `quasimap` loads that run directory and maps reads against it,
//! recording per-base coverage on the [`graph::CoverageGraph`].

pub mod build;
pub mod errors;
pub mod graph;
pub mod index;
pub mod kmers;
pub mod prg;
pub mod quasimap;
pub mod search;

pub use errors::GramtoolsError;
