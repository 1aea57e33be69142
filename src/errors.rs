//! Crate-wide error kinds (spec §7).
//!
//! `UnmappableRead` is deliberately absent: the spec is explicit that failing
//! to map a read is not an error, just an empty result.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GramtoolsError {
    #[error("invalid PRG input: {0}")]
    InvalidPrgInput(String),

    #[error("I/O error reading artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt on-disk artifact {path}: {reason}")]
    CorruptArtifact { path: PathBuf, reason: String },

    #[error("reference FASTA does not match the PRG's first path at position {position}")]
    ReferenceMismatch { position: usize },

    #[error("invalid kmer size {kmer_size}: {reason}")]
    InvalidKmerSize { kmer_size: usize, reason: String },

    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),
}

impl GramtoolsError {
    /// The single-word kind name used in the CLI's one-line failure message
    /// (spec §7: "a single-line message identifying the error kind and the
    /// offending artifact").
    pub fn kind(&self) -> &'static str {
        match self {
            GramtoolsError::InvalidPrgInput(_) => "invalid_prg_input",
            GramtoolsError::Io { .. } => "io_error",
            GramtoolsError::CorruptArtifact { .. } => "io_error",
            GramtoolsError::ReferenceMismatch { .. } => "reference_mismatch",
            GramtoolsError::InvalidKmerSize { .. } => "kmer_size_invalid",
            GramtoolsError::InternalInvariant(_) => "internal_invariant",
        }
    }
}

pub type Result<T> = std::result::Result<T, GramtoolsError>;
