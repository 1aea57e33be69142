//! Component G: the quasimapper (spec §4.G). Seeds from the read's
//! rightmost kmer via the kmer index, then walks the remaining bases
//! backward through the vBWT engine (§4.F).

use crate::errors::GramtoolsError;
use crate::index::IndexBundle;
use crate::kmers::KmerIndex;
use crate::prg::marker::Marker;
use crate::prg::PrgString;
use crate::search::{process_read_character, resolve_pending_allele, split_allele_encapsulated_states, SearchState};

/// The outcome of mapping one read. `Unmapped` is not an error (spec §9).
pub enum MapOutcome {
    Unmapped,
    Mapped(Vec<SearchState>),
}

/// Maps a single read (as a marker-coded base sequence, 1..=4) against the
/// index, seeding from its rightmost kmer.
pub fn map_read(
    read: &[Marker],
    index: &IndexBundle,
    kmer_index: &KmerIndex,
    prg: &PrgString,
    kmer_size: usize,
) -> Result<MapOutcome, GramtoolsError> {
    if read.len() < kmer_size {
        return Ok(MapOutcome::Unmapped);
    }

    let seed = &read[read.len() - kmer_size..];
    let mut states = match kmer_index.get(seed) {
        Some(states) => states.to_vec(),
        None => return Ok(MapOutcome::Unmapped),
    };
    if states.is_empty() {
        return Ok(MapOutcome::Unmapped);
    }

    for i in (0..read.len() - kmer_size).rev() {
        let base = read[i];
        states = process_read_character(&states, index, prg, base)?;
        if states.is_empty() {
            return Ok(MapOutcome::Unmapped);
        }
    }

    let mut resolved = Vec::with_capacity(states.len());
    for state in states {
        if state.is_invariant() {
            resolved.extend(split_allele_encapsulated_states(&state, index));
        } else {
            resolved.extend(resolve_pending_allele(state, index));
        }
    }

    for state in &resolved {
        state.check_no_duplicate_site()?;
        debug_assert!(
            state.pending_locus().map(|l| l.1.is_some()).unwrap_or(true),
            "ALLELE_UNKNOWN must never survive past map_read"
        );
    }

    Ok(MapOutcome::Mapped(resolved))
}
