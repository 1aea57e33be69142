//! Coverage recording: the uniform random selector over a read's
//! compatible mapping instances (spec §5), and the atomic counters it
//! feeds.
//!
//! Simplification, recorded in DESIGN.md: a resolved [`SearchState`]
//! records coverage across every base of every node carrying its crossed
//! loci, rather than the exact read-aligned sub-range — the `SearchState`
//! as modelled here does not carry enough positional detail to recover
//! that sub-range, and the original's own per-base recording is itself an
//! approximation for multi-base alleles.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::graph::CoverageGraph;
use crate::prg::marker::{AlleleId, Marker};
use crate::search::SearchState;

#[derive(Debug, Default)]
pub struct MappingStats {
    pub reads_processed: AtomicU64,
    pub reads_mapped: AtomicU64,
    pub reads_unmapped: AtomicU64,
}

impl MappingStats {
    pub fn record_mapped(&self) {
        self.reads_processed.fetch_add(1, Ordering::Relaxed);
        self.reads_mapped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unmapped(&self) {
        self.reads_processed.fetch_add(1, Ordering::Relaxed);
        self.reads_unmapped.fetch_add(1, Ordering::Relaxed);
    }
}

/// A seeded uniform selector, one per worker (spec §5: reproducible given
/// the same seed and read order).
pub struct CoverageSelector {
    rng: StdRng,
}

impl CoverageSelector {
    pub fn seeded(seed: u64) -> Self {
        CoverageSelector { rng: StdRng::seed_from_u64(seed) }
    }

    /// Picks one of a read's compatible mapping instances and records
    /// coverage for it, unless an invariant instance is drawn. `states`
    /// must be the fully-resolved output of `quasimap::map_read`.
    pub fn record(&mut self, states: &[SearchState], graph: &CoverageGraph) {
        let invariant_total: usize = states.iter().filter(|s| s.is_invariant()).map(|s| s.sa_interval.size()).sum();
        let classes: Vec<&SearchState> = states.iter().filter(|s| !s.is_invariant()).collect();
        let total = invariant_total + classes.len();
        if total == 0 {
            return;
        }

        let draw = self.rng.gen_range(0..total);
        if draw < invariant_total {
            return; // invariant instance drawn: no site coverage to record.
        }
        let chosen = classes[draw - invariant_total];
        for &(site_marker, allele_id) in chosen.combined_path().iter() {
            if let Some(allele_id) = allele_id {
                record_allele_coverage(graph, site_marker, allele_id);
            }
        }
    }
}

fn record_allele_coverage(graph: &CoverageGraph, site_marker: Marker, allele_id: AlleleId) {
    for node in graph.graph.node_weights() {
        if node.site_id == site_marker && node.allele_id == allele_id {
            for offset in 0..node.coverage.len() {
                node.record_base_coverage(offset);
            }
        }
    }
}
