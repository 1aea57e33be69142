//! A single sequence node of the [`super::CoverageGraph`] (spec §3).

use std::sync::atomic::{AtomicU32, Ordering};

use petgraph::graph::NodeIndex;

use crate::prg::marker::{AlleleId, Marker};

/// Number of reads mapped to each base of an allele. Only allocated for
/// nodes strictly inside a bubble (both `site_id` and `allele_id` set).
pub type BaseCoverage = Vec<AtomicU32>;

#[derive(Debug)]
pub struct CoverageNode {
    pub sequence: Vec<u8>,
    pub site_id: Marker,
    pub allele_id: AlleleId,
    /// Offset on the reference-like ("first path") sequence.
    pub pos: i64,
    pub coverage: BaseCoverage,
    pub is_site_boundary: bool,
    /// Outgoing edges, in the order they were wired. Edge 0 is always the
    /// "first path" (spec §3 invariant).
    pub edges: Vec<NodeIndex>,
}

impl CoverageNode {
    pub fn new(pos: i64) -> Self {
        CoverageNode {
            sequence: Vec::new(),
            site_id: 0,
            allele_id: 0,
            pos,
            coverage: Vec::new(),
            is_site_boundary: false,
            edges: Vec::new(),
        }
    }

    pub fn with_sequence(seq: Vec<u8>, pos: i64, site_id: Marker, allele_id: AlleleId) -> Self {
        let mut node = CoverageNode {
            sequence: seq,
            site_id,
            allele_id,
            pos,
            coverage: Vec::new(),
            is_site_boundary: false,
            edges: Vec::new(),
        };
        if node.is_in_bubble() {
            node.coverage = (0..node.sequence.len()).map(|_| AtomicU32::new(0)).collect();
        }
        node
    }

    pub fn is_in_bubble(&self) -> bool {
        self.allele_id != 0 && self.site_id != 0
    }

    pub fn has_sequence(&self) -> bool {
        !self.sequence.is_empty()
    }

    pub fn append_sequence(&mut self, base: u8) {
        self.sequence.push(base);
        if self.is_in_bubble() {
            self.coverage.push(AtomicU32::new(0));
        }
    }

    pub fn record_base_coverage(&self, offset: usize) {
        if let Some(counter) = self.coverage.get(offset) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn coverage_snapshot(&self) -> Vec<u32> {
        self.coverage.iter().map(|c| c.load(Ordering::Relaxed)).collect()
    }
}
