//! `SearchState`: the unit the vBWT engine operates on — an SA interval
//! plus the variant loci crossed so far, split into `traversed` (closed)
//! and `traversing` (still open, possibly `ALLELE_UNKNOWN`) paths (spec
//! §3).

use crate::errors::GramtoolsError;
use crate::prg::marker::{Marker, VariantLocus, VariantSitePath};

/// An inclusive SA range `[lo, hi]`. `lo > hi` represents the empty
/// interval and is never constructed directly — see [`SaInterval::size`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaInterval {
    pub lo: usize,
    pub hi: usize,
}

impl SaInterval {
    pub fn new(lo: usize, hi: usize) -> Option<Self> {
        if lo > hi {
            None
        } else {
            Some(SaInterval { lo, hi })
        }
    }

    pub fn size(&self) -> usize {
        self.hi + 1 - self.lo
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchState {
    pub sa_interval: SaInterval,
    pub traversed: VariantSitePath,
    pub traversing: VariantSitePath,
}

impl SearchState {
    pub fn new(sa_interval: SaInterval) -> Self {
        SearchState {
            sa_interval,
            traversed: Vec::new(),
            traversing: Vec::new(),
        }
    }

    /// `traversed` and `traversing` concatenated, traversing innermost
    /// (currently-open) first — the order the duplicate-site guard and
    /// serialisation walk the combined path in.
    pub fn combined_path(&self) -> VariantSitePath {
        let mut combined = self.traversing.clone();
        combined.extend(self.traversed.iter().copied());
        combined
    }

    /// Invariant from spec §4.F.7: the same site ID must never appear
    /// twice in a state's combined path. A violation is a programmer
    /// error, not a mapping failure.
    pub fn check_no_duplicate_site(&self) -> Result<(), GramtoolsError> {
        let combined = self.combined_path();
        for i in 0..combined.len() {
            for j in (i + 1)..combined.len() {
                if combined[i].0 == combined[j].0 {
                    return Err(GramtoolsError::InternalInvariant(format!(
                        "site {} appears twice in one SearchState's path",
                        combined[i].0
                    )));
                }
            }
        }
        Ok(())
    }

    /// True once the read has not crossed any site boundary at all.
    pub fn is_invariant(&self) -> bool {
        self.traversed.is_empty() && self.traversing.is_empty()
    }

    /// The still-open locus at the front of `traversing`, if any.
    pub fn pending_locus(&self) -> Option<&VariantLocus> {
        self.traversing.first()
    }

    pub fn prepend_traversing(&mut self, locus: VariantLocus) {
        self.traversing.insert(0, locus);
    }

    pub fn prepend_traversed(&mut self, locus: VariantLocus) {
        self.traversed.insert(0, locus);
    }

    /// Updates the site `site_marker`'s allele on `traversing`'s front
    /// entry if it is the one currently open; otherwise records a new,
    /// already-resolved locus on `traversed` (spec §4.F.3).
    pub fn record_allele_crossing(&mut self, site_marker: Marker, allele_id: crate::prg::marker::AlleleId) {
        if let Some(front) = self.traversing.first_mut() {
            if front.0 == site_marker {
                front.1 = Some(allele_id);
                return;
            }
        }
        self.prepend_traversed((site_marker, Some(allele_id)));
    }
}
