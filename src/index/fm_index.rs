//! Component C: the FM-index over the linearised PRG (spec §4.C).
//!
//! The original links against `sdsl-lite`'s `csa_wt` compressed suffix
//! array; no pack crate offers an FM-index over an unbounded `u32`
//! alphabet, so this builds the classic components directly: suffix array,
//! BWT, the `C` array (first-occurrence table), and the per-base /
//! per-marker rank/select masks used by backward search.

use std::collections::BTreeMap;

use crate::errors::GramtoolsError;
use crate::index::masks::{BaseMasks, BwtMarkersMask};
use crate::index::suffix_array::build_suffix_array;
use crate::prg::marker::{is_nucleotide, Marker, TERMINATOR};
use crate::prg::PrgString;

/// `C[symbol]` = number of text symbols strictly less than `symbol`; the
/// starting offset of that symbol's block in the sorted rotations
/// (standard FM-index convention).
#[derive(Debug, Clone)]
pub struct CArray {
    /// Symbol -> cumulative count, sorted by symbol for binary search.
    entries: Vec<(Marker, u64)>,
    total: u64,
}

impl CArray {
    fn build(text: &[Marker]) -> Self {
        let mut counts: BTreeMap<Marker, u64> = BTreeMap::new();
        for &m in text {
            *counts.entry(m).or_insert(0) += 1;
        }
        let mut entries = Vec::with_capacity(counts.len());
        let mut running = 0u64;
        for (&symbol, &count) in counts.iter() {
            entries.push((symbol, running));
            running += count;
        }
        CArray { entries, total: running }
    }

    /// `C[symbol]`: the SA index of the first rotation starting with a
    /// symbol greater than or equal to `symbol`, i.e. the cumulative count
    /// of strictly smaller symbols.
    pub fn get(&self, symbol: Marker) -> u64 {
        match self.entries.binary_search_by_key(&symbol, |&(s, _)| s) {
            Ok(i) => self.entries[i].1,
            Err(i) => {
                // symbol absent from the text: its block would start where
                // the next larger symbol's block starts, or at the very
                // end if it is larger than every symbol present.
                self.entries.get(i).map(|&(_, c)| c).unwrap_or(self.total)
            }
        }
    }
}

pub struct FmIndex {
    pub sa: Vec<u32>,
    pub bwt: Vec<Marker>,
    pub c_array: CArray,
    pub base_masks: BaseMasks,
    pub bwt_markers_mask: BwtMarkersMask,
    text_len: usize,
}

impl FmIndex {
    /// Builds the FM-index of `prg`'s marker stream with a single `0`
    /// terminator appended (spec §4.A: "`0` terminates the text").
    pub fn build(prg: &PrgString) -> Result<Self, GramtoolsError> {
        let text = crate::prg::string::with_terminator(prg.markers());
        if text.iter().filter(|&&m| m == TERMINATOR).count() != 1 {
            return Err(GramtoolsError::InvalidPrgInput(
                "text passed to FM-index construction must contain exactly one terminator".to_string(),
            ));
        }

        let sa = build_suffix_array(&text);
        let bwt: Vec<Marker> = sa
            .iter()
            .map(|&pos| {
                if pos == 0 {
                    text[text.len() - 1]
                } else {
                    text[pos as usize - 1]
                }
            })
            .collect();

        let c_array = CArray::build(&text);
        let base_masks = BaseMasks::build(&bwt);
        let bwt_markers_mask = BwtMarkersMask::build(&bwt);

        Ok(FmIndex {
            sa,
            bwt,
            c_array,
            base_masks,
            bwt_markers_mask,
            text_len: text.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.text_len
    }

    pub fn is_empty(&self) -> bool {
        self.text_len == 0
    }

    /// Rank of `symbol` in `bwt[0..index]`: the number of occurrences of
    /// `symbol` before position `index`. Supports both nucleotides
    /// (delegated to the per-base masks) and variant markers (a direct
    /// linear fallback — markers are comparatively rare so this stays
    /// cheap without needing a mask per marker value).
    pub fn bwt_rank(&self, symbol: Marker, index: usize) -> usize {
        if is_nucleotide(symbol) {
            return self.base_masks.rank(symbol, index);
        }
        self.bwt[..index].iter().filter(|&&m| m == symbol).count()
    }

    /// Standard FM-index backward step: given the SA interval `[lo, hi)`
    /// of strings matching some suffix `w`, returns the interval matching
    /// `symbol + w`, or `None` if empty.
    pub fn backward_extend(&self, symbol: Marker, lo: usize, hi: usize) -> Option<(usize, usize)> {
        let base = self.c_array.get(symbol) as usize;
        let new_lo = base + self.bwt_rank(symbol, lo);
        let new_hi = base + self.bwt_rank(symbol, hi);
        if new_lo < new_hi {
            Some((new_lo, new_hi))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prg::text::text_to_prg_string;

    #[test]
    fn backward_extend_finds_known_substring() {
        let prg = text_to_prg_string("ACGTACGT").unwrap();
        let fm = FmIndex::build(&prg).unwrap();
        // Search for "CGT" backward: T, then G, then C.
        let (mut lo, mut hi) = (0, fm.len());
        for &sym in &[crate::prg::marker::BASE_T, crate::prg::marker::BASE_G, crate::prg::marker::BASE_C] {
            let (nlo, nhi) = fm.backward_extend(sym, lo, hi).expect("CGT occurs in ACGTACGT");
            lo = nlo;
            hi = nhi;
        }
        assert_eq!(hi - lo, 2); // "CGT" occurs twice
    }

    #[test]
    fn backward_extend_rejects_absent_substring() {
        let prg = text_to_prg_string("ACGTACGT").unwrap();
        let fm = FmIndex::build(&prg).unwrap();
        let (lo, hi) = (0, fm.len());
        let result = fm.backward_extend(crate::prg::marker::BASE_A, lo, hi).and_then(|(l, h)| {
            fm.backward_extend(crate::prg::marker::BASE_A, l, h)
        });
        // "AA" does not occur in ACGTACGT.
        assert!(result.is_none());
    }
}
