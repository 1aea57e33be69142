//! Component C: FM-index construction and the bit masks derived from it
//! (spec §4.C).

pub mod bitvec;
pub mod fm_index;
pub mod masks;
pub mod suffix_array;

pub use bitvec::RankedBitVec;
pub use fm_index::{CArray, FmIndex};
pub use masks::{BaseMasks, BwtMarkersMask, PrgMasks};

use crate::errors::GramtoolsError;
use crate::prg::PrgString;

/// The full on-disk-serialisable bundle built once at `gramtools build`
/// time and reloaded, unchanged, at `gramtools quasimap` time.
pub struct IndexBundle {
    pub fm_index: FmIndex,
    pub prg_masks: PrgMasks,
}

impl IndexBundle {
    pub fn build(prg: &PrgString) -> Result<Self, GramtoolsError> {
        let fm_index = FmIndex::build(prg)?;
        let prg_masks = PrgMasks::build(prg);
        Ok(IndexBundle { fm_index, prg_masks })
    }
}
