//! The marker vocabulary shared by every component: nucleotides, the
//! terminator, and odd/even site/allele markers.

use crate::errors::GramtoolsError;

/// An integer coding either a nucleotide (1..=4), the text terminator (0),
/// or a variant marker (>=5). Odd variant markers open/close sites, even
/// ones delimit alleles within a site.
pub type Marker = u32;

/// Lowest integer value that can be a variant marker.
pub const MIN_MARKER: Marker = 5;

pub const BASE_A: Marker = 1;
pub const BASE_C: Marker = 2;
pub const BASE_G: Marker = 3;
pub const BASE_T: Marker = 4;
pub const TERMINATOR: Marker = 0;

/// A 1-based allele index within a site. Resolution state ("not yet known
/// which allele this search state is in") is modelled with `Option`, not a
/// reserved sentinel value — see the Design Notes on `ALLELE_UNKNOWN`.
pub type AlleleId = u32;

/// A (site marker, allele id) pair. `None` stands for the spec's
/// `ALLELE_UNKNOWN`: the search has entered the site but not yet resolved
/// which allele it is in.
pub type VariantLocus = (Marker, Option<AlleleId>);

/// An ordered list of loci a search has crossed.
pub type VariantSitePath = Vec<VariantLocus>;

pub fn is_variant_marker(marker: Marker) -> bool {
    marker >= MIN_MARKER
}

pub fn is_nucleotide(marker: Marker) -> bool {
    (BASE_A..=BASE_T).contains(&marker)
}

/// Odd markers (5, 7, 9, ...) open/close sites.
pub fn is_site_marker(marker: Marker) -> Result<bool, GramtoolsError> {
    if !is_variant_marker(marker) {
        return Err(GramtoolsError::InvalidPrgInput(format!(
            "{marker} is not a variant marker (must be >= {MIN_MARKER})"
        )));
    }
    Ok(marker % 2 == 1)
}

/// Even markers (6, 8, 10, ...) delimit alleles within a site.
pub fn is_allele_marker(marker: Marker) -> Result<bool, GramtoolsError> {
    is_site_marker(marker).map(|is_site| !is_site)
}

/// A site's allele marker is always `site_marker + 1`.
pub fn allele_marker_of(site_marker: Marker) -> Marker {
    site_marker + 1
}

/// The site marker a given allele marker belongs to.
pub fn site_marker_of(allele_marker: Marker) -> Marker {
    allele_marker - 1
}

/// Site IDs are 5, 7, 9, ...; this maps a site ID to its 0-based index.
pub fn site_id_to_index(site_id: Marker) -> Result<usize, GramtoolsError> {
    if !is_site_marker(site_id)? {
        return Err(GramtoolsError::InvalidPrgInput(format!(
            "{site_id} is not a site marker"
        )));
    }
    Ok(((site_id - MIN_MARKER) / 2) as usize)
}

/// Inverse of [`site_id_to_index`].
pub fn index_to_site_id(index: usize) -> Marker {
    index as Marker * 2 + MIN_MARKER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_id_index_round_trips() {
        for idx in 0..50usize {
            let id = index_to_site_id(idx);
            assert_eq!(site_id_to_index(id).unwrap(), idx);
        }
    }

    #[test]
    fn odd_markers_are_site_markers() {
        assert!(is_site_marker(5).unwrap());
        assert!(!is_site_marker(6).unwrap());
        assert!(is_site_marker(7).unwrap());
    }

    #[test]
    fn marker_below_five_is_rejected() {
        assert!(is_site_marker(4).is_err());
    }

    #[test]
    fn allele_marker_is_site_plus_one() {
        assert_eq!(allele_marker_of(5), 6);
        assert_eq!(site_marker_of(6), 5);
    }
}
