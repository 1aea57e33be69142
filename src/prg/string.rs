//! Component A: PRG String codec.
//!
//! Parses the packed binary linearisation (or an in-memory marker vector)
//! into a [`PrgString`]: the marker vector plus a map from each site ID to
//! the byte offset of its terminator, built during a single left-to-right
//! scan (spec §4.A).
//!
//! **Open question resolved** (see DESIGN.md): we treat the "allele marker
//! reused as the final allele's delimiter" layout as canonical — this is
//! what every worked example in spec §8 uses (e.g. `...t6agtcct`, where `6`
//! terminates the 3-allele site 5 without a closing `5`). A site whose odd
//! marker instead recurs at the end (the alternate convention) is detected
//! and normalised in place to the even form, so every [`PrgString`] in
//! memory uses one convention downstream.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use indexmap::IndexMap;

use crate::errors::GramtoolsError;
use crate::prg::marker::{
    allele_marker_of, is_nucleotide, is_variant_marker, site_marker_of, Marker, BASE_T,
    TERMINATOR,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Big,
    Little,
}

/// The linearised PRG plus the per-site terminator offsets discovered while
/// scanning it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrgString {
    markers: Vec<Marker>,
    /// Site ID -> byte offset (index into `markers`) of its terminating
    /// (even) allele marker. Insertion-ordered, matching the left-to-right
    /// scan (spec §3: "ordered map").
    end_positions: IndexMap<Marker, usize>,
    /// Set if an odd marker was found recurring at site end and rewritten.
    pub odd_site_end_found: bool,
}

impl PrgString {
    pub fn from_markers(mut markers: Vec<Marker>) -> Result<Self, GramtoolsError> {
        // A single trailing terminator is optional in the in-memory form;
        // strip it so `markers()` never carries it, matching the spec's
        // "0 terminates the text" note being about the on-disk stream.
        if markers.last() == Some(&TERMINATOR) {
            markers.pop();
        }

        #[derive(Clone, Copy, PartialEq, Eq)]
        enum SiteState {
            Open,
            ClosedEven,
            ClosedOdd,
        }

        let mut sites: HashMap<Marker, SiteState> = HashMap::new();
        let mut end_positions: IndexMap<Marker, usize> = IndexMap::new();
        let mut odd_site_end_found = false;

        for pos in 0..markers.len() {
            let m = markers[pos];
            if m == TERMINATOR {
                return Err(GramtoolsError::InvalidPrgInput(format!(
                    "terminator found mid-stream at position {pos}"
                )));
            }
            if !is_variant_marker(m) {
                if !is_nucleotide(m) {
                    return Err(GramtoolsError::InvalidPrgInput(format!(
                        "position {pos} has value {m}, not a nucleotide in 1..={BASE_T}"
                    )));
                }
                continue;
            }

            let is_odd = m % 2 == 1;
            if is_odd {
                match sites.get(&m).copied() {
                    None => {
                        sites.insert(m, SiteState::Open);
                    }
                    Some(SiteState::Open) => {
                        // Odd marker recurring: the "odd end" convention.
                        // Close the site and normalise the on-disk
                        // representation to the even convention used
                        // everywhere downstream.
                        end_positions.insert(m, pos);
                        markers[pos] = allele_marker_of(m);
                        odd_site_end_found = true;
                        sites.insert(m, SiteState::ClosedOdd);
                    }
                    Some(SiteState::ClosedEven) | Some(SiteState::ClosedOdd) => {
                        return Err(GramtoolsError::InvalidPrgInput(format!(
                            "site {m} opened again after already closing (duplicate site open)"
                        )));
                    }
                }
            } else {
                let site = site_marker_of(m);
                match sites.get(&site).copied() {
                    None => {
                        return Err(GramtoolsError::InvalidPrgInput(format!(
                            "allele marker {m} seen for site {site}, which was never opened"
                        )));
                    }
                    Some(SiteState::ClosedOdd) => {
                        return Err(GramtoolsError::InvalidPrgInput(format!(
                            "allele marker {m} seen after site {site} already closed"
                        )));
                    }
                    Some(SiteState::Open) | Some(SiteState::ClosedEven) => {
                        // Every occurrence is a candidate terminator; the
                        // last one observed wins once the scan finishes
                        // (even-end convention).
                        end_positions.insert(site, pos);
                        sites.insert(site, SiteState::ClosedEven);
                    }
                }
            }
        }

        if let Some(&dangling) = sites
            .iter()
            .find(|(_, state)| **state == SiteState::Open)
            .map(|(id, _)| id)
        {
            return Err(GramtoolsError::InvalidPrgInput(format!(
                "site {dangling} never closed (dangling open site at EOF)"
            )));
        }

        Ok(PrgString {
            markers,
            end_positions,
            odd_site_end_found,
        })
    }

    pub fn read(path: &Path, endianness: Endianness) -> Result<Self, GramtoolsError> {
        let file = File::open(path).map_err(|source| GramtoolsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = BufReader::new(file);
        let mut markers = Vec::new();
        loop {
            let next = match endianness {
                Endianness::Big => reader.read_u32::<BigEndian>(),
                Endianness::Little => reader.read_u32::<LittleEndian>(),
            };
            match next {
                Ok(v) => markers.push(v),
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
                Err(source) => {
                    return Err(GramtoolsError::Io {
                        path: path.to_path_buf(),
                        source,
                    })
                }
            }
        }
        Self::from_markers(markers)
    }

    pub fn write(&self, path: &Path, endianness: Endianness) -> Result<(), GramtoolsError> {
        let file = File::create(path).map_err(|source| GramtoolsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        for &m in &self.markers {
            let result = match endianness {
                Endianness::Big => writer.write_u32::<BigEndian>(m),
                Endianness::Little => writer.write_u32::<LittleEndian>(m),
            };
            result.map_err(|source| GramtoolsError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        }
        writer.flush().map_err(|source| GramtoolsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn end_positions(&self) -> &IndexMap<Marker, usize> {
        &self.end_positions
    }

    pub fn end_position_of(&self, site_id: Marker) -> Option<usize> {
        self.end_positions.get(&site_id).copied()
    }
}

/// Used by `index::fm_index` to build a text with exactly one trailing
/// terminator, as suffix array construction requires.
pub fn with_terminator(markers: &[Marker]) -> Vec<Marker> {
    let mut v = Vec::with_capacity(markers.len() + 1);
    v.extend_from_slice(markers);
    v.push(TERMINATOR);
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prg(s: &str) -> Vec<Marker> {
        // test-only literal decoder: digits 0-9 map directly to marker
        // values, matching the single-digit PRG strings used in spec §8.
        s.chars()
            .map(|c| match c {
                'a' | 'A' => 1,
                'c' | 'C' => 2,
                'g' | 'G' => 3,
                't' | 'T' => 4,
                d => d.to_digit(10).unwrap(),
            })
            .collect()
    }

    #[test]
    fn single_site_even_convention_end_position_is_last_allele_marker() {
        let p = PrgString::from_markers(prg("gcgct5c6g6t6agtcct")).unwrap();
        // positions: g c g c t 5 c 6 g 6 t 6 a g t c c t
        //            0 1 2 3 4 5 6 7 8 9 ...
        assert_eq!(p.end_position_of(5), Some(11));
        assert!(!p.odd_site_end_found);
    }

    #[test]
    fn odd_end_convention_is_normalised_to_even() {
        // site 5 with a single allele "c", closed by a second "5".
        let markers = prg("ac5c5t");
        let p = PrgString::from_markers(markers).unwrap();
        assert!(p.odd_site_end_found);
        // the rewritten terminator is the even marker 6, at the second 5's
        // original position.
        assert_eq!(p.markers()[4], 6);
        assert_eq!(p.end_position_of(5), Some(4));
    }

    #[test]
    fn dangling_open_site_is_rejected() {
        let markers = prg("ac5c");
        assert!(PrgString::from_markers(markers).is_err());
    }

    #[test]
    fn duplicate_site_open_is_rejected() {
        // site 5 closes (even convention) then somehow reopens: invalid.
        let markers = vec![1, 2, 5, 2, 6, 5, 3];
        assert!(PrgString::from_markers(markers).is_err());
    }

    #[test]
    fn non_nucleotide_value_is_rejected() {
        assert!(PrgString::from_markers(vec![1, 2, 9999]).is_err());
    }

    #[test]
    fn endianness_round_trip() {
        let p = PrgString::from_markers(prg("gcgct5c6g6t6agtcct")).unwrap();
        for &endianness in &[Endianness::Little, Endianness::Big] {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("prg.bin");
            p.write(&path, endianness).unwrap();
            let reloaded = PrgString::read(&path, endianness).unwrap();
            assert_eq!(reloaded.markers(), p.markers());
        }
    }
}
