//! The linearised PRG *text* grammar (spec §6), distinct from the packed
//! binary form: `[` opens a site, `,` separates alleles, `]` closes a site,
//! nucleotides are `{A,C,G,T}`. Site IDs are assigned 5, 7, 9, ... in the
//! order their `[` is encountered; allele markers are `site + 1`. Sites may
//! nest. Empty alleles (direct deletions) are allowed, e.g. `[A,,G]`.
//!
//! Grounded on
//! `examples/original_source/libgramtools/include/prg/linearised_prg.hpp`'s
//! `prg_string_to_ints` / `ints_to_prg_string`.

use crate::errors::GramtoolsError;
use crate::prg::marker::{allele_marker_of, is_variant_marker, Marker, BASE_A, BASE_C, BASE_G, BASE_T};
use crate::prg::string::PrgString;

fn encode_base(c: char) -> Option<Marker> {
    match c.to_ascii_uppercase() {
        'A' => Some(BASE_A),
        'C' => Some(BASE_C),
        'G' => Some(BASE_G),
        'T' => Some(BASE_T),
        _ => None,
    }
}

fn decode_base(m: Marker) -> char {
    match m {
        BASE_A => 'A',
        BASE_C => 'C',
        BASE_G => 'G',
        BASE_T => 'T',
        _ => unreachable!("not a nucleotide marker: {m}"),
    }
}

/// Parses `[`/`,`/`]`/`ACGT` text into a marker vector, assigning site IDs
/// in the order their opening bracket is encountered. Nested sites are
/// supported via a stack of (site id, allele marker) frames.
pub fn text_to_markers(text: &str) -> Result<Vec<Marker>, GramtoolsError> {
    let mut markers = Vec::new();
    let mut stack: Vec<Marker> = Vec::new();
    let mut next_site_id: Marker = 5;

    for c in text.chars() {
        match c {
            '[' => {
                let site_id = next_site_id;
                next_site_id += 2;
                markers.push(site_id);
                stack.push(site_id);
            }
            ',' => {
                let site_id = *stack.last().ok_or_else(|| {
                    GramtoolsError::InvalidPrgInput("',' found outside any site".to_string())
                })?;
                markers.push(allele_marker_of(site_id));
            }
            ']' => {
                let site_id = stack.pop().ok_or_else(|| {
                    GramtoolsError::InvalidPrgInput("unmatched ']'".to_string())
                })?;
                markers.push(allele_marker_of(site_id));
            }
            c if c.is_whitespace() => continue,
            c => {
                let base = encode_base(c).ok_or_else(|| {
                    GramtoolsError::InvalidPrgInput(format!("'{c}' is not one of ACGT[],"))
                })?;
                markers.push(base);
            }
        }
    }

    if !stack.is_empty() {
        return Err(GramtoolsError::InvalidPrgInput(
            "unmatched '[' at end of input".to_string(),
        ));
    }
    Ok(markers)
}

pub fn text_to_prg_string(text: &str) -> Result<PrgString, GramtoolsError> {
    PrgString::from_markers(text_to_markers(text)?)
}

/// Renders a marker vector back to the `[`/`,`/`]` text form. Site
/// renumbering in entry order means `ints_to_markers(markers_to_ints(s)) ==
/// s` only up to that renumbering (spec §8's round-trip law), not byte
/// identity of site IDs.
pub fn markers_to_text(markers: &[Marker]) -> String {
    let mut out = String::with_capacity(markers.len());
    // Track, for every odd site marker encountered so far, whether we're
    // still inside its first allele (need `[`) or have seen a separator
    // already and must decide `,` vs `]` based on whether this even-marker
    // occurrence is the site's terminator.
    let mut open_stack: Vec<Marker> = Vec::new();
    let end_positions = markers_end_positions(markers);

    for (pos, &m) in markers.iter().enumerate() {
        if !is_variant_marker(m) {
            out.push(decode_base(m));
            continue;
        }
        let is_site = m % 2 == 1;
        if is_site {
            out.push('[');
            open_stack.push(m);
        } else {
            let site = m - 1;
            let is_terminator = end_positions.get(&site) == Some(&pos);
            if is_terminator {
                out.push(']');
                open_stack.retain(|&s| s != site);
            } else {
                out.push(',');
            }
        }
    }
    out
}

fn markers_end_positions(markers: &[Marker]) -> std::collections::HashMap<Marker, usize> {
    let mut ends = std::collections::HashMap::new();
    for (pos, &m) in markers.iter().enumerate() {
        if is_variant_marker(m) && m % 2 == 0 {
            ends.insert(m - 1, pos);
        }
    }
    ends
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_site_round_trips_in_entry_order() {
        let markers = text_to_markers("gct[c,g,t]ag[t,c]cta").unwrap();
        let text = markers_to_text(&markers);
        assert_eq!(text, "GCT[C,G,T]AG[T,C]CTA");
    }

    #[test]
    fn nested_site_assigns_ids_in_bracket_entry_order() {
        let markers = text_to_markers("[AC,[C,G]]T").unwrap();
        // outer '[' -> site 5, inner '[' -> site 7.
        assert_eq!(markers, vec![5, 1, 2, 6, 7, 2, 8, 3, 8, 6, 4]);
    }

    #[test]
    fn direct_deletion_allele_is_allowed() {
        let markers = text_to_markers("[A,,G]").unwrap();
        assert_eq!(markers, vec![5, 1, 6, 6, 3, 6]);
    }

    #[test]
    fn unmatched_bracket_is_rejected() {
        assert!(text_to_markers("[AC,G").is_err());
        assert!(text_to_markers("AC]").is_err());
    }
}
