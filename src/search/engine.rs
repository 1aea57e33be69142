//! Component F: the vBWT backward-search engine (spec §4.F). This is the
//! core of the whole crate — everything else exists to feed it an
//! [`crate::index::IndexBundle`] and collect what it returns.

use crate::errors::GramtoolsError;
use crate::index::IndexBundle;
use crate::prg::marker::{is_nucleotide, Marker};
use crate::search::state::{SaInterval, SearchState};

/// §4.F.1: extends every state backward by one nucleotide. States whose
/// extended interval is empty are dropped.
pub fn backward_extend_base(states: &[SearchState], index: &IndexBundle, base: Marker) -> Vec<SearchState> {
    debug_assert!(is_nucleotide(base), "backward_extend_base expects a nucleotide, got {base}");
    states
        .iter()
        .filter_map(|state| {
            let lo = state.sa_interval.lo;
            let hi_exclusive = state.sa_interval.hi + 1;
            let (new_lo, new_hi_exclusive) = index.fm_index.backward_extend(base, lo, hi_exclusive)?;
            let interval = SaInterval::new(new_lo, new_hi_exclusive - 1)?;
            Some(SearchState {
                sa_interval: interval,
                traversed: state.traversed.clone(),
                traversing: state.traversing.clone(),
            })
        })
        .collect()
}

/// §4.F.2: every SA row in `state`'s interval whose BWT entry is a variant
/// marker, paired with that marker's value.
fn left_markers_search(state: &SearchState, index: &IndexBundle) -> Vec<(usize, Marker)> {
    let mask = &index.fm_index.bwt_markers_mask.bits;
    (state.sa_interval.lo..=state.sa_interval.hi)
        .filter(|&i| mask.get(i))
        .map(|i| (i, index.fm_index.bwt[i]))
        .collect()
}

/// The single SA row whose suffix starts exactly at `site_marker`'s own
/// occurrence in the text. Its BWT character is the nucleotide immediately
/// preceding the site, not the marker itself, so repositioning a state
/// here (rather than at the row the marker was found on) lets the next
/// `backward_extend_base` find a non-empty rank range.
fn exit_site_interval(index: &IndexBundle, site_marker: Marker) -> Result<SaInterval, GramtoolsError> {
    let row = index.fm_index.c_array.get(site_marker) as usize;
    SaInterval::new(row, row).ok_or_else(|| {
        GramtoolsError::InternalInvariant(format!("no SA row found for site marker {site_marker}"))
    })
}

/// §4.F.3: the marker-driven branches reachable from `state`'s interval.
/// Does not include `state` itself unmodified — the caller unions that in
/// separately (§4.F.4).
fn marker_driven_jumps(state: &SearchState, index: &IndexBundle, prg: &crate::prg::PrgString) -> Result<Vec<SearchState>, GramtoolsError> {
    let mut branches = Vec::new();

    for (i, m) in left_markers_search(state, index) {
        let sa_value = index.fm_index.sa[i] as usize;
        // A marker occurrence's own text position is the predecessor of
        // the suffix it precedes; markers never sit at text position 0.
        let text_pos = sa_value.checked_sub(1).ok_or_else(|| {
            GramtoolsError::InternalInvariant(
                "marker occurrence found at the very start of the PRG text".to_string(),
            )
        })?;

        if m % 2 == 0 {
            let site_marker = m - 1;
            let is_exit = prg.end_position_of(site_marker) == Some(text_pos);
            if is_exit {
                // Entering the site backward: every occurrence of this
                // marker leads to the same shared context before the
                // site, so the new interval is the *full* C[m]..C[m+1)
                // block, not scoped to the current interval.
                let lo = index.fm_index.c_array.get(m) as usize;
                let hi_exclusive = index.fm_index.c_array.get(m + 1) as usize;
                if let Some(interval) = SaInterval::new(lo, hi_exclusive.saturating_sub(1)) {
                    if hi_exclusive > lo {
                        let mut next = SearchState {
                            sa_interval: interval,
                            traversed: state.traversed.clone(),
                            traversing: state.traversing.clone(),
                        };
                        next.check_no_duplicate_site()?;
                        next.prepend_traversing((site_marker, None));
                        branches.push(next);
                    }
                }
            } else {
                // The allele's content lies to the marker's right, at the
                // text position the suffix starting at `i` itself begins —
                // not at the marker's own position, which belongs to the
                // allele it *terminates*.
                let allele_id = index.prg_masks.locus_at(sa_value).map(|(_, a)| a).ok_or_else(|| {
                    GramtoolsError::InternalInvariant(format!(
                        "no allele recorded for site {site_marker} at position {sa_value}"
                    ))
                })?;
                let mut next = SearchState {
                    sa_interval: exit_site_interval(index, site_marker)?,
                    traversed: state.traversed.clone(),
                    traversing: state.traversing.clone(),
                };
                next.record_allele_crossing(site_marker, allele_id);
                next.check_no_duplicate_site()?;
                branches.push(next);
            }
        } else {
            // Odd marker: crossing the site's own open bracket backward.
            // Only allele 1's content sits immediately after an open
            // bracket, so this always concludes allele 1 — and, since
            // there is nothing further upstream that could change it,
            // this is also where the locus moves from `traversing` to
            // `traversed`.
            let site_marker = m;
            let mut next = SearchState {
                sa_interval: exit_site_interval(index, site_marker)?,
                traversed: state.traversed.clone(),
                traversing: state.traversing.clone(),
            };
            if next.traversing.first().map(|locus| locus.0) == Some(site_marker) {
                next.traversing.remove(0);
            }
            next.prepend_traversed((site_marker, Some(1)));
            next.check_no_duplicate_site()?;
            branches.push(next);
        }
    }

    Ok(branches)
}

/// §4.F.4: one step of per-read-character processing. Enumerates marker
/// branches, unions them with the unchanged input states, then extends
/// everything by `base`.
pub fn process_read_character(
    states: &[SearchState],
    index: &IndexBundle,
    prg: &crate::prg::PrgString,
    base: Marker,
) -> Result<Vec<SearchState>, GramtoolsError> {
    let mut all_states: Vec<SearchState> = Vec::with_capacity(states.len() * 2);
    for state in states {
        all_states.extend(marker_driven_jumps(state, index, prg)?);
    }
    all_states.extend_from_slice(states);
    Ok(backward_extend_base(&all_states, index, base))
}

/// §4.F.5: once a full read has matched with no crossed sites, split its
/// final interval per (site, allele) — or per position, if outside any
/// site.
pub fn split_allele_encapsulated_states(state: &SearchState, index: &IndexBundle) -> Vec<SearchState> {
    debug_assert!(state.is_invariant());
    let mut groups: Vec<(Option<(Marker, crate::prg::marker::AlleleId)>, usize, usize)> = Vec::new();

    for i in state.sa_interval.lo..=state.sa_interval.hi {
        let pos = index.fm_index.sa[i] as usize;
        let key = index.prg_masks.locus_at(pos);
        match groups.last_mut() {
            Some((last_key, _, last_hi)) if *last_key == key && *last_hi + 1 == i => {
                *last_hi = i;
            }
            _ => groups.push((key, i, i)),
        }
    }

    groups
        .into_iter()
        .map(|(key, lo, hi)| {
            let mut s = SearchState::new(SaInterval::new(lo, hi).expect("non-empty group"));
            if let Some((site, allele)) = key {
                s.traversed.push((site, Some(allele)));
            }
            s
        })
        .collect()
}

/// §4.F.6: resolves any `ALLELE_UNKNOWN` front entry on `traversing` by
/// splitting the state one-per-allele-ID found in its SA interval. This is
/// the only place `ALLELE_UNKNOWN` is removed.
pub fn resolve_pending_allele(state: SearchState, index: &IndexBundle) -> Vec<SearchState> {
    let Some(&(site_marker, None)) = state.pending_locus() else {
        return vec![state];
    };

    let mut by_allele: std::collections::BTreeMap<crate::prg::marker::AlleleId, (usize, usize)> =
        std::collections::BTreeMap::new();

    for i in state.sa_interval.lo..=state.sa_interval.hi {
        let pos = index.fm_index.sa[i] as usize;
        if let Some((site, allele_id)) = index.prg_masks.locus_at(pos) {
            if site == site_marker {
                let entry = by_allele.entry(allele_id).or_insert((i, i));
                entry.0 = entry.0.min(i);
                entry.1 = entry.1.max(i);
            }
        }
    }

    by_allele
        .into_iter()
        .filter_map(|(allele_id, (lo, hi))| {
            let mut s = SearchState {
                sa_interval: SaInterval::new(lo, hi)?,
                traversed: state.traversed.clone(),
                traversing: state.traversing.clone(),
            };
            s.traversing[0] = (site_marker, Some(allele_id));
            Some(s)
        })
        .collect()
}
