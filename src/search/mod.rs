//! Component F: the vBWT backward-search engine.

pub mod engine;
pub mod state;

pub use engine::{
    backward_extend_base, process_read_character, resolve_pending_allele, split_allele_encapsulated_states,
};
pub use state::{SaInterval, SearchState};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexBundle;
    use crate::prg::marker::{BASE_A, BASE_C, BASE_G, BASE_T};
    use crate::prg::text::text_to_prg_string;

    fn full_interval(index: &IndexBundle) -> SearchState {
        SearchState::new(SaInterval::new(0, index.fm_index.len() - 1).unwrap())
    }

    #[test]
    fn backward_extend_matches_invariant_sequence() {
        let prg = text_to_prg_string("ACGTACGT").unwrap();
        let index = IndexBundle::build(&prg).unwrap();
        let states = vec![full_interval(&index)];
        let states = backward_extend_base(&states, &index, BASE_T);
        let states = backward_extend_base(&states, &index, BASE_G);
        let states = backward_extend_base(&states, &index, BASE_C);
        assert_eq!(states.len(), 1);
        assert_eq!(states[0].sa_interval.size(), 2);
    }

    #[test]
    fn crossing_a_site_boundary_produces_traversing_locus() {
        // "AC" then a single-allele-equivalent site "[G]" then "T": reading
        // backward from T, crossing the site-open marker resolves allele 1
        // immediately since there is only one allele.
        let prg = text_to_prg_string("AC[G]T").unwrap();
        let index = IndexBundle::build(&prg).unwrap();
        let states = vec![full_interval(&index)];
        let states = process_read_character(&states, &index, &prg, BASE_T).unwrap();
        assert!(!states.is_empty());
        // Continue backward through the lone allele "G".
        let states = process_read_character(&states, &index, &prg, BASE_G).unwrap();
        assert!(states.iter().any(|s| !s.is_invariant()));
    }

    #[test]
    fn duplicate_site_guard_is_not_triggered_on_acyclic_prg() {
        let prg = text_to_prg_string("A[C,G]T[A,C]G").unwrap();
        let index = IndexBundle::build(&prg).unwrap();
        let states = vec![full_interval(&index)];
        for &base in &[BASE_G, BASE_C, BASE_T, BASE_C, BASE_A] {
            let _ = process_read_character(&states, &index, &prg, base).unwrap();
        }
    }
}
