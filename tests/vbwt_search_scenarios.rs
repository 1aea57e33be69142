//! End-to-end backward-search scenarios, each a literal PRG text and read
//! with a known-correct `SearchState` result.

extern crate gramtools;

use gramtools::index::IndexBundle;
use gramtools::kmers::{build_kmer_index, KmerIndex};
use gramtools::prg::marker::Marker;
use gramtools::prg::PrgString;
use gramtools::quasimap::{map_read, MapOutcome};

/// Digit literal decoder matching the PRG notation used throughout: ACGT
/// map to 1..4, any other digit is taken as its own marker value.
fn markers(s: &str) -> Vec<Marker> {
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

fn map_one(prg_text: &str, read_text: &str, kmer_size: usize) -> Vec<gramtools::search::SearchState> {
    let prg = PrgString::from_markers(markers(prg_text)).unwrap();
    let index = IndexBundle::build(&prg).unwrap();
    let read = markers(read_text);

    let seed = read[read.len() - kmer_size..].to_vec();
    let table = build_kmer_index(&[seed], &index, &prg).unwrap();
    let kmer_index = KmerIndex::new(table, kmer_size);

    match map_read(&read, &index, &kmer_index, &prg, kmer_size).unwrap() {
        MapOutcome::Mapped(states) => states,
        MapOutcome::Unmapped => panic!("expected a mapping for {read_text:?} against {prg_text:?}"),
    }
}

#[test]
fn single_site_three_alleles_resolves_to_allele_g() {
    let states = map_one("gcgct5c6g6t6agtcct", "cgctg", 4);
    assert_eq!(states.len(), 1);
    assert_eq!(states[0].traversed, vec![(5, Some(2))]);
}

#[test]
fn single_site_three_alleles_resolves_to_allele_t_with_singleton_interval() {
    let states = map_one("gcgct5c6g6t6agtcct", "tagtcc", 4);
    assert_eq!(states.len(), 1);
    assert_eq!(states[0].traversed, vec![(5, Some(3))]);
    assert_eq!(states[0].sa_interval.size(), 1);
}

#[test]
fn two_sites_both_resolve_to_first_allele() {
    let states = map_one("gct5c6g6t6ag7t8c8cta", "cagtct", 3);
    assert_eq!(states.len(), 1);
    let mut traversed = states[0].traversed.clone();
    traversed.sort();
    assert_eq!(traversed, vec![(5, Some(1)), (7, Some(1))]);
}

#[test]
fn read_entirely_inside_one_allele_splits_to_a_single_state() {
    let states = map_one("ac5t6cagtagtc6ta", "agtag", 4);
    assert_eq!(states.len(), 1);
    assert_eq!(states[0].traversed, vec![(5, Some(2))]);
}

#[test]
fn repeated_substring_in_and_out_of_alleles_splits_into_six_states() {
    let states = map_one("tcagtt5tcagtcag6atcagtttcag6ta7atcagt8gtg8", "tcagt", 5);
    assert_eq!(states.len(), 6);
    assert!(states.iter().all(|s| s.sa_interval.size() == 1));
}

#[test]
fn nested_site_records_child_before_parent_in_combined_path() {
    // "[AC,[C,G]]T" linearises with the outer site (5) entered first in
    // the text, so reading backward the inner site (7) is crossed before
    // the outer one closes.
    let prg = PrgString::from_markers(gramtools::prg::text::text_to_markers("[AC,[C,G]]T").unwrap()).unwrap();
    let index = IndexBundle::build(&prg).unwrap();
    let read = markers("cct");
    let kmer_size = 3;

    let seed = read[read.len() - kmer_size..].to_vec();
    let table = build_kmer_index(&[seed], &index, &prg).unwrap();
    let kmer_index = KmerIndex::new(table, kmer_size);

    let states = match map_read(&read, &index, &kmer_index, &prg, kmer_size).unwrap() {
        MapOutcome::Mapped(states) => states,
        MapOutcome::Unmapped => panic!("expected a mapping"),
    };
    assert_eq!(states.len(), 1);
    assert_eq!(states[0].combined_path(), vec![(7, Some(1)), (5, Some(2))]);
}
