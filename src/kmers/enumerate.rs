//! Component D: kmer enumeration (spec §4.D).

use itertools::Itertools;

use crate::graph::CoverageGraph;
use crate::prg::marker::{Marker, BASE_A, BASE_C, BASE_G, BASE_T};

const ALPHABET: [Marker; 4] = [BASE_A, BASE_C, BASE_G, BASE_T];

/// All length-`k` kmers in lexicographic order, generated by repeated
/// base-4 increment (spec §4.D.1).
pub fn all_kmers_lex(k: usize) -> Vec<Vec<Marker>> {
    if k == 0 {
        return vec![Vec::new()];
    }
    let mut kmers = Vec::with_capacity(4usize.pow(k as u32));
    let mut digits = vec![0usize; k];
    loop {
        kmers.push(digits.iter().map(|&d| ALPHABET[d]).collect());

        let mut i = k;
        loop {
            if i == 0 {
                return sort_reverse_lex(kmers);
            }
            i -= 1;
            digits[i] += 1;
            if digits[i] < ALPHABET.len() {
                break;
            }
            digits[i] = 0;
        }
    }
}

/// Reorders kmers so that consecutive entries share the maximal suffix:
/// the indexer extends kmers right-to-left, so a shared suffix means a
/// shared intermediate search state (spec §4.D.1). Achieved by sorting on
/// each kmer reversed.
pub fn sort_reverse_lex(mut kmers: Vec<Vec<Marker>>) -> Vec<Vec<Marker>> {
    kmers.sort_by(|a, b| {
        a.iter().rev().cmp(b.iter().rev())
    });
    kmers
}

/// Kmers overlapping a variant site, or within `max_read_size` of one's
/// right boundary (spec §4.D.2). For each site, the "region parts" are the
/// invariant sequence immediately to its left, its alleles, and the
/// invariant sequence to its right (up to `max_read_size` bases, or until
/// the next site) — the Cartesian product of those parts gives candidate
/// local haplotypes, which are then windowed into kmers.
pub fn sites_overlapping_kmers(graph: &CoverageGraph, k: usize, max_read_size: usize) -> Vec<Vec<Marker>> {
    let mut kmers: std::collections::BTreeSet<Vec<Marker>> = std::collections::BTreeSet::new();

    for &(bubble_start, bubble_end) in graph.bubble_map.iter() {
        let left_context = left_invariant_tail(graph, bubble_start, k.saturating_sub(1));
        let allele_parts = allele_sequences(graph, bubble_start);
        let right_context = right_invariant_head(graph, bubble_end, max_read_size);

        let region_parts: Vec<Vec<Vec<u8>>> = vec![vec![left_context], allele_parts, vec![right_context]];

        for combo in region_parts.into_iter().multi_cartesian_product() {
            let path: Vec<u8> = combo.into_iter().flatten().collect();
            if path.len() < k {
                continue;
            }
            for window in path.windows(k) {
                kmers.insert(window.iter().map(|&b| b as Marker).collect());
            }
        }
    }

    sort_reverse_lex(kmers.into_iter().collect())
}

fn left_invariant_tail(graph: &CoverageGraph, bubble_start: petgraph::graph::NodeIndex, max_len: usize) -> Vec<u8> {
    // Walks the (unique, by construction outside a bubble) predecessor
    // chain backward, accumulating up to `max_len` bases.
    let mut tail = Vec::new();
    let mut preds: Vec<petgraph::graph::NodeIndex> = graph
        .graph
        .node_indices()
        .filter(|&idx| graph.node(idx).edges.contains(&bubble_start))
        .collect();
    while let Some(pred) = preds.pop() {
        if tail.len() >= max_len {
            break;
        }
        let node = graph.node(pred);
        let mut seq = node.sequence.clone();
        seq.extend(tail);
        tail = seq;
        preds = graph
            .graph
            .node_indices()
            .filter(|&idx| graph.node(idx).edges.contains(&pred))
            .collect();
    }
    if tail.len() > max_len {
        tail.split_off(tail.len() - max_len)
    } else {
        tail
    }
}

fn right_invariant_head(graph: &CoverageGraph, bubble_end: petgraph::graph::NodeIndex, max_len: usize) -> Vec<u8> {
    let mut head = Vec::new();
    let mut cur = bubble_end;
    loop {
        if head.len() >= max_len {
            break;
        }
        head.extend(graph.node(cur).sequence.iter().copied());
        match graph.node(cur).edges.first() {
            Some(&next) if !graph.node(next).is_site_boundary || graph.node(next).has_sequence() => {
                cur = next;
            }
            _ => break,
        }
    }
    head.truncate(max_len);
    head
}

fn allele_sequences(graph: &CoverageGraph, bubble_start: petgraph::graph::NodeIndex) -> Vec<Vec<u8>> {
    graph
        .node(bubble_start)
        .edges
        .iter()
        .map(|&allele_node| graph.node(allele_node).sequence.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_kmers_lex_generates_all_4_pow_k_combinations() {
        let kmers = all_kmers_lex(2);
        assert_eq!(kmers.len(), 16);
        let unique: std::collections::HashSet<_> = kmers.iter().collect();
        assert_eq!(unique.len(), 16);
    }

    #[test]
    fn reverse_lex_groups_shared_suffixes_adjacently() {
        let kmers = all_kmers_lex(2);
        // every even index should share its suffix (last base) with the
        // next odd index after reverse-lex sorting.
        for pair in kmers.chunks(2) {
            assert_eq!(pair[0].last(), pair[1].last());
        }
    }
}
