//! Suffix array construction over an arbitrary `u32` alphabet via
//! prefix-doubling (Vuillemin / Karp-Miller-Rosenberg), parallelised with
//! `rayon`.
//!
//! The pack's suffix-array-capable crates (and `bio`'s own SA builder) only
//! work over byte-range alphabets; PRG markers are unbounded `u32`s, so this
//! is implemented directly rather than adapted from a dependency.

use rayon::prelude::*;

/// Builds the suffix array of `text`, which must end with a strictly
/// minimal sentinel value (the PRG terminator, `0`) appearing exactly once.
/// Returns the array of starting positions of every suffix, in
/// lexicographic order.
pub fn build_suffix_array(text: &[u32]) -> Vec<u32> {
    let n = text.len();
    if n == 0 {
        return Vec::new();
    }

    // rank[i] holds the rank of the suffix starting at i among suffixes
    // compared only by their first `k` symbols (initially k=1: plain
    // symbol value). Doubling `k` each round refines ranks until they are
    // all distinct (fully resolved) or k >= n.
    let mut rank: Vec<i64> = text.iter().map(|&c| c as i64).collect();
    let mut sa: Vec<u32> = (0..n as u32).collect();
    let mut k = 1usize;

    loop {
        let rank_ref = &rank;
        sa.par_sort_unstable_by(|&a, &b| {
            let key_a = (rank_ref[a as usize], key_at(rank_ref, a as usize, k, n));
            let key_b = (rank_ref[b as usize], key_at(rank_ref, b as usize, k, n));
            key_a.cmp(&key_b)
        });

        let mut new_rank = vec![0i64; n];
        new_rank[sa[0] as usize] = 0;
        for i in 1..n {
            let prev = sa[i - 1] as usize;
            let cur = sa[i] as usize;
            let same = rank[prev] == rank[cur]
                && key_at(&rank, prev, k, n) == key_at(&rank, cur, k, n);
            new_rank[cur] = new_rank[prev] + if same { 0 } else { 1 };
        }

        let distinct_ranks = new_rank[sa[n - 1] as usize] + 1;
        rank = new_rank;
        if distinct_ranks as usize == n || k >= n {
            break;
        }
        k *= 2;
    }

    sa
}

/// Rank of the suffix starting `k` positions after `pos`, or `-1` if that
/// suffix runs off the end of the text (sorts before everything, matching
/// standard prefix-doubling convention).
fn key_at(rank: &[i64], pos: usize, k: usize, n: usize) -> i64 {
    if pos + k < n {
        rank[pos + k]
    } else {
        -1
    }
}

/// The inverse suffix array: `isa[i]` is the rank (SA position) of the
/// suffix starting at text position `i`.
pub fn inverse_suffix_array(sa: &[u32]) -> Vec<u32> {
    let mut isa = vec![0u32; sa.len()];
    for (rank, &pos) in sa.iter().enumerate() {
        isa[pos as usize] = rank as u32;
    }
    isa
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suffixes_sorted(text: &[u32], sa: &[u32]) -> bool {
        for w in sa.windows(2) {
            let a = &text[w[0] as usize..];
            let b = &text[w[1] as usize..];
            if a >= b {
                return false;
            }
        }
        true
    }

    #[test]
    fn builds_correctly_ordered_array_for_simple_text() {
        let text = vec![2u32, 1, 2, 1, 0]; // "CACA$" with $=0 as minimal sentinel
        let sa = build_suffix_array(&text);
        assert_eq!(sa.len(), text.len());
        assert!(suffixes_sorted(&text, &sa));
        // position 4 (the lone terminator) must sort first.
        assert_eq!(sa[0], 4);
    }

    #[test]
    fn handles_repeated_runs() {
        let text = vec![1u32, 1, 1, 1, 0];
        let sa = build_suffix_array(&text);
        assert!(suffixes_sorted(&text, &sa));
    }

    #[test]
    fn inverse_round_trips() {
        let text = vec![3u32, 1, 4, 1, 5, 0];
        let sa = build_suffix_array(&text);
        let isa = inverse_suffix_array(&sa);
        for (rank, &pos) in sa.iter().enumerate() {
            assert_eq!(isa[pos as usize] as usize, rank);
        }
    }

    #[test]
    fn single_character_text() {
        let text = vec![0u32];
        let sa = build_suffix_array(&text);
        assert_eq!(sa, vec![0]);
    }
}
