//! Auxiliary structures hanging off the [`super::CoverageGraph`]: the
//! bubble map, parent/child maps, random-access array and target map
//! (spec §3).

use std::collections::HashMap;

use petgraph::graph::NodeIndex;

use crate::prg::marker::{AlleleId, Marker, VariantLocus};

/// Maps the start of a local bubble to its end. Ordered with the greatest
/// sequence position first, so innermost/latest bubbles come first — the
/// canonical genotyping order (spec §3).
#[derive(Debug, Default, Clone)]
pub struct BubbleMap {
    entries: Vec<(NodeIndex, NodeIndex)>,
}

impl BubbleMap {
    /// Records a bubble discovered during construction. Order is not
    /// meaningful until [`Self::sort_by_position_desc`] runs at the end of
    /// the build, since bubbles close in nesting order, not position order.
    pub fn push_unordered(&mut self, start: NodeIndex, end: NodeIndex) {
        self.entries.push((start, end));
    }

    /// Reorders entries with the greatest sequence position first, so
    /// innermost/latest bubbles are visited before their ancestors.
    pub fn sort_by_position_desc(&mut self, pos_of: impl Fn(NodeIndex) -> i64) {
        self.entries.sort_by(|a, b| pos_of(b.0).cmp(&pos_of(a.0)));
    }

    pub fn iter(&self) -> impl Iterator<Item = &(NodeIndex, NodeIndex)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Site ID -> its immediate parent Locus. Only populated for sites nested
/// inside another site.
pub type ParentMap = HashMap<Marker, VariantLocus>;

/// Inverse of [`ParentMap`]: parent (site, allele) -> child site IDs.
/// Derived, not stored (spec §3).
pub fn derive_child_map(parent_map: &ParentMap) -> HashMap<(Marker, AlleleId), Vec<Marker>> {
    let mut child_map: HashMap<(Marker, AlleleId), Vec<Marker>> = HashMap::new();
    for (&child_site, &(parent_site, parent_allele)) in parent_map.iter() {
        let allele = parent_allele.unwrap_or(0);
        child_map
            .entry((parent_site, allele))
            .or_default()
            .push(child_site);
    }
    child_map
}

/// A variant marker this marker is directly linked to in the
/// backward-search sense, with the direct-deletion allele ID recorded if
/// crossing this link skips an empty allele (spec §3, §4.B).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetedMarker {
    pub id: Marker,
    pub direct_deletion_allele: Option<AlleleId>,
}

pub type TargetMap = HashMap<Marker, Vec<TargetedMarker>>;

/// Index into the PRG string -> the node holding that position's
/// character, plus the character's offset within the node.
#[derive(Debug, Clone, Copy)]
pub struct NodeAccess {
    pub node: NodeIndex,
    pub offset: usize,
}

pub type RandomAccessArray = Vec<NodeAccess>;
