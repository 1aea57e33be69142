//! Component B: the coverage graph (spec §3, §4.B).
//!
//! A DAG over the PRG's sequence, where every variant site forms a
//! "bubble" — a branch node fanning out into one node per allele,
//! rejoining at a single node. Grounded on
//! `examples/original_source/libgramtools/include/prg/coverage_graph.hpp`'s
//! `coverage_Graph`.

pub mod bubble;
pub mod builder;
pub mod node;

use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;

use crate::prg::marker::Marker;

pub use bubble::{derive_child_map, BubbleMap, NodeAccess, ParentMap, RandomAccessArray, TargetMap, TargetedMarker};
pub use builder::CoverageGraphBuilder;
pub use node::{BaseCoverage, CoverageNode};

/// Edge weights carry no data; node order on [`CoverageNode::edges`] is
/// what encodes path identity (spec §3).
pub type GraphInner = StableDiGraph<CoverageNode, ()>;

#[derive(Debug)]
pub struct CoverageGraph {
    pub graph: GraphInner,
    pub root: NodeIndex,
    pub bubble_map: BubbleMap,
    pub parent_map: ParentMap,
    pub random_access: RandomAccessArray,
    pub target_map: TargetMap,
    /// True if any variant site is nested inside another (spec §3).
    pub is_nested: bool,
}

impl CoverageGraph {
    /// Builds a coverage graph from a linearised PRG (spec §4.B).
    pub fn from_prg_string(prg: &crate::prg::PrgString) -> Result<Self, crate::errors::GramtoolsError> {
        CoverageGraphBuilder::new(prg).build()
    }

    pub fn node(&self, idx: NodeIndex) -> &CoverageNode {
        &self.graph[idx]
    }

    pub fn node_mut(&mut self, idx: NodeIndex) -> &mut CoverageNode {
        &mut self.graph[idx]
    }

    /// Node index, offset within its sequence, for a PRG-string position.
    pub fn locate(&self, prg_position: usize) -> Option<NodeAccess> {
        self.random_access.get(prg_position).copied()
    }

    pub fn site_count(&self) -> usize {
        self.bubble_map.len()
    }

    /// All sites directly targeted from `marker`'s crossing point, per the
    /// target map built during construction (spec §4.B).
    pub fn targets_of(&self, marker: Marker) -> &[TargetedMarker] {
        self.target_map
            .get(&marker)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}
