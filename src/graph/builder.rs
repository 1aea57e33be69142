//! `cov_Graph_Builder` equivalent: builds a [`super::CoverageGraph`] from a
//! [`PrgString`] in a single left-to-right pass (spec §4.B), then derives
//! the target map in a second pass over the already-validated marker
//! positions.

use std::collections::HashMap;

use petgraph::graph::NodeIndex;

use crate::errors::GramtoolsError;
use crate::graph::{
    BubbleMap, CoverageGraph, CoverageNode, GraphInner, NodeAccess, ParentMap, RandomAccessArray,
    TargetMap, TargetedMarker,
};
use crate::prg::marker::{is_nucleotide, AlleleId, Marker};
use crate::prg::PrgString;

/// Context for the variant site currently being traversed. A stack of these
/// is all that is needed to handle nesting: the top frame is always the
/// innermost site in progress.
struct SiteFrame {
    site_marker: Marker,
    bubble_start: NodeIndex,
    bubble_end: NodeIndex,
    current_allele: AlleleId,
}

pub struct CoverageGraphBuilder<'a> {
    prg: &'a PrgString,
    graph: GraphInner,
    parent_map: ParentMap,
    bubble_map: BubbleMap,
    random_access: RandomAccessArray,
    is_nested: bool,
}

impl<'a> CoverageGraphBuilder<'a> {
    pub fn new(prg: &'a PrgString) -> Self {
        CoverageGraphBuilder {
            prg,
            graph: GraphInner::default(),
            parent_map: ParentMap::new(),
            bubble_map: BubbleMap::default(),
            random_access: Vec::with_capacity(prg.len()),
            is_nested: false,
        }
    }

    fn connect(&mut self, from: NodeIndex, to: NodeIndex) {
        self.graph.add_edge(from, to, ());
        self.graph[from].edges.push(to);
    }

    /// Closes the node currently accumulating sequence by wiring
    /// `backwire -> cur_node -> target`, matching the "1 or 2 edges"
    /// semantics described for `cov_Graph_Builder::wire` — we always keep
    /// `cur_node`, including when empty, trading the original's node
    /// elision for simplicity.
    fn wire(&mut self, backwire: NodeIndex, cur_node: NodeIndex, target: NodeIndex) {
        self.connect(backwire, cur_node);
        self.connect(cur_node, target);
    }

    pub fn build(mut self) -> Result<CoverageGraph, GramtoolsError> {
        let markers = self.prg.markers().to_vec();

        let root = self.graph.add_node(CoverageNode::new(-1));
        let mut backwire = root;
        let mut cur_node = self.graph.add_node(CoverageNode::new(0));
        let mut stack: Vec<SiteFrame> = Vec::new();
        let mut entry_positions: HashMap<Marker, usize> = HashMap::new();

        for (pos, &m) in markers.iter().enumerate() {
            if is_nucleotide(m) {
                let offset = self.graph[cur_node].sequence.len();
                self.graph[cur_node].append_sequence(m as u8);
                self.random_access.push(NodeAccess { node: cur_node, offset });
                continue;
            }

            let is_entry = m % 2 == 1;
            if is_entry {
                let site_marker = m;
                entry_positions.insert(site_marker, pos);

                let bubble_start = self.graph.add_node(CoverageNode::new(pos as i64));
                let bubble_end = self.graph.add_node(CoverageNode::new(pos as i64));
                self.graph[bubble_start].is_site_boundary = true;
                self.graph[bubble_end].is_site_boundary = true;

                self.wire(backwire, cur_node, bubble_start);

                if let Some(parent) = stack.last() {
                    self.parent_map
                        .insert(site_marker, (parent.site_marker, Some(parent.current_allele)));
                    self.is_nested = true;
                }

                stack.push(SiteFrame {
                    site_marker,
                    bubble_start,
                    bubble_end,
                    current_allele: 1,
                });

                backwire = bubble_start;
                cur_node = self
                    .graph
                    .add_node(CoverageNode::with_sequence(Vec::new(), pos as i64, site_marker, 1));
                self.random_access.push(NodeAccess { node: bubble_start, offset: 0 });
            } else {
                let site_marker = m - 1;
                let is_exit = self.prg.end_position_of(site_marker) == Some(pos);
                let (bubble_start, bubble_end) = {
                    let frame = stack.last().ok_or_else(|| {
                        GramtoolsError::InternalInvariant(format!(
                            "allele marker {m} seen at position {pos} with no open site on the stack"
                        ))
                    })?;
                    (frame.bubble_start, frame.bubble_end)
                };

                self.wire(backwire, cur_node, bubble_end);
                self.random_access.push(NodeAccess { node: bubble_end, offset: 0 });

                if is_exit {
                    stack.pop();
                    self.bubble_map.push_unordered(bubble_start, bubble_end);
                    backwire = bubble_end;
                    cur_node = self.graph.add_node(CoverageNode::new(pos as i64));
                } else {
                    let frame = stack.last_mut().expect("checked above");
                    frame.current_allele += 1;
                    let allele_id = frame.current_allele;
                    backwire = bubble_start;
                    cur_node = self.graph.add_node(CoverageNode::with_sequence(
                        Vec::new(),
                        pos as i64,
                        site_marker,
                        allele_id,
                    ));
                }
            }
        }

        if !stack.is_empty() {
            return Err(GramtoolsError::InternalInvariant(
                "coverage graph construction finished with open sites remaining".to_string(),
            ));
        }

        // Sink: no further target, just fold cur_node onto backwire.
        self.connect(backwire, cur_node);

        self.bubble_map
            .sort_by_position_desc(|idx| self.graph[idx].pos);

        debug_assert!(
            self.bubble_map.iter().all(|&(start, _)| !self.graph[start].edges.is_empty()),
            "every bubble-start must have at least one outgoing edge"
        );

        let target_map = self.build_target_map(&entry_positions)?;

        Ok(CoverageGraph {
            graph: self.graph,
            root,
            bubble_map: self.bubble_map,
            parent_map: self.parent_map,
            random_access: self.random_access,
            target_map,
            is_nested: self.is_nested,
        })
    }

    /// Second pass: for every site, work out which of its alleles are
    /// direct deletions (empty alleles — two allele-boundary markers for
    /// the same site with nothing between them) so the search engine can
    /// emit a correctly-typed locus when it crosses them (spec §4.B).
    fn build_target_map(
        &self,
        entry_positions: &HashMap<Marker, usize>,
    ) -> Result<TargetMap, GramtoolsError> {
        let markers = self.prg.markers();
        let mut target_map = TargetMap::new();

        for (&site_marker, &entry_pos) in entry_positions.iter() {
            let exit_pos = self.prg.end_position_of(site_marker).ok_or_else(|| {
                GramtoolsError::InternalInvariant(format!(
                    "site {site_marker} has no recorded terminator position"
                ))
            })?;
            let allele_marker = site_marker + 1;

            let mut boundaries = Vec::new();
            for (pos, &m) in markers.iter().enumerate().take(exit_pos + 1).skip(entry_pos + 1) {
                if m == allele_marker {
                    boundaries.push(pos);
                }
            }

            let mut targets = Vec::with_capacity(boundaries.len());
            let mut prev_boundary = entry_pos;
            for (i, &boundary_pos) in boundaries.iter().enumerate() {
                let allele_id = (i + 1) as AlleleId;
                let is_empty = boundary_pos == prev_boundary + 1;
                targets.push(TargetedMarker {
                    id: allele_marker,
                    direct_deletion_allele: if is_empty { Some(allele_id) } else { None },
                });
                prev_boundary = boundary_pos;
            }

            target_map.insert(site_marker, targets);
        }

        Ok(target_map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prg::text::text_to_prg_string;

    #[test]
    fn bubble_start_edge_count_matches_allele_count() {
        let prg = text_to_prg_string("gct[c,g,t]ag[t,c]cta").unwrap();
        let graph = CoverageGraph::from_prg_string(&prg).unwrap();
        assert_eq!(graph.site_count(), 2);
        // bubble_map is ordered greatest-position-first: the second site
        // ("[t,c]", 2 alleles) comes before the first ("[c,g,t]", 3 alleles).
        let bubbles: Vec<_> = graph.bubble_map.iter().collect();
        assert_eq!(graph.node(bubbles[0].0).edges.len(), 2);
        assert_eq!(graph.node(bubbles[1].0).edges.len(), 3);
    }

    #[test]
    fn nested_site_sets_parent_map_and_is_nested_flag() {
        let prg = text_to_prg_string("[AC,[C,G]]T").unwrap();
        let graph = CoverageGraph::from_prg_string(&prg).unwrap();
        assert!(graph.is_nested);
        // inner site is 7, outer is 5; inner sits in outer's allele 2.
        assert_eq!(graph.parent_map.get(&7), Some(&(5, Some(2))));
    }

    #[test]
    fn direct_deletion_allele_is_recorded_in_target_map() {
        let prg = text_to_prg_string("[A,,G]").unwrap();
        let graph = CoverageGraph::from_prg_string(&prg).unwrap();
        let targets = graph.targets_of(5);
        assert_eq!(targets.len(), 3);
        assert_eq!(targets[1].direct_deletion_allele, Some(2));
        assert_eq!(targets[0].direct_deletion_allele, None);
        assert_eq!(targets[2].direct_deletion_allele, None);
    }

    #[test]
    fn random_access_covers_every_prg_position() {
        let prg = text_to_prg_string("gct[c,g,t]ag[t,c]cta").unwrap();
        let graph = CoverageGraph::from_prg_string(&prg).unwrap();
        assert_eq!(graph.random_access.len(), prg.len());
    }
}
