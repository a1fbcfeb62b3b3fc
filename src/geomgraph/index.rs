//! Pairwise segment intersection of edge sets, pruned by an r-tree of
//! segment envelopes.
use geo::Coordinate;
use log::debug;
use rstar::{RTree, RTreeObject, AABB};

use super::Edge;
use crate::{
    error::{OverlayError, Result},
    intersector::{RobustLineIntersector, SegmentIntersection},
};

/// Envelope of a single edge segment.
#[derive(Debug, Clone)]
struct SegmentEnvelope {
    edge: usize,
    segment: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for SegmentEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

fn segment_envelope(p: Coordinate<f64>, q: Coordinate<f64>) -> AABB<[f64; 2]> {
    AABB::from_corners([p.x, p.y], [q.x, q.y])
}

fn segment_tree(edges: &[Edge]) -> RTree<SegmentEnvelope> {
    let segments = edges
        .iter()
        .enumerate()
        .flat_map(|(edge, e)| {
            e.coords()
                .windows(2)
                .enumerate()
                .map(move |(segment, w)| SegmentEnvelope {
                    edge,
                    segment,
                    envelope: segment_envelope(w[0], w[1]),
                })
        })
        .collect();
    RTree::bulk_load(segments)
}

/// Candidate segment pairs `(e0, s0, e1, s1)` with intersecting
/// envelopes.
fn candidate_pairs<'a>(
    edges0: &'a [Edge],
    tree: &'a RTree<SegmentEnvelope>,
) -> impl Iterator<Item = (usize, usize, usize, usize)> + 'a {
    edges0.iter().enumerate().flat_map(move |(e0, edge)| {
        edge.coords()
            .windows(2)
            .enumerate()
            .flat_map(move |(s0, w)| {
                let env = segment_envelope(w[0], w[1]);
                tree.locate_in_envelope_intersecting(&env)
                    .map(move |cand| (e0, s0, cand.edge, cand.segment))
            })
    })
}

/// Summary of the intersections found by a [`SegmentIntersector`].
#[derive(Debug, Clone, Copy, Default)]
pub struct IntersectionSummary {
    /// Some non-trivial intersection was found.
    pub has_intersection: bool,
    /// Some intersection is proper (interior to both segments).
    pub has_proper: bool,
    /// Some proper intersection is not at a boundary node.
    pub has_proper_interior: bool,
    pub proper_point: Option<Coordinate<f64>>,
    pub num_tests: usize,
}

/// Intersects pairs of edge segments and records the intersections on
/// the edges.
#[derive(Debug)]
pub struct SegmentIntersector<'a> {
    li: &'a RobustLineIntersector,
    include_proper: bool,
    record_isolated: bool,
    boundary_nodes: Option<[Vec<Coordinate<f64>>; 2]>,
    summary: IntersectionSummary,
}

impl<'a> SegmentIntersector<'a> {
    pub fn new(li: &'a RobustLineIntersector, include_proper: bool, record_isolated: bool) -> Self {
        SegmentIntersector {
            li,
            include_proper,
            record_isolated,
            boundary_nodes: None,
            summary: IntersectionSummary::default(),
        }
    }

    pub fn with_boundary_nodes(mut self, nodes: [Vec<Coordinate<f64>>; 2]) -> Self {
        self.boundary_nodes = Some(nodes);
        self
    }

    pub fn summary(&self) -> IntersectionSummary {
        self.summary
    }

    /// Intersections between adjacent segments of one edge (and between
    /// the last and first segment of a closed edge) are expected vertices,
    /// not noding events.
    fn is_trivial(
        &self,
        isec: &SegmentIntersection,
        same_edge: bool,
        closed: bool,
        num_points: usize,
        s0: usize,
        s1: usize,
    ) -> bool {
        if !same_edge || isec.intersection_num() != 1 {
            return false;
        }
        if s0.abs_diff(s1) == 1 {
            return true;
        }
        if closed {
            let max = num_points - 1;
            if (s0 == 0 && s1 == max - 1) || (s1 == 0 && s0 == max - 1) {
                return true;
            }
        }
        false
    }

    fn is_boundary_point(&self, isec: &SegmentIntersection) -> bool {
        match &self.boundary_nodes {
            Some(nodes) => nodes
                .iter()
                .flatten()
                .any(|&pt| isec.is_intersection(pt)),
            None => false,
        }
    }

    /// Examine one segment pair. Returns the intersection to record on
    /// both edges, if it should be recorded.
    fn examine(
        &mut self,
        e0: &Edge,
        s0: usize,
        e1: &Edge,
        s1: usize,
        same_edge: bool,
    ) -> Option<(SegmentIntersection, bool)> {
        if same_edge && s0 == s1 {
            return None;
        }
        self.summary.num_tests += 1;
        let isec = self
            .li
            .intersect(e0.coord(s0), e0.coord(s0 + 1), e1.coord(s1), e1.coord(s1 + 1));
        if !isec.has_intersection() {
            return None;
        }
        if self.is_trivial(&isec, same_edge, e0.is_closed(), e0.num_points(), s0, s1) {
            return Some((isec, false));
        }
        self.summary.has_intersection = true;
        if isec.is_proper() {
            self.summary.proper_point = Some(isec.intersection(0));
            self.summary.has_proper = true;
            if !self.is_boundary_point(&isec) {
                self.summary.has_proper_interior = true;
            }
        }
        let record = self.include_proper || !isec.is_proper();
        Some((isec, record))
    }

    /// Node the edges of one set against each other. With
    /// `test_all_segments` unset, segments of the same edge are skipped.
    pub fn intersect_self(&mut self, edges: &mut [Edge], test_all_segments: bool) {
        let tree = segment_tree(edges);
        let pairs: Vec<_> = candidate_pairs(edges, &tree)
            .filter(|&(e0, s0, e1, s1)| (e0, s0) < (e1, s1))
            .filter(|&(e0, _, e1, _)| test_all_segments || e0 != e1)
            .collect();
        for (e0, s0, e1, s1) in pairs {
            let found = self.examine(&edges[e0], s0, &edges[e1], s1, e0 == e1);
            if let Some((isec, record)) = found {
                if self.record_isolated {
                    edges[e0].set_isolated(false);
                    edges[e1].set_isolated(false);
                }
                if record {
                    edges[e0].add_intersections(&isec, s0, 0);
                    edges[e1].add_intersections(&isec, s1, 1);
                }
            }
        }
        debug!(
            "self noding: {n} edges, {t} segment tests",
            n = edges.len(),
            t = self.summary.num_tests
        );
    }

    /// Node two disjoint edge sets against each other.
    pub fn intersect_cross(&mut self, edges0: &mut [Edge], edges1: &mut [Edge]) {
        let tree = segment_tree(edges1);
        let pairs: Vec<_> = candidate_pairs(edges0, &tree).collect();
        for (e0, s0, e1, s1) in pairs {
            let found = self.examine(&edges0[e0], s0, &edges1[e1], s1, false);
            if let Some((isec, record)) = found {
                if self.record_isolated {
                    edges0[e0].set_isolated(false);
                    edges1[e1].set_isolated(false);
                }
                if record {
                    edges0[e0].add_intersections(&isec, s0, 0);
                    edges1[e1].add_intersections(&isec, s1, 1);
                }
            }
        }
        debug!(
            "cross noding: {n0} x {n1} edges, {t} segment tests",
            n0 = edges0.len(),
            n1 = edges1.len(),
            t = self.summary.num_tests
        );
    }
}

/// Check that no two segments of the edges intersect in a point interior
/// to either of them.
pub fn validate_noding(edges: &[Edge]) -> Result<()> {
    let li = RobustLineIntersector::new();
    let tree = segment_tree(edges);
    for (e0, s0, e1, s1) in candidate_pairs(edges, &tree) {
        if (e0, s0) >= (e1, s1) {
            continue;
        }
        let (a, b) = (&edges[e0], &edges[e1]);
        let isec = li.intersect(a.coord(s0), a.coord(s0 + 1), b.coord(s1), b.coord(s1 + 1));
        if isec.has_intersection() && isec.is_interior_intersection() {
            return Err(OverlayError::topology(
                "found non-noded intersection",
                isec.intersection(0),
            ));
        }
    }
    Ok(())
}
