use std::{
    cmp::Ordering,
    collections::{btree_map::Entry, BTreeMap},
};

use geo::Coordinate;
use log::trace;
use rstar::AABB;

use crate::{
    error::{OverlayError, Result},
    intersector::SegmentIntersection,
    kernel::remove_repeated_points,
    label::{Depth, Label},
    ord_coord::OrdCoord,
};

/// A point where an edge is intersected, located by the segment it lies
/// on and its distance along that segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeIntersection {
    pub coord: Coordinate<f64>,
    pub segment_index: usize,
    pub dist: f64,
}

impl EdgeIntersection {
    /// Whether this is the first or last point of an edge whose last
    /// segment is `max_segment_index`.
    pub fn is_endpoint(&self, max_segment_index: usize) -> bool {
        (self.segment_index == 0 && self.dist == 0.0) || self.segment_index == max_segment_index
    }
}

/// Ordering key of an [`EdgeIntersection`]: by segment, then by distance.
#[derive(Debug, Clone, Copy)]
struct IntersectionKey {
    segment_index: usize,
    dist: f64,
}

impl PartialEq for IntersectionKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for IntersectionKey {}

impl PartialOrd for IntersectionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IntersectionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.segment_index
            .cmp(&other.segment_index)
            .then_with(|| self.dist.total_cmp(&other.dist))
    }
}

/// Intersections of an edge, ordered along the edge.
#[derive(Debug, Clone, Default)]
pub struct EdgeIntersectionList {
    nodes: BTreeMap<IntersectionKey, Coordinate<f64>>,
}

impl EdgeIntersectionList {
    /// Add an intersection. Duplicates (same segment and distance) are
    /// ignored.
    pub fn add(&mut self, coord: Coordinate<f64>, segment_index: usize, dist: f64) {
        self.nodes
            .entry(IntersectionKey { segment_index, dist })
            .or_insert(coord);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = EdgeIntersection> + '_ {
        self.nodes.iter().map(|(key, coord)| EdgeIntersection {
            coord: *coord,
            segment_index: key.segment_index,
            dist: key.dist,
        })
    }

    pub fn contains(&self, coord: Coordinate<f64>) -> bool {
        self.nodes.values().any(|c| *c == coord)
    }
}

/// An edge of a topology graph: a line or ring of an input geometry, or a
/// piece of one after splitting.
#[derive(Debug, Clone)]
pub struct Edge {
    coords: Vec<Coordinate<f64>>,
    label: Label,
    depth: Depth,
    intersections: EdgeIntersectionList,
    is_isolated: bool,
    in_result: bool,
    covered: Option<bool>,
}

impl Edge {
    pub fn new(coords: Vec<Coordinate<f64>>, label: Label) -> Self {
        debug_assert!(coords.len() >= 2, "edge needs at least two points");
        Edge {
            coords,
            label,
            depth: Depth::default(),
            intersections: EdgeIntersectionList::default(),
            is_isolated: true,
            in_result: false,
            covered: None,
        }
    }

    #[inline]
    pub fn coords(&self) -> &[Coordinate<f64>] {
        &self.coords
    }

    #[inline]
    pub fn coord(&self, i: usize) -> Coordinate<f64> {
        self.coords[i]
    }

    #[inline]
    pub fn num_points(&self) -> usize {
        self.coords.len()
    }

    #[inline]
    pub fn max_segment_index(&self) -> usize {
        self.coords.len() - 1
    }

    pub fn is_closed(&self) -> bool {
        self.coords.first() == self.coords.last()
    }

    #[inline]
    pub fn label(&self) -> &Label {
        &self.label
    }

    #[inline]
    pub fn label_mut(&mut self) -> &mut Label {
        &mut self.label
    }

    #[inline]
    pub fn depth(&self) -> &Depth {
        &self.depth
    }

    #[inline]
    pub fn depth_mut(&mut self) -> &mut Depth {
        &mut self.depth
    }

    /// `true` until an intersection with the other input is recorded.
    #[inline]
    pub fn is_isolated(&self) -> bool {
        self.is_isolated
    }

    #[inline]
    pub fn set_isolated(&mut self, isolated: bool) {
        self.is_isolated = isolated;
    }

    #[inline]
    pub fn in_result(&self) -> bool {
        self.in_result
    }

    #[inline]
    pub fn set_in_result(&mut self, in_result: bool) {
        self.in_result = in_result;
    }

    #[inline]
    pub fn is_covered(&self) -> bool {
        self.covered == Some(true)
    }

    #[inline]
    pub fn is_covered_set(&self) -> bool {
        self.covered.is_some()
    }

    #[inline]
    pub fn set_covered(&mut self, covered: bool) {
        self.covered = Some(covered);
    }

    #[inline]
    pub fn intersections(&self) -> &EdgeIntersectionList {
        &self.intersections
    }

    pub fn envelope(&self) -> AABB<[f64; 2]> {
        let first = [self.coords[0].x, self.coords[0].y];
        let (min, max) = self.coords.iter().fold((first, first), |(min, max), c| {
            ([min[0].min(c.x), min[1].min(c.y)], [max[0].max(c.x), max[1].max(c.y)])
        });
        AABB::from_corners(min, max)
    }

    /// Same coordinates in the same order.
    pub fn is_pointwise_equal(&self, other: &Edge) -> bool {
        self.coords == other.coords
    }

    /// Record the intersection points of `isec` that lie on segment
    /// `segment_index` of this edge (input `input_index` of `isec`).
    pub fn add_intersections(
        &mut self,
        isec: &SegmentIntersection,
        segment_index: usize,
        input_index: usize,
    ) {
        for i in 0..isec.intersection_num() {
            self.add_intersection(isec, segment_index, input_index, i);
        }
    }

    fn add_intersection(
        &mut self,
        isec: &SegmentIntersection,
        segment_index: usize,
        input_index: usize,
        int_index: usize,
    ) {
        let pt = isec.intersection(int_index);
        let mut seg = segment_index;
        let mut dist = isec.edge_distance(input_index, int_index);

        // A point equal to the next vertex is recorded at the start of the
        // next segment so each location has a single key.
        let next = seg + 1;
        if next < self.coords.len() && pt == self.coords[next] {
            seg = next;
            dist = 0.0;
        }
        self.intersections.add(pt, seg, dist);
    }

    #[cfg(test)]
    pub(crate) fn add_intersection_point(&mut self, coord: Coordinate<f64>, segment_index: usize, dist: f64) {
        self.intersections.add(coord, segment_index, dist);
    }

    /// Add both endpoints to the intersection list.
    pub fn add_endpoints(&mut self) {
        let max = self.max_segment_index();
        let first = self.coords[0];
        let last = self.coords[max];
        self.intersections.add(first, 0, 0.0);
        self.intersections.add(last, max, 0.0);
    }

    /// Split this edge at every recorded intersection. Every split edge
    /// carries a copy of this edge's label.
    pub fn split_edges(&mut self) -> Result<Vec<Edge>> {
        self.add_endpoints();
        let ints: Vec<_> = self.intersections.iter().collect();
        let mut out = Vec::with_capacity(ints.len().saturating_sub(1));
        for pair in ints.windows(2) {
            out.push(self.split_edge(&pair[0], &pair[1])?);
        }
        trace!("split edge of {} points into {}", self.coords.len(), out.len());
        Ok(out)
    }

    fn split_edge(&self, ei0: &EdgeIntersection, ei1: &EdgeIntersection) -> Result<Edge> {
        let last_seg_start = self.coords[ei1.segment_index];
        // The end point is a vertex unless it lies inside its segment.
        let use_int_pt1 = ei1.dist > 0.0 || ei1.coord != last_seg_start;

        let mut pts = Vec::with_capacity(ei1.segment_index - ei0.segment_index + 2);
        pts.push(ei0.coord);
        pts.extend_from_slice(&self.coords[ei0.segment_index + 1..=ei1.segment_index]);
        if use_int_pt1 {
            pts.push(ei1.coord);
        }

        let pts = remove_repeated_points(&pts);
        if pts.len() < 2 {
            return Err(OverlayError::topology("split edge collapsed to a point", ei0.coord));
        }
        Ok(Edge::new(pts, self.label))
    }

    /// An area edge that has collapsed to a back-and-forth line.
    pub fn is_collapsed(&self) -> bool {
        self.label.is_area() && self.coords.len() == 3 && self.coords[0] == self.coords[2]
    }

    /// The line edge replacing a collapsed area edge.
    pub fn collapsed_edge(&self) -> Edge {
        Edge::new(vec![self.coords[0], self.coords[1]], self.label.to_line_label())
    }
}

/// Edges keyed by their coordinate sequence, ignoring direction.
#[derive(Debug, Default)]
pub struct EdgeList {
    edges: Vec<Edge>,
    index: BTreeMap<Vec<OrdCoord>, usize>,
}

/// Whether the sequence reads "increasing" forwards, comparing points
/// from both ends.
fn is_increasing_direction(pts: &[Coordinate<f64>]) -> bool {
    let n = pts.len();
    for i in 0..n / 2 {
        match OrdCoord(pts[i]).cmp(&OrdCoord(pts[n - 1 - i])) {
            Ordering::Equal => continue,
            ord => return ord == Ordering::Less,
        }
    }
    true
}

fn oriented_key(pts: &[Coordinate<f64>]) -> Vec<OrdCoord> {
    if is_increasing_direction(pts) {
        pts.iter().map(|&c| OrdCoord::from(c)).collect()
    } else {
        pts.iter().rev().map(|&c| OrdCoord::from(c)).collect()
    }
}

impl EdgeList {
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Index of an edge with the same points, in either direction.
    pub fn find_equal(&self, edge: &Edge) -> Option<usize> {
        self.index.get(&oriented_key(edge.coords())).copied()
    }

    pub fn add(&mut self, edge: Edge) {
        let key = oriented_key(edge.coords());
        self.index.insert(key, self.edges.len());
        self.edges.push(edge);
    }

    /// Insert an edge, merging it into an existing equal edge if there is
    /// one. Merged edges accumulate side depths of their labels.
    pub fn insert_unique(&mut self, edge: Edge) {
        match self.index.entry(oriented_key(edge.coords())) {
            Entry::Vacant(v) => {
                v.insert(self.edges.len());
                self.edges.push(edge);
            }
            Entry::Occupied(o) => {
                let existing = &mut self.edges[*o.get()];
                let mut to_merge = *edge.label();
                if !existing.is_pointwise_equal(&edge) {
                    to_merge.flip();
                }
                let existing_label = *existing.label();
                let depth = existing.depth_mut();
                if depth.is_null() {
                    depth.add(&existing_label);
                }
                depth.add(&to_merge);
                existing.label_mut().merge(&to_merge);
                trace!("merged coincident edge: {}", existing.label());
            }
        }
    }

    pub fn get(&self, idx: usize) -> &Edge {
        &self.edges[idx]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Edge> {
        self.edges.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Edge> {
        self.edges.iter_mut()
    }

    pub fn into_edges(self) -> Vec<Edge> {
        self.edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{intersector::RobustLineIntersector, Location};

    fn c(x: f64, y: f64) -> Coordinate<f64> {
        Coordinate { x, y }
    }

    #[test]
    fn test_intersection_normalized_to_vertex() {
        let li = RobustLineIntersector::new();
        let mut edge = Edge::new(vec![c(0., 0.), c(10., 0.), c(10., 10.)], Label::line(0, Location::Interior));
        // Touches the vertex (10, 0) from segment 0.
        let isec = li.intersect(c(0., 0.), c(10., 0.), c(10., 0.), c(20., -5.));
        edge.add_intersections(&isec, 0, 0);
        let ints: Vec<_> = edge.intersections().iter().collect();
        assert_eq!(ints.len(), 1);
        assert_eq!(ints[0].segment_index, 1);
        assert_eq!(ints[0].dist, 0.0);
    }

    #[test]
    fn test_split_edges() {
        let mut edge = Edge::new(vec![c(0., 0.), c(10., 0.), c(10., 10.)], Label::line(0, Location::Interior));
        edge.add_intersection_point(c(5., 0.), 0, 5.);
        edge.add_intersection_point(c(10., 0.), 1, 0.);
        edge.add_intersection_point(c(5., 0.), 0, 5.);
        let splits = edge.split_edges().unwrap();
        let coords: Vec<_> = splits.iter().map(|e| e.coords().to_vec()).collect();
        assert_eq!(
            coords,
            vec![
                vec![c(0., 0.), c(5., 0.)],
                vec![c(5., 0.), c(10., 0.)],
                vec![c(10., 0.), c(10., 10.)],
            ]
        );
        assert!(splits.iter().all(|e| e.label() == edge.label()));
    }

    #[test]
    fn test_unique_edges_merge_reversed() {
        let mut list = EdgeList::default();
        list.insert_unique(Edge::new(
            vec![c(0., 0.), c(10., 0.)],
            Label::area(0, Location::Boundary, Location::Exterior, Location::Interior),
        ));
        list.insert_unique(Edge::new(
            vec![c(10., 0.), c(0., 0.)],
            Label::area(1, Location::Boundary, Location::Exterior, Location::Interior),
        ));
        assert_eq!(list.len(), 1);
        let lbl = list.get(0).label();
        // The reversed edge's sides are flipped before merging.
        assert_eq!(lbl.location(1, crate::Position::Left), Location::Interior);
        assert_eq!(lbl.location(1, crate::Position::Right), Location::Exterior);
        assert!(!list.get(0).depth().is_null());
    }

    #[test]
    fn test_collapsed_edge() {
        let edge = Edge::new(
            vec![c(0., 0.), c(1., 1.), c(0., 0.)],
            Label::area(0, Location::Boundary, Location::Exterior, Location::Interior),
        );
        assert!(edge.is_collapsed());
        let line = edge.collapsed_edge();
        assert_eq!(line.num_points(), 2);
        assert!(!line.label().is_area());
    }
}
