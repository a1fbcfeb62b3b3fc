use log::trace;

use super::matrix::IntersectionMatrix;
use crate::{
    error::Result,
    geometry::Dimension,
    geomgraph::{star::label_star, Edge, EdgeEnd, EdgeIntersection, GeometryGraph},
    label::Label,
    BoundaryNodeRule, Location, Position,
};

/// Edge ends leaving a node in the same direction, from any number of
/// edges of either geometry.
#[derive(Debug, Clone)]
pub struct EdgeEndBundle {
    ends: Vec<EdgeEnd>,
    label: Label,
}

impl EdgeEndBundle {
    fn new(end: EdgeEnd) -> Self {
        EdgeEndBundle {
            ends: vec![end],
            label: Label::empty_line(),
        }
    }

    #[inline]
    pub fn ends(&self) -> &[EdgeEnd] {
        &self.ends
    }

    #[inline]
    pub fn label(&self) -> &Label {
        &self.label
    }

    /// Combine the labels of the ends. The `On` location counts boundary
    /// ends through the boundary rule; a side is interior if any area end
    /// has it interior.
    fn compute_label(&mut self, rule: BoundaryNodeRule) {
        let is_area = self.ends.iter().any(|e| e.label().is_area());
        self.label = if is_area {
            Label::empty_area()
        } else {
            Label::empty_line()
        };
        for i in 0..2 {
            self.compute_label_on(i, rule);
            if is_area {
                self.compute_label_side(i, Position::Left);
                self.compute_label_side(i, Position::Right);
            }
        }
    }

    fn compute_label_on(&mut self, geom_index: usize, rule: BoundaryNodeRule) {
        let mut boundary_count = 0;
        let mut found_interior = false;
        for e in &self.ends {
            match e.label().on(geom_index) {
                Location::Boundary => boundary_count += 1,
                Location::Interior => found_interior = true,
                _ => {}
            }
        }
        let loc = if boundary_count > 0 {
            if rule.is_in_boundary(boundary_count) {
                Location::Boundary
            } else {
                Location::Interior
            }
        } else if found_interior {
            Location::Interior
        } else {
            Location::Unknown
        };
        self.label.set_on(geom_index, loc);
    }

    fn compute_label_side(&mut self, geom_index: usize, side: Position) {
        for e in self.ends.iter().filter(|e| e.label().is_area()) {
            match e.label().location(geom_index, side) {
                Location::Interior => {
                    self.label.set_location(geom_index, side, Location::Interior);
                    return;
                }
                Location::Exterior => {
                    self.label.set_location(geom_index, side, Location::Exterior);
                }
                _ => {}
            }
        }
    }
}

/// Contribute the locations of an edge label to the matrix: the edge
/// itself is one dimensional, the sides of area edges two dimensional.
pub(crate) fn update_im_from_label(label: &Label, im: &mut IntersectionMatrix) {
    im.set_at_least(label.on(0), label.on(1), Dimension::OneDimensional);
    if label.is_area() {
        for side in [Position::Left, Position::Right] {
            im.set_at_least(
                label.location(0, side),
                label.location(1, side),
                Dimension::TwoDimensional,
            );
        }
    }
}

/// The bundles around a relate node, in counter-clockwise order.
#[derive(Debug, Clone, Default)]
pub struct EdgeEndBundleStar {
    bundles: Vec<EdgeEndBundle>,
}

impl EdgeEndBundleStar {
    #[inline]
    pub fn bundles(&self) -> &[EdgeEndBundle] {
        &self.bundles
    }

    /// Add an end to the bundle of its direction, creating it if needed.
    pub fn insert(&mut self, end: EdgeEnd) {
        match self
            .bundles
            .binary_search_by(|b| b.ends[0].compare_direction(&end))
        {
            Ok(idx) => self.bundles[idx].ends.push(end),
            Err(idx) => self.bundles.insert(idx, EdgeEndBundle::new(end)),
        }
    }

    pub fn compute_labelling(&mut self, graphs: [&GeometryGraph; 2], rule: BoundaryNodeRule) -> Result<()> {
        let coord = match self.bundles.first() {
            Some(b) => b.ends[0].coord(),
            None => return Ok(()),
        };
        for bundle in &mut self.bundles {
            bundle.compute_label(rule);
        }
        let mut labels: Vec<Label> = self.bundles.iter().map(|b| b.label).collect();
        label_star(&mut labels, coord, graphs)?;
        for (bundle, label) in self.bundles.iter_mut().zip(labels) {
            bundle.label = label;
        }
        trace!("relate star at {coord:?}: {n} bundles", n = self.bundles.len());
        Ok(())
    }

    pub fn update_im(&self, im: &mut IntersectionMatrix) {
        for bundle in &self.bundles {
            update_im_from_label(&bundle.label, im);
        }
    }
}

/// The end of `edge` arriving at `curr` from the previous vertex or
/// intersection.
fn edge_end_for_prev(
    edge_index: usize,
    edge: &Edge,
    curr: &EdgeIntersection,
    prev: Option<&EdgeIntersection>,
) -> Result<Option<EdgeEnd>> {
    let mut i_prev = curr.segment_index;
    if curr.dist == 0.0 {
        if i_prev == 0 {
            return Ok(None);
        }
        i_prev -= 1;
    }
    let p_prev = match prev {
        Some(p) if p.segment_index >= i_prev => p.coord,
        _ => edge.coord(i_prev),
    };
    EdgeEnd::new(edge_index, curr.coord, p_prev, edge.label().flipped()).map(Some)
}

/// The end of `edge` leaving `curr` towards the next vertex or
/// intersection.
fn edge_end_for_next(
    edge_index: usize,
    edge: &Edge,
    curr: &EdgeIntersection,
    next: Option<&EdgeIntersection>,
) -> Result<Option<EdgeEnd>> {
    let i_next = curr.segment_index + 1;
    let p_next = match next {
        Some(n) if n.segment_index == curr.segment_index => n.coord,
        _ if i_next < edge.num_points() => edge.coord(i_next),
        _ => return Ok(None),
    };
    EdgeEnd::new(edge_index, curr.coord, p_next, *edge.label()).map(Some)
}

/// Every edge end of `edge`, at both sides of each of its intersections.
/// The edge's endpoints must already be in its intersection list.
pub(crate) fn compute_edge_ends(edge_index: usize, edge: &Edge, out: &mut Vec<EdgeEnd>) -> Result<()> {
    let ints: Vec<EdgeIntersection> = edge.intersections().iter().collect();
    for (i, curr) in ints.iter().enumerate() {
        let prev = i.checked_sub(1).map(|j| &ints[j]);
        let next = ints.get(i + 1);
        out.extend(edge_end_for_prev(edge_index, edge, curr, prev)?);
        out.extend(edge_end_for_next(edge_index, edge, curr, next)?);
    }
    Ok(())
}
