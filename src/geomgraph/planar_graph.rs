use std::cmp::Ordering;

use geo::Coordinate;
use log::{debug, trace};
use smallvec::SmallVec;

use super::{star::label_star, Edge, EdgeEnd, GeometryGraph, NodeMap};
use crate::{
    error::{OverlayError, Result},
    label::Label,
    Location, Position,
};

/// Id of the oppositely directed edge. Directed edges are created in
/// pairs, so the pair differs only in the lowest bit.
#[inline]
pub fn sym(de: usize) -> usize {
    de ^ 1
}

/// One direction of an [`Edge`] in the overlay graph.
#[derive(Debug, Clone)]
pub struct DirectedEdge {
    end: EdgeEnd,
    is_forward: bool,
    node: usize,
    pub(crate) next: Option<usize>,
    pub(crate) next_min: Option<usize>,
    pub(crate) edge_ring: Option<usize>,
    pub(crate) min_edge_ring: Option<usize>,
    pub(crate) in_result: bool,
    pub(crate) visited: bool,
}

impl DirectedEdge {
    #[inline]
    pub fn edge(&self) -> usize {
        self.end.edge()
    }

    #[inline]
    pub fn is_forward(&self) -> bool {
        self.is_forward
    }

    /// The origin node.
    #[inline]
    pub fn node(&self) -> usize {
        self.node
    }

    #[inline]
    pub fn coord(&self) -> Coordinate<f64> {
        self.end.coord()
    }

    #[inline]
    pub fn label(&self) -> &Label {
        self.end.label()
    }

    #[inline]
    pub fn label_mut(&mut self) -> &mut Label {
        self.end.label_mut()
    }

    #[inline]
    pub fn in_result(&self) -> bool {
        self.in_result
    }

    #[inline]
    pub fn is_visited(&self) -> bool {
        self.visited
    }

    pub fn compare_direction(&self, other: &DirectedEdge) -> Ordering {
        self.end.compare_direction(&other.end)
    }

    /// A line edge of some geometry that is not inside any area.
    pub fn is_line_edge(&self) -> bool {
        let label = self.label();
        let is_line = label.is_line(0) || label.is_line(1);
        let exterior_if_area =
            |i: usize| !label.is_area_for(i) || label.all_positions_equal(i, Location::Exterior);
        is_line && exterior_if_area(0) && exterior_if_area(1)
    }

    /// Both sides lie in the interior of both areas.
    pub fn is_interior_area_edge(&self) -> bool {
        let label = self.label();
        (0..2).all(|i| {
            label.is_area_for(i)
                && label.location(i, Position::Left) == Location::Interior
                && label.location(i, Position::Right) == Location::Interior
        })
    }
}

/// Directed edge ids around a node; most nodes have low degree.
type StarEdges = SmallVec<[usize; 4]>;

/// Node data of the overlay graph: the outgoing directed edges in
/// counter-clockwise order.
#[derive(Debug, Clone, Default)]
pub struct DirectedEdgeStar {
    edges: StarEdges,
    label: Label,
    result_area_edges: StarEdges,
}

impl DirectedEdgeStar {
    #[inline]
    pub fn edges(&self) -> &[usize] {
        &self.edges
    }

    #[inline]
    pub fn degree(&self) -> usize {
        self.edges.len()
    }

    /// Summary label: a geometry is interior at the node if any incident
    /// edge is on it.
    #[inline]
    pub fn label(&self) -> &Label {
        &self.label
    }

    #[inline]
    pub fn result_area_edges(&self) -> &[usize] {
        &self.result_area_edges
    }
}

/// The merged topology graph used by overlay.
#[derive(Debug, Default)]
pub struct PlanarGraph {
    edges: Vec<Edge>,
    dir_edges: Vec<DirectedEdge>,
    nodes: NodeMap<DirectedEdgeStar>,
}

impl PlanarGraph {
    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[inline]
    pub fn edge(&self, id: usize) -> &Edge {
        &self.edges[id]
    }

    #[inline]
    pub fn edge_mut(&mut self, id: usize) -> &mut Edge {
        &mut self.edges[id]
    }

    #[inline]
    pub fn dir_edges(&self) -> &[DirectedEdge] {
        &self.dir_edges
    }

    #[inline]
    pub fn dir_edge(&self, id: usize) -> &DirectedEdge {
        &self.dir_edges[id]
    }

    #[inline]
    pub fn dir_edge_mut(&mut self, id: usize) -> &mut DirectedEdge {
        &mut self.dir_edges[id]
    }

    #[inline]
    pub fn nodes(&self) -> &NodeMap<DirectedEdgeStar> {
        &self.nodes
    }

    #[inline]
    pub fn nodes_mut(&mut self) -> &mut NodeMap<DirectedEdgeStar> {
        &mut self.nodes
    }

    pub fn add_node(&mut self, coord: Coordinate<f64>) -> usize {
        self.nodes.add_node(coord)
    }

    /// Add edges together with a directed edge in each direction.
    pub fn add_edges(&mut self, edges: Vec<Edge>) -> Result<()> {
        for edge in edges {
            let id = self.edges.len();
            let n = edge.num_points();
            let forward_label = *edge.label();
            let ends = [
                (edge.coord(0), edge.coord(1), forward_label, true),
                (edge.coord(n - 1), edge.coord(n - 2), forward_label.flipped(), false),
            ];
            self.edges.push(edge);
            for (p0, p1, label, is_forward) in ends {
                let node = self.nodes.add_node(p0);
                let de = DirectedEdge {
                    end: EdgeEnd::new(id, p0, p1, label)?,
                    is_forward,
                    node,
                    next: None,
                    next_min: None,
                    edge_ring: None,
                    min_edge_ring: None,
                    in_result: false,
                    visited: false,
                };
                let de_id = self.dir_edges.len();
                self.dir_edges.push(de);
                self.insert_into_star(node, de_id)?;
            }
        }
        debug!(
            "planar graph: {e} edges, {n} nodes",
            e = self.edges.len(),
            n = self.nodes.len()
        );
        Ok(())
    }

    fn insert_into_star(&mut self, node: usize, de_id: usize) -> Result<()> {
        let dir_edges = &self.dir_edges;
        let new = &dir_edges[de_id];
        let star = &mut self.nodes.get_mut(node).star_mut().edges;
        match star.binary_search_by(|&other| dir_edges[other].compare_direction(new)) {
            Ok(_) => Err(OverlayError::topology(
                "two edges leave a node in the same direction",
                new.coord(),
            )),
            Err(pos) => {
                star.insert(pos, de_id);
                Ok(())
            }
        }
    }

    /// Label every directed edge and node from the two input graphs.
    pub fn compute_labelling(&mut self, graphs: [&GeometryGraph; 2]) -> Result<()> {
        for node_id in self.nodes.ids() {
            let node = self.nodes.get(node_id);
            let coord = node.coord();
            let star_edges = node.star().edges.clone();

            let mut labels: Vec<Label> = star_edges
                .iter()
                .map(|&de| *self.dir_edges[de].label())
                .collect();
            label_star(&mut labels, coord, graphs)?;

            let mut star_label = Label::empty_line();
            for (&de, lbl) in star_edges.iter().zip(labels) {
                *self.dir_edges[de].label_mut() = lbl;
                let edge_label = self.edges[self.dir_edges[de].edge()].label();
                for i in 0..2 {
                    if matches!(edge_label.on(i), Location::Interior | Location::Boundary) {
                        star_label.set_on(i, Location::Interior);
                    }
                }
            }
            self.nodes.get_mut(node_id).star_mut().label = star_label;
        }

        // Each directed edge gets what is known about its sym.
        for de in 0..self.dir_edges.len() {
            let sym_label = *self.dir_edges[sym(de)].label();
            self.dir_edges[de].label_mut().merge(&sym_label);
        }

        for node_id in self.nodes.ids() {
            let node = self.nodes.get_mut(node_id);
            let star_label = node.star().label;
            node.label_mut().merge(&star_label);
        }
        Ok(())
    }

    /// Locate nodes known to only one geometry against the other, then
    /// fill unknown directed edge locations from their node.
    pub fn label_incomplete_nodes(&mut self, graphs: [&GeometryGraph; 2]) {
        for node_id in self.nodes.ids() {
            let node = self.nodes.get_mut(node_id);
            if node.is_isolated() {
                let target = if node.label().is_null(0) { 0 } else { 1 };
                let loc = graphs[target].locate(node.coord());
                trace!("isolated node {c:?} is {loc:?} in {target}", c = node.coord());
                node.set_location(target, loc);
            }
            let label = *node.label();
            for &de in &node.star().edges {
                let de_label = self.dir_edges[de].label_mut();
                de_label.set_all_locations_if_unknown(0, label.on(0));
                de_label.set_all_locations_if_unknown(1, label.on(1));
            }
        }
    }

    /// Link the result area edges at a node into rings: each incoming
    /// result edge is linked to the next outgoing result edge
    /// counter-clockwise.
    pub fn link_result_directed_edges(&mut self) -> Result<()> {
        for node_id in self.nodes.ids() {
            let node = self.nodes.get(node_id);
            let coord = node.coord();
            let result_edges: StarEdges = node
                .star()
                .edges
                .iter()
                .copied()
                .filter(|&de| self.dir_edges[de].in_result || self.dir_edges[sym(de)].in_result)
                .collect();

            let mut first_out = None;
            let mut incoming: Option<usize> = None;
            for &next_out in &result_edges {
                let next_in = sym(next_out);
                if !self.dir_edges[next_out].label().is_area() {
                    continue;
                }
                if first_out.is_none() && self.dir_edges[next_out].in_result {
                    first_out = Some(next_out);
                }
                match incoming {
                    None => {
                        if self.dir_edges[next_in].in_result {
                            incoming = Some(next_in);
                        }
                    }
                    Some(inc) => {
                        if self.dir_edges[next_out].in_result {
                            self.dir_edges[inc].next = Some(next_out);
                            incoming = None;
                        }
                    }
                }
            }
            if let Some(inc) = incoming {
                let first = first_out
                    .ok_or_else(|| OverlayError::topology("no outgoing dirEdge found", coord))?;
                self.dir_edges[inc].next = Some(first);
            }
            self.nodes.get_mut(node_id).star_mut().result_area_edges = result_edges;
        }
        Ok(())
    }

    /// Number of outgoing edges at `node` in the maximal ring `ring`.
    pub fn outgoing_degree(&self, node: usize, ring: usize) -> usize {
        self.nodes
            .get(node)
            .star()
            .edges
            .iter()
            .filter(|&&de| self.dir_edges[de].edge_ring == Some(ring))
            .count()
    }

    /// Link the edges of maximal ring `ring` at `node` into minimal rings,
    /// scanning the star clockwise.
    pub fn link_minimal_directed_edges(&mut self, node: usize, ring: usize) -> Result<()> {
        let coord = self.nodes.get(node).coord();
        let result_edges = self.nodes.get(node).star().result_area_edges.clone();
        let mut first_out = None;
        let mut incoming: Option<usize> = None;
        for &next_out in result_edges.iter().rev() {
            let next_in = sym(next_out);
            if first_out.is_none() && self.dir_edges[next_out].edge_ring == Some(ring) {
                first_out = Some(next_out);
            }
            match incoming {
                None => {
                    if self.dir_edges[next_in].edge_ring == Some(ring) {
                        incoming = Some(next_in);
                    }
                }
                Some(inc) => {
                    if self.dir_edges[next_out].edge_ring == Some(ring) {
                        self.dir_edges[inc].next_min = Some(next_out);
                        incoming = None;
                    }
                }
            }
        }
        if let Some(inc) = incoming {
            let first = first_out.ok_or_else(|| {
                OverlayError::topology("found null for first outgoing dirEdge", coord)
            })?;
            self.dir_edges[inc].next_min = Some(first);
        }
        Ok(())
    }

    /// Some edge at the node is part of the result.
    pub fn is_incident_edge_in_result(&self, node: usize) -> bool {
        self.nodes
            .get(node)
            .star()
            .edges
            .iter()
            .any(|&de| self.edges[self.dir_edges[de].edge()].in_result())
    }

    /// Mark a directed edge and its sym as visited.
    pub fn set_visited_edge(&mut self, de: usize, visited: bool) {
        self.dir_edges[de].visited = visited;
        self.dir_edges[sym(de)].visited = visited;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: f64, y: f64) -> Coordinate<f64> {
        Coordinate { x, y }
    }

    fn area_edge(pts: &[(f64, f64)]) -> Edge {
        Edge::new(
            pts.iter().map(|&(x, y)| c(x, y)).collect(),
            Label::area(0, Location::Boundary, Location::Exterior, Location::Interior),
        )
    }

    #[test]
    fn test_add_edges_builds_sorted_stars() {
        let mut graph = PlanarGraph::default();
        graph
            .add_edges(vec![
                area_edge(&[(0., 0.), (0., 10.)]),
                area_edge(&[(0., 0.), (10., 0.)]),
                area_edge(&[(-5., -5.), (0., 0.)]),
            ])
            .unwrap();
        assert_eq!(graph.dir_edges().len(), 6);
        assert_eq!(sym(4), 5);

        let node = graph.nodes().find(c(0., 0.)).unwrap();
        let star = graph.nodes().get(node).star().edges().to_vec();
        let dirs: Vec<_> = star
            .iter()
            .map(|&de| graph.dir_edge(de).end.direction_coord())
            .collect();
        assert_eq!(dirs, vec![c(10., 0.), c(0., 10.), c(-5., -5.)]);

        // The backward edge carries the flipped label.
        let back = graph.dir_edge(5);
        assert!(!back.is_forward());
        assert_eq!(back.label().location(0, Position::Left), Location::Interior);
    }

    #[test]
    fn test_duplicate_direction_is_error() {
        let mut graph = PlanarGraph::default();
        let err = graph
            .add_edges(vec![
                area_edge(&[(0., 0.), (10., 0.)]),
                area_edge(&[(0., 0.), (5., 0.), (5., 5.)]),
            ])
            .unwrap_err();
        assert!(err.is_topology());
    }
}
