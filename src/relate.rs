//! DE-9IM relationships between two geometries.
//!
//! The inputs are noded against each other as for overlay, but instead of
//! merging the split edges into one graph, the ends of every edge are
//! bundled by direction at each node. Labelling the nodes and bundles
//! then gives every kind of intersection between interiors, boundaries
//! and exteriors present in the inputs, which is recorded in an
//! [`IntersectionMatrix`].
//!
//! ```rust
//! use geo::Geometry;
//! use geo_overlay::{relate, touches};
//! use wkt::TryFromWkt;
//!
//! let a = Geometry::try_from_wkt_str("POLYGON((0 0,10 0,10 10,0 10,0 0))").unwrap();
//! let b = Geometry::try_from_wkt_str("POLYGON((10 0,20 0,20 10,10 10,10 0))").unwrap();
//! assert_eq!(relate(&a, &b).unwrap().to_string(), "FF2F11212");
//! assert!(touches(&a, &b).unwrap());
//! ```
use geo::Geometry;
use log::debug;

use crate::{
    error::Result,
    geometry::{boundary_dimension, dimension, envelope, envelopes_intersect, is_empty, reject_collection, Dimension},
    geomgraph::{GeometryGraph, IntersectionSummary, NodeMap},
    intersector::RobustLineIntersector,
    BoundaryNodeRule, Location,
};

mod matrix;
pub use matrix::IntersectionMatrix;

mod bundle;
pub use bundle::{EdgeEndBundle, EdgeEndBundleStar};
use bundle::{compute_edge_ends, update_im_from_label};

/// Computes the intersection matrix of two geometries.
#[derive(Debug)]
pub struct RelateComputer {
    args: [GeometryGraph; 2],
    rule: BoundaryNodeRule,
    li: RobustLineIntersector,
    nodes: NodeMap<EdgeEndBundleStar>,
    /// Edges meeting nothing of the other geometry, as (input, edge).
    isolated_edges: Vec<(usize, usize)>,
}

impl RelateComputer {
    pub fn new(a: &Geometry<f64>, b: &Geometry<f64>, rule: BoundaryNodeRule) -> Result<Self> {
        reject_collection(a, "relate")?;
        reject_collection(b, "relate")?;
        Ok(RelateComputer {
            args: [GeometryGraph::new(0, a, rule)?, GeometryGraph::new(1, b, rule)?],
            rule,
            li: RobustLineIntersector::new(),
            nodes: NodeMap::default(),
            isolated_edges: vec![],
        })
    }

    pub fn compute_im(mut self) -> Result<IntersectionMatrix> {
        let mut im = IntersectionMatrix::default();
        im.set(Location::Exterior, Location::Exterior, Dimension::TwoDimensional);

        let overlapping = match (envelope(self.args[0].geometry()), envelope(self.args[1].geometry())) {
            (Some(a), Some(b)) => envelopes_intersect(&a, &b),
            _ => false,
        };
        if !overlapping {
            self.compute_disjoint_im(&mut im);
            debug!("relate: disjoint envelopes, {im}");
            return Ok(im);
        }

        let [arg0, arg1] = &mut self.args;
        arg0.compute_self_nodes(&self.li, false);
        arg1.compute_self_nodes(&self.li, false);
        // Proper intersections are only noted, they are not needed as nodes.
        let summary = arg0.compute_edge_intersections(arg1, &self.li, false);

        self.compute_intersection_nodes(0);
        self.compute_intersection_nodes(1);
        self.copy_nodes_and_labels(0);
        self.copy_nodes_and_labels(1);
        self.label_isolated_nodes();

        self.compute_proper_intersection_im(&summary, &mut im)?;

        for arg_index in 0..2 {
            self.insert_edge_ends(arg_index)?;
        }
        let graphs = [&self.args[0], &self.args[1]];
        for id in self.nodes.ids() {
            self.nodes
                .get_mut(id)
                .star_mut()
                .compute_labelling(graphs, self.rule)?;
        }
        self.label_isolated_edges(0, 1);
        self.label_isolated_edges(1, 0);

        self.update_im(&mut im);
        debug!("relate: {n} nodes, {im}", n = self.nodes.len());
        Ok(im)
    }

    fn compute_disjoint_im(&self, im: &mut IntersectionMatrix) {
        let ga = self.args[0].geometry();
        if !is_empty(ga) {
            im.set(Location::Interior, Location::Exterior, dimension(ga));
            im.set(Location::Boundary, Location::Exterior, boundary_dimension(ga, self.rule));
        }
        let gb = self.args[1].geometry();
        if !is_empty(gb) {
            im.set(Location::Exterior, Location::Interior, dimension(gb));
            im.set(Location::Exterior, Location::Boundary, boundary_dimension(gb, self.rule));
        }
    }

    /// Add a node for every intersection found on the edges of one input.
    /// Intersections on area edges are on the area boundary.
    fn compute_intersection_nodes(&mut self, arg_index: usize) {
        for edge in self.args[arg_index].edges() {
            let on_boundary = edge.label().on(arg_index) == Location::Boundary;
            for ei in edge.intersections().iter() {
                let id = self.nodes.add_node(ei.coord);
                let node = self.nodes.get_mut(id);
                if on_boundary {
                    node.set_location(arg_index, Location::Boundary);
                } else if node.label().is_null(arg_index) {
                    node.set_location(arg_index, Location::Interior);
                }
            }
        }
    }

    /// Copy the nodes of one input graph, their labels taking precedence.
    fn copy_nodes_and_labels(&mut self, arg_index: usize) {
        for node in self.args[arg_index].nodes().iter() {
            let id = self.nodes.add_node(node.coord());
            self.nodes
                .get_mut(id)
                .set_location(arg_index, node.label().on(arg_index));
        }
    }

    /// Locate nodes known to only one input against the other.
    fn label_isolated_nodes(&mut self) {
        for id in self.nodes.ids() {
            let node = self.nodes.get_mut(id);
            debug_assert!(node.label().geometry_count() > 0, "node with empty label");
            if node.is_isolated() {
                let target = if node.label().is_null(0) { 0 } else { 1 };
                let loc = self.args[target].locate(node.coord());
                node.label_mut().set_all_locations(target, loc);
            }
        }
    }

    /// Proper intersections fix some entries without further labelling.
    fn compute_proper_intersection_im(
        &self,
        summary: &IntersectionSummary,
        im: &mut IntersectionMatrix,
    ) -> Result<()> {
        use Dimension::*;
        let dim_a = dimension(self.args[0].geometry());
        let dim_b = dimension(self.args[1].geometry());
        let (proper, proper_interior) = (summary.has_proper, summary.has_proper_interior);
        match (dim_a, dim_b) {
            (TwoDimensional, TwoDimensional) => {
                if proper {
                    im.set_at_least_pattern("212101212")?;
                }
            }
            (TwoDimensional, OneDimensional) => {
                if proper {
                    im.set_at_least_pattern("FFF0FFFF2")?;
                }
                if proper_interior {
                    im.set_at_least_pattern("1FFFFF1FF")?;
                }
            }
            (OneDimensional, TwoDimensional) => {
                if proper {
                    im.set_at_least_pattern("F0FFFFFF2")?;
                }
                if proper_interior {
                    im.set_at_least_pattern("1F1FFFFFF")?;
                }
            }
            (OneDimensional, OneDimensional) => {
                if proper_interior {
                    im.set_at_least_pattern("0FFFFFFFF")?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn insert_edge_ends(&mut self, arg_index: usize) -> Result<()> {
        let graph = &mut self.args[arg_index];
        graph.add_edge_endpoints();
        let mut ends = vec![];
        for (i, edge) in graph.edges().iter().enumerate() {
            compute_edge_ends(i, edge, &mut ends)?;
        }
        for end in ends {
            let id = self.nodes.add_node(end.coord());
            self.nodes.get_mut(id).star_mut().insert(end);
        }
        Ok(())
    }

    /// Label edges of `this_index` touching nothing of the other input by
    /// locating one of their points.
    fn label_isolated_edges(&mut self, this_index: usize, target_index: usize) {
        let target = &self.args[target_index];
        let target_dim = dimension(target.geometry());
        let located: Vec<(usize, Location)> = self.args[this_index]
            .edges()
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_isolated())
            .map(|(i, e)| {
                let loc = if target_dim > Dimension::ZeroDimensional {
                    target.locate(e.coord(0))
                } else {
                    Location::Exterior
                };
                (i, loc)
            })
            .collect();
        let edges = self.args[this_index].edges_mut();
        for (i, loc) in located {
            edges[i].label_mut().set_all_locations(target_index, loc);
            self.isolated_edges.push((this_index, i));
        }
    }

    fn update_im(&self, im: &mut IntersectionMatrix) {
        for &(arg_index, i) in &self.isolated_edges {
            update_im_from_label(self.args[arg_index].edges()[i].label(), im);
        }
        for node in self.nodes.iter() {
            let label = node.label();
            im.set_at_least(label.on(0), label.on(1), Dimension::ZeroDimensional);
            node.star().update_im(im);
        }
    }
}

/// The intersection matrix of `a` and `b` under the Mod-2 boundary rule.
pub fn relate(a: &Geometry<f64>, b: &Geometry<f64>) -> Result<IntersectionMatrix> {
    relate_with_rule(a, b, BoundaryNodeRule::default())
}

pub fn relate_with_rule(
    a: &Geometry<f64>,
    b: &Geometry<f64>,
    rule: BoundaryNodeRule,
) -> Result<IntersectionMatrix> {
    RelateComputer::new(a, b, rule)?.compute_im()
}

/// Topological equality. Two empty geometries are equal.
pub fn equals(a: &Geometry<f64>, b: &Geometry<f64>) -> Result<bool> {
    reject_collection(a, "relate")?;
    reject_collection(b, "relate")?;
    if is_empty(a) && is_empty(b) {
        return Ok(true);
    }
    Ok(relate(a, b)?.is_equals(dimension(a), dimension(b)))
}

pub fn disjoint(a: &Geometry<f64>, b: &Geometry<f64>) -> Result<bool> {
    Ok(relate(a, b)?.is_disjoint())
}

pub fn intersects(a: &Geometry<f64>, b: &Geometry<f64>) -> Result<bool> {
    Ok(relate(a, b)?.is_intersects())
}

pub fn touches(a: &Geometry<f64>, b: &Geometry<f64>) -> Result<bool> {
    Ok(relate(a, b)?.is_touches(dimension(a), dimension(b)))
}

pub fn crosses(a: &Geometry<f64>, b: &Geometry<f64>) -> Result<bool> {
    Ok(relate(a, b)?.is_crosses(dimension(a), dimension(b)))
}

pub fn overlaps(a: &Geometry<f64>, b: &Geometry<f64>) -> Result<bool> {
    Ok(relate(a, b)?.is_overlaps(dimension(a), dimension(b)))
}

/// Whether `a` lies within `b`.
pub fn within(a: &Geometry<f64>, b: &Geometry<f64>) -> Result<bool> {
    Ok(relate(a, b)?.is_within())
}

/// Whether `a` contains `b`.
pub fn contains(a: &Geometry<f64>, b: &Geometry<f64>) -> Result<bool> {
    Ok(relate(a, b)?.is_contains())
}

pub fn covers(a: &Geometry<f64>, b: &Geometry<f64>) -> Result<bool> {
    Ok(relate(a, b)?.is_covers())
}

pub fn covered_by(a: &Geometry<f64>, b: &Geometry<f64>) -> Result<bool> {
    Ok(relate(a, b)?.is_covered_by())
}

#[cfg(test)]
mod tests {
    use wkt::TryFromWkt;

    use super::*;
    use crate::{error::OverlayError, tests::init_log};

    fn geom(wkt: &str) -> Geometry<f64> {
        Geometry::try_from_wkt_str(wkt).unwrap()
    }

    fn check_relate(wkt1: &str, wkt2: &str, expected: &str) {
        init_log();
        let (a, b) = (geom(wkt1), geom(wkt2));
        let im = relate(&a, &b).unwrap();
        assert_eq!(im.to_string(), expected, "relate({wkt1}, {wkt2})");
        // Swapping the arguments transposes the matrix.
        assert_eq!(relate(&b, &a).unwrap(), im.transpose());
    }

    const SQUARE: &str = "POLYGON((0 0,10 0,10 10,0 10,0 0))";

    #[test]
    fn test_polygons() {
        check_relate(SQUARE, "POLYGON((5 5,15 5,15 15,5 15,5 5))", "212101212");
        check_relate(SQUARE, "POLYGON((10 0,20 0,20 10,10 10,10 0))", "FF2F11212");
        check_relate(SQUARE, "POLYGON((10 10,20 10,20 20,10 20,10 10))", "FF2F01212");
        check_relate(SQUARE, "POLYGON((2 2,8 2,8 8,2 8,2 2))", "212FF1FF2");
        check_relate(SQUARE, "POLYGON((0 0,0 10,10 10,10 0,0 0))", "2FFF1FFF2");
    }

    #[test]
    fn test_disjoint_envelopes() {
        check_relate(SQUARE, "LINESTRING(20 20,30 30)", "FF2FF1102");
        check_relate("LINESTRING(20 20,30 20,30 30,20 20)", SQUARE, "FF1FFF212");
        check_relate("POINT(20 20)", SQUARE, "FF0FFF212");
    }

    #[test]
    fn test_lines() {
        // Crossing in a point.
        check_relate("LINESTRING(0 0,10 10)", "LINESTRING(0 10,10 0)", "0F1FF0102");
        // Shared endpoint.
        check_relate("LINESTRING(0 0,10 10)", "LINESTRING(10 10,20 0)", "FF1F00102");
        // Overlapping in a segment.
        check_relate("LINESTRING(0 0,10 0)", "LINESTRING(5 0,15 0)", "1010F0102");
        // A line through a polygon.
        check_relate("LINESTRING(-5 5,15 5)", SQUARE, "101FF0212");
    }

    #[test]
    fn test_points() {
        check_relate("POINT(5 5)", SQUARE, "0FFFFF212");
        check_relate("POINT(10 5)", SQUARE, "F0FFFF212");
        check_relate("POINT(0 0)", "LINESTRING(0 0,10 0)", "F0FFFF102");
        check_relate("MULTIPOINT(5 5,20 20)", SQUARE, "0F0FFF212");
    }

    #[test]
    fn test_boundary_rule() {
        let a = geom("MULTILINESTRING((0 0,5 0),(5 0,10 0))");
        let b = geom("POINT(5 0)");
        let mod2 = relate_with_rule(&a, &b, BoundaryNodeRule::Mod2).unwrap();
        assert_eq!(mod2.get(Location::Interior, Location::Interior), Dimension::ZeroDimensional);
        let endpoint = relate_with_rule(&a, &b, BoundaryNodeRule::Endpoint).unwrap();
        assert_eq!(endpoint.get(Location::Boundary, Location::Interior), Dimension::ZeroDimensional);
    }

    #[test]
    fn test_predicates() {
        let a = geom(SQUARE);
        let touching = geom("POLYGON((10 0,20 0,20 10,10 10,10 0))");
        assert!(touches(&a, &touching).unwrap());
        assert!(intersects(&a, &touching).unwrap());
        assert!(!overlaps(&a, &touching).unwrap());
        assert!(!disjoint(&a, &touching).unwrap());

        let inner = geom("POLYGON((2 2,8 2,8 8,2 8,2 2))");
        assert!(contains(&a, &inner).unwrap());
        assert!(covers(&a, &inner).unwrap());
        assert!(within(&inner, &a).unwrap());
        assert!(covered_by(&inner, &a).unwrap());

        let line = geom("LINESTRING(-5 5,15 5)");
        assert!(crosses(&line, &a).unwrap());
        assert!(crosses(&a, &line).unwrap());

        let reversed = geom("POLYGON((0 0,0 10,10 10,10 0,0 0))");
        assert!(equals(&a, &reversed).unwrap());
        assert!(equals(&geom("POLYGON EMPTY"), &geom("LINESTRING EMPTY")).unwrap());
    }

    #[test]
    fn test_disjoint_matches_pattern() {
        for wkt in [
            "POLYGON((20 20,30 20,30 30,20 30,20 20))",
            "POLYGON((10 0,20 0,20 10,10 10,10 0))",
            "LINESTRING(11 0,11 20)",
            "POINT(5 5)",
        ] {
            let (a, b) = (geom(SQUARE), geom(wkt));
            let im = relate(&a, &b).unwrap();
            assert_eq!(im.matches("FF*FF****").unwrap(), disjoint(&a, &b).unwrap());
        }
    }

    #[test]
    fn test_rejects_collections() {
        let gc = geom("GEOMETRYCOLLECTION(POINT(0 0))");
        let err = relate(&gc, &geom(SQUARE)).unwrap_err();
        assert!(matches!(err, OverlayError::UnsupportedArgument(_)));
    }
}
