//! Boolean overlay of two geometries.
//!
//! Both inputs are noded against themselves and each other, their split
//! edges merged into one [`PlanarGraph`], and every directed edge and
//! node labelled with its location relative to both inputs. The result is
//! then read off the graph: area edges bounding the result regions are
//! linked into polygons, remaining line edges and isolated nodes become
//! lines and points.
//!
//! ```rust
//! use geo::Geometry;
//! use geo_overlay::{overlay, OpType};
//! use wkt::TryFromWkt;
//!
//! let a = Geometry::try_from_wkt_str("POLYGON((0 0,10 0,10 10,0 10,0 0))").unwrap();
//! let b = Geometry::try_from_wkt_str("POLYGON((5 5,15 5,15 15,5 15,5 5))").unwrap();
//! let result = overlay(&a, &b, OpType::Intersection).unwrap();
//! assert!(matches!(result, Geometry::Polygon(_)));
//! ```
use geo::{Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use log::{debug, info};

use crate::{
    error::Result,
    geometry::{dimension, reject_collection, Dimension},
    geomgraph::{sym, validate_noding, EdgeList, GeometryGraph, PlanarGraph},
    intersector::RobustLineIntersector,
    label::Label,
    precision::PrecisionModel,
    BoundaryNodeRule, Location, Position,
};

mod polygon_builder;
use polygon_builder::PolygonBuilder;

mod line_builder;
use line_builder::LineBuilder;

mod point_builder;
use point_builder::build_points;

mod snap;

/// The boolean set operation to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OpType {
    Intersection,
    Union,
    Difference,
    SymDifference,
}

/// Options for overlay and relate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpConfig {
    /// Rounding applied to computed intersection points.
    pub precision: PrecisionModel,
    /// Classification of line endpoints.
    pub boundary_rule: BoundaryNodeRule,
    /// How many snapped retries to attempt after a topology failure.
    pub snap_attempts: usize,
}

impl Default for OpConfig {
    fn default() -> Self {
        OpConfig {
            precision: PrecisionModel::Floating,
            boundary_rule: BoundaryNodeRule::Mod2,
            snap_attempts: 4,
        }
    }
}

impl OpConfig {
    pub fn with_precision(mut self, precision: PrecisionModel) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_boundary_rule(mut self, boundary_rule: BoundaryNodeRule) -> Self {
        self.boundary_rule = boundary_rule;
        self
    }

    pub fn with_snap_attempts(mut self, snap_attempts: usize) -> Self {
        self.snap_attempts = snap_attempts;
        self
    }
}

/// Whether a point with the given locations in the two inputs is in the
/// result of `op`. Boundary counts as interior.
pub fn is_result_of_locations(loc0: Location, loc1: Location, op: OpType) -> bool {
    let in0 = matches!(loc0, Location::Interior | Location::Boundary);
    let in1 = matches!(loc1, Location::Interior | Location::Boundary);
    match op {
        OpType::Intersection => in0 && in1,
        OpType::Union => in0 || in1,
        OpType::Difference => in0 && !in1,
        OpType::SymDifference => in0 != in1,
    }
}

/// [`is_result_of_locations`] for the `On` locations of a label.
pub fn is_result_of_op(label: &Label, op: OpType) -> bool {
    is_result_of_locations(label.on(0), label.on(1), op)
}

/// A single overlay computation over two inputs.
#[derive(Debug)]
pub struct OverlayOp {
    args: [GeometryGraph; 2],
    li: RobustLineIntersector,
    graph: PlanarGraph,
}

impl OverlayOp {
    pub fn new(a: &Geometry<f64>, b: &Geometry<f64>, config: &OpConfig) -> Result<Self> {
        reject_collection(a, "overlay")?;
        reject_collection(b, "overlay")?;
        Ok(OverlayOp {
            args: [
                GeometryGraph::new(0, a, config.boundary_rule)?,
                GeometryGraph::new(1, b, config.boundary_rule)?,
            ],
            li: RobustLineIntersector::with_precision(config.precision),
            graph: PlanarGraph::default(),
        })
    }

    /// Run the overlay for `op`, consuming the operation.
    pub fn result_geometry(mut self, op: OpType) -> Result<Geometry<f64>> {
        self.copy_points(0);
        self.copy_points(1);

        let [arg0, arg1] = &mut self.args;
        arg0.compute_self_nodes(&self.li, false);
        arg1.compute_self_nodes(&self.li, false);
        arg0.compute_edge_intersections(arg1, &self.li, true);

        let mut split_edges = vec![];
        arg0.compute_split_edges(&mut split_edges)?;
        arg1.compute_split_edges(&mut split_edges)?;
        debug!("overlay: {n} split edges", n = split_edges.len());

        let mut edge_list = EdgeList::default();
        for edge in split_edges {
            edge_list.insert_unique(edge);
        }
        compute_labels_from_depths(&mut edge_list);
        let edges = replace_collapsed_edges(edge_list);
        validate_noding(&edges)?;

        self.graph.add_edges(edges)?;
        let graphs = [&self.args[0], &self.args[1]];
        self.graph.compute_labelling(graphs)?;
        self.graph.label_incomplete_nodes(graphs);

        self.find_result_area_edges(op);
        self.cancel_duplicate_result_edges();

        let polys = PolygonBuilder::build(&mut self.graph)?;
        let lines = LineBuilder::new(op, &polys).build(&mut self.graph);
        let points = build_points(&self.graph, op, &lines, &polys);
        info!(
            "{op:?}: {p} polygons, {l} lines, {n} points",
            p = polys.len(),
            l = lines.len(),
            n = points.len()
        );

        Ok(self.compute_geometry(points, lines, polys, op))
    }

    /// Copy the input nodes, so that isolated points reach the result.
    fn copy_points(&mut self, arg_index: usize) {
        let nodes: Vec<_> = self.args[arg_index]
            .nodes()
            .iter()
            .map(|n| (n.coord(), n.label().on(arg_index)))
            .collect();
        for (coord, loc) in nodes {
            let id = self.graph.add_node(coord);
            self.graph.nodes_mut().get_mut(id).set_location(arg_index, loc);
        }
    }

    fn find_result_area_edges(&mut self, op: OpType) {
        for de in 0..self.graph.dir_edges().len() {
            let d = self.graph.dir_edge(de);
            let label = d.label();
            if label.is_area()
                && !d.is_interior_area_edge()
                && is_result_of_locations(
                    label.location(0, Position::Right),
                    label.location(1, Position::Right),
                    op,
                )
            {
                self.graph.dir_edge_mut(de).in_result = true;
            }
        }
    }

    /// An edge in the result in both directions bounds nothing.
    fn cancel_duplicate_result_edges(&mut self) {
        for de in 0..self.graph.dir_edges().len() {
            let s = sym(de);
            if self.graph.dir_edge(de).in_result() && self.graph.dir_edge(s).in_result() {
                self.graph.dir_edge_mut(de).in_result = false;
                self.graph.dir_edge_mut(s).in_result = false;
            }
        }
    }

    fn compute_geometry(
        &self,
        points: Vec<Point<f64>>,
        lines: Vec<LineString<f64>>,
        polys: Vec<Polygon<f64>>,
        op: OpType,
    ) -> Geometry<f64> {
        if points.is_empty() && lines.is_empty() && polys.is_empty() {
            return empty_result(
                op,
                dimension(self.args[0].geometry()),
                dimension(self.args[1].geometry()),
            );
        }
        build_geometry(points, lines, polys)
    }
}

/// Settle the labels of merged coincident edges from their depths.
fn compute_labels_from_depths(edge_list: &mut EdgeList) {
    for edge in edge_list.iter_mut() {
        if edge.depth().is_null() {
            continue;
        }
        edge.depth_mut().normalize();
        let depth = *edge.depth();
        let label = edge.label_mut();
        for i in 0..2 {
            if !label.is_area_for(i) || depth.is_null_for(i) {
                continue;
            }
            if depth.delta(i) == 0 {
                // The area collapsed onto this edge.
                label.to_line_for(i);
            } else {
                label.set_location(i, Position::Left, depth.location(i, Position::Left));
                label.set_location(i, Position::Right, depth.location(i, Position::Right));
            }
        }
    }
}

fn replace_collapsed_edges(edge_list: EdgeList) -> Vec<crate::geomgraph::Edge> {
    edge_list
        .into_edges()
        .into_iter()
        .map(|e| if e.is_collapsed() { e.collapsed_edge() } else { e })
        .collect()
}

fn empty_of_dimension(dim: Dimension) -> Geometry<f64> {
    match dim {
        Dimension::Empty => Geometry::GeometryCollection(GeometryCollection(vec![])),
        Dimension::ZeroDimensional => Geometry::MultiPoint(MultiPoint(vec![])),
        Dimension::OneDimensional => Geometry::LineString(LineString(vec![])),
        Dimension::TwoDimensional => Geometry::Polygon(Polygon::new(LineString(vec![]), vec![])),
    }
}

/// The empty result of `op` has the dimension the result would have.
fn empty_result(op: OpType, dim0: Dimension, dim1: Dimension) -> Geometry<f64> {
    let dim = match op {
        OpType::Intersection => dim0.min(dim1),
        OpType::Union | OpType::SymDifference => dim0.max(dim1),
        OpType::Difference => dim0,
    };
    empty_of_dimension(dim)
}

/// The simplest geometry holding all the parts: a single part as itself,
/// parts of one kind as a multi geometry, otherwise a collection.
fn build_geometry(
    mut points: Vec<Point<f64>>,
    mut lines: Vec<LineString<f64>>,
    mut polys: Vec<Polygon<f64>>,
) -> Geometry<f64> {
    match (points.len(), lines.len(), polys.len()) {
        (1, 0, 0) => Geometry::Point(points.remove(0)),
        (0, 1, 0) => Geometry::LineString(lines.remove(0)),
        (0, 0, 1) => Geometry::Polygon(polys.remove(0)),
        (_, 0, 0) => Geometry::MultiPoint(MultiPoint(points)),
        (0, _, 0) => Geometry::MultiLineString(MultiLineString(lines)),
        (0, 0, _) => Geometry::MultiPolygon(MultiPolygon(polys)),
        _ => Geometry::GeometryCollection(GeometryCollection(
            points
                .into_iter()
                .map(Geometry::Point)
                .chain(lines.into_iter().map(Geometry::LineString))
                .chain(polys.into_iter().map(Geometry::Polygon))
                .collect(),
        )),
    }
}

/// Overlay `a` and `b` with the default configuration.
pub fn overlay(a: &Geometry<f64>, b: &Geometry<f64>, op: OpType) -> Result<Geometry<f64>> {
    overlay_with_config(a, b, op, &OpConfig::default())
}

/// Overlay `a` and `b`. A topology failure is retried on inputs snapped
/// to each other with increasing tolerance; if every retry fails the
/// original error is returned.
pub fn overlay_with_config(
    a: &Geometry<f64>,
    b: &Geometry<f64>,
    op: OpType,
    config: &OpConfig,
) -> Result<Geometry<f64>> {
    overlay_with_retry(a, b, config.snap_attempts, |a, b| {
        debug!("overlay {op:?}");
        OverlayOp::new(a, b, config)?.result_geometry(op)
    })
}

/// Run `overlay_fn` on `a` and `b`, and after a topology error on up to
/// `snap_attempts` snapped versions of them, the tolerance growing tenfold
/// each time.
fn overlay_with_retry<F>(
    a: &Geometry<f64>,
    b: &Geometry<f64>,
    snap_attempts: usize,
    mut overlay_fn: F,
) -> Result<Geometry<f64>>
where
    F: FnMut(&Geometry<f64>, &Geometry<f64>) -> Result<Geometry<f64>>,
{
    let err = match overlay_fn(a, b) {
        Err(err) if err.is_topology() => err,
        res => return res,
    };
    let mut tolerance = snap::overlay_snap_tolerance(a, b);
    for attempt in 0..snap_attempts {
        debug!("{err}; retrying snapped with tolerance {tolerance:e} (attempt {attempt})");
        let a_snapped = snap::snap_to(a, b, tolerance);
        let b_snapped = snap::snap_to(b, &a_snapped, tolerance);
        match overlay_fn(&a_snapped, &b_snapped) {
            Ok(geom) => return Ok(geom),
            Err(e) => debug!("snapped overlay failed: {e}"),
        }
        tolerance *= 10.;
    }
    Err(err)
}

/// Boolean operations as methods on anything convertible to a
/// [`Geometry`].
pub trait BooleanOps {
    fn boolean_op(&self, other: &Self, op: OpType) -> Result<Geometry<f64>>;

    fn intersection(&self, other: &Self) -> Result<Geometry<f64>> {
        self.boolean_op(other, OpType::Intersection)
    }

    fn union(&self, other: &Self) -> Result<Geometry<f64>> {
        self.boolean_op(other, OpType::Union)
    }

    fn difference(&self, other: &Self) -> Result<Geometry<f64>> {
        self.boolean_op(other, OpType::Difference)
    }

    fn sym_difference(&self, other: &Self) -> Result<Geometry<f64>> {
        self.boolean_op(other, OpType::SymDifference)
    }
}

impl<G> BooleanOps for G
where
    G: Clone + Into<Geometry<f64>>,
{
    fn boolean_op(&self, other: &Self, op: OpType) -> Result<Geometry<f64>> {
        overlay(&self.clone().into(), &other.clone().into(), op)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use geo::{algorithm::area::Area, Coordinate};
    use wkt::TryFromWkt;

    use super::*;
    use crate::{error::OverlayError, tests::init_log};

    fn geom(wkt: &str) -> Geometry<f64> {
        Geometry::try_from_wkt_str(wkt).unwrap()
    }

    fn check(wkt1: &str, wkt2: &str, op: OpType) -> Geometry<f64> {
        init_log();
        let result = overlay(&geom(wkt1), &geom(wkt2), op).unwrap();
        debug!("{op:?} -> {result:?}");
        result
    }

    const SQUARE: &str = "POLYGON((0 0,10 0,10 10,0 10,0 0))";
    const SHIFTED: &str = "POLYGON((5 5,15 5,15 15,5 15,5 5))";

    #[test]
    fn test_overlapping_squares() {
        let inter = check(SQUARE, SHIFTED, OpType::Intersection);
        assert!(matches!(inter, Geometry::Polygon(_)));
        assert_relative_eq!(inter.unsigned_area(), 25.);

        let union = check(SQUARE, SHIFTED, OpType::Union);
        assert!(matches!(union, Geometry::Polygon(_)));
        assert_relative_eq!(union.unsigned_area(), 175.);

        assert_relative_eq!(check(SQUARE, SHIFTED, OpType::Difference).unsigned_area(), 75.);
        let sym_diff = check(SQUARE, SHIFTED, OpType::SymDifference);
        assert!(matches!(sym_diff, Geometry::MultiPolygon(ref mp) if mp.0.len() == 2));
        assert_relative_eq!(sym_diff.unsigned_area(), 150.);
    }

    #[test]
    fn test_hole_in_result() {
        let outer = "POLYGON((0 0,40 0,40 40,0 40,0 0))";
        let inner = "POLYGON((10 10,30 10,30 30,10 30,10 10))";
        let diff = check(outer, inner, OpType::Difference);
        match diff {
            Geometry::Polygon(p) => {
                assert_eq!(p.interiors().len(), 1);
                assert_relative_eq!(p.unsigned_area(), 1200.);
            }
            g => panic!("expected polygon, got {g:?}"),
        }
    }

    #[test]
    fn test_touching_squares() {
        let right = "POLYGON((10 0,20 0,20 10,10 10,10 0))";
        let inter = check(SQUARE, right, OpType::Intersection);
        assert!(matches!(inter, Geometry::LineString(ref ls) if ls.0.len() == 2));

        let union = check(SQUARE, right, OpType::Union);
        assert!(matches!(union, Geometry::Polygon(_)));
        assert_relative_eq!(union.unsigned_area(), 200.);

        let corner = "POLYGON((10 10,20 10,20 20,10 20,10 10))";
        let inter = check(SQUARE, corner, OpType::Intersection);
        assert_eq!(inter, Geometry::Point(Point(Coordinate { x: 10., y: 10. })));
    }

    #[test]
    fn test_line_and_polygon() {
        let line = "LINESTRING(-5 5,15 5)";
        let inter = check(line, SQUARE, OpType::Intersection);
        match inter {
            Geometry::LineString(ls) => assert_eq!(
                ls.0,
                vec![Coordinate { x: 0., y: 5. }, Coordinate { x: 10., y: 5. }]
            ),
            g => panic!("expected line, got {g:?}"),
        }
        let diff = check(line, SQUARE, OpType::Difference);
        assert!(matches!(diff, Geometry::MultiLineString(ref mls) if mls.0.len() == 2));

        // The line inside the square is absorbed by the union.
        let union = check(line, SQUARE, OpType::Union);
        match union {
            Geometry::GeometryCollection(gc) => {
                assert_eq!(gc.0.len(), 3);
                assert_relative_eq!(gc.unsigned_area(), 100.);
            }
            g => panic!("expected collection, got {g:?}"),
        }
    }

    #[test]
    fn test_points() {
        let inter = check("MULTIPOINT(1 1,20 20)", SQUARE, OpType::Intersection);
        assert_eq!(inter, Geometry::Point(Point(Coordinate { x: 1., y: 1. })));

        let union = check("POINT(1 1)", SQUARE, OpType::Union);
        assert!(matches!(union, Geometry::Polygon(_)));
    }

    #[test]
    fn test_empty_results() {
        let far = "POLYGON((20 20,30 20,30 30,20 30,20 20))";
        let inter = check(SQUARE, far, OpType::Intersection);
        assert!(matches!(inter, Geometry::Polygon(ref p) if p.exterior().0.is_empty()));

        let inter = check("LINESTRING(20 0,30 0)", SQUARE, OpType::Intersection);
        assert!(matches!(inter, Geometry::LineString(ref ls) if ls.0.is_empty()));

        let diff = check(SQUARE, SQUARE, OpType::Difference);
        assert!(matches!(diff, Geometry::Polygon(ref p) if p.exterior().0.is_empty()));
    }

    #[test]
    fn test_coincident_edges() {
        // Two squares sharing a full side merge into one shell.
        let left = "POLYGON((0 0,5 0,5 10,0 10,0 0))";
        let right = "POLYGON((5 0,10 0,10 10,5 10,5 0))";
        let union = check(left, right, OpType::Union);
        match union {
            Geometry::Polygon(p) => {
                assert!(p.interiors().is_empty());
                assert_relative_eq!(p.unsigned_area(), 100.);
            }
            g => panic!("expected polygon, got {g:?}"),
        }
    }

    #[test]
    fn test_rejects_collections() {
        let gc = geom("GEOMETRYCOLLECTION(POINT(0 0))");
        let err = overlay(&gc, &geom(SQUARE), OpType::Union).unwrap_err();
        assert!(matches!(err, OverlayError::UnsupportedArgument(_)));
    }

    #[test]
    fn test_boolean_ops_trait() {
        let a = Polygon::<f64>::try_from_wkt_str(SQUARE).unwrap();
        let b = Polygon::<f64>::try_from_wkt_str(SHIFTED).unwrap();
        assert_relative_eq!(a.intersection(&b).unwrap().unsigned_area(), 25.);
        assert_relative_eq!(a.sym_difference(&b).unwrap().unsigned_area(), 150.);
    }

    #[test]
    fn test_result_of_op() {
        use Location::*;
        assert!(is_result_of_locations(Boundary, Interior, OpType::Intersection));
        assert!(!is_result_of_locations(Exterior, Interior, OpType::Intersection));
        assert!(is_result_of_locations(Exterior, Interior, OpType::Union));
        assert!(!is_result_of_locations(Interior, Boundary, OpType::Difference));
        assert!(is_result_of_locations(Interior, Exterior, OpType::SymDifference));
        assert!(!is_result_of_locations(Boundary, Interior, OpType::SymDifference));
    }

    #[test]
    fn test_random_area_identity() {
        use crate::random::*;
        use rand::thread_rng;

        init_log();
        let a: Geometry<f64> = circular_polygon(thread_rng(), 64).into();
        let b: Geometry<f64> = circular_polygon(thread_rng(), 128).into();
        let union = overlay(&a, &b, OpType::Union).unwrap();
        let inter = overlay(&a, &b, OpType::Intersection).unwrap();
        assert_relative_eq!(
            union.unsigned_area() + inter.unsigned_area(),
            a.unsigned_area() + b.unsigned_area(),
            max_relative = 1e-9
        );

        let steppy: Geometry<f64> = steppy_polygon(thread_rng(), 32).into();
        let diff = overlay(&steppy, &a, OpType::Difference).unwrap();
        assert_relative_eq!(
            diff.unsigned_area() + overlay(&steppy, &a, OpType::Intersection).unwrap().unsigned_area(),
            steppy.unsigned_area(),
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_snap_retry_uses_growing_tolerance() {
        init_log();
        // (10.00000005 5) lies 5e-8 from the right edge of SQUARE. The base
        // tolerance is about 1e-8, so only the second retry snaps it in.
        let a = geom(SQUARE);
        let b = geom("POLYGON((10.00000005 5,20 5,20 15,10.00000005 15,10.00000005 5))");
        let target = Coordinate { x: 10.00000005, y: 5. };

        let mut calls = 0;
        let result = overlay_with_retry(&a, &b, 4, |a, b| {
            calls += 1;
            match a {
                Geometry::Polygon(p) if p.exterior().0.contains(&target) => overlay(a, b, OpType::Union),
                _ => Err(OverlayError::topology("ring not closed", target)),
            }
        })
        .unwrap();
        assert_eq!(calls, 3);
        assert!(matches!(result, Geometry::Polygon(_)));
    }

    #[test]
    fn test_snap_retry_returns_original_error() {
        init_log();
        let (a, b) = (geom(SQUARE), geom(SHIFTED));
        let failing = |calls: &mut usize| -> Result<Geometry<f64>> {
            *calls += 1;
            Err(OverlayError::topology(
                format!("failure {calls}"),
                Coordinate { x: 0., y: 0. },
            ))
        };

        let mut calls = 0;
        let err = overlay_with_retry(&a, &b, 4, |_, _| failing(&mut calls)).unwrap_err();
        assert_eq!(calls, 5);
        assert_eq!(err, OverlayError::topology("failure 1", Coordinate { x: 0., y: 0. }));

        let mut calls = 0;
        let err = overlay_with_retry(&a, &b, 0, |_, _| failing(&mut calls)).unwrap_err();
        assert_eq!(calls, 1);
        assert!(err.is_topology());
    }

    #[test]
    fn test_snap_retry_only_after_topology_errors() {
        let (a, b) = (geom(SQUARE), geom(SHIFTED));
        let mut calls = 0;
        let err = overlay_with_retry(&a, &b, 4, |_, _| {
            calls += 1;
            Err(OverlayError::UnsupportedArgument("collection".to_string()))
        })
        .unwrap_err();
        assert_eq!(calls, 1);
        assert!(matches!(err, OverlayError::UnsupportedArgument(_)));

        let config = OpConfig::default().with_snap_attempts(0);
        let union = overlay_with_config(&a, &b, OpType::Union, &config).unwrap();
        assert_relative_eq!(union.unsigned_area(), 175.);
    }
}
