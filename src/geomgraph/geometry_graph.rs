use std::{cell::OnceCell, collections::BTreeMap};

use geo::{Coordinate, Geometry, LineString, Polygon};
use log::debug;

use super::{
    index::{IntersectionSummary, SegmentIntersector},
    Edge, NodeMap,
};
use crate::{
    error::Result,
    geometry::{normalize, validate},
    intersector::RobustLineIntersector,
    kernel::{is_ccw, remove_repeated_points},
    label::Label,
    locate::{AreaLocator, PointLocator},
    ord_coord::OrdCoord,
    BoundaryNodeRule, Location,
};

/// The topology graph of a single input geometry.
///
/// Holds one edge per line or ring and a node per point, ring start and
/// line endpoint. Line endpoints are classified by the boundary rule from
/// their valence.
#[derive(Debug)]
pub struct GeometryGraph {
    arg_index: usize,
    geometry: Geometry<f64>,
    boundary_rule: BoundaryNodeRule,
    edges: Vec<Edge>,
    nodes: NodeMap<()>,
    endpoint_valence: BTreeMap<OrdCoord, usize>,
    area_locator: OnceCell<AreaLocator>,
}

impl GeometryGraph {
    /// Build the graph of `geometry` as input `arg_index` (0 or 1).
    pub fn new(arg_index: usize, geometry: &Geometry<f64>, boundary_rule: BoundaryNodeRule) -> Result<Self> {
        validate(geometry)?;
        let mut graph = GeometryGraph {
            arg_index,
            geometry: normalize(geometry),
            boundary_rule,
            edges: vec![],
            nodes: NodeMap::default(),
            endpoint_valence: BTreeMap::new(),
            area_locator: OnceCell::new(),
        };
        let geometry = graph.geometry.clone();
        graph.add_geometry(&geometry);
        debug!(
            "geometry graph {arg_index}: {e} edges, {n} nodes",
            e = graph.edges.len(),
            n = graph.nodes.len()
        );
        Ok(graph)
    }

    #[inline]
    pub fn arg_index(&self) -> usize {
        self.arg_index
    }

    /// The (normalised) input geometry.
    #[inline]
    pub fn geometry(&self) -> &Geometry<f64> {
        &self.geometry
    }

    #[inline]
    pub fn boundary_rule(&self) -> BoundaryNodeRule {
        self.boundary_rule
    }

    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[inline]
    pub fn nodes(&self) -> &NodeMap<()> {
        &self.nodes
    }

    /// Coordinates of nodes on the boundary of this geometry.
    pub fn boundary_nodes(&self) -> Vec<Coordinate<f64>> {
        self.nodes.boundary_coords(self.arg_index)
    }

    fn is_boundary_node(&self, coord: Coordinate<f64>) -> bool {
        self.nodes
            .find(coord)
            .map(|id| self.nodes.get(id).label().on(self.arg_index) == Location::Boundary)
            .unwrap_or(false)
    }

    /// Whether the geometry is made of rings only.
    fn is_areal(&self) -> bool {
        matches!(self.geometry, Geometry::Polygon(_) | Geometry::MultiPolygon(_))
    }

    fn add_geometry(&mut self, geom: &Geometry<f64>) {
        match geom {
            Geometry::Point(pt) => self.insert_point(pt.0, Location::Interior),
            Geometry::MultiPoint(mp) => {
                for pt in &mp.0 {
                    self.insert_point(pt.0, Location::Interior);
                }
            }
            Geometry::LineString(ls) => self.add_line_string(ls),
            Geometry::MultiLineString(mls) => {
                for ls in &mls.0 {
                    self.add_line_string(ls);
                }
            }
            Geometry::Polygon(poly) => self.add_polygon(poly),
            Geometry::MultiPolygon(mp) => {
                for poly in &mp.0 {
                    self.add_polygon(poly);
                }
            }
            Geometry::GeometryCollection(gc) => {
                for g in &gc.0 {
                    self.add_geometry(g);
                }
            }
            // Replaced by `normalize`.
            Geometry::Line(_) | Geometry::Rect(_) | Geometry::Triangle(_) => {
                self.add_geometry(&normalize(geom))
            }
        }
    }

    fn add_polygon(&mut self, poly: &Polygon<f64>) {
        self.add_polygon_ring(poly.exterior(), Location::Exterior, Location::Interior);
        for hole in poly.interiors() {
            // Holes are labelled opposite to shells.
            self.add_polygon_ring(hole, Location::Interior, Location::Exterior);
        }
    }

    /// Add a ring whose left and right locations, when traversed
    /// clockwise, are `cw_left` and `cw_right`.
    fn add_polygon_ring(&mut self, ring: &LineString<f64>, cw_left: Location, cw_right: Location) {
        if ring.0.is_empty() {
            return;
        }
        let coords = remove_repeated_points(&ring.0);
        let (left, right) = if is_ccw(&coords) {
            (cw_right, cw_left)
        } else {
            (cw_left, cw_right)
        };
        let start = coords[0];
        self.edges.push(Edge::new(
            coords,
            Label::area(self.arg_index, Location::Boundary, left, right),
        ));
        self.insert_point(start, Location::Boundary);
    }

    fn add_line_string(&mut self, ls: &LineString<f64>) {
        if ls.0.is_empty() {
            return;
        }
        let coords = remove_repeated_points(&ls.0);
        let (first, last) = (coords[0], coords[coords.len() - 1]);
        self.edges
            .push(Edge::new(coords, Label::line(self.arg_index, Location::Interior)));
        self.insert_line_endpoint(first);
        self.insert_line_endpoint(last);
    }

    fn insert_point(&mut self, coord: Coordinate<f64>, loc: Location) {
        let id = self.nodes.add_node(coord);
        self.nodes.get_mut(id).set_location(self.arg_index, loc);
    }

    /// Count one more line endpoint at `coord` and reclassify it.
    fn insert_line_endpoint(&mut self, coord: Coordinate<f64>) {
        let valence = self.endpoint_valence.entry(OrdCoord::from(coord)).or_insert(0);
        *valence += 1;
        let loc = if self.boundary_rule.is_in_boundary(*valence) {
            Location::Boundary
        } else {
            Location::Interior
        };
        self.insert_point(coord, loc);
    }

    /// Node the edges of this geometry against each other and add a node
    /// for every self-intersection.
    ///
    /// Ring edges of areal geometries are only intersected with each
    /// other unless `compute_ring_self_nodes` is set.
    pub fn compute_self_nodes(
        &mut self,
        li: &RobustLineIntersector,
        compute_ring_self_nodes: bool,
    ) -> IntersectionSummary {
        let mut si = SegmentIntersector::new(li, true, false);
        let test_all_segments = compute_ring_self_nodes || !self.is_areal();
        si.intersect_self(&mut self.edges, test_all_segments);
        self.add_self_intersection_nodes();
        si.summary()
    }

    fn add_self_intersection_nodes(&mut self) {
        let mut found = vec![];
        for edge in &self.edges {
            let loc = edge.label().on(self.arg_index);
            for ei in edge.intersections().iter() {
                found.push((ei.coord, loc));
            }
        }
        for (coord, loc) in found {
            if self.is_boundary_node(coord) {
                continue;
            }
            // Self-intersections of area edges lie on the area boundary.
            self.insert_point(coord, loc);
        }
    }

    /// Node the edges of this geometry against those of `other`. Edges
    /// that meet `other` are marked as not isolated.
    pub fn compute_edge_intersections(
        &mut self,
        other: &mut GeometryGraph,
        li: &RobustLineIntersector,
        include_proper: bool,
    ) -> IntersectionSummary {
        let mut si = SegmentIntersector::new(li, include_proper, true)
            .with_boundary_nodes([self.boundary_nodes(), other.boundary_nodes()]);
        si.intersect_cross(&mut self.edges, &mut other.edges);
        si.summary()
    }

    /// Split every edge at its recorded intersections.
    pub fn compute_split_edges(&mut self, out: &mut Vec<Edge>) -> Result<()> {
        for edge in &mut self.edges {
            out.extend(edge.split_edges()?);
        }
        Ok(())
    }

    /// Add each edge's endpoints to its intersection list.
    pub(crate) fn add_edge_endpoints(&mut self) {
        for edge in &mut self.edges {
            edge.add_endpoints();
        }
    }

    pub(crate) fn edges_mut(&mut self) -> &mut [Edge] {
        &mut self.edges
    }

    /// Location of `p` relative to the areas of this geometry; lines and
    /// points count as exterior. The indexed locator is built on first use.
    pub fn locate_area(&self, p: Coordinate<f64>) -> Location {
        self.area_locator
            .get_or_init(|| AreaLocator::new(&self.geometry))
            .locate(p)
    }

    /// Location of `p` relative to the whole geometry.
    pub fn locate(&self, p: Coordinate<f64>) -> Location {
        PointLocator::new(self.boundary_rule).locate(p, &self.geometry)
    }
}
