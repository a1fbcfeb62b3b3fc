//! Simplicity test for geometries.
//!
//! A geometry is simple if it has no anomalous self-intersections:
//!
//! - points are always simple; multi points are simple if no point
//!   repeats
//! - a linear geometry is simple if its lines only meet at their
//!   endpoints, and endpoints of closed lines are not touched by other
//!   lines unless the boundary rule puts them on the boundary
//! - polygonal geometries are simple if each of their rings is
//! - a collection is simple if each element is
use std::collections::BTreeMap;

use geo::{Coordinate, Geometry, Polygon};
use itertools::Itertools;
use log::debug;

use crate::{
    error::Result,
    geometry::{is_empty, normalize},
    geomgraph::GeometryGraph,
    intersector::RobustLineIntersector,
    ord_coord::OrdCoord,
    BoundaryNodeRule,
};

/// Tests simplicity and records where it fails.
#[derive(Debug, Clone)]
pub struct IsSimpleOp {
    rule: BoundaryNodeRule,
    non_simple_location: Option<Coordinate<f64>>,
}

impl Default for IsSimpleOp {
    fn default() -> Self {
        IsSimpleOp::new(BoundaryNodeRule::default())
    }
}

impl IsSimpleOp {
    pub fn new(rule: BoundaryNodeRule) -> Self {
        IsSimpleOp {
            rule,
            non_simple_location: None,
        }
    }

    /// A point where the last tested geometry is not simple, if it was not.
    #[inline]
    pub fn non_simple_location(&self) -> Option<Coordinate<f64>> {
        self.non_simple_location
    }

    pub fn is_simple(&mut self, geom: &Geometry<f64>) -> Result<bool> {
        self.non_simple_location = None;
        self.compute(geom)
    }

    fn compute(&mut self, geom: &Geometry<f64>) -> Result<bool> {
        if is_empty(geom) {
            return Ok(true);
        }
        match geom {
            Geometry::Point(_) => Ok(true),
            Geometry::MultiPoint(mp) => Ok(self.is_simple_multi_point(mp.0.iter().map(|p| p.0))),
            Geometry::LineString(_) | Geometry::MultiLineString(_) => self.is_simple_linear(geom),
            Geometry::Polygon(poly) => self.are_rings_simple(std::iter::once(poly)),
            Geometry::MultiPolygon(mp) => self.are_rings_simple(mp.0.iter()),
            Geometry::GeometryCollection(gc) => {
                for g in &gc.0 {
                    if !self.compute(g)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            g => self.compute(&normalize(g)),
        }
    }

    fn is_simple_multi_point(&mut self, pts: impl Iterator<Item = Coordinate<f64>>) -> bool {
        let repeated = pts
            .map(OrdCoord::from)
            .sorted()
            .tuple_windows()
            .find(|(a, b)| a == b);
        match repeated {
            Some((p, _)) => {
                self.non_simple_location = Some(p.coord());
                false
            }
            None => true,
        }
    }

    fn are_rings_simple<'a>(&mut self, polys: impl Iterator<Item = &'a Polygon<f64>>) -> Result<bool> {
        for poly in polys {
            for ring in std::iter::once(poly.exterior()).chain(poly.interiors()) {
                if !self.is_simple_linear(&Geometry::LineString(ring.clone()))? {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    fn is_simple_linear(&mut self, geom: &Geometry<f64>) -> Result<bool> {
        if is_empty(geom) {
            return Ok(true);
        }
        let mut graph = GeometryGraph::new(0, geom, self.rule)?;
        let li = RobustLineIntersector::new();
        let summary = graph.compute_self_nodes(&li, true);
        if !summary.has_intersection {
            return Ok(true);
        }
        if summary.has_proper {
            self.non_simple_location = summary.proper_point;
            debug!("not simple: proper intersection at {:?}", summary.proper_point);
            return Ok(false);
        }
        if let Some(p) = non_endpoint_intersection(&graph) {
            self.non_simple_location = Some(p);
            debug!("not simple: intersection at {p:?} is not an endpoint");
            return Ok(false);
        }
        // Closed line endpoints are interior unless the rule says otherwise.
        if !self.rule.is_in_boundary(2) {
            if let Some(p) = closed_endpoint_intersection(&graph) {
                self.non_simple_location = Some(p);
                debug!("not simple: closed line endpoint touched at {p:?}");
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn non_endpoint_intersection(graph: &GeometryGraph) -> Option<Coordinate<f64>> {
    graph.edges().iter().find_map(|e| {
        let max_segment_index = e.max_segment_index();
        e.intersections()
            .iter()
            .find(|ei| !ei.is_endpoint(max_segment_index))
            .map(|ei| ei.coord)
    })
}

/// An endpoint of a closed line where a number of line ends other than
/// its own two meet.
fn closed_endpoint_intersection(graph: &GeometryGraph) -> Option<Coordinate<f64>> {
    // Per endpoint: (is the endpoint of a closed line, degree).
    let mut endpoints: BTreeMap<OrdCoord, (bool, usize)> = BTreeMap::new();
    for e in graph.edges() {
        let is_closed = e.is_closed();
        for p in [e.coord(0), e.coord(e.num_points() - 1)] {
            let info = endpoints.entry(OrdCoord::from(p)).or_insert((false, 0));
            info.0 |= is_closed;
            info.1 += 1;
        }
    }
    endpoints
        .into_iter()
        .find(|(_, (is_closed, degree))| *is_closed && *degree != 2)
        .map(|(p, _)| p.coord())
}

/// Whether `geom` is simple under the Mod-2 boundary rule.
pub fn is_simple(geom: &Geometry<f64>) -> Result<bool> {
    IsSimpleOp::default().is_simple(geom)
}

pub fn is_simple_with_rule(geom: &Geometry<f64>, rule: BoundaryNodeRule) -> Result<bool> {
    IsSimpleOp::new(rule).is_simple(geom)
}

#[cfg(test)]
mod tests {
    use wkt::TryFromWkt;

    use super::*;
    use crate::tests::init_log;

    fn geom(wkt: &str) -> Geometry<f64> {
        Geometry::try_from_wkt_str(wkt).unwrap()
    }

    fn check_simple(wkt: &str, expected: bool) {
        init_log();
        assert_eq!(is_simple(&geom(wkt)).unwrap(), expected, "is_simple({wkt})");
    }

    #[test]
    fn test_points() {
        check_simple("POINT(1 1)", true);
        check_simple("MULTIPOINT(1 1,2 2)", true);
        check_simple("MULTIPOINT(1 1,2 2,1 1)", false);
    }

    #[test]
    fn test_lines() {
        check_simple("LINESTRING(0 0,10 0)", true);
        check_simple("LINESTRING(0 0,10 0,10 10,0 10,0 0)", true);
        check_simple("LINESTRING(0 0,10 10,10 0,0 10)", false);
        // Endpoint touching its own interior.
        check_simple("LINESTRING(0 0,10 0,10 10,5 0)", false);
        check_simple("MULTILINESTRING((0 0,10 0),(10 0,10 10))", true);
        check_simple("MULTILINESTRING((0 0,10 0),(5 -5,5 5))", false);
    }

    #[test]
    fn test_closed_endpoints_by_rule() {
        let g = geom("MULTILINESTRING((0 0,10 0,10 10,0 0),(0 0,-10 0))");
        assert!(!is_simple(&g).unwrap());
        assert!(is_simple_with_rule(&g, BoundaryNodeRule::Endpoint).unwrap());
    }

    #[test]
    fn test_bowtie_polygon() {
        let mut op = IsSimpleOp::default();
        let bowtie = geom("POLYGON((0 0,10 10,10 0,0 10,0 0))");
        assert!(!op.is_simple(&bowtie).unwrap());
        assert_eq!(op.non_simple_location(), Some(Coordinate { x: 5., y: 5. }));

        check_simple("POLYGON((0 0,10 0,10 10,0 10,0 0),(2 2,4 2,4 4,2 4,2 2))", true);
    }
}
