//! Point location against geometries.
use geo::prelude::BoundingRect;
use geo::{Coordinate, Geometry, LineString, Polygon, Rect};
use rstar::{RTree, RTreeObject, AABB};

use crate::{
    kernel::{orientation_index, orientation_sign, point_on_line},
    BoundaryNodeRule, Location,
};

#[inline]
fn rect_contains(rect: &Rect<f64>, p: Coordinate<f64>) -> bool {
    p.x >= rect.min().x && p.x <= rect.max().x && p.y >= rect.min().y && p.y <= rect.max().y
}

/// Location of `p` relative to a closed ring, by counting crossings of a
/// ray to the right of `p`.
pub fn locate_in_ring(p: Coordinate<f64>, ring: &[Coordinate<f64>]) -> Location {
    let mut crossings = 0;
    for i in 1..ring.len() {
        let p1 = ring[i];
        let p2 = ring[i - 1];

        // Segment entirely left of the ray origin.
        if p1.x < p.x && p2.x < p.x {
            continue;
        }
        if p == p2 {
            return Location::Boundary;
        }
        // Horizontal segment on the ray.
        if p1.y == p.y && p2.y == p.y {
            if p1.x.min(p2.x) <= p.x && p.x <= p1.x.max(p2.x) {
                return Location::Boundary;
            }
            continue;
        }
        // Segment straddles the ray, counting the upper endpoint only.
        if (p1.y > p.y && p2.y <= p.y) || (p2.y > p.y && p1.y <= p.y) {
            let mut orient = orientation_sign(orientation_index(p1, p2, p));
            if orient == 0 {
                return Location::Boundary;
            }
            if p2.y < p1.y {
                orient = -orient;
            }
            if orient > 0 {
                crossings += 1;
            }
        }
    }
    if crossings % 2 == 1 {
        Location::Interior
    } else {
        Location::Exterior
    }
}

/// Whether `p` is inside or on the ring.
pub fn is_in_ring(p: Coordinate<f64>, ring: &[Coordinate<f64>]) -> bool {
    locate_in_ring(p, ring) != Location::Exterior
}

fn locate_in_polygon_ring(p: Coordinate<f64>, ring: &LineString<f64>) -> Location {
    match ring.bounding_rect() {
        Some(rect) if rect_contains(&rect, p) => locate_in_ring(p, &ring.0),
        _ => Location::Exterior,
    }
}

/// Location of `p` relative to a polygon with holes.
pub fn locate_in_polygon(p: Coordinate<f64>, poly: &Polygon<f64>) -> Location {
    if poly.exterior().0.is_empty() {
        return Location::Exterior;
    }
    match locate_in_polygon_ring(p, poly.exterior()) {
        Location::Interior => {}
        loc => return loc,
    }
    for hole in poly.interiors() {
        match locate_in_polygon_ring(p, hole) {
            Location::Boundary => return Location::Boundary,
            Location::Interior => return Location::Exterior,
            _ => {}
        }
    }
    Location::Interior
}

fn locate_on_point(p: Coordinate<f64>, pt: Coordinate<f64>) -> Location {
    if p == pt {
        Location::Interior
    } else {
        Location::Exterior
    }
}

pub(crate) fn locate_on_line_string(p: Coordinate<f64>, ls: &LineString<f64>) -> Location {
    let rect = match ls.bounding_rect() {
        Some(rect) => rect,
        None => return Location::Exterior,
    };
    if !rect_contains(&rect, p) {
        return Location::Exterior;
    }
    let pts = &ls.0;
    if !ls.is_closed() && (p == pts[0] || Some(&p) == pts.last()) {
        return Location::Boundary;
    }
    if point_on_line(p, pts) {
        Location::Interior
    } else {
        Location::Exterior
    }
}

/// Locates points against arbitrary geometries.
///
/// For multi-part geometries a point is on the boundary when the
/// boundary rule accepts the number of parts whose boundary it is on.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointLocator {
    rule: BoundaryNodeRule,
}

#[derive(Default)]
struct LocationCounts {
    is_in: bool,
    num_boundaries: usize,
}

impl LocationCounts {
    fn update(&mut self, loc: Location) {
        match loc {
            Location::Interior => self.is_in = true,
            Location::Boundary => self.num_boundaries += 1,
            _ => {}
        }
    }
}

impl PointLocator {
    pub fn new(rule: BoundaryNodeRule) -> Self {
        PointLocator { rule }
    }

    /// Whether `p` intersects `geom` (is not in its exterior).
    pub fn intersects(&self, p: Coordinate<f64>, geom: &Geometry<f64>) -> bool {
        self.locate(p, geom) != Location::Exterior
    }

    pub fn locate(&self, p: Coordinate<f64>, geom: &Geometry<f64>) -> Location {
        match geom {
            Geometry::LineString(ls) => return locate_on_line_string(p, ls),
            Geometry::Polygon(poly) => return locate_in_polygon(p, poly),
            Geometry::Line(line) => {
                return locate_on_line_string(p, &LineString(vec![line.start, line.end]))
            }
            Geometry::Rect(rect) => return locate_in_polygon(p, &rect.to_polygon()),
            Geometry::Triangle(tri) => return locate_in_polygon(p, &tri.to_polygon()),
            _ => {}
        }
        let mut counts = LocationCounts::default();
        Self::compute_location(p, geom, &mut counts);
        if self.rule.is_in_boundary(counts.num_boundaries) {
            Location::Boundary
        } else if counts.num_boundaries > 0 || counts.is_in {
            Location::Interior
        } else {
            Location::Exterior
        }
    }

    fn compute_location(p: Coordinate<f64>, geom: &Geometry<f64>, counts: &mut LocationCounts) {
        match geom {
            Geometry::Point(pt) => counts.update(locate_on_point(p, pt.0)),
            Geometry::MultiPoint(mp) => {
                for pt in &mp.0 {
                    counts.update(locate_on_point(p, pt.0));
                }
            }
            Geometry::Line(line) => counts.update(locate_on_line_string(
                p,
                &LineString(vec![line.start, line.end]),
            )),
            Geometry::LineString(ls) => counts.update(locate_on_line_string(p, ls)),
            Geometry::MultiLineString(mls) => {
                for ls in &mls.0 {
                    counts.update(locate_on_line_string(p, ls));
                }
            }
            Geometry::Polygon(poly) => counts.update(locate_in_polygon(p, poly)),
            Geometry::MultiPolygon(mp) => {
                for poly in &mp.0 {
                    counts.update(locate_in_polygon(p, poly));
                }
            }
            Geometry::Rect(rect) => counts.update(locate_in_polygon(p, &rect.to_polygon())),
            Geometry::Triangle(tri) => counts.update(locate_in_polygon(p, &tri.to_polygon())),
            Geometry::GeometryCollection(gc) => {
                for g in &gc.0 {
                    Self::compute_location(p, g, counts);
                }
            }
        }
    }
}

/// Envelope of one indexed polygon.
#[derive(Debug, Clone)]
struct PolygonEnvelope {
    idx: usize,
    bbox: Rect<f64>,
}

impl RTreeObject for PolygonEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.bbox.min().into(), self.bbox.max().into())
    }
}

/// Point-in-area locator for the polygonal parts of a geometry.
///
/// Non-areal parts are ignored, so points only ever locate in the
/// interior, boundary or exterior of the areas.
#[derive(Debug)]
pub struct AreaLocator {
    polygons: Vec<Polygon<f64>>,
    tree: RTree<PolygonEnvelope>,
}

impl AreaLocator {
    pub fn new(geom: &Geometry<f64>) -> Self {
        let mut polygons = vec![];
        collect_polygons(geom, &mut polygons);
        let tree = RTree::bulk_load(
            polygons
                .iter()
                .enumerate()
                .filter_map(|(idx, poly)| {
                    poly.bounding_rect()
                        .map(|bbox| PolygonEnvelope { idx, bbox })
                })
                .collect(),
        );
        AreaLocator { polygons, tree }
    }

    pub fn locate(&self, p: Coordinate<f64>) -> Location {
        let query = AABB::from_point([p.x, p.y]);
        for cand in self.tree.locate_in_envelope_intersecting(&query) {
            let loc = locate_in_polygon(p, &self.polygons[cand.idx]);
            if loc != Location::Exterior {
                return loc;
            }
        }
        Location::Exterior
    }
}

fn collect_polygons(geom: &Geometry<f64>, out: &mut Vec<Polygon<f64>>) {
    match geom {
        Geometry::Polygon(poly) => out.push(poly.clone()),
        Geometry::MultiPolygon(mp) => out.extend(mp.0.iter().cloned()),
        Geometry::Rect(rect) => out.push(rect.to_polygon()),
        Geometry::Triangle(tri) => out.push(tri.to_polygon()),
        Geometry::GeometryCollection(gc) => {
            for g in &gc.0 {
                collect_polygons(g, out);
            }
        }
        _ => {}
    }
}
