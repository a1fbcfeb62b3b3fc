//! Snapping a geometry to the vertices of another.
//!
//! Near-coincident vertices and vertex-segment near-misses are the usual
//! cause of noding failures; snapping them together within a small
//! tolerance makes the inputs consistent enough to overlay.
use std::collections::BTreeSet;

use geo::{Coordinate, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon, Rect};

use crate::{
    geometry::envelope,
    kernel::{distance, distance_point_segment},
    ord_coord::OrdCoord,
};

/// Tolerance relative to the size of the inputs: a fraction of the
/// smallest non-zero envelope extent of either.
const SNAP_PRECISION_FACTOR: f64 = 1e-9;

/// The base snap tolerance for overlaying `a` and `b`.
///
/// Zero extents (points, axis-parallel lines) are skipped. If every extent
/// is zero the tolerance scales with the coordinate magnitude instead.
pub(crate) fn overlay_snap_tolerance(a: &Geometry<f64>, b: &Geometry<f64>) -> f64 {
    let envelopes: Vec<Rect<f64>> = [a, b].into_iter().filter_map(envelope).collect();
    let extent = envelopes
        .iter()
        .flat_map(|env| [env.width(), env.height()])
        .filter(|&d| d > 0.)
        .fold(f64::INFINITY, f64::min);
    if extent.is_finite() {
        return extent * SNAP_PRECISION_FACTOR;
    }
    let magnitude = envelopes
        .iter()
        .flat_map(|env| [env.min().x, env.min().y, env.max().x, env.max().y])
        .map(f64::abs)
        .fold(0., f64::max);
    magnitude.max(1.) * SNAP_PRECISION_FACTOR
}

/// Distinct vertices of `geom`, in coordinate order.
fn snap_targets(geom: &Geometry<f64>) -> Vec<Coordinate<f64>> {
    use geo::coords_iter::CoordsIter;
    geom.coords_iter()
        .map(OrdCoord::from)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|c| c.coord())
        .collect()
}

/// Snap the vertices and segments of `geom` to the vertices of `target`.
pub(crate) fn snap_to(geom: &Geometry<f64>, target: &Geometry<f64>, tolerance: f64) -> Geometry<f64> {
    let snapper = Snapper {
        targets: snap_targets(target),
        tolerance,
    };
    snapper.snap_geometry(geom)
}

struct Snapper {
    targets: Vec<Coordinate<f64>>,
    tolerance: f64,
}

impl Snapper {
    fn snap_geometry(&self, geom: &Geometry<f64>) -> Geometry<f64> {
        match geom {
            Geometry::Point(pt) => Geometry::Point(self.snap_point(pt)),
            Geometry::MultiPoint(mp) => {
                Geometry::MultiPoint(MultiPoint(mp.0.iter().map(|p| self.snap_point(p)).collect()))
            }
            Geometry::LineString(ls) => Geometry::LineString(self.snap_line(ls, false)),
            Geometry::MultiLineString(mls) => Geometry::MultiLineString(MultiLineString(
                mls.0.iter().map(|ls| self.snap_line(ls, false)).collect(),
            )),
            Geometry::Polygon(poly) => Geometry::Polygon(self.snap_polygon(poly)),
            Geometry::MultiPolygon(mp) => Geometry::MultiPolygon(MultiPolygon(
                mp.0.iter().map(|p| self.snap_polygon(p)).collect(),
            )),
            Geometry::GeometryCollection(gc) => Geometry::GeometryCollection(geo::GeometryCollection(
                gc.0.iter().map(|g| self.snap_geometry(g)).collect(),
            )),
            g => self.snap_geometry(&crate::geometry::normalize(g)),
        }
    }

    fn snap_point(&self, pt: &Point<f64>) -> Point<f64> {
        Point(self.find_snap_for_vertex(pt.0).unwrap_or(pt.0))
    }

    fn snap_polygon(&self, poly: &Polygon<f64>) -> Polygon<f64> {
        Polygon::new(
            self.snap_line(poly.exterior(), true),
            poly.interiors().iter().map(|r| self.snap_line(r, true)).collect(),
        )
    }

    fn snap_line(&self, ls: &LineString<f64>, is_ring: bool) -> LineString<f64> {
        let mut pts = ls.0.clone();
        if pts.is_empty() {
            return ls.clone();
        }
        let is_closed = is_ring || ls.is_closed();
        self.snap_vertices(&mut pts, is_closed);
        self.snap_segments(&mut pts);
        LineString(pts)
    }

    /// The nearest target within tolerance, or `None` if there is none or
    /// `p` already is a target.
    fn find_snap_for_vertex(&self, p: Coordinate<f64>) -> Option<Coordinate<f64>> {
        let mut best: Option<(f64, Coordinate<f64>)> = None;
        for &t in &self.targets {
            if t == p {
                return None;
            }
            let d = distance(p, t);
            if d < self.tolerance && best.map_or(true, |(bd, _)| d < bd) {
                best = Some((d, t));
            }
        }
        best.map(|(_, t)| t)
    }

    fn snap_vertices(&self, pts: &mut [Coordinate<f64>], is_closed: bool) {
        let n = pts.len();
        let end = if is_closed { n - 1 } else { n };
        for i in 0..end {
            if let Some(snapped) = self.find_snap_for_vertex(pts[i]) {
                pts[i] = snapped;
                if i == 0 && is_closed {
                    pts[n - 1] = snapped;
                }
            }
        }
    }

    /// Insert targets lying within tolerance of a segment as new vertices.
    fn snap_segments(&self, pts: &mut Vec<Coordinate<f64>>) {
        for &t in &self.targets {
            if pts.contains(&t) {
                continue;
            }
            let best = pts
                .windows(2)
                .enumerate()
                .map(|(i, seg)| (i, distance_point_segment(t, seg[0], seg[1])))
                .filter(|&(_, d)| d < self.tolerance)
                .min_by(|a, b| a.1.total_cmp(&b.1));
            if let Some((i, _)) = best {
                pts.insert(i + 1, t);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wkt::TryFromWkt;

    fn geom(wkt: &str) -> Geometry<f64> {
        Geometry::try_from_wkt_str(wkt).unwrap()
    }

    #[test]
    fn test_snap_vertices_and_segments() {
        let a = geom("POLYGON((0 0,10 0,10 10,0 10,0 0))");
        let b = geom("POLYGON((10.0000001 5,20 5,20 15,10 15,10.0000001 5))");

        let snapped = snap_to(&b, &a, 1e-3);
        let ring = match &snapped {
            Geometry::Polygon(p) => p.exterior().0.clone(),
            _ => unreachable!(),
        };
        // No target is near the vertex; (10 10) is near the closing segment.
        assert_eq!(ring[0], Coordinate { x: 10.0000001, y: 5. });
        assert_eq!(ring[4], Coordinate { x: 10., y: 10. });

        let snapped = snap_to(&a, &b, 1e-3);
        let ring = match &snapped {
            Geometry::Polygon(p) => p.exterior().0.clone(),
            _ => unreachable!(),
        };
        // (10.0000001 5) is inserted into the right edge of a.
        assert!(ring.contains(&Coordinate { x: 10.0000001, y: 5. }));
        assert_eq!(ring.len(), 6);
    }

    #[test]
    fn test_tolerance() {
        let a = geom("POLYGON((0 0,10 0,10 20,0 20,0 0))");
        let b = geom("LINESTRING(0 0,100 100)");
        assert_eq!(overlay_snap_tolerance(&a, &b), 10. * SNAP_PRECISION_FACTOR);
    }

    #[test]
    fn test_tolerance_of_degenerate_envelopes() {
        let square = geom("POLYGON((0 0,10 0,10 10,0 10,0 0))");
        let horizontal = geom("LINESTRING(0 0,10 0)");
        let tol = overlay_snap_tolerance(&horizontal, &square);
        assert_eq!(tol, 10. * SNAP_PRECISION_FACTOR);
        assert_eq!(overlay_snap_tolerance(&geom("POINT(1 1)"), &square), tol);
        assert_eq!(overlay_snap_tolerance(&horizontal, &geom("LINESTRING(5 -5,5 5)")), tol);

        // Only points: scaled by the largest coordinate.
        assert_eq!(
            overlay_snap_tolerance(&geom("POINT(1 1)"), &geom("POINT(3 -40)")),
            40. * SNAP_PRECISION_FACTOR
        );
        assert_eq!(
            overlay_snap_tolerance(&geom("POINT(0 0)"), &geom("POINT(0 0)")),
            SNAP_PRECISION_FACTOR
        );
    }
}
