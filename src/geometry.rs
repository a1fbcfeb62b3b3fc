//! Input normalisation, validation and dimension queries on
//! [`geo::Geometry`] values.
use std::collections::BTreeMap;

use geo::{coords_iter::CoordsIter, Coordinate, Geometry, LineString, Rect};

use crate::{
    error::{OverlayError, Result},
    kernel::remove_repeated_points,
    ord_coord::OrdCoord,
    BoundaryNodeRule,
};

/// Topological dimension of a geometry or of an intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dimension {
    /// No points (the `F` entry of an intersection matrix).
    Empty,
    ZeroDimensional,
    OneDimensional,
    TwoDimensional,
}

impl Dimension {
    pub fn to_char(self) -> char {
        match self {
            Dimension::Empty => 'F',
            Dimension::ZeroDimensional => '0',
            Dimension::OneDimensional => '1',
            Dimension::TwoDimensional => '2',
        }
    }
}

/// Replace the convenience variants (`Line`, `Rect`, `Triangle`) by the
/// equivalent line string or polygon.
pub(crate) fn normalize(geom: &Geometry<f64>) -> Geometry<f64> {
    match geom {
        Geometry::Line(line) => Geometry::LineString(LineString(vec![line.start, line.end])),
        Geometry::Rect(rect) => Geometry::Polygon(rect.to_polygon()),
        Geometry::Triangle(tri) => Geometry::Polygon(tri.to_polygon()),
        Geometry::GeometryCollection(gc) => Geometry::GeometryCollection(geo::GeometryCollection(
            gc.0.iter().map(normalize).collect(),
        )),
        g => g.clone(),
    }
}

fn validate_ring(ring: &LineString<f64>) -> Result<()> {
    if ring.0.is_empty() {
        return Ok(());
    }
    if !ring.is_closed() {
        return Err(OverlayError::invalid("ring is not closed", Some(ring.0[0])));
    }
    if remove_repeated_points(&ring.0).len() < 4 {
        return Err(OverlayError::invalid(
            "ring has fewer than 4 distinct points",
            Some(ring.0[0]),
        ));
    }
    Ok(())
}

fn validate_line(line: &LineString<f64>) -> Result<()> {
    if !line.0.is_empty() && remove_repeated_points(&line.0).len() < 2 {
        return Err(OverlayError::invalid(
            "line has fewer than 2 distinct points",
            Some(line.0[0]),
        ));
    }
    Ok(())
}

/// Structural validation done before any graph is built.
pub(crate) fn validate(geom: &Geometry<f64>) -> Result<()> {
    if let Some(c) = geom.coords_iter().find(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return Err(OverlayError::invalid("non-finite coordinate", Some(c)));
    }
    match geom {
        Geometry::LineString(ls) => validate_line(ls),
        Geometry::MultiLineString(mls) => mls.0.iter().try_for_each(validate_line),
        Geometry::Polygon(poly) => {
            validate_ring(poly.exterior())?;
            poly.interiors().iter().try_for_each(validate_ring)
        }
        Geometry::MultiPolygon(mp) => mp.0.iter().try_for_each(|poly| {
            validate_ring(poly.exterior())?;
            poly.interiors().iter().try_for_each(validate_ring)
        }),
        Geometry::GeometryCollection(gc) => gc.0.iter().try_for_each(validate),
        _ => Ok(()),
    }
}

/// Fail with `UnsupportedArgument` for geometry collections.
pub(crate) fn reject_collection(geom: &Geometry<f64>, operation: &str) -> Result<()> {
    if let Geometry::GeometryCollection(_) = geom {
        return Err(OverlayError::UnsupportedArgument(format!(
            "{operation} does not support geometry collection arguments"
        )));
    }
    Ok(())
}

pub(crate) fn is_empty(geom: &Geometry<f64>) -> bool {
    geom.coords_iter().next().is_none()
}

/// Bounding box, or `None` for an empty geometry.
pub(crate) fn envelope(geom: &Geometry<f64>) -> Option<Rect<f64>> {
    let mut iter = geom.coords_iter();
    let first = iter.next()?;
    let (min, max) = iter.fold((first, first), |(min, max), c| {
        (
            Coordinate {
                x: min.x.min(c.x),
                y: min.y.min(c.y),
            },
            Coordinate {
                x: max.x.max(c.x),
                y: max.y.max(c.y),
            },
        )
    });
    Some(Rect::new(min, max))
}

pub(crate) fn envelopes_intersect(a: &Rect<f64>, b: &Rect<f64>) -> bool {
    !(a.min().x > b.max().x || a.max().x < b.min().x || a.min().y > b.max().y || a.max().y < b.min().y)
}

/// Dimension of the geometry type. Empty geometries keep the dimension of
/// their type; an empty collection is [`Dimension::Empty`].
pub fn dimension(geom: &Geometry<f64>) -> Dimension {
    match geom {
        Geometry::Point(_) | Geometry::MultiPoint(_) => Dimension::ZeroDimensional,
        Geometry::Line(_) | Geometry::LineString(_) | Geometry::MultiLineString(_) => {
            Dimension::OneDimensional
        }
        Geometry::Polygon(_)
        | Geometry::MultiPolygon(_)
        | Geometry::Rect(_)
        | Geometry::Triangle(_) => Dimension::TwoDimensional,
        Geometry::GeometryCollection(gc) => gc
            .0
            .iter()
            .map(dimension)
            .max()
            .unwrap_or(Dimension::Empty),
    }
}

/// Number of line endpoints incident on each coordinate.
fn endpoint_valences<'a>(
    lines: impl Iterator<Item = &'a LineString<f64>>,
) -> BTreeMap<OrdCoord, usize> {
    let mut valence = BTreeMap::new();
    for ls in lines {
        if let (Some(first), Some(last)) = (ls.0.first(), ls.0.last()) {
            *valence.entry(OrdCoord::from(*first)).or_insert(0) += 1;
            *valence.entry(OrdCoord::from(*last)).or_insert(0) += 1;
        }
    }
    valence
}

/// Dimension of the boundary under the given rule.
pub(crate) fn boundary_dimension(geom: &Geometry<f64>, rule: BoundaryNodeRule) -> Dimension {
    if is_empty(geom) {
        return Dimension::Empty;
    }
    let lines: Vec<&LineString<f64>> = match geom {
        Geometry::LineString(ls) => vec![ls],
        Geometry::MultiLineString(mls) => mls.0.iter().collect(),
        Geometry::Polygon(_)
        | Geometry::MultiPolygon(_)
        | Geometry::Rect(_)
        | Geometry::Triangle(_) => return Dimension::OneDimensional,
        Geometry::Line(_) => return Dimension::ZeroDimensional,
        _ => return Dimension::Empty,
    };
    if endpoint_valences(lines.into_iter())
        .values()
        .any(|&v| rule.is_in_boundary(v))
    {
        Dimension::ZeroDimensional
    } else {
        Dimension::Empty
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
    fn test_validate() {
        assert!(validate(&geom("POLYGON((0 0,10 0,10 10,0 10,0 0))")).is_ok());
        assert!(validate(&geom("POLYGON((0 0,10 0,0 0,0 0))")).is_err());
        assert!(validate(&geom("LINESTRING(1 1,1 1)")).is_err());
        assert!(validate(&geom("LINESTRING(1 1,1 1,2 2)")).is_ok());

        let nan = Geometry::Point(geo::Point::new(f64::NAN, 0.));
        assert!(matches!(validate(&nan), Err(OverlayError::InvalidInput { .. })));
    }

    #[test]
    fn test_dimensions() {
        assert_eq!(dimension(&geom("MULTIPOINT(0 0,1 1)")), Dimension::ZeroDimensional);
        assert_eq!(dimension(&geom("LINESTRING(0 0,1 1)")), Dimension::OneDimensional);
        assert_eq!(
            dimension(&geom("GEOMETRYCOLLECTION(POINT(0 0),LINESTRING(0 0,1 1))")),
            Dimension::OneDimensional
        );

        let ring = geom("LINESTRING(0 0,1 0,1 1,0 0)");
        assert_eq!(boundary_dimension(&ring, BoundaryNodeRule::Mod2), Dimension::Empty);
        assert_eq!(
            boundary_dimension(&ring, BoundaryNodeRule::Endpoint),
            Dimension::ZeroDimensional
        );
        assert_eq!(
            boundary_dimension(&geom("POLYGON((0 0,1 0,1 1,0 0))"), BoundaryNodeRule::Mod2),
            Dimension::OneDimensional
        );
    }

    #[test]
    fn test_normalize() {
        let rect = Geometry::Rect(Rect::new(Coordinate { x: 0., y: 0. }, Coordinate { x: 1., y: 1. }));
        assert!(matches!(normalize(&rect), Geometry::Polygon(_)));
        assert_eq!(envelope(&rect), envelope(&normalize(&rect)));
        assert!(envelope(&geom("LINESTRING EMPTY")).is_none());
    }
}
