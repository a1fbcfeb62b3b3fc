use std::cmp::Ordering;

use geo::Coordinate;

/// Wraps a [`Coordinate`] to support lexicographic ordering.
///
/// The ordering is by `x` and then by `y`. Implements `PartialOrd`,
/// `Ord` and `Eq` even though `Coordinate` doesn't implement these.
/// This is necessary to key the ordered maps that deduplicate graph
/// nodes and coincident edges.
///
/// Note that the trait impls exist even though `f64` is not `Eq` or
/// `Ord`. Inputs are checked to be finite before any graph is built,
/// so every key can be consistently ordered.
#[derive(Debug, Clone, Copy)]
pub struct OrdCoord(pub Coordinate<f64>);

impl OrdCoord {
    #[inline]
    pub fn coord(&self) -> Coordinate<f64> {
        self.0
    }
}

/// Implement lexicographic ordering by `x` and then by `y`
/// coordinate.
impl PartialOrd for OrdCoord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Total order; `-0.0` and `0.0` compare equal.
impl Ord for OrdCoord {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.0.x.partial_cmp(&other.0.x) {
            Some(Ordering::Equal) => self.0.y.partial_cmp(&other.0.y),
            o => o,
        }
        .unwrap_or_else(|| panic!("non-finite coordinate in ordered key: {:?}", self.0))
    }
}

impl PartialEq for OrdCoord {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

/// We derive `Eq` manually to not require `f64: Eq`.
impl Eq for OrdCoord {}

/// Create from `Coordinate`; components must be finite.
impl From<Coordinate<f64>> for OrdCoord {
    #[inline]
    fn from(pt: Coordinate<f64>) -> Self {
        debug_assert!(
            pt.x.is_finite() && pt.y.is_finite(),
            "ordered coordinate requires finite components"
        );
        OrdCoord(pt)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn test_ord_coord_ordering() {
        let p1 = OrdCoord::from(Coordinate { x: 0., y: 0. });
        let p2 = OrdCoord::from(Coordinate { x: 1., y: 0. });
        let p3 = OrdCoord::from(Coordinate { x: 1., y: 1. });
        let p4 = OrdCoord::from(Coordinate { x: 1., y: 1. });

        assert!(p1 < p2);
        assert!(p1 < p3);
        assert!(p2 < p3);
        assert!(p3 <= p4);
        assert_eq!(p3, p4);
    }

    #[test]
    fn test_signed_zero_is_one_key() {
        let mut map = BTreeMap::new();
        map.insert(OrdCoord::from(Coordinate { x: 0.0, y: -0.0 }), 1);
        map.insert(OrdCoord::from(Coordinate { x: -0.0, y: 0.0 }), 2);
        assert_eq!(map.len(), 1);
    }
}
