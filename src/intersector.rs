//! Robust segment intersection.
use geo::{kernels::Orientation, Coordinate};
use log::trace;

use crate::{
    kernel::{
        distance_point_segment, in_segment_envelope, intersection_dd, orientation_index,
        segment_envelopes_intersect,
    },
    precision::PrecisionModel,
};

/// Classification of a segment pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntersectionKind {
    None,
    /// The segments meet in a single point.
    Point,
    /// The segments overlap along a sub-segment.
    Collinear,
}

/// Result of intersecting two segments `p` (input 0) and `q` (input 1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentIntersection {
    kind: IntersectionKind,
    points: [Coordinate<f64>; 2],
    input: [[Coordinate<f64>; 2]; 2],
    is_proper: bool,
}

impl SegmentIntersection {
    fn none(input: [[Coordinate<f64>; 2]; 2]) -> Self {
        SegmentIntersection {
            kind: IntersectionKind::None,
            points: [input[0][0]; 2],
            input,
            is_proper: false,
        }
    }

    #[inline]
    pub fn kind(&self) -> IntersectionKind {
        self.kind
    }

    #[inline]
    pub fn has_intersection(&self) -> bool {
        self.kind != IntersectionKind::None
    }

    /// Number of intersection points: 0, 1, or 2 for an overlap.
    #[inline]
    pub fn intersection_num(&self) -> usize {
        match self.kind {
            IntersectionKind::None => 0,
            IntersectionKind::Point => 1,
            IntersectionKind::Collinear => 2,
        }
    }

    /// The `i`-th intersection point.
    #[inline]
    pub fn intersection(&self, i: usize) -> Coordinate<f64> {
        self.points[i]
    }

    pub fn points(&self) -> &[Coordinate<f64>] {
        &self.points[..self.intersection_num()]
    }

    /// `true` iff the single intersection point is interior to both
    /// segments (not an endpoint of either).
    #[inline]
    pub fn is_proper(&self) -> bool {
        self.has_intersection() && self.is_proper
    }

    #[inline]
    pub fn is_collinear(&self) -> bool {
        self.kind == IntersectionKind::Collinear
    }

    /// Whether `pt` is one of the computed intersection points.
    pub fn is_intersection(&self, pt: Coordinate<f64>) -> bool {
        self.points().iter().any(|p| *p == pt)
    }

    /// Whether some intersection point is not an endpoint of either input.
    pub fn is_interior_intersection(&self) -> bool {
        self.is_interior_intersection_for(0) || self.is_interior_intersection_for(1)
    }

    /// Whether some intersection point is not an endpoint of the given
    /// input segment.
    pub fn is_interior_intersection_for(&self, input_index: usize) -> bool {
        let [a, b] = self.input[input_index];
        self.points().iter().any(|p| *p != a && *p != b)
    }

    /// Fractional distance of the `int_index`-th intersection point along
    /// the segment `input_index`.
    pub fn edge_distance(&self, input_index: usize, int_index: usize) -> f64 {
        let [p0, p1] = self.input[input_index];
        compute_edge_distance(self.points[int_index], p0, p1)
    }
}

/// A robust "distance" of `p` along segment `p0 p1`.
///
/// The value is the larger ordinate difference, which is exact for points
/// on the segment and gives a consistent ordering of points along it.
pub fn compute_edge_distance(p: Coordinate<f64>, p0: Coordinate<f64>, p1: Coordinate<f64>) -> f64 {
    let dx = (p1.x - p0.x).abs();
    let dy = (p1.y - p0.y).abs();

    if p == p0 {
        0.0
    } else if p == p1 {
        dx.max(dy)
    } else {
        let pdx = (p.x - p0.x).abs();
        let pdy = (p.y - p0.y).abs();
        let dist = if dx > dy { pdx } else { pdy };
        // Nonzero to keep points distinct from p0.
        if dist == 0.0 {
            pdx.max(pdy)
        } else {
            dist
        }
    }
}

/// Computes segment intersections with robust orientation tests.
///
/// The reported point always lies within the bounding boxes of both
/// segments, and the classification doesn't depend on the order of the
/// operands.
#[derive(Debug, Clone, Copy, Default)]
pub struct RobustLineIntersector {
    precision: PrecisionModel,
}

impl RobustLineIntersector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_precision(precision: PrecisionModel) -> Self {
        RobustLineIntersector { precision }
    }

    pub fn precision(&self) -> PrecisionModel {
        self.precision
    }

    /// Whether `p` lies on the segment `p1 p2`. The result records `p` as
    /// both inputs of the first segment.
    pub fn intersect_point(
        &self,
        p: Coordinate<f64>,
        p1: Coordinate<f64>,
        p2: Coordinate<f64>,
    ) -> SegmentIntersection {
        let input = [[p, p], [p1, p2]];
        if in_segment_envelope(p1, p2, p)
            && orientation_index(p1, p2, p) == Orientation::Collinear
            && orientation_index(p2, p1, p) == Orientation::Collinear
        {
            SegmentIntersection {
                kind: IntersectionKind::Point,
                points: [p, p],
                input,
                is_proper: p != p1 && p != p2,
            }
        } else {
            SegmentIntersection::none(input)
        }
    }

    /// Intersect segment `p1 p2` with segment `q1 q2`.
    pub fn intersect(
        &self,
        p1: Coordinate<f64>,
        p2: Coordinate<f64>,
        q1: Coordinate<f64>,
        q2: Coordinate<f64>,
    ) -> SegmentIntersection {
        let input = [[p1, p2], [q1, q2]];
        if !segment_envelopes_intersect(p1, p2, q1, q2) {
            return SegmentIntersection::none(input);
        }

        // For each endpoint, compute which side of the other segment it
        // lies on. Both on the same (strict) side means no intersection.
        let pq1 = orientation_index(p1, p2, q1);
        let pq2 = orientation_index(p1, p2, q2);
        if pq1 != Orientation::Collinear && pq1 == pq2 {
            return SegmentIntersection::none(input);
        }
        let qp1 = orientation_index(q1, q2, p1);
        let qp2 = orientation_index(q1, q2, p2);
        if qp1 != Orientation::Collinear && qp1 == qp2 {
            return SegmentIntersection::none(input);
        }

        use Orientation::Collinear;
        if pq1 == Collinear && pq2 == Collinear && qp1 == Collinear && qp2 == Collinear {
            return self.collinear_intersection(input);
        }

        if pq1 == Collinear || pq2 == Collinear || qp1 == Collinear || qp2 == Collinear {
            // An endpoint touches the other segment. Endpoint equality is
            // checked first so the exact input coordinate is reported.
            let pt = if p1 == q1 || p1 == q2 {
                p1
            } else if p2 == q1 || p2 == q2 {
                p2
            } else if pq1 == Collinear {
                q1
            } else if pq2 == Collinear {
                q2
            } else if qp1 == Collinear {
                p1
            } else {
                p2
            };
            SegmentIntersection {
                kind: IntersectionKind::Point,
                points: [pt, pt],
                input,
                is_proper: false,
            }
        } else {
            let pt = self.proper_intersection_point(p1, p2, q1, q2);
            trace!("proper intersection {pt:?} of {p1:?}-{p2:?} and {q1:?}-{q2:?}");
            SegmentIntersection {
                kind: IntersectionKind::Point,
                points: [pt, pt],
                input,
                is_proper: true,
            }
        }
    }

    fn collinear_intersection(&self, input: [[Coordinate<f64>; 2]; 2]) -> SegmentIntersection {
        let [[p1, p2], [q1, q2]] = input;
        let q1_in_p = in_segment_envelope(p1, p2, q1);
        let q2_in_p = in_segment_envelope(p1, p2, q2);
        let p1_in_q = in_segment_envelope(q1, q2, p1);
        let p2_in_q = in_segment_envelope(q1, q2, p2);

        let (a, b) = if q1_in_p && q2_in_p {
            (q1, q2)
        } else if p1_in_q && p2_in_q {
            (p1, p2)
        } else if q1_in_p && p1_in_q {
            (q1, p1)
        } else if q1_in_p && p2_in_q {
            (q1, p2)
        } else if q2_in_p && p1_in_q {
            (q2, p1)
        } else if q2_in_p && p2_in_q {
            (q2, p2)
        } else {
            return SegmentIntersection::none(input);
        };

        // Overlap degenerated to a single shared point (including
        // zero-length inputs).
        let kind = if a == b {
            IntersectionKind::Point
        } else {
            IntersectionKind::Collinear
        };
        SegmentIntersection {
            kind,
            points: [a, b],
            input,
            is_proper: false,
        }
    }

    /// Intersection point of two properly crossing segments, forced into
    /// both segment envelopes and rounded to the precision model.
    fn proper_intersection_point(
        &self,
        p1: Coordinate<f64>,
        p2: Coordinate<f64>,
        q1: Coordinate<f64>,
        q2: Coordinate<f64>,
    ) -> Coordinate<f64> {
        let mut pt = intersection_dd(p1, p2, q1, q2)
            .unwrap_or_else(|| nearest_endpoint(p1, p2, q1, q2));
        if !(in_segment_envelope(p1, p2, pt) && in_segment_envelope(q1, q2, pt)) {
            pt = nearest_endpoint(p1, p2, q1, q2);
        }
        self.precision.make_precise(pt)
    }
}

/// The endpoint of either segment closest to the other segment.
fn nearest_endpoint(
    p1: Coordinate<f64>,
    p2: Coordinate<f64>,
    q1: Coordinate<f64>,
    q2: Coordinate<f64>,
) -> Coordinate<f64> {
    let candidates = [
        (p1, distance_point_segment(p1, q1, q2)),
        (p2, distance_point_segment(p2, q1, q2)),
        (q1, distance_point_segment(q1, p1, p2)),
        (q2, distance_point_segment(q2, p1, p2)),
    ];
    let mut best = candidates[0];
    for cand in &candidates[1..] {
        if cand.1 < best.1 {
            best = *cand;
        }
    }
    best.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: f64, y: f64) -> Coordinate<f64> {
        Coordinate { x, y }
    }

    #[test]
    fn test_proper_crossing() {
        let li = RobustLineIntersector::new();
        let isec = li.intersect(c(0., 0.), c(10., 10.), c(0., 10.), c(10., 0.));
        assert_eq!(isec.kind(), IntersectionKind::Point);
        assert!(isec.is_proper());
        assert_eq!(isec.intersection(0), c(5., 5.));
        assert!(isec.is_interior_intersection());
        assert_eq!(isec.edge_distance(0, 0), 5.);
    }

    #[test]
    fn test_endpoint_touch() {
        let li = RobustLineIntersector::new();
        let isec = li.intersect(c(0., 0.), c(10., 0.), c(10., 0.), c(10., 10.));
        assert_eq!(isec.kind(), IntersectionKind::Point);
        assert!(!isec.is_proper());
        assert_eq!(isec.intersection(0), c(10., 0.));
        assert!(!isec.is_interior_intersection());

        // T-junction: endpoint of q in the interior of p.
        let isec = li.intersect(c(0., 0.), c(10., 0.), c(5., 0.), c(5., 5.));
        assert_eq!(isec.intersection(0), c(5., 0.));
        assert!(!isec.is_proper());
        assert!(isec.is_interior_intersection_for(0));
        assert!(!isec.is_interior_intersection_for(1));
    }

    #[test]
    fn test_collinear() {
        let li = RobustLineIntersector::new();
        let isec = li.intersect(c(0., 0.), c(10., 0.), c(5., 0.), c(15., 0.));
        assert_eq!(isec.kind(), IntersectionKind::Collinear);
        assert_eq!(isec.points(), &[c(5., 0.), c(10., 0.)]);

        // Collinear but only sharing an endpoint.
        let isec = li.intersect(c(0., 0.), c(10., 0.), c(10., 0.), c(15., 0.));
        assert_eq!(isec.kind(), IntersectionKind::Point);
        assert_eq!(isec.intersection(0), c(10., 0.));

        // Collinear and disjoint.
        let isec = li.intersect(c(0., 0.), c(10., 0.), c(11., 0.), c(15., 0.));
        assert_eq!(isec.kind(), IntersectionKind::None);
    }

    #[test]
    fn test_degenerate_segments() {
        let li = RobustLineIntersector::new();
        // Identical segments.
        let isec = li.intersect(c(0., 0.), c(10., 10.), c(10., 10.), c(0., 0.));
        assert_eq!(isec.kind(), IntersectionKind::Collinear);

        // Zero length segment on another segment.
        let isec = li.intersect(c(5., 5.), c(5., 5.), c(0., 0.), c(10., 10.));
        assert_eq!(isec.kind(), IntersectionKind::Point);
        assert_eq!(isec.intersection(0), c(5., 5.));

        // Zero length segment off the other segment.
        let isec = li.intersect(c(5., 6.), c(5., 6.), c(0., 0.), c(10., 10.));
        assert_eq!(isec.kind(), IntersectionKind::None);
    }

    #[test]
    fn test_operand_order_consistency() {
        let li = RobustLineIntersector::new();
        let segs = [
            (c(0., 0.), c(10., 10.)),
            (c(0., 10.), c(10., 0.)),
            (c(5., 5.), c(20., 5.)),
            (c(0.1, 0.3), c(9.7, 9.1)),
            (c(-1., 2.), c(3., -4.)),
        ];
        for (a1, a2) in segs {
            for (b1, b2) in segs {
                let i1 = li.intersect(a1, a2, b1, b2);
                let i2 = li.intersect(b1, b2, a1, a2);
                let i3 = li.intersect(a2, a1, b2, b1);
                assert_eq!(i1.kind(), i2.kind());
                assert_eq!(i1.kind(), i3.kind());
                assert_eq!(i1.is_proper(), i2.is_proper());
            }
        }
    }

    #[test]
    fn test_point_in_segment_envelope() {
        let li = RobustLineIntersector::new();
        let isec = li.intersect(
            c(0.1, 0.2),
            c(1000.3, 1000.7),
            c(0.1, 1000.9),
            c(1000.5, 0.3),
        );
        assert!(isec.is_proper());
        let pt = isec.intersection(0);
        assert!(in_segment_envelope(c(0.1, 0.2), c(1000.3, 1000.7), pt));
        assert!(in_segment_envelope(c(0.1, 1000.9), c(1000.5, 0.3), pt));
    }

    #[test]
    fn test_fixed_precision() {
        let li = RobustLineIntersector::with_precision(PrecisionModel::Fixed { scale: 1.0 });
        let isec = li.intersect(c(0., 0.), c(10., 3.), c(0., 3.), c(10., 0.));
        assert_eq!(isec.intersection(0), c(5., 2.));
    }

    #[test]
    fn test_point_on_segment() {
        let li = RobustLineIntersector::new();
        let isec = li.intersect_point(c(5., 5.), c(0., 0.), c(10., 10.));
        assert!(isec.is_proper());
        let isec = li.intersect_point(c(0., 0.), c(0., 0.), c(10., 10.));
        assert!(isec.has_intersection());
        assert!(!isec.is_proper());
    }
}
