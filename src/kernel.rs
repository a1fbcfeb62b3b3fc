//! Robust geometric predicates and small coordinate helpers.
//!
//! Orientation is first decided with a floating point filter; when the
//! determinant is too close to zero for the filter's error bound the
//! computation is repeated in [`DD`] arithmetic.
use geo::{kernels::Orientation, Coordinate};

use crate::dd::DD;

/// Relative error bound of the double precision orientation filter.
const DP_SAFE_EPSILON: f64 = 1e-15;

/// Orientation of `q` relative to the directed segment `p1 -> p2`.
///
/// Returns `CounterClockwise` if `q` lies to the left, `Clockwise` if to
/// the right and `Collinear` otherwise. Consistent under any permutation
/// of the arguments.
pub fn orientation_index(
    p1: Coordinate<f64>,
    p2: Coordinate<f64>,
    q: Coordinate<f64>,
) -> Orientation {
    if let Some(ori) = orientation_filter(p1, p2, q) {
        return ori;
    }
    let dx1 = DD::from(p2.x) - p1.x;
    let dy1 = DD::from(p2.y) - p1.y;
    let dx2 = DD::from(q.x) - p2.x;
    let dy2 = DD::from(q.y) - p2.y;
    orientation_from_sign((dx1 * dy2 - dy1 * dx2).signum())
}

/// Fast filter for the orientation test. Returns `None` when the sign
/// of the determinant can't be trusted.
fn orientation_filter(
    pa: Coordinate<f64>,
    pb: Coordinate<f64>,
    pc: Coordinate<f64>,
) -> Option<Orientation> {
    let det_left = (pa.x - pc.x) * (pb.y - pc.y);
    let det_right = (pa.y - pc.y) * (pb.x - pc.x);
    let det = det_left - det_right;

    let det_sum = if det_left > 0.0 {
        if det_right <= 0.0 {
            return Some(orientation_from_f64(det));
        }
        det_left + det_right
    } else if det_left < 0.0 {
        if det_right >= 0.0 {
            return Some(orientation_from_f64(det));
        }
        -det_left - det_right
    } else {
        return Some(orientation_from_f64(det));
    };

    let err_bound = DP_SAFE_EPSILON * det_sum;
    if det >= err_bound || -det >= err_bound {
        Some(orientation_from_f64(det))
    } else {
        None
    }
}

#[inline]
fn orientation_from_f64(det: f64) -> Orientation {
    if det > 0.0 {
        Orientation::CounterClockwise
    } else if det < 0.0 {
        Orientation::Clockwise
    } else {
        Orientation::Collinear
    }
}

#[inline]
fn orientation_from_sign(sign: i32) -> Orientation {
    match sign {
        s if s > 0 => Orientation::CounterClockwise,
        s if s < 0 => Orientation::Clockwise,
        _ => Orientation::Collinear,
    }
}

/// Orientation as the conventional integer index (`1` left, `-1` right,
/// `0` collinear).
#[inline]
pub fn orientation_sign(ori: Orientation) -> i32 {
    match ori {
        Orientation::CounterClockwise => 1,
        Orientation::Clockwise => -1,
        Orientation::Collinear => 0,
    }
}

/// Intersection point of the lines through `p1 p2` and `q1 q2`,
/// computed in extended precision. `None` if the lines are parallel.
pub fn intersection_dd(
    p1: Coordinate<f64>,
    p2: Coordinate<f64>,
    q1: Coordinate<f64>,
    q2: Coordinate<f64>,
) -> Option<Coordinate<f64>> {
    let px = DD::from(p1.y) - p2.y;
    let py = DD::from(p2.x) - p1.x;
    let pw = DD::from(p1.x) * p2.y - DD::from(p2.x) * p1.y;

    let qx = DD::from(q1.y) - q2.y;
    let qy = DD::from(q2.x) - q1.x;
    let qw = DD::from(q1.x) * q2.y - DD::from(q2.x) * q1.y;

    let x = py * qw - qy * pw;
    let y = qx * pw - px * qw;
    let w = px * qy - qx * py;

    let x_int = (x / w).to_f64();
    let y_int = (y / w).to_f64();
    if x_int.is_finite() && y_int.is_finite() {
        Some(Coordinate { x: x_int, y: y_int })
    } else {
        None
    }
}

/// Whether a closed ring is oriented counter-clockwise.
///
/// Uses the highest vertex and its distinct neighbours, so it is
/// insensitive to the magnitude of the ring's area. Degenerate rings
/// (fewer than 3 distinct vertices, flat spikes) report `false`.
pub fn is_ccw(ring: &[Coordinate<f64>]) -> bool {
    if ring.len() < 4 {
        return false;
    }
    let n_pts = ring.len() - 1;

    let mut hi_index = 0;
    for i in 1..=n_pts {
        if ring[i].y > ring[hi_index].y {
            hi_index = i;
        }
    }
    let hi_pt = ring[hi_index];

    let mut i_prev = hi_index;
    loop {
        i_prev = if i_prev == 0 { n_pts } else { i_prev - 1 };
        if ring[i_prev] != hi_pt || i_prev == hi_index {
            break;
        }
    }
    let mut i_next = hi_index;
    loop {
        i_next = (i_next + 1) % n_pts;
        if ring[i_next] != hi_pt || i_next == hi_index {
            break;
        }
    }

    let prev = ring[i_prev];
    let next = ring[i_next];
    if prev == hi_pt || next == hi_pt || prev == next {
        return false;
    }

    match orientation_index(prev, hi_pt, next) {
        Orientation::Collinear => prev.x > next.x,
        ori => ori == Orientation::CounterClockwise,
    }
}

/// Shoelace signed area of a closed ring; positive when counter-clockwise.
pub fn signed_ring_area(ring: &[Coordinate<f64>]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let x0 = ring[0].x;
    let mut sum = 0.0;
    for i in 1..ring.len() - 1 {
        let x = ring[i].x - x0;
        let y1 = ring[i + 1].y;
        let y2 = ring[i - 1].y;
        sum += x * (y2 - y1);
    }
    -sum / 2.0
}

/// Whether `q` lies in the bounding box of the segment `p1 p2`.
#[inline]
pub fn in_segment_envelope(p1: Coordinate<f64>, p2: Coordinate<f64>, q: Coordinate<f64>) -> bool {
    q.x >= p1.x.min(p2.x) && q.x <= p1.x.max(p2.x) && q.y >= p1.y.min(p2.y) && q.y <= p1.y.max(p2.y)
}

/// Whether the bounding boxes of segments `p1 p2` and `q1 q2` intersect.
#[inline]
pub fn segment_envelopes_intersect(
    p1: Coordinate<f64>,
    p2: Coordinate<f64>,
    q1: Coordinate<f64>,
    q2: Coordinate<f64>,
) -> bool {
    let min_q = q1.x.min(q2.x);
    let max_q = q1.x.max(q2.x);
    let min_p = p1.x.min(p2.x);
    let max_p = p1.x.max(p2.x);
    if min_p > max_q || max_p < min_q {
        return false;
    }
    let min_q = q1.y.min(q2.y);
    let max_q = q1.y.max(q2.y);
    let min_p = p1.y.min(p2.y);
    let max_p = p1.y.max(p2.y);
    !(min_p > max_q || max_p < min_q)
}

/// Whether `p` lies on the closed segment `p0 p1`.
pub fn point_on_segment(p: Coordinate<f64>, p0: Coordinate<f64>, p1: Coordinate<f64>) -> bool {
    in_segment_envelope(p0, p1, p) && orientation_index(p0, p1, p) == Orientation::Collinear
}

/// Whether `p` lies on any segment of the line.
pub fn point_on_line(p: Coordinate<f64>, line: &[Coordinate<f64>]) -> bool {
    line.windows(2).any(|w| point_on_segment(p, w[0], w[1]))
}

#[inline]
pub fn distance(p: Coordinate<f64>, q: Coordinate<f64>) -> f64 {
    (p.x - q.x).hypot(p.y - q.y)
}

/// Euclidean distance from `p` to the closed segment `a b`.
pub fn distance_point_segment(p: Coordinate<f64>, a: Coordinate<f64>, b: Coordinate<f64>) -> f64 {
    if a == b {
        return distance(p, a);
    }
    let len2 = (b.x - a.x) * (b.x - a.x) + (b.y - a.y) * (b.y - a.y);
    let r = ((p.x - a.x) * (b.x - a.x) + (p.y - a.y) * (b.y - a.y)) / len2;
    if r <= 0.0 {
        return distance(p, a);
    }
    if r >= 1.0 {
        return distance(p, b);
    }
    let s = ((a.y - p.y) * (b.x - a.x) - (a.x - p.x) * (b.y - a.y)) / len2;
    s.abs() * len2.sqrt()
}

/// Copy of `coords` without consecutive duplicates.
pub fn remove_repeated_points(coords: &[Coordinate<f64>]) -> Vec<Coordinate<f64>> {
    let mut out: Vec<Coordinate<f64>> = Vec::with_capacity(coords.len());
    for &c in coords {
        if out.last() != Some(&c) {
            out.push(c);
        }
    }
    out
}
