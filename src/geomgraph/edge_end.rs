use std::cmp::Ordering;

use geo::{kernels::Orientation, Coordinate};

use crate::{
    error::{OverlayError, Result},
    kernel::orientation_index,
    label::Label,
};

/// Quadrant of a direction vector, numbered counter-clockwise from the
/// positive x axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Quadrant {
    NE,
    NW,
    SW,
    SE,
}

impl Quadrant {
    /// `None` for the zero vector.
    pub fn of(dx: f64, dy: f64) -> Option<Quadrant> {
        if dx == 0.0 && dy == 0.0 {
            return None;
        }
        Some(if dx >= 0.0 {
            if dy >= 0.0 {
                Quadrant::NE
            } else {
                Quadrant::SE
            }
        } else if dy >= 0.0 {
            Quadrant::NW
        } else {
            Quadrant::SW
        })
    }
}

/// The end of an edge at a node: the node coordinate, the direction in
/// which the edge leaves it and the label as seen in that direction.
#[derive(Debug, Clone)]
pub struct EdgeEnd {
    edge: usize,
    p0: Coordinate<f64>,
    p1: Coordinate<f64>,
    quadrant: Quadrant,
    label: Label,
}

impl EdgeEnd {
    /// Edge end of `edge` leaving `p0` towards `p1`.
    pub fn new(edge: usize, p0: Coordinate<f64>, p1: Coordinate<f64>, label: Label) -> Result<Self> {
        let quadrant = Quadrant::of(p1.x - p0.x, p1.y - p0.y)
            .ok_or_else(|| OverlayError::topology("zero length edge end", p0))?;
        Ok(EdgeEnd {
            edge,
            p0,
            p1,
            quadrant,
            label,
        })
    }

    #[inline]
    pub fn edge(&self) -> usize {
        self.edge
    }

    /// The node coordinate.
    #[inline]
    pub fn coord(&self) -> Coordinate<f64> {
        self.p0
    }

    #[inline]
    pub fn direction_coord(&self) -> Coordinate<f64> {
        self.p1
    }

    #[inline]
    pub fn quadrant(&self) -> Quadrant {
        self.quadrant
    }

    #[inline]
    pub fn label(&self) -> &Label {
        &self.label
    }

    #[inline]
    pub fn label_mut(&mut self) -> &mut Label {
        &mut self.label
    }

    /// Angular order of edge ends at a common node: counter-clockwise
    /// from the positive x axis. Quadrants decide first; within one the
    /// robust orientation test decides.
    pub fn compare_direction(&self, other: &EdgeEnd) -> Ordering {
        if self.p1 - self.p0 == other.p1 - other.p0 {
            return Ordering::Equal;
        }
        match self.quadrant.cmp(&other.quadrant) {
            Ordering::Equal => {}
            ord => return ord,
        }
        match orientation_index(other.p0, other.p1, self.p1) {
            Orientation::CounterClockwise => Ordering::Greater,
            Orientation::Clockwise => Ordering::Less,
            Orientation::Collinear => Ordering::Equal,
        }
    }
}
