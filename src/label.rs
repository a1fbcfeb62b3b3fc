//! Topology labels of graph components.
//!
//! A [`TopologyLocation`] records where a component lies relative to one
//! input geometry; a [`Label`] pairs one for each of the two inputs.
use std::fmt::Display;

use crate::{Location, Position};

/// Locations of a graph component relative to a single geometry.
///
/// Line labels carry only the `On` location; area labels also carry the
/// locations to the `Left` and `Right` of the (directed) component.
/// Values are immutable; all updates return a new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyLocation {
    Line {
        on: Location,
    },
    Area {
        on: Location,
        left: Location,
        right: Location,
    },
}

impl TopologyLocation {
    #[inline]
    pub fn line(on: Location) -> Self {
        TopologyLocation::Line { on }
    }

    #[inline]
    pub fn area(on: Location, left: Location, right: Location) -> Self {
        TopologyLocation::Area { on, left, right }
    }

    #[inline]
    pub fn empty_line() -> Self {
        Self::line(Location::Unknown)
    }

    #[inline]
    pub fn empty_area() -> Self {
        Self::area(Location::Unknown, Location::Unknown, Location::Unknown)
    }

    /// Location at `pos`; `Unknown` for side positions of a line label.
    pub fn get(&self, pos: Position) -> Location {
        match (*self, pos) {
            (TopologyLocation::Line { on }, Position::On) => on,
            (TopologyLocation::Line { .. }, _) => Location::Unknown,
            (TopologyLocation::Area { on, .. }, Position::On) => on,
            (TopologyLocation::Area { left, .. }, Position::Left) => left,
            (TopologyLocation::Area { right, .. }, Position::Right) => right,
        }
    }

    #[inline]
    pub fn on(&self) -> Location {
        self.get(Position::On)
    }

    #[inline]
    pub fn is_area(&self) -> bool {
        matches!(self, TopologyLocation::Area { .. })
    }

    #[inline]
    pub fn is_line(&self) -> bool {
        matches!(self, TopologyLocation::Line { .. })
    }

    /// All locations unknown.
    pub fn is_null(&self) -> bool {
        match *self {
            TopologyLocation::Line { on } => !on.is_known(),
            TopologyLocation::Area { on, left, right } => {
                !on.is_known() && !left.is_known() && !right.is_known()
            }
        }
    }

    /// Some location unknown.
    pub fn is_any_null(&self) -> bool {
        match *self {
            TopologyLocation::Line { on } => !on.is_known(),
            TopologyLocation::Area { on, left, right } => {
                !on.is_known() || !left.is_known() || !right.is_known()
            }
        }
    }

    /// Every position carried by this label equals `loc`.
    pub fn all_positions_equal(&self, loc: Location) -> bool {
        match *self {
            TopologyLocation::Line { on } => on == loc,
            TopologyLocation::Area { on, left, right } => on == loc && left == loc && right == loc,
        }
    }

    pub fn is_equal_on_side(&self, other: &Self, pos: Position) -> bool {
        self.get(pos) == other.get(pos)
    }

    /// Set the location at `pos`. Setting a side of a line label turns it
    /// into an area label.
    pub fn with_location(self, pos: Position, loc: Location) -> Self {
        let (on, left, right) = match self {
            TopologyLocation::Line { on } => {
                if pos == Position::On {
                    return TopologyLocation::Line { on: loc };
                }
                (on, Location::Unknown, Location::Unknown)
            }
            TopologyLocation::Area { on, left, right } => (on, left, right),
        };
        match pos {
            Position::On => TopologyLocation::Area { on: loc, left, right },
            Position::Left => TopologyLocation::Area { on, left: loc, right },
            Position::Right => TopologyLocation::Area { on, left, right: loc },
        }
    }

    pub fn with_all_locations(self, loc: Location) -> Self {
        match self {
            TopologyLocation::Line { .. } => TopologyLocation::line(loc),
            TopologyLocation::Area { .. } => TopologyLocation::area(loc, loc, loc),
        }
    }

    /// Replace only the unknown locations with `loc`.
    pub fn with_all_locations_if_unknown(self, loc: Location) -> Self {
        let fill = |l: Location| if l.is_known() { l } else { loc };
        match self {
            TopologyLocation::Line { on } => TopologyLocation::line(fill(on)),
            TopologyLocation::Area { on, left, right } => {
                TopologyLocation::area(fill(on), fill(left), fill(right))
            }
        }
    }

    /// Swap left and right.
    pub fn flip(self) -> Self {
        match self {
            TopologyLocation::Area { on, left, right } => TopologyLocation::Area {
                on,
                left: right,
                right: left,
            },
            line => line,
        }
    }

    /// Drop the side locations.
    pub fn to_line(self) -> Self {
        TopologyLocation::line(self.on())
    }

    /// Fill unknown locations of `self` from `other`. A line label is
    /// expanded to an area label if `other` is one.
    pub fn merge(self, other: &Self) -> Self {
        let base = match (self, other) {
            (TopologyLocation::Line { on }, TopologyLocation::Area { .. }) => {
                TopologyLocation::area(on, Location::Unknown, Location::Unknown)
            }
            (s, _) => s,
        };
        let pick = |mine: Location, theirs: Location| if mine.is_known() { mine } else { theirs };
        match base {
            TopologyLocation::Line { on } => TopologyLocation::line(pick(on, other.on())),
            TopologyLocation::Area { on, left, right } => TopologyLocation::area(
                pick(on, other.get(Position::On)),
                pick(left, other.get(Position::Left)),
                pick(right, other.get(Position::Right)),
            ),
        }
    }
}

impl Display for TopologyLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TopologyLocation::Line { on } => write!(f, "{on}"),
            TopologyLocation::Area { on, left, right } => write!(f, "{left}{on}{right}"),
        }
    }
}

/// Topological relationship of a graph component to both input
/// geometries (indexed `0` and `1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label {
    elt: [TopologyLocation; 2],
}

impl Default for Label {
    fn default() -> Self {
        Label::empty_line()
    }
}

impl Label {
    /// Label for a node/point of geometry `geom_index`.
    pub fn point(geom_index: usize, on: Location) -> Self {
        Self::line(geom_index, on)
    }

    /// Label for a line edge of geometry `geom_index`.
    pub fn line(geom_index: usize, on: Location) -> Self {
        let mut elt = [TopologyLocation::empty_line(); 2];
        elt[geom_index] = TopologyLocation::line(on);
        Label { elt }
    }

    /// Label for an area edge of geometry `geom_index`.
    pub fn area(geom_index: usize, on: Location, left: Location, right: Location) -> Self {
        let mut elt = [TopologyLocation::empty_area(); 2];
        elt[geom_index] = TopologyLocation::area(on, left, right);
        Label { elt }
    }

    /// Same `on` location for both geometries.
    pub fn uniform(on: Location) -> Self {
        Label {
            elt: [TopologyLocation::line(on); 2],
        }
    }

    pub fn empty_line() -> Self {
        Label {
            elt: [TopologyLocation::empty_line(); 2],
        }
    }

    pub fn empty_area() -> Self {
        Label {
            elt: [TopologyLocation::empty_area(); 2],
        }
    }

    #[inline]
    pub fn topology_location(&self, geom_index: usize) -> TopologyLocation {
        self.elt[geom_index]
    }

    #[inline]
    pub fn location(&self, geom_index: usize, pos: Position) -> Location {
        self.elt[geom_index].get(pos)
    }

    #[inline]
    pub fn on(&self, geom_index: usize) -> Location {
        self.elt[geom_index].on()
    }

    pub fn set_location(&mut self, geom_index: usize, pos: Position, loc: Location) {
        self.elt[geom_index] = self.elt[geom_index].with_location(pos, loc);
    }

    pub fn set_on(&mut self, geom_index: usize, loc: Location) {
        self.set_location(geom_index, Position::On, loc);
    }

    pub fn set_all_locations(&mut self, geom_index: usize, loc: Location) {
        self.elt[geom_index] = self.elt[geom_index].with_all_locations(loc);
    }

    pub fn set_all_locations_if_unknown(&mut self, geom_index: usize, loc: Location) {
        self.elt[geom_index] = self.elt[geom_index].with_all_locations_if_unknown(loc);
    }

    /// Fill unknown locations of both geometries with `loc`.
    pub fn set_all_if_unknown(&mut self, loc: Location) {
        self.set_all_locations_if_unknown(0, loc);
        self.set_all_locations_if_unknown(1, loc);
    }

    /// Fill unknown locations from `other`.
    pub fn merge(&mut self, other: &Label) {
        for i in 0..2 {
            self.elt[i] = self.elt[i].merge(&other.elt[i]);
        }
    }

    pub fn flip(&mut self) {
        self.elt = [self.elt[0].flip(), self.elt[1].flip()];
    }

    pub fn flipped(mut self) -> Self {
        self.flip();
        self
    }

    /// Drop side locations of geometry `geom_index`.
    pub fn to_line_for(&mut self, geom_index: usize) {
        self.elt[geom_index] = self.elt[geom_index].to_line();
    }

    /// Copy with side locations dropped for both geometries.
    pub fn to_line_label(&self) -> Label {
        Label {
            elt: [self.elt[0].to_line(), self.elt[1].to_line()],
        }
    }

    /// Number of geometries with some known location.
    pub fn geometry_count(&self) -> usize {
        self.elt.iter().filter(|tl| !tl.is_null()).count()
    }

    #[inline]
    pub fn is_null(&self, geom_index: usize) -> bool {
        self.elt[geom_index].is_null()
    }

    #[inline]
    pub fn is_any_null(&self, geom_index: usize) -> bool {
        self.elt[geom_index].is_any_null()
    }

    /// Some geometry carries side locations.
    pub fn is_area(&self) -> bool {
        self.elt[0].is_area() || self.elt[1].is_area()
    }

    #[inline]
    pub fn is_area_for(&self, geom_index: usize) -> bool {
        self.elt[geom_index].is_area()
    }

    #[inline]
    pub fn is_line(&self, geom_index: usize) -> bool {
        self.elt[geom_index].is_line()
    }

    pub fn is_equal_on_side(&self, other: &Label, pos: Position) -> bool {
        self.elt[0].is_equal_on_side(&other.elt[0], pos)
            && self.elt[1].is_equal_on_side(&other.elt[1], pos)
    }

    pub fn all_positions_equal(&self, geom_index: usize, loc: Location) -> bool {
        self.elt[geom_index].all_positions_equal(loc)
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "A:{} B:{}", self.elt[0], self.elt[1])
    }
}

const NULL_DEPTH: i32 = -1;

/// Side depths of an edge that several coincident input edges merged
/// into.
///
/// Each coincident area edge with `Interior` on a side adds one to the
/// depth of that side; after normalisation a side is interior iff its
/// depth exceeds the other's. Equal depths on both sides mean the area
/// collapsed onto the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Depth {
    depth: [[i32; 3]; 2],
}

impl Default for Depth {
    fn default() -> Self {
        Depth {
            depth: [[NULL_DEPTH; 3]; 2],
        }
    }
}

impl Depth {
    fn depth_at_location(loc: Location) -> i32 {
        match loc {
            Location::Exterior => 0,
            Location::Interior => 1,
            _ => NULL_DEPTH,
        }
    }

    #[inline]
    pub fn get(&self, geom_index: usize, pos: Position) -> i32 {
        self.depth[geom_index][pos.index()]
    }

    pub fn is_null(&self) -> bool {
        self.depth.iter().flatten().all(|&d| d == NULL_DEPTH)
    }

    pub fn is_null_for(&self, geom_index: usize) -> bool {
        self.depth[geom_index][Position::Left.index()] == NULL_DEPTH
    }

    /// Accumulate the side locations of a label.
    pub fn add(&mut self, label: &Label) {
        for i in 0..2 {
            for pos in [Position::Left, Position::Right] {
                let loc = label.location(i, pos);
                if loc == Location::Exterior || loc == Location::Interior {
                    let d = &mut self.depth[i][pos.index()];
                    if *d == NULL_DEPTH {
                        *d = Self::depth_at_location(loc);
                    } else {
                        *d += Self::depth_at_location(loc);
                    }
                }
            }
        }
    }

    /// Location implied by the (normalised) depth.
    pub fn location(&self, geom_index: usize, pos: Position) -> Location {
        if self.get(geom_index, pos) <= 0 {
            Location::Exterior
        } else {
            Location::Interior
        }
    }

    /// Right minus left depth.
    pub fn delta(&self, geom_index: usize) -> i32 {
        self.get(geom_index, Position::Right) - self.get(geom_index, Position::Left)
    }

    /// Reduce depths to 0 or 1, keeping their relative order.
    pub fn normalize(&mut self) {
        for i in 0..2 {
            if self.is_null_for(i) {
                continue;
            }
            let sides = [Position::Left.index(), Position::Right.index()];
            let min_depth = sides
                .iter()
                .map(|&j| self.depth[i][j])
                .min()
                .unwrap_or(0)
                .max(0);
            for j in sides {
                self.depth[i][j] = if self.depth[i][j] > min_depth { 1 } else { 0 };
            }
        }
    }
}
