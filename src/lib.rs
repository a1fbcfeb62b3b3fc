//! Planar topology graphs over [`geo`] geometries, with the operations
//! built on them.
//!
//! 1. [Overlay](#overlay)
//! 1. [Relate](#relate)
//! 1. [Simplicity](#simplicity)
//!
//! Every operation nodes its inputs with a robust line intersector (see
//! [`RobustLineIntersector`]), builds a labelled topology graph of the
//! split edges and reads its answer off the labels. Each label records,
//! for both inputs, whether an edge or node is in the interior, on the
//! boundary or in the exterior of that input.
//!
//! # Overlay
//!
//! [`overlay`] computes the intersection, union, difference or symmetric
//! difference of two geometries of any dimension. The [`BooleanOps`]
//! trait offers the same on anything convertible to a
//! [`Geometry`](geo::Geometry).
//!
//! ```rust
//! use geo::{algorithm::area::Area, Polygon};
//! use geo_overlay::BooleanOps;
//! use wkt::TryFromWkt;
//!
//! let a = Polygon::<f64>::try_from_wkt_str("POLYGON((0 0,10 0,10 10,0 10,0 0))").unwrap();
//! let b = Polygon::<f64>::try_from_wkt_str("POLYGON((5 5,15 5,15 15,5 15,5 5))").unwrap();
//! assert_eq!(a.union(&b).unwrap().unsigned_area(), 175.);
//! ```
//!
//! # Relate
//!
//! [`relate`] computes the DE-9IM [`IntersectionMatrix`] of two
//! geometries; the named predicates ([`touches`], [`within`], ...) are
//! evaluated on it.
//!
//! # Simplicity
//!
//! [`is_simple`] tests a geometry for self-intersections other than at
//! line endpoints.
mod error;
pub use error::{DdParseError, OverlayError, Result};

mod dd;
pub use dd::DD;

mod ord_coord;

pub mod kernel;

mod precision;
pub use precision::PrecisionModel;

mod intersector;
pub use intersector::{IntersectionKind, RobustLineIntersector, SegmentIntersection};

mod location;
pub use location::{Location, Position};

mod label;
pub use label::{Depth, Label, TopologyLocation};

mod boundary_rule;
pub use boundary_rule::BoundaryNodeRule;

mod geometry;
pub use geometry::{dimension, Dimension};

pub mod locate;
pub use locate::PointLocator;

pub mod geomgraph;

pub mod overlay;
pub use overlay::{overlay, overlay_with_config, BooleanOps, OpConfig, OpType, OverlayOp};

pub mod relate;
pub use relate::{
    contains, covered_by, covers, crosses, disjoint, equals, intersects, overlaps, relate,
    relate_with_rule, touches, within, IntersectionMatrix,
};

pub mod simple;
pub use simple::{is_simple, is_simple_with_rule, IsSimpleOp};

#[cfg(test)]
#[path = "../benches/utils/random.rs"]
pub mod random;
