//! Planar topology graphs.
//!
//! A [`GeometryGraph`] holds the noded edges and nodes of one input. The
//! split edges of both inputs are merged into a [`PlanarGraph`] of
//! directed edges for overlay, or into stars of edge-end bundles for
//! relate.
mod edge;
pub use edge::{Edge, EdgeIntersection, EdgeIntersectionList, EdgeList};

mod node;
pub use node::{Node, NodeMap};

mod edge_end;
pub use edge_end::{EdgeEnd, Quadrant};

mod index;
pub use index::{validate_noding, IntersectionSummary, SegmentIntersector};

mod geometry_graph;
pub use geometry_graph::GeometryGraph;

pub(crate) mod star;

mod planar_graph;
pub use planar_graph::{sym, DirectedEdge, DirectedEdgeStar, PlanarGraph};
