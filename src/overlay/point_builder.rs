use geo::{Coordinate, LineString, Point, Polygon};
use log::debug;

use super::{is_result_of_op, OpType};
use crate::{
    geomgraph::PlanarGraph,
    locate::{locate_in_polygon, locate_on_line_string},
    Location,
};

/// Result points: nodes satisfying the operation that are not part of a
/// result edge and not covered by the result lines or areas.
pub(crate) fn build_points(
    graph: &PlanarGraph,
    op: OpType,
    result_lines: &[LineString<f64>],
    result_polys: &[Polygon<f64>],
) -> Vec<Point<f64>> {
    let is_covered = |coord: Coordinate<f64>| {
        result_lines
            .iter()
            .any(|ls| locate_on_line_string(coord, ls) != Location::Exterior)
            || result_polys
                .iter()
                .any(|poly| locate_in_polygon(coord, poly) != Location::Exterior)
    };

    let points: Vec<_> = graph
        .nodes()
        .ids()
        .into_iter()
        .filter(|&id| !graph.is_incident_edge_in_result(id))
        .map(|id| graph.nodes().get(id))
        // Other than for intersection, nodes with edges are only in the
        // result through those edges.
        .filter(|node| node.star().degree() == 0 || op == OpType::Intersection)
        .filter(|node| is_result_of_op(node.label(), op))
        .map(|node| node.coord())
        .filter(|&coord| !is_covered(coord))
        .map(Point)
        .collect();
    debug!("point builder: {n} result points", n = points.len());
    points
}
