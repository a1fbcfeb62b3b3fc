use geo::{Coordinate, LineString, Polygon};
use log::debug;

use super::{is_result_of_op, OpType};
use crate::{
    geomgraph::{sym, PlanarGraph},
    locate::locate_in_polygon,
    Location,
};

/// Collects the line edges of the result: edges of the inputs' linear
/// parts that satisfy the operation and are not covered by a result area,
/// plus, for intersections, area boundaries touching the other area.
pub(crate) struct LineBuilder<'a> {
    op: OpType,
    result_polys: &'a [Polygon<f64>],
}

impl<'a> LineBuilder<'a> {
    pub fn new(op: OpType, result_polys: &'a [Polygon<f64>]) -> Self {
        LineBuilder { op, result_polys }
    }

    pub fn build(&self, graph: &mut PlanarGraph) -> Vec<LineString<f64>> {
        self.find_covered_line_edges(graph);

        let mut line_edges = vec![];
        for de in 0..graph.dir_edges().len() {
            self.collect_line_edge(graph, de, &mut line_edges);
            self.collect_boundary_touch_edge(graph, de, &mut line_edges);
        }

        let lines = line_edges
            .into_iter()
            .map(|e| {
                graph.edge_mut(e).set_in_result(true);
                LineString(graph.edge(e).coords().to_vec())
            })
            .collect::<Vec<_>>();
        debug!("line builder: {n} result lines", n = lines.len());
        lines
    }

    fn is_covered_by_area(&self, coord: Coordinate<f64>) -> bool {
        self.result_polys
            .iter()
            .any(|poly| locate_in_polygon(coord, poly) != Location::Exterior)
    }

    /// Decide coverage of line edges: first by walking each star relative
    /// to the result area edges, then by locating the rest against the
    /// result polygons.
    fn find_covered_line_edges(&self, graph: &mut PlanarGraph) {
        for node in graph.nodes().ids() {
            let star = graph.nodes().get(node).star().edges().to_vec();

            let start_loc = star.iter().find_map(|&out| {
                let d_out = graph.dir_edge(out);
                if d_out.is_line_edge() {
                    None
                } else if d_out.in_result() {
                    Some(Location::Interior)
                } else if graph.dir_edge(sym(out)).in_result() {
                    Some(Location::Exterior)
                } else {
                    None
                }
            });
            let mut curr = match start_loc {
                Some(loc) => loc,
                None => continue,
            };

            for &out in &star {
                if graph.dir_edge(out).is_line_edge() {
                    let edge = graph.dir_edge(out).edge();
                    graph.edge_mut(edge).set_covered(curr == Location::Interior);
                } else {
                    if graph.dir_edge(out).in_result() {
                        curr = Location::Exterior;
                    }
                    if graph.dir_edge(sym(out)).in_result() {
                        curr = Location::Interior;
                    }
                }
            }
        }

        for de in 0..graph.dir_edges().len() {
            let d = graph.dir_edge(de);
            let edge = d.edge();
            if d.is_line_edge() && !graph.edge(edge).is_covered_set() {
                let covered = self.is_covered_by_area(d.coord());
                graph.edge_mut(edge).set_covered(covered);
            }
        }
    }

    fn collect_line_edge(&self, graph: &mut PlanarGraph, de: usize, out: &mut Vec<usize>) {
        let d = graph.dir_edge(de);
        if !d.is_line_edge() || d.is_visited() {
            return;
        }
        let edge = d.edge();
        if is_result_of_op(d.label(), self.op) && !graph.edge(edge).is_covered() {
            out.push(edge);
            graph.set_visited_edge(de, true);
        }
    }

    /// Area edges in the boundary of both inputs belong to an
    /// intersection result as lines when no result area uses them.
    fn collect_boundary_touch_edge(&self, graph: &mut PlanarGraph, de: usize, out: &mut Vec<usize>) {
        let d = graph.dir_edge(de);
        let edge = d.edge();
        if d.is_line_edge()
            || d.is_visited()
            || d.is_interior_area_edge()
            || graph.edge(edge).in_result()
        {
            return;
        }
        if self.op == OpType::Intersection && is_result_of_op(d.label(), self.op) {
            out.push(edge);
            graph.set_visited_edge(de, true);
        }
    }
}
