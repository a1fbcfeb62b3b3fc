use std::collections::BTreeSet;

use geo::{Coordinate, LineString, Polygon, Rect};
use log::{debug, trace};

use crate::{
    error::{OverlayError, Result},
    geomgraph::{Edge, PlanarGraph},
    kernel::{is_ccw, signed_ring_area},
    locate::is_in_ring,
    ord_coord::OrdCoord,
};

/// A closed ring of result directed edges.
///
/// Maximal rings follow the `next` links set while linking result edges
/// and may pass through a node more than once. Minimal rings follow
/// `next_min` and never do.
#[derive(Debug, Clone)]
struct EdgeRing {
    edges: Vec<usize>,
    pts: Vec<Coordinate<f64>>,
    is_hole: bool,
    shell: Option<usize>,
    holes: Vec<usize>,
    envelope: Rect<f64>,
}

impl EdgeRing {
    fn new(graph: &mut PlanarGraph, start: usize, id: usize, minimal: bool) -> Result<Self> {
        let mut edges = vec![];
        let mut pts = vec![];
        let mut de = start;
        loop {
            let (coord, assigned, next) = {
                let d = graph.dir_edge(de);
                if minimal {
                    (d.coord(), d.min_edge_ring, d.next_min)
                } else {
                    (d.coord(), d.edge_ring, d.next)
                }
            };
            if assigned == Some(id) {
                return Err(OverlayError::topology(
                    "directed edge visited twice during ring-building",
                    coord,
                ));
            }

            let d = graph.dir_edge(de);
            debug_assert!(d.label().is_area());
            add_points(&mut pts, graph.edge(d.edge()), d.is_forward(), edges.is_empty());
            edges.push(de);

            let d = graph.dir_edge_mut(de);
            if minimal {
                d.min_edge_ring = Some(id);
            } else {
                d.edge_ring = Some(id);
            }

            de = next.ok_or_else(|| OverlayError::topology("found null directed edge", coord))?;
            if de == start {
                break;
            }
        }

        let envelope = ring_envelope(&pts);
        let is_hole = is_ccw(&pts);
        trace!(
            "{kind} ring of {n} edges, hole: {is_hole}",
            kind = if minimal { "minimal" } else { "maximal" },
            n = edges.len()
        );
        Ok(EdgeRing {
            edges,
            pts,
            is_hole,
            shell: None,
            holes: vec![],
            envelope,
        })
    }
}

fn add_points(pts: &mut Vec<Coordinate<f64>>, edge: &Edge, is_forward: bool, is_first: bool) {
    let coords = edge.coords();
    let skip = if is_first { 0 } else { 1 };
    if is_forward {
        pts.extend(coords.iter().skip(skip));
    } else {
        pts.extend(coords.iter().rev().skip(skip));
    }
}

fn ring_envelope(pts: &[Coordinate<f64>]) -> Rect<f64> {
    let first = pts[0];
    let (min, max) = pts.iter().fold((first, first), |(min, max), c| {
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
    Rect::new(min, max)
}

fn rect_contains_rect(outer: &Rect<f64>, inner: &Rect<f64>) -> bool {
    outer.min().x <= inner.min().x
        && outer.min().y <= inner.min().y
        && outer.max().x >= inner.max().x
        && outer.max().y >= inner.max().y
}

/// Assembles the result area edges of a labelled overlay graph into
/// polygons.
#[derive(Debug, Default)]
pub(crate) struct PolygonBuilder {
    rings: Vec<EdgeRing>,
    shells: Vec<usize>,
}

impl PolygonBuilder {
    pub fn build(graph: &mut PlanarGraph) -> Result<Vec<Polygon<f64>>> {
        let mut builder = PolygonBuilder::default();
        graph.link_result_directed_edges()?;

        let max_rings = builder.build_maximal_rings(graph)?;
        let mut free_holes = vec![];
        let mut rings = vec![];
        for ring in max_rings {
            if builder.max_node_degree(graph, ring) > 2 {
                builder.split_into_minimal_rings(graph, ring, &mut free_holes)?;
            } else {
                rings.push(ring);
            }
        }
        for ring in rings {
            if builder.rings[ring].is_hole {
                free_holes.push(ring);
            } else {
                builder.shells.push(ring);
            }
        }
        builder.place_free_holes(free_holes)?;
        debug!(
            "polygon builder: {r} rings, {s} shells",
            r = builder.rings.len(),
            s = builder.shells.len()
        );
        Ok(builder.polygons())
    }

    fn build_maximal_rings(&mut self, graph: &mut PlanarGraph) -> Result<Vec<usize>> {
        let mut out = vec![];
        for de in 0..graph.dir_edges().len() {
            let d = graph.dir_edge(de);
            if !(d.in_result() && d.label().is_area() && d.edge_ring.is_none()) {
                continue;
            }
            let id = self.rings.len();
            let ring = EdgeRing::new(graph, de, id, false)?;
            for &e in &ring.edges {
                let edge = graph.dir_edge(e).edge();
                graph.edge_mut(edge).set_in_result(true);
            }
            self.rings.push(ring);
            out.push(id);
        }
        Ok(out)
    }

    fn max_node_degree(&self, graph: &PlanarGraph, ring: usize) -> usize {
        self.rings[ring]
            .edges
            .iter()
            .map(|&de| graph.outgoing_degree(graph.dir_edge(de).node(), ring))
            .max()
            .unwrap_or(0)
    }

    /// Split a maximal ring that touches itself into minimal rings. At most
    /// one of them can be a shell; the rest are its holes, or free holes if
    /// there is no shell.
    fn split_into_minimal_rings(
        &mut self,
        graph: &mut PlanarGraph,
        ring: usize,
        free_holes: &mut Vec<usize>,
    ) -> Result<()> {
        let edges = self.rings[ring].edges.clone();
        for &de in &edges {
            let node = graph.dir_edge(de).node();
            graph.link_minimal_directed_edges(node, ring)?;
        }

        let mut minimal = vec![];
        for &de in &edges {
            if graph.dir_edge(de).min_edge_ring.is_none() {
                let id = self.rings.len();
                self.rings.push(EdgeRing::new(graph, de, id, true)?);
                minimal.push(id);
            }
        }

        let shells: Vec<usize> = minimal
            .iter()
            .copied()
            .filter(|&r| !self.rings[r].is_hole)
            .collect();
        match shells.as_slice() {
            [] => free_holes.extend(minimal),
            [shell] => {
                let shell = *shell;
                for &r in &minimal {
                    if self.rings[r].is_hole {
                        self.set_shell(r, shell);
                    }
                }
                self.shells.push(shell);
            }
            [_, second, ..] => {
                return Err(OverlayError::topology(
                    "found two shells in minimal edge ring list",
                    self.rings[*second].pts[0],
                ))
            }
        }
        Ok(())
    }

    fn set_shell(&mut self, hole: usize, shell: usize) {
        self.rings[hole].shell = Some(shell);
        self.rings[shell].holes.push(hole);
    }

    fn place_free_holes(&mut self, free_holes: Vec<usize>) -> Result<()> {
        for hole in free_holes {
            if self.rings[hole].shell.is_some() {
                continue;
            }
            let shell = self.find_ring_containing(hole).ok_or_else(|| {
                OverlayError::topology("unable to assign hole to a shell", self.rings[hole].pts[0])
            })?;
            self.set_shell(hole, shell);
        }
        Ok(())
    }

    /// The smallest shell containing the ring, if any.
    fn find_ring_containing(&self, test: usize) -> Option<usize> {
        let test = &self.rings[test];
        let mut min_shell: Option<usize> = None;
        for &shell in &self.shells {
            let candidate = &self.rings[shell];
            if candidate.envelope == test.envelope
                || !rect_contains_rect(&candidate.envelope, &test.envelope)
            {
                continue;
            }
            let shell_pts: BTreeSet<OrdCoord> =
                candidate.pts.iter().map(|&c| OrdCoord::from(c)).collect();
            let test_pt = test
                .pts
                .iter()
                .find(|&&c| !shell_pts.contains(&OrdCoord::from(c)));
            let contained = match test_pt {
                Some(&p) => is_in_ring(p, &candidate.pts),
                None => false,
            };
            let smaller = match min_shell {
                None => true,
                Some(m) => rect_contains_rect(&self.rings[m].envelope, &candidate.envelope),
            };
            if contained && smaller {
                min_shell = Some(shell);
            }
        }
        min_shell
    }

    fn polygons(&self) -> Vec<Polygon<f64>> {
        self.shells
            .iter()
            .map(|&s| &self.rings[s])
            .filter(|shell| signed_ring_area(&shell.pts) != 0.0)
            .map(|shell| {
                let holes = shell
                    .holes
                    .iter()
                    .map(|&h| LineString(self.rings[h].pts.clone()))
                    .collect();
                Polygon::new(LineString(shell.pts.clone()), holes)
            })
            .collect()
    }
}
