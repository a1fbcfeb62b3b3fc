use std::collections::BTreeMap;

use geo::Coordinate;
use slab::Slab;

use crate::{label::Label, ord_coord::OrdCoord, Location};

/// A graph node: a coordinate, its label and the star of edge ends
/// around it. The star type depends on the graph: the per-input graphs
/// keep none, overlay keeps directed edges and relate keeps edge end
/// bundles.
#[derive(Debug, Clone)]
pub struct Node<S> {
    coord: Coordinate<f64>,
    label: Label,
    star: S,
}

impl<S> Node<S> {
    #[inline]
    pub fn coord(&self) -> Coordinate<f64> {
        self.coord
    }

    #[inline]
    pub fn label(&self) -> &Label {
        &self.label
    }

    #[inline]
    pub fn label_mut(&mut self) -> &mut Label {
        &mut self.label
    }

    #[inline]
    pub fn star(&self) -> &S {
        &self.star
    }

    #[inline]
    pub fn star_mut(&mut self) -> &mut S {
        &mut self.star
    }

    /// Set the `On` location for one geometry.
    pub fn set_location(&mut self, geom_index: usize, loc: Location) {
        self.label.set_on(geom_index, loc);
    }

    /// A node is isolated if only one geometry labels it.
    pub fn is_isolated(&self) -> bool {
        self.label.geometry_count() == 1
    }
}

/// Nodes deduplicated by coordinate. Iteration is in coordinate order.
#[derive(Debug, Clone)]
pub struct NodeMap<S> {
    nodes: Slab<Node<S>>,
    index: BTreeMap<OrdCoord, usize>,
}

impl<S> Default for NodeMap<S> {
    fn default() -> Self {
        NodeMap {
            nodes: Slab::new(),
            index: BTreeMap::new(),
        }
    }
}

impl<S: Default> NodeMap<S> {
    /// Id of the node at `coord`, creating it if absent.
    pub fn add_node(&mut self, coord: Coordinate<f64>) -> usize {
        let nodes = &mut self.nodes;
        *self.index.entry(OrdCoord::from(coord)).or_insert_with(|| {
            nodes.insert(Node {
                coord,
                label: Label::default(),
                star: S::default(),
            })
        })
    }
}

impl<S> NodeMap<S> {
    pub fn find(&self, coord: Coordinate<f64>) -> Option<usize> {
        self.index.get(&OrdCoord::from(coord)).copied()
    }

    #[inline]
    pub fn get(&self, id: usize) -> &Node<S> {
        &self.nodes[id]
    }

    #[inline]
    pub fn get_mut(&mut self, id: usize) -> &mut Node<S> {
        &mut self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node ids in coordinate order.
    pub fn ids(&self) -> Vec<usize> {
        self.index.values().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node<S>> + '_ {
        self.index.values().map(move |&id| &self.nodes[id])
    }

    /// Coordinates of the nodes whose location in `geom_index` is
    /// `Boundary`.
    pub fn boundary_coords(&self, geom_index: usize) -> Vec<Coordinate<f64>> {
        self.iter()
            .filter(|n| n.label().on(geom_index) == Location::Boundary)
            .map(|n| n.coord())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nodes_dedup_by_coord() {
        let mut map: NodeMap<()> = NodeMap::default();
        let a = map.add_node(Coordinate { x: 1., y: 2. });
        let b = map.add_node(Coordinate { x: 0., y: 5. });
        assert_eq!(map.add_node(Coordinate { x: 1., y: 2. }), a);
        assert_eq!(map.len(), 2);
        assert_eq!(map.ids(), vec![b, a]);

        map.get_mut(a).set_location(0, Location::Boundary);
        assert!(map.get(a).is_isolated());
        assert_eq!(map.boundary_coords(0), vec![Coordinate { x: 1., y: 2. }]);
    }
}
