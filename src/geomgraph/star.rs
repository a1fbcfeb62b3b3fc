//! Labelling of the edge ends around a node.
use geo::Coordinate;
use log::trace;

use super::GeometryGraph;
use crate::{
    error::{OverlayError, Result},
    label::Label,
    Location, Position,
};

/// Complete the labels of the edge ends around the node at `coord`.
///
/// `labels` are in counter-clockwise star order. Known side locations of
/// area edges are propagated around the star; anything still unknown is
/// located against the input geometries.
pub(crate) fn label_star(
    labels: &mut [Label],
    coord: Coordinate<f64>,
    graphs: [&GeometryGraph; 2],
) -> Result<()> {
    propagate_side_labels(labels, 0, coord)?;
    propagate_side_labels(labels, 1, coord)?;

    // An edge that is a line in one geometry but on that geometry's
    // boundary is a collapsed area; the area's interior can't reach the
    // node, so the remaining locations are exterior.
    let mut has_dimensional_collapse = [false; 2];
    for lbl in labels.iter() {
        for (i, collapse) in has_dimensional_collapse.iter_mut().enumerate() {
            if lbl.is_line(i) && lbl.on(i) == Location::Boundary {
                *collapse = true;
            }
        }
    }

    let mut located: [Option<Location>; 2] = [None; 2];
    for lbl in labels.iter_mut() {
        for i in 0..2 {
            if !lbl.is_any_null(i) {
                continue;
            }
            let loc = if has_dimensional_collapse[i] {
                Location::Exterior
            } else {
                *located[i].get_or_insert_with(|| graphs[i].locate_area(coord))
            };
            lbl.set_all_locations_if_unknown(i, loc);
        }
    }
    trace!("labelled star at {coord:?}: {n} ends", n = labels.len());
    Ok(())
}

fn propagate_side_labels(
    labels: &mut [Label],
    geom_index: usize,
    coord: Coordinate<f64>,
) -> Result<()> {
    // Any known left location of an area edge starts the walk.
    let start = labels
        .iter()
        .filter(|lbl| lbl.is_area_for(geom_index))
        .map(|lbl| lbl.location(geom_index, Position::Left))
        .filter(|loc| loc.is_known())
        .last();
    let mut curr = match start {
        Some(loc) => loc,
        None => return Ok(()),
    };

    for lbl in labels.iter_mut() {
        if !lbl.on(geom_index).is_known() {
            lbl.set_on(geom_index, curr);
        }
        if !lbl.is_area_for(geom_index) {
            continue;
        }
        let left = lbl.location(geom_index, Position::Left);
        let right = lbl.location(geom_index, Position::Right);
        if right.is_known() {
            if right != curr {
                return Err(OverlayError::topology("side location conflict", coord));
            }
            if !left.is_known() {
                return Err(OverlayError::topology("found single null side", coord));
            }
            curr = left;
        } else {
            if left.is_known() {
                return Err(OverlayError::topology("found single null side", coord));
            }
            lbl.set_location(geom_index, Position::Right, curr);
            lbl.set_location(geom_index, Position::Left, curr);
        }
    }
    Ok(())
}
