// Copyright 2025 the Geoedit Authors
// SPDX-License-Identifier: Apache-2.0

//! Snapping service
//!
//! Pulls a dragged point onto the nearest vertex or edge of a set of
//! target geometries when it comes within a screen-space tolerance.
//! Purely functional, so it can run on every pointer move.

use crate::editing::hit_test::{self, FeatureKind, HitTestResult};
use crate::model::{Coordinate, Geometry, GeometryIndex};

/// A successful snap
#[derive(Debug, Clone, PartialEq)]
pub struct Snap {
    /// Where the candidate lands: a vertex, or its projection on an edge
    pub point: Coordinate,
    /// World-space distance from the candidate to `point`
    pub distance: f64,
    pub kind: FeatureKind,
    /// Position of the matched geometry in the target list
    pub target: usize,
    /// Vertex or edge index inside that geometry
    pub index: GeometryIndex,
}

/// Snap `candidate` onto the nearest feature of `targets`
///
/// `tolerance_pixels * pixel_to_world_scale` is the world-space snap
/// radius. Vertices win ties with edges, earlier targets win ties with
/// later ones. Returns `None` when nothing lies within the radius.
pub fn snap(
    candidate: Coordinate,
    targets: &[Geometry],
    tolerance_pixels: f64,
    pixel_to_world_scale: f64,
) -> Option<Snap> {
    let tolerance = tolerance_pixels * pixel_to_world_scale;

    let mut best: Option<(usize, HitTestResult)> = None;
    for (target, geometry) in targets.iter().enumerate() {
        let Some(hit) = hit_test::nearest_feature(geometry, candidate) else {
            continue;
        };
        if best.as_ref().is_none_or(|(_, current)| hit.beats(current)) {
            best = Some((target, hit));
        }
    }

    let (target, hit) = best.filter(|(_, hit)| hit.distance <= tolerance)?;
    tracing::debug!(
        "[snap] ({}, {}) -> {:?} {} of target {} at distance {}",
        candidate.x,
        candidate.y,
        hit.kind,
        hit.index,
        target,
        hit.distance
    );
    Some(Snap {
        point: hit.point,
        distance: hit.distance,
        kind: hit.kind,
        target,
        index: hit.index,
    })
}
