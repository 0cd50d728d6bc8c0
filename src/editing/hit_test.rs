// Copyright 2025 the Geoedit Authors
// SPDX-License-Identifier: Apache-2.0

//! Nearest-feature search over a geometry tree
//!
//! Walks every vertex and edge of a geometry, measuring distance from a
//! world-space point. Used by the snapping service and by front-ends that
//! need to turn a click into a `GeometryIndex`.

use crate::math::{self, EPSILON};
use crate::model::{Geometry, GeometryIndex, GeometryKind};
use kurbo::Point;

/// What kind of feature was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Vertex,
    Edge,
}

/// Result of a nearest-feature search
#[derive(Debug, Clone, PartialEq)]
pub struct HitTestResult {
    /// `Vertex(n)` or `Edge(n)` index of the feature
    pub index: GeometryIndex,
    pub kind: FeatureKind,
    /// Closest point on the feature (the vertex itself, or the projection
    /// onto the edge)
    pub point: Point,
    pub distance: f64,
}

impl HitTestResult {
    /// Whether `self` should replace `best` as the nearest feature
    ///
    /// Vertices win ties against edges; otherwise the first found wins.
    pub(crate) fn beats(&self, best: &HitTestResult) -> bool {
        if self.distance < best.distance - EPSILON {
            return true;
        }
        self.distance <= best.distance + EPSILON
            && self.kind == FeatureKind::Vertex
            && best.kind == FeatureKind::Edge
    }
}

/// Find the vertex or edge of `geometry` nearest to `point`
///
/// The closing coordinate of a closed ring is not reported as a separate
/// vertex; vertex 0 stands for both ends.
pub fn nearest_feature(geometry: &Geometry, point: Point) -> Option<HitTestResult> {
    let mut best = None;
    visit(geometry, &GeometryIndex::root(), point, &mut best);
    best
}

/// Hit test a world point against a geometry
///
/// Returns the index of the nearest vertex or edge within `tolerance`,
/// plus its distance.
pub fn hit_test(
    geometry: &Geometry,
    point: Point,
    tolerance: f64,
) -> Option<(GeometryIndex, f64)> {
    let hit = nearest_feature(geometry, point).filter(|hit| hit.distance <= tolerance);
    tracing::debug!(
        "[hit_test] ({}, {}) tolerance={} -> {:?}",
        point.x,
        point.y,
        tolerance,
        hit.as_ref().map(|h| h.index.to_string())
    );
    hit.map(|hit| (hit.index, hit.distance))
}

fn offer(best: &mut Option<HitTestResult>, candidate: HitTestResult) {
    match best {
        Some(current) if !candidate.beats(current) => {}
        _ => *best = Some(candidate),
    }
}

fn visit(
    geometry: &Geometry,
    prefix: &GeometryIndex,
    point: Point,
    best: &mut Option<HitTestResult>,
) {
    if geometry.kind().has_children() {
        for (n, child) in geometry.children().iter().enumerate() {
            visit(child, &prefix.child(n), point, best);
        }
        return;
    }

    let coords = geometry.coordinates();
    let vertex_count = if geometry.kind() == GeometryKind::LinearRing && geometry.is_closed() {
        coords.len().saturating_sub(1).max(1)
    } else {
        coords.len()
    };

    for (n, &c) in coords.iter().take(vertex_count).enumerate() {
        offer(
            best,
            HitTestResult {
                index: prefix.vertex(n),
                kind: FeatureKind::Vertex,
                point: c,
                distance: point.distance(c),
            },
        );
    }

    for (n, pair) in coords.windows(2).enumerate() {
        let (nearest, distance) = math::nearest_on_segment(point, pair[0], pair[1]);
        offer(
            best,
            HitTestResult {
                index: prefix.edge(n),
                kind: FeatureKind::Edge,
                point: nearest,
                distance,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::geometry::tests::square;

    #[test]
    fn finds_nearest_vertex() {
        let ring = square(0.0, 0.0, 10.0);
        let hit = nearest_feature(&ring, Point::new(9.0, 9.5)).unwrap();
        assert_eq!(hit.kind, FeatureKind::Vertex);
        assert_eq!(hit.index, GeometryIndex::root().vertex(2));
        assert_eq!(hit.point, Point::new(10.0, 10.0));
    }

    #[test]
    fn finds_nearest_edge_with_projection() {
        let ring = square(0.0, 0.0, 10.0);
        let hit = nearest_feature(&ring, Point::new(5.0, -1.0)).unwrap();
        assert_eq!(hit.kind, FeatureKind::Edge);
        assert_eq!(hit.index, GeometryIndex::root().edge(0));
        assert!((hit.point - Point::new(5.0, 0.0)).hypot() < EPSILON);
        assert!((hit.distance - 1.0).abs() < EPSILON);
    }

    #[test]
    fn vertex_wins_tie_with_edge() {
        // Beyond the end of the segment, the edge projection clamps onto
        // the vertex so both are equally far
        let line = Geometry::line_string(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
        let hit = nearest_feature(&line, Point::new(12.0, 0.0)).unwrap();
        assert_eq!(hit.kind, FeatureKind::Vertex);
        assert_eq!(hit.index, GeometryIndex::root().vertex(1));
    }

    #[test]
    fn closing_vertex_reports_as_zero() {
        let ring = square(0.0, 0.0, 10.0);
        let hit = nearest_feature(&ring, Point::new(0.1, 0.1)).unwrap();
        assert_eq!(hit.index, GeometryIndex::root().vertex(0));
    }

    #[test]
    fn nested_indices_include_geometry_steps() {
        let mp = Geometry::multi_polygon(vec![
            Geometry::polygon(square(0.0, 0.0, 1.0), vec![]),
            Geometry::polygon(square(10.0, 0.0, 10.0), vec![square(12.0, 2.0, 2.0)]),
        ]);
        let (index, distance) = hit_test(&mp, Point::new(14.0, 3.0), 0.5).unwrap();
        assert_eq!(index, GeometryIndex::root().child(1).child(1).edge(1));
        assert!(distance < EPSILON);
    }

    #[test]
    fn hit_test_respects_tolerance() {
        let ring = square(0.0, 0.0, 10.0);
        assert!(hit_test(&ring, Point::new(5.0, 5.0), 1.0).is_none());
        assert!(hit_test(&ring, Point::new(5.0, 5.0), 5.0).is_some());
    }
}
