// Copyright 2025 the Geoedit Authors
// SPDX-License-Identifier: Apache-2.0

//! Stateless 2D geometry math: segment intersection, nearest points,
//! point-in-ring, bounds, and area.
//!
//! Rings are converted to `kurbo::BezPath` so winding and area come from
//! kurbo's `Shape` implementation.

use crate::model::{Coordinate, Geometry, GeometryKind};
use kurbo::{BezPath, Line, ParamCurve, ParamCurveNearest, Point, Rect, Shape};

/// Tolerance for parametric and collinearity tests
pub const EPSILON: f64 = 1e-9;

/// A crossing between two segments
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub point: Point,
    /// Parameter along the first segment (0.0 to 1.0)
    pub t_a: f64,
    /// Parameter along the second segment (0.0 to 1.0)
    pub t_b: f64,
}

/// Intersection of segments a0-a1 and b0-b1, endpoints included.
///
/// Parallel (and collinear) segments report no intersection.
pub fn segment_intersection(a0: Point, a1: Point, b0: Point, b1: Point) -> Option<Intersection> {
    let d1 = a1 - a0;
    let d2 = b1 - b0;
    let cross = d1.x * d2.y - d1.y * d2.x;

    // Segments are parallel
    if cross.abs() < EPSILON {
        return None;
    }

    let d = b0 - a0;
    let t_a = (d.x * d2.y - d.y * d2.x) / cross;
    let t_b = (d.x * d1.y - d.y * d1.x) / cross;

    let range = -EPSILON..=1.0 + EPSILON;
    if !range.contains(&t_a) || !range.contains(&t_b) {
        return None;
    }

    let t_a = t_a.clamp(0.0, 1.0);
    let t_b = t_b.clamp(0.0, 1.0);
    Some(Intersection {
        point: Line::new(a0, a1).eval(t_a),
        t_a,
        t_b,
    })
}

/// Closest point to `p` on segment a-b and its distance
///
/// The projection is clamped to the segment.
pub fn nearest_on_segment(p: Point, a: Point, b: Point) -> (Point, f64) {
    if a == b {
        return (a, p.distance(a));
    }
    let line = Line::new(a, b);
    let nearest = line.nearest(p, EPSILON);
    (line.eval(nearest.t), nearest.distance_sq.sqrt())
}

/// Whether `c` lies on the line through a and b (within tolerance)
pub fn is_collinear(a: Point, b: Point, c: Point) -> bool {
    let ab = b - a;
    let ac = c - a;
    let cross = ab.x * ac.y - ab.y * ac.x;
    cross.abs() <= EPSILON * ab.hypot().max(1.0) * ac.hypot().max(1.0)
}

/// Whether `p` lies on segment a-b (within tolerance)
pub fn is_on_segment(p: Point, a: Point, b: Point) -> bool {
    nearest_on_segment(p, a, b).1 <= EPSILON
}

/// Build a closed path through a ring's coordinates
pub fn ring_path(ring: &[Coordinate]) -> BezPath {
    let mut path = BezPath::new();
    let mut iter = ring.iter();
    if let Some(first) = iter.next() {
        path.move_to(*first);
        for pt in iter {
            path.line_to(*pt);
        }
        path.close_path();
    }
    path
}

/// Signed area enclosed by a ring (sign follows orientation)
pub fn signed_area(ring: &[Coordinate]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    ring_path(ring).area()
}

/// Whether `p` is inside the ring (non-zero winding)
pub fn point_in_ring(p: Point, ring: &[Coordinate]) -> bool {
    ring.len() >= 3 && ring_path(ring).winding(p) != 0
}

/// Whether `p` is inside a polygon's exterior and outside all its holes
pub fn point_in_polygon(p: Point, polygon: &Geometry) -> bool {
    let Some(exterior) = polygon.exterior() else {
        return false;
    };
    point_in_ring(p, exterior.coordinates())
        && !polygon
            .holes()
            .iter()
            .any(|hole| point_in_ring(p, hole.coordinates()))
}

/// Enclosed area of a geometry: rings and polygons (holes subtracted)
/// contribute, points and lines do not.
pub fn area(geometry: &Geometry) -> f64 {
    match geometry.kind() {
        GeometryKind::LinearRing => signed_area(geometry.coordinates()).abs(),
        GeometryKind::Polygon => {
            let exterior = geometry.exterior().map(area).unwrap_or(0.0);
            let holes: f64 = geometry.holes().iter().map(area).sum();
            exterior - holes
        }
        GeometryKind::MultiPolygon => geometry.children().iter().map(area).sum(),
        GeometryKind::Point
        | GeometryKind::LineString
        | GeometryKind::MultiPoint
        | GeometryKind::MultiLineString => 0.0,
    }
}

/// Axis-aligned bounds of every coordinate, `None` if there are none
pub fn bounds(geometry: &Geometry) -> Option<Rect> {
    let mut rect: Option<Rect> = None;
    geometry.for_each_coordinate(&mut |c| {
        rect = Some(match rect {
            Some(r) => r.union_pt(c),
            None => Rect::from_points(c, c),
        });
    });
    rect
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::geometry::tests::square;

    #[test]
    fn crossing_segments_intersect() {
        let hit = segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 0.0),
        )
        .unwrap();
        assert_eq!(hit.point, Point::new(5.0, 5.0));
        assert!((hit.t_a - 0.5).abs() < EPSILON);
        assert!((hit.t_b - 0.5).abs() < EPSILON);
    }

    #[test]
    fn touching_endpoints_count() {
        let hit = segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 5.0),
        );
        assert!(hit.is_some());
    }

    #[test]
    fn parallel_and_disjoint_segments_do_not_intersect() {
        assert!(
            segment_intersection(
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(0.0, 1.0),
                Point::new(10.0, 1.0),
            )
            .is_none()
        );
        assert!(
            segment_intersection(
                Point::new(0.0, 0.0),
                Point::new(1.0, 1.0),
                Point::new(5.0, 0.0),
                Point::new(6.0, -1.0),
            )
            .is_none()
        );
    }

    #[test]
    fn nearest_point_is_clamped_to_segment() {
        let (p, d) = nearest_on_segment(
            Point::new(5.0, 3.0),
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
        );
        assert!((p - Point::new(5.0, 0.0)).hypot() < EPSILON);
        assert!((d - 3.0).abs() < EPSILON);

        let (p, d) = nearest_on_segment(
            Point::new(-4.0, 3.0),
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
        );
        assert!((p - Point::new(0.0, 0.0)).hypot() < EPSILON);
        assert!((d - 5.0).abs() < EPSILON);
    }

    #[test]
    fn degenerate_segment_uses_endpoint() {
        let a = Point::new(1.0, 1.0);
        let (p, d) = nearest_on_segment(Point::new(4.0, 5.0), a, a);
        assert_eq!(p, a);
        assert!((d - 5.0).abs() < EPSILON);
    }

    #[test]
    fn point_in_ring_and_polygon() {
        let ring = square(0.0, 0.0, 10.0);
        assert!(point_in_ring(Point::new(5.0, 5.0), ring.coordinates()));
        assert!(!point_in_ring(Point::new(15.0, 5.0), ring.coordinates()));

        let poly = Geometry::polygon(ring, vec![square(4.0, 4.0, 2.0)]);
        assert!(point_in_polygon(Point::new(1.0, 1.0), &poly));
        assert!(!point_in_polygon(Point::new(5.0, 5.0), &poly));
    }

    #[test]
    fn area_subtracts_holes() {
        let poly = Geometry::polygon(square(0.0, 0.0, 10.0), vec![square(4.0, 4.0, 2.0)]);
        assert!((area(&poly) - 96.0).abs() < EPSILON);
    }

    #[test]
    fn bounds_cover_all_coordinates() {
        let mp = Geometry::multi_polygon(vec![
            Geometry::polygon(square(0.0, 0.0, 1.0), vec![]),
            Geometry::polygon(square(5.0, -3.0, 1.0), vec![]),
        ]);
        assert_eq!(bounds(&mp), Some(Rect::new(0.0, -3.0, 6.0, 1.0)));
        assert_eq!(bounds(&Geometry::multi_point(vec![])), None);
    }

    #[test]
    fn collinearity() {
        assert!(is_collinear(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(20.0, 0.0)
        ));
        assert!(!is_collinear(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(20.0, 1.0)
        ));
    }
}
