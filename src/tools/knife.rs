// Copyright 2025 the Geoedit Authors
// SPDX-License-Identifier: Apache-2.0

//! The knife: cutting a polygon in two along a line string.
//!
//! The cut must cross the exterior ring exactly twice. The two halves are
//! built by walking the exterior ring from one crossing to the other in
//! each direction and closing the walk with the part of the cut line that
//! lies between the crossings. Holes go to whichever half contains them.

use crate::error::{EditError, Result};
use crate::math::{self, EPSILON};
use crate::model::{Coordinate, Geometry, GeometryKind};
use kurbo::Point;

/// A point where the cut line crosses the exterior ring
#[derive(Clone, Copy, Debug)]
struct Hit {
    /// The crossing point (snapped onto ring vertices it touches)
    point: Point,
    /// Position along the ring: edge index plus parameter on the edge
    ring_pos: f64,
    /// Position along the cut line: segment index plus parameter
    cut_pos: f64,
}

/// Split `polygon` along `cut_line`, returning the two halves.
///
/// The input is not modified. Fails with `InvalidSplitLine` unless the
/// cut crosses the exterior ring at exactly two points with the part in
/// between running inside the polygon, and with `AmbiguousHoleAssignment`
/// if a hole would straddle the cut.
pub fn split(polygon: &Geometry, cut_line: &Geometry) -> Result<(Geometry, Geometry)> {
    if polygon.kind() != GeometryKind::Polygon {
        return Err(EditError::kind_mismatch(
            "split target",
            "a polygon",
            polygon.kind(),
        ));
    }
    if cut_line.kind() != GeometryKind::LineString {
        return Err(EditError::kind_mismatch(
            "split cut line",
            "a line string",
            cut_line.kind(),
        ));
    }
    let cut = cut_line.coordinates();
    if cut.len() < 2 {
        return Err(EditError::InvalidSplitLine(format!(
            "cut line needs at least 2 points, got {}",
            cut.len()
        )));
    }

    let Some(exterior) = polygon.exterior() else {
        return Err(EditError::InvalidSplitLine(
            "polygon has no exterior ring".to_string(),
        ));
    };
    let vertices = distinct_vertices(exterior.coordinates());
    if vertices.len() < 3 {
        return Err(EditError::InvalidSplitLine(
            "exterior ring is degenerate".to_string(),
        ));
    }

    let hits = find_hits(&vertices, cut);
    tracing::debug!("knife crosses exterior ring {} times", hits.len());
    let [first, second] = hits[..] else {
        return Err(EditError::InvalidSplitLine(format!(
            "cut line crosses the exterior ring {} times, expected 2",
            hits.len()
        )));
    };

    // Part of the cut between the crossings, in cut order
    let (start, end) = if first.cut_pos <= second.cut_pos {
        (first, second)
    } else {
        (second, first)
    };
    let inner_cut = cut_between(cut, start, end);
    for pair in inner_cut.windows(2) {
        let mid = pair[0].midpoint(pair[1]);
        if !math::point_in_ring(mid, exterior.coordinates()) {
            return Err(EditError::InvalidSplitLine(
                "cut line leaves the polygon between its crossings".to_string(),
            ));
        }
    }

    // Walk the ring from the crossing that comes first along it
    let (a, b) = if first.ring_pos <= second.ring_pos {
        (first, second)
    } else {
        (second, first)
    };
    let a_to_b: Vec<Point> = if same_point(start.point, a.point) {
        inner_cut.clone()
    } else {
        inner_cut.iter().rev().copied().collect()
    };
    let b_to_a: Vec<Point> = a_to_b.iter().rev().copied().collect();

    let m = vertices.len();
    let a_floor = a.ring_pos.floor() as usize;
    let b_floor = b.ring_pos.floor() as usize;

    let mut one = vec![a.point];
    one.extend((a_floor + 1..=b_floor).map(|k| vertices[k]));
    one.push(b.point);
    one.extend(b_to_a);

    let mut two = vec![b.point];
    two.extend((b_floor + 1..m).map(|k| vertices[k]));
    two.extend((0..=a_floor).map(|k| vertices[k]));
    two.push(a.point);
    two.extend(a_to_b);

    let one = close_ring(one)?;
    let two = close_ring(two)?;

    // Distribute holes
    let mut holes_one = Vec::new();
    let mut holes_two = Vec::new();
    for (offset, hole) in polygon.holes().iter().enumerate() {
        let ring = offset + 1;
        let coords = hole.coordinates();
        let crossed = inner_cut.windows(2).any(|seg| {
            coords
                .windows(2)
                .any(|edge| math::segment_intersection(seg[0], seg[1], edge[0], edge[1]).is_some())
        });
        let Some(&probe) = coords.first() else {
            continue;
        };
        let in_one = math::point_in_ring(probe, one.coordinates());
        let in_two = math::point_in_ring(probe, two.coordinates());
        match (crossed, in_one, in_two) {
            (false, true, false) => holes_one.push(hole.clone()),
            (false, false, true) => holes_two.push(hole.clone()),
            _ => return Err(EditError::AmbiguousHoleAssignment { ring }),
        }
    }

    Ok((
        Geometry::polygon(one, holes_one),
        Geometry::polygon(two, holes_two),
    ))
}

/// Ring coordinates without the closing duplicate
fn distinct_vertices(ring: &[Coordinate]) -> Vec<Point> {
    let mut vertices = ring.to_vec();
    if vertices.len() > 1 && vertices.first() == vertices.last() {
        vertices.pop();
    }
    vertices
}

fn same_point(a: Point, b: Point) -> bool {
    (a - b).hypot() <= EPSILON
}

/// All distinct crossings of the cut line with the ring
fn find_hits(vertices: &[Point], cut: &[Point]) -> Vec<Hit> {
    let m = vertices.len();
    let mut hits: Vec<Hit> = Vec::new();
    for (j, seg) in cut.windows(2).enumerate() {
        for i in 0..m {
            let p0 = vertices[i];
            let p1 = vertices[(i + 1) % m];
            let Some(hit) = math::segment_intersection(seg[0], seg[1], p0, p1) else {
                continue;
            };
            // Crossings at a ring vertex take the vertex value exactly
            let (point, ring_pos) = if hit.t_b <= EPSILON {
                (p0, i as f64)
            } else if hit.t_b >= 1.0 - EPSILON {
                (p1, ((i + 1) % m) as f64)
            } else {
                (hit.point, i as f64 + hit.t_b)
            };
            if hits.iter().any(|h| same_point(h.point, point)) {
                continue;
            }
            hits.push(Hit {
                point,
                ring_pos,
                cut_pos: j as f64 + hit.t_a,
            });
        }
    }
    hits
}

/// The cut line from `start` to `end`, including any cut vertices between
fn cut_between(cut: &[Point], start: Hit, end: Hit) -> Vec<Point> {
    let first_vertex = start.cut_pos.floor() as usize + 1;
    let last_vertex = end.cut_pos.floor() as usize;
    let mut path = vec![start.point];
    for &vertex in cut.iter().take(last_vertex + 1).skip(first_vertex) {
        push_distinct(&mut path, vertex);
    }
    push_distinct(&mut path, end.point);
    path
}

fn push_distinct(path: &mut Vec<Point>, point: Point) {
    if path.last().is_none_or(|last| !same_point(*last, point)) {
        path.push(point);
    }
}

/// Drop repeated points and close into a ring
fn close_ring(points: Vec<Point>) -> Result<Geometry> {
    let mut ring: Vec<Point> = Vec::with_capacity(points.len() + 1);
    for point in points {
        push_distinct(&mut ring, point);
    }
    while ring.len() > 1 && same_point(ring[0], ring[ring.len() - 1]) {
        ring.pop();
    }
    if ring.len() < 3 {
        return Err(EditError::InvalidSplitLine(
            "cut line runs along the boundary".to_string(),
        ));
    }
    Ok(Geometry::linear_ring(ring))
}
