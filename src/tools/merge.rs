// Copyright 2025 the Geoedit Authors
// SPDX-License-Identifier: Apache-2.0

//! Fusing several geometries of one family into fewer.
//!
//! Polygons are merged pairwise by eliminating the boundary edges they
//! share. Exteriors are oriented counter-clockwise and holes clockwise, so
//! each polygon's interior lies left of its edges and a shared edge shows
//! up once in each direction; both copies are dropped. This covers a hole
//! of one polygon filled by the other as well as neighbours side by side.
//! The remaining edges are chained back into rings. Pairs that share no
//! edge stay separate members of a MultiPolygon; merging never fails on
//! disjoint input.
//!
//! Line strings that share an endpoint are joined end to end. Points are
//! gathered into a MultiPoint.

use crate::error::{EditError, Result};
use crate::math;
use crate::model::{Geometry, GeometryKind};
use kurbo::Point;

/// Which family of kinds a merge works on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Points,
    Lines,
    Polygons,
}

fn family(kind: GeometryKind) -> Option<Family> {
    match kind {
        GeometryKind::Point | GeometryKind::MultiPoint => Some(Family::Points),
        GeometryKind::LineString | GeometryKind::MultiLineString => Some(Family::Lines),
        GeometryKind::Polygon | GeometryKind::MultiPolygon => Some(Family::Polygons),
        GeometryKind::LinearRing => None,
    }
}

/// Merge `geometries` into a single geometry where possible.
///
/// Returns a Point, LineString or Polygon when everything fused into one
/// piece, otherwise the matching Multi* kind. Inputs are not modified.
pub fn merge(geometries: &[Geometry]) -> Result<Geometry> {
    if geometries.len() < 2 {
        return Err(EditError::InsufficientGeometries {
            count: geometries.len(),
        });
    }

    let first = geometries[0].kind();
    let Some(target) = family(first) else {
        return Err(EditError::kind_mismatch(
            "merge input 0",
            "a point, line string or polygon (or multi)",
            first,
        ));
    };

    let mut members = Vec::new();
    for (i, geometry) in geometries.iter().enumerate() {
        if family(geometry.kind()) != Some(target) {
            return Err(EditError::kind_mismatch(
                format!("merge input {i}"),
                "the same family as input 0",
                geometry.kind(),
            ));
        }
        if geometry.kind().is_multi() {
            members.extend(geometry.children().iter().cloned());
        } else {
            members.push(geometry.clone());
        }
    }

    let before = members.len();
    let result = match target {
        Family::Points => merge_points(members),
        Family::Lines => merge_lines(members),
        Family::Polygons => merge_polygons(members),
    };
    tracing::debug!(
        "merged {} {:?} members into {:?}",
        before,
        target,
        result.kind()
    );
    Ok(result)
}

fn merge_points(points: Vec<Geometry>) -> Geometry {
    let mut unique: Vec<Geometry> = Vec::with_capacity(points.len());
    for point in points {
        if !unique.contains(&point) {
            unique.push(point);
        }
    }
    match <[Geometry; 1]>::try_from(unique) {
        Ok([single]) => single,
        Err(unique) => Geometry::multi_point(unique),
    }
}

// ===== Lines =====

fn merge_lines(lines: Vec<Geometry>) -> Geometry {
    let mut lines: Vec<Vec<Point>> = lines
        .into_iter()
        .map(|line| line.coordinates().to_vec())
        .collect();

    while let Some((i, j, joined)) = find_join(&lines) {
        lines[i] = joined;
        lines.remove(j);
    }

    let mut lines: Vec<Geometry> = lines.into_iter().map(Geometry::line_string).collect();
    if lines.len() == 1 {
        lines.remove(0)
    } else {
        Geometry::multi_line_string(lines)
    }
}

fn find_join(lines: &[Vec<Point>]) -> Option<(usize, usize, Vec<Point>)> {
    for i in 0..lines.len() {
        for j in i + 1..lines.len() {
            if let Some(joined) = join_lines(&lines[i], &lines[j]) {
                return Some((i, j, joined));
            }
        }
    }
    None
}

/// Join two lines that share an endpoint, keeping `a`'s direction
fn join_lines(a: &[Point], b: &[Point]) -> Option<Vec<Point>> {
    let (a_first, a_last) = (*a.first()?, *a.last()?);
    let (b_first, b_last) = (*b.first()?, *b.last()?);

    let reversed = |pts: &[Point]| pts.iter().rev().copied().collect::<Vec<_>>();
    let concat = |head: Vec<Point>, tail: Vec<Point>| {
        let mut out = head;
        out.extend(tail.into_iter().skip(1));
        out
    };

    if a_last == b_first {
        Some(concat(a.to_vec(), b.to_vec()))
    } else if a_last == b_last {
        Some(concat(a.to_vec(), reversed(b)))
    } else if a_first == b_last {
        Some(concat(b.to_vec(), a.to_vec()))
    } else if a_first == b_first {
        Some(concat(reversed(b), a.to_vec()))
    } else {
        None
    }
}

// ===== Polygons =====

fn merge_polygons(mut polygons: Vec<Geometry>) -> Geometry {
    'scan: loop {
        for i in 0..polygons.len() {
            for j in i + 1..polygons.len() {
                if let Some(union) = merge_pair(&polygons[i], &polygons[j]) {
                    polygons[i] = union;
                    polygons.remove(j);
                    continue 'scan;
                }
            }
        }
        break;
    }

    if polygons.len() == 1 {
        polygons.remove(0)
    } else {
        Geometry::multi_polygon(polygons)
    }
}

/// Ring vertices without the closing duplicate, with positive signed area
/// when `counter_clockwise` and negative otherwise
fn oriented_vertices(ring: &Geometry, counter_clockwise: bool) -> Vec<Point> {
    let mut vertices = ring.coordinates().to_vec();
    if vertices.len() > 1 && vertices.first() == vertices.last() {
        vertices.pop();
    }
    if (math::signed_area(ring.coordinates()) > 0.0) != counter_clockwise {
        vertices.reverse();
    }
    vertices
}

/// Every ring of a polygon, exterior first, oriented so the interior is
/// on the left
fn oriented_rings(polygon: &Geometry) -> Vec<Vec<Point>> {
    polygon
        .children()
        .iter()
        .enumerate()
        .map(|(i, ring)| oriented_vertices(ring, i == 0))
        .filter(|ring| ring.len() >= 3)
        .collect()
}

/// Insert every vertex of `other` that lies inside one of `ring`'s edges,
/// so partially shared edges become exactly shared ones
fn node_ring(ring: &[Point], other: &[Point]) -> Vec<Point> {
    let n = ring.len();
    let mut out = Vec::with_capacity(n + other.len());
    for i in 0..n {
        let p0 = ring[i];
        let p1 = ring[(i + 1) % n];
        out.push(p0);

        let length_sq = (p1 - p0).hypot2();
        if length_sq == 0.0 {
            continue;
        }
        let mut inner: Vec<(f64, Point)> = other
            .iter()
            .copied()
            .filter(|&q| q != p0 && q != p1 && math::is_on_segment(q, p0, p1))
            .map(|q| ((q - p0).dot(p1 - p0) / length_sq, q))
            .collect();
        inner.sort_by(|a, b| a.0.total_cmp(&b.0));
        inner.dedup_by(|a, b| a.1 == b.1);
        out.extend(inner.into_iter().map(|(_, q)| q));
    }
    out
}

fn edges(ring: &[Point]) -> Vec<(Point, Point)> {
    let n = ring.len();
    (0..n).map(|i| (ring[i], ring[(i + 1) % n])).collect()
}

/// Union of two polygons sharing at least one boundary edge, on any of
/// their rings
fn merge_pair(a: &Geometry, b: &Geometry) -> Option<Geometry> {
    let rings_a = oriented_rings(a);
    let rings_b = oriented_rings(b);
    if rings_a.is_empty() || rings_b.is_empty() {
        return None;
    }

    let vertices_b: Vec<Point> = rings_b.concat();
    let rings_a: Vec<Vec<Point>> = rings_a.iter().map(|ring| node_ring(ring, &vertices_b)).collect();
    let vertices_a: Vec<Point> = rings_a.concat();
    let rings_b: Vec<Vec<Point>> = rings_b.iter().map(|ring| node_ring(ring, &vertices_a)).collect();

    let edges_a: Vec<(Point, Point)> = rings_a.iter().flat_map(|ring| edges(ring)).collect();
    let edges_b: Vec<(Point, Point)> = rings_b.iter().flat_map(|ring| edges(ring)).collect();

    let mut seam: Vec<Point> = Vec::new();
    let mut remaining: Vec<(Point, Point)> = Vec::new();
    for &(p, q) in &edges_a {
        if edges_b.contains(&(q, p)) {
            seam.push(p);
            seam.push(q);
        } else {
            remaining.push((p, q));
        }
    }
    if seam.is_empty() {
        return None;
    }
    remaining.extend(
        edges_b
            .iter()
            .copied()
            .filter(|&(p, q)| !edges_a.contains(&(q, p))),
    );

    let mut loops = chain_loops(remaining)?;
    for ring in &mut loops {
        drop_seam_vertices(ring, &seam);
    }
    loops.retain(|ring| ring.len() >= 3 && ring_area(ring) > math::EPSILON);

    // The loop enclosing the most area is the new exterior; the rest,
    // untouched holes included, are holes
    let outer = loops
        .iter()
        .enumerate()
        .max_by(|x, y| ring_area(x.1).total_cmp(&ring_area(y.1)))
        .map(|(i, _)| i)?;
    let exterior = loops.remove(outer);
    let holes = loops.into_iter().map(Geometry::linear_ring).collect();

    Some(Geometry::polygon(Geometry::linear_ring(exterior), holes))
}

fn ring_area(ring: &[Point]) -> f64 {
    let mut closed = ring.to_vec();
    if let Some(&first) = ring.first() {
        closed.push(first);
    }
    math::signed_area(&closed).abs()
}

/// Follow directed edges end to start until every edge is used
fn chain_loops(mut edges: Vec<(Point, Point)>) -> Option<Vec<Vec<Point>>> {
    let mut loops = Vec::new();
    while !edges.is_empty() {
        let (start, mut current) = edges.remove(0);
        let mut ring = vec![start];
        while current != start {
            let next = edges.iter().position(|&(p, _)| p == current)?;
            let (_, end) = edges.remove(next);
            ring.push(current);
            current = end;
        }
        loops.push(ring);
    }
    Some(loops)
}

/// Remove seam endpoints left collinear with their neighbours
fn drop_seam_vertices(ring: &mut Vec<Point>, seam: &[Point]) {
    let mut changed = true;
    while changed && ring.len() > 3 {
        changed = false;
        let n = ring.len();
        for i in 0..n {
            let prev = ring[(i + n - 1) % n];
            let next = ring[(i + 1) % n];
            if seam.contains(&ring[i]) && math::is_collinear(prev, ring[i], next) {
                ring.remove(i);
                changed = true;
                break;
            }
        }
    }
}
