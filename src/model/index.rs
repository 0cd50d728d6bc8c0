// Copyright 2025 the Geoedit Authors
// SPDX-License-Identifier: Apache-2.0

//! Positional addresses into a geometry tree.
//!
//! A `GeometryIndex` is a path of steps applied top-down from the root:
//! `Geometry(n)` descends into child n, and a trailing `Vertex(n)` or
//! `Edge(n)` picks a coordinate or the segment starting at coordinate n.
//! Indices hold no reference to the geometry they were built against, so
//! the same index can be resolved again after the working copy is
//! replaced.
//!
//! Indices order lexicographically step by step. Batch edits rely on this:
//! removing the highest index first keeps the lower ones valid.

use super::geometry::{Coordinate, Geometry, GeometryKind};
use crate::error::{EditError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of a `GeometryIndex`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IndexStep {
    /// Descend into child n (polygon ring or Multi* member)
    Geometry(usize),
    /// The segment between coordinate n and n + 1
    Edge(usize),
    /// Coordinate n
    Vertex(usize),
}

/// Path from the root of a geometry to a sub-geometry, edge, or vertex
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeometryIndex {
    steps: Vec<IndexStep>,
}

impl GeometryIndex {
    /// The empty index, addressing the root geometry
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_steps(steps: Vec<IndexStep>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[IndexStep] {
        &self.steps
    }

    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn last(&self) -> Option<IndexStep> {
        self.steps.last().copied()
    }

    /// Index of the enclosing geometry, `None` for the root
    pub fn parent(&self) -> Option<GeometryIndex> {
        let (_, rest) = self.steps.split_last()?;
        Some(Self::from_steps(rest.to_vec()))
    }

    /// Split into the enclosing geometry's index and the final step
    pub fn split_last(&self) -> Option<(GeometryIndex, IndexStep)> {
        let (last, rest) = self.steps.split_last()?;
        Some((Self::from_steps(rest.to_vec()), *last))
    }

    fn with(&self, step: IndexStep) -> Self {
        let mut steps = self.steps.clone();
        steps.push(step);
        Self { steps }
    }

    /// Extend with a `Geometry(n)` step
    pub fn child(&self, n: usize) -> Self {
        self.with(IndexStep::Geometry(n))
    }

    /// Extend with a `Vertex(n)` step
    pub fn vertex(&self, n: usize) -> Self {
        self.with(IndexStep::Vertex(n))
    }

    /// Extend with an `Edge(n)` step
    pub fn edge(&self, n: usize) -> Self {
        self.with(IndexStep::Edge(n))
    }

    /// Resolve this index against `geometry`
    pub fn resolve(&self, geometry: &Geometry) -> Result<ResolvedTarget> {
        resolve(geometry, self)
    }
}

impl fmt::Display for GeometryIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return f.write_str("/");
        }
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            match step {
                IndexStep::Geometry(n) => write!(f, "g{n}")?,
                IndexStep::Edge(n) => write!(f, "e{n}")?,
                IndexStep::Vertex(n) => write!(f, "v{n}")?,
            }
        }
        Ok(())
    }
}

/// What an index addresses inside a particular geometry
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedTarget {
    /// An existing coordinate, by value
    Vertex(Coordinate),
    /// The append position one past the last coordinate of the leaf at
    /// the given path
    Append(GeometryIndex),
    /// A segment, as its two end coordinates
    Edge(Coordinate, Coordinate),
    /// A sub-geometry, by path
    Geometry(GeometryIndex),
}

fn out_of_range(index: &GeometryIndex, depth: usize, position: usize, len: usize) -> EditError {
    EditError::IndexOutOfRange {
        index: index.clone(),
        depth,
        position,
        len,
    }
}

/// Resolve `index` against `geometry`, applying steps top-down
pub fn resolve(geometry: &Geometry, index: &GeometryIndex) -> Result<ResolvedTarget> {
    let mut node = geometry;
    for (depth, step) in index.steps.iter().enumerate() {
        let is_last = depth + 1 == index.steps.len();
        match *step {
            IndexStep::Geometry(n) => {
                if !node.kind().has_children() {
                    return Err(EditError::kind_mismatch(
                        format!("step {depth} of {index}"),
                        "a polygon or multi geometry",
                        node.kind(),
                    ));
                }
                node = node
                    .children()
                    .get(n)
                    .ok_or_else(|| out_of_range(index, depth, n, node.children().len()))?;
            }
            IndexStep::Vertex(n) | IndexStep::Edge(n) => {
                if !is_last || !node.kind().has_coordinates() {
                    return Err(EditError::kind_mismatch(
                        format!("step {depth} of {index}"),
                        "a point, line string or ring as the final step",
                        node.kind(),
                    ));
                }
                let coords = node.coordinates();
                return match *step {
                    IndexStep::Vertex(n) if n < coords.len() => Ok(ResolvedTarget::Vertex(coords[n])),
                    IndexStep::Vertex(n) if n == coords.len() => {
                        Ok(ResolvedTarget::Append(index.parent().unwrap_or_default()))
                    }
                    IndexStep::Edge(n) if n < coords.len().saturating_sub(1) => {
                        Ok(ResolvedTarget::Edge(coords[n], coords[n + 1]))
                    }
                    _ => Err(out_of_range(index, depth, n, coords.len())),
                };
            }
        }
    }
    Ok(ResolvedTarget::Geometry(index.clone()))
}

/// Borrow the sub-geometry addressed by a path of `Geometry` steps
pub fn geometry_at<'a>(geometry: &'a Geometry, index: &GeometryIndex) -> Result<&'a Geometry> {
    let mut node = geometry;
    for (depth, step) in index.steps.iter().enumerate() {
        let IndexStep::Geometry(n) = *step else {
            return Err(EditError::kind_mismatch(
                format!("step {depth} of {index}"),
                "a sub-geometry step",
                node.kind(),
            ));
        };
        if !node.kind().has_children() {
            return Err(EditError::kind_mismatch(
                format!("step {depth} of {index}"),
                "a polygon or multi geometry",
                node.kind(),
            ));
        }
        node = node
            .children()
            .get(n)
            .ok_or_else(|| out_of_range(index, depth, n, node.children().len()))?;
    }
    Ok(node)
}

/// Mutable counterpart of [`geometry_at`]
pub(crate) fn geometry_at_mut<'a>(
    geometry: &'a mut Geometry,
    index: &GeometryIndex,
) -> Result<&'a mut Geometry> {
    // Validate first so the mutable walk below cannot fail halfway
    geometry_at(geometry, index)?;
    let mut node = geometry;
    for step in &index.steps {
        if let IndexStep::Geometry(n) = *step {
            node = &mut node.children_mut()[n];
        }
    }
    Ok(node)
}

impl Geometry {
    /// Borrow the sub-geometry at `index`
    pub fn geometry_at(&self, index: &GeometryIndex) -> Result<&Geometry> {
        geometry_at(self, index)
    }

    /// Kind of the node at `index`, if it resolves to a sub-geometry
    pub fn kind_at(&self, index: &GeometryIndex) -> Option<GeometryKind> {
        geometry_at(self, index).ok().map(Geometry::kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::geometry::tests::square;
    use kurbo::Point;

    fn sample() -> Geometry {
        Geometry::multi_polygon(vec![
            Geometry::polygon(square(0.0, 0.0, 10.0), vec![]),
            Geometry::polygon(square(20.0, 0.0, 10.0), vec![square(22.0, 2.0, 2.0)]),
        ])
    }

    #[test]
    fn resolves_nested_vertex() {
        let g = sample();
        let idx = GeometryIndex::root().child(1).child(1).vertex(2);
        assert_eq!(
            idx.resolve(&g).unwrap(),
            ResolvedTarget::Vertex(Point::new(24.0, 4.0))
        );
    }

    #[test]
    fn resolves_edge_as_pair() {
        let g = sample();
        let idx = GeometryIndex::root().child(0).child(0).edge(0);
        assert_eq!(
            idx.resolve(&g).unwrap(),
            ResolvedTarget::Edge(Point::new(0.0, 0.0), Point::new(10.0, 0.0))
        );
    }

    #[test]
    fn resolves_sub_geometry_by_path() {
        let g = sample();
        let idx = GeometryIndex::root().child(1).child(1);
        assert_eq!(idx.resolve(&g).unwrap(), ResolvedTarget::Geometry(idx.clone()));
        assert_eq!(g.kind_at(&idx), Some(GeometryKind::LinearRing));
    }

    #[test]
    fn vertex_at_length_is_append_position() {
        let g = sample();
        let ring = GeometryIndex::root().child(0).child(0);
        assert_eq!(
            ring.vertex(5).resolve(&g).unwrap(),
            ResolvedTarget::Append(ring.clone())
        );
        assert!(matches!(
            ring.vertex(6).resolve(&g),
            Err(EditError::IndexOutOfRange { position: 6, len: 5, .. })
        ));
    }

    #[test]
    fn last_edge_is_out_of_range() {
        let g = sample();
        let idx = GeometryIndex::root().child(0).child(0).edge(4);
        assert!(matches!(idx.resolve(&g), Err(EditError::IndexOutOfRange { .. })));
    }

    #[test]
    fn huge_edge_is_out_of_range() {
        let g = sample();
        let idx = GeometryIndex::root().child(0).child(0).edge(usize::MAX);
        assert!(matches!(
            idx.resolve(&g),
            Err(EditError::IndexOutOfRange { position: usize::MAX, len: 5, .. })
        ));
    }

    #[test]
    fn vertex_step_on_container_is_kind_mismatch() {
        let g = sample();
        let idx = GeometryIndex::root().child(0).vertex(0);
        assert!(matches!(
            idx.resolve(&g),
            Err(EditError::KindMismatch { found: GeometryKind::Polygon, .. })
        ));
    }

    #[test]
    fn geometry_step_on_leaf_is_kind_mismatch() {
        let g = sample();
        let idx = GeometryIndex::root().child(0).child(0).child(0);
        assert!(matches!(idx.resolve(&g), Err(EditError::KindMismatch { .. })));
    }

    #[test]
    fn ordering_is_lexicographic() {
        let a = GeometryIndex::root().child(0).vertex(3);
        let b = GeometryIndex::root().child(0).vertex(4);
        let c = GeometryIndex::root().child(1).vertex(0);
        let mut v = vec![c.clone(), a.clone(), b.clone()];
        v.sort();
        assert_eq!(v, vec![a.clone(), b.clone(), c]);
        // A ring sorts before the vertices inside it
        assert!(GeometryIndex::root().child(0) < a);
    }

    #[test]
    fn display_is_compact() {
        let idx = GeometryIndex::root().child(0).child(1).vertex(3);
        assert_eq!(idx.to_string(), "g0/g1/v3");
        assert_eq!(GeometryIndex::root().to_string(), "/");
    }

    #[test]
    fn parent_and_split_last() {
        let idx = GeometryIndex::root().child(2).edge(1);
        let (parent, last) = idx.split_last().unwrap();
        assert_eq!(parent, GeometryIndex::root().child(2));
        assert_eq!(last, IndexStep::Edge(1));
        assert_eq!(GeometryIndex::root().parent(), None);
    }
}
