// Copyright 2025 the Geoedit Authors
// SPDX-License-Identifier: Apache-2.0

//! Edit operations as invertible commands.
//!
//! Every `Operation` applied to a geometry yields the edited geometry and
//! the operation that undoes it. Nothing outside the operation and the
//! geometry it was applied to is needed to build the inverse, so undo and
//! redo stacks can hold plain operation values.
//!
//! Ring closure: a closed `LinearRing` keeps its last coordinate equal to
//! its first. Inserting at position 0 or moving/removing either end updates
//! both ends; appending inserts before the closing coordinate.

use crate::error::{EditError, Result};
use crate::model::index::geometry_at_mut;
use crate::model::{Coordinate, Geometry, GeometryIndex, GeometryKind, IndexStep, geometry_at};
use crate::tools::{knife, merge};
use serde::{Deserialize, Serialize};

/// One atomic transform of a geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Insert a coordinate at a `Vertex(n)` index (n may equal the
    /// coordinate count to append) or inside the segment at an `Edge(n)`
    /// index
    AddCoordinate {
        index: GeometryIndex,
        coordinate: Coordinate,
    },
    /// Remove the coordinate at a `Vertex(n)` index
    RemoveCoordinate { index: GeometryIndex },
    /// Replace the coordinate at a `Vertex(n)` index
    MoveCoordinate {
        index: GeometryIndex,
        coordinate: Coordinate,
    },
    /// Insert an interior ring into a polygon, appending when `position`
    /// is `None`
    AddRing {
        polygon: GeometryIndex,
        ring: Geometry,
        #[serde(default)]
        position: Option<usize>,
    },
    /// Remove interior ring `ring` of a polygon
    RemoveRing { polygon: GeometryIndex, ring: usize },
    /// Insert a member into a Multi* geometry, appending when `position`
    /// is `None`
    AddGeometry {
        parent: GeometryIndex,
        geometry: Geometry,
        #[serde(default)]
        position: Option<usize>,
    },
    /// Remove a member of a Multi* geometry
    RemoveGeometry { index: GeometryIndex },
    /// Cut a polygon in two along a line string
    SplitPolygon {
        polygon: GeometryIndex,
        cut_line: Geometry,
    },
    /// Fuse sibling members of a Multi* geometry
    MergeGeometries { indices: Vec<GeometryIndex> },
    /// Swap a whole sub-geometry
    Replace {
        index: GeometryIndex,
        geometry: Geometry,
    },
    /// Several operations applied in order as one step
    Composite { operations: Vec<Operation> },
}

impl Operation {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Operation::AddCoordinate { .. } => "add_coordinate",
            Operation::RemoveCoordinate { .. } => "remove_coordinate",
            Operation::MoveCoordinate { .. } => "move_coordinate",
            Operation::AddRing { .. } => "add_ring",
            Operation::RemoveRing { .. } => "remove_ring",
            Operation::AddGeometry { .. } => "add_geometry",
            Operation::RemoveGeometry { .. } => "remove_geometry",
            Operation::SplitPolygon { .. } => "split_polygon",
            Operation::MergeGeometries { .. } => "merge_geometries",
            Operation::Replace { .. } => "replace",
            Operation::Composite { .. } => "composite",
        }
    }

    /// Apply to `geometry`, returning the edited copy and the inverse.
    ///
    /// The input is never modified; on error nothing is produced.
    pub fn apply(&self, geometry: &Geometry) -> Result<(Geometry, Operation)> {
        let mut edited = geometry.clone();
        let inverse = self.apply_in_place(&mut edited)?;
        tracing::debug!("applied {} (inverse: {})", self.name(), inverse.name());
        Ok((edited, inverse))
    }

    /// Apply directly to `geometry`. Single operations validate before
    /// touching anything; composites work on a scratch copy.
    pub(crate) fn apply_in_place(&self, geometry: &mut Geometry) -> Result<Operation> {
        match self {
            Operation::AddCoordinate { index, coordinate } => {
                add_coordinate(geometry, index, *coordinate)
            }
            Operation::RemoveCoordinate { index } => remove_coordinate(geometry, index),
            Operation::MoveCoordinate { index, coordinate } => {
                move_coordinate(geometry, index, *coordinate)
            }
            Operation::AddRing {
                polygon,
                ring,
                position,
            } => add_ring(geometry, polygon, ring, *position),
            Operation::RemoveRing { polygon, ring } => remove_ring(geometry, polygon, *ring),
            Operation::AddGeometry {
                parent,
                geometry: member,
                position,
            } => add_geometry(geometry, parent, member, *position),
            Operation::RemoveGeometry { index } => remove_geometry(geometry, index),
            Operation::SplitPolygon { polygon, cut_line } => {
                split_polygon(geometry, polygon, cut_line)
            }
            Operation::MergeGeometries { indices } => merge_geometries(geometry, indices),
            Operation::Replace {
                index,
                geometry: replacement,
            } => replace(geometry, index, replacement.clone()),
            Operation::Composite { operations } => {
                let mut scratch = geometry.clone();
                let mut inverses = Vec::with_capacity(operations.len());
                for op in operations {
                    inverses.push(op.apply_in_place(&mut scratch)?);
                }
                inverses.reverse();
                *geometry = scratch;
                Ok(Operation::Composite {
                    operations: inverses,
                })
            }
        }
    }
}

// ===== Coordinate operations =====

/// Whether edits to this leaf must keep its first and last coordinates equal
fn keeps_closure(leaf: &Geometry) -> bool {
    leaf.kind() == GeometryKind::LinearRing && leaf.coordinates().len() >= 2 && leaf.is_closed()
}

/// Whether this leaf meets the coordinate minimum for its kind, and is
/// closed if it is a ring
fn is_complete(leaf: &Geometry) -> bool {
    leaf.coordinates().len() >= leaf.kind().minimum_coordinates()
        && (leaf.kind() != GeometryKind::LinearRing || leaf.is_closed())
}

/// Split an index into its leaf path and final vertex/edge step, and
/// borrow the leaf
fn leaf_mut<'a>(
    geometry: &'a mut Geometry,
    index: &GeometryIndex,
    action: &str,
) -> Result<(&'a mut Geometry, GeometryIndex, IndexStep)> {
    let Some((path, step)) = index.split_last() else {
        return Err(EditError::kind_mismatch(
            format!("{action} at {index}"),
            "a vertex or edge index",
            geometry.kind(),
        ));
    };
    let leaf = geometry_at_mut(geometry, &path)?;
    if !leaf.kind().has_coordinates() || matches!(step, IndexStep::Geometry(_)) {
        return Err(EditError::kind_mismatch(
            format!("{action} at {index}"),
            "a vertex or edge of a point, line string or ring",
            leaf.kind(),
        ));
    }
    Ok((leaf, path, step))
}

fn out_of_range(index: &GeometryIndex, position: usize, len: usize) -> EditError {
    EditError::IndexOutOfRange {
        index: index.clone(),
        depth: index.steps().len().saturating_sub(1),
        position,
        len,
    }
}

fn add_coordinate(
    geometry: &mut Geometry,
    index: &GeometryIndex,
    coordinate: Coordinate,
) -> Result<Operation> {
    let (leaf, path, step) = leaf_mut(geometry, index, "add coordinate")?;
    let len = leaf.coordinates().len();

    let position = match step {
        IndexStep::Vertex(n) if n <= len => n,
        IndexStep::Edge(n) if n < len.saturating_sub(1) => n + 1,
        IndexStep::Vertex(n) | IndexStep::Edge(n) | IndexStep::Geometry(n) => {
            return Err(out_of_range(index, n, len));
        }
    };

    if leaf.kind() == GeometryKind::Point {
        return Err(EditError::kind_mismatch(
            format!("add coordinate at {index}"),
            "a line string or ring",
            GeometryKind::Point,
        ));
    }

    let previous = leaf.clone();
    let closure = keeps_closure(leaf);
    let coords = leaf.coordinates_mut();
    let position = if closure {
        if position == 0 {
            coords.insert(0, coordinate);
            let last = coords.len() - 1;
            coords[last] = coordinate;
            0
        } else {
            // Appending lands before the closing coordinate
            let position = position.min(len - 1);
            coords.insert(position, coordinate);
            position
        }
    } else {
        coords.insert(position, coordinate);
        position
    };

    if is_complete(&previous) {
        Ok(Operation::RemoveCoordinate {
            index: path.vertex(position),
        })
    } else {
        // Still being drawn: removing again could trip the minimum count
        Ok(Operation::Replace {
            index: path,
            geometry: previous,
        })
    }
}

fn remove_coordinate(geometry: &mut Geometry, index: &GeometryIndex) -> Result<Operation> {
    let (leaf, path, step) = leaf_mut(geometry, index, "remove coordinate")?;
    let len = leaf.coordinates().len();

    let IndexStep::Vertex(n) = step else {
        return Err(EditError::kind_mismatch(
            format!("remove coordinate at {index}"),
            "a vertex index",
            leaf.kind(),
        ));
    };
    if n >= len {
        return Err(out_of_range(index, n, len));
    }

    let minimum = leaf.kind().minimum_coordinates();
    if len - 1 < minimum {
        return Err(EditError::MinimumVertexCount {
            kind: leaf.kind(),
            minimum,
            remaining: len - 1,
        });
    }

    let previous = leaf.clone();
    let closure = keeps_closure(leaf);
    let coords = leaf.coordinates_mut();
    let (removed, position) = if closure && (n == 0 || n == len - 1) {
        let removed = coords.remove(0);
        let last = coords.len() - 1;
        coords[last] = coords[0];
        (removed, 0)
    } else {
        (coords.remove(n), n)
    };

    if keeps_closure(leaf) == closure {
        Ok(Operation::AddCoordinate {
            index: path.vertex(position),
            coordinate: removed,
        })
    } else {
        // Removal opened or closed the ring; re-inserting would not
        // restore the same shape
        Ok(Operation::Replace {
            index: path,
            geometry: previous,
        })
    }
}

fn move_coordinate(
    geometry: &mut Geometry,
    index: &GeometryIndex,
    coordinate: Coordinate,
) -> Result<Operation> {
    let (leaf, _, step) = leaf_mut(geometry, index, "move coordinate")?;
    let len = leaf.coordinates().len();

    let IndexStep::Vertex(n) = step else {
        return Err(EditError::kind_mismatch(
            format!("move coordinate at {index}"),
            "a vertex index",
            leaf.kind(),
        ));
    };
    if n >= len {
        return Err(out_of_range(index, n, len));
    }

    let closure = keeps_closure(leaf);
    let coords = leaf.coordinates_mut();
    let old = coords[n];
    coords[n] = coordinate;
    if closure && (n == 0 || n == len - 1) {
        coords[0] = coordinate;
        coords[len - 1] = coordinate;
    }

    Ok(Operation::MoveCoordinate {
        index: index.clone(),
        coordinate: old,
    })
}

// ===== Ring and member operations =====

fn container_mut<'a>(
    geometry: &'a mut Geometry,
    index: &GeometryIndex,
    action: &str,
    accepts: impl Fn(GeometryKind) -> bool,
    expected: &'static str,
) -> Result<&'a mut Geometry> {
    let node = geometry_at_mut(geometry, index)?;
    if !accepts(node.kind()) {
        return Err(EditError::kind_mismatch(
            format!("{action} at {index}"),
            expected,
            node.kind(),
        ));
    }
    Ok(node)
}

fn add_ring(
    geometry: &mut Geometry,
    polygon: &GeometryIndex,
    ring: &Geometry,
    position: Option<usize>,
) -> Result<Operation> {
    if ring.kind() != GeometryKind::LinearRing {
        return Err(EditError::kind_mismatch(
            format!("add ring to {polygon}"),
            "a linear ring",
            ring.kind(),
        ));
    }
    let node = container_mut(
        geometry,
        polygon,
        "add ring",
        |k| k == GeometryKind::Polygon,
        "a polygon",
    )?;
    let len = node.children().len();
    let position = position.unwrap_or(len);
    // Slot 0 belongs to the exterior ring
    if position > len || (position == 0 && len > 0) {
        return Err(out_of_range(&polygon.child(position), position, len));
    }
    node.children_mut().insert(position, ring.clone());
    Ok(Operation::RemoveRing {
        polygon: polygon.clone(),
        ring: position,
    })
}

fn remove_ring(geometry: &mut Geometry, polygon: &GeometryIndex, ring: usize) -> Result<Operation> {
    let node = container_mut(
        geometry,
        polygon,
        "remove ring",
        |k| k == GeometryKind::Polygon,
        "a polygon",
    )?;
    if ring == 0 {
        return Err(EditError::CannotRemoveExteriorRing);
    }
    let len = node.children().len();
    if ring >= len {
        return Err(out_of_range(&polygon.child(ring), ring, len));
    }
    let removed = node.children_mut().remove(ring);
    Ok(Operation::AddRing {
        polygon: polygon.clone(),
        ring: removed,
        position: Some(ring),
    })
}

fn add_geometry(
    geometry: &mut Geometry,
    parent: &GeometryIndex,
    member: &Geometry,
    position: Option<usize>,
) -> Result<Operation> {
    let node = container_mut(
        geometry,
        parent,
        "add geometry",
        GeometryKind::is_multi,
        "a multi geometry",
    )?;
    if node.kind().member_kind() != Some(member.kind()) {
        return Err(EditError::kind_mismatch(
            format!("add geometry to {parent} ({:?})", node.kind()),
            "a matching member kind",
            member.kind(),
        ));
    }
    let len = node.children().len();
    let position = position.unwrap_or(len);
    if position > len {
        return Err(out_of_range(&parent.child(position), position, len));
    }
    node.children_mut().insert(position, member.clone());
    Ok(Operation::RemoveGeometry {
        index: parent.child(position),
    })
}

fn remove_geometry(geometry: &mut Geometry, index: &GeometryIndex) -> Result<Operation> {
    let Some((parent, IndexStep::Geometry(n))) = index.split_last() else {
        return Err(EditError::kind_mismatch(
            format!("remove geometry at {index}"),
            "a member index",
            geometry.kind(),
        ));
    };
    let node = container_mut(
        geometry,
        &parent,
        "remove geometry",
        GeometryKind::is_multi,
        "a multi geometry",
    )?;
    let len = node.children().len();
    if n >= len {
        return Err(out_of_range(index, n, len));
    }
    let removed = node.children_mut().remove(n);
    Ok(Operation::AddGeometry {
        parent,
        geometry: removed,
        position: Some(n),
    })
}

fn replace(
    geometry: &mut Geometry,
    index: &GeometryIndex,
    replacement: Geometry,
) -> Result<Operation> {
    if let Some(parent) = index.parent() {
        let parent_kind = geometry_at(geometry, &parent)?.kind();
        if parent_kind.member_kind() != Some(replacement.kind()) {
            return Err(EditError::kind_mismatch(
                format!("replace {index} inside {parent_kind:?}"),
                "a matching member kind",
                replacement.kind(),
            ));
        }
    }
    let node = geometry_at_mut(geometry, index)?;
    let previous = std::mem::replace(node, replacement);
    Ok(Operation::Replace {
        index: index.clone(),
        geometry: previous,
    })
}

// ===== Split and merge =====

fn split_polygon(
    geometry: &mut Geometry,
    polygon: &GeometryIndex,
    cut_line: &Geometry,
) -> Result<Operation> {
    let target = geometry_at(geometry, polygon)?;
    let (first, second) = knife::split(target, cut_line)?;

    match polygon.split_last() {
        None => replace(
            geometry,
            &GeometryIndex::root(),
            Geometry::multi_polygon(vec![first, second]),
        ),
        Some((parent, IndexStep::Geometry(n))) => {
            let mut container = geometry_at(geometry, &parent)?.clone();
            if container.kind() != GeometryKind::MultiPolygon {
                return Err(EditError::kind_mismatch(
                    format!("split polygon at {polygon}"),
                    "a polygon at the root or inside a multi polygon",
                    container.kind(),
                ));
            }
            let members = container.children_mut();
            members[n] = first;
            members.insert(n + 1, second);
            replace(geometry, &parent, container)
        }
        Some(_) => Err(EditError::kind_mismatch(
            format!("split polygon at {polygon}"),
            "a polygon index",
            geometry.kind(),
        )),
    }
}

fn merge_geometries(geometry: &mut Geometry, indices: &[GeometryIndex]) -> Result<Operation> {
    let mut indices = indices.to_vec();
    indices.sort();
    indices.dedup();
    if indices.len() < 2 {
        return Err(EditError::InsufficientGeometries {
            count: indices.len(),
        });
    }

    let parent = indices[0].parent();
    let mut positions = Vec::with_capacity(indices.len());
    for index in &indices {
        match index.split_last() {
            Some((p, IndexStep::Geometry(n))) if Some(&p) == parent.as_ref() => positions.push(n),
            _ => {
                return Err(EditError::kind_mismatch(
                    format!("merge {index}"),
                    "siblings inside one multi geometry",
                    geometry.kind(),
                ));
            }
        }
    }
    let parent = parent.unwrap_or_default();

    let mut container = geometry_at(geometry, &parent)?.clone();
    if !container.kind().is_multi() {
        return Err(EditError::kind_mismatch(
            format!("merge inside {parent}"),
            "a multi geometry",
            container.kind(),
        ));
    }

    let mut inputs = Vec::with_capacity(positions.len());
    for &n in &positions {
        let member = container
            .children()
            .get(n)
            .ok_or_else(|| out_of_range(&parent.child(n), n, container.children().len()))?;
        inputs.push(member.clone());
    }

    let merged = merge::merge(&inputs)?;
    let merged_members = if merged.kind().is_multi() {
        merged.children().to_vec()
    } else {
        vec![merged]
    };

    // Positions are sorted ascending; remove from the back
    let members = container.children_mut();
    for &n in positions.iter().rev() {
        members.remove(n);
    }
    let at = positions[0];
    for (offset, member) in merged_members.into_iter().enumerate() {
        members.insert(at + offset, member);
    }

    replace(geometry, &parent, container)
}
