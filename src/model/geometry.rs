// Copyright 2025 the Geoedit Authors
// SPDX-License-Identifier: Apache-2.0

//! The geometry tree being edited.
//!
//! A `Geometry` is a tagged node: leaf kinds (Point, LineString,
//! LinearRing) own a coordinate list, container kinds (Polygon and the
//! Multi* kinds) own child geometries. A polygon's child 0 is its exterior
//! ring and children 1.. are holes. Nodes never point back at their parent;
//! sub-geometries are addressed from the root with a `GeometryIndex`.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// A single (x, y) position in world units
pub type Coordinate = Point;

/// Declared type of a geometry node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    LineString,
    LinearRing,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
}

impl GeometryKind {
    /// Whether this kind stores coordinates directly
    pub fn has_coordinates(self) -> bool {
        matches!(
            self,
            GeometryKind::Point | GeometryKind::LineString | GeometryKind::LinearRing
        )
    }

    /// Whether this kind stores child geometries
    pub fn has_children(self) -> bool {
        !self.has_coordinates()
    }

    /// Whether this is one of the Multi* collection kinds
    pub fn is_multi(self) -> bool {
        matches!(
            self,
            GeometryKind::MultiPoint | GeometryKind::MultiLineString | GeometryKind::MultiPolygon
        )
    }

    /// Smallest number of coordinates a non-degenerate geometry of this
    /// kind can hold. Zero for container kinds.
    pub fn minimum_coordinates(self) -> usize {
        match self {
            GeometryKind::Point => 1,
            GeometryKind::LineString => 2,
            GeometryKind::LinearRing => 4,
            GeometryKind::Polygon
            | GeometryKind::MultiPoint
            | GeometryKind::MultiLineString
            | GeometryKind::MultiPolygon => 0,
        }
    }

    /// Kind of the children a Multi* kind holds
    pub fn member_kind(self) -> Option<GeometryKind> {
        match self {
            GeometryKind::MultiPoint => Some(GeometryKind::Point),
            GeometryKind::MultiLineString => Some(GeometryKind::LineString),
            GeometryKind::MultiPolygon => Some(GeometryKind::Polygon),
            GeometryKind::Polygon => Some(GeometryKind::LinearRing),
            GeometryKind::Point | GeometryKind::LineString | GeometryKind::LinearRing => None,
        }
    }
}

/// A node in the geometry tree
///
/// Cloning is a deep copy. Equality is structural and exact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    kind: GeometryKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    coordinates: Vec<Coordinate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<Geometry>,
}

impl Geometry {
    fn leaf(kind: GeometryKind, coordinates: Vec<Coordinate>) -> Self {
        Self {
            kind,
            coordinates,
            children: Vec::new(),
        }
    }

    fn container(kind: GeometryKind, children: Vec<Geometry>) -> Self {
        Self {
            kind,
            coordinates: Vec::new(),
            children,
        }
    }

    pub fn point(coordinate: Coordinate) -> Self {
        Self::leaf(GeometryKind::Point, vec![coordinate])
    }

    pub fn line_string(coordinates: Vec<Coordinate>) -> Self {
        Self::leaf(GeometryKind::LineString, coordinates)
    }

    /// Create a ring, appending the closing coordinate if it is missing
    pub fn linear_ring(mut coordinates: Vec<Coordinate>) -> Self {
        if let (Some(first), Some(last)) = (coordinates.first(), coordinates.last())
            && first != last
        {
            coordinates.push(*first);
        }
        Self::leaf(GeometryKind::LinearRing, coordinates)
    }

    /// Create a polygon from an exterior ring and any number of holes
    pub fn polygon(exterior: Geometry, holes: Vec<Geometry>) -> Self {
        let mut rings = Vec::with_capacity(holes.len() + 1);
        rings.push(exterior);
        rings.extend(holes);
        Self::container(GeometryKind::Polygon, rings)
    }

    pub fn multi_point(points: Vec<Geometry>) -> Self {
        Self::container(GeometryKind::MultiPoint, points)
    }

    pub fn multi_line_string(lines: Vec<Geometry>) -> Self {
        Self::container(GeometryKind::MultiLineString, lines)
    }

    pub fn multi_polygon(polygons: Vec<Geometry>) -> Self {
        Self::container(GeometryKind::MultiPolygon, polygons)
    }

    pub fn kind(&self) -> GeometryKind {
        self.kind
    }

    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }

    pub fn children(&self) -> &[Geometry] {
        &self.children
    }

    pub(crate) fn coordinates_mut(&mut self) -> &mut Vec<Coordinate> {
        &mut self.coordinates
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<Geometry> {
        &mut self.children
    }

    /// Exterior ring of a polygon
    pub fn exterior(&self) -> Option<&Geometry> {
        match self.kind {
            GeometryKind::Polygon => self.children.first(),
            _ => None,
        }
    }

    /// Interior rings (holes) of a polygon; empty for every other kind
    pub fn holes(&self) -> &[Geometry] {
        match self.kind {
            GeometryKind::Polygon if !self.children.is_empty() => &self.children[1..],
            _ => &[],
        }
    }

    /// First coordinate equals the last one
    pub fn is_closed(&self) -> bool {
        match (self.coordinates.first(), self.coordinates.last()) {
            (Some(first), Some(last)) => first == last,
            _ => false,
        }
    }

    /// Total number of coordinates in this node and all descendants
    pub fn coordinate_count(&self) -> usize {
        self.coordinates.len()
            + self
                .children
                .iter()
                .map(Geometry::coordinate_count)
                .sum::<usize>()
    }

    /// Structural validity: kinds line up, rings are closed and
    /// non-degenerate, leaves hold enough coordinates.
    ///
    /// A ring under active editing may be temporarily invalid; the
    /// session does not enforce this.
    pub fn is_valid(&self) -> bool {
        if self.kind.has_coordinates() {
            if !self.children.is_empty() {
                return false;
            }
            let enough = match self.kind {
                GeometryKind::Point => self.coordinates.len() == 1,
                kind => self.coordinates.len() >= kind.minimum_coordinates(),
            };
            let closed = self.kind != GeometryKind::LinearRing || self.is_closed();
            return enough && closed;
        }

        if !self.coordinates.is_empty() {
            return false;
        }
        if self.kind == GeometryKind::Polygon && self.children.is_empty() {
            return false;
        }
        let member = self.kind.member_kind();
        self.children
            .iter()
            .all(|child| Some(child.kind) == member && child.is_valid())
    }

    /// Visit every coordinate in tree order
    pub fn for_each_coordinate(&self, f: &mut impl FnMut(Coordinate)) {
        for &c in &self.coordinates {
            f(c);
        }
        for child in &self.children {
            child.for_each_coordinate(f);
        }
    }
}
