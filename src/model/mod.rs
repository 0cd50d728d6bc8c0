// Copyright 2025 the Geoedit Authors
// SPDX-License-Identifier: Apache-2.0

//! Geometry data model

pub mod geometry;
pub mod index;

pub use geometry::{Coordinate, Geometry, GeometryKind};
pub use index::{GeometryIndex, IndexStep, ResolvedTarget, geometry_at, resolve};
