// Copyright 2025 the Geoedit Authors
// SPDX-License-Identifier: Apache-2.0

//! Higher-level geometry services: snapping, splitting and merging
//!
//! These are stateless functions over `Geometry` values. The edit session
//! reaches split and merge through `Operation::SplitPolygon` and
//! `Operation::MergeGeometries` so they land on the undo stack.

pub mod knife;
pub mod merge;
pub mod snap;

pub use knife::split;
pub use merge::merge;
pub use snap::{Snap, snap};
