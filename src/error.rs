// Copyright 2025 the Geoedit Authors
// SPDX-License-Identifier: Apache-2.0

//! Error kinds surfaced by operations, services, and the edit session.

use crate::editing::session::SessionState;
use crate::model::{GeometryIndex, GeometryKind};

/// Everything that can go wrong while editing a geometry.
///
/// Every failing call leaves the working geometry untouched, so callers
/// can simply re-prompt the user.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    /// A step of the index points past the end of a child or coordinate list
    #[error("index {index} is out of range (step {depth} addresses {position}, length is {len})")]
    IndexOutOfRange {
        index: GeometryIndex,
        depth: usize,
        position: usize,
        len: usize,
    },

    /// A step of the index (or an operation payload) does not fit the
    /// geometry kind found at that depth
    #[error("{context}: expected {expected}, found {found:?}")]
    KindMismatch {
        context: String,
        expected: &'static str,
        found: GeometryKind,
    },

    /// The session is not in a state that accepts the request
    #[error("cannot {action} while the session is {state:?}")]
    InvalidSessionState {
        action: &'static str,
        state: SessionState,
    },

    /// Removing a coordinate would leave a degenerate geometry
    #[error("{kind:?} needs at least {minimum} coordinates, removal would leave {remaining}")]
    MinimumVertexCount {
        kind: GeometryKind,
        minimum: usize,
        remaining: usize,
    },

    /// Ring 0 of a polygon is its exterior and cannot be removed
    #[error("the exterior ring of a polygon cannot be removed")]
    CannotRemoveExteriorRing,

    /// The cut line does not cross the exterior ring exactly twice
    #[error("invalid split line: {0}")]
    InvalidSplitLine(String),

    /// A hole would end up on both sides of a split
    #[error("interior ring {ring} straddles the split line")]
    AmbiguousHoleAssignment { ring: usize },

    /// Merge needs at least two inputs
    #[error("merge needs at least 2 geometries, got {count}")]
    InsufficientGeometries { count: usize },
}

impl EditError {
    pub(crate) fn kind_mismatch(
        context: impl Into<String>,
        expected: &'static str,
        found: GeometryKind,
    ) -> Self {
        EditError::KindMismatch {
            context: context.into(),
            expected,
            found,
        }
    }
}

/// Result alias used across the crate
pub type Result<T, E = EditError> = std::result::Result<T, E>;
