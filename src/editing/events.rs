// Copyright 2025 the Geoedit Authors
// SPDX-License-Identifier: Apache-2.0

//! Collaborators notified by an edit session
//!
//! A session is constructed with one `RenderingSink` and one
//! `SessionEventBus`. Notifications are delivered synchronously from the
//! call that caused them. They are observational: there is no return
//! value, and nothing a sink does can undo the edit.

use super::session::SuspendReason;
use crate::model::{Geometry, GeometryIndex};

/// Receives the state that needs redrawing after each successful change
pub trait RenderingSink {
    /// The working geometry changed (edit, undo or redo)
    fn on_geometry_changed(&mut self, _geometry: &Geometry) {}

    /// The selection set changed; indices are in ascending order
    fn on_selection_changed(&mut self, _indices: &[GeometryIndex]) {}

    /// The mark-for-deletion set changed; indices are in ascending order
    fn on_mark_for_deletion_changed(&mut self, _indices: &[GeometryIndex]) {}
}

/// Receives one notification per session state transition
pub trait SessionEventBus {
    /// Editing started on `geometry`
    fn on_start(&mut self, _geometry: &Geometry) {}

    /// The session stopped. `geometry` is what `stop` hands back: the
    /// working copy when `committed`, the original source otherwise.
    fn on_stop(&mut self, _geometry: &Geometry, _committed: bool) {}

    fn on_suspend(&mut self, _reason: &SuspendReason) {}

    fn on_resume(&mut self) {}
}

/// Discards every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl RenderingSink for NullSink {}
impl SessionEventBus for NullSink {}

/// Logs every notification through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl RenderingSink for TracingSink {
    fn on_geometry_changed(&mut self, geometry: &Geometry) {
        tracing::debug!(
            "geometry changed: {:?} with {} coordinates",
            geometry.kind(),
            geometry.coordinate_count()
        );
    }

    fn on_selection_changed(&mut self, indices: &[GeometryIndex]) {
        tracing::debug!("selection: {}", join(indices));
    }

    fn on_mark_for_deletion_changed(&mut self, indices: &[GeometryIndex]) {
        tracing::debug!("marked for deletion: {}", join(indices));
    }
}

impl SessionEventBus for TracingSink {
    fn on_start(&mut self, geometry: &Geometry) {
        tracing::info!("editing started on {:?}", geometry.kind());
    }

    fn on_stop(&mut self, geometry: &Geometry, committed: bool) {
        let outcome = if committed { "committed" } else { "cancelled" };
        tracing::info!("editing {} ({:?})", outcome, geometry.kind());
    }

    fn on_suspend(&mut self, reason: &SuspendReason) {
        tracing::info!("editing suspended: {}", reason);
    }

    fn on_resume(&mut self) {
        tracing::info!("editing resumed");
    }
}

fn join(indices: &[GeometryIndex]) -> String {
    if indices.is_empty() {
        return "(none)".to_string();
    }
    indices
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
