// Copyright 2025 the Geoedit Authors
// SPDX-License-Identifier: Apache-2.0

//! Edit session - the state machine around one geometry being edited
//!
//! A session moves `Idle -> Editing -> Stopped`, with `Editing` able to
//! step aside into `Suspended` while the front-end collects a secondary
//! input (the ring to remove, the split line to draw). It owns the
//! working copy, the undo/redo history, the selection and the
//! mark-for-deletion set, and reports every change to its collaborators.

mod deletion;

use super::events::{RenderingSink, SessionEventBus};
use super::hit_test;
use super::operation::Operation;
use super::selection::Selection;
use super::undo::UndoState;
use crate::error::{EditError, Result};
use crate::model::{Coordinate, Geometry, GeometryIndex};
use crate::settings::EditorSettings;
use crate::tools::snap::{self, Snap};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a session is suspended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuspendReason {
    /// Waiting for the user to pick the ring to remove
    SelectRingToRemove,
    /// Waiting for the user to draw a cut line
    DrawSplitLine,
    /// Waiting for the user to pick the geometries to merge
    SelectMergeTargets,
    /// Anything else the front-end needs
    Custom(String),
}

impl fmt::Display for SuspendReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuspendReason::SelectRingToRemove => f.write_str("select ring to remove"),
            SuspendReason::DrawSplitLine => f.write_str("draw split line"),
            SuspendReason::SelectMergeTargets => f.write_str("select merge targets"),
            SuspendReason::Custom(reason) => f.write_str(reason),
        }
    }
}

/// Where a session is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Editing,
    Suspended(SuspendReason),
    /// Terminal; the session cannot be restarted
    Stopped,
}

/// Editing session for a single geometry
///
/// Collaborators are passed in at construction. All calls run to
/// completion synchronously; callers sharing a session across threads
/// must serialize access themselves.
pub struct EditSession {
    state: SessionState,

    /// Deep copy of the geometry editing started on, returned on cancel
    source: Option<Geometry>,

    /// The live edit target
    working: Option<Geometry>,

    undo: UndoState,

    selection: Selection,

    /// Indices waiting for `apply_deletions`
    marked: Selection,

    settings: EditorSettings,

    sink: Box<dyn RenderingSink>,
    events: Box<dyn SessionEventBus>,
}

impl fmt::Debug for EditSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditSession")
            .field("state", &self.state)
            .field("working", &self.working)
            .field("undo_depth", &self.undo.undo_depth())
            .field("redo_depth", &self.undo.redo_depth())
            .field("selection", &self.selection)
            .field("marked", &self.marked)
            .finish_non_exhaustive()
    }
}

impl EditSession {
    /// Create an idle session wired to its collaborators
    pub fn new(
        sink: Box<dyn RenderingSink>,
        events: Box<dyn SessionEventBus>,
        settings: EditorSettings,
    ) -> Self {
        Self {
            state: SessionState::Idle,
            source: None,
            working: None,
            undo: UndoState::new(settings.history.max_undo),
            selection: Selection::new(),
            marked: Selection::new(),
            settings,
            sink,
            events,
        }
    }

    // ===== Lifecycle =====

    /// Begin editing a copy of `source`
    pub fn start(&mut self, source: &Geometry) -> Result<()> {
        if self.state != SessionState::Idle {
            return Err(self.rejected("start"));
        }

        self.source = Some(source.clone());
        self.working = Some(source.clone());
        self.undo.clear();
        self.selection.clear();
        self.marked.clear();
        self.state = SessionState::Editing;

        tracing::info!("Session started on {:?}", source.kind());
        self.events.on_start(source);
        self.sink.on_geometry_changed(source);
        Ok(())
    }

    /// Stop accepting edits until `resume`
    pub fn suspend(&mut self, reason: SuspendReason) -> Result<()> {
        if self.state != SessionState::Editing {
            return Err(self.rejected("suspend"));
        }
        tracing::info!("Session suspended: {}", reason);
        self.events.on_suspend(&reason);
        self.state = SessionState::Suspended(reason);
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        if !matches!(self.state, SessionState::Suspended(_)) {
            return Err(self.rejected("resume"));
        }
        self.state = SessionState::Editing;
        tracing::info!("Session resumed");
        self.events.on_resume();
        Ok(())
    }

    /// End the session
    ///
    /// With `commit` the working copy is returned, otherwise the original
    /// source, unchanged. Available while editing or suspended.
    pub fn stop(&mut self, commit: bool) -> Result<Geometry> {
        if !matches!(
            self.state,
            SessionState::Editing | SessionState::Suspended(_)
        ) {
            return Err(self.rejected("stop"));
        }

        let working = self.working.take();
        let source = self.source.take();
        let result = if commit { working } else { source };
        let Some(result) = result else {
            return Err(self.rejected("stop"));
        };

        self.state = SessionState::Stopped;
        self.undo.clear();
        if !self.selection.is_empty() {
            self.selection.clear();
            self.sink.on_selection_changed(&[]);
        }
        if !self.marked.is_empty() {
            self.marked.clear();
            self.sink.on_mark_for_deletion_changed(&[]);
        }

        tracing::info!(
            "Session stopped ({})",
            if commit { "committed" } else { "cancelled" }
        );
        self.events.on_stop(&result, commit);
        Ok(result)
    }

    // ===== Editing =====

    /// Apply an operation to the working copy and record its inverse
    ///
    /// On error the working copy is unchanged and no collaborator is
    /// notified.
    pub fn apply(&mut self, operation: Operation) -> Result<()> {
        let inverse = self.dispatch(&operation, "apply an operation")?;
        self.undo.record(inverse);
        Ok(())
    }

    /// Revert the most recent edit. Returns `false` when there was
    /// nothing to undo.
    pub fn undo(&mut self) -> Result<bool> {
        self.ensure_editing("undo")?;
        let Some(inverse) = self.undo.pop_undo() else {
            return Ok(false);
        };
        match self.dispatch(&inverse, "undo") {
            Ok(redo) => {
                self.undo.push_redo(redo);
                Ok(true)
            }
            Err(err) => {
                self.undo.push_undo(inverse);
                Err(err)
            }
        }
    }

    /// Reapply the most recently undone edit. Returns `false` when there
    /// was nothing to redo.
    pub fn redo(&mut self) -> Result<bool> {
        self.ensure_editing("redo")?;
        let Some(operation) = self.undo.pop_redo() else {
            return Ok(false);
        };
        match self.dispatch(&operation, "redo") {
            Ok(inverse) => {
                self.undo.push_undo(inverse);
                Ok(true)
            }
            Err(err) => {
                self.undo.push_redo(operation);
                Err(err)
            }
        }
    }

    /// Apply to the working copy and notify; returns the inverse
    fn dispatch(&mut self, operation: &Operation, action: &'static str) -> Result<Operation> {
        self.ensure_editing(action)?;
        let Some(working) = self.working.as_ref() else {
            return Err(self.rejected(action));
        };

        let (edited, inverse) = operation.apply(working).inspect_err(|err| {
            tracing::warn!("{} rejected: {}", operation.name(), err);
        })?;
        self.working = Some(edited);
        self.after_geometry_change();
        Ok(inverse)
    }

    /// Notify the sink and drop selected or marked indices that no longer
    /// resolve against the new working copy
    fn after_geometry_change(&mut self) {
        let Some(working) = self.working.as_ref() else {
            return;
        };
        self.sink.on_geometry_changed(working);

        let resolves = |index: &GeometryIndex| index.resolve(working).is_ok();
        if self.selection.retain(resolves) {
            tracing::debug!("Pruned stale selection");
            self.sink.on_selection_changed(&self.selection.to_vec());
        }
        if self.marked.retain(resolves) {
            tracing::debug!("Pruned stale deletion marks");
            self.sink
                .on_mark_for_deletion_changed(&self.marked.to_vec());
        }
    }

    // ===== Selection =====

    /// Add `index` to the selection
    pub fn select(&mut self, index: GeometryIndex) -> Result<()> {
        self.check_index("select", &index)?;
        if self.selection.insert(index) {
            self.sink.on_selection_changed(&self.selection.to_vec());
        }
        Ok(())
    }

    /// Remove `index` from the selection
    pub fn deselect(&mut self, index: &GeometryIndex) -> Result<()> {
        self.ensure_interactive("deselect")?;
        if self.selection.remove(index) {
            self.sink.on_selection_changed(&self.selection.to_vec());
        }
        Ok(())
    }

    pub fn clear_selection(&mut self) -> Result<()> {
        self.ensure_interactive("clear the selection")?;
        if !self.selection.is_empty() {
            self.selection.clear();
            self.sink.on_selection_changed(&[]);
        }
        Ok(())
    }

    // ===== Queries =====

    /// Snap a dragged point against the working copy using the configured
    /// tolerance. `None` when snapping is disabled, nothing is in range,
    /// or no geometry is being edited.
    pub fn snap(&self, candidate: Coordinate, pixel_to_world_scale: f64) -> Option<Snap> {
        if !self.settings.snap.enabled {
            return None;
        }
        let working = self.working.as_ref()?;
        snap::snap(
            candidate,
            std::slice::from_ref(working),
            self.settings.snap.tolerance_pixels,
            pixel_to_world_scale,
        )
    }

    /// Vertex or edge of the working copy within `tolerance` (world
    /// units) of `point`
    pub fn hit_test(&self, point: Coordinate, tolerance: f64) -> Option<(GeometryIndex, f64)> {
        hit_test::hit_test(self.working.as_ref()?, point, tolerance)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The working copy, while a session is running
    pub fn geometry(&self) -> Option<&Geometry> {
        self.working.as_ref()
    }

    /// The geometry editing started on
    pub fn source(&self) -> Option<&Geometry> {
        self.source.as_ref()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn marked(&self) -> &Selection {
        &self.marked
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.undo_depth()
    }

    pub fn redo_depth(&self) -> usize {
        self.undo.redo_depth()
    }

    // ===== PRIVATE HELPERS =====

    fn rejected(&self, action: &'static str) -> EditError {
        tracing::warn!("Cannot {} while {:?}", action, self.state);
        EditError::InvalidSessionState {
            action,
            state: self.state.clone(),
        }
    }

    fn ensure_editing(&self, action: &'static str) -> Result<()> {
        if self.state == SessionState::Editing {
            Ok(())
        } else {
            Err(self.rejected(action))
        }
    }

    /// Selection bookkeeping is allowed while suspended, so the front-end
    /// can collect the input the suspension asked for
    fn ensure_interactive(&self, action: &'static str) -> Result<()> {
        match self.state {
            SessionState::Editing | SessionState::Suspended(_) => Ok(()),
            SessionState::Idle | SessionState::Stopped => Err(self.rejected(action)),
        }
    }

    /// Check the state and that `index` addresses something in the
    /// working copy
    fn check_index(&self, action: &'static str, index: &GeometryIndex) -> Result<()> {
        self.ensure_interactive(action)?;
        let Some(working) = self.working.as_ref() else {
            return Err(self.rejected(action));
        };
        index.resolve(working)?;
        Ok(())
    }
}
