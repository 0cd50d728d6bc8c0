// Copyright 2025 the Geoedit Authors
// SPDX-License-Identifier: Apache-2.0

//! Scripted session replay
//!
//! A script is a JSON list of steps run against one edit session, e.g.
//!
//! ```json
//! [
//!   { "step": "apply", "operation": { "op": "move_coordinate",
//!       "index": [{ "Geometry": 0 }, { "Vertex": 1 }],
//!       "coordinate": { "x": 12.0, "y": 0.0 } } },
//!   { "step": "undo" },
//!   { "step": "commit" }
//! ]
//! ```
//!
//! Used by the `geoedit` binary to drive the engine without a front-end.

use crate::editing::{EditSession, Operation, SuspendReason};
use crate::model::{Geometry, GeometryIndex};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One scripted interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    Apply { operation: Operation },
    Undo,
    Redo,
    Select { index: GeometryIndex },
    Deselect { index: GeometryIndex },
    Mark { indices: Vec<GeometryIndex> },
    Unmark { indices: Vec<GeometryIndex> },
    ApplyDeletions,
    Suspend { reason: SuspendReason },
    Resume,
    Commit,
    Cancel,
}

impl Step {
    fn name(&self) -> &'static str {
        match self {
            Step::Apply { .. } => "apply",
            Step::Undo => "undo",
            Step::Redo => "redo",
            Step::Select { .. } => "select",
            Step::Deselect { .. } => "deselect",
            Step::Mark { .. } => "mark",
            Step::Unmark { .. } => "unmark",
            Step::ApplyDeletions => "apply_deletions",
            Step::Suspend { .. } => "suspend",
            Step::Resume => "resume",
            Step::Commit => "commit",
            Step::Cancel => "cancel",
        }
    }
}

/// What a replay ended with
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    /// The committed geometry, the original on cancel, or the working
    /// copy if the script never stopped the session
    pub geometry: Geometry,
    /// `Some(true)` on commit, `Some(false)` on cancel
    pub committed: Option<bool>,
    pub steps_run: usize,
    pub undo_depth: usize,
    pub redo_depth: usize,
}

/// Parse a script from JSON text
pub fn parse_script(text: &str) -> Result<Vec<Step>> {
    serde_json::from_str(text).context("Failed to parse replay script")
}

/// Load a geometry from a JSON file
pub fn load_geometry(path: &Path) -> Result<Geometry> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read geometry file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Invalid geometry in {}", path.display()))
}

/// Start `session` on `geometry` and run `steps` in order
///
/// Stops at the first failing step. Steps after a commit or cancel are
/// rejected by the stopped session.
pub fn run_script(session: &mut EditSession, geometry: &Geometry, steps: &[Step]) -> Result<Outcome> {
    session.start(geometry).context("Failed to start session")?;

    let mut stopped: Option<(Geometry, bool)> = None;
    for (n, step) in steps.iter().enumerate() {
        tracing::debug!("step {}: {}", n, step.name());
        let result = match step {
            Step::Apply { operation } => session.apply(operation.clone()),
            Step::Undo => session.undo().map(|_| ()),
            Step::Redo => session.redo().map(|_| ()),
            Step::Select { index } => session.select(index.clone()),
            Step::Deselect { index } => session.deselect(index),
            Step::Mark { indices } => session.mark_for_deletion(indices),
            Step::Unmark { indices } => session.unmark(indices),
            Step::ApplyDeletions => session.apply_deletions(),
            Step::Suspend { reason } => session.suspend(reason.clone()),
            Step::Resume => session.resume(),
            Step::Commit | Step::Cancel => {
                let commit = matches!(step, Step::Commit);
                session.stop(commit).map(|g| stopped = Some((g, commit)))
            }
        };
        result.with_context(|| format!("Step {} ({}) failed", n, step.name()))?;
    }

    let undo_depth = session.undo_depth();
    let redo_depth = session.redo_depth();
    let (geometry, committed) = match stopped {
        Some((geometry, commit)) => (geometry, Some(commit)),
        None => (
            session
                .geometry()
                .cloned()
                .context("Session has no working geometry")?,
            None,
        ),
    };

    Ok(Outcome {
        geometry,
        committed,
        steps_run: steps.len(),
        undo_depth,
        redo_depth,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::NullSink;
    use crate::math;
    use crate::settings::EditorSettings;
    use kurbo::Point;

    fn session() -> EditSession {
        EditSession::new(Box::new(NullSink), Box::new(NullSink), EditorSettings::default())
    }

    fn square() -> Geometry {
        serde_json::from_str(
            r#"{
                "kind": "Polygon",
                "children": [{
                    "kind": "LinearRing",
                    "coordinates": [
                        {"x": 0.0, "y": 0.0}, {"x": 10.0, "y": 0.0},
                        {"x": 10.0, "y": 10.0}, {"x": 0.0, "y": 10.0},
                        {"x": 0.0, "y": 0.0}
                    ]
                }]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn script_edits_and_commits() {
        let script = parse_script(
            r#"[
                {"step": "apply", "operation": {"op": "move_coordinate",
                    "index": [{"Geometry": 0}, {"Vertex": 2}],
                    "coordinate": {"x": 20.0, "y": 10.0}}},
                {"step": "apply", "operation": {"op": "move_coordinate",
                    "index": [{"Geometry": 0}, {"Vertex": 1}],
                    "coordinate": {"x": 20.0, "y": 0.0}}},
                {"step": "undo"},
                {"step": "redo"},
                {"step": "commit"}
            ]"#,
        )
        .unwrap();

        let outcome = run_script(&mut session(), &square(), &script).unwrap();
        assert_eq!(outcome.committed, Some(true));
        assert_eq!(outcome.steps_run, 5);
        assert!((math::area(&outcome.geometry) - 200.0).abs() < 1e-9);
    }

    #[test]
    fn script_deletes_marked_vertices() {
        let script = parse_script(
            r#"[
                {"step": "apply", "operation": {"op": "add_coordinate",
                    "index": [{"Geometry": 0}, {"Edge": 0}],
                    "coordinate": {"x": 5.0, "y": -5.0}}},
                {"step": "mark", "indices": [[{"Geometry": 0}, {"Vertex": 1}]]},
                {"step": "apply_deletions"}
            ]"#,
        )
        .unwrap();

        let outcome = run_script(&mut session(), &square(), &script).unwrap();
        assert_eq!(outcome.committed, None);
        assert_eq!(outcome.geometry, square());
        assert_eq!(outcome.undo_depth, 2);
    }

    #[test]
    fn cancel_returns_the_original() {
        let steps = vec![
            Step::Apply {
                operation: Operation::MoveCoordinate {
                    index: GeometryIndex::root().child(0).vertex(0),
                    coordinate: Point::new(-5.0, -5.0),
                },
            },
            Step::Suspend {
                reason: SuspendReason::DrawSplitLine,
            },
            Step::Cancel,
        ];
        let outcome = run_script(&mut session(), &square(), &steps).unwrap();
        assert_eq!(outcome.committed, Some(false));
        assert_eq!(outcome.geometry, square());
    }

    #[test]
    fn failing_step_is_reported() {
        let steps = vec![
            Step::Suspend {
                reason: SuspendReason::SelectRingToRemove,
            },
            Step::Apply {
                operation: Operation::RemoveRing {
                    polygon: GeometryIndex::root(),
                    ring: 1,
                },
            },
        ];
        let err = run_script(&mut session(), &square(), &steps).unwrap_err();
        assert!(format!("{err:#}").contains("Step 1 (apply)"));
    }

    #[test]
    fn malformed_script_is_an_error() {
        assert!(parse_script(r#"[{"step": "explode"}]"#).is_err());
    }
}
