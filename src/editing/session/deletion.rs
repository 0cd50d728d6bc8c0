// Copyright 2025 the Geoedit Authors
// SPDX-License-Identifier: Apache-2.0

//! Mark-for-deletion bookkeeping and batch deletion for EditSession

use super::EditSession;
use crate::editing::operation::Operation;
use crate::error::{EditError, Result};
use crate::model::{Geometry, GeometryIndex, GeometryKind, IndexStep, geometry_at};
use std::collections::BTreeMap;

impl EditSession {
    /// Mark indices for deletion
    ///
    /// Marks have no geometric effect until `apply_deletions`. Each index
    /// must address a vertex, a polygon's interior ring, or a member of a
    /// multi geometry. Nothing is marked if any index is rejected.
    pub fn mark_for_deletion(&mut self, indices: &[GeometryIndex]) -> Result<()> {
        self.ensure_interactive("mark for deletion")?;
        let Some(working) = self.working.as_ref() else {
            return Err(self.rejected("mark for deletion"));
        };
        for index in indices {
            index.resolve(working)?;
            deletion_for(working, index)?;
        }

        let mut changed = false;
        for index in indices {
            changed |= self.marked.insert(index.clone());
        }
        if changed {
            self.sink.on_mark_for_deletion_changed(&self.marked.to_vec());
        }
        Ok(())
    }

    /// Remove indices from the mark set; unknown indices are ignored
    pub fn unmark(&mut self, indices: &[GeometryIndex]) -> Result<()> {
        self.ensure_interactive("unmark")?;
        let mut changed = false;
        for index in indices {
            changed |= self.marked.remove(index);
        }
        if changed {
            self.sink.on_mark_for_deletion_changed(&self.marked.to_vec());
        }
        Ok(())
    }

    /// Delete everything marked as a single undoable step
    ///
    /// Removals run highest index first so earlier removals do not shift
    /// the positions of later ones. Marks inside a marked ring or member
    /// are covered by removing the container. If any removal fails, the
    /// working copy and the marks are left as they were.
    pub fn apply_deletions(&mut self) -> Result<()> {
        self.ensure_editing("apply deletions")?;
        if self.marked.is_empty() {
            return Ok(());
        }
        let Some(working) = self.working.as_ref() else {
            return Err(self.rejected("apply deletions"));
        };

        let mut removals = BTreeMap::new();
        for index in self.marked.iter() {
            let covered = self.marked.iter().any(|other| {
                other != index
                    && matches!(other.last(), Some(IndexStep::Geometry(_)))
                    && index.steps().starts_with(other.steps())
            });
            if !covered {
                let (target, operation) = deletion_for(working, index)?;
                removals.insert(target, operation);
            }
        }

        let operations: Vec<Operation> = removals.into_values().rev().collect();
        tracing::debug!("Applying {} deletions", operations.len());

        let marked = std::mem::take(&mut self.marked);
        match self.dispatch(&Operation::Composite { operations }, "apply deletions") {
            Ok(inverse) => {
                self.undo.record(inverse);
                self.sink.on_mark_for_deletion_changed(&[]);
                Ok(())
            }
            Err(err) => {
                self.marked = marked;
                Err(err)
            }
        }
    }
}

/// Map a marked index to the index it removes and the removal itself
///
/// The closing coordinate of a closed ring stands for vertex 0, so marking
/// both ends removes one vertex.
fn deletion_for(
    geometry: &Geometry,
    index: &GeometryIndex,
) -> Result<(GeometryIndex, Operation)> {
    let Some((parent, step)) = index.split_last() else {
        return Err(EditError::kind_mismatch(
            "delete the root geometry",
            "a vertex, interior ring or member",
            geometry.kind(),
        ));
    };
    let container = geometry_at(geometry, &parent)?;

    match step {
        IndexStep::Vertex(n) => {
            let coords = container.coordinates();
            if n >= coords.len() {
                return Err(EditError::IndexOutOfRange {
                    index: index.clone(),
                    depth: parent.steps().len(),
                    position: n,
                    len: coords.len(),
                });
            }
            let closing = container.kind() == GeometryKind::LinearRing
                && coords.len() >= 2
                && container.is_closed()
                && n + 1 == coords.len();
            let index = if closing {
                parent.vertex(0)
            } else {
                index.clone()
            };
            Ok((index.clone(), Operation::RemoveCoordinate { index }))
        }
        IndexStep::Geometry(0) if container.kind() == GeometryKind::Polygon => {
            Err(EditError::CannotRemoveExteriorRing)
        }
        IndexStep::Geometry(ring) if container.kind() == GeometryKind::Polygon => Ok((
            index.clone(),
            Operation::RemoveRing {
                polygon: parent,
                ring,
            },
        )),
        IndexStep::Geometry(_) if container.kind().is_multi() => Ok((
            index.clone(),
            Operation::RemoveGeometry {
                index: index.clone(),
            },
        )),
        IndexStep::Geometry(_) | IndexStep::Edge(_) => Err(EditError::kind_mismatch(
            format!("delete {index}"),
            "a vertex, interior ring or member",
            container.kind(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{Event, recorded_session, square_polygon};
    use super::super::{SessionState, SuspendReason};
    use crate::error::EditError;
    use crate::model::geometry::tests::square;
    use crate::model::{Geometry, GeometryIndex};
    use kurbo::Point;

    fn pentagon() -> Geometry {
        Geometry::polygon(
            Geometry::linear_ring(vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(12.0, 6.0),
                Point::new(5.0, 10.0),
                Point::new(-2.0, 6.0),
            ]),
            vec![square(2.0, 2.0, 2.0), square(6.0, 2.0, 2.0)],
        )
    }

    fn ext(n: usize) -> GeometryIndex {
        GeometryIndex::root().child(0).vertex(n)
    }

    #[test]
    fn marking_is_bookkeeping_only() {
        let (mut session, recorder) = recorded_session();
        session.start(&pentagon()).unwrap();
        recorder.take();

        session.mark_for_deletion(&[ext(3), ext(1)]).unwrap();
        assert_eq!(session.geometry(), Some(&pentagon()));
        assert!(session.selection().is_empty());
        assert_eq!(session.marked().to_vec(), vec![ext(1), ext(3)]);

        session.unmark(&[ext(3)]).unwrap();
        assert_eq!(
            recorder.take(),
            vec![
                Event::Marked(vec![ext(1), ext(3)]),
                Event::Marked(vec![ext(1)]),
            ]
        );
    }

    #[test]
    fn deletions_apply_highest_first_as_one_undo_step() {
        let (mut session, _) = recorded_session();
        session.start(&pentagon()).unwrap();
        session.mark_for_deletion(&[ext(1), ext(3)]).unwrap();
        session.apply_deletions().unwrap();

        let ring = session.geometry().unwrap().exterior().unwrap().coordinates().to_vec();
        assert_eq!(
            ring,
            vec![
                Point::new(0.0, 0.0),
                Point::new(12.0, 6.0),
                Point::new(-2.0, 6.0),
                Point::new(0.0, 0.0),
            ]
        );
        assert!(session.marked().is_empty());
        assert_eq!(session.undo_depth(), 1);

        session.undo().unwrap();
        assert_eq!(session.geometry(), Some(&pentagon()));
    }

    #[test]
    fn closing_vertex_counts_as_first() {
        let (mut session, _) = recorded_session();
        session.start(&pentagon()).unwrap();
        session.mark_for_deletion(&[ext(0), ext(5)]).unwrap();
        session.apply_deletions().unwrap();

        let ring = session.geometry().unwrap().exterior().unwrap();
        assert_eq!(ring.coordinates().len(), 5);
        assert_eq!(ring.coordinates()[0], Point::new(10.0, 0.0));
        assert!(ring.is_closed());
    }

    #[test]
    fn ring_marks_remove_rings_and_cover_their_vertices() {
        let (mut session, _) = recorded_session();
        session.start(&pentagon()).unwrap();
        let hole = GeometryIndex::root().child(1);
        session
            .mark_for_deletion(&[hole.vertex(2), hole.clone(), GeometryIndex::root().child(2)])
            .unwrap();
        session.apply_deletions().unwrap();
        assert!(session.geometry().unwrap().holes().is_empty());

        session.undo().unwrap();
        assert_eq!(session.geometry(), Some(&pentagon()));
    }

    #[test]
    fn member_marks_remove_members() {
        let (mut session, _) = recorded_session();
        let mp = Geometry::multi_point(vec![
            Geometry::point(Point::new(0.0, 0.0)),
            Geometry::point(Point::new(1.0, 0.0)),
            Geometry::point(Point::new(2.0, 0.0)),
        ]);
        session.start(&mp).unwrap();
        session
            .mark_for_deletion(&[GeometryIndex::root().child(0), GeometryIndex::root().child(2)])
            .unwrap();
        session.apply_deletions().unwrap();
        assert_eq!(
            session.geometry(),
            Some(&Geometry::multi_point(vec![Geometry::point(Point::new(1.0, 0.0))]))
        );
    }

    #[test]
    fn failed_batch_keeps_geometry_and_marks() {
        let (mut session, _) = recorded_session();
        session.start(&square_polygon()).unwrap();
        session.mark_for_deletion(&[ext(1), ext(2)]).unwrap();

        let err = session.apply_deletions().unwrap_err();
        assert!(matches!(err, EditError::MinimumVertexCount { minimum: 4, .. }));
        assert_eq!(session.geometry(), Some(&square_polygon()));
        assert_eq!(session.marked().len(), 2);
        assert!(!session.can_undo());
    }

    #[test]
    fn unremovable_marks_are_rejected() {
        let (mut session, _) = recorded_session();
        session.start(&pentagon()).unwrap();

        let edge = GeometryIndex::root().child(0).edge(1);
        assert!(matches!(
            session.mark_for_deletion(&[ext(1), edge]),
            Err(EditError::KindMismatch { .. })
        ));
        assert!(session.mark_for_deletion(&[GeometryIndex::root()]).is_err());
        assert!(matches!(
            session.mark_for_deletion(&[ext(9)]),
            Err(EditError::IndexOutOfRange { .. })
        ));
        // The append slot resolves but holds no vertex to delete
        assert!(matches!(
            session.mark_for_deletion(&[ext(6)]),
            Err(EditError::IndexOutOfRange { position: 6, len: 6, .. })
        ));
        assert!(matches!(
            session.mark_for_deletion(&[ext(2), GeometryIndex::root().child(0)]),
            Err(EditError::CannotRemoveExteriorRing)
        ));
        assert!(session.marked().is_empty());
        session.apply_deletions().unwrap();
        assert_eq!(session.geometry(), Some(&pentagon()));
    }

    #[test]
    fn empty_batch_is_a_no_op() {
        let (mut session, recorder) = recorded_session();
        session.start(&pentagon()).unwrap();
        recorder.take();
        session.apply_deletions().unwrap();
        assert!(recorder.take().is_empty());
        assert!(!session.can_undo());
    }

    #[test]
    fn apply_deletions_requires_editing() {
        let (mut session, _) = recorded_session();
        session.start(&pentagon()).unwrap();
        session.mark_for_deletion(&[ext(1)]).unwrap();
        session.suspend(SuspendReason::SelectRingToRemove).unwrap();
        assert!(matches!(
            session.apply_deletions(),
            Err(EditError::InvalidSessionState { state: SessionState::Suspended(_), .. })
        ));
        session.resume().unwrap();
        session.apply_deletions().unwrap();
    }
}
