// Copyright 2025 the Geoedit Authors
// SPDX-License-Identifier: Apache-2.0

//! Editing model: operations, history, selection and the edit session

pub mod events;
pub mod hit_test;
pub mod operation;
pub mod selection;
pub mod session;
pub mod undo;

pub use events::{NullSink, RenderingSink, SessionEventBus, TracingSink};
pub use hit_test::{FeatureKind, HitTestResult, hit_test};
pub use operation::Operation;
pub use selection::Selection;
pub use session::{EditSession, SessionState, SuspendReason};
pub use undo::UndoState;
