// Copyright 2025 the Geoedit Authors
// SPDX-License-Identifier: Apache-2.0

//! Undo/redo history of an edit session
//!
//! Both stacks hold operations ready to apply: the undo stack holds the
//! inverses of applied edits, the redo stack holds the inverses of undone
//! ones. Applying an entry yields the operation that belongs on the other
//! stack.

use super::operation::Operation;
use std::collections::VecDeque;

/// LIFO undo and redo stacks with an optional depth limit
#[derive(Debug, Clone)]
pub struct UndoState {
    undo_stack: VecDeque<Operation>,
    redo_stack: Vec<Operation>,
    /// Oldest entries are dropped past this depth; 0 means unlimited
    max_undo: usize,
}

impl UndoState {
    pub fn new(max_undo: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_undo,
        }
    }

    /// Record the inverse of a fresh edit
    ///
    /// A fresh edit starts a new branch of history, so the redo stack is
    /// cleared.
    pub fn record(&mut self, inverse: Operation) {
        self.redo_stack.clear();
        self.push_undo(inverse);
    }

    /// Push onto the undo stack without touching redo (used by redo)
    pub fn push_undo(&mut self, inverse: Operation) {
        self.undo_stack.push_back(inverse);
        if self.max_undo > 0 && self.undo_stack.len() > self.max_undo {
            self.undo_stack.pop_front();
            tracing::debug!("undo history full, dropped oldest entry");
        }
    }

    pub fn push_redo(&mut self, operation: Operation) {
        self.redo_stack.push(operation);
    }

    pub fn pop_undo(&mut self) -> Option<Operation> {
        self.undo_stack.pop_back()
    }

    pub fn pop_redo(&mut self) -> Option<Operation> {
        self.redo_stack.pop()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
