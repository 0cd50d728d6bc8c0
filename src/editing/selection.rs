// Copyright 2025 the Geoedit Authors
// SPDX-License-Identifier: Apache-2.0

//! Ordered set of geometry indices, used for both the selection and the
//! mark-for-deletion set of an edit session.
//!
//! `Selection` wraps an `Arc<BTreeSet<GeometryIndex>>` so it is cheap to
//! clone into notifications. Mutations go through `Arc::make_mut`. The
//! `BTreeSet` keeps indices in lexicographic order, so iterating in
//! reverse yields the highest index first, which is the order batch
//! deletions must run in.

use crate::model::GeometryIndex;
use std::collections::BTreeSet;
use std::sync::Arc;

/// A set of addressed vertices, edges, rings or sub-geometries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    inner: Arc<BTreeSet<GeometryIndex>>,
}

impl Selection {
    /// Create a new empty selection
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BTreeSet::new()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn contains(&self, index: &GeometryIndex) -> bool {
        self.inner.contains(index)
    }

    /// Iterate in ascending index order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &GeometryIndex> {
        self.inner.iter()
    }

    /// Snapshot as a sorted vector (for sinks)
    pub fn to_vec(&self) -> Vec<GeometryIndex> {
        self.inner.iter().cloned().collect()
    }

    /// Add an index, returning whether it was new
    pub fn insert(&mut self, index: GeometryIndex) -> bool {
        if self.inner.contains(&index) {
            return false;
        }
        Arc::make_mut(&mut self.inner).insert(index)
    }

    /// Remove an index, returning whether it was present
    pub fn remove(&mut self, index: &GeometryIndex) -> bool {
        if !self.inner.contains(index) {
            return false;
        }
        Arc::make_mut(&mut self.inner).remove(index)
    }

    pub fn clear(&mut self) {
        if !self.inner.is_empty() {
            self.inner = Arc::new(BTreeSet::new());
        }
    }

    /// Keep only indices for which `keep` returns true, returning whether
    /// anything was dropped
    pub fn retain(&mut self, mut keep: impl FnMut(&GeometryIndex) -> bool) -> bool {
        if self.inner.iter().all(&mut keep) {
            return false;
        }
        Arc::make_mut(&mut self.inner).retain(|index| keep(index));
        true
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<GeometryIndex> for Selection {
    fn from_iter<I: IntoIterator<Item = GeometryIndex>>(iter: I) -> Self {
        Self {
            inner: Arc::new(iter.into_iter().collect()),
        }
    }
}
