// (c) Copyright 2025 Helsing GmbH. All rights reserved.
use super::WeaveReference;
use crate::AtomId;
use std::{ops::Range, slice};

/// A read-only view of one site's segment of the yarn.
///
/// The window is a `(backing, start, end)` triple over the yarn of the [`Weave`](super::Weave)
/// it was taken from. Entries are in ascending creation order, so `window.get(n)` is the site's
/// `n`-th atom.
pub struct SiteWindow<'w, T> {
    backing: &'w [WeaveReference<T>],
    start: usize,
    end: usize,
}

impl<T> Clone for SiteWindow<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SiteWindow<'_, T> {}

impl<'w, T> SiteWindow<'w, T> {
    pub(super) fn new(backing: &'w [WeaveReference<T>], range: Range<usize>) -> Self {
        debug_assert!(range.start <= range.end && range.end <= backing.len());
        Self {
            backing,
            start: range.start,
            end: range.end,
        }
    }

    pub(super) fn empty(backing: &'w [WeaveReference<T>]) -> Self {
        Self::new(backing, 0..0)
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The offsets of this window within the backing yarn.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Returns the site's atom with the given local index.
    pub fn get(&self, local_index: usize) -> Option<&'w WeaveReference<T>> {
        self.as_slice().get(local_index)
    }

    pub fn first(&self) -> Option<&'w WeaveReference<T>> {
        self.as_slice().first()
    }

    pub fn last(&self) -> Option<&'w WeaveReference<T>> {
        self.as_slice().last()
    }

    pub fn iter(&self) -> slice::Iter<'w, WeaveReference<T>> {
        self.as_slice().iter()
    }

    pub fn as_slice(&self) -> &'w [WeaveReference<T>] {
        &self.backing[self.start..self.end]
    }

    /// Binary-searches the window for `id`.
    ///
    /// `Ok` holds the local index of `id`, `Err` the local index at which it would be placed.
    /// `id` is expected to belong to this window's site.
    pub(super) fn search(&self, id: &AtomId) -> Result<usize, usize> {
        let key = id.yarn_key();
        self.as_slice()
            .binary_search_by(|reference| reference.id().yarn_key().cmp(&key))
    }
}

impl<'w, T> IntoIterator for SiteWindow<'w, T> {
    type Item = &'w WeaveReference<T>;
    type IntoIter = slice::Iter<'w, WeaveReference<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> std::fmt::Debug for SiteWindow<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.iter().map(WeaveReference::id))
            .finish()
    }
}
