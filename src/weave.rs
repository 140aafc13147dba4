// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! # Weave
//!
//! The [`Weave`] places atoms into a single deterministic sequence: the depth-first preorder of
//! the causal tree, where the children of every atom are ordered by [`weave_cmp`]. Because that
//! order only depends on the atoms' own ids, any two weaves that have received the same set of
//! atoms hold identical sequences, regardless of the order in which the atoms arrived.
//!
//! Next to the global sequence, the weave keeps a _yarn_: a single array in which every site's
//! atoms are stored contiguously and in creation order. A site's segment of the yarn is exposed
//! as a [`SiteWindow`] through [`Weave::get_site`], which gives O(1) access to the site's `n`-th
//! atom.
//!
//! The weave assumes causal delivery: an atom's cause must be inserted before the atom itself.
//! Atoms that violate this are rejected with [`InsertError::UnknownCause`] rather than buffered.
use crate::{Atom, AtomId, DuplicatePolicy, InsertError, RootPolicy, SiteId, WeaveOptions};
use ahash::RandomState;
use smallvec::{SmallVec, smallvec};
use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashSet},
    fmt,
    ops::Range,
    slice,
    sync::Arc,
};
use tracing::{debug, trace, warn};

mod window;
pub use window::SiteWindow;

/// Orders two atom ids the way siblings are ordered within a weave.
///
/// [`Ordering::Less`] means that `a` sorts earlier than `b`:
///
/// - a higher `priority` sorts earlier;
/// - with equal priorities, a larger `timestamp` sorts earlier;
/// - with equal priorities and timestamps, a smaller `site` sorts earlier.
///
/// This is a total order over distinct ids and depends on nothing but the ids themselves.
pub fn weave_cmp(a: &AtomId, b: &AtomId) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then_with(|| b.timestamp.cmp(&a.timestamp))
        .then_with(|| a.site.cmp(&b.site))
}

/// An atom as placed in a [`Weave`].
///
/// Besides the atom, a reference records where the atom sits within its site's yarn segment and
/// where its cause sits within the cause's site segment. The weave keeps both indices current if
/// a site's atoms arrive out of creation order.
pub struct WeaveReference<T> {
    atom: Arc<Atom<T>>,
    local_index: usize,
    cause_local_index: Option<usize>,
}

impl<T> WeaveReference<T> {
    pub fn atom(&self) -> &Atom<T> {
        &self.atom
    }

    pub fn id(&self) -> AtomId {
        self.atom.id
    }

    /// Position of the atom within its own site's yarn segment.
    pub fn local_index(&self) -> usize {
        self.local_index
    }

    /// Position of the cause within the cause's site's yarn segment, `None` for roots.
    pub fn cause_local_index(&self) -> Option<usize> {
        self.cause_local_index
    }
}

impl<T> Clone for WeaveReference<T> {
    fn clone(&self) -> Self {
        Self {
            atom: Arc::clone(&self.atom),
            local_index: self.local_index,
            cause_local_index: self.cause_local_index,
        }
    }
}

impl<T: PartialEq> PartialEq for WeaveReference<T> {
    fn eq(&self, other: &Self) -> bool {
        self.local_index == other.local_index
            && self.cause_local_index == other.cause_local_index
            && self.atom == other.atom
    }
}

impl<T: Eq> Eq for WeaveReference<T> {}

impl<T: fmt::Debug> fmt::Debug for WeaveReference<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeaveReference")
            .field("atom", &self.atom)
            .field("local_index", &self.local_index)
            .field("cause_local_index", &self.cause_local_index)
            .finish()
    }
}

/// The ordering engine of a causal tree.
///
/// Mutations touch the global sequence, the yarn and the site offsets in several steps, so a
/// weave shared between threads must be guarded by a single lock. Readers may share it freely.
pub struct Weave<T> {
    /// The global depth-first sequence.
    atoms: Vec<WeaveReference<T>>,
    /// All sites' atoms, each site stored contiguously, sites in ascending order.
    yarn: Vec<WeaveReference<T>>,
    /// Offsets of every site's segment within `yarn`.
    sites: BTreeMap<SiteId, Range<usize>>,
    known: HashSet<AtomId, RandomState>,
    options: WeaveOptions,
}

impl<T> Default for Weave<T> {
    fn default() -> Self {
        Self::with_options(WeaveOptions::default())
    }
}

impl<T> Clone for Weave<T> {
    fn clone(&self) -> Self {
        Self {
            atoms: self.atoms.clone(),
            yarn: self.yarn.clone(),
            sites: self.sites.clone(),
            known: self.known.clone(),
            options: self.options,
        }
    }
}

impl<T: PartialEq> PartialEq for Weave<T> {
    fn eq(&self, other: &Self) -> bool {
        // the yarn and offsets are a function of the atom set, which `atoms` fully captures
        self.atoms == other.atoms
    }
}

impl<T: fmt::Debug> fmt::Debug for Weave<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.atoms.iter().map(WeaveReference::atom))
            .finish()
    }
}

impl<T> Weave<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: WeaveOptions) -> Self {
        Self {
            atoms: Vec::new(),
            yarn: Vec::new(),
            sites: BTreeMap::new(),
            known: HashSet::default(),
            options,
        }
    }

    pub fn options(&self) -> WeaveOptions {
        self.options
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// The global sequence, in weave order.
    pub fn atoms(&self) -> &[WeaveReference<T>] {
        &self.atoms
    }

    pub fn iter(&self) -> slice::Iter<'_, WeaveReference<T>> {
        self.atoms.iter()
    }

    /// The ids of all atoms, in weave order.
    pub fn ids(&self) -> impl Iterator<Item = AtomId> + '_ {
        self.atoms.iter().map(WeaveReference::id)
    }

    /// The head of the weave.
    pub fn root(&self) -> Option<&WeaveReference<T>> {
        self.atoms.first()
    }

    pub fn contains(&self, id: &AtomId) -> bool {
        self.known.contains(id)
    }

    pub fn get(&self, id: &AtomId) -> Option<&WeaveReference<T>> {
        let window = self.get_site(id.site);
        window.search(id).ok().and_then(|local| window.get(local))
    }

    /// Returns the yarn segment of `site`, or an empty window if the site is unknown.
    pub fn get_site(&self, site: SiteId) -> SiteWindow<'_, T> {
        match self.sites.get(&site) {
            Some(range) => SiteWindow::new(&self.yarn, range.clone()),
            None => SiteWindow::empty(&self.yarn),
        }
    }

    /// All sites that have contributed atoms, in ascending order.
    pub fn sites(&self) -> impl Iterator<Item = SiteId> + '_ {
        self.sites.keys().copied()
    }

    /// The whole yarn, sites in ascending order and each site in creation order.
    pub fn yarn(&self) -> &[WeaveReference<T>] {
        &self.yarn
    }

    fn root_index(&self, id: AtomId) -> Result<usize, InsertError> {
        match (self.root(), self.options.roots) {
            (None, _) => Ok(0),
            (Some(existing), RootPolicy::Single) => Err(InsertError::MultipleRoots {
                existing: existing.id(),
                rejected: id,
            }),
            (Some(existing), RootPolicy::Replace) => {
                debug!(root = %id, previous = %existing.id(), "replacing head of weave");
                Ok(0)
            }
        }
    }

    /// Finds where a new child `id` of `cause` goes in the global sequence.
    ///
    /// Starting right after the cause, this walks the cause's subtree in preorder. Every sibling
    /// that sorts before `id` is skipped together with its own subtree. The walk stops at the
    /// first sibling that `id` sorts before, or at the end of the cause's subtree.
    fn child_index(&self, id: AtomId, cause: AtomId) -> Result<usize, InsertError> {
        let unknown = InsertError::UnknownCause { atom: id, cause };
        if !self.known.contains(&cause) {
            return Err(unknown);
        }
        let cause_index = self
            .atoms
            .iter()
            .position(|reference| reference.id() == cause)
            .ok_or(unknown)?;

        // path from the cause down to the atom most recently walked past
        let mut path: SmallVec<[AtomId; 16]> = smallvec![cause];
        let mut index = cause_index + 1;
        while let Some(next) = self.atoms.get(index) {
            let Some(parent) = next.atom.cause else {
                break;
            };
            while path.last().is_some_and(|top| *top != parent) {
                path.pop();
            }
            match path.len() {
                // left the cause's subtree
                0 => break,
                // `next` is a sibling
                1 if weave_cmp(&id, &next.id()).is_lt() => break,
                _ => {}
            }
            path.push(next.id());
            index += 1;
        }
        Ok(index)
    }

    /// Accounts for a new atom about to be placed at `from` within `site`'s segment.
    fn shift_local_indices(&mut self, site: SiteId, from: usize) {
        for reference in self.atoms.iter_mut().chain(self.yarn.iter_mut()) {
            if reference.atom.id.site == site && reference.local_index >= from {
                reference.local_index += 1;
            }
            if reference.atom.cause.is_some_and(|cause| cause.site == site) {
                if let Some(index) = reference.cause_local_index.as_mut() {
                    if *index >= from {
                        *index += 1;
                    }
                }
            }
        }
    }

    fn splice_yarn(&mut self, site: SiteId, local_index: usize, reference: WeaveReference<T>) {
        let start = match self.sites.get(&site) {
            Some(range) => range.start,
            None => {
                let start = self
                    .sites
                    .range(site..)
                    .next()
                    .map_or(self.yarn.len(), |(_, range)| range.start);
                self.sites.insert(site, start..start);
                start
            }
        };
        self.yarn.insert(start + local_index, reference);
        for (&other, range) in self.sites.range_mut(site..) {
            if other != site {
                range.start += 1;
            }
            range.end += 1;
        }
    }
}

impl<T: PartialEq> Weave<T> {
    /// Places `atom` into the weave and returns its placement.
    ///
    /// The atom's cause must already be present. Re-inserting an atom that is already present is
    /// governed by [`WeaveOptions::duplicates`], and a second root by [`WeaveOptions::roots`].
    /// A rejected insert leaves the weave unchanged.
    pub fn insert(&mut self, atom: Atom<T>) -> Result<WeaveReference<T>, InsertError> {
        self.try_insert(atom)
            .inspect_err(|err| warn!(%err, "rejected atom"))
    }

    /// Inserts atoms one by one, in the given order.
    ///
    /// Stops at the first atom that cannot be inserted. Atoms inserted up to that point remain.
    pub fn insert_many<I>(&mut self, atoms: I) -> Result<Vec<WeaveReference<T>>, InsertError>
    where
        I: IntoIterator<Item = Atom<T>>,
    {
        atoms.into_iter().map(|atom| self.insert(atom)).collect()
    }

    fn try_insert(&mut self, atom: Atom<T>) -> Result<WeaveReference<T>, InsertError> {
        let id = atom.id;
        if self.known.contains(&id) {
            return self.reinsert(atom);
        }

        let weave_index = match atom.cause {
            None => self.root_index(id)?,
            Some(cause) => self.child_index(id, cause)?,
        };

        let site = self.get_site(id.site);
        let local_index = match site.search(&id) {
            Ok(index) | Err(index) => index,
        };
        let shifts = local_index < site.len();
        let mut cause_local_index = atom
            .cause
            .and_then(|cause| self.get_site(cause.site).search(&cause).ok());
        if shifts {
            // a site's atoms arrived out of creation order
            self.shift_local_indices(id.site, local_index);
            if let Some(index) = cause_local_index.as_mut() {
                if atom.cause.is_some_and(|cause| cause.site == id.site) && *index >= local_index {
                    *index += 1;
                }
            }
        }

        let reference = WeaveReference {
            atom: Arc::new(atom),
            local_index,
            cause_local_index,
        };
        self.atoms.insert(weave_index, reference.clone());
        self.splice_yarn(id.site, local_index, reference.clone());
        self.known.insert(id);
        trace!(atom = %id, weave_index, local_index, "placed atom");
        Ok(reference)
    }

    fn reinsert(&self, atom: Atom<T>) -> Result<WeaveReference<T>, InsertError> {
        let existing = self
            .get(&atom.id)
            .ok_or(InsertError::ConflictingAtom(atom.id))?;
        if *existing.atom != atom {
            return Err(InsertError::ConflictingAtom(atom.id));
        }
        match self.options.duplicates {
            DuplicatePolicy::Ignore => {
                debug!(atom = %atom.id, "ignoring duplicate atom");
                Ok(existing.clone())
            }
            DuplicatePolicy::Reject => Err(InsertError::DuplicateAtom(atom.id)),
        }
    }
}

impl<'w, T> IntoIterator for &'w Weave<T> {
    type Item = &'w WeaveReference<T>;
    type IntoIter = slice::Iter<'w, WeaveReference<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
