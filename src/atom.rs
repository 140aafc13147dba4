// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! # Atoms
//!
//! An [`Atom`] is a single immutable operation together with a reference to its causal parent
//! (its _cause_). Every atom is named by an [`AtomId`], which is unique across all replicas as
//! long as each site runs a monotonic [`AtomFactory`](crate::AtomFactory).
//!
//! Atoms form a tree via the cause relation. An atom with no cause is a _root_.
use crate::weave::WeaveReference;
use std::fmt;

/// Identifies a replica (participant) that produces atoms.
pub type SiteId = u32;

/// A Lamport logical clock value.
pub type Timestamp = u64;

/// The globally unique name of an [`Atom`].
///
/// Equality is exact equality of all three fields.
///
/// This type intentionally does not implement [`Ord`]: the order of atoms is a property of their
/// placement within a [`Weave`](crate::Weave), see [`weave_cmp`](crate::weave::weave_cmp).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(::serde::Deserialize, ::serde::Serialize))]
pub struct AtomId {
    /// The site that created the atom.
    pub site: SiteId,
    /// The creating site's Lamport clock at the time of creation.
    pub timestamp: Timestamp,
    /// Tie-break used to force an atom to sort ahead of its siblings. Higher sorts earlier.
    #[cfg_attr(feature = "serde", serde(default))]
    pub priority: u32,
}

impl AtomId {
    /// Constructs an id with the default priority of 0.
    pub const fn new(site: SiteId, timestamp: Timestamp) -> Self {
        Self::with_priority(site, timestamp, 0)
    }

    /// Constructs an id with an explicit priority.
    pub const fn with_priority(site: SiteId, timestamp: Timestamp, priority: u32) -> Self {
        Self {
            site,
            timestamp,
            priority,
        }
    }

    /// The key by which atoms of a single site are laid out in its yarn.
    ///
    /// A correct site never reuses a timestamp, so the priority only matters for malformed input.
    pub(crate) fn yarn_key(&self) -> (Timestamp, u32) {
        (self.timestamp, self.priority)
    }
}

/// Renders as `(site,timestamp)`, or `(site,timestamp,pN)` for a non-zero priority.
impl fmt::Debug for AtomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.priority {
            0 => write!(f, "({},{})", self.site, self.timestamp),
            p => write!(f, "({},{},p{p})", self.site, self.timestamp),
        }
    }
}

impl fmt::Display for AtomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl From<(SiteId, Timestamp)> for AtomId {
    fn from((site, timestamp): (SiteId, Timestamp)) -> Self {
        AtomId::new(site, timestamp)
    }
}

impl From<(SiteId, Timestamp, u32)> for AtomId {
    fn from((site, timestamp, priority): (SiteId, Timestamp, u32)) -> Self {
        AtomId::with_priority(site, timestamp, priority)
    }
}

impl PartialEq<(SiteId, Timestamp)> for AtomId {
    fn eq(&self, &(site, timestamp): &(SiteId, Timestamp)) -> bool {
        self == &AtomId::new(site, timestamp)
    }
}

/// A single operation in a causal tree.
///
/// The `value` is opaque to this crate. Use an enum so that an
/// [`AtomReducer`](crate::AtomReducer) can pattern-match on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(::serde::Deserialize, ::serde::Serialize))]
pub struct Atom<T> {
    pub id: AtomId,
    /// The atom this one was caused by, or `None` for a root.
    pub cause: Option<AtomId>,
    pub value: T,
}

impl<T> Atom<T> {
    pub fn new(id: impl Into<AtomId>, cause: Option<AtomId>, value: T) -> Self {
        Self {
            id: id.into(),
            cause,
            value,
        }
    }

    /// Returns true if this atom has no cause.
    pub fn is_root(&self) -> bool {
        self.cause.is_none()
    }
}

impl<T> From<&Atom<T>> for AtomId {
    fn from(atom: &Atom<T>) -> Self {
        atom.id
    }
}

impl<T> From<&WeaveReference<T>> for AtomId {
    fn from(reference: &WeaveReference<T>) -> Self {
        reference.atom().id
    }
}

#[cfg(any(test, feature = "arbitrary"))]
impl quickcheck::Arbitrary for AtomId {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        use quickcheck::Arbitrary;

        // Skew towards a handful of sites and small clocks, where collisions between siblings
        // (and thus the interesting tie-breaks) actually happen.
        let site_choices = [1, 1, 1, 2, 2, 3, u32::arbitrary(g)];
        let ts_choices = [1, 2, 2, 3, 4, 5, u64::arbitrary(g).saturating_add(1)];
        let priority_choices = [0, 0, 0, 0, 1];
        AtomId::with_priority(
            *g.choose(&site_choices).unwrap(),
            *g.choose(&ts_choices).unwrap(),
            *g.choose(&priority_choices).unwrap(),
        )
    }
}
