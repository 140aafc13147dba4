// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Configuration of how a [`Weave`](crate::Weave) treats the inputs that the placement algorithm
//! itself has no answer for.

/// What to do when a second, distinct root atom is inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(::serde::Deserialize, ::serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RootPolicy {
    /// Reject the second root with [`InsertError::MultipleRoots`](crate::InsertError).
    #[default]
    Single,
    /// Splice the new root in at the head of the weave.
    ///
    /// The most recently inserted root becomes the global head. The resulting order depends on
    /// arrival order, so replicas only converge if they receive roots in the same order.
    Replace,
}

/// What to do when an atom whose id is already present is inserted again.
///
/// An atom that reuses a present id with a different cause or value is always rejected with
/// [`InsertError::ConflictingAtom`](crate::InsertError), regardless of this policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(::serde::Deserialize, ::serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DuplicatePolicy {
    /// Treat the insert as a no-op and hand back the existing placement.
    #[default]
    Ignore,
    /// Reject with [`InsertError::DuplicateAtom`](crate::InsertError).
    Reject,
}

/// Options for a [`Weave`](crate::Weave) and the [`CausalTree`](crate::CausalTree) wrapping it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(::serde::Deserialize, ::serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WeaveOptions {
    pub roots: RootPolicy,
    pub duplicates: DuplicatePolicy,
}

impl WeaveOptions {
    pub fn with_roots(mut self, roots: RootPolicy) -> Self {
        self.roots = roots;
        self
    }

    pub fn with_duplicates(mut self, duplicates: DuplicatePolicy) -> Self {
        self.duplicates = duplicates;
        self
    }
}
