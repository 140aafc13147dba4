// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! # A Causal Tree CRDT
//!
//! This crate provides a Rust implementation of a **causal tree**, an operation-based
//! Conflict-Free Replicated Datatype (CRDT). Independent sites append operations ("atoms"), each
//! of which names the atom it was caused by. Every replica that has received the same set of atoms
//! arranges them in the same total order, no matter in which order they arrived.
//!
//! ## Core Concepts
//!
//! - [`AtomId`]: names an atom by `(site, timestamp, priority)`. The timestamp is the creating
//!   site's Lamport clock, so ids are unique as long as every site keeps its clock monotonic.
//! - [`Atom`]: an immutable operation together with the id of its cause. An atom without a cause
//!   is the root of the tree.
//! - [`AtomFactory`]: the Lamport clock of one site, which stamps new atoms.
//! - [`Weave`]: the ordering engine. It keeps all atoms in the depth-first preorder of the
//!   causal tree, with the children of every atom ordered by [`weave::weave_cmp`]. It also keeps
//!   a _yarn_ in which every site's atoms are stored contiguously in creation order.
//! - [`CausalTree`]: a single replica, composing a weave, the local site's factory and an
//!   [`AtomReducer`] that folds the weave into an application value.
//!
//! ## Ordering
//!
//! Siblings (atoms with the same cause) are ordered as follows:
//!
//! 1. a higher priority sorts earlier;
//! 2. otherwise, a larger timestamp sorts earlier, so newer operations come first;
//! 3. otherwise, a smaller site sorts earlier.
//!
//! The rule depends on nothing but the atoms' ids, which is what makes every replica converge.
//!
//! ```rust
//! use causal_tree::{Atom, AtomId, Weave};
//!
//! let root = AtomId::new(1, 1);
//! let mut weave = Weave::new();
//! weave.insert(Atom::new(root, None, "root")).unwrap();
//! weave.insert(Atom::new((1, 2), Some(root), "older")).unwrap();
//! weave.insert(Atom::new((2, 3), Some(root), "newer")).unwrap();
//!
//! let order: Vec<_> = weave.iter().map(|r| r.atom().value).collect();
//! assert_eq!(order, ["root", "newer", "older"]);
//! ```
//!
//! ## Scope of this Crate
//!
//! **It does not include any networking or storage.**
//!
//! The weave relies on causal delivery: an atom may only be inserted once its cause has been.
//! Atoms that violate this are rejected with [`InsertError::UnknownCause`] and are not buffered;
//! it is up to the transport to stage them until their cause arrives.
//!
//! Instances are not internally synchronized. Share a [`CausalTree`] between threads behind a
//! single lock; reads may run concurrently with each other but not with an insert.
//!
//! ## Features
//!
//! - `json`: Enables conversion of atoms to and from `serde_json::Value`. This feature is enabled
//!   by default.
//! - `serde`: Provides `serde` support for atoms and [`WeaveOptions`].
//! - `arbitrary`: Implements `quickcheck::Arbitrary` for [`AtomId`], useful for property-based
//!   testing.
#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;

pub mod atom;
pub use atom::{Atom, AtomId, SiteId, Timestamp};
mod error;
pub use error::InsertError;
mod factory;
pub use factory::{AtomFactory, ClockOverflow};
mod options;
pub use options::{DuplicatePolicy, RootPolicy, WeaveOptions};
pub mod reducer;
pub use reducer::AtomReducer;
mod tree;
pub use tree::CausalTree;
pub mod weave;
pub use weave::{SiteWindow, Weave, WeaveReference};
#[cfg(feature = "json")]
mod json;
#[cfg(test)]
mod test_util;
