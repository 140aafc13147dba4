// (c) Copyright 2025 Helsing GmbH. All rights reserved.
use crate::{
    Atom, AtomFactory, AtomId, AtomReducer, InsertError, SiteId, Timestamp, Weave, WeaveOptions,
    WeaveReference,
};
use std::fmt;
use tracing::warn;

/// A single replica of a causal tree.
///
/// Composes a [`Weave`] with the [`AtomFactory`] of the local site and an [`AtomReducer`] that
/// derives the application value. Local operations go through [`CausalTree::create`], atoms
/// received from other replicas through [`CausalTree::insert`].
///
/// ```rust
/// use causal_tree::{AtomId, CausalTree, Weave};
///
/// fn count(weave: &Weave<&'static str>) -> usize {
///     weave.len()
/// }
///
/// let mut alice = CausalTree::new(1, count);
/// let mut bob = CausalTree::new(2, count);
///
/// let root = alice.root("root").unwrap();
/// bob.insert(root.atom().clone()).unwrap();
///
/// let from_alice = alice.create("hello", &root).unwrap();
/// let from_bob = bob.create("world", &root).unwrap();
/// alice.insert(from_bob.atom().clone()).unwrap();
/// bob.insert(from_alice.atom().clone()).unwrap();
///
/// assert_eq!(alice.weave(), bob.weave());
/// assert_eq!(alice.value(), 3);
/// ```
pub struct CausalTree<T, R> {
    factory: AtomFactory,
    weave: Weave<T>,
    reducer: R,
}

impl<T, R> CausalTree<T, R> {
    pub fn new(site: SiteId, reducer: R) -> Self {
        Self::with_options(site, reducer, WeaveOptions::default())
    }

    pub fn with_options(site: SiteId, reducer: R, options: WeaveOptions) -> Self {
        Self {
            factory: AtomFactory::new(site),
            weave: Weave::with_options(options),
            reducer,
        }
    }

    pub fn site(&self) -> SiteId {
        self.factory.site()
    }

    /// The local Lamport clock.
    pub fn time(&self) -> Timestamp {
        self.factory.time()
    }

    pub fn factory(&self) -> &AtomFactory {
        &self.factory
    }

    pub fn weave(&self) -> &Weave<T> {
        &self.weave
    }

    pub fn reducer(&self) -> &R {
        &self.reducer
    }

    pub fn options(&self) -> WeaveOptions {
        self.weave.options()
    }

    /// Evaluates the reducer against the current weave.
    ///
    /// The value is recomputed on every call.
    pub fn value(&self) -> R::Output
    where
        R: AtomReducer<T>,
    {
        self.reducer.eval(&self.weave)
    }
}

impl<T: PartialEq, R> CausalTree<T, R> {
    /// Creates a local root atom and places it.
    pub fn root(&mut self, value: T) -> Result<WeaveReference<T>, InsertError> {
        self.create_with(value, None, 0)
    }

    /// Creates a local atom caused by `cause` and places it.
    pub fn create(
        &mut self,
        value: T,
        cause: impl Into<AtomId>,
    ) -> Result<WeaveReference<T>, InsertError> {
        self.create_with(value, Some(cause.into()), 0)
    }

    /// Creates a local atom with an explicit cause and priority and places it.
    ///
    /// If the atom is rejected, the clock tick is undone. Once the clock is exhausted no atom is
    /// created at all.
    pub fn create_with(
        &mut self,
        value: T,
        cause: Option<AtomId>,
        priority: u32,
    ) -> Result<WeaveReference<T>, InsertError> {
        let time = self.factory.time();
        let atom = self
            .factory
            .create_with(value, cause, priority)
            .inspect_err(|err| warn!(%err, "cannot create atom"))?;
        self.weave
            .insert(atom)
            .inspect_err(|_| self.factory.restore(time))
    }

    /// Places an atom received from another replica.
    ///
    /// The clock observes the atom's timestamp before placement, so every atom created locally
    /// afterwards is newer than it. Atoms of the local site are observed the same way. If the
    /// atom is rejected, the clock is left as it was.
    ///
    /// An atom whose timestamp the clock cannot move past is rejected with
    /// [`InsertError::ClockOverflow`] before it reaches the weave.
    #[doc(alias = "add")]
    pub fn insert(&mut self, atom: Atom<T>) -> Result<WeaveReference<T>, InsertError> {
        let time = self.factory.time();
        self.factory
            .update_time(atom.id.timestamp)
            .inspect_err(|err| warn!(atom = %atom.id, %err, "rejected atom"))?;
        self.weave
            .insert(atom)
            .inspect_err(|_| self.factory.restore(time))
    }

    /// Places received atoms one by one, stopping at the first rejected atom.
    pub fn insert_many<I>(&mut self, atoms: I) -> Result<Vec<WeaveReference<T>>, InsertError>
    where
        I: IntoIterator<Item = Atom<T>>,
    {
        atoms.into_iter().map(|atom| self.insert(atom)).collect()
    }
}

impl<T: fmt::Debug, R> fmt::Debug for CausalTree<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CausalTree")
            .field("factory", &self.factory)
            .field("weave", &self.weave)
            .finish_non_exhaustive()
    }
}
