// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Folding a weave into application state.
use crate::Weave;

/// Derives an application value from a [`Weave`].
///
/// `eval` must be a pure, deterministic function of the weave's atom sequence (order and
/// content). It must not read anything beyond the weave it is given. Replicas holding identical
/// weaves then compute identical values, which is the whole convergence guarantee of a
/// [`CausalTree`](crate::CausalTree)'s value.
///
/// Closures of the form `Fn(&Weave<T>) -> V` are reducers too.
pub trait AtomReducer<T> {
    type Output;

    fn eval(&self, weave: &Weave<T>) -> Self::Output;
}

impl<T, V, F> AtomReducer<T> for F
where
    F: Fn(&Weave<T>) -> V,
{
    type Output = V;

    fn eval(&self, weave: &Weave<T>) -> V {
        self(weave)
    }
}

/// A reducer that lists every atom's value in weave order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValuesInOrder;

impl<T: Clone> AtomReducer<T> for ValuesInOrder {
    type Output = Vec<T>;

    fn eval(&self, weave: &Weave<T>) -> Vec<T> {
        weave
            .iter()
            .map(|reference| reference.atom().value.clone())
            .collect()
    }
}
