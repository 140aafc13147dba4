// (c) Copyright 2025 Helsing GmbH. All rights reserved.
use crate::{Atom, AtomFactory, AtomId, weave::weave_cmp};
use quickcheck::{Arbitrary, Gen};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::collections::{HashMap, HashSet};

/// A valid causal tree as produced by a few sites, in creation order.
#[derive(Debug, Clone)]
pub(crate) struct CausalHistory {
    pub atoms: Vec<Atom<usize>>,
}

impl Arbitrary for CausalHistory {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut factories: Vec<_> = (1..=3).map(AtomFactory::new).collect();
        let mut atoms = vec![factories[0].root(0).unwrap()];
        let len = usize::arbitrary(g) % (g.size() + 1);
        for n in 0..len {
            let site = usize::arbitrary(g) % factories.len();
            let cause = atoms[usize::arbitrary(g) % atoms.len()].id;
            let priority = *g.choose(&[0, 0, 0, 0, 1]).unwrap();
            let factory = &mut factories[site];
            // the site has seen the cause, so the Lamport clock moves past it
            factory.update_time(cause.timestamp).unwrap();
            atoms.push(factory.create_with(n + 1, Some(cause), priority).unwrap());
        }
        Self { atoms }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        // dropping trailing atoms keeps the history causally closed
        let atoms = self.atoms.clone();
        Box::new((1..atoms.len()).rev().map(move |len| Self {
            atoms: atoms[..len].to_vec(),
        }))
    }
}

impl CausalHistory {
    /// Returns the atoms in a random order in which every cause still precedes its effects.
    pub fn causal_shuffle(&self, seed: u64) -> Vec<Atom<usize>> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut pending = self.atoms.clone();
        let mut delivered: HashSet<AtomId> = HashSet::new();
        let mut order = Vec::with_capacity(pending.len());
        while !pending.is_empty() {
            let ready: Vec<_> = pending
                .iter()
                .enumerate()
                .filter(|(_, atom)| atom.cause.is_none_or(|cause| delivered.contains(&cause)))
                .map(|(i, _)| i)
                .collect();
            let atom = pending.swap_remove(ready[rng.random_range(0..ready.len())]);
            delivered.insert(atom.id);
            order.push(atom);
        }
        order
    }
}

/// The expected weave order: a depth-first walk with children sorted by [`weave_cmp`].
pub(crate) fn preorder<T>(atoms: &[Atom<T>]) -> Vec<AtomId> {
    let mut children: HashMap<Option<AtomId>, Vec<AtomId>> = HashMap::new();
    for atom in atoms {
        children.entry(atom.cause).or_default().push(atom.id);
    }
    for siblings in children.values_mut() {
        siblings.sort_by(weave_cmp);
    }

    let mut order = Vec::with_capacity(atoms.len());
    let mut stack: Vec<AtomId> = children.get(&None).into_iter().flatten().rev().copied().collect();
    while let Some(id) = stack.pop() {
        order.push(id);
        if let Some(siblings) = children.get(&Some(id)) {
            stack.extend(siblings.iter().rev());
        }
    }
    order
}
