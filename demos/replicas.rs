// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! The example simulates two replicas of a shared counter that make concurrent changes, then
//! exchange their atoms over JSON and arrive at the same value.

use causal_tree::{Atom, CausalTree, Weave};
use serde::{Deserialize, Serialize};
use std::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
enum Counter {
    Create,
    Increment,
    Decrement,
}

// The reducer: a pure fold over the weave.
fn total(weave: &Weave<Counter>) -> i64 {
    weave
        .iter()
        .map(|reference| match reference.atom().value {
            Counter::Create => 0,
            Counter::Increment => 1,
            Counter::Decrement => -1,
        })
        .sum()
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut alice = CausalTree::new(1, total);
    let mut bob = CausalTree::new(2, total);

    // Alice creates the counter and Bob receives it, as any transport would deliver it.
    let counter = alice.root(Counter::Create)?;
    bob.insert(counter.atom().clone())?;

    // --- Concurrent edits ---
    let mut outbox_alice = vec![];
    for _ in 0..3 {
        outbox_alice.push(alice.create(Counter::Increment, &counter)?.atom().to_json()?);
    }
    let outbox_bob = vec![bob.create(Counter::Decrement, &counter)?.atom().to_json()?];

    println!("before sync: alice = {}, bob = {}", alice.value(), bob.value());

    // --- Sync ---
    for wire in outbox_bob {
        alice.insert(Atom::from_json(wire)?)?;
    }
    for wire in outbox_alice {
        bob.insert(Atom::from_json(wire)?)?;
    }

    assert_eq!(alice.weave(), bob.weave());
    println!("after sync: alice = {}, bob = {}", alice.value(), bob.value());
    println!("weave: {:?}", alice.weave().ids().collect::<Vec<_>>());
    Ok(())
}
