//! Integration tests for replicating causal trees between sites.

use causal_tree::{
    Atom, AtomId, CausalTree, DuplicatePolicy, InsertError, Weave, WeaveOptions,
    reducer::ValuesInOrder,
};

#[derive(Debug, Clone, PartialEq)]
enum Edit {
    Document,
    Insert(char),
    Delete,
}

/// Renders the text: every `Insert` is a character, a `Delete` removes the character it was
/// caused by.
fn text(weave: &Weave<Edit>) -> String {
    let deleted: Vec<AtomId> = weave
        .iter()
        .filter(|r| r.atom().value == Edit::Delete)
        .filter_map(|r| r.atom().cause)
        .collect();
    weave
        .iter()
        .filter(|r| !deleted.contains(&r.id()))
        .filter_map(|r| match r.atom().value {
            Edit::Insert(c) => Some(c),
            _ => None,
        })
        .collect()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn concurrent_typing_converges() {
    init_tracing();

    let mut alice = CausalTree::new(1, text);
    let mut bob = CausalTree::new(2, text);

    let document = alice.root(Edit::Document).unwrap();
    bob.insert(document.atom().clone()).unwrap();

    // each character is caused by the one before it
    let mut alice_log = vec![];
    let mut cursor = document.id();
    for c in "hi".chars() {
        let placed = alice.create(Edit::Insert(c), cursor).unwrap();
        cursor = placed.id();
        alice_log.push(placed.atom().clone());
    }

    let mut bob_log = vec![];
    let mut cursor = document.id();
    for c in "yo".chars() {
        let placed = bob.create(Edit::Insert(c), cursor).unwrap();
        cursor = placed.id();
        bob_log.push(placed.atom().clone());
    }

    assert_eq!(alice.value(), "hi");
    assert_eq!(bob.value(), "yo");

    alice.insert_many(bob_log).unwrap();
    bob.insert_many(alice_log).unwrap();

    assert_eq!(alice.weave(), bob.weave());
    assert_eq!(alice.value(), bob.value());
    // both runs are intact, concurrent siblings are not interleaved
    let merged = alice.value();
    assert!(merged == "hiyo" || merged == "yohi", "{merged}");
}

#[test]
fn deletes_and_late_replies() {
    init_tracing();

    let mut alice = CausalTree::new(1, text);
    let mut bob = CausalTree::new(2, text);
    let mut carol = CausalTree::new(3, text);

    let document = alice.root(Edit::Document).unwrap();
    let a = alice.create(Edit::Insert('a'), &document).unwrap();
    let b = alice.create(Edit::Insert('b'), &a).unwrap();
    for tree in [&mut bob, &mut carol] {
        tree.insert_many([document.atom().clone(), a.atom().clone(), b.atom().clone()])
            .unwrap();
    }

    let delete = bob.create(Edit::Delete, &a).unwrap();
    let c = carol.create(Edit::Insert('c'), &b).unwrap();

    alice.insert(delete.atom().clone()).unwrap();
    alice.insert(c.atom().clone()).unwrap();
    carol.insert(delete.atom().clone()).unwrap();
    bob.insert(c.atom().clone()).unwrap();

    assert_eq!(alice.weave(), bob.weave());
    assert_eq!(alice.weave(), carol.weave());
    assert_eq!(alice.value(), "bc");
}

#[test]
fn redelivery_is_harmless_by_default() {
    let mut alice = CausalTree::new(1, ValuesInOrder);
    let mut bob = CausalTree::new(2, ValuesInOrder);

    let root = alice.root("root").unwrap();
    let child = alice.create("child", &root).unwrap();

    let log = [root.atom().clone(), child.atom().clone()];
    bob.insert_many(log.clone()).unwrap();
    bob.insert_many(log.clone()).unwrap();
    assert_eq!(bob.weave().len(), 2);
    assert_eq!(alice.weave(), bob.weave());

    let strict = WeaveOptions::default().with_duplicates(DuplicatePolicy::Reject);
    let mut carol = CausalTree::with_options(3, ValuesInOrder, strict);
    carol.insert_many(log.clone()).unwrap();
    assert_eq!(
        carol.insert(log[1].clone()).unwrap_err(),
        InsertError::DuplicateAtom(child.id())
    );
}

#[test]
fn out_of_causal_order_is_reported() {
    let mut tree = CausalTree::new(1, ValuesInOrder);
    let err = tree
        .insert(Atom::new((2, 3), Some(AtomId::new(2, 2)), "op"))
        .unwrap_err();
    assert_eq!(err.atom(), Some(AtomId::new(2, 3)));
    assert_eq!(err.to_string(), "atom (2,3) names unknown cause (2,2)");
    assert!(tree.weave().is_empty());
}
