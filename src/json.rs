// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! JSON representation of atoms
//!
//! Atoms are exchanged with transports and stores in the following shape. A root atom carries
//! `"cause": null`, and `"priority"` may be omitted on input, in which case it defaults to 0.
//!
//! ```json
//! {
//!   "id": { "site": 2, "timestamp": 3, "priority": 0 },
//!   "cause": { "site": 1, "timestamp": 1, "priority": 0 },
//!   "value": "add"
//! }
//! ```
use crate::Atom;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

impl<T: Serialize> Atom<T> {
    /// Converts this atom to its JSON wire shape.
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

impl<T: DeserializeOwned> Atom<T> {
    /// Reads an atom from its JSON wire shape.
    pub fn from_json(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Atom, AtomId, CausalTree, reducer::ValuesInOrder};
    use serde_json::json;

    #[test]
    fn wire_shape() {
        let atom = Atom::new((2, 3), Some(AtomId::new(1, 1)), "add".to_string());
        assert_eq!(
            atom.to_json().unwrap(),
            json!({
                "id": { "site": 2, "timestamp": 3, "priority": 0 },
                "cause": { "site": 1, "timestamp": 1, "priority": 0 },
                "value": "add",
            })
        );

        let root = Atom::new(AtomId::with_priority(1, 1, 2), None, 7u32);
        assert_eq!(
            root.to_json().unwrap(),
            json!({
                "id": { "site": 1, "timestamp": 1, "priority": 2 },
                "cause": null,
                "value": 7,
            })
        );
    }

    #[test]
    fn priority_defaults_to_zero() {
        let atom: Atom<String> = Atom::from_json(json!({
            "id": { "site": 2, "timestamp": 3 },
            "cause": { "site": 1, "timestamp": 1 },
            "value": "add",
        }))
        .unwrap();
        assert_eq!(atom.id, AtomId::new(2, 3));
        assert_eq!(atom.cause, Some(AtomId::new(1, 1)));
    }

    #[test]
    fn missing_fields_are_errors() {
        assert!(Atom::<String>::from_json(json!({ "id": { "site": 2 }, "cause": null })).is_err());
    }

    #[test]
    fn replicate_over_json() {
        let mut alice = CausalTree::new(1, ValuesInOrder);
        let mut bob = CausalTree::new(2, ValuesInOrder);

        let root = alice.root("root".to_string()).unwrap();
        let child = alice.create("child".to_string(), &root).unwrap();
        for reference in [root, child] {
            let wire = reference.atom().to_json().unwrap();
            bob.insert(Atom::from_json(wire).unwrap()).unwrap();
        }
        assert_eq!(alice.weave(), bob.weave());
        assert_eq!(bob.value(), ["root", "child"]);
    }
}
