// (c) Copyright 2025 Helsing GmbH. All rights reserved.
use crate::{AtomId, ClockOverflow};
use std::fmt;

/// Error returned when an atom cannot be placed into a [`Weave`](crate::Weave).
///
/// All variants are precondition failures on the caller's side, or (for
/// [`InsertError::ClockOverflow`]) a timestamp no site can legitimately have produced. Retrying
/// the same insert without first fixing the condition cannot succeed, so nothing in this crate
/// retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertError {
    /// The atom names a cause that is not present in the weave.
    ///
    /// This means causal delivery was broken upstream.
    UnknownCause { atom: AtomId, cause: AtomId },

    /// An identical atom is already present and the weave is configured with
    /// [`DuplicatePolicy::Reject`](crate::DuplicatePolicy::Reject).
    DuplicateAtom(AtomId),

    /// An atom with the same id but a different cause or value is already present.
    ConflictingAtom(AtomId),

    /// A second root was inserted into a weave configured with
    /// [`RootPolicy::Single`](crate::RootPolicy::Single).
    MultipleRoots { existing: AtomId, rejected: AtomId },

    /// The local clock cannot advance past the timestamp of an inserted atom, or past its own
    /// current value when creating one.
    ClockOverflow(ClockOverflow),
}

impl InsertError {
    /// The id of the atom whose insertion failed.
    ///
    /// `None` for a [`InsertError::ClockOverflow`] raised while creating a local atom, which never
    /// received an id.
    pub fn atom(&self) -> Option<AtomId> {
        match *self {
            InsertError::UnknownCause { atom, .. } => Some(atom),
            InsertError::DuplicateAtom(atom) | InsertError::ConflictingAtom(atom) => Some(atom),
            InsertError::MultipleRoots { rejected, .. } => Some(rejected),
            InsertError::ClockOverflow(_) => None,
        }
    }
}

impl From<ClockOverflow> for InsertError {
    fn from(err: ClockOverflow) -> Self {
        InsertError::ClockOverflow(err)
    }
}

impl fmt::Display for InsertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertError::UnknownCause { atom, cause } => {
                write!(f, "atom {atom} names unknown cause {cause}")
            }
            InsertError::DuplicateAtom(atom) => write!(f, "atom {atom} is already present"),
            InsertError::ConflictingAtom(atom) => {
                write!(f, "atom {atom} is already present with different contents")
            }
            InsertError::MultipleRoots { existing, rejected } => {
                write!(f, "root {rejected} rejected, weave is already rooted at {existing}")
            }
            InsertError::ClockOverflow(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl std::error::Error for InsertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InsertError::ClockOverflow(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let err = InsertError::UnknownCause {
            atom: AtomId::new(2, 3),
            cause: AtomId::new(2, 2),
        };
        assert_eq!(err.to_string(), "atom (2,3) names unknown cause (2,2)");
        assert_eq!(err.atom(), Some(AtomId::new(2, 3)));

        let err = InsertError::MultipleRoots {
            existing: AtomId::new(1, 1),
            rejected: AtomId::new(2, 1),
        };
        assert_eq!(
            err.to_string(),
            "root (2,1) rejected, weave is already rooted at (1,1)"
        );
        assert_eq!(err.atom(), Some(AtomId::new(2, 1)));

        let err = InsertError::from(ClockOverflow {
            site: 1,
            observed: u64::MAX,
        });
        assert_eq!(
            err.to_string(),
            format!("clock of site 1 cannot advance past {}", u64::MAX)
        );
        assert_eq!(err.atom(), None);
        assert!(std::error::Error::source(&err).is_some());
    }
}
