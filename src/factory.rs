// (c) Copyright 2025 Helsing GmbH. All rights reserved.
use crate::{Atom, AtomId, SiteId, Timestamp};
use std::fmt;

/// Error returned when a site's Lamport clock cannot advance past a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockOverflow {
    pub site: SiteId,
    /// The timestamp the clock had to move past.
    pub observed: Timestamp,
}

impl fmt::Display for ClockOverflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "clock of site {} cannot advance past {}",
            self.site, self.observed
        )
    }
}

impl std::error::Error for ClockOverflow {}

/// A per-site Lamport clock that stamps new atoms.
///
/// Every atom produced by one factory carries a strictly greater timestamp than the one before
/// it. After observing a foreign timestamp through [`AtomFactory::update_time`], every atom
/// produced afterwards carries a strictly greater timestamp than the observed one.
///
/// Advancing the clock never wraps around: once it cannot move any further, creating atoms and
/// observing timestamps fail with [`ClockOverflow`] and leave the clock untouched.
///
/// The clock is owned by the factory instance. Persisting and restoring it is up to the caller
/// (see [`AtomFactory::with_time`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomFactory {
    site: SiteId,
    time: Timestamp,
}

impl AtomFactory {
    /// Creates a factory for `site` with its clock at 0.
    pub fn new(site: SiteId) -> Self {
        Self::with_time(site, 0)
    }

    /// Creates a factory for `site` resuming from a previously observed clock value.
    pub fn with_time(site: SiteId, time: Timestamp) -> Self {
        Self { site, time }
    }

    pub fn site(&self) -> SiteId {
        self.site
    }

    /// The timestamp of the most recent local atom or observed foreign atom.
    pub fn time(&self) -> Timestamp {
        self.time
    }

    /// Creates a root atom, one without a cause.
    pub fn root<T>(&mut self, value: T) -> Result<Atom<T>, ClockOverflow> {
        self.create_with(value, None, 0)
    }

    /// Creates an atom caused by `cause` with the default priority.
    ///
    /// `cause` may be an [`AtomId`], an [`&Atom`](Atom) or a
    /// [`&WeaveReference`](crate::WeaveReference).
    pub fn create<T>(
        &mut self,
        value: T,
        cause: impl Into<AtomId>,
    ) -> Result<Atom<T>, ClockOverflow> {
        self.create_with(value, Some(cause.into()), 0)
    }

    /// Creates an atom with an explicit (possibly absent) cause and priority.
    pub fn create_with<T>(
        &mut self,
        value: T,
        cause: Option<AtomId>,
        priority: u32,
    ) -> Result<Atom<T>, ClockOverflow> {
        let time = self.advance(self.time)?;
        Ok(Atom {
            id: AtomId::with_priority(self.site, time, priority),
            cause,
            value,
        })
    }

    /// Merges an observed timestamp into the clock.
    ///
    /// This is the Lamport receive rule: `time = max(time, observed) + 1`. It always advances the
    /// clock, even when `observed` is behind it.
    pub fn update_time(&mut self, observed: Timestamp) -> Result<(), ClockOverflow> {
        self.advance(observed).map(drop)
    }

    fn advance(&mut self, observed: Timestamp) -> Result<Timestamp, ClockOverflow> {
        let time = self
            .time
            .max(observed)
            .checked_add(1)
            .ok_or(ClockOverflow {
                site: self.site,
                observed,
            })?;
        self.time = time;
        Ok(time)
    }

    /// Rewinds the clock to a value previously read through [`AtomFactory::time`].
    ///
    /// Used to undo the tick of an operation that was subsequently rejected.
    pub(crate) fn restore(&mut self, time: Timestamp) {
        self.time = time;
    }
}
