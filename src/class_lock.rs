use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::trace;

/// Outcome of resolving a track's class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lock {
    /// First sighting, the observed class is now locked
    New(i32),
    /// Already locked, the observed class was discarded
    Held(i32),
}

impl Lock {
    #[inline]
    pub fn class(&self) -> i32 {
        match *self {
            Lock::New(c) | Lock::Held(c) => c,
        }
    }

    #[inline]
    pub fn is_new(&self) -> bool {
        matches!(self, Lock::New(_))
    }
}

/// Pins every track to the class it was first observed with.
#[derive(Debug, Default, Clone)]
pub struct ClassLocks {
    locks: HashMap<u32, i32>,
}

impl ClassLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&mut self, track_id: u32, observed: i32) -> Lock {
        match self.locks.entry(track_id) {
            Entry::Occupied(e) => {
                let locked = *e.get();
                if locked != observed {
                    trace!(track_id, locked, observed, "class flicker suppressed");
                }

                Lock::Held(locked)
            }
            Entry::Vacant(e) => {
                e.insert(observed);
                Lock::New(observed)
            }
        }
    }

    #[inline]
    pub fn get(&self, track_id: u32) -> Option<i32> {
        self.locks.get(&track_id).copied()
    }

    #[inline]
    pub fn remove(&mut self, track_id: u32) -> Option<i32> {
        self.locks.remove(&track_id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.locks.clear()
    }
}
