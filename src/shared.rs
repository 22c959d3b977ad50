use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

use crate::error::Error;
use crate::{Counting, Frame, FrameReport, LineCounter};

/// Serialises frame processing and resets behind one mutex, so a reset never
/// lands in the middle of a frame.
pub struct SharedCounter<C = LineCounter> {
    inner: Mutex<C>,
}

impl<C: Counting> SharedCounter<C> {
    pub fn new(counter: C) -> Self {
        Self {
            inner: Mutex::new(counter),
        }
    }

    pub fn process(&self, frame: &Frame) -> Result<FrameReport, Error> {
        self.lock().update(frame)
    }

    /// Waits for the in-flight frame, if any, then resets.
    pub fn reset_all(&self) {
        self.lock().reset()
    }

    /// Resets only if no frame is being processed right now.
    pub fn try_reset(&self) -> Result<(), Error> {
        match self.inner.try_lock() {
            Ok(mut counter) => counter.reset(),
            Err(TryLockError::Poisoned(p)) => p.into_inner().reset(),
            Err(TryLockError::WouldBlock) => return Err(Error::ConcurrentResetConflict),
        }

        Ok(())
    }

    pub fn counts(&self) -> BTreeMap<String, u64> {
        self.lock().counts()
    }

    pub fn into_inner(self) -> C {
        self.inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // a panic mid-frame leaves the stores consistent per record, keep going
    fn lock(&self) -> MutexGuard<'_, C> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
