pub(crate) mod decoder;
pub(crate) mod overlay;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Take the shared engine lock. A panic while the lock was held leaves the engine usable: the
/// next render simply rebuilds regions from whatever state it is in.
pub(crate) fn lock_engine<E>(engine: &Mutex<E>) -> MutexGuard<'_, E> {
    engine.lock().unwrap_or_else(PoisonError::into_inner)
}
