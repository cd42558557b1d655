use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

/// An advisory at-most-one-in-flight registry keyed by asset record id.
///
/// The ledger itself does not stop two sessions from submitting two mint
/// transactions for the same record, so the orchestrators hold one of these
/// guards from simulation through confirmation. Clones share the registry.
#[derive(Debug, Default, Clone)]
pub struct InFlightLocks {
    held: Arc<Mutex<HashSet<u64>>>,
}

impl InFlightLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the lock for `id`, or returns `None` if an operation is
    /// already in flight for it. The claim is released when the guard drops.
    pub fn acquire(&self, id: u64) -> Option<InFlightGuard> {
        let mut held = self.held.lock();
        if !held.insert(id) {
            return None;
        }
        Some(InFlightGuard {
            id,
            held: Arc::clone(&self.held),
        })
    }
}

/// The claim on an asset record id. Dropping it releases the claim.
#[derive(Debug)]
pub struct InFlightGuard {
    id: u64,
    held: Arc<Mutex<HashSet<u64>>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.held.lock().remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusive_until_dropped() {
        let locks = InFlightLocks::new();

        let guard = locks.acquire(1).unwrap();
        assert!(locks.acquire(1).is_none());
        // Other records are unaffected.
        assert!(locks.acquire(2).is_some());

        drop(guard);
        assert!(locks.acquire(1).is_some());
    }

    #[test]
    fn test_clones_share_the_registry() {
        let locks = InFlightLocks::new();
        let other = locks.clone();

        let _guard = locks.acquire(1).unwrap();
        assert!(other.acquire(1).is_none());
    }
}
