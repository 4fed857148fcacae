use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use tokio::sync::Mutex as AsyncMutex;
use tokio::sync::OwnedMutexGuard;

/// One async mutex per device address.
///
/// Holders of the same address queue in FIFO order; different addresses never
/// wait on each other. An entry nobody holds or waits on is dropped on the next
/// acquire, so the map only covers addresses with actions in flight.
#[derive(Debug, Default)]
pub(super) struct AddressLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl AddressLocks {
    pub(super) async fn acquire(&self, address: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(address.to_string()).or_default().clone()
        };

        lock.lock_owned().await
    }
}
