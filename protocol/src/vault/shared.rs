//! A vault that several threads can drive.
//!
//! Vault operations take `&mut self`; [`SharedVault`] serializes whole
//! operations behind one `parking_lot` mutex so a deposit on one thread
//! never interleaves with a withdrawal on another.

use parking_lot::Mutex;
use std::sync::Arc;

/// Cheaply cloneable handle to a vault behind a mutex.
#[derive(Debug, Default)]
pub struct SharedVault<V> {
    inner: Arc<Mutex<V>>,
}

impl<V> Clone for SharedVault<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> SharedVault<V> {
    pub fn new(vault: V) -> Self {
        Self {
            inner: Arc::new(Mutex::new(vault)),
        }
    }

    /// Runs `f` with exclusive access to the vault.
    pub fn with<R>(&self, f: impl FnOnce(&mut V) -> R) -> R {
        let mut vault = self.inner.lock();
        f(&mut vault)
    }

    /// Unwraps the vault if this is the last handle.
    pub fn try_unwrap(self) -> Result<V, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{VaultConfig, FIXED_POINT_ONE};
    use crate::types::{Address, CallContext};
    use crate::vault::{FixedRatio, IdAllocation, ReceiptVault};
    use std::thread;

    #[test]
    fn concurrent_deposits_serialize() {
        let config = VaultConfig::new(Address::from_label("vault"), "Shared", "SHR");
        let strategy = FixedRatio::new(FIXED_POINT_ONE, IdAllocation::Sequential);
        let shared = SharedVault::new(ReceiptVault::new(config, None, strategy).unwrap());

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let shared = shared.clone();
                thread::spawn(move || {
                    let caller = Address::from_label(&format!("depositor-{i}"));
                    let ctx = CallContext::new(caller, 0, 0);
                    for _ in 0..25 {
                        shared
                            .with(|vault| vault.deposit(&ctx, 10, caller, 0, b""))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let vault = shared.try_unwrap().unwrap();
        assert_eq!(vault.total_supply(), 1000);
        assert_eq!(vault.highwater_id(), 100);
        assert!(vault.is_backed());
    }
}
