//! Lazily created, resettable session store.
//!
//! `SessionManager` owns at most one `SessionInstance` at a time. The first
//! call to `shared` creates it under a lock, so concurrent first access still
//! yields a single instance; `destroy` drops it and the next access builds a
//! fresh one.
//!
//! `SessionInstance` keeps the full `StoreError` taxonomy. The manager's
//! `save_info`, `get_session` and `delete_all_data` collapse it to a bool or
//! an `Option`, logging the detail.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::backend::SecureStore;
use crate::config::KeychainConfig;
use crate::error::{Result, StoreError};
use crate::item::{self, SecureItem};

pub struct SessionInstance {
    store: Arc<dyn SecureStore>,
    config: KeychainConfig,
}

impl SessionInstance {
    fn item<T>(&self) -> SecureItem<'_, T>
    where
        T: Serialize + DeserializeOwned,
    {
        SecureItem::new(self.store.as_ref(), &self.config)
    }

    pub fn try_save<T>(&self, data: &T) -> Result<()>
    where
        T: Serialize + DeserializeOwned,
    {
        self.item::<T>().save(data)
    }

    pub fn try_read<T>(&self) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
    {
        self.item::<T>().read()
    }

    pub fn try_delete_all(&self) -> Result<()> {
        item::delete_all(self.store.as_ref())
    }
}

pub struct SessionManager {
    store: Arc<dyn SecureStore>,
    config: KeychainConfig,
    instance: Mutex<Option<Arc<SessionInstance>>>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SecureStore>, config: KeychainConfig) -> Self {
        Self {
            store,
            config,
            instance: Mutex::new(None),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<Arc<SessionInstance>>> {
        self.instance.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the live instance, creating it on first access.
    pub fn shared(&self) -> Arc<SessionInstance> {
        let mut slot = self.slot();
        let instance = slot.get_or_insert_with(|| {
            debug!("Creating session instance");
            Arc::new(SessionInstance {
                store: Arc::clone(&self.store),
                config: self.config.clone(),
            })
        });
        Arc::clone(instance)
    }

    /// Drop the live instance, if any.
    pub fn destroy(&self) {
        if self.slot().take().is_some() {
            debug!("Destroyed session instance");
        }
    }

    pub fn is_active(&self) -> bool {
        self.slot().is_some()
    }

    pub fn save_info<T>(&self, data: &T) -> bool
    where
        T: Serialize + DeserializeOwned,
    {
        match self.shared().try_save(data) {
            Ok(()) => true,
            Err(e) => {
                warn!("Error updating keychain: {}", e);
                false
            }
        }
    }

    pub fn get_session<T>(&self) -> Option<T>
    where
        T: Serialize + DeserializeOwned,
    {
        match self.shared().try_read() {
            Ok(data) => Some(data),
            Err(StoreError::NotFound) => {
                debug!("No session stored");
                None
            }
            Err(e) => {
                warn!("Error reading keychain: {}", e);
                None
            }
        }
    }

    /// Wipe the store and, on success, destroy the live instance.
    pub fn delete_all_data(&self) -> bool {
        match self.shared().try_delete_all() {
            Ok(()) => {
                self.destroy();
                true
            }
            Err(e) => {
                warn!("Error resetting keychain: {}", e);
                false
            }
        }
    }
}
