//! Typed records in the secure store.
//!
//! `SecureItem<T>` turns any serde-serializable value into a named record,
//! deciding between add and update by reading first. The read-then-write is
//! not atomic: concurrent saves of the same record are last-writer-wins and
//! a save racing a delete may add a fresh record.

use std::marker::PhantomData;

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::backend::SecureStore;
use crate::config::{KeychainConfig, ServiceRole};
use crate::error::{Result, StoreError};
use crate::query::{ItemClass, Query};

pub struct SecureItem<'a, T> {
    store: &'a dyn SecureStore,
    service: String,
    account: String,
    access_group: Option<String>,
    _type: PhantomData<fn() -> T>,
}

impl<'a, T> SecureItem<'a, T>
where
    T: Serialize + DeserializeOwned,
{
    /// Item stored under the token service, which every payload type uses
    /// unless told otherwise.
    pub fn new(store: &'a dyn SecureStore, config: &KeychainConfig) -> Self {
        Self::with_role(store, config, ServiceRole::Token)
    }

    pub fn with_role(
        store: &'a dyn SecureStore,
        config: &KeychainConfig,
        role: ServiceRole,
    ) -> Self {
        Self {
            store,
            service: config.service(role),
            account: config.account_name(),
            access_group: config.access_group.clone(),
            _type: PhantomData,
        }
    }

    fn query(&self) -> Query {
        Query::for_item(
            self.service.as_str(),
            Some(self.account.as_str()),
            self.access_group.as_deref(),
        )
    }

    /// Read and decode the stored value.
    pub fn read(&self) -> Result<T> {
        let query = self.query().returning_attributes().returning_data();
        let found = self
            .store
            .copy_matching(&query)
            .map_err(StoreError::from_lookup)?;

        let bytes = found.data.ok_or(StoreError::MalformedPayload)?;
        let text = std::str::from_utf8(&bytes).map_err(|_| StoreError::MalformedPayload)?;
        serde_json::from_str(text).map_err(StoreError::DeserializationFailed)
    }

    /// Store `value`, updating the existing record or adding a new one.
    pub fn save(&self, value: &T) -> Result<()> {
        let data = encode(value)?;
        let query = self.query();

        match self.read() {
            Ok(_) => {
                debug!(service = %self.service, "Updating keychain item");
                self.store
                    .update(&query, &data)
                    .map_err(StoreError::UnhandledStoreError)
            }
            Err(StoreError::NotFound) => {
                debug!(service = %self.service, "Adding keychain item");
                self.store
                    .add(&query, &data)
                    .map_err(StoreError::UnhandledStoreError)
            }
            Err(e) => Err(e),
        }
    }

    /// Remove every generic-password record in the store, not just this one.
    pub fn delete_all(&self) -> Result<()> {
        delete_all(self.store)
    }
}

/// Remove every generic-password record in `store`. One attempt, no retry.
pub fn delete_all(store: &dyn SecureStore) -> Result<()> {
    store
        .delete(&Query::class_only(ItemClass::GenericPassword))
        .map_err(StoreError::UnhandledStoreError)?;
    debug!("Deleted all keychain items");
    Ok(())
}

/// Serialize to JSON, then pass through UTF-8 text so the stored bytes are
/// always in normalized text form.
fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(value).map_err(StoreError::SerializationFailed)?;
    let text = String::from_utf8(json).map_err(|_| StoreError::MalformedPayload)?;
    Ok(text.into_bytes())
}
