use std::collections::{btree_map, BTreeMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{anyhow, bail, Context};
use keyring::credential::{CredentialBuilder, CredentialBuilderApi};
use keyring::Entry;
use tracing::{debug, warn};

use super::{Match, SecureStore, Status};
use crate::config::{KeychainConfig, ServiceRole};
use crate::query::{Attributes, ItemClass, Query};

/// Entry used to find out which credential store `keyring` resolves to
const BACKEND_CHECK_SERVICE: &str = "sessionkeeper";
const BACKEND_CHECK_ACCOUNT: &str = "backend-check";

type Entries = BTreeMap<Attributes, Entry>;

/// Secure store backed by the OS credential store through `keyring`.
///
/// OS stores cannot be enumerated portably, so the store keeps a registry of
/// the entries it believes exist: the configured roles up front, plus
/// anything added later. Entries are dropped from the registry once deleted
/// or found missing. Class-wide lookups and deletes walk the registry.
///
/// The access group is not handed to `keyring` as a target (macOS reads the
/// target as a keychain domain). It is folded into the platform service
/// name instead, as `<access group>/<service>`.
pub struct KeyringStore {
    builder: Option<Box<CredentialBuilder>>,
    entries: Mutex<Entries>,
}

impl KeyringStore {
    /// Store over the platform credential store.
    ///
    /// Fails when `keyring` has no persistent backend compiled in and would
    /// fall back to its in-memory mock, which forgets every secret as soon as
    /// the entry handle is dropped.
    pub fn new(config: &KeychainConfig) -> anyhow::Result<Self> {
        let check = Entry::new(BACKEND_CHECK_SERVICE, BACKEND_CHECK_ACCOUNT)
            .context("Failed to create keyring entry")?;
        if check
            .get_credential()
            .downcast_ref::<keyring::mock::MockCredential>()
            .is_some()
        {
            bail!(
                "No persistent keychain backend available; enable the apple-native, \
                 windows-native or sync-secret-service feature"
            );
        }

        Self::build(None, config)
            .map_err(|status| anyhow!("Failed to open keychain entries: {}", status))
    }

    /// Store whose entries come from `builder` instead of the platform default.
    pub fn with_builder(
        builder: Box<CredentialBuilder>,
        config: &KeychainConfig,
    ) -> Result<Self, Status> {
        Self::build(Some(builder), config)
    }

    fn build(
        builder: Option<Box<CredentialBuilder>>,
        config: &KeychainConfig,
    ) -> Result<Self, Status> {
        let store = Self {
            builder,
            entries: Mutex::new(BTreeMap::new()),
        };

        let account = config.account_name();
        {
            let mut entries = store.entries();
            for role in ServiceRole::ALL {
                let attrs = Attributes {
                    class: ItemClass::GenericPassword,
                    service: Some(config.service(role)),
                    account: Some(account.clone()),
                    access_group: config.access_group.clone(),
                };
                store.entry(&mut entries, &attrs)?;
            }
        }
        Ok(store)
    }

    fn entries(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    fn known(&self) -> Vec<Attributes> {
        self.entries().keys().cloned().collect()
    }

    /// Entries a query refers to. A fully specified query names exactly one
    /// entry; anything broader is resolved against the registry.
    fn candidates(entries: &Entries, query: &Query) -> Vec<Attributes> {
        if query.service.is_some() && query.account.is_some() {
            return vec![query.attributes()];
        }
        entries
            .keys()
            .filter(|attrs| query.matches(attrs))
            .cloned()
            .collect()
    }

    /// The registered entry for `attrs`, creating and registering it if new.
    fn entry<'e>(
        &self,
        entries: &'e mut Entries,
        attrs: &Attributes,
    ) -> Result<&'e Entry, Status> {
        match entries.entry(attrs.clone()) {
            btree_map::Entry::Occupied(slot) => Ok(slot.into_mut()),
            btree_map::Entry::Vacant(slot) => Ok(slot.insert(self.new_entry(attrs)?)),
        }
    }

    fn new_entry(&self, attrs: &Attributes) -> Result<Entry, Status> {
        let (Some(service), Some(account)) = (platform_service(attrs), &attrs.account) else {
            return Err(Status::PARAM);
        };
        match &self.builder {
            Some(builder) => builder
                .build(None, &service, account)
                .map(Entry::new_with_credential),
            None => Entry::new(&service, account),
        }
        .map_err(|e| status_from_keyring(&e))
    }
}

impl SecureStore for KeyringStore {
    fn copy_matching(&self, query: &Query) -> Result<Match, Status> {
        let mut entries = self.entries();
        for attrs in Self::candidates(&entries, query) {
            match self.entry(&mut entries, &attrs)?.get_secret() {
                Ok(data) => {
                    return Ok(Match {
                        attributes: query.return_attributes.then_some(attrs),
                        data: query.return_data.then_some(data),
                    });
                }
                Err(keyring::Error::NoEntry) => {
                    entries.remove(&attrs);
                }
                Err(e) => return Err(status_from_keyring(&e)),
            }
        }
        Err(Status::ITEM_NOT_FOUND)
    }

    fn add(&self, query: &Query, data: &[u8]) -> Result<(), Status> {
        let attrs = query.attributes();
        let mut entries = self.entries();
        let entry = self.entry(&mut entries, &attrs)?;
        match entry.get_secret() {
            Ok(_) => return Err(Status::DUPLICATE_ITEM),
            Err(keyring::Error::NoEntry) => {}
            Err(e) => return Err(status_from_keyring(&e)),
        }

        entry.set_secret(data).map_err(|e| status_from_keyring(&e))?;
        debug!(service = ?attrs.service, "Added keychain entry");
        Ok(())
    }

    fn update(&self, query: &Query, data: &[u8]) -> Result<(), Status> {
        let mut entries = self.entries();
        let mut updated = 0;
        for attrs in Self::candidates(&entries, query) {
            let entry = self.entry(&mut entries, &attrs)?;
            match entry.get_secret() {
                Ok(_) => {
                    entry.set_secret(data).map_err(|e| status_from_keyring(&e))?;
                    updated += 1;
                }
                Err(keyring::Error::NoEntry) => {
                    entries.remove(&attrs);
                }
                Err(e) => return Err(status_from_keyring(&e)),
            }
        }
        if updated == 0 {
            return Err(Status::ITEM_NOT_FOUND);
        }
        Ok(())
    }

    fn delete(&self, query: &Query) -> Result<(), Status> {
        let mut entries = self.entries();
        let mut deleted = 0;
        for attrs in Self::candidates(&entries, query) {
            match self.entry(&mut entries, &attrs)?.delete_credential() {
                Ok(()) => deleted += 1,
                Err(keyring::Error::NoEntry) => {}
                Err(e) => {
                    warn!(service = ?attrs.service, "Failed to delete keychain entry: {}", e);
                    return Err(status_from_keyring(&e));
                }
            }
            entries.remove(&attrs);
        }
        if deleted == 0 {
            return Err(Status::ITEM_NOT_FOUND);
        }
        debug!(deleted, "Deleted keychain entries");
        Ok(())
    }
}

/// Service name given to the platform store: the access group, when there
/// is one, prefixes the service.
fn platform_service(attrs: &Attributes) -> Option<String> {
    let service = attrs.service.as_deref()?;
    Some(match &attrs.access_group {
        Some(group) => format!("{}/{}", group, service),
        None => service.to_string(),
    })
}

/// Map a `keyring` error onto the store status taxonomy.
fn status_from_keyring(err: &keyring::Error) -> Status {
    match err {
        keyring::Error::NoEntry => Status::ITEM_NOT_FOUND,
        keyring::Error::Ambiguous(_) => Status::DUPLICATE_ITEM,
        keyring::Error::TooLong(_, _) | keyring::Error::Invalid(_, _) => Status::PARAM,
        keyring::Error::NoStorageAccess(_) => Status::INTERACTION_NOT_ALLOWED,
        _ => Status::PLATFORM_FAILURE,
    }
}
