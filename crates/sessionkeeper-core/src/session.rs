use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::backend::KeyringStore;
use crate::config::KeychainConfig;
use crate::manager::SessionManager;
use crate::models::SessionData;
use crate::settings::{FileSettings, Settings};

/// Settings key recording that the application has started before
pub const HAS_RUN_BEFORE_KEY: &str = "hasRunBefore";

/// Application-facing session API.
pub struct Session {
    manager: Arc<SessionManager>,
    settings: Box<dyn Settings>,
}

impl Session {
    pub fn new(manager: Arc<SessionManager>, settings: Box<dyn Settings>) -> Self {
        Self { manager, settings }
    }

    /// Session backed by the OS keychain, named from the environment, with
    /// settings under the user's config directory for `app_name`.
    pub fn open(app_name: &str) -> Result<Self> {
        let config = KeychainConfig::from_env();
        let store = Arc::new(KeyringStore::new(&config)?);
        let settings = FileSettings::for_app(app_name)?;
        Ok(Self::new(
            Arc::new(SessionManager::new(store, config)),
            Box::new(settings),
        ))
    }

    pub fn manager(&self) -> &SessionManager {
        &self.manager
    }

    pub fn save(&self, data: &SessionData) -> bool {
        self.manager.save_info(data)
    }

    /// Whether a session with a non-empty token is stored.
    ///
    /// The very first call of an installation records the first-run marker,
    /// wipes whatever a previous install left in the keychain and reports
    /// `false`.
    pub fn is_logged(&self) -> bool {
        if self.settings.get_bool(HAS_RUN_BEFORE_KEY) {
            return self
                .get_data()
                .is_some_and(|data| data.is_authenticated());
        }

        info!("First launch, clearing stale keychain items");
        if let Err(e) = self.settings.set_bool(HAS_RUN_BEFORE_KEY, true) {
            warn!("Failed to record first launch: {:#}", e);
        }
        self.manager.delete_all_data();
        false
    }

    pub fn logout(&self) -> bool {
        self.manager.delete_all_data()
    }

    pub fn get_data(&self) -> Option<SessionData> {
        self.manager.get_session()
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;
    use crate::backend::MemoryStore;
    use crate::models::User;
    use crate::settings::MemorySettings;

    /// Settings that can be read but never written
    struct ReadOnlySettings;

    impl Settings for ReadOnlySettings {
        fn get_bool(&self, _key: &str) -> bool {
            false
        }

        fn set_bool(&self, _key: &str, _value: bool) -> anyhow::Result<()> {
            Err(anyhow!("settings are read-only"))
        }
    }

    fn session(store: Arc<MemoryStore>, has_run_before: bool) -> Session {
        let settings = MemorySettings::new();
        if has_run_before {
            settings.set_bool(HAS_RUN_BEFORE_KEY, true).unwrap();
        }
        let manager = SessionManager::new(store, KeychainConfig::new("com.example.app"));
        Session::new(Arc::new(manager), Box::new(settings))
    }

    fn sample() -> SessionData {
        SessionData::new(
            "abc",
            Some(User {
                id: 7,
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
            }),
        )
    }

    #[test]
    fn test_first_launch_purges_store() {
        let store = Arc::new(MemoryStore::new());
        let seeded = session(store.clone(), true);
        assert!(seeded.save(&sample()));
        assert_eq!(store.len(), 1);

        let fresh = session(store.clone(), false);
        assert!(!fresh.is_logged());
        assert!(store.is_empty());

        // The marker is now set, so later calls read the store
        assert!(fresh.save(&sample()));
        assert!(fresh.is_logged());
    }

    #[test]
    fn test_first_launch_on_empty_store() {
        let store = Arc::new(MemoryStore::new());
        let session = session(store.clone(), false);
        assert!(!session.is_logged());
        assert!(!session.is_logged());
        assert!(store.is_empty());
    }

    #[test]
    fn test_logged_with_token() {
        let session = session(Arc::new(MemoryStore::new()), true);
        assert!(session.save(&SessionData::new("abc", None)));
        assert!(session.is_logged());
    }

    #[test]
    fn test_not_logged_with_empty_token() {
        let session = session(Arc::new(MemoryStore::new()), true);
        assert!(session.save(&SessionData::new("", None)));
        assert!(!session.is_logged());
    }

    #[test]
    fn test_not_logged_without_token() {
        let session = session(Arc::new(MemoryStore::new()), true);
        assert!(session.save(&SessionData {
            token: None,
            user: sample().user,
        }));
        assert!(!session.is_logged());
    }

    #[test]
    fn test_not_logged_with_empty_store() {
        let session = session(Arc::new(MemoryStore::new()), true);
        assert!(!session.is_logged());
    }

    #[test]
    fn test_get_data_returns_saved_payload() {
        let session = session(Arc::new(MemoryStore::new()), true);
        assert!(session.save(&sample()));
        assert_eq!(session.get_data(), Some(sample()));

        let updated = SessionData::new("def", sample().user);
        assert!(session.save(&updated));
        assert_eq!(session.get_data(), Some(updated));
    }

    #[test]
    fn test_logout_clears_data() {
        let session = session(Arc::new(MemoryStore::new()), true);
        assert!(session.save(&sample()));
        session.manager().shared();

        assert!(session.logout());
        assert!(!session.manager().is_active());
        assert_eq!(session.get_data(), None);
        assert!(!session.is_logged());
    }

    #[test]
    fn test_first_launch_purges_even_if_marker_not_saved() {
        let store = Arc::new(MemoryStore::new());
        assert!(session(store.clone(), true).save(&sample()));

        let manager = SessionManager::new(store.clone(), KeychainConfig::new("com.example.app"));
        let session = Session::new(Arc::new(manager), Box::new(ReadOnlySettings));
        assert!(!session.is_logged());
        assert!(store.is_empty());

        // The marker never sticks, so every call is treated as a first launch
        assert!(session.save(&sample()));
        assert!(!session.is_logged());
        assert!(store.is_empty());
    }

    #[test]
    #[serial_test::serial]
    #[cfg(not(any(
        target_os = "macos",
        target_os = "ios",
        windows,
        feature = "apple-native",
        feature = "windows-native",
        feature = "sync-secret-service"
    )))]
    fn test_open_without_keychain_backend_fails() {
        assert!(Session::open("sessionkeeper-test").is_err());
    }
}
