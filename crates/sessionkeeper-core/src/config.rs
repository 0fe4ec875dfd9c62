//! Keychain naming configuration.
//!
//! Service and account names are derived from the application's bundle
//! identifier by appending a fixed suffix per role, e.g.
//! `com.example.appTokenService`. The identifier and optional access group
//! come from the environment (`.env` files are honoured).

use std::env;

/// Environment variable holding the application bundle identifier
pub const BUNDLE_ID_VAR: &str = "SESSIONKEEPER_BUNDLE_ID";

/// Environment variable holding the shared access group
pub const ACCESS_GROUP_VAR: &str = "SESSIONKEEPER_ACCESS_GROUP";

const TOKEN_SERVICE_SUFFIX: &str = "TokenService";
const USER_TYPE_SERVICE_SUFFIX: &str = "UserTypeService";
const ACCOUNT_SUFFIX: &str = "Account";

/// The record roles an application stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceRole {
    Token,
    UserType,
}

impl ServiceRole {
    pub const ALL: [ServiceRole; 2] = [ServiceRole::Token, ServiceRole::UserType];

    fn suffix(self) -> &'static str {
        match self {
            ServiceRole::Token => TOKEN_SERVICE_SUFFIX,
            ServiceRole::UserType => USER_TYPE_SERVICE_SUFFIX,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeychainConfig {
    pub bundle_id: String,
    pub access_group: Option<String>,
}

impl KeychainConfig {
    pub fn new(bundle_id: impl Into<String>) -> Self {
        Self {
            bundle_id: bundle_id.into(),
            access_group: None,
        }
    }

    pub fn with_access_group(mut self, group: impl Into<String>) -> Self {
        self.access_group = Some(group.into());
        self
    }

    /// Load configuration from the environment.
    ///
    /// A missing bundle identifier yields an empty one, so names reduce to
    /// their bare suffixes. A blank access group is treated as absent.
    pub fn from_env() -> Self {
        // Load .env file if present (silently ignore if not found)
        let _ = dotenvy::dotenv();

        let bundle_id = env::var(BUNDLE_ID_VAR).unwrap_or_default();
        let access_group = env::var(ACCESS_GROUP_VAR)
            .ok()
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty());

        Self {
            bundle_id,
            access_group,
        }
    }

    pub fn service(&self, role: ServiceRole) -> String {
        format!("{}{}", self.bundle_id, role.suffix())
    }

    pub fn service_token(&self) -> String {
        self.service(ServiceRole::Token)
    }

    pub fn service_user_type(&self) -> String {
        self.service(ServiceRole::UserType)
    }

    pub fn account_name(&self) -> String {
        format!("{}{}", self.bundle_id, ACCOUNT_SUFFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_service_names() {
        let config = KeychainConfig::new("com.example.app");
        assert_eq!(config.service_token(), "com.example.appTokenService");
        assert_eq!(config.service_user_type(), "com.example.appUserTypeService");
        assert_eq!(config.account_name(), "com.example.appAccount");
    }

    #[test]
    fn test_service_names_distinct_per_role() {
        let config = KeychainConfig::new("com.example.app");
        let names: Vec<String> = ServiceRole::ALL.iter().map(|r| config.service(*r)).collect();
        assert_ne!(names[0], names[1]);
    }

    #[test]
    fn test_empty_bundle_id() {
        let config = KeychainConfig::default();
        assert_eq!(config.service_token(), "TokenService");
        assert_eq!(config.account_name(), "Account");
        assert!(config.access_group.is_none());
    }

    #[test]
    #[serial]
    fn test_from_env() {
        env::set_var(BUNDLE_ID_VAR, "org.test.bundle");
        env::set_var(ACCESS_GROUP_VAR, "  TEAMID.shared  ");
        let config = KeychainConfig::from_env();
        assert_eq!(config.bundle_id, "org.test.bundle");
        assert_eq!(config.access_group.as_deref(), Some("TEAMID.shared"));

        env::set_var(ACCESS_GROUP_VAR, "   ");
        assert!(KeychainConfig::from_env().access_group.is_none());

        env::remove_var(BUNDLE_ID_VAR);
        env::remove_var(ACCESS_GROUP_VAR);
        let config = KeychainConfig::from_env();
        assert_eq!(config.bundle_id, "");
        assert!(config.access_group.is_none());
    }
}
