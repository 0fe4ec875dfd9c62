use serde::{Deserialize, Serialize};

use super::User;

/// Session payload persisted in the keychain.
///
/// Every field is optional. A missing or empty token means the user is not
/// authenticated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct SessionData {
    #[serde(
        rename = "access_token",
        alias = "token",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

impl SessionData {
    pub fn new(token: impl Into<String>, user: Option<User>) -> Self {
        Self {
            token: Some(token.into()),
            user,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_payload() {
        let json = r#"{"access_token":"abc","user":{"id":7,"firstName":"Ada","lastName":"Lovelace"}}"#;
        let data: SessionData = serde_json::from_str(json).expect("Failed to parse session JSON");
        assert_eq!(data.token.as_deref(), Some("abc"));
        assert_eq!(data.user.as_ref().map(|u| u.id), Some(7));
        assert_eq!(serde_json::to_string(&data).unwrap(), json);
    }

    #[test]
    fn test_token_alias_accepted() {
        let data: SessionData = serde_json::from_str(r#"{"token":"xyz"}"#).unwrap();
        assert_eq!(data.token.as_deref(), Some("xyz"));
    }

    #[test]
    fn test_absent_fields() {
        let data: SessionData = serde_json::from_str("{}").unwrap();
        assert_eq!(data, SessionData::default());
        assert_eq!(serde_json::to_string(&data).unwrap(), "{}");
    }

    #[test]
    fn test_is_authenticated() {
        assert!(SessionData::new("abc", None).is_authenticated());
        assert!(!SessionData::new("", None).is_authenticated());
        assert!(!SessionData::default().is_authenticated());
    }
}
