use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_camel_case_keys() {
        let json = r#"{"id":42,"firstName":"Grace","lastName":"Hopper"}"#;
        let user: User = serde_json::from_str(json).expect("Failed to parse user JSON");
        assert_eq!(user.id, 42);
        assert_eq!(user.first_name, "Grace");
        assert_eq!(serde_json::to_string(&user).unwrap(), json);
    }

    #[test]
    fn test_missing_name_fields_rejected() {
        let result: Result<User, _> = serde_json::from_str(r#"{"id":42,"firstName":"Grace"}"#);
        assert!(result.is_err());
    }
}
