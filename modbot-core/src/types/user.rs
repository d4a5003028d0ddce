//! User identity as sent by the platform.

use serde::{Deserialize, Serialize};

/// User identity (id, names, username, client language).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub language_code: Option<String>,
}

impl User {
    /// First and last name joined by a space; just the first name when there is no last name.
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }

    /// `@username` when the user has one.
    pub fn handle(&self) -> Option<String> {
        self.username.as_ref().map(|u| format!("@{}", u))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(last_name: Option<&str>) -> User {
        User {
            id: 1,
            is_bot: false,
            first_name: "Ada".to_string(),
            last_name: last_name.map(str::to_string),
            username: Some("ada".to_string()),
            language_code: None,
        }
    }

    #[test]
    fn test_full_name() {
        assert_eq!(user(Some("Lovelace")).full_name(), "Ada Lovelace");
        assert_eq!(user(None).full_name(), "Ada");
        assert_eq!(user(Some("")).full_name(), "Ada");
    }

    #[test]
    fn test_deserialize_minimal_user() {
        let user: User = serde_json::from_str(r#"{"id": 42}"#).unwrap();
        assert_eq!(user.id, 42);
        assert!(!user.is_bot);
        assert!(user.username.is_none());
        assert!(user.handle().is_none());
    }
}
