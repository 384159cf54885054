//! Authorisation gate consulted before any message reaches a session.

use std::collections::HashSet;
use std::path::Path;

use handwitch_core::{HandwitchError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Guest,
    User,
}

pub trait Authorisation: Send + Sync {
    /// Role of the user with the given login (Telegram username, or numeric id when absent).
    fn role(&self, login: &str) -> Role;
}

/// Grants `User` to everyone.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Authorisation for AllowAll {
    fn role(&self, _login: &str) -> Role {
        Role::User
    }
}

/// Grants `User` to listed logins only.
#[derive(Debug, Clone, Default)]
pub struct WhiteList {
    logins: HashSet<String>,
}

impl WhiteList {
    pub fn new<I, S>(logins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            logins: logins.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a JSON array of logins: `["alice", "bob"]`.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let logins: Vec<String> = serde_json::from_str(raw)
            .map_err(|e| HandwitchError::Config(format!("invalid white list: {}", e)))?;
        Ok(Self::new(logins))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn len(&self) -> usize {
        self.logins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logins.is_empty()
    }
}

impl Authorisation for WhiteList {
    fn role(&self, login: &str) -> Role {
        if self.logins.contains(login) {
            Role::User
        } else {
            Role::Guest
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_allow_all() {
        assert_eq!(AllowAll.role("anyone"), Role::User);
    }

    #[test]
    fn test_white_list_from_json() {
        let list = WhiteList::from_json_str(r#"["alice", "42"]"#).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.role("alice"), Role::User);
        assert_eq!(list.role("42"), Role::User);
        assert_eq!(list.role("mallory"), Role::Guest);
    }

    #[test]
    fn test_white_list_rejects_non_array() {
        let err = WhiteList::from_json_str(r#"{"alice": true}"#).unwrap_err();
        assert!(matches!(err, HandwitchError::Config(_)));
    }

    #[test]
    fn test_white_list_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"["bob"]"#).unwrap();
        let list = WhiteList::from_path(file.path()).unwrap();
        assert_eq!(list.role("bob"), Role::User);

        let missing = WhiteList::from_path("/nonexistent/white_list.json");
        assert!(matches!(missing, Err(HandwitchError::Io(_))));
    }
}
