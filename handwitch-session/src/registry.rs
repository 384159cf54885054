//! Live sessions keyed by (chat, user).
//!
//! Every entry carries a generation id so a finished session can only remove itself, never a
//! successor that was created under the same key in the meantime.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub chat_id: i64,
    pub user: String,
}

impl SessionKey {
    pub fn new(chat_id: i64, user: impl Into<String>) -> Self {
        Self {
            chat_id,
            user: user.into(),
        }
    }
}

struct SessionEntry {
    id: u64,
    inbox: mpsc::Sender<String>,
}

/// Handle to a registered session.
#[derive(Debug, Clone)]
pub struct SessionSlot {
    pub id: u64,
    pub inbox: mpsc::Sender<String>,
    /// True when this call registered the session.
    pub created: bool,
}

#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<SessionKey, SessionEntry>,
    next_id: AtomicU64,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the live session for `key`, or registers the inbox produced by `create`.
    /// Lookup and insertion are atomic per key. When `create` declines (returns `None`) nothing is
    /// registered and `None` is returned.
    pub fn get_or_create<F>(&self, key: &SessionKey, create: F) -> Option<SessionSlot>
    where
        F: FnOnce() -> Option<mpsc::Sender<String>>,
    {
        match self.sessions.entry(key.clone()) {
            Entry::Occupied(entry) => {
                let entry = entry.get();
                Some(SessionSlot {
                    id: entry.id,
                    inbox: entry.inbox.clone(),
                    created: false,
                })
            }
            Entry::Vacant(vacant) => {
                let inbox = create()?;
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                vacant.insert(SessionEntry {
                    id,
                    inbox: inbox.clone(),
                });
                Some(SessionSlot {
                    id,
                    inbox,
                    created: true,
                })
            }
        }
    }

    /// Removes the entry for `key` only if it is still session `id`.
    pub fn remove(&self, key: &SessionKey, id: u64) -> bool {
        self.sessions.remove_if(key, |_, entry| entry.id == id).is_some()
    }

    pub fn contains(&self, key: &SessionKey) -> bool {
        self.sessions.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inbox() -> Option<mpsc::Sender<String>> {
        let (tx, _rx) = mpsc::channel(1);
        Some(tx)
    }

    #[test]
    fn test_get_or_create_reuses_live_entry() {
        let registry = SessionRegistry::new();
        let key = SessionKey::new(1, "alice");

        let first = registry.get_or_create(&key, inbox).unwrap();
        assert!(first.created);
        let second = registry
            .get_or_create(&key, || panic!("must not create twice"))
            .unwrap();
        assert!(!second.created);
        assert_eq!(first.id, second.id);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_declined_create_registers_nothing() {
        let registry = SessionRegistry::new();
        let key = SessionKey::new(1, "alice");
        assert!(registry.get_or_create(&key, || None).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_keys_are_per_chat_and_user() {
        let registry = SessionRegistry::new();
        registry.get_or_create(&SessionKey::new(1, "alice"), inbox);
        registry.get_or_create(&SessionKey::new(1, "bob"), inbox);
        registry.get_or_create(&SessionKey::new(2, "alice"), inbox);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_remove_ignores_stale_id() {
        let registry = SessionRegistry::new();
        let key = SessionKey::new(1, "alice");
        let old = registry.get_or_create(&key, inbox).unwrap();
        assert!(registry.remove(&key, old.id));

        let new = registry.get_or_create(&key, inbox).unwrap();
        assert_ne!(old.id, new.id);
        assert!(!registry.remove(&key, old.id));
        assert!(registry.contains(&key));
        assert!(registry.remove(&key, new.id));
        assert!(registry.is_empty());
    }
}
