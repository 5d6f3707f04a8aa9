use crate::models::UserProfile;
use crate::storage::{load_json, save_json, KeyValueStore, TOKEN_KEY, USER_KEY};

/// Signed-in editor, persisted under the `token` and `user` storage keys.
///
/// Storage is read exactly once, in [`SessionStore::load`]; afterwards the in-memory copy is
/// authoritative and every change is written through.
#[derive(Clone, Debug)]
pub struct SessionStore<S> {
    store: S,
    token: Option<String>,
    user: Option<UserProfile>,
    invalidated: bool,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn load(store: S) -> Self {
        let token = store.get_item(TOKEN_KEY).filter(|t| !t.trim().is_empty());
        let user = token
            .as_ref()
            .and_then(|_| load_json::<UserProfile>(&store, USER_KEY));
        tracing::debug!(authenticated = token.is_some(), "session loaded");

        Self {
            store,
            token,
            user,
            invalidated: false,
        }
    }

    pub fn login(&mut self, token: String, user: UserProfile) {
        self.store.set_item(TOKEN_KEY, &token);
        save_json(&self.store, USER_KEY, &user);
        self.token = Some(token);
        self.user = Some(user);
        self.invalidated = false;
    }

    pub fn logout(&mut self) {
        self.store.remove_item(TOKEN_KEY);
        self.store.remove_item(USER_KEY);
        self.token = None;
        self.user = None;
    }

    /// The backend rejected the token (HTTP 401).
    pub fn invalidate(&mut self) {
        if self.token.is_some() {
            tracing::info!("session rejected by backend, signing out");
        }
        self.logout();
        self.invalidated = true;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn current_user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// True after [`invalidate`](Self::invalidate) until the next login.
    pub fn was_invalidated(&self) -> bool {
        self.invalidated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use serde_json::json;

    fn user() -> UserProfile {
        serde_json::from_value(json!({"name": "Editor", "email": "ed@example.com"})).unwrap()
    }

    #[test]
    fn test_empty_storage_is_signed_out() {
        let s = SessionStore::load(MemoryStorage::default());
        assert!(!s.is_authenticated());
        assert!(s.current_user().is_none());
    }

    #[test]
    fn test_login_persists_and_reloads() {
        let storage = MemoryStorage::default();
        let mut s = SessionStore::load(storage.clone());
        s.login("tok".into(), user());

        assert_eq!(storage.get_item(TOKEN_KEY).as_deref(), Some("tok"));
        let reloaded = SessionStore::load(storage);
        assert_eq!(reloaded.token(), Some("tok"));
        assert_eq!(
            reloaded.current_user().and_then(|u| u.display_name()),
            Some("Editor".to_string())
        );
    }

    #[test]
    fn test_logout_clears_storage() {
        let storage = MemoryStorage::default();
        let mut s = SessionStore::load(storage.clone());
        s.login("tok".into(), user());
        s.logout();
        assert!(storage.get_item(TOKEN_KEY).is_none());
        assert!(storage.get_item(USER_KEY).is_none());
        assert!(!s.was_invalidated());
    }

    #[test]
    fn test_invalidate_on_unauthorized() {
        let storage = MemoryStorage::default();
        let mut s = SessionStore::load(storage.clone());
        s.login("tok".into(), user());
        s.invalidate();
        assert!(!s.is_authenticated());
        assert!(s.was_invalidated());
        assert!(!SessionStore::load(storage).is_authenticated());
    }

    #[test]
    fn test_user_without_token_is_ignored() {
        let storage = MemoryStorage::default();
        storage.set_item(USER_KEY, r#"{"name":"stale"}"#);
        let s = SessionStore::load(storage);
        assert!(s.current_user().is_none());
    }
}
