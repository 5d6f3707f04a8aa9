use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// String key/value persistence, `localStorage` in the browser.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str);
    fn remove_item(&self, key: &str);
}

/// `window.localStorage`. Every call is best effort: storage can be missing (private
/// mode, non-browser targets) and failures are ignored.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStorage;

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

impl KeyValueStore for BrowserStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        local_storage()?.get_item(key).ok().flatten()
    }

    fn set_item(&self, key: &str, value: &str) {
        if let Some(storage) = local_storage() {
            if storage.set_item(key, value).is_err() {
                tracing::warn!(key, "localStorage write failed");
            }
        }
    }

    fn remove_item(&self, key: &str) {
        if let Some(storage) = local_storage() {
            let _ = storage.remove_item(key);
        }
    }
}

/// Process-local store for tests and non-browser targets.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage(Arc<Mutex<HashMap<String, String>>>);

impl KeyValueStore for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.0.lock().ok()?.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        if let Ok(mut map) = self.0.lock() {
            map.insert(key.to_string(), value.to_string());
        }
    }

    fn remove_item(&self, key: &str) {
        if let Ok(mut map) = self.0.lock() {
            map.remove(key);
        }
    }
}

pub fn load_json<T: for<'de> Deserialize<'de>>(store: &impl KeyValueStore, key: &str) -> Option<T> {
    let json = store.get_item(key)?;
    match serde_json::from_str(&json) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(key, error = %e, "ignoring unreadable stored value");
            None
        }
    }
}

pub fn save_json<T: Serialize>(store: &impl KeyValueStore, key: &str, value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        store.set_item(key, &json);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_roundtrip() {
        let s = MemoryStorage::default();
        assert!(s.get_item("k").is_none());
        s.set_item("k", "v");
        assert_eq!(s.get_item("k").as_deref(), Some("v"));
        s.remove_item("k");
        assert!(s.get_item("k").is_none());
    }

    #[test]
    fn test_load_json_ignores_garbage() {
        let s = MemoryStorage::default();
        s.set_item("n", "not json");
        assert_eq!(load_json::<u32>(&s, "n"), None);
        save_json(&s, "n", &7u32);
        assert_eq!(load_json::<u32>(&s, "n"), Some(7));
    }
}

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_browser_storage_roundtrip() {
        let s = BrowserStorage;
        s.remove_item(TOKEN_KEY);
        assert!(s.get_item(TOKEN_KEY).is_none());
        s.set_item(TOKEN_KEY, "t1");
        assert_eq!(s.get_item(TOKEN_KEY).as_deref(), Some("t1"));
        s.remove_item(TOKEN_KEY);
        assert!(s.get_item(TOKEN_KEY).is_none());
    }
}
