use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{Result, StorageBackend, StorageError};

/// JSON-encoded values over a string backend.
///
/// Reads are forgiving: a missing, unreadable or malformed entry yields the
/// caller's default. Writes report failures. Writing `None` deletes the entry
/// rather than storing a placeholder.
#[derive(Clone)]
pub struct KeyedStorage<B = Rc<dyn StorageBackend>> {
    backend: B,
    namespace: Option<String>,
}

impl<B: StorageBackend> KeyedStorage<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            namespace: None,
        }
    }

    /// Prefix every key with `namespace:`.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn full_key(&self, key: &str) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}:{key}"),
            None => key.to_string(),
        }
    }

    /// The stored value, or `default` when absent or undecodable.
    pub fn read<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.try_read(key) {
            Ok(Some(v)) => v,
            Ok(None) => default,
            Err(e) => {
                log::warn!("{e}; using default");
                default
            }
        }
    }

    pub fn try_read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let key = self.full_key(key);
        let Some(raw) = self.backend.get(&key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StorageError::Decode { key, source })
    }

    pub fn write<T: Serialize + ?Sized>(&self, key: &str, value: Option<&T>) -> Result<()> {
        let Some(value) = value else {
            return self.remove(key);
        };
        let key = self.full_key(key);
        let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
            key: key.clone(),
            source,
        })?;
        log::debug!("storage: write '{key}' ({} bytes)", raw.len());
        self.backend.set(&key, &raw)
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let key = self.full_key(key);
        log::debug!("storage: remove '{key}'");
        self.backend.remove(&key)
    }

    pub fn contains(&self, key: &str) -> bool {
        matches!(self.backend.get(&self.full_key(key)), Ok(Some(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SessionStorage;
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Draft {
        title: String,
        tags: Vec<String>,
        due: Option<u32>,
    }

    #[test]
    fn round_trips_json_values() {
        let store = KeyedStorage::new(SessionStorage::new());
        let draft = Draft {
            title: "Groceries".into(),
            tags: vec!["home".into()],
            due: None,
        };
        store.write("draft", Some(&draft)).unwrap();
        assert_eq!(store.read("draft", None::<Draft>), Some(draft));

        let value = json!({"a": [1, 2.5, null, "x"], "b": {"nested": true}});
        store.write("raw", Some(&value)).unwrap();
        assert_eq!(store.read("raw", serde_json::Value::Null), value);

        store.write("n", Some(&-7i64)).unwrap();
        assert_eq!(store.read("n", 0i64), -7);

        let mut map = BTreeMap::new();
        map.insert("k".to_string(), vec![1u8, 2]);
        store.write("map", Some(&map)).unwrap();
        assert_eq!(store.read("map", BTreeMap::new()), map);
    }

    #[test]
    fn writing_none_deletes_the_entry() {
        let backend = SessionStorage::new();
        let store = KeyedStorage::new(backend.clone());
        store.write("count", Some(&3)).unwrap();
        assert!(store.contains("count"));

        store.write::<i32>("count", None).unwrap();
        assert_eq!(store.read("count", 10), 10);
        assert_eq!(backend.get("count").unwrap(), None);
        assert!(backend.is_empty());
    }

    #[test]
    fn malformed_entry_falls_back_to_default() {
        let backend = SessionStorage::new();
        backend.set("prefs", "{\"dark\": tru").unwrap();
        let store = KeyedStorage::new(backend);

        assert_eq!(store.read("prefs", 42), 42);
        assert!(matches!(
            store.try_read::<i32>("prefs"),
            Err(StorageError::Decode { .. })
        ));
    }

    #[test]
    fn wrong_shape_falls_back_to_default() {
        let store = KeyedStorage::new(SessionStorage::new());
        store.write("list", Some(&vec![1, 2, 3])).unwrap();
        assert_eq!(store.read("list", String::from("fallback")), "fallback");
    }

    #[test]
    fn namespaces_isolate_keys() {
        let backend = SessionStorage::new();
        let a = KeyedStorage::new(backend.clone()).with_namespace("a");
        let b = KeyedStorage::new(backend.clone()).with_namespace("b");
        a.write("x", Some("one")).unwrap();
        b.write("x", Some("two")).unwrap();

        assert_eq!(a.read("x", String::new()), "one");
        assert_eq!(b.read("x", String::new()), "two");
        assert_eq!(backend.keys().unwrap(), vec!["a:x", "b:x"]);
    }

    #[test]
    fn boxed_backend_is_the_default() {
        let backend: Rc<dyn StorageBackend> = Rc::new(SessionStorage::new());
        let store: KeyedStorage = KeyedStorage::new(backend);
        store.write("flag", Some(&true)).unwrap();
        assert!(store.read("flag", false));
    }
}
