use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tack_core::{Signal, SubId, remember_with_key};

use crate::{KeyedStorage, StorageBackend};

/// A state cell mirrored into a storage key.
///
/// Created from whatever the backend holds (or the default), then every write
/// to [`StoredState::signal`] is persisted: `Some` serializes, `None` deletes
/// the entry. Persistence failures are logged, never raised into the UI.
pub struct StoredState<T: 'static> {
    value: Signal<Option<T>>,
    storage: KeyedStorage,
    key: String,
    sub: SubId,
}

impl<T> StoredState<T>
where
    T: Serialize + DeserializeOwned + Clone + 'static,
{
    pub fn new(backend: Rc<dyn StorageBackend>, key: impl Into<String>, default: Option<T>) -> Self {
        let key = key.into();
        let storage = KeyedStorage::new(backend);
        let initial = storage.read(&key, default);
        let value = Signal::new(initial);

        let sub = value.subscribe({
            let storage = storage.clone();
            let key = key.clone();
            move |v: &Option<T>| {
                if let Err(e) = storage.write(&key, v.as_ref()) {
                    log::warn!("failed to persist '{key}': {e}");
                }
            }
        });

        Self {
            value,
            storage,
            key,
            sub,
        }
    }

    pub fn get(&self) -> Option<T> {
        self.value.get()
    }

    pub fn get_or(&self, fallback: T) -> T {
        self.value.get().unwrap_or(fallback)
    }

    pub fn set(&self, value: Option<T>) {
        self.value.set(value);
    }

    /// Same as `set(None)`: the backend entry is deleted.
    pub fn clear(&self) {
        self.value.set(None);
    }

    pub fn update(&self, f: impl FnOnce(&mut Option<T>)) {
        self.value.update(f);
    }

    /// The live cell. Writes through clones are persisted too.
    pub fn signal(&self) -> &Signal<Option<T>> {
        &self.value
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether the backend currently holds an entry for this key.
    pub fn is_persisted(&self) -> bool {
        self.storage.contains(&self.key)
    }
}

impl<T: 'static> Drop for StoredState<T> {
    fn drop(&mut self) {
        self.value.unsubscribe(self.sub);
    }
}

/// Remembered [`StoredState`], one per storage key in the current composition.
pub fn remember_stored<T>(
    backend: Rc<dyn StorageBackend>,
    key: impl Into<String>,
    default: Option<T>,
) -> Rc<StoredState<T>>
where
    T: Serialize + DeserializeOwned + Clone + 'static,
{
    let key = key.into();
    remember_with_key(format!("stored:{key}"), move || {
        StoredState::new(backend, key, default)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LocalStorage, LocalStorageConfig, SessionStorage};
    use tack_core::Composition;

    #[test]
    fn starts_from_stored_value_or_default() {
        let session = SessionStorage::new();
        session.set("volume", "7").unwrap();
        let backend: Rc<dyn StorageBackend> = Rc::new(session);

        let volume = StoredState::new(backend.clone(), "volume", Some(3));
        assert_eq!(volume.get(), Some(7));

        let missing = StoredState::new(backend.clone(), "balance", Some(0));
        assert_eq!(missing.get(), Some(0));
        // Nothing is written until the value changes.
        assert!(!missing.is_persisted());
    }

    #[test]
    fn changes_persist_and_none_removes() {
        let session = SessionStorage::new();
        let backend: Rc<dyn StorageBackend> = Rc::new(session.clone());
        let name = StoredState::new(backend, "name", None::<String>);

        name.set(Some("Ada".into()));
        assert_eq!(session.get("name").unwrap().as_deref(), Some("\"Ada\""));

        name.signal().clone().set(Some("Grace".into()));
        assert_eq!(session.get("name").unwrap().as_deref(), Some("\"Grace\""));

        name.clear();
        assert_eq!(name.get(), None);
        assert_eq!(session.get("name").unwrap(), None);
        assert_eq!(name.get_or("anon".into()), "anon");
    }

    #[test]
    fn malformed_entry_uses_default() {
        let session = SessionStorage::new();
        session.set("cart", "[1, 2,").unwrap();
        let cart = StoredState::new(Rc::new(session), "cart", Some(Vec::<u32>::new()));
        assert_eq!(cart.get(), Some(vec![]));
        cart.update(|c| c.get_or_insert_with(Vec::new).push(4));
        assert!(cart.is_persisted());
    }

    #[test]
    fn dropping_stops_persisting() {
        let session = SessionStorage::new();
        let stored = StoredState::new(Rc::new(session.clone()), "n", Some(1));
        let cell = stored.signal().clone();
        drop(stored);
        cell.set(Some(2));
        assert_eq!(session.get("n").unwrap(), None);
        assert_eq!(cell.subscriber_count(), 0);
    }

    #[test]
    fn durable_state_survives_a_new_session() {
        let dir = tempfile::tempdir().unwrap();
        let config = LocalStorageConfig::in_dir(dir.path());

        {
            let backend: Rc<dyn StorageBackend> = Rc::new(LocalStorage::open(&config));
            let theme = StoredState::new(backend, "theme", Some("light".to_string()));
            theme.set(Some("dark".into()));
        }

        let backend: Rc<dyn StorageBackend> = Rc::new(LocalStorage::open(&config));
        let theme = StoredState::new(backend, "theme", Some("light".to_string()));
        assert_eq!(theme.get().as_deref(), Some("dark"));
    }

    #[test]
    fn remembered_per_key_across_passes() {
        let backend: Rc<dyn StorageBackend> = Rc::new(SessionStorage::new());
        let comp = Composition::new();
        let first = comp.compose(|| remember_stored(backend.clone(), "tab", Some(0u8)));
        first.set(Some(2));
        let second = comp.compose(|| remember_stored(backend.clone(), "tab", Some(0u8)));
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(second.get(), Some(2));
    }
}
