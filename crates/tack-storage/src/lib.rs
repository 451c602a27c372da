//! # Keyed storage
//!
//! Persist small pieces of UI state under string keys, JSON-encoded with
//! `serde_json`, in one of two backends:
//!
//! - [`SessionStorage`]: in memory, gone when the process exits.
//! - [`LocalStorage`]: a JSON document on disk that survives restarts.
//!
//! [`KeyedStorage`] is the read/write/remove layer; [`StoredState`] keeps a
//! `Signal` and a key in sync.
//!
//! ```rust
//! use std::rc::Rc;
//! use tack_storage::*;
//!
//! let session = SessionStorage::new();
//! let store = KeyedStorage::new(session.clone());
//!
//! store.write("filters", Some(&vec!["open", "mine"])).unwrap();
//! let filters: Vec<String> = store.read("filters", Vec::new());
//! assert_eq!(filters, ["open", "mine"]);
//!
//! store.write::<Vec<String>>("filters", None).unwrap();
//! assert!(session.is_empty());
//!
//! let page = StoredState::new(Rc::new(session.clone()), "page", Some(1u32));
//! page.set(Some(4));
//! assert_eq!(session.get("page").unwrap().as_deref(), Some("4"));
//! ```

mod backend;
mod error;
mod keyed;
mod local;
mod stored;

pub use backend::{SessionStorage, StorageBackend};
pub use error::{Result, StorageError};
pub use keyed::KeyedStorage;
pub use local::{LocalStorage, LocalStorageConfig, STORAGE_DIR_ENV};
pub use stored::{StoredState, remember_stored};
