//! # Favourites Store
//!
//! Single source of truth for "is movie X a favourite" and the ordered list
//! of favourites.
//!
//! ```text
//! add / remove / toggle / clear
//!          │
//!          ▼
//!   entries (in memory) ──► storage.set(json)   (write-through)
//!          │
//!          ▼
//!   subscribers notified with the post-change snapshot
//! ```
//!
//! Operations never fail. A storage write that fails is logged and the
//! in-memory change stands. Stored data that cannot be read is never
//! overwritten.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::catalog::Movie;
use crate::core::observer::{SubscriptionId, Subscribers};
use crate::core::storage::{FavouritesStorage, StorageError};

/// A movie the user saved, with the time it was saved.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Favourite {
    #[serde(flatten)]
    pub movie: Movie,
    #[serde(default = "Utc::now")]
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FavouritesChange {
    Added(Movie),
    Removed(u64),
    Cleared,
}

/// Delivered to subscribers after every membership change.
#[derive(Debug, Clone)]
pub struct FavouritesEvent {
    pub change: FavouritesChange,
    /// Favourites after the change, in insertion order.
    pub favourites: Vec<Movie>,
    pub revision: u64,
}

pub struct FavouritesStore {
    entries: Vec<Favourite>,
    storage: Option<Box<dyn FavouritesStorage>>,
    subscribers: Subscribers<FavouritesEvent>,
    revision: u64,
}

impl FavouritesStore {
    /// An empty store with no durable storage.
    pub fn in_memory() -> Self {
        Self {
            entries: Vec::new(),
            storage: None,
            subscribers: Subscribers::new(),
            revision: 0,
        }
    }

    /// Restores favourites from `storage` and writes every later change back to it.
    ///
    /// Missing data starts an empty list. Corrupt data is set aside first so
    /// the next write cannot destroy it. If the data cannot be read, or the
    /// corrupt data cannot be set aside, the store runs in memory only for
    /// this session.
    pub fn load(mut storage: Box<dyn FavouritesStorage>) -> Self {
        let (entries, storage) = match read_entries(storage.as_ref()) {
            Ok(entries) => (entries, Some(storage)),
            Err(StorageError::Corrupt(msg)) => match storage.set_aside() {
                Ok(()) => {
                    warn!("Favourites data was corrupt ({}), set it aside and starting empty", msg);
                    (Vec::new(), Some(storage))
                }
                Err(e) => {
                    warn!(
                        "Favourites data was corrupt ({}) and could not be set aside ({}), changes will not be saved",
                        msg, e
                    );
                    (Vec::new(), None)
                }
            },
            Err(e) => {
                warn!("Could not read favourites ({}), changes will not be saved", e);
                (Vec::new(), None)
            }
        };
        info!("Restored {} favourites", entries.len());
        Self {
            entries,
            storage,
            subscribers: Subscribers::new(),
            revision: 0,
        }
    }

    /// Whether changes are written to durable storage.
    pub fn is_persistent(&self) -> bool {
        self.storage.is_some()
    }

    pub fn is_favourite(&self, movie_id: u64) -> bool {
        self.entries.iter().any(|f| f.movie.id == movie_id)
    }

    /// Adds `movie` unless its id is already present.
    pub fn add(&mut self, movie: Movie) {
        if self.is_favourite(movie.id) {
            debug!("Movie {} already a favourite", movie.id);
            return;
        }
        debug!("Adding favourite {} ({})", movie.id, movie.title);
        self.entries.push(Favourite {
            movie: movie.clone(),
            added_at: Utc::now(),
        });
        self.commit(FavouritesChange::Added(movie));
    }

    /// Removes the movie with `movie_id` if present.
    pub fn remove(&mut self, movie_id: u64) {
        let before = self.entries.len();
        self.entries.retain(|f| f.movie.id != movie_id);
        if self.entries.len() == before {
            return;
        }
        debug!("Removed favourite {}", movie_id);
        self.commit(FavouritesChange::Removed(movie_id));
    }

    /// Flips membership of `movie`. Returns whether it is a favourite afterwards.
    pub fn toggle(&mut self, movie: &Movie) -> bool {
        if self.is_favourite(movie.id) {
            self.remove(movie.id);
            false
        } else {
            self.add(movie.clone());
            true
        }
    }

    pub fn clear(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        self.entries.clear();
        self.commit(FavouritesChange::Cleared);
    }

    /// Favourites in insertion order.
    pub fn list(&self) -> Vec<Movie> {
        self.entries.iter().map(|f| f.movie.clone()).collect()
    }

    pub fn entries(&self) -> &[Favourite] {
        &self.entries
    }

    pub fn get(&self, movie_id: u64) -> Option<&Favourite> {
        self.entries.iter().find(|f| f.movie.id == movie_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Increments on every membership change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&FavouritesEvent) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// Persists then notifies. Both happen before the mutating call returns.
    fn commit(&mut self, change: FavouritesChange) {
        self.revision += 1;
        self.write_through();
        if self.subscribers.is_empty() {
            return;
        }
        let event = FavouritesEvent {
            change,
            favourites: self.list(),
            revision: self.revision,
        };
        self.subscribers.notify(&event);
    }

    fn write_through(&mut self) {
        let Some(storage) = self.storage.as_mut() else {
            return;
        };
        let json = match serde_json::to_string_pretty(&self.entries) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize favourites: {}", e);
                return;
            }
        };
        if let Err(e) = storage.set(&json) {
            warn!("Failed to persist favourites: {}", e);
        }
    }
}

impl Default for FavouritesStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

/// Decodes stored favourites, keeping the first entry for any repeated id.
fn read_entries(storage: &dyn FavouritesStorage) -> Result<Vec<Favourite>, StorageError> {
    let Some(json) = storage.get()? else {
        return Ok(Vec::new());
    };
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }
    let stored: Vec<Favourite> =
        serde_json::from_str(&json).map_err(|e| StorageError::Corrupt(e.to_string()))?;

    let mut seen = HashSet::new();
    let entries: Vec<Favourite> = stored
        .into_iter()
        .filter(|f| seen.insert(f.movie.id))
        .collect();
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::FileStorage;
    use crate::test_support::{MemoryStorage, movie};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// Storage whose writes always fail.
    struct BrokenStorage;

    impl FavouritesStorage for BrokenStorage {
        fn get(&self) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn set(&mut self, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::other("disk full")))
        }

        fn set_aside(&mut self) -> Result<(), StorageError> {
            Ok(())
        }
    }

    /// Storage holding `value` that counts writes and may refuse reads or
    /// refuse to set data aside.
    struct LockedStorage {
        value: Option<String>,
        readable: bool,
        writes: Rc<Cell<usize>>,
    }

    impl FavouritesStorage for LockedStorage {
        fn get(&self) -> Result<Option<String>, StorageError> {
            if self.readable {
                Ok(self.value.clone())
            } else {
                Err(StorageError::Io(std::io::Error::from(
                    std::io::ErrorKind::PermissionDenied,
                )))
            }
        }

        fn set(&mut self, value: &str) -> Result<(), StorageError> {
            self.value = Some(value.to_string());
            self.writes.set(self.writes.get() + 1);
            Ok(())
        }

        fn set_aside(&mut self) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::from(
                std::io::ErrorKind::PermissionDenied,
            )))
        }
    }

    fn ids(store: &FavouritesStore) -> Vec<u64> {
        store.list().iter().map(|m| m.id).collect()
    }

    #[test]
    fn test_add_makes_movie_favourite() {
        let mut store = FavouritesStore::in_memory();
        let m = movie(1, "Alien");
        assert!(!store.is_favourite(1));
        store.add(m.clone());
        assert!(store.is_favourite(1));
        store.add(m.clone());
        store.add(m);
        assert!(store.is_favourite(1));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_repeated_add_keeps_order() {
        let mut store = FavouritesStore::in_memory();
        store.add(movie(1, "A"));
        store.add(movie(2, "B"));
        store.add(movie(1, "A again"));
        assert_eq!(ids(&store), vec![1, 2]);
        assert_eq!(store.list()[0].title, "A");
    }

    #[test]
    fn test_remove_after_add() {
        let mut store = FavouritesStore::in_memory();
        store.add(movie(1, "A"));
        store.remove(1);
        assert!(!store.is_favourite(1));
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let mut store = FavouritesStore::in_memory();
        store.add(movie(1, "A"));
        let revision = store.revision();
        store.remove(99);
        assert_eq!(ids(&store), vec![1]);
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_list_insertion_order_without_duplicates() {
        let mut store = FavouritesStore::in_memory();
        for id in [3, 1, 2, 1, 3] {
            store.add(movie(id, "x"));
        }
        assert_eq!(ids(&store), vec![3, 1, 2]);
    }

    #[test]
    fn test_toggle() {
        let mut store = FavouritesStore::in_memory();
        let m = movie(5, "Heat");
        assert!(store.toggle(&m));
        assert!(store.is_favourite(5));
        assert!(!store.toggle(&m));
        assert!(!store.is_favourite(5));
    }

    #[test]
    fn test_subscribers_see_post_change_state() {
        let mut store = FavouritesStore::in_memory();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        store.subscribe(move |e: &FavouritesEvent| {
            sink.borrow_mut()
                .push((e.change.clone(), e.favourites.iter().map(|m| m.id).collect::<Vec<_>>()));
        });

        store.add(movie(1, "A"));
        store.add(movie(2, "B"));
        store.remove(1);
        store.clear();

        let events = events.borrow();
        assert_eq!(events.len(), 4);
        assert!(matches!(&events[0].0, FavouritesChange::Added(m) if m.id == 1));
        assert_eq!(events[0].1, vec![1]);
        assert_eq!(events[1].1, vec![1, 2]);
        assert_eq!(events[2], (FavouritesChange::Removed(1), vec![2]));
        assert_eq!(events[3], (FavouritesChange::Cleared, vec![]));
    }

    #[test]
    fn test_noop_mutations_do_not_notify() {
        let mut store = FavouritesStore::in_memory();
        let count = Rc::new(RefCell::new(0));
        let c = count.clone();
        store.subscribe(move |_| *c.borrow_mut() += 1);

        store.remove(1);
        store.clear();
        store.add(movie(1, "A"));
        store.add(movie(1, "A"));

        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_unsubscribe() {
        let mut store = FavouritesStore::in_memory();
        let count = Rc::new(RefCell::new(0));
        let c = count.clone();
        let id = store.subscribe(move |_| *c.borrow_mut() += 1);
        store.add(movie(1, "A"));
        assert!(store.unsubscribe(id));
        store.add(movie(2, "B"));
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_write_through_on_every_change() {
        let storage = MemoryStorage::new();
        let mut store = FavouritesStore::load(Box::new(storage.clone()));

        store.add(movie(1, "A"));
        assert_eq!(storage.writes(), 1);
        let saved: Vec<Favourite> = serde_json::from_str(&storage.value().unwrap()).unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].movie.id, 1);

        // No-op does not write
        store.add(movie(1, "A"));
        assert_eq!(storage.writes(), 1);

        store.remove(1);
        assert_eq!(storage.writes(), 2);
        let saved: Vec<Favourite> = serde_json::from_str(&storage.value().unwrap()).unwrap();
        assert!(saved.is_empty());
    }

    #[test]
    fn test_storage_written_before_subscribers_run() {
        let storage = MemoryStorage::new();
        let observer = storage.clone();
        let mut store = FavouritesStore::load(Box::new(storage));
        let persisted_at_notify = Rc::new(RefCell::new(None));
        let p = persisted_at_notify.clone();
        store.subscribe(move |_| *p.borrow_mut() = Some(observer.writes()));

        store.add(movie(1, "A"));
        assert_eq!(*persisted_at_notify.borrow(), Some(1));
    }

    #[test]
    fn test_reload_restores_order() {
        let storage = MemoryStorage::new();
        {
            let mut store = FavouritesStore::load(Box::new(storage.clone()));
            store.add(movie(2, "B"));
            store.add(movie(1, "A"));
        }
        let store = FavouritesStore::load(Box::new(storage));
        assert_eq!(ids(&store), vec![2, 1]);
    }

    #[test]
    fn test_load_drops_duplicate_ids() {
        let json = r#"[
            {"id":1,"title":"A","added_at":"2024-01-01T00:00:00Z"},
            {"id":1,"title":"A dup","added_at":"2024-01-02T00:00:00Z"},
            {"id":2,"title":"B"}
        ]"#;
        let store = FavouritesStore::load(Box::new(MemoryStorage::with_value(json)));
        assert_eq!(ids(&store), vec![1, 2]);
        assert_eq!(store.get(1).unwrap().movie.title, "A");
    }

    #[test]
    fn test_load_corrupt_data_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favourites.json");
        let truncated = r#"[{"id":1,"title":"A"},{"id":2,"title":"B"}"#;
        std::fs::write(&path, truncated).unwrap();

        let mut store = FavouritesStore::load(Box::new(FileStorage::new(&path)));
        assert!(store.is_empty());
        assert!(store.is_persistent());
        store.add(movie(3, "C"));

        let saved: Vec<Favourite> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved.len(), 1);
        let backup = std::fs::read_to_string(dir.path().join("favourites.json.bak")).unwrap();
        assert_eq!(backup, truncated);
    }

    #[test]
    fn test_load_corrupt_memory_data_is_set_aside() {
        let storage = MemoryStorage::with_value("{not json");
        let mut store = FavouritesStore::load(Box::new(storage.clone()));
        store.add(movie(3, "C"));
        assert_eq!(storage.backup().as_deref(), Some("{not json"));
    }

    #[test]
    fn test_unreadable_storage_is_never_written() {
        let writes = Rc::new(Cell::new(0));
        let storage = LockedStorage {
            value: Some("[]".into()),
            readable: false,
            writes: writes.clone(),
        };
        let mut store = FavouritesStore::load(Box::new(storage));
        assert!(!store.is_persistent());

        store.add(movie(1, "A"));
        assert!(store.is_favourite(1));
        assert_eq!(writes.get(), 0);
    }

    #[test]
    fn test_corrupt_data_that_cannot_be_set_aside_is_never_written() {
        let writes = Rc::new(Cell::new(0));
        let storage = LockedStorage {
            value: Some("{bad".into()),
            readable: true,
            writes: writes.clone(),
        };
        let mut store = FavouritesStore::load(Box::new(storage));
        store.add(movie(1, "A"));
        assert!(!store.is_persistent());
        assert_eq!(writes.get(), 0);
    }

    #[test]
    fn test_failed_write_keeps_in_memory_change() {
        let mut store = FavouritesStore::load(Box::new(BrokenStorage));
        store.add(movie(1, "A"));
        assert!(store.is_favourite(1));
    }

    #[test]
    fn test_file_backed_store_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favourites.json");
        {
            let mut store = FavouritesStore::load(Box::new(FileStorage::new(&path)));
            store.add(movie(10, "Ten"));
        }
        let store = FavouritesStore::load(Box::new(FileStorage::new(&path)));
        assert!(store.is_favourite(10));
    }
}
