//! Shared test helpers

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use archive_core::{
    ItemDraft, ItemKind, KeyValueStore, ManualClock, MemoryStorage, NotificationQueue,
    PersistenceError, ResearchStore,
};
use chrono::{TimeZone, Utc};

/// Storage whose writes can be made to fail on demand.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct FlakyStorage {
    inner: MemoryStorage,
    fail_writes: AtomicBool,
}

impl FlakyStorage {
    #[allow(dead_code)]
    pub fn set_failing(&self, failing: bool) {
        self.fail_writes.store(failing, Ordering::SeqCst);
    }

    fn check(&self, key: &str) -> Result<(), PersistenceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PersistenceError::Io {
                key: key.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "quota exceeded"),
            });
        }
        Ok(())
    }
}

impl KeyValueStore for FlakyStorage {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.check(key)?;
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        self.check(key)?;
        self.inner.remove(key)
    }
}

pub fn fixed_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 9, 1, 10, 0, 0).unwrap(),
    ))
}

#[allow(dead_code)]
/// A store over `storage`, loaded with the sample dataset if it is empty.
pub fn seeded_store(storage: Arc<dyn KeyValueStore>, clock: Arc<ManualClock>) -> ResearchStore {
    let queue = NotificationQueue::new(clock.clone());
    ResearchStore::open(storage, clock, queue)
}

/// A store with nothing in it.
#[allow(dead_code)]
pub fn empty_store(storage: Arc<dyn KeyValueStore>, clock: Arc<ManualClock>) -> ResearchStore {
    let queue = NotificationQueue::new(clock.clone());
    let mut store = ResearchStore::new(storage, clock, queue).with_sample_seeding(false);
    store.load();
    store
}

#[allow(dead_code)]
pub fn paper(title: &str, category: &str) -> ItemDraft {
    ItemDraft::new(ItemKind::Paper, title, category, "https://example.com/paper.pdf")
        .with_tags(["Research"])
}
