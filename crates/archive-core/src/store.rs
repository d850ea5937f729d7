use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{ArchiveError, Result};
use crate::export::Export;
use crate::item::{ItemDraft, ItemId, ItemRecord, ResearchItem};
use crate::notification::NotificationQueue;
use crate::persistence::{get_json, keys, set_json, KeyValueStore};
use crate::sample::sample_items;

/// Where the collection came from at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// A stored collection was read.
    Stored,
    /// Nothing was stored; the sample dataset was seeded.
    Seeded,
    /// Nothing was stored and seeding is disabled.
    Empty,
    /// Storage could not be read or decoded; started empty.
    Fallback,
}

/// Outcome of an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Items actually added to the collection.
    pub added: usize,
    /// Records skipped because their id already exists.
    pub duplicates: usize,
    /// Records skipped because they lack required fields.
    pub rejected: usize,
}

impl ImportSummary {
    pub fn message(&self) -> String {
        let mut msg = format!("Imported {} items", self.added);
        if self.duplicates > 0 {
            msg.push_str(&format!(", skipped {} duplicates", self.duplicates));
        }
        if self.rejected > 0 {
            msg.push_str(&format!(", rejected {} invalid records", self.rejected));
        }
        msg
    }
}

/// Monotonic millisecond ids with a short random suffix.
#[derive(Debug, Default)]
struct IdGenerator {
    last_millis: i64,
}

impl IdGenerator {
    fn next(&mut self, now: DateTime<Utc>) -> ItemId {
        let millis = now.timestamp_millis().max(self.last_millis + 1);
        self.last_millis = millis;
        let suffix = Uuid::new_v4().simple().to_string();
        format!("{}-{}", millis, &suffix[..4])
    }

    fn unique(&mut self, now: DateTime<Utc>, taken: impl Fn(&str) -> bool) -> ItemId {
        loop {
            let id = self.next(now);
            if !taken(&id) {
                return id;
            }
        }
    }
}

/// The canonical, ordered collection of research items.
///
/// Newest items come first. Every state change is written through to the
/// key-value store under `researchItems` and reported on the notification
/// queue; operations on absent ids (other than update) are silent no-ops.
pub struct ResearchStore {
    items: Vec<ResearchItem>,
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    notifications: NotificationQueue,
    ids: IdGenerator,
    seed_sample_data: bool,
}

impl ResearchStore {
    /// An empty, unloaded store.
    pub fn new(
        storage: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        notifications: NotificationQueue,
    ) -> Self {
        Self {
            items: Vec::new(),
            storage,
            clock,
            notifications,
            ids: IdGenerator::default(),
            seed_sample_data: true,
        }
    }

    /// Whether `load` seeds the sample dataset into empty storage.
    pub fn with_sample_seeding(mut self, seed: bool) -> Self {
        self.seed_sample_data = seed;
        self
    }

    /// Create a store and load its collection.
    pub fn open(
        storage: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        notifications: NotificationQueue,
    ) -> Self {
        let mut store = Self::new(storage, clock, notifications);
        store.load();
        store
    }

    /// Read the persisted collection, seeding or falling back as needed.
    ///
    /// Never fails: unreadable or undecodable storage yields an empty
    /// collection and leaves the stored payload untouched.
    pub fn load(&mut self) -> LoadSource {
        match get_json::<Vec<ResearchItem>>(self.storage.as_ref(), keys::RESEARCH_ITEMS) {
            Ok(Some(items)) => {
                self.items = dedup_by_id(items);
                tracing::info!("Loaded {} research items", self.items.len());
                LoadSource::Stored
            }
            Ok(None) if self.seed_sample_data => {
                self.items = sample_items(self.clock.now());
                tracing::info!("No stored collection, seeded {} sample items", self.items.len());
                if let Err(e) = set_json(self.storage.as_ref(), keys::RESEARCH_ITEMS, &self.items) {
                    tracing::warn!("Failed to persist sample data: {}", e);
                    self.notifications
                        .error(format!("Failed to save sample data: {}", e));
                }
                LoadSource::Seeded
            }
            Ok(None) => {
                self.items.clear();
                LoadSource::Empty
            }
            Err(e) => {
                tracing::warn!("Failed to load research items, starting empty: {}", e);
                self.items.clear();
                LoadSource::Fallback
            }
        }
    }

    pub fn items(&self) -> &[ResearchItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&ResearchItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|i| i.id == id)
    }

    /// Write the collection through to storage and report the outcome.
    fn commit(&self, success: Option<String>, failure: &str) -> Result<()> {
        match set_json(self.storage.as_ref(), keys::RESEARCH_ITEMS, &self.items) {
            Ok(()) => {
                tracing::debug!("Saved {} research items", self.items.len());
                if let Some(message) = success {
                    self.notifications.success(message);
                }
                Ok(())
            }
            Err(e) => {
                tracing::warn!("{}: {}", failure, e);
                self.notifications.error(format!("{}: {}", failure, e));
                Err(ArchiveError::Persistence(e))
            }
        }
    }

    /// Validate a draft and add it at the front of the collection.
    pub fn create(&mut self, draft: ItemDraft) -> Result<ResearchItem> {
        draft.validate()?;
        let now = self.clock.now();
        let item = {
            let items = &self.items;
            let ids = &mut self.ids;
            ItemRecord::from(draft).normalize(
                || ids.unique(now, |id| items.iter().any(|i| i.id == id)),
                now,
            )?
        };
        self.items.insert(0, item.clone());
        tracing::debug!("Created item {}", item.id);
        self.commit(
            Some(format!("Added \"{}\"", item.title)),
            "Failed to save new item",
        )?;
        Ok(item)
    }

    /// Replace the editable fields of an existing item.
    ///
    /// `id`, `createdAt`, `viewCount`, and `lastViewed` always come from the
    /// stored record; `draft.view_count` is ignored. Flags left unspecified
    /// in the draft keep their values.
    pub fn update(&mut self, id: &str, draft: ItemDraft) -> Result<ResearchItem> {
        let index = self
            .position(id)
            .ok_or_else(|| ArchiveError::NotFound(id.to_string()))?;
        draft.validate()?;

        let existing = &self.items[index];
        let mut record = ItemRecord::from(draft);
        record.id = Some(existing.id.clone());
        record.created_at = Some(existing.created_at);
        record.view_count = Some(existing.view_count);
        record.last_viewed = existing.last_viewed;
        record.favorite = record.favorite.or(Some(existing.favorite));
        record.featured = record.featured.or(Some(existing.featured));

        let existing_id = existing.id.clone();
        let updated = record.normalize(|| existing_id, self.clock.now())?;
        self.items[index] = updated.clone();
        self.commit(
            Some(format!("Updated \"{}\"", updated.title)),
            "Failed to save changes",
        )?;
        Ok(updated)
    }

    /// Remove an item. Returns whether anything was removed.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let Some(index) = self.position(id) else {
            return Ok(false);
        };
        let removed = self.items.remove(index);
        tracing::debug!("Deleted item {}", removed.id);
        self.commit(
            Some(format!("Deleted \"{}\"", removed.title)),
            "Failed to save deletion",
        )?;
        Ok(true)
    }

    /// Flip the favorite flag. Returns the new value, or `None` if absent.
    pub fn toggle_favorite(&mut self, id: &str) -> Result<Option<bool>> {
        let Some(index) = self.position(id) else {
            return Ok(None);
        };
        let item = &mut self.items[index];
        item.favorite = !item.favorite;
        let now_favorite = item.favorite;
        let message = if now_favorite {
            "Added to favorites"
        } else {
            "Removed from favorites"
        };
        self.commit(Some(message.to_string()), "Failed to save favorite")?;
        Ok(Some(now_favorite))
    }

    /// Flip the featured flag. Returns the new value, or `None` if absent.
    pub fn toggle_featured(&mut self, id: &str) -> Result<Option<bool>> {
        let Some(index) = self.position(id) else {
            return Ok(None);
        };
        let item = &mut self.items[index];
        item.featured = !item.featured;
        let now_featured = item.featured;
        let message = if now_featured {
            "Marked as featured"
        } else {
            "Removed from featured"
        };
        self.commit(Some(message.to_string()), "Failed to save featured state")?;
        Ok(Some(now_featured))
    }

    /// Count one view and stamp `lastViewed`. Returns the new count.
    ///
    /// Only failures are reported on the notification queue.
    pub fn increment_view_count(&mut self, id: &str) -> Result<Option<u64>> {
        let Some(index) = self.position(id) else {
            return Ok(None);
        };
        let now = self.clock.now();
        let item = &mut self.items[index];
        item.view_count += 1;
        item.last_viewed = Some(now);
        let count = item.view_count;
        self.commit(None, "Failed to save view count")?;
        Ok(Some(count))
    }

    /// Add records from an import payload. Never overwrites existing items.
    ///
    /// `data` must be a JSON array of objects; anything else fails without
    /// touching the collection. Records whose id is already present are
    /// skipped as duplicates, records missing required fields are rejected,
    /// and the rest are normalized and prepended in batch order.
    pub fn import_items(&mut self, data: &serde_json::Value) -> Result<ImportSummary> {
        let records = data.as_array().ok_or_else(|| {
            ArchiveError::ImportFormat("expected a JSON array of items".to_string())
        })?;
        if let Some(pos) = records.iter().position(|r| !r.is_object()) {
            return Err(ArchiveError::ImportFormat(format!(
                "record {} is not an object",
                pos
            )));
        }

        let now = self.clock.now();
        let mut taken: HashSet<ItemId> = self.items.iter().map(|i| i.id.clone()).collect();
        let mut accepted = Vec::new();
        let mut summary = ImportSummary::default();

        for (pos, raw) in records.iter().enumerate() {
            let record: ItemRecord = match serde_json::from_value(raw.clone()) {
                Ok(r) => r,
                Err(e) => {
                    tracing::debug!("Rejected import record {}: {}", pos, e);
                    summary.rejected += 1;
                    continue;
                }
            };
            if record.id.as_ref().is_some_and(|id| taken.contains(id)) {
                summary.duplicates += 1;
                continue;
            }

            let ids = &mut self.ids;
            let taken_ref = &taken;
            match record.normalize(|| ids.unique(now, |id| taken_ref.contains(id)), now) {
                Ok(item) => {
                    taken.insert(item.id.clone());
                    accepted.push(item);
                }
                Err(e) => {
                    tracing::debug!("Rejected import record {}: {}", pos, e);
                    summary.rejected += 1;
                }
            }
        }

        summary.added = accepted.len();
        tracing::info!(
            "Import: {} added, {} duplicates, {} rejected",
            summary.added,
            summary.duplicates,
            summary.rejected
        );

        if summary.added == 0 {
            if summary.rejected > 0 {
                self.notifications.error(summary.message());
            } else {
                self.notifications.success(summary.message());
            }
            return Ok(summary);
        }

        accepted.append(&mut self.items);
        self.items = accepted;
        self.commit(Some(summary.message()), "Failed to save imported items")?;
        Ok(summary)
    }

    /// Select items for export. An empty `ids` selects everything.
    pub fn export_items(&self, ids: &[ItemId]) -> Export {
        if ids.is_empty() {
            return Export::new(self.items.clone());
        }
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        Export::new(
            self.items
                .iter()
                .filter(|i| wanted.contains(i.id.as_str()))
                .cloned()
                .collect(),
        )
    }

    /// Remove every item.
    pub fn clear(&mut self) -> Result<()> {
        self.items.clear();
        self.commit(Some("Archive cleared".to_string()), "Failed to clear archive")
    }
}

impl std::fmt::Debug for ResearchStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResearchStore")
            .field("items", &self.items.len())
            .field("seed_sample_data", &self.seed_sample_data)
            .finish()
    }
}

/// Keep the first occurrence of each id.
fn dedup_by_id(items: Vec<ResearchItem>) -> Vec<ResearchItem> {
    let mut seen = HashSet::new();
    let before = items.len();
    let unique: Vec<ResearchItem> = items
        .into_iter()
        .filter(|i| seen.insert(i.id.clone()))
        .collect();
    if unique.len() != before {
        tracing::warn!(
            "Dropped {} stored items with duplicate ids",
            before - unique.len()
        );
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::item::ItemKind;
    use crate::notification::NotificationKind;
    use crate::persistence::MemoryStorage;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn setup() -> (Arc<MemoryStorage>, Arc<ManualClock>, ResearchStore) {
        let storage = Arc::new(MemoryStorage::new());
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 4, 1, 8, 0, 0).unwrap(),
        ));
        let queue = NotificationQueue::new(clock.clone());
        let store = ResearchStore::new(storage.clone(), clock.clone(), queue)
            .with_sample_seeding(false);
        (storage, clock, store)
    }

    fn draft(title: &str) -> ItemDraft {
        ItemDraft::new(ItemKind::Paper, title, "Technology", "https://example.com")
            .with_tags(["AI"])
    }

    fn stored_ids(storage: &MemoryStorage) -> Vec<String> {
        let items: Vec<ResearchItem> = get_json(storage, keys::RESEARCH_ITEMS).unwrap().unwrap();
        items.into_iter().map(|i| i.id).collect()
    }

    #[test]
    fn id_generator_is_monotonic_within_one_millisecond() {
        let mut ids = IdGenerator::default();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let a = ids.next(now);
        let b = ids.next(now);
        let millis = |id: &str| id.split('-').next().unwrap().parse::<i64>().unwrap();
        assert!(millis(&b) > millis(&a));
    }

    #[test]
    fn create_prepends_and_persists() {
        let (storage, _clock, mut store) = setup();
        let first = store.create(draft("First")).unwrap();
        let second = store.create(draft("Second")).unwrap();

        assert_eq!(store.items()[0].id, second.id);
        assert_eq!(store.items()[1].id, first.id);
        assert_eq!(stored_ids(&storage), vec![second.id, first.id]);
    }

    #[test]
    fn create_zeroes_counters_unless_given() {
        let (_storage, _clock, mut store) = setup();
        let item = store.create(draft("Plain")).unwrap();
        assert_eq!(item.view_count, 0);
        assert!(!item.favorite && !item.featured);

        let mut flagged = draft("Flagged");
        flagged.favorite = Some(true);
        flagged.view_count = Some(4);
        let item = store.create(flagged).unwrap();
        assert!(item.favorite);
        assert_eq!(item.view_count, 4);
    }

    #[test]
    fn create_rejects_invalid_draft_without_side_effects() {
        let (storage, _clock, mut store) = setup();
        let bad = ItemDraft::new(ItemKind::Video, "", "Science", "");
        match store.create(bad) {
            Err(ArchiveError::Validation(e)) => {
                assert_eq!(e.fields, vec!["title", "tags", "url"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(store.is_empty());
        assert_eq!(storage.get(keys::RESEARCH_ITEMS).unwrap(), None);
    }

    #[test]
    fn update_preserves_identity_fields() {
        let (_storage, clock, mut store) = setup();
        let original = store.create(draft("Before")).unwrap();
        store.increment_view_count(&original.id).unwrap();
        clock.advance(Duration::days(3));

        let changed = ItemDraft::new(ItemKind::Video, "After", "Science", "https://v")
            .with_tags(["Physics"]);
        let updated = store.update(&original.id, changed).unwrap();

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.view_count, 1);
        assert_eq!(updated.kind, ItemKind::Video);
        assert_eq!(updated.title, "After");
        assert_eq!(store.get(&original.id), Some(&updated));
    }

    #[test]
    fn update_missing_id_is_not_found() {
        let (_storage, _clock, mut store) = setup();
        assert!(matches!(
            store.update("nope", draft("X")),
            Err(ArchiveError::NotFound(id)) if id == "nope"
        ));
    }

    #[test]
    fn update_keeps_flags_the_draft_leaves_unset() {
        let (_storage, _clock, mut store) = setup();
        let item = store.create(draft("Flagged")).unwrap();
        store.toggle_favorite(&item.id).unwrap();
        store.toggle_featured(&item.id).unwrap();

        let edit = draft("Renamed");
        assert_eq!((edit.favorite, edit.featured), (None, None));
        let updated = store.update(&item.id, edit).unwrap();
        assert!(updated.favorite);
        assert!(updated.featured);
        assert_eq!(updated.title, "Renamed");

        let mut cleared = draft("Renamed again");
        cleared.favorite = Some(false);
        let updated = store.update(&item.id, cleared).unwrap();
        assert!(!updated.favorite);
        assert!(updated.featured);
    }

    #[test]
    fn update_ignores_draft_view_count() {
        let (_storage, _clock, mut store) = setup();
        let item = store.create(draft("Counted")).unwrap();
        store.increment_view_count(&item.id).unwrap();
        store.increment_view_count(&item.id).unwrap();

        let mut edit = draft("Counted");
        edit.view_count = Some(0);
        assert_eq!(store.update(&item.id, edit).unwrap().view_count, 2);
    }

    #[test]
    fn update_rejects_invalid_draft_without_side_effects() {
        let (storage, _clock, mut store) = setup();
        let item = store.create(draft("Keep me")).unwrap();
        let before_payload = storage.get(keys::RESEARCH_ITEMS).unwrap();
        let before_notices = store.notifications().len();

        let blank = ItemDraft::new(ItemKind::Paper, "   ", "Technology", "https://example.com")
            .with_tags(["AI"]);
        match store.update(&item.id, blank) {
            Err(ArchiveError::Validation(e)) => assert_eq!(e.fields, vec!["title"]),
            other => panic!("expected validation error, got {:?}", other),
        }

        assert_eq!(store.get(&item.id), Some(&item));
        assert_eq!(storage.get(keys::RESEARCH_ITEMS).unwrap(), before_payload);
        assert_eq!(store.notifications().len(), before_notices);
    }

    #[test]
    fn absent_ids_are_silent_noops() {
        let (storage, _clock, mut store) = setup();
        assert!(!store.delete("ghost").unwrap());
        assert_eq!(store.toggle_favorite("ghost").unwrap(), None);
        assert_eq!(store.toggle_featured("ghost").unwrap(), None);
        assert_eq!(store.increment_view_count("ghost").unwrap(), None);
        assert_eq!(storage.get(keys::RESEARCH_ITEMS).unwrap(), None);
        assert!(store.notifications().is_empty());
    }

    #[test]
    fn toggles_flip_flags_and_notify() {
        let (_storage, _clock, mut store) = setup();
        let item = store.create(draft("Flags")).unwrap();
        assert_eq!(store.toggle_favorite(&item.id).unwrap(), Some(true));
        assert_eq!(store.toggle_favorite(&item.id).unwrap(), Some(false));
        assert_eq!(store.toggle_featured(&item.id).unwrap(), Some(true));

        let messages: Vec<String> = store
            .notifications()
            .active()
            .into_iter()
            .map(|n| n.message)
            .collect();
        assert!(messages.contains(&"Added to favorites".to_string()));
        assert!(messages.contains(&"Removed from favorites".to_string()));
        assert!(messages.contains(&"Marked as featured".to_string()));
    }

    #[test]
    fn view_count_increments_by_one_and_stamps_time() {
        let (_storage, clock, mut store) = setup();
        let item = store.create(draft("Viewed")).unwrap();
        for _ in 0..3 {
            clock.advance(Duration::minutes(1));
            store.increment_view_count(&item.id).unwrap();
        }
        let stored = store.get(&item.id).unwrap();
        assert_eq!(stored.view_count, 3);
        assert_eq!(stored.last_viewed, Some(clock.now()));
    }

    #[test]
    fn import_rejects_non_array_payloads() {
        let (_storage, _clock, mut store) = setup();
        assert!(matches!(
            store.import_items(&json!({"id": "1"})),
            Err(ArchiveError::ImportFormat(_))
        ));
        assert!(matches!(
            store.import_items(&json!([{"title": "ok"}, 3])),
            Err(ArchiveError::ImportFormat(_))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn import_skips_existing_ids_and_fills_defaults() {
        let (_storage, _clock, mut store) = setup();
        let existing = store.create(draft("Mine")).unwrap();

        let payload = json!([
            {"id": existing.id, "type": "paper", "title": "Clobber", "category": "X", "url": "u"},
            {"type": "image", "title": "Fresh", "category": "Art", "url": "u2", "tags": ["viz"]},
            {"id": "abc", "type": "video", "title": "Kept id", "category": "Science", "url": "u3"},
            {"id": "abc", "type": "video", "title": "Same batch dup", "category": "Science", "url": "u4"},
            {"type": "podcast", "title": "Bad type", "category": "X", "url": "u5"},
        ]);
        let summary = store.import_items(&payload).unwrap();
        assert_eq!(
            summary,
            ImportSummary {
                added: 2,
                duplicates: 2,
                rejected: 1
            }
        );

        assert_eq!(store.get(&existing.id).unwrap().title, "Mine");
        assert_eq!(store.items()[0].title, "Fresh");
        assert_eq!(store.items()[1].id, "abc");
        assert_eq!(store.items()[1].view_count, 0);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn import_of_only_invalid_records_reports_an_error() {
        let (storage, _clock, mut store) = setup();
        let payload = json!([
            {"type": "podcast", "title": "Bad type", "category": "X", "url": "u"},
            {"type": "paper", "category": "X", "url": "u"},
        ]);
        let summary = store.import_items(&payload).unwrap();
        assert_eq!(summary.added, 0);
        assert_eq!(summary.rejected, 2);
        assert_eq!(storage.get(keys::RESEARCH_ITEMS).unwrap(), None);

        let notice = store.notifications().active().pop().unwrap();
        assert_eq!(notice.kind, NotificationKind::Error);
        assert_eq!(notice.message, summary.message());
    }

    #[test]
    fn import_of_only_duplicates_reports_success() {
        let (_storage, _clock, mut store) = setup();
        let existing = store.create(draft("Mine")).unwrap();
        let payload = json!([
            {"id": existing.id, "type": "paper", "title": "Again", "category": "X", "url": "u"},
        ]);
        let summary = store.import_items(&payload).unwrap();
        assert_eq!((summary.added, summary.duplicates), (0, 1));

        let notice = store.notifications().active().pop().unwrap();
        assert_eq!(notice.kind, NotificationKind::Success);
    }

    #[test]
    fn export_selects_in_canonical_order() {
        let (_storage, _clock, mut store) = setup();
        let a = store.create(draft("A")).unwrap();
        let b = store.create(draft("B")).unwrap();
        let c = store.create(draft("C")).unwrap();

        let all = store.export_items(&[]);
        assert_eq!(all.count, 3);

        let some = store.export_items(&[a.id.clone(), c.id.clone(), "missing".into()]);
        let ids: Vec<_> = some.items.iter().map(|i| i.id.clone()).collect();
        assert_eq!(ids, vec![c.id, a.id]);
        assert_eq!(some.count, 2);
        assert!(store.get(&b.id).is_some());
    }

    #[test]
    fn load_seeds_sample_data_once() {
        let storage = Arc::new(MemoryStorage::new());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let queue = NotificationQueue::new(clock.clone());

        let mut store = ResearchStore::new(storage.clone(), clock.clone(), queue.clone());
        assert_eq!(store.load(), LoadSource::Seeded);
        assert_eq!(store.len(), 4);
        store.delete("1").unwrap();

        let mut reopened = ResearchStore::new(storage, clock, queue);
        assert_eq!(reopened.load(), LoadSource::Stored);
        assert_eq!(reopened.len(), 3);
    }

    #[test]
    fn load_falls_back_on_corrupt_payload() {
        let (storage, _clock, mut store) = setup();
        storage.set(keys::RESEARCH_ITEMS, "[{\"broken\": ").unwrap();
        assert_eq!(store.load(), LoadSource::Fallback);
        assert!(store.is_empty());
        assert_eq!(
            storage.get(keys::RESEARCH_ITEMS).unwrap().as_deref(),
            Some("[{\"broken\": ")
        );
    }

    #[test]
    fn load_drops_duplicate_ids() {
        let (storage, clock, mut store) = setup();
        let mut items = sample_items(clock.now());
        items.push(items[0].clone());
        set_json(&*storage, keys::RESEARCH_ITEMS, &items).unwrap();
        assert_eq!(store.load(), LoadSource::Stored);
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn successful_mutations_push_success_notifications() {
        let (_storage, _clock, mut store) = setup();
        let item = store.create(draft("Noted")).unwrap();
        store.delete(&item.id).unwrap();
        let kinds: Vec<_> = store
            .notifications()
            .active()
            .into_iter()
            .map(|n| n.kind)
            .collect();
        assert_eq!(kinds, vec![NotificationKind::Success, NotificationKind::Success]);
    }
}
