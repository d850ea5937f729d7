//! The archive session.

use std::sync::Arc;

use archive_core::{
    export_filename, parse_import_text, popular_tags, ArchiveConfig, ArchiveError, ArchiveViews,
    Clock, Criteria, DateRange, ExportFormat, FileStorage, ImportSummary, ItemDraft, ItemId,
    ItemKind, KeyValueStore, LoadSource, NotificationQueue, PersistenceError, ResearchItem,
    ResearchStore, SortOrder, SystemClock, TagCount,
};
use chrono::Duration;
use serde::Serialize;

use crate::history::SearchHistory;
use crate::preferences::Preferences;

/// An encoded export ready to hand to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFile {
    pub filename: String,
    pub mime_type: String,
    pub contents: String,
    pub count: usize,
}

/// Store, criteria, history, preferences, and notifications for one user.
pub struct ArchiveSession {
    store: ResearchStore,
    criteria: Criteria,
    history: SearchHistory,
    preferences: Preferences,
    notifications: NotificationQueue,
    config: ArchiveConfig,
    load_source: LoadSource,
}

impl ArchiveSession {
    /// Open a session over file storage in `config.data_dir`.
    pub fn open(config: ArchiveConfig) -> crate::Result<Self> {
        config.validate()?;
        let storage = Arc::new(FileStorage::open(&config.data_dir)?);
        tracing::info!("Opening research archive at {:?}", config.data_dir);
        Ok(Self::with_storage(storage, Arc::new(SystemClock), config))
    }

    /// Open a session over any storage backend and clock.
    pub fn with_storage(
        storage: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        config: ArchiveConfig,
    ) -> Self {
        let notifications = NotificationQueue::with_ttl(
            clock.clone(),
            Duration::seconds(config.notification_ttl_secs as i64),
        );
        let mut store = ResearchStore::new(storage.clone(), clock, notifications.clone())
            .with_sample_seeding(config.seed_sample_data);
        let load_source = store.load();
        let history = SearchHistory::load(storage.clone(), config.history_limit);
        let preferences = Preferences::load(storage);

        Self {
            store,
            criteria: Criteria::default(),
            history,
            preferences,
            notifications,
            config,
            load_source,
        }
    }

    pub fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    /// Where the collection came from when the session opened.
    pub fn load_source(&self) -> LoadSource {
        self.load_source
    }

    pub fn store(&self) -> &ResearchStore {
        &self.store
    }

    pub fn items(&self) -> &[ResearchItem] {
        self.store.items()
    }

    pub fn get(&self, id: &str) -> Option<&ResearchItem> {
        self.store.get(id)
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn preferences_mut(&mut self) -> &mut Preferences {
        &mut self.preferences
    }

    // === Criteria ===

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.criteria.search_term = term.into();
    }

    pub fn set_category(&mut self, category: Option<String>) {
        self.criteria.category = category;
    }

    pub fn set_kind(&mut self, kind: Option<ItemKind>) {
        self.criteria.kind = kind;
    }

    pub fn set_favorites_only(&mut self, favorites_only: bool) {
        self.criteria.favorites_only = favorites_only;
    }

    pub fn set_date_range(&mut self, range: DateRange) {
        self.criteria.date_range = range;
    }

    pub fn set_sort_by(&mut self, order: SortOrder) {
        self.criteria.sort_by = order;
    }

    /// Reset every filter; the sort order is kept.
    pub fn clear_filters(&mut self) {
        self.criteria.clear_filters();
    }

    // === Search history ===

    /// Record the current search term in history.
    pub fn submit_search(&mut self) -> archive_core::Result<bool> {
        let term = self.criteria.search_term.clone();
        let result = self.history.add(&term);
        self.report(result, "Failed to save search history")
    }

    /// Apply a history or suggestion entry as the search term.
    pub fn select_suggestion(&mut self, term: &str) -> archive_core::Result<bool> {
        self.criteria.search_term = term.to_string();
        self.submit_search()
    }

    pub fn remove_history_term(&mut self, term: &str) -> archive_core::Result<bool> {
        let result = self.history.remove(term);
        self.report(result, "Failed to save search history")
    }

    pub fn clear_history(&mut self) -> archive_core::Result<()> {
        let result = self.history.clear();
        self.report(result, "Failed to clear search history")
    }

    fn report<T>(
        &self,
        result: Result<T, PersistenceError>,
        failure: &str,
    ) -> archive_core::Result<T> {
        result.map_err(|e| {
            tracing::warn!("{}: {}", failure, e);
            self.notifications.error(format!("{}: {}", failure, e));
            ArchiveError::Persistence(e)
        })
    }

    // === Item operations ===

    pub fn create(&mut self, draft: ItemDraft) -> archive_core::Result<ResearchItem> {
        self.store.create(draft)
    }

    pub fn update(&mut self, id: &str, draft: ItemDraft) -> archive_core::Result<ResearchItem> {
        self.store.update(id, draft)
    }

    pub fn delete(&mut self, id: &str) -> archive_core::Result<bool> {
        self.store.delete(id)
    }

    pub fn toggle_favorite(&mut self, id: &str) -> archive_core::Result<Option<bool>> {
        self.store.toggle_favorite(id)
    }

    pub fn toggle_featured(&mut self, id: &str) -> archive_core::Result<Option<bool>> {
        self.store.toggle_featured(id)
    }

    pub fn increment_view_count(&mut self, id: &str) -> archive_core::Result<Option<u64>> {
        self.store.increment_view_count(id)
    }

    pub fn clear_archive(&mut self) -> archive_core::Result<()> {
        self.store.clear()
    }

    // === Derived views ===

    pub fn views(&self) -> ArchiveViews<'_> {
        ArchiveViews::compute(
            self.store.items(),
            &self.criteria,
            self.config.recently_added_limit,
        )
    }

    pub fn popular_tags(&self, limit: usize) -> Vec<TagCount> {
        popular_tags(self.store.items(), limit)
    }

    // === Import / export ===

    /// Encode the selected items, or all items when `ids` is empty.
    pub fn export(&self, format: ExportFormat, ids: &[ItemId]) -> archive_core::Result<ExportFile> {
        let export = self.store.export_items(ids);
        if export.count == 0 {
            self.notifications.error("No items selected for export");
            return Err(ArchiveError::EmptyExport);
        }

        let contents = export.encode(format).map_err(|e| {
            tracing::warn!("Export failed: {}", e);
            self.notifications.error(format!("Export failed: {}", e));
            e
        })?;
        let filename = export_filename(format, self.store.clock().now().date_naive());
        tracing::info!("Exported {} items as {}", export.count, filename);
        self.notifications
            .success(format!("Successfully exported {} items", export.count));

        Ok(ExportFile {
            filename,
            mime_type: format.mime_type().to_string(),
            contents,
            count: export.count,
        })
    }

    /// Parse pasted or uploaded JSON and merge it into the collection.
    pub fn import_json(&mut self, text: &str) -> archive_core::Result<ImportSummary> {
        let result = parse_import_text(text).and_then(|data| self.store.import_items(&data));
        if let Err(ArchiveError::ImportFormat(message)) = &result {
            tracing::warn!("Import failed: {}", message);
            self.notifications.error(format!("Import failed: {}", message));
        }
        result
    }
}

impl std::fmt::Debug for ArchiveSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveSession")
            .field("store", &self.store)
            .field("criteria", &self.criteria)
            .field("history", &self.history)
            .field("preferences", &self.preferences)
            .finish()
    }
}
