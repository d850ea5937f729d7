//! Recent search terms, most recent first.

use std::sync::Arc;

use archive_core::{get_json, keys, set_json, KeyValueStore, PersistenceError, DEFAULT_HISTORY_LIMIT};

/// Bounded, case-insensitively deduplicated search history.
///
/// Persisted as a JSON array under `searchHistory` after every change.
pub struct SearchHistory {
    terms: Vec<String>,
    limit: usize,
    storage: Arc<dyn KeyValueStore>,
}

impl SearchHistory {
    /// Load history from storage. Unreadable history starts empty.
    pub fn load(storage: Arc<dyn KeyValueStore>, limit: usize) -> Self {
        let terms = match get_json::<Vec<String>>(storage.as_ref(), keys::SEARCH_HISTORY) {
            Ok(Some(mut terms)) => {
                terms.truncate(limit);
                terms
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to load search history: {}", e);
                Vec::new()
            }
        };
        Self {
            terms,
            limit,
            storage,
        }
    }

    pub fn with_default_limit(storage: Arc<dyn KeyValueStore>) -> Self {
        Self::load(storage, DEFAULT_HISTORY_LIMIT)
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Record a term at the front, replacing any entry that differs only by case.
    ///
    /// Blank terms are ignored. Returns whether the history changed.
    pub fn add(&mut self, term: &str) -> Result<bool, PersistenceError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(false);
        }
        let lowered = term.to_lowercase();
        self.terms.retain(|t| t.to_lowercase() != lowered);
        self.terms.insert(0, term.to_string());
        self.terms.truncate(self.limit);
        self.save()?;
        Ok(true)
    }

    /// Remove an exact-match entry. Returns whether anything was removed.
    pub fn remove(&mut self, term: &str) -> Result<bool, PersistenceError> {
        let before = self.terms.len();
        self.terms.retain(|t| t != term);
        if self.terms.len() == before {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Empty the history and drop its stored copy.
    pub fn clear(&mut self) -> Result<(), PersistenceError> {
        self.terms.clear();
        self.storage.remove(keys::SEARCH_HISTORY)
    }

    fn save(&self) -> Result<(), PersistenceError> {
        set_json(self.storage.as_ref(), keys::SEARCH_HISTORY, &self.terms)
    }
}

impl std::fmt::Debug for SearchHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchHistory")
            .field("terms", &self.terms)
            .field("limit", &self.limit)
            .finish()
    }
}
