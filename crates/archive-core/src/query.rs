//! Derived views over the item collection.
//!
//! Everything here is a pure function of `(items, criteria)`. Criteria
//! compile to a list of [`Predicate`]s that are ANDed together; sorting is
//! stable, so ties keep collection order.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::item::{ItemKind, ResearchItem};

/// How many items the recently-added strip shows by default.
pub const DEFAULT_RECENTLY_ADDED_LIMIT: usize = 5;

/// Inclusive calendar-date bounds on `createdAt` (UTC date).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        let day = at.date_naive();
        self.start.map_or(true, |s| day >= s) && self.end.map_or(true, |e| day <= e)
    }
}

/// Display order for the filtered view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    Title,
    MostViewed,
    LastViewed,
}

/// Active filter, search, and sort state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Criteria {
    pub search_term: String,
    /// `None` matches any category.
    pub category: Option<String>,
    /// `None` matches any type.
    pub kind: Option<ItemKind>,
    pub favorites_only: bool,
    pub date_range: DateRange,
    pub sort_by: SortOrder,
}

/// A single filter condition. An item is shown iff every predicate matches.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Lowercased substring against title, description, tags, and category.
    Text(String),
    Category(String),
    Kind(ItemKind),
    Favorite,
    CreatedWithin(DateRange),
}

impl Predicate {
    pub fn matches(&self, item: &ResearchItem) -> bool {
        match self {
            Predicate::Text(needle) => text_matches(item, needle, true),
            Predicate::Category(c) => item.category == *c,
            Predicate::Kind(k) => item.kind == *k,
            Predicate::Favorite => item.favorite,
            Predicate::CreatedWithin(range) => range.contains(item.created_at),
        }
    }
}

impl Criteria {
    /// Compile the active criteria. Unset facets contribute nothing.
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut preds = Vec::new();
        let term = self.search_term.trim();
        if !term.is_empty() {
            preds.push(Predicate::Text(term.to_lowercase()));
        }
        if let Some(category) = &self.category {
            preds.push(Predicate::Category(category.clone()));
        }
        if let Some(kind) = self.kind {
            preds.push(Predicate::Kind(kind));
        }
        if self.favorites_only {
            preds.push(Predicate::Favorite);
        }
        if !self.date_range.is_unbounded() {
            preds.push(Predicate::CreatedWithin(self.date_range));
        }
        preds
    }

    pub fn matches(&self, item: &ResearchItem) -> bool {
        self.predicates().iter().all(|p| p.matches(item))
    }

    /// Whether any filter (not sort) is narrowing the view.
    pub fn is_active(&self) -> bool {
        !self.predicates().is_empty()
    }

    /// Reset every filter and the search term. Sort order is kept.
    pub fn clear_filters(&mut self) {
        let sort_by = self.sort_by;
        *self = Self {
            sort_by,
            ..Self::default()
        };
    }

    /// Heading for the current category/type selection.
    pub fn label(&self) -> String {
        match (&self.category, self.kind) {
            (Some(c), Some(k)) => format!("{} / {}", c, k.plural()),
            (Some(c), None) => c.clone(),
            (None, Some(k)) => k.plural().to_string(),
            (None, None) => "All Items".to_string(),
        }
    }
}

fn text_matches(item: &ResearchItem, needle: &str, include_category: bool) -> bool {
    item.title.to_lowercase().contains(needle)
        || item.description.to_lowercase().contains(needle)
        || item.tags.iter().any(|t| t.to_lowercase().contains(needle))
        || (include_category && item.category.to_lowercase().contains(needle))
}

/// Items matching every predicate, in collection order.
pub fn filter_items<'a>(items: &'a [ResearchItem], predicates: &[Predicate]) -> Vec<&'a ResearchItem> {
    items
        .iter()
        .filter(|item| predicates.iter().all(|p| p.matches(item)))
        .collect()
}

/// Stable sort in place.
pub fn sort_items(items: &mut [&ResearchItem], order: SortOrder) {
    match order {
        SortOrder::Newest => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortOrder::Oldest => items.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortOrder::Title => items.sort_by(|a, b| compare_titles(&a.title, &b.title)),
        SortOrder::MostViewed => items.sort_by(|a, b| b.view_count.cmp(&a.view_count)),
        SortOrder::LastViewed => items.sort_by(|a, b| match (a.last_viewed, b.last_viewed) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }),
    }
}

/// Accent- and case-insensitive ordering with a raw tie-break.
fn compare_titles(a: &str, b: &str) -> Ordering {
    title_sort_key(a)
        .cmp(&title_sort_key(b))
        .then_with(|| a.cmp(b))
}

/// NFKD-decompose, drop combining marks, lowercase.
fn title_sort_key(title: &str) -> String {
    title
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// The filtered and sorted list the main grid renders.
pub fn filtered_view<'a>(items: &'a [ResearchItem], criteria: &Criteria) -> Vec<&'a ResearchItem> {
    let mut view = filter_items(items, &criteria.predicates());
    sort_items(&mut view, criteria.sort_by);
    view
}

/// Unique categories in first-seen order.
pub fn categories(items: &[ResearchItem]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for item in items {
        if !seen.iter().any(|c| *c == item.category) {
            seen.push(item.category.clone());
        }
    }
    seen
}

pub fn featured_items(items: &[ResearchItem]) -> Vec<&ResearchItem> {
    items.iter().filter(|i| i.featured).collect()
}

/// The `limit` most recently created items, newest first.
pub fn recently_added(items: &[ResearchItem], limit: usize) -> Vec<&ResearchItem> {
    let mut recent: Vec<&ResearchItem> = items.iter().collect();
    sort_items(&mut recent, SortOrder::Newest);
    recent.truncate(limit);
    recent
}

/// Suggestion matches for the search box. Category is not searched.
pub fn search_results<'a>(items: &'a [ResearchItem], term: &str) -> Vec<&'a ResearchItem> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    items
        .iter()
        .filter(|i| text_matches(i, &needle, false))
        .collect()
}

/// Per-type item counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCounts {
    pub total: usize,
    pub paper: usize,
    pub video: usize,
    pub documentary: usize,
    pub image: usize,
}

impl TypeCounts {
    pub fn get(&self, kind: ItemKind) -> usize {
        match kind {
            ItemKind::Paper => self.paper,
            ItemKind::Video => self.video,
            ItemKind::Documentary => self.documentary,
            ItemKind::Image => self.image,
        }
    }
}

pub fn type_counts<'a>(items: impl IntoIterator<Item = &'a ResearchItem>) -> TypeCounts {
    let mut counts = TypeCounts::default();
    for item in items {
        counts.total += 1;
        match item.kind {
            ItemKind::Paper => counts.paper += 1,
            ItemKind::Video => counts.video += 1,
            ItemKind::Documentary => counts.documentary += 1,
            ItemKind::Image => counts.image += 1,
        }
    }
    counts
}

/// A tag and how many items carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// Most-used tags, ties broken by first appearance.
pub fn popular_tags(items: &[ResearchItem], limit: usize) -> Vec<TagCount> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for tag in items.iter().flat_map(|i| i.tags.iter()) {
        let entry = counts.entry(tag.as_str()).or_insert(0);
        if *entry == 0 {
            order.push(tag.as_str());
        }
        *entry += 1;
    }

    let mut ranked: Vec<TagCount> = order
        .into_iter()
        .map(|tag| TagCount {
            tag: tag.to_string(),
            count: counts[tag],
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(limit);
    ranked
}

/// Every derived view for one render pass.
#[derive(Debug, Clone)]
pub struct ArchiveViews<'a> {
    pub filtered: Vec<&'a ResearchItem>,
    /// Counts over the filtered view.
    pub counts: TypeCounts,
    pub categories: Vec<String>,
    pub featured: Vec<&'a ResearchItem>,
    pub recently_added: Vec<&'a ResearchItem>,
    pub search_results: Vec<&'a ResearchItem>,
    pub label: String,
}

impl<'a> ArchiveViews<'a> {
    pub fn compute(items: &'a [ResearchItem], criteria: &Criteria, recent_limit: usize) -> Self {
        let filtered = filtered_view(items, criteria);
        let counts = type_counts(filtered.iter().copied());
        Self {
            filtered,
            counts,
            categories: categories(items),
            featured: featured_items(items),
            recently_added: recently_added(items, recent_limit),
            search_results: search_results(items, &criteria.search_term),
            label: criteria.label(),
        }
    }
}
