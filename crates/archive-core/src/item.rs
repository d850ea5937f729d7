use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Opaque item identifier. Assigned once at creation and never reassigned.
pub type ItemId = String;

/// The closed set of archive item types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Paper,
    Video,
    Documentary,
    Image,
}

impl ItemKind {
    pub const ALL: [ItemKind; 4] = [
        ItemKind::Paper,
        ItemKind::Video,
        ItemKind::Documentary,
        ItemKind::Image,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Paper => "paper",
            ItemKind::Video => "video",
            ItemKind::Documentary => "documentary",
            ItemKind::Image => "image",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            ItemKind::Paper => "papers",
            ItemKind::Video => "videos",
            ItemKind::Documentary => "documentaries",
            ItemKind::Image => "images",
        }
    }

    /// Whether a thumbnail is rendered for this type.
    pub fn shows_thumbnail(&self) -> bool {
        matches!(self, ItemKind::Video | ItemKind::Documentary)
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "paper" => Ok(ItemKind::Paper),
            "video" => Ok(ItemKind::Video),
            "documentary" => Ok(ItemKind::Documentary),
            "image" => Ok(ItemKind::Image),
            other => Err(format!("unknown item type: '{}'", other)),
        }
    }
}

/// One research archive entry.
///
/// Serialized with the camelCase keys used by the persisted
/// `researchItems` array (`createdAt`, `viewCount`, `lastViewed`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchItem {
    pub id: ItemId,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub title: String,
    pub tags: Vec<String>,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_viewed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub featured: bool,
}

impl ResearchItem {
    /// The thumbnail, if this item's type renders one.
    pub fn display_thumbnail(&self) -> Option<&str> {
        if self.kind.shows_thumbnail() {
            self.thumbnail.as_deref()
        } else {
            None
        }
    }
}

/// The user-editable fields of an item, as submitted by create/edit forms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDraft {
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub title: String,
    pub tags: Vec<String>,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub favorite: Option<bool>,
    #[serde(default)]
    pub featured: Option<bool>,
}

impl ItemDraft {
    /// A draft with the required fields set and everything else defaulted.
    pub fn new(
        kind: ItemKind,
        title: impl Into<String>,
        category: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            tags: Vec::new(),
            category: category.into(),
            description: String::new(),
            url: url.into(),
            thumbnail: None,
            view_count: None,
            favorite: None,
            featured: None,
        }
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }

    /// Check that title, category, url, and at least one tag are non-blank.
    ///
    /// Every offending field is reported, in form order.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push("title".to_string());
        }
        if !self.tags.iter().any(|t| !t.trim().is_empty()) {
            missing.push("tags".to_string());
        }
        if self.category.trim().is_empty() {
            missing.push("category".to_string());
        }
        if self.url.trim().is_empty() {
            missing.push("url".to_string());
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(missing))
        }
    }
}

/// An item-shaped record with every field optional.
///
/// This is the shape accepted by import, and the single place where
/// ids, timestamps, counters, and flags receive their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    #[serde(default)]
    pub id: Option<ItemId>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub last_viewed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub favorite: Option<bool>,
    #[serde(default)]
    pub featured: Option<bool>,
}

impl ItemRecord {
    /// Turn this record into a full item, filling defaults.
    ///
    /// `fresh_id` is only called when the record carries no usable id.
    /// Fails when type, title, category, or url is missing or invalid.
    pub fn normalize(
        self,
        fresh_id: impl FnOnce() -> ItemId,
        now: DateTime<Utc>,
    ) -> Result<ResearchItem, ValidationError> {
        let mut missing = Vec::new();

        let kind = self.kind.as_deref().and_then(|k| k.parse::<ItemKind>().ok());
        if kind.is_none() {
            missing.push("type".to_string());
        }
        let title = non_blank(self.title);
        if title.is_none() {
            missing.push("title".to_string());
        }
        let category = non_blank(self.category);
        if category.is_none() {
            missing.push("category".to_string());
        }
        let url = non_blank(self.url);
        if url.is_none() {
            missing.push("url".to_string());
        }

        let (Some(kind), Some(title), Some(category), Some(url)) = (kind, title, category, url)
        else {
            return Err(ValidationError::new(missing));
        };

        let id = match self.id.filter(|id| !id.trim().is_empty()) {
            Some(id) => id,
            None => fresh_id(),
        };

        Ok(ResearchItem {
            id,
            kind,
            title,
            tags: self
                .tags
                .unwrap_or_default()
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            category,
            description: self.description.unwrap_or_default(),
            url,
            thumbnail: self.thumbnail.filter(|t| !t.trim().is_empty()),
            created_at: self.created_at.unwrap_or(now),
            view_count: self.view_count.unwrap_or(0),
            last_viewed: self.last_viewed,
            favorite: self.favorite.unwrap_or(false),
            featured: self.featured.unwrap_or(false),
        })
    }
}

impl From<ItemDraft> for ItemRecord {
    fn from(draft: ItemDraft) -> Self {
        Self {
            id: None,
            kind: Some(draft.kind.as_str().to_string()),
            title: Some(draft.title),
            tags: Some(draft.tags),
            category: Some(draft.category),
            description: Some(draft.description),
            url: Some(draft.url),
            thumbnail: draft.thumbnail,
            created_at: None,
            view_count: draft.view_count,
            last_viewed: None,
            favorite: draft.favorite,
            featured: draft.featured,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
