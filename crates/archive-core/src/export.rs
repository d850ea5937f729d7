//! Export pipelines and import payload parsing.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ArchiveError, Result};
use crate::item::ResearchItem;

/// Columns written by the CSV exporter, in order.
pub const CSV_COLUMNS: [&str; 9] = [
    "id",
    "type",
    "title",
    "tags",
    "category",
    "description",
    "url",
    "createdAt",
    "viewCount",
];

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
        }
    }
}

/// A selection of items pulled from the store. Never mutates the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Export {
    pub items: Vec<ResearchItem>,
    pub count: usize,
}

impl Export {
    pub fn new(items: Vec<ResearchItem>) -> Self {
        let count = items.len();
        Self { items, count }
    }

    /// Encode the selection in `format`.
    pub fn encode(&self, format: ExportFormat) -> Result<String> {
        match format {
            ExportFormat::Json => to_json(&self.items),
            ExportFormat::Csv => to_csv(&self.items),
        }
    }
}

/// `research_archive_<YYYY-MM-DD>.<ext>`
pub fn export_filename(format: ExportFormat, date: NaiveDate) -> String {
    format!(
        "research_archive_{}.{}",
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// Pretty-printed JSON array with every field.
pub fn to_json(items: &[ResearchItem]) -> Result<String> {
    serde_json::to_string_pretty(items).map_err(|e| ArchiveError::Serialization(e.to_string()))
}

/// Flattened CSV. The `tags` cell holds the tag list as a JSON array.
pub fn to_csv(items: &[ResearchItem]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_COLUMNS).map_err(csv_err)?;

    for item in items {
        let tags = serde_json::to_string(&item.tags)
            .map_err(|e| ArchiveError::Serialization(e.to_string()))?;
        writer
            .write_record([
                item.id.as_str(),
                item.kind.as_str(),
                item.title.as_str(),
                tags.as_str(),
                item.category.as_str(),
                item.description.as_str(),
                item.url.as_str(),
                item.created_at.to_rfc3339().as_str(),
                item.view_count.to_string().as_str(),
            ])
            .map_err(csv_err)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ArchiveError::Serialization(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ArchiveError::Serialization(e.to_string()))
}

fn csv_err(e: csv::Error) -> ArchiveError {
    ArchiveError::Serialization(e.to_string())
}

/// Parse pasted or uploaded import text into a JSON value.
///
/// Only checks that the text is JSON; the array shape is enforced by
/// the store's import.
pub fn parse_import_text(text: &str) -> Result<serde_json::Value> {
    if text.trim().is_empty() {
        return Err(ArchiveError::ImportFormat("no data to import".into()));
    }
    serde_json::from_str(text).map_err(|e| ArchiveError::ImportFormat(e.to_string()))
}
