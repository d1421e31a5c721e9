//! Data models for news categories, upstream payloads, and display records.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Category`]: One of the six fixed sections the portal can display
//! - [`ArticlesResponse`] / [`RawArticle`]: The upstream payload as NewsAPI sends it
//! - [`ArticleRecord`]: A normalized, fallback-filled article ready for rendering
//!
//! Upstream fields are all optional and loosely typed. A field that is missing,
//! `null`, an empty string, or not a string at all is treated as absent and
//! replaced with a fixed fallback literal when the record is built.

use serde::{Deserialize, Deserializer};

/// Title shown when the upstream article has none.
pub const NO_TITLE: &str = "No Title Available";
/// Snippet shown when the upstream article has no description.
pub const NO_DESCRIPTION: &str = "No description available";
/// Source name shown when the upstream article has no `source.name`.
pub const UNKNOWN_SOURCE: &str = "Unknown Source";
/// Image path used when the upstream article has no `urlToImage`.
pub const PLACEHOLDER_IMAGE: &str = "/api/placeholder/300/200";

/// Id of the default category, backed by a broad search instead of a
/// category-filtered query.
pub const HEADLINES: &str = "headlines";

/// A news section the portal can display.
///
/// The set is fixed at compile time; see [`CATEGORIES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Category {
    /// Stable key, also sent upstream as the `category` query parameter.
    pub id: &'static str,
    /// Human-readable label for navigation and headings.
    pub display_name: &'static str,
}

/// The six sections, in navigation order. The first one is the default.
pub static CATEGORIES: [Category; 6] = [
    Category { id: HEADLINES, display_name: "Headlines" },
    Category { id: "politics", display_name: "Politics" },
    Category { id: "business", display_name: "Business" },
    Category { id: "sports", display_name: "Sports" },
    Category { id: "entertainment", display_name: "Entertainment" },
    Category { id: "health", display_name: "Health" },
];

impl Category {
    /// Look up a category by id. Returns `None` for anything outside the fixed set.
    pub fn lookup(id: &str) -> Option<&'static Category> {
        CATEGORIES.iter().find(|c| c.id == id)
    }

    /// The default category the portal opens on.
    pub fn default_category() -> &'static Category {
        &CATEGORIES[0]
    }

    /// Whether this category uses the broad "everything" search.
    pub fn is_headlines(&self) -> bool {
        self.id == HEADLINES
    }
}

/// Top-level NewsAPI response body.
///
/// Only the `articles` array is required; a body without it is malformed.
/// Leniency stops at the field level: every element must be a JSON object,
/// so a `null` or scalar entry rejects the whole batch as malformed rather
/// than being skipped or turned into an all-fallback record.
#[derive(Debug, Deserialize)]
pub struct ArticlesResponse {
    pub articles: Vec<RawArticle>,
}

/// Error body NewsAPI returns alongside non-200 statuses.
#[derive(Debug, Default, Deserialize)]
pub struct UpstreamErrorBody {
    #[serde(default, deserialize_with = "lenient_string")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: Option<String>,
}

/// One article exactly as the upstream sent it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_source_name")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub url_to_image: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub published_at: Option<String>,
}

/// A normalized article, as stored in the cache and consumed by renderers.
///
/// Every field is populated; missing upstream values have already been
/// replaced with the fallback literals above.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    /// 1-based position within the fetch batch, in response order.
    pub ordinal: usize,
    pub title: String,
    pub snippet: String,
    pub source_name: String,
    pub url: String,
    pub image_url: String,
    /// Publication timestamp as sent upstream (RFC 3339 when well-formed).
    pub published_at: String,
}

impl ArticleRecord {
    /// Build a record from one upstream article, filling each missing field
    /// independently.
    pub fn from_raw(ordinal: usize, raw: RawArticle) -> Self {
        Self {
            ordinal,
            title: raw.title.unwrap_or_else(|| NO_TITLE.to_string()),
            snippet: raw.description.unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            source_name: raw.source.unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
            url: raw.url.unwrap_or_default(),
            image_url: raw.url_to_image.unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            published_at: raw.published_at.unwrap_or_default(),
        }
    }
}

/// Normalize a fetch batch, numbering records from 1 in response order.
pub fn normalize_articles(raw: Vec<RawArticle>) -> Vec<ArticleRecord> {
    raw.into_iter()
        .enumerate()
        .map(|(i, article)| ArticleRecord::from_raw(i + 1, article))
        .collect()
}

/// Accept any JSON value; keep it only if it is a non-empty string.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    })
}

/// Pull `name` out of the nested `source` object, tolerating any shape.
fn lenient_source_name<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .get("name")
        .and_then(|name| name.as_str())
        .filter(|name| !name.is_empty())
        .map(str::to_string))
}
