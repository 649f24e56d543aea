use std::collections::BTreeMap;
use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Sources ---

/// Selector set driving extraction from a browser-rendered blog.
///
/// All fields are CSS selectors except `date_format`, which is the chrono
/// format string used to parse the text behind `date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSelectors {
    /// One listing entry (the element that links to a detail page).
    pub list_item: String,
    /// Post title, applied on the detail page.
    pub title: String,
    /// Post body container, applied on the detail page.
    pub content: String,
    /// Tag anchors, applied on the detail page.
    pub tags: String,
    /// Publish-date element, applied on the detail page.
    pub date: String,
    /// chrono format string for the date text, e.g. "%b.%d.%Y".
    pub date_format: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceKind {
    /// RSS/Atom syndication feed.
    Feed { feed_url: String },
    /// Listing page that needs script execution before content exists.
    RenderedPage {
        list_url: String,
        selectors: PageSelectors,
    },
}

/// One external origin registered for crawling. Defined at configuration
/// time, never mutated at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub id: String,
    pub display_name: String,
    pub kind: SourceKind,
}

impl SourceDescriptor {
    pub fn feed(id: &str, display_name: &str, feed_url: &str) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            kind: SourceKind::Feed {
                feed_url: feed_url.to_string(),
            },
        }
    }

    pub fn rendered_page(
        id: &str,
        display_name: &str,
        list_url: &str,
        selectors: PageSelectors,
    ) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            kind: SourceKind::RenderedPage {
                list_url: list_url.to_string(),
                selectors,
            },
        }
    }
}

// --- Articles ---

/// Canonical post record produced by a fetcher, before persistence.
///
/// `origin_url` is the global dedup key: at most one article per URL is
/// ever persisted, across all sources. `published_at` is the publish
/// instant converted to local civil time. Tags are normalized lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub content: String,
    pub source_name: String,
    pub origin_url: String,
    pub published_at: NaiveDateTime,
    pub tags: BTreeSet<String>,
}

// --- Trends ---

/// Popularity and growth of one tag over the trend window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagTrend {
    pub tag: String,
    pub count: u64,
    /// Week-over-week change in document count, as a percentage.
    pub growth_rate: f64,
    pub related_tags: Vec<String>,
}

/// Point-in-time trend report computed from the search index. Ephemeral:
/// recomputed per request, cached only by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSnapshot {
    pub keywords: Vec<TagTrend>,
    /// Company name to representative post titles within the window.
    pub company_trends: BTreeMap<String, Vec<String>>,
    pub analyzed_at: DateTime<Utc>,
}
