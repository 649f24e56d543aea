use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Local;
use feed_rs::model::{Entry, Feed};
use tracing::{info, warn};

use techpulse_common::{Article, SourceDescriptor, SourceKind, TechPulseError};

use crate::tags::extract_tags;
use crate::traits::ArticleFetcher;

/// Total attempts for one feed fetch, including the first.
const FEED_MAX_ATTEMPTS: u32 = 2;
/// Fixed delay between attempts.
const FEED_RETRY_DELAY: Duration = Duration::from_secs(1);
const FEED_TIMEOUT: Duration = Duration::from_secs(15);

/// Fetch strategy for syndication-feed sources.
pub struct FeedFetcher {
    client: reqwest::Client,
}

impl FeedFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(FEED_TIMEOUT)
            .build()
            .expect("Failed to build feed HTTP client");
        Self { client }
    }

    async fn fetch_feed(&self, feed_url: &str) -> Result<Feed> {
        let resp = self
            .client
            .get(feed_url)
            .header("User-Agent", "techpulse-crawler/0.1")
            .send()
            .await
            .context("Feed fetch failed")?;

        let bytes = resp.bytes().await.context("Failed to read feed body")?;
        feed_rs::parser::parse(&bytes[..]).context("Failed to parse feed")
    }
}

impl Default for FeedFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArticleFetcher for FeedFetcher {
    async fn fetch(&self, source: &SourceDescriptor) -> Result<Vec<Article>> {
        let SourceKind::Feed { ref feed_url } = source.kind else {
            anyhow::bail!("Source '{}' is not a feed source", source.id);
        };

        let feed = match with_retry(FEED_MAX_ATTEMPTS, FEED_RETRY_DELAY, || {
            self.fetch_feed(feed_url)
        })
        .await
        {
            Ok(feed) => feed,
            Err(e) => {
                warn!(
                    source = %source.display_name,
                    feed_url = feed_url.as_str(),
                    error = %e,
                    "Feed fetch exhausted retries, source yields nothing this run"
                );
                return Ok(Vec::new());
            }
        };

        info!(
            source = %source.display_name,
            entries = feed.entries.len(),
            "Feed fetched"
        );

        let articles = convert_feed(feed, &source.display_name);

        info!(
            source = %source.display_name,
            articles = articles.len(),
            "Feed entries converted"
        );
        Ok(articles)
    }
}

/// Convert feed entries to articles, skipping entries that cannot be
/// mapped. A skipped entry is logged and never aborts the batch.
pub(crate) fn convert_feed(feed: Feed, source_name: &str) -> Vec<Article> {
    feed.entries
        .iter()
        .filter_map(|entry| match convert_entry(entry, source_name) {
            Ok(article) => Some(article),
            Err(e) => {
                warn!(source = source_name, error = %e, "Skipping feed entry");
                None
            }
        })
        .collect()
}

fn convert_entry(entry: &Entry, source_name: &str) -> std::result::Result<Article, TechPulseError> {
    let title = entry
        .title
        .as_ref()
        .map(|t| t.content.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| TechPulseError::EntryConversion("entry has no title".to_string()))?;

    // Some feeds only carry the post URL in the entry id.
    let origin_url = entry
        .links
        .first()
        .map(|l| l.href.clone())
        .or_else(|| entry.id.starts_with("http").then(|| entry.id.clone()))
        .ok_or_else(|| TechPulseError::EntryConversion(format!("entry '{title}' has no link")))?;

    let content = entry
        .content
        .as_ref()
        .and_then(|c| c.body.clone())
        .or_else(|| entry.summary.as_ref().map(|s| s.content.clone()))
        .unwrap_or_default();

    let published = entry.published.or(entry.updated).ok_or_else(|| {
        TechPulseError::EntryConversion(format!("entry '{title}' has no publish date"))
    })?;

    let tags = extract_tags(&content);

    Ok(Article {
        title,
        source_name: source_name.to_string(),
        origin_url,
        published_at: published.with_timezone(&Local).naive_local(),
        tags,
        content,
    })
}

/// Run `op` up to `attempts` times with a fixed delay between tries,
/// returning the first success or the last error.
pub(crate) async fn with_retry<T, F, Fut>(attempts: u32, delay: Duration, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_err = None;
    for attempt in 0..attempts {
        if attempt > 0 {
            tokio::time::sleep(delay).await;
        }
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!(attempt = attempt + 1, error = %e, "Attempt failed");
                last_err = Some(e);
            }
        }
    }
    Err(last_err.expect("retry budget must be nonzero"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    const TWO_ENTRY_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Example Engineering</title>
    <item>
      <title>Scaling the feed pipeline</title>
      <link>https://example.com/posts/scaling</link>
      <description><![CDATA[<p>How we scaled.</p><a href="/tag/kafka">Kafka</a>]]></description>
      <pubDate>Mon, 03 Aug 2026 09:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Entry without a date</title>
      <link>https://example.com/posts/undated</link>
      <description>no pubDate element</description>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn undated_entries_are_skipped_not_fatal() {
        let feed = feed_rs::parser::parse(TWO_ENTRY_FEED.as_bytes()).unwrap();
        let articles = convert_feed(feed, "example");

        assert_eq!(articles.len(), 1);
        let article = &articles[0];
        assert_eq!(article.title, "Scaling the feed pipeline");
        assert_eq!(article.origin_url, "https://example.com/posts/scaling");
        assert_eq!(article.source_name, "example");
        assert!(article.tags.contains("kafka"));
    }

    #[test]
    fn entry_without_title_is_skipped() {
        let feed_xml = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>t</title>
  <item>
    <link>https://example.com/posts/untitled</link>
    <description>body</description>
    <pubDate>Mon, 03 Aug 2026 09:00:00 GMT</pubDate>
  </item>
</channel></rss>"#;
        let feed = feed_rs::parser::parse(feed_xml.as_bytes()).unwrap();
        assert!(convert_feed(feed, "example").is_empty());
    }

    #[tokio::test]
    async fn retry_returns_second_attempt_result() {
        let calls = AtomicU32::new(0);
        let result = with_retry(2, Duration::from_millis(1), || async {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                anyhow::bail!("transient failure")
            }
            Ok(7)
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn retry_stops_at_budget() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = with_retry(2, Duration::from_millis(1), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("always down")
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
