use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use scraper::{Html, Selector};
use tracing::{info, warn};
use url::Url;

use browserless_client::{BrowserlessClient, RenderOptions};
use techpulse_common::{Article, PageSelectors, SourceDescriptor, SourceKind};

use crate::clean::clean_content;
use crate::traits::ArticleFetcher;

/// Politeness delay between detail-page visits. Deliberate throttle, not
/// a tunable: rendered sources are crawled at human pace.
const DETAIL_PAGE_DELAY: Duration = Duration::from_secs(1);

/// Fetch strategy for sources whose listings only exist after script
/// execution. Holds a shared handle to the crawl-lifetime browser
/// session; rendering happens in the Browserless service.
pub struct RenderedPageFetcher {
    browser: Arc<BrowserlessClient>,
}

impl RenderedPageFetcher {
    pub fn new(browser: Arc<BrowserlessClient>) -> Self {
        Self { browser }
    }

    async fn fetch_detail(
        &self,
        url: &str,
        source_name: &str,
        selectors: &PageSelectors,
    ) -> Result<Article> {
        let html = self
            .browser
            .render(url, &RenderOptions::wait_for(&selectors.content))
            .await
            .context("Detail page render failed")?;

        parse_detail(&html, url, source_name, selectors)
    }
}

#[async_trait]
impl ArticleFetcher for RenderedPageFetcher {
    async fn fetch(&self, source: &SourceDescriptor) -> Result<Vec<Article>> {
        let SourceKind::RenderedPage {
            ref list_url,
            ref selectors,
        } = source.kind
        else {
            anyhow::bail!("Source '{}' is not a rendered-page source", source.id);
        };

        let html = self
            .browser
            .render(list_url, &RenderOptions::wait_for(&selectors.list_item))
            .await
            .context("Listing page render failed")?;

        let links = extract_item_links(&html, list_url, &selectors.list_item)?;
        info!(
            source = %source.display_name,
            posts = links.len(),
            "Listing rendered"
        );

        let mut articles = Vec::new();
        for (i, link) in links.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(DETAIL_PAGE_DELAY).await;
            }
            match self
                .fetch_detail(link, &source.display_name, selectors)
                .await
            {
                Ok(article) => articles.push(article),
                Err(e) => {
                    warn!(
                        source = %source.display_name,
                        url = link.as_str(),
                        error = %e,
                        "Skipping post"
                    );
                }
            }
        }

        info!(
            source = %source.display_name,
            articles = articles.len(),
            "Rendered-page crawl complete"
        );
        Ok(articles)
    }
}

/// Detail-page links behind the listing's item selector, resolved
/// against the listing URL and deduplicated in page order.
fn extract_item_links(html: &str, list_url: &str, list_item: &str) -> Result<Vec<String>> {
    let item_selector = parse_selector(list_item)?;
    let anchor_selector = Selector::parse("a[href]").expect("valid selector");
    let base = Url::parse(list_url).context("Invalid listing URL")?;

    let doc = Html::parse_document(html);

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for item in doc.select(&item_selector) {
        let href = if item.value().name() == "a" {
            item.value().attr("href")
        } else {
            item.select(&anchor_selector)
                .next()
                .and_then(|a| a.value().attr("href"))
        };
        let Some(href) = href else { continue };
        let Ok(resolved) = base.join(href) else {
            continue;
        };
        let resolved = resolved.to_string();
        if seen.insert(resolved.clone()) {
            links.push(resolved);
        }
    }

    Ok(links)
}

/// Extract an article from a rendered detail page. A missing title,
/// date, or content container fails this item only.
fn parse_detail(
    html: &str,
    url: &str,
    source_name: &str,
    selectors: &PageSelectors,
) -> Result<Article> {
    let doc = Html::parse_document(html);

    let title = select_text(&doc, &selectors.title)?
        .filter(|t| !t.is_empty())
        .ok_or_else(|| anyhow::anyhow!("No title behind '{}'", selectors.title))?;

    let content_html = doc
        .select(&parse_selector(&selectors.content)?)
        .next()
        .map(|el| el.inner_html())
        .ok_or_else(|| anyhow::anyhow!("No content behind '{}'", selectors.content))?;
    let content = clean_content(&content_html);

    let date_text = select_text(&doc, &selectors.date)?
        .ok_or_else(|| anyhow::anyhow!("No publish date behind '{}'", selectors.date))?;
    let published_at = parse_publish_date(&date_text, &selectors.date_format)?;

    let tag_selector = parse_selector(&selectors.tags)?;
    let tags = doc
        .select(&tag_selector)
        .map(|el| el.text().collect::<String>().trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect();

    Ok(Article {
        title,
        content,
        source_name: source_name.to_string(),
        origin_url: url.to_string(),
        published_at,
        tags,
    })
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| anyhow::anyhow!("Invalid selector '{selector}': {e}"))
}

fn select_text(doc: &Html, selector: &str) -> Result<Option<String>> {
    let selector = parse_selector(selector)?;
    Ok(doc
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string()))
}

/// Parse a publish date using the source's configured format, accepting
/// date-only formats as midnight.
fn parse_publish_date(text: &str, format: &str) -> Result<NaiveDateTime> {
    let text = text.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
        return Ok(dt);
    }
    NaiveDate::parse_from_str(text, format)
        .map(|d| d.and_hms_opt(0, 0, 0).expect("midnight is valid"))
        .with_context(|| format!("Unparsable publish date '{text}' for format '{format}'"))
}
