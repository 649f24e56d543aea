use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;
use tracing::{error, info};
use uuid::Uuid;

use techpulse_common::{Article, SourceDescriptor, SourceKind, TechPulseError};

use crate::traits::{ArticleFetcher, ArticleRepository, DocumentSink};

/// Admission check for candidate articles: one article per origin URL,
/// across the whole corpus.
pub struct DedupGate {
    repository: Arc<dyn ArticleRepository>,
}

impl DedupGate {
    pub fn new(repository: Arc<dyn ArticleRepository>) -> Self {
        Self { repository }
    }

    pub async fn admit(&self, article: &Article) -> Result<bool> {
        Ok(!self
            .repository
            .exists_by_url(&article.origin_url)
            .await?)
    }
}

/// Stats from one crawl run.
#[derive(Debug, Default)]
pub struct CrawlStats {
    pub sources_crawled: u32,
    pub sources_failed: u32,
    pub articles_fetched: u32,
    pub articles_admitted: u32,
    pub articles_duplicate: u32,
    /// Newly admitted article count per source display name.
    pub admitted_by_source: BTreeMap<String, u32>,
}

impl std::fmt::Display for CrawlStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Crawl Run Complete ===")?;
        writeln!(f, "Sources crawled:    {}", self.sources_crawled)?;
        writeln!(f, "Sources failed:     {}", self.sources_failed)?;
        writeln!(f, "Articles fetched:   {}", self.articles_fetched)?;
        writeln!(f, "Newly admitted:     {}", self.articles_admitted)?;
        writeln!(f, "Duplicates skipped: {}", self.articles_duplicate)?;
        if !self.admitted_by_source.is_empty() {
            writeln!(f, "\nAdmitted by source:")?;
            for (source, count) in &self.admitted_by_source {
                writeln!(f, "  {source}: {count}")?;
            }
        }
        Ok(())
    }
}

/// Drives one crawl cycle over every registered source: fetch, dedup,
/// persist, index. One failing source never prevents the others from
/// running, and a run never overlaps another.
pub struct CrawlOrchestrator {
    sources: Vec<SourceDescriptor>,
    feed_fetcher: Box<dyn ArticleFetcher>,
    page_fetcher: Box<dyn ArticleFetcher>,
    gate: DedupGate,
    repository: Arc<dyn ArticleRepository>,
    sink: Arc<dyn DocumentSink>,
    run_guard: Mutex<()>,
}

impl CrawlOrchestrator {
    pub fn new(
        sources: Vec<SourceDescriptor>,
        feed_fetcher: Box<dyn ArticleFetcher>,
        page_fetcher: Box<dyn ArticleFetcher>,
        repository: Arc<dyn ArticleRepository>,
        sink: Arc<dyn DocumentSink>,
    ) -> Self {
        Self {
            sources,
            feed_fetcher,
            page_fetcher,
            gate: DedupGate::new(repository.clone()),
            repository,
            sink,
            run_guard: Mutex::new(()),
        }
    }

    /// Crawl every registered source exactly once. Fails fast if another
    /// run is active; individual source failures are contained.
    pub async fn run(&self) -> std::result::Result<CrawlStats, TechPulseError> {
        let _guard = self
            .run_guard
            .try_lock()
            .map_err(|_| TechPulseError::CrawlInProgress)?;

        let run_id = Uuid::new_v4();
        info!(%run_id, sources = self.sources.len(), "Crawl run starting");

        let mut stats = CrawlStats::default();
        for source in &self.sources {
            match self.crawl_source(source, &mut stats).await {
                Ok(()) => stats.sources_crawled += 1,
                Err(e) => {
                    error!(
                        source = %source.display_name,
                        error = %e,
                        "Source crawl failed, moving to next source"
                    );
                    stats.sources_failed += 1;
                }
            }
        }

        info!(%run_id, "{stats}");
        Ok(stats)
    }

    async fn crawl_source(
        &self,
        source: &SourceDescriptor,
        stats: &mut CrawlStats,
    ) -> std::result::Result<(), TechPulseError> {
        info!(source = %source.display_name, "Crawling source");

        let fetcher = match source.kind {
            SourceKind::Feed { .. } => &self.feed_fetcher,
            SourceKind::RenderedPage { .. } => &self.page_fetcher,
        };

        let articles =
            fetcher
                .fetch(source)
                .await
                .map_err(|e| TechPulseError::SourceCrawl {
                    source_name: source.display_name.clone(),
                    message: e.to_string(),
                })?;
        stats.articles_fetched += articles.len() as u32;

        let mut admitted = 0u32;
        for article in &articles {
            if !self
                .gate
                .admit(article)
                .await
                .map_err(|e| TechPulseError::Database(e.to_string()))?
            {
                stats.articles_duplicate += 1;
                continue;
            }

            // The gate is check-then-act: the UNIQUE constraint closes the
            // race, and a conflicting insert means already admitted.
            let Some(id) = self
                .repository
                .insert(article)
                .await
                .map_err(|e| TechPulseError::Database(e.to_string()))?
            else {
                stats.articles_duplicate += 1;
                continue;
            };

            info!(
                source = %source.display_name,
                article_id = id,
                title = %article.title,
                "New article persisted"
            );
            self.sink.index(id, article).await;
            admitted += 1;
        }

        stats.articles_admitted += admitted;
        stats
            .admitted_by_source
            .insert(source.display_name.clone(), admitted);

        info!(
            source = %source.display_name,
            fetched = articles.len(),
            admitted,
            "Source crawl complete"
        );
        Ok(())
    }
}
