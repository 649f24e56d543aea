// Trait abstractions for the crawl pipeline's dependencies.
//
// ArticleRepository wraps the primary store, DocumentSink the index
// writer, ArticleFetcher the per-kind fetch strategy. The orchestrator
// only sees these seams, so its admission and isolation behavior is
// deterministic under test with in-memory mocks: no network, no database.

use anyhow::Result;
use async_trait::async_trait;

use techpulse_common::{Article, SourceDescriptor};

#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Whether an article with this origin URL has already been admitted.
    async fn exists_by_url(&self, origin_url: &str) -> Result<bool>;

    /// Persist a candidate article. `None` means the URL lost a race to a
    /// concurrent writer and is already admitted.
    async fn insert(&self, article: &Article) -> Result<Option<i64>>;
}

#[async_trait]
pub trait DocumentSink: Send + Sync {
    /// Mirror a persisted article into the search index. Best-effort:
    /// implementations log failures and never surface them.
    async fn index(&self, id: i64, article: &Article);
}

#[async_trait]
pub trait ArticleFetcher: Send + Sync {
    /// Retrieve the source's current posts as candidate articles.
    async fn fetch(&self, source: &SourceDescriptor) -> Result<Vec<Article>>;
}

#[async_trait]
impl ArticleRepository for techpulse_store::ArticleStore {
    async fn exists_by_url(&self, origin_url: &str) -> Result<bool> {
        Ok(self.exists_by_url(origin_url).await?)
    }

    async fn insert(&self, article: &Article) -> Result<Option<i64>> {
        Ok(self.insert(article).await?)
    }
}

#[async_trait]
impl DocumentSink for techpulse_search::IndexWriter {
    async fn index(&self, id: i64, article: &Article) {
        self.index(id, article).await
    }
}
