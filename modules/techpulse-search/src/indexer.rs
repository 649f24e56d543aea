use tracing::{debug, warn};

use techpulse_common::Article;

use crate::client::SearchClient;
use crate::document::ArticleDocument;

/// Mirrors persisted articles into the search index.
///
/// Index writes are best-effort: a failure is logged here and never
/// propagates, and the primary-store write it mirrors is not rolled back.
/// An article whose index write failed stays unindexed until explicitly
/// repaired, since its origin URL is already admitted and a re-crawl will
/// not reach it again.
pub struct IndexWriter {
    client: SearchClient,
}

impl IndexWriter {
    pub fn new(client: SearchClient) -> Self {
        Self { client }
    }

    pub async fn index(&self, id: i64, article: &Article) {
        let doc = ArticleDocument::from_article(id, article);
        match self.client.upsert(&doc).await {
            Ok(()) => debug!(article_id = id, url = %article.origin_url, "Indexed article"),
            Err(e) => warn!(
                article_id = id,
                url = %article.origin_url,
                error = %e,
                "Index write failed, article stays unindexed"
            ),
        }
    }
}
