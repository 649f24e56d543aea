use std::time::Duration;

use crate::document::ArticleDocument;
use crate::error::{Result, SearchError};
use crate::query::SearchBody;
use crate::response::SearchResponse;

/// HTTP adapter for an Elasticsearch-compatible search backend. The only
/// place query ASTs are serialized and I/O happens.
#[derive(Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    base_url: String,
    index: String,
}

impl SearchClient {
    pub fn new(base_url: &str, index: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            index: index.to_string(),
        }
    }

    /// Upsert a document under its key, replacing any existing document.
    pub async fn upsert(&self, doc: &ArticleDocument) -> Result<()> {
        let endpoint = format!("{}/{}/_doc/{}", self.base_url, self.index, doc.id);

        let resp = self.http.put(&endpoint).json(doc).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }

    /// Execute a `_search` request built from the query AST.
    pub async fn search(&self, body: &SearchBody) -> Result<SearchResponse> {
        let endpoint = format!("{}/{}/_search", self.base_url, self.index);

        let resp = self.http.post(&endpoint).json(&body.to_json()).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        resp.json::<SearchResponse>()
            .await
            .map_err(|e| SearchError::Decode(e.to_string()))
    }
}
