// Full-text post search over the index: keyword with title boost,
// company/tag filters, publish-date window, newest first.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::client::SearchClient;
use crate::document::ArticleDocument;
use crate::error::Result;
use crate::query::{Query, SearchBody, SortOrder};

/// Filters for one search call. Empty filters match everything.
#[derive(Debug, Clone, Default)]
pub struct PostSearchRequest {
    pub keyword: Option<String>,
    pub companies: Vec<String>,
    pub tags: Vec<String>,
    pub from_date: Option<NaiveDateTime>,
    pub to_date: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize)]
pub struct PostPage {
    pub total: u64,
    pub posts: Vec<ArticleDocument>,
}

pub struct PostSearcher {
    client: SearchClient,
}

impl PostSearcher {
    pub fn new(client: SearchClient) -> Self {
        Self { client }
    }

    pub async fn search(
        &self,
        request: &PostSearchRequest,
        page: u32,
        size: u32,
    ) -> Result<PostPage> {
        let resp = self.client.search(&search_body(request, page, size)).await?;

        Ok(PostPage {
            total: resp.hits.total.value,
            posts: resp.hits.hits.into_iter().map(|h| h.source).collect(),
        })
    }

    /// Posts similar to an indexed document, by title/content/tag terms.
    pub async fn similar(&self, document_id: &str, size: u32) -> Result<PostPage> {
        let body = SearchBody::new()
            .query(Query::MoreLikeThis {
                fields: vec![
                    "title".to_string(),
                    "content".to_string(),
                    "tags".to_string(),
                ],
                like_id: document_id.to_string(),
                min_term_freq: 1,
                max_query_terms: 12,
            })
            .size(size);
        let resp = self.client.search(&body).await?;

        Ok(PostPage {
            total: resp.hits.total.value,
            posts: resp.hits.hits.into_iter().map(|h| h.source).collect(),
        })
    }
}

fn search_body(request: &PostSearchRequest, page: u32, size: u32) -> SearchBody {
    let mut must = Vec::new();
    let mut filter = Vec::new();

    if let Some(keyword) = request.keyword.as_deref() {
        if !keyword.trim().is_empty() {
            must.push(Query::MultiMatch {
                query: keyword.to_string(),
                fields: vec!["title^2".to_string(), "content".to_string()],
            });
        }
    }
    if !request.companies.is_empty() {
        filter.push(Query::terms("company", &request.companies));
    }
    if !request.tags.is_empty() {
        filter.push(Query::terms("tags", &request.tags));
    }
    if request.from_date.is_some() || request.to_date.is_some() {
        filter.push(Query::Range {
            field: "publishDate".to_string(),
            gte: request.from_date.map(format_ts),
            lte: request.to_date.map(format_ts),
        });
    }

    let query = if must.is_empty() && filter.is_empty() {
        Query::MatchAll
    } else {
        Query::bool_query(must, filter)
    };

    SearchBody::new()
        .query(query)
        .from(page * size)
        .size(size)
        .sort_by("publishDate", SortOrder::Desc)
}

fn format_ts(ts: NaiveDateTime) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_request_matches_everything() {
        let body = search_body(&PostSearchRequest::default(), 0, 10);
        assert_eq!(
            body.to_json(),
            json!({
                "query": { "match_all": {} },
                "size": 10,
                "from": 0,
                "sort": [{ "publishDate": { "order": "desc" } }],
            })
        );
    }

    #[test]
    fn keyword_boosts_title_and_filters_compose() {
        let request = PostSearchRequest {
            keyword: Some("observability".to_string()),
            companies: vec!["kakao".to_string(), "toss".to_string()],
            tags: vec!["sre".to_string()],
            ..Default::default()
        };
        let body = search_body(&request, 2, 20);
        assert_eq!(
            body.to_json(),
            json!({
                "query": {
                    "bool": {
                        "must": [{
                            "multi_match": {
                                "query": "observability",
                                "fields": ["title^2", "content"],
                                "type": "best_fields",
                            }
                        }],
                        "filter": [
                            { "terms": { "company": ["kakao", "toss"] } },
                            { "terms": { "tags": ["sre"] } },
                        ],
                    }
                },
                "size": 20,
                "from": 40,
                "sort": [{ "publishDate": { "order": "desc" } }],
            })
        );
    }

    #[test]
    fn open_ended_date_window_keeps_one_bound() {
        let from = chrono::NaiveDate::from_ymd_opt(2026, 8, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let request = PostSearchRequest {
            from_date: Some(from),
            ..Default::default()
        };
        let body = search_body(&request, 0, 10).to_json();
        assert_eq!(
            body["query"]["bool"]["filter"][0],
            json!({ "range": { "publishDate": { "gte": "2026-08-01T00:00:00" } } })
        );
    }
}
