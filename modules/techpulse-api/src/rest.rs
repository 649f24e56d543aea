use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use techpulse_common::TechPulseError;
use techpulse_search::PostSearchRequest;

use crate::{AppState, CachedTrends};

/// Kick off a crawl run synchronously and report its stats. A run that
/// is already active answers 409 rather than queueing.
pub async fn start_crawl(State(state): State<Arc<AppState>>) -> Response {
    match state.orchestrator.run().await {
        Ok(stats) => (
            StatusCode::OK,
            Json(json!({
                "sourcesCrawled": stats.sources_crawled,
                "sourcesFailed": stats.sources_failed,
                "articlesFetched": stats.articles_fetched,
                "newArticles": stats.articles_admitted,
                "duplicatesSkipped": stats.articles_duplicate,
                "admittedBySource": stats.admitted_by_source,
            })),
        )
            .into_response(),
        Err(TechPulseError::CrawlInProgress) => (
            StatusCode::CONFLICT,
            Json(json!({ "error": "crawl already in progress" })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Manual crawl failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// Serve the weekly trend snapshot, recomputing it when the cached copy
/// has aged out. Aggregation failures surface as errors, never as a
/// partial snapshot.
pub async fn weekly_trends(State(state): State<Arc<AppState>>) -> Response {
    let mut cache = state.trend_cache.lock().await;

    if let Some(cached) = cache.as_ref() {
        if cached.computed.elapsed() < state.trend_cache_ttl {
            return Json(cached.snapshot.clone()).into_response();
        }
    }

    match state.trends.weekly_trends().await {
        Ok(snapshot) => {
            let response = Json(snapshot.clone()).into_response();
            *cache = Some(CachedTrends {
                computed: Instant::now(),
                snapshot,
            });
            response
        }
        Err(e) => {
            error!(error = %e, "Trend aggregation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "trend aggregation failed" })),
            )
                .into_response()
        }
    }
}

#[derive(Deserialize)]
pub struct RecentParams {
    size: Option<i64>,
}

pub async fn recent_posts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RecentParams>,
) -> Response {
    let size = params.size.unwrap_or(10).clamp(1, 100);
    match state.store.recent(size).await {
        Ok(articles) => Json(articles).into_response(),
        Err(e) => {
            error!(error = %e, "Recent posts query failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "query failed" })),
            )
                .into_response()
        }
    }
}

#[derive(Deserialize)]
pub struct SearchParams {
    keyword: Option<String>,
    /// Comma-separated company names.
    companies: Option<String>,
    /// Comma-separated tags.
    tags: Option<String>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    page: Option<u32>,
    size: Option<u32>,
}

pub async fn search_posts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Response {
    let request = PostSearchRequest {
        keyword: params.keyword,
        companies: split_csv(params.companies.as_deref()),
        tags: split_csv(params.tags.as_deref()),
        from_date: params.from.and_then(|d| d.and_hms_opt(0, 0, 0)),
        to_date: params.to.and_then(|d| d.and_hms_opt(23, 59, 59)),
    };
    let page = params.page.unwrap_or(0);
    let size = params.size.unwrap_or(20).clamp(1, 100);

    match state.searcher.search(&request, page, size).await {
        Ok(results) => Json(results).into_response(),
        Err(e) => {
            error!(error = %e, "Post search failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "search failed" })),
            )
                .into_response()
        }
    }
}

pub async fn similar_posts(
    State(state): State<Arc<AppState>>,
    axum::extract::Path(id): axum::extract::Path<i64>,
) -> Response {
    match state.searcher.similar(&id.to_string(), 5).await {
        Ok(results) => Json(results).into_response(),
        Err(e) => {
            error!(error = %e, article_id = id, "Similar posts query failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "query failed" })),
            )
                .into_response()
        }
    }
}

fn split_csv(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_params_split_and_trim() {
        assert_eq!(
            split_csv(Some("kakao, toss ,,naver")),
            vec!["kakao", "toss", "naver"]
        );
        assert!(split_csv(None).is_empty());
        assert!(split_csv(Some("")).is_empty());
    }
}
