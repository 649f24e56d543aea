use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use browserless_client::BrowserlessClient;
use techpulse_common::{Config, TrendSnapshot};
use techpulse_crawler::{scheduler, sources, CrawlOrchestrator, FeedFetcher, RenderedPageFetcher};
use techpulse_search::{IndexWriter, PostSearcher, SearchClient, TrendAggregator};
use techpulse_store::ArticleStore;

mod rest;

pub struct CachedTrends {
    pub computed: Instant,
    pub snapshot: TrendSnapshot,
}

pub struct AppState {
    pub orchestrator: Arc<CrawlOrchestrator>,
    pub store: ArticleStore,
    pub searcher: PostSearcher,
    pub trends: TrendAggregator,
    pub trend_cache: Mutex<Option<CachedTrends>>,
    pub trend_cache_ttl: Duration,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();

    let store = ArticleStore::connect(&config.database_url).await?;
    store.migrate().await?;

    let search_client = SearchClient::new(&config.search_url, &config.search_index);
    let index_writer = IndexWriter::new(search_client.clone());

    // The browser session handle: one per process, shared by reference
    // with the rendered-page fetcher, released on shutdown.
    let browser = Arc::new(BrowserlessClient::new(
        &config.browserless_url,
        config.browserless_token.as_deref(),
    ));

    let orchestrator = Arc::new(CrawlOrchestrator::new(
        sources::registered_sources(),
        Box::new(FeedFetcher::new()),
        Box::new(RenderedPageFetcher::new(browser)),
        Arc::new(store.clone()),
        Arc::new(index_writer),
    ));

    let _scheduler = scheduler::start(
        orchestrator.clone(),
        Duration::from_secs(config.crawl_interval_hours * 3600),
    );

    let state = Arc::new(AppState {
        orchestrator,
        store,
        searcher: PostSearcher::new(search_client.clone()),
        trends: TrendAggregator::new(search_client),
        trend_cache: Mutex::new(None),
        trend_cache_ttl: Duration::from_secs(config.trend_cache_minutes * 60),
    });

    let app = Router::new()
        // Health check
        .route("/", get(|| async { "ok" }))
        // Administrative crawl kickoff
        .route("/api/crawl/start", post(rest::start_crawl))
        // Read path
        .route("/api/trends/weekly", get(rest::weekly_trends))
        .route("/api/posts/recent", get(rest::recent_posts))
        .route("/api/posts/search", get(rest::search_posts))
        .route("/api/posts/{id}/similar", get(rest::similar_posts))
        .with_state(state)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        );

    let addr = format!("{}:{}", config.api_host, config.api_port);
    info!("techpulse API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
