use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Postgres
    pub database_url: String,

    // Search backend
    pub search_url: String,
    pub search_index: String,

    // Browserless (rendered-page crawling)
    pub browserless_url: String,
    pub browserless_token: Option<String>,

    // Web server
    pub api_host: String,
    pub api_port: u16,

    // Crawl schedule
    pub crawl_interval_hours: u64,

    // Trend snapshot cache TTL
    pub trend_cache_minutes: u64,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            database_url: required_env("DATABASE_URL"),
            search_url: required_env("SEARCH_URL"),
            search_index: env::var("SEARCH_INDEX").unwrap_or_else(|_| "articles".to_string()),
            browserless_url: required_env("BROWSERLESS_URL"),
            browserless_token: env::var("BROWSERLESS_TOKEN").ok(),
            api_host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            api_port: env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("API_PORT must be a number"),
            crawl_interval_hours: env::var("CRAWL_INTERVAL_HOURS")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .expect("CRAWL_INTERVAL_HOURS must be a number"),
            trend_cache_minutes: env::var("TREND_CACHE_MINUTES")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .expect("TREND_CACHE_MINUTES must be a number"),
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
