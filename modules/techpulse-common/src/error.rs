use thiserror::Error;

#[derive(Error, Debug)]
pub enum TechPulseError {
    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Entry conversion error: {0}")]
    EntryConversion(String),

    #[error("Source crawl failed for {source_name}: {message}")]
    SourceCrawl { source_name: String, message: String },

    #[error("Index write error: {0}")]
    IndexWrite(String),

    #[error("Aggregation error: {0}")]
    Aggregation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Crawl conflict: another crawl run is in progress")]
    CrawlInProgress,

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
