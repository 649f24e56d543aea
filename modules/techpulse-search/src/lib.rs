pub mod client;
pub mod document;
pub mod error;
pub mod indexer;
pub mod posts;
pub mod query;
pub mod response;
pub mod trends;

pub use client::SearchClient;
pub use document::ArticleDocument;
pub use error::{Result, SearchError};
pub use indexer::IndexWriter;
pub use posts::{PostPage, PostSearchRequest, PostSearcher};
pub use trends::TrendAggregator;
