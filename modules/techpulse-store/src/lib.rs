pub mod error;
pub mod store;

pub use error::{Result, StoreError};
pub use store::{ArticleStore, StoredArticle};
