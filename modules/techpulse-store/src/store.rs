// Postgres persistence for articles. The primary store is authoritative
// for an Article once persisted; this crate never mutates a persisted
// row except through the read-path view counter.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use techpulse_common::Article;

use crate::error::Result;

/// A persisted article row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StoredArticle {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub source_name: String,
    pub origin_url: String,
    pub published_at: NaiveDateTime,
    pub tags: Vec<String>,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct ArticleStore {
    pool: PgPool,
}

impl ArticleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Run the embedded SQL migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Whether an article with this origin URL has already been admitted.
    pub async fn exists_by_url(&self, origin_url: &str) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM articles WHERE origin_url = $1)",
        )
        .bind(origin_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Persist a new article, returning its id. The UNIQUE constraint on
    /// origin_url makes this safe against concurrent admission: a conflict
    /// returns `None`, meaning another writer got there first.
    pub async fn insert(&self, article: &Article) -> Result<Option<i64>> {
        let tags: Vec<String> = article.tags.iter().cloned().collect();

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO articles (title, content, source_name, origin_url, published_at, tags)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (origin_url) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(&article.title)
        .bind(&article.content)
        .bind(&article.source_name)
        .bind(&article.origin_url)
        .bind(article.published_at)
        .bind(&tags)
        .fetch_optional(&self.pool)
        .await?;

        Ok(id)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<StoredArticle>> {
        let row = sqlx::query_as::<_, StoredArticle>("SELECT * FROM articles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    /// Latest articles by publish date.
    pub async fn recent(&self, limit: i64) -> Result<Vec<StoredArticle>> {
        let rows = sqlx::query_as::<_, StoredArticle>(
            r#"
            SELECT * FROM articles
            ORDER BY published_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Paged scan in publish-date order, for the read path.
    pub async fn find_all(&self, offset: i64, limit: i64) -> Result<Vec<StoredArticle>> {
        let rows = sqlx::query_as::<_, StoredArticle>(
            r#"
            SELECT * FROM articles
            ORDER BY published_at DESC
            OFFSET $1 LIMIT $2
            "#,
        )
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
