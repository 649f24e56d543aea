use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use techpulse_common::Article;

/// Denormalized index projection of a persisted article.
///
/// `id` is the primary-store row id rendered as the document key; the
/// mapping is one-way and the key stays stable for the index lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDocument {
    pub id: String,
    pub title: String,
    pub content: String,
    pub company: String,
    pub publish_date: NaiveDateTime,
    pub tags: Vec<String>,
    pub url: String,
}

impl ArticleDocument {
    pub fn from_article(id: i64, article: &Article) -> Self {
        Self {
            id: id.to_string(),
            title: article.title.clone(),
            content: article.content.clone(),
            company: article.source_name.clone(),
            publish_date: article.published_at,
            tags: article.tags.iter().cloned().collect(),
            url: article.origin_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    #[test]
    fn projection_uses_store_id_as_document_key() {
        let article = Article {
            title: "Kafka at scale".to_string(),
            content: "body".to_string(),
            source_name: "kakao".to_string(),
            origin_url: "https://tech.kakao.com/posts/1".to_string(),
            published_at: NaiveDate::from_ymd_opt(2026, 8, 1)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            tags: BTreeSet::from(["kafka".to_string(), "infra".to_string()]),
        };

        let doc = ArticleDocument::from_article(42, &article);
        assert_eq!(doc.id, "42");
        assert_eq!(doc.company, "kakao");
        assert_eq!(doc.url, article.origin_url);
        assert_eq!(doc.tags, vec!["infra".to_string(), "kafka".to_string()]);

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["publishDate"], "2026-08-01T09:30:00");
    }
}
