// Typed view of a `_search` response: hits plus nested aggregation
// buckets. Sub-aggregations arrive as sibling keys of doc_count, so they
// are captured through a flattened map.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::document::ArticleDocument;

#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: Hits,
    #[serde(default)]
    pub aggregations: BTreeMap<String, AggResult>,
}

impl SearchResponse {
    /// Buckets of a top-level aggregation, empty if absent.
    pub fn buckets(&self, name: &str) -> &[Bucket] {
        self.aggregations
            .get(name)
            .map(|a| a.buckets.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Hits {
    #[serde(default)]
    pub total: Total,
    #[serde(default)]
    pub hits: Vec<Hit>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Total {
    #[serde(default)]
    pub value: u64,
}

#[derive(Debug, Deserialize)]
pub struct Hit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_source")]
    pub source: ArticleDocument,
}

#[derive(Debug, Default, Deserialize)]
pub struct AggResult {
    #[serde(default)]
    pub buckets: Vec<Bucket>,
}

#[derive(Debug, Deserialize)]
pub struct Bucket {
    pub key: Value,
    #[serde(default)]
    pub key_as_string: Option<String>,
    pub doc_count: u64,
    #[serde(flatten)]
    pub aggs: BTreeMap<String, AggResult>,
}

impl Bucket {
    /// Bucket key as text, whatever the underlying JSON type. Histogram
    /// buckets key on epoch millis and carry the text in key_as_string.
    pub fn key_str(&self) -> String {
        match &self.key {
            Value::String(s) => s.clone(),
            other => self
                .key_as_string
                .clone()
                .unwrap_or_else(|| other.to_string()),
        }
    }

    /// Buckets of a named sub-aggregation, empty if absent.
    pub fn sub_buckets(&self, name: &str) -> &[Bucket] {
        self.aggs
            .get(name)
            .map(|a| a.buckets.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_nested_aggregation_buckets() {
        let raw = json!({
            "hits": { "total": { "value": 12 }, "hits": [] },
            "aggregations": {
                "tags": {
                    "buckets": [
                        {
                            "key": "rust",
                            "doc_count": 7,
                            "weekly": {
                                "buckets": [
                                    { "key": 1753574400000u64, "key_as_string": "2026-07-27T00:00:00", "doc_count": 3 },
                                    { "key": 1754179200000u64, "key_as_string": "2026-08-03T00:00:00", "doc_count": 4 },
                                ]
                            }
                        }
                    ]
                }
            }
        });

        let resp: SearchResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(resp.hits.total.value, 12);

        let tags = resp.buckets("tags");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].key_str(), "rust");
        assert_eq!(tags[0].doc_count, 7);

        let weekly = tags[0].sub_buckets("weekly");
        assert_eq!(weekly.len(), 2);
        assert_eq!(weekly[0].doc_count, 3);
        assert_eq!(weekly[1].key_str(), "2026-08-03T00:00:00");
    }

    #[test]
    fn missing_aggregation_is_empty() {
        let resp: SearchResponse = serde_json::from_value(json!({ "hits": {} })).unwrap();
        assert!(resp.buckets("tags").is_empty());
    }
}
