// Weekly trend aggregation over the search index.
//
// All sub-queries of one snapshot succeed or the whole computation fails;
// there is no partially-degraded snapshot. The computation is read-only
// and idempotent for a stable index state, so callers may cache the
// result for a bounded interval.

use std::collections::BTreeMap;

use chrono::{Duration, Local, NaiveDateTime, Utc};
use tracing::info;

use techpulse_common::{TagTrend, TrendSnapshot};

use crate::client::SearchClient;
use crate::error::Result;
use crate::query::{Agg, Query, SearchBody, SortOrder};
use crate::response::Bucket;

const TREND_WINDOW_DAYS: i64 = 7;
const TOP_TAGS: u32 = 20;
const RELATED_TAG_COUNT: u32 = 6;
/// Co-occurrence floor below which a related tag is treated as noise.
const RELATED_MIN_DOC_COUNT: u64 = 2;
const COMPANY_BUCKETS: u32 = 20;
const TITLES_PER_COMPANY: u32 = 5;

pub struct TrendAggregator {
    client: SearchClient,
}

impl TrendAggregator {
    pub fn new(client: SearchClient) -> Self {
        Self { client }
    }

    /// Compute the trend snapshot for the trailing seven-day window.
    pub async fn weekly_trends(&self) -> Result<TrendSnapshot> {
        let analyzed_at = Utc::now();
        let window_start = Local::now().naive_local() - Duration::days(TREND_WINDOW_DAYS);

        let resp = self.client.search(&tag_trend_query(window_start)).await?;

        let mut keywords = Vec::new();
        for bucket in resp.buckets("tags") {
            let tag = bucket.key_str();
            let related_tags = self.related_tags(&tag).await?;
            keywords.push(TagTrend {
                count: bucket.doc_count,
                growth_rate: growth_rate(&weekly_counts(bucket)),
                related_tags,
                tag,
            });
        }

        let company_trends = self.company_trends(window_start).await?;

        info!(
            tags = keywords.len(),
            companies = company_trends.len(),
            "Weekly trend snapshot computed"
        );

        Ok(TrendSnapshot {
            keywords,
            company_trends,
            analyzed_at,
        })
    }

    /// Tags co-occurring with `tag`, most frequent first.
    async fn related_tags(&self, tag: &str) -> Result<Vec<String>> {
        let resp = self.client.search(&related_tags_query(tag)).await?;
        Ok(resp
            .buckets("related_tags")
            .iter()
            .map(Bucket::key_str)
            .collect())
    }

    /// Company name to representative post titles within the window.
    async fn company_trends(
        &self,
        window_start: NaiveDateTime,
    ) -> Result<BTreeMap<String, Vec<String>>> {
        let resp = self.client.search(&company_trend_query(window_start)).await?;

        let mut trends = BTreeMap::new();
        for bucket in resp.buckets("companies") {
            if bucket.doc_count == 0 {
                continue;
            }
            let company = bucket.key_str();
            let titles = self.company_titles(&company, window_start).await?;
            trends.insert(company, titles);
        }

        Ok(trends)
    }

    async fn company_titles(
        &self,
        company: &str,
        window_start: NaiveDateTime,
    ) -> Result<Vec<String>> {
        let resp = self
            .client
            .search(&company_titles_query(company, window_start))
            .await?;
        Ok(resp
            .hits
            .hits
            .into_iter()
            .map(|hit| hit.source.title)
            .collect())
    }
}

/// Week-over-week growth in percent, from weekly counts in bucket order.
/// Fewer than two buckets means there is nothing to compare; a previous
/// week of zero counts as 100% growth only when the current week is
/// nonzero.
pub fn growth_rate(weekly: &[u64]) -> f64 {
    if weekly.len() < 2 {
        return 0.0;
    }
    let current = weekly[weekly.len() - 1];
    let previous = weekly[weekly.len() - 2];
    if previous == 0 {
        return if current == 0 { 0.0 } else { 100.0 };
    }
    (current as f64 - previous as f64) / previous as f64 * 100.0
}

fn weekly_counts(bucket: &Bucket) -> Vec<u64> {
    bucket
        .sub_buckets("weekly")
        .iter()
        .map(|b| b.doc_count)
        .collect()
}

fn format_ts(ts: NaiveDateTime) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S").to_string()
}

fn tag_trend_query(window_start: NaiveDateTime) -> SearchBody {
    SearchBody::new()
        .query(Query::range_from("publishDate", format_ts(window_start)))
        .size(0)
        .agg(
            "tags",
            Agg::terms("tags", TOP_TAGS).sub("weekly", Agg::weekly_histogram("publishDate")),
        )
}

fn related_tags_query(tag: &str) -> SearchBody {
    SearchBody::new()
        .query(Query::term("tags", tag))
        .size(0)
        .agg(
            "related_tags",
            Agg::terms("tags", RELATED_TAG_COUNT)
                .excluding(vec![tag.to_string()])
                .min_doc_count(RELATED_MIN_DOC_COUNT),
        )
}

fn company_trend_query(window_start: NaiveDateTime) -> SearchBody {
    SearchBody::new()
        .query(Query::range_from("publishDate", format_ts(window_start)))
        .size(0)
        .agg("companies", Agg::terms("company", COMPANY_BUCKETS))
}

fn company_titles_query(company: &str, window_start: NaiveDateTime) -> SearchBody {
    SearchBody::new()
        .query(Query::bool_query(
            vec![],
            vec![
                Query::term("company", company),
                Query::range_from("publishDate", format_ts(window_start)),
            ],
        ))
        .size(TITLES_PER_COMPANY)
        .sort_by("publishDate", SortOrder::Desc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::SearchResponse;
    use serde_json::json;

    #[test]
    fn growth_is_zero_with_nothing_to_compare() {
        assert_eq!(growth_rate(&[]), 0.0);
        assert_eq!(growth_rate(&[4]), 0.0);
        assert_eq!(growth_rate(&[0, 0]), 0.0);
    }

    #[test]
    fn growth_from_zero_previous_week_is_capped() {
        assert_eq!(growth_rate(&[0, 5]), 100.0);
    }

    #[test]
    fn growth_follows_week_over_week_delta() {
        assert_eq!(growth_rate(&[10, 5]), -50.0);
        assert_eq!(growth_rate(&[5, 10]), 100.0);
        assert_eq!(growth_rate(&[1, 4, 6]), 50.0);
    }

    #[test]
    fn weekly_counts_follow_bucket_order() {
        let raw = json!({
            "key": "rust",
            "doc_count": 9,
            "weekly": {
                "buckets": [
                    { "key": 1753574400000u64, "doc_count": 3 },
                    { "key": 1754179200000u64, "doc_count": 6 },
                ]
            }
        });
        let bucket: Bucket = serde_json::from_value(raw).unwrap();
        assert_eq!(weekly_counts(&bucket), vec![3, 6]);
        assert_eq!(growth_rate(&weekly_counts(&bucket)), 100.0);
    }

    #[test]
    fn tag_trend_query_shape() {
        let window = chrono::NaiveDate::from_ymd_opt(2026, 7, 31)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(
            tag_trend_query(window).to_json(),
            json!({
                "query": { "range": { "publishDate": { "gte": "2026-07-31T12:00:00" } } },
                "size": 0,
                "aggs": {
                    "tags": {
                        "terms": { "field": "tags", "size": 20 },
                        "aggs": {
                            "weekly": {
                                "date_histogram": {
                                    "field": "publishDate",
                                    "calendar_interval": "week",
                                }
                            }
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn related_tags_query_excludes_the_tag_itself() {
        assert_eq!(
            related_tags_query("rust").to_json(),
            json!({
                "query": { "term": { "tags": "rust" } },
                "size": 0,
                "aggs": {
                    "related_tags": {
                        "terms": {
                            "field": "tags",
                            "size": 6,
                            "exclude": ["rust"],
                            "min_doc_count": 2,
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn snapshot_math_from_canned_aggregation_response() {
        let raw = json!({
            "hits": { "total": { "value": 11 } },
            "aggregations": {
                "tags": {
                    "buckets": [
                        {
                            "key": "kubernetes",
                            "doc_count": 8,
                            "weekly": { "buckets": [
                                { "key": 1, "doc_count": 2 },
                                { "key": 2, "doc_count": 6 },
                            ] }
                        },
                        {
                            "key": "mlops",
                            "doc_count": 3,
                            "weekly": { "buckets": [
                                { "key": 2, "doc_count": 3 },
                            ] }
                        }
                    ]
                }
            }
        });
        let resp: SearchResponse = serde_json::from_value(raw).unwrap();
        let rates: Vec<f64> = resp
            .buckets("tags")
            .iter()
            .map(|b| growth_rate(&weekly_counts(b)))
            .collect();
        assert_eq!(rates, vec![200.0, 0.0]);
    }
}
