// Internal query AST for the search backend.
//
// Index and trend code build these nodes; only the SearchClient adapter
// serializes them to the backend's wire language and performs I/O. This
// keeps the aggregation logic testable without a live backend.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Bool { must: Vec<Query>, filter: Vec<Query> },
    MultiMatch { query: String, fields: Vec<String> },
    Term { field: String, value: String },
    Terms { field: String, values: Vec<String> },
    Range {
        field: String,
        gte: Option<String>,
        lte: Option<String>,
    },
    /// Similarity query seeded by an existing document.
    MoreLikeThis {
        fields: Vec<String>,
        like_id: String,
        min_term_freq: u32,
        max_query_terms: u32,
    },
    MatchAll,
}

impl Query {
    pub fn bool_query(must: Vec<Query>, filter: Vec<Query>) -> Self {
        Query::Bool { must, filter }
    }

    pub fn term(field: &str, value: &str) -> Self {
        Query::Term {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub fn terms(field: &str, values: &[String]) -> Self {
        Query::Terms {
            field: field.to_string(),
            values: values.to_vec(),
        }
    }

    pub fn range_from(field: &str, gte: String) -> Self {
        Query::Range {
            field: field.to_string(),
            gte: Some(gte),
            lte: None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Query::Bool { must, filter } => {
                let mut body = Map::new();
                if !must.is_empty() {
                    body.insert(
                        "must".to_string(),
                        Value::Array(must.iter().map(Query::to_json).collect()),
                    );
                }
                if !filter.is_empty() {
                    body.insert(
                        "filter".to_string(),
                        Value::Array(filter.iter().map(Query::to_json).collect()),
                    );
                }
                json!({ "bool": body })
            }
            Query::MultiMatch { query, fields } => json!({
                "multi_match": {
                    "query": query,
                    "fields": fields,
                    "type": "best_fields",
                }
            }),
            Query::Term { field, value } => json!({ "term": { field: value } }),
            Query::Terms { field, values } => json!({ "terms": { field: values } }),
            Query::Range { field, gte, lte } => {
                let mut bounds = Map::new();
                if let Some(gte) = gte {
                    bounds.insert("gte".to_string(), json!(gte));
                }
                if let Some(lte) = lte {
                    bounds.insert("lte".to_string(), json!(lte));
                }
                json!({ "range": { field: bounds } })
            }
            Query::MoreLikeThis {
                fields,
                like_id,
                min_term_freq,
                max_query_terms,
            } => json!({
                "more_like_this": {
                    "fields": fields,
                    "like": [{ "_id": like_id }],
                    "min_term_freq": min_term_freq,
                    "max_query_terms": max_query_terms,
                }
            }),
            Query::MatchAll => json!({ "match_all": {} }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Agg {
    Terms {
        field: String,
        size: u32,
        exclude: Vec<String>,
        min_doc_count: Option<u64>,
        aggs: BTreeMap<String, Agg>,
    },
    DateHistogram {
        field: String,
        calendar_interval: String,
        aggs: BTreeMap<String, Agg>,
    },
}

impl Agg {
    pub fn terms(field: &str, size: u32) -> Self {
        Agg::Terms {
            field: field.to_string(),
            size,
            exclude: Vec::new(),
            min_doc_count: None,
            aggs: BTreeMap::new(),
        }
    }

    pub fn weekly_histogram(field: &str) -> Self {
        Agg::DateHistogram {
            field: field.to_string(),
            calendar_interval: "week".to_string(),
            aggs: BTreeMap::new(),
        }
    }

    pub fn excluding(mut self, values: Vec<String>) -> Self {
        if let Agg::Terms { ref mut exclude, .. } = self {
            *exclude = values;
        }
        self
    }

    pub fn min_doc_count(mut self, min: u64) -> Self {
        if let Agg::Terms {
            ref mut min_doc_count,
            ..
        } = self
        {
            *min_doc_count = Some(min);
        }
        self
    }

    pub fn sub(mut self, name: &str, agg: Agg) -> Self {
        match self {
            Agg::Terms { ref mut aggs, .. } | Agg::DateHistogram { ref mut aggs, .. } => {
                aggs.insert(name.to_string(), agg);
            }
        }
        self
    }

    pub fn to_json(&self) -> Value {
        match self {
            Agg::Terms {
                field,
                size,
                exclude,
                min_doc_count,
                aggs,
            } => {
                let mut terms = Map::new();
                terms.insert("field".to_string(), json!(field));
                terms.insert("size".to_string(), json!(size));
                if !exclude.is_empty() {
                    terms.insert("exclude".to_string(), json!(exclude));
                }
                if let Some(min) = min_doc_count {
                    terms.insert("min_doc_count".to_string(), json!(min));
                }
                let mut node = Map::new();
                node.insert("terms".to_string(), Value::Object(terms));
                if !aggs.is_empty() {
                    node.insert("aggs".to_string(), subaggs_json(aggs));
                }
                Value::Object(node)
            }
            Agg::DateHistogram {
                field,
                calendar_interval,
                aggs,
            } => {
                let mut node = Map::new();
                node.insert(
                    "date_histogram".to_string(),
                    json!({ "field": field, "calendar_interval": calendar_interval }),
                );
                if !aggs.is_empty() {
                    node.insert("aggs".to_string(), subaggs_json(aggs));
                }
                Value::Object(node)
            }
        }
    }
}

fn subaggs_json(aggs: &BTreeMap<String, Agg>) -> Value {
    Value::Object(
        aggs.iter()
            .map(|(name, agg)| (name.clone(), agg.to_json()))
            .collect(),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Envelope for one `_search` request.
#[derive(Debug, Clone, Default)]
pub struct SearchBody {
    pub query: Option<Query>,
    pub aggs: BTreeMap<String, Agg>,
    pub size: Option<u32>,
    pub from: Option<u32>,
    pub sort: Vec<(String, SortOrder)>,
}

impl SearchBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, query: Query) -> Self {
        self.query = Some(query);
        self
    }

    pub fn agg(mut self, name: &str, agg: Agg) -> Self {
        self.aggs.insert(name.to_string(), agg);
        self
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn from(mut self, from: u32) -> Self {
        self.from = Some(from);
        self
    }

    pub fn sort_by(mut self, field: &str, order: SortOrder) -> Self {
        self.sort.push((field.to_string(), order));
        self
    }

    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        if let Some(ref query) = self.query {
            body.insert("query".to_string(), query.to_json());
        }
        if let Some(size) = self.size {
            body.insert("size".to_string(), json!(size));
        }
        if let Some(from) = self.from {
            body.insert("from".to_string(), json!(from));
        }
        if !self.sort.is_empty() {
            let sort: Vec<Value> = self
                .sort
                .iter()
                .map(|(field, order)| {
                    let order = match order {
                        SortOrder::Asc => "asc",
                        SortOrder::Desc => "desc",
                    };
                    json!({ field: { "order": order } })
                })
                .collect();
            body.insert("sort".to_string(), Value::Array(sort));
        }
        if !self.aggs.is_empty() {
            body.insert("aggs".to_string(), subaggs_json(&self.aggs));
        }
        Value::Object(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_query_omits_empty_clauses() {
        let q = Query::bool_query(vec![Query::MatchAll], vec![]);
        assert_eq!(q.to_json(), json!({ "bool": { "must": [{ "match_all": {} }] } }));
    }

    #[test]
    fn range_query_serializes_bounds() {
        let q = Query::range_from("publishDate", "2026-01-01T00:00:00".to_string());
        assert_eq!(
            q.to_json(),
            json!({ "range": { "publishDate": { "gte": "2026-01-01T00:00:00" } } })
        );
    }

    #[test]
    fn terms_agg_with_week_histogram() {
        let agg = Agg::terms("tags", 20).sub("weekly", Agg::weekly_histogram("publishDate"));
        assert_eq!(
            agg.to_json(),
            json!({
                "terms": { "field": "tags", "size": 20 },
                "aggs": {
                    "weekly": {
                        "date_histogram": {
                            "field": "publishDate",
                            "calendar_interval": "week",
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn terms_agg_exclude_and_floor() {
        let agg = Agg::terms("tags", 6)
            .excluding(vec!["rust".to_string()])
            .min_doc_count(2);
        assert_eq!(
            agg.to_json(),
            json!({
                "terms": {
                    "field": "tags",
                    "size": 6,
                    "exclude": ["rust"],
                    "min_doc_count": 2,
                }
            })
        );
    }

    #[test]
    fn more_like_this_seeds_from_document_id() {
        let q = Query::MoreLikeThis {
            fields: vec!["title".to_string(), "content".to_string(), "tags".to_string()],
            like_id: "42".to_string(),
            min_term_freq: 1,
            max_query_terms: 12,
        };
        assert_eq!(
            q.to_json(),
            json!({
                "more_like_this": {
                    "fields": ["title", "content", "tags"],
                    "like": [{ "_id": "42" }],
                    "min_term_freq": 1,
                    "max_query_terms": 12,
                }
            })
        );
    }

    #[test]
    fn search_body_assembles_envelope() {
        let body = SearchBody::new()
            .query(Query::term("company", "kakao"))
            .size(5)
            .from(10)
            .sort_by("publishDate", SortOrder::Desc);
        assert_eq!(
            body.to_json(),
            json!({
                "query": { "term": { "company": "kakao" } },
                "size": 5,
                "from": 10,
                "sort": [{ "publishDate": { "order": "desc" } }],
            })
        );
    }
}
