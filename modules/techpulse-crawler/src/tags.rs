use std::collections::BTreeSet;

use scraper::{Html, Selector};

/// Anchors whose destination marks a tag or category affordance.
const TAG_ANCHOR_SELECTOR: &str = r#"a[href*="tag"], a[href*="category"]"#;

/// Derive the normalized tag set from an HTML fragment: anchor text of
/// tag/category links, trimmed and lowercased, empties dropped. Parsing
/// is lenient, so malformed HTML degrades to whatever anchors survive,
/// never to an error.
pub fn extract_tags(html: &str) -> BTreeSet<String> {
    let selector = Selector::parse(TAG_ANCHOR_SELECTOR).expect("valid selector");
    let fragment = Html::parse_fragment(html);

    fragment
        .select(&selector)
        .map(|anchor| anchor.text().collect::<String>().trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect()
}
