use techpulse_common::{PageSelectors, SourceDescriptor};

/// Static registry of crawl origins, loaded once at startup. Selector
/// values mirror each blog's published markup; feeds need nothing beyond
/// their URL.
pub fn registered_sources() -> Vec<SourceDescriptor> {
    vec![
        SourceDescriptor::feed("kakao", "카카오", "https://tech.kakao.com/feed/"),
        SourceDescriptor::feed("naver-d2", "네이버 D2", "https://d2.naver.com/d2.atom"),
        SourceDescriptor::feed("toss", "토스", "https://toss.tech/rss.xml"),
        SourceDescriptor::feed("daangn", "당근", "https://medium.com/feed/daangn"),
        SourceDescriptor::feed(
            "line",
            "라인",
            "https://techblog.lycorp.co.jp/ko/feed/index.xml",
        ),
        SourceDescriptor::rendered_page(
            "woowahan",
            "우아한형제들",
            "https://techblog.woowahan.com/",
            PageSelectors {
                list_item: ".post-list .post-item:not(.firstpaint)".to_string(),
                title: "h1.headline".to_string(),
                content: "div.entry-content".to_string(),
                tags: ".post-tags a".to_string(),
                date: "time.post-author-date".to_string(),
                date_format: "%b.%d.%Y".to_string(),
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_ids_are_unique() {
        let sources = registered_sources();
        let mut ids: Vec<_> = sources.iter().map(|s| s.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), sources.len());
    }
}
