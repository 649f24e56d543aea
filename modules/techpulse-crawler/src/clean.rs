// Content cleaning for crawled post bodies.
//
// Keeps the readable text of a post and nothing else: script/style/nav
// subtrees and comments are dropped, block boundaries become paragraph
// breaks, entity references are resolved by the HTML parser, and
// whitespace is normalized so no run of blank lines survives.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));

/// Subtrees that carry no article text. One pattern per tag; the regex
/// crate has no backreferences.
static EXCLUDED_SUBTREES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["script", "style", "nav", "noscript", "iframe"]
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>")).expect("valid regex")
        })
        .collect()
});

static BLOCK_CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)</(?:p|div|section|article|li|ul|ol|h[1-6]|blockquote|pre|table|tr|figure|figcaption)\s*>",
    )
    .expect("valid regex")
});

static LINE_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid regex"));

static SPACE_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[ \\t\\r\u{00a0}]+").expect("valid regex"));

static BLANK_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Reduce a post body to clean plain text.
pub fn clean_content(html: &str) -> String {
    let mut stripped = COMMENT_RE.replace_all(html, "").into_owned();
    for re in EXCLUDED_SUBTREES.iter() {
        stripped = re.replace_all(&stripped, "").into_owned();
    }

    // Mark block boundaries before parsing: a closed block becomes a
    // paragraph break, <br> a line break. The markers land in text nodes
    // and survive extraction.
    let stripped = BLOCK_CLOSE_RE.replace_all(&stripped, "$0\n\n");
    let stripped = LINE_BREAK_RE.replace_all(&stripped, "$0\n");

    let fragment = Html::parse_fragment(&stripped);
    let text: String = fragment.root_element().text().collect();

    let text = SPACE_RUN_RE.replace_all(&text, " ");
    let text = text
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");
    let text = BLANK_RUN_RE.replace_all(&text, "\n\n");

    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_script_and_collapses_blank_runs() {
        let html = "<script>x</script><p>Hello</p>\n\n\n<p>World</p>";
        assert_eq!(clean_content(html), "Hello\n\nWorld");
    }

    #[test]
    fn drops_style_nav_and_comments() {
        let html = concat!(
            "<nav><a href=\"/\">home</a></nav>",
            "<style>p { color: red }</style>",
            "<!-- tracking pixel -->",
            "<p>Body text</p>",
        );
        assert_eq!(clean_content(html), "Body text");
    }

    #[test]
    fn adjacent_blocks_become_paragraphs() {
        assert_eq!(clean_content("<div>A</div><div>B</div>"), "A\n\nB");
        assert_eq!(clean_content("<p>a <b>bold</b> c</p>"), "a bold c");
    }

    #[test]
    fn line_breaks_stay_single() {
        assert_eq!(clean_content("<p>one<br>two</p>"), "one\ntwo");
    }

    #[test]
    fn resolves_entities_and_squeezes_spaces() {
        assert_eq!(clean_content("<p>R&amp;D   team</p>"), "R&D team");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(clean_content("  just text  "), "just text");
        assert_eq!(clean_content(""), "");
    }
}
