use std::sync::LazyLock;

use regex::Regex;

use crate::pipeline::pool::dedup_in_order;

static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<link\b[^>]*>").expect("valid regex"));

static REL_STYLESHEET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\brel\s*=\s*["']?[^"'>]*\bstylesheet\b"#).expect("valid regex")
});

static HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#).expect("valid regex")
});

static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"@import\s+(?:url\(\s*)?['"]([^'"]+)['"]"#).expect("valid regex")
});

static IMG_SRC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<img\b[^>]*?\bsrc\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#)
        .expect("valid regex")
});

static BG_IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"background-image\s*:\s*url\(\s*['"]?([^'")\s]+)['"]?\s*\)"#).expect("valid regex")
});

fn first_group(caps: &regex::Captures<'_>) -> Option<String> {
    (1..caps.len())
        .find_map(|i| caps.get(i))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Stylesheet references in an HTML document: `<link rel="stylesheet">`
/// hrefs and `@import` targets, in document order without repeats.
pub fn stylesheet_urls(html: &str) -> Vec<String> {
    let mut urls: Vec<String> = LINK_RE
        .find_iter(html)
        .filter(|tag| REL_STYLESHEET_RE.is_match(tag.as_str()))
        .filter_map(|tag| HREF_RE.captures(tag.as_str()).and_then(|c| first_group(&c)))
        .collect();
    urls.extend(
        IMPORT_RE
            .captures_iter(html)
            .filter_map(|c| first_group(&c)),
    );
    dedup_in_order(&mut urls);
    urls
}

/// Image references in an HTML document: `<img src>` and inline
/// `background-image: url(...)`, in document order without repeats.
pub fn image_urls(html: &str) -> Vec<String> {
    let mut urls: Vec<String> = IMG_SRC_RE
        .captures_iter(html)
        .filter_map(|c| first_group(&c))
        .collect();
    urls.extend(
        BG_IMAGE_RE
            .captures_iter(html)
            .filter_map(|c| first_group(&c)),
    );
    urls.retain(|u| !u.starts_with("data:"));
    dedup_in_order(&mut urls);
    urls
}

/// Whether a reference points off the local filesystem.
pub fn is_remote(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("//")
}
