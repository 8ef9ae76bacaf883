use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

use crate::color::Color;
use crate::pipeline::pool::{dedup_in_order, CandidatePool, Category};

/// Named CSS colors recognized inside declarations.
const NAMED_COLORS: [(&str, Color); 20] = [
    ("black", Color::new(0x00, 0x00, 0x00)),
    ("white", Color::new(0xff, 0xff, 0xff)),
    ("red", Color::new(0xff, 0x00, 0x00)),
    ("green", Color::new(0x00, 0x80, 0x00)),
    ("blue", Color::new(0x00, 0x00, 0xff)),
    ("yellow", Color::new(0xff, 0xff, 0x00)),
    ("purple", Color::new(0x80, 0x00, 0x80)),
    ("orange", Color::new(0xff, 0xa5, 0x00)),
    ("gray", Color::new(0x80, 0x80, 0x80)),
    ("grey", Color::new(0x80, 0x80, 0x80)),
    ("pink", Color::new(0xff, 0xc0, 0xcb)),
    ("brown", Color::new(0xa5, 0x2a, 0x2a)),
    ("navy", Color::new(0x00, 0x00, 0x80)),
    ("teal", Color::new(0x00, 0x80, 0x80)),
    ("maroon", Color::new(0x80, 0x00, 0x00)),
    ("olive", Color::new(0x80, 0x80, 0x00)),
    ("silver", Color::new(0xc0, 0xc0, 0xc0)),
    ("lime", Color::new(0x00, 0xff, 0x00)),
    ("cyan", Color::new(0x00, 0xff, 0xff)),
    ("magenta", Color::new(0xff, 0x00, 0xff)),
];

/// Hex and `rgb()` literals anywhere in a blob.
static FLAT_COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?P<entity>&)?#(?P<hex>[0-9a-fA-F]{6}|[0-9a-fA-F]{3})\b|rgb\(\s*(?P<r>\d{1,3})\s*,\s*(?P<g>\d{1,3})\s*,\s*(?P<b>\d{1,3})\s*\)",
    )
    .expect("valid regex")
});

/// Hex, `rgb()`/`rgba()` and named colors inside a single declaration value.
static VALUE_COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    let names: Vec<&str> = NAMED_COLORS.iter().map(|(name, _)| *name).collect();
    Regex::new(&format!(
        r"(?i)(?P<entity>&)?#(?P<hex>[0-9a-f]{{6}}|[0-9a-f]{{3}})\b|rgba?\(\s*(?P<r>\d{{1,3}})\s*,\s*(?P<g>\d{{1,3}})\s*,\s*(?P<b>\d{{1,3}})\s*(?:,\s*[0-9.]+%?\s*)?\)|\b(?P<name>{})\b",
        names.join("|")
    ))
    .expect("valid regex")
});

/// `url(...)` arguments and custom property names, which can spell color
/// words without being colors.
static NON_COLOR_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)url\(\s*(?:"[^"]*"|'[^']*'|[^)]*)\s*\)|--[\w-]+"#).expect("valid regex")
});

static STYLE_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style[^>]*>(.*?)</style>").expect("valid regex"));

static STYLE_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\sstyle\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid regex")
});

/// Why structured parsing gave up on a blob.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CssParseError {
    UnexpectedClose(usize),
    Unclosed(usize),
}

/// Scan a blob for hex and `rgb()` literals.
///
/// Shorthand hex is expanded, out-of-range `rgb()` literals are skipped and
/// repeats are dropped keeping the first occurrence.
pub fn extract_css_colors(text: &str) -> Vec<Color> {
    let mut colors: Vec<Color> = FLAT_COLOR_RE
        .captures_iter(text)
        .filter_map(|caps| color_from_captures(&caps))
        .collect();
    dedup_in_order(&mut colors);
    colors
}

/// Flat scan of the styling inside an HTML document: `<style>` blocks and
/// `style="..."` attributes, in document order. Text content is skipped.
pub fn extract_html_colors(html: &str) -> Vec<Color> {
    let blocks = STYLE_TAG_RE.captures_iter(html).filter_map(|caps| caps.get(1));
    let attrs = STYLE_ATTR_RE
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)));
    let mut sources: Vec<_> = blocks.chain(attrs).collect();
    sources.sort_by_key(|m| m.start());

    let mut colors: Vec<Color> = sources
        .iter()
        .flat_map(|m| extract_css_colors(m.as_str()))
        .collect();
    dedup_in_order(&mut colors);
    colors
}

/// Parse declarations out of CSS (or HTML with `<style>` blocks and
/// `style="..."` attributes) and sort their colors by property category.
///
/// If the stylesheet cannot be parsed, every literal the flat scan finds
/// lands in the background category instead.
pub fn extract_categorized_colors(text: &str) -> CandidatePool {
    let mut pool = CandidatePool::new();
    if text.trim().is_empty() {
        return pool;
    }

    match declarations(text) {
        Ok(decls) => {
            for (property, value) in decls {
                if let Some(category) = Category::from_property(&property) {
                    pool.extend(category, colors_in_value(&value));
                }
            }
        }
        Err(err) => {
            debug!(?err, "structured CSS parse failed, falling back to flat scan");
            pool.extend(Category::Background, extract_css_colors(text));
        }
    }

    pool
}

/// Every color literal in one declaration value, in source order.
///
/// Resource URLs and custom property names are ignored, and a color name
/// only counts as a whole token, not as part of a file or variable name.
pub fn colors_in_value(value: &str) -> Vec<Color> {
    let value = NON_COLOR_TOKEN_RE.replace_all(value, " ");
    VALUE_COLOR_RE
        .captures_iter(&value)
        .filter(|caps| {
            caps.name("name")
                .map_or(true, |m| is_standalone(&value, m.start(), m.end()))
        })
        .filter_map(|caps| color_from_captures(&caps))
        .collect()
}

/// Whether `text[start..end]` is not glued to a path or identifier.
fn is_standalone(text: &str, start: usize, end: usize) -> bool {
    let joins = |c: char| matches!(c, '-' | '/' | '.' | '_');
    !text[..start].chars().next_back().is_some_and(joins)
        && !text[end..].chars().next().is_some_and(joins)
}

fn color_from_captures(caps: &Captures<'_>) -> Option<Color> {
    if caps.name("entity").is_some() {
        // `&#169;` is a character reference.
        return None;
    }
    let parsed = if let Some(hex) = caps.name("hex") {
        Color::from_hex(hex.as_str())
    } else if let Some(name) = caps.name("name") {
        let name = name.as_str().to_ascii_lowercase();
        return NAMED_COLORS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, c)| *c);
    } else {
        let channel = |key: &str| {
            caps.name(key)
                .and_then(|m| m.as_str().parse::<u32>().ok())
                .unwrap_or(u32::MAX)
        };
        Color::from_rgb_components(channel("r"), channel("g"), channel("b"))
    };

    match parsed {
        Ok(color) => Some(color),
        Err(err) => {
            debug!(%err, "skipping color literal");
            None
        }
    }
}

/// Collect `(property, value)` pairs from a stylesheet or HTML document.
fn declarations(text: &str) -> Result<Vec<(String, String)>, CssParseError> {
    let mut decls = Vec::new();

    if looks_like_html(text) {
        for caps in STYLE_TAG_RE.captures_iter(text) {
            decls.extend(stylesheet_declarations(&caps[1])?);
        }
        for caps in STYLE_ATTR_RE.captures_iter(text) {
            if let Some(body) = caps.get(1).or_else(|| caps.get(2)) {
                decls.extend(parse_declaration_block(body.as_str()));
            }
        }
    } else if !text.contains('{') && !text.contains('}') {
        // A bare declaration list, as found in a style attribute.
        decls.extend(parse_declaration_block(&strip_comments(text)));
    } else {
        decls.extend(stylesheet_declarations(text)?);
    }

    Ok(decls)
}

fn looks_like_html(text: &str) -> bool {
    let head = text.trim_start();
    head.starts_with('<') || STYLE_TAG_RE.is_match(text)
}

/// Walk rule blocks, keeping only innermost blocks so that `@media` wrappers
/// contribute the declarations of the rules they contain.
fn stylesheet_declarations(css: &str) -> Result<Vec<(String, String)>, CssParseError> {
    let css = strip_comments(css);
    let mut decls = Vec::new();
    let mut open: Vec<usize> = Vec::new();

    for (pos, ch) in css.char_indices() {
        match ch {
            '{' => open.push(pos),
            '}' => {
                let start = open.pop().ok_or(CssParseError::UnexpectedClose(pos))?;
                let body = &css[start + 1..pos];
                if !body.contains('{') {
                    decls.extend(parse_declaration_block(body));
                }
            }
            _ => {}
        }
    }

    match open.last() {
        Some(pos) => Err(CssParseError::Unclosed(*pos)),
        None => Ok(decls),
    }
}

fn parse_declaration_block(block: &str) -> Vec<(String, String)> {
    block
        .split(';')
        .filter_map(|line| {
            let (name, value) = line.split_once(':')?;
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim();
            if name.is_empty() || value.is_empty() {
                return None;
            }
            Some((name, value.to_string()))
        })
        .collect()
}

/// Strip CSS comments (/* ... */) from a string.
fn strip_comments(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '/' && chars.peek() == Some(&'*') {
            chars.next();
            loop {
                match chars.next() {
                    Some('*') if chars.peek() == Some(&'/') => {
                        chars.next();
                        break;
                    }
                    Some(_) => continue,
                    None => break,
                }
            }
        } else {
            result.push(c);
        }
    }

    result
}
