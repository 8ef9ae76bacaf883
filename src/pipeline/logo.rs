use image::DynamicImage;

use crate::pipeline::extract::has_transparency;

/// URL fragments that mark an image as part of the site's branding.
const BRAND_KEYWORDS: [&str; 5] = ["logo", "brand", "icon", "symbol", "header"];
/// Images with fewer pixels than this count as small.
const SMALL_AREA: u64 = 50_000;

const KEYWORD_SCORE: u32 = 2;
const SMALL_TRANSPARENT_SCORE: u32 = 1;

/// Score at or above which an image is treated as a logo.
pub const LOGO_THRESHOLD: u32 = 1;

/// How logo-like an image is. Every brand keyword in the URL counts, and a
/// small image with transparency gets a bonus on top.
pub fn logo_score(url: &str, img: Option<&DynamicImage>) -> u32 {
    let url = url.to_ascii_lowercase();
    let keywords = BRAND_KEYWORDS
        .iter()
        .filter(|k| url.contains(*k))
        .count() as u32;

    let small_transparent = img.is_some_and(|img| {
        let area = u64::from(img.width()) * u64::from(img.height());
        area < SMALL_AREA && has_transparency(img)
    });

    keywords * KEYWORD_SCORE + if small_transparent { SMALL_TRANSPARENT_SCORE } else { 0 }
}

pub fn is_logo(score: u32) -> bool {
    score >= LOGO_THRESHOLD
}
