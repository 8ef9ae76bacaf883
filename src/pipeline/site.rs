use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::color::{Color, Polarity};
use crate::error::ThemeError;
use crate::pipeline::css::{extract_categorized_colors, extract_css_colors, extract_html_colors};
use crate::pipeline::extract::{decode_image, image_colors_with_edges};
use crate::pipeline::logo::{is_logo, logo_score};
use crate::pipeline::pool::{dedup_in_order, CandidatePool, Category};
use crate::pipeline::select::{select_theme_colors, ThemeColors};

/// Everything fetched for one site. Maps are keyed by URL (or path) and
/// iterate in sorted order so repeated runs see resources identically.
#[derive(Debug, Clone, Default)]
pub struct SiteResources {
    pub html: String,
    pub css_contents: BTreeMap<String, String>,
    pub image_contents: BTreeMap<String, Vec<u8>>,
    /// Resources that could not be fetched, with the reason.
    pub errors: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy)]
pub struct SiteOptions {
    /// Background polarity to look for first.
    pub prefer: Polarity,
    /// Palette size taken from each image.
    pub image_colors: usize,
}

impl Default for SiteOptions {
    fn default() -> Self {
        Self {
            prefer: Polarity::Dark,
            image_colors: 5,
        }
    }
}

/// Candidates gathered from a site before selection.
#[derive(Debug, Clone, Default)]
pub struct SiteCandidates {
    pub pool: CandidatePool,
    /// Every literal found by the flat scan, first-seen order.
    pub flat: Vec<Color>,
    /// URLs of the images treated as logos, best first.
    pub logos: Vec<String>,
}

/// Gather categorized and flat candidates from HTML, stylesheets and images.
///
/// Colors from logo-like images fill the image category; generic imagery is
/// only used when no logo produced any color.
pub fn collect_candidates(resources: &SiteResources, options: &SiteOptions) -> SiteCandidates {
    let mut pool = extract_categorized_colors(&resources.html);
    let mut flat = extract_html_colors(&resources.html);

    for (url, css) in &resources.css_contents {
        let sheet = extract_categorized_colors(css);
        debug!(%url, candidates = sheet.len(), "stylesheet");
        pool.merge(&sheet);
        flat.extend(extract_css_colors(css));
    }
    dedup_in_order(&mut flat);

    let mut logo_images: Vec<(u32, &str, Vec<Color>)> = Vec::new();
    let mut generic: Vec<Color> = Vec::new();
    for (url, bytes) in &resources.image_contents {
        let img = match decode_image(bytes) {
            Ok(img) => img,
            Err(err) => {
                debug!(%url, %err, "skipping undecodable image");
                continue;
            }
        };
        let score = logo_score(url, Some(&img));
        let colors = image_colors_with_edges(&img, options.image_colors);
        if colors.is_empty() {
            continue;
        }
        if is_logo(score) {
            debug!(%url, score, "logo image");
            logo_images.push((score, url.as_str(), colors));
        } else {
            generic.extend(colors);
        }
    }
    // Stable: equal scores keep URL order.
    logo_images.sort_by(|a, b| b.0.cmp(&a.0));

    let logos: Vec<String> = logo_images.iter().map(|(_, url, _)| url.to_string()).collect();
    if logo_images.is_empty() {
        pool.extend(Category::Image, generic);
    } else {
        info!(count = logo_images.len(), "prioritizing logo colors");
        for (_, _, colors) in logo_images {
            pool.extend(Category::Image, colors);
        }
    }

    SiteCandidates { pool, flat, logos }
}

/// Pick theme colors for a fetched site.
///
/// Fails only when there is no HTML at all; everything else degrades to
/// fewer candidates and, in the end, to the fixed defaults.
pub fn generate_site_colors(
    resources: &SiteResources,
    options: &SiteOptions,
) -> Result<ThemeColors, ThemeError> {
    if resources.html.trim().is_empty() {
        return Err(ThemeError::EmptyHtml);
    }
    for (url, reason) in &resources.errors {
        warn!(%url, %reason, "resource unavailable");
    }

    let candidates = collect_candidates(resources, options);
    let colors = select_theme_colors(&candidates.pool, &candidates.flat, options.prefer);
    info!(
        accent = %colors.accent,
        background = %colors.background,
        foreground = %colors.foreground,
        "selected site colors"
    );
    Ok(colors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn hex(s: &str) -> Color {
        Color::from_hex(s).unwrap()
    }

    fn solid_png(rgb: [u8; 3]) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 32, Rgb(rgb)));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn empty_html_is_a_total_failure() {
        let resources = SiteResources::default();
        assert_eq!(
            generate_site_colors(&resources, &SiteOptions::default()),
            Err(ThemeError::EmptyHtml)
        );
        let blank = SiteResources {
            html: "  \n ".into(),
            ..Default::default()
        };
        assert!(generate_site_colors(&blank, &SiteOptions::default()).is_err());
    }

    #[test]
    fn html_without_colors_gives_defaults() {
        let resources = SiteResources {
            html: "<html><body>plain</body></html>".into(),
            ..Default::default()
        };
        let colors = generate_site_colors(&resources, &SiteOptions::default()).unwrap();
        assert_eq!(colors.accent, Color::DEFAULT_ACCENT);
        assert_eq!(colors.background, Color::DEFAULT_DARK);
        assert_eq!(colors.foreground, Color::WHITE);
    }

    #[test]
    fn stylesheets_feed_the_pool() {
        let mut css_contents = BTreeMap::new();
        css_contents.insert(
            "site.css".to_string(),
            "body { background: #101418; color: #eeeeee } a { border-color: #e0402a }".to_string(),
        );
        let resources = SiteResources {
            html: "<html><body></body></html>".into(),
            css_contents,
            ..Default::default()
        };
        let colors = generate_site_colors(&resources, &SiteOptions::default()).unwrap();
        assert_eq!(colors.background, hex("#101418"));
        assert_eq!(colors.accent, hex("#e0402a"));
        assert_eq!(colors.foreground, Color::WHITE);
    }

    #[test]
    fn light_only_site_keeps_light_background() {
        let resources = SiteResources {
            html: r#"<body style="background-color: #fafafa"><p style="color: #f0f0f0">x</p></body>"#
                .into(),
            ..Default::default()
        };
        let colors = generate_site_colors(&resources, &SiteOptions::default()).unwrap();
        assert_eq!(colors.background, hex("#fafafa"));
        assert_eq!(colors.foreground, Color::BLACK);
    }

    #[test]
    fn page_text_does_not_become_a_background() {
        let resources = SiteResources {
            html: r#"<body style="background: #f5f5f5"><p>&#169; 2024&#160;Acme #123</p></body>"#
                .into(),
            ..Default::default()
        };
        let candidates = collect_candidates(&resources, &SiteOptions::default());
        assert_eq!(candidates.flat, vec![hex("#f5f5f5")]);

        let colors = generate_site_colors(&resources, &SiteOptions::default()).unwrap();
        assert_eq!(colors.background, hex("#f5f5f5"));
    }

    #[test]
    fn logo_colors_win_over_generic_imagery() {
        let mut image_contents = BTreeMap::new();
        image_contents.insert("a-photo.png".to_string(), solid_png([20, 160, 60]));
        image_contents.insert("z-logo.png".to_string(), solid_png([200, 40, 150]));
        let resources = SiteResources {
            html: "<html></html>".into(),
            image_contents,
            ..Default::default()
        };
        let candidates = collect_candidates(&resources, &SiteOptions::default());
        assert_eq!(candidates.logos, vec!["z-logo.png"]);
        let image = candidates.pool.get(Category::Image);
        assert!(image.iter().any(|c| c.distance(hex("#c82896")) < 3.0));
        assert!(image.iter().all(|c| c.distance(hex("#14a03c")) > 50.0));

        let colors = generate_site_colors(&resources, &SiteOptions::default()).unwrap();
        assert!(colors.accent.distance(hex("#c82896")) < 3.0);
    }

    #[test]
    fn generic_imagery_used_without_logos() {
        let mut image_contents = BTreeMap::new();
        image_contents.insert("photo.png".to_string(), solid_png([20, 160, 60]));
        image_contents.insert("broken.png".to_string(), b"not an image".to_vec());
        let resources = SiteResources {
            html: "<html></html>".into(),
            image_contents,
            ..Default::default()
        };
        let candidates = collect_candidates(&resources, &SiteOptions::default());
        assert!(candidates.logos.is_empty());
        let image = candidates.pool.get(Category::Image);
        assert!(!image.is_empty());
        assert!(image.iter().all(|c| c.distance(hex("#14a03c")) < 3.0));
    }

    #[test]
    fn prefer_light_picks_light_background() {
        let resources = SiteResources {
            html: "<style>body{background:#0d0d0d} main{background-color:#f4f4f4}</style>".into(),
            ..Default::default()
        };
        let light = SiteOptions {
            prefer: Polarity::Light,
            ..Default::default()
        };
        let colors = generate_site_colors(&resources, &light).unwrap();
        assert_eq!(colors.background, hex("#f4f4f4"));
        let dark = generate_site_colors(&resources, &SiteOptions::default()).unwrap();
        assert_eq!(dark.background, hex("#0d0d0d"));
    }
}
