use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use kmeans_colors::get_kmeans_hamerly;
use palette::Srgb;
use tracing::{debug, info};

use crate::color::{Color, Polarity};
use crate::pipeline::extract::ExtractedColor;
use crate::pipeline::select::ThemeColors;

/// Larger side of the image the clustering runs on.
const MAX_DIM: u32 = 400;
const MAX_ITER: usize = 30;
const CONVERGE: f32 = 0.0025;
const SEED: u64 = 42;

/// Pixels sampled along each edge when testing for background colors.
const EDGE_SAMPLES: u32 = 50;
/// RGB distance under which an edge pixel counts as the candidate color.
const EDGE_TOLERANCE: f32 = 30.0;
/// Fraction of edge samples that must match for a background classification.
const EDGE_MATCH_RATIO: f32 = 0.25;
/// Perceived brightness (0-255 scale) above which a color is always a background.
const NEAR_WHITE: f32 = 240.0;
/// Perceived brightness (0-255 scale) above which a color reads as light.
const LIGHT_THRESHOLD: f32 = 128.0;
/// Accents closer than this to the background are rejected.
const MIN_ACCENT_DISTANCE: f32 = 50.0;

/// Knobs for screenshot clustering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenshotOptions {
    /// Number of K-means clusters.
    pub clusters: usize,
    /// Drop clusters with HSV value below 0.1.
    pub exclude_blacks: bool,
    /// Drop clusters with HSV value above 0.95 and saturation below 0.1.
    pub exclude_whites: bool,
    /// Drop clusters whose HSV saturation is below this.
    pub min_saturation: f32,
}

impl Default for ScreenshotOptions {
    fn default() -> Self {
        Self {
            clusters: 10,
            exclude_blacks: true,
            exclude_whites: false,
            min_saturation: 0.0,
        }
    }
}

/// Downscale so the larger side is at most 400px, preserving aspect ratio.
pub fn prepare_screenshot(img: &DynamicImage) -> RgbImage {
    if img.width() > MAX_DIM || img.height() > MAX_DIM {
        img.resize(MAX_DIM, MAX_DIM, FilterType::Triangle).to_rgb8()
    } else {
        img.to_rgb8()
    }
}

/// Cluster the screenshot's pixels into dominant colors with their share of
/// the image, most dominant first. Percentages sum to at most 1.
pub fn extract_dominant_colors(img: &RgbImage, options: &ScreenshotOptions) -> Vec<ExtractedColor> {
    let k = options.clusters.min(u8::MAX as usize);
    if k == 0 || img.width() == 0 || img.height() == 0 {
        return Vec::new();
    }

    let pixels: Vec<Srgb<f32>> = img
        .pixels()
        .map(|p| Srgb::new(p[0], p[1], p[2]).into_format())
        .collect();

    let result = get_kmeans_hamerly(k, MAX_ITER, CONVERGE, false, &pixels, SEED);
    let total = pixels.len() as f32;

    let mut counts = vec![0u32; result.centroids.len()];
    for &idx in &result.indices {
        counts[idx as usize] += 1;
    }

    let mut colors: Vec<ExtractedColor> = Vec::new();
    for (centroid, &count) in result.centroids.iter().zip(&counts) {
        if count == 0 {
            continue;
        }
        let color = Color::from_srgb_f32(*centroid);
        let weight = count as f32 / total;
        // Separate clusters can round to the same color.
        match colors.iter_mut().find(|c| c.color == color) {
            Some(existing) => existing.weight += weight,
            None => colors.push(ExtractedColor { color, weight }),
        }
    }

    colors.retain(|c| keep_cluster(c.color, options));
    colors.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    colors
}

fn keep_cluster(color: Color, options: &ScreenshotOptions) -> bool {
    let (_, s, v) = color.to_hsv();
    let near_white = options.exclude_whites && v > 0.95 && s < 0.1;
    let near_black = options.exclude_blacks && v < 0.1;
    !(near_white || near_black || s < options.min_saturation)
}

/// Perceived brightness on a 0-255 scale.
fn brightness_255(color: Color) -> f32 {
    color.brightness() * 255.0
}

fn is_light(color: Color) -> bool {
    brightness_255(color) > LIGHT_THRESHOLD
}

/// Whether `color` shows up often enough along the image border to be a
/// page background. Near-white colors always qualify.
pub fn is_background_color(color: Color, img: &RgbImage) -> bool {
    if brightness_255(color) > NEAR_WHITE {
        return true;
    }

    let samples = edge_samples(img);
    if samples.is_empty() {
        return false;
    }

    let matches = samples
        .iter()
        .filter(|p| p.distance(color) < EDGE_TOLERANCE)
        .count();
    matches as f32 / samples.len() as f32 > EDGE_MATCH_RATIO
}

/// Roughly 50 evenly spaced pixels from each of the four edges.
fn edge_samples(img: &RgbImage) -> Vec<Color> {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return Vec::new();
    }
    let step_x = (w / EDGE_SAMPLES).max(1) as usize;
    let step_y = (h / EDGE_SAMPLES).max(1) as usize;
    let at = |x: u32, y: u32| {
        let p = img.get_pixel(x, y);
        Color::new(p[0], p[1], p[2])
    };

    let mut samples = Vec::new();
    for x in (0..w).step_by(step_x) {
        samples.push(at(x, 0));
        samples.push(at(x, h - 1));
    }
    for y in (0..h).step_by(step_y) {
        samples.push(at(0, y));
        samples.push(at(w - 1, y));
    }
    samples
}

/// Red-ish enough to be treated as a brand accent.
fn is_reddish(color: Color) -> bool {
    color.r > 150 && color.g < 100 && color.b < 100
}

/// Pick background, foreground and accent from screenshot clusters.
///
/// `dominant` must be sorted by weight, most dominant first.
pub fn select_screenshot_colors(
    dominant: &[ExtractedColor],
    img: &RgbImage,
    prefer: Polarity,
) -> ThemeColors {
    if dominant.is_empty() {
        debug!("no dominant colors, using fallback theme");
        let background = match prefer {
            Polarity::Light => Color::WHITE,
            Polarity::Dark => Color::DEFAULT_DARK,
        };
        return ThemeColors {
            accent: Color::DEFAULT_ACCENT,
            background,
            foreground: screenshot_foreground(background),
        };
    }

    for c in dominant {
        debug!(
            color = %c.color,
            weight = c.weight,
            reddish = is_reddish(c.color),
            "dominant color"
        );
    }

    let (mut backgrounds, mut accents): (Vec<Color>, Vec<Color>) = (Vec::new(), Vec::new());
    for c in dominant {
        if is_background_color(c.color, img) {
            backgrounds.push(c.color);
        } else {
            accents.push(c.color);
        }
    }

    if backgrounds.is_empty() {
        backgrounds = dominant.iter().map(|c| c.color).collect();
    }
    if accents.is_empty() {
        accents = dominant
            .iter()
            .map(|c| c.color)
            .filter(|c| !backgrounds.contains(c))
            .collect();
    }

    let background = match prefer {
        Polarity::Light => backgrounds.iter().copied().find(|c| is_light(*c)),
        Polarity::Dark => backgrounds.iter().copied().find(|c| !is_light(*c)),
    }
    .unwrap_or_else(|| {
        debug!(?prefer, "no background candidate of preferred polarity");
        match prefer {
            Polarity::Light => Color::WHITE,
            Polarity::Dark => Color::DEFAULT_DARK,
        }
    });

    let foreground = screenshot_foreground(background);
    let accent = select_screenshot_accent(dominant, &accents, background, foreground);

    info!(%background, %foreground, %accent, "selected screenshot colors");
    ThemeColors {
        accent,
        background,
        foreground,
    }
}

/// White on dark backgrounds, near-black on light ones.
pub fn screenshot_foreground(background: Color) -> Color {
    if is_light(background) {
        Color::DEFAULT_DARK
    } else {
        Color::WHITE
    }
}

fn select_screenshot_accent(
    dominant: &[ExtractedColor],
    accents: &[Color],
    background: Color,
    foreground: Color,
) -> Color {
    // A red brand color wins outright, preferably one that is not the background.
    let reds: Vec<Color> = dominant
        .iter()
        .map(|c| c.color)
        .filter(|c| is_reddish(*c))
        .collect();
    if let Some(red) = reds.iter().find(|c| **c != background).or(reds.first()) {
        debug!(%red, "red accent override");
        return *red;
    }

    let fg_is_light = is_light(foreground);
    for &candidate in accents {
        let distance = candidate.distance(background);
        if distance < MIN_ACCENT_DISTANCE {
            debug!(%candidate, distance, "too similar to background");
            continue;
        }
        if is_light(candidate) == fg_is_light {
            return candidate;
        }
    }

    match accents.first() {
        Some(first) => {
            debug!(%first, "using first available accent");
            *first
        }
        None => {
            debug!("no accent candidates, using default accent");
            Color::DEFAULT_ACCENT
        }
    }
}

/// Full screenshot path: downscale, cluster, select.
pub fn screenshot_theme_colors(
    img: &DynamicImage,
    options: &ScreenshotOptions,
    prefer: Polarity,
) -> (Vec<ExtractedColor>, ThemeColors) {
    let prepared = prepare_screenshot(img);
    let dominant = extract_dominant_colors(&prepared, options);
    let colors = select_screenshot_colors(&dominant, &prepared, prefer);
    (dominant, colors)
}
