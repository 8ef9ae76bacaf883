use std::collections::HashMap;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, RgbaImage};
use kmeans_colors::get_kmeans_hamerly;
use palette::{IntoColor, Lab, Srgb};
use tracing::debug;

use crate::color::Color;
use crate::error::ExtractError;

/// A color extracted from an image with its cluster weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractedColor {
    pub color: Color,
    pub weight: f32,
}

const MAX_DIM: u32 = 256;
const MAX_ITER: usize = 20;
const CONVERGE: f32 = 5.0;
const DEDUP_THRESHOLD: f32 = 25.0; // ΔE² < 25 means ΔE < 5
const SEED: u64 = 42;

/// Side of the thumbnail the border is sampled from.
const EDGE_THUMBNAIL: u32 = 100;
/// Number of edge colors appended by [`extract_image_colors_with_edges`].
pub const EDGE_COLOR_COUNT: usize = 3;
/// Pixels more transparent than this are ignored.
const MIN_ALPHA: u8 = 16;

/// Decode raw bytes into an image, rejecting images with no pixels.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, ExtractError> {
    let img = image::load_from_memory(bytes)?;
    if img.width() == 0 || img.height() == 0 {
        return Err(ExtractError::EmptyImage);
    }
    Ok(img)
}

/// Resize to fit within 256x256 (preserving aspect ratio) and convert the
/// opaque pixels to CIELAB.
pub fn prepare_pixels(img: &DynamicImage) -> Vec<Lab> {
    let img = if img.width() > MAX_DIM || img.height() > MAX_DIM {
        img.resize(MAX_DIM, MAX_DIM, FilterType::Lanczos3)
    } else {
        img.clone()
    };

    img.to_rgba8()
        .pixels()
        .filter(|p| p[3] >= MIN_ALPHA)
        .map(|p| {
            let srgb: Srgb<f32> = Srgb::new(p[0], p[1], p[2]).into_format();
            srgb.into_color()
        })
        .collect()
}

/// Run K-means on LAB pixels to extract dominant colors.
///
/// Returns deduplicated colors sorted by weight (descending).
/// Uses Hamerly's algorithm with K-means++ initialization and a fixed seed,
/// so the same pixels always give the same palette.
pub fn extract_colors(pixels: &[Lab], k: usize) -> Vec<ExtractedColor> {
    let k = k.min(u8::MAX as usize);
    if pixels.is_empty() || k == 0 {
        return Vec::new();
    }

    let result = get_kmeans_hamerly(k, MAX_ITER, CONVERGE, false, pixels, SEED);
    let total = pixels.len() as f32;

    // Count pixels per centroid to compute weights
    let mut counts = vec![0u32; result.centroids.len()];
    for &idx in &result.indices {
        counts[idx as usize] += 1;
    }

    let mut colors: Vec<ExtractedColor> = result
        .centroids
        .iter()
        .enumerate()
        .filter(|(i, _)| counts[*i] > 0)
        .map(|(i, lab)| ExtractedColor {
            color: Color::from_lab(*lab),
            weight: counts[i] as f32 / total,
        })
        .collect();

    deduplicate(&mut colors);
    colors.sort_by(|a, b| b.weight.total_cmp(&a.weight));

    colors
}

/// Merge colors that are too similar (ΔE < 5 in LAB space).
/// Keeps the first color and accumulates the weight.
fn deduplicate(colors: &mut Vec<ExtractedColor>) {
    let mut i = 0;
    while i < colors.len() {
        let lab_i = colors[i].color.to_lab();
        let mut j = i + 1;
        while j < colors.len() {
            let lab_j = colors[j].color.to_lab();
            let delta_e_sq = (lab_i.l - lab_j.l).powi(2)
                + (lab_i.a - lab_j.a).powi(2)
                + (lab_i.b - lab_j.b).powi(2);
            if delta_e_sq < DEDUP_THRESHOLD {
                colors[i].weight += colors[j].weight;
                colors.remove(j);
            } else {
                j += 1;
            }
        }
        i += 1;
    }
}

/// Dominant colors of an encoded image, most dominant first.
///
/// Undecodable input yields an empty palette rather than an error.
pub fn extract_image_colors(bytes: &[u8], count: usize) -> Vec<Color> {
    match decode_image(bytes) {
        Ok(img) => palette_of(&img, count),
        Err(err) => {
            debug!(%err, "no colors from image");
            Vec::new()
        }
    }
}

/// Like [`extract_image_colors`], with the most frequent border colors of a
/// small thumbnail appended. Borders of header and footer imagery tend to be
/// brand or background colors.
pub fn extract_image_colors_with_edges(bytes: &[u8], count: usize) -> Vec<Color> {
    match decode_image(bytes) {
        Ok(img) => image_colors_with_edges(&img, count),
        Err(err) => {
            debug!(%err, "no colors from image");
            Vec::new()
        }
    }
}

/// Palette plus border colors of an already decoded image.
pub fn image_colors_with_edges(img: &DynamicImage, count: usize) -> Vec<Color> {
    let mut colors = palette_of(img, count);
    for edge in edge_colors(img, EDGE_COLOR_COUNT) {
        if !colors.contains(&edge) {
            colors.push(edge);
        }
    }
    colors
}

fn palette_of(img: &DynamicImage, count: usize) -> Vec<Color> {
    extract_colors(&prepare_pixels(img), count)
        .into_iter()
        .take(count)
        .map(|c| c.color)
        .collect()
}

/// The `top_n` most frequent colors on the border of a thumbnail of `img`.
/// Ties keep the order in which the colors were first met.
pub fn edge_colors(img: &DynamicImage, top_n: usize) -> Vec<Color> {
    let thumb = if img.width() > EDGE_THUMBNAIL || img.height() > EDGE_THUMBNAIL {
        img.thumbnail(EDGE_THUMBNAIL, EDGE_THUMBNAIL)
    } else {
        img.clone()
    };
    let rgba = thumb.to_rgba8();

    let mut counts: HashMap<Color, (usize, usize)> = HashMap::new();
    for (order, color) in border_pixels(&rgba).enumerate() {
        let entry = counts.entry(color).or_insert((0, order));
        entry.0 += 1;
    }

    let mut ranked: Vec<(Color, usize, usize)> =
        counts.into_iter().map(|(c, (n, first))| (c, n, first)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked.into_iter().take(top_n).map(|(c, _, _)| c).collect()
}

fn border_pixels(img: &RgbaImage) -> impl Iterator<Item = Color> + '_ {
    let (w, h) = img.dimensions();
    let top = (0..w).map(move |x| (x, 0));
    let bottom = (0..w).filter(move |_| h > 1).map(move |x| (x, h - 1));
    let left = (1..h.saturating_sub(1)).map(|y| (0, y));
    let right = (1..h.saturating_sub(1))
        .filter(move |_| w > 1)
        .map(move |y| (w - 1, y));

    top.chain(bottom)
        .chain(left)
        .chain(right)
        .map(|(x, y)| img.get_pixel(x, y))
        .filter(|p| p[3] >= MIN_ALPHA)
        .map(|p| Color::new(p[0], p[1], p[2]))
}

/// Whether the image carries any meaningfully transparent pixel.
pub fn has_transparency(img: &DynamicImage) -> bool {
    img.color().has_alpha() && img.pixels().any(|(_, _, p)| p[3] < u8::MAX)
}
