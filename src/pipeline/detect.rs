use image::DynamicImage;

use crate::color::{Color, Polarity};

/// Side of the thumbnail the average is taken over.
const SAMPLE_DIM: u32 = 64;

/// Detect whether an image is predominantly dark or light from the mean
/// perceived brightness of its pixels.
pub fn detect_polarity(img: &DynamicImage) -> Polarity {
    let thumb = if img.width() > SAMPLE_DIM || img.height() > SAMPLE_DIM {
        img.thumbnail(SAMPLE_DIM, SAMPLE_DIM)
    } else {
        img.clone()
    };
    let rgb = thumb.to_rgb8();

    let count = (rgb.width() as usize) * (rgb.height() as usize);
    if count == 0 {
        return Polarity::Dark;
    }

    let total: f32 = rgb
        .pixels()
        .map(|p| Color::new(p[0], p[1], p[2]).brightness())
        .sum();
    let mean = total / count as f32;
    if mean < 0.5 {
        Polarity::Dark
    } else {
        Polarity::Light
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn dark_image_is_dark() {
        let img = RgbImage::from_fn(128, 64, |x, _| Rgb([(x / 8) as u8, 10, 30]));
        assert_eq!(detect_polarity(&DynamicImage::ImageRgb8(img)), Polarity::Dark);
    }

    #[test]
    fn light_image_is_light() {
        let img = RgbImage::from_fn(32, 32, |x, y| Rgb([220, 200 + ((x + y) / 4) as u8, 210]));
        assert_eq!(detect_polarity(&DynamicImage::ImageRgb8(img)), Polarity::Light);
    }

    #[test]
    fn mostly_dark_with_light_block() {
        let img = RgbImage::from_fn(40, 40, |x, _| {
            if x < 30 {
                Rgb([20, 20, 20])
            } else {
                Rgb([255, 255, 255])
            }
        });
        assert_eq!(detect_polarity(&DynamicImage::ImageRgb8(img)), Polarity::Dark);
    }
}
