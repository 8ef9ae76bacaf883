use std::str::FromStr;

use palette::{FromColor, Hsl, Hsv, IntoColor, Lab, Srgb};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ColorError;

/// Core color type used throughout the pipeline.
/// Wraps sRGB u8 components and provides the RGB/HSL/HSV math the
/// selection heuristics are built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Whether a color reads as dark or light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Dark,
    Light,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);
    /// Warp's stock blue, used whenever no accent can be found.
    pub const DEFAULT_ACCENT: Color = Color::new(0x00, 0x87, 0xd7);
    /// Default dark background, also the near-black text color on light themes.
    pub const DEFAULT_DARK: Color = Color::new(0x1e, 0x1e, 0x1e);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a hex color string like `#ff8800`, `FF8800` or `#f80`.
    ///
    /// Three-digit shorthand is expanded by duplicating each nibble.
    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let invalid = || ColorError::InvalidColorFormat(hex.to_string());

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => return Err(invalid()),
        };

        let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    /// Build a color from integer channels, rejecting anything outside [0, 255].
    pub fn from_rgb_components(r: u32, g: u32, b: u32) -> Result<Self, ColorError> {
        let convert = |v: u32| {
            u8::try_from(v)
                .map_err(|_| ColorError::InvalidColorFormat(format!("rgb({r}, {g}, {b})")))
        };
        Ok(Self::new(convert(r)?, convert(g)?, convert(b)?))
    }

    /// Serialize to lowercase hex `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Convert to `palette::Srgb<u8>`.
    pub fn to_srgb_u8(self) -> Srgb<u8> {
        Srgb::new(self.r, self.g, self.b)
    }

    /// Convert to `palette::Srgb<f32>` with channels in [0, 1].
    pub fn to_srgb_f32(self) -> Srgb<f32> {
        self.to_srgb_u8().into_format()
    }

    /// Create from `palette::Srgb<f32>`, rounding and clamping each channel.
    pub fn from_srgb_f32(srgb: Srgb<f32>) -> Self {
        Self::from_srgb_f32_clamped(srgb)
    }

    /// Convert to CIELAB (for K-means clustering and deduplication).
    pub fn to_lab(self) -> Lab {
        self.to_srgb_f32().into_color()
    }

    /// Create from CIELAB.
    pub fn from_lab(lab: Lab) -> Self {
        let srgb_f32: Srgb<f32> = Srgb::from_color(lab);
        Self::from_srgb_f32_clamped(srgb_f32)
    }

    /// HSL with hue in degrees [0, 360) and saturation/lightness in [0, 1].
    /// Achromatic colors report a hue of 0.
    pub fn to_hsl(self) -> (f32, f32, f32) {
        let hsl: Hsl = Hsl::from_color(self.to_srgb_f32());
        if hsl.saturation == 0.0 {
            return (0.0, 0.0, hsl.lightness);
        }
        let hue = hsl.hue.into_positive_degrees() % 360.0;
        (hue, hsl.saturation, hsl.lightness)
    }

    /// Create from HSL (hue in degrees, saturation/lightness in [0, 1]).
    pub fn from_hsl(h: f32, s: f32, l: f32) -> Self {
        let hsl = Hsl::new(h, s.clamp(0.0, 1.0), l.clamp(0.0, 1.0));
        Self::from_srgb_f32_clamped(Srgb::from_color(hsl))
    }

    /// HSV with hue in degrees [0, 360) and saturation/value in [0, 1].
    pub fn to_hsv(self) -> (f32, f32, f32) {
        let hsv: Hsv = Hsv::from_color(self.to_srgb_f32());
        let hue = if hsv.saturation == 0.0 {
            0.0
        } else {
            hsv.hue.into_positive_degrees() % 360.0
        };
        (hue, hsv.saturation, hsv.value)
    }

    /// Clamp an Srgb<f32> to [0, 1] and convert to Color.
    fn from_srgb_f32_clamped(srgb: Srgb<f32>) -> Self {
        let r = (srgb.red.clamp(0.0, 1.0) * 255.0).round() as u8;
        let g = (srgb.green.clamp(0.0, 1.0) * 255.0).round() as u8;
        let b = (srgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { r, g, b }
    }

    /// Perceived luminance in [0, 1]: `(0.299 r + 0.587 g + 0.114 b) / 255`.
    ///
    /// Every dark/light decision in the crate goes through this weighting.
    pub fn brightness(self) -> f32 {
        (0.299 * self.r as f32 + 0.587 * self.g as f32 + 0.114 * self.b as f32) / 255.0
    }

    pub fn is_dark(self) -> bool {
        self.brightness() < 0.5
    }

    pub fn polarity(self) -> Polarity {
        if self.is_dark() {
            Polarity::Dark
        } else {
            Polarity::Light
        }
    }

    /// HSV-style saturation `(max - min) / max`. Pure black is 0.
    pub fn saturation(self) -> f32 {
        let max = self.r.max(self.g).max(self.b) as f32 / 255.0;
        let min = self.r.min(self.g).min(self.b) as f32 / 255.0;
        if max == 0.0 {
            return 0.0;
        }
        (max - min) / max
    }

    /// Euclidean distance in RGB space, in [0, ~441.7].
    pub fn distance(self, other: Color) -> f32 {
        let dr = self.r as f32 - other.r as f32;
        let dg = self.g as f32 - other.g as f32;
        let db = self.b as f32 - other.b as f32;
        (dr * dr + dg * dg + db * db).sqrt()
    }

    pub fn complement(self) -> Color {
        Color::new(255 - self.r, 255 - self.g, 255 - self.b)
    }

    /// Brighten with diminishing returns on already-bright colors.
    pub fn brighten(self, factor: f32) -> Color {
        let adjustment = factor * (1.0 - self.brightness() * 0.5);
        self.scale_channels(adjustment)
    }

    /// Darken, with a stronger effect on brighter colors.
    pub fn darken(self, factor: f32) -> Color {
        let adjustment = factor * (0.5 + self.brightness() * 0.5);
        self.scale_channels(adjustment)
    }

    /// Move `t` of the way toward `other` in RGB space.
    pub fn blend(self, other: Color, t: f32) -> Color {
        let mix = |a: u8, b: u8| (a as f32 * (1.0 - t) + b as f32 * t).round().clamp(0.0, 255.0) as u8;
        Color::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    /// Multiply every channel by `factor`, truncating and clamping.
    /// This is the user-facing `--brightness` knob.
    pub fn scale_brightness(self, factor: f32) -> Color {
        let scale = |c: u8| (c as f32 * factor).clamp(0.0, 255.0) as u8;
        Color::new(scale(self.r), scale(self.g), scale(self.b))
    }

    /// Multiply HSL saturation by `factor`, clamped to [0, 1].
    pub fn scale_saturation(self, factor: f32) -> Color {
        let (h, s, l) = self.to_hsl();
        Color::from_hsl(h, (s * factor).clamp(0.0, 1.0), l)
    }

    fn scale_channels(self, adjustment: f32) -> Color {
        let scale = |c: u8| (c as f32 * adjustment).round().clamp(0.0, 255.0) as u8;
        Color::new(scale(self.r), scale(self.g), scale(self.b))
    }
}

impl Polarity {
    /// The text color the selection policy pairs with a background of this polarity.
    pub fn foreground(self) -> Color {
        match self {
            Polarity::Dark => Color::WHITE,
            Polarity::Light => Color::BLACK,
        }
    }

    /// Fallback background when no candidate of this polarity exists.
    pub fn default_background(self) -> Color {
        match self {
            Polarity::Dark => Color::DEFAULT_DARK,
            Polarity::Light => Color::WHITE,
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::from_hex(s.trim())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        hex.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
    };

    fn hex(s: &str) -> Color {
        Color::from_hex(s).unwrap()
    }

    #[test]
    fn hex_round_trip() {
        let original = Color::from_hex("#ff8800").unwrap();
        assert_eq!(original.r, 255);
        assert_eq!(original.g, 136);
        assert_eq!(original.b, 0);
        assert_eq!(original.to_hex(), "#ff8800");
    }

    #[test]
    fn hex_uppercase_input() {
        let color = Color::from_hex("#FF8800").unwrap();
        assert_eq!(color.to_hex(), "#ff8800");
    }

    #[test]
    fn hex_without_hash() {
        let color = Color::from_hex("aabbcc").unwrap();
        assert_eq!(color.to_hex(), "#aabbcc");
    }

    #[test]
    fn hex_shorthand_expands() {
        assert_eq!(hex("F00"), Color::new(255, 0, 0));
        assert_eq!(hex("#333").to_hex(), "#333333");
    }

    #[test]
    fn hex_invalid_length() {
        assert!(matches!(
            Color::from_hex("#ffff"),
            Err(ColorError::InvalidColorFormat(_))
        ));
        assert!(Color::from_hex("").is_err());
        assert!(Color::from_hex("#ff00ff00").is_err());
    }

    #[test]
    fn hex_invalid_chars() {
        assert!(Color::from_hex("#gggggg").is_err());
        assert!(Color::from_hex("+f+f+f").is_err());
    }

    #[test]
    fn rgb_components_reject_out_of_range() {
        assert_eq!(
            Color::from_rgb_components(0, 123, 255).unwrap(),
            Color::new(0, 123, 255)
        );
        assert!(Color::from_rgb_components(256, 0, 0).is_err());
    }

    #[test]
    fn srgb_to_lab_round_trip() {
        let colors = [
            Color::new(200, 100, 50),
            Color::new(0, 255, 0),
            Color::new(128, 128, 128),
            BLACK,
            WHITE,
        ];
        for original in colors {
            let recovered = Color::from_lab(original.to_lab());
            assert!(
                original.distance(recovered) < 2.0,
                "lab round trip drifted for {original}: {recovered}"
            );
        }
    }

    #[test]
    fn hsl_round_trip_within_one() {
        let colors = [
            Color::new(200, 100, 50),
            Color::new(0, 255, 0),
            Color::new(128, 128, 128),
            Color::new(0, 135, 215),
            Color::new(17, 3, 250),
            BLACK,
            WHITE,
        ];
        for original in colors {
            let (h, s, l) = original.to_hsl();
            let recovered = Color::from_hsl(h, s, l);
            for (a, b) in [
                (original.r, recovered.r),
                (original.g, recovered.g),
                (original.b, recovered.b),
            ] {
                assert!(
                    (a as i16 - b as i16).unsigned_abs() <= 1,
                    "HSL round trip mismatch for {original}: got {recovered}"
                );
            }
        }
    }

    #[test]
    fn hsl_known_values() {
        let (h, s, l) = Color::new(255, 0, 0).to_hsl();
        assert!(h.abs() < 0.01);
        assert!((s - 1.0).abs() < 0.001);
        assert!((l - 0.5).abs() < 0.001);

        let (h, _, _) = Color::new(0, 0, 255).to_hsl();
        assert!((h - 240.0).abs() < 0.01, "blue hue should be 240, got {h}");

        let (h, s, l) = Color::new(128, 128, 128).to_hsl();
        assert_eq!(h, 0.0);
        assert_eq!(s, 0.0);
        assert!((l - 128.0 / 255.0).abs() < 0.001);
    }

    #[test]
    fn hsv_value_and_saturation() {
        let (_, s, v) = Color::new(255, 255, 255).to_hsv();
        assert_eq!(s, 0.0);
        assert!((v - 1.0).abs() < 0.001);

        let (h, s, v) = Color::new(0, 255, 0).to_hsv();
        assert!((h - 120.0).abs() < 0.01);
        assert!((s - 1.0).abs() < 0.001);
        assert!((v - 1.0).abs() < 0.001);
    }

    #[test]
    fn brightness_extremes() {
        assert_eq!(BLACK.brightness(), 0.0);
        assert!((WHITE.brightness() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn dark_and_light_classification() {
        for dark in ["#000000", "#333333", "#0F052F", "#2B1B17", "#123524"] {
            assert!(hex(dark).is_dark(), "{dark} should be dark");
        }
        for light in ["#FFFFFF", "#F0F0F0", "#E5E4E2", "#FFCBA4", "#C9FFE5"] {
            assert!(!hex(light).is_dark(), "{light} should be light");
        }
    }

    #[test]
    fn saturation_of_black_is_zero() {
        assert_eq!(BLACK.saturation(), 0.0);
        assert_eq!(Color::new(90, 90, 90).saturation(), 0.0);
        assert!((Color::new(255, 0, 0).saturation() - 1.0).abs() < 1e-6);
        assert!((Color::new(200, 100, 100).saturation() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn distance_known_values() {
        assert_eq!(hex("#FF0000").distance(BLACK), 255.0);
        assert_eq!(WHITE.distance(WHITE), 0.0);
        assert!((WHITE.distance(BLACK) - (3.0f32 * 255.0 * 255.0).sqrt()).abs() < 0.01);
    }

    #[test]
    fn complement_inverts_channels() {
        assert_eq!(hex("#0087d7").complement(), hex("#ff7828"));
        assert_eq!(BLACK.complement(), WHITE);
    }

    #[test]
    fn brighten_raises_mid_tones() {
        let accent = Color::DEFAULT_ACCENT;
        let bright = accent.brighten(1.3);
        assert!(bright.brightness() > accent.brightness());
        // adjustment = 1.3 * (1 - 0.4067 * 0.5) ≈ 1.0357
        assert_eq!(bright, Color::new(0, 140, 223));
    }

    #[test]
    fn brighten_clamps() {
        assert_eq!(Color::new(250, 10, 10).brighten(3.0).r, 255);
    }

    #[test]
    fn darken_lowers_brightness() {
        let accent = Color::DEFAULT_ACCENT;
        assert!(accent.darken(0.8).brightness() < accent.brightness());
        assert_eq!(BLACK.darken(0.8), BLACK);
    }

    #[test]
    fn blend_moves_toward_target() {
        assert_eq!(BLACK.blend(WHITE, 0.0), BLACK);
        assert_eq!(BLACK.blend(WHITE, 1.0), WHITE);
        assert_eq!(BLACK.blend(Color::new(200, 100, 0), 0.15), Color::new(30, 15, 0));
    }

    #[test]
    fn scale_brightness_truncates() {
        assert_eq!(Color::new(100, 200, 255).scale_brightness(1.1), Color::new(110, 220, 255));
        assert_eq!(Color::new(100, 200, 255).scale_brightness(0.5), Color::new(50, 100, 127));
    }

    #[test]
    fn scale_saturation_to_zero_is_gray() {
        let gray = Color::new(200, 50, 50).scale_saturation(0.0);
        assert_eq!(gray.r, gray.g);
        assert_eq!(gray.g, gray.b);
    }

    #[test]
    fn polarity_defaults() {
        assert_eq!(Polarity::Dark.foreground(), WHITE);
        assert_eq!(Polarity::Light.foreground(), BLACK);
        assert_eq!(Polarity::Dark.default_background(), hex("#1E1E1E"));
        assert_eq!(Polarity::Light.default_background(), WHITE);
    }

    #[test]
    fn display_matches_to_hex() {
        let color = Color::new(171, 205, 239);
        assert_eq!(format!("{color}"), color.to_hex());
    }

    #[test]
    fn parses_via_from_str() {
        let color: Color = " #ABCDEF ".parse().unwrap();
        assert_eq!(color, Color::new(0xab, 0xcd, 0xef));
    }
}
