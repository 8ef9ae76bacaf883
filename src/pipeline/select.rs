use serde::Serialize;
use tracing::debug;

use crate::color::{Color, Polarity};
use crate::pipeline::pool::{dedup_in_order, CandidatePool, Category};

/// The three seed colors of a theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThemeColors {
    pub accent: Color,
    pub background: Color,
    pub foreground: Color,
}

/// Brightness band for a vivid accent: (min brightness, max brightness, min saturation).
const VIVID_BAND: (f32, f32, f32) = (0.2, 0.8, 0.5);
/// Looser band tried when nothing is vivid enough.
const RELAXED_BAND: (f32, f32, f32) = (0.1, 0.9, 0.3);

/// Pick the accent from a priority-ordered candidate list.
///
/// Mid-tone, saturated colors win, most saturated first; ties keep list
/// order. Falls back to a looser band, then to the first candidate, then to
/// the default accent.
pub fn select_accent(candidates: &[Color]) -> Color {
    for (min_b, max_b, min_s) in [VIVID_BAND, RELAXED_BAND] {
        let mut vivid: Vec<Color> = candidates
            .iter()
            .copied()
            .filter(|c| {
                let b = c.brightness();
                b > min_b && b < max_b && c.saturation() > min_s
            })
            .collect();
        // Stable sort: equal saturation keeps candidate order.
        vivid.sort_by(|a, b| b.saturation().total_cmp(&a.saturation()));
        if let Some(best) = vivid.first() {
            return *best;
        }
    }

    match candidates.first() {
        Some(first) => {
            debug!(%first, "no vivid accent, using first candidate");
            *first
        }
        None => Color::DEFAULT_ACCENT,
    }
}

/// First candidate of the preferred polarity, else that polarity's default.
pub fn select_background(candidates: &[Color], prefer: Polarity) -> Color {
    candidates
        .iter()
        .copied()
        .find(|c| c.polarity() == prefer)
        .unwrap_or_else(|| prefer.default_background())
}

/// Like [`select_background`], but a candidate of the other polarity beats
/// the fixed default. Used on whole-site pools, where a light-only site
/// should give a light theme rather than a generic dark one.
pub fn select_background_or_any(candidates: &[Color], prefer: Polarity) -> Color {
    let (preferred, other): (Vec<Color>, Vec<Color>) =
        candidates.iter().copied().partition(|c| c.polarity() == prefer);

    if let Some(first) = preferred.first() {
        return *first;
    }
    if let Some(first) = other.first() {
        debug!(%first, ?prefer, "no background of preferred polarity, using the other");
        return *first;
    }
    prefer.default_background()
}

/// White text on dark backgrounds, black text on light ones.
pub fn select_foreground(background: Color) -> Color {
    background.polarity().foreground()
}

/// Run the full selection policy over a candidate pool.
///
/// `flat` holds every literal the flat scan found; it joins the background
/// category when choosing the background.
pub fn select_theme_colors(pool: &CandidatePool, flat: &[Color], prefer: Polarity) -> ThemeColors {
    let accent = select_accent(&pool.accent_priority());

    let mut backgrounds: Vec<Color> = pool.get(Category::Background).to_vec();
    backgrounds.extend_from_slice(flat);
    dedup_in_order(&mut backgrounds);
    let background = select_background_or_any(&backgrounds, prefer);

    ThemeColors {
        accent,
        background,
        foreground: select_foreground(background),
    }
}

impl ThemeColors {
    /// Apply the user's brightness and saturation factors to accent and
    /// background. The foreground is re-derived from the new background with
    /// `foreground`, the rule of the path that produced these colors.
    pub fn adjusted(
        self,
        brightness: f32,
        saturation: f32,
        foreground: impl Fn(Color) -> Color,
    ) -> ThemeColors {
        let adjust = |c: Color| {
            let c = if brightness != 1.0 { c.scale_brightness(brightness) } else { c };
            if saturation != 1.0 {
                c.scale_saturation(saturation)
            } else {
                c
            }
        };
        let background = adjust(self.background);
        ThemeColors {
            accent: adjust(self.accent),
            background,
            foreground: foreground(background),
        }
    }
}
