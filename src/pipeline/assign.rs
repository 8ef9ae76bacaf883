use serde::{Deserialize, Serialize};

use crate::color::{Color, Polarity};

/// How far every hue slot is pulled toward the accent.
const HARMONIZE: f32 = 0.15;
/// Backgrounds darker than this replace the normal black slot.
const EXTREME_DARK: f32 = 0.1;
/// Backgrounds brighter than this replace the normal white slot.
const EXTREME_LIGHT: f32 = 0.9;

/// Eight ANSI colors of one intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnsiColors {
    pub black: Color,
    pub red: Color,
    pub green: Color,
    pub yellow: Color,
    pub blue: Color,
    pub magenta: Color,
    pub cyan: Color,
    pub white: Color,
}

/// The full 16-color ANSI palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalPalette {
    pub normal: AnsiColors,
    pub bright: AnsiColors,
}

/// Fixed colors for every slot except blue, which always comes from the accent.
struct BaseTone {
    black: Color,
    red: Color,
    green: Color,
    yellow: Color,
    magenta: Color,
    cyan: Color,
    white: Color,
}

const fn rgb(hex: u32) -> Color {
    Color::new((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

/// Vivid colors tuned for dark backgrounds.
const DARK_NORMAL: BaseTone = BaseTone {
    black: rgb(0x000000),
    red: rgb(0xff5555),
    green: rgb(0x50fa7b),
    yellow: rgb(0xf1fa8c),
    magenta: rgb(0xff79c6),
    cyan: rgb(0x8be9fd),
    white: rgb(0xbfbfbf),
};

const DARK_BRIGHT: BaseTone = BaseTone {
    black: rgb(0x4d4d4d),
    red: rgb(0xff6e67),
    green: rgb(0x5af78e),
    yellow: rgb(0xf4f99d),
    magenta: rgb(0xff92d0),
    cyan: rgb(0x9aedfe),
    white: rgb(0xffffff),
};

/// Deeper tones that stay readable on light backgrounds.
const LIGHT_NORMAL: BaseTone = BaseTone {
    black: rgb(0x1e1e1e),
    red: rgb(0xe53935),
    green: rgb(0x43a047),
    yellow: rgb(0xffb300),
    magenta: rgb(0xd81b60),
    cyan: rgb(0x00acc1),
    white: rgb(0xf5f5f5),
};

const LIGHT_BRIGHT: BaseTone = BaseTone {
    black: rgb(0x666666),
    red: rgb(0xff5252),
    green: rgb(0x69f0ae),
    yellow: rgb(0xffd740),
    magenta: rgb(0xff4081),
    cyan: rgb(0x64ffda),
    white: rgb(0xffffff),
};

/// Slot names in ANSI index order.
pub const SLOT_NAMES: [&str; 16] = [
    "black",
    "red",
    "green",
    "yellow",
    "blue",
    "magenta",
    "cyan",
    "white",
    "bright_black",
    "bright_red",
    "bright_green",
    "bright_yellow",
    "bright_blue",
    "bright_magenta",
    "bright_cyan",
    "bright_white",
];

/// Build the 16-color palette for an accent on a background.
///
/// Blue is the accent itself and bright blue a brightened (dark themes) or
/// darkened (light themes) accent. Hue slots are pulled 15% toward the
/// accent; black and white are left alone except that an extreme background
/// takes over the matching normal slot.
pub fn synthesize_terminal_palette(accent: Color, background: Color) -> TerminalPalette {
    let polarity = background.polarity();
    let (normal, bright, bright_blue) = match polarity {
        Polarity::Dark => (&DARK_NORMAL, &DARK_BRIGHT, accent.brighten(1.3)),
        Polarity::Light => (&LIGHT_NORMAL, &LIGHT_BRIGHT, accent.darken(0.8)),
    };

    let mut normal = tone(normal, accent, accent);
    let bright = tone(bright, accent, bright_blue);

    match polarity {
        Polarity::Dark if background.brightness() < EXTREME_DARK => normal.black = background,
        Polarity::Light if background.brightness() > EXTREME_LIGHT => normal.white = background,
        _ => {}
    }

    TerminalPalette { normal, bright }
}

fn tone(base: &BaseTone, accent: Color, blue: Color) -> AnsiColors {
    let harmonize = |c: Color| c.blend(accent, HARMONIZE);
    AnsiColors {
        black: base.black,
        red: harmonize(base.red),
        green: harmonize(base.green),
        yellow: harmonize(base.yellow),
        blue,
        magenta: harmonize(base.magenta),
        cyan: harmonize(base.cyan),
        white: base.white,
    }
}

impl AnsiColors {
    pub fn to_array(&self) -> [Color; 8] {
        [
            self.black,
            self.red,
            self.green,
            self.yellow,
            self.blue,
            self.magenta,
            self.cyan,
            self.white,
        ]
    }
}

impl TerminalPalette {
    /// ANSI colors 0-15.
    pub fn slots(&self) -> [Color; 16] {
        let mut slots = [Color::BLACK; 16];
        slots[..8].copy_from_slice(&self.normal.to_array());
        slots[8..].copy_from_slice(&self.bright.to_array());
        slots
    }

    /// `(name, color)` pairs in ANSI order, named as in [`SLOT_NAMES`].
    pub fn named(&self) -> [(&'static str, Color); 16] {
        let slots = self.slots();
        std::array::from_fn(|i| (SLOT_NAMES[i], slots[i]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(s: &str) -> Color {
        Color::from_hex(s).unwrap()
    }

    #[test]
    fn blue_is_the_accent() {
        for (accent, bg) in [
            ("#0087D7", "#1E1E1E"),
            ("#C6262E", "#FFFFFF"),
            ("#00ff00", "#000000"),
            ("#123456", "#fafafa"),
        ] {
            let palette = synthesize_terminal_palette(hex(accent), hex(bg));
            assert_eq!(palette.normal.blue, hex(accent));
        }
    }

    #[test]
    fn synthesis_is_deterministic() {
        let a = synthesize_terminal_palette(hex("#0087D7"), hex("#1E1E1E"));
        let b = synthesize_terminal_palette(hex("#0087D7"), hex("#1E1E1E"));
        assert_eq!(a, b);
    }

    #[test]
    fn dark_background_uses_harmonized_dark_base() {
        let accent = hex("#0087D7");
        let palette = synthesize_terminal_palette(accent, hex("#1E1E1E"));

        assert_eq!(palette.normal.black, hex("#000000"));
        assert_eq!(palette.normal.white, hex("#BFBFBF"));
        assert_eq!(palette.normal.red, hex("#FF5555").blend(accent, 0.15));
        assert_eq!(palette.normal.green, hex("#50FA7B").blend(accent, 0.15));
        assert_eq!(palette.normal.yellow, hex("#F1FA8C").blend(accent, 0.15));
        assert_eq!(palette.normal.magenta, hex("#FF79C6").blend(accent, 0.15));
        assert_eq!(palette.normal.cyan, hex("#8BE9FD").blend(accent, 0.15));
        assert_eq!(palette.bright.black, hex("#4D4D4D"));
        assert_eq!(palette.bright.white, hex("#FFFFFF"));
        assert!(palette.bright.blue.brightness() > accent.brightness());
    }

    #[test]
    fn light_background_uses_light_base_and_darker_bright_blue() {
        let accent = hex("#0087D7");
        let palette = synthesize_terminal_palette(accent, hex("#EEEEEE"));

        assert_eq!(palette.normal.black, hex("#1E1E1E"));
        assert_eq!(palette.normal.red, hex("#E53935").blend(accent, 0.15));
        assert_eq!(palette.bright.black, hex("#666666"));
        assert_eq!(palette.bright.blue, accent.darken(0.8));
        assert!(palette.bright.blue.brightness() < accent.brightness());
    }

    #[test]
    fn harmonization_pulls_toward_accent() {
        let accent = hex("#00ff00");
        let palette = synthesize_terminal_palette(accent, hex("#1E1E1E"));
        let base_red = hex("#FF5555");
        assert!(palette.normal.red.distance(accent) < base_red.distance(accent));
    }

    #[test]
    fn extreme_backgrounds_take_over_black_and_white() {
        let near_black = hex("#0a0a0a");
        let palette = synthesize_terminal_palette(Color::DEFAULT_ACCENT, near_black);
        assert_eq!(palette.normal.black, near_black);

        let near_white = hex("#fcfcfc");
        let palette = synthesize_terminal_palette(Color::DEFAULT_ACCENT, near_white);
        assert_eq!(palette.normal.white, near_white);
        assert_eq!(palette.normal.black, hex("#1E1E1E"));
    }

    #[test]
    fn slots_follow_ansi_order() {
        let palette = synthesize_terminal_palette(Color::DEFAULT_ACCENT, Color::DEFAULT_DARK);
        let slots = palette.slots();
        assert_eq!(slots[4], Color::DEFAULT_ACCENT);
        assert_eq!(slots[15], hex("#FFFFFF"));
        let named = palette.named();
        assert_eq!(named[12].0, "bright_blue");
        assert_eq!(named[12].1, palette.bright.blue);
    }
}
