use std::io::Write;

use anyhow::Result;
use crossterm::queue;
use crossterm::style::{
    Attribute, Color as TermColor, Print, ResetColor, SetAttribute, SetBackgroundColor,
    SetForegroundColor,
};

use crate::color::{Color, Polarity};
use crate::theme::WarpTheme;

const SLOT_LABELS: [&str; 8] = ["Blk", "Red", "Grn", "Yel", "Blu", "Mag", "Cyn", "Wht"];

fn to_term(c: Color) -> TermColor {
    TermColor::Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
    }
}

/// Black or white label text, whichever reads on `c`.
fn label_color(c: Color) -> TermColor {
    match c.polarity() {
        Polarity::Dark => TermColor::White,
        Polarity::Light => TermColor::Black,
    }
}

fn swatch<W: Write>(out: &mut W, c: Color, label: &str) -> Result<()> {
    queue!(
        out,
        SetBackgroundColor(to_term(c)),
        SetForegroundColor(label_color(c)),
        Print(format!("{label:^6}")),
        ResetColor,
        Print(" ")
    )?;
    Ok(())
}

/// Print the theme as true-color swatches: the three theme colors, a sample
/// line of text, then both rows of the terminal palette.
pub fn render_preview<W: Write>(out: &mut W, theme: &WarpTheme) -> Result<()> {
    queue!(
        out,
        SetAttribute(Attribute::Bold),
        Print(format!("{}\n", theme.name)),
        SetAttribute(Attribute::Reset)
    )?;

    for (label, c) in [
        ("accent", theme.accent),
        ("background", theme.background),
        ("foreground", theme.foreground),
    ] {
        queue!(out, Print("  "))?;
        swatch(out, c, "")?;
        queue!(out, Print(format!("{label:<11} {c}\n")))?;
    }

    queue!(
        out,
        Print("  "),
        SetBackgroundColor(to_term(theme.background)),
        SetForegroundColor(to_term(theme.foreground)),
        Print(" $ echo "),
        SetForegroundColor(to_term(theme.accent)),
        Print("hello"),
        SetForegroundColor(to_term(theme.foreground)),
        Print(" "),
        ResetColor,
        Print("\n")
    )?;

    let rows = [theme.terminal_colors.normal, theme.terminal_colors.bright];
    for row in rows {
        queue!(out, Print("  "))?;
        for (c, label) in row.to_array().into_iter().zip(SLOT_LABELS) {
            swatch(out, c, label)?;
        }
        queue!(out, Print("\n"))?;
    }

    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::assign::synthesize_terminal_palette;
    use crate::pipeline::select::ThemeColors;

    #[test]
    fn preview_emits_true_color_swatches() {
        let colors = ThemeColors {
            accent: Color::DEFAULT_ACCENT,
            background: Color::DEFAULT_DARK,
            foreground: Color::WHITE,
        };
        let theme = WarpTheme::from_colors(
            "Preview",
            colors,
            synthesize_terminal_palette(colors.accent, colors.background),
        );

        let mut buf = Vec::new();
        render_preview(&mut buf, &theme).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("Preview"));
        assert!(text.contains("#0087d7"));
        assert!(text.contains("48;2;0;135;215"), "accent swatch missing");
        assert!(text.contains("48;2;30;30;30"), "background swatch missing");
        for label in SLOT_LABELS {
            assert_eq!(text.matches(label).count(), 2, "{label} should appear twice");
        }
    }
}
