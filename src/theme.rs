use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::color::{Color, Polarity};
use crate::error::ThemeError;
use crate::pipeline::assign::TerminalPalette;
use crate::pipeline::select::ThemeColors;

/// Whether Warp should draw UI details darker or lighter than the background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Details {
    Darker,
    Lighter,
}

impl Details {
    pub fn for_background(background: Color) -> Self {
        match background.polarity() {
            Polarity::Dark => Details::Darker,
            Polarity::Light => Details::Lighter,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundImage {
    pub path: PathBuf,
    pub opacity: f32,
}

/// A Warp terminal theme, laid out as Warp reads it from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarpTheme {
    pub name: String,
    pub accent: Color,
    pub background: Color,
    pub foreground: Color,
    pub details: Details,
    pub terminal_colors: TerminalPalette,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<BackgroundImage>,
}

impl WarpTheme {
    pub fn from_colors(name: &str, colors: ThemeColors, palette: TerminalPalette) -> Self {
        Self {
            name: name.to_string(),
            accent: colors.accent,
            background: colors.background,
            foreground: colors.foreground,
            details: Details::for_background(colors.background),
            terminal_colors: palette,
            background_image: None,
        }
    }

    /// Attach a background image drawn at `opacity` (clamped to [0, 1]).
    pub fn with_background_image(mut self, path: PathBuf, opacity: f32) -> Self {
        self.background_image = Some(BackgroundImage {
            path,
            opacity: opacity.clamp(0.0, 1.0),
        });
        self
    }

    pub fn to_yaml(&self) -> Result<String, ThemeError> {
        serde_yaml::to_string(self).map_err(|e| ThemeError::Yaml(e.to_string()))
    }

    /// Parse and validate a theme file.
    pub fn from_yaml(text: &str) -> Result<Self, ThemeError> {
        let theme: WarpTheme =
            serde_yaml::from_str(text).map_err(|e| ThemeError::Yaml(e.to_string()))?;
        theme.validate()?;
        Ok(theme)
    }

    /// Check the invariants the generator guarantees: a usable name, blue
    /// equal to the accent and an opacity within range.
    pub fn validate(&self) -> Result<(), ThemeError> {
        if self.name.trim().is_empty() {
            return Err(ThemeError::InvalidTheme("name is empty".into()));
        }
        if self.terminal_colors.normal.blue != self.accent {
            return Err(ThemeError::InvalidTheme(format!(
                "normal blue {} differs from accent {}",
                self.terminal_colors.normal.blue, self.accent
            )));
        }
        if let Some(image) = &self.background_image {
            if !(0.0..=1.0).contains(&image.opacity) {
                return Err(ThemeError::InvalidTheme(format!(
                    "background image opacity {} outside 0..=1",
                    image.opacity
                )));
            }
        }
        Ok(())
    }

    /// File name (without extension) the theme is saved under.
    pub fn file_stem(&self) -> String {
        sanitize_filename(&self.name)
    }
}

/// Turn a theme name into a safe file stem: alphanumerics, `_` and `-` are
/// kept, whitespace becomes `_`, everything else is dropped. Empty names and
/// names starting with `-` get a `theme_` prefix.
pub fn sanitize_filename(name: &str) -> String {
    let mut sanitized: String = name
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                Some(c)
            } else if c.is_whitespace() {
                Some('_')
            } else {
                None
            }
        })
        .collect();

    if sanitized.is_empty() || sanitized.starts_with('-') {
        sanitized.insert_str(0, "theme_");
    }
    sanitized.to_lowercase()
}
