use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};

use crate::theme::WarpTheme;

use super::ThemeBackend;

/// Warp's YAML theme format.
pub struct WarpBackend;

impl ThemeBackend for WarpBackend {
    fn name(&self) -> &str {
        "Warp"
    }

    fn file_name(&self, theme: &WarpTheme) -> String {
        format!("{}.yaml", theme.file_stem())
    }

    fn serialize(&self, theme: &WarpTheme) -> Result<String> {
        theme.validate()?;
        Ok(theme.to_yaml()?)
    }
}

impl WarpBackend {
    /// Install the theme where Warp looks for custom themes.
    pub fn install(&self, theme: &WarpTheme) -> Result<PathBuf> {
        self.write_into(theme, &themes_dir()?)
    }
}

/// Resolve Warp's custom themes directory. `WARP_THEMES_DIR` overrides the
/// default of `$HOME/.warp/themes`.
pub fn themes_dir() -> Result<PathBuf> {
    resolve_themes_dir(
        std::env::var_os("WARP_THEMES_DIR").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

fn resolve_themes_dir(override_dir: Option<PathBuf>, home: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = override_dir.filter(|d| !d.as_os_str().is_empty()) {
        return Ok(dir);
    }
    let home = home
        .filter(|h| !h.as_os_str().is_empty())
        .ok_or_else(|| anyhow!("HOME is not set; cannot locate the Warp themes directory"))?;
    Ok(themes_dir_in(&home))
}

fn themes_dir_in(home: &Path) -> PathBuf {
    home.join(".warp").join("themes")
}
