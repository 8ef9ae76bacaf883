pub mod svg;
pub mod warp;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::theme::WarpTheme;

/// An output format a theme can be rendered to.
pub trait ThemeBackend {
    /// Human-readable name of the output format.
    fn name(&self) -> &str;

    /// File name the rendered theme is saved under.
    fn file_name(&self, theme: &WarpTheme) -> String;

    /// Render the theme to its file contents.
    fn serialize(&self, theme: &WarpTheme) -> Result<String>;

    /// Render the theme to an explicit path.
    fn write_to(&self, theme: &WarpTheme, path: &Path) -> Result<()> {
        let content = self.serialize(theme)?;
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {} to {}", self.name(), path.display()))
    }

    /// Render the theme into `dir`, creating it if needed, and return the
    /// path written.
    fn write_into(&self, theme: &WarpTheme, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create directory: {}", dir.display()))?;
        let path = dir.join(self.file_name(theme));
        self.write_to(theme, &path)?;
        Ok(path)
    }
}
