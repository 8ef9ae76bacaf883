use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::theme::WarpTheme;

use super::ThemeBackend;

/// A mock terminal window drawn with the theme's colors. Placeholders are
/// `{key}` names from [`substitutions`].
const TEMPLATE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 800 420" font-family="monospace" font-size="14">
  <rect width="800" height="420" rx="10" fill="{background}"/>
  <rect width="800" height="30" rx="10" fill="{black}"/>
  <circle cx="20" cy="15" r="6" fill="{red}"/>
  <circle cx="40" cy="15" r="6" fill="{yellow}"/>
  <circle cx="60" cy="15" r="6" fill="{green}"/>
  <text x="400" y="20" text-anchor="middle" fill="{brwhite}">{name}</text>
  <rect x="0" y="30" width="4" height="390" fill="{accent}"/>
  <text x="20" y="60" fill="{foreground}"><tspan fill="{accent}">&#10140;</tspan> <tspan fill="{cyan}">~/site</tspan> <tspan fill="{brblue}">git:(</tspan><tspan fill="{brred}">main</tspan><tspan fill="{brblue}">)</tspan> ls -la</text>
  <text x="20" y="85" fill="{blue}">drwxr-xr-x  assets/</text>
  <text x="20" y="105" fill="{green}">-rwxr-xr-x  build.sh</text>
  <text x="20" y="125" fill="{magenta}">lrwxr-xr-x  current -&gt; releases/42</text>
  <text x="20" y="145" fill="{foreground}">-rw-r--r--  index.html</text>
  <text x="20" y="175" fill="{red}">error: <tspan fill="{foreground}">stylesheet not found</tspan></text>
  <text x="20" y="195" fill="{yellow}">warning: <tspan fill="{foreground}">image skipped</tspan></text>
  <text x="20" y="215" fill="{brblack}"># theme generated from site colors</text>
  <g transform="translate(20 260)">
    <rect x="0" width="40" height="40" fill="{black}"/>
    <rect x="45" width="40" height="40" fill="{red}"/>
    <rect x="90" width="40" height="40" fill="{green}"/>
    <rect x="135" width="40" height="40" fill="{yellow}"/>
    <rect x="180" width="40" height="40" fill="{blue}"/>
    <rect x="225" width="40" height="40" fill="{magenta}"/>
    <rect x="270" width="40" height="40" fill="{cyan}"/>
    <rect x="315" width="40" height="40" fill="{white}"/>
    <rect x="0" y="45" width="40" height="40" fill="{brblack}"/>
    <rect x="45" y="45" width="40" height="40" fill="{brred}"/>
    <rect x="90" y="45" width="40" height="40" fill="{brgreen}"/>
    <rect x="135" y="45" width="40" height="40" fill="{bryellow}"/>
    <rect x="180" y="45" width="40" height="40" fill="{brblue}"/>
    <rect x="225" y="45" width="40" height="40" fill="{brmagenta}"/>
    <rect x="270" y="45" width="40" height="40" fill="{brcyan}"/>
    <rect x="315" y="45" width="40" height="40" fill="{brwhite}"/>
  </g>
  <rect x="400" y="260" width="380" height="85" rx="6" fill="{accent}" opacity="0.25"/>
  <text x="415" y="290" fill="{foreground}">accent <tspan fill="{accent}">{accent}</tspan></text>
  <text x="415" y="310" fill="{foreground}">background {background}</text>
  <text x="415" y="330" fill="{foreground}">foreground {foreground}</text>
</svg>
"##;

/// SVG preview of a theme.
pub struct SvgPreviewBackend;

impl ThemeBackend for SvgPreviewBackend {
    fn name(&self) -> &str {
        "SVG preview"
    }

    fn file_name(&self, theme: &WarpTheme) -> String {
        format!("{}_preview.svg", theme.file_stem())
    }

    fn serialize(&self, theme: &WarpTheme) -> Result<String> {
        Ok(render(TEMPLATE, &substitutions(theme)))
    }
}

/// Named values a preview template can refer to: `name`, `accent`,
/// `background`, `foreground`, the eight normal slot names and the same
/// names prefixed with `br` for the bright slots.
pub fn substitutions(theme: &WarpTheme) -> BTreeMap<String, String> {
    let mut values = BTreeMap::new();
    values.insert("name".to_string(), escape_xml(&theme.name));
    values.insert("accent".to_string(), theme.accent.to_hex());
    values.insert("background".to_string(), theme.background.to_hex());
    values.insert("foreground".to_string(), theme.foreground.to_hex());

    for (name, color) in theme.terminal_colors.named() {
        let key = match name.strip_prefix("bright_") {
            Some(base) => format!("br{base}"),
            None => name.to_string(),
        };
        values.insert(key, color.to_hex());
    }
    values
}

/// Directory, below a themes directory, that batch previews are written to.
pub const PREVIEWS_DIR: &str = "previews";

/// Render an SVG preview for every `.yaml`/`.yml` theme directly inside
/// `themes_dir` into `<themes_dir>/previews/`, in file name order.
///
/// Files that cannot be read or are not valid themes are skipped with a
/// warning. Returns the previews written.
pub fn previews_for_directory(themes_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(themes_dir)
        .with_context(|| format!("failed to read themes directory: {}", themes_dir.display()))?;

    let mut theme_files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_theme_file(path))
        .collect();
    theme_files.sort();

    let out_dir = themes_dir.join(PREVIEWS_DIR);
    let mut written = Vec::new();
    for path in theme_files {
        let theme = match std::fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|text| WarpTheme::from_yaml(&text).map_err(anyhow::Error::from))
        {
            Ok(theme) => theme,
            Err(err) => {
                warn!(path = %path.display(), %err, "skipping theme");
                continue;
            }
        };
        let preview = SvgPreviewBackend.write_into(&theme, &out_dir)?;
        debug!(theme = %path.display(), preview = %preview.display(), "rendered preview");
        written.push(preview);
    }
    Ok(written)
}

fn is_theme_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}

/// Fill `{key}` placeholders in one pass. Substituted text is never rescanned
/// and unknown keys are left as they are.
fn render(template: &str, values: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let filled = after
            .find('}')
            .and_then(|close| values.get(&after[..close]).map(|value| (close, value)));
        match filled {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::pipeline::assign::synthesize_terminal_palette;
    use crate::pipeline::select::ThemeColors;

    fn theme(name: &str) -> WarpTheme {
        let colors = ThemeColors {
            accent: Color::DEFAULT_ACCENT,
            background: Color::new(0xf4, 0xf4, 0xf4),
            foreground: Color::BLACK,
        };
        WarpTheme::from_colors(
            name,
            colors,
            synthesize_terminal_palette(colors.accent, colors.background),
        )
    }

    #[test]
    fn every_placeholder_is_filled() {
        let svg = SvgPreviewBackend.serialize(&theme("Preview")).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(!svg.contains('{'), "unfilled placeholder in:\n{svg}");
        assert!(svg.contains("#0087d7"));
        assert!(svg.contains("#f4f4f4"));
    }

    #[test]
    fn substitutions_cover_all_slots() {
        let t = theme("Preview");
        let values = substitutions(&t);
        assert_eq!(values.len(), 4 + 16);
        assert_eq!(values["blue"], "#0087d7");
        assert_eq!(values["brblue"], t.terminal_colors.bright.blue.to_hex());
        assert_eq!(values["white"], t.terminal_colors.normal.white.to_hex());
    }

    #[test]
    fn name_is_escaped() {
        let svg = SvgPreviewBackend.serialize(&theme("A&B <site>")).unwrap();
        assert!(svg.contains("A&amp;B &lt;site&gt;"));
    }

    #[test]
    fn placeholders_in_the_name_stay_literal() {
        let t = theme("{red} {accent} {unknown");
        let svg = SvgPreviewBackend.serialize(&t).unwrap();
        assert!(svg.contains(">{red} {accent} {unknown</text>"));
    }

    #[test]
    fn render_leaves_unknown_keys() {
        let mut values = BTreeMap::new();
        values.insert("a".to_string(), "{b}".to_string());
        values.insert("b".to_string(), "x".to_string());
        assert_eq!(render("{a}-{b}-{c}-}", &values), "{b}-x-{c}-}");
    }

    #[test]
    fn batch_previews_skip_broken_themes() {
        let dir = tempfile::tempdir().unwrap();
        let ocean = theme("Ocean");
        let dusk = theme("Dusk");
        std::fs::write(dir.path().join("ocean.yaml"), ocean.to_yaml().unwrap()).unwrap();
        std::fs::write(dir.path().join("dusk.YML"), dusk.to_yaml().unwrap()).unwrap();
        std::fs::write(dir.path().join("broken.yaml"), "name: [unclosed").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a theme").unwrap();
        std::fs::create_dir(dir.path().join("nested.yaml")).unwrap();

        let written = previews_for_directory(dir.path()).unwrap();
        let previews = dir.path().join(PREVIEWS_DIR);
        assert_eq!(
            written,
            vec![
                previews.join("dusk_preview.svg"),
                previews.join("ocean_preview.svg"),
            ]
        );
        let svg = std::fs::read_to_string(&written[1]).unwrap();
        assert!(svg.contains(">Ocean</text>"));
    }

    #[test]
    fn batch_previews_need_an_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(previews_for_directory(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn file_name_uses_preview_suffix() {
        assert_eq!(
            SvgPreviewBackend.file_name(&theme("Example Site")),
            "example_site_preview.svg"
        );
    }
}
