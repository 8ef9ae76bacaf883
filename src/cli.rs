use std::path::PathBuf;

use clap::Parser;

use crate::color::Polarity;

/// Generate Warp terminal themes from a website's colors or a screenshot.
#[derive(Parser, Debug)]
#[command(name = "warp-themer", version, about)]
pub struct Args {
    /// Saved HTML page to extract colors from
    #[arg(long, required_unless_present_any = ["screenshot", "previews_for"])]
    pub html: Option<PathBuf>,

    /// Extra stylesheet (repeatable); stylesheets linked from the HTML are picked up automatically
    #[arg(long, value_name = "FILE")]
    pub css: Vec<PathBuf>,

    /// Extra site image (repeatable); images referenced by the HTML are picked up automatically
    #[arg(long, value_name = "FILE")]
    pub image: Vec<PathBuf>,

    /// Derive the theme from a page screenshot instead of HTML/CSS
    #[arg(long, value_name = "FILE", conflicts_with_all = ["html", "css", "image"])]
    pub screenshot: Option<PathBuf>,

    /// Render SVG previews for every theme in DIR into DIR/previews and exit
    #[arg(
        long,
        value_name = "DIR",
        conflicts_with_all = ["html", "css", "image", "screenshot"]
    )]
    pub previews_for: Option<PathBuf>,

    /// Theme name (defaults to the input file stem)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Preferred background polarity
    #[arg(short, long, value_enum, default_value_t = ThemeMode::Dark)]
    pub mode: ThemeMode,

    /// Directory the theme is written to
    #[arg(short, long, value_name = "DIR", default_value = "themes")]
    pub output: PathBuf,

    /// Install the theme into ~/.warp/themes
    #[arg(long, conflicts_with = "output")]
    pub install: bool,

    /// Print the theme YAML to stdout instead of writing a file
    #[arg(long, conflicts_with = "install")]
    pub stdout: bool,

    /// Print a colored terminal preview of the theme to stderr
    #[arg(long)]
    pub preview: bool,

    /// Also write an SVG preview next to the theme
    #[arg(long)]
    pub svg: bool,

    /// Number of K-means clusters for screenshots
    #[arg(short = 'k', long = "colors", default_value_t = 10)]
    pub colors: usize,

    /// Palette size taken from each site image
    #[arg(long, default_value_t = 5)]
    pub image_colors: usize,

    /// Brightness factor applied to accent and background
    #[arg(long, default_value_t = 1.0)]
    pub brightness: f32,

    /// Saturation factor applied to accent and background
    #[arg(long, default_value_t = 1.0)]
    pub saturation: f32,

    /// Image Warp draws behind the terminal
    #[arg(long, value_name = "PATH")]
    pub background_image: Option<PathBuf>,

    /// Opacity of the background image (0.0 to 1.0)
    #[arg(long, default_value_t = 1.0, requires = "background_image")]
    pub opacity: f32,

    /// Log pipeline decisions to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ThemeMode {
    Dark,
    Light,
    /// Detect from the screenshot or the first site image
    Auto,
}

impl ThemeMode {
    /// The fixed polarity this mode asks for, or `None` for auto-detection.
    pub fn polarity(self) -> Option<Polarity> {
        match self {
            ThemeMode::Dark => Some(Polarity::Dark),
            ThemeMode::Light => Some(Polarity::Light),
            ThemeMode::Auto => None,
        }
    }
}
