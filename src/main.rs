use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use warp_themer::backends::svg::{previews_for_directory, SvgPreviewBackend};
use warp_themer::backends::warp::WarpBackend;
use warp_themer::backends::ThemeBackend;
use warp_themer::cli::Args;
use warp_themer::color::Polarity;
use warp_themer::pipeline::assign::synthesize_terminal_palette;
use warp_themer::pipeline::detect::detect_polarity;
use warp_themer::pipeline::discover::{image_urls, is_remote, stylesheet_urls};
use warp_themer::pipeline::extract::decode_image;
use warp_themer::pipeline::screenshot::{
    screenshot_foreground, screenshot_theme_colors, ScreenshotOptions,
};
use warp_themer::pipeline::select::{select_foreground, ThemeColors};
use warp_themer::pipeline::site::{generate_site_colors, SiteOptions, SiteResources};
use warp_themer::preview::render_preview;
use warp_themer::theme::WarpTheme;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    run(&args)
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: &Args) -> Result<()> {
    if let Some(dir) = &args.previews_for {
        let written = previews_for_directory(dir)?;
        for path in &written {
            eprintln!("Preview written to {}", path.display());
        }
        info!(count = written.len(), "rendered theme previews");
        return Ok(());
    }

    let colors = match &args.screenshot {
        Some(path) => screenshot_colors(args, path)?,
        None => site_colors(args)?,
    };

    let colors = if args.brightness != 1.0 || args.saturation != 1.0 {
        let adjusted = if args.screenshot.is_some() {
            colors.adjusted(args.brightness, args.saturation, screenshot_foreground)
        } else {
            colors.adjusted(args.brightness, args.saturation, select_foreground)
        };
        debug!(before = ?colors, after = ?adjusted, "applied adjustments");
        adjusted
    } else {
        colors
    };

    let palette = synthesize_terminal_palette(colors.accent, colors.background);
    let mut theme = WarpTheme::from_colors(&theme_name(args), colors, palette);
    if let Some(image) = &args.background_image {
        theme = theme.with_background_image(image.clone(), args.opacity);
    }

    if args.stdout {
        let yaml = WarpBackend.serialize(&theme)?;
        std::io::stdout()
            .write_all(yaml.as_bytes())
            .context("failed to write theme to stdout")?;
    } else {
        let path = if args.install {
            WarpBackend.install(&theme)?
        } else {
            WarpBackend.write_into(&theme, &args.output)?
        };
        eprintln!("Theme written to {}", path.display());
    }

    if args.svg {
        let dir = if args.install {
            warp_themer::backends::warp::themes_dir()?
        } else {
            args.output.clone()
        };
        let path = SvgPreviewBackend.write_into(&theme, &dir)?;
        eprintln!("Preview written to {}", path.display());
    }

    if args.preview {
        render_preview(&mut std::io::stderr(), &theme)?;
    }

    Ok(())
}

fn theme_name(args: &Args) -> String {
    if let Some(name) = &args.name {
        return name.clone();
    }
    args.screenshot
        .as_ref()
        .or(args.html.as_ref())
        .and_then(|p| p.file_stem())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Generated Theme".to_string())
}

fn screenshot_colors(args: &Args, path: &Path) -> Result<ThemeColors> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read screenshot: {}", path.display()))?;
    let img = decode_image(&bytes)
        .with_context(|| format!("failed to decode screenshot: {}", path.display()))?;

    let polarity = args.mode.polarity().unwrap_or_else(|| {
        let detected = detect_polarity(&img);
        info!(?detected, "detected screenshot polarity");
        detected
    });

    let options = ScreenshotOptions {
        clusters: args.colors,
        ..ScreenshotOptions::default()
    };
    let (dominant, colors) = screenshot_theme_colors(&img, &options, polarity);
    debug!(count = dominant.len(), "dominant screenshot colors");
    Ok(colors)
}

fn site_colors(args: &Args) -> Result<ThemeColors> {
    let Some(html_path) = &args.html else {
        bail!("either --html or --screenshot is required");
    };
    let resources = load_site(html_path, &args.css, &args.image)?;

    let prefer = match args.mode.polarity() {
        Some(polarity) => polarity,
        None => detect_site_polarity(&resources),
    };
    let options = SiteOptions {
        prefer,
        image_colors: args.image_colors,
    };

    Ok(generate_site_colors(&resources, &options)?)
}

/// Polarity of the first decodable site image, dark when there is none.
fn detect_site_polarity(resources: &SiteResources) -> Polarity {
    resources
        .image_contents
        .iter()
        .find_map(|(url, bytes)| decode_image(bytes).ok().map(|img| (url, img)))
        .map(|(url, img)| {
            let detected = detect_polarity(&img);
            info!(%url, ?detected, "detected site polarity");
            detected
        })
        .unwrap_or(Polarity::Dark)
}

/// Read a saved page together with the local stylesheets and images it
/// references. Anything unreadable or remote is recorded in `errors`.
fn load_site(html_path: &Path, css: &[PathBuf], images: &[PathBuf]) -> Result<SiteResources> {
    let html = std::fs::read_to_string(html_path)
        .with_context(|| format!("failed to read HTML: {}", html_path.display()))?;
    let base = html_path.parent().unwrap_or_else(|| Path::new("."));

    let mut resources = SiteResources {
        html,
        ..SiteResources::default()
    };
    let mut errors = BTreeMap::new();

    let linked_css: Vec<(String, PathBuf)> = stylesheet_urls(&resources.html)
        .into_iter()
        .filter_map(|url| local_path(base, &url, &mut errors).map(|p| (url, p)))
        .collect();
    let extra_css = css.iter().map(|p| (p.display().to_string(), p.clone()));
    for (key, path) in linked_css.into_iter().chain(extra_css) {
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                resources.css_contents.insert(key, text);
            }
            Err(err) => {
                errors.insert(key, err.to_string());
            }
        }
    }

    let linked_images: Vec<(String, PathBuf)> = image_urls(&resources.html)
        .into_iter()
        .filter_map(|url| local_path(base, &url, &mut errors).map(|p| (url, p)))
        .collect();
    let extra_images = images.iter().map(|p| (p.display().to_string(), p.clone()));
    for (key, path) in linked_images.into_iter().chain(extra_images) {
        match std::fs::read(&path) {
            Ok(bytes) => {
                resources.image_contents.insert(key, bytes);
            }
            Err(err) => {
                errors.insert(key, err.to_string());
            }
        }
    }

    info!(
        stylesheets = resources.css_contents.len(),
        images = resources.image_contents.len(),
        "loaded site resources"
    );
    resources.errors = errors;
    Ok(resources)
}

fn local_path(base: &Path, url: &str, errors: &mut BTreeMap<String, String>) -> Option<PathBuf> {
    if is_remote(url) {
        debug!(%url, "skipping remote resource");
        errors.insert(url.to_string(), "remote resources are not fetched".to_string());
        return None;
    }
    let clean = url.split(['?', '#']).next().unwrap_or(url);
    let relative = clean.trim_start_matches('/');
    Some(base.join(relative))
}
