use thiserror::Error;

/// A color literal that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("invalid color format: {0}")]
    InvalidColorFormat(String),
}

/// Failures inside image extraction. Never surfaced by the public
/// extraction functions, which degrade to an empty palette instead.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("image bytes could not be decoded: {0}")]
    DecodeFailure(#[from] image::ImageError),

    #[error("image has no pixels")]
    EmptyImage,
}

/// Pipeline-level failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThemeError {
    #[error("no HTML content to extract colors from")]
    EmptyHtml,

    #[error("invalid theme: {0}")]
    InvalidTheme(String),

    #[error("malformed theme YAML: {0}")]
    Yaml(String),
}
