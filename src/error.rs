//! Error types for the TOC generator

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the TOC generator library
#[derive(Error, Debug)]
pub enum Error {
    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Invalid PDF (no pages)
    #[error("PDF has no pages: {}", .0.display())]
    EmptyPdf(PathBuf),

    /// Outline entry whose destination does not point at a page
    #[error("Cannot resolve the page of bookmark \"{0}\"")]
    UnresolvedDestination(String),

    /// Malformed outline tree
    #[error("Invalid outline: {0}")]
    InvalidOutline(String),

    /// Character the font cannot encode
    #[error("Character {ch:?} is not supported by font {font}")]
    UnsupportedCharacter { ch: char, font: &'static str },

    /// General error
    #[error("{0}")]
    General(String),
}
