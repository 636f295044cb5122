//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Decode, render and serialization failures each get a semantic variant carrying
//! enough context (attribute name, byte counts, path) to diagnose the input.
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed header: attribute `{attribute}` {reason}")]
    MalformedHeader { attribute: String, reason: String },

    #[error("Truncated file: expected {expected} bytes, found {actual}")]
    TruncatedFile { expected: usize, actual: usize },

    #[error("Unsupported bit depth: {0} (expected 8 or 16)")]
    UnsupportedBitDepth(i64),

    #[error("Empty sample grid: {azimuths} azimuths x {ranges} range bins")]
    EmptySampleGrid { azimuths: usize, ranges: usize },

    #[error("Cannot write to output path {path:?}: {source}")]
    UnsupportedOutputPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image decode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },
}

impl Error {
    pub fn malformed(attribute: &str, reason: impl Into<String>) -> Self {
        Error::MalformedHeader {
            attribute: attribute.to_string(),
            reason: reason.into(),
        }
    }

    pub fn encoding<E: std::fmt::Display>(e: E) -> Self {
        Error::Encoding(e.to_string())
    }
}
