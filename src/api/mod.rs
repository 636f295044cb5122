//! High-level, ergonomic library API: decode captures, render them, query header
//! attributes and save/load PNGs with embedded metadata, plus batch helpers for
//! directories. Prefer these entrypoints over the low-level `core` and `io` modules
//! when integrating POLARPRO.
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::core::params::RenderParams;
use crate::core::processing::resample::polar_to_cartesian;
use crate::core::processing::save::{load_raster_with_header, save_raster_with_header};
use crate::core::raster::CartesianRaster;
use crate::error::{Error, Result};
use crate::io::directory::AttributeDirectory;
use crate::io::header::{AttributeValue, Header};
use crate::io::polar::PolarImage;
use crate::io::writers::metadata::create_metadata_sidecar;
use crate::types::OrientationConfig;

/// File extension of polar captures.
pub const CAPTURE_EXTENSION: &str = "pol";

/// Directory used when no output path is given.
pub const DEFAULT_OUTPUT_DIR: &str = "Output";

/// Decode a capture file with the built-in attribute directory.
pub fn decode(path: &Path) -> Result<PolarImage> {
    PolarImage::open(path)
}

/// Decode a capture file with a custom attribute directory.
pub fn decode_with_directory(path: &Path, directory: &AttributeDirectory) -> Result<PolarImage> {
    PolarImage::open_with_directory(path, directory)
}

/// Render with the default scatter policy and one pixel per range bin.
pub fn render(image: &PolarImage, orient: bool, toggle_direction: bool) -> Result<CartesianRaster> {
    render_with_params(
        image,
        &RenderParams::from_orientation(OrientationConfig::new(orient, toggle_direction)),
    )
}

pub fn render_with_params(image: &PolarImage, params: &RenderParams) -> Result<CartesianRaster> {
    polar_to_cartesian(image, params)
}

/// Case-insensitive header value lookup.
pub fn get<'a>(image: &'a PolarImage, attribute: &str) -> Option<&'a AttributeValue> {
    image.get(attribute)
}

/// Description of an attribute from the built-in directory; empty if unknown.
pub fn describe(attribute: &str) -> &'static str {
    AttributeDirectory::builtin().describe(attribute)
}

/// Save `raster` as PNG with `image`'s header embedded.
pub fn save_with_metadata(image: &PolarImage, raster: &CartesianRaster, path: &Path) -> Result<()> {
    save_raster_with_header(image.header(), raster, path)
}

/// Read a PNG written by [`save_with_metadata`]; descriptions come from the built-in directory.
pub fn load_with_metadata(path: &Path) -> Result<(Header, CartesianRaster)> {
    load_raster_with_header(path, AttributeDirectory::builtin())
}

/// `<basename>.png`, keeping any dots inside the basename.
fn png_file_name(input: &Path) -> OsString {
    let mut name = input
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("capture"));
    name.push(".png");
    name
}

/// `Output/<input-basename>.png`
pub fn default_output_path(input: &Path) -> PathBuf {
    Path::new(DEFAULT_OUTPUT_DIR).join(png_file_name(input))
}

/// Decode `input`, render it and save the PNG (and optionally a JSON sidecar) to `output`.
pub fn process_file_to_path(
    input: &Path,
    output: &Path,
    params: &RenderParams,
    directory: &AttributeDirectory,
    sidecar: bool,
) -> Result<()> {
    let image = decode_with_directory(input, directory)?;
    let raster = render_with_params(&image, params)?;
    // The samples are no longer needed once rendered.
    let (header, _grid) = image.into_parts();
    save_raster_with_header(&header, &raster, output)?;
    if sidecar {
        create_metadata_sidecar(output, &header)?;
    }
    Ok(())
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
}

fn is_capture(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case(CAPTURE_EXTENSION))
}

/// Capture files directly inside `input_dir`, sorted by name, and the count of other entries.
pub fn iterate_captures(input_dir: &Path) -> Result<(Vec<PathBuf>, usize)> {
    let mut captures = Vec::new();
    let mut others = 0;
    for entry in std::fs::read_dir(input_dir)? {
        let path = entry?.path();
        if is_capture(&path) {
            captures.push(path);
        } else {
            others += 1;
        }
    }
    captures.sort();
    Ok((captures, others))
}

/// Render every capture in `input_dir` into `output_dir` as `<basename>.png`.
/// If `continue_on_error` is true, errors are logged in the report and processing continues;
/// otherwise, the first error is returned.
pub fn process_directory_to_path(
    input_dir: &Path,
    output_dir: &Path,
    params: &RenderParams,
    directory: &AttributeDirectory,
    sidecar: bool,
    continue_on_error: bool,
) -> Result<BatchReport> {
    std::fs::create_dir_all(output_dir).map_err(|source| Error::UnsupportedOutputPath {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let (captures, others) = iterate_captures(input_dir)?;
    let mut report = BatchReport {
        skipped: others,
        ..BatchReport::default()
    };

    for path in captures {
        let output_path = output_dir.join(png_file_name(&path));
        info!("Processing: {:?} -> {:?}", path, output_path);

        match process_file_to_path(&path, &output_path, params, directory, sidecar) {
            Ok(()) => report.processed += 1,
            Err(e) => {
                report.errors += 1;
                warn!("Error processing {:?}: {}", path, e);
                if !continue_on_error {
                    return Err(e);
                }
            }
        }
    }

    Ok(report)
}
