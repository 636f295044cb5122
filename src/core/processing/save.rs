use std::io::Write;
use std::path::Path;

use tracing::{debug, info};

use crate::core::raster::CartesianRaster;
use crate::error::{Error, Result};
use crate::io::directory::AttributeDirectory;
use crate::io::header::Header;
use crate::io::writers::metadata::{
    HEADER_KEYWORD, JSON_KEYWORD, header_from_json, header_from_text, png_text_entries,
};
use crate::io::writers::png::{create_png_gray, read_chunks, text_chunks};

/// Encode the raster as PNG with the header embedded, then move it into place.
///
/// The file is fully encoded in memory and written through a temporary file in the
/// target directory, so a failure never leaves a partial PNG at `output`.
pub fn save_raster_with_header(
    header: &Header,
    raster: &CartesianRaster,
    output: &Path,
) -> Result<()> {
    let texts = png_text_entries(header)?;
    let png = create_png_gray(&raster.to_raw(), raster.width(), raster.height(), &texts)?;
    write_atomic(output, &png)?;
    info!(
        "Saved {}x{} raster with {} header attributes to {:?}",
        raster.width(),
        raster.height(),
        header.len(),
        output
    );
    Ok(())
}

fn write_atomic(output: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(|source| Error::UnsupportedOutputPath {
        path: parent.clone(),
        source,
    })?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".polarpro-")
        .suffix(".tmp")
        .tempfile_in(&parent)
        .map_err(|source| Error::UnsupportedOutputPath {
            path: parent.clone(),
            source,
        })?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(output).map_err(|e| Error::UnsupportedOutputPath {
        path: output.to_path_buf(),
        source: e.error,
    })?;
    debug!("Wrote {} bytes to {:?}", bytes.len(), output);
    Ok(())
}

/// Read a PNG written by [`save_raster_with_header`] back into header and raster.
///
/// PNGs that only carry a `json_data` chunk are accepted too.
pub fn load_raster_with_header(
    path: &Path,
    directory: &AttributeDirectory,
) -> Result<(Header, CartesianRaster)> {
    let bytes = std::fs::read(path)?;
    let chunks = read_chunks(&bytes)?;
    let texts = text_chunks(&chunks);
    let find = |wanted: &str| {
        texts
            .iter()
            .find(|(keyword, _)| keyword == wanted)
            .map(|(_, text)| text.as_str())
    };
    let header = match (find(HEADER_KEYWORD), find(JSON_KEYWORD)) {
        (Some(text), _) => header_from_text(text, directory)?,
        (None, Some(json)) => {
            debug!("{:?} has no {} chunk, reading {}", path, HEADER_KEYWORD, JSON_KEYWORD);
            header_from_json(json, directory)?
        }
        (None, None) => {
            return Err(Error::Encoding(format!(
                "{:?} has no {} or {} text chunk",
                path, HEADER_KEYWORD, JSON_KEYWORD
            )));
        }
    };

    let gray = image::load_from_memory_with_format(&bytes, image::ImageFormat::Png)?.to_luma8();
    let (width, height) = gray.dimensions();
    let raster = CartesianRaster::from_raw(width as usize, height as usize, gray.into_raw())
        .ok_or_else(|| Error::Encoding("pixel buffer does not match dimensions".into()))?;
    debug!("Loaded {}x{} raster from {:?}", width, height, path);
    Ok((header, raster))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn header() -> Header {
        Header::from_pairs(
            [("NRAYS", "2"), ("OWNER", "lab"), ("ODDITY", "x y z")],
            AttributeDirectory::builtin(),
        )
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.png");
        let raster = CartesianRaster::from_pixels(Array2::from_shape_fn((4, 6), |(r, c)| {
            (r * 40 + c) as u8
        }));
        save_raster_with_header(&header(), &raster, &path).unwrap();

        let (back_header, back_raster) =
            load_raster_with_header(&path, AttributeDirectory::builtin()).unwrap();
        assert_eq!(back_header, header());
        assert_eq!(back_raster, raster);
        assert_eq!(back_header.describe("ODDITY"), Some(""));

        let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("out.png")]);
    }

    #[test]
    fn degenerate_raster_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");
        let raster = CartesianRaster::from_pixels(Array2::zeros((0, 5)));
        assert!(matches!(
            save_raster_with_header(&header(), &raster, &path),
            Err(Error::Encoding(_))
        ));
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn unwritable_directory_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let raster = CartesianRaster::from_pixels(Array2::zeros((2, 2)));
        let err = save_raster_with_header(&header(), &raster, &blocker.join("out.png")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedOutputPath { .. }));
    }

    #[test]
    fn png_with_only_json_data_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.png");
        let json = r#"{ "OWNER": { "value": "lab", "description": "N/A" }, "NRAYS": { "value": 2, "description": "N/A" } }"#;
        let png = create_png_gray(&[1, 2, 3, 4], 2, 2, &[(JSON_KEYWORD, json.to_string())]).unwrap();
        std::fs::write(&path, png).unwrap();

        let (header, raster) = load_raster_with_header(&path, AttributeDirectory::builtin()).unwrap();
        assert_eq!(header.get("OWNER").unwrap().raw, "lab");
        assert_eq!(header.number("NRAYS"), Some(2.0));
        assert_eq!((raster.width(), raster.height()), (2, 2));
    }

    #[test]
    fn png_without_header_chunk_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.png");
        std::fs::write(&path, create_png_gray(&[1, 2, 3, 4], 2, 2, &[]).unwrap()).unwrap();
        assert!(matches!(
            load_raster_with_header(&path, AttributeDirectory::builtin()),
            Err(Error::Encoding(_))
        ));
    }
}
