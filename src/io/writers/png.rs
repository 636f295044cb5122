//! PNG encoding for 8-bit greyscale rasters with `tEXt` metadata chunks,
//! plus a chunk walker for reading the text chunks back.
//!
//! Rows are stored unfiltered (filter type 0) and deflated with zlib, so the pixel
//! data round-trips exactly.
use std::io::Write;

use crate::error::{Error, Result};

pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Longest keyword allowed in a `tEXt` chunk.
const MAX_KEYWORD_LEN: usize = 79;

/// A raw PNG chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub kind: [u8; 4],
    pub data: Vec<u8>,
}

/// Create a greyscale PNG (color type 0, 8 bits) with the given text chunks.
///
/// # Arguments
/// - `pixels`: row-major intensities, `width * height` bytes
/// - `texts`: `(keyword, text)` pairs written as `tEXt` chunks before the image data
pub fn create_png_gray(
    pixels: &[u8],
    width: usize,
    height: usize,
    texts: &[(&str, String)],
) -> Result<Vec<u8>> {
    if width == 0 || height == 0 {
        return Err(Error::Encoding(format!(
            "degenerate raster {}x{}",
            width, height
        )));
    }
    if pixels.len() != width * height {
        return Err(Error::Encoding(format!(
            "pixel buffer holds {} bytes, expected {}",
            pixels.len(),
            width * height
        )));
    }
    let (w, h) = match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => return Err(Error::Encoding("raster too large for PNG".into())),
    };

    let mut png = Vec::new();
    png.extend_from_slice(&PNG_SIGNATURE);

    // IHDR chunk
    let mut ihdr_data = Vec::with_capacity(13);
    ihdr_data.extend_from_slice(&w.to_be_bytes());
    ihdr_data.extend_from_slice(&h.to_be_bytes());
    ihdr_data.push(8); // bit depth
    ihdr_data.push(0); // color type 0 = greyscale
    ihdr_data.push(0); // compression method
    ihdr_data.push(0); // filter method
    ihdr_data.push(0); // interlace method
    write_chunk(&mut png, b"IHDR", &ihdr_data);

    for (keyword, text) in texts {
        write_chunk(&mut png, b"tEXt", &text_chunk_data(keyword, text)?);
    }

    let idat_data = deflate_idat_gray(pixels, width, height)
        .map_err(|e| Error::Encoding(format!("IDAT compression failed: {}", e)))?;
    write_chunk(&mut png, b"IDAT", &idat_data);

    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Encode `text` as Latin-1; characters above U+00FF cannot be stored in `tEXt`.
fn latin1_bytes(text: &str) -> Result<Vec<u8>> {
    text.chars()
        .map(|c| {
            u8::try_from(u32::from(c))
                .map_err(|_| Error::Encoding(format!("character {:?} is not Latin-1", c)))
        })
        .collect()
}

fn text_chunk_data(keyword: &str, text: &str) -> Result<Vec<u8>> {
    if keyword.is_empty() || keyword.len() > MAX_KEYWORD_LEN || keyword.contains('\0') {
        return Err(Error::Encoding(format!("invalid tEXt keyword {:?}", keyword)));
    }
    let mut data = latin1_bytes(keyword)?;
    data.push(0);
    data.extend(latin1_bytes(text)?);
    Ok(data)
}

/// Write a PNG chunk
fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);
    png.extend_from_slice(&chunk_crc(chunk_type, data).to_be_bytes());
}

fn chunk_crc(chunk_type: &[u8; 4], data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    hasher.finalize()
}

/// Deflate greyscale rows for the IDAT chunk.
fn deflate_idat_gray(
    pixels: &[u8],
    width: usize,
    height: usize,
) -> std::result::Result<Vec<u8>, std::io::Error> {
    let mut uncompressed = Vec::with_capacity(height * (1 + width));
    for row in pixels.chunks_exact(width) {
        uncompressed.push(0); // filter type: none
        uncompressed.extend_from_slice(row);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(&uncompressed)?;
    encoder.finish()
}

/// Split a PNG stream into its chunks, verifying signature and CRCs. Stops after `IEND`.
pub fn read_chunks(png: &[u8]) -> Result<Vec<Chunk>> {
    if png.len() < PNG_SIGNATURE.len() || png[..8] != PNG_SIGNATURE {
        return Err(Error::Encoding("not a PNG stream".into()));
    }
    let mut chunks = Vec::new();
    let mut pos = PNG_SIGNATURE.len();
    while pos < png.len() {
        if png.len() - pos < 12 {
            return Err(Error::Encoding(format!("truncated chunk at byte {}", pos)));
        }
        let len = u32::from_be_bytes([png[pos], png[pos + 1], png[pos + 2], png[pos + 3]]) as usize;
        let kind = [png[pos + 4], png[pos + 5], png[pos + 6], png[pos + 7]];
        let data_start = pos + 8;
        let data_end = data_start
            .checked_add(len)
            .filter(|end| end + 4 <= png.len())
            .ok_or_else(|| Error::Encoding(format!("truncated chunk at byte {}", pos)))?;
        let data = &png[data_start..data_end];
        let stored = u32::from_be_bytes([
            png[data_end],
            png[data_end + 1],
            png[data_end + 2],
            png[data_end + 3],
        ]);
        if stored != chunk_crc(&kind, data) {
            return Err(Error::Encoding(format!(
                "CRC mismatch in {} chunk",
                String::from_utf8_lossy(&kind)
            )));
        }
        chunks.push(Chunk {
            kind,
            data: data.to_vec(),
        });
        pos = data_end + 4;
        if &kind == b"IEND" {
            break;
        }
    }
    Ok(chunks)
}

/// Decoded `tEXt` chunks as `(keyword, text)`, in file order.
pub fn text_chunks(chunks: &[Chunk]) -> Vec<(String, String)> {
    chunks
        .iter()
        .filter(|c| &c.kind == b"tEXt")
        .filter_map(|c| {
            let nul = c.data.iter().position(|&b| b == 0)?;
            let keyword = c.data[..nul].iter().map(|&b| b as char).collect();
            let text = c.data[nul + 1..].iter().map(|&b| b as char).collect();
            Some((keyword, text))
        })
        .collect()
}
