//! Sample grid decoder: turns the binary payload into an azimuth x range grid.
use ndarray::Array2;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::io::header::HeaderLayout;
use crate::types::{BitDepth, ByteOrder};

/// Raw polar samples indexed by `[azimuth, range]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleGrid {
    samples: Array2<u16>,
    bit_depth: BitDepth,
}

impl SampleGrid {
    /// Wrap an existing array. Fails if any value exceeds the bit depth.
    pub fn new(samples: Array2<u16>, bit_depth: BitDepth) -> Result<Self> {
        let max = bit_depth.max_value();
        if let Some(v) = samples.iter().find(|&&v| v > max) {
            return Err(Error::InvalidArgument {
                arg: "sample",
                value: format!("{} exceeds {} range", v, bit_depth),
            });
        }
        Ok(Self { samples, bit_depth })
    }

    pub fn azimuth_count(&self) -> usize {
        self.samples.nrows()
    }

    pub fn range_count(&self) -> usize {
        self.samples.ncols()
    }

    pub fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }

    pub fn get(&self, azimuth: usize, range: usize) -> Option<u16> {
        self.samples.get((azimuth, range)).copied()
    }

    pub fn samples(&self) -> &Array2<u16> {
        &self.samples
    }

    pub fn into_array(self) -> Array2<u16> {
        self.samples
    }
}

/// Decode `payload` according to the header layout.
///
/// Reads exactly `azimuths * ranges * bytes_per_sample` bytes; extra trailing bytes are
/// ignored, a short payload is `TruncatedFile`.
pub fn decode_samples(layout: &HeaderLayout, payload: &[u8]) -> Result<SampleGrid> {
    let bit_depth = BitDepth::from_bits(layout.bit_depth)?;
    let bps = bit_depth.bytes_per_sample();
    let (rows, cols) = (layout.azimuth_count, layout.range_count);

    let expected = rows
        .checked_mul(cols)
        .and_then(|n| n.checked_mul(bps))
        .ok_or_else(|| Error::malformed("NRAYS", "declared grid size overflows"))?;
    if payload.len() < expected {
        return Err(Error::TruncatedFile {
            expected,
            actual: payload.len(),
        });
    }
    if payload.len() > expected {
        warn!(
            "Ignoring {} trailing bytes after {} byte payload",
            payload.len() - expected,
            expected
        );
    }

    let data = &payload[..expected];
    let values: Vec<u16> = match bit_depth {
        BitDepth::U8 => data.iter().map(|&b| b as u16).collect(),
        BitDepth::U16 => data
            .chunks_exact(2)
            .map(|pair| layout.byte_order.read_u16([pair[0], pair[1]]))
            .collect(),
    };

    let samples = Array2::from_shape_vec((rows, cols), values)
        .map_err(|e| Error::malformed("FIFO", e.to_string()))?;
    debug!(
        "Decoded {}x{} {} samples ({} byte order)",
        rows, cols, bit_depth, layout.byte_order
    );
    Ok(SampleGrid { samples, bit_depth })
}

/// Encode a grid back into payload bytes. Used to build captures programmatically.
pub fn encode_samples(grid: &SampleGrid, byte_order: ByteOrder) -> Vec<u8> {
    let mut out = Vec::with_capacity(grid.samples.len() * grid.bit_depth.bytes_per_sample());
    for &v in grid.samples.iter() {
        match (grid.bit_depth, byte_order) {
            (BitDepth::U8, _) => out.push(v as u8),
            (BitDepth::U16, ByteOrder::Lsb) => out.extend_from_slice(&v.to_le_bytes()),
            (BitDepth::U16, ByteOrder::Msb) => out.extend_from_slice(&v.to_be_bytes()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(bits: i64, byte_order: ByteOrder) -> HeaderLayout {
        HeaderLayout {
            azimuth_count: 2,
            range_count: 3,
            bit_depth: bits,
            byte_order,
            range_resolution: 1.0,
        }
    }

    #[test]
    fn decodes_8bit_row_major() {
        let grid = decode_samples(&layout(8, ByteOrder::Msb), &[1, 2, 3, 4, 5, 255]).unwrap();
        assert_eq!(grid.azimuth_count(), 2);
        assert_eq!(grid.range_count(), 3);
        assert_eq!(grid.get(0, 2), Some(3));
        assert_eq!(grid.get(1, 0), Some(4));
        assert_eq!(grid.get(1, 2), Some(255));
        assert_eq!(grid.get(2, 0), None);
    }

    #[test]
    fn decodes_16bit_both_byte_orders() {
        let payload = [0x01, 0x02, 0, 0, 0, 0, 0, 0, 0, 0, 0xFF, 0xFE];
        let msb = decode_samples(&layout(16, ByteOrder::Msb), &payload).unwrap();
        let lsb = decode_samples(&layout(16, ByteOrder::Lsb), &payload).unwrap();
        assert_eq!(msb.get(0, 0), Some(0x0102));
        assert_eq!(lsb.get(0, 0), Some(0x0201));
        assert_eq!(msb.get(1, 2), Some(0xFFFE));
        assert_eq!(lsb.get(1, 2), Some(0xFEFF));
    }

    #[test]
    fn short_payload_is_truncated() {
        let err = decode_samples(&layout(16, ByteOrder::Lsb), &[0u8; 11]).unwrap_err();
        assert!(matches!(
            err,
            Error::TruncatedFile {
                expected: 12,
                actual: 11
            }
        ));
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let grid = decode_samples(&layout(8, ByteOrder::Lsb), &[9u8; 10]).unwrap();
        assert_eq!(grid.samples().len(), 6);
    }

    #[test]
    fn rejects_unsupported_depth() {
        assert!(matches!(
            decode_samples(&layout(12, ByteOrder::Lsb), &[0u8; 12]),
            Err(Error::UnsupportedBitDepth(12))
        ));
    }

    #[test]
    fn encode_inverts_decode() {
        let payload: Vec<u8> = (0u8..12).collect();
        let lo = layout(16, ByteOrder::Lsb);
        let grid = decode_samples(&lo, &payload).unwrap();
        assert_eq!(encode_samples(&grid, ByteOrder::Lsb), payload);
    }

    #[test]
    fn new_checks_value_range() {
        let arr = Array2::from_elem((1, 1), 300u16);
        assert!(SampleGrid::new(arr.clone(), BitDepth::U8).is_err());
        assert!(SampleGrid::new(arr, BitDepth::U16).is_ok());
    }
}
