//! Decoder for RLE-compressed PCX raster images.
//!
//! A PCX file is a 128-byte header followed by RLE-compressed scanline
//! data and, for 8-bit paletted images, an optional 769-byte palette
//! trailer. The header pins down one of a handful of storage layouts
//! (bit depth times plane count); [`decode`] normalizes all of them to
//! interleaved 8-bit RGB or RGBA plus a parallel palette-index buffer.
//!
//! ```no_run
//! let image = pcx_codec::decode_file("splash.pcx", false, Some(4))?;
//! assert_eq!(image.components, 4);
//! # Ok::<(), pcx_codec::PcxError>(())
//! ```

mod error;
mod header;
mod palette;
mod remap;
mod rle;
mod unpack;

pub use error::PcxError;
pub use header::PcxHeader;
pub use remap::remap;

use pcx_stream::PcxInStream;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use unpack::Unpacker;

/// A fully decoded image.
///
/// `pixels` holds `width * height * components` interleaved bytes;
/// `palette_indices` holds one byte per pixel. For layouts without a
/// palette the index buffer carries the nearest raw per-pixel byte
/// instead (the gray value for monochrome and grayscale images, the
/// first-plane byte for true-color ones).
#[derive(Debug, Clone)]
pub struct DecodedPcx {
    pub width: u32,
    pub height: u32,
    /// Channels per pixel in `pixels`, 3 or 4 (4 only via remapping or
    /// the 8-bit 4-plane layout).
    pub components: u8,
    pub pixels: Vec<u8>,
    pub palette_indices: Vec<u8>,
}

/// Decodes a PCX image from any byte source.
///
/// `flipped` inverts the vertical row order of both output buffers.
/// `desired_components` requests a channel-count conversion of the pixel
/// buffer after decoding; `None` or `Some(0)` keeps the natural count.
pub fn decode<R: Read>(
    reader: R,
    flipped: bool,
    desired_components: Option<u8>,
) -> Result<DecodedPcx, PcxError> {
    let mut stream = PcxInStream::new(reader);
    let header = PcxHeader::read_from(&mut stream)?;

    let width = header.width() as usize;
    let height = header.height() as usize;
    let components: usize = if header.bits_per_pixel == 8 && header.bit_planes == 4 {
        4
    } else {
        3
    };

    let desired = desired_components.filter(|&d| d != 0);
    if let Some(d) = desired {
        if d > 4 {
            return Err(PcxError::UnsupportedRemap {
                from: components as u8,
                to: d,
            });
        }
    }

    let pixel_len = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(components))
        .ok_or(PcxError::OutOfMemory)?;
    let mut pixels = try_zeroed(pixel_len)?;
    let mut indices = try_zeroed(width * height)?;

    Unpacker::new(
        &mut stream,
        &header,
        flipped,
        components,
        &mut pixels,
        &mut indices,
    )
    .unpack()?;

    let components = components as u8;
    if let Some(d) = desired {
        if d != components {
            pixels = remap(&pixels, components, d)?;
            return Ok(DecodedPcx {
                width: width as u32,
                height: height as u32,
                components: d,
                pixels,
                palette_indices: indices,
            });
        }
    }

    Ok(DecodedPcx {
        width: width as u32,
        height: height as u32,
        components,
        pixels,
        palette_indices: indices,
    })
}

/// Decodes a PCX image already resident in memory.
pub fn decode_memory(
    data: &[u8],
    flipped: bool,
    desired_components: Option<u8>,
) -> Result<DecodedPcx, PcxError> {
    decode(data, flipped, desired_components)
}

/// Opens and decodes a PCX file.
pub fn decode_file<P: AsRef<Path>>(
    path: P,
    flipped: bool,
    desired_components: Option<u8>,
) -> Result<DecodedPcx, PcxError> {
    let file = File::open(path)?;
    decode(file, flipped, desired_components)
}

/// Allocates a zero-filled buffer, surfacing allocation failure as an
/// error instead of aborting.
pub(crate) fn try_zeroed(len: usize) -> Result<Vec<u8>, PcxError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len).map_err(|_| PcxError::OutOfMemory)?;
    buf.resize(len, 0);
    Ok(buf)
}

#[cfg(test)]
pub(crate) mod testutil {
    use crate::header::{ENCODING_RLE, HEADER_LEN, PCX_MANUFACTURER};

    /// Header fields for hand-built test files. Coordinates are the raw
    /// inclusive bounding box as stored on disk.
    pub(crate) struct RawPcx {
        pub version: u8,
        pub bits_per_pixel: u8,
        pub left: u16,
        pub top: u16,
        pub right: u16,
        pub bottom: u16,
        pub bit_planes: u8,
        pub bytes_per_line: u16,
        pub palette16: [u8; 48],
    }

    impl Default for RawPcx {
        fn default() -> Self {
            Self {
                version: 0,
                bits_per_pixel: 8,
                left: 0,
                top: 0,
                right: 0,
                bottom: 0,
                bit_planes: 1,
                bytes_per_line: 1,
                palette16: [0; 48],
            }
        }
    }

    impl RawPcx {
        /// Serializes the header and appends the given body bytes.
        pub(crate) fn with_data(&self, data: &[u8]) -> Vec<u8> {
            let mut bytes = vec![0u8; HEADER_LEN];
            bytes[0] = PCX_MANUFACTURER;
            bytes[1] = self.version;
            bytes[2] = ENCODING_RLE;
            bytes[3] = self.bits_per_pixel;
            bytes[4..6].copy_from_slice(&self.left.to_le_bytes());
            bytes[6..8].copy_from_slice(&self.top.to_le_bytes());
            bytes[8..10].copy_from_slice(&self.right.to_le_bytes());
            bytes[10..12].copy_from_slice(&self.bottom.to_le_bytes());
            bytes[16..64].copy_from_slice(&self.palette16);
            bytes[65] = self.bit_planes;
            bytes[66..68].copy_from_slice(&self.bytes_per_line.to_le_bytes());
            bytes.extend_from_slice(data);
            bytes
        }
    }

    /// Encodes bytes as RLE literals, escaping values that collide with
    /// the run-marker range.
    pub(crate) fn rle_escape(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(data.len());
        for &b in data {
            if b & 0xC0 == 0xC0 {
                out.push(0xC1);
            }
            out.push(b);
        }
        out
    }
}
