//! Minimal uncompressed-truecolor TGA container writer.
//!
//! Emits TGA type 2 (uncompressed truecolor) files with a top-left
//! origin. Pixel bytes are written verbatim after the 18-byte header;
//! callers pre-arrange channel order. The wire layout:
//!
//! ```text
//! +--------------+-------------------------------------------+
//! | bytes 0..3   | 0, 0, 2, 0 (no id, no colormap, type 2)   |
//! | bytes 4..12  | zero (colormap spec, x/y origin)          |
//! | bytes 12..14 | width, u16 little-endian                  |
//! | bytes 14..16 | height, u16 little-endian                 |
//! | byte 16      | pixel depth in bits                       |
//! | byte 17      | 0x20 (top-left origin descriptor)         |
//! | bytes 18..   | raw pixel data                            |
//! +--------------+-------------------------------------------+
//! ```

use bytes::{BufMut, BytesMut};
use thiserror::Error;

/// Length of the fixed TGA header.
pub const HEADER_LEN: usize = 18;

const IMAGE_TYPE_TRUECOLOR: u8 = 2;
const DESCRIPTOR_TOP_LEFT: u8 = 0x20;

#[derive(Debug, Error)]
pub enum TgaError {
    /// Pixel buffer length does not match width x height x components.
    #[error("pixel buffer holds {found} bytes, expected {expected}")]
    SizeMismatch { expected: usize, found: usize },
    /// Components per pixel outside the supported 1..=4 range.
    #[error("unsupported component count {0}")]
    UnsupportedComponents(u8),
}

fn put_header(out: &mut BytesMut, width: u16, height: u16, depth: u8) {
    out.put_u8(0); // no image id
    out.put_u8(0); // no colormap
    out.put_u8(IMAGE_TYPE_TRUECOLOR);
    out.put_bytes(0, 9); // colormap spec + x/y origin
    out.put_u16_le(width);
    out.put_u16_le(height);
    out.put_u8(depth);
    out.put_u8(DESCRIPTOR_TOP_LEFT);
}

fn expect_len(buf: &[u8], expected: usize) -> Result<(), TgaError> {
    if buf.len() != expected {
        return Err(TgaError::SizeMismatch {
            expected,
            found: buf.len(),
        });
    }
    Ok(())
}

/// Wraps pre-arranged pixel bytes in a TGA container unchanged.
pub fn wrap_truecolor(
    pixels: &[u8],
    width: u16,
    height: u16,
    components: u8,
) -> Result<Vec<u8>, TgaError> {
    if !(1..=4).contains(&components) {
        return Err(TgaError::UnsupportedComponents(components));
    }
    let expected = width as usize * height as usize * components as usize;
    expect_len(pixels, expected)?;

    let mut out = BytesMut::with_capacity(HEADER_LEN + pixels.len());
    put_header(&mut out, width, height, components * 8);
    out.put_slice(pixels);
    Ok(out.to_vec())
}

/// Wraps 4-component pixels, knocking out opaque black.
///
/// Pixels whose bytes are exactly (0, 0, 0, 255) get their alpha forced
/// to 0; every other pixel gets alpha 255. Used for sprite sheets that
/// encode transparency as pure black.
pub fn wrap_black_matte(pixels: &[u8], width: u16, height: u16) -> Result<Vec<u8>, TgaError> {
    let expected = width as usize * height as usize * 4;
    expect_len(pixels, expected)?;

    let mut out = BytesMut::with_capacity(HEADER_LEN + pixels.len());
    put_header(&mut out, width, height, 32);
    for pixel in pixels.chunks_exact(4) {
        let alpha = if pixel == [0, 0, 0, 0xFF] { 0x00 } else { 0xFF };
        out.put_slice(&pixel[..3]);
        out.put_u8(alpha);
    }
    Ok(out.to_vec())
}

/// Builds a 32-bit on/off mask from a palette-index buffer.
///
/// Index 0 becomes a fully transparent black pixel, any other index a
/// fully opaque white one.
pub fn stencil_from_indices(
    indices: &[u8],
    width: u16,
    height: u16,
) -> Result<Vec<u8>, TgaError> {
    let expected = width as usize * height as usize;
    expect_len(indices, expected)?;

    let mut out = BytesMut::with_capacity(HEADER_LEN + expected * 4);
    put_header(&mut out, width, height, 32);
    for &index in indices {
        let level = if index == 0 { 0x00 } else { 0xFF };
        out.put_bytes(level, 4);
    }
    Ok(out.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let tga = wrap_truecolor(&[0u8; 2 * 3 * 4], 2, 3, 4).unwrap();
        assert_eq!(tga.len(), HEADER_LEN + 24);
        assert_eq!(&tga[0..3], &[0, 0, 2]);
        assert_eq!(&tga[3..12], &[0u8; 9]);
        assert_eq!(&tga[12..14], &2u16.to_le_bytes());
        assert_eq!(&tga[14..16], &3u16.to_le_bytes());
        assert_eq!(tga[16], 32);
        assert_eq!(tga[17], 0x20);
    }

    #[test]
    fn test_wrap_truecolor_is_verbatim() {
        let pixels = [1, 2, 3, 4, 5, 6];
        let tga = wrap_truecolor(&pixels, 2, 1, 3).unwrap();
        assert_eq!(tga[16], 24);
        assert_eq!(&tga[HEADER_LEN..], &pixels);
    }

    #[test]
    fn test_wrap_truecolor_size_mismatch() {
        let err = wrap_truecolor(&[0u8; 5], 2, 1, 3).unwrap_err();
        assert!(matches!(
            err,
            TgaError::SizeMismatch {
                expected: 6,
                found: 5,
            }
        ));
    }

    #[test]
    fn test_wrap_truecolor_rejects_bad_component_count() {
        let err = wrap_truecolor(&[0u8; 10], 2, 1, 5).unwrap_err();
        assert!(matches!(err, TgaError::UnsupportedComponents(5)));
    }

    #[test]
    fn test_black_matte_knocks_out_opaque_black() {
        // One opaque black pixel, one red, one black with alpha 0.
        let pixels = [
            0, 0, 0, 0xFF, //
            0, 0, 0xFF, 0xFF, //
            0, 0, 0, 0x00,
        ];
        let tga = wrap_black_matte(&pixels, 3, 1).unwrap();
        let body = &tga[HEADER_LEN..];
        assert_eq!(&body[0..4], &[0, 0, 0, 0x00]);
        assert_eq!(&body[4..8], &[0, 0, 0xFF, 0xFF]);
        // Not opaque black on input, so alpha is forced opaque.
        assert_eq!(&body[8..12], &[0, 0, 0, 0xFF]);
    }

    #[test]
    fn test_stencil_masks_index_zero() {
        let tga = stencil_from_indices(&[0, 7, 255, 0], 2, 2).unwrap();
        let body = &tga[HEADER_LEN..];
        assert_eq!(&body[0..4], &[0x00; 4]);
        assert_eq!(&body[4..8], &[0xFF; 4]);
        assert_eq!(&body[8..12], &[0xFF; 4]);
        assert_eq!(&body[12..16], &[0x00; 4]);
    }

    #[test]
    fn test_stencil_size_mismatch() {
        let err = stencil_from_indices(&[0u8; 3], 2, 2).unwrap_err();
        assert!(matches!(
            err,
            TgaError::SizeMismatch {
                expected: 4,
                found: 3,
            }
        ));
    }
}
