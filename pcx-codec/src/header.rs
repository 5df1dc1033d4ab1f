//! PCX header parsing and validation.
//!
//! Every PCX file begins with a fixed 128-byte header:
//!
//! ```text
//! offset  size  field
//!      0     1  manufacturer (always 10)
//!      1     1  version
//!      2     1  encoding (1 = RLE)
//!      3     1  bits per pixel per plane
//!      4     8  bounding box: left, top, right, bottom (inclusive, LE u16)
//!     12     4  horizontal / vertical resolution (LE u16)
//!     16    48  16-entry RGB palette (3 bytes per entry)
//!     64     1  reserved
//!     65     1  bit-plane count
//!     66     2  bytes per scanline per plane (LE u16)
//!     68     2  palette type
//!     70    58  reserved / extension fields (ignored)
//! ```
//!
//! All multi-byte fields are little-endian. The bounding box is inclusive,
//! so `width = right - left + 1`; some encoders store it inverted, which is
//! normalized here by swapping.

use crate::error::PcxError;
use bytes::Buf;
use pcx_stream::PcxInStream;
use std::io::Read;

/// Size of the fixed PCX header in bytes.
pub const HEADER_LEN: usize = 128;

/// The manufacturer byte every PCX file starts with.
pub const PCX_MANUFACTURER: u8 = 10;

/// The only supported value of the encoding field (RLE).
pub const ENCODING_RLE: u8 = 1;

/// A parsed and validated PCX header with a normalized bounding box.
#[derive(Debug, Clone)]
pub struct PcxHeader {
    pub version: u8,
    pub encoding: u8,
    pub bits_per_pixel: u8,
    pub left: u16,
    pub top: u16,
    pub right: u16,
    pub bottom: u16,
    pub hres: u16,
    pub vres: u16,
    /// 16-entry RGB palette used for 1, 2 and 4 bpp images. For 2bpp CGA
    /// images the leading bytes are repurposed as mode-selection flags.
    pub palette16: [u8; 48],
    pub bit_planes: u8,
    /// Bytes per scanline per plane. May exceed the bytes strictly needed
    /// for `width` pixels; decoders must consume all of them.
    pub bytes_per_line: u16,
    pub palette_kind: u16,
}

impl PcxHeader {
    /// Read and parse a header from a stream.
    ///
    /// # Errors
    ///
    /// [`PcxError::TruncatedHeader`] if fewer than [`HEADER_LEN`] bytes are
    /// available, plus everything [`parse`](Self::parse) can return.
    pub fn read_from<R: Read>(stream: &mut PcxInStream<R>) -> Result<Self, PcxError> {
        let mut raw = [0u8; HEADER_LEN];
        stream.read_bytes(&mut raw).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                PcxError::TruncatedHeader
            } else {
                PcxError::ShortRead(e)
            }
        })?;
        Self::parse(&raw)
    }

    /// Parse a raw 128-byte header.
    ///
    /// Validates the signature, encoding and bit depth, and normalizes the
    /// bounding box ordering. Validation happens before the caller allocates
    /// anything, so a rejected file costs no buffer space.
    pub fn parse(raw: &[u8; HEADER_LEN]) -> Result<Self, PcxError> {
        let mut buf = &raw[..];

        let manufacturer = buf.get_u8();
        if manufacturer != PCX_MANUFACTURER {
            return Err(PcxError::InvalidSignature {
                found: manufacturer,
            });
        }

        let version = buf.get_u8();

        let encoding = buf.get_u8();
        if encoding != ENCODING_RLE {
            return Err(PcxError::UnsupportedEncoding { found: encoding });
        }

        let bits_per_pixel = buf.get_u8();
        if !matches!(bits_per_pixel, 1 | 2 | 4 | 8) {
            return Err(PcxError::UnsupportedBitDepth {
                found: bits_per_pixel,
            });
        }

        let mut left = buf.get_u16_le();
        let mut top = buf.get_u16_le();
        let mut right = buf.get_u16_le();
        let mut bottom = buf.get_u16_le();
        let hres = buf.get_u16_le();
        let vres = buf.get_u16_le();

        let mut palette16 = [0u8; 48];
        buf.copy_to_slice(&mut palette16);

        let _reserved = buf.get_u8();
        let bit_planes = buf.get_u8();
        let bytes_per_line = buf.get_u16_le();
        let palette_kind = buf.get_u16_le();
        // Remaining 58 bytes are reserved/extension fields.

        // Some encoders store the bounding box inverted.
        if left > right {
            std::mem::swap(&mut left, &mut right);
        }
        if top > bottom {
            std::mem::swap(&mut top, &mut bottom);
        }

        Ok(Self {
            version,
            encoding,
            bits_per_pixel,
            left,
            top,
            right,
            bottom,
            hres,
            vres,
            palette16,
            bit_planes,
            bytes_per_line,
            palette_kind,
        })
    }

    /// Image width in pixels (the bounding box is inclusive).
    pub fn width(&self) -> u32 {
        self.right as u32 - self.left as u32 + 1
    }

    /// Image height in pixels (the bounding box is inclusive).
    pub fn height(&self) -> u32 {
        self.bottom as u32 - self.top as u32 + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_header() -> [u8; HEADER_LEN] {
        let mut raw = [0u8; HEADER_LEN];
        raw[0] = PCX_MANUFACTURER;
        raw[1] = 5; // version
        raw[2] = ENCODING_RLE;
        raw[3] = 8; // bpp
        raw[4..6].copy_from_slice(&10u16.to_le_bytes()); // left
        raw[6..8].copy_from_slice(&20u16.to_le_bytes()); // top
        raw[8..10].copy_from_slice(&19u16.to_le_bytes()); // right
        raw[10..12].copy_from_slice(&39u16.to_le_bytes()); // bottom
        raw[65] = 1; // planes
        raw[66..68].copy_from_slice(&10u16.to_le_bytes()); // bytes per line
        raw
    }

    #[test]
    fn test_parse_valid() {
        let header = PcxHeader::parse(&raw_header()).unwrap();
        assert_eq!(header.version, 5);
        assert_eq!(header.bits_per_pixel, 8);
        assert_eq!(header.bit_planes, 1);
        assert_eq!(header.bytes_per_line, 10);
        assert_eq!(header.width(), 10);
        assert_eq!(header.height(), 20);
    }

    #[test]
    fn test_inverted_box_is_normalized() {
        let mut raw = raw_header();
        raw[4..6].copy_from_slice(&19u16.to_le_bytes()); // left > right
        raw[8..10].copy_from_slice(&10u16.to_le_bytes());
        raw[6..8].copy_from_slice(&39u16.to_le_bytes()); // top > bottom
        raw[10..12].copy_from_slice(&20u16.to_le_bytes());

        let header = PcxHeader::parse(&raw).unwrap();
        assert_eq!(header.left, 10);
        assert_eq!(header.right, 19);
        assert_eq!(header.top, 20);
        assert_eq!(header.bottom, 39);
        assert_eq!(header.width(), 10);
        assert_eq!(header.height(), 20);
    }

    #[test]
    fn test_bad_signature() {
        let mut raw = raw_header();
        raw[0] = 11;
        let err = PcxHeader::parse(&raw).unwrap_err();
        assert!(matches!(err, PcxError::InvalidSignature { found: 11 }));
    }

    #[test]
    fn test_raw_encoding_rejected() {
        let mut raw = raw_header();
        raw[2] = 0;
        let err = PcxHeader::parse(&raw).unwrap_err();
        assert!(matches!(err, PcxError::UnsupportedEncoding { found: 0 }));
    }

    #[test]
    fn test_bad_bit_depth() {
        let mut raw = raw_header();
        raw[3] = 16;
        let err = PcxHeader::parse(&raw).unwrap_err();
        assert!(matches!(err, PcxError::UnsupportedBitDepth { found: 16 }));
    }

    #[test]
    fn test_truncated_header() {
        let raw = raw_header();
        let mut stream = PcxInStream::new(std::io::Cursor::new(raw[..64].to_vec()));
        let err = PcxHeader::read_from(&mut stream).unwrap_err();
        assert!(matches!(err, PcxError::TruncatedHeader));
    }

    #[test]
    fn test_single_pixel_box() {
        let mut raw = raw_header();
        raw[4..12].copy_from_slice(&[0, 0, 0, 0, 0, 0, 0, 0]);
        let header = PcxHeader::parse(&raw).unwrap();
        assert_eq!(header.width(), 1);
        assert_eq!(header.height(), 1);
    }

    #[test]
    fn test_palette_bytes_land_in_place() {
        let mut raw = raw_header();
        raw[16] = 0xAA; // first palette byte
        raw[63] = 0xBB; // last palette byte
        let header = PcxHeader::parse(&raw).unwrap();
        assert_eq!(header.palette16[0], 0xAA);
        assert_eq!(header.palette16[47], 0xBB);
    }
}
