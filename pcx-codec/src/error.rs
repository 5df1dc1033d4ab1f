//! Error types for PCX decoding.

use std::io;
use thiserror::Error;

/// Errors that can occur while decoding a PCX image.
///
/// All failures are detected synchronously and abort the whole decode; there
/// is no partial-image result and nothing is retryable. The decoder never
/// returns a corrupted-but-populated image.
#[derive(Debug, Error)]
pub enum PcxError {
    /// Fewer bytes were available than the fixed 128-byte header requires.
    #[error("truncated header: fewer than 128 bytes available")]
    TruncatedHeader,

    /// The stream ran out of data (or failed) partway through a read.
    #[error("short read: {0}")]
    ShortRead(#[source] io::Error),

    /// The manufacturer byte is not the PCX magic value (10).
    #[error("invalid signature: expected 10, found {found}")]
    InvalidSignature { found: u8 },

    /// The encoding field is not 1 (RLE). A value of 0 would mean raw,
    /// unencoded data, which real encoders never produce.
    #[error("unsupported encoding {found}: only RLE (1) is supported")]
    UnsupportedEncoding { found: u8 },

    /// Bits-per-pixel outside {1, 2, 4, 8}.
    #[error("unsupported bit depth: {found} bits per pixel")]
    UnsupportedBitDepth { found: u8 },

    /// The bit-plane count is not implemented for this bit depth.
    #[error("unsupported plane configuration: {bit_planes} planes at {bits_per_pixel} bpp")]
    UnsupportedPlaneConfiguration { bits_per_pixel: u8, bit_planes: u8 },

    /// Allocation of an output buffer failed.
    #[error("out of memory allocating decode buffers")]
    OutOfMemory,

    /// Component-count conversion outside the defined remap table.
    #[error("unsupported component remap: {from} -> {to} channels")]
    UnsupportedRemap { from: u8, to: u8 },
}

impl From<io::Error> for PcxError {
    fn from(err: io::Error) -> Self {
        PcxError::ShortRead(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = PcxError::InvalidSignature { found: 11 };
        assert_eq!(err.to_string(), "invalid signature: expected 10, found 11");

        let err = PcxError::UnsupportedPlaneConfiguration {
            bits_per_pixel: 8,
            bit_planes: 2,
        };
        assert!(err.to_string().contains("2 planes at 8 bpp"));
    }

    #[test]
    fn test_io_error_maps_to_short_read() {
        let io_err = io::Error::from(io::ErrorKind::UnexpectedEof);
        let err = PcxError::from(io_err);
        assert!(matches!(err, PcxError::ShortRead(_)));
    }
}
