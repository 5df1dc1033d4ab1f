//! RLE token reading.
//!
//! PCX scanline data is run-length framed: a byte with both top bits set
//! holds a repeat count (1-63) in its low six bits and is followed by the
//! value byte; any other byte is a literal run of length 1.
//!
//! A run's value is handed out until its count is exhausted, and leftover
//! counts carry across scanline and plane boundaries. The byte stream never
//! re-aligns at a scanline edge; only the destination indexing resets.

use pcx_stream::PcxInStream;
use std::io::Read;

/// Mask for the two bits that mark a count byte.
const RUN_MARKER: u8 = 0xC0;

/// Mask for the count carried in a marked byte.
const RUN_COUNT: u8 = 0x3F;

/// Expands RLE tokens from a stream one byte at a time.
pub struct RleReader<'a, R> {
    stream: &'a mut PcxInStream<R>,
    count: u8,
    value: u8,
}

impl<'a, R: Read> RleReader<'a, R> {
    pub fn new(stream: &'a mut PcxInStream<R>) -> Self {
        Self {
            stream,
            count: 0,
            value: 0,
        }
    }

    /// Next expanded byte.
    ///
    /// Pulls a fresh token from the stream when the current run is spent.
    pub fn next_byte(&mut self) -> std::io::Result<u8> {
        if self.count == 0 {
            let byte = self.stream.read_u8()?;
            if byte & RUN_MARKER == RUN_MARKER {
                self.count = byte & RUN_COUNT;
                self.value = self.stream.read_u8()?;
            } else {
                self.count = 1;
                self.value = byte;
            }
        }
        // A marked byte with a zero count is malformed; the wrap reproduces
        // the reference decoder's unsigned arithmetic (a run of 256).
        self.count = self.count.wrapping_sub(1);
        Ok(self.value)
    }

    /// Access the underlying stream, e.g. for trailer bytes after the RLE
    /// data ends.
    pub fn stream_mut(&mut self) -> &mut PcxInStream<R> {
        self.stream
    }
}
