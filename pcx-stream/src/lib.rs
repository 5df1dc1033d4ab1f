//! Buffered byte source for PCX decoding.
//!
//! This crate provides [`PcxInStream`], a pull-based buffered reader with
//! type-safe methods for reading primitive values in the byte order PCX uses
//! (little-endian). The decoder depends only on this interface, never on a
//! concrete I/O backend: an in-memory blob is a [`std::io::Cursor`], a file
//! is a [`std::fs::File`].
//!
//! Decoding is synchronous and runs to completion on the calling thread, so
//! the stream is built on plain [`std::io::Read`]. Short reads are detected
//! after every refill by comparing bytes obtained against bytes requested;
//! running out of data mid-request surfaces as
//! [`std::io::ErrorKind::UnexpectedEof`].
//!
//! # Examples
//!
//! ```
//! use pcx_stream::PcxInStream;
//! use std::io::Cursor;
//!
//! # fn example() -> std::io::Result<()> {
//! let data = vec![0x0A, 0x05, 0x01, 0x08, 0x10, 0x00];
//! let mut stream = PcxInStream::new(Cursor::new(data));
//!
//! let manufacturer = stream.read_u8()?;
//! assert_eq!(manufacturer, 0x0A);
//! stream.skip(3)?;
//! let left = stream.read_u16_le()?;
//! assert_eq!(left, 16);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use bytes::{Buf, BytesMut};
use std::io::Read;

/// Default internal buffer size for a [`PcxInStream`].
const DEFAULT_CAPACITY: usize = 8192;

/// Buffered input stream for reading PCX data.
///
/// The stream maintains an internal buffer that is refilled on demand.
/// Methods like [`read_u16_le()`](Self::read_u16_le) read from this buffer
/// when possible, only touching the underlying reader when it needs
/// refilling.
///
/// # Examples
///
/// ```no_run
/// use pcx_stream::PcxInStream;
///
/// # fn example() -> std::io::Result<()> {
/// let file = std::fs::File::open("image.pcx")?;
/// let mut stream = PcxInStream::new(file);
///
/// let mut header = [0u8; 128];
/// stream.read_bytes(&mut header)?;
/// # Ok(())
/// # }
/// ```
pub struct PcxInStream<R> {
    reader: R,
    buffer: BytesMut,
}

impl<R: Read> PcxInStream<R> {
    /// Create a new input stream with the default buffer size (8KB).
    pub fn new(reader: R) -> Self {
        Self::with_capacity(reader, DEFAULT_CAPACITY)
    }

    /// Create a new input stream with the specified buffer capacity.
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        Self {
            reader,
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    /// Ensure at least `n` bytes are available in the buffer.
    ///
    /// Reads from the underlying reader until the buffer contains at least
    /// `n` bytes. Returns `UnexpectedEof` if the reader is exhausted first.
    fn ensure_bytes(&mut self, n: usize) -> std::io::Result<()> {
        let mut chunk = [0u8; DEFAULT_CAPACITY];
        while self.buffer.len() < n {
            let bytes_read = self.reader.read(&mut chunk)?;
            if bytes_read == 0 {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    format!("expected {} bytes, got {}", n, self.buffer.len()),
                ));
            }
            self.buffer.extend_from_slice(&chunk[..bytes_read]);
        }
        Ok(())
    }

    /// Read a single byte (u8).
    ///
    /// # Errors
    ///
    /// Returns an error if EOF is reached or an I/O error occurs.
    pub fn read_u8(&mut self) -> std::io::Result<u8> {
        self.ensure_bytes(1)?;
        Ok(self.buffer.get_u8())
    }

    /// Read a single byte, returning `Ok(None)` at a clean end of stream.
    ///
    /// PCX uses optional trailer bytes (the 0x0C palette marker after 8bpp
    /// pixel data); a stream that simply ends where the marker would be is
    /// valid, so EOF here is not an error.
    pub fn try_read_u8(&mut self) -> std::io::Result<Option<u8>> {
        match self.ensure_bytes(1) {
            Ok(()) => Ok(Some(self.buffer.get_u8())),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Read a 16-bit unsigned integer in little-endian byte order.
    ///
    /// All multi-byte fields in a PCX header are little-endian.
    ///
    /// # Errors
    ///
    /// Returns an error if EOF is reached or an I/O error occurs.
    pub fn read_u16_le(&mut self) -> std::io::Result<u16> {
        self.ensure_bytes(2)?;
        Ok(self.buffer.get_u16_le())
    }

    /// Read exactly `buf.len()` bytes into the provided buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if EOF is reached before the buffer is filled,
    /// or if an I/O error occurs.
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> std::io::Result<()> {
        self.ensure_bytes(buf.len())?;
        self.buffer.copy_to_slice(buf);
        Ok(())
    }

    /// Skip `n` bytes in the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if EOF is reached before `n` bytes are skipped,
    /// or if an I/O error occurs.
    pub fn skip(&mut self, n: usize) -> std::io::Result<()> {
        self.ensure_bytes(n)?;
        self.buffer.advance(n);
        Ok(())
    }

    /// Number of bytes currently buffered and readable without I/O.
    pub fn available(&self) -> usize {
        self.buffer.len()
    }

    /// Get a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Get a mutable reference to the underlying reader.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Consume the stream and return the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}
