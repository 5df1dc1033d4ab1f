//! Bit-depth unpack algorithms.
//!
//! Each scanline is stored as `bit_planes` consecutive plane segments of
//! `bytes_per_line` RLE-expanded bytes. That segment width may exceed the
//! bytes strictly needed for `width` pixels, so every algorithm consumes
//! exactly `bytes_per_line` bytes per plane per scanline but stops writing
//! output once the destination x-coordinate reaches the image width.
//!
//! Scanlines are visited in storage order (top to bottom); the destination
//! row is inverted when the caller asked for a flipped image, uniformly for
//! the pixel buffer and the palette-index buffer.
//!
//! The 2bpp/4-plane and 4bpp paths reproduce the reference decoder's bit
//! arithmetic verbatim. Both are untested upstream (no known reference
//! files); their arithmetic is preserved rather than corrected.

use crate::error::PcxError;
use crate::header::PcxHeader;
use crate::palette::{CgaMode, Palette16, Palette256, CGA_PALETTE};
use crate::rle::RleReader;
use pcx_stream::PcxInStream;
use std::io::Read;

/// Marker byte announcing an appended palette after the pixel data.
const PALETTE_MARKER: u8 = 0x0C;

/// Unpacks RLE plane data into preallocated pixel and index buffers.
///
/// The pixel buffer must be zero-initialized: the planar paths OR bits into
/// it across plane passes.
pub(crate) struct Unpacker<'a, R: Read> {
    rle: RleReader<'a, R>,
    header: &'a PcxHeader,
    flipped: bool,
    width: usize,
    height: usize,
    components: usize,
    pixels: &'a mut [u8],
    indices: &'a mut [u8],
}

impl<'a, R: Read> Unpacker<'a, R> {
    pub(crate) fn new(
        stream: &'a mut PcxInStream<R>,
        header: &'a PcxHeader,
        flipped: bool,
        components: usize,
        pixels: &'a mut [u8],
        indices: &'a mut [u8],
    ) -> Self {
        let width = header.width() as usize;
        let height = header.height() as usize;
        debug_assert_eq!(pixels.len(), width * height * components);
        debug_assert_eq!(indices.len(), width * height);
        Self {
            rle: RleReader::new(stream),
            header,
            flipped,
            width,
            height,
            components,
            pixels,
            indices,
        }
    }

    pub(crate) fn unpack(&mut self) -> Result<(), PcxError> {
        match self.header.bits_per_pixel {
            1 => self.unpack_1bpp(),
            2 => self.unpack_2bpp(),
            4 => self.unpack_4bpp(),
            8 => self.unpack_8bpp(),
            other => Err(PcxError::UnsupportedBitDepth { found: other }),
        }
    }

    /// Destination row for storage-order scanline `y`.
    fn dst_row(&self, y: usize) -> usize {
        if self.flipped {
            self.height - y - 1
        } else {
            y
        }
    }

    fn pixel_row_start(&self, y: usize) -> usize {
        self.dst_row(y) * self.width * self.components
    }

    fn index_row_start(&self, y: usize) -> usize {
        self.dst_row(y) * self.width
    }

    fn unpack_1bpp(&mut self) -> Result<(), PcxError> {
        let bytes_per_line = self.header.bytes_per_line as usize;
        match self.header.bit_planes {
            1 => {
                // Monochrome: each bit is a pixel, 1 -> white, 0 -> black.
                for y in 0..self.height {
                    let row = self.pixel_row_start(y);
                    let idx_row = self.index_row_start(y);
                    for x in 0..bytes_per_line {
                        let value = self.rle.next_byte()?;
                        for bit in 0..8 {
                            let px = x * 8 + bit;
                            if px >= self.width {
                                break;
                            }
                            let gray = ((value >> (7 - bit)) & 1) * 255;
                            let base = row + px * 3;
                            self.pixels[base] = gray;
                            self.pixels[base + 1] = gray;
                            self.pixels[base + 2] = gray;
                            self.indices[idx_row + px] = gray;
                        }
                    }
                }
                Ok(())
            }
            planes @ 2..=4 => {
                // Planar color: each plane ORs one bit per pixel into a
                // shared accumulator byte, then the accumulated value is
                // resolved through the header palette.
                let palette = Palette16::new(&self.header.palette16);
                let channels = usize::min(self.components, 3);
                for y in 0..self.height {
                    let row = self.pixel_row_start(y);
                    let idx_row = self.index_row_start(y);
                    for plane in 0..planes as usize {
                        for x in 0..bytes_per_line {
                            let value = self.rle.next_byte()?;
                            for bit in 0..8 {
                                let px = x * 8 + bit;
                                if px >= self.width {
                                    break;
                                }
                                let bit_value = (value >> (7 - bit)) & 1;
                                let base = row + px * self.components;
                                self.pixels[base] |= bit_value << plane;
                                self.indices[idx_row + px] = self.pixels[base];
                            }
                        }
                    }
                    for px in 0..self.width {
                        let base = row + px * self.components;
                        let color = palette.color(self.pixels[base]);
                        self.pixels[base..base + channels].copy_from_slice(&color[..channels]);
                    }
                }
                Ok(())
            }
            other => Err(PcxError::UnsupportedPlaneConfiguration {
                bits_per_pixel: 1,
                bit_planes: other,
            }),
        }
    }

    fn unpack_2bpp(&mut self) -> Result<(), PcxError> {
        let bytes_per_line = self.header.bytes_per_line as usize;
        match self.header.bit_planes {
            1 => {
                // CGA mode: 2-bit values index the fixed reference palette,
                // steered by the mode bits stashed in the header palette.
                let cga = CgaMode::from_header_palette(&self.header.palette16);
                let cga_palette = Palette16::new(&CGA_PALETTE);
                for y in 0..self.height {
                    let row = self.pixel_row_start(y);
                    let idx_row = self.index_row_start(y);
                    for x in 0..bytes_per_line {
                        let value = self.rle.next_byte()?;
                        for crumb in 0..4 {
                            let px = x * 4 + crumb;
                            if px >= self.width {
                                break;
                            }
                            let shift = (3 - crumb) * 2;
                            let palette_index = (value >> shift) & 0x03;
                            let color = cga_palette.color(cga.index_for(palette_index));
                            let base = row + px * 3;
                            self.pixels[base..base + 3].copy_from_slice(&color);
                            self.indices[idx_row + px] = palette_index;
                        }
                    }
                }

                // Version 5 files may append a custom palette here. None of
                // the available reference files carry one, so it is detected
                // but not decoded; the CGA colors above stand.
                if self.header.version == 5 {
                    if let Some(marker) = self.rle.stream_mut().try_read_u8()? {
                        if marker == PALETTE_MARKER {
                            tracing::warn!(
                                "2bpp image carries a trailing custom palette; \
                                 keeping the CGA reference colors"
                            );
                        }
                    }
                }
                Ok(())
            }
            4 => {
                // Untested upstream. The mask `4 << shift` extracts a single
                // bit, not a bit pair, so after `& 0x03` every contribution
                // is zero and all pixels resolve to palette entry 0. Kept
                // as-is pending a reference file.
                tracing::warn!("decoding a 2bpp/4-plane image; this path has no reference files");
                let palette = Palette16::new(&self.header.palette16);
                let channels = usize::min(self.components, 3);
                for y in 0..self.height {
                    let row = self.pixel_row_start(y);
                    let idx_row = self.index_row_start(y);
                    for plane in 0..4usize {
                        for x in 0..bytes_per_line {
                            let value = self.rle.next_byte()?;
                            for pair in 0..4 {
                                let px = x * 4 + pair;
                                if px >= self.width {
                                    break;
                                }
                                let shift = 3 - pair;
                                let palette_index = (value & (0x04 << shift)) >> shift;
                                let base = row + px * self.components;
                                self.pixels[base] |= (palette_index & 0x03) << (plane * 2);
                            }
                        }
                    }
                    for px in 0..self.width {
                        let base = row + px * self.components;
                        let accumulated = self.pixels[base];
                        self.indices[idx_row + px] = accumulated;
                        let color = palette.color(accumulated);
                        self.pixels[base..base + channels].copy_from_slice(&color[..channels]);
                    }
                }
                Ok(())
            }
            other => Err(PcxError::UnsupportedPlaneConfiguration {
                bits_per_pixel: 2,
                bit_planes: other,
            }),
        }
    }

    fn unpack_4bpp(&mut self) -> Result<(), PcxError> {
        if self.header.bit_planes != 1 {
            return Err(PcxError::UnsupportedPlaneConfiguration {
                bits_per_pixel: 4,
                bit_planes: self.header.bit_planes,
            });
        }

        // Untested upstream. The mask `4 << shift` picks out one bit of each
        // nibble rather than the whole nibble, so indices are only ever 0 or
        // 4. Kept as-is pending a reference file.
        tracing::warn!("decoding a 4bpp image; this path has no reference files");
        let bytes_per_line = self.header.bytes_per_line as usize;
        let palette = Palette16::new(&self.header.palette16);
        let channels = usize::min(self.components, 3);
        for y in 0..self.height {
            let row = self.pixel_row_start(y);
            let idx_row = self.index_row_start(y);
            for x in 0..bytes_per_line {
                let value = self.rle.next_byte()?;
                for nibble in 0..2 {
                    let px = x * 2 + nibble;
                    if px >= self.width {
                        break;
                    }
                    let shift = 1 - nibble;
                    let palette_index = (value & (0x04 << shift)) >> shift;
                    let base = row + px * self.components;
                    self.pixels[base] |= palette_index & 0x0F;
                    self.indices[idx_row + px] = self.pixels[base];
                }
            }
            for px in 0..self.width {
                let base = row + px * self.components;
                let color = palette.color(self.pixels[base]);
                self.pixels[base..base + channels].copy_from_slice(&color[..channels]);
            }
        }
        Ok(())
    }

    fn unpack_8bpp(&mut self) -> Result<(), PcxError> {
        let bytes_per_line = self.header.bytes_per_line as usize;
        match self.header.bit_planes {
            1 => {
                for y in 0..self.height {
                    let row = self.pixel_row_start(y);
                    for x in 0..bytes_per_line {
                        let value = self.rle.next_byte()?;
                        if x < self.width {
                            let base = row + x * 3;
                            self.pixels[base] = value;
                            self.pixels[base + 1] = value;
                            self.pixels[base + 2] = value;
                        }
                    }
                }

                // A 0x0C byte after the pixel data announces a 256-entry
                // palette; without it the image is already-resolved
                // grayscale and the bytes written above stand.
                let stream = self.rle.stream_mut();
                if stream.try_read_u8()? == Some(PALETTE_MARKER) {
                    let palette = Palette256::read_from(stream)?;
                    // The rows are already in their final (possibly flipped)
                    // positions, so this pass walks the buffers in raw
                    // storage order.
                    let stride = self.width * 3;
                    for y in 0..self.height {
                        let row = y * stride;
                        let idx_row = y * self.width;
                        for px in 0..self.width {
                            let base = row + px * 3;
                            let index = self.pixels[base];
                            self.indices[idx_row + px] = index;
                            let color = palette.color(index);
                            self.pixels[base..base + 3].copy_from_slice(&color);
                        }
                    }
                }
                Ok(())
            }
            3 | 4 => {
                // True-color planar: each plane writes one channel directly,
                // no palette step. The plane-zero byte doubles as the
                // recorded index.
                for y in 0..self.height {
                    let row = self.pixel_row_start(y);
                    let idx_row = self.index_row_start(y);
                    for plane in 0..self.components {
                        for x in 0..bytes_per_line {
                            let value = self.rle.next_byte()?;
                            if x < self.width {
                                self.pixels[row + x * self.components + plane] = value;
                                if plane == 0 {
                                    self.indices[idx_row + x] = value;
                                }
                            }
                        }
                    }
                }
                Ok(())
            }
            other => Err(PcxError::UnsupportedPlaneConfiguration {
                bits_per_pixel: 8,
                bit_planes: other,
            }),
        }
    }
}
