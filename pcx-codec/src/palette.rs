//! Palette resolution: header palette, CGA reference palette, trailer palette.
//!
//! PCX resolves colors three ways depending on bit depth:
//! 1, 2 (planar) and 4 bpp images index the 16-entry palette embedded in the
//! header; 2bpp single-plane images index a fixed CGA reference palette
//! steered by mode bits hidden in the header palette area; 8 bpp images may
//! carry a 256-entry palette appended after the pixel data.

use crate::error::PcxError;
use pcx_stream::PcxInStream;
use std::io::Read;

/// The fixed 16-color CGA reference palette used by 2bpp single-plane images.
pub const CGA_PALETTE: [u8; 48] = [
    0x00, 0x00, 0x00, // #000000
    0x00, 0x00, 0xAA, // #0000AA
    0x00, 0xAA, 0x00, // #00AA00
    0x00, 0xAA, 0xAA, // #00AAAA
    0xAA, 0x00, 0x00, // #AA0000
    0xAA, 0x00, 0xAA, // #AA00AA
    0xAA, 0x55, 0x00, // #AA5500
    0xAA, 0xAA, 0xAA, // #AAAAAA
    0x55, 0x55, 0x55, // #555555
    0x55, 0x55, 0xFF, // #5555FF
    0x55, 0xFF, 0x55, // #55FF55
    0x55, 0xFF, 0xFF, // #55FFFF
    0xFF, 0x55, 0x55, // #FF5555
    0xFF, 0x55, 0xFF, // #FF55FF
    0xFF, 0xFF, 0x55, // #FFFF55
    0xFF, 0xFF, 0xFF, // #FFFFFF
];

/// A 16-entry RGB palette (3 bytes per entry).
#[derive(Debug, Clone, Copy)]
pub struct Palette16<'a> {
    entries: &'a [u8; 48],
}

impl<'a> Palette16<'a> {
    pub fn new(entries: &'a [u8; 48]) -> Self {
        Self { entries }
    }

    /// Color for `index`.
    ///
    /// The format can only name 16 entries; an index past the last entry
    /// (possible when malformed planar data over-accumulates) clamps to
    /// entry 15 instead of reading out of range.
    pub fn color(&self, index: u8) -> [u8; 3] {
        let i = usize::min(index as usize, 15) * 3;
        [self.entries[i], self.entries[i + 1], self.entries[i + 2]]
    }
}

/// CGA mode-selection bits recovered from the header palette area.
///
/// For 2bpp single-plane images the header palette is repurposed: the high
/// nibble of byte 0 names the background color, and bits 5 and 6 of byte 3
/// carry the intensity and palette-variant flags for foreground colors.
#[derive(Debug, Clone, Copy)]
pub struct CgaMode {
    background: u8,
    intensity: u8,
    palette_bit: u8,
}

impl CgaMode {
    pub fn from_header_palette(palette16: &[u8; 48]) -> Self {
        Self {
            background: palette16[0] >> 4,
            intensity: (palette16[3] & 0x20) >> 5,
            palette_bit: (palette16[3] & 0x40) >> 6,
        }
    }

    /// Map a raw 2-bit pixel value to an index into [`CGA_PALETTE`].
    ///
    /// Value 0 selects the background color; any other value selects a
    /// foreground color from the variant named by the palette and intensity
    /// bits.
    pub fn index_for(&self, value: u8) -> u8 {
        if value == 0 {
            self.background
        } else {
            ((value << 1) + self.palette_bit) + (self.intensity << 3)
        }
    }
}

/// The optional 256-entry RGB palette appended after 8bpp pixel data.
#[derive(Debug)]
pub struct Palette256 {
    entries: [u8; Self::LEN],
}

impl Palette256 {
    /// Byte length of the palette on the wire (256 entries, 3 bytes each).
    pub const LEN: usize = 768;

    /// Read the full palette; a truncated palette is a hard failure.
    pub fn read_from<R: Read>(stream: &mut PcxInStream<R>) -> Result<Self, PcxError> {
        let mut entries = [0u8; Self::LEN];
        stream.read_bytes(&mut entries)?;
        Ok(Self { entries })
    }

    pub fn color(&self, index: u8) -> [u8; 3] {
        let i = index as usize * 3;
        [self.entries[i], self.entries[i + 1], self.entries[i + 2]]
    }
}
