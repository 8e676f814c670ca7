//! DirectDraw Surface parsing.
//!
//! Only the first surface (largest mip) is decoded. Rows come out in the
//! order they are stored; callers flip them.

mod block;

use crate::consts::TEXTURE_SIGNATURE;
use crate::error::{ErrorKind, Result};
use byteorder::{ByteOrder, LittleEndian};
use std::fmt::{Display, Formatter, Result as FmtResult};
use tracing::instrument;

const HEADER_SIZE: usize = 124;
const HEADER_END: usize = 4 + HEADER_SIZE;
const DX10_HEADER_END: usize = HEADER_END + 20;
const DDPF_ALPHAPIXELS: u32 = 0x1;
const DDPF_FOURCC: u32 = 0x4;
const DDPF_RGB: u32 = 0x40;

/// Pixel formats we know how to turn into RGBA.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    Bc1,
    Bc2,
    Bc3,
    Rgba8,
    Bgra8,
    /// Uncompressed 32-bit pixels described by channel bit masks.
    Masked { r: u32, g: u32, b: u32, a: u32 },
}
impl TextureFormat {
    fn surface_size(&self, width: u32, height: u32) -> Option<usize> {
        let (w, h) = (width as usize, height as usize);
        match self {
            Self::Bc1 => w.div_ceil(4).checked_mul(h.div_ceil(4))?.checked_mul(8),
            Self::Bc2 | Self::Bc3 => w.div_ceil(4).checked_mul(h.div_ceil(4))?.checked_mul(16),
            Self::Rgba8 | Self::Bgra8 | Self::Masked { .. } => w.checked_mul(h)?.checked_mul(4),
        }
    }

    fn from_fourcc(fourcc: &[u8]) -> Option<Self> {
        match fourcc {
            b"DXT1" => Some(Self::Bc1),
            b"DXT2" | b"DXT3" => Some(Self::Bc2),
            b"DXT4" | b"DXT5" => Some(Self::Bc3),
            _ => None,
        }
    }

    fn from_dxgi(format: u32) -> Option<Self> {
        match format {
            70..=72 => Some(Self::Bc1),
            73..=75 => Some(Self::Bc2),
            76..=78 => Some(Self::Bc3),
            27..=29 => Some(Self::Rgba8),
            87 | 90 | 91 => Some(Self::Bgra8),
            _ => None,
        }
    }
}
impl Display for TextureFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Bc1 => f.write_str("BC1"),
            Self::Bc2 => f.write_str("BC2"),
            Self::Bc3 => f.write_str("BC3"),
            Self::Rgba8 => f.write_str("RGBA8"),
            Self::Bgra8 => f.write_str("BGRA8"),
            Self::Masked { .. } => f.write_str("RGB masked"),
        }
    }
}

/// Parsed DDS header; offsets are relative to the `DDS ` signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureHeader {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    data_offset: usize,
}

impl TextureHeader {
    /// Parse the header of a DDS stream starting at `texture[0]`.
    pub fn parse(texture: &[u8]) -> Result<Self> {
        if !texture.starts_with(&TEXTURE_SIGNATURE) {
            exn::bail!(ErrorKind::decode("missing texture signature"));
        }
        if texture.len() < HEADER_END {
            exn::bail!(ErrorKind::decode("truncated texture header"));
        }
        let field = |offset: usize| LittleEndian::read_u32(&texture[offset..offset + 4]);
        if field(4) as usize != HEADER_SIZE {
            exn::bail!(ErrorKind::decode(format!("malformed texture header (size {})", field(4))));
        }
        let height = field(12);
        let width = field(16);
        if width == 0 || height == 0 {
            exn::bail!(ErrorKind::decode("zero-sized image"));
        }
        let flags = field(80);
        let fourcc = &texture[84..88];
        let (format, data_offset) = if flags & DDPF_FOURCC != 0 {
            if fourcc == b"DX10" {
                if texture.len() < DX10_HEADER_END {
                    exn::bail!(ErrorKind::decode("truncated extended texture header"));
                }
                let dxgi = field(HEADER_END);
                let Some(format) = TextureFormat::from_dxgi(dxgi) else {
                    exn::bail!(ErrorKind::UnsupportedFormat(format!("DXGI {dxgi}")));
                };
                (format, DX10_HEADER_END)
            } else {
                let Some(format) = TextureFormat::from_fourcc(fourcc) else {
                    exn::bail!(ErrorKind::UnsupportedFormat(String::from_utf8_lossy(fourcc).into_owned()));
                };
                (format, HEADER_END)
            }
        } else if flags & DDPF_RGB != 0 && field(88) == 32 {
            let a = if flags & DDPF_ALPHAPIXELS != 0 { field(104) } else { 0 };
            (TextureFormat::Masked { r: field(92), g: field(96), b: field(100), a }, HEADER_END)
        } else {
            exn::bail!(ErrorKind::UnsupportedFormat(format!("pixel format flags {flags:#x}, {} bpp", field(88))));
        };
        Ok(Self { width, height, format, data_offset })
    }

    /// Decode the first surface into tightly packed RGBA rows, in storage order.
    #[instrument(level = "debug", skip(self, texture), fields(width = self.width, height = self.height, format = %self.format))]
    pub fn decode(&self, texture: &[u8]) -> Result<Vec<u8>> {
        let size = match self.format.surface_size(self.width, self.height) {
            Some(size) => size,
            None => exn::bail!(ErrorKind::decode("texture dimensions overflow")),
        };
        let Some(data) = texture.get(self.data_offset..self.data_offset.saturating_add(size)) else {
            exn::bail!(ErrorKind::decode(format!(
                "truncated texture data: need {size} bytes, have {}",
                texture.len().saturating_sub(self.data_offset)
            )));
        };
        let (w, h) = (self.width as usize, self.height as usize);
        let mut rgba = vec![0u8; w * h * 4];
        match self.format {
            TextureFormat::Bc1 => block::decode_blocks(data, w, h, 8, &mut rgba, block::bc1),
            TextureFormat::Bc2 => block::decode_blocks(data, w, h, 16, &mut rgba, block::bc2),
            TextureFormat::Bc3 => block::decode_blocks(data, w, h, 16, &mut rgba, block::bc3),
            TextureFormat::Rgba8 => rgba.copy_from_slice(data),
            TextureFormat::Bgra8 => {
                for (out, px) in rgba.chunks_exact_mut(4).zip(data.chunks_exact(4)) {
                    out.copy_from_slice(&[px[2], px[1], px[0], px[3]]);
                }
            },
            TextureFormat::Masked { r, g, b, a } => {
                for (out, px) in rgba.chunks_exact_mut(4).zip(data.chunks_exact(4)) {
                    let value = LittleEndian::read_u32(px);
                    let alpha = if a == 0 { 255 } else { channel(value, a) };
                    out.copy_from_slice(&[channel(value, r), channel(value, g), channel(value, b), alpha]);
                }
            },
        }
        Ok(rgba)
    }
}

/// Extract a masked channel and widen it to 8 bits.
fn channel(value: u32, mask: u32) -> u8 {
    if mask == 0 {
        return 0;
    }
    let bits = mask.count_ones();
    let raw = u64::from((value & mask) >> mask.trailing_zeros());
    let max = (1u64 << bits) - 1;
    (raw * 255 / max) as u8
}
