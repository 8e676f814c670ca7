//! BC1/BC2/BC3 block decompression.
//!
//! Every block covers 4x4 pixels. Blocks on the right and bottom edges of
//! images whose size isn't a multiple of four are clipped.

use byteorder::{ByteOrder, LittleEndian};

type Texels = [[u8; 4]; 16];

/// Decode every block of a surface into `rgba` (tightly packed, `w * h * 4`).
pub(super) fn decode_blocks(
    data: &[u8],
    width: usize,
    height: usize,
    block_size: usize,
    rgba: &mut [u8],
    decode: fn(&[u8]) -> Texels,
) {
    let blocks_wide = width.div_ceil(4);
    for (i, block) in data.chunks_exact(block_size).enumerate() {
        let (bx, by) = (i % blocks_wide, i / blocks_wide);
        let texels = decode(block);
        for (t, texel) in texels.iter().enumerate() {
            let (x, y) = (bx * 4 + t % 4, by * 4 + t / 4);
            if x < width && y < height {
                let at = (y * width + x) * 4;
                rgba[at..at + 4].copy_from_slice(texel);
            }
        }
    }
}

fn rgb565(c: u16) -> [u8; 3] {
    let r = ((c >> 11) & 0x1F) as u8;
    let g = ((c >> 5) & 0x3F) as u8;
    let b = (c & 0x1F) as u8;
    [(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2)]
}

fn mix(a: [u8; 3], b: [u8; 3], wa: u16, wb: u16) -> [u8; 4] {
    let total = wa + wb;
    let c = |i: usize| ((u16::from(a[i]) * wa + u16::from(b[i]) * wb) / total) as u8;
    [c(0), c(1), c(2), 255]
}

/// Colour half of a block. BC1 may switch to three colours plus transparency.
fn colors(block: &[u8], allow_transparent: bool) -> Texels {
    let c0 = LittleEndian::read_u16(&block[0..2]);
    let c1 = LittleEndian::read_u16(&block[2..4]);
    let (a, b) = (rgb565(c0), rgb565(c1));
    let palette = if c0 > c1 || !allow_transparent {
        [[a[0], a[1], a[2], 255], [b[0], b[1], b[2], 255], mix(a, b, 2, 1), mix(a, b, 1, 2)]
    } else {
        [[a[0], a[1], a[2], 255], [b[0], b[1], b[2], 255], mix(a, b, 1, 1), [0, 0, 0, 0]]
    };
    let indices = LittleEndian::read_u32(&block[4..8]);
    std::array::from_fn(|t| palette[((indices >> (2 * t)) & 0b11) as usize])
}

pub(super) fn bc1(block: &[u8]) -> Texels {
    colors(block, true)
}

pub(super) fn bc2(block: &[u8]) -> Texels {
    let mut texels = colors(&block[8..16], false);
    let alpha = LittleEndian::read_u64(&block[0..8]);
    for (t, texel) in texels.iter_mut().enumerate() {
        texel[3] = ((alpha >> (4 * t)) & 0xF) as u8 * 17;
    }
    texels
}

pub(super) fn bc3(block: &[u8]) -> Texels {
    let mut texels = colors(&block[8..16], false);
    let (a0, a1) = (u16::from(block[0]), u16::from(block[1]));
    let mut alphas = [a0 as u8, a1 as u8, 0, 0, 0, 0, 0, 0];
    if a0 > a1 {
        for i in 2..8u16 {
            alphas[i as usize] = (((8 - i) * a0 + (i - 1) * a1) / 7) as u8;
        }
    } else {
        for i in 2..6u16 {
            alphas[i as usize] = (((6 - i) * a0 + (i - 1) * a1) / 5) as u8;
        }
        alphas[7] = 255;
    }
    let mut bits = [0u8; 8];
    bits[..6].copy_from_slice(&block[2..8]);
    let indices = u64::from_le_bytes(bits);
    for (t, texel) in texels.iter_mut().enumerate() {
        texel[3] = alphas[((indices >> (3 * t)) & 0b111) as usize];
    }
    texels
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: u16 = 0xF800;
    const BLUE: u16 = 0x001F;

    fn color_block(c0: u16, c1: u16, indices: u32) -> [u8; 8] {
        let mut block = [0u8; 8];
        block[0..2].copy_from_slice(&c0.to_le_bytes());
        block[2..4].copy_from_slice(&c1.to_le_bytes());
        block[4..8].copy_from_slice(&indices.to_le_bytes());
        block
    }

    #[test]
    fn expands_565() {
        assert_eq!(rgb565(RED), [255, 0, 0]);
        assert_eq!(rgb565(BLUE), [0, 0, 255]);
        assert_eq!(rgb565(0xFFFF), [255, 255, 255]);
    }

    #[test]
    fn bc1_opaque_palette() {
        // Indices 0,1,2,3 in the first row.
        let texels = bc1(&color_block(RED, BLUE, 0b11_10_01_00));
        assert_eq!(texels[0], [255, 0, 0, 255]);
        assert_eq!(texels[1], [0, 0, 255, 255]);
        assert_eq!(texels[2], [170, 0, 85, 255]);
        assert_eq!(texels[3], [85, 0, 170, 255]);
    }

    #[test]
    fn bc1_transparent_palette() {
        let texels = bc1(&color_block(BLUE, RED, 0b11_10_00));
        assert_eq!(texels[1], [127, 0, 127, 255]);
        assert_eq!(texels[2], [0, 0, 0, 0]);
    }

    #[test]
    fn bc2_explicit_alpha() {
        let mut block = [0u8; 16];
        block[0] = 0xF0; // texel 0 alpha 0, texel 1 alpha 15
        block[8..16].copy_from_slice(&color_block(RED, BLUE, 0));
        let texels = bc2(&block);
        assert_eq!(texels[0][3], 0);
        assert_eq!(texels[1][3], 255);
        assert_eq!(texels[1][..3], [255, 0, 0]);
    }

    #[test]
    fn bc3_interpolated_alpha() {
        let mut block = [0u8; 16];
        block[0] = 255;
        block[1] = 0;
        // texel 0 -> index 0 (255), texel 1 -> index 1 (0), texel 2 -> index 2.
        block[2] = 0b10_001_000;
        block[8..16].copy_from_slice(&color_block(RED, BLUE, 0));
        let texels = bc3(&block);
        assert_eq!(texels[0][3], 255);
        assert_eq!(texels[1][3], 0);
        assert_eq!(texels[2][3], 218);
    }

    #[test]
    fn clips_partial_blocks() {
        // A 2x2 image still consumes one full block.
        let mut rgba = vec![0u8; 2 * 2 * 4];
        decode_blocks(&color_block(RED, BLUE, 0), 2, 2, 8, &mut rgba, bc1);
        assert!(rgba.chunks_exact(4).all(|px| px == [255, 0, 0, 255]));
    }
}
