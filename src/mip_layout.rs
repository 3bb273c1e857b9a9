// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Byte geometry of mip chains.

These sizes size staging subresources and advance the read cursor through packed container
payloads, so they must be exact. Container payloads are serialized face-major, mip-minor:
every mip of face 0, then every mip of face 1, and so on.
*/

use crate::pixel_formats::PixelFormat;

/// Geometry of one mip level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MipLevel {
    /// Texel width of the level, at least 1.
    pub width: u32,
    /// Texel height of the level, at least 1.
    pub height: u32,
    /// Width rounded up to the block footprint.
    pub rounded_width: u32,
    /// Height rounded up to the block footprint.
    pub rounded_height: u32,
    /// Encoded size of the level in bytes.
    pub byte_size: usize,
}

/// Geometry of mip `mip` of a `base_width`×`base_height` image.
pub fn mip_level(format: PixelFormat, base_width: u32, base_height: u32, mip: u32) -> MipLevel {
    let width = base_width.checked_shr(mip).unwrap_or(0).max(1);
    let height = base_height.checked_shr(mip).unwrap_or(0).max(1);
    let texel = format.texel_size() as usize;
    if format.is_compressed() {
        let (bw, bh) = format.block_footprint();
        let rounded_width = width.next_multiple_of(bw);
        let rounded_height = height.next_multiple_of(bh);
        let byte_size =
            rounded_width as usize * rounded_height as usize * texel / (bw * bh) as usize;
        MipLevel {
            width,
            height,
            rounded_width,
            rounded_height,
            byte_size,
        }
    } else {
        MipLevel {
            width,
            height,
            rounded_width: width,
            rounded_height: height,
            byte_size: width as usize * height as usize * texel,
        }
    }
}

/// Byte size of one mip level.
///
/// Cubemap faces use the same formula; each face of a level has this size.
pub fn mip_byte_size(format: PixelFormat, base_width: u32, base_height: u32, mip: u32) -> usize {
    mip_level(format, base_width, base_height, mip).byte_size
}

/// Byte offset of (`face`, `mip`) in a packed face-major, mip-minor payload.
pub fn packed_offset(
    format: PixelFormat,
    base_width: u32,
    base_height: u32,
    mip_count: u32,
    face: u32,
    mip: u32,
) -> usize {
    let per_face: usize = (0..mip_count)
        .map(|m| mip_byte_size(format, base_width, base_height, m))
        .sum();
    let within_face: usize = (0..mip)
        .map(|m| mip_byte_size(format, base_width, base_height, m))
        .sum();
    per_face * face as usize + within_face
}

/// Total payload size of `faces` faces with `mip_count` levels each.
pub fn packed_size(
    format: PixelFormat,
    base_width: u32,
    base_height: u32,
    mip_count: u32,
    faces: u32,
) -> usize {
    packed_offset(format, base_width, base_height, mip_count, faces, 0)
}

/// `1 + floor(log2(max(width, height)))`, the length of a full mip chain.
pub fn full_mip_count(width: u32, height: u32) -> u32 {
    let largest = width.max(height).max(1);
    32 - largest.leading_zeros()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn bc1_128_base_level() {
        assert_eq!(mip_byte_size(PixelFormat::BC1RGBAUNorm, 128, 128, 0), 8192);
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn small_compressed_levels_round_to_one_block() {
        for mip in 5..=7 {
            //4x4, 2x2, 1x1
            let level = mip_level(PixelFormat::BC3UNorm, 128, 128, mip);
            assert_eq!(level.rounded_width, 4);
            assert_eq!(level.rounded_height, 4);
            assert_eq!(level.byte_size, 16);
        }
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn uncompressed_levels_floor_at_one() {
        let level = mip_level(PixelFormat::RGBA8UNorm, 8, 2, 2);
        assert_eq!((level.width, level.height), (2, 1));
        assert_eq!(level.byte_size, 8);
        assert_eq!(mip_byte_size(PixelFormat::RGBA8UNorm, 8, 2, 40), 4);
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn full_chain_matches_known_sizes() {
        // 256x256 BC1 with 9 mips: 32768+8192+2048+512+128+32+8+8+8 = 43704
        assert_eq!(full_mip_count(256, 256), 9);
        assert_eq!(packed_size(PixelFormat::BC1RGBAUNorm, 256, 256, 9, 1), 43704);
        // cubes repeat the chain once per face
        assert_eq!(packed_size(PixelFormat::BC1RGBAUNorm, 256, 256, 9, 6), 43704 * 6);
        assert_eq!(
            packed_offset(PixelFormat::BC1RGBAUNorm, 256, 256, 9, 2, 1),
            43704 * 2 + 32768
        );
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn mip_counts() {
        assert_eq!(full_mip_count(1, 1), 1);
        assert_eq!(full_mip_count(128, 64), 8);
        assert_eq!(full_mip_count(100, 3), 7);
    }
}
