// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Console tiled-layout transcoding.

Console containers store each mip as a grid of square macro-tiles. Tiles are laid out
row-major, and inside a tile the data follows a quad-tree (Z-order) walk that visits the
top-left, top-right, bottom-left and bottom-right quadrants in that order, recursing down to a
leaf. [`SwizzleLayout::deswizzle`] reads that stream sequentially and writes each leaf to its
row-major position; [`SwizzleLayout::swizzle`] is the exact inverse.

Two families exist:

| family          | unit                | tile edge | leaf                          |
|-----------------|---------------------|-----------|-------------------------------|
| block           | 8 or 16 byte block  | 8 blocks  | one block                     |
| texel quad      | 4 or 8 byte texel   | 16 or 8   | 2×2 texels, stored as 2 rows  |

Output writes that land past the end of the destination are dropped. Mips smaller than a tile
are stored padded to a full tile, and their staging regions are only as large as the mip.
*/

use crate::error::Error;
use crate::pixel_formats::container_codes::ConsoleFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Leaf {
    /// One unit.
    Single,
    /// 2×2 units, stored as the top pair followed by the bottom pair.
    Quad,
}

impl Leaf {
    const fn edge(self) -> u32 {
        match self {
            Leaf::Single => 1,
            Leaf::Quad => 2,
        }
    }
}

/// How a console format tiles its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwizzleLayout {
    unit_bytes: u32,
    unit_texels: u32,
    tile_units: u32,
    leaf: Leaf,
}

impl SwizzleLayout {
    /// Block-compressed family: 4×4-texel blocks of `block_bytes`, 8×8-block tiles.
    pub const fn blocks(block_bytes: u32) -> Self {
        SwizzleLayout {
            unit_bytes: block_bytes,
            unit_texels: 4,
            tile_units: 8,
            leaf: Leaf::Single,
        }
    }

    /// Uncompressed family: `texel_bytes` texels in `tile_texels`-wide tiles with 2×2 leaves.
    pub const fn texel_quads(texel_bytes: u32, tile_texels: u32) -> Self {
        SwizzleLayout {
            unit_bytes: texel_bytes,
            unit_texels: 1,
            tile_units: tile_texels,
            leaf: Leaf::Quad,
        }
    }

    /// Bytes per block, or per texel for the uncompressed family.
    pub const fn unit_bytes(&self) -> u32 {
        self.unit_bytes
    }

    /// Edge of one unit in texels: 4 for blocks, 1 for texels.
    pub const fn unit_texels(&self) -> u32 {
        self.unit_texels
    }

    /// Edge of one macro-tile in texels.
    pub const fn tile_texels(&self) -> u32 {
        self.tile_units * self.unit_texels
    }

    /// Rounds texel dimensions up to whole tiles.
    pub const fn padded_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        let t = self.tile_texels();
        (width.next_multiple_of(t), height.next_multiple_of(t))
    }

    /// Width in units of a `width`-texel row, e.g. a row pitch in blocks.
    pub const fn units_across(&self, width: u32) -> u32 {
        width.div_ceil(self.unit_texels)
    }

    /// Bytes of swizzled payload covering a `width`×`height` texel surface.
    pub const fn region_size(&self, width: u32, height: u32) -> usize {
        let (pw, ph) = self.padded_dimensions(width, height);
        self.units_across(pw) as usize * self.units_across(ph) as usize * self.unit_bytes as usize
    }

    /// Visits every leaf row in storage order as `(output offset, byte length)`.
    fn for_each_run(&self, width: u32, height: u32, row_pitch_units: u32, mut f: impl FnMut(usize, usize)) {
        let tile = self.tile_units;
        let tiles_x = self.units_across(width).div_ceil(tile);
        let tiles_y = self.units_across(height).div_ceil(tile);
        let edge = self.leaf.edge();
        let leaves_across = tile / edge;
        let leaves = leaves_across * leaves_across;
        let unit = self.unit_bytes as usize;
        let pitch = row_pitch_units as usize;
        let run = edge as usize * unit;
        for ty in 0..tiles_y {
            for tx in 0..tiles_x {
                for z in 0..leaves {
                    let (lx, ly) = morton_decode(z);
                    let x = (tx * tile + lx * edge) as usize;
                    let y = (ty * tile + ly * edge) as usize;
                    for row in 0..edge as usize {
                        f(((y + row) * pitch + x) * unit, run);
                    }
                }
            }
        }
    }

    /// Un-tiles `input` into row-major unit order in `output`.
    ///
    /// `row_pitch_units` is the destination row length in units (blocks, or texels for the
    /// uncompressed family). Returns the number of input bytes consumed.
    pub fn deswizzle(
        &self,
        width: u32,
        height: u32,
        row_pitch_units: u32,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<usize, Error> {
        let needed = self.region_size(width, height);
        if input.len() < needed {
            return Err(Error::TruncatedPayload {
                needed,
                available: input.len(),
            });
        }
        let mut cursor = 0;
        self.for_each_run(width, height, row_pitch_units, |offset, len| {
            let end = (offset + len).min(output.len());
            if offset < end {
                output[offset..end].copy_from_slice(&input[cursor..cursor + (end - offset)]);
            }
            cursor += len;
        });
        Ok(cursor)
    }

    /// Tiles row-major `linear` data into `output`, the inverse of [`Self::deswizzle`].
    ///
    /// Source positions past the end of `linear` read as zero. Returns the number of bytes
    /// written.
    pub fn swizzle(
        &self,
        width: u32,
        height: u32,
        row_pitch_units: u32,
        linear: &[u8],
        output: &mut [u8],
    ) -> Result<usize, Error> {
        let needed = self.region_size(width, height);
        if output.len() < needed {
            return Err(Error::TruncatedPayload {
                needed,
                available: output.len(),
            });
        }
        let mut cursor = 0;
        self.for_each_run(width, height, row_pitch_units, |offset, len| {
            let dst = &mut output[cursor..cursor + len];
            let end = (offset + len).min(linear.len());
            let copied = end.saturating_sub(offset);
            if copied > 0 {
                dst[..copied].copy_from_slice(&linear[offset..end]);
            }
            dst[copied..].fill(0);
            cursor += len;
        });
        Ok(cursor)
    }
}

/// Splits a Z-order index into its (x, y) coordinates.
///
/// Even bits hold x and odd bits hold y, so consecutive groups of four indices walk the
/// quadrants top-left, top-right, bottom-left, bottom-right at every level.
fn morton_decode(z: u32) -> (u32, u32) {
    fn compact(mut v: u32) -> u32 {
        v &= 0x5555_5555;
        v = (v | (v >> 1)) & 0x3333_3333;
        v = (v | (v >> 2)) & 0x0f0f_0f0f;
        v = (v | (v >> 4)) & 0x00ff_00ff;
        v = (v | (v >> 8)) & 0x0000_ffff;
        v
    }
    (compact(z), compact(z >> 1))
}

/// Deswizzles one console mip.
///
/// `width` and `height` are in texels; `row_pitch_units` is the destination row length in
/// blocks (texels for the uncompressed codes). The block byte size is taken from `format`.
pub fn deswizzle(
    width: u32,
    height: u32,
    format: ConsoleFormat,
    row_pitch_units: u32,
    input: &[u8],
    output: &mut [u8],
) -> Result<usize, Error> {
    format
        .swizzle_layout()?
        .deswizzle(width, height, row_pitch_units, input, output)
}
