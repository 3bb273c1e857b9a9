// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Pixel format catalog for pooled GPU textures.
//!
//! Container files name their texel encoding in one of three ways: a legacy DDS FourCC tag,
//! a DXGI numeric format code, or a console format byte. This module resolves the first two
//! into a [`PixelFormat`] and answers the layout questions every copy needs:
//!
//! - whether the format is block compressed
//! - the block footprint, in texels (4×4 for the BC family, 1×1 otherwise)
//! - the texel size, in bytes (for compressed formats this is the size of one block)
//!
//! The FourCC and DXGI paths agree on overlapping formats up to the sRGB/linear distinction.
//! DDS files do not always record that distinction, so the resolver picks one explicitly
//! (legacy `DXT*` tags decode as sRGB).
//!
//! # Examples
//!
//! ```
//! use bindless_textures::pixel_formats::{PixelFormat, container_codes::{DxgiFormat, FourCC}};
//!
//! let from_tag = PixelFormat::from_four_cc(FourCC(*b"DXT1")).unwrap();
//! let from_code = PixelFormat::from_dxgi(DxgiFormat::BC1_UNORM).unwrap();
//! assert_eq!(from_tag.to_linear(), from_code);
//! assert_eq!(from_code.texel_size(), 8);
//! assert_eq!(from_code.block_footprint(), (4, 4));
//! ```
//!
//! Constant-color fills write literal pixels, which use the C-layout pixel types [`Unorm4`]
//! and [`Float4`].

pub mod container_codes;

use crate::error::Error;
use crate::pixel_formats::container_codes::{DxgiFormat, FourCC};
use crate::pixel_formats::sealed::ReprC;

pub(crate) mod sealed {
    /// Marker trait indicating C-compatible memory layout.
    ///
    /// Types implementing this trait have predictable memory layout with:
    /// - No padding between fields
    /// - No uninitialized bytes
    /// - Stable field ordering
    ///
    /// # Safety
    ///
    /// This trait is unsafe to implement because incorrect implementation
    /// could lead to undefined behavior when casting to/from byte slices.
    pub unsafe trait ReprC {}
}

/// Convert a slice of C-compatible pixels to raw bytes.
///
/// # Safety
///
/// This function is safe because it requires `T: ReprC`, which guarantees
/// C-compatible memory layout with no padding or uninitialized bytes.
pub(crate) fn pixel_as_bytes<T: ReprC>(t: &[T]) -> &[u8] {
    //safe because we know that T is repr(C)
    //(we offloaded the safety check to the ReprC trait)
    unsafe { std::slice::from_raw_parts(t.as_ptr() as *const u8, std::mem::size_of_val(t)) }
}

/// A GPU texel encoding.
///
/// The set is closed: every format reachable from a FourCC tag, a DXGI code, or a
/// constant-color fill is listed here, and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::upper_case_acronyms)]
pub enum PixelFormat {
    R8UNorm,
    R8SNorm,
    R8UInt,
    R8SInt,
    R16UNorm,
    R16SNorm,
    RG8UNorm,
    RG8SNorm,
    RG8UInt,
    RG8SInt,
    B5G5R5A1UNorm,
    RGBA8UNorm,
    RGBA8UNormSRGB,
    RGBA8SNorm,
    RGBA8UInt,
    RGBA8SInt,
    BGRA8UNorm,
    BGRA8UNormSRGB,
    RGBA16Float,
    RGBA32Float,
    BC1RGBAUNorm,
    BC1RGBAUNormSRGB,
    BC2UNorm,
    BC2UNormSRGB,
    BC3UNorm,
    BC3UNormSRGB,
    BC4UNorm,
    BC4SNorm,
    BC5UNorm,
    BC5SNorm,
    BC6HUFloat,
    BC6HSFloat,
    BC7UNorm,
    BC7UNormSRGB,
}

impl PixelFormat {
    /// Resolves a legacy DDS FourCC tag.
    pub fn from_four_cc(tag: FourCC) -> Result<Self, Error> {
        match &tag.0 {
            b"DXT1" => Ok(PixelFormat::BC1RGBAUNormSRGB),
            b"DXT3" => Ok(PixelFormat::BC2UNormSRGB),
            b"DXT5" => Ok(PixelFormat::BC3UNormSRGB),
            b"ATI1" => Ok(PixelFormat::BC4UNorm),
            b"ATI2" => Ok(PixelFormat::BC5UNorm),
            // D3DFMT_A16B16G16R16F stored in the FourCC field
            [113, 0, 0, 0] => Ok(PixelFormat::RGBA16Float),
            _ => Err(Error::UnsupportedFourCC(tag)),
        }
    }

    /// Resolves a DXGI numeric format code.
    pub fn from_dxgi(code: DxgiFormat) -> Result<Self, Error> {
        use PixelFormat::*;
        Ok(match code {
            DxgiFormat::R8G8B8A8_TYPELESS | DxgiFormat::R8G8B8A8_UNORM => RGBA8UNorm,
            DxgiFormat::R8G8B8A8_UNORM_SRGB => RGBA8UNormSRGB,
            DxgiFormat::BC1_TYPELESS | DxgiFormat::BC1_UNORM => BC1RGBAUNorm,
            DxgiFormat::BC1_UNORM_SRGB => BC1RGBAUNormSRGB,
            DxgiFormat::BC2_TYPELESS | DxgiFormat::BC2_UNORM => BC2UNorm,
            DxgiFormat::BC2_UNORM_SRGB => BC2UNormSRGB,
            DxgiFormat::BC3_TYPELESS | DxgiFormat::BC3_UNORM => BC3UNorm,
            DxgiFormat::BC3_UNORM_SRGB => BC3UNormSRGB,
            DxgiFormat::BC4_TYPELESS | DxgiFormat::BC4_UNORM => BC4UNorm,
            DxgiFormat::BC4_SNORM => BC4SNorm,
            DxgiFormat::BC5_TYPELESS | DxgiFormat::BC5_UNORM => BC5UNorm,
            DxgiFormat::BC5_SNORM => BC5SNorm,
            DxgiFormat::B5G5R5A1_UNORM => B5G5R5A1UNorm,
            DxgiFormat::B8G8R8A8_UNORM
            | DxgiFormat::B8G8R8X8_UNORM
            | DxgiFormat::B8G8R8A8_TYPELESS
            | DxgiFormat::B8G8R8X8_TYPELESS => BGRA8UNorm,
            DxgiFormat::B8G8R8A8_UNORM_SRGB | DxgiFormat::B8G8R8X8_UNORM_SRGB => BGRA8UNormSRGB,
            DxgiFormat::BC6H_TYPELESS | DxgiFormat::BC6H_UF16 => BC6HUFloat,
            DxgiFormat::BC6H_SF16 => BC6HSFloat,
            DxgiFormat::BC7_TYPELESS | DxgiFormat::BC7_UNORM => BC7UNorm,
            DxgiFormat::BC7_UNORM_SRGB => BC7UNormSRGB,
            other => return Err(Error::UnsupportedDxgiFormat(other)),
        })
    }

    pub const fn is_compressed(self) -> bool {
        use PixelFormat::*;
        matches!(
            self,
            BC1RGBAUNorm
                | BC1RGBAUNormSRGB
                | BC2UNorm
                | BC2UNormSRGB
                | BC3UNorm
                | BC3UNormSRGB
                | BC4UNorm
                | BC4SNorm
                | BC5UNorm
                | BC5SNorm
                | BC6HUFloat
                | BC6HSFloat
                | BC7UNorm
                | BC7UNormSRGB
        )
    }

    /// Width and height, in texels, of one encoded unit.
    pub const fn block_footprint(self) -> (u32, u32) {
        if self.is_compressed() { (4, 4) } else { (1, 1) }
    }

    /// Bytes per texel, or bytes per block for compressed formats.
    pub const fn texel_size(self) -> u32 {
        use PixelFormat::*;
        match self {
            R8UNorm | R8SNorm | R8UInt | R8SInt => 1,
            R16UNorm | R16SNorm | RG8UNorm | RG8SNorm | RG8UInt | RG8SInt | B5G5R5A1UNorm => 2,
            RGBA8UNorm | RGBA8UNormSRGB | RGBA8SNorm | RGBA8UInt | RGBA8SInt | BGRA8UNorm
            | BGRA8UNormSRGB => 4,
            RGBA16Float => 8,
            RGBA32Float => 16,
            BC1RGBAUNorm | BC1RGBAUNormSRGB | BC4UNorm | BC4SNorm => 8,
            BC2UNorm | BC2UNormSRGB | BC3UNorm | BC3UNormSRGB | BC5UNorm | BC5SNorm
            | BC6HUFloat | BC6HSFloat | BC7UNorm | BC7UNormSRGB => 16,
        }
    }

    pub const fn is_srgb(self) -> bool {
        use PixelFormat::*;
        matches!(
            self,
            RGBA8UNormSRGB
                | BGRA8UNormSRGB
                | BC1RGBAUNormSRGB
                | BC2UNormSRGB
                | BC3UNormSRGB
                | BC7UNormSRGB
        )
    }

    /// The same encoding with the sRGB transfer function removed.
    pub const fn to_linear(self) -> Self {
        use PixelFormat::*;
        match self {
            RGBA8UNormSRGB => RGBA8UNorm,
            BGRA8UNormSRGB => BGRA8UNorm,
            BC1RGBAUNormSRGB => BC1RGBAUNorm,
            BC2UNormSRGB => BC2UNorm,
            BC3UNormSRGB => BC3UNorm,
            BC7UNormSRGB => BC7UNorm,
            other => other,
        }
    }
}

/// C-compatible RGBA pixel with 8-bit normalized unsigned values.
///
/// This is the pixel written by [`crate::bindings::TextureHandle::fill_with_color`].
/// Values range from 0-255 and are interpreted as 0.0-1.0 when sampled.
///
/// # Examples
///
/// ```
/// use bindless_textures::pixel_formats::{Unorm4, Float4};
///
/// // Create from individual channels
/// let opaque_red = Unorm4 { r: 255, g: 0, b: 0, a: 255 };
///
/// // Convert from normalized floats
/// let float_color = Float4 { r: 1.0, g: 0.5, b: 0.0, a: 1.0 };
/// let unorm_color = Unorm4::from_floats(float_color);
/// assert_eq!(unorm_color.g, 128);
/// ```
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Unorm4 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}
unsafe impl ReprC for Unorm4 {}
impl Unorm4 {
    /// Convert from normalized float values (0.0-1.0) to 8-bit values (0-255).
    ///
    /// Values are clamped to the valid range and rounded to nearest integer.
    pub fn from_floats(float4: Float4) -> Self {
        Unorm4 {
            r: (float4.r * 255.0).round().clamp(0.0, 255.0) as u8,
            g: (float4.g * 255.0).round().clamp(0.0, 255.0) as u8,
            b: (float4.b * 255.0).round().clamp(0.0, 255.0) as u8,
            a: (float4.a * 255.0).round().clamp(0.0, 255.0) as u8,
        }
    }
}

/// C-compatible RGBA pixel with 32-bit float channels.
///
/// This is the pixel written by [`crate::bindings::TextureHandle::fill_with_color_cube`].
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Float4 {
    /// Red channel
    pub r: f32,
    /// Green channel
    pub g: f32,
    /// Blue channel
    pub b: f32,
    /// Alpha channel
    pub a: f32,
}
unsafe impl ReprC for Float4 {}

impl Default for Float4 {
    fn default() -> Self {
        Float4 {
            r: 0.0,
            g: 0.0,
            b: 0.0,
            a: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn four_cc_and_dxgi_agree_on_block_formats() {
        let pairs = [
            (*b"DXT1", DxgiFormat::BC1_UNORM),
            (*b"DXT3", DxgiFormat::BC2_UNORM),
            (*b"DXT5", DxgiFormat::BC3_UNORM),
            (*b"ATI1", DxgiFormat::BC4_UNORM),
            (*b"ATI2", DxgiFormat::BC5_UNORM),
        ];
        for (tag, code) in pairs {
            let a = PixelFormat::from_four_cc(FourCC(tag)).unwrap();
            let b = PixelFormat::from_dxgi(code).unwrap();
            assert_eq!(a.to_linear(), b.to_linear());
            assert_eq!(a.texel_size(), b.texel_size());
            assert_eq!(a.block_footprint(), b.block_footprint());
        }
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn legacy_tags_decode_as_srgb() {
        let f = PixelFormat::from_four_cc(FourCC(*b"DXT5")).unwrap();
        assert!(f.is_srgb());
        assert_eq!(f, PixelFormat::BC3UNormSRGB);
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn unknown_codes_fail_loudly() {
        match PixelFormat::from_four_cc(FourCC(*b"ABCD")) {
            Err(Error::UnsupportedFourCC(tag)) => assert_eq!(tag, FourCC(*b"ABCD")),
            other => panic!("unexpected {other:?}"),
        }
        match PixelFormat::from_dxgi(DxgiFormat(2)) {
            Err(Error::UnsupportedDxgiFormat(code)) => assert_eq!(code.0, 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn typeless_bgrx_maps_to_bgra() {
        assert_eq!(
            PixelFormat::from_dxgi(DxgiFormat::B8G8R8X8_TYPELESS).unwrap(),
            PixelFormat::BGRA8UNorm
        );
        assert_eq!(
            PixelFormat::from_dxgi(DxgiFormat::B8G8R8X8_UNORM_SRGB).unwrap(),
            PixelFormat::BGRA8UNormSRGB
        );
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn sizes() {
        assert_eq!(PixelFormat::RGBA16Float.texel_size(), 8);
        assert_eq!(PixelFormat::RGBA32Float.texel_size(), 16);
        assert_eq!(PixelFormat::B5G5R5A1UNorm.texel_size(), 2);
        assert_eq!(PixelFormat::BC7UNormSRGB.texel_size(), 16);
        assert_eq!(PixelFormat::BC4UNorm.texel_size(), 8);
        assert_eq!(PixelFormat::BC5UNorm.texel_size(), 16);
        assert_eq!(PixelFormat::BC5SNorm.texel_size(), 16);
        assert!(!PixelFormat::RGBA8UNorm.is_compressed());
        assert_eq!(PixelFormat::RGBA8UNorm.block_footprint(), (1, 1));
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn pixels_are_tightly_packed() {
        let px = [Unorm4 { r: 1, g: 2, b: 3, a: 4 }, Unorm4 { r: 5, g: 6, b: 7, a: 8 }];
        assert_eq!(pixel_as_bytes(&px), &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(pixel_as_bytes(&[Float4::default()]).len(), 16);
    }
}
