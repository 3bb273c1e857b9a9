// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Already-parsed texture container headers.

Parsing the files themselves happens upstream; a fill only needs the fields below and a
borrowed payload. With the `dds` feature, [`PcTexture::from_dds`] builds the PC header from a
[`ddsfile::Dds`].
*/

#[cfg(feature = "dds")]
mod dds_support;

use crate::error::Error;
use crate::pixel_formats::PixelFormat;
use crate::pixel_formats::container_codes::{ConsoleFormat, DxgiFormat, FourCC};

/// `DDPF_ALPHAPIXELS`
pub const DDPF_ALPHA_PIXELS: u32 = 0x1;
/// `DDPF_FOURCC`
pub const DDPF_FOURCC: u32 = 0x4;
/// `DDPF_RGB`
pub const DDPF_RGB: u32 = 0x40;
/// `DDSCAPS2_CUBEMAP`
pub const DDSCAPS2_CUBEMAP: u32 = 0x200;

/// The pixel format block of a DDS header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcPixelFormat {
    pub flags: u32,
    pub four_cc: FourCC,
    pub rgb_bit_count: u32,
}

/// How a PC header's texels are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcEncoding {
    Format(PixelFormat),
    /// Recognized, but there is no upload path for it.
    Unimplemented { rgb_bit_count: u32 },
}

/// A DDS-style texture: mips stored row-major, one face after another.
#[derive(Debug, Clone, Copy)]
pub struct PcTexture<'a> {
    pub width: u32,
    pub height: u32,
    pub mip_count: u32,
    pub pixel_format: PcPixelFormat,
    /// The DXGI code from the extended (DX10) header, when present.
    pub dxgi_format: Option<DxgiFormat>,
    pub caps2: u32,
    pub data: &'a [u8],
}

impl PcTexture<'_> {
    pub fn is_cubemap(&self) -> bool {
        self.caps2 & DDSCAPS2_CUBEMAP != 0
    }

    /// The header's mip count, treating 0 as a single level.
    pub fn mip_levels(&self) -> u32 {
        self.mip_count.max(1)
    }

    /// Resolves the texel encoding.
    ///
    /// The extended header's DXGI code wins; then the uncompressed RGB layouts; then FourCC.
    pub fn encoding(&self) -> Result<PcEncoding, Error> {
        if let Some(code) = self.dxgi_format {
            return PixelFormat::from_dxgi(code).map(PcEncoding::Format);
        }
        let pf = &self.pixel_format;
        if pf.flags == DDPF_RGB | DDPF_ALPHA_PIXELS && pf.rgb_bit_count == 32 {
            return Ok(PcEncoding::Format(PixelFormat::RGBA8UNormSRGB));
        }
        if pf.flags == DDPF_RGB && pf.rgb_bit_count == 24 {
            return Ok(PcEncoding::Unimplemented { rgb_bit_count: 24 });
        }
        PixelFormat::from_four_cc(pf.four_cc).map(PcEncoding::Format)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureType {
    #[default]
    Texture,
    Cubemap,
    Volume,
}

/// A console texture: mips stored in tiled, swizzled order.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleTexture<'a> {
    pub width: u32,
    pub height: u32,
    /// 0 means a full chain.
    pub mip_count: u32,
    pub format: ConsoleFormat,
    pub dxgi_format: DxgiFormat,
    pub texture_type: TextureType,
    pub data: &'a [u8],
}

impl ConsoleTexture<'_> {
    pub fn is_cubemap(&self) -> bool {
        self.texture_type == TextureType::Cubemap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(flags: u32, four_cc: [u8; 4], rgb_bit_count: u32) -> PcTexture<'static> {
        PcTexture {
            width: 4,
            height: 4,
            mip_count: 0,
            pixel_format: PcPixelFormat {
                flags,
                four_cc: FourCC(four_cc),
                rgb_bit_count,
            },
            dxgi_format: None,
            caps2: 0,
            data: &[],
        }
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn encoding_precedence() {
        let mut t = header(DDPF_FOURCC, *b"DX10", 0);
        t.dxgi_format = Some(DxgiFormat::BC7_UNORM_SRGB);
        assert_eq!(t.encoding().unwrap(), PcEncoding::Format(PixelFormat::BC7UNormSRGB));

        let t = header(DDPF_RGB | DDPF_ALPHA_PIXELS, [0; 4], 32);
        assert_eq!(t.encoding().unwrap(), PcEncoding::Format(PixelFormat::RGBA8UNormSRGB));

        let t = header(DDPF_RGB, [0; 4], 24);
        assert_eq!(t.encoding().unwrap(), PcEncoding::Unimplemented { rgb_bit_count: 24 });

        let t = header(DDPF_FOURCC, *b"ATI2", 0);
        assert_eq!(t.encoding().unwrap(), PcEncoding::Format(PixelFormat::BC5UNorm));
        assert_eq!(t.mip_levels(), 1);
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn unknown_four_cc_is_an_error() {
        let t = header(DDPF_FOURCC, *b"ZZZZ", 0);
        assert!(matches!(t.encoding(), Err(Error::UnsupportedFourCC(FourCC(tag))) if &tag == b"ZZZZ"));
    }
}
