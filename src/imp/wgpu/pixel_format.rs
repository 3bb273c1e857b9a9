// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use crate::pixel_formats::PixelFormat;
use wgpu::TextureFormat;

impl PixelFormat {
    /// The matching wgpu format, if wgpu has one.
    pub const fn wgpu_format(self) -> Option<TextureFormat> {
        use PixelFormat::*;
        Some(match self {
            R8UNorm => TextureFormat::R8Unorm,
            R8SNorm => TextureFormat::R8Snorm,
            R8UInt => TextureFormat::R8Uint,
            R8SInt => TextureFormat::R8Sint,
            R16UNorm => TextureFormat::R16Unorm,
            R16SNorm => TextureFormat::R16Snorm,
            RG8UNorm => TextureFormat::Rg8Unorm,
            RG8SNorm => TextureFormat::Rg8Snorm,
            RG8UInt => TextureFormat::Rg8Uint,
            RG8SInt => TextureFormat::Rg8Sint,
            //no 16-bit packed BGRA formats in WebGPU
            B5G5R5A1UNorm => return None,
            RGBA8UNorm => TextureFormat::Rgba8Unorm,
            RGBA8UNormSRGB => TextureFormat::Rgba8UnormSrgb,
            RGBA8SNorm => TextureFormat::Rgba8Snorm,
            RGBA8UInt => TextureFormat::Rgba8Uint,
            RGBA8SInt => TextureFormat::Rgba8Sint,
            BGRA8UNorm => TextureFormat::Bgra8Unorm,
            BGRA8UNormSRGB => TextureFormat::Bgra8UnormSrgb,
            RGBA16Float => TextureFormat::Rgba16Float,
            RGBA32Float => TextureFormat::Rgba32Float,
            BC1RGBAUNorm => TextureFormat::Bc1RgbaUnorm,
            BC1RGBAUNormSRGB => TextureFormat::Bc1RgbaUnormSrgb,
            BC2UNorm => TextureFormat::Bc2RgbaUnorm,
            BC2UNormSRGB => TextureFormat::Bc2RgbaUnormSrgb,
            BC3UNorm => TextureFormat::Bc3RgbaUnorm,
            BC3UNormSRGB => TextureFormat::Bc3RgbaUnormSrgb,
            BC4UNorm => TextureFormat::Bc4RUnorm,
            BC4SNorm => TextureFormat::Bc4RSnorm,
            BC5UNorm => TextureFormat::Bc5RgUnorm,
            BC5SNorm => TextureFormat::Bc5RgSnorm,
            BC6HUFloat => TextureFormat::Bc6hRgbUfloat,
            BC6HSFloat => TextureFormat::Bc6hRgbFloat,
            BC7UNorm => TextureFormat::Bc7RgbaUnorm,
            BC7UNormSRGB => TextureFormat::Bc7RgbaUnormSrgb,
        })
    }
}
