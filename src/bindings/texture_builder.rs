// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Texture descriptions, with a builder to reduce parameter count.

use crate::bindings::visible_to::TextureUsage;
use crate::mip_layout::{self, MipLevel};
use crate::pixel_formats::PixelFormat;

/// Everything a device needs to create a texture.
///
/// `array_layers` counts cubes when `usage` contains [`TextureUsage::CUBEMAP`], so a single
/// cubemap has `array_layers == 1` and six physical layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureDescription {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub mip_levels: u32,
    pub array_layers: u32,
    pub sample_count: u32,
    pub format: PixelFormat,
    pub usage: TextureUsage,
}

impl TextureDescription {
    /// Create a new texture builder with required parameters.
    pub fn builder(
        label: impl Into<String>,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> TextureBuilder {
        TextureBuilder {
            description: TextureDescription {
                label: label.into(),
                width,
                height,
                mip_levels: 1,
                array_layers: 1,
                sample_count: 1,
                format,
                usage: TextureUsage::SAMPLED,
            },
        }
    }

    /// Physical layers, counting each cube face.
    pub fn layer_count(&self) -> u32 {
        if self.usage.is_cubemap() {
            self.array_layers * 6
        } else {
            self.array_layers
        }
    }

    pub fn subresource_count(&self) -> u32 {
        self.layer_count() * self.mip_levels
    }

    /// Subresource index of (`layer`, `mip`): layers outer, mips inner.
    pub fn subresource(&self, layer: u32, mip: u32) -> u32 {
        layer * self.mip_levels + mip
    }

    /// Splits a subresource index back into (`layer`, `mip`).
    pub fn layer_and_mip(&self, subresource: u32) -> (u32, u32) {
        (subresource / self.mip_levels, subresource % self.mip_levels)
    }

    pub fn mip(&self, mip: u32) -> MipLevel {
        mip_layout::mip_level(self.format, self.width, self.height, mip)
    }

    /// Byte size of one subresource.
    pub fn subresource_size(&self, subresource: u32) -> usize {
        let (_, mip) = self.layer_and_mip(subresource);
        self.mip(mip).byte_size
    }
}

/// Builder for [`TextureDescription`].
///
/// Defaults: one mip, one layer, one sample, [`TextureUsage::SAMPLED`].
#[derive(Debug, Clone)]
pub struct TextureBuilder {
    description: TextureDescription,
}

impl TextureBuilder {
    pub fn with_mip_levels(mut self, mip_levels: u32) -> Self {
        self.description.mip_levels = mip_levels.max(1);
        self
    }

    pub fn with_array_layers(mut self, array_layers: u32) -> Self {
        self.description.array_layers = array_layers.max(1);
        self
    }

    pub fn with_sample_count(mut self, sample_count: u32) -> Self {
        self.description.sample_count = sample_count.max(1);
        self
    }

    /// Replaces the usage flags.
    pub fn with_usage(mut self, usage: TextureUsage) -> Self {
        self.description.usage = usage;
        self
    }

    pub fn build(self) -> TextureDescription {
        self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn cube_layers_count_faces() {
        let d = TextureDescription::builder("sky", 64, 64, PixelFormat::BC1RGBAUNorm)
            .with_mip_levels(7)
            .with_usage(TextureUsage::SAMPLED | TextureUsage::CUBEMAP)
            .build();
        assert_eq!(d.layer_count(), 6);
        assert_eq!(d.subresource_count(), 42);
        assert_eq!(d.subresource(2, 3), 17);
        assert_eq!(d.layer_and_mip(17), (2, 3));
        assert_eq!(d.subresource_size(0), 2048);
        assert_eq!(d.subresource_size(6), 8);
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn builder_defaults() {
        let d = TextureDescription::builder("t", 1, 1, PixelFormat::RGBA8UNorm).build();
        assert_eq!(d.mip_levels, 1);
        assert_eq!(d.array_layers, 1);
        assert_eq!(d.sample_count, 1);
        assert_eq!(d.usage, TextureUsage::SAMPLED);
        assert_eq!(d.subresource_size(0), 4);
    }
}
