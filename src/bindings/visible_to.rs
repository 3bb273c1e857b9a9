// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Resource visibility and usage declarations for pooled textures.
//!
//! When creating GPU resources, it's important to declare how they will be used so the graphics
//! driver can make optimal decisions about memory allocation and access patterns. This module
//! provides:
//!
//! - [`TextureUsage`] - how a texture is accessed (staging, sampled, render target, ...)
//! - [`ShaderStages`] - which shader stages see the bindless texture array
//! - [`ViewDimension`] - how shaders view each entry of the array
//!
//! # Examples
//!
//! ```
//! use bindless_textures::bindings::visible_to::{ShaderStages, TextureUsage};
//!
//! // A cubemap that will be sampled in fragment shaders
//! let usage = TextureUsage::SAMPLED | TextureUsage::CUBEMAP;
//! assert!(usage.is_cubemap());
//!
//! let stages = ShaderStages::FRAGMENT;
//! # let _ = stages;
//! ```

bitflags::bitflags! {
    /// Describes how a texture resource will be used.
    ///
    /// A pooled texture is normally either `STAGING` (CPU-writable, transient) or
    /// `SAMPLED` (resident and visible to shaders). `CUBEMAP` changes how
    /// [`crate::bindings::TextureDescription::array_layers`] is counted.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureUsage: u32 {
        /// CPU-writable upload source. Never bound to shaders.
        const STAGING = 1 << 0;
        /// Sampled by shaders through the descriptor table.
        const SAMPLED = 1 << 1;
        /// Six faces per array layer.
        const CUBEMAP = 1 << 2;
        /// Color attachment of a render pass.
        const RENDER_TARGET = 1 << 3;
        /// Depth/stencil attachment of a render pass.
        const DEPTH_STENCIL = 1 << 4;
        /// Read/write storage access from shaders.
        const STORAGE = 1 << 5;
    }
}

impl TextureUsage {
    pub fn is_cubemap(&self) -> bool {
        self.contains(TextureUsage::CUBEMAP)
    }

    pub fn is_staging(&self) -> bool {
        self.contains(TextureUsage::STAGING)
    }
}

bitflags::bitflags! {
    /// Shader stages that can index the bindless texture array.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShaderStages: u32 {
        const VERTEX = 1 << 0;
        const FRAGMENT = 1 << 1;
        const COMPUTE = 1 << 2;
    }
}

/// How shaders view each entry of the bindless array.
///
/// Every entry of one table shares a view dimension, so a pool holds either 2D textures or
/// cubemaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewDimension {
    #[default]
    D2,
    Cube,
}
