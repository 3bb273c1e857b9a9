// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Backend seam.

The pool never talks to a graphics API directly; it drives a [`GpuDevice`]. Two
implementations ship with the crate:

* [`nop::NopDevice`] keeps everything in CPU memory and records what happened. It is always
  available and is what the test suite runs against.
* `wgpu::WgpuDevice` (feature `backend_wgpu`) drives a real `wgpu::Device`.
*/

use crate::bindings::texture_builder::TextureDescription;
use crate::bindings::visible_to::{ShaderStages, ViewDimension};

pub mod nop;

#[cfg(feature = "backend_wgpu")]
pub mod wgpu;

/// Describes the bindless array a pool binds: `count` sampled textures, one binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceLayoutDescription<'a> {
    pub label: &'a str,
    pub count: u32,
    pub stages: ShaderStages,
    pub view_dimension: ViewDimension,
}

/// GPU operations a texture pool needs.
///
/// Subresources are indexed as `array_layer * mip_levels + mip_level`, counting each cube face
/// as a layer. See [`TextureDescription::subresource`].
pub trait GpuDevice: Send + Sync + 'static {
    type Texture: Send + Sync + 'static;
    type ResourceLayout: Send + Sync + 'static;
    /// An immutable snapshot of the bindless array.
    type ResourceSet: Send + Sync + 'static;
    /// Record-time context handed to deferred upload tasks.
    type CommandList;
    /// Whatever a draw binds its resources on.
    type RenderPass<'pass>;
    type Error: std::error::Error + Send + Sync + 'static;

    fn create_texture(&self, description: &TextureDescription) -> Result<Self::Texture, Self::Error>;

    fn create_resource_layout(
        &self,
        description: &ResourceLayoutDescription<'_>,
    ) -> Result<Self::ResourceLayout, Self::Error>;

    /// Builds a table whose entry `i` views `textures[i]`.
    fn create_resource_set(
        &self,
        layout: &Self::ResourceLayout,
        textures: &[&Self::Texture],
    ) -> Result<Self::ResourceSet, Self::Error>;

    /// Maps one subresource of a staging texture for writing and unmaps it when `write` returns.
    fn map_write<R>(
        &self,
        staging: &mut Self::Texture,
        subresource: u32,
        write: impl FnOnce(&mut [u8]) -> R,
    ) -> Result<R, Self::Error>;

    /// Records a copy of every subresource of `source` into `destination`.
    fn copy_texture(
        &self,
        command_list: &mut Self::CommandList,
        source: &Self::Texture,
        destination: &Self::Texture,
    ) -> Result<(), Self::Error>;

    fn destroy_texture(&self, texture: Self::Texture);

    fn bind_resource_set(&self, pass: &mut Self::RenderPass<'_>, slot: u32, set: &Self::ResourceSet);
}
