// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
wgpu implementation of [`GpuDevice`].

The bindless table is a bind group with a single counted texture entry, which needs
[`WgpuDevice::required_features`] on the device.
*/

use crate::bindings::texture_builder::TextureDescription;
use crate::bindings::visible_to::{ShaderStages, ViewDimension};
use crate::imp::{GpuDevice, ResourceLayoutDescription};
use std::num::NonZeroU32;

mod error;
mod pixel_format;
mod texture;

pub use error::Error;
pub use texture::{ResidentTexture, StagingTexture, WgpuTexture};

impl ShaderStages {
    pub fn wgpu_stages(&self) -> wgpu::ShaderStages {
        let mut stages = wgpu::ShaderStages::NONE;
        if self.contains(ShaderStages::VERTEX) {
            stages |= wgpu::ShaderStages::VERTEX;
        }
        if self.contains(ShaderStages::FRAGMENT) {
            stages |= wgpu::ShaderStages::FRAGMENT;
        }
        if self.contains(ShaderStages::COMPUTE) {
            stages |= wgpu::ShaderStages::COMPUTE;
        }
        stages
    }
}

#[derive(Debug)]
pub struct WgpuResourceLayout {
    layout: wgpu::BindGroupLayout,
    view_dimension: ViewDimension,
}

impl WgpuResourceLayout {
    /// For building the pipeline layout that samples the pool.
    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }
}

#[derive(Debug)]
pub struct WgpuResourceSet(wgpu::BindGroup);

impl WgpuResourceSet {
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.0
    }
}

/// A device and the queue uploads are written through.
#[derive(Debug, Clone)]
pub struct WgpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl WgpuDevice {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        WgpuDevice { device, queue }
    }

    /// Features the device must be created with.
    pub fn required_features() -> wgpu::Features {
        wgpu::Features::TEXTURE_BINDING_ARRAY
            | wgpu::Features::SAMPLED_TEXTURE_AND_STORAGE_BUFFER_ARRAY_NON_UNIFORM_INDEXING
            | wgpu::Features::TEXTURE_COMPRESSION_BC
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}

impl GpuDevice for WgpuDevice {
    type Texture = WgpuTexture;
    type ResourceLayout = WgpuResourceLayout;
    type ResourceSet = WgpuResourceSet;
    /// Uploads go through `Queue::write_texture`, which wgpu orders ahead of the next submit,
    /// so the encoder only marks the frame the copy belongs to.
    type CommandList = wgpu::CommandEncoder;
    type RenderPass<'pass> = wgpu::RenderPass<'pass>;
    type Error = Error;

    fn create_texture(&self, description: &TextureDescription) -> Result<WgpuTexture, Error> {
        if description.usage.is_staging() {
            Ok(WgpuTexture::Staging(StagingTexture::new(description)))
        } else {
            ResidentTexture::new(&self.device, description).map(WgpuTexture::Resident)
        }
    }

    fn create_resource_layout(
        &self,
        description: &ResourceLayoutDescription<'_>,
    ) -> Result<WgpuResourceLayout, Error> {
        let layout = self
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(description.label),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: description.stages.wgpu_stages(),
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: description.view_dimension.wgpu_view_dimension(),
                        multisampled: false,
                    },
                    count: NonZeroU32::new(description.count.max(1)),
                }],
            });
        Ok(WgpuResourceLayout {
            layout,
            view_dimension: description.view_dimension,
        })
    }

    fn create_resource_set(
        &self,
        layout: &WgpuResourceLayout,
        textures: &[&WgpuTexture],
    ) -> Result<WgpuResourceSet, Error> {
        let views = textures
            .iter()
            .map(|t| t.resident().map(|r| r.view(layout.view_dimension)))
            .collect::<Result<Vec<_>, _>>()?;
        let view_refs: Vec<&wgpu::TextureView> = views.iter().collect();
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("bindless texture table"),
            layout: &layout.layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureViewArray(&view_refs),
            }],
        });
        Ok(WgpuResourceSet(bind_group))
    }

    fn map_write<R>(
        &self,
        staging: &mut WgpuTexture,
        subresource: u32,
        write: impl FnOnce(&mut [u8]) -> R,
    ) -> Result<R, Error> {
        match staging {
            WgpuTexture::Staging(s) => Ok(write(s.subresource_mut(subresource)?)),
            WgpuTexture::Resident(r) => Err(Error::NotStaging(r.label().to_string())),
        }
    }

    fn copy_texture(
        &self,
        _command_list: &mut wgpu::CommandEncoder,
        source: &WgpuTexture,
        destination: &WgpuTexture,
    ) -> Result<(), Error> {
        let destination = destination.resident()?;
        match source {
            WgpuTexture::Staging(s) => {
                s.upload(&self.queue, destination);
                Ok(())
            }
            WgpuTexture::Resident(r) => Err(Error::NotStaging(r.label().to_string())),
        }
    }

    fn destroy_texture(&self, texture: WgpuTexture) {
        match texture {
            WgpuTexture::Staging(_) => {}
            WgpuTexture::Resident(r) => r.destroy(),
        }
    }

    fn bind_resource_set(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        slot: u32,
        set: &WgpuResourceSet,
    ) {
        pass.set_bind_group(slot, &set.0, &[]);
    }
}
