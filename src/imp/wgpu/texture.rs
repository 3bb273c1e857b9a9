// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use crate::bindings::texture_builder::TextureDescription;
use crate::bindings::visible_to::{TextureUsage, ViewDimension};
use crate::imp::wgpu::Error;
use wgpu::{Extent3d, TexelCopyBufferLayout, TexelCopyTextureInfo};

impl TextureUsage {
    /// Converts this texture usage to the corresponding wgpu texture usage flags.
    ///
    /// Every resident texture is a copy destination so staging data can reach it.
    pub fn wgpu_usage(&self) -> wgpu::TextureUsages {
        let mut usage = wgpu::TextureUsages::COPY_DST;
        if self.contains(TextureUsage::SAMPLED) {
            usage |= wgpu::TextureUsages::TEXTURE_BINDING;
        }
        if self.intersects(TextureUsage::RENDER_TARGET | TextureUsage::DEPTH_STENCIL) {
            usage |= wgpu::TextureUsages::RENDER_ATTACHMENT;
        }
        if self.contains(TextureUsage::STORAGE) {
            usage |= wgpu::TextureUsages::STORAGE_BINDING;
        }
        usage
    }
}

impl ViewDimension {
    pub const fn wgpu_view_dimension(&self) -> wgpu::TextureViewDimension {
        match self {
            ViewDimension::D2 => wgpu::TextureViewDimension::D2,
            ViewDimension::Cube => wgpu::TextureViewDimension::Cube,
        }
    }
}

/// CPU-side staging storage for write_texture operations.
///
/// Textures use `Queue::write_texture`, which takes a data slice directly, so staging never
/// becomes a GPU object. One tightly packed buffer per subresource.
#[derive(Debug)]
pub struct StagingTexture {
    description: TextureDescription,
    subresources: Vec<Box<[u8]>>,
}

/// A GPU texture the pool can sample.
#[derive(Debug)]
pub struct ResidentTexture {
    label: String,
    texture: wgpu::Texture,
}

#[derive(Debug)]
pub enum WgpuTexture {
    Staging(StagingTexture),
    Resident(ResidentTexture),
}

impl WgpuTexture {
    /// Wraps a texture created elsewhere, e.g. for `TextureHandle::adopt_texture`.
    ///
    /// The texture must have `TEXTURE_BINDING` usage to appear in a descriptor table.
    pub fn adopt(label: impl Into<String>, texture: wgpu::Texture) -> Self {
        WgpuTexture::Resident(ResidentTexture {
            label: label.into(),
            texture,
        })
    }

    pub fn label(&self) -> &str {
        match self {
            WgpuTexture::Staging(s) => &s.description.label,
            WgpuTexture::Resident(r) => &r.label,
        }
    }

    /// The GPU texture, if this is resident.
    pub fn wgpu_texture(&self) -> Option<&wgpu::Texture> {
        match self {
            WgpuTexture::Staging(_) => None,
            WgpuTexture::Resident(r) => Some(&r.texture),
        }
    }

    pub(super) fn resident(&self) -> Result<&ResidentTexture, Error> {
        match self {
            WgpuTexture::Staging(s) => Err(Error::NotResident(s.description.label.clone())),
            WgpuTexture::Resident(r) => Ok(r),
        }
    }
}

impl StagingTexture {
    pub(super) fn new(description: &TextureDescription) -> Self {
        let subresources = (0..description.subresource_count())
            .map(|s| vec![0; description.subresource_size(s)].into_boxed_slice())
            .collect();
        StagingTexture {
            description: description.clone(),
            subresources,
        }
    }

    pub(super) fn subresource_mut(&mut self, subresource: u32) -> Result<&mut [u8], Error> {
        let count = self.description.subresource_count();
        self.subresources
            .get_mut(subresource as usize)
            .map(|s| &mut s[..])
            .ok_or(Error::SubresourceOutOfRange { subresource, count })
    }

    /// Uploads every subresource into `destination`.
    pub(super) fn upload(&self, queue: &wgpu::Queue, destination: &ResidentTexture) {
        let (block_width, block_height) = self.description.format.block_footprint();
        let block_bytes = self.description.format.texel_size();
        let _copy_data_guard = logwise::perfwarn_begin!("staging_upload");
        for (index, data) in self.subresources.iter().enumerate() {
            let (layer, mip) = self.description.layer_and_mip(index as u32);
            let level = self.description.mip(mip);
            queue.write_texture(
                TexelCopyTextureInfo {
                    texture: &destination.texture,
                    mip_level: mip,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: layer,
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                data,
                TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(level.rounded_width / block_width * block_bytes),
                    rows_per_image: Some(level.rounded_height / block_height),
                },
                Extent3d {
                    width: level.rounded_width,
                    height: level.rounded_height,
                    depth_or_array_layers: 1,
                },
            );
        }
        logwise::debuginternal_sync!(
            "uploaded {count} subresources of {name}",
            count = self.subresources.len(),
            name = logwise::privacy::LogIt(&self.description.label)
        );
    }
}

impl ResidentTexture {
    pub(super) fn new(device: &wgpu::Device, description: &TextureDescription) -> Result<Self, Error> {
        let format = description
            .format
            .wgpu_format()
            .ok_or(Error::UnsupportedFormat(description.format))?;
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&description.label),
            size: Extent3d {
                width: description.width,
                height: description.height,
                depth_or_array_layers: description.layer_count(),
            },
            mip_level_count: description.mip_levels,
            sample_count: description.sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: description.usage.wgpu_usage(),
            view_formats: &[],
        });
        Ok(ResidentTexture {
            label: description.label.clone(),
            texture,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub(super) fn view(&self, dimension: ViewDimension) -> wgpu::TextureView {
        self.texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(&self.label),
            dimension: Some(dimension.wgpu_view_dimension()),
            ..Default::default()
        })
    }

    pub(super) fn destroy(self) {
        self.texture.destroy();
    }
}
