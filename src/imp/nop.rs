// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
An in-memory [`GpuDevice`].

Every texture is a set of CPU byte buffers, copies duplicate bytes, and resource sets remember
which texture fills each entry. Nothing is rendered. The device counts what it creates and
destroys so tests can check the lifecycle of pooled textures without a GPU.
*/

use crate::bindings::texture_builder::TextureDescription;
use crate::imp::{GpuDevice, ResourceLayoutDescription};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("texture {label:?} has a zero dimension")]
    EmptyTexture { label: String },
    #[error("subresource {subresource} out of range ({count} subresources)")]
    SubresourceOutOfRange { subresource: u32, count: u32 },
    #[error("resource set needs {expected} textures, got {got}")]
    LayoutMismatch { expected: u32, got: usize },
    #[error("copy between textures of different shape ({source_count} vs {destination_count} subresources)")]
    ShapeMismatch {
        source_count: u32,
        destination_count: u32,
    },
}

/// Identity of a texture created by a [`NopDevice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(u64);

#[derive(Debug)]
struct Storage {
    description: TextureDescription,
    subresources: Mutex<Vec<Box<[u8]>>>,
}

impl Storage {
    fn subresource_bytes(&self, subresource: u32) -> Option<Vec<u8>> {
        self.subresources
            .lock()
            .unwrap()
            .get(subresource as usize)
            .map(|s| s.to_vec())
    }
}

#[derive(Debug)]
pub struct NopTexture {
    id: TextureId,
    storage: Arc<Storage>,
}

impl NopTexture {
    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn description(&self) -> &TextureDescription {
        &self.storage.description
    }

    /// A copy of one subresource's bytes.
    pub fn subresource_bytes(&self, subresource: u32) -> Option<Vec<u8>> {
        self.storage.subresource_bytes(subresource)
    }
}

#[derive(Debug)]
pub struct NopResourceLayout {
    count: u32,
}

/// A descriptor table snapshot: the texture behind each entry.
#[derive(Debug)]
pub struct NopResourceSet {
    entries: Vec<TextureId>,
}

impl NopResourceSet {
    pub fn entries(&self) -> &[TextureId] {
        &self.entries
    }
}

/// Records the copies submitted through it.
#[derive(Debug, Default)]
pub struct NopCommandList {
    copies: Vec<(TextureId, TextureId)>,
}

impl NopCommandList {
    /// `(source, destination)` pairs, in submission order.
    pub fn copies(&self) -> &[(TextureId, TextureId)] {
        &self.copies
    }
}

/// Records which table was bound at which slot.
#[derive(Debug, Default)]
pub struct NopRenderPass {
    bound: Vec<(u32, Vec<TextureId>)>,
}

impl NopRenderPass {
    pub fn bound(&self) -> &[(u32, Vec<TextureId>)] {
        &self.bound
    }
}

#[derive(Debug, Default)]
pub struct NopDevice {
    next_id: AtomicU64,
    live: Mutex<HashMap<TextureId, Arc<Storage>>>,
    destroyed: Mutex<Vec<TextureId>>,
}

impl NopDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Textures created and not yet destroyed.
    pub fn live_textures(&self) -> usize {
        self.live.lock().unwrap().len()
    }

    /// Description of a live texture.
    pub fn texture_description(&self, id: TextureId) -> Option<TextureDescription> {
        self.live
            .lock()
            .unwrap()
            .get(&id)
            .map(|s| s.description.clone())
    }

    /// A copy of one subresource of a live texture.
    pub fn texture_bytes(&self, id: TextureId, subresource: u32) -> Option<Vec<u8>> {
        let storage = self.live.lock().unwrap().get(&id).cloned()?;
        storage.subresource_bytes(subresource)
    }

    /// Destroyed textures, in destruction order.
    pub fn destroyed_textures(&self) -> Vec<TextureId> {
        self.destroyed.lock().unwrap().clone()
    }
}

impl GpuDevice for NopDevice {
    type Texture = NopTexture;
    type ResourceLayout = NopResourceLayout;
    type ResourceSet = NopResourceSet;
    type CommandList = NopCommandList;
    type RenderPass<'pass> = NopRenderPass;
    type Error = Error;

    fn create_texture(&self, description: &TextureDescription) -> Result<NopTexture, Error> {
        if description.width == 0 || description.height == 0 {
            return Err(Error::EmptyTexture {
                label: description.label.clone(),
            });
        }
        let subresources = (0..description.subresource_count())
            .map(|s| vec![0; description.subresource_size(s)].into_boxed_slice())
            .collect();
        let id = TextureId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let storage = Arc::new(Storage {
            description: description.clone(),
            subresources: Mutex::new(subresources),
        });
        self.live.lock().unwrap().insert(id, storage.clone());
        Ok(NopTexture { id, storage })
    }

    fn create_resource_layout(
        &self,
        description: &ResourceLayoutDescription<'_>,
    ) -> Result<NopResourceLayout, Error> {
        Ok(NopResourceLayout {
            count: description.count,
        })
    }

    fn create_resource_set(
        &self,
        layout: &NopResourceLayout,
        textures: &[&NopTexture],
    ) -> Result<NopResourceSet, Error> {
        if textures.len() != layout.count as usize {
            return Err(Error::LayoutMismatch {
                expected: layout.count,
                got: textures.len(),
            });
        }
        Ok(NopResourceSet {
            entries: textures.iter().map(|t| t.id).collect(),
        })
    }

    fn map_write<R>(
        &self,
        staging: &mut NopTexture,
        subresource: u32,
        write: impl FnOnce(&mut [u8]) -> R,
    ) -> Result<R, Error> {
        let count = staging.storage.description.subresource_count();
        let mut subresources = staging.storage.subresources.lock().unwrap();
        let mapped = subresources
            .get_mut(subresource as usize)
            .ok_or(Error::SubresourceOutOfRange { subresource, count })?;
        Ok(write(mapped))
    }

    fn copy_texture(
        &self,
        command_list: &mut NopCommandList,
        source: &NopTexture,
        destination: &NopTexture,
    ) -> Result<(), Error> {
        let source_count = source.storage.description.subresource_count();
        let destination_count = destination.storage.description.subresource_count();
        if source_count != destination_count {
            return Err(Error::ShapeMismatch {
                source_count,
                destination_count,
            });
        }
        let from = source.storage.subresources.lock().unwrap().clone();
        *destination.storage.subresources.lock().unwrap() = from;
        command_list.copies.push((source.id, destination.id));
        Ok(())
    }

    fn destroy_texture(&self, texture: NopTexture) {
        self.live.lock().unwrap().remove(&texture.id);
        self.destroyed.lock().unwrap().push(texture.id);
    }

    fn bind_resource_set(&self, pass: &mut NopRenderPass, slot: u32, set: &NopResourceSet) {
        pass.bound.push((slot, set.entries.clone()));
    }
}
