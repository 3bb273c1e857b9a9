// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Owning references to one slot of a [`TexturePool`](crate::bindings::TexturePool).

A handle is filled at most once per content change. Fills that need a CPU-side copy write into
a staging texture right away and leave the resident texture and the staging copy to the
pool's upload queue. [`TextureHandle::adopt_texture`] and
[`TextureHandle::create_render_target`] skip staging and go resident immediately.

Dropping a handle (or calling [`TextureHandle::dispose`]) frees its slot right away. The
resident texture goes to the disposal queue, since command lists already submitted may still
sample it.
*/

use crate::bindings::slot_allocator::SlotId;
use crate::bindings::texture_builder::TextureDescription;
use crate::bindings::texture_pool::PoolShared;
use crate::bindings::visible_to::TextureUsage;
use crate::container::{ConsoleTexture, PcEncoding, PcTexture};
use crate::error::Error;
use crate::imp::GpuDevice;
use crate::mip_layout;
use crate::pixel_formats::{Float4, PixelFormat, Unorm4, pixel_as_bytes};
use std::fmt::Debug;
use std::sync::Arc;

/// Lifecycle of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HandleState {
    /// Allocated, nothing uploaded. The descriptor table shows the fallback texture.
    #[default]
    Empty,
    /// Data is in a staging texture; the upload is queued.
    Staged,
    /// The table can reference the slot's own texture.
    Resident,
    /// The slot was released; its texture waits out the disposal window.
    Disposing,
}

/// Why a fill left the handle untouched without failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// PC textures must have power-of-two sides.
    UnsupportedGeometry { width: u32, height: u32 },
    /// An uncompressed layout without an upload path.
    UnimplementedEncoding { rgb_bit_count: u32 },
}

/// Result of a fill that did not fail.
///
/// A skipped fill is not an error: the slot keeps whatever it showed before, which for a fresh
/// handle is the pool's fallback texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillOutcome {
    /// Data is staged; the upload runs on the next drain of the pool's upload queue.
    Staged,
    Skipped(SkipReason),
}

/// Exclusive owner of one slot in a [`TexturePool`](crate::bindings::TexturePool).
///
/// Shaders index the pool's descriptor table with [`TextureHandle::id`]. The handle keeps the
/// pool's shared state alive, so it may outlive every [`TexturePool`](crate::bindings::TexturePool)
/// clone.
pub struct TextureHandle<D: GpuDevice> {
    id: SlotId,
    shared: Arc<PoolShared<D>>,
    released: bool,
}

impl<D: GpuDevice> Debug for TextureHandle<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureHandle")
            .field("pool", &self.shared.name)
            .field("id", &self.id)
            .finish()
    }
}

impl<D: GpuDevice> TextureHandle<D> {
    pub(crate) fn new(id: SlotId, shared: Arc<PoolShared<D>>) -> Self {
        TextureHandle {
            id,
            shared,
            released: false,
        }
    }

    /// The slot shaders use to index the pool's table.
    pub fn id(&self) -> SlotId {
        self.id
    }

    pub fn state(&self) -> HandleState {
        let mut table = self.shared.slots.lock().unwrap();
        table
            .slot_mut(self.id)
            .map(|s| s.state)
            .unwrap_or(HandleState::Empty)
    }

    pub fn is_resident(&self) -> bool {
        self.state() == HandleState::Resident
    }

    fn label(&self, name: &str) -> String {
        format!("{}[{}] {}", self.shared.name, self.id, name)
    }

    fn skip(&self, name: &str, reason: SkipReason) -> FillOutcome {
        logwise::warn_sync!(
            "skipped fill of {name} into slot {slot}: {reason}",
            name = logwise::privacy::LogIt(name),
            slot = self.id.0,
            reason = logwise::privacy::LogIt(&reason)
        );
        FillOutcome::Skipped(reason)
    }

    /// Fills from a DDS-style texture.
    pub fn fill_from_pc(&mut self, texture: &PcTexture<'_>, name: &str) -> Result<FillOutcome, Error> {
        let format = match texture.encoding()? {
            PcEncoding::Format(format) => format,
            PcEncoding::Unimplemented { rgb_bit_count } => {
                return Ok(self.skip(name, SkipReason::UnimplementedEncoding { rgb_bit_count }));
            }
        };
        let (width, height) = (texture.width, texture.height);
        if !width.is_power_of_two() || !height.is_power_of_two() {
            return Ok(self.skip(name, SkipReason::UnsupportedGeometry { width, height }));
        }
        let mip_levels = texture.mip_levels();
        let faces = if texture.is_cubemap() { 6 } else { 1 };
        let needed = mip_layout::packed_size(format, width, height, mip_levels, faces);
        if texture.data.len() < needed {
            return Err(Error::TruncatedPayload {
                needed,
                available: texture.data.len(),
            });
        }
        let (width, height) = if format.is_compressed() {
            (width.next_multiple_of(4), height.next_multiple_of(4))
        } else {
            (width, height)
        };

        let label = self.label(name);
        let staging_description = TextureDescription::builder(&label, width, height, format)
            .with_mip_levels(mip_levels)
            .with_array_layers(faces)
            .with_usage(TextureUsage::STAGING)
            .build();
        let mut staging = self
            .shared
            .device
            .create_texture(&staging_description)
            .map_err(Error::device)?;
        let mut cursor = 0;
        for face in 0..faces {
            for mip in 0..mip_levels {
                let size = mip_layout::mip_byte_size(format, texture.width, texture.height, mip);
                let source = &texture.data[cursor..cursor + size];
                let subresource = staging_description.subresource(face, mip);
                let written = self.shared.device.map_write(&mut staging, subresource, |mapped| {
                    let n = source.len().min(mapped.len());
                    mapped[..n].copy_from_slice(&source[..n]);
                });
                if let Err(e) = written {
                    self.shared.device.destroy_texture(staging);
                    return Err(Error::device(e));
                }
                cursor += size;
            }
        }
        self.stage(staging, resident_description(staging_description, faces == 6));
        logwise::info_sync!(
            "staged {label} ({mips} mips, {faces} faces)",
            label = logwise::privacy::LogIt(&label),
            mips = mip_levels,
            faces = faces
        );
        Ok(FillOutcome::Staged)
    }

    /// Fills from a tiled console texture, deswizzling every slice and mip.
    pub fn fill_from_console(
        &mut self,
        texture: &ConsoleTexture<'_>,
        name: &str,
    ) -> Result<FillOutcome, Error> {
        let format = PixelFormat::from_dxgi(texture.dxgi_format)?;
        let layout = texture.format.swizzle_layout()?;
        let width = texture.width.next_multiple_of(4);
        let height = texture.height.next_multiple_of(4);
        let mip_levels = if texture.mip_count == 0 {
            mip_layout::full_mip_count(width, height)
        } else {
            texture.mip_count
        };
        let slices = if texture.is_cubemap() { 6 } else { 1 };

        let label = self.label(name);
        let staging_description = TextureDescription::builder(&label, width, height, format)
            .with_mip_levels(mip_levels)
            .with_array_layers(slices)
            .with_usage(TextureUsage::STAGING)
            .build();
        let mut staging = self
            .shared
            .device
            .create_texture(&staging_description)
            .map_err(Error::device)?;

        let deswizzle = logwise::perfwarn_begin!("console deswizzle");
        let mut cursor = 0;
        let result = (|| -> Result<(), Error> {
            for slice in 0..slices {
                let (mut w, mut h) = (width, height);
                for mip in 0..mip_levels {
                    let region = layout.region_size(w, h);
                    let input = texture.data.get(cursor..cursor + region).ok_or(
                        Error::TruncatedPayload {
                            needed: cursor + region,
                            available: texture.data.len(),
                        },
                    )?;
                    let (padded_width, _) = layout.padded_dimensions(w, h);
                    let pitch = layout.units_across(padded_width);
                    let subresource = staging_description.subresource(slice, mip);
                    self.shared
                        .device
                        .map_write(&mut staging, subresource, |mapped| {
                            layout.deswizzle(w, h, pitch, input, mapped)
                        })
                        .map_err(Error::device)??;
                    cursor += region;
                    w = (w / 2).max(1);
                    h = (h / 2).max(1);
                }
            }
            Ok(())
        })();
        drop(deswizzle);
        if let Err(e) = result {
            self.shared.device.destroy_texture(staging);
            return Err(e);
        }

        self.stage(staging, resident_description(staging_description, slices == 6));
        logwise::info_sync!(
            "staged console texture {label} ({mips} mips, {bytes} bytes read)",
            label = logwise::privacy::LogIt(&label),
            mips = mip_levels,
            bytes = cursor
        );
        Ok(FillOutcome::Staged)
    }

    /// Fills with a single RGBA8 texel.
    pub fn fill_with_color(&mut self, color: Unorm4) -> Result<FillOutcome, Error> {
        let label = self.label("constant color");
        let staging_description = TextureDescription::builder(&label, 1, 1, PixelFormat::RGBA8UNorm)
            .with_usage(TextureUsage::STAGING)
            .build();
        let staging = self.staged_constant(&staging_description, pixel_as_bytes(&[color]))?;
        self.stage(staging, resident_description(staging_description, false));
        Ok(FillOutcome::Staged)
    }

    /// Fills a 1×1 cubemap whose six faces are `color`.
    pub fn fill_with_color_cube(&mut self, color: Float4) -> Result<FillOutcome, Error> {
        let label = self.label("constant color cube");
        let staging_description =
            TextureDescription::builder(&label, 1, 1, PixelFormat::RGBA32Float)
                .with_array_layers(6)
                .with_usage(TextureUsage::STAGING)
                .build();
        let staging = self.staged_constant(&staging_description, pixel_as_bytes(&[color]))?;
        self.stage(staging, resident_description(staging_description, true));
        Ok(FillOutcome::Staged)
    }

    /// Creates a staging texture with every subresource set to `texel`.
    fn staged_constant(
        &self,
        description: &TextureDescription,
        texel: &[u8],
    ) -> Result<D::Texture, Error> {
        let device = &self.shared.device;
        let mut staging = device.create_texture(description).map_err(Error::device)?;
        for subresource in 0..description.subresource_count() {
            let written = device.map_write(&mut staging, subresource, |mapped| {
                for chunk in mapped.chunks_exact_mut(texel.len()) {
                    chunk.copy_from_slice(texel);
                }
            });
            if let Err(e) = written {
                device.destroy_texture(staging);
                return Err(Error::device(e));
            }
        }
        Ok(staging)
    }

    /// Installs `staging` and queues the upload that makes the slot resident.
    fn stage(&mut self, staging: D::Texture, resident: TextureDescription) {
        let (generation, replaced) = {
            let mut table = self.shared.slots.lock().unwrap();
            let generation = table.next_generation();
            let Some(slot) = table.slot_mut(self.id) else {
                unreachable!("live handle {} has no slot", self.id)
            };
            slot.generation = generation;
            slot.state = HandleState::Staged;
            (generation, slot.staging.replace(staging))
        };
        if let Some(replaced) = replaced {
            self.shared.device.destroy_texture(replaced);
        }

        let shared = self.shared.clone();
        let id = self.id;
        self.shared
            .uploads
            .push(resident.label.clone(), move |device, command_list| {
                let mut table = shared.slots.lock().unwrap();
                let Some(slot) = table.slot_mut(id).filter(|s| s.generation == generation) else {
                    logwise::trace_sync!("upload for slot {slot} is stale", slot = id.0);
                    return;
                };
                let Some(staging) = slot.staging.as_ref() else {
                    return;
                };
                let texture = match device.create_texture(&resident) {
                    Ok(texture) => texture,
                    Err(e) => {
                        logwise::error_sync!(
                            "creating resident {label} failed: {err}",
                            label = logwise::privacy::LogIt(&resident.label),
                            err = logwise::privacy::LogIt(&e)
                        );
                        return;
                    }
                };
                if let Err(e) = device.copy_texture(command_list, staging, &texture) {
                    logwise::error_sync!(
                        "uploading {label} failed: {err}",
                        label = logwise::privacy::LogIt(&resident.label),
                        err = logwise::privacy::LogIt(&e)
                    );
                    device.destroy_texture(texture);
                    return;
                }
                let previous = slot.texture.replace(texture);
                slot.state = HandleState::Resident;
                drop(table);
                if let Some(previous) = previous {
                    shared.retire(id, previous);
                }
                shared.dirty.mark_dirty(true);
            });
    }

    /// Makes `texture` this slot's resident texture.
    ///
    /// Any previous resident texture is queued for disposal; pending uploads are abandoned.
    pub fn adopt_texture(&mut self, texture: D::Texture) {
        let (previous, staging) = {
            let mut table = self.shared.slots.lock().unwrap();
            let generation = table.next_generation();
            let Some(slot) = table.slot_mut(self.id) else {
                unreachable!("live handle {} has no slot", self.id)
            };
            slot.generation = generation;
            slot.state = HandleState::Resident;
            (slot.texture.replace(texture), slot.staging.take())
        };
        if let Some(staging) = staging {
            self.shared.device.destroy_texture(staging);
        }
        if let Some(previous) = previous {
            self.shared.retire(self.id, previous);
        }
        self.shared.dirty.mark_dirty(true);
        logwise::info_sync!("adopted texture into slot {slot}", slot = self.id.0);
    }

    /// Creates a resident texture that can be rendered into and then sampled from the pool.
    ///
    /// [`TextureUsage::RENDER_TARGET`] and [`TextureUsage::SAMPLED`] are added to the usage.
    pub fn create_render_target(&mut self, mut description: TextureDescription) -> Result<(), Error> {
        description.usage |= TextureUsage::RENDER_TARGET | TextureUsage::SAMPLED;
        description.usage.remove(TextureUsage::STAGING);
        let texture = self
            .shared
            .device
            .create_texture(&description)
            .map_err(Error::device)?;
        self.adopt_texture(texture);
        Ok(())
    }

    /// Releases the slot. Equivalent to dropping the handle.
    pub fn dispose(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        let slot = {
            let mut table = self.shared.slots.lock().unwrap();
            let slot = table.slots.get_mut(self.id.0 as usize).and_then(Option::take);
            table.allocator.free(self.id);
            slot
        };
        if let Some(slot) = slot {
            if let Some(staging) = slot.staging {
                self.shared.device.destroy_texture(staging);
            }
            if let Some(texture) = slot.texture {
                self.shared.retire(self.id, texture);
            }
        }
        self.shared.dirty.mark_dirty(true);
        logwise::info_sync!(
            "released slot {slot} of {pool}",
            slot = self.id.0,
            pool = logwise::privacy::LogIt(&self.shared.name)
        );
    }
}

impl<D: GpuDevice> Drop for TextureHandle<D> {
    fn drop(&mut self) {
        self.release();
    }
}

/// The sampled texture a staging texture uploads into.
fn resident_description(staging: TextureDescription, cubemap: bool) -> TextureDescription {
    if cubemap {
        TextureDescription {
            array_layers: staging.array_layers / 6,
            usage: TextureUsage::SAMPLED | TextureUsage::CUBEMAP,
            ..staging
        }
    } else {
        TextureDescription {
            usage: TextureUsage::SAMPLED,
            ..staging
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::UnsupportedGeometry { width, height } => {
                write!(f, "{width}x{height} is not a power of two")
            }
            SkipReason::UnimplementedEncoding { rgb_bit_count } => {
                write!(f, "{rgb_bit_count}-bit RGB has no upload path")
            }
        }
    }
}
