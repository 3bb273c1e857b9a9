// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
A fixed-capacity bindless texture array.

The pool owns a shader-visible descriptor table with one entry per slot. Shaders index it
with the [`SlotId`] of a [`TextureHandle`]. Entries whose handle has no resident texture
point at slot 0's texture, so slot 0 should be filled first with a fallback image.

# Frame protocol

The rendering frontend, once per frame:

1. drains [`TexturePool::upload_queue`] on its command list
2. if [`TexturePool::is_dirty`], calls [`TexturePool::regenerate_descriptor_table`] (the
   rebuild runs on the next drain)
3. calls [`TexturePool::bind`] on the passes that sample the pool
4. calls [`TexturePool::advance_frame`]

# Locking

Two locks. The allocation lock guards the allocator and the slot array; the disposal lock
guards the disposal queue. The built table sits behind its own mutex, taken last: a rebuild
holds the allocation lock while it swaps the built table in, and a clean tick holds the
disposal lock while it checks whether the table still names a queued texture.

# Disposal and stale tables

A texture leaves the queue only once the table bound to passes no longer refers to it. If the
window closes while the current table predates the texture's retirement (the frontend skipped
the rebuild, or the rebuild was refused for lack of a fallback), the queued textures are held
and the window starts over.
*/

use crate::bindings::dirty_tracking::{DirtyReceiver, DirtySender};
use crate::bindings::disposal::{DEFAULT_DISPOSAL_DELAY, DisposalQueue, Tick};
use crate::bindings::slot_allocator::{SlotAllocator, SlotId};
use crate::bindings::texture_handle::{HandleState, TextureHandle};
use crate::bindings::visible_to::{ShaderStages, ViewDimension};
use crate::error::Error;
use crate::imp::{GpuDevice, ResourceLayoutDescription};
use crate::upload::UploadQueue;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// One allocated slot's textures.
pub(crate) struct Slot<D: GpuDevice> {
    /// Changes whenever the slot's contents are replaced, so late uploads can tell.
    pub(crate) generation: u64,
    pub(crate) state: HandleState,
    pub(crate) staging: Option<D::Texture>,
    pub(crate) texture: Option<D::Texture>,
}

pub(crate) struct SlotTable<D: GpuDevice> {
    pub(crate) allocator: SlotAllocator,
    pub(crate) slots: Vec<Option<Slot<D>>>,
    next_generation: u64,
}

impl<D: GpuDevice> SlotTable<D> {
    pub(crate) fn next_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    pub(crate) fn slot_mut(&mut self, id: SlotId) -> Option<&mut Slot<D>> {
        self.slots.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    fn state(&self, id: SlotId) -> Option<HandleState> {
        self.slots
            .get(id.0 as usize)
            .and_then(Option::as_ref)
            .map(|s| s.state)
    }

    /// The texture the table shows for `id`. A re-staged slot keeps showing its old texture.
    fn resident(&self, id: SlotId) -> Option<&D::Texture> {
        self.slots
            .get(id.0 as usize)
            .and_then(Option::as_ref)
            .and_then(|slot| slot.texture.as_ref())
    }
}

/// A built descriptor table.
struct DescriptorTable<D: GpuDevice> {
    set: D::ResourceSet,
    /// Retirements counted when the table was built. Textures retired later may still be in it.
    retirements: u64,
}

pub(crate) struct PoolShared<D: GpuDevice> {
    pub(crate) name: String,
    capacity: u32,
    pub(crate) device: Arc<D>,
    pub(crate) uploads: Arc<UploadQueue<D>>,
    layout: D::ResourceLayout,
    /// The allocation lock.
    pub(crate) slots: Mutex<SlotTable<D>>,
    table: Mutex<Option<DescriptorTable<D>>>,
    /// The disposal lock. Entries remember the slot they came from.
    pub(crate) disposal: Mutex<DisposalQueue<(SlotId, D::Texture)>>,
    pub(crate) dirty: DirtySender,
    dirty_receiver: DirtyReceiver,
    rebuild_scheduled: AtomicBool,
    /// Textures ever retired. Only changes under the disposal lock.
    retirements: AtomicU64,
}

impl<D: GpuDevice> PoolShared<D> {
    /// Moves a resident texture into the disposal queue and restarts its window.
    pub(crate) fn retire(&self, from: SlotId, texture: D::Texture) {
        {
            let mut disposal = self.disposal.lock().unwrap();
            disposal.enqueue((from, texture));
            self.retirements.fetch_add(1, Ordering::AcqRel);
        }
        self.dirty.mark_dirty(true);
    }

    /// Whether the current table was built before the latest retirement.
    fn table_is_stale(&self) -> bool {
        let retirements = self.retirements.load(Ordering::Acquire);
        self.table
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|table| table.retirements < retirements)
    }

    fn rebuild_table(&self, device: &D) {
        let table = self.slots.lock().unwrap();
        let Some(fallback) = table.resident(SlotId(0)) else {
            logwise::warn_sync!(
                "{pool}: slot 0 has no resident texture to fall back on; descriptor table not rebuilt",
                pool = logwise::privacy::LogIt(&self.name)
            );
            return;
        };
        //anything that changes after this point marks dirty again
        self.dirty.mark_dirty(false);
        //retired textures have already left the slot array
        let retirements = self.retirements.load(Ordering::Acquire);
        let entries: Vec<&D::Texture> = (0..self.capacity)
            .map(|i| table.resident(SlotId(i)).unwrap_or(fallback))
            .collect();
        match device.create_resource_set(&self.layout, &entries) {
            Ok(set) => {
                *self.table.lock().unwrap() = Some(DescriptorTable { set, retirements });
                logwise::info_sync!(
                    "{pool}: rebuilt descriptor table with {count} entries",
                    pool = logwise::privacy::LogIt(&self.name),
                    count = self.capacity
                );
            }
            Err(e) => {
                logwise::error_sync!(
                    "{pool}: descriptor table rebuild failed: {err}",
                    pool = logwise::privacy::LogIt(&self.name),
                    err = logwise::privacy::LogIt(&e)
                );
                self.dirty.mark_dirty(true);
            }
        }
    }
}

impl<D: GpuDevice> Drop for PoolShared<D> {
    fn drop(&mut self) {
        let mut doomed: Vec<D::Texture> = Vec::new();
        if let Ok(disposal) = self.disposal.get_mut() {
            doomed.extend(disposal.drain_all().into_iter().map(|(_, t)| t));
        }
        if let Ok(table) = self.slots.get_mut() {
            for slot in table.slots.iter_mut().filter_map(Option::take) {
                doomed.extend(slot.staging);
                doomed.extend(slot.texture);
            }
        }
        logwise::info_sync!(
            "{pool}: torn down, destroying {count} textures",
            pool = logwise::privacy::LogIt(&self.name),
            count = doomed.len()
        );
        for texture in doomed {
            self.device.destroy_texture(texture);
        }
    }
}

/// Builder for [`TexturePool`].
#[derive(Debug, Clone)]
pub struct TexturePoolBuilder {
    name: String,
    capacity: u32,
    stages: ShaderStages,
    view_dimension: ViewDimension,
    disposal_delay: u32,
}

impl TexturePoolBuilder {
    /// Starts configuring a pool of `capacity` slots.
    pub fn new(name: impl Into<String>, capacity: u32) -> Self {
        TexturePoolBuilder {
            name: name.into(),
            capacity,
            stages: ShaderStages::FRAGMENT,
            view_dimension: ViewDimension::D2,
            disposal_delay: DEFAULT_DISPOSAL_DELAY,
        }
    }

    /// Shader stages that index the table. Defaults to fragment only.
    pub fn with_stages(mut self, stages: ShaderStages) -> Self {
        self.stages = stages;
        self
    }

    /// How shaders view each entry. Defaults to 2D.
    pub fn with_view_dimension(mut self, view_dimension: ViewDimension) -> Self {
        self.view_dimension = view_dimension;
        self
    }

    /// Clean cycles a disposed texture survives; at least 1.
    ///
    /// Keep this at or above the renderer's frames in flight.
    pub fn with_disposal_delay(mut self, frames: u32) -> Self {
        self.disposal_delay = frames.max(1);
        self
    }

    /// Creates the pool, with its own upload queue.
    pub fn build<D: GpuDevice>(self, device: Arc<D>) -> Result<TexturePool<D>, Error> {
        self.build_with_uploads(device, Arc::new(UploadQueue::new()))
    }

    /// Creates the pool, pushing its deferred work onto `uploads`.
    pub fn build_with_uploads<D: GpuDevice>(
        self,
        device: Arc<D>,
        uploads: Arc<UploadQueue<D>>,
    ) -> Result<TexturePool<D>, Error> {
        let layout = device
            .create_resource_layout(&ResourceLayoutDescription {
                label: &self.name,
                count: self.capacity,
                stages: self.stages,
                view_dimension: self.view_dimension,
            })
            .map_err(Error::device)?;
        let dirty = DirtySender::new(false);
        let dirty_receiver = DirtyReceiver::new(&dirty);
        logwise::info_sync!(
            "created texture pool {pool} with {capacity} slots",
            pool = logwise::privacy::LogIt(&self.name),
            capacity = self.capacity
        );
        Ok(TexturePool {
            shared: Arc::new(PoolShared {
                name: self.name,
                capacity: self.capacity,
                device,
                uploads,
                layout,
                slots: Mutex::new(SlotTable {
                    allocator: SlotAllocator::new(self.capacity),
                    slots: (0..self.capacity).map(|_| None).collect(),
                    next_generation: 0,
                }),
                table: Mutex::new(None),
                disposal: Mutex::new(DisposalQueue::new(self.disposal_delay)),
                dirty,
                dirty_receiver,
                rebuild_scheduled: AtomicBool::new(false),
                retirements: AtomicU64::new(0),
            }),
        })
    }
}

/// A bindless texture array of fixed capacity.
///
/// Cloning is cheap; clones share the slots, the table and the disposal queue. Create one with
/// [`TexturePoolBuilder`].
pub struct TexturePool<D: GpuDevice> {
    shared: Arc<PoolShared<D>>,
}

impl<D: GpuDevice> Clone for TexturePool<D> {
    fn clone(&self) -> Self {
        TexturePool {
            shared: self.shared.clone(),
        }
    }
}

impl<D: GpuDevice> Debug for TexturePool<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TexturePool")
            .field("name", &self.shared.name)
            .field("capacity", &self.shared.capacity)
            .field("dirty", &self.is_dirty())
            .finish()
    }
}

impl<D: GpuDevice> TexturePool<D> {
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn capacity(&self) -> u32 {
        self.shared.capacity
    }

    pub fn device(&self) -> &Arc<D> {
        &self.shared.device
    }

    /// Deferred work for the rendering frontend to drain.
    pub fn upload_queue(&self) -> &Arc<UploadQueue<D>> {
        &self.shared.uploads
    }

    /// Whether the descriptor table is stale.
    pub fn is_dirty(&self) -> bool {
        self.shared.dirty_receiver.is_dirty()
    }

    /// Claims a free slot, or `None` when every slot is in use.
    pub fn allocate_handle(&self) -> Option<TextureHandle<D>> {
        let mut table = self.shared.slots.lock().unwrap();
        match table.allocator.allocate() {
            Ok(id) => {
                let generation = table.next_generation();
                table.slots[id.0 as usize] = Some(Slot {
                    generation,
                    state: HandleState::Empty,
                    staging: None,
                    texture: None,
                });
                Some(TextureHandle::new(id, self.shared.clone()))
            }
            Err(e) => {
                logwise::warn_sync!(
                    "{pool}: {err}",
                    pool = logwise::privacy::LogIt(&self.shared.name),
                    err = logwise::privacy::LogIt(&e)
                );
                None
            }
        }
    }

    /// Schedules a rebuild of the descriptor table on the upload queue.
    ///
    /// Calls made while a rebuild is already queued are coalesced into it.
    pub fn regenerate_descriptor_table(&self) {
        if self.shared.capacity == 0 {
            return;
        }
        if self.shared.rebuild_scheduled.swap(true, Ordering::AcqRel) {
            return;
        }
        let shared = self.shared.clone();
        self.shared.uploads.push(
            format!("{} descriptor table", self.shared.name),
            move |device, _command_list| {
                shared.rebuild_scheduled.store(false, Ordering::Release);
                shared.rebuild_table(device);
            },
        );
    }

    /// Binds the current descriptor table at `slot`. Does nothing before the first rebuild.
    pub fn bind(&self, pass: &mut D::RenderPass<'_>, slot: u32) {
        if let Some(table) = self.shared.table.lock().unwrap().as_ref() {
            self.shared.device.bind_resource_set(pass, slot, &table.set);
        }
    }

    /// Runs `f` on the most recently built table.
    pub fn with_descriptor_table<R>(&self, f: impl FnOnce(Option<&D::ResourceSet>) -> R) -> R {
        f(self.shared.table.lock().unwrap().as_ref().map(|table| &table.set))
    }

    /// The per-frame clean tick.
    ///
    /// Destroys queued textures once the disposal window closes, keeps the table dirty while
    /// it is open, and releases the staging texture of every handle that has gone resident.
    ///
    /// Queued textures the current table may still name are held for another window.
    pub fn advance_frame(&self) {
        let doomed = {
            let mut disposal = self.shared.disposal.lock().unwrap();
            match disposal.tick() {
                Tick::Drained(doomed) if !doomed.is_empty() && self.shared.table_is_stale() => {
                    logwise::warn_sync!(
                        "{pool}: descriptor table still names {count} disposed textures; holding them",
                        pool = logwise::privacy::LogIt(&self.shared.name),
                        count = doomed.len()
                    );
                    disposal.hold(doomed);
                    self.shared.dirty.mark_dirty(true);
                    Vec::new()
                }
                Tick::Drained(doomed) => doomed,
                Tick::Pending => {
                    self.shared.dirty.mark_dirty(true);
                    Vec::new()
                }
                Tick::Idle => Vec::new(),
            }
        };
        if !doomed.is_empty() {
            logwise::info_sync!(
                "{pool}: destroying {count} disposed textures",
                pool = logwise::privacy::LogIt(&self.shared.name),
                count = doomed.len()
            );
        }
        for (_, texture) in doomed {
            self.shared.device.destroy_texture(texture);
        }

        let released: Vec<D::Texture> = {
            let mut table = self.shared.slots.lock().unwrap();
            table
                .slots
                .iter_mut()
                .flatten()
                .filter(|slot| slot.state == HandleState::Resident)
                .filter_map(|slot| slot.staging.take())
                .collect()
        };
        if !released.is_empty() {
            logwise::trace_sync!("released {count} staging textures", count = released.len());
        }
        for staging in released {
            self.shared.device.destroy_texture(staging);
        }
    }

    /// State of slot `id`.
    ///
    /// A free slot whose last texture still waits in the disposal queue reports
    /// [`HandleState::Disposing`].
    pub fn slot_state(&self, id: SlotId) -> HandleState {
        if let Some(state) = self.shared.slots.lock().unwrap().state(id) {
            return state;
        }
        let disposal = self.shared.disposal.lock().unwrap();
        if disposal.iter().any(|(from, _)| *from == id) {
            HandleState::Disposing
        } else {
            HandleState::Empty
        }
    }

    /// Textures waiting in the disposal queue.
    pub fn pending_disposals(&self) -> usize {
        self.shared.disposal.lock().unwrap().len()
    }

    #[cfg(test)]
    pub(crate) fn shared(&self) -> &Arc<PoolShared<D>> {
        &self.shared
    }

    /// Slots currently held by handles.
    pub fn outstanding(&self) -> u32 {
        self.shared.slots.lock().unwrap().allocator.outstanding()
    }
}
