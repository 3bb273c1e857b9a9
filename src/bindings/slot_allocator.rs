// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Free-list allocation of descriptor table slots.

The ID space is `[0, capacity)` and never grows. Freed IDs go to the back of the free list, so
an ID is only handed out again after every ID freed before it. The allocator is not
synchronized itself; the pool keeps it behind its allocation lock.
*/

use std::collections::VecDeque;
use std::fmt::{Display, Formatter};

/// An index into the descriptor table, and the value shaders use to find a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub u32);

impl Display for SlotId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Every slot is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("all {capacity} slots are allocated")]
pub struct AllocationExhausted {
    pub capacity: u32,
}

#[derive(Debug)]
pub struct SlotAllocator {
    free: VecDeque<u32>,
    outstanding: Vec<bool>,
}

impl SlotAllocator {
    pub fn new(capacity: u32) -> Self {
        SlotAllocator {
            free: (0..capacity).collect(),
            outstanding: vec![false; capacity as usize],
        }
    }

    pub fn capacity(&self) -> u32 {
        self.outstanding.len() as u32
    }

    /// Number of IDs currently allocated.
    pub fn outstanding(&self) -> u32 {
        self.capacity() - self.free.len() as u32
    }

    pub fn is_outstanding(&self, id: SlotId) -> bool {
        self.outstanding.get(id.0 as usize).copied().unwrap_or(false)
    }

    pub fn allocate(&mut self) -> Result<SlotId, AllocationExhausted> {
        let id = self.free.pop_front().ok_or(AllocationExhausted {
            capacity: self.capacity(),
        })?;
        self.outstanding[id as usize] = true;
        Ok(SlotId(id))
    }

    /// Returns `id` to the free list.
    ///
    /// Freeing an ID that is not outstanding is a bug in the caller. Debug builds panic;
    /// release builds log it and leave the allocator unchanged.
    pub fn free(&mut self, id: SlotId) {
        let valid = self.is_outstanding(id);
        debug_assert!(valid, "slot {id} freed but not outstanding");
        if !valid {
            logwise::error_sync!("slot {id} freed but not outstanding", id = id.0);
            return;
        }
        self.outstanding[id.0 as usize] = false;
        self.free.push_back(id.0);
    }
}
