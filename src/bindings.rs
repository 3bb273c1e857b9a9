// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*! Defines binding types: the texture pool, its handles and the bookkeeping behind them. */

pub mod dirty_tracking;
pub mod disposal;
pub mod slot_allocator;
pub mod texture_builder;
pub mod texture_handle;
pub mod texture_pool;
pub mod visible_to;

pub use slot_allocator::{AllocationExhausted, SlotId};
pub use texture_builder::{TextureBuilder, TextureDescription};
pub use texture_handle::{FillOutcome, HandleState, SkipReason, TextureHandle};
pub use texture_pool::{TexturePool, TexturePoolBuilder};
pub use visible_to::{ShaderStages, TextureUsage, ViewDimension};
