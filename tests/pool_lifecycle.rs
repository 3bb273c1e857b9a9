// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Slot allocation, descriptor table rebuilds and deferred disposal, driven frame by frame.

use bindless_textures::bindings::{
    HandleState, SlotId, TextureHandle, TexturePool, TexturePoolBuilder,
};
use bindless_textures::imp::nop::{NopCommandList, NopDevice, NopRenderPass, TextureId};
use bindless_textures::pixel_formats::Unorm4;
use std::collections::BTreeSet;
use std::sync::Arc;

fn pool(capacity: u32) -> TexturePool<NopDevice> {
    TexturePoolBuilder::new("lifecycle", capacity)
        .build(Arc::new(NopDevice::new()))
        .unwrap()
}

fn drain(pool: &TexturePool<NopDevice>) -> NopCommandList {
    let mut commands = NopCommandList::default();
    pool.upload_queue().drain(pool.device(), &mut commands);
    commands
}

/// Allocates a handle filled with a solid color and uploads it.
fn resident(pool: &TexturePool<NopDevice>, shade: u8) -> TextureHandle<NopDevice> {
    let mut handle = pool.allocate_handle().unwrap();
    handle
        .fill_with_color(Unorm4 {
            r: shade,
            g: shade,
            b: shade,
            a: 255,
        })
        .unwrap();
    drain(pool);
    assert!(handle.is_resident());
    handle
}

fn rebuild(pool: &TexturePool<NopDevice>) -> Option<Vec<TextureId>> {
    pool.regenerate_descriptor_table();
    drain(pool);
    pool.with_descriptor_table(|table| table.map(|t| t.entries().to_vec()))
}

/// One pass of the frontend's frame protocol.
fn frame(pool: &TexturePool<NopDevice>) {
    drain(pool);
    if pool.is_dirty() {
        rebuild(pool);
    }
    pool.advance_frame();
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn capacity_four_allocation() {
    let pool = pool(4);
    let mut handles: Vec<_> = (0..4).map(|_| pool.allocate_handle().unwrap()).collect();
    let ids: BTreeSet<u32> = handles.iter().map(|h| h.id().0).collect();
    assert_eq!(ids, BTreeSet::from([0, 1, 2, 3]));
    assert!(pool.allocate_handle().is_none());
    assert_eq!(pool.outstanding(), 4);

    let position = handles.iter().position(|h| h.id() == SlotId(1)).unwrap();
    handles.remove(position).dispose();
    assert_eq!(pool.outstanding(), 3);
    assert_eq!(pool.allocate_handle().unwrap().id(), SlotId(1));
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn freed_slots_are_reused_in_order() {
    let pool = pool(3);
    let a = pool.allocate_handle().unwrap();
    let b = pool.allocate_handle().unwrap();
    let c = pool.allocate_handle().unwrap();
    let (a_id, c_id) = (a.id(), c.id());
    drop(c);
    drop(a);
    assert_eq!(pool.allocate_handle().unwrap().id(), c_id);
    // the handle above was dropped at the end of the statement, so c's slot is free again
    let next = pool.allocate_handle().unwrap();
    assert_eq!(next.id(), a_id);
    drop(b);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn empty_slots_show_the_fallback() {
    let pool = pool(4);
    let fallback = resident(&pool, 0);
    let _hole = pool.allocate_handle().unwrap();
    let filled = resident(&pool, 200);
    assert!(pool.is_dirty());

    let entries = rebuild(&pool).unwrap();
    assert!(!pool.is_dirty());
    assert_eq!(entries.len(), 4);
    let fallback_id = entries[fallback.id().0 as usize];
    let filled_id = entries[filled.id().0 as usize];
    assert_ne!(fallback_id, filled_id);
    // the hole and the never-allocated slot both resolve to slot 0
    assert_eq!(entries[1], fallback_id);
    assert_eq!(entries[3], fallback_id);

    let texel = pool.device().texture_bytes(filled_id, 0).unwrap();
    assert_eq!(texel, [200, 200, 200, 255]);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn rebuild_queued_behind_an_upload_sees_it() {
    let pool = pool(2);
    let _fallback = resident(&pool, 0);
    let mut pending = pool.allocate_handle().unwrap();
    pending.fill_with_color(Unorm4::default()).unwrap();
    assert_eq!(pending.state(), HandleState::Staged);

    pool.regenerate_descriptor_table();
    // the rebuild was queued after the upload, so one drain does both
    drain(&pool);
    let entries = pool.with_descriptor_table(|t| t.unwrap().entries().to_vec());
    assert!(pending.is_resident());
    assert_ne!(entries[0], entries[1]);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn missing_fallback_keeps_the_table_dirty() {
    let pool = pool(2);
    let _unfilled = pool.allocate_handle().unwrap();
    let _filled = resident(&pool, 9);
    assert!(rebuild(&pool).is_none());
    assert!(pool.is_dirty());

    let mut pass = NopRenderPass::default();
    pool.bind(&mut pass, 1);
    assert!(pass.bound().is_empty());
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn rebuild_requests_coalesce() {
    let pool = pool(2);
    let _fallback = resident(&pool, 1);
    pool.regenerate_descriptor_table();
    pool.regenerate_descriptor_table();
    assert_eq!(pool.upload_queue().len(), 1);
    drain(&pool);
    pool.regenerate_descriptor_table();
    assert_eq!(pool.upload_queue().len(), 1);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn zero_capacity_pool_is_inert() {
    let pool = pool(0);
    assert!(pool.allocate_handle().is_none());
    pool.regenerate_descriptor_table();
    assert!(pool.upload_queue().is_empty());
    pool.advance_frame();
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn bind_uses_the_latest_table() {
    let pool = pool(2);
    let _fallback = resident(&pool, 1);
    let first = rebuild(&pool).unwrap();
    let _second = resident(&pool, 2);
    let second = rebuild(&pool).unwrap();
    assert_ne!(first, second);

    let mut pass = NopRenderPass::default();
    pool.bind(&mut pass, 3);
    assert_eq!(pass.bound(), &[(3, second)]);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn staging_is_released_on_the_next_clean() {
    let pool = pool(1);
    let _handle = resident(&pool, 5);
    assert_eq!(pool.device().live_textures(), 2);
    pool.advance_frame();
    assert_eq!(pool.device().live_textures(), 1);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn disposal_waits_five_cleans() {
    let pool = pool(2);
    let _fallback = resident(&pool, 0);
    let doomed = resident(&pool, 1);
    let slot = doomed.id();
    // let the idle window from creation run out and release staging
    for _ in 0..5 {
        pool.advance_frame();
    }
    assert_eq!(pool.device().live_textures(), 2);
    rebuild(&pool);
    assert!(!pool.is_dirty());

    doomed.dispose();
    assert_eq!(pool.slot_state(slot), HandleState::Disposing);
    assert_eq!(pool.pending_disposals(), 1);
    assert!(pool.is_dirty());
    for _ in 0..4 {
        frame(&pool);
        assert_eq!(pool.pending_disposals(), 1);
        assert_eq!(pool.device().live_textures(), 2);
    }
    frame(&pool);
    assert_eq!(pool.pending_disposals(), 0);
    assert_eq!(pool.device().live_textures(), 1);
    assert_eq!(pool.slot_state(slot), HandleState::Empty);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn second_disposal_restarts_the_window() {
    let pool = pool(3);
    let _fallback = resident(&pool, 0);
    let first = resident(&pool, 1);
    let second = resident(&pool, 2);

    first.dispose();
    for _ in 0..3 {
        pool.advance_frame();
    }
    second.dispose();
    for _ in 0..4 {
        pool.advance_frame();
        assert_eq!(pool.pending_disposals(), 2);
    }
    pool.advance_frame();
    assert_eq!(pool.pending_disposals(), 0);
    assert_eq!(pool.device().live_textures(), 1);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn table_stays_dirty_while_a_disposal_is_pending() {
    let pool = pool(2);
    let _fallback = resident(&pool, 0);
    let doomed = resident(&pool, 1);
    doomed.dispose();
    for _ in 0..4 {
        rebuild(&pool);
        pool.advance_frame();
        assert!(pool.is_dirty());
    }
    rebuild(&pool);
    pool.advance_frame();
    assert!(!pool.is_dirty());
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn refilling_retires_the_old_texture() {
    let pool = pool(1);
    let mut handle = resident(&pool, 0);
    handle.fill_with_color(Unorm4::default()).unwrap();
    // the old texture keeps serving until the new upload lands
    assert_eq!(handle.state(), HandleState::Staged);
    assert_eq!(pool.pending_disposals(), 0);
    drain(&pool);
    assert!(handle.is_resident());
    assert_eq!(pool.pending_disposals(), 1);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn dropping_the_pool_destroys_everything() {
    let device = Arc::new(NopDevice::new());
    let pool = TexturePoolBuilder::new("teardown", 2)
        .with_disposal_delay(3)
        .build(device.clone())
        .unwrap();
    let kept = resident(&pool, 0);
    let disposed = resident(&pool, 1);
    // disposing destroys staging at once and parks the resident texture
    disposed.dispose();
    assert_eq!(device.live_textures(), 3);
    drop(kept);
    drop(pool);
    assert_eq!(device.live_textures(), 0);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn stale_table_holds_disposed_textures() {
    let pool = pool(2);
    let fallback = resident(&pool, 0);
    let _other = resident(&pool, 1);
    let old_fallback = rebuild(&pool).unwrap()[0];

    // with slot 0 empty every rebuild is refused and the old table stays bound
    fallback.dispose();
    for _ in 0..6 {
        frame(&pool);
    }
    assert_eq!(pool.pending_disposals(), 1);
    let mut pass = NopRenderPass::default();
    pool.bind(&mut pass, 0);
    let destroyed = pool.device().destroyed_textures();
    for id in &pass.bound()[0].1 {
        assert!(!destroyed.contains(id), "bound table names destroyed {id:?}");
        assert!(pool.device().texture_bytes(*id, 0).is_some());
    }

    // once a table without it is built, the held texture goes after a normal window
    let _replacement = resident(&pool, 2);
    for _ in 0..5 {
        frame(&pool);
    }
    assert_eq!(pool.pending_disposals(), 0);
    assert!(pool.device().destroyed_textures().contains(&old_fallback));
    let entries = pool.with_descriptor_table(|t| t.unwrap().entries().to_vec());
    assert!(!entries.contains(&old_fallback));
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn skipped_rebuilds_hold_disposals() {
    let pool = pool(2);
    let _fallback = resident(&pool, 0);
    let doomed = resident(&pool, 1);
    rebuild(&pool);
    doomed.dispose();
    // the frontend never rebuilds, so the bound table keeps naming the texture
    for _ in 0..10 {
        pool.advance_frame();
    }
    assert_eq!(pool.pending_disposals(), 1);
    rebuild(&pool);
    for _ in 0..5 {
        pool.advance_frame();
    }
    assert_eq!(pool.pending_disposals(), 0);
}
