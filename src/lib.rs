// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*! bindless_textures manages a fixed-capacity, shader-visible array of textures.

Shaders index one large descriptor table instead of binding a texture per draw. The crate
owns that table and everything around it:

* [`bindings::TexturePool`] hands out [`bindings::TextureHandle`]s, each owning one slot of
  the table. Empty slots show slot 0's texture, so holes never sample garbage.
* Handles are filled from DDS-style containers ([`container::PcTexture`]), from tiled console
  containers ([`container::ConsoleTexture`], untiled by [`swizzle`]), from constant colors, or
  by adopting a texture the application created.
* Uploads run through a staging texture. The pool queues the copy on its
  [`upload::UploadQueue`], which the rendering frontend drains once per frame.
* Disposed textures are kept alive for a few frames so in-flight command lists never see a
  destroyed texture.

# Backends

The pool is generic over [`imp::GpuDevice`]. [`imp::nop::NopDevice`] keeps everything in CPU
memory and is always available. With the default `backend_wgpu` feature, `imp::wgpu::WgpuDevice`
drives [wgpu](https://wgpu.rs); its device must have the features listed by
`WgpuDevice::required_features`.

# Frame protocol

```
use bindless_textures::bindings::TexturePoolBuilder;
use bindless_textures::imp::nop::{NopCommandList, NopDevice, NopRenderPass};
use bindless_textures::pixel_formats::Unorm4;
use std::sync::Arc;

let pool = TexturePoolBuilder::new("materials", 16).build(Arc::new(NopDevice::new())).unwrap();
let mut fallback = pool.allocate_handle().unwrap();
fallback.fill_with_color(Unorm4 { r: 255, g: 0, b: 255, a: 255 }).unwrap();

// once per frame
let mut commands = NopCommandList::default();
pool.upload_queue().drain(pool.device(), &mut commands);
if pool.is_dirty() {
    pool.regenerate_descriptor_table();
    pool.upload_queue().drain(pool.device(), &mut commands);
}
let mut pass = NopRenderPass::default();
pool.bind(&mut pass, 0);
pool.advance_frame();
assert_eq!(pass.bound()[0].1.len(), 16);
```
*/

logwise::declare_logging_domain!();

pub mod bindings;
pub mod container;
mod error;
pub mod imp;
pub mod mip_layout;
pub mod pixel_formats;
pub mod swizzle;
pub mod upload;

pub use error::Error;
