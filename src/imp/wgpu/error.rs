// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use crate::pixel_formats::PixelFormat;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("pixel format {0:?} has no wgpu equivalent")]
    UnsupportedFormat(PixelFormat),
    #[error("texture {0:?} is resident and cannot be mapped")]
    NotStaging(String),
    #[error("texture {0:?} is a staging texture and cannot be sampled or copied into")]
    NotResident(String),
    #[error("subresource {subresource} out of range ({count} subresources)")]
    SubresourceOutOfRange { subresource: u32, count: u32 },
}
