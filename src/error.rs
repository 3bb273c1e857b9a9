// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Crate-wide error type.

use crate::pixel_formats::container_codes::{ConsoleFormat, DxgiFormat, FourCC};

/// Errors raised by a single fill or decode operation.
///
/// None of these corrupt the pool. A handle whose fill failed stays `Empty`, and the
/// descriptor table substitutes the fallback texture for its slot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported DDS FourCC tag {0}")]
    UnsupportedFourCC(FourCC),
    #[error("unsupported DXGI format {0}")]
    UnsupportedDxgiFormat(DxgiFormat),
    #[error("unsupported console texture format {0}")]
    UnsupportedConsoleFormat(ConsoleFormat),
    #[error("texture payload truncated: needed {needed} bytes, {available} available")]
    TruncatedPayload { needed: usize, available: usize },
    #[error("GPU device error: {0}")]
    Device(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    pub(crate) fn device<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
        Error::Device(Box::new(e))
    }
}
