// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Raw format identifiers as they appear in container headers.

use crate::error::Error;
use crate::swizzle::SwizzleLayout;
use std::fmt::{Display, Formatter};

/// A four-byte DDS pixel format tag, e.g. `DXT1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    /// Builds a tag from the little-endian `u32` stored in a DDS header.
    pub const fn from_u32(value: u32) -> Self {
        FourCC(value.to_le_bytes())
    }
}

impl Display for FourCC {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for b in self.0 {
            if b.is_ascii_graphic() {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}

/// A DXGI_FORMAT numeric code from a DDS extended header or a console container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DxgiFormat(pub u32);

macro_rules! dxgi_codes {
    ($($name:ident = $value:literal,)*) => {
        #[allow(missing_docs)]
        impl DxgiFormat {
            $(pub const $name: DxgiFormat = DxgiFormat($value);)*

            /// The DXGI_FORMAT_ suffix for codes this crate knows about.
            pub const fn name(self) -> Option<&'static str> {
                match self.0 {
                    $($value => Some(stringify!($name)),)*
                    _ => None,
                }
            }
        }
    };
}

dxgi_codes! {
    R8G8B8A8_TYPELESS = 27,
    R8G8B8A8_UNORM = 28,
    R8G8B8A8_UNORM_SRGB = 29,
    BC1_TYPELESS = 70,
    BC1_UNORM = 71,
    BC1_UNORM_SRGB = 72,
    BC2_TYPELESS = 73,
    BC2_UNORM = 74,
    BC2_UNORM_SRGB = 75,
    BC3_TYPELESS = 76,
    BC3_UNORM = 77,
    BC3_UNORM_SRGB = 78,
    BC4_TYPELESS = 79,
    BC4_UNORM = 80,
    BC4_SNORM = 81,
    BC5_TYPELESS = 82,
    BC5_UNORM = 83,
    BC5_SNORM = 84,
    B5G5R5A1_UNORM = 86,
    B8G8R8A8_UNORM = 87,
    B8G8R8X8_UNORM = 88,
    B8G8R8A8_TYPELESS = 90,
    B8G8R8A8_UNORM_SRGB = 91,
    B8G8R8X8_TYPELESS = 92,
    B8G8R8X8_UNORM_SRGB = 93,
    BC6H_TYPELESS = 94,
    BC6H_UF16 = 95,
    BC6H_SF16 = 96,
    BC7_TYPELESS = 97,
    BC7_UNORM = 98,
    BC7_UNORM_SRGB = 99,
}

impl Display for DxgiFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name} ({})", self.0),
            None => write!(f, "{}", self.0),
        }
    }
}

/// The console container's own format byte.
///
/// The GPU-visible encoding of a console texture comes from its [`DxgiFormat`]; this byte only
/// decides how the payload was tiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConsoleFormat(pub u8);

impl ConsoleFormat {
    /// 8-byte-per-texel uncompressed tiles.
    pub const RGBA16_FLOAT: ConsoleFormat = ConsoleFormat(22);
    /// 4-byte-per-texel uncompressed tiles.
    pub const RGBA8: ConsoleFormat = ConsoleFormat(105);

    /// Size in bytes of one swizzle unit: a compressed block, or a texel for the
    /// uncompressed codes.
    pub fn block_size(self) -> Result<u32, Error> {
        match self.0 {
            105 => Ok(4),
            0 | 1 | 22 | 25 | 103 | 108 | 109 => Ok(8),
            5 | 100 | 102 | 106 | 107 | 110 => Ok(16),
            _ => Err(Error::UnsupportedConsoleFormat(self)),
        }
    }

    /// The tiling this code's payload was written with.
    pub fn swizzle_layout(self) -> Result<SwizzleLayout, Error> {
        let unit_bytes = self.block_size()?;
        Ok(match self {
            ConsoleFormat::RGBA8 => SwizzleLayout::texel_quads(unit_bytes, 16),
            ConsoleFormat::RGBA16_FLOAT => SwizzleLayout::texel_quads(unit_bytes, 8),
            _ => SwizzleLayout::blocks(unit_bytes),
        })
    }
}

impl Display for ConsoleFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
