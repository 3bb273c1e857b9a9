// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use crate::container::{PcPixelFormat, PcTexture};
use crate::pixel_formats::container_codes::{DxgiFormat, FourCC};
use ddsfile::Dds;

impl<'a> PcTexture<'a> {
    /// Borrows the header fields and payload of a parsed DDS file.
    pub fn from_dds(dds: &'a Dds) -> Self {
        let spf = &dds.header.spf;
        PcTexture {
            width: dds.get_width(),
            height: dds.get_height(),
            mip_count: dds.get_num_mipmap_levels(),
            pixel_format: PcPixelFormat {
                flags: spf.flags.bits(),
                four_cc: spf
                    .fourcc
                    .as_ref()
                    .map(|f| FourCC::from_u32(f.0))
                    .unwrap_or(FourCC([0; 4])),
                rgb_bit_count: spf.rgb_bit_count.unwrap_or(0),
            },
            dxgi_format: dds
                .header10
                .as_ref()
                .map(|h| DxgiFormat(h.dxgi_format as u32)),
            caps2: dds.header.caps2.bits(),
            data: &dds.data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{DDPF_FOURCC, DDSCAPS2_CUBEMAP};
    use std::io::Cursor;

    /// A minimal DDS file: magic, 124-byte header, payload.
    fn dds_bytes(
        width: u32,
        height: u32,
        mips: u32,
        four_cc: &[u8; 4],
        caps2: u32,
        payload: &[u8],
    ) -> Vec<u8> {
        let mut out = Vec::new();
        let mut put = |v: u32| out.extend_from_slice(&v.to_le_bytes());
        put(0x2053_4444); // "DDS "
        put(124);
        // CAPS | HEIGHT | WIDTH | PIXELFORMAT | MIPMAPCOUNT
        put(0x1 | 0x2 | 0x4 | 0x1000 | 0x20000);
        put(height);
        put(width);
        put(0); // pitch or linear size
        put(0); // depth
        put(mips);
        for _ in 0..11 {
            put(0);
        }
        put(32);
        put(DDPF_FOURCC);
        put(u32::from_le_bytes(*four_cc));
        for _ in 0..5 {
            put(0); // bit count and masks
        }
        put(0x1000 | 0x8 | 0x40_0000); // TEXTURE | COMPLEX | MIPMAP
        put(caps2);
        put(0);
        put(0);
        put(0);
        out.extend_from_slice(payload);
        out
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn reads_header_fields() {
        let bytes = dds_bytes(64, 32, 3, b"DXT5", 0, &[9; 2048 + 512 + 128]);
        let dds = Dds::read(&mut Cursor::new(&bytes)).unwrap();
        let tex = PcTexture::from_dds(&dds);
        assert_eq!((tex.width, tex.height, tex.mip_count), (64, 32, 3));
        assert_eq!(tex.pixel_format.four_cc, FourCC(*b"DXT5"));
        assert_eq!(tex.dxgi_format, None);
        assert!(!tex.is_cubemap());
        assert_eq!(tex.data.len(), 2688);
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn cubemap_flag_survives() {
        // CUBEMAP plus all six face bits
        let bytes = dds_bytes(4, 4, 1, b"DXT1", DDSCAPS2_CUBEMAP | 0xfc00, &[0; 48]);
        let dds = Dds::read(&mut Cursor::new(&bytes)).unwrap();
        assert!(PcTexture::from_dds(&dds).is_cubemap());
    }
}
