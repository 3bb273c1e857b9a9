// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Deswizzling permutes bytes: nothing is lost, duplicated or invented, and swizzling undoes it.

use bindless_textures::pixel_formats::container_codes::ConsoleFormat;
use bindless_textures::swizzle::{self, SwizzleLayout};

const CODES: [u8; 14] = [0, 1, 5, 22, 25, 100, 102, 103, 105, 106, 107, 108, 109, 110];

/// Every unit starts with its storage index, so a unit can be traced after moving.
fn tagged(len: usize, unit_bytes: usize) -> Vec<u8> {
    (0..len)
        .map(|i| {
            let unit = (i / unit_bytes) as u32;
            let byte = i % unit_bytes;
            if byte < 4 {
                unit.to_le_bytes()[byte]
            } else {
                0xa0 | byte as u8
            }
        })
        .collect()
}

/// Padded dimensions and the row pitch the fill path deswizzles with.
fn geometry(layout: &SwizzleLayout, width: u32, height: u32) -> (usize, u32) {
    let (padded_width, _) = layout.padded_dimensions(width, height);
    (layout.region_size(width, height), layout.units_across(padded_width))
}

fn round_trip(format: ConsoleFormat, width: u32, height: u32) {
    let layout = format.swizzle_layout().unwrap();
    let (region, pitch) = geometry(&layout, width, height);
    let input = tagged(region, layout.unit_bytes() as usize);

    let mut linear = vec![0; region];
    let consumed = swizzle::deswizzle(width, height, format, pitch, &input, &mut linear).unwrap();
    assert_eq!(consumed, input.len(), "{format} {width}x{height} consumed");

    let mut sorted_in = input.clone();
    let mut sorted_out = linear.clone();
    sorted_in.sort_unstable();
    sorted_out.sort_unstable();
    assert_eq!(sorted_in, sorted_out, "{format} {width}x{height} is not a permutation");

    let mut back = vec![0; region];
    let written = layout.swizzle(width, height, pitch, &linear, &mut back).unwrap();
    assert_eq!(written, region);
    assert_eq!(back, input, "{format} {width}x{height} did not round trip");
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn every_code_is_a_bijection() {
    for code in CODES {
        let format = ConsoleFormat(code);
        for (width, height) in [(32, 32), (64, 64), (128, 32), (32, 96)] {
            round_trip(format, width, height);
        }
    }
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn partial_tiles_pad_to_whole_tiles() {
    for code in [0, 5, 22, 105] {
        let format = ConsoleFormat(code);
        for (width, height) in [(4, 4), (40, 12), (100, 100), (1, 1)] {
            round_trip(format, width, height);
        }
    }
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn units_move_whole() {
    let format = ConsoleFormat(5);
    let layout = format.swizzle_layout().unwrap();
    let (region, pitch) = geometry(&layout, 64, 64);
    let input = tagged(region, 16);
    let mut linear = vec![0; region];
    layout.deswizzle(64, 64, pitch, &input, &mut linear).unwrap();
    for unit in linear.chunks_exact(16) {
        let index = u32::from_le_bytes([unit[0], unit[1], unit[2], unit[3]]) as usize;
        assert_eq!(unit, &input[index * 16..index * 16 + 16]);
    }
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn region_sizes_follow_the_tile_edge() {
    // blocks tile at 32 texels, RGBA8 at 16, RGBA16F at 8
    assert_eq!(ConsoleFormat(0).swizzle_layout().unwrap().region_size(40, 12), 16 * 8 * 8);
    assert_eq!(ConsoleFormat::RGBA8.swizzle_layout().unwrap().region_size(40, 12), 48 * 16 * 4);
    assert_eq!(
        ConsoleFormat::RGBA16_FLOAT.swizzle_layout().unwrap().region_size(40, 12),
        40 * 16 * 8
    );
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn unknown_codes_are_rejected() {
    let mut out = [0; 64];
    assert!(swizzle::deswizzle(8, 8, ConsoleFormat(2), 2, &[0; 64], &mut out).is_err());
}
