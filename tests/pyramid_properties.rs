//! Property-based tests for the zoom pyramid and tile range resolution

use proptest::prelude::*;
use tabix_tiler::core::{PyramidMetadata, TileRequest};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// max_width is the smallest power of two covering the genome
    #[test]
    fn prop_max_width_power_of_two(total in 1u64..(1u64 << 50), tile_size in 1u64..=4096) {
        let meta = PyramidMetadata::compute(total, tile_size).unwrap();

        prop_assert!(meta.max_width.is_power_of_two());
        prop_assert!(meta.max_width >= total);
        if meta.max_width > 1 {
            prop_assert!(meta.max_width / 2 < total);
        }
        prop_assert_eq!(meta.min_pos, 0);
        prop_assert_eq!(meta.max_pos, total);
    }

    /// max_zoom is the smallest zoom whose tiles of tile_size bins cover the genome
    #[test]
    fn prop_max_zoom_minimal(total in 1u64..(1u64 << 50), tile_size in 1u64..=4096) {
        let meta = PyramidMetadata::compute(total, tile_size).unwrap();
        let covered = |z: u32| (tile_size as u128) << z;

        prop_assert!(covered(meta.max_zoom) >= total as u128);
        if meta.max_zoom > 0 {
            prop_assert!(covered(meta.max_zoom - 1) < total as u128);
        }
    }

    /// The root tile spans [0, max_width)
    #[test]
    fn prop_root_tile(total in 1u64..(1u64 << 40)) {
        let meta = PyramidMetadata::compute(total, 1024).unwrap();
        let interval = meta.resolve(TileRequest::new(0, 0));
        prop_assert_eq!(interval.start, 0.0);
        prop_assert_eq!(interval.end, meta.max_width as f64);
    }

    /// Tiles of one zoom level partition [0, max_width) without gaps or overlaps
    #[test]
    fn prop_tiles_partition_width(total in 1u64..(1u64 << 40), zoom in 0u32..12) {
        let meta = PyramidMetadata::compute(total, 1024).unwrap();
        let count = meta.tiles_at(zoom) as u64;

        let mut expected_start = 0.0;
        for index in 0..count {
            let interval = meta.resolve(TileRequest::new(zoom, index));
            prop_assert_eq!(interval.start, expected_start);
            prop_assert!(interval.end > interval.start);
            prop_assert_eq!(interval.width(), meta.tile_width(zoom));
            expected_start = interval.end;
        }
        prop_assert_eq!(expected_start, meta.max_width as f64);
    }

    /// Tile ids round-trip through their "z.x" form
    #[test]
    fn prop_tile_id_round_trip(zoom in 0u32..40, index in any::<u64>()) {
        let request = TileRequest::new(zoom, index);
        prop_assert_eq!(TileRequest::parse(&request.tile_id()), Some(request));
    }

    /// Ids with a non-integer part are rejected
    #[test]
    fn prop_tile_id_rejects_garbage(zoom in "[a-z]{1,4}", index in 0u64..1000) {
        let id = format!("{}.{}", zoom, index);
        prop_assert!(TileRequest::parse(&id).is_none());
    }
}

#[test]
fn test_single_chromosome_example() {
    // ceil(log2(1000 / 1024)) rounds to zero
    let meta = PyramidMetadata::compute(1000, 1024).unwrap();
    assert_eq!(meta.max_zoom, 0);
    assert_eq!(meta.max_width, 1024);
}

#[test]
fn test_small_genome_zoom_clamps_at_zero() {
    let meta = PyramidMetadata::compute(10, 1024).unwrap();
    assert_eq!(meta.max_zoom, 0);
    assert_eq!(meta.max_width, 16);
}

#[test]
fn test_invalid_inputs() {
    assert!(PyramidMetadata::compute(0, 1024).is_err());
    assert!(PyramidMetadata::compute(100, 0).is_err());
}
