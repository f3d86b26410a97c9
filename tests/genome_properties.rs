//! Property-based tests for the absolute coordinate system
//!
//! Offsets are prefix sums of the chromosome lengths, in input order.

use proptest::prelude::*;
use tabix_tiler::core::{parse_chrom_sizes, CoordinateSystem};

/// Generate an ordered chromosome list (lengths may be zero)
fn arb_genome() -> impl Strategy<Value = Vec<(String, u64)>> {
    prop::collection::vec(0u64..2_000_000, 1..30).prop_map(|lengths| {
        lengths
            .into_iter()
            .enumerate()
            .map(|(i, len)| (format!("chr{}", i + 1), len))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Total length is the sum of all chromosome lengths
    #[test]
    fn prop_total_length_is_sum(genome in arb_genome()) {
        let expected: u64 = genome.iter().map(|(_, len)| len).sum();
        let coords = CoordinateSystem::build(genome).unwrap();
        prop_assert_eq!(coords.total_length(), expected);
    }

    /// Offsets start at zero and each one ends where the next begins
    #[test]
    fn prop_offsets_are_contiguous(genome in arb_genome()) {
        let coords = CoordinateSystem::build(genome.clone()).unwrap();
        let entries = coords.entries();

        prop_assert_eq!(entries[0].absolute_start, 0);
        for pair in entries.windows(2) {
            prop_assert!(pair[0].absolute_start <= pair[1].absolute_start);
            prop_assert_eq!(pair[0].absolute_start + pair[0].length, pair[1].absolute_start);
        }
        for (i, (entry, (name, len))) in entries.iter().zip(&genome).enumerate() {
            prop_assert_eq!(entry.index, i);
            prop_assert_eq!(&entry.name, name);
            prop_assert_eq!(entry.length, *len);
        }
    }

    /// Local -> absolute -> local is the identity inside non-empty chromosomes
    #[test]
    fn prop_absolute_local_round_trip(genome in arb_genome(), pick in any::<prop::sample::Index>(), frac in 0.0f64..1.0) {
        let coords = CoordinateSystem::build(genome).unwrap();
        let entry = &coords.entries()[pick.index(coords.len())];
        prop_assume!(entry.length > 0);

        let local = ((entry.length as f64 * frac) as u64).min(entry.length - 1);
        let absolute = coords.to_absolute(&entry.name, local).unwrap();
        let (found, found_local) = coords.to_local(absolute).unwrap();

        prop_assert_eq!(&found.name, &entry.name);
        prop_assert_eq!(found_local, local);
    }

    /// Positions at or past the total length are outside the genome
    #[test]
    fn prop_to_local_past_end(genome in arb_genome(), extra in 0u64..1000) {
        let coords = CoordinateSystem::build(genome).unwrap();
        prop_assert!(coords.to_local(coords.total_length() + extra).is_none());
    }

    /// A sizes table parses back to the same ordered list
    #[test]
    fn prop_parse_chrom_sizes(genome in arb_genome()) {
        let text: String = genome
            .iter()
            .map(|(name, len)| format!("{}\t{}\n", name, len))
            .collect();
        let parsed = parse_chrom_sizes(text.as_bytes()).unwrap();
        prop_assert_eq!(parsed, genome);
    }
}

#[test]
fn test_unknown_chromosome() {
    let coords = CoordinateSystem::build([("chr1", 10)]).unwrap();
    assert!(coords.absolute_start_of("chr2").is_err());
    assert!(coords.get("chr2").is_none());
}

#[test]
fn test_parse_rejects_non_numeric_length() {
    assert!(parse_chrom_sizes(&b"chr1\tten\n"[..]).is_err());
}
