//! Fuzz target for the extraction entry point
//!
//! Feeds arbitrary byte pairs through every sequence kind and checks the
//! coverage contract. The extractor must never panic, and the produced
//! list must tile both inputs whenever no mask byte is involved.

#![no_main]

use arbitrary::Arbitrary;
use ferro_extract::{Extractor, SequenceKind, VariantKind, MASK};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct ExtractInput {
    reference: Vec<u8>,
    sample: Vec<u8>,
    kind_code: i32,
}

fuzz_target!(|input: ExtractInput| {
    // Quadratic LCS fallback makes very long unrelated inputs slow;
    // diminishing returns past this size.
    if input.reference.len() > 512 || input.sample.len() > 512 {
        return;
    }

    let extractor = Extractor::with_defaults();
    let kind = SequenceKind::from_code(input.kind_code);
    let result = extractor.extract(&input.reference, &input.sample, kind);

    let masked =
        input.reference.contains(&MASK) || input.sample.contains(&MASK);
    if masked {
        return;
    }

    let mut reference_position = 0;
    let mut sample_position = 0;
    for variant in result
        .variants
        .iter()
        .filter(|v| !v.kind.contains(VariantKind::FRAME_SHIFT))
    {
        assert_eq!(variant.reference_start, reference_position);
        assert_eq!(variant.sample_start, sample_position);
        reference_position = variant.reference_end;
        sample_position = variant.sample_end;
    }
    assert_eq!(reference_position, input.reference.len());
    assert_eq!(sample_position, input.sample.len());
});
