//! End-to-end DNA extraction tests.
//!
//! Each case checks the produced variant list both structurally (the
//! expected operations in order) and against the core contract: the list
//! tiles reference and sample without gaps or overlaps, and replaying the
//! sample-side content reproduces the observed sequence.

use ferro_extract::{extract_dna, reverse_complement, Extraction, Variant, VariantKind};

const REFERENCE: &[u8] = b"ACGTCGATTCGCTAGCTTCGGGGGATAGATAGAGATATAGAGAT";

/// The covering variants: everything except frame-shift annotations.
fn covering(extraction: &Extraction) -> Vec<&Variant> {
    extraction
        .variants
        .iter()
        .filter(|v| !v.kind.contains(VariantKind::FRAME_SHIFT))
        .collect()
}

/// Assert the coverage contract: the list tiles both sequences in order.
fn assert_tiles(reference: &[u8], sample: &[u8], extraction: &Extraction) {
    let mut reference_position = 0;
    let mut sample_position = 0;
    for variant in covering(extraction) {
        assert_eq!(
            variant.reference_start, reference_position,
            "gap or overlap in reference coverage"
        );
        assert_eq!(
            variant.sample_start, sample_position,
            "gap or overlap in sample coverage"
        );
        reference_position = variant.reference_end;
        sample_position = variant.sample_end;
    }
    assert_eq!(reference_position, reference.len());
    assert_eq!(sample_position, sample.len());
}

/// Assert that concatenating sample-side content reproduces the sample and
/// that every match-flavoured variant is truthful about its content.
fn assert_reconstructs(reference: &[u8], sample: &[u8], extraction: &Extraction) {
    let mut rebuilt = Vec::new();
    for variant in covering(extraction) {
        rebuilt.extend_from_slice(&sample[variant.sample_start..variant.sample_end]);

        if variant.is_transposition() {
            let source = &reference[variant.transposition_start..variant.transposition_end];
            let content = &sample[variant.sample_start..variant.sample_end];
            if variant.kind.contains(VariantKind::REVERSE_COMPLEMENT) {
                assert_eq!(content, reverse_complement(source).as_slice());
            } else {
                assert_eq!(content, source);
            }
        } else if variant.kind.contains(VariantKind::IDENTITY) {
            assert_eq!(
                &reference[variant.reference_start..variant.reference_end],
                &sample[variant.sample_start..variant.sample_end]
            );
        } else if variant.kind.contains(VariantKind::REVERSE_COMPLEMENT) {
            let window = &reference[variant.reference_start..variant.reference_end];
            assert_eq!(
                &sample[variant.sample_start..variant.sample_end],
                reverse_complement(window).as_slice()
            );
        }
    }
    assert_eq!(rebuilt, sample);
}

fn check(reference: &[u8], sample: &[u8]) -> Extraction {
    let extraction = extract_dna(reference, sample);
    assert_tiles(reference, sample, &extraction);
    assert_reconstructs(reference, sample, &extraction);
    extraction
}

#[test]
fn test_no_variants() {
    let extraction = check(REFERENCE, REFERENCE);
    assert_eq!(extraction.weight, 0);
    assert_eq!(extraction.variants.len(), 1);
    assert_eq!(extraction.variants[0], Variant::identity(0, 44, 0, 44));
}

#[test]
fn test_single_substitution() {
    // 7A>G
    let sample = b"ACGTCGGTTCGCTAGCTTCGGGGGATAGATAGAGATATAGAGAT";
    let extraction = check(REFERENCE, sample);
    let kinds: Vec<VariantKind> = extraction.variants.iter().map(|v| v.kind).collect();
    assert_eq!(
        kinds,
        vec![
            VariantKind::IDENTITY,
            VariantKind::SUBSTITUTION,
            VariantKind::IDENTITY
        ]
    );
    let snp = &extraction.variants[1];
    assert_eq!((snp.reference_start, snp.reference_end), (6, 7));
    assert_eq!((snp.sample_start, snp.sample_end), (6, 7));
}

#[test]
fn test_snp_bracketed_by_identity() {
    let extraction = check(b"ATAGATGATAGATAGATAGAT", b"ATAGATGATTGATAGATAGAT");
    assert_eq!(extraction.variants.len(), 3);
    assert_eq!(extraction.variants[0], Variant::identity(0, 9, 0, 9));
    let snp = &extraction.variants[1];
    assert_eq!(snp.kind, VariantKind::SUBSTITUTION);
    assert_eq!((snp.reference_start, snp.reference_end), (9, 10));
    assert_eq!(extraction.variants[2], Variant::identity(10, 21, 10, 21));
}

#[test]
fn test_single_deletion() {
    // 7del
    let sample = b"ACGTCGTTCGCTAGCTTCGGGGGATAGATAGAGATATAGAGAT";
    let extraction = check(REFERENCE, sample);
    let deletions: Vec<&Variant> = extraction
        .variants
        .iter()
        .filter(|v| v.kind.contains(VariantKind::SUBSTITUTION))
        .collect();
    assert_eq!(deletions.len(), 1);
    assert_eq!(deletions[0].sample_len(), 0);
    assert_eq!(deletions[0].reference_len(), 1);
}

#[test]
fn test_multi_base_deletion() {
    // 7_8del
    let sample = b"ACGTCGTCGCTAGCTTCGGGGGATAGATAGAGATATAGAGAT";
    let extraction = check(REFERENCE, sample);
    let deletions: Vec<&Variant> = extraction
        .variants
        .iter()
        .filter(|v| v.kind.contains(VariantKind::SUBSTITUTION))
        .collect();
    assert_eq!(deletions.len(), 1);
    assert_eq!(deletions[0].sample_len(), 0);
    assert_eq!(deletions[0].reference_len(), 2);
}

#[test]
fn test_single_insertion() {
    // 6_7insC
    let sample = b"ACGTCGCATTCGCTAGCTTCGGGGGATAGATAGAGATATAGAGAT";
    let extraction = check(REFERENCE, sample);
    let insertions: Vec<&Variant> = extraction
        .variants
        .iter()
        .filter(|v| v.kind.contains(VariantKind::SUBSTITUTION))
        .collect();
    assert_eq!(insertions.len(), 1);
    assert_eq!(insertions[0].reference_len(), 0);
    assert_eq!(insertions[0].sample_len(), 1);
}

#[test]
fn test_insertion_between_identities() {
    let extraction = check(b"AAAAAAAA", b"AAAACCAAAA");
    assert_eq!(extraction.variants.len(), 3);
    assert_eq!(extraction.variants[0], Variant::identity(0, 4, 0, 4));
    let insertion = &extraction.variants[1];
    assert_eq!(insertion.kind, VariantKind::SUBSTITUTION);
    assert_eq!(
        (insertion.reference_start, insertion.reference_end),
        (4, 4)
    );
    assert_eq!((insertion.sample_start, insertion.sample_end), (4, 6));
    assert_eq!(extraction.variants[2], Variant::identity(4, 8, 6, 10));
}

#[test]
fn test_deletion_of_interior_repeat() {
    // The middle GTAC of ACGTGTACACGT is absent from the sample.
    let extraction = check(b"ACGTGTACACGT", b"ACGTACGT");
    assert_eq!(extraction.variants.len(), 3);
    assert_eq!(extraction.variants[0], Variant::identity(0, 4, 0, 4));
    let deletion = &extraction.variants[1];
    assert_eq!(deletion.kind, VariantKind::SUBSTITUTION);
    assert_eq!((deletion.reference_start, deletion.reference_end), (4, 8));
    assert_eq!((deletion.sample_start, deletion.sample_end), (4, 4));
    assert_eq!(extraction.variants[2], Variant::identity(8, 12, 4, 8));
}

#[test]
fn test_deletion_weight() {
    // weight_position + del + weight_position + separator, with
    // weight_position = 1 for an 8-base reference.
    let extraction = check(b"ACGTACGT", b"");
    assert_eq!(extraction.variants.len(), 1);
    assert_eq!(extraction.weight, 6);
}

#[test]
fn test_empty_reference_is_insertion() {
    let extraction = check(b"", b"ACGT");
    assert_eq!(extraction.variants.len(), 1);
    assert_eq!(extraction.variants[0].kind, VariantKind::SUBSTITUTION);
    assert_eq!(extraction.variants[0].sample_len(), 4);
}

#[test]
fn test_empty_both() {
    let extraction = check(b"", b"");
    assert!(extraction.variants.is_empty());
    assert_eq!(extraction.weight, 0);
}

#[test]
fn test_whole_sequence_reverse_complement() {
    let reference = b"ATAGATAGATAGATAG";
    let sample = reverse_complement(reference);
    let extraction = check(reference, &sample);
    assert_eq!(extraction.variants.len(), 1);
    let inversion = &extraction.variants[0];
    assert_eq!(inversion.kind, VariantKind::REVERSE_COMPLEMENT);
    assert_eq!(
        (inversion.reference_start, inversion.reference_end),
        (0, 16)
    );
    assert_eq!((inversion.sample_start, inversion.sample_end), (0, 16));
}

#[test]
fn test_interior_inversion() {
    // 7_11inv from the original test corpus.
    let sample = b"ACGTCGCGAATCTAGCTTCGGGGGATAGATAGAGATATAGAGAT";
    let extraction = check(REFERENCE, sample);
    assert!(extraction
        .variants
        .iter()
        .any(|v| v.kind.contains(VariantKind::REVERSE_COMPLEMENT)));
}

#[test]
fn test_delins() {
    // 21_23delinsTTTT
    let sample = b"ACGTCGATTCGCTAGCTTCGTTTTGATAGATAGAGATATAGAGAT";
    let extraction = check(REFERENCE, sample);
    let changes: Vec<&Variant> = extraction
        .variants
        .iter()
        .filter(|v| v.kind.contains(VariantKind::SUBSTITUTION))
        .collect();
    assert!(!changes.is_empty());
}

#[test]
fn test_trivial_weight_bound() {
    // However the recursion decomposes, the total weight may never exceed
    // describing the whole change as a single delins.
    let cases: [(&[u8], &[u8]); 4] = [
        (REFERENCE, b"ACGTCGCGAATCTAGCTTCGGGGGATAGATAGAGATATAGAGAT"),
        (b"ACGTGTACACGT", b"ACGTACGT"),
        (b"AAAAAAAA", b"AAAACCAAAA"),
        (b"TTGACCAGTCAGCAT", b"TTGAGGGGGGGGCAT"),
    ];
    for (reference, sample) in cases {
        let extraction = check(reference, sample);
        let wp = extraction.weight_position;
        let trivial = wp
            + 6
            + sample.len() as u64
            + if reference.len() != 1 { wp + 1 } else { 0 };
        assert!(
            extraction.weight <= trivial,
            "weight {} exceeds trivial {}",
            extraction.weight,
            trivial
        );
    }
}

#[test]
fn test_transposition_run_is_balanced() {
    // A long inserted region copied from elsewhere in the reference is
    // quoted by coordinates, bracketed by OPEN and CLOSE tags.
    let segment = b"TTGACCAGTCAGCATTGCAC";
    let mut reference = Vec::new();
    reference.extend_from_slice(b"AAAACCCCGGGG");
    reference.extend_from_slice(segment);
    reference.extend_from_slice(b"TGTGTGTGTGTG");
    let mut sample = reference.clone();
    let insertion: Vec<u8> = segment.to_vec();
    for (offset, base) in insertion.into_iter().enumerate() {
        sample.insert(6 + offset, base);
    }

    let extraction = check(&reference, &sample);

    let mut depth = 0i32;
    let mut seen_run = false;
    for variant in &extraction.variants {
        if variant.kind.contains(VariantKind::TRANSPOSITION_OPEN) {
            depth += 1;
            seen_run = true;
        }
        if variant.kind.contains(VariantKind::TRANSPOSITION_CLOSE) {
            depth -= 1;
        }
        assert!(depth >= 0, "CLOSE before OPEN");
    }
    assert_eq!(depth, 0, "unbalanced transposition run");
    assert!(seen_run);
}

#[test]
fn test_masked_region_never_reported_as_content() {
    let reference = b"ACGTAC$$$$GTACGT";
    let sample = b"ACGTACGTACGT";
    let extraction = extract_dna(reference, sample);
    for variant in &extraction.variants {
        if variant.kind.contains(VariantKind::SUBSTITUTION) {
            let content = &reference[variant.reference_start..variant.reference_end];
            assert!(!content.contains(&b'$'));
        }
    }
}
