//! Constrained DNA reconstruction for frame-shift segments.
//!
//! A frame-shift annotation claims that some DNA behind the reference
//! residues, read out of register, produced the sample residues. This
//! module materialises that claim: for a reported segment it derives, per
//! DNA position, the set of bases consistent with both protein sequences
//! and the shift kind, and writes each set as an IUPAC ambiguity code.

use crate::frameshift::FrameShiftTable;
use crate::frameshift::{codon_forward_1, codon_forward_2, codon_reverse, codon_reverse_1, codon_reverse_2};
use crate::sequence::AMBIGUITY_ALPHABET;
use crate::variant::FrameShiftMask;

/// The reconstructed DNA evidence for one frame-shift segment.
///
/// Both strings are three bases per residue; positions with no consistent
/// base map to `x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackTranslation {
    /// Constrained reference DNA, as IUPAC ambiguity codes.
    pub reference_dna: Vec<u8>,
    /// Constrained sample DNA, as IUPAC ambiguity codes.
    pub sample_dna: Vec<u8>,
}

/// OR the base sets of one codon into three consecutive positions.
fn or_codon(bits: &mut [u8], at: usize, codon: usize) {
    bits[at] |= 1 << (codon >> 4);
    bits[at + 1] |= 1 << ((codon >> 2) & 0x3);
    bits[at + 2] |= 1 << (codon & 0x3);
}

/// Reconstruct the DNA consistent with a frame-shift segment of `length`
/// residues starting at `reference_start` / `sample_start`.
///
/// For the forward kinds the sample codon at a position is derived from
/// the reference codons at that position and the next; the reverse kinds
/// read the opposite strand, so their sample contribution is written
/// mirror-wise from the end of the segment.
#[allow(clippy::too_many_arguments)]
pub fn backtranslate(
    table: &FrameShiftTable,
    reference: &[u8],
    reference_start: usize,
    sample: &[u8],
    sample_start: usize,
    length: usize,
    kind: FrameShiftMask,
) -> BackTranslation {
    let mut reference_bits = vec![0u8; 3 * length];
    let mut sample_bits = vec![0u8; 3 * length];

    for p in 0..length {
        let reference_codons = table.codons(reference[reference_start + p]);
        // The last pair reaches one past the segment; an unassigned byte
        // has no codons and contributes nothing.
        let next_codons = table.codons(
            reference
                .get(reference_start + p + 1)
                .copied()
                .unwrap_or(0),
        );
        let forward_sample = table.codons(sample[sample_start + p]);
        let reverse_sample = table.codons(sample[sample_start + length - p - 1]);
        let mirror = (length - p) * 3 - 3;

        for i in 0..64 {
            if reference_codons >> i & 1 == 0 {
                continue;
            }
            let reverse = codon_reverse(i);
            if kind.contains(FrameShiftMask::REVERSE) && reverse_sample >> reverse & 1 == 1 {
                or_codon(&mut reference_bits, p * 3, i);
                or_codon(&mut sample_bits, mirror, reverse);
            }

            for j in 0..64 {
                if next_codons >> j & 1 == 0 {
                    continue;
                }
                let forward_1 = codon_forward_1(i, j);
                let forward_2 = codon_forward_2(i, j);
                let reverse_1 = codon_reverse_1(i, j);
                let reverse_2 = codon_reverse_2(i, j);

                if kind.contains(FrameShiftMask::FORWARD_1) && forward_sample >> forward_1 & 1 == 1
                {
                    or_codon(&mut reference_bits, p * 3, i);
                    or_codon(&mut sample_bits, p * 3, forward_1);
                }
                if kind.contains(FrameShiftMask::FORWARD_2) && forward_sample >> forward_2 & 1 == 1
                {
                    or_codon(&mut reference_bits, p * 3, i);
                    or_codon(&mut sample_bits, p * 3, forward_2);
                }
                if kind.contains(FrameShiftMask::REVERSE_1) && reverse_sample >> reverse_1 & 1 == 1
                {
                    or_codon(&mut reference_bits, p * 3, i);
                    or_codon(&mut sample_bits, mirror, reverse_1);
                }
                if kind.contains(FrameShiftMask::REVERSE_2) && reverse_sample >> reverse_2 & 1 == 1
                {
                    or_codon(&mut reference_bits, p * 3, i);
                    or_codon(&mut sample_bits, mirror, reverse_2);
                }
            }
        }
    }

    BackTranslation {
        reference_dna: reference_bits
            .iter()
            .map(|&bits| AMBIGUITY_ALPHABET[bits as usize])
            .collect(),
        sample_dna: sample_bits
            .iter()
            .map(|&bits| AMBIGUITY_ALPHABET[bits as usize])
            .collect(),
    }
}
