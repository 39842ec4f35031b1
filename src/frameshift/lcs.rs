//! Frame-shift longest-common-substring search and extraction.

use super::FrameShiftTable;
use crate::variant::{FrameShiftMask, Variant};
use tracing::trace;

/// A run of sample residues explained by one frame-shift reading of the
/// reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameShiftSubstring {
    /// Start of the explained reference window.
    pub reference_index: usize,
    /// Start of the matching sample run.
    pub sample_index: usize,
    /// Length in residues.
    pub length: usize,
    /// The shift reading(s) supporting the run.
    pub mask: FrameShiftMask,
}

impl FrameShiftSubstring {
    fn empty(mask: FrameShiftMask) -> Self {
        FrameShiftSubstring {
            reference_index: 0,
            sample_index: 0,
            length: 0,
            mask,
        }
    }
}

/// Five-track dynamic programme over the sample window.
///
/// Track 0 chains on forward shift-1 evidence against the reference
/// di-residue at `(j - 1, j)`, track 1 on forward shift-2; tracks 2, 3 and
/// 4 chain on the reverse readings, taking the di-residues from the end of
/// the reference window. Each track independently keeps its longest
/// diagonal chain; exactly five candidates are returned, one per track
/// (zero-length when a track never fired).
pub fn lcs_frame_shift(
    table: &FrameShiftTable,
    reference: &[u8],
    reference_start: usize,
    reference_end: usize,
    sample: &[u8],
    sample_start: usize,
    sample_end: usize,
) -> [FrameShiftSubstring; 5] {
    let reference_length = reference_end - reference_start;
    let sample_length = sample_end - sample_start;

    let mut best = [
        FrameShiftSubstring::empty(FrameShiftMask::FORWARD_1),
        FrameShiftSubstring::empty(FrameShiftMask::FORWARD_2),
        FrameShiftSubstring::empty(FrameShiftMask::REVERSE),
        FrameShiftSubstring::empty(FrameShiftMask::REVERSE_1),
        FrameShiftSubstring::empty(FrameShiftMask::REVERSE_2),
    ];
    if reference_length == 0 || sample_length == 0 {
        return best;
    }

    let mut prev = vec![[0usize; 5]; reference_length];
    let mut curr = vec![[0usize; 5]; reference_length];

    for i in 0..sample_length {
        let s = sample[sample_start + i];

        // The first reference position only supports the plain reverse
        // reading, pairing the last residue with itself.
        curr[0] = [0; 5];
        let shift_reverse = table.shift(reference[reference_end - 1], reference[reference_end - 1], s);
        if shift_reverse.contains(FrameShiftMask::REVERSE) {
            curr[0][2] = 1;
            if curr[0][2] > best[2].length {
                best[2] = FrameShiftSubstring {
                    reference_index: reference_end - 1,
                    sample_index: sample_start + i,
                    length: 1,
                    mask: FrameShiftMask::REVERSE,
                };
            }
        }

        for j in 1..reference_length {
            let forward = table.shift(
                reference[reference_start + j - 1],
                reference[reference_start + j],
                s,
            );
            let reverse = table.shift(
                reference[reference_end - j - 1],
                reference[reference_end - j],
                s,
            );

            curr[j][0] = if forward.contains(FrameShiftMask::FORWARD_1) {
                prev[j - 1][0] + 1
            } else {
                0
            };
            curr[j][1] = if forward.contains(FrameShiftMask::FORWARD_2) {
                prev[j - 1][1] + 1
            } else {
                0
            };
            curr[j][2] = if reverse.contains(FrameShiftMask::REVERSE) {
                prev[j - 1][2] + 1
            } else {
                0
            };
            curr[j][3] = if reverse.contains(FrameShiftMask::REVERSE_1) {
                prev[j - 1][3] + 1
            } else {
                0
            };
            curr[j][4] = if reverse.contains(FrameShiftMask::REVERSE_2) {
                prev[j - 1][4] + 1
            } else {
                0
            };

            for track in 0..2 {
                if curr[j][track] > best[track].length {
                    best[track] = FrameShiftSubstring {
                        reference_index: reference_start + j - curr[j][track],
                        sample_index: sample_start + i + 1 - curr[j][track],
                        length: curr[j][track],
                        mask: FrameShiftMask::KINDS[track],
                    };
                }
            }
            for track in 2..5 {
                if curr[j][track] > best[track].length {
                    best[track] = FrameShiftSubstring {
                        reference_index: reference_end - j - 1,
                        sample_index: sample_start + i + 1 - curr[j][track],
                        length: curr[j][track],
                        mask: FrameShiftMask::KINDS[track],
                    };
                }
            }
        }

        std::mem::swap(&mut prev, &mut curr);
    }

    best
}

/// Recursive frame-shift extractor.
///
/// Finds the longest frame-shift chain, emits it as a `FRAME_SHIFT`
/// variant with its probability, and recurses on the windows on either
/// side. Windows with no chain produce nothing.
#[allow(clippy::too_many_arguments)]
pub fn extractor_frame_shift(
    table: &FrameShiftTable,
    reference: &[u8],
    reference_start: usize,
    reference_end: usize,
    sample: &[u8],
    sample_start: usize,
    sample_end: usize,
    out: &mut Vec<Variant>,
) {
    if reference_end <= reference_start || sample_end <= sample_start {
        return;
    }

    let candidates = lcs_frame_shift(
        table,
        reference,
        reference_start,
        reference_end,
        sample,
        sample_start,
        sample_end,
    );

    // Pick the longest chain, preferring the one closest to the start of
    // the reference; chains agreeing on position and length merge into a
    // compound annotation.
    let mut lcs = FrameShiftSubstring::empty(FrameShiftMask::NONE);
    for candidate in candidates {
        if candidate.length == 0 {
            continue;
        }
        if candidate.length > lcs.length
            || (candidate.length == lcs.length && candidate.reference_index < lcs.reference_index)
        {
            lcs = candidate;
        } else if candidate.length == lcs.length
            && candidate.reference_index == lcs.reference_index
            && candidate.sample_index == lcs.sample_index
        {
            lcs.mask |= candidate.mask;
        }
    }

    if lcs.length == 0 {
        return;
    }

    let probability = shift_probability(table, reference, &lcs);
    trace!(
        reference_index = lcs.reference_index,
        sample_index = lcs.sample_index,
        length = lcs.length,
        mask = lcs.mask.bits(),
        probability,
        "frame-shift chain"
    );

    extractor_frame_shift(
        table,
        reference,
        reference_start,
        lcs.reference_index,
        sample,
        sample_start,
        lcs.sample_index,
        out,
    );
    out.push(Variant::frame_shift(
        lcs.reference_index,
        lcs.reference_index + lcs.length,
        lcs.sample_index,
        lcs.sample_index + lcs.length,
        lcs.mask,
        probability,
    ));
    extractor_frame_shift(
        table,
        reference,
        lcs.reference_index + lcs.length,
        reference_end,
        sample,
        lcs.sample_index + lcs.length,
        sample_end,
        out,
    );
}

/// Probability of a chain: the product over its positions of the summed
/// frequency-weighted reachability of the annotated readings.
fn shift_probability(
    table: &FrameShiftTable,
    reference: &[u8],
    hit: &FrameShiftSubstring,
) -> f64 {
    let mut probability = 1.0f64;
    for i in 0..hit.length {
        let first = reference[hit.reference_index + i];
        // The forward readings pair each residue with its successor; at the
        // window edge the successor is an unassigned byte, which falls back
        // to the smoothing prior.
        let second = reference
            .get(hit.reference_index + i + 1)
            .copied()
            .unwrap_or(0);
        let mut compound = 0.0;
        if hit.mask.contains(FrameShiftMask::FORWARD_1) {
            compound += table.frequency(first, second, 0);
        }
        if hit.mask.contains(FrameShiftMask::FORWARD_2) {
            compound += table.frequency(first, second, 1);
        }
        if hit.mask.contains(FrameShiftMask::REVERSE) {
            compound += table.frequency(first, first, 2);
        }
        if hit.mask.contains(FrameShiftMask::REVERSE_1) {
            compound += table.frequency(first, second, 3);
        }
        if hit.mask.contains(FrameShiftMask::REVERSE_2) {
            compound += table.frequency(first, second, 4);
        }
        probability *= compound;
    }
    probability.min(1.0)
}
