//! k-mer bucketed longest-common-substring search.

use super::{prefer_forward, Substring};
use crate::sequence::{string_match, string_match_reverse};

/// Approximate LCS over k-mers, for long similar sequences.
///
/// The reference window is cut into non-overlapping blocks of length `k`
/// while the sample window contributes every overlapping k-mer; a dynamic
/// programme counts runs of consecutive matching k-mers, then each surviving
/// hit is extended by up to `k - 1` characters on either side to recover its
/// exact span. A hit of length `< 2k` may still undershoot the true LCS, so
/// callers retry with a smaller `k` (see the driver).
///
/// Returns the empty set when `k <= 1` or either window is shorter than `k`.
#[allow(clippy::too_many_arguments)]
pub fn lcs_kmer(
    reference: &[u8],
    complement: Option<&[u8]>,
    reference_start: usize,
    reference_end: usize,
    sample: &[u8],
    sample_start: usize,
    sample_end: usize,
    k: usize,
    mask: u8,
) -> (Vec<Substring>, usize) {
    if k <= 1 || reference_end - reference_start < k || sample_end - sample_start < k {
        return (Vec::new(), 0);
    }

    // Lengths in k-mers: non-overlapping blocks on the reference side,
    // overlapping k-mers on the sample side.
    let reference_length = (reference_end - reference_start) / k;
    let sample_length = sample_end - sample_start - k + 1;

    // A chain step looks back k sample rows, so k + 1 rows are kept live.
    let mut rows = vec![vec![0usize; reference_length]; k + 1];
    let mut rows_rc = vec![vec![0usize; reference_length]; k + 1];

    let mut hits: Vec<Substring> = Vec::new();
    let mut length = 0usize;

    for i in 0..sample_length {
        let row = i % (k + 1);
        let prev_row = (i + 1) % (k + 1);

        for j in 0..reference_length {
            if string_match(
                reference,
                reference_start + j * k,
                sample,
                sample_start + i,
                k,
                mask,
            ) {
                let run = if i < k || j == 0 {
                    1
                } else {
                    rows[prev_row][j - 1] + 1
                };
                rows[row][j] = run;
                collect_hit(&mut hits, &mut length, run, j, i, false, k);
            } else {
                rows[row][j] = 0;
            }

            if let Some(comp) = complement {
                if string_match_reverse(
                    comp,
                    reference_end - j * k - 1,
                    sample,
                    sample_start + i,
                    k,
                    mask,
                ) {
                    let run = if i < k || j == 0 {
                        1
                    } else {
                        rows_rc[prev_row][j - 1] + 1
                    };
                    rows_rc[row][j] = run;
                    collect_hit(&mut hits, &mut length, run, j, i, true, k);
                } else {
                    rows_rc[row][j] = 0;
                }
            }
        }
    }

    // Back to character coordinates, with boundary extension.
    let mut length = length * k;
    for hit in &mut hits {
        let extended = if hit.reverse_complement {
            extend_reverse(
                complement.expect("reverse hit without complement"),
                reference_start,
                reference_end,
                sample,
                sample_start,
                sample_end,
                *hit,
                k,
                mask,
            )
        } else {
            extend_forward(
                reference,
                reference_start,
                reference_end,
                sample,
                sample_start,
                sample_end,
                *hit,
                k,
                mask,
            )
        };
        *hit = extended;
        if hit.length > length {
            length = hit.length;
        }
    }

    hits.retain(|h| h.length == length);
    prefer_forward(&mut hits);
    (hits, length)
}

/// Record a chain cell as a candidate hit (k-mer coordinates).
///
/// A strict improvement purges every stored hit that falls two or more
/// below the new maximum, and the direct predecessor of the new hit, which
/// is guaranteed to be one k-mer shorter and would double-count. Near-ties
/// (within one k-mer of the maximum) are kept alongside, since character
/// extension may still promote them.
fn collect_hit(
    hits: &mut Vec<Substring>,
    length: &mut usize,
    run: usize,
    j: usize,
    i: usize,
    reverse_complement: bool,
    k: usize,
) {
    if run > *length {
        *length = run;
        let max = *length;
        hits.retain(|h| {
            if max - h.length > 1 {
                return false;
            }
            let predecessor = j > 0
                && i >= k
                && h.reference_index == j - 1
                && h.sample_index == i - k
                && h.reverse_complement == reverse_complement;
            !predecessor
        });
        hits.push(Substring {
            reference_index: j,
            sample_index: i,
            length: run,
            reverse_complement,
        });
    } else if *length - run <= 1 {
        hits.push(Substring {
            reference_index: j,
            sample_index: i,
            length: run,
            reverse_complement,
        });
    }
}

/// Convert a forward k-mer hit to character coordinates and extend it by up
/// to `k - 1` characters on both sides.
#[allow(clippy::too_many_arguments)]
fn extend_forward(
    reference: &[u8],
    reference_start: usize,
    reference_end: usize,
    sample: &[u8],
    sample_start: usize,
    sample_end: usize,
    hit: Substring,
    k: usize,
    mask: u8,
) -> Substring {
    let mut reference_index = reference_start + (hit.reference_index + 1 - hit.length) * k;
    let mut sample_index = sample_start + hit.sample_index - (hit.length - 1) * k;
    let mut length = hit.length * k;

    let mut ext = 0;
    while ext + 1 < k {
        let step = ext + 1;
        if reference_index < reference_start + step || sample_index < sample_start + step {
            break;
        }
        let r = reference[reference_index - step];
        if r == mask || r != sample[sample_index - step] {
            break;
        }
        ext += 1;
    }
    reference_index -= ext;
    sample_index -= ext;
    length += ext;

    let mut ext = 0;
    while ext < k - 1 {
        if reference_index + length + ext >= reference_end
            || sample_index + length + ext >= sample_end
        {
            break;
        }
        let r = reference[reference_index + length + ext];
        if r == mask || r != sample[sample_index + length + ext] {
            break;
        }
        ext += 1;
    }
    length += ext;

    Substring::forward(reference_index, sample_index, length)
}

/// Convert a reverse-complement k-mer hit to character coordinates and
/// extend it. The complement is walked in the opposite direction: extending
/// the sample run to the left grows the reference window to the right, and
/// vice versa.
#[allow(clippy::too_many_arguments)]
fn extend_reverse(
    complement: &[u8],
    reference_start: usize,
    reference_end: usize,
    sample: &[u8],
    sample_start: usize,
    sample_end: usize,
    hit: Substring,
    k: usize,
    mask: u8,
) -> Substring {
    let mut reference_index = reference_end - (hit.reference_index + 1) * k;
    let mut sample_index = sample_start + hit.sample_index - (hit.length - 1) * k;
    let mut length = hit.length * k;

    let mut ext = 0;
    while ext + 1 < k {
        let step = ext + 1;
        if reference_index + length + step - 1 >= reference_end
            || sample_index < sample_start + step
        {
            break;
        }
        let c = complement[reference_index + length + step - 1];
        if c == mask || c != sample[sample_index - step] {
            break;
        }
        ext += 1;
    }
    sample_index -= ext;
    length += ext;

    let mut ext = 0;
    while ext + 1 < k {
        let step = ext + 1;
        if reference_index < reference_start + step || sample_index + length + step - 1 >= sample_end
        {
            break;
        }
        let c = complement[reference_index - step];
        if c == mask || c != sample[sample_index + length + step - 1] {
            break;
        }
        ext += 1;
    }
    reference_index -= ext;
    length += ext;

    Substring::reverse(reference_index, sample_index, length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::{complement, reverse_complement, MASK};

    fn assert_valid_forward(reference: &[u8], sample: &[u8], hit: &Substring) {
        assert!(!hit.reverse_complement);
        assert_eq!(
            &reference[hit.reference_index..hit.reference_index + hit.length],
            &sample[hit.sample_index..hit.sample_index + hit.length]
        );
    }

    #[test]
    fn test_degenerate_inputs() {
        let (hits, length) = lcs_kmer(b"ACGTACGT", None, 0, 8, b"ACGTACGT", 0, 8, 1, MASK);
        assert!(hits.is_empty());
        assert_eq!(length, 0);
        let (hits, _) = lcs_kmer(b"ACGTACGT", None, 0, 8, b"ACG", 0, 3, 4, MASK);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_identical_strings() {
        let reference = b"TTGACCAGTCAGCATTTGCACTGGAAGTCCAA";
        let (hits, length) = lcs_kmer(reference, None, 0, 32, reference, 0, 32, 4, MASK);
        assert_eq!(length, 32);
        assert!(hits.iter().any(|h| h.reference_index == 0 && h.sample_index == 0));
        for hit in &hits {
            assert_valid_forward(reference, reference, hit);
        }
    }

    #[test]
    fn test_extension_recovers_unaligned_match() {
        // The shared run does not start on a block boundary; character
        // extension must still recover it in full.
        let reference = b"GGGGGGGGTTGACCAGTCAGCATTGCACTGGA";
        let sample = b"CCCCCCCTTGACCAGTCAGCATTGCACTGGAC";
        let (hits, length) = lcs_kmer(reference, None, 0, 32, sample, 0, 32, 4, MASK);
        // Shared run: TTGACCAGTCAGCATTGCACTGGA (24 characters).
        assert_eq!(length, 24);
        for hit in &hits {
            assert_valid_forward(reference, sample, hit);
        }
    }

    #[test]
    fn test_reverse_complement_hit() {
        let core = b"TTGACCAGTCAGCATTTGCACTGG";
        let mut reference = Vec::new();
        reference.extend_from_slice(b"AAAAAAAA");
        reference.extend_from_slice(core);
        reference.extend_from_slice(b"AAAAAAAA");
        let mut sample = Vec::new();
        sample.extend_from_slice(b"GGGGGGGG");
        sample.extend_from_slice(&reverse_complement(core));
        sample.extend_from_slice(b"GGGGGGGG");
        let comp = complement(&reference);
        let (hits, length) = lcs_kmer(
            &reference,
            Some(&comp),
            0,
            reference.len(),
            &sample,
            0,
            sample.len(),
            4,
            MASK,
        );
        assert_eq!(length, core.len());
        assert!(!hits.is_empty());
        for hit in &hits {
            assert!(hit.reverse_complement);
            assert_eq!(hit.reference_index, 8);
            let window = &reference[hit.reference_index..hit.reference_index + hit.length];
            assert_eq!(
                &sample[hit.sample_index..hit.sample_index + hit.length],
                reverse_complement(window).as_slice()
            );
        }
    }

    #[test]
    fn test_mask_blocks_kmer_match() {
        let reference = b"TTGACCAG$CAGCATTTGCACTGGAAGTCCAA";
        let sample = b"TTGACCAGTCAGCATTTGCACTGGAAGTCCAA";
        let (_, length) = lcs_kmer(reference, None, 0, 32, sample, 0, 32, 4, MASK);
        // The masked byte caps the match at the longer flank.
        assert_eq!(length, 23);
    }
}
