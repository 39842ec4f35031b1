//! Longest common substring search.
//!
//! Two engines share one hit type: the classical two-row dynamic programme
//! ([`lcs_classic`]) and a k-mer bucketed approximation ([`lcs_kmer`]) that
//! stays tractable on long, similar sequences. [`longest_common_substring`]
//! drives them: it starts with a coarse k, refines until a hit is provably a
//! true LCS, and falls back to the classical engine only for small inputs.
//!
//! Both engines optionally search the reverse-complement strand in parallel;
//! the caller supplies the (non-reversed) complement of the reference and
//! the matchers walk it backwards.

mod classic;
mod kmer;

pub use classic::lcs_classic;
pub use kmer::lcs_kmer;

use tracing::trace;

/// A common substring between reference and sample.
///
/// Short-lived output of the LCS engines; positions are buffer coordinates.
/// For a reverse-complement hit, `reference_index` is still the low end of
/// the reference range: the sample content equals the reverse complement of
/// `reference[reference_index..reference_index + length]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Substring {
    /// Start of the matched region in the reference.
    pub reference_index: usize,
    /// Start of the matched region in the sample.
    pub sample_index: usize,
    /// Length of the match in characters.
    pub length: usize,
    /// True if the match is against the reverse-complement strand.
    pub reverse_complement: bool,
}

impl Substring {
    pub(crate) fn forward(reference_index: usize, sample_index: usize, length: usize) -> Self {
        Substring {
            reference_index,
            sample_index,
            length,
            reverse_complement: false,
        }
    }

    pub(crate) fn reverse(reference_index: usize, sample_index: usize, length: usize) -> Self {
        Substring {
            reference_index,
            sample_index,
            length,
            reverse_complement: true,
        }
    }
}

/// When both strands hold a hit of the maximum length, the forward hit wins.
pub(crate) fn prefer_forward(hits: &mut Vec<Substring>) {
    if hits.iter().any(|h| !h.reverse_complement) {
        hits.retain(|h| !h.reverse_complement);
    }
}

/// Find the longest common substrings of two windows.
///
/// Starts with `k = min(window lengths) / 8` and repeatedly calls
/// [`lcs_kmer`], dividing `k` by three, until a hit of length `>= 2k` is
/// found; such a hit cannot have been truncated by the block boundary, so
/// its extension is exact. Once `k` reaches `max(8, cut_off)` the search
/// stops: small inputs (`cut_off <= 1`) get the exact classical answer,
/// large ones report no hit rather than pay the quadratic fallback.
///
/// Returns the tied maximal hits and the match length in characters.
#[allow(clippy::too_many_arguments)]
pub fn longest_common_substring(
    reference: &[u8],
    complement: Option<&[u8]>,
    reference_start: usize,
    reference_end: usize,
    sample: &[u8],
    sample_start: usize,
    sample_end: usize,
    cut_off: usize,
    mask: u8,
) -> (Vec<Substring>, usize) {
    let reference_length = reference_end - reference_start;
    let sample_length = sample_end - sample_start;

    let mut k = reference_length.min(sample_length) / 8;
    let floor = cut_off.max(8);
    while k > floor {
        let (hits, length) = lcs_kmer(
            reference,
            complement,
            reference_start,
            reference_end,
            sample,
            sample_start,
            sample_end,
            k,
            mask,
        );
        trace!(k, length, hits = hits.len(), "k-mer pass");
        if length >= 2 * k && !hits.is_empty() {
            return (hits, length);
        }
        k /= 3;
    }

    if cut_off > 1 {
        return (Vec::new(), 0);
    }

    lcs_classic(
        reference,
        complement,
        reference_start,
        reference_end,
        sample,
        sample_start,
        sample_end,
        mask,
    )
}
