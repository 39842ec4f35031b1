//! Variant extraction: turn a reference/sample pair into an ordered,
//! minimal-weight list of variants.
//!
//! This is the crate's entry point. The extractor strips the common prefix
//! and suffix, then recursively decomposes the changed region around the
//! "best fitting" longest common substring, scoring every decomposition by
//! the description length it would cost in an HGVS string and abandoning
//! any branch that costs more than describing the window as one deletion/
//! insertion.
//!
//! # Example
//!
//! ```
//! use ferro_extract::{Extractor, SequenceKind, VariantKind};
//!
//! let extractor = Extractor::with_defaults();
//! let result = extractor.extract(b"ATAGATGATAGATAGATAGAT", b"ATAGATGATTGATAGATAGAT", SequenceKind::Dna);
//!
//! assert_eq!(result.variants.len(), 3);
//! assert_eq!(result.variants[1].kind, VariantKind::SUBSTITUTION);
//! assert_eq!(result.variants[1].reference_start, 9);
//! ```

mod transposition;

use crate::error::ExtractError;
use crate::frameshift::{extractor_frame_shift, FrameShiftTable};
use crate::lcs::{longest_common_substring, Substring};
use crate::sequence::{complement, prefix_match, suffix_match, SequenceKind, MASK};
use crate::variant::{
    Variant, VariantKind, WEIGHT_BASE, WEIGHT_DELETION, WEIGHT_DELETION_INSERTION,
    WEIGHT_INVERSION, WEIGHT_SEPARATOR, WEIGHT_SUBSTITUTION,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Reference windows at least this long push the k-mer search to a coarser
/// cut-off instead of falling back to the quadratic LCS.
pub const THRESHOLD_CUT_OFF: usize = 16_000;

/// A transposition quote must cover at least this fraction of the inserted
/// region; shorter matches are written out literally.
pub const TRANSPOSITION_CUT_OFF: f64 = 0.1;

/// Configuration for the extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Byte treated as repeat-masked: it never takes part in a match.
    pub mask: u8,
    /// Codon assignment for protein frame-shift annotation: one amino-acid
    /// letter per codon index, 64 in total. `None` selects the standard
    /// genetic code.
    pub codon_string: Option<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            mask: MASK,
            codon_string: None,
        }
    }
}

/// Result of one extraction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    /// The variants, ascending by reference position. Frame-shift
    /// annotations, when present, follow the covering list.
    pub variants: Vec<Variant>,
    /// Summed description weight of the covering variants.
    pub weight: u64,
    /// Description cost of one position, constant for this run.
    pub weight_position: u64,
}

/// Variant extractor comparing a reference sequence against an observed one.
#[derive(Debug, Clone)]
pub struct Extractor {
    config: ExtractorConfig,
    table: Option<FrameShiftTable>,
}

impl Extractor {
    /// Create an extractor with the given configuration.
    ///
    /// Fails if the configured codon string does not assign exactly 64
    /// codons.
    pub fn new(config: ExtractorConfig) -> Result<Self, ExtractError> {
        let table = match &config.codon_string {
            Some(codons) => Some(FrameShiftTable::new(codons.as_bytes())?),
            None => None,
        };
        Ok(Self { config, table })
    }

    /// Create an extractor with the default configuration.
    pub fn with_defaults() -> Self {
        Self {
            config: ExtractorConfig::default(),
            table: None,
        }
    }

    /// Extract all variants turning `reference` into `sample`.
    ///
    /// For DNA the reference complement is constructed internally; protein
    /// input additionally gets the frame-shift annotation pass.
    pub fn extract(&self, reference: &[u8], sample: &[u8], kind: SequenceKind) -> Extraction {
        match kind {
            SequenceKind::Dna => {
                let comp = complement(reference);
                self.run(reference, Some(comp.as_slice()), sample, kind)
            }
            _ => self.run(reference, None, sample, kind),
        }
    }

    /// Extract DNA variants with a caller-supplied complement buffer,
    /// avoiding the internal allocation when one is already at hand.
    pub fn extract_with_complement(
        &self,
        reference: &[u8],
        reference_complement: &[u8],
        sample: &[u8],
    ) -> Extraction {
        self.run(reference, Some(reference_complement), sample, SequenceKind::Dna)
    }

    fn run(
        &self,
        reference: &[u8],
        complement: Option<&[u8]>,
        sample: &[u8],
        kind: SequenceKind,
    ) -> Extraction {
        let weight_position = position_weight(reference.len());
        let mask = self.config.mask;

        let prefix = prefix_match(reference, sample, mask);
        let suffix = suffix_match(reference, sample, prefix, mask);
        debug!(
            reference_length = reference.len(),
            sample_length = sample.len(),
            prefix,
            suffix,
            weight_position,
            "extracting"
        );

        let ctx = ExtractContext {
            reference,
            complement,
            sample,
            reference_length: reference.len(),
            weight_position,
            mask,
        };

        let mut variants = Vec::new();
        if prefix > 0 {
            variants.push(Variant::identity(0, prefix, 0, prefix));
        }
        let weight = extractor(
            &ctx,
            prefix,
            reference.len() - suffix,
            prefix,
            sample.len() - suffix,
            &mut variants,
        );
        if suffix > 0 {
            variants.push(Variant::identity(
                reference.len() - suffix,
                reference.len(),
                sample.len() - suffix,
                sample.len(),
            ));
        }

        if kind == SequenceKind::Protein {
            let table = match &self.table {
                Some(table) => table,
                None => FrameShiftTable::standard(),
            };
            self.annotate_frame_shifts(table, reference, sample, &mut variants);
        }

        Extraction {
            variants,
            weight,
            weight_position,
        }
    }

    /// Re-process every delins-shaped substitution through the frame-shift
    /// extractor; annotations are appended after the covering list.
    fn annotate_frame_shifts(
        &self,
        table: &FrameShiftTable,
        reference: &[u8],
        sample: &[u8],
        variants: &mut Vec<Variant>,
    ) {
        let mut annotations = Vec::new();
        for variant in variants.iter() {
            if !variant.kind.contains(VariantKind::SUBSTITUTION) {
                continue;
            }
            let delins = variant.reference_len() >= 1
                && variant.sample_len() >= 1
                && !(variant.reference_len() == 1 && variant.sample_len() == 1);
            if delins {
                extractor_frame_shift(
                    table,
                    reference,
                    variant.reference_start,
                    variant.reference_end,
                    sample,
                    variant.sample_start,
                    variant.sample_end,
                    &mut annotations,
                );
            }
        }
        variants.extend(annotations);
    }
}

/// Extract DNA variants with the default configuration.
pub fn extract_dna(reference: &[u8], sample: &[u8]) -> Extraction {
    Extractor::with_defaults().extract(reference, sample, SequenceKind::Dna)
}

/// Extract protein variants (with frame-shift annotation) under the
/// standard genetic code.
pub fn extract_protein(reference: &[u8], sample: &[u8]) -> Extraction {
    Extractor::with_defaults().extract(reference, sample, SequenceKind::Protein)
}

/// Description cost of one position: the digit count of a typical position
/// in the reference, never less than one.
///
/// The ceiling is taken over the real-valued quotient, so a length just
/// past `4·10^k` already costs `k + 1` digits.
fn position_weight(reference_length: usize) -> u64 {
    let scaled = reference_length as f64 / 4.0;
    (scaled.log10().ceil() as u64).max(1)
}

/// Per-run state threaded through the recursion.
///
/// `reference_length` is the length of the whole reference, read by the
/// transposition extractor to rescan the entire sequence even while nested
/// deep in a sub-window.
pub(crate) struct ExtractContext<'a> {
    pub(crate) reference: &'a [u8],
    pub(crate) complement: Option<&'a [u8]>,
    pub(crate) sample: &'a [u8],
    pub(crate) reference_length: usize,
    pub(crate) weight_position: u64,
    pub(crate) mask: u8,
}

/// The recursive extractor. Appends an ordered run of variants covering
/// the window exactly and returns their summed weight.
fn extractor(
    ctx: &ExtractContext<'_>,
    reference_start: usize,
    reference_end: usize,
    sample_start: usize,
    sample_end: usize,
    out: &mut Vec<Variant>,
) -> u64 {
    // Masked bytes never match, and they must not be reported as changed
    // content either.
    let mut rs = reference_start;
    let mut re = reference_end;
    let mut ss = sample_start;
    let mut se = sample_end;
    while rs < re && ctx.reference[rs] == ctx.mask {
        rs += 1;
    }
    while re > rs && ctx.reference[re - 1] == ctx.mask {
        re -= 1;
    }
    while ss < se && ctx.sample[ss] == ctx.mask {
        ss += 1;
    }
    while se > ss && ctx.sample[se - 1] == ctx.mask {
        se -= 1;
    }

    let reference_length = re - rs;
    let sample_length = se - ss;
    let wp = ctx.weight_position;

    // Cost of describing the whole window as one deletion/insertion; any
    // decomposition that exceeds it is discarded.
    let weight_trivial = wp
        + WEIGHT_DELETION_INSERTION
        + WEIGHT_BASE * sample_length as u64
        + if reference_length != 1 {
            wp + WEIGHT_SEPARATOR
        } else {
            0
        };

    trace!(
        rs,
        re,
        ss,
        se,
        weight_trivial,
        "extractor window"
    );

    // Insertions.
    if reference_length == 0 {
        if sample_length == 0 {
            return 0;
        }
        return transposition::insertion(ctx, rs, re, ss, se, out);
    }

    // Deletions.
    if sample_length == 0 {
        let weight = wp
            + WEIGHT_DELETION
            + if reference_length > 1 {
                wp + WEIGHT_SEPARATOR
            } else {
                0
            };
        out.push(Variant::substitution(rs, re, ss, se, weight));
        return weight;
    }

    // Simple substitutions.
    if reference_length == 1 && sample_length == 1 {
        let weight = wp + 2 * WEIGHT_BASE + WEIGHT_SUBSTITUTION;
        out.push(Variant::substitution(rs, re, ss, se, weight));
        return weight;
    }

    // 2 vs 1 shaped windows are always a delins.
    if reference_length < 3 && sample_length < 3 {
        out.push(Variant::substitution(rs, re, ss, se, weight_trivial));
        return weight_trivial;
    }

    let cut_off = if reference_length >= THRESHOLD_CUT_OFF {
        wp as usize
    } else {
        1
    };
    let (hits, length) = longest_common_substring(
        ctx.reference,
        ctx.complement,
        rs,
        re,
        ctx.sample,
        ss,
        se,
        cut_off,
        ctx.mask,
    );

    if length == 0 || hits.is_empty() {
        return transposition::delins(ctx, rs, re, ss, se, weight_trivial, out);
    }

    let lcs = select_hit(&hits, rs, re, ss, se);
    let inversion_weight = 2 * wp + WEIGHT_SEPARATOR + WEIGHT_INVERSION;
    let mut weight = if lcs.reverse_complement {
        inversion_weight
    } else {
        0
    };

    let mut prefix = Vec::new();
    weight += extractor(ctx, rs, lcs.reference_index, ss, lcs.sample_index, &mut prefix);
    if weight > weight_trivial {
        return transposition::delins(ctx, rs, re, ss, se, weight_trivial, out);
    }

    let mut suffix = Vec::new();
    weight += extractor(
        ctx,
        lcs.reference_index + lcs.length,
        re,
        lcs.sample_index + lcs.length,
        se,
        &mut suffix,
    );
    if weight > weight_trivial {
        return transposition::delins(ctx, rs, re, ss, se, weight_trivial, out);
    }

    out.append(&mut prefix);
    if lcs.reverse_complement {
        out.push(Variant::reverse_complement(
            lcs.reference_index,
            lcs.reference_index + lcs.length,
            lcs.sample_index,
            lcs.sample_index + lcs.length,
            inversion_weight,
        ));
    } else {
        out.push(Variant::identity(
            lcs.reference_index,
            lcs.reference_index + lcs.length,
            lcs.sample_index,
            lcs.sample_index + lcs.length,
        ));
    }
    out.append(&mut suffix);
    weight
}

/// Among hits tied at the maximal length, choose the one whose uncovered
/// remainders are most balanced between reference and sample; ties resolve
/// to the first encountered.
pub(crate) fn select_hit<'a>(
    hits: &'a [Substring],
    reference_start: usize,
    reference_end: usize,
    sample_start: usize,
    sample_end: usize,
) -> &'a Substring {
    let mut best = &hits[0];
    let mut best_difference = usize::MAX;
    for hit in hits {
        let prefix_r = hit.reference_index - reference_start;
        let prefix_s = hit.sample_index - sample_start;
        let suffix_r = reference_end - (hit.reference_index + hit.length);
        let suffix_s = sample_end - (hit.sample_index + hit.length);
        let difference = prefix_r.abs_diff(prefix_s) + suffix_r.abs_diff(suffix_s);
        if difference < best_difference {
            best_difference = difference;
            best = hit;
        }
    }
    best
}
