//! Variant records produced by the extraction core.
//!
//! A [`Variant`] describes one region of change (or of identity) between the
//! reference and the sample. The list produced by an extraction tiles both
//! sequences in order: concatenating the sample-side content of every
//! variant reproduces the sample.
//!
//! # Coordinate System
//!
//! | Field | Basis | Notes |
//! |-------|-------|-------|
//! | `reference_start`, `reference_end` | 0-based half-open | Region replaced in the reference |
//! | `sample_start`, `sample_end` | 0-based half-open | Replacement content in the sample |
//! | `transposition_start`, `transposition_end` | 0-based half-open | Reference region a transposition quotes |
//!
//! Downstream HGVS formatters convert to 1-based inclusive positions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Description-length cost of writing one base.
pub const WEIGHT_BASE: u64 = 1;
/// Description-length cost of `del`.
pub const WEIGHT_DELETION: u64 = 3;
/// Description-length cost of `delins`.
pub const WEIGHT_DELETION_INSERTION: u64 = 6;
/// Description-length cost of `ins`.
pub const WEIGHT_INSERTION: u64 = 3;
/// Description-length cost of `inv`.
pub const WEIGHT_INVERSION: u64 = 3;
/// Description-length cost of a position separator (`_`, brackets).
pub const WEIGHT_SEPARATOR: u64 = 1;
/// Description-length cost of `>`.
pub const WEIGHT_SUBSTITUTION: u64 = 1;

/// Bit mask classifying a variant.
///
/// The bits are stable wire constants. `SUBSTITUTION` excludes `IDENTITY`
/// and `REVERSE_COMPLEMENT`; `TRANSPOSITION_OPEN`/`TRANSPOSITION_CLOSE`
/// decorate the first and last member of a transposition run.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantKind(u32);

impl VariantKind {
    /// Unchanged region (also used for forward transposition quotes).
    pub const IDENTITY: VariantKind = VariantKind(0x01);
    /// Region matching the reverse complement of the reference range.
    pub const REVERSE_COMPLEMENT: VariantKind = VariantKind(0x02);
    /// Changed region: substitution, deletion, insertion or delins.
    pub const SUBSTITUTION: VariantKind = VariantKind(0x04);
    /// First member of a transposition run.
    pub const TRANSPOSITION_OPEN: VariantKind = VariantKind(0x08);
    /// Last member of a transposition run.
    pub const TRANSPOSITION_CLOSE: VariantKind = VariantKind(0x10);
    /// Frame-shift annotation (protein only).
    pub const FRAME_SHIFT: VariantKind = VariantKind(0x20);

    /// The raw bit representation.
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Reconstruct from raw bits (e.g. off the wire).
    pub fn from_bits(bits: u32) -> Self {
        VariantKind(bits)
    }

    /// True if every bit of `other` is set in `self`.
    pub fn contains(self, other: VariantKind) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for VariantKind {
    type Output = VariantKind;

    fn bitor(self, rhs: VariantKind) -> VariantKind {
        VariantKind(self.0 | rhs.0)
    }
}

impl BitOrAssign for VariantKind {
    fn bitor_assign(&mut self, rhs: VariantKind) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(u32, &str); 6] = [
            (0x01, "IDENTITY"),
            (0x02, "REVERSE_COMPLEMENT"),
            (0x04, "SUBSTITUTION"),
            (0x08, "TRANSPOSITION_OPEN"),
            (0x10, "TRANSPOSITION_CLOSE"),
            (0x20, "FRAME_SHIFT"),
        ];
        let mut first = true;
        for (bit, name) in NAMES {
            if self.0 & bit != 0 {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{name}")?;
                first = false;
            }
        }
        if first {
            write!(f, "NONE")?;
        }
        Ok(())
    }
}

/// Frame-shift relationship bits.
///
/// These live in their own namespace, separate from [`VariantKind`], and are
/// only meaningful on variants tagged `FRAME_SHIFT`. A compound mask means
/// the evidence is consistent with several readings at once.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameShiftMask(u8);

impl FrameShiftMask {
    /// No frame shift.
    pub const NONE: FrameShiftMask = FrameShiftMask(0x00);
    /// Reading frame moved forward by one base.
    pub const FORWARD_1: FrameShiftMask = FrameShiftMask(0x01);
    /// Reading frame moved forward by two bases.
    pub const FORWARD_2: FrameShiftMask = FrameShiftMask(0x02);
    /// Opposite strand, same frame.
    pub const REVERSE: FrameShiftMask = FrameShiftMask(0x04);
    /// Opposite strand, shifted by one base.
    pub const REVERSE_1: FrameShiftMask = FrameShiftMask(0x08);
    /// Opposite strand, shifted by two bases.
    pub const REVERSE_2: FrameShiftMask = FrameShiftMask(0x10);

    /// The five single-kind masks in table order.
    pub const KINDS: [FrameShiftMask; 5] = [
        FrameShiftMask::FORWARD_1,
        FrameShiftMask::FORWARD_2,
        FrameShiftMask::REVERSE,
        FrameShiftMask::REVERSE_1,
        FrameShiftMask::REVERSE_2,
    ];

    /// The raw bit representation.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Reconstruct from raw bits.
    pub fn from_bits(bits: u8) -> Self {
        FrameShiftMask(bits)
    }

    /// True if every bit of `other` is set in `self`.
    pub fn contains(self, other: FrameShiftMask) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if no kind bit is set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for FrameShiftMask {
    type Output = FrameShiftMask;

    fn bitor(self, rhs: FrameShiftMask) -> FrameShiftMask {
        FrameShiftMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for FrameShiftMask {
    fn bitor_assign(&mut self, rhs: FrameShiftMask) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for FrameShiftMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(u8, &str); 5] = [
            (0x01, "FORWARD_1"),
            (0x02, "FORWARD_2"),
            (0x04, "REVERSE"),
            (0x08, "REVERSE_1"),
            (0x10, "REVERSE_2"),
        ];
        let mut first = true;
        for (bit, name) in NAMES {
            if self.0 & bit != 0 {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{name}")?;
                first = false;
            }
        }
        if first {
            write!(f, "NONE")?;
        }
        Ok(())
    }
}

/// Description cost of a variant: an integer weight for ordinary variants,
/// a confidence for frame-shift annotations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Score {
    /// Description-length cost guiding the extraction recursion.
    Weight(u64),
    /// Statistical confidence of a frame-shift annotation, in `[0, 1]`.
    Probability(f64),
}

impl Score {
    /// The integer weight, zero for probability-scored variants.
    pub fn weight(self) -> u64 {
        match self {
            Score::Weight(w) => w,
            Score::Probability(_) => 0,
        }
    }

    /// The probability, if this is a frame-shift score.
    pub fn probability(self) -> Option<f64> {
        match self {
            Score::Weight(_) => None,
            Score::Probability(p) => Some(p),
        }
    }
}

impl Default for Score {
    fn default() -> Self {
        Score::Weight(0)
    }
}

/// One region of change (or identity) between reference and sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    /// Start of the replaced region in the reference (0-based).
    pub reference_start: usize,
    /// End of the replaced region in the reference (exclusive).
    pub reference_end: usize,
    /// Start of the replacement content in the sample (0-based).
    pub sample_start: usize,
    /// End of the replacement content in the sample (exclusive).
    pub sample_end: usize,
    /// Classification bits.
    pub kind: VariantKind,
    /// Frame-shift kind bits; empty unless `kind` contains `FRAME_SHIFT`.
    pub frame_shift: FrameShiftMask,
    /// Weight or probability of this variant.
    pub score: Score,
    /// Start of the reference region a transposition member quotes.
    pub transposition_start: usize,
    /// End of the reference region a transposition member quotes.
    pub transposition_end: usize,
}

impl Variant {
    /// An unchanged region, weight zero.
    pub fn identity(
        reference_start: usize,
        reference_end: usize,
        sample_start: usize,
        sample_end: usize,
    ) -> Self {
        Variant {
            reference_start,
            reference_end,
            sample_start,
            sample_end,
            kind: VariantKind::IDENTITY,
            frame_shift: FrameShiftMask::NONE,
            score: Score::Weight(0),
            transposition_start: 0,
            transposition_end: 0,
        }
    }

    /// A region matching the reverse complement of its reference range.
    pub fn reverse_complement(
        reference_start: usize,
        reference_end: usize,
        sample_start: usize,
        sample_end: usize,
        weight: u64,
    ) -> Self {
        Variant {
            kind: VariantKind::REVERSE_COMPLEMENT,
            score: Score::Weight(weight),
            ..Variant::identity(reference_start, reference_end, sample_start, sample_end)
        }
    }

    /// A changed region (substitution, deletion, insertion or delins).
    pub fn substitution(
        reference_start: usize,
        reference_end: usize,
        sample_start: usize,
        sample_end: usize,
        weight: u64,
    ) -> Self {
        Variant {
            kind: VariantKind::SUBSTITUTION,
            score: Score::Weight(weight),
            ..Variant::identity(reference_start, reference_end, sample_start, sample_end)
        }
    }

    /// A transposition run member quoting `[transposition_start,
    /// transposition_end)` of the reference, forward or reverse complement.
    pub fn transposed(
        reference_position: usize,
        sample_start: usize,
        sample_end: usize,
        transposition_start: usize,
        transposition_end: usize,
        reverse_complement: bool,
        weight: u64,
    ) -> Self {
        Variant {
            reference_start: reference_position,
            reference_end: reference_position,
            sample_start,
            sample_end,
            kind: if reverse_complement {
                VariantKind::REVERSE_COMPLEMENT
            } else {
                VariantKind::IDENTITY
            },
            frame_shift: FrameShiftMask::NONE,
            score: Score::Weight(weight),
            transposition_start,
            transposition_end,
        }
    }

    /// A frame-shift annotation with its confidence.
    pub fn frame_shift(
        reference_start: usize,
        reference_end: usize,
        sample_start: usize,
        sample_end: usize,
        mask: FrameShiftMask,
        probability: f64,
    ) -> Self {
        Variant {
            kind: VariantKind::FRAME_SHIFT,
            frame_shift: mask,
            score: Score::Probability(probability),
            ..Variant::identity(reference_start, reference_end, sample_start, sample_end)
        }
    }

    /// Length of the replaced reference region.
    pub fn reference_len(&self) -> usize {
        self.reference_end - self.reference_start
    }

    /// Length of the replacement sample content.
    pub fn sample_len(&self) -> usize {
        self.sample_end - self.sample_start
    }

    /// True for members of a transposition run that quote the reference.
    pub fn is_transposition(&self) -> bool {
        self.transposition_end > self.transposition_start
    }
}
