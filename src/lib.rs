// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! ferro-extract: sequence comparison and variant extraction
//!
//! Part of the ferro bioinformatics toolkit.
//!
//! Given a reference and an observed sequence, the extractor produces a
//! minimal-weight, ordered list of variants (regions of change) suitable
//! for HGVS description generation. Beyond a plain diff it understands
//! reverse-complement matches (inversions), insertions quoted from
//! elsewhere in the reference (transpositions), and protein frame-shift
//! annotation with attached probabilities.
//!
//! # Example
//!
//! ```
//! use ferro_extract::{extract_dna, VariantKind};
//!
//! let result = extract_dna(b"AAAAAAAA", b"AAAACCAAAA");
//!
//! assert_eq!(result.variants.len(), 3);
//! let insertion = &result.variants[1];
//! assert_eq!(insertion.kind, VariantKind::SUBSTITUTION);
//! assert_eq!((insertion.sample_start, insertion.sample_end), (4, 6));
//! ```

pub mod backtranslate;
pub mod error;
pub mod extract;
pub mod frameshift;
pub mod lcs;
pub mod sequence;
pub mod variant;

// Re-export commonly used types
pub use backtranslate::{backtranslate, BackTranslation};
pub use error::ExtractError;
pub use extract::{
    extract_dna, extract_protein, Extraction, Extractor, ExtractorConfig, THRESHOLD_CUT_OFF,
    TRANSPOSITION_CUT_OFF,
};
pub use frameshift::{FrameShiftTable, STANDARD_CODON_STRING};
pub use sequence::{complement, reverse_complement, SequenceKind, MASK};
pub use variant::{FrameShiftMask, Score, Variant, VariantKind};

/// Result type alias for ferro-extract operations
pub type Result<T> = std::result::Result<T, ExtractError>;
