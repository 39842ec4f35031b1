//! Error types for ferro-extract
//!
//! The extraction core has very few recoverable error modes: empty inputs
//! are valid (they produce a plain insertion, deletion, or an empty variant
//! list) and unknown sequence kind codes degrade to `Other`. What remains
//! are caller contract violations that can be detected cheaply up front.

use thiserror::Error;

/// Main error type for ferro-extract operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// The codon assignment string does not describe all 64 codons.
    #[error("Invalid codon table: expected 64 amino acid assignments, found {len}")]
    InvalidCodonTable { len: usize },
}
