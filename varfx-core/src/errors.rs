use thiserror::Error;

use crate::models::VariantKind;

/// Errors raised by interval geometry that has no cross-chromosome meaning.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("Intervals lie on different chromosomes: '{left}' and '{right}'")]
    ChromosomeMismatch { left: String, right: String },
}

/// Errors raised while building or applying a [`crate::models::Variant`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VariantError {
    #[error("Variant kind {0} cannot be applied to a marker")]
    UnsupportedKind(VariantKind),

    #[error("Only MIXED variants can be decomposed, got {0}")]
    NotDecomposable(VariantKind),

    #[error("Multiple alternate alleles are not supported: '{0}'")]
    MultipleAlternates(String),

    #[error("Allele '{0}' is not a sequence of IUPAC nucleotide codes")]
    InvalidAllele(String),

    #[error("Invalid variant coordinates {chr}:{start}-{end}")]
    InvalidCoordinates { chr: String, start: i64, end: i64 },
}

/// Errors raised while assembling a [`crate::models::Genome`].
///
/// Every variant names the offending marker so a corrupt annotation set fails
/// at build time instead of during querying.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenomeError {
    #[error("Unknown parent marker id {0}")]
    UnknownParent(u32),

    #[error("Unknown chromosome '{0}'")]
    UnknownChromosome(String),

    #[error("Chromosome '{0}' was added twice")]
    DuplicateChromosome(String),

    #[error("Marker '{child}' is already a child of '{parent}'")]
    DuplicateChildId { parent: String, child: String },

    #[error("Marker '{id}' has invalid coordinates {chr}:{start}-{end} (start > end + 1)")]
    InvalidCoordinates {
        id: String,
        chr: String,
        start: i64,
        end: i64,
    },

    #[error("Marker '{child}' is on chromosome '{child_chr}' but its parent '{parent}' is on '{parent_chr}'")]
    ChromosomeMismatch {
        parent: String,
        parent_chr: String,
        child: String,
        child_chr: String,
    },

    #[error("Marker '{child}' lies outside its parent '{parent}' and parent widening is disabled")]
    ChildOutOfBounds { parent: String, child: String },
}
