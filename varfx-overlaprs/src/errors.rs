use thiserror::Error;

/// Errors that can occur when working with an [`crate::IntervalForest`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ForestError {
    #[error("No interval tree for chromosome '{0}'")]
    UnknownChromosome(String),
}
