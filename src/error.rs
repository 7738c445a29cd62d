//! Crate-wide error taxonomy.

use thiserror::Error;

/// Everything grader construction, grading, and persistence can surface.
///
/// All variants are unrecoverable at the point of detection: grading is a
/// pure computation with nothing transient to retry, and a failed
/// construction never leaves a partially initialized grader behind.
#[derive(Debug, Error)]
pub enum GraderError {
    /// The requested bounds do not describe a usable acceptance window.
    #[error("invalid acceptance range: lower {lower} must fall below upper {upper} at scale {scale}")]
    InvalidRange {
        /// Requested lower bound.
        lower: f64,
        /// Requested upper bound.
        upper: f64,
        /// Requested scaling factor.
        scale: f64,
    },

    /// A graded value left the cipher domain after scaling and salting.
    #[error("value {value} maps outside the cipher domain")]
    OutOfDomain {
        /// The offending value as submitted.
        value: f64,
    },

    /// A persisted blob was malformed or truncated, or failed to encode.
    #[error("grader artifact rejected: {0}")]
    Deserialization(String),

    /// A persisted blob was written by an incompatible format revision.
    #[error("grader artifact format v{found} is not supported (expected v{expected})")]
    UnsupportedVersion {
        /// Version tag found in the blob.
        found: u16,
        /// Version this build writes and reads.
        expected: u16,
    },

    /// A persisted blob holds the other grader kind.
    #[error("grader artifact kind tag {found} does not match expected {expected}")]
    WrongArtifactKind {
        /// Kind tag found in the blob.
        found: u8,
        /// Kind tag required by the caller.
        expected: u8,
    },

    /// Underlying storage failure while saving or loading.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
