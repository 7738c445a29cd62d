//! OPEGrade ― Order-Preserving Encrypted Grading  (research prototype)
//!
//! Offline answer checkers that can be handed to the party being graded: a
//! [`RangeGrader`] tests membership in a secret numeric interval through an
//! order-preserving cipher with randomized thresholds, and a
//! [`ChoiceGrader`] tests string equality against a salted hash commitment.
//! Both persist to a versioned binary blob via [`persist`].

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, missing_docs)]

extern crate rand;

pub mod choice;
pub mod error;
pub mod ope;
pub mod persist;
pub mod range;

pub use choice::ChoiceGrader;
pub use error::GraderError;
pub use ope::{Ope, OpeKey, ValueRange};
pub use range::RangeGrader;
