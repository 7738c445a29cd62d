//! Choice grading via a salted hash commitment.

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// String grader holding a salted digest of the correct choice.
///
/// No plaintext is stored: grading recomputes `SHA-256(candidate || salt)`
/// and compares digests in constant time. Comparison is case-sensitive with
/// no normalization.
#[derive(Clone, Debug)]
pub struct ChoiceGrader {
    pub(crate) salt: String,
    pub(crate) correct_hash: [u8; 32],
}

impl ChoiceGrader {
    /// Commit to `correct` under a fresh 128-bit salt drawn from the
    /// operating system generator.
    #[must_use]
    pub fn new(correct: &str) -> Self {
        Self::new_with_rng(correct, &mut OsRng)
    }

    /// Commit with an injected randomness source.
    pub fn new_with_rng<R: RngCore + CryptoRng>(correct: &str, rng: &mut R) -> Self {
        let mut salt_bytes = [0u8; 16];
        rng.fill_bytes(&mut salt_bytes);
        let salt = hex::encode(salt_bytes);
        let correct_hash = salted_digest(correct, &salt);
        Self { salt, correct_hash }
    }

    /// Whether `value` matches the committed choice.
    ///
    /// Pure function; callers decide how to announce the verdict.
    #[must_use]
    pub fn grade(&self, value: &str) -> bool {
        salted_digest(value, &self.salt).ct_eq(&self.correct_hash).into()
    }
}

/// SHA-256 over the candidate bytes followed by the hex salt.
fn salted_digest(value: &str, salt: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hasher.update(salt.as_bytes());
    hasher.finalize().into()
}
