//! Whole-object persistence for both graders.
//!
//! Graders serialize to a versioned, kind-tagged record with explicit
//! fields, so loading only ever reconstructs the two known shapes — never
//! an arbitrary object graph. The blob carries the cipher key and salt in
//! directly recoverable form: treat a saved grader as sensitive material,
//! not as a public artifact safe to redistribute without consequence.

use crate::choice::ChoiceGrader;
use crate::error::GraderError;
use crate::ope::{Ope, OpeKey, ValueRange};
use crate::range::RangeGrader;
use crypto_bigint::{Encoding, U256};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Format revision written into every blob.
pub const FORMAT_VERSION: u16 = 1;

const KIND_RANGE: u8 = 1;
const KIND_CHOICE: u8 = 2;

#[derive(Serialize, Deserialize)]
struct RangeRecord {
    version: u16,
    kind: u8,
    scale: f64,
    salt: u128,
    key: [u8; 32],
    lower_bound: [u8; 32],
    upper_bound: [u8; 32],
}

#[derive(Serialize, Deserialize)]
struct ChoiceRecord {
    version: u16,
    kind: u8,
    salt: String,
    correct_hash: [u8; 32],
}

fn check_tags(version: u16, kind: u8, expected_kind: u8) -> Result<(), GraderError> {
    if version != FORMAT_VERSION {
        return Err(GraderError::UnsupportedVersion {
            found: version,
            expected: FORMAT_VERSION,
        });
    }
    if kind != expected_kind {
        return Err(GraderError::WrongArtifactKind {
            found: kind,
            expected: expected_kind,
        });
    }
    Ok(())
}

fn codec_err(err: &bincode::Error) -> GraderError {
    GraderError::Deserialization(err.to_string())
}

impl RangeGrader {
    /// Serialize the full grader state.
    pub fn to_bytes(&self) -> Result<Vec<u8>, GraderError> {
        let record = RangeRecord {
            version: FORMAT_VERSION,
            kind: KIND_RANGE,
            scale: self.scale,
            salt: self.salt,
            key: *self.cipher.key().as_bytes(),
            lower_bound: self.lower_bound.to_be_bytes(),
            upper_bound: self.upper_bound.to_be_bytes(),
        };
        bincode::serialize(&record).map_err(|e| codec_err(&e))
    }

    /// Rebuild a grader from bytes produced by [`RangeGrader::to_bytes`].
    ///
    /// Only self-produced blobs should be loaded. The format rejects
    /// unknown versions, foreign kinds, and unusable field values, but it
    /// cannot authenticate the blob's origin.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GraderError> {
        let record: RangeRecord = bincode::deserialize(bytes).map_err(|e| codec_err(&e))?;
        check_tags(record.version, record.kind, KIND_RANGE)?;
        if !record.scale.is_finite() || record.scale == 0.0 {
            return Err(GraderError::Deserialization(format!(
                "stored scale {} is unusable",
                record.scale
            )));
        }
        Ok(Self {
            scale: record.scale,
            salt: record.salt,
            cipher: Ope::new(OpeKey::from_bytes(record.key), ValueRange::full()),
            lower_bound: U256::from_be_bytes(record.lower_bound),
            upper_bound: U256::from_be_bytes(record.upper_bound),
        })
    }

    /// Write the serialized grader to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), GraderError> {
        Ok(fs::write(path, self.to_bytes()?)?)
    }

    /// Read a grader previously written by [`RangeGrader::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GraderError> {
        Self::from_bytes(&fs::read(path)?)
    }
}

impl ChoiceGrader {
    /// Serialize the full grader state.
    pub fn to_bytes(&self) -> Result<Vec<u8>, GraderError> {
        let record = ChoiceRecord {
            version: FORMAT_VERSION,
            kind: KIND_CHOICE,
            salt: self.salt.clone(),
            correct_hash: self.correct_hash,
        };
        bincode::serialize(&record).map_err(|e| codec_err(&e))
    }

    /// Rebuild a grader from bytes produced by [`ChoiceGrader::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GraderError> {
        let record: ChoiceRecord = bincode::deserialize(bytes).map_err(|e| codec_err(&e))?;
        check_tags(record.version, record.kind, KIND_CHOICE)?;
        Ok(Self {
            salt: record.salt,
            correct_hash: record.correct_hash,
        })
    }

    /// Write the serialized grader to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), GraderError> {
        Ok(fs::write(path, self.to_bytes()?)?)
    }

    /// Read a grader previously written by [`ChoiceGrader::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GraderError> {
        Self::from_bytes(&fs::read(path)?)
    }
}
