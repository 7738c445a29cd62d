//! Range grading over an encrypted acceptance window.

use crate::error::GraderError;
use crate::ope::{Ope, ValueRange};
use crypto_bigint::U256;
use rand::rngs::OsRng;
use rand::{CryptoRng, Rng, RngCore};

/// Numeric grader holding a randomized, order-preserving acceptance window.
///
/// The window is derived once at construction and never mutated afterwards.
/// Published thresholds are fuzzed within one scaled unit of the true
/// bounds: values at distance >= 2 scaled units from a bound grade
/// deterministically, while the bounds themselves (and their immediate
/// neighbors) may swing either way between fresh instances. That ambiguity
/// is the price of hiding the exact transition point from a caller probing
/// [`RangeGrader::grade`] adaptively.
#[derive(Clone, Debug)]
pub struct RangeGrader {
    pub(crate) scale: f64,
    pub(crate) salt: u128,
    pub(crate) cipher: Ope,
    pub(crate) lower_bound: U256,
    pub(crate) upper_bound: U256,
}

impl RangeGrader {
    /// Grader accepting values strictly inside `(lower, upper)` at unit
    /// scale, randomized from the operating system generator.
    pub fn new(lower: f64, upper: f64) -> Result<Self, GraderError> {
        Self::new_with_rng(lower, upper, 1.0, &mut OsRng)
    }

    /// Same as [`RangeGrader::new`] with an explicit unit of precision:
    /// bounds and graded values are divided by `scale` and floored before
    /// any comparison.
    pub fn with_scale(lower: f64, upper: f64, scale: f64) -> Result<Self, GraderError> {
        Self::new_with_rng(lower, upper, scale, &mut OsRng)
    }

    /// Full constructor with an injected randomness source, so callers can
    /// seed construction deterministically.
    ///
    /// Bounds with magnitude beyond 2^53 lose integer precision in `f64`
    /// before scaling.
    pub fn new_with_rng<R: RngCore + CryptoRng>(
        lower: f64,
        upper: f64,
        scale: f64,
        rng: &mut R,
    ) -> Result<Self, GraderError> {
        let invalid = || GraderError::InvalidRange { lower, upper, scale };
        if !scale.is_finite() || scale == 0.0 || !lower.is_finite() || !upper.is_finite() {
            return Err(invalid());
        }
        let lb = scaled(lower, scale);
        let ub = scaled(upper, scale);
        if lb >= ub {
            return Err(invalid());
        }

        // Salt window under which lb+salt-1 and ub+salt+1 stay inside the
        // cipher domain. Negative bounds ride the same shift.
        let salt_min = if lb >= 1 {
            0
        } else {
            1u128.wrapping_sub(lb as u128)
        };
        let salt_max = if ub >= 0 {
            u128::MAX - 1 - ub as u128
        } else {
            u128::MAX
        };
        if salt_min > salt_max {
            return Err(invalid());
        }
        let salt = rng.gen_range(salt_min..=salt_max);

        let cipher = Ope::new(Ope::generate_key(rng), ValueRange::full());
        let lower_bound = fuzzed_threshold(&cipher, lb, salt, rng);
        let upper_bound = fuzzed_threshold(&cipher, ub, salt, rng);

        Ok(Self {
            scale,
            salt,
            cipher,
            lower_bound,
            upper_bound,
        })
    }

    /// Membership test over the fuzzed window, strict on both sides: a
    /// value mapping exactly onto a published threshold grades incorrect.
    ///
    /// Pure function; callers decide how to announce the verdict.
    pub fn grade(&self, value: f64) -> Result<bool, GraderError> {
        if !value.is_finite() {
            return Err(GraderError::OutOfDomain { value });
        }
        let v = scaled(value, self.scale);
        let salted =
            salted_plaintext(v, self.salt).ok_or(GraderError::OutOfDomain { value })?;
        let c = self.cipher.encrypt(salted);
        Ok(self.lower_bound < c && c < self.upper_bound)
    }
}

/// Threshold drawn uniformly between the ciphertexts of the bound's +-1
/// neighbors. An adaptive caller binary-searching `grade` can pin the
/// transition down to roughly one scaled unit, no further.
fn fuzzed_threshold<R: RngCore + CryptoRng>(
    cipher: &Ope,
    bound: i128,
    salt: u128,
    rng: &mut R,
) -> U256 {
    let center = salted_plaintext(bound, salt).expect("salt window keeps bounds in domain");
    let below = cipher.encrypt(center - 1);
    let above = cipher.encrypt(center + 1);
    ValueRange::new(below, above).sample(rng)
}

/// `value + salt` if it lands inside the cipher domain.
fn salted_plaintext(value: i128, salt: u128) -> Option<u128> {
    if value >= 0 {
        salt.checked_add(value as u128)
    } else {
        salt.checked_sub(value.unsigned_abs())
    }
}

/// Scaled unit the grader actually compares: `floor(value / scale)`.
fn scaled(value: f64, scale: f64) -> i128 {
    (value / scale).floor() as i128
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn concrete_scenario() {
        let g = RangeGrader::new(10.0, 20.0).unwrap();
        assert!(g.grade(15.0).unwrap());
        assert!(!g.grade(5.0).unwrap());
        assert!(!g.grade(25.0).unwrap());
    }

    #[test]
    fn scaled_scenario() {
        let g = RangeGrader::with_scale(1.0, 2.0, 0.1).unwrap();
        assert!(g.grade(1.5).unwrap());
        assert!(!g.grade(3.0).unwrap());
    }

    #[test]
    fn two_units_from_the_bounds_grade_deterministically() {
        for _ in 0..40 {
            let g = RangeGrader::new(10.0, 20.0).unwrap();
            for v in [12.0, 15.0, 18.0] {
                assert!(g.grade(v).unwrap(), "{v} lies well inside");
            }
            for v in [-3.0, 8.0, 22.0, 1000.0] {
                assert!(!g.grade(v).unwrap(), "{v} lies well outside");
            }
        }
    }

    #[test]
    fn near_boundary_verdicts_are_fuzzed() {
        // The published threshold lands between the encryptions of bound-1
        // and bound+1, so the bound itself must not grade the same way in
        // every fresh instance.
        let trials = 200;
        let mut accepted = 0;
        for _ in 0..trials {
            let g = RangeGrader::new(10.0, 20.0).unwrap();
            if g.grade(10.0).unwrap() {
                accepted += 1;
            }
        }
        assert!(accepted > 0, "lower bound never accepted over {trials} trials");
        assert!(accepted < trials, "lower bound always accepted over {trials} trials");
    }

    #[test]
    fn negative_bounds_are_supported() {
        let g = RangeGrader::new(-20.0, -10.0).unwrap();
        assert!(g.grade(-15.0).unwrap());
        assert!(!g.grade(-25.0).unwrap());
        assert!(!g.grade(0.0).unwrap());
    }

    #[test]
    fn same_seed_same_window() {
        let mut a = ChaCha20Rng::seed_from_u64(7);
        let mut b = ChaCha20Rng::seed_from_u64(7);
        let ga = RangeGrader::new_with_rng(10.0, 20.0, 1.0, &mut a).unwrap();
        let gb = RangeGrader::new_with_rng(10.0, 20.0, 1.0, &mut b).unwrap();
        assert_eq!(ga.salt, gb.salt);
        assert_eq!(ga.lower_bound, gb.lower_bound);
        assert_eq!(ga.upper_bound, gb.upper_bound);
        for v in 0..30 {
            assert_eq!(
                ga.grade(f64::from(v)).unwrap(),
                gb.grade(f64::from(v)).unwrap()
            );
        }
    }

    #[test]
    fn rejects_degenerate_windows() {
        for result in [
            RangeGrader::new(20.0, 10.0),
            RangeGrader::new(10.0, 10.0),
            RangeGrader::with_scale(10.0, 20.0, 0.0),
            RangeGrader::with_scale(10.0, 20.0, f64::NAN),
            // both bounds floor to the same scaled unit
            RangeGrader::with_scale(10.1, 10.2, 1.0),
            // wider than the cipher domain can shift into place
            RangeGrader::new(-1.8e38, 1.8e38),
        ] {
            assert!(matches!(result, Err(GraderError::InvalidRange { .. })));
        }
    }

    #[test]
    fn non_finite_values_leave_the_domain() {
        let g = RangeGrader::new(10.0, 20.0).unwrap();
        for v in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(g.grade(v), Err(GraderError::OutOfDomain { .. })));
        }
    }

    #[test]
    fn graders_are_shareable_across_threads() {
        fn is_send_sync<T: Send + Sync>() {}
        is_send_sync::<RangeGrader>();
        is_send_sync::<crate::ChoiceGrader>();
    }

    #[test]
    fn astronomically_wrong_values_never_grade_correct() {
        // Depending on the drawn salt these either overflow the domain or
        // land far outside the window; both read as incorrect submissions.
        let g = RangeGrader::new(10.0, 20.0).unwrap();
        for v in [1.0e39, -1.0e39] {
            match g.grade(v) {
                Ok(correct) => assert!(!correct),
                Err(GraderError::OutOfDomain { .. }) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
    }
}
