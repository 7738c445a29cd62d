//! Order-preserving cipher over a fixed 128-bit domain.
//!
//! `Ope` maps every `u128` plaintext into a 256-bit output interval so that
//! `a < b` implies `encrypt(a) < encrypt(b)`. The map is determined entirely
//! by the key: each node of the implicit bisection tree over the domain
//! derives a ChaCha20 stream from HKDF(key, node interval) and splits its
//! ciphertext interval at a point drawn from that stream. The 128-bit
//! expansion leaves the split points room to wander without starving either
//! half of ciphertexts.

use crypto_bigint::{NonZero, Random, RandomMod, U256};
use hkdf::Hkdf;
use rand::{CryptoRng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;

/// 256-bit key material. One fresh key per grader instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpeKey([u8; 32]);

impl OpeKey {
    /// Wrap raw key bytes (used when reloading a persisted grader).
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Borrow the raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// Inclusive interval of 256-bit ciphertext values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValueRange {
    /// Smallest value in the interval.
    pub min: U256,
    /// Largest value in the interval.
    pub max: U256,
}

impl ValueRange {
    /// `[min, max]`, inclusive on both ends.
    #[must_use]
    pub fn new(min: U256, max: U256) -> Self {
        assert!(min <= max, "interval bounds must be ordered");
        Self { min, max }
    }

    /// The full ciphertext space `[0, 2^256 - 1]`.
    #[must_use]
    pub fn full() -> Self {
        Self {
            min: U256::ZERO,
            max: U256::MAX,
        }
    }

    /// Whether `value` lies inside the interval.
    #[must_use]
    pub fn contains(&self, value: &U256) -> bool {
        self.min <= *value && *value <= self.max
    }

    /// Uniform draw from the interval.
    pub fn sample<R: RngCore + CryptoRng>(&self, rng: &mut R) -> U256 {
        let span = self.max.wrapping_sub(&self.min).wrapping_add(&U256::ONE);
        if span == U256::ZERO {
            // span wrapped to zero: the interval covers all of U256
            return U256::random(rng);
        }
        let offset = U256::random_mod(rng, &NonZero::new(span).expect("span is nonzero"));
        self.min.wrapping_add(&offset)
    }
}

/// Keyed order-preserving transform: domain `[0, 2^128 - 1]`, caller-chosen
/// output range.
#[derive(Clone, Debug)]
pub struct Ope {
    key: OpeKey,
    out_range: ValueRange,
}

impl Ope {
    /// Fresh, independent key material.
    ///
    /// Keys must not be shared across grader instances: whoever holds a key
    /// can encrypt chosen plaintexts offline.
    pub fn generate_key<R: RngCore + CryptoRng>(rng: &mut R) -> OpeKey {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        OpeKey(bytes)
    }

    /// Instantiate the cipher over `out_range`. The output interval must
    /// hold at least as many values as the `u128` domain, otherwise a
    /// strictly increasing map cannot exist.
    #[must_use]
    pub fn new(key: OpeKey, out_range: ValueRange) -> Self {
        let gap = out_range.max.wrapping_sub(&out_range.min);
        assert!(
            gap >= U256::from_u128(u128::MAX),
            "output range narrower than the domain"
        );
        Self { key, out_range }
    }

    /// Borrow the key (persistence needs it back out).
    #[must_use]
    pub fn key(&self) -> &OpeKey {
        &self.key
    }

    /// Deterministic, strictly order-preserving encryption of `plaintext`.
    ///
    /// Total over `u128`: the domain is exactly `[0, 2^128 - 1]`, so
    /// in-domain checks live at the call sites doing salted arithmetic.
    #[must_use]
    pub fn encrypt(&self, plaintext: u128) -> U256 {
        let mut d_lo: u128 = 0;
        let mut d_hi: u128 = u128::MAX;
        let mut r_lo = self.out_range.min;
        let mut r_hi = self.out_range.max;

        // Invariant at every node: r_hi - r_lo >= d_hi - d_lo.
        loop {
            let mut prg = self.node_prg(d_lo, d_hi);
            if d_lo == d_hi {
                return ValueRange::new(r_lo, r_hi).sample(&mut prg);
            }
            let d_mid = d_lo + (d_hi - d_lo) / 2;
            // Leave each half at least one ciphertext per plaintext.
            let split_lo = r_lo.wrapping_add(&U256::from_u128(d_mid - d_lo));
            let split_hi = r_hi.wrapping_sub(&U256::from_u128(d_hi - d_mid));
            let split = ValueRange::new(split_lo, split_hi).sample(&mut prg);
            if plaintext <= d_mid {
                d_hi = d_mid;
                r_hi = split;
            } else {
                d_lo = d_mid + 1;
                r_lo = split.wrapping_add(&U256::ONE);
            }
        }
    }

    /// ChaCha20 stream bound to this key and one bisection node.
    fn node_prg(&self, d_lo: u128, d_hi: u128) -> ChaCha20Rng {
        let mut ikm = [0u8; 32];
        ikm[..16].copy_from_slice(&d_lo.to_be_bytes());
        ikm[16..].copy_from_slice(&d_hi.to_be_bytes());
        let hk = Hkdf::<Sha256>::new(Some(&self.key.0), &ikm);
        let mut seed = [0u8; 32];
        hk.expand(b"ope interval split", &mut seed)
            .expect("32 bytes is a valid hkdf output length");
        ChaCha20Rng::from_seed(seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    fn cipher() -> Ope {
        Ope::new(Ope::generate_key(&mut OsRng), ValueRange::full())
    }

    #[test]
    fn encrypt_is_deterministic() {
        let ope = cipher();
        for m in [0u128, 1, 17, u128::MAX / 2, u128::MAX] {
            assert_eq!(ope.encrypt(m), ope.encrypt(m));
        }
    }

    #[test]
    fn encrypt_preserves_order() {
        let ope = cipher();
        let mut points: Vec<u128> = vec![0, 1, 2, 3, u128::MAX - 1, u128::MAX];
        let mut v = 1u128;
        while v < u128::MAX / 3 {
            points.push(v);
            points.push(v + 1);
            v = v.saturating_mul(5).saturating_add(1);
        }
        points.sort_unstable();
        points.dedup();
        let cts: Vec<U256> = points.iter().map(|&m| ope.encrypt(m)).collect();
        for pair in cts.windows(2) {
            assert!(pair[0] < pair[1], "ciphertexts must be strictly increasing");
        }
    }

    #[test]
    fn distinct_keys_give_distinct_maps() {
        let a = cipher();
        let b = cipher();
        let same = (0u128..64).all(|m| a.encrypt(m) == b.encrypt(m));
        assert!(!same, "two fresh keys produced the same transform");
    }

    #[test]
    fn ciphertexts_stay_in_the_output_range() {
        let range = ValueRange::full();
        let ope = Ope::new(Ope::generate_key(&mut OsRng), range);
        for m in [0u128, 42, u128::MAX] {
            assert!(range.contains(&ope.encrypt(m)));
        }
    }

    #[test]
    fn sample_stays_inside_the_interval() {
        let range = ValueRange::new(U256::from_u128(10), U256::from_u128(12));
        for _ in 0..100 {
            assert!(range.contains(&range.sample(&mut OsRng)));
        }
    }
}
