//! C1 — hash derivation.
//!
//! Turns a candidate string into `per_item` slot indices in `[0, slots)`.
//! The digest family is picked by the number of bits required to cover
//! `per_item` independent `log2(slots)`-bit draws; see `choose_digest`.

use crate::error::{OracleError, Result};
use digest::Digest;

/// Digest families the sketch can fall back to, ordered by output width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestKind {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl DigestKind {
    pub fn output_bits(self) -> u32 {
        match self {
            DigestKind::Md5 => 128,
            DigestKind::Sha1 => 160,
            DigestKind::Sha224 => 224,
            DigestKind::Sha256 => 256,
            DigestKind::Sha384 => 384,
            DigestKind::Sha512 => 512,
        }
    }

    fn digest_bytes(self, s: &[u8]) -> Vec<u8> {
        match self {
            DigestKind::Md5 => md5::Md5::digest(s).to_vec(),
            DigestKind::Sha1 => sha1::Sha1::digest(s).to_vec(),
            DigestKind::Sha224 => sha2::Sha224::digest(s).to_vec(),
            DigestKind::Sha256 => sha2::Sha256::digest(s).to_vec(),
            DigestKind::Sha384 => sha2::Sha384::digest(s).to_vec(),
            DigestKind::Sha512 => sha2::Sha512::digest(s).to_vec(),
        }
    }
}

/// Picks the smallest digest whose output covers `required_bits`.
///
/// Mirrors the table in spec.md §4.1: strict `<` thresholds at 128/160/224/
/// 256/384/512, and a `ParameterError` at or above 512 (the source's
/// SHA-512 branch is selected here rather than reproducing its
/// `self.hash_func`/`self.hashfunc` typo — see spec.md §9(b)).
pub fn choose_digest(required_bits: f64) -> Result<DigestKind> {
    if required_bits < 128.0 {
        Ok(DigestKind::Md5)
    } else if required_bits < 160.0 {
        Ok(DigestKind::Sha1)
    } else if required_bits < 224.0 {
        Ok(DigestKind::Sha224)
    } else if required_bits < 256.0 {
        Ok(DigestKind::Sha256)
    } else if required_bits < 384.0 {
        Ok(DigestKind::Sha384)
    } else if required_bits < 512.0 {
        Ok(DigestKind::Sha512)
    } else {
        Err(OracleError::ParameterError(format!(
            "{required_bits} bits is just too many for this implementation"
        )))
    }
}

/// Derives `per_item` slot indices in `[0, slots)` for `s`.
///
/// Computes a digest `D(s)`, interprets it as a single big-endian integer
/// `H`, and repeatedly extracts `h_i = H mod slots; H /= slots`.
pub fn hashes(digest: DigestKind, slots: u64, per_item: usize, s: &str) -> Vec<u64> {
    let bytes = digest.digest_bytes(s.as_bytes());
    let mut h = big_endian_to_biguint(&bytes);
    let modulus = BigUint::from_u64(slots);

    let mut out = Vec::with_capacity(per_item);
    for _ in 0..per_item {
        let (q, r) = h.div_rem_small(&modulus);
        out.push(r);
        h = q;
    }
    out
}

/// Minimal big-endian arbitrary-precision unsigned integer, just large
/// enough to support "interpret digest as integer, divmod by slots
/// repeatedly". `slots` is always small enough to fit in a u64, so the
/// remainder of each division fits in a u64 too.
#[derive(Clone)]
struct BigUint {
    // Little-endian base-2^32 limbs.
    limbs: Vec<u32>,
}

impl BigUint {
    fn from_u64(v: u64) -> Self {
        BigUint {
            limbs: vec![(v & 0xffff_ffff) as u32, (v >> 32) as u32],
        }
    }

    /// Divides `self` by `modulus` (assumed to fit in 64 bits), returning
    /// `(quotient, remainder)`. Schoolbook long division, one limb at a
    /// time, most-significant limb first.
    fn div_rem_small(&self, modulus: &BigUint) -> (BigUint, u64) {
        let divisor = ((modulus.limbs.get(1).copied().unwrap_or(0) as u64) << 32)
            | modulus.limbs[0] as u64;
        assert!(divisor != 0, "slots must be nonzero");

        let mut quotient_limbs = vec![0u32; self.limbs.len()];
        let mut remainder: u128 = 0;

        for i in (0..self.limbs.len()).rev() {
            remainder = (remainder << 32) | self.limbs[i] as u128;
            let q = (remainder / divisor as u128) as u32;
            remainder %= divisor as u128;
            quotient_limbs[i] = q;
        }

        (BigUint { limbs: quotient_limbs }, remainder as u64)
    }
}

fn big_endian_to_biguint(bytes: &[u8]) -> BigUint {
    // Pack 4 bytes (big-endian within the digest) per limb, least-
    // significant limb first, by walking the digest from its tail.
    let mut limbs: Vec<u32> = bytes
        .rchunks(4)
        .map(|chunk| {
            let mut buf = [0u8; 4];
            buf[4 - chunk.len()..].copy_from_slice(chunk);
            u32::from_be_bytes(buf)
        })
        .collect();
    if limbs.is_empty() {
        limbs.push(0);
    }
    BigUint { limbs }
}
