//! Support for SM2DSA signing.
//!
//! ## Algorithm
//!
//! ```text
//! A1: set M~=ZA || M
//! A2: calculate e=Hv(M~)
//! A3: pick a random number k in [1, n-1] via a random number generator
//! A4: calculate the elliptic curve point (x1, y1)=[k]G
//! A5: calculate r=(e+x1) modn, return to A3 if r=0 or r+k=n
//! A6: calculate s=((1+dA)^(-1)*(k-r*dA)) modn, return to A3 if s=0
//! A7: the digital signature of M is (r, s)
//! ```

use super::{Signature, VerifyingKey};
use crate::{Curve, DistId, Error, Result, SecretKey, arithmetic::MAX_RESAMPLING};
use alloc::vec::Vec;
use core::fmt::{self, Debug};
use num_bigint::BigUint;
use num_traits::Zero;
use signature::{
    KeypairRef, RandomizedDigestSigner, RandomizedSigner, hazmat::RandomizedPrehashSigner,
    rand_core::CryptoRngCore,
};
use sm3::{Digest, Sm3};
use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroizing;

#[cfg(feature = "getrandom")]
use {rand_core::OsRng, signature::Signer};

/// SM2DSA secret key used for signing messages and producing signatures.
///
/// ## Usage
///
/// The [`signature`] crate defines the following traits which are the
/// primary API for signing:
///
/// - [`RandomizedSigner`]: sign a message with a caller-supplied RNG
/// - [`Signer`]: sign a message using the operating system RNG
/// - [`RandomizedDigestSigner`]: sign a message absorbed into a digest
///   obtained from [`SigningKey::new_digest`]
/// - [`RandomizedPrehashSigner`]: sign the low-level raw output bytes of a message digest
pub struct SigningKey<'c, D: Digest = Sm3> {
    /// Secret key.
    secret_key: SecretKey<'c>,

    /// Verifying key for this signing key.
    verifying_key: VerifyingKey<'c, D>,
}

impl<'c> SigningKey<'c> {
    /// Create signing key from a signer's distinguishing identifier and
    /// secret key.
    pub fn new(distid: &DistId, secret_key: &SecretKey<'c>) -> Result<Self> {
        Self::new_with_digest(distid, secret_key)
    }

    /// Parse signing key from big endian-encoded byte slice containing a secret
    /// scalar value.
    pub fn from_slice(curve: &'c Curve, distid: &DistId, slice: &[u8]) -> Result<Self> {
        Self::from_slice_with_digest(curve, distid, slice)
    }
}

impl<'c, D: Digest> SigningKey<'c, D> {
    /// Create signing key hashing with `D` instead of SM3.
    pub fn new_with_digest(distid: &DistId, secret_key: &SecretKey<'c>) -> Result<Self> {
        let verifying_key = VerifyingKey::new_with_digest(distid, secret_key.public_key())?;
        Ok(Self {
            secret_key: secret_key.clone(),
            verifying_key,
        })
    }

    /// Parse signing key hashing with `D` from a big-endian scalar.
    pub fn from_slice_with_digest(
        curve: &'c Curve,
        distid: &DistId,
        slice: &[u8],
    ) -> Result<Self> {
        Self::new_with_digest(distid, &SecretKey::from_slice(curve, slice)?)
    }

    /// Serialize as bytes.
    pub fn to_bytes(&self) -> Zeroizing<Vec<u8>> {
        self.secret_key.to_bytes()
    }

    /// Borrow the [`SecretKey`] for this key.
    ///
    /// # ⚠️ Warning
    ///
    /// This value is key material.
    ///
    /// Please treat it with the care it deserves!
    pub fn as_secret_key(&self) -> &SecretKey<'c> {
        &self.secret_key
    }

    /// Get the [`VerifyingKey`] which corresponds to this [`SigningKey`].
    pub fn verifying_key(&self) -> &VerifyingKey<'c, D> {
        &self.verifying_key
    }

    /// Get the distinguishing identifier for this key.
    pub fn distid(&self) -> &DistId {
        self.verifying_key.distid()
    }

    /// Fresh digest primed with this key's `Z`, ready to absorb a message.
    pub fn new_digest(&self) -> D {
        self.verifying_key.new_digest()
    }

    /// Sign `e = Hv(Z || M)`.
    fn sign_prehash_inner<R: CryptoRngCore + ?Sized>(
        &self,
        rng: &mut R,
        prehash: &[u8],
    ) -> Result<Signature> {
        if prehash.len() != <D as Digest>::output_size() {
            return Err(Error::Malformed);
        }

        // A2: calculate e=Hv(M~)
        let e = BigUint::from_bytes_be(prehash);
        sign_e(&self.secret_key, rng, &e)
    }
}

//
// `*Signer` trait impls
//

impl<D: Digest> RandomizedPrehashSigner<Signature> for SigningKey<'_, D> {
    fn sign_prehash_with_rng(
        &self,
        rng: &mut impl CryptoRngCore,
        prehash: &[u8],
    ) -> signature::Result<Signature> {
        Ok(self.sign_prehash_inner(rng, prehash)?)
    }
}

impl<D: Digest> RandomizedSigner<Signature> for SigningKey<'_, D> {
    fn try_sign_with_rng(
        &self,
        rng: &mut impl CryptoRngCore,
        msg: &[u8],
    ) -> signature::Result<Signature> {
        // A1: set M~=ZA || M
        let hash = self.verifying_key.hash_msg(msg);
        self.sign_prehash_with_rng(rng, &hash)
    }
}

impl<D: Digest> RandomizedDigestSigner<D, Signature> for SigningKey<'_, D> {
    fn try_sign_digest_with_rng(
        &self,
        rng: &mut impl CryptoRngCore,
        digest: D,
    ) -> signature::Result<Signature> {
        self.sign_prehash_with_rng(rng, &digest.finalize())
    }
}

#[cfg(feature = "getrandom")]
impl<D: Digest> Signer<Signature> for SigningKey<'_, D> {
    fn try_sign(&self, msg: &[u8]) -> signature::Result<Signature> {
        self.try_sign_with_rng(&mut OsRng, msg)
    }
}

//
// Other trait impls
//

impl<'c, D: Digest> AsRef<VerifyingKey<'c, D>> for SigningKey<'c, D> {
    fn as_ref(&self) -> &VerifyingKey<'c, D> {
        &self.verifying_key
    }
}

impl<D: Digest> Clone for SigningKey<'_, D> {
    fn clone(&self) -> Self {
        Self {
            secret_key: self.secret_key.clone(),
            verifying_key: self.verifying_key.clone(),
        }
    }
}

impl<D: Digest> ConstantTimeEq for SigningKey<'_, D> {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.secret_key.ct_eq(&other.secret_key)
    }
}

impl<D: Digest> Debug for SigningKey<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("verifying_key", &self.verifying_key)
            .finish_non_exhaustive()
    }
}

/// Constant-time comparison
impl<D: Digest> Eq for SigningKey<'_, D> {}
impl<D: Digest> PartialEq for SigningKey<'_, D> {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl<'c, D: Digest> KeypairRef for SigningKey<'c, D> {
    type VerifyingKey = VerifyingKey<'c, D>;
}

/// Compute a signature over `e` with a fresh random `k` per attempt.
fn sign_e<R: CryptoRngCore + ?Sized>(
    secret_key: &SecretKey<'_>,
    rng: &mut R,
    e: &BigUint,
) -> Result<Signature> {
    let curve = secret_key.curve();
    let n = curve.order();
    let d = curve.scalar(secret_key.as_scalar());

    let d_plus_1_inv = curve
        .scalar(&(secret_key.as_scalar() + 1u8))
        .invert()
        .ok_or(Error::NotInvertible)?;

    for _ in 0..MAX_RESAMPLING {
        // A3: pick a random number k in [1, n-1] via a random number generator
        let k = curve.random_scalar(rng)?;

        // A4: calculate the elliptic curve point (x1, y1)=[k]G
        let point = curve.generator().mul(&k);
        let Some(x1) = point.x() else {
            continue;
        };

        // A5: calculate r=(e+x1) modn, return to A3 if r=0 or r+k=n
        let r = (e + x1.as_uint()) % n;
        if r.is_zero() || &(&r + &k) == n {
            continue;
        }

        // A6: calculate s=((1+dA)^(-1)*(k-r*dA)) modn, return to A3 if s=0
        let r = curve.scalar(&r);
        let s = &d_plus_1_inv * &(&curve.scalar(&k) - &(&r * &d));
        if s.is_zero() {
            continue;
        }

        // A7: the digital signature of M is (r, s)
        return Ok(Signature::from_scalars(r.as_uint().clone(), s.as_uint().clone()));
    }

    Err(Error::ResamplingLimit)
}
