//! Secret scalars.

use crate::{
    Curve, Error, PublicKey, Result,
    arithmetic::{byte_len, to_be_bytes_padded},
};
use alloc::vec::Vec;
use core::fmt;
use num_bigint::BigUint;
use num_traits::Zero;
use rand_core::CryptoRngCore;
use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroizing;

/// SM2 secret key: a scalar `d` in `[1, n - 1]` on a particular [`Curve`].
///
/// # ⚠️ Warning
///
/// The scalar is held in a [`BigUint`], which is **not** zeroized on drop.
/// Only the buffers returned by [`SecretKey::to_bytes`] are wiped.
#[derive(Clone)]
pub struct SecretKey<'c> {
    curve: &'c Curve,
    scalar: BigUint,
}

impl<'c> SecretKey<'c> {
    /// Wrap a secret scalar, checking that it lies in `[1, n - 1]`.
    pub fn new(curve: &'c Curve, scalar: BigUint) -> Result<Self> {
        if scalar.is_zero() || &scalar >= curve.order() {
            return Err(Error::InvalidSecretKey);
        }

        Ok(Self { curve, scalar })
    }

    /// Generate a random [`SecretKey`].
    pub fn random<R: CryptoRngCore + ?Sized>(curve: &'c Curve, rng: &mut R) -> Result<Self> {
        let scalar = curve.random_scalar(rng)?;
        Ok(Self { curve, scalar })
    }

    /// Deserialize a big-endian scalar.
    ///
    /// Inputs longer than the encoded group order are rejected; shorter ones
    /// are treated as if left-padded with zeros.
    pub fn from_slice(curve: &'c Curve, bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() || bytes.len() > byte_len(curve.order()) {
            return Err(Error::Malformed);
        }

        Self::new(curve, BigUint::from_bytes_be(bytes))
    }

    /// Serialize as big-endian bytes, zero-padded to the length of `n`.
    pub fn to_bytes(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(to_be_bytes_padded(&self.scalar, byte_len(self.curve.order())))
    }

    /// Borrow the secret scalar.
    ///
    /// # ⚠️ Warning
    ///
    /// This value is key material.
    ///
    /// Please treat it with the care it deserves!
    pub fn as_scalar(&self) -> &BigUint {
        &self.scalar
    }

    /// Curve this key belongs to.
    pub fn curve(&self) -> &'c Curve {
        self.curve
    }

    /// Compute the matching public key `[d]G`.
    pub fn public_key(&self) -> PublicKey<'c> {
        PublicKey::from_secret_scalar(self.curve, &self.scalar)
    }
}

impl ConstantTimeEq for SecretKey<'_> {
    fn ct_eq(&self, other: &Self) -> Choice {
        let len = byte_len(self.curve.order());
        let lhs = Zeroizing::new(to_be_bytes_padded(&self.scalar, len));
        let rhs = Zeroizing::new(to_be_bytes_padded(&other.scalar, len));
        lhs.as_slice().ct_eq(rhs.as_slice()) & Choice::from(u8::from(self.curve == other.curve))
    }
}

/// Constant-time comparison
impl Eq for SecretKey<'_> {}
impl PartialEq for SecretKey<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl fmt::Debug for SecretKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey").finish_non_exhaustive()
    }
}
