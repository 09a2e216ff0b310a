//! Support for verifying SM2DSA signatures.
//!
//! ## Algorithm
//!
//! ```text
//! B1: verify whether r' in [1,n-1], verification failed if not
//! B2: verify whether s' in [1,n-1], verification failed if not
//! B3: set M'~=ZA || M'
//! B4: calculate e'=Hv(M'~)
//! B5: calculate t = (r' + s') modn, verification failed if t=0
//! B6: calculate the point (x1', y1')=[s']G + [t]PA
//! B7: calculate R=(e'+x1') modn, verification pass if yes, otherwise failed
//! ```

use super::Signature;
use crate::{AffinePoint, Curve, DistId, PublicKey, Result, distid::hash_z};
use alloc::vec::Vec;
use core::fmt::{self, Debug};
use num_bigint::BigUint;
use num_traits::Zero;
use signature::{DigestVerifier, Error, Verifier, hazmat::PrehashVerifier};
use sm3::{
    Sm3,
    digest::{Digest, Output},
};

/// SM2DSA public key used for verifying signatures are valid for a given
/// message.
///
/// ## Usage
///
/// The [`signature`] crate defines the following traits which are the
/// primary API for verifying:
///
/// - [`Verifier`]: verify a message against a provided key and signature
/// - [`DigestVerifier`]: verify a message absorbed into a digest obtained
///   from [`VerifyingKey::new_digest`]
/// - [`PrehashVerifier`]: verify the low-level raw output bytes of a message digest
///
/// [`VerifyingKey::verify_der`] separates undecodable signatures (an `Err`)
/// from well-formed signatures that do not verify (`Ok(false)`).
pub struct VerifyingKey<'c, D: Digest = Sm3> {
    /// Signer's public key.
    public_key: PublicKey<'c>,

    /// Signer's user information hash `Z`.
    identity_hash: Output<D>,

    /// Distinguishing identifier used to compute `Z`.
    distid: Vec<u8>,
}

impl<'c> VerifyingKey<'c> {
    /// Initialize [`VerifyingKey`] from a signer's distinguishing identifier
    /// and public key.
    pub fn new(distid: &DistId, public_key: PublicKey<'c>) -> Result<Self> {
        Self::new_with_digest(distid, public_key)
    }

    /// Initialize [`VerifyingKey`] from a SEC1-encoded public key.
    pub fn from_sec1_bytes(curve: &'c Curve, distid: &DistId, bytes: &[u8]) -> Result<Self> {
        Self::new(distid, PublicKey::from_sec1_bytes(curve, bytes)?)
    }

    /// Initialize [`VerifyingKey`] from an affine point.
    ///
    /// Returns [`crate::Error::InvalidPublicKey`] if the given affine point is
    /// the additive identity (a.k.a. point at infinity).
    pub fn from_affine(distid: &DistId, affine: AffinePoint<'c>) -> Result<Self> {
        Self::new(distid, PublicKey::from_affine(affine)?)
    }
}

impl<'c, D: Digest> VerifyingKey<'c, D> {
    /// Initialize [`VerifyingKey`] hashing with `D` instead of SM3.
    pub fn new_with_digest(distid: &DistId, public_key: PublicKey<'c>) -> Result<Self> {
        let identity_hash = hash_z::<D>(distid, &public_key)?;

        Ok(Self {
            identity_hash,
            public_key,
            distid: distid.into(),
        })
    }

    /// Borrow the inner [`AffinePoint`] for this public key.
    pub fn as_affine(&self) -> &AffinePoint<'c> {
        self.public_key.as_affine()
    }

    /// Borrow the [`PublicKey`].
    pub fn public_key(&self) -> &PublicKey<'c> {
        &self.public_key
    }

    /// Get the distinguishing identifier for this key.
    pub fn distid(&self) -> &DistId {
        &self.distid
    }

    /// User information hash `Z` computed when this key was built.
    pub fn identity_hash(&self) -> &Output<D> {
        &self.identity_hash
    }

    /// Convert this [`VerifyingKey`] into the
    /// `Elliptic-Curve-Point-to-Octet-String` encoding described in
    /// SEC 1: Elliptic Curve Cryptography (Version 2.0) section 2.3.3
    /// (page 10).
    ///
    /// <http://www.secg.org/sec1-v2.pdf>
    pub fn to_sec1_bytes(&self, compress: bool) -> Vec<u8> {
        self.public_key.to_sec1_bytes(compress)
    }

    /// Fresh digest primed with `Z`, ready to absorb a message.
    pub fn new_digest(&self) -> D {
        D::new_with_prefix(&self.identity_hash)
    }

    /// Verify a DER-encoded signature.
    ///
    /// Returns `Err` when `signature` is not a valid DER encoding and
    /// `Ok(false)` when it decodes but does not verify.
    pub fn verify_der(&self, msg: &[u8], signature: &[u8]) -> Result<bool> {
        let signature = Signature::from_der(signature)?;
        Ok(self.verify_e(&BigUint::from_bytes_be(&self.hash_msg(msg)), &signature))
    }

    /// Compute message hash `e` according to [draft-shen-sm2-ecdsa § 5.2.1]
    ///
    /// [draft-shen-sm2-ecdsa § 5.2.1]: https://datatracker.ietf.org/doc/html/draft-shen-sm2-ecdsa-02#section-5.2.1
    pub(crate) fn hash_msg(&self, msg: &[u8]) -> Output<D> {
        self.new_digest().chain_update(msg).finalize()
    }

    fn verify_e(&self, e: &BigUint, signature: &Signature) -> bool {
        let curve = self.public_key.curve();
        let n = curve.order();
        let (r, s) = (signature.r(), signature.s());

        // B1: verify whether r' in [1,n-1], verification failed if not
        // B2: verify whether s' in [1,n-1], verification failed if not
        if r.is_zero() || r >= n || s.is_zero() || s >= n {
            return false;
        }

        // B5: calculate t = (r' + s') modn, verification failed if t=0
        let t = (r + s) % n;
        if t.is_zero() {
            return false;
        }

        // B6: calculate the point (x1', y1')=[s']G + [t]PA
        let point = &curve.generator().mul(s) + &self.as_affine().mul(&t);

        // B7: calculate R=(e'+x1') modn, verification pass if yes, otherwise failed
        match point.x() {
            Some(x1) => &((e + x1.as_uint()) % n) == r,
            None => false,
        }
    }
}

//
// `*Verifier` trait impls
//

impl<D: Digest> PrehashVerifier<Signature> for VerifyingKey<'_, D> {
    fn verify_prehash(&self, prehash: &[u8], signature: &Signature) -> signature::Result<()> {
        if prehash.len() != <D as Digest>::output_size() {
            return Err(Error::new());
        }

        // B4: calculate e'=Hv(M'~)
        let e = BigUint::from_bytes_be(prehash);

        if self.verify_e(&e, signature) {
            Ok(())
        } else {
            Err(Error::new())
        }
    }
}

impl<D: Digest> Verifier<Signature> for VerifyingKey<'_, D> {
    fn verify(&self, msg: &[u8], signature: &Signature) -> signature::Result<()> {
        // B3: set M'~=ZA || M'
        let hash = self.hash_msg(msg);
        self.verify_prehash(&hash, signature)
    }
}

impl<D: Digest> DigestVerifier<D, Signature> for VerifyingKey<'_, D> {
    fn verify_digest(&self, digest: D, signature: &Signature) -> signature::Result<()> {
        self.verify_prehash(&digest.finalize(), signature)
    }
}

//
// Other trait impls
//

impl<'c, D: Digest> AsRef<AffinePoint<'c>> for VerifyingKey<'c, D> {
    fn as_ref(&self) -> &AffinePoint<'c> {
        self.as_affine()
    }
}

impl<D: Digest> Clone for VerifyingKey<'_, D> {
    fn clone(&self) -> Self {
        Self {
            public_key: self.public_key.clone(),
            identity_hash: self.identity_hash.clone(),
            distid: self.distid.clone(),
        }
    }
}

impl<D: Digest> Debug for VerifyingKey<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifyingKey")
            .field("public_key", &self.public_key)
            .field("distid", &self.distid)
            .finish_non_exhaustive()
    }
}

impl<D: Digest> Eq for VerifyingKey<'_, D> {}
impl<D: Digest> PartialEq for VerifyingKey<'_, D> {
    fn eq(&self, other: &Self) -> bool {
        self.public_key == other.public_key && self.distid == other.distid
    }
}

impl<'c, D: Digest> From<VerifyingKey<'c, D>> for PublicKey<'c> {
    fn from(verifying_key: VerifyingKey<'c, D>) -> PublicKey<'c> {
        verifying_key.public_key
    }
}

impl<'c, D: Digest> From<&VerifyingKey<'c, D>> for PublicKey<'c> {
    fn from(verifying_key: &VerifyingKey<'c, D>) -> PublicKey<'c> {
        verifying_key.public_key.clone()
    }
}
