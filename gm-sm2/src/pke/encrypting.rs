//! Support for SM2 encryption.
//!
//! ## Algorithm
//!
//! ```text
//! A1: generate a random number k in [1, n-1]
//! A2: compute point C1 = [k]G = (x1, y1)
//! A3: compute point S = [h]PB, output "ERROR" if S is the point at infinity
//! A4: compute point [k]PB = (x2, y2)
//! A5: compute t = KDF(x2 || y2, klen), return to A1 if t is all zero
//! A6: compute C2 = M xor t
//! A7: compute C3 = Hash(x2 || M || y2)
//! A8: output the ciphertext C = C1 || C2 || C3
//! ```

use super::{Cipher, Mode};
use crate::{
    AffinePoint, Curve, Error, PublicKey, Result, arithmetic::MAX_RESAMPLING, kdf::derive_into,
};
use alloc::{vec, vec::Vec};
use rand_core::CryptoRngCore;
use sm3::{
    Sm3,
    digest::{Digest, FixedOutputReset},
};
use zeroize::Zeroizing;

/// Represents an encryption key used for encrypting messages using elliptic curve cryptography.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptingKey<'c> {
    public_key: PublicKey<'c>,
    mode: Mode,
}

impl<'c> EncryptingKey<'c> {
    /// Initialize [`EncryptingKey`] from a [`PublicKey`].
    ///
    /// Ciphertexts are laid out as [`Mode::C1C2C3`], see [`Mode::default`].
    pub fn new(public_key: PublicKey<'c>) -> Self {
        Self::new_with_mode(public_key, Mode::default())
    }

    /// Initialize [`EncryptingKey`] from a [`PublicKey`] and set the encryption mode.
    pub fn new_with_mode(public_key: PublicKey<'c>, mode: Mode) -> Self {
        Self { public_key, mode }
    }

    /// Initialize [`EncryptingKey`] from a SEC1-encoded public key.
    pub fn from_sec1_bytes(curve: &'c Curve, bytes: &[u8]) -> Result<Self> {
        Ok(Self::new(PublicKey::from_sec1_bytes(curve, bytes)?))
    }

    /// Initialize [`EncryptingKey`] from an affine point.
    ///
    /// Returns an [`Error`] if the given affine point is the additive identity
    /// (a.k.a. point at infinity).
    pub fn from_affine(affine: AffinePoint<'c>) -> Result<Self> {
        Ok(Self::new(PublicKey::from_affine(affine)?))
    }

    /// Borrow the inner [`AffinePoint`] for this public key.
    pub fn as_affine(&self) -> &AffinePoint<'c> {
        self.public_key.as_affine()
    }

    /// Borrow the [`PublicKey`].
    pub fn public_key(&self) -> &PublicKey<'c> {
        &self.public_key
    }

    /// Ciphertext layout used by this key.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Serialize the public key as a SEC1 point.
    pub fn to_sec1_bytes(&self, compress: bool) -> Vec<u8> {
        self.public_key.to_sec1_bytes(compress)
    }

    /// Length of the ciphertext [`EncryptingKey::encrypt`] produces for a
    /// `msg_len`-byte message.
    pub fn ciphertext_len(&self, msg_len: usize) -> usize {
        self.ciphertext_len_digest::<Sm3>(msg_len)
    }

    /// Length of the ciphertext produced with digest `D`.
    pub fn ciphertext_len_digest<D: Digest>(&self, msg_len: usize) -> usize {
        1 + 2 * self.public_key.curve().field_bytes_len() + <D as Digest>::output_size() + msg_len
    }

    /// Encrypts a message using the encryption key.
    ///
    /// This method calculates the digest using the `Sm3` hash function and then performs encryption.
    pub fn encrypt<R: CryptoRngCore + ?Sized>(&self, rng: &mut R, msg: &[u8]) -> Result<Vec<u8>> {
        self.encrypt_digest::<R, Sm3>(rng, msg)
    }

    /// Encrypts a message using a specified digest algorithm.
    pub fn encrypt_digest<R: CryptoRngCore + ?Sized, D>(
        &self,
        rng: &mut R,
        msg: &[u8],
    ) -> Result<Vec<u8>>
    where
        D: Digest + FixedOutputReset,
    {
        let cipher = self.encrypt_cipher::<R, D>(rng, msg)?;
        Ok(cipher.to_vec(self.mode))
    }

    /// Encrypts a message and returns the parsed [`Cipher`] view.
    pub fn encrypt_cipher<R: CryptoRngCore + ?Sized, D>(
        &self,
        rng: &mut R,
        msg: &[u8],
    ) -> Result<Cipher<'c, 'static, D>>
    where
        D: Digest + FixedOutputReset,
    {
        encrypt(rng, &self.public_key, &mut D::new(), msg)
    }
}

impl<'c> From<PublicKey<'c>> for EncryptingKey<'c> {
    fn from(value: PublicKey<'c>) -> Self {
        Self::new(value)
    }
}

/// Encrypts a message using the specified public key and digest algorithm.
fn encrypt<'c, R: CryptoRngCore + ?Sized, D>(
    rng: &mut R,
    public_key: &PublicKey<'c>,
    hasher: &mut D,
    msg: &[u8],
) -> Result<Cipher<'c, 'static, D>>
where
    D: Digest + FixedOutputReset,
{
    let curve = public_key.curve();
    let pb_point = public_key.as_affine();

    // A3: compute point S = [h]PB of the elliptic curve
    if pb_point.mul(curve.cofactor()).is_identity() {
        return Err(Error::InvalidPublicKey);
    }

    for _ in 0..MAX_RESAMPLING {
        // A1: generate a random number k in [1, n-1] with the random number generator
        let k = curve.random_scalar(rng)?;

        // A2: compute point C1 = [k]G = (x1, y1)
        let c1 = curve.generator().mul(&k);

        // A4: compute point [k]PB = (x2, y2)
        let kpb = pb_point.mul(&k);
        let (Some(x2), Some(y2)) = (kpb.x(), kpb.y()) else {
            continue;
        };
        let x2 = Zeroizing::new(x2.to_be_bytes());
        let y2 = Zeroizing::new(y2.to_be_bytes());

        // A5: compute t = KDF(x2||y2, klen)
        let mut t = Zeroizing::new(vec![0u8; msg.len()]);
        derive_into(hasher, &[x2.as_slice(), y2.as_slice()], t.as_mut_slice())?;

        // If t is an all-zero bit string, go to A1.
        if !msg.is_empty() && t.iter().all(|&byte| byte == 0) {
            continue;
        }

        // A6: compute C2 = M xor t
        let c2 = msg.iter().zip(t.iter()).map(|(m, t)| m ^ t).collect();

        // A7: compute C3 = Hash(x2||M||y2)
        Digest::update(hasher, x2.as_slice());
        Digest::update(hasher, msg);
        Digest::update(hasher, y2.as_slice());
        let c3 = Digest::finalize_reset(hasher);

        // A8: output the ciphertext C = C1||C2||C3.
        return Ok(Cipher::from_parts(c1, c2, c3));
    }

    Err(Error::ResamplingLimit)
}
