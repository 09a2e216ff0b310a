//! Support for SM2 decryption.
//!
//! ## Algorithm
//!
//! ```text
//! B1: get C1 from C, verify that C1 satisfies the curve equation
//! B2: compute point S = [h]C1, output "ERROR" if S is the point at infinity
//! B3: compute [dB]C1 = (x2, y2)
//! B4: compute t = KDF(x2 || y2, klen), output "ERROR" if t is all zero
//! B5: get C2 from C and compute M' = C2 xor t
//! B6: compute u = Hash(x2 || M' || y2), output "ERROR" if u != C3
//! B7: output the plaintext M'
//! ```

use super::{Cipher, Mode, encrypting::EncryptingKey};
use crate::{Curve, Error, Result, SecretKey, kdf::derive_into};
use alloc::{vec, vec::Vec};
use core::fmt::{self, Debug};
use rand_core::CryptoRngCore;
use sm3::{
    Sm3,
    digest::{Digest, FixedOutputReset},
};
use subtle::{Choice, ConstantTimeEq};
use zeroize::{Zeroize, Zeroizing};

/// Represents a decryption key used for decrypting messages using elliptic curve cryptography.
#[derive(Clone)]
pub struct DecryptingKey<'c> {
    secret_key: SecretKey<'c>,
    encrypting_key: EncryptingKey<'c>,
    mode: Mode,
}

impl<'c> DecryptingKey<'c> {
    /// Creates a new `DecryptingKey` from a `SecretKey` with the default
    /// decryption mode ([`Mode::C1C2C3`], see [`Mode::default`]).
    pub fn new(secret_key: SecretKey<'c>) -> Self {
        Self::new_with_mode(secret_key, Mode::default())
    }

    /// Creates a new `DecryptingKey` from a `SecretKey` and sets the decryption mode.
    pub fn new_with_mode(secret_key: SecretKey<'c>, mode: Mode) -> Self {
        let encrypting_key = EncryptingKey::new_with_mode(secret_key.public_key(), mode);
        Self {
            secret_key,
            encrypting_key,
            mode,
        }
    }

    /// Generate a random key using the default mode.
    pub fn random<R: CryptoRngCore + ?Sized>(curve: &'c Curve, rng: &mut R) -> Result<Self> {
        Ok(Self::new(SecretKey::random(curve, rng)?))
    }

    /// Parse decrypting key from big endian-encoded byte slice containing a
    /// secret scalar value.
    pub fn from_slice(curve: &'c Curve, slice: &[u8]) -> Result<Self> {
        Ok(Self::new(SecretKey::from_slice(curve, slice)?))
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

    /// Get the [`EncryptingKey`] which corresponds to this [`DecryptingKey`].
    pub fn encrypting_key(&self) -> &EncryptingKey<'c> {
        &self.encrypting_key
    }

    /// Ciphertext layout expected by this key.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Decrypts a ciphertext using the default digest algorithm (`Sm3`).
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.decrypt_digest::<Sm3>(ciphertext)
    }

    /// Decrypts a ciphertext using the specified digest algorithm.
    pub fn decrypt_digest<D>(&self, ciphertext: &[u8]) -> Result<Vec<u8>>
    where
        D: Digest + FixedOutputReset,
    {
        let cipher =
            Cipher::<D>::from_slice_digest(self.secret_key.curve(), ciphertext, self.mode)?;
        self.decrypt_cipher(&cipher)
    }

    /// Decrypts an already parsed [`Cipher`].
    pub fn decrypt_cipher<D>(&self, cipher: &Cipher<'_, '_, D>) -> Result<Vec<u8>>
    where
        D: Digest + FixedOutputReset,
    {
        decrypt(&self.secret_key, &mut D::new(), cipher)
    }
}

//
// Other trait impls
//

impl<'c> AsRef<EncryptingKey<'c>> for DecryptingKey<'c> {
    fn as_ref(&self) -> &EncryptingKey<'c> {
        &self.encrypting_key
    }
}

impl ConstantTimeEq for DecryptingKey<'_> {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.secret_key.ct_eq(&other.secret_key)
    }
}

impl Debug for DecryptingKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptingKey")
            .field("encrypting_key", &self.encrypting_key)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

/// Constant-time comparison
impl Eq for DecryptingKey<'_> {}
impl PartialEq for DecryptingKey<'_> {
    fn eq(&self, other: &DecryptingKey<'_>) -> bool {
        self.ct_eq(other).into()
    }
}

fn decrypt<D>(
    secret_key: &SecretKey<'_>,
    hasher: &mut D,
    cipher: &Cipher<'_, '_, D>,
) -> Result<Vec<u8>>
where
    D: Digest + FixedOutputReset,
{
    if cipher.c1().curve() != secret_key.curve() {
        return Err(Error::CurveMismatch);
    }

    // B3: compute [dB]C1 = (x2, y2)
    let point = cipher.c1().mul(secret_key.as_scalar());
    let (Some(x2), Some(y2)) = (point.x(), point.y()) else {
        return Err(Error::InvalidPoint);
    };
    let x2 = Zeroizing::new(x2.to_be_bytes());
    let y2 = Zeroizing::new(y2.to_be_bytes());

    // B4: compute t = KDF(x2 || y2, klen)
    let c2 = cipher.c2();
    let mut plaintext = vec![0u8; c2.len()];
    derive_into(hasher, &[x2.as_slice(), y2.as_slice()], &mut plaintext)?;

    if !c2.is_empty() && plaintext.iter().all(|&byte| byte == 0) {
        return Err(Error::KdfZero);
    }

    // B5: get C2 from C and compute M' = C2 xor t
    for (m, c) in plaintext.iter_mut().zip(c2) {
        *m ^= c;
    }

    // B6: compute u = Hash(x2 || M' || y2)
    Digest::update(hasher, x2.as_slice());
    Digest::update(hasher, &plaintext);
    Digest::update(hasher, y2.as_slice());
    let u = Digest::finalize_reset(hasher);

    // If u != C3, output "ERROR" and exit
    if !bool::from(u.as_slice().ct_eq(cipher.c3().as_slice())) {
        plaintext.zeroize();
        return Err(Error::MacMismatch);
    }

    // B7: output the plaintext M'
    Ok(plaintext)
}
