//! SM2 Encryption Algorithm (SM2) as defined in [draft-shen-sm2-ecdsa § 5].
//!
//! ## Usage
#![cfg_attr(feature = "getrandom", doc = "```")]
#![cfg_attr(not(feature = "getrandom"), doc = "```ignore")]
//! # fn example() -> gm_sm2::Result<()> {
//! use gm_sm2::{Curve, SecretKey, pke::{Cipher, DecryptingKey, EncryptingKey, Mode}};
//! use rand_core::OsRng;
//!
//! let curve = Curve::sm2p256v1();
//!
//! // Encrypting
//! let secret_key = SecretKey::random(&curve, &mut OsRng)?; // serialize with `::to_bytes()`
//! let encrypting_key = EncryptingKey::new_with_mode(secret_key.public_key(), Mode::C1C3C2);
//! let plaintext = b"plaintext";
//! let ciphertext = encrypting_key.encrypt(&mut OsRng, plaintext)?;
//!
//! // Reordering without decrypting
//! let cipher = Cipher::from_slice(&curve, &ciphertext, Mode::C1C3C2)?;
//! let legacy = cipher.to_vec(Mode::C1C2C3);
//!
//! // Decrypting
//! let decrypting_key = DecryptingKey::new(secret_key);
//! assert_eq!(decrypting_key.decrypt(&legacy)?, plaintext);
//! # Ok(())
//! # }
//! ```
//!
//! [draft-shen-sm2-ecdsa § 5]: https://datatracker.ietf.org/doc/html/draft-shen-sm2-ecdsa-02#section-5

use crate::{AffinePoint, Curve, Error, Result};
use alloc::{borrow::Cow, vec::Vec};
use sm3::{
    Sm3,
    digest::{Output, OutputSizeUser},
};

mod decrypting;
mod encrypting;

pub use self::{decrypting::DecryptingKey, encrypting::EncryptingKey};

/// Modes for the cipher encoding/decoding.
///
/// The default is [`Mode::C1C2C3`], which is what most deployed
/// implementations emit.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Mode {
    /// `C1 ‖ C2 ‖ C3`, the 2010 draft layout.
    #[default]
    C1C2C3,
    /// `C1 ‖ C3 ‖ C2`, the layout of GM/T 0003-2012.
    C1C3C2,
}

/// Parsed view of an SM2 ciphertext.
///
/// - `C1`: the ephemeral point `[k]G`
/// - `C2`: the masked message
/// - `C3`: the digest `H(x2 ‖ M ‖ y2)`
#[derive(Clone, Debug)]
pub struct Cipher<'c, 'a, D: OutputSizeUser = Sm3> {
    c1: AffinePoint<'c>,
    c2: Cow<'a, [u8]>,
    c3: Output<D>,
}

impl<'c, 'a> Cipher<'c, 'a> {
    /// Decode an SM3-keyed ciphertext laid out according to `mode`.
    pub fn from_slice(curve: &'c Curve, cipher: &'a [u8], mode: Mode) -> Result<Self> {
        Self::from_slice_digest(curve, cipher, mode)
    }
}

impl<'c, 'a, D: OutputSizeUser> Cipher<'c, 'a, D> {
    /// Decode a ciphertext whose `C3` is an output of `D`.
    ///
    /// `C1` may be uncompressed (65 bytes on SM2) or compressed (33 bytes).
    pub fn from_slice_digest(curve: &'c Curve, cipher: &'a [u8], mode: Mode) -> Result<Self> {
        let field_len = curve.field_bytes_len();

        // B1: get C1 from C
        let c1_len = match cipher.first() {
            Some(0x04) => 1 + 2 * field_len,
            Some(0x02 | 0x03) => 1 + field_len,
            _ => return Err(Error::Malformed),
        };

        let digest_size = D::output_size();
        if cipher.len() < c1_len + digest_size {
            return Err(Error::Malformed);
        }

        let (c1, c) = cipher.split_at(c1_len);

        // verify that point c1 satisfies the elliptic curve
        let c1 = curve.decode_point(c1)?;

        // B2: compute point S = [h]C1
        if c1.mul(curve.cofactor()).is_identity() {
            return Err(Error::InvalidPoint);
        }

        let (c2, c3) = match mode {
            Mode::C1C3C2 => {
                let (c3, c2) = c.split_at(digest_size);
                (c2, c3)
            }
            Mode::C1C2C3 => c.split_at(c.len() - digest_size),
        };

        Ok(Self {
            c1,
            c2: Cow::Borrowed(c2),
            c3: Output::<D>::clone_from_slice(c3),
        })
    }

    pub(crate) fn from_parts(c1: AffinePoint<'c>, c2: Vec<u8>, c3: Output<D>) -> Self {
        Self {
            c1,
            c2: Cow::Owned(c2),
            c3,
        }
    }

    /// Encode to bytes laid out according to `mode`, with `C1` uncompressed.
    pub fn to_vec(&self, mode: Mode) -> Vec<u8> {
        let point = self.c1.to_sec1_bytes(false);
        let len = point.len() + self.c2.len() + self.c3.len();
        let mut result = Vec::with_capacity(len);
        result.extend_from_slice(&point);

        match mode {
            Mode::C1C2C3 => {
                result.extend_from_slice(&self.c2);
                result.extend_from_slice(&self.c3);
            }
            Mode::C1C3C2 => {
                result.extend_from_slice(&self.c3);
                result.extend_from_slice(&self.c2);
            }
        }

        result
    }

    /// Get C1
    pub fn c1(&self) -> &AffinePoint<'c> {
        &self.c1
    }

    /// Get C2
    pub fn c2(&self) -> &[u8] {
        &self.c2
    }

    /// Get C3
    pub fn c3(&self) -> &Output<D> {
        &self.c3
    }
}

#[cfg(test)]
mod tests {
    use super::{Cipher, Mode};
    use crate::{Curve, Error};
    use alloc::vec::Vec;

    fn sample(curve: &Curve) -> Vec<u8> {
        let mut bytes = curve.generator().to_sec1_bytes(false);
        bytes.extend_from_slice(b"msg");
        bytes.extend_from_slice(&[0xAA; 32]);
        bytes
    }

    #[test]
    fn default_mode_is_c1c2c3() {
        assert_eq!(Mode::default(), Mode::C1C2C3);
    }

    #[test]
    fn split_by_mode() {
        let curve = Curve::sm2p256v1();
        let bytes = sample(&curve);

        let cipher = Cipher::from_slice(&curve, &bytes, Mode::C1C2C3).unwrap();
        assert_eq!(cipher.c1(), &curve.generator());
        assert_eq!(cipher.c2(), b"msg");
        assert_eq!(cipher.c3().as_slice(), &[0xAA; 32]);
        assert_eq!(cipher.to_vec(Mode::C1C2C3), bytes);

        let reordered = cipher.to_vec(Mode::C1C3C2);
        let again = Cipher::from_slice(&curve, &reordered, Mode::C1C3C2).unwrap();
        assert_eq!(again.c2(), b"msg");
        assert_eq!(again.to_vec(Mode::C1C2C3), bytes);
    }

    #[test]
    fn compressed_c1() {
        let curve = Curve::sm2p256v1();
        let mut bytes = curve.generator().to_sec1_bytes(true);
        bytes.extend_from_slice(&[0x55; 32]);

        let cipher = Cipher::from_slice(&curve, &bytes, Mode::C1C3C2).unwrap();
        assert_eq!(cipher.c1(), &curve.generator());
        assert!(cipher.c2().is_empty());
        assert_eq!(cipher.to_vec(Mode::C1C3C2).len(), 65 + 32);
    }

    #[test]
    fn rejects_malformed() {
        let curve = Curve::sm2p256v1();
        let bytes = sample(&curve);

        assert_eq!(
            Cipher::from_slice(&curve, &[], Mode::C1C2C3).unwrap_err(),
            Error::Malformed
        );
        assert_eq!(
            Cipher::from_slice(&curve, &bytes[..96], Mode::C1C2C3).unwrap_err(),
            Error::Malformed
        );

        let mut bad_tag = bytes.clone();
        bad_tag[0] = 0x05;
        assert_eq!(
            Cipher::from_slice(&curve, &bad_tag, Mode::C1C2C3).unwrap_err(),
            Error::Malformed
        );

        let mut off_curve = bytes;
        off_curve[1] ^= 1;
        assert_eq!(
            Cipher::from_slice(&curve, &off_curve, Mode::C1C2C3).unwrap_err(),
            Error::InvalidPoint
        );
    }
}
