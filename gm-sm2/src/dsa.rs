//! SM2 Digital Signature Algorithm (SM2DSA) as defined in [draft-shen-sm2-ecdsa § 5].
//!
//! ## Usage
//!
//! NOTE: requires the `rand_core` dependency with `getrandom` feature enabled.
//!
#![cfg_attr(feature = "getrandom", doc = "```")]
#![cfg_attr(not(feature = "getrandom"), doc = "```ignore")]
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use rand_core::OsRng; // requires 'getrandom` feature
//! use gm_sm2::{
//!     Curve, SecretKey,
//!     dsa::{Signature, SigningKey, signature::Signer},
//! };
//!
//! // Signing
//! let curve = Curve::sm2p256v1();
//! let secret_key = SecretKey::random(&curve, &mut OsRng)?; // serialize with `::to_bytes()`
//! let distid = b"example@rustcrypto.org"; // distinguishing identifier
//! let signing_key = SigningKey::new(distid, &secret_key)?;
//! let verifying_key_bytes = signing_key.verifying_key().to_sec1_bytes(false);
//! let message = b"test message";
//! let signature: Signature = signing_key.sign(message);
//! let signature_der = signature.to_der()?;
//!
//! // Verifying
//! use gm_sm2::dsa::{VerifyingKey, signature::Verifier};
//!
//! let verifying_key = VerifyingKey::from_sec1_bytes(&curve, distid, &verifying_key_bytes)?;
//! verifying_key.verify(message, &Signature::from_der(&signature_der)?)?;
//! # Ok(())
//! # }
//! ```
//!
//! [draft-shen-sm2-ecdsa § 5]: https://datatracker.ietf.org/doc/html/draft-shen-sm2-ecdsa-02#section-5

mod der;
mod signing;
mod verifying;

pub use signature;

pub use self::{signing::SigningKey, verifying::VerifyingKey};

use core::fmt::{self, Debug};
use num_bigint::BigUint;

/// SM2DSA signature.
///
/// Holds `r` and `s` as parsed; whether they lie in `[1, n - 1]` is checked
/// during verification.
#[derive(Clone, Eq, PartialEq)]
pub struct Signature {
    r: BigUint,
    s: BigUint,
}

impl Signature {
    /// Create a [`Signature`] from the `r` and `s` integers which comprise
    /// the signature.
    pub fn from_scalars(r: BigUint, s: BigUint) -> Self {
        Self { r, s }
    }

    /// Get the `r` component of this signature
    pub fn r(&self) -> &BigUint {
        &self.r
    }

    /// Get the `s` component of this signature
    pub fn s(&self) -> &BigUint {
        &self.s
    }

    /// Split the signature into its `r` and `s` integers.
    pub fn split_scalars(self) -> (BigUint, BigUint) {
        (self.r, self.s)
    }
}

impl Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gm_sm2::dsa::Signature(r: {:X}, s: {:X})", self.r, self.s)
    }
}
