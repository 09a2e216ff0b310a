//! Error types.

use core::fmt;

/// Result type.
pub type Result<T> = core::result::Result<T, Error>;

/// Error type.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Secret scalar is not in `[1, n-1]`.
    InvalidSecretKey,

    /// Public point is the identity, is not on the curve, or is not of order `n`.
    InvalidPublicKey,

    /// Encoded point could not be decoded into a usable curve point.
    InvalidPoint,

    /// Input is truncated or otherwise not in the expected format.
    Malformed,

    /// Distinguishing identifier bit length does not fit in 16 bits.
    DistIdTooLong,

    /// Domain parameters are inconsistent.
    InvalidDomainParameters,

    /// Values from two different curves were combined.
    CurveMismatch,

    /// Requested KDF output needs more than `2^32 - 1` hash blocks.
    KdfOutputTooLong,

    /// Recomputed `C3` digest does not match the ciphertext.
    MacMismatch,

    /// KDF produced an all-zero key stream while decrypting.
    KdfZero,

    /// Key exchange produced the point at infinity.
    SharedPointAtInfinity,

    /// Initiator did not supply the responder's confirmation tag.
    ConfirmationRequired,

    /// Key confirmation tag does not match.
    ConfirmationMismatch,

    /// Attempted to invert zero.
    NotInvertible,

    /// Random number generator failure.
    Rng,

    /// Rejection sampling did not produce a usable value within its iteration cap.
    ResamplingLimit,
}

impl Error {
    /// Did the input parse, but fail a cryptographic check?
    ///
    /// Such errors mean the data was tampered with or belongs to a different
    /// key, as opposed to being unparseable.
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            Self::MacMismatch
                | Self::KdfZero
                | Self::SharedPointAtInfinity
                | Self::ConfirmationMismatch
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::InvalidSecretKey => "secret scalar out of range",
            Self::InvalidPublicKey => "invalid public key",
            Self::InvalidPoint => "invalid curve point",
            Self::Malformed => "malformed input",
            Self::DistIdTooLong => "distinguishing identifier too long",
            Self::InvalidDomainParameters => "invalid domain parameters",
            Self::CurveMismatch => "curve mismatch",
            Self::KdfOutputTooLong => "KDF output length too large",
            Self::MacMismatch => "ciphertext digest mismatch",
            Self::KdfZero => "KDF key stream is all zero",
            Self::SharedPointAtInfinity => "shared point at infinity",
            Self::ConfirmationRequired => "confirmation tag required",
            Self::ConfirmationMismatch => "confirmation tag mismatch",
            Self::NotInvertible => "value is not invertible",
            Self::Rng => "random number generator failure",
            Self::ResamplingLimit => "resampling limit exceeded",
        };
        f.write_str(msg)
    }
}

impl core::error::Error for Error {}

#[cfg(feature = "dsa")]
impl From<der::Error> for Error {
    fn from(_: der::Error) -> Self {
        Self::Malformed
    }
}

impl From<rand_core::Error> for Error {
    fn from(_: rand_core::Error) -> Self {
        Self::Rng
    }
}

#[cfg(feature = "dsa")]
impl From<Error> for signature::Error {
    fn from(_: Error) -> Self {
        signature::Error::new()
    }
}
