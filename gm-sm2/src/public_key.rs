//! Public points.

use crate::{AffinePoint, Curve, Error, Result};
use alloc::vec::Vec;
use num_bigint::BigUint;

/// SM2 public key: a point `Q` on a particular [`Curve`].
///
/// Always valid: `Q` is not the point at infinity, lies on the curve and has
/// order `n`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey<'c> {
    point: AffinePoint<'c>,
}

impl<'c> PublicKey<'c> {
    /// Validate an affine point as a public key.
    pub fn from_affine(point: AffinePoint<'c>) -> Result<Self> {
        if point.is_identity() || !point.is_valid() || !point.has_order_n() {
            return Err(Error::InvalidPublicKey);
        }

        Ok(Self { point })
    }

    /// `[d]G` for a scalar already known to be in `[1, n - 1]`.
    pub(crate) fn from_secret_scalar(curve: &'c Curve, scalar: &BigUint) -> Self {
        Self {
            point: curve.generator().mul(scalar),
        }
    }

    /// Decode a SEC1-encoded public key.
    pub fn from_sec1_bytes(curve: &'c Curve, bytes: &[u8]) -> Result<Self> {
        Self::from_affine(curve.decode_point(bytes)?)
    }

    /// Serialize as a SEC1 point.
    pub fn to_sec1_bytes(&self, compress: bool) -> Vec<u8> {
        self.point.to_sec1_bytes(compress)
    }

    /// Borrow the inner [`AffinePoint`].
    pub fn as_affine(&self) -> &AffinePoint<'c> {
        &self.point
    }

    /// Curve this key belongs to.
    pub fn curve(&self) -> &'c Curve {
        self.point.curve()
    }

    /// Big-endian `x` and `y` coordinates, each padded to the field length.
    pub(crate) fn coordinate_bytes(&self) -> (Vec<u8>, Vec<u8>) {
        match (self.point.x(), self.point.y()) {
            (Some(x), Some(y)) => (x.to_be_bytes(), y.to_be_bytes()),
            // identity is rejected at construction
            _ => (Vec::new(), Vec::new()),
        }
    }
}

impl<'c> AsRef<AffinePoint<'c>> for PublicKey<'c> {
    fn as_ref(&self) -> &AffinePoint<'c> {
        &self.point
    }
}

impl<'c> From<PublicKey<'c>> for AffinePoint<'c> {
    fn from(public_key: PublicKey<'c>) -> AffinePoint<'c> {
        public_key.point
    }
}
