//! Pure Rust implementation of group operations on the SM2 elliptic curve.
//!
//! Points are kept in affine coordinates over arbitrary-precision integers.
//! Curve parameters can be found in [draft-shen-sm2-ecdsa Appendix D]:
//! Recommended Parameters.
//!
//! [draft-shen-sm2-ecdsa Appendix D]: https://datatracker.ietf.org/doc/html/draft-shen-sm2-ecdsa-02#appendix-D

pub(crate) mod curve;
pub(crate) mod field;
pub(crate) mod point;

pub use self::{curve::Curve, field::FieldElement, point::AffinePoint};

use alloc::{vec, vec::Vec};
use num_bigint::BigUint;

/// Upper bound on iterations of every rejection-sampling loop.
pub(crate) const MAX_RESAMPLING: usize = 256;

/// Number of bytes needed to serialize values below `modulus`.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn byte_len(modulus: &BigUint) -> usize {
    modulus.bits().div_ceil(8) as usize
}

/// Big-endian serialization left-padded with zeros to `len` bytes.
pub(crate) fn to_be_bytes_padded(value: &BigUint, len: usize) -> Vec<u8> {
    let bytes = value.to_bytes_be();
    let mut out = vec![0u8; len.max(bytes.len())];
    let offset = out.len() - bytes.len();
    out[offset..].copy_from_slice(&bytes);
    out
}

#[cfg(test)]
mod tests {
    use super::{byte_len, to_be_bytes_padded};
    use num_bigint::BigUint;

    #[test]
    fn padding() {
        assert_eq!(to_be_bytes_padded(&BigUint::from(0u8), 4), [0, 0, 0, 0]);
        assert_eq!(to_be_bytes_padded(&BigUint::from(0x0102u16), 4), [0, 0, 1, 2]);
        assert_eq!(byte_len(&BigUint::from(0x100u16)), 2);
        assert_eq!(byte_len(&BigUint::from(0xffu8)), 1);
    }
}
