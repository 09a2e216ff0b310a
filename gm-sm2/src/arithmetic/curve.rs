//! Short Weierstrass curve domain parameters.

use super::{AffinePoint, FieldElement, MAX_RESAMPLING, byte_len};
use crate::{Error, Result};
use alloc::vec;
use core::fmt;
use hex_literal::hex;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand_core::CryptoRngCore;
use zeroize::Zeroize;

/// p = 0xFFFFFFFE FFFFFFFF FFFFFFFF FFFFFFFF FFFFFFFF 00000000 FFFFFFFF FFFFFFFF
const SM2_P: [u8; 32] = hex!("FFFFFFFEFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF00000000FFFFFFFFFFFFFFFF");

/// a = -3 (0xFFFFFFFE FFFFFFFF FFFFFFFF FFFFFFFF FFFFFFFF 00000000 FFFFFFFF FFFFFFFC)
const SM2_A: [u8; 32] = hex!("FFFFFFFEFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF00000000FFFFFFFFFFFFFFFC");

/// b = 0x28E9FA9E 9D9F5E34 4D5A9E4B CF6509A7 F39789F5 15AB8F92 DDBCBD41 4D940E93
const SM2_B: [u8; 32] = hex!("28E9FA9E9D9F5E344D5A9E4BCF6509A7F39789F515AB8F92DDBCBD414D940E93");

/// n = 0xFFFFFFFE FFFFFFFF FFFFFFFF FFFFFFFF 7203DF6B 21C6052B 53BBF409 39D54123
const SM2_N: [u8; 32] = hex!("FFFFFFFEFFFFFFFFFFFFFFFFFFFFFFFF7203DF6B21C6052B53BBF40939D54123");

/// Gₓ = 0x32C4AE2C 1F198119 5F990446 6A39C994 8FE30BBF F2660BE1 715A4589 334C74C7
const SM2_GX: [u8; 32] = hex!("32C4AE2C1F1981195F9904466A39C9948FE30BBFF2660BE1715A4589334C74C7");

/// Gᵧ = 0xBC3736A2 F4F6779C 59BDCEE3 6B692153 D0A9877C C62A4740 02DF32E5 2139F0A0
const SM2_GY: [u8; 32] = hex!("BC3736A2F4F6779C59BDCEE36B692153D0A9877CC62A474002DF32E52139F0A0");

/// Elliptic curve `y² = x³ + ax + b` over `GF(p)` with a base point of prime
/// order `n` and cofactor `h`.
///
/// A curve is built once and borrowed by every point, key and protocol value
/// derived from it. Nothing mutates it after construction.
#[derive(Clone, PartialEq, Eq)]
pub struct Curve {
    p: BigUint,
    a: FieldElement,
    b: FieldElement,
    generator: (FieldElement, FieldElement),
    n: BigUint,
    h: BigUint,
}

impl Curve {
    /// The SM2 recommended curve `sm2p256v1` (GM/T 0003.5-2012).
    pub fn sm2p256v1() -> Self {
        let p = BigUint::from_bytes_be(&SM2_P);
        let element = |bytes: &[u8]| FieldElement::reduce(&BigUint::from_bytes_be(bytes), &p);

        Self {
            a: element(&SM2_A),
            b: element(&SM2_B),
            generator: (element(&SM2_GX), element(&SM2_GY)),
            n: BigUint::from_bytes_be(&SM2_N),
            h: BigUint::one(),
            p,
        }
    }

    /// Build a curve from explicit domain parameters.
    ///
    /// Checks that `p` is odd and greater than 3, that all coefficients are
    /// reduced, that the curve is non-singular, and that `G` is a point on the
    /// curve with `[n]G = O`. Primality of `p` and `n` is not checked.
    pub fn new(
        p: BigUint,
        a: BigUint,
        b: BigUint,
        gx: BigUint,
        gy: BigUint,
        n: BigUint,
        h: BigUint,
    ) -> Result<Self> {
        if p <= BigUint::from(3u8) || !p.bit(0) || n <= BigUint::one() || h.is_zero() {
            return Err(Error::InvalidDomainParameters);
        }

        let element = |value: BigUint| {
            FieldElement::new(value, &p).map_err(|_| Error::InvalidDomainParameters)
        };
        let a = element(a)?;
        let b = element(b)?;
        let generator = (element(gx)?, element(gy)?);

        // 4a³ + 27b² ≠ 0
        let four = FieldElement::from_u64(4, &p);
        let twenty_seven = FieldElement::from_u64(27, &p);
        let discriminant = &(&four * &(&a.square() * &a)) + &(&twenty_seven * &b.square());
        if discriminant.is_zero() {
            return Err(Error::InvalidDomainParameters);
        }

        let curve = Self {
            p,
            a,
            b,
            generator,
            n,
            h,
        };

        let generator_ok = {
            let g = curve.generator();
            g.is_valid() && g.has_order_n()
        };
        if !generator_ok {
            return Err(Error::InvalidDomainParameters);
        }

        Ok(curve)
    }

    /// Field modulus `p`.
    pub fn modulus(&self) -> &BigUint {
        &self.p
    }

    /// Coefficient `a`.
    pub fn a(&self) -> &FieldElement {
        &self.a
    }

    /// Coefficient `b`.
    pub fn b(&self) -> &FieldElement {
        &self.b
    }

    /// Order `n` of the base point.
    pub fn order(&self) -> &BigUint {
        &self.n
    }

    /// Cofactor `h`.
    pub fn cofactor(&self) -> &BigUint {
        &self.h
    }

    /// Bit length of the field modulus.
    pub fn field_bits(&self) -> u64 {
        self.p.bits()
    }

    /// Size in bytes of a serialized field element.
    pub fn field_bytes_len(&self) -> usize {
        byte_len(&self.p)
    }

    /// Base point `G`.
    pub fn generator(&self) -> AffinePoint<'_> {
        AffinePoint::from_coordinates(self, self.generator.0.clone(), self.generator.1.clone())
    }

    pub(crate) fn generator_coordinates(&self) -> (&FieldElement, &FieldElement) {
        (&self.generator.0, &self.generator.1)
    }

    /// Additive identity of the group a.k.a. the point at infinity.
    pub fn identity(&self) -> AffinePoint<'_> {
        AffinePoint::identity(self)
    }

    /// Construct a point from raw affine coordinates.
    ///
    /// Coordinates must be below `p`. Whether the point lies on the curve is
    /// not checked here; see [`AffinePoint::is_valid`].
    pub fn point(&self, x: BigUint, y: BigUint) -> Result<AffinePoint<'_>> {
        let x = FieldElement::new(x, &self.p).map_err(|_| Error::InvalidPoint)?;
        let y = FieldElement::new(y, &self.p).map_err(|_| Error::InvalidPoint)?;
        Ok(AffinePoint::from_coordinates(self, x, y))
    }

    /// Decode a SEC1-encoded point.
    pub fn decode_point(&self, bytes: &[u8]) -> Result<AffinePoint<'_>> {
        AffinePoint::from_sec1_bytes(self, bytes)
    }

    /// Does `point` belong to this curve and satisfy its equation?
    pub fn is_valid_point(&self, point: &AffinePoint<'_>) -> bool {
        point.curve() == self && point.is_valid()
    }

    /// Reduce an integer modulo the group order `n`.
    pub fn scalar(&self, value: &BigUint) -> FieldElement {
        FieldElement::reduce(value, &self.n)
    }

    /// Draw a uniformly random scalar in `[1, n - 1]`.
    pub fn random_scalar<R: CryptoRngCore + ?Sized>(&self, rng: &mut R) -> Result<BigUint> {
        let len = byte_len(&self.n);
        let excess_bits = len * 8 - usize::try_from(self.n.bits()).map_err(|_| Error::Malformed)?;
        let mut buf = vec![0u8; len];

        for _ in 0..MAX_RESAMPLING {
            rng.try_fill_bytes(&mut buf)?;
            buf[0] &= u8::MAX >> excess_bits;
            let k = BigUint::from_bytes_be(&buf);

            if !k.is_zero() && k < self.n {
                buf.zeroize();
                return Ok(k);
            }
        }

        buf.zeroize();
        Err(Error::ResamplingLimit)
    }
}

impl fmt::Debug for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Curve")
            .field("p", &self.p)
            .field("n", &self.n)
            .field("h", &self.h)
            .finish_non_exhaustive()
    }
}
