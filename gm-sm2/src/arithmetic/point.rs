//! Affine curve points.

use super::{Curve, FieldElement};
use crate::{Error, Result};
use alloc::vec::Vec;
use core::{
    fmt,
    ops::{Add, Neg},
};
use num_bigint::{BigInt, BigUint, Sign};

/// SEC1 tag for the point at infinity.
const TAG_IDENTITY: u8 = 0x00;
/// SEC1 tag for a compressed point with even `y`.
const TAG_COMPRESSED_EVEN_Y: u8 = 0x02;
/// SEC1 tag for a compressed point with odd `y`.
const TAG_COMPRESSED_ODD_Y: u8 = 0x03;
/// SEC1 tag for an uncompressed point.
const TAG_UNCOMPRESSED: u8 = 0x04;

/// Point on a [`Curve`] in affine coordinates, or the point at infinity.
///
/// The point borrows the curve it belongs to. Combining points from two
/// different curves is a logic error.
#[derive(Clone)]
pub struct AffinePoint<'c> {
    curve: &'c Curve,
    coordinates: Option<(FieldElement, FieldElement)>,
}

impl<'c> AffinePoint<'c> {
    /// The point at infinity.
    pub fn identity(curve: &'c Curve) -> Self {
        Self {
            curve,
            coordinates: None,
        }
    }

    pub(crate) fn from_coordinates(curve: &'c Curve, x: FieldElement, y: FieldElement) -> Self {
        Self {
            curve,
            coordinates: Some((x, y)),
        }
    }

    /// Curve this point belongs to.
    pub fn curve(&self) -> &'c Curve {
        self.curve
    }

    /// Is this the point at infinity?
    pub fn is_identity(&self) -> bool {
        self.coordinates.is_none()
    }

    /// Affine `x`-coordinate, or `None` for the point at infinity.
    pub fn x(&self) -> Option<&FieldElement> {
        self.coordinates.as_ref().map(|(x, _)| x)
    }

    /// Affine `y`-coordinate, or `None` for the point at infinity.
    pub fn y(&self) -> Option<&FieldElement> {
        self.coordinates.as_ref().map(|(_, y)| y)
    }

    /// Does the point satisfy `y² = x³ + ax + b`?
    ///
    /// The point at infinity is considered valid.
    pub fn is_valid(&self) -> bool {
        match &self.coordinates {
            None => true,
            Some((x, y)) => {
                x.modulus() == self.curve.modulus()
                    && y.modulus() == self.curve.modulus()
                    && y.square() == self.curve.rhs(x)
            }
        }
    }

    /// Is `[n]P` the point at infinity?
    pub fn has_order_n(&self) -> bool {
        self.mul(self.curve.order()).is_identity()
    }

    /// Point doubling.
    pub fn double(&self) -> Self {
        let Some((x, y)) = &self.coordinates else {
            return self.clone();
        };

        if y.is_zero() {
            return Self::identity(self.curve);
        }

        // λ = (3x² + a) / 2y
        let p = self.curve.modulus();
        let numerator = &(&FieldElement::from_u64(3, p) * &x.square()) + self.curve.a();
        let lambda = match numerator.checked_div(&y.double()) {
            Some(lambda) => lambda,
            None => return Self::identity(self.curve),
        };

        self.chord(&lambda, x, x, y)
    }

    /// Point addition.
    pub fn add(&self, other: &Self) -> Self {
        debug_assert!(self.same_curve(other));

        let (x1, y1) = match &self.coordinates {
            Some(c) => c,
            None => return other.clone(),
        };
        let (x2, y2) = match &other.coordinates {
            Some(c) => c,
            None => return self.clone(),
        };

        if x1 == x2 {
            return if y1 == y2 {
                self.double()
            } else {
                Self::identity(self.curve)
            };
        }

        // λ = (y₂ - y₁) / (x₂ - x₁)
        let lambda = match (y2 - y1).checked_div(&(x2 - x1)) {
            Some(lambda) => lambda,
            None => return Self::identity(self.curve),
        };

        self.chord(&lambda, x1, x2, y1)
    }

    /// Third intersection of the line with slope `λ` through `(x1, y1)`,
    /// reflected over the `x`-axis.
    fn chord(
        &self,
        lambda: &FieldElement,
        x1: &FieldElement,
        x2: &FieldElement,
        y1: &FieldElement,
    ) -> Self {
        let x3 = &(&lambda.square() - x1) - x2;
        let y3 = &(lambda * &(x1 - &x3)) - y1;
        Self::from_coordinates(self.curve, x3, y3)
    }

    /// Point negation.
    pub fn negate(&self) -> Self {
        match &self.coordinates {
            None => self.clone(),
            Some((x, y)) => Self::from_coordinates(self.curve, x.clone(), -y),
        }
    }

    /// Scalar multiplication `[k]P` by double-and-add, most significant bit
    /// first.
    pub fn mul(&self, k: &BigUint) -> Self {
        let mut acc = Self::identity(self.curve);

        for i in (0..k.bits()).rev() {
            acc = acc.double();
            if k.bit(i) {
                acc = acc.add(self);
            }
        }

        acc
    }

    /// Scalar multiplication by a signed integer: `[-k]P = -[k]P`.
    pub fn mul_signed(&self, k: &BigInt) -> Self {
        let product = self.mul(k.magnitude());
        match k.sign() {
            Sign::Minus => product.negate(),
            _ => product,
        }
    }

    /// Serialize as a SEC1 point: `0x00` for the identity, otherwise `0x04 ‖ x ‖ y`
    /// or, compressed, `0x02 | (y & 1) ‖ x`.
    pub fn to_sec1_bytes(&self, compress: bool) -> Vec<u8> {
        let Some((x, y)) = &self.coordinates else {
            return Vec::from([TAG_IDENTITY]);
        };

        let len = self.curve.field_bytes_len();
        let mut out = Vec::with_capacity(1 + 2 * len);

        if compress {
            out.push(if y.is_odd() {
                TAG_COMPRESSED_ODD_Y
            } else {
                TAG_COMPRESSED_EVEN_Y
            });
            out.extend_from_slice(&x.to_be_bytes());
        } else {
            out.push(TAG_UNCOMPRESSED);
            out.extend_from_slice(&x.to_be_bytes());
            out.extend_from_slice(&y.to_be_bytes());
        }

        out
    }

    /// Decode a SEC1 point.
    ///
    /// Uncompressed points must satisfy the curve equation. Compressed points
    /// are decompressed by taking the square root of `x³ + ax + b` and picking
    /// the root whose parity matches the tag.
    pub fn from_sec1_bytes(curve: &'c Curve, bytes: &[u8]) -> Result<Self> {
        let (&tag, body) = bytes.split_first().ok_or(Error::Malformed)?;
        let len = curve.field_bytes_len();
        let p = curve.modulus();

        match tag {
            TAG_IDENTITY if body.is_empty() => Ok(Self::identity(curve)),
            TAG_UNCOMPRESSED if body.len() == 2 * len => {
                let (x, y) = body.split_at(len);
                let x = FieldElement::from_be_slice(x, p).map_err(|_| Error::InvalidPoint)?;
                let y = FieldElement::from_be_slice(y, p).map_err(|_| Error::InvalidPoint)?;
                let point = Self::from_coordinates(curve, x, y);

                if point.is_valid() {
                    Ok(point)
                } else {
                    Err(Error::InvalidPoint)
                }
            }
            TAG_COMPRESSED_EVEN_Y | TAG_COMPRESSED_ODD_Y if body.len() == len => {
                let x = FieldElement::from_be_slice(body, p).map_err(|_| Error::InvalidPoint)?;
                let y = curve.rhs(&x).sqrt().ok_or(Error::InvalidPoint)?;
                let want_odd = tag == TAG_COMPRESSED_ODD_Y;

                let y = if y.is_odd() == want_odd {
                    y
                } else if y.is_zero() {
                    return Err(Error::InvalidPoint);
                } else {
                    -&y
                };

                Ok(Self::from_coordinates(curve, x, y))
            }
            _ => Err(Error::Malformed),
        }
    }

    fn same_curve(&self, other: &Self) -> bool {
        core::ptr::eq(self.curve, other.curve) || self.curve == other.curve
    }
}

impl Curve {
    /// `x³ + ax + b`
    pub(crate) fn rhs(&self, x: &FieldElement) -> FieldElement {
        &(&(&x.square() * x) + &(self.a() * x)) + self.b()
    }
}

impl PartialEq for AffinePoint<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.same_curve(other) && self.coordinates == other.coordinates
    }
}

impl Eq for AffinePoint<'_> {}

impl fmt::Debug for AffinePoint<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.coordinates {
            None => f.write_str("AffinePoint::Identity"),
            Some((x, y)) => f
                .debug_struct("AffinePoint")
                .field("x", x)
                .field("y", y)
                .finish(),
        }
    }
}

impl<'c> Add<&AffinePoint<'c>> for &AffinePoint<'c> {
    type Output = AffinePoint<'c>;

    fn add(self, rhs: &AffinePoint<'c>) -> AffinePoint<'c> {
        AffinePoint::add(self, rhs)
    }
}

impl<'c> Neg for &AffinePoint<'c> {
    type Output = AffinePoint<'c>;

    fn neg(self) -> AffinePoint<'c> {
        self.negate()
    }
}

impl<'c> Neg for AffinePoint<'c> {
    type Output = AffinePoint<'c>;

    fn neg(self) -> AffinePoint<'c> {
        self.negate()
    }
}

#[cfg(test)]
mod tests {
    use super::AffinePoint;
    use crate::{Curve, Error};
    use hex_literal::hex;
    use num_bigint::{BigInt, BigUint};
    use num_traits::One;

    fn toy_curve() -> Curve {
        Curve::new(
            17u8.into(),
            2u8.into(),
            2u8.into(),
            5u8.into(),
            1u8.into(),
            19u8.into(),
            1u8.into(),
        )
        .unwrap()
    }

    fn toy_point(curve: &Curve, x: u8, y: u8) -> AffinePoint<'_> {
        curve.point(x.into(), y.into()).unwrap()
    }

    #[test]
    fn toy_group_law() {
        let curve = toy_curve();
        let g = curve.generator();

        assert_eq!(g.double(), toy_point(&curve, 6, 3));
        assert_eq!(&g.double() + &g, toy_point(&curve, 10, 6));
        assert_eq!(g.mul(&BigUint::from(18u8)), toy_point(&curve, 5, 16));
        assert_eq!(g.mul(&BigUint::from(18u8)), -&g);
        assert!((&g + &-&g).is_identity());
    }

    #[test]
    fn toy_multiples_stay_on_curve() {
        let curve = toy_curve();
        let g = curve.generator();
        let mut acc = curve.identity();

        for k in 0u8..19 {
            assert_eq!(g.mul(&BigUint::from(k)), acc);
            assert!(acc.is_valid());
            acc = &acc + &g;
        }

        assert!(acc.is_identity());
    }

    #[test]
    fn identity_laws() {
        let curve = toy_curve();
        let g = curve.generator();
        let o = curve.identity();

        assert_eq!(&g + &o, g);
        assert_eq!(&o + &g, g);
        assert!(o.double().is_identity());
        assert!(o.negate().is_identity());
        assert!(g.mul(&BigUint::from(0u8)).is_identity());
    }

    #[test]
    fn sm2_scalar_multiplication() {
        let curve = Curve::sm2p256v1();
        let g = curve.generator();

        assert!(g.mul(&BigUint::from(0u8)).is_identity());
        assert_eq!(g.mul(&BigUint::one()), g);
        assert!(g.mul(curve.order()).is_identity());
        assert_eq!(g.mul(&(curve.order() - 1u8)), -&g);
        assert_eq!(g.mul(&BigUint::from(2u8)), g.double());
    }

    #[test]
    fn signed_multiplication() {
        let curve = toy_curve();
        let g = curve.generator();
        assert_eq!(g.mul_signed(&BigInt::from(-1)), -&g);
        assert_eq!(g.mul_signed(&BigInt::from(3)), g.mul(&BigUint::from(3u8)));
    }

    #[test]
    fn sec1_roundtrip() {
        let curve = Curve::sm2p256v1();
        let point = curve.generator().mul(&BigUint::from(7u8));

        for compress in [false, true] {
            let bytes = point.to_sec1_bytes(compress);
            assert_eq!(bytes.len(), if compress { 33 } else { 65 });
            assert_eq!(AffinePoint::from_sec1_bytes(&curve, &bytes).unwrap(), point);
        }

        let identity = curve.identity().to_sec1_bytes(false);
        assert_eq!(identity, [0x00]);
        assert!(curve.decode_point(&identity).unwrap().is_identity());
    }

    #[test]
    fn sec1_generator_compressed() {
        let curve = Curve::sm2p256v1();
        let bytes = hex!("0232C4AE2C1F1981195F9904466A39C9948FE30BBFF2660BE1715A4589334C74C7");
        assert_eq!(curve.decode_point(&bytes).unwrap(), curve.generator());
        assert_eq!(curve.generator().to_sec1_bytes(true), bytes);
    }

    #[test]
    fn sec1_rejects_garbage() {
        let curve = Curve::sm2p256v1();
        let mut bytes = curve.generator().to_sec1_bytes(false);

        assert_eq!(curve.decode_point(&[]), Err(Error::Malformed));
        assert_eq!(curve.decode_point(&bytes[..64]), Err(Error::Malformed));
        assert_eq!(curve.decode_point(&[0x00, 0x00]), Err(Error::Malformed));

        bytes[0] = 0x05;
        assert_eq!(curve.decode_point(&bytes), Err(Error::Malformed));

        bytes[0] = 0x04;
        bytes[64] ^= 1;
        assert_eq!(curve.decode_point(&bytes), Err(Error::InvalidPoint));
    }

    #[test]
    fn toy_decompression_uses_tonelli_shanks() {
        // p = 17 ≡ 1 (mod 4)
        let curve = toy_curve();
        for k in 1u8..19 {
            let point = curve.generator().mul(&BigUint::from(k));
            let bytes = point.to_sec1_bytes(true);
            assert_eq!(curve.decode_point(&bytes).unwrap(), point);
        }
    }

    #[test]
    fn toy_decompression_without_root() {
        // x = 2: 8 + 4 + 2 = 14 is a non-residue mod 17
        let curve = toy_curve();
        assert_eq!(curve.decode_point(&[0x02, 0x02]), Err(Error::InvalidPoint));
    }
}
