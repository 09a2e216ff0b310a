//! Field arithmetic modulo an odd prime.
//!
//! Used both for the base field `p` of the curve and for scalars modulo the
//! group order `n`.

use super::{byte_len, to_be_bytes_padded};
use crate::{Error, Result};
use alloc::vec::Vec;
use core::{
    fmt,
    mem,
    ops::{Add, Mul, Neg, Sub},
};
use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Zero};

/// Element of the prime field `GF(q)`.
///
/// The value is always fully reduced: `0 <= value < q`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FieldElement {
    value: BigUint,
    modulus: BigUint,
}

impl FieldElement {
    /// Create a field element, rejecting values that are not below `modulus`.
    pub fn new(value: BigUint, modulus: &BigUint) -> Result<Self> {
        if modulus < &BigUint::from(2u8) {
            return Err(Error::InvalidDomainParameters);
        }

        if &value >= modulus {
            return Err(Error::Malformed);
        }

        Ok(Self {
            value,
            modulus: modulus.clone(),
        })
    }

    /// Create a field element by reducing `value` modulo `modulus`.
    pub fn reduce(value: &BigUint, modulus: &BigUint) -> Self {
        Self {
            value: value % modulus,
            modulus: modulus.clone(),
        }
    }

    /// Create a field element from a small integer.
    pub fn from_u64(value: u64, modulus: &BigUint) -> Self {
        Self::reduce(&BigUint::from(value), modulus)
    }

    /// Additive identity.
    pub fn zero(modulus: &BigUint) -> Self {
        Self::from_u64(0, modulus)
    }

    /// Multiplicative identity.
    pub fn one(modulus: &BigUint) -> Self {
        Self::from_u64(1, modulus)
    }

    /// Parse a big-endian integer, rejecting values that are not below `modulus`.
    pub fn from_be_slice(bytes: &[u8], modulus: &BigUint) -> Result<Self> {
        Self::new(BigUint::from_bytes_be(bytes), modulus)
    }

    /// Serialize as a big-endian integer left-padded to [`FieldElement::byte_len`].
    pub fn to_be_bytes(&self) -> Vec<u8> {
        to_be_bytes_padded(&self.value, self.byte_len())
    }

    /// Length in bytes of the serialized form of elements of this field.
    pub fn byte_len(&self) -> usize {
        byte_len(&self.modulus)
    }

    /// Borrow the reduced integer value.
    pub fn as_uint(&self) -> &BigUint {
        &self.value
    }

    /// Borrow the field modulus.
    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// Is this element zero?
    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Is this element one?
    pub fn is_one(&self) -> bool {
        self.value.is_one()
    }

    /// Parity of the value, i.e. its lowest bit.
    pub fn is_odd(&self) -> bool {
        self.value.bit(0)
    }

    /// Compute `self + self`.
    pub fn double(&self) -> Self {
        self + self
    }

    /// Compute `self * self`.
    pub fn square(&self) -> Self {
        self * self
    }

    /// Compute `self ^ exp`.
    pub fn pow(&self, exp: &BigUint) -> Self {
        Self {
            value: self.value.modpow(exp, &self.modulus),
            modulus: self.modulus.clone(),
        }
    }

    /// Compute `1 / self` with the extended Euclidean algorithm.
    ///
    /// Returns `None` for zero (or any value sharing a factor with the modulus).
    pub fn invert(&self) -> Option<Self> {
        if self.is_zero() {
            return None;
        }

        let modulus = BigInt::from(self.modulus.clone());
        let (mut old_r, mut r) = (BigInt::from(self.value.clone()), modulus.clone());
        let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());

        while !r.is_zero() {
            let quotient = old_r.div_floor(&r);
            let next_r = &old_r - &quotient * &r;
            old_r = mem::replace(&mut r, next_r);
            let next_s = &old_s - &quotient * &s;
            old_s = mem::replace(&mut s, next_s);
        }

        if !old_r.is_one() {
            return None;
        }

        let value = old_s.mod_floor(&modulus).to_biguint()?;
        Some(Self {
            value,
            modulus: self.modulus.clone(),
        })
    }

    /// Compute `self / rhs`, or `None` when `rhs` is zero.
    pub fn checked_div(&self, rhs: &Self) -> Option<Self> {
        rhs.invert().map(|inv| self * &inv)
    }

    /// Returns the square root of `self`, or `None` if `self` is a non-residue.
    pub fn sqrt(&self) -> Option<Self> {
        if self.is_zero() || self.modulus == BigUint::from(2u8) {
            return Some(self.clone());
        }

        // q ≡ 3 (mod 4)
        if self.modulus.bit(0) && self.modulus.bit(1) {
            self.sqrt_shanks()
        } else {
            self.sqrt_tonelli_shanks()
        }
    }

    /// For `q ≡ 3 (mod 4)` the root is `self^((q + 1) / 4)`, if one exists.
    fn sqrt_shanks(&self) -> Option<Self> {
        let exp = (&self.modulus + 1u32) >> 2u32;
        let root = self.pow(&exp);
        (root.square() == *self).then_some(root)
    }

    /// Tonelli-Shanks algorithm, for any odd prime.
    fn sqrt_tonelli_shanks(&self) -> Option<Self> {
        let one = Self::one(&self.modulus);
        let minus_one = -&one;
        let q_minus_one = &self.modulus - 1u32;
        let euler_exp = &q_minus_one >> 1u32;

        // Euler's criterion
        if self.pow(&euler_exp) != one {
            return None;
        }

        // q - 1 = 2^s * t with t odd
        let s = q_minus_one.trailing_zeros()?;
        let t = &q_minus_one >> s;

        let mut candidate = BigUint::from(2u8);
        let non_residue = loop {
            if candidate >= self.modulus {
                return None;
            }
            let z = Self::reduce(&candidate, &self.modulus);
            if z.pow(&euler_exp) == minus_one {
                break z;
            }
            candidate += 1u32;
        };

        let mut m = s;
        let mut c = non_residue.pow(&t);
        let mut b = self.pow(&t);
        let mut root = self.pow(&((&t + 1u32) >> 1u32));

        while !b.is_one() {
            // least i in (0, m) with b^(2^i) = 1
            let mut i = 0;
            let mut probe = b.clone();
            while !probe.is_one() {
                probe = probe.square();
                i += 1;
                if i == m {
                    return None;
                }
            }

            let mut factor = c;
            for _ in 0..(m - i - 1) {
                factor = factor.square();
            }

            m = i;
            c = factor.square();
            b = &b * &c;
            root = &root * &factor;
        }

        Some(root)
    }

    fn with_value(&self, value: BigUint) -> Self {
        debug_assert!(value < self.modulus);
        Self {
            value,
            modulus: self.modulus.clone(),
        }
    }
}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement(0x")?;

        for byte in self.to_be_bytes() {
            write!(f, "{byte:02X}")?;
        }

        write!(f, ")")
    }
}

impl Add<&FieldElement> for &FieldElement {
    type Output = FieldElement;

    fn add(self, rhs: &FieldElement) -> FieldElement {
        debug_assert_eq!(self.modulus, rhs.modulus);
        let mut sum = &self.value + &rhs.value;
        if sum >= self.modulus {
            sum -= &self.modulus;
        }
        self.with_value(sum)
    }
}

impl Sub<&FieldElement> for &FieldElement {
    type Output = FieldElement;

    fn sub(self, rhs: &FieldElement) -> FieldElement {
        debug_assert_eq!(self.modulus, rhs.modulus);
        if self.value >= rhs.value {
            self.with_value(&self.value - &rhs.value)
        } else {
            self.with_value(&self.modulus - &rhs.value + &self.value)
        }
    }
}

impl Mul<&FieldElement> for &FieldElement {
    type Output = FieldElement;

    fn mul(self, rhs: &FieldElement) -> FieldElement {
        debug_assert_eq!(self.modulus, rhs.modulus);
        self.with_value((&self.value * &rhs.value) % &self.modulus)
    }
}

impl Neg for &FieldElement {
    type Output = FieldElement;

    fn neg(self) -> FieldElement {
        if self.is_zero() {
            self.clone()
        } else {
            self.with_value(&self.modulus - &self.value)
        }
    }
}

macro_rules! impl_by_value_op {
    ($op:ident, $func:ident) => {
        impl $op<FieldElement> for FieldElement {
            type Output = FieldElement;

            fn $func(self, rhs: FieldElement) -> FieldElement {
                $op::$func(&self, &rhs)
            }
        }

        impl $op<&FieldElement> for FieldElement {
            type Output = FieldElement;

            fn $func(self, rhs: &FieldElement) -> FieldElement {
                $op::$func(&self, rhs)
            }
        }
    };
}

impl_by_value_op!(Add, add);
impl_by_value_op!(Sub, sub);
impl_by_value_op!(Mul, mul);

impl Neg for FieldElement {
    type Output = FieldElement;

    fn neg(self) -> FieldElement {
        -&self
    }
}
