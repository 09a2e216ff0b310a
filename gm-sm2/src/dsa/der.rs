//! ASN.1 DER encoding for SM2 signatures.
//!
//! ```text
//! SM2Signature ::= SEQUENCE {
//!     r INTEGER,
//!     s INTEGER
//! }
//! ```

use super::Signature;
use crate::{Error, Result};
use alloc::vec::Vec;
use der::{
    Decode, DecodeValue, Encode, EncodeValue, Header, Length, Reader, Sequence, Writer,
    asn1::UintRef,
};
use num_bigint::BigUint;

impl Signature {
    /// Parse a DER-encoded `SEQUENCE { INTEGER r, INTEGER s }`.
    ///
    /// Negative integers, non-minimal encodings and trailing data are
    /// rejected with [`Error::Malformed`].
    pub fn from_der(input: &[u8]) -> Result<Self> {
        let SignatureRef { r, s } = SignatureRef::from_der(input)?;

        Ok(Self::from_scalars(
            BigUint::from_bytes_be(r.as_bytes()),
            BigUint::from_bytes_be(s.as_bytes()),
        ))
    }

    /// Serialize as DER. Integers are prefixed with `0x00` when their high
    /// bit is set.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        let r = self.r.to_bytes_be();
        let s = self.s.to_bytes_be();
        let sig = SignatureRef {
            r: UintRef::new(&r)?,
            s: UintRef::new(&s)?,
        };

        Ok(sig.to_der()?)
    }
}

impl TryFrom<&[u8]> for Signature {
    type Error = Error;

    fn try_from(input: &[u8]) -> Result<Signature> {
        Signature::from_der(input)
    }
}

struct SignatureRef<'a> {
    r: UintRef<'a>,
    s: UintRef<'a>,
}

impl EncodeValue for SignatureRef<'_> {
    fn value_len(&self) -> der::Result<Length> {
        self.r.encoded_len()? + self.s.encoded_len()?
    }

    fn encode_value(&self, encoder: &mut impl Writer) -> der::Result<()> {
        self.r.encode(encoder)?;
        self.s.encode(encoder)?;
        Ok(())
    }
}

impl<'a> DecodeValue<'a> for SignatureRef<'a> {
    fn decode_value<R: Reader<'a>>(reader: &mut R, header: Header) -> der::Result<Self> {
        reader.read_nested(header.length, |reader| {
            Ok(Self {
                r: UintRef::decode(reader)?,
                s: UintRef::decode(reader)?,
            })
        })
    }
}

impl<'a> Sequence<'a> for SignatureRef<'a> {}

#[cfg(test)]
mod tests {
    use crate::{Error, dsa::Signature};
    use hex_literal::hex;
    use num_bigint::BigUint;

    #[test]
    fn sign_padding() {
        let sig = Signature::from_scalars(BigUint::from(0x80u8), BigUint::from(0x7Fu8));
        let der = sig.to_der().unwrap();
        assert_eq!(der, hex!("3007020200800201 7F"));
        assert_eq!(Signature::from_der(&der).unwrap(), sig);
    }

    #[test]
    fn rejects_trailing_data_and_negatives() {
        assert_eq!(
            Signature::from_der(&hex!("30060201010201 0100")).unwrap_err(),
            Error::Malformed
        );
        assert_eq!(
            Signature::from_der(&hex!("3006020180020101")).unwrap_err(),
            Error::Malformed
        );
        assert_eq!(Signature::from_der(&[]).unwrap_err(), Error::Malformed);
        assert!(Signature::try_from(hex!("3006020101020101").as_slice()).is_ok());
    }
}
