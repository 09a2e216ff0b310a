//! Distinguished identifier support.

#[cfg(any(feature = "dsa", feature = "exchange"))]
use {
    crate::{Error, PublicKey, Result},
    sm3::digest::{Digest, Output},
};

/// Type which represents distinguishing identifiers.
pub type DistId = [u8];

/// Compute user information hash `Z` according to [draft-shen-sm2-ecdsa § 5.1.4.4].
///
/// ```text
/// ZA=H256(ENTLA || IDA || a || b || xG || yG || xA || yA)
/// ```
///
/// [draft-shen-sm2-ecdsa § 5.1.4.4]: https://datatracker.ietf.org/doc/html/draft-shen-sm2-ecdsa-02#section-5.1.4.4
#[cfg(any(feature = "dsa", feature = "exchange"))]
pub(crate) fn hash_z<D: Digest>(distid: &DistId, public_key: &PublicKey<'_>) -> Result<Output<D>> {
    let entla: u16 = distid
        .len()
        .checked_mul(8)
        .and_then(|l| l.try_into().ok())
        .ok_or(Error::DistIdTooLong)?;

    let curve = public_key.curve();
    let (gx, gy) = curve.generator_coordinates();
    let (x, y) = public_key.coordinate_bytes();

    Ok(D::new()
        .chain_update(entla.to_be_bytes())
        .chain_update(distid)
        .chain_update(curve.a().to_be_bytes())
        .chain_update(curve.b().to_be_bytes())
        .chain_update(gx.to_be_bytes())
        .chain_update(gy.to_be_bytes())
        .chain_update(x)
        .chain_update(y)
        .finalize())
}

#[cfg(all(test, any(feature = "dsa", feature = "exchange")))]
mod tests {
    use super::hash_z;
    use crate::{Curve, DEFAULT_DISTID, Error, PublicKey};
    use alloc::vec;
    use sm3::Sm3;

    #[test]
    fn identifier_length_limit() {
        let curve = Curve::sm2p256v1();
        let key = PublicKey::from_affine(curve.generator()).unwrap();

        assert!(hash_z::<Sm3>(&[], &key).is_ok());
        assert!(hash_z::<Sm3>(&vec![0x41; 8191], &key).is_ok());
        assert_eq!(
            hash_z::<Sm3>(&vec![0x41; 8192], &key).unwrap_err(),
            Error::DistIdTooLong
        );
    }

    #[test]
    fn depends_on_identifier_and_key() {
        let curve = Curve::sm2p256v1();
        let g = PublicKey::from_affine(curve.generator()).unwrap();
        let g2 = PublicKey::from_affine(curve.generator().double()).unwrap();

        let z = hash_z::<Sm3>(DEFAULT_DISTID, &g).unwrap();
        assert_eq!(z, hash_z::<Sm3>(DEFAULT_DISTID, &g).unwrap());
        assert_ne!(z, hash_z::<Sm3>(b"ALICE123@YAHOO.COM", &g).unwrap());
        assert_ne!(z, hash_z::<Sm3>(DEFAULT_DISTID, &g2).unwrap());
    }
}
