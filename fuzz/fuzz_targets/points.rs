#![no_main]
use gm_sm2::{AffinePoint, BigUint, Curve};
use libfuzzer_sys::fuzz_target;
use std::sync::LazyLock;

static CURVE: LazyLock<Curve> = LazyLock::new(Curve::sm2p256v1);

fn test_group(p1: &AffinePoint<'_>, p2: &AffinePoint<'_>, s: &BigUint) {
    let sum = p1 + p2;
    let scalar_mul = p1.mul(s);

    // Test that addition and doubling are consistent
    assert_eq!(p1.double(), p1 + p1);

    // Test that negation works correctly
    assert!((&sum + &(-&sum)).is_identity());

    // Test scalar multiplication distributive property
    assert_eq!(&scalar_mul + &scalar_mul, p1.mul(&(s + s)));
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 98 {
        return;
    }

    let g = CURVE.generator();

    // Decoding must never panic, and whatever it accepts must be on the curve
    let decoded = [
        CURVE.decode_point(&data[..65]),
        CURVE.decode_point(&data[..33]),
        CURVE.decode_point(&data[65..]),
    ];
    for point in decoded.iter().flatten() {
        assert!(point.is_valid());
        let compress = data[0] & 1 == 1;
        assert_eq!(&CURVE.decode_point(&point.to_sec1_bytes(compress)).unwrap(), point);
    }

    let p1 = decoded[0].clone().unwrap_or_else(|_| g.clone());
    let p2 = decoded[1].clone().unwrap_or_else(|_| g.mul(&BigUint::from_bytes_be(&data[33..65])));
    let scalar = BigUint::from_bytes_be(&data[65..97]);

    test_group(&p1, &p2, &scalar);
});
