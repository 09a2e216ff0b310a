#![no_main]
use gm_sm2::{BigUint, Curve, FieldElement};
use libfuzzer_sys::fuzz_target;
use std::sync::LazyLock;

static CURVE: LazyLock<Curve> = LazyLock::new(Curve::sm2p256v1);

fn test_field(fe1: &FieldElement, fe2: &FieldElement, fe3: &FieldElement) {
    let zero = FieldElement::zero(fe1.modulus());
    let one = FieldElement::one(fe1.modulus());

    // Associativity
    assert_eq!(fe1 + &(fe2 + fe3), &(fe1 + fe2) + fe3);
    assert_eq!(fe1 * &(fe2 * fe3), &(fe1 * fe2) * fe3);

    // Commutativity
    assert_eq!(fe1 + fe2, fe2 + fe1);
    assert_eq!(fe1 * fe2, fe2 * fe1);

    // Identity
    assert_eq!(fe1 + &zero, fe1.clone());
    assert_eq!(fe1 * &one, fe1.clone());
    assert_eq!(fe1 - fe1, zero);

    // Distributivity
    assert_eq!(fe1 * &(fe2 + fe3), &(fe1 * fe2) + &(fe1 * fe3));

    // Inverse, square, sqrt
    assert!((fe1 + &(-fe1)).is_zero());
    match fe1.invert() {
        Some(inv) => assert!((fe1 * &inv).is_one()),
        None => assert!(fe1.is_zero()),
    }
    if let Some(root) = fe1.sqrt() {
        assert_eq!(root.square(), fe1.clone());
    }
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 96 {
        return;
    }

    for modulus in [CURVE.modulus(), CURVE.order()] {
        let reduce = |bytes: &[u8]| FieldElement::reduce(&BigUint::from_bytes_be(bytes), modulus);
        test_field(&reduce(&data[..32]), &reduce(&data[32..64]), &reduce(&data[64..96]));

        // Canonical decoding rejects anything not below the modulus
        if let Ok(fe) = FieldElement::from_be_slice(&data[..32], modulus) {
            assert_eq!(fe.to_be_bytes(), &data[..32]);
        }
    }
});
