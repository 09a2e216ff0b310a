#![no_main]
use gm_sm2::{
    Curve, DEFAULT_DISTID, SecretKey,
    dsa::{Signature, VerifyingKey},
    pke::{Cipher, DecryptingKey, Mode},
};
use libfuzzer_sys::fuzz_target;
use std::sync::LazyLock;

static CURVE: LazyLock<Curve> = LazyLock::new(Curve::sm2p256v1);

static KEY: LazyLock<SecretKey<'static>> =
    LazyLock::new(|| SecretKey::from_slice(&CURVE, &[0x5A; 32]).unwrap());

fuzz_target!(|data: &[u8]| {
    // DER signatures re-encode to the same bytes
    if let Ok(signature) = Signature::from_der(data) {
        assert_eq!(signature.to_der().unwrap(), data);

        let vk = VerifyingKey::new(DEFAULT_DISTID, KEY.public_key()).unwrap();
        assert!(vk.verify_der(b"fuzz", data).is_ok());
    }

    // Ciphertexts parse or fail without panicking, and decryption never succeeds by accident
    for mode in [Mode::C1C2C3, Mode::C1C3C2] {
        if let Ok(cipher) = Cipher::from_slice(&CURVE, data, mode) {
            let reencoded = cipher.to_vec(mode);
            assert!(Cipher::from_slice(&CURVE, &reencoded, mode).is_ok());
        }

        let dk = DecryptingKey::new_with_mode(KEY.clone(), mode);
        let _ = dk.decrypt(data);
    }
});
