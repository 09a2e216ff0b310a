//! SM2 key exchange tests.

#![cfg(feature = "exchange")]

use hex_literal::hex;
use rand_core::OsRng;
use std::sync::LazyLock;

use gm_sm2::{
    AffinePoint, BigUint, Curve, Error, PublicKey, SecretKey, Sm3,
    exchange::{KeyExchange, PublicParameters, Role},
    kdf,
    sm3::Digest,
};

static CURVE: LazyLock<Curve> = LazyLock::new(Curve::sm2p256v1);

const ALICE: &[u8] = b"ALICE123@YAHOO.COM";
const BOB: &[u8] = b"BILL456@YAHOO.COM";

fn random_key() -> SecretKey<'static> {
    SecretKey::random(&CURVE, &mut OsRng).unwrap()
}

fn session(
    role: Role,
    distid: &[u8],
    static_key: &SecretKey<'static>,
    ephemeral_key: &SecretKey<'static>,
) -> KeyExchange<'static> {
    KeyExchange::new(role, distid, static_key.clone(), ephemeral_key.clone()).unwrap()
}

fn sessions() -> (KeyExchange<'static>, KeyExchange<'static>) {
    let alice = KeyExchange::generate(Role::Initiator, ALICE, random_key(), &mut OsRng).unwrap();
    let bob = KeyExchange::generate(Role::Responder, BOB, random_key(), &mut OsRng).unwrap();
    (alice, bob)
}

#[test]
fn agree_without_confirmation() {
    let (alice, bob) = sessions();
    let (to_bob, to_alice) = (alice.public_parameters(), bob.public_parameters());

    let alice_key = alice.calculate_key(16, &to_alice).unwrap();
    let bob_key = bob.calculate_key(16, &to_bob).unwrap();

    assert_eq!(alice_key.len(), 16);
    assert_eq!(alice_key, bob_key);
}

#[test]
fn agree_with_confirmation() {
    let (alice, bob) = sessions();
    let (to_bob, to_alice) = (alice.public_parameters(), bob.public_parameters());

    let bob_key = bob.calculate_key_with_confirmation(48, &to_bob, None).unwrap();
    let alice_key = alice
        .calculate_key_with_confirmation(48, &to_alice, Some(bob_key.confirmation_tag()))
        .unwrap();

    assert_eq!(alice_key.key(), bob_key.key());
    assert_eq!(alice_key.key().len(), 48);
    assert_ne!(alice_key.confirmation_tag(), bob_key.confirmation_tag());
    assert_eq!(bob_key.confirm_initiator(alice_key.confirmation_tag()), Ok(()));
}

#[test]
fn responder_checks_tag_up_front() {
    let (alice_static, alice_ephemeral) = (random_key(), random_key());
    let (bob_static, bob_ephemeral) = (random_key(), random_key());

    let alice = session(Role::Initiator, ALICE, &alice_static, &alice_ephemeral);
    let bob = session(Role::Responder, BOB, &bob_static, &bob_ephemeral);
    let (to_bob, to_alice) = (alice.public_parameters(), bob.public_parameters());

    let bob_key = bob.calculate_key_with_confirmation(16, &to_bob, None).unwrap();
    let alice_key = alice
        .calculate_key_with_confirmation(16, &to_alice, Some(bob_key.confirmation_tag()))
        .unwrap();

    // same ephemeral keys replayed with S2 already at hand
    let bob = session(Role::Responder, BOB, &bob_static, &bob_ephemeral);
    let replay = bob
        .calculate_key_with_confirmation(16, &to_bob, Some(alice_key.confirmation_tag()))
        .unwrap();
    assert_eq!(replay.key(), alice_key.key());

    let bob = session(Role::Responder, BOB, &bob_static, &bob_ephemeral);
    assert_eq!(
        bob.calculate_key_with_confirmation(16, &to_bob, Some(&[0u8; 32][..]))
            .unwrap_err(),
        Error::ConfirmationMismatch
    );
}

#[test]
fn initiator_requires_confirmation() {
    let (alice, bob) = sessions();
    let to_alice = bob.public_parameters();
    assert_eq!(
        alice
            .calculate_key_with_confirmation(16, &to_alice, None)
            .unwrap_err(),
        Error::ConfirmationRequired
    );
}

#[test]
fn tampered_confirmation_rejected() {
    let (alice, bob) = sessions();
    let (to_bob, to_alice) = (alice.public_parameters(), bob.public_parameters());

    let bob_key = bob.calculate_key_with_confirmation(16, &to_bob, None).unwrap();
    let mut s1 = bob_key.confirmation_tag().to_vec();
    s1[0] ^= 1;

    assert_eq!(
        alice
            .calculate_key_with_confirmation(16, &to_alice, Some(s1.as_slice()))
            .unwrap_err(),
        Error::ConfirmationMismatch
    );
    assert_eq!(
        bob_key.confirm_initiator(&s1),
        Err(Error::ConfirmationMismatch)
    );
}

#[test]
fn mismatched_identity_breaks_agreement() {
    let (alice, bob) = sessions();
    let to_alice = bob.public_parameters();

    // Bob believes Alice used a different identifier
    let forged = PublicParameters::with_distid(
        b"MALLORY@YAHOO.COM",
        alice.public_parameters().static_key().clone(),
        alice.public_parameters().ephemeral_key().clone(),
    );

    let bob_key = bob.calculate_key_with_confirmation(16, &forged, None).unwrap();
    assert_eq!(
        alice
            .calculate_key_with_confirmation(16, &to_alice, Some(bob_key.confirmation_tag()))
            .unwrap_err(),
        Error::ConfirmationMismatch
    );
}

#[test]
fn default_distid_parameters() {
    let (static_key, ephemeral_key) = (random_key(), random_key());
    let params = PublicParameters::new(static_key.public_key(), ephemeral_key.public_key());
    assert_eq!(params.distid(), gm_sm2::DEFAULT_DISTID);

    let session = KeyExchange::new(
        Role::Responder,
        gm_sm2::DEFAULT_DISTID,
        static_key,
        ephemeral_key,
    )
    .unwrap();
    assert_eq!(session.public_parameters(), params);
    assert_eq!(session.role(), Role::Responder);
}

#[test]
fn curve_mismatch() {
    // y^2 = x^3 + 2x + 2 over F_17, order 19
    let toy = Curve::new(
        17u8.into(),
        2u8.into(),
        2u8.into(),
        5u8.into(),
        1u8.into(),
        19u8.into(),
        1u8.into(),
    )
    .unwrap();
    let toy_key = SecretKey::new(&toy, 7u8.into()).unwrap();

    assert_eq!(
        KeyExchange::new(Role::Initiator, ALICE, random_key(), toy_key.clone()).unwrap_err(),
        Error::CurveMismatch
    );

    let toy_public: PublicKey<'_> = toy_key.public_key();
    let peer = PublicParameters::new(toy_public.clone(), toy_public);
    let (alice, _) = sessions();
    assert_eq!(
        alice.calculate_key(16, &peer).unwrap_err(),
        Error::CurveMismatch
    );
}

#[test]
fn tampered_ephemeral_key_breaks_agreement() {
    let (alice_static, alice_ephemeral) = (random_key(), random_key());
    let (bob_static, bob_ephemeral) = (random_key(), random_key());

    let alice = || session(Role::Initiator, ALICE, &alice_static, &alice_ephemeral);
    let bob = || session(Role::Responder, BOB, &bob_static, &bob_ephemeral);
    let substitute = |params: PublicParameters<'static>, distid: &[u8]| {
        PublicParameters::with_distid(distid, params.static_key().clone(), random_key().public_key())
    };

    let (to_bob, to_alice) = (alice().public_parameters(), bob().public_parameters());
    let forged_to_bob = substitute(to_bob.clone(), ALICE);
    let forged_to_alice = substitute(to_alice.clone(), BOB);

    assert_eq!(
        alice().calculate_key(32, &to_alice).unwrap(),
        bob().calculate_key(32, &to_bob).unwrap()
    );
    assert_ne!(
        alice().calculate_key(32, &to_alice).unwrap(),
        bob().calculate_key(32, &forged_to_bob).unwrap()
    );
    assert_ne!(
        alice().calculate_key(32, &forged_to_alice).unwrap(),
        bob().calculate_key(32, &to_bob).unwrap()
    );

    // responder received a substituted initiator ephemeral key
    let bob_key = bob()
        .calculate_key_with_confirmation(16, &forged_to_bob, None)
        .unwrap();
    assert_eq!(
        alice()
            .calculate_key_with_confirmation(16, &to_alice, Some(bob_key.confirmation_tag()))
            .unwrap_err(),
        Error::ConfirmationMismatch
    );

    // initiator received a substituted responder ephemeral key
    let bob_key = bob().calculate_key_with_confirmation(16, &to_bob, None).unwrap();
    assert_eq!(
        alice()
            .calculate_key_with_confirmation(
                16,
                &forged_to_alice,
                Some(bob_key.confirmation_tag())
            )
            .unwrap_err(),
        Error::ConfirmationMismatch
    );
}

const ALICE_STATIC: [u8; 32] =
    hex!("6FCBA2EF9AE0AB902BC3BDE3FF915D44BA4CC78F88E2F8E7F8996D3B8CCEEDEE");
const ALICE_EPHEMERAL: [u8; 32] =
    hex!("83A2C9C8B96E5AF70BD480B472409A9A327257F1EBB73F5B073354B248668563");
const BOB_STATIC: [u8; 32] =
    hex!("5E35D7D3F3C54DBAC72E61819E730B019A84208CA3A35E4C2E353DFCCB2A3B53");
const BOB_EPHEMERAL: [u8; 32] =
    hex!("33FE21940342161C55619C4A0C060293D543C80AF19748CE176D83477DE71C80");

fn fixed_key(bytes: &[u8]) -> SecretKey<'static> {
    SecretKey::from_slice(&CURVE, bytes).unwrap()
}

fn coordinates(point: &AffinePoint<'_>) -> (Vec<u8>, Vec<u8>) {
    (
        point.x().unwrap().to_be_bytes(),
        point.y().unwrap().to_be_bytes(),
    )
}

/// Z = SM3(ENTL || ID || a || b || xG || yG || x || y)
fn user_hash(distid: &[u8], key: &PublicKey<'_>) -> Vec<u8> {
    let (gx, gy) = coordinates(&CURVE.generator());
    let (x, y) = coordinates(key.as_affine());

    Sm3::new()
        .chain_update(u16::try_from(distid.len() * 8).unwrap().to_be_bytes())
        .chain_update(distid)
        .chain_update(CURVE.a().to_be_bytes())
        .chain_update(CURVE.b().to_be_bytes())
        .chain_update(gx)
        .chain_update(gy)
        .chain_update(x)
        .chain_update(y)
        .finalize()
        .to_vec()
}

/// x̄ = 2^127 + (x & (2^127 - 1)) on a 256-bit field
fn x_bar(key: &PublicKey<'_>) -> BigUint {
    let two_w = BigUint::from(1u8) << 127u32;
    let x = key.as_affine().x().unwrap().as_uint();
    &two_w + (x & (&two_w - 1u8))
}

#[test]
fn fixed_keys_transcript() {
    let (da, ra) = (fixed_key(&ALICE_STATIC), fixed_key(&ALICE_EPHEMERAL));
    let (db, rb) = (fixed_key(&BOB_STATIC), fixed_key(&BOB_EPHEMERAL));
    let (pa, ra_pub) = (da.public_key(), ra.public_key());
    let (pb, rb_pub) = (db.public_key(), rb.public_key());
    let n = CURVE.order();

    // V = [tB](PA + [x̄1]RA) with tB = dB + x̄2 · rB
    let tb = (db.as_scalar() + x_bar(&rb_pub) * rb.as_scalar()) % n;
    let v = &pa.as_affine().mul(&tb) + &ra_pub.as_affine().mul(&((&tb * x_bar(&ra_pub)) % n));

    let (xv, yv) = coordinates(&v);
    let (za, zb) = (user_hash(ALICE, &pa), user_hash(BOB, &pb));
    let (x1, y1) = coordinates(ra_pub.as_affine());
    let (x2, y2) = coordinates(rb_pub.as_affine());

    let shared = [xv.as_slice(), yv.as_slice(), za.as_slice(), zb.as_slice()].concat();
    let key = kdf::<Sm3>(&shared, 16).unwrap();

    let inner = Sm3::new()
        .chain_update(&xv)
        .chain_update(&za)
        .chain_update(&zb)
        .chain_update(&x1)
        .chain_update(&y1)
        .chain_update(&x2)
        .chain_update(&y2)
        .finalize();
    let tag = |prefix: u8| {
        Sm3::new()
            .chain_update([prefix])
            .chain_update(&yv)
            .chain_update(inner.as_slice())
            .finalize()
            .to_vec()
    };
    let (s1, s2) = (tag(0x02), tag(0x03));

    let alice = KeyExchange::new(Role::Initiator, ALICE, da, ra).unwrap();
    let bob = KeyExchange::new(Role::Responder, BOB, db, rb).unwrap();
    let (to_bob, to_alice) = (alice.public_parameters(), bob.public_parameters());

    let bob_key = bob.calculate_key_with_confirmation(16, &to_bob, None).unwrap();
    assert_eq!(bob_key.key(), key.as_slice());
    assert_eq!(bob_key.confirmation_tag(), s1.as_slice());

    let alice_key = alice
        .calculate_key_with_confirmation(16, &to_alice, Some(s1.as_slice()))
        .unwrap();
    assert_eq!(alice_key.key(), key.as_slice());
    assert_eq!(alice_key.confirmation_tag(), s2.as_slice());
    assert_eq!(bob_key.confirm_initiator(&s2), Ok(()));
}
