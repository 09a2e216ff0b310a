//! SM2 key exchange protocol as defined in [draft-shen-sm2-ecdsa § 6].
//!
//! Each party holds a static key pair and generates a fresh ephemeral key
//! pair per session. After exchanging their public parameters, both sides
//! derive the same key, optionally confirming it with the tags `S1`/`S2`.
//!
//! ## Usage
#![cfg_attr(feature = "getrandom", doc = "```")]
#![cfg_attr(not(feature = "getrandom"), doc = "```ignore")]
//! # fn example() -> gm_sm2::Result<()> {
//! use gm_sm2::{Curve, SecretKey, exchange::{KeyExchange, Role}};
//! use rand_core::OsRng;
//!
//! let curve = Curve::sm2p256v1();
//! let alice_static = SecretKey::random(&curve, &mut OsRng)?;
//! let bob_static = SecretKey::random(&curve, &mut OsRng)?;
//!
//! let alice = KeyExchange::generate(Role::Initiator, b"alice", alice_static, &mut OsRng)?;
//! let bob = KeyExchange::generate(Role::Responder, b"bob", bob_static, &mut OsRng)?;
//! let (to_bob, to_alice) = (alice.public_parameters(), bob.public_parameters());
//!
//! // the responder answers first, sending S1 along with its parameters
//! let bob_key = bob.calculate_key_with_confirmation(16, &to_bob, None)?;
//! let alice_key =
//!     alice.calculate_key_with_confirmation(16, &to_alice, Some(bob_key.confirmation_tag()))?;
//!
//! bob_key.confirm_initiator(alice_key.confirmation_tag())?;
//! assert_eq!(alice_key.key(), bob_key.key());
//! # Ok(())
//! # }
//! ```
//!
//! [draft-shen-sm2-ecdsa § 6]: https://datatracker.ietf.org/doc/html/draft-shen-sm2-ecdsa-02#section-6

use crate::{
    AffinePoint, DEFAULT_DISTID, DistId, Error, PublicKey, Result, SecretKey, distid::hash_z,
    kdf::derive_into,
};
use alloc::{vec, vec::Vec};
use core::fmt;
use num_bigint::BigUint;
use num_traits::One;
use rand_core::CryptoRngCore;
use sm3::{
    Sm3,
    digest::{Digest, FixedOutputReset, Output, OutputSizeUser},
};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// Tag prefixing `S1`, the responder's confirmation.
const RESPONDER_TAG: u8 = 0x02;

/// Tag prefixing `S2`, the initiator's confirmation.
const INITIATOR_TAG: u8 = 0x03;

/// Which side of the exchange a party plays.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
    /// Party A, who starts the exchange.
    Initiator,
    /// Party B, who answers it.
    Responder,
}

/// Public values a party sends to its peer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicParameters<'c> {
    static_key: PublicKey<'c>,
    ephemeral_key: PublicKey<'c>,
    distid: Vec<u8>,
}

impl<'c> PublicParameters<'c> {
    /// Peer parameters with the default distinguishing identifier.
    pub fn new(static_key: PublicKey<'c>, ephemeral_key: PublicKey<'c>) -> Self {
        Self::with_distid(DEFAULT_DISTID, static_key, ephemeral_key)
    }

    /// Peer parameters with an explicit distinguishing identifier.
    pub fn with_distid(
        distid: &DistId,
        static_key: PublicKey<'c>,
        ephemeral_key: PublicKey<'c>,
    ) -> Self {
        Self {
            static_key,
            ephemeral_key,
            distid: distid.into(),
        }
    }

    /// Static public key `P`.
    pub fn static_key(&self) -> &PublicKey<'c> {
        &self.static_key
    }

    /// Ephemeral public key `R`.
    pub fn ephemeral_key(&self) -> &PublicKey<'c> {
        &self.ephemeral_key
    }

    /// Distinguishing identifier.
    pub fn distid(&self) -> &DistId {
        &self.distid
    }
}

/// One party's side of a single key exchange session.
///
/// Deriving a key consumes the session, so each ephemeral key is used once.
pub struct KeyExchange<'c, D: Digest = Sm3> {
    role: Role,
    static_key: SecretKey<'c>,
    ephemeral_key: SecretKey<'c>,
    public: PublicParameters<'c>,
    identity_hash: Output<D>,
}

impl<'c> KeyExchange<'c> {
    /// Start a session from a static and an ephemeral secret key.
    pub fn new(
        role: Role,
        distid: &DistId,
        static_key: SecretKey<'c>,
        ephemeral_key: SecretKey<'c>,
    ) -> Result<Self> {
        Self::new_with_digest(role, distid, static_key, ephemeral_key)
    }

    /// Start a session with a freshly generated ephemeral key.
    pub fn generate<R: CryptoRngCore + ?Sized>(
        role: Role,
        distid: &DistId,
        static_key: SecretKey<'c>,
        rng: &mut R,
    ) -> Result<Self> {
        Self::generate_with_digest(role, distid, static_key, rng)
    }
}

impl<'c, D> KeyExchange<'c, D>
where
    D: Digest + FixedOutputReset,
{
    /// Start a session hashing with `D` instead of SM3.
    pub fn new_with_digest(
        role: Role,
        distid: &DistId,
        static_key: SecretKey<'c>,
        ephemeral_key: SecretKey<'c>,
    ) -> Result<Self> {
        if static_key.curve() != ephemeral_key.curve() {
            return Err(Error::CurveMismatch);
        }

        let public = PublicParameters::with_distid(
            distid,
            static_key.public_key(),
            ephemeral_key.public_key(),
        );
        let identity_hash = hash_z::<D>(distid, &public.static_key)?;

        Ok(Self {
            role,
            static_key,
            ephemeral_key,
            public,
            identity_hash,
        })
    }

    /// Start a session hashing with `D`, generating the ephemeral key.
    pub fn generate_with_digest<R: CryptoRngCore + ?Sized>(
        role: Role,
        distid: &DistId,
        static_key: SecretKey<'c>,
        rng: &mut R,
    ) -> Result<Self> {
        let ephemeral_key = SecretKey::random(static_key.curve(), rng)?;
        Self::new_with_digest(role, distid, static_key, ephemeral_key)
    }

    /// Role of this party.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Parameters to send to the peer.
    pub fn public_parameters(&self) -> PublicParameters<'c> {
        self.public.clone()
    }

    /// Derive `klen` bytes of shared key without confirmation.
    pub fn calculate_key(
        self,
        klen: usize,
        peer: &PublicParameters<'c>,
    ) -> Result<Zeroizing<Vec<u8>>> {
        let agreement = self.agree(peer)?;
        agreement.derive_key(klen)
    }

    /// Derive `klen` bytes of shared key along with confirmation tags.
    ///
    /// The initiator must pass the responder's `S1` as `confirmation`. The
    /// responder may pass the initiator's `S2` if it already has it; otherwise
    /// it checks it later with [`ConfirmedKey::confirm_initiator`].
    pub fn calculate_key_with_confirmation(
        self,
        klen: usize,
        peer: &PublicParameters<'c>,
        confirmation: Option<&[u8]>,
    ) -> Result<ConfirmedKey<D>> {
        let role = self.role;
        if role == Role::Initiator && confirmation.is_none() {
            return Err(Error::ConfirmationRequired);
        }

        let agreement = self.agree(peer)?;
        let s1 = agreement.confirmation_tag(RESPONDER_TAG);
        let s2 = agreement.confirmation_tag(INITIATOR_TAG);

        match (role, confirmation) {
            (Role::Initiator, Some(tag)) => {
                if !bool::from(s1.as_slice().ct_eq(tag)) {
                    return Err(Error::ConfirmationMismatch);
                }

                Ok(ConfirmedKey::Initiator {
                    key: agreement.derive_key(klen)?,
                    s2,
                })
            }
            (Role::Initiator, None) => Err(Error::ConfirmationRequired),
            (Role::Responder, tag) => {
                let result = ConfirmedKey::Responder {
                    key: agreement.derive_key(klen)?,
                    s1,
                    s2,
                };

                if let Some(tag) = tag {
                    result.confirm_initiator(tag)?;
                }

                Ok(result)
            }
        }
    }

    /// Compute the shared point `U` and collect the values hashed after it.
    fn agree(self, peer: &PublicParameters<'c>) -> Result<Agreement<D>> {
        let curve = self.static_key.curve();
        if peer.static_key.curve() != curve || peer.ephemeral_key.curve() != curve {
            return Err(Error::CurveMismatch);
        }

        let peer_hash = hash_z::<D>(&peer.distid, &peer.static_key)?;
        let n = curve.order();

        // w = ⌈⌈log2(n)⌉/2⌉ - 1, taken from the field size
        let w = (curve.field_bits() - 1) / 2;
        let two_w = BigUint::one() << w;
        let mask = &two_w - 1u8;
        let reduce = |point: &AffinePoint<'_>| match point.x() {
            Some(x) => &two_w + (x.as_uint() & &mask),
            None => two_w.clone(),
        };

        // x̄1 = 2^w + (x1 & (2^w - 1))
        let x1_bar = reduce(self.public.ephemeral_key.as_affine());

        // x̄2 = 2^w + (x2 & (2^w - 1))
        let x2_bar = reduce(peer.ephemeral_key.as_affine());

        // t = (d + x̄1 · r) mod n
        let t = (self.static_key.as_scalar() + x1_bar * self.ephemeral_key.as_scalar()) % n;

        // U = [h · t](P + [x̄2]R)
        let k1 = (curve.cofactor() * t) % n;
        let k2 = (&k1 * x2_bar) % n;
        let u = &peer.static_key.as_affine().mul(&k1) + &peer.ephemeral_key.as_affine().mul(&k2);

        let (Some(ux), Some(uy)) = (u.x(), u.y()) else {
            return Err(Error::SharedPointAtInfinity);
        };

        let (own_r, peer_r) = (
            self.public.ephemeral_key.coordinate_bytes(),
            peer.ephemeral_key.coordinate_bytes(),
        );

        let (z_init, z_resp, r_init, r_resp) = match self.role {
            Role::Initiator => (self.identity_hash, peer_hash, own_r, peer_r),
            Role::Responder => (peer_hash, self.identity_hash, peer_r, own_r),
        };

        Ok(Agreement {
            ux: Zeroizing::new(ux.to_be_bytes()),
            uy: Zeroizing::new(uy.to_be_bytes()),
            z_init,
            z_resp,
            r_init,
            r_resp,
        })
    }
}

impl<D: Digest> fmt::Debug for KeyExchange<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyExchange")
            .field("role", &self.role)
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

/// Values both parties agree on once `U` is known.
struct Agreement<D: OutputSizeUser> {
    ux: Zeroizing<Vec<u8>>,
    uy: Zeroizing<Vec<u8>>,
    z_init: Output<D>,
    z_resp: Output<D>,
    r_init: (Vec<u8>, Vec<u8>),
    r_resp: (Vec<u8>, Vec<u8>),
}

impl<D> Agreement<D>
where
    D: Digest + FixedOutputReset,
{
    /// K = KDF(xU || yU || ZA || ZB, klen)
    fn derive_key(&self, klen: usize) -> Result<Zeroizing<Vec<u8>>> {
        let mut key = Zeroizing::new(vec![0u8; klen]);
        derive_into(
            &mut D::new(),
            &[
                self.ux.as_slice(),
                self.uy.as_slice(),
                self.z_init.as_slice(),
                self.z_resp.as_slice(),
            ],
            key.as_mut_slice(),
        )?;
        Ok(key)
    }

    /// Hash(tag || yU || Hash(xU || ZA || ZB || x1 || y1 || x2 || y2))
    fn confirmation_tag(&self, tag: u8) -> Output<D> {
        let inner = D::new()
            .chain_update(&*self.ux)
            .chain_update(&self.z_init)
            .chain_update(&self.z_resp)
            .chain_update(&self.r_init.0)
            .chain_update(&self.r_init.1)
            .chain_update(&self.r_resp.0)
            .chain_update(&self.r_resp.1)
            .finalize();

        D::new()
            .chain_update([tag])
            .chain_update(&*self.uy)
            .chain_update(inner)
            .finalize()
    }
}

/// Shared key together with the key confirmation tags of one party.
pub enum ConfirmedKey<D: OutputSizeUser = Sm3> {
    /// Initiator's result after it checked the responder's `S1`.
    Initiator {
        /// Shared key.
        key: Zeroizing<Vec<u8>>,
        /// `S2`, to send to the responder.
        s2: Output<D>,
    },
    /// Responder's result.
    Responder {
        /// Shared key.
        key: Zeroizing<Vec<u8>>,
        /// `S1`, to send to the initiator.
        s1: Output<D>,
        /// `S2`, expected from the initiator.
        s2: Output<D>,
    },
}

impl<D: OutputSizeUser> ConfirmedKey<D> {
    /// Shared key.
    pub fn key(&self) -> &[u8] {
        match self {
            Self::Initiator { key, .. } | Self::Responder { key, .. } => key.as_slice(),
        }
    }

    /// Tag this party sends to its peer: `S2` for the initiator, `S1` for
    /// the responder.
    pub fn confirmation_tag(&self) -> &[u8] {
        match self {
            Self::Initiator { s2, .. } => s2.as_slice(),
            Self::Responder { s1, .. } => s1.as_slice(),
        }
    }

    /// Check the initiator's `S2` in constant time.
    ///
    /// Always fails on an initiator's result, which has nothing left to
    /// confirm.
    pub fn confirm_initiator(&self, tag: &[u8]) -> Result<()> {
        match self {
            Self::Responder { s2, .. } if bool::from(s2.as_slice().ct_eq(tag)) => Ok(()),
            _ => Err(Error::ConfirmationMismatch),
        }
    }
}

impl<D: OutputSizeUser> fmt::Debug for ConfirmedKey<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let role = match self {
            Self::Initiator { .. } => Role::Initiator,
            Self::Responder { .. } => Role::Responder,
        };
        f.debug_struct("ConfirmedKey")
            .field("role", &role)
            .finish_non_exhaustive()
    }
}
