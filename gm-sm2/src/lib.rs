#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![doc(
    html_logo_url = "https://raw.githubusercontent.com/RustCrypto/meta/master/logo.svg",
    html_favicon_url = "https://raw.githubusercontent.com/RustCrypto/meta/master/logo.svg"
)]
#![forbid(unsafe_code)]
#![warn(
    clippy::mod_module_files,
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::checked_conversions,
    clippy::implicit_saturating_sub,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    missing_docs,
    rust_2018_idioms,
    unused_lifetimes,
    unused_qualifications
)]

//! Pure Rust implementation of the SM2 elliptic curve public key cryptosystem
//! defined in the Chinese national standard GM/T 0003-2012.
//!
//! The crate provides:
//!
//! - [`dsa`]: the SM2DSA digital signature algorithm
//! - [`pke`]: SM2 public key encryption
//! - [`exchange`]: the SM2 key exchange protocol with optional key confirmation
//!
//! Arithmetic is generic over short Weierstrass curves `y² = x³ + ax + b`
//! over a prime field. [`Curve::sm2p256v1`] gives the recommended 256-bit
//! curve; [`Curve::new`] accepts any validated set of domain parameters.
//!
//! ## ⚠️ Security Warning
//!
//! Arithmetic is performed on arbitrary-precision integers and is **not**
//! constant time. Do not use this crate where timing side channels matter.
//!
//! ## Minimum Supported Rust Version
//!
//! Rust **1.85** or higher.

extern crate alloc;

#[cfg(feature = "dsa")]
pub mod dsa;
#[cfg(feature = "exchange")]
pub mod exchange;
#[cfg(feature = "pke")]
pub mod pke;

mod arithmetic;
mod distid;
mod error;
mod kdf;
mod public_key;
mod secret_key;

pub use crate::{
    arithmetic::{AffinePoint, Curve, FieldElement},
    distid::DistId,
    error::{Error, Result},
    kdf::kdf,
    public_key::PublicKey,
    secret_key::SecretKey,
};
pub use num_bigint::{self, BigUint};
pub use sm3::{self, Sm3};

/// Default distinguishing identifier used when none is given.
pub const DEFAULT_DISTID: &DistId = b"1234567812345678";
