//! Key derivation function from GM/T 0003.4-2012 § 5.4.3.
//!
//! ```text
//! K = Hv(Z || ct=1) || Hv(Z || ct=2) || ... truncated to klen bytes
//! ```

use crate::{Error, Result};
use alloc::{vec, vec::Vec};
use sm3::digest::{Digest, FixedOutputReset};
use zeroize::Zeroize;

/// Derive `klen` bytes of key material from the shared secret `z`.
///
/// `klen = 0` yields an empty vector without hashing anything.
pub fn kdf<D>(z: &[u8], klen: usize) -> Result<Vec<u8>>
where
    D: Digest + FixedOutputReset,
{
    let mut out = vec![0u8; klen];
    derive_into(&mut D::new(), &[z], &mut out)?;
    Ok(out)
}

/// Fill `out` with KDF output over the concatenation of `parts`.
///
/// `hasher` is left in its reset state.
pub(crate) fn derive_into<D>(hasher: &mut D, parts: &[&[u8]], out: &mut [u8]) -> Result<()>
where
    D: Digest + FixedOutputReset,
{
    let block_len = <D as Digest>::output_size();
    if u32::try_from(out.len().div_ceil(block_len)).is_err() {
        return Err(Error::KdfOutputTooLong);
    }

    for (chunk, ct) in out.chunks_mut(block_len).zip(1u32..) {
        for part in parts {
            Digest::update(hasher, part);
        }
        Digest::update(hasher, ct.to_be_bytes());

        let mut block = Digest::finalize_reset(hasher);
        chunk.copy_from_slice(&block[..chunk.len()]);
        block.as_mut_slice().zeroize();
    }

    Ok(())
}
