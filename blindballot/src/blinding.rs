//! The blinding transform.
//!
//! A voter encodes its ballot ciphertext as an integer `m`, blinds it as `m * r^e mod n`,
//! has the Authority sign the blinded value, and unblinds the result by multiplying with
//! `r^-1`. The unblinded signature verifies against `m` under `(n, e)` but cannot be linked
//! by the Authority to the blinded request it signed.

use crate::*;
use rsa::BigUint;

/// Prefix byte that keeps the encoding injective over inputs with leading zero bytes
const MESSAGE_PREFIX: u8 = 0x01;

/// Encode arbitrary bytes as a message integer smaller than `n`.
///
/// The integer is the big-endian value of `0x01 || bytes`. Fails with `MessageTooLarge` if
/// that value does not fit below the modulus.
pub fn encode_message(bytes: &[u8], n: &BigUint) -> Result<BigUint, Error> {
    let mut prefixed = Vec::with_capacity(bytes.len() + 1);
    prefixed.push(MESSAGE_PREFIX);
    prefixed.extend_from_slice(bytes);

    let m = BigUint::from_bytes_be(&prefixed);
    if &m >= n {
        return Err(Error::MessageTooLarge);
    }
    Ok(m)
}

/// Recover the bytes encoded by `encode_message`.
///
/// Returns `None` if the integer was not produced by `encode_message`.
pub fn decode_message(m: &BigUint) -> Option<Vec<u8>> {
    let bytes = m.to_bytes_be();
    match bytes.split_first() {
        Some((&MESSAGE_PREFIX, rest)) => Some(rest.to_vec()),
        _ => None,
    }
}

/// Per-submission blinding state.
///
/// The blinding factor stays private to this struct and is dropped when the context is
/// consumed by `unblind`.
pub struct BlindingContext {
    message: BigUint,
    blinding_factor: BigUint,
    blinded_message: BigUint,
}

impl BlindingContext {
    /// The message integer being signed
    pub fn message(&self) -> &BigUint {
        &self.message
    }

    /// The value sent to the Authority
    pub fn blinded_message(&self) -> &BigUint {
        &self.blinded_message
    }

    /// Remove the blinding factor from the Authority's signature, consuming the context
    pub fn unblind(self, blind_signature: &BigUint, key: &AuthorityPublicKey) -> Result<BigUint, Error> {
        unblind(blind_signature, &self.blinding_factor, &key.n)
    }
}

/// Blind a message integer for signing: `m * r^e mod n` with a fresh `r` coprime to `n`
pub fn blind(m: &BigUint, key: &AuthorityPublicKey) -> Result<BlindingContext, Error> {
    if m >= &key.n {
        return Err(Error::MessageTooLarge);
    }

    let r = random_coprime(&key.n)?;
    let blinded_message = (m * mod_pow(&r, &key.e, &key.n)) % &key.n;

    Ok(BlindingContext {
        message: m.clone(),
        blinding_factor: r,
        blinded_message,
    })
}

/// Unblind a signature: `signature * r^-1 mod n`
pub fn unblind(blind_signature: &BigUint, r: &BigUint, n: &BigUint) -> Result<BigUint, Error> {
    let r_inv = mod_inverse(r, n)?;
    Ok((blind_signature * r_inv) % n)
}

/// Verify an unblinded signature against a message integer.
///
/// Both values must be reduced modulo `n`. Otherwise `s` and `s + n` would both verify and
/// spent-signature tracking could be sidestepped.
pub fn verify(signature: &BigUint, m: &BigUint, key: &AuthorityPublicKey) -> bool {
    if signature >= &key.n || m >= &key.n {
        return false;
    }
    &mod_pow(signature, &key.e, &key.n) == m
}
