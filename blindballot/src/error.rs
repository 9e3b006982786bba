use crate::*;

use thiserror::Error;

/// Error types
#[derive(Debug, Error)]
pub enum Error {
    #[error("blindballot: {0}")]
    Validation(#[from] ValidationError),

    #[error("blindballot: value has no inverse modulo n")]
    NoInverse,

    #[error("blindballot: message integer is not smaller than the modulus")]
    MessageTooLarge,

    #[error("blindballot: empty range for random integer")]
    EmptyRange,

    #[error("blindballot: modulus must be odd, greater than one, and at most 4096 bits")]
    UnsupportedModulus,

    #[error("blindballot: RSA error: {0}")]
    RSAError(#[from] rsa::Error),

    #[error("blindballot: request signature error: {0}")]
    Signature(#[from] ed25519_dalek::SignatureError),

    #[error("blindballot: signing key does not match the request's voter")]
    MismatchedPublicKeys,

    #[error("blindballot: CBOR error: {0}")]
    CBORSerialization(#[from] serde_cbor::Error),

    #[error("blindballot: JSON error: {0}")]
    JSONDeserialization(#[from] serde_json::Error),

    #[error("blindballot: io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("blindballot: failed to decrypt vote with escrow key")]
    EscrowDecryption,

    #[error("blindballot: escrow key must be {0} bytes")]
    InvalidEscrowKey(usize),

    #[error("blindballot: election lock poisoned")]
    LockPoisoned,
}

impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        Error::LockPoisoned
    }
}

/// Ledger validation errors
///
/// A call that fails with one of these leaves the ledger untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("blindballot validation: election must open before it closes")]
    InvalidWindow,

    #[error("blindballot validation: invalid authority public key")]
    InvalidPublicKey,

    #[error("blindballot validation: signature does not verify against the message")]
    SignatureInvalid,

    #[error("blindballot validation: signature has already been used")]
    SignatureReplayed,

    #[error("blindballot validation: election has not started")]
    NotStarted,

    #[error("blindballot validation: election is closed")]
    Closed,

    #[error("blindballot validation: ballot index {0} out of range")]
    IndexOutOfRange(usize),

    #[error("blindballot validation: caller does not own this ballot")]
    NotOwner,

    #[error("blindballot validation: escrow key already revealed")]
    EscrowKeyAlreadySet,

    #[error("blindballot validation: escrow key must not be empty")]
    EmptyEscrowKey,

    #[error("blindballot validation: election {0} not found")]
    ElectionNotFound(ElectionId),
}
