use crate::*;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;

const AES_NONCE_LENGTH: usize = 12;
const ESCROW_INFO: &[u8] = b"blindballot escrow";

/// Length of an escrow key in bytes
pub const ESCROW_KEY_LENGTH: usize = 32;

/// An ephemeral key a voter encrypts its ballot under and later reveals
#[derive(Clone, PartialEq, Eq)]
pub struct EscrowKey([u8; ESCROW_KEY_LENGTH]);

impl EscrowKey {
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        let mut key = [0u8; ESCROW_KEY_LENGTH];
        csprng.fill_bytes(&mut key);
        EscrowKey(key)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != ESCROW_KEY_LENGTH {
            return Err(Error::InvalidEscrowKey(ESCROW_KEY_LENGTH));
        }
        let mut key = [0u8; ESCROW_KEY_LENGTH];
        key.copy_from_slice(bytes);
        Ok(EscrowKey(key))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    fn cipher(&self) -> Result<Aes256Gcm, Error> {
        let hkdf = Hkdf::<Sha256>::new(None, &self.0);
        let mut aes_key = [0u8; 32];
        hkdf.expand(ESCROW_INFO, &mut aes_key)
            .map_err(|_| Error::InvalidEscrowKey(ESCROW_KEY_LENGTH))?;

        Aes256Gcm::new_from_slice(&aes_key).map_err(|_| Error::InvalidEscrowKey(ESCROW_KEY_LENGTH))
    }
}

impl std::fmt::Debug for EscrowKey {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "EscrowKey(..)")
    }
}

/// Encrypt a vote under an escrow key.
///
/// Output is `nonce || ciphertext` with AES-256-GCM keyed by HKDF-SHA256 of the escrow key.
pub fn encrypt_vote(key: &EscrowKey, vote: &[u8]) -> Result<Vec<u8>, Error> {
    let cipher = key.cipher()?;

    let mut nonce = [0u8; AES_NONCE_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut nonce);

    let encrypted = cipher
        .encrypt(Nonce::from_slice(&nonce), vote)
        .map_err(|_| Error::EscrowDecryption)?;

    let mut cipher_text = Vec::with_capacity(AES_NONCE_LENGTH + encrypted.len());
    cipher_text.extend_from_slice(&nonce);
    cipher_text.extend(encrypted);

    Ok(cipher_text)
}

/// Decrypt a vote with a revealed escrow key
pub fn decrypt_vote(key: &[u8], encrypted_vote: &[u8]) -> Result<Vec<u8>, Error> {
    let key = EscrowKey::from_bytes(key)?;
    if encrypted_vote.len() < AES_NONCE_LENGTH {
        return Err(Error::EscrowDecryption);
    }

    let (nonce, encrypted) = encrypted_vote.split_at(AES_NONCE_LENGTH);
    key.cipher()?
        .decrypt(Nonce::from_slice(nonce), encrypted)
        .map_err(|_| Error::EscrowDecryption)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escrow_encryption() {
        let key = EscrowKey::generate();
        let encrypted = encrypt_vote(&key, b"0").unwrap();
        assert_eq!(decrypt_vote(key.as_bytes(), &encrypted).unwrap(), b"0".to_vec());

        // Wrong key
        let other = EscrowKey::generate();
        assert!(matches!(
            decrypt_vote(other.as_bytes(), &encrypted),
            Err(Error::EscrowDecryption)
        ));

        // Truncated ciphertext
        assert!(decrypt_vote(key.as_bytes(), &encrypted[..5]).is_err());

        // Bad key length
        assert!(matches!(
            decrypt_vote(&[1, 2, 3], &encrypted),
            Err(Error::InvalidEscrowKey(32))
        ));
    }
}
