use crate::*;
use num_integer::Integer;
use num_traits::One;
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{BigUint, RsaPrivateKey};

/// The Authority's published RSA key: modulus `n` and public exponent `e`.
///
/// Immutable once an election has been created with it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AuthorityPublicKey {
    #[serde(with = "decimal")]
    pub n: BigUint,

    #[serde(with = "decimal")]
    pub e: BigUint,
}

impl AuthorityPublicKey {
    pub fn new(n: BigUint, e: BigUint) -> Self {
        AuthorityPublicKey { n, e }
    }

    /// Check that the key could be an RSA public key at all
    pub fn is_well_formed(&self) -> bool {
        let two = BigUint::from(2u32);
        self.n > two && self.e >= two && self.e < self.n
    }
}

/// An RSA key pair `{n, e, d}`.
///
/// `d` never leaves the Authority. The serialized form exists so an Authority can be persisted
/// by its operator; treat it like any other private key file.
#[derive(Serialize, Deserialize, Clone)]
pub struct KeyPair {
    #[serde(with = "decimal")]
    n: BigUint,

    #[serde(with = "decimal")]
    e: BigUint,

    #[serde(with = "decimal")]
    d: BigUint,
}

impl KeyPair {
    /// Generate a fresh RSA key pair of the given modulus size
    pub fn generate(bits: usize) -> Result<Self, Error> {
        let mut csprng = rand::rngs::OsRng;
        let private_key = RsaPrivateKey::new(&mut csprng, bits)?;

        Ok(KeyPair {
            n: private_key.n().clone(),
            e: private_key.e().clone(),
            d: private_key.d().clone(),
        })
    }

    pub fn public_key(&self) -> AuthorityPublicKey {
        AuthorityPublicKey::new(self.n.clone(), self.e.clone())
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("n", &self.n)
            .field("e", &self.e)
            .field("d", &"<redacted>")
            .finish()
    }
}

/// Sign a blinded message with the private exponent: `blinded^d mod n`.
///
/// The base is multiplied by `x^e` for a fresh random `x` before exponentiation and the
/// factor is removed afterwards, so the value fed into the private exponentiation is
/// unrelated to the request. The exponentiation itself is constant-time in `d`.
pub fn authority_sign(blinded_message: &BigUint, key: &KeyPair) -> Result<BigUint, Error> {
    let n = &key.n;
    if blinded_message >= n {
        return Err(Error::MessageTooLarge);
    }

    let x = random_coprime(n)?;
    let masked = (blinded_message * mod_pow(&x, &key.e, n)) % n;
    let masked_sig = mod_pow_fixed(&masked, &key.d, n)?;

    Ok((masked_sig * mod_inverse(&x, n)?) % n)
}

/// Draw a random integer in `[2, n-1]` coprime to `n`
pub(crate) fn random_coprime(n: &BigUint) -> Result<BigUint, Error> {
    let low = BigUint::from(2u32);
    if n <= &low {
        return Err(Error::EmptyRange);
    }
    let high = n - BigUint::one();

    loop {
        let r = random_in_range(&low, &high)?;
        if r.gcd(n).is_one() {
            return Ok(r);
        }
    }
}

/// The election Authority
///
/// Owns a key pair for the lifetime of an election family. It never sees ballot content or
/// voter identities, only blinded integers.
pub struct Authority {
    key: KeyPair,
}

impl Authority {
    /// Create an Authority with a freshly generated key pair
    pub fn generate(bits: usize) -> Result<Self, Error> {
        let key = KeyPair::generate(bits)?;
        log::info!("generated {}-bit authority key", key.n.bits());
        Ok(Authority { key })
    }

    /// Restore an Authority from a persisted key pair
    pub fn from_key_pair(key: KeyPair) -> Self {
        Authority { key }
    }

    /// Get the published `(n, e)`
    pub fn public_key(&self) -> AuthorityPublicKey {
        self.key.public_key()
    }

    /// Sign a blinded message
    pub fn sign(&self, blinded_message: &BigUint) -> Result<BigUint, Error> {
        log::debug!(
            "authority signing {}-bit blinded request",
            blinded_message.bits()
        );
        authority_sign(blinded_message, &self.key)
    }

    /// Access the key pair for persistence
    pub fn key_pair(&self) -> &KeyPair {
        &self.key
    }
}
