use ed25519_dalek::{SigningKey, VerifyingKey};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::convert::TryFrom;
use std::str::FromStr;

/// Generate a voter signing key and its identity
pub fn generate_keypair() -> (SigningKey, VoterId) {
    let mut csprng = rand::rngs::OsRng;
    let secret = SigningKey::generate(&mut csprng);
    let public = VoterId(secret.verifying_key());
    (secret, public)
}

/// The identity of a caller: the ed25519 key that signed its requests
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct VoterId(pub VerifyingKey);

impl VoterId {
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ed25519_dalek::SignatureError> {
        let key = VerifyingKey::try_from(bytes)?;
        Ok(VoterId(key))
    }
}

impl From<&SigningKey> for VoterId {
    fn from(secret: &SigningKey) -> Self {
        VoterId(secret.verifying_key())
    }
}

impl std::fmt::Display for VoterId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.to_bytes()))
    }
}

impl FromStr for VoterId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| format!("invalid voter id: {}", e))?;
        VoterId::from_bytes(&bytes).map_err(|e| format!("invalid voter id: {}", e))
    }
}

impl Serialize for VoterId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for VoterId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        VoterId::from_str(&s).map_err(de::Error::custom)
    }
}
