use crate::*;
use ed25519_dalek::{Signature, Signer, SigningKey};
use rsa::BigUint;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::convert::TryFrom;
use std::ops::Deref;

/// Request 1: cast a ballot
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CastBallotRequest {
    pub election: ElectionId,

    /// The caller, who will own the ballot
    pub voter: VoterId,

    #[serde(with = "hex_bytes")]
    pub encrypted_content: Vec<u8>,

    /// Message integer the signature certifies
    #[serde(with = "decimal")]
    pub message: BigUint,

    /// Unblinded Authority signature over `message`
    #[serde(with = "decimal")]
    pub signature: BigUint,
}

/// Request 2: reveal the escrow key for a ballot
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RevealKeyRequest {
    pub election: ElectionId,
    pub voter: VoterId,
    pub ballot_index: BallotIndex,

    #[serde(with = "hex_bytes")]
    pub key: Vec<u8>,
}

/// This trait should be considered sealed and should not be implemented outside this crate
#[doc(hidden)]
pub trait Signable: Serialize {
    fn election(&self) -> ElectionId;
    fn public(&self) -> VoterId;

    fn as_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(serde_cbor::to_vec(&self)?)
    }
}

impl Signable for CastBallotRequest {
    fn election(&self) -> ElectionId {
        self.election
    }

    fn public(&self) -> VoterId {
        self.voter
    }
}

impl Signable for RevealKeyRequest {
    fn election(&self) -> ElectionId {
        self.election
    }

    fn public(&self) -> VoterId {
        self.voter
    }
}

/// A request signed by the voter it names
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Signed<T: Signable> {
    pub request: T,

    #[serde(serialize_with = "serialize_sig", deserialize_with = "deserialize_sig")]
    pub sig: Signature,
}

impl<T: Signable> Signed<T> {
    /// Sign a request, producing a Signed<T>
    pub fn sign(secret: &SigningKey, request: T) -> Result<Self, Error> {
        if VoterId::from(secret) != request.public() {
            return Err(Error::MismatchedPublicKeys);
        }

        let serialized = request.as_bytes()?;
        let signature = secret.sign(&serialized);

        Ok(Signed {
            request,
            sig: signature,
        })
    }

    /// Verify the signature against the voter named in the request
    pub fn verify_signature(&self) -> Result<(), Error> {
        let serialized = self.request.as_bytes()?;
        self.request.public().0.verify_strict(&serialized, &self.sig)?;
        Ok(())
    }

    /// Verify the signature and get the election and caller it authorizes
    pub fn authorize(&self) -> Result<(ElectionId, VoterId), Error> {
        self.verify_signature()?;
        Ok((self.request.election(), self.request.public()))
    }

    /// Get the inner unsigned request
    pub fn inner(&self) -> &T {
        &self.request
    }
}

impl<T: Signable> Deref for Signed<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.request
    }
}

fn serialize_sig<S>(sig: &Signature, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&hex::encode(sig.to_bytes()))
}

fn deserialize_sig<'de, D>(deserializer: D) -> Result<Signature, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let bytes = hex::decode(&s).map_err(de::Error::custom)?;
    Signature::try_from(&bytes[..]).map_err(de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reveal_request(voter: VoterId) -> RevealKeyRequest {
        RevealKeyRequest {
            election: ElectionId::new(),
            voter,
            ballot_index: 3,
            key: vec![1, 2, 3],
        }
    }

    #[test]
    fn test_sign_and_verify() {
        let (secret, voter) = generate_keypair();
        let signed = Signed::sign(&secret, reveal_request(voter)).unwrap();
        signed.verify_signature().unwrap();
        assert_eq!(signed.ballot_index, 3);

        // Serialization keeps the signature valid
        let json = serde_json::to_string(&signed).unwrap();
        let back: Signed<RevealKeyRequest> = serde_json::from_str(&json).unwrap();
        back.verify_signature().unwrap();
        assert_eq!(back.inner(), signed.inner());

        let (election, caller) = back.authorize().unwrap();
        assert_eq!(election, signed.request.election);
        assert_eq!(caller, voter);
    }

    #[test]
    fn test_signing_with_wrong_key_fails() {
        let (_, voter) = generate_keypair();
        let (other_secret, _) = generate_keypair();
        assert!(Signed::sign(&other_secret, reveal_request(voter)).is_err());
    }

    #[test]
    fn test_tampered_request_fails() {
        let (secret, voter) = generate_keypair();
        let mut signed = Signed::sign(&secret, reveal_request(voter)).unwrap();
        signed.request.key = vec![9, 9, 9];
        assert!(matches!(signed.verify_signature(), Err(Error::Signature(_))));
        assert!(matches!(signed.authorize(), Err(Error::Signature(_))));

        // Swapping in another voter does not carry the signature over
        let (_, other) = generate_keypair();
        let mut signed = Signed::sign(&secret, reveal_request(voter)).unwrap();
        signed.request.voter = other;
        assert!(signed.verify_signature().is_err());
    }

    #[test]
    fn test_cast_request_json_shape() {
        let (secret, voter) = generate_keypair();
        let request = CastBallotRequest {
            election: ElectionId::new(),
            voter,
            encrypted_content: vec![0xab, 0xcd],
            message: BigUint::from(123456789u64),
            signature: BigUint::from(987654321u64),
        };
        let signed = Signed::sign(&secret, request).unwrap();
        let json = serde_json::to_value(&signed).unwrap();

        assert_eq!(json["request"]["encrypted_content"], "abcd");
        assert_eq!(json["request"]["message"], "123456789");
        assert_eq!(json["request"]["signature"], "987654321");
        assert_eq!(json["request"]["voter"], voter.to_string());
    }
}
