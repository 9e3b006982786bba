use crate::*;
use rsa::BigUint;

/// A ballot in the middle of being certified
///
/// Holds the encrypted vote, its escrow key, and the blinding state. Only
/// `blinded_message()` leaves the voter before the Authority responds.
pub struct BallotPreparation {
    authority: AuthorityPublicKey,
    encrypted_content: Vec<u8>,
    escrow_key: EscrowKey,
    blinding: BlindingContext,
}

impl BallotPreparation {
    /// Encrypt a vote under a fresh escrow key, encode it, and blind it for the Authority
    pub fn new(vote: &[u8], authority: &AuthorityPublicKey) -> Result<Self, Error> {
        let escrow_key = EscrowKey::generate();
        let encrypted_content = encrypt_vote(&escrow_key, vote)?;
        let message = encode_message(&encrypted_content, &authority.n)?;
        let blinding = blind(&message, authority)?;

        Ok(BallotPreparation {
            authority: authority.clone(),
            encrypted_content,
            escrow_key,
            blinding,
        })
    }

    /// The value to send to the Authority for signing
    pub fn blinded_message(&self) -> &BigUint {
        self.blinding.blinded_message()
    }

    /// Unblind the Authority's signature and check it before anything is submitted
    pub fn finish(self, blind_signature: &BigUint) -> Result<PreparedBallot, Error> {
        let message = self.blinding.message().clone();
        let signature = self.blinding.unblind(blind_signature, &self.authority)?;

        if !verify(&signature, &message, &self.authority) {
            return Err(ValidationError::SignatureInvalid.into());
        }

        Ok(PreparedBallot {
            encrypted_content: self.encrypted_content,
            message,
            signature,
            escrow_key: self.escrow_key,
        })
    }
}

/// A certified ballot, ready to cast
#[derive(Clone, Debug)]
pub struct PreparedBallot {
    pub encrypted_content: Vec<u8>,
    pub message: BigUint,
    pub signature: BigUint,

    /// Keep this until the election closes, then reveal it
    pub escrow_key: EscrowKey,
}

impl PreparedBallot {
    /// Build the cast request for a voter
    pub fn to_request(&self, election: ElectionId, voter: VoterId) -> CastBallotRequest {
        CastBallotRequest {
            election,
            voter,
            encrypted_content: self.encrypted_content.clone(),
            message: self.message.clone(),
            signature: self.signature.clone(),
        }
    }
}
