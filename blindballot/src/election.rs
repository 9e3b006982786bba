use crate::*;
use rsa::BigUint;
use std::collections::BTreeSet;
use std::str::FromStr;
use uuid::Uuid;

/// Election identifier
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ElectionId(pub Uuid);

impl ElectionId {
    /// Create a new random election identifier
    pub fn new() -> Self {
        ElectionId(Uuid::new_v4())
    }
}

impl Default for ElectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ElectionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ElectionId(Uuid::parse_str(s)?))
    }
}

/// Position of a ballot in cast order
pub type BallotIndex = usize;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub id: u32,
    pub name: String,
}

/// A cast ballot
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Ballot {
    pub owner: VoterId,

    #[serde(with = "hex_bytes")]
    pub encrypted_content: Vec<u8>,

    /// Set once, by the owner, after casting
    #[serde(with = "hex_bytes_opt")]
    pub escrow_key: Option<Vec<u8>>,

    /// Unix seconds
    pub cast_at: u64,
}

/// Where an election is in its lifetime, derived from the clock
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ElectionState {
    NotStarted,
    Open,
    Closed,
}

/// Parameters for a new election
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NewElection {
    pub multiple_choice: bool,

    /// Unix seconds, inclusive
    pub opens_at: u64,

    /// Unix seconds, exclusive
    pub closes_at: u64,

    /// Candidate names, in ballot order
    pub candidates: Vec<String>,

    pub authority: AuthorityPublicKey,
}

/// The per-election ledger
///
/// Candidates, the time window and the authority key are fixed at construction. Ballots
/// and used signatures only ever grow.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Election {
    multiple_choice: bool,
    opens_at: u64,
    closes_at: u64,
    authority: AuthorityPublicKey,
    candidates: Vec<Candidate>,

    #[serde(with = "decimal_set")]
    used_signatures: BTreeSet<BigUint>,

    ballots: Vec<Ballot>,
}

impl Election {
    /// Create an election, checking the time window and authority key
    pub fn new(config: NewElection) -> Result<Self, ValidationError> {
        check_parameters(config.opens_at, config.closes_at, &config.authority)?;

        let candidates = config
            .candidates
            .into_iter()
            .enumerate()
            .map(|(id, name)| Candidate {
                id: id as u32,
                name,
            })
            .collect();

        Ok(Election {
            multiple_choice: config.multiple_choice,
            opens_at: config.opens_at,
            closes_at: config.closes_at,
            authority: config.authority,
            candidates,
            used_signatures: BTreeSet::new(),
            ballots: vec![],
        })
    }

    /// Re-check the construction invariants, for elections loaded from storage
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_parameters(self.opens_at, self.closes_at, &self.authority)
    }

    pub fn multiple_choice(&self) -> bool {
        self.multiple_choice
    }

    pub fn opens_at(&self) -> u64 {
        self.opens_at
    }

    pub fn closes_at(&self) -> u64 {
        self.closes_at
    }

    pub fn authority(&self) -> &AuthorityPublicKey {
        &self.authority
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    pub fn ballot_count(&self) -> usize {
        self.ballots.len()
    }

    pub fn used_signature_count(&self) -> usize {
        self.used_signatures.len()
    }

    pub fn is_signature_used(&self, signature: &BigUint) -> bool {
        self.used_signatures.contains(signature)
    }

    pub fn ballots(&self) -> &[Ballot] {
        &self.ballots
    }

    pub fn ballot(&self, index: BallotIndex) -> Result<&Ballot, ValidationError> {
        self.ballots
            .get(index)
            .ok_or(ValidationError::IndexOutOfRange(index))
    }

    /// Get the state of the election at the given time
    pub fn state(&self, now: u64) -> ElectionState {
        if now < self.opens_at {
            ElectionState::NotStarted
        } else if now < self.closes_at {
            ElectionState::Open
        } else {
            ElectionState::Closed
        }
    }

    /// Cast a ballot
    ///
    /// Checks run in order: signature validity, replay, time window. The first failure is
    /// reported and nothing is changed.
    pub fn cast_ballot(
        &mut self,
        caller: VoterId,
        encrypted_content: Vec<u8>,
        message: &BigUint,
        signature: &BigUint,
        now: u64,
    ) -> Result<BallotIndex, ValidationError> {
        if !verify(signature, message, &self.authority) {
            return Err(ValidationError::SignatureInvalid);
        }
        if self.is_signature_used(signature) {
            return Err(ValidationError::SignatureReplayed);
        }
        match self.state(now) {
            ElectionState::NotStarted => return Err(ValidationError::NotStarted),
            ElectionState::Closed => return Err(ValidationError::Closed),
            ElectionState::Open => {}
        }

        self.ballots.push(Ballot {
            owner: caller,
            encrypted_content,
            escrow_key: None,
            cast_at: now,
        });
        self.used_signatures.insert(signature.clone());

        Ok(self.ballots.len() - 1)
    }

    /// Reveal the escrow key for a ballot, once, as its owner
    pub fn reveal_escrow_key(
        &mut self,
        caller: VoterId,
        index: BallotIndex,
        key: Vec<u8>,
    ) -> Result<Ballot, ValidationError> {
        let ballot = self
            .ballots
            .get_mut(index)
            .ok_or(ValidationError::IndexOutOfRange(index))?;

        if ballot.owner != caller {
            return Err(ValidationError::NotOwner);
        }
        if matches!(&ballot.escrow_key, Some(stored) if !stored.is_empty()) {
            return Err(ValidationError::EscrowKeyAlreadySet);
        }
        // Checked before mutating, so an empty reveal leaves the ballot untouched
        if key.is_empty() {
            return Err(ValidationError::EmptyEscrowKey);
        }

        ballot.escrow_key = Some(key);
        Ok(ballot.clone())
    }

    /// Undo the most recent successful `cast_ballot`.
    ///
    /// Only the ledger calls this, while still holding the write lock, when persisting fails.
    pub(crate) fn rollback_cast(&mut self, signature: &BigUint) {
        self.ballots.pop();
        self.used_signatures.remove(signature);
    }

    /// Undo a successful `reveal_escrow_key` under the same conditions as `rollback_cast`
    pub(crate) fn rollback_reveal(&mut self, index: BallotIndex) {
        if let Some(ballot) = self.ballots.get_mut(index) {
            ballot.escrow_key = None;
        }
    }
}

fn check_parameters(
    opens_at: u64,
    closes_at: u64,
    authority: &AuthorityPublicKey,
) -> Result<(), ValidationError> {
    if opens_at >= closes_at {
        return Err(ValidationError::InvalidWindow);
    }
    if !authority.is_well_formed() {
        return Err(ValidationError::InvalidPublicKey);
    }
    Ok(())
}
