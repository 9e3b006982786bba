//! The ballot ledger.
//!
//! Holds every election behind its own `RwLock`. Mutations take the election's write lock for
//! the whole check, mutate and persist sequence, so submissions to one election are applied
//! one at a time. Reads take the read lock and see a consistent snapshot.

use crate::*;
use rsa::BigUint;
use std::collections::HashMap;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex, RwLock};

/// Notifications published by the ledger after a change has been committed
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerEvent {
    ElectionCreated {
        id: ElectionId,
        opens_at: u64,
        closes_at: u64,
    },
    BallotCast {
        election: ElectionId,
        index: BallotIndex,
    },
    EscrowKeyRevealed {
        election: ElectionId,
        index: BallotIndex,
    },
}

/// The ballot ledger
pub struct Ledger<S: Store> {
    store: S,
    clock: Box<dyn Clock>,
    elections: RwLock<HashMap<ElectionId, Arc<RwLock<Election>>>>,
    subscribers: Mutex<Vec<Sender<LedgerEvent>>>,
}

impl<S: Store> Ledger<S> {
    /// Open a ledger over a store, loading every election it holds
    pub fn open(store: S) -> Result<Self, Error> {
        Self::with_clock(store, Box::new(SystemClock))
    }

    /// Open a ledger with a custom time source
    pub fn with_clock(store: S, clock: Box<dyn Clock>) -> Result<Self, Error> {
        let mut elections = HashMap::new();
        for id in store.election_ids()? {
            if let Some(election) = store.get_election(id)? {
                if let Err(e) = election.validate() {
                    log::error!("stored election {} is invalid: {}", id, e);
                    return Err(e.into());
                }
                elections.insert(id, Arc::new(RwLock::new(election)));
            }
        }
        log::debug!("ledger opened with {} elections", elections.len());

        Ok(Ledger {
            store,
            clock,
            elections: RwLock::new(elections),
            subscribers: Mutex::new(vec![]),
        })
    }

    /// Subscribe to ledger events
    pub fn subscribe(&self) -> Result<Receiver<LedgerEvent>, Error> {
        let (sender, receiver) = channel();
        self.subscribers.lock()?.push(sender);
        Ok(receiver)
    }

    fn publish(&self, event: LedgerEvent) {
        match self.subscribers.lock() {
            // Drop subscribers that have hung up
            Ok(mut subscribers) => subscribers.retain(|s| s.send(event.clone()).is_ok()),
            Err(_) => log::error!("subscriber list poisoned, dropping event {:?}", event),
        }
    }

    fn get(&self, id: ElectionId) -> Result<Arc<RwLock<Election>>, Error> {
        self.elections
            .read()?
            .get(&id)
            .cloned()
            .ok_or_else(|| ValidationError::ElectionNotFound(id).into())
    }

    /// Create a new election
    pub fn create_election(&self, config: NewElection) -> Result<ElectionId, Error> {
        let election = Election::new(config)?;
        let id = ElectionId::new();
        let (opens_at, closes_at) = (election.opens_at(), election.closes_at());

        if let Err(e) = self.store.put_election(id, &election) {
            log::error!("failed to persist new election {}: {}", id, e);
            return Err(e);
        }
        self.elections
            .write()?
            .insert(id, Arc::new(RwLock::new(election)));

        log::info!(
            "created election {} open from {} until {}",
            id,
            opens_at,
            closes_at
        );
        self.publish(LedgerEvent::ElectionCreated {
            id,
            opens_at,
            closes_at,
        });
        Ok(id)
    }

    /// Cast a ballot on behalf of `caller`
    pub fn cast_ballot(
        &self,
        election_id: ElectionId,
        caller: VoterId,
        encrypted_content: Vec<u8>,
        message: &BigUint,
        signature: &BigUint,
    ) -> Result<BallotIndex, Error> {
        let election = self.get(election_id)?;
        let mut election = election.write()?;

        let now = self.clock.now();
        let index = election
            .cast_ballot(caller, encrypted_content, message, signature, now)
            .map_err(|e| {
                log::warn!("rejected ballot for election {}: {}", election_id, e);
                e
            })?;

        if let Err(e) = self.store.put_election(election_id, &election) {
            log::error!("failed to persist ballot for election {}: {}", election_id, e);
            election.rollback_cast(signature);
            return Err(e);
        }
        drop(election);

        log::info!("cast ballot {} in election {}", index, election_id);
        self.publish(LedgerEvent::BallotCast {
            election: election_id,
            index,
        });
        Ok(index)
    }

    /// Reveal the escrow key for a ballot owned by `caller`
    pub fn reveal_escrow_key(
        &self,
        election_id: ElectionId,
        caller: VoterId,
        index: BallotIndex,
        key: Vec<u8>,
    ) -> Result<Ballot, Error> {
        let election = self.get(election_id)?;
        let mut election = election.write()?;

        let ballot = election
            .reveal_escrow_key(caller, index, key)
            .map_err(|e| {
                log::warn!(
                    "rejected escrow reveal for ballot {} in election {}: {}",
                    index,
                    election_id,
                    e
                );
                e
            })?;

        if let Err(e) = self.store.put_election(election_id, &election) {
            log::error!("failed to persist escrow key for election {}: {}", election_id, e);
            election.rollback_reveal(index);
            return Err(e);
        }
        drop(election);

        log::info!("revealed escrow key for ballot {} in election {}", index, election_id);
        self.publish(LedgerEvent::EscrowKeyRevealed {
            election: election_id,
            index,
        });
        Ok(ballot)
    }

    /// Verify and apply a signed cast request
    pub fn submit_cast(&self, signed: &Signed<CastBallotRequest>) -> Result<BallotIndex, Error> {
        let (election_id, caller) = signed.authorize()?;
        let request = signed.inner();
        self.cast_ballot(
            election_id,
            caller,
            request.encrypted_content.clone(),
            &request.message,
            &request.signature,
        )
    }

    /// Verify and apply a signed escrow-key reveal
    pub fn submit_reveal(&self, signed: &Signed<RevealKeyRequest>) -> Result<Ballot, Error> {
        let (election_id, caller) = signed.authorize()?;
        let request = signed.inner();
        self.reveal_escrow_key(
            election_id,
            caller,
            request.ballot_index,
            request.key.clone(),
        )
    }

    /// List every known election
    pub fn election_ids(&self) -> Result<Vec<ElectionId>, Error> {
        let mut ids: Vec<ElectionId> = self.elections.read()?.keys().copied().collect();
        ids.sort();
        Ok(ids)
    }

    /// Get a snapshot of an election
    pub fn election(&self, id: ElectionId) -> Result<Election, Error> {
        Ok(self.get(id)?.read()?.clone())
    }

    pub fn candidates(&self, id: ElectionId) -> Result<Vec<Candidate>, Error> {
        Ok(self.get(id)?.read()?.candidates().to_vec())
    }

    pub fn candidate_count(&self, id: ElectionId) -> Result<usize, Error> {
        Ok(self.get(id)?.read()?.candidate_count())
    }

    pub fn ballot_count(&self, id: ElectionId) -> Result<usize, Error> {
        Ok(self.get(id)?.read()?.ballot_count())
    }

    pub fn used_signature_count(&self, id: ElectionId) -> Result<usize, Error> {
        Ok(self.get(id)?.read()?.used_signature_count())
    }

    pub fn ballot(&self, id: ElectionId, index: BallotIndex) -> Result<Ballot, Error> {
        Ok(self.get(id)?.read()?.ballot(index)?.clone())
    }

    /// Get the current state of an election
    pub fn state(&self, id: ElectionId) -> Result<ElectionState, Error> {
        let now = self.clock.now();
        Ok(self.get(id)?.read()?.state(now))
    }
}
