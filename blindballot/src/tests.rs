use super::*;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn end_to_end_election() {
    init_logging();

    let now = SystemClock.now();

    // Create the election authority and publish its key
    let authority = Authority::generate(1024).unwrap();
    let authority_public = authority.public_key();

    // Create an election with two candidates, open for the next day
    let ledger = Ledger::with_clock(MemStore::default(), Box::new(FixedClock::new(now))).unwrap();
    let events = ledger.subscribe().unwrap();
    let election_id = ledger
        .create_election(NewElection {
            multiple_choice: false,
            opens_at: now - 60,
            closes_at: now + 84600,
            candidates: vec!["Barak Obama".to_string(), "Mitt Romney".to_string()],
            authority: authority_public.clone(),
        })
        .unwrap();
    assert!(matches!(
        events.try_recv().unwrap(),
        LedgerEvent::ElectionCreated { id, .. } if id == election_id
    ));

    // The voter prepares a ballot for choice 0 and gets it blind-signed
    let (voter_secret, voter) = generate_keypair();
    let choice = 0u32.to_be_bytes();
    let prep = BallotPreparation::new(&choice, &authority_public).unwrap();
    let blind_signature = authority.sign(prep.blinded_message()).unwrap();
    let ballot = prep.finish(&blind_signature).unwrap();

    // Cast it as a signed request
    let cast = Signed::sign(&voter_secret, ballot.to_request(election_id, voter)).unwrap();
    let index = ledger.submit_cast(&cast).unwrap();
    assert_eq!(index, 0);
    assert_eq!(ledger.ballot_count(election_id).unwrap(), 1);
    assert_eq!(ledger.used_signature_count(election_id).unwrap(), 1);
    assert_eq!(ledger.candidate_count(election_id).unwrap(), 2);

    // Reveal the escrow key and open the ballot
    let reveal = Signed::sign(
        &voter_secret,
        RevealKeyRequest {
            election: election_id,
            voter,
            ballot_index: index,
            key: ballot.escrow_key.to_vec(),
        },
    )
    .unwrap();
    let revealed = ledger.submit_reveal(&reveal).unwrap();
    assert_eq!(revealed.owner, voter);
    let key = revealed.escrow_key.clone().unwrap();
    let decrypted = decrypt_vote(&key, &revealed.encrypted_content).unwrap();
    assert_eq!(decrypted, choice.to_vec());

    // Re-submitting the same signature with different content is a replay
    let mut replay = ballot.to_request(election_id, voter);
    replay.encrypted_content = encrypt_vote(&EscrowKey::generate(), &1u32.to_be_bytes()).unwrap();
    let replay = Signed::sign(&voter_secret, replay).unwrap();
    assert!(matches!(
        ledger.submit_cast(&replay),
        Err(Error::Validation(ValidationError::SignatureReplayed))
    ));

    // Revealing twice fails
    assert!(matches!(
        ledger.submit_reveal(&reveal),
        Err(Error::Validation(ValidationError::EscrowKeyAlreadySet))
    ));

    // Nothing changed after the rejected calls
    assert_eq!(ledger.ballot_count(election_id).unwrap(), 1);
    assert_eq!(ledger.used_signature_count(election_id).unwrap(), 1);
    assert_eq!(ledger.ballot(election_id, 0).unwrap(), revealed);

    let events: Vec<LedgerEvent> = events.try_iter().collect();
    assert_eq!(
        events,
        vec![
            LedgerEvent::BallotCast {
                election: election_id,
                index: 0
            },
            LedgerEvent::EscrowKeyRevealed {
                election: election_id,
                index: 0
            },
        ]
    );
}

#[test]
fn signed_requests_bind_the_caller() {
    init_logging();

    let now = 10_000;
    let authority = Authority::generate(512).unwrap();
    let ledger = Ledger::with_clock(MemStore::default(), Box::new(FixedClock::new(now))).unwrap();
    let election_id = ledger
        .create_election(NewElection {
            multiple_choice: true,
            opens_at: now,
            closes_at: now + 1,
            candidates: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            authority: authority.public_key(),
        })
        .unwrap();

    let (owner_secret, owner) = generate_keypair();
    let (thief_secret, thief) = generate_keypair();

    let prep = BallotPreparation::new(b"a,c", &authority.public_key()).unwrap();
    let blind_signature = authority.sign(prep.blinded_message()).unwrap();
    let ballot = prep.finish(&blind_signature).unwrap();

    // A request whose signature does not match its content is rejected before the ledger
    let mut forged = Signed::sign(&owner_secret, ballot.to_request(election_id, owner)).unwrap();
    forged.request.voter = thief;
    assert!(matches!(ledger.submit_cast(&forged), Err(Error::Signature(_))));
    assert_eq!(ledger.used_signature_count(election_id).unwrap(), 0);

    let cast = Signed::sign(&owner_secret, ballot.to_request(election_id, owner)).unwrap();
    let index = ledger.submit_cast(&cast).unwrap();

    // The thief cannot reveal the owner's ballot even with the right key
    let steal = Signed::sign(
        &thief_secret,
        RevealKeyRequest {
            election: election_id,
            voter: thief,
            ballot_index: index,
            key: ballot.escrow_key.to_vec(),
        },
    )
    .unwrap();
    assert!(matches!(
        ledger.submit_reveal(&steal),
        Err(Error::Validation(ValidationError::NotOwner))
    ));
    assert!(ledger.ballot(election_id, index).unwrap().escrow_key.is_none());

    // Out of range index
    let missing = Signed::sign(
        &owner_secret,
        RevealKeyRequest {
            election: election_id,
            voter: owner,
            ballot_index: 5,
            key: ballot.escrow_key.to_vec(),
        },
    )
    .unwrap();
    assert!(matches!(
        ledger.submit_reveal(&missing),
        Err(Error::Validation(ValidationError::IndexOutOfRange(5)))
    ));
}
