use super::Config;
use blindballot::{parse_decimal, BallotPreparation, BigUint, Signed, VoterId};
use serde_json::json;
use std::io::BufRead;

pub fn command_vote(matches: &clap::ArgMatches, config: &Config) {
    let election_id = crate::election_id("vote", matches);
    let choice = matches.value_of("CHOICE").unwrap_or_default();
    let secret_key = crate::voter_key("vote", config);
    let voter = VoterId::from(secret_key);

    let ledger = crate::open_ledger("vote", config);
    let election = ledger
        .election(election_id)
        .unwrap_or_else(|e| crate::fail("vote", e));

    let prep = BallotPreparation::new(choice.as_bytes(), election.authority())
        .unwrap_or_else(|e| crate::fail("vote", e));

    // The blinding factor only lives in this process, so the signature is read back here
    println!("blinded-message: {}", prep.blinded_message());
    eprintln!("Run `blindballot authority sign <blinded-message>` and paste the result:");
    let blind_signature = read_blind_signature(&mut std::io::stdin().lock());

    let ballot = prep
        .finish(&blind_signature)
        .unwrap_or_else(|e| crate::fail("vote", e));

    // Sign and submit the cast request
    let request = Signed::sign(secret_key, ballot.to_request(election_id, voter))
        .unwrap_or_else(|e| crate::fail("vote", e));
    let index = ledger
        .submit_cast(&request)
        .unwrap_or_else(|e| crate::fail("vote", e));

    let receipt = json!({
        "election": election_id,
        "ballot_index": index,
        "escrow_key": hex::encode(ballot.escrow_key.as_bytes()),
    });
    println!("{}", receipt);
}

fn read_blind_signature<R: BufRead>(input: &mut R) -> BigUint {
    let mut line = String::new();
    input
        .read_line(&mut line)
        .unwrap_or_else(|e| crate::fail("vote", format!("unable to read blind signature: {}", e)));
    parse_decimal(line.trim())
        .unwrap_or_else(|e| crate::fail("vote", format!("invalid blind signature: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_blind_signature() {
        let mut input = "  123456789012345678901234567890\n".as_bytes();
        assert_eq!(
            read_blind_signature(&mut input),
            parse_decimal("123456789012345678901234567890").unwrap()
        );
    }
}
