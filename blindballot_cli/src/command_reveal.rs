use super::Config;
use blindballot::{RevealKeyRequest, Signed, VoterId};

pub fn command_reveal(matches: &clap::ArgMatches, config: &Config) {
    let election_id = crate::election_id("reveal", matches);
    let ballot_index = crate::ballot_index("reveal", matches);
    let key = matches.value_of("KEY").unwrap_or_default();
    let key = hex::decode(key)
        .unwrap_or_else(|e| crate::fail("reveal", format!("invalid escrow key: {}", e)));

    let secret_key = crate::voter_key("reveal", config);
    let request = RevealKeyRequest {
        election: election_id,
        voter: VoterId::from(secret_key),
        ballot_index,
        key,
    };
    let request = Signed::sign(secret_key, request).unwrap_or_else(|e| crate::fail("reveal", e));

    let ledger = crate::open_ledger("reveal", config);
    let ballot = ledger
        .submit_reveal(&request)
        .unwrap_or_else(|e| crate::fail("reveal", e));

    let ballot = serde_json::to_string_pretty(&ballot).unwrap_or_else(|e| crate::fail("reveal", e));
    println!("{}", ballot);
}
