use super::Config;

pub fn command_ballot(matches: &clap::ArgMatches, config: &Config) {
    let election_id = crate::election_id("ballot", matches);
    let index = crate::ballot_index("ballot", matches);

    let ledger = crate::open_ledger("ballot", config);
    let ballot = ledger
        .ballot(election_id, index)
        .unwrap_or_else(|e| crate::fail("ballot", e));

    let ballot = serde_json::to_string_pretty(&ballot).unwrap_or_else(|e| crate::fail("ballot", e));
    println!("{}", ballot);
}
