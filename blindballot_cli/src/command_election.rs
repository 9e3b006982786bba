use super::Config;
use blindballot::{Clock, NewElection, SystemClock};
use serde_json::json;

pub fn command_election(matches: &clap::ArgMatches, config: &Config) {
    // Subcommands
    if let Some(matches) = matches.subcommand_matches("create") {
        command_election_create(matches, config);
        std::process::exit(0);
    }
    if let Some(matches) = matches.subcommand_matches("show") {
        command_election_show(matches, config);
        std::process::exit(0);
    }
    if matches.subcommand_matches("list").is_some() {
        command_election_list(config);
        std::process::exit(0);
    }
}

fn offset_arg(matches: &clap::ArgMatches, name: &str) -> i64 {
    let raw = matches.value_of(name).unwrap_or("0");
    raw.parse()
        .unwrap_or_else(|e| crate::fail("election", format!("invalid --{} {:?}: {}", name, raw, e)))
}

/// Apply a signed offset to a timestamp, saturating at the ends of the range
fn offset(now: u64, by: i64) -> u64 {
    if by < 0 {
        now.saturating_sub(by.unsigned_abs())
    } else {
        now.saturating_add(by as u64)
    }
}

pub fn command_election_create(matches: &clap::ArgMatches, config: &Config) {
    let authority = crate::load_authority_public("election", config.authority_public.as_deref());

    let now = SystemClock.now();
    let opens_at = offset(now, offset_arg(matches, "opens-in"));
    let closes_at = offset(now, offset_arg(matches, "closes-in"));

    let candidates: Vec<String> = matches
        .values_of("CANDIDATE")
        .map(|values| values.map(str::to_owned).collect())
        .unwrap_or_default();

    let ledger = crate::open_ledger("election", config);
    let election_id = ledger
        .create_election(NewElection {
            multiple_choice: matches.is_present("multiple-choice"),
            opens_at,
            closes_at,
            candidates,
            authority,
        })
        .unwrap_or_else(|e| crate::fail("election", e));

    println!("{}", election_id);
}

pub fn command_election_show(matches: &clap::ArgMatches, config: &Config) {
    let election_id = crate::election_id("election", matches);
    let ledger = crate::open_ledger("election", config);

    let election = ledger
        .election(election_id)
        .unwrap_or_else(|e| crate::fail("election", e));
    let state = ledger
        .state(election_id)
        .unwrap_or_else(|e| crate::fail("election", e));

    let summary = json!({
        "id": election_id,
        "state": format!("{:?}", state),
        "multiple_choice": election.multiple_choice(),
        "opens_at": election.opens_at(),
        "closes_at": election.closes_at(),
        "authority": election.authority(),
        "candidates": election.candidates(),
        "ballot_count": election.ballot_count(),
        "used_signature_count": election.used_signature_count(),
    });
    let summary =
        serde_json::to_string_pretty(&summary).unwrap_or_else(|e| crate::fail("election", e));
    println!("{}", summary);
}

pub fn command_election_list(config: &Config) {
    let ledger = crate::open_ledger("election", config);
    let ids = ledger
        .election_ids()
        .unwrap_or_else(|e| crate::fail("election", e));
    for id in ids {
        println!("{}", id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset() {
        assert_eq!(offset(100, -60), 40);
        assert_eq!(offset(100, 60), 160);
        assert_eq!(offset(10, -60), 0);
        assert_eq!(offset(u64::MAX - 1, 5), u64::MAX);
    }
}
