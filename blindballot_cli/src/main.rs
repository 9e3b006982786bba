use blindballot::{AuthorityPublicKey, FileStore, KeyPair, Ledger};
use clap::{App, AppSettings, Arg, SubCommand};
use ed25519_dalek::SigningKey;
use log::LevelFilter;
use std::path::Path;

mod command_authority;
mod command_ballot;
mod command_election;
mod command_keygen;
mod command_reveal;
mod command_vote;
mod config;

use config::Config;

fn main() {
    let matches = App::new("BlindBallot CLI")
        .version("0.1")
        .author("Patrick Hayes <patrick.d.hayes@gmail.com>")
        .about("Runs blind-signature elections against a local ledger")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("data-dir")
                .long("data-dir")
                .takes_value(true)
                .help("Ledger directory - can also be set with BLINDBALLOT_DATA_DIR"),
        )
        .arg(
            Arg::with_name("authority-key")
                .long("authority-key")
                .takes_value(true)
                .help("Authority key file - can also be set with BLINDBALLOT_AUTHORITY_KEY"),
        )
        .arg(
            Arg::with_name("authority-public")
                .long("authority-public")
                .takes_value(true)
                .help("Authority public key file - can also be set with BLINDBALLOT_AUTHORITY_PUBLIC"),
        )
        .arg(
            Arg::with_name("voter-key")
                .long("voter-key")
                .takes_value(true)
                .help("Hex voter secret key - can also be set with BLINDBALLOT_VOTER_KEY"),
        )
        .arg(
            Arg::with_name("v")
                .short("v")
                .multiple(true)
                .help("Sets the level of verbosity"),
        )
        .subcommand(
            SubCommand::with_name("keygen")
                .about("Generate keys")
                .setting(AppSettings::SubcommandRequiredElseHelp)
                .subcommand(
                    SubCommand::with_name("authority")
                        .about("Generate an authority RSA key pair")
                        .arg(
                            Arg::with_name("bits")
                                .long("bits")
                                .takes_value(true)
                                .default_value("2048")
                                .help("Modulus size in bits"),
                        )
                        .arg(
                            Arg::with_name("out")
                                .long("out")
                                .takes_value(true)
                                .help("Write the key pair to this file instead of stdout"),
                        )
                        .arg(
                            Arg::with_name("public-out")
                                .long("public-out")
                                .takes_value(true)
                                .help("Also write the public key to this file"),
                        ),
                )
                .subcommand(
                    SubCommand::with_name("voter").about("Generate a voter signing key"),
                ),
        )
        .subcommand(
            SubCommand::with_name("authority")
                .about("Authority operations - the only commands that read the private key")
                .setting(AppSettings::SubcommandRequiredElseHelp)
                .subcommand(
                    SubCommand::with_name("public").about("Print the authority public key"),
                )
                .subcommand(
                    SubCommand::with_name("sign")
                        .about("Sign a blinded message")
                        .arg(
                            Arg::with_name("BLINDED")
                                .index(1)
                                .required(true)
                                .help("Blinded message, in decimal"),
                        ),
                ),
        )
        .subcommand(
            SubCommand::with_name("election")
                .about("Create and inspect elections")
                .setting(AppSettings::SubcommandRequiredElseHelp)
                .subcommand(
                    SubCommand::with_name("create")
                        .about("Create an election for the configured authority public key")
                        .arg(
                            Arg::with_name("opens-in")
                                .long("opens-in")
                                .takes_value(true)
                                .default_value("0")
                                .allow_hyphen_values(true)
                                .help("Seconds from now until voting opens (may be negative)"),
                        )
                        .arg(
                            Arg::with_name("closes-in")
                                .long("closes-in")
                                .takes_value(true)
                                .default_value("86400")
                                .help("Seconds from now until voting closes"),
                        )
                        .arg(
                            Arg::with_name("multiple-choice")
                                .long("multiple-choice")
                                .help("Allow voters to select more than one candidate"),
                        )
                        .arg(
                            Arg::with_name("CANDIDATE")
                                .index(1)
                                .multiple(true)
                                .required(true)
                                .help("Candidate names, in ballot order"),
                        ),
                )
                .subcommand(
                    SubCommand::with_name("show")
                        .about("Show an election")
                        .arg(Arg::with_name("ELECTION-ID").index(1).required(true)),
                )
                .subcommand(SubCommand::with_name("list").about("List elections")),
        )
        .subcommand(
            SubCommand::with_name("vote")
                .about("Prepare a ballot, have the authority sign it blind, and cast it")
                .arg(Arg::with_name("ELECTION-ID").index(1).required(true))
                .arg(
                    Arg::with_name("CHOICE")
                        .index(2)
                        .required(true)
                        .help("Ballot content, encrypted before it leaves this machine"),
                ),
        )
        .subcommand(
            SubCommand::with_name("reveal")
                .about("Reveal the escrow key for a ballot you cast")
                .arg(Arg::with_name("ELECTION-ID").index(1).required(true))
                .arg(Arg::with_name("INDEX").index(2).required(true))
                .arg(Arg::with_name("KEY").index(3).required(true).help("Hex escrow key")),
        )
        .subcommand(
            SubCommand::with_name("ballot")
                .about("Show a ballot")
                .arg(Arg::with_name("ELECTION-ID").index(1).required(true))
                .arg(Arg::with_name("INDEX").index(2).required(true)),
        )
        .get_matches();

    let level = match matches.occurrences_of("v") {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let mut config = Config::from_env().unwrap_or_else(|e| {
        eprintln!("blindballot: {}", e);
        std::process::exit(1);
    });
    if let Some(dir) = matches.value_of("data-dir") {
        config.data_dir = expand(dir).into();
    }
    if let Some(path) = matches.value_of("authority-key") {
        config.authority_key = Some(expand(path).into());
    }
    if let Some(path) = matches.value_of("authority-public") {
        config.authority_public = Some(expand(path).into());
    }
    if let Some(key) = matches.value_of("voter-key") {
        config.voter_key = Some(config::parse_voter_key(key).unwrap_or_else(|e| {
            eprintln!("blindballot: --voter-key: {}", e);
            std::process::exit(1);
        }));
    }
    log::info!("data directory: {}", config.data_dir.display());

    // Subcommands
    if let Some(matches) = matches.subcommand_matches("keygen") {
        command_keygen::command_keygen(matches);
    }
    if let Some(matches) = matches.subcommand_matches("authority") {
        command_authority::command_authority(matches, &config);
    }
    if let Some(matches) = matches.subcommand_matches("election") {
        command_election::command_election(matches, &config);
    }
    if let Some(matches) = matches.subcommand_matches("vote") {
        command_vote::command_vote(matches, &config);
    }
    if let Some(matches) = matches.subcommand_matches("reveal") {
        command_reveal::command_reveal(matches, &config);
    }
    if let Some(matches) = matches.subcommand_matches("ballot") {
        command_ballot::command_ballot(matches, &config);
    }
}

/// Expand a leading `~` in a path-like argument
pub fn expand(input: &str) -> String {
    shellexpand::tilde(input).into_owned()
}

/// Print an error for a command and exit
pub fn fail<E: std::fmt::Display>(command: &str, err: E) -> ! {
    eprintln!("blindballot {}: {}", command, err);
    std::process::exit(1);
}

/// Open the ledger in the configured data directory
pub fn open_ledger(command: &str, config: &Config) -> Ledger<FileStore> {
    let store = FileStore::open(&config.data_dir).unwrap_or_else(|e| fail(command, e));
    Ledger::open(store).unwrap_or_else(|e| fail(command, e))
}

/// Load the authority key pair from a JSON file
pub fn load_authority_key(command: &str, path: Option<&Path>) -> KeyPair {
    let path = path.unwrap_or_else(|| {
        fail(
            command,
            "provide an authority key via --authority-key or BLINDBALLOT_AUTHORITY_KEY",
        )
    });
    let contents = std::fs::read(path)
        .unwrap_or_else(|e| fail(command, format!("unable to read {}: {}", path.display(), e)));
    serde_json::from_slice(&contents)
        .unwrap_or_else(|e| fail(command, format!("invalid key file {}: {}", path.display(), e)))
}

/// Load the authority public key from a JSON file
pub fn load_authority_public(command: &str, path: Option<&Path>) -> AuthorityPublicKey {
    let path = path.unwrap_or_else(|| {
        fail(
            command,
            "provide an authority public key via --authority-public or BLINDBALLOT_AUTHORITY_PUBLIC",
        )
    });
    let contents = std::fs::read(path)
        .unwrap_or_else(|e| fail(command, format!("unable to read {}: {}", path.display(), e)));
    serde_json::from_slice(&contents)
        .unwrap_or_else(|e| fail(command, format!("invalid public key file {}: {}", path.display(), e)))
}

/// Get the configured voter key
pub fn voter_key<'a>(command: &str, config: &'a Config) -> &'a SigningKey {
    config.voter_key.as_ref().unwrap_or_else(|| {
        fail(
            command,
            "provide a voter key via --voter-key or BLINDBALLOT_VOTER_KEY",
        )
    })
}

/// Parse an election id argument
pub fn election_id(command: &str, matches: &clap::ArgMatches) -> blindballot::ElectionId {
    let raw = matches.value_of("ELECTION-ID").unwrap_or_default();
    raw.parse()
        .unwrap_or_else(|e| fail(command, format!("invalid election id {:?}: {}", raw, e)))
}

/// Parse a ballot index argument
pub fn ballot_index(command: &str, matches: &clap::ArgMatches) -> usize {
    let raw = matches.value_of("INDEX").unwrap_or_default();
    raw.parse()
        .unwrap_or_else(|e| fail(command, format!("invalid ballot index {:?}: {}", raw, e)))
}
