use super::Config;
use blindballot::{parse_decimal, Authority};

pub fn command_authority(matches: &clap::ArgMatches, config: &Config) {
    // Subcommands
    if matches.subcommand_matches("public").is_some() {
        command_authority_public(config);
        std::process::exit(0);
    }
    if let Some(matches) = matches.subcommand_matches("sign") {
        command_authority_sign(matches, config);
        std::process::exit(0);
    }
}

fn load_authority(config: &Config) -> Authority {
    Authority::from_key_pair(crate::load_authority_key(
        "authority",
        config.authority_key.as_deref(),
    ))
}

pub fn command_authority_public(config: &Config) {
    let public = load_authority(config).public_key();
    let public =
        serde_json::to_string_pretty(&public).unwrap_or_else(|e| crate::fail("authority", e));
    println!("{}", public);
}

/// Sign a blinded message. The Authority never learns the ballot or who cast it.
pub fn command_authority_sign(matches: &clap::ArgMatches, config: &Config) {
    let raw = matches.value_of("BLINDED").unwrap_or_default();
    let blinded = parse_decimal(raw.trim())
        .unwrap_or_else(|e| crate::fail("authority", format!("invalid blinded message: {}", e)));

    let signature = load_authority(config)
        .sign(&blinded)
        .unwrap_or_else(|e| crate::fail("authority", e));
    println!("{}", signature);
}
