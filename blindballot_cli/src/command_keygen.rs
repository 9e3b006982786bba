use blindballot::KeyPair;

pub fn command_keygen(matches: &clap::ArgMatches) {
    if let Some(matches) = matches.subcommand_matches("authority") {
        command_keygen_authority(matches);
        std::process::exit(0);
    }
    if matches.subcommand_matches("voter").is_some() {
        command_keygen_voter();
        std::process::exit(0);
    }
}

pub fn command_keygen_authority(matches: &clap::ArgMatches) {
    let bits: usize = matches
        .value_of("bits")
        .unwrap_or("2048")
        .parse()
        .unwrap_or_else(|e| crate::fail("keygen", format!("invalid --bits: {}", e)));

    let key = KeyPair::generate(bits).unwrap_or_else(|e| crate::fail("keygen", e));
    let serialized =
        serde_json::to_string_pretty(&key).unwrap_or_else(|e| crate::fail("keygen", e));

    match matches.value_of("out") {
        Some(out) => {
            let out = crate::expand(out);
            std::fs::write(&out, serialized).unwrap_or_else(|e| {
                crate::fail("keygen", format!("unable to write {}: {}", out, e))
            });
            let public = key.public_key();
            if let Some(public_out) = matches.value_of("public-out") {
                let public_out = crate::expand(public_out);
                let serialized = serde_json::to_string_pretty(&public)
                    .unwrap_or_else(|e| crate::fail("keygen", e));
                std::fs::write(&public_out, serialized).unwrap_or_else(|e| {
                    crate::fail("keygen", format!("unable to write {}: {}", public_out, e))
                });
                println!("wrote authority public key to {}", public_out);
            }
            println!("wrote authority key to {}", out);
            println!("modulus: {}", public.n);
            println!("exponent: {}", public.e);
        }
        None => println!("{}", serialized),
    }
}

pub fn command_keygen_voter() {
    let (secret, public) = blindballot::generate_keypair();

    println!("secret-key: {}", hex::encode(secret.to_bytes()));
    println!("voter-id: {}", public);
}
