use ed25519_dalek::SigningKey;
use std::convert::TryInto;
use std::env::var;
use std::path::PathBuf;

pub struct Config {
    pub data_dir: PathBuf,
    pub authority_key: Option<PathBuf>,
    pub authority_public: Option<PathBuf>,
    pub voter_key: Option<SigningKey>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let data_dir = match var("BLINDBALLOT_DATA_DIR") {
            Ok(val) => PathBuf::from(crate::expand(&val)),
            Err(_e) => PathBuf::from("./blindballot-data"),
        };

        let authority_key = var("BLINDBALLOT_AUTHORITY_KEY")
            .ok()
            .map(|val| PathBuf::from(crate::expand(&val)));

        let authority_public = var("BLINDBALLOT_AUTHORITY_PUBLIC")
            .ok()
            .map(|val| PathBuf::from(crate::expand(&val)));

        let voter_key = match var("BLINDBALLOT_VOTER_KEY") {
            Ok(val) => Some(
                parse_voter_key(&val)
                    .map_err(|e| format!("BLINDBALLOT_VOTER_KEY: {}", e))?,
            ),
            Err(_e) => None,
        };

        Ok(Config {
            data_dir,
            authority_key,
            authority_public,
            voter_key,
        })
    }
}

/// Parse a hex-encoded ed25519 secret key
pub fn parse_voter_key(s: &str) -> Result<SigningKey, String> {
    let bytes = hex::decode(s.trim()).map_err(|e| format!("invalid hex: {}", e))?;
    let bytes: [u8; 32] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| "secret key must be 32 bytes".to_string())?;
    Ok(SigningKey::from_bytes(&bytes))
}
