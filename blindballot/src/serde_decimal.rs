//! Serialize big integers as decimal strings.
//!
//! Use with `#[serde(with = "decimal")]` or `#[serde(with = "decimal_set")]`.

use rsa::BigUint;
use serde::{de, Deserialize, Deserializer, Serializer};
use std::str::FromStr;

pub fn parse_decimal(s: &str) -> Result<BigUint, String> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("invalid decimal integer: {:?}", s));
    }
    BigUint::from_str(s).map_err(|e| format!("invalid decimal integer: {}", e))
}

pub mod decimal {
    use super::*;

    pub fn serialize<S>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BigUint, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_decimal(&s).map_err(de::Error::custom)
    }
}

pub mod decimal_set {
    use super::*;
    use serde::ser::SerializeSeq;
    use std::collections::BTreeSet;

    pub fn serialize<S>(values: &BTreeSet<BigUint>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for value in values {
            seq.serialize_element(&value.to_string())?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeSet<BigUint>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let strings = Vec::<String>::deserialize(deserializer)?;
        let mut set = BTreeSet::new();
        for s in strings {
            let value = parse_decimal(&s).map_err(de::Error::custom)?;
            if !set.insert(value) {
                return Err(de::Error::custom("duplicate entry in signature set"));
            }
        }
        Ok(set)
    }
}
