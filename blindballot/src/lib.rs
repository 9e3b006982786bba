#[macro_use]
extern crate serde;

mod arith;
mod authority;
mod blinding;
mod clock;
mod election;
mod error;
mod escrow;
mod ledger;
mod request;
mod serde_decimal;
mod serde_hex;
mod store;
mod util;
mod voter;

pub use arith::*;
pub use authority::*;
pub use blinding::*;
pub use clock::*;
pub use election::*;
pub use error::*;
pub use escrow::*;
pub use ledger::*;
pub use request::*;
pub use serde_decimal::*;
pub use serde_hex::*;
pub use store::*;
pub use util::*;
pub use voter::*;

pub use rsa::BigUint;

#[cfg(test)]
mod tests;
