//! Big-integer modular arithmetic.
//!
//! All integers are `rsa::BigUint` so keys produced by the `rsa` crate can be used directly.

use crate::*;
use crypto_bigint::modular::runtime_mod::{DynResidue, DynResidueParams};
use crypto_bigint::{Uint, U1024, U2048, U3072, U4096, U512};
use num_bigint_dig::{ModInverse, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::rngs::OsRng;
use rsa::BigUint;

/// Compute `base^exponent mod modulus`.
///
/// Variable time in the exponent. Only use this with public exponents.
pub fn mod_pow(base: &BigUint, exponent: &BigUint, modulus: &BigUint) -> BigUint {
    base.modpow(exponent, modulus)
}

/// Compute `base^exponent mod modulus` in constant time with respect to the exponent.
///
/// Runs in Montgomery form on a fixed-width `crypto_bigint::Uint` sized to the modulus. Every
/// exponent bit up to that width is processed the same way, so the schedule depends only on
/// the modulus size. Used for private exponents. The modulus must be odd, as an RSA modulus is.
pub fn mod_pow_fixed(base: &BigUint, exponent: &BigUint, modulus: &BigUint) -> Result<BigUint, Error> {
    if !modulus.is_odd() || modulus.is_one() {
        return Err(Error::UnsupportedModulus);
    }

    match modulus.bits() {
        0..=512 => pow_residue::<{ U512::LIMBS }>(base, exponent, modulus),
        513..=1024 => pow_residue::<{ U1024::LIMBS }>(base, exponent, modulus),
        1025..=2048 => pow_residue::<{ U2048::LIMBS }>(base, exponent, modulus),
        2049..=3072 => pow_residue::<{ U3072::LIMBS }>(base, exponent, modulus),
        3073..=4096 => pow_residue::<{ U4096::LIMBS }>(base, exponent, modulus),
        _ => Err(Error::UnsupportedModulus),
    }
}

fn pow_residue<const LIMBS: usize>(
    base: &BigUint,
    exponent: &BigUint,
    modulus: &BigUint,
) -> Result<BigUint, Error> {
    let params = DynResidueParams::new(&to_uint::<LIMBS>(modulus)?);
    let base = DynResidue::new(&to_uint::<LIMBS>(&(base % modulus))?, params);
    let result = base.pow(&to_uint::<LIMBS>(exponent)?).retrieve();
    Ok(from_uint(&result))
}

fn to_uint<const LIMBS: usize>(value: &BigUint) -> Result<Uint<LIMBS>, Error> {
    let bytes = value.to_bytes_be();
    if bytes.len() > Uint::<LIMBS>::BYTES {
        return Err(Error::UnsupportedModulus);
    }

    let mut padded = vec![0u8; Uint::<LIMBS>::BYTES - bytes.len()];
    padded.extend_from_slice(&bytes);
    Ok(Uint::from_be_slice(&padded))
}

fn from_uint<const LIMBS: usize>(value: &Uint<LIMBS>) -> BigUint {
    // Words are stored least significant first
    let mut bytes = Vec::with_capacity(Uint::<LIMBS>::BYTES);
    for word in value.as_words().iter().rev() {
        bytes.extend_from_slice(&word.to_be_bytes());
    }
    BigUint::from_bytes_be(&bytes)
}

/// Compute `value^-1 mod modulus`.
///
/// Fails with `NoInverse` if `gcd(value, modulus) != 1`.
pub fn mod_inverse(value: &BigUint, modulus: &BigUint) -> Result<BigUint, Error> {
    if modulus.is_zero() || value.is_zero() {
        return Err(Error::NoInverse);
    }
    value
        .clone()
        .mod_inverse(modulus)
        .and_then(|inverse| inverse.to_biguint())
        .ok_or(Error::NoInverse)
}

/// Draw a uniformly random integer in `[low, high]` (inclusive) from the OS CSPRNG.
pub fn random_in_range(low: &BigUint, high: &BigUint) -> Result<BigUint, Error> {
    if low > high {
        return Err(Error::EmptyRange);
    }
    let mut csprng = OsRng;
    let upper = high + BigUint::one();
    Ok(csprng.gen_biguint_range(low, &upper))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(v: u64) -> BigUint {
        BigUint::from(v)
    }

    #[test]
    fn test_mod_pow() {
        assert_eq!(mod_pow(&big(4), &big(13), &big(497)), big(445));
        assert_eq!(mod_pow(&big(7), &big(0), &big(13)), big(1));
    }

    #[test]
    fn test_mod_pow_fixed_matches_mod_pow() {
        let modulus = big(3233); // 61 * 53
        for base in [0u64, 1, 2, 65, 1000, 3232, 5000].iter() {
            for exp in [0u64, 1, 17, 413, 2753, 3232].iter() {
                assert_eq!(
                    mod_pow_fixed(&big(*base), &big(*exp), &modulus).unwrap(),
                    mod_pow(&big(*base), &big(*exp), &modulus),
                    "base {} exp {}",
                    base,
                    exp
                );
            }
        }
    }

    #[test]
    fn test_mod_pow_fixed_across_widths() {
        // An odd modulus just above each limb width boundary
        for bits in [64usize, 600, 1500, 2100, 4000].iter() {
            let modulus = (BigUint::one() << *bits) + big(13);
            let base = (BigUint::one() << (*bits - 3)) + big(12345);
            let exp = (BigUint::one() << (*bits - 7)) + big(65537);
            assert_eq!(
                mod_pow_fixed(&base, &exp, &modulus).unwrap(),
                mod_pow(&base, &exp, &modulus),
                "{} bits",
                bits
            );
        }
    }

    #[test]
    fn test_mod_pow_fixed_unsupported_modulus() {
        assert!(matches!(
            mod_pow_fixed(&big(5), &big(3), &big(10)),
            Err(Error::UnsupportedModulus)
        ));
        assert!(matches!(
            mod_pow_fixed(&big(5), &big(3), &big(1)),
            Err(Error::UnsupportedModulus)
        ));

        let huge = (BigUint::one() << 5000) + big(1);
        assert!(matches!(
            mod_pow_fixed(&big(5), &big(3), &huge),
            Err(Error::UnsupportedModulus)
        ));

        // Exponent wider than the modulus width
        let wide_exp = BigUint::one() << 600;
        assert!(matches!(
            mod_pow_fixed(&big(5), &wide_exp, &big(3233)),
            Err(Error::UnsupportedModulus)
        ));
    }

    #[test]
    fn test_mod_inverse() {
        let inverse = mod_inverse(&big(17), &big(3120)).unwrap();
        assert_eq!(inverse, big(2753));
        assert_eq!((big(17) * inverse) % big(3120), big(1));

        // Not coprime
        assert!(matches!(mod_inverse(&big(6), &big(9)), Err(Error::NoInverse)));
        assert!(matches!(mod_inverse(&big(0), &big(9)), Err(Error::NoInverse)));
    }

    #[test]
    fn test_random_in_range() {
        let low = big(2);
        let high = big(10);
        for _ in 0..200 {
            let r = random_in_range(&low, &high).unwrap();
            assert!(r >= low && r <= high);
        }

        // A single-element range is fine
        assert_eq!(random_in_range(&big(7), &big(7)).unwrap(), big(7));

        assert!(matches!(
            random_in_range(&big(8), &big(7)),
            Err(Error::EmptyRange)
        ));
    }
}
