// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! RSA Keypair Generation
//!
//! Generates the ephemeral keypair the client uses for one handshake. The
//! modulus is the product of two random primes; the exponent pair satisfies
//! `e * d = 1 (mod (p-1)(q-1))`.
//!
//! ## Strength gate
//!
//! Moduli below [`ABSOLUTE_MIN_BITS`] are rejected outright. Moduli below
//! [`MIN_SECURE_BITS`] are allowed for tests and local tooling but logged as
//! a loud warning; production configuration ([`crate::config::NodeConfig`])
//! refuses to start below [`MIN_SECURE_BITS`].

use num_bigint_dig::{BigUint, RandPrime};
use num_traits::One;
use rand::rngs::OsRng;

use super::error::CryptoError;
use super::modmath::{coprime, mod_inverse};

/// Smallest modulus the generator will produce at all.
pub const ABSOLUTE_MIN_BITS: usize = 32;

/// Smallest modulus considered acceptable outside tests.
pub const MIN_SECURE_BITS: usize = 1024;

/// Default production modulus size.
pub const DEFAULT_MODULUS_BITS: usize = 2048;

/// Public half of a handshake keypair. Safe to send in the clear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPublicKey {
    pub n: BigUint,
    pub e: BigUint,
}

/// Private half of a handshake keypair. Never serialized, never persisted.
#[derive(Debug, Clone)]
pub struct RsaPrivateKey {
    pub n: BigUint,
    pub d: BigUint,
}

/// One ephemeral handshake keypair.
#[derive(Debug, Clone)]
pub struct RsaKeypair {
    pub public: RsaPublicKey,
    pub private: RsaPrivateKey,
}

/// Generate an RSA keypair with a modulus of roughly `bits` bits.
///
/// The public exponent is 65537; when 65537 is not coprime with the totient
/// the generator deterministically falls back to 3 rather than failing, so a
/// handshake can always complete. If neither exponent fits, fresh primes are
/// drawn.
///
/// # Errors
///
/// `CryptoError::InvalidKey` when `bits` is below [`ABSOLUTE_MIN_BITS`].
pub fn generate_keypair(bits: usize) -> Result<RsaKeypair, CryptoError> {
    if bits < ABSOLUTE_MIN_BITS {
        return Err(CryptoError::InvalidKey {
            key_type: "rsa_modulus".to_string(),
            reason: format!(
                "requested {} bits, hard minimum is {}",
                bits, ABSOLUTE_MIN_BITS
            ),
        });
    }
    if bits < MIN_SECURE_BITS {
        tracing::warn!(
            "⚠️  Generating a {}-bit RSA modulus; below the {}-bit production minimum",
            bits,
            MIN_SECURE_BITS
        );
    }

    let mut rng = OsRng;
    let p_bits = bits / 2;
    let q_bits = bits - p_bits;

    loop {
        let p: BigUint = rng.gen_prime(p_bits);
        let q: BigUint = rng.gen_prime(q_bits);
        if p == q {
            continue;
        }

        let n = &p * &q;
        let phi = (&p - BigUint::one()) * (&q - BigUint::one());

        let e = BigUint::from(65537u32);
        let e = if coprime(&e, &phi) {
            e
        } else {
            let fallback = BigUint::from(3u32);
            if !coprime(&fallback, &phi) {
                // Neither exponent divides cleanly into this totient; draw
                // new primes instead of erroring out of the handshake.
                continue;
            }
            fallback
        };

        let d = match mod_inverse(&e, &phi) {
            Some(d) => d,
            None => continue,
        };

        return Ok(RsaKeypair {
            public: RsaPublicKey { n: n.clone(), e },
            private: RsaPrivateKey { n, d },
        });
    }
}
