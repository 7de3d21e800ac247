// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Modular Arithmetic Primitives
//!
//! Thin wrappers over `num-bigint-dig` used by key generation and the
//! per-symbol RSA transform. Pure functions; no I/O.

use num_bigint_dig::{BigUint, ModInverse};
use num_integer::Integer;
use num_traits::One;

/// Compute `base ^ exp mod modulus`.
pub fn mod_pow(base: &BigUint, exp: &BigUint, modulus: &BigUint) -> BigUint {
    base.modpow(exp, modulus)
}

/// Compute the modular inverse of `a` mod `m`, if one exists.
///
/// Returns `None` when `gcd(a, m) != 1`.
pub fn mod_inverse(a: &BigUint, m: &BigUint) -> Option<BigUint> {
    a.mod_inverse(m)?.to_biguint()
}

/// True when `a` and `b` share no factor besides 1.
pub fn coprime(a: &BigUint, b: &BigUint) -> bool {
    a.gcd(b).is_one()
}
