//! AddressDeriver — deterministic escrow-address computation (spec.md §4.2).
//!
//! `addr = SHA3-256(factory_id || SHA3-256(canonical(immutables)) || role_byte)`.
//! Total and pure: any difference in Immutables (including the packed
//! timelock bits) changes the address.

use sha3::{Digest, Sha3_256};

use crate::primitives::{Hash32, Role};
use crate::state::Immutables;

pub fn immutables_hash(immutables: &Immutables) -> Hash32 {
    let encoded = immutables.canonical_encoding();
    let mut hasher = Sha3_256::new();
    hasher.update(&encoded);
    Hash32::from_slice(&hasher.finalize()).expect("sha3-256 output is always 32 bytes")
}

pub fn derive(factory_id: &str, immutables: &Immutables, role: Role) -> Hash32 {
    let salt = immutables_hash(immutables);
    let mut hasher = Sha3_256::new();
    hasher.update(factory_id.as_bytes());
    hasher.update(salt.as_bytes());
    hasher.update([role.role_byte()]);
    Hash32::from_slice(&hasher.finalize()).expect("sha3-256 output is always 32 bytes")
}
